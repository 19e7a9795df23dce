// crates/lk_physics/src/engine/parallel.rs

//! 并行碰撞策略
//!
//! 碰撞是逐单元完全本地的操作，对块内互不相交的 x 方向条带
//! 天然数据并行。每个条带在线程本地统计量上累加，条带完成后
//! 一次性归并到块统计量，保持 §共享资源策略：步内读取方只见
//! 上一步发布值，归并只发生在步末之前。

use lk_foundation::Scalar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::descriptor::Descriptor;
use crate::engine::lattice::LatticeError;
use crate::statistics::BlockStatistics;

/// 并行策略
///
/// - `Sequential`: 完全串行，适合小块
/// - `SlabChunks`: 按 x 方向条带并行碰撞，条带统计量步末归并
/// - `Auto`: 按体相单元数自动选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParallelStrategy {
    /// 串行执行
    Sequential,
    /// x 条带并行
    SlabChunks,
    /// 自动选择（根据问题规模）
    Auto,
}

impl Default for ParallelStrategy {
    fn default() -> Self {
        Self::Auto
    }
}

/// 并行碰撞配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// 并行策略
    pub strategy: ParallelStrategy,
    /// 最小并行单元数（低于此值使用串行）
    pub min_parallel_size: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            strategy: ParallelStrategy::Auto,
            min_parallel_size: 1000,
        }
    }
}

impl ParallelConfig {
    /// 给定体相单元数时是否走并行路径
    pub fn use_parallel(&self, n_cells: usize) -> bool {
        match self.strategy {
            ParallelStrategy::Sequential => false,
            ParallelStrategy::SlabChunks => true,
            ParallelStrategy::Auto => n_cells >= self.min_parallel_size,
        }
    }
}

/// 对整块（体相 == 分配域）执行条带并行碰撞
///
/// 存储为 x 主序，每个条带是 `ny*nz` 个连续单元。
/// 返回前把所有条带的本地统计量按序归并进 `statistics`。
pub(crate) fn collide_slabs<S: Scalar, D: Descriptor>(
    cells: &mut [Cell<S, D>],
    ny: usize,
    nz: usize,
    statistics: &mut BlockStatistics<S>,
) -> Result<(), LatticeError> {
    let slab_size = ny * nz;
    let template = statistics.fresh();

    let locals: Result<Vec<BlockStatistics<S>>, LatticeError> = cells
        .par_chunks_mut(slab_size)
        .enumerate()
        .map(|(i_x, slab)| {
            let mut local = template.clone();
            for (i_cell, cell) in slab.iter_mut().enumerate() {
                let name = cell.dynamics().name();
                cell.collide(&mut local).map_err(|source| {
                    LatticeError::CollisionFailed {
                        x: i_x as i64,
                        y: (i_cell / nz) as i64,
                        z: (i_cell % nz) as i64,
                        dynamics: name,
                        source,
                    }
                })?;
            }
            Ok(local)
        })
        .collect();

    for local in locals?.iter() {
        statistics
            .merge(local)
            .expect("条带统计量与块统计量订阅表一致");
    }
    Ok(())
}
