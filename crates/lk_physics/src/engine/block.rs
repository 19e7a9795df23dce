// crates/lk_physics/src/engine/block.rs

//! 原子块
//!
//! [`AtomicBlock3d`] 在一个 [`Box3D`] 上拥有稠密的单元数组（x 主序），
//! 并管理迁移、统计量、时间计数与已安装的数据处理器。
//!
//! # 包络与周期性
//!
//! 分配域 = 体相 + 宽度为 `envelope_width` 的包络圈（默认 0，
//! 嵌入多块时设为不小于 max‖c‖∞）。体相迁移把离开体相的分布写入
//! 包络；包络内容的跨块刷新是外层的职责。逐轴周期开关打开时，
//! 迁移在分配域上取模回绕；关闭时越界分布被丢弃（由外层包络交换
//! 负责补齐）。
//!
//! # 迁移实现
//!
//! 推式迁移：先把全部分布快照进暂存缓冲，再从源格点写入目标，
//! 不存在原位别名（等价于双缓冲）。`collide_and_stream(domain)` 即
//! 碰撞后迁移，与分开调用逐位一致。

use lk_foundation::Scalar;
use log::debug;

use crate::cell::Cell;
use crate::descriptor::Descriptor;
use crate::dynamics::Dynamics;
use crate::engine::lattice::{BlockLatticeBase3d, LatticeError, TimeCounter};
use crate::engine::parallel::{self, ParallelConfig};
use crate::geometry::{Box3D, Dot3D};
use crate::processor::{BlockDomain, DataProcessor3d, DataProcessorGenerator3d};
use crate::statistics::BlockStatistics;

struct ProcessorEntry<S: Scalar, D: Descriptor> {
    id: usize,
    applies_to: BlockDomain,
    processor: Box<dyn DataProcessor3d<S, D>>,
}

/// 三维原子块
pub struct AtomicBlock3d<S: Scalar, D: Descriptor> {
    nx: usize,
    ny: usize,
    nz: usize,
    envelope_width: i64,
    periodic: [bool; 3],
    cells: Vec<Cell<S, D>>,
    background: Box<dyn Dynamics<S, D>>,
    statistics: BlockStatistics<S>,
    time_counter: TimeCounter,
    processors: Vec<ProcessorEntry<S, D>>,
    next_processor_id: usize,
    parallel_config: ParallelConfig,
    stream_scratch: Vec<S>,
}

impl<S: Scalar, D: Descriptor> AtomicBlock3d<S, D> {
    /// 创建 `nx × ny × nz` 的块，每个单元持有背景动力学的克隆
    pub fn new(nx: usize, ny: usize, nz: usize, background: Box<dyn Dynamics<S, D>>) -> Self {
        let n_cells = nx * ny * nz;
        let mut cells = Vec::with_capacity(n_cells);
        for _ in 0..n_cells {
            cells.push(Cell::new(background.clone_box()));
        }
        Self {
            nx,
            ny,
            nz,
            envelope_width: 0,
            periodic: [false; 3],
            cells,
            background,
            statistics: BlockStatistics::new(),
            time_counter: TimeCounter::new(),
            processors: Vec::new(),
            next_processor_id: 0,
            parallel_config: ParallelConfig::default(),
            stream_scratch: Vec::new(),
        }
    }

    // ========== 几何 ==========

    /// 分配域（体相 + 包络）
    pub fn full_box(&self) -> Box3D {
        Box3D::new(
            0,
            self.nx as i64 - 1,
            0,
            self.ny as i64 - 1,
            0,
            self.nz as i64 - 1,
        )
    }

    /// 设置包络宽度（嵌入多块时不小于 max‖c‖∞）
    pub fn set_envelope_width(&mut self, width: i64) {
        self.envelope_width = width;
    }

    /// 设置某轴的周期开关
    pub fn set_periodic(&mut self, axis: usize, periodic: bool) {
        self.periodic[axis] = periodic;
    }

    /// 并行碰撞配置
    pub fn set_parallel_config(&mut self, config: ParallelConfig) {
        self.parallel_config = config;
    }

    /// 块的背景（默认）动力学
    pub fn background_dynamics(&self) -> &dyn Dynamics<S, D> {
        self.background.as_ref()
    }

    #[inline]
    fn flat_index(&self, x: i64, y: i64, z: i64) -> usize {
        debug_assert!(self.full_box().contains(x, y, z));
        (x as usize * self.ny + y as usize) * self.nz + z as usize
    }

    fn check_domain(&self, domain: Box3D) -> Result<(), LatticeError> {
        let bounds = self.full_box();
        lk_foundation::ensure!(
            bounds.contains_box(&domain),
            LatticeError::DomainOutOfBounds { domain, bounds }
        );
        Ok(())
    }

    // ========== 动力学配置 ==========

    /// 在子域内替换单元动力学（逐单元克隆）
    pub fn define_dynamics(
        &mut self,
        domain: Box3D,
        dynamics: &dyn Dynamics<S, D>,
    ) -> Result<(), LatticeError> {
        self.check_domain(domain)?;
        for x in domain.x0..=domain.x1 {
            for y in domain.y0..=domain.y1 {
                for z in domain.z0..=domain.z1 {
                    let idx = self.flat_index(x, y, z);
                    self.cells[idx].define_dynamics(dynamics.clone_box());
                }
            }
        }
        Ok(())
    }

    /// 在单个格点替换动力学
    pub fn define_dynamics_at(
        &mut self,
        dot: Dot3D,
        dynamics: Box<dyn Dynamics<S, D>>,
    ) -> Result<(), LatticeError> {
        let domain = Box3D::new(dot.x, dot.x, dot.y, dot.y, dot.z, dot.z);
        self.check_domain(domain)?;
        let idx = self.flat_index(dot.x, dot.y, dot.z);
        self.cells[idx].define_dynamics(dynamics);
        Ok(())
    }

    // ========== 数据处理器 ==========

    /// 由生成器生成处理器并安装，返回注册号
    ///
    /// 已安装处理器按注册顺序执行；体相处理器在碰撞前，
    /// 包络处理器在迁移后。
    pub fn attach_processor(&mut self, generator: &dyn DataProcessorGenerator3d<S, D>) -> usize {
        let id = self.next_processor_id;
        self.next_processor_id += 1;
        debug!("安装数据处理器 #{id}");
        self.processors.push(ProcessorEntry {
            id,
            applies_to: generator.applies_to(),
            processor: generator.generate(),
        });
        id
    }

    /// 按注册号移除处理器
    pub fn remove_processor(&mut self, id: usize) -> Result<(), LatticeError> {
        let position = self
            .processors
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(LatticeError::ProcessorNotFound { id })?;
        self.processors.remove(position);
        debug!("移除数据处理器 #{id}");
        Ok(())
    }

    /// 已安装处理器数量
    pub fn num_processors(&self) -> usize {
        self.processors.len()
    }

    fn run_processors(&mut self, phase: BlockDomain) -> Result<(), LatticeError> {
        // 处理器在本块上执行，暂时摘下注册表避免别名
        let mut entries = std::mem::take(&mut self.processors);
        let mut result = Ok(());
        for entry in entries.iter_mut() {
            if entry.applies_to != phase {
                continue;
            }
            if let Err(source) = entry.processor.process(&mut [&mut *self]) {
                result = Err(LatticeError::ProcessorFailed {
                    id: entry.id,
                    source,
                });
                break;
            }
        }
        self.processors = entries;
        result
    }

    // ========== 统计量 ==========

    /// 发布当前步统计量（完整步的第 5 阶段；细粒度驱动时手动调用）
    pub fn evaluate_statistics(&mut self) {
        self.statistics.evaluate();
    }

    // ========== 碰撞与迁移 ==========

    fn collide_sequential(&mut self, domain: Box3D) -> Result<(), LatticeError> {
        let ny = self.ny;
        let nz = self.nz;
        let Self {
            cells, statistics, ..
        } = self;
        for x in domain.x0..=domain.x1 {
            for y in domain.y0..=domain.y1 {
                for z in domain.z0..=domain.z1 {
                    let idx = (x as usize * ny + y as usize) * nz + z as usize;
                    let cell = &mut cells[idx];
                    let name = cell.dynamics().name();
                    cell.collide(statistics)
                        .map_err(|source| LatticeError::CollisionFailed {
                            x,
                            y,
                            z,
                            dynamics: name,
                            source,
                        })?;
                }
            }
        }
        Ok(())
    }

    fn stream_domain(&mut self, domain: Box3D) -> Result<(), LatticeError> {
        self.check_domain(domain)?;
        let q = D::Q;
        let n_cells = self.cells.len();

        // 快照全部分布，保证推式写入无别名
        if self.stream_scratch.len() != n_cells * q {
            self.stream_scratch.resize(n_cells * q, S::ZERO);
        }
        {
            let Self {
                cells,
                stream_scratch,
                ..
            } = self;
            for (i, cell) in cells.iter().enumerate() {
                stream_scratch[i * q..(i + 1) * q].copy_from_slice(cell.data().f());
            }
        }

        let (nx, ny, nz) = (self.nx as i64, self.ny as i64, self.nz as i64);
        let periodic = self.periodic;
        let Self {
            cells,
            stream_scratch,
            ..
        } = self;
        for x in domain.x0..=domain.x1 {
            for y in domain.y0..=domain.y1 {
                for z in domain.z0..=domain.z1 {
                    let src = ((x * ny + y) * nz + z) as usize;
                    for i_pop in 1..q {
                        let c = &D::C[i_pop];
                        let mut tx = x + c[0] as i64;
                        let mut ty = y + c[1] as i64;
                        let mut tz = z + c[2] as i64;
                        if periodic[0] {
                            tx = tx.rem_euclid(nx);
                        }
                        if periodic[1] {
                            ty = ty.rem_euclid(ny);
                        }
                        if periodic[2] {
                            tz = tz.rem_euclid(nz);
                        }
                        if tx < 0 || tx >= nx || ty < 0 || ty >= ny || tz < 0 || tz >= nz {
                            // 非周期边缘: 离开分配域的分布交给外层包络交换
                            continue;
                        }
                        let dst = ((tx * ny + ty) * nz + tz) as usize;
                        cells[dst].data_mut().f_mut()[i_pop] = stream_scratch[src * q + i_pop];
                    }
                }
            }
        }
        Ok(())
    }
}

impl<S: Scalar, D: Descriptor> BlockLatticeBase3d<S, D> for AtomicBlock3d<S, D> {
    fn get(&self, x: i64, y: i64, z: i64) -> &Cell<S, D> {
        assert!(
            self.full_box().contains(x, y, z),
            "格点 ({x},{y},{z}) 超出块范围"
        );
        &self.cells[self.flat_index(x, y, z)]
    }

    fn get_mut(&mut self, x: i64, y: i64, z: i64) -> &mut Cell<S, D> {
        assert!(
            self.full_box().contains(x, y, z),
            "格点 ({x},{y},{z}) 超出块范围"
        );
        let idx = self.flat_index(x, y, z);
        &mut self.cells[idx]
    }

    fn bulk(&self) -> Box3D {
        let w = self.envelope_width;
        let full = self.full_box();
        Box3D::new(
            full.x0 + w,
            full.x1 - w,
            full.y0 + w,
            full.y1 - w,
            full.z0 + w,
            full.z1 - w,
        )
    }

    fn specify_statistics_status(
        &mut self,
        domain: Box3D,
        status: bool,
    ) -> Result<(), LatticeError> {
        self.check_domain(domain)?;
        for x in domain.x0..=domain.x1 {
            for y in domain.y0..=domain.y1 {
                for z in domain.z0..=domain.z1 {
                    let idx = self.flat_index(x, y, z);
                    self.cells[idx].data_mut().set_takes_statistics(status);
                }
            }
        }
        Ok(())
    }

    fn collide(&mut self, domain: Box3D) -> Result<(), LatticeError> {
        self.check_domain(domain)?;
        self.collide_sequential(domain)
    }

    fn collide_all(&mut self) -> Result<(), LatticeError> {
        let bulk = self.bulk();
        let whole_block = bulk == self.full_box();
        let n_cells = self.cells.len();
        if whole_block && self.parallel_config.use_parallel(n_cells) {
            debug!("并行碰撞: {} 单元, {} 条带", n_cells, self.nx);
            let ny = self.ny;
            let nz = self.nz;
            let Self {
                cells, statistics, ..
            } = self;
            parallel::collide_slabs(cells, ny, nz, statistics)
        } else {
            self.collide_sequential(bulk)
        }
    }

    fn stream(&mut self, domain: Box3D) -> Result<(), LatticeError> {
        self.stream_domain(domain)
    }

    fn stream_all(&mut self) -> Result<(), LatticeError> {
        self.stream_domain(self.bulk())
    }

    fn collide_and_stream(&mut self, domain: Box3D) -> Result<(), LatticeError> {
        self.collide(domain)?;
        self.stream(domain)
    }

    fn collide_and_stream_all(&mut self) -> Result<(), LatticeError> {
        // 单步固定顺序: 前置处理器 → 碰撞 → 迁移 → 后置处理器 →
        // 统计发布 → 时间递增
        self.run_processors(BlockDomain::Bulk)?;
        self.collide_all()?;
        self.stream_all()?;
        self.run_processors(BlockDomain::Envelope)?;
        self.statistics.evaluate();
        self.time_counter.increment_time();
        Ok(())
    }

    fn increment_time(&mut self) {
        self.time_counter.increment_time();
    }

    fn time_counter(&self) -> &TimeCounter {
        &self.time_counter
    }

    fn statistics(&self) -> &BlockStatistics<S> {
        &self.statistics
    }

    fn statistics_mut(&mut self) -> &mut BlockStatistics<S> {
        &mut self.statistics
    }
}
