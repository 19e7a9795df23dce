// crates/lk_physics/src/engine/lattice.rs

//! 块格子基础接口
//!
//! [`BlockLatticeBase3d`] 是碰撞-迁移管线的统一契约，
//! 原子块实现它；未来的多块包装器同样以它为界面。
//!
//! # 单步顺序
//!
//! 无参的 `collide_and_stream_all` 按固定顺序执行：
//! (1) 体相前置处理器 → (2) 碰撞 → (3) 迁移 →
//! (4) 包络后置处理器 → (5) 统计量发布 → (6) 时间递增。

use lk_foundation::Scalar;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cell::Cell;
use crate::descriptor::Descriptor;
use crate::dynamics::DynamicsError;
use crate::geometry::Box3D;
use crate::processor::ProcessorError;
use crate::statistics::{BlockStatistics, AV_RHO_BAR, AV_U_SQR};

// ============================================================
// 时间计数器
// ============================================================

/// 单调时间步计数器
///
/// 唯一的修改入口是 [`increment_time`](TimeCounter::increment_time)，
/// 由单线程步进驱动调用；任何组件都可读取。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeCounter {
    time: u64,
}

impl TimeCounter {
    /// 从零开始创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 递增一个时间步
    #[inline]
    pub fn increment_time(&mut self) {
        self.time += 1;
    }

    /// 当前时间步
    #[inline]
    pub fn time(&self) -> u64 {
        self.time
    }

    /// 归零（重网格化后重置）
    pub fn reset_time(&mut self) {
        self.time = 0;
    }
}

// ============================================================
// 错误
// ============================================================

/// 格子引擎错误
///
/// 单元级数值失败在此补充格点坐标与动力学标识后向上传播；
/// 一步要么完整完成，要么携带诊断信息中止。
#[derive(Debug, Error)]
pub enum LatticeError {
    /// 某格点碰撞失败
    #[error("格点 ({x},{y},{z}) 处 {dynamics} 碰撞失败: {source}")]
    CollisionFailed {
        /// 格点 x 坐标
        x: i64,
        /// 格点 y 坐标
        y: i64,
        /// 格点 z 坐标
        z: i64,
        /// 动力学名称
        dynamics: &'static str,
        /// 底层动力学错误
        #[source]
        source: DynamicsError,
    },

    /// 操作域超出块的分配范围
    #[error("域 {domain:?} 超出块范围 {bounds:?}")]
    DomainOutOfBounds {
        /// 请求的域
        domain: Box3D,
        /// 块的分配范围
        bounds: Box3D,
    },

    /// 已安装的数据处理器执行失败
    #[error("数据处理器 {id} 执行失败: {source}")]
    ProcessorFailed {
        /// 处理器注册号
        id: usize,
        /// 底层处理器错误
        #[source]
        source: ProcessorError,
    },

    /// 按注册号找不到数据处理器
    #[error("数据处理器 {id} 不存在")]
    ProcessorNotFound {
        /// 请求的注册号
        id: usize,
    },
}

// ============================================================
// 块格子基础接口
// ============================================================

/// 块格子契约
///
/// 无参形式作用于块的整个体相；带 [`Box3D`] 的形式作用于给定子域。
/// 时间计数器每完成一个时间步恰好前进一次。
pub trait BlockLatticeBase3d<S: Scalar, D: Descriptor> {
    /// 只读访问格点单元
    fn get(&self, x: i64, y: i64, z: i64) -> &Cell<S, D>;

    /// 可变访问格点单元
    fn get_mut(&mut self, x: i64, y: i64, z: i64) -> &mut Cell<S, D>;

    /// 块的体相域
    fn bulk(&self) -> Box3D;

    /// 打开/关闭子域内逐单元统计收集
    fn specify_statistics_status(&mut self, domain: Box3D, status: bool)
        -> Result<(), LatticeError>;

    /// 在子域上碰撞
    fn collide(&mut self, domain: Box3D) -> Result<(), LatticeError>;

    /// 在整个体相上碰撞
    fn collide_all(&mut self) -> Result<(), LatticeError>;

    /// 在子域上迁移
    fn stream(&mut self, domain: Box3D) -> Result<(), LatticeError>;

    /// 在整个体相上迁移
    fn stream_all(&mut self) -> Result<(), LatticeError>;

    /// 在子域上碰撞后迁移（结果与两步分开调用逐位一致）
    fn collide_and_stream(&mut self, domain: Box3D) -> Result<(), LatticeError>;

    /// 完整时间步：处理器调度 + 碰撞 + 迁移 + 统计发布 + 时间递增
    fn collide_and_stream_all(&mut self) -> Result<(), LatticeError>;

    /// 时间步递增
    fn increment_time(&mut self);

    /// 时间计数器
    fn time_counter(&self) -> &TimeCounter;

    /// 块统计量只读访问
    fn statistics(&self) -> &BlockStatistics<S>;

    /// 块统计量可变访问
    fn statistics_mut(&mut self) -> &mut BlockStatistics<S>;
}

// ============================================================
// 派生读数
// ============================================================

/// 上一步发布的平均密度: `fullRho(avRhoBar)`
pub fn get_stored_average_density<S, D, L>(lattice: &L) -> S
where
    S: Scalar,
    D: Descriptor,
    L: BlockLatticeBase3d<S, D>,
{
    D::full_rho(lattice.statistics().get_average(AV_RHO_BAR))
}

/// 上一步发布的平均动能: `avUSqr / 2`
pub fn get_stored_average_energy<S, D, L>(lattice: &L) -> S
where
    S: Scalar,
    D: Descriptor,
    L: BlockLatticeBase3d<S, D>,
{
    lattice.statistics().get_average(AV_U_SQR) * S::HALF
}

/// 上一步发布的平均速度模: `sqrt(avUSqr)`
pub fn get_stored_average_velocity<S, D, L>(lattice: &L) -> S
where
    S: Scalar,
    D: Descriptor,
    L: BlockLatticeBase3d<S, D>,
{
    lattice.statistics().get_average(AV_U_SQR).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_counter() {
        let mut counter = TimeCounter::new();
        assert_eq!(counter.time(), 0);
        counter.increment_time();
        counter.increment_time();
        assert_eq!(counter.time(), 2);
        counter.reset_time();
        assert_eq!(counter.time(), 0);
    }
}
