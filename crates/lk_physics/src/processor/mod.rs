// crates/lk_physics/src/processor/mod.rs

//! 数据处理器框架
//!
//! 所有非本地操作（边界条件、场间耦合、归约）都表达为作用在
//! 一个或多个原子块上的、可按域裁剪与单位缩放的处理器。
//!
//! 框架分两层：
//! - **函数对象层** ([`generator`]): 实际计算逻辑，携带作用区域声明、
//!   写入模式与空间延伸
//! - **生成器层**: 持有域形状（盒或点列）与变换词汇
//!   (`shift` / `multiply` / `divide` / `extract`)，`generate()` 冻结域、
//!   产出可执行处理器
//!
//! 处理器在生成时冻结其作用域；具体的块元组在执行时传入
//! （所有权安全的绑定表达，语义等价于生成期绑定）。
//! 归约型变体 ([`reductive`]) 额外携带自己的统计量对象。

use lk_foundation::Scalar;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::descriptor::Descriptor;
use crate::engine::block::AtomicBlock3d;
use crate::engine::lattice::LatticeError;

pub mod builtin;
pub mod generator;
pub mod reductive;

pub use builtin::{AverageDensityFunctional, SetConstantExternalForce};
pub use generator::{
    BoxedDataProcessorGenerator3d, DataProcessorGenerator3d, DotProcessingFunctional3d,
    DottedDataProcessorGenerator3d, ProcessingFunctional3d,
};
pub use reductive::{
    ReductiveBoxedDataProcessor3d, ReductiveBoxedDataProcessorGenerator3d,
    ReductiveProcessingFunctional3d,
};

// ============================================================
// 作用区域与错误
// ============================================================

/// 处理器作用区域
///
/// 决定完整时间步内的调度时机：体相处理器在碰撞前运行，
/// 包络处理器在迁移后运行（迁移会写入包络）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockDomain {
    /// 块体相
    Bulk,
    /// 包络圈
    Envelope,
}

/// 数据处理器错误
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// 传入的块元组数量与处理器期望不符
    #[error("块元组数量不匹配: 期望 {expected}, 实际 {actual}")]
    WrongBlockCount {
        /// 期望的块数
        expected: usize,
        /// 实际传入的块数
        actual: usize,
    },

    /// 处理器内部的格子操作失败
    #[error("格子操作失败: {0}")]
    Lattice(Box<LatticeError>),
}

impl From<LatticeError> for ProcessorError {
    fn from(err: LatticeError) -> Self {
        Self::Lattice(Box::new(err))
    }
}

// ============================================================
// 处理器接口
// ============================================================

/// 可执行数据处理器
///
/// 作用域在生成时冻结；执行时接收具体的块元组。
/// `extent_along` 报告每个方向的最坏邻域延伸（0 = 纯本地，
/// 1 = 一层近邻），调度器据此决定包络交换的先后。
pub trait DataProcessor3d<S: Scalar, D: Descriptor>: Send {
    /// 在给定块元组上执行
    fn process(&mut self, blocks: &mut [&mut AtomicBlock3d<S, D>]) -> Result<(), ProcessorError>;

    /// 沿某方向的空间延伸（0 或 1）
    fn extent_along(&self, direction: usize) -> i64;

    /// 全方向最坏延伸
    fn extent(&self) -> i64 {
        (0..3).map(|dir| self.extent_along(dir)).max().unwrap_or(0)
    }
}
