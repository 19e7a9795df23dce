// crates/lk_physics/src/lib.rs

//! LatKin 物理核心
//!
//! 格子 Boltzmann 引擎的计算核心，包括：
//! - 格子坐标几何 (geometry)
//! - 格子描述符 (descriptor)
//! - 格点单元与矩计算 (cell, moments)
//! - 多态碰撞动力学族 (dynamics)
//! - 块级统计量 (statistics)
//! - 原子块与碰撞-迁移引擎 (engine)
//! - 数据处理器框架 (processor)
//!
//! # Trait 抽象
//!
//! - [`Descriptor`]: 速度集几何与外部场布局（编译期常量）
//! - [`Dynamics`]: 逐单元碰撞算子（多态、可克隆、可分解）
//! - [`BlockLatticeBase3d`]: 碰撞-迁移管线契约
//!
//! # 作用域外
//!
//! 多块域分解与 MPI 交换、文件 I/O 与检查点格式、网格生成、
//! 示例驱动程序均为外部协作者，仅通过本 crate 的接口对接。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cell;
pub mod descriptor;
pub mod dynamics;
pub mod engine;
pub mod geometry;
pub mod moments;
pub mod processor;
pub mod statistics;

// 重导出常用类型
pub use cell::{Cell, CellData};
pub use descriptor::{
    c_dot, Descriptor, D2Q9, D3Q19, D3Q27, ForcedD2Q9, ForcedD3Q19, MomentD3Q19,
};
pub use dynamics::{
    Bgk, BounceBack, ChopardDynamics, CompositeDynamics, ConstRhoBgk, DynamicParam, Dynamics,
    DynamicsError, EntropicBgk, ExternalMomentBgk, ForcedEntropicBgk, GuoExternalForceBgk,
    GuoExternalForceIncBgk, IncBgk, NoDynamics, RegularizedBgk, Rlb,
};
pub use engine::{
    get_stored_average_density, get_stored_average_energy, get_stored_average_velocity,
    AtomicBlock3d, BlockLatticeBase3d, LatticeError, ParallelConfig, ParallelStrategy,
    TimeCounter,
};
pub use geometry::{Box3D, Dot3D, DotList3D};
pub use processor::{
    AverageDensityFunctional, BlockDomain, BoxedDataProcessorGenerator3d, DataProcessor3d,
    DataProcessorGenerator3d, DotProcessingFunctional3d, DottedDataProcessorGenerator3d,
    ProcessingFunctional3d, ProcessorError, ReductiveBoxedDataProcessorGenerator3d,
    ReductiveProcessingFunctional3d, SetConstantExternalForce,
};
pub use statistics::{BlockStatistics, AV_RHO_BAR, AV_U_SQR, MAX_U_SQR};
