// crates/lk_physics/src/engine/mod.rs

//! 碰撞-迁移引擎
//!
//! - [`lattice`]: 时间计数器、块格子基础接口、派生读数
//! - [`block`]: 原子块（稠密存储 + 迁移 + 处理器调度）
//! - [`parallel`]: 并行碰撞策略

pub mod block;
pub mod lattice;
pub mod parallel;

pub use block::AtomicBlock3d;
pub use lattice::{
    get_stored_average_density, get_stored_average_energy, get_stored_average_velocity,
    BlockLatticeBase3d, LatticeError, TimeCounter,
};
pub use parallel::{ParallelConfig, ParallelStrategy};
