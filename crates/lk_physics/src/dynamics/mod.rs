// crates/lk_physics/src/dynamics/mod.rs

//! 碰撞动力学族
//!
//! [`Dynamics`] 是逐单元多态碰撞算子的统一接口，覆盖：
//! 本地碰撞、平衡态计算、正则化、状态分解/重组/单位缩放、
//! 偏应力与热流计算、参数读写、深拷贝。
//!
//! 等温族共享的能力（正则化、分解、重组、缩放、热学退化值）
//! 以 trait 默认方法提供；各变体只需给出自己的碰撞与平衡态。
//!
//! # 分解布局
//!
//! - 阶 0: `[ρ̄ | j[D] | f^neq[Q] | external[K]]`
//! - 阶 ≥1: `[ρ̄ | j[D] | Π^neq[N] | external[K]]`
//!
//! 重组是分解的精确逆运算；阶 ≥1 重组利用 `f^neq(i) = f^neq(opp(i))`
//! 的对称性将循环减半。
//!
//! # 单位缩放
//!
//! `rescale_decomposed(xDxInv, xDt)`: ρ̄ 不变；速度乘 `xDt·xDxInv`；
//! `f^neq` / `Π^neq` 乘 `xDt`；外部标量不变（子类可覆盖）。

use lk_foundation::Scalar;
use thiserror::Error;

use crate::cell::CellData;
use crate::descriptor::Descriptor;
use crate::moments;
use crate::statistics::BlockStatistics;

pub mod bgk;
pub mod boundary;
pub mod chopard;
pub mod entropic;
pub mod forced;
pub mod regularized;
pub mod templates;

pub use bgk::{Bgk, ConstRhoBgk, ExternalMomentBgk, IncBgk};
pub use boundary::{BounceBack, NoDynamics};
pub use chopard::ChopardDynamics;
pub use entropic::{EntropicBgk, ForcedEntropicBgk};
pub use forced::{GuoExternalForceBgk, GuoExternalForceIncBgk};
pub use regularized::{RegularizedBgk, Rlb};

// ============================================================
// 参数枚举与错误
// ============================================================

/// 动力学可调参数标识
///
/// 未被某个动力学支持的参数：读取返回 0，写入静默忽略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicParam {
    /// 剪切松弛率 ω
    OmegaShear,
    /// 体积松弛率（本族未用）
    OmegaBulk,
    /// 声速平方（Chopard 动力学）
    SqrSpeedOfSound,
    /// 外部体积力分量（0..D-1）
    ExternalForceComponent(usize),
}

/// 动力学层错误
///
/// 数值失败（熵稳定求解）与 API 边界前置条件违反在此表达；
/// 块层为其补充格点坐标后向上传播。
#[derive(Debug, Error)]
pub enum DynamicsError {
    /// 熵稳定 Newton-Raphson 未在迭代上限内收敛
    #[error("熵稳定求解未收敛: {iterations} 次迭代后 alpha={last_alpha:.6e}, 熵残差={residual:.6e}")]
    EntropicNonConvergence {
        /// 已执行迭代数
        iterations: usize,
        /// 最后一个 α 迭代值
        last_alpha: f64,
        /// 最后的熵增长残差
        residual: f64,
    },

    /// H 函数评估遇到非正分布
    #[error("H 函数评估遇到非正分布: f̃[{i_pop}] = {value:.6e}")]
    NonPositivePopulation {
        /// 违反正性的速度索引
        i_pop: usize,
        /// 对应的分布值
        value: f64,
    },

    /// 描述符缺少该动力学需要的外部场
    #[error("描述符缺少外部场: {field}")]
    MissingExternalField {
        /// 缺失的场名
        field: &'static str,
    },

    /// 分解缓冲区大小不匹配
    #[error("分解缓冲区大小不匹配: 期望 {expected}, 实际 {actual}")]
    DecompositionSizeMismatch {
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },
}

// ============================================================
// Dynamics trait
// ============================================================

/// 逐单元碰撞动力学接口
///
/// 实现者为可克隆值类型，由其单元（或块的默认动力学）拥有。
pub trait Dynamics<S: Scalar, D: Descriptor>: Send + Sync {
    /// 动力学名称（诊断用）
    fn name(&self) -> &'static str;

    /// 多态深拷贝
    fn clone_box(&self) -> Box<dyn Dynamics<S, D>>;

    /// 剪切松弛率
    fn omega(&self) -> S;

    /// 设置剪切松弛率
    fn set_omega(&mut self, omega: S);

    /// 执行本地碰撞，按单元开关收集统计量
    fn collide(
        &mut self,
        cell: &mut CellData<S, D>,
        statistics: &mut BlockStatistics<S>,
    ) -> Result<(), DynamicsError>;

    /// 计算第 `i_pop` 个方向的平衡态分布（移权约定）
    fn compute_equilibrium(&self, i_pop: usize, rho_bar: S, j: &[S; 3], j_sqr: S, theta_bar: S)
        -> S;

    // ========== 等温族默认实现 ==========

    /// 由矩重建分布: `f̄_i = f̄^eq_i + f^neq_i(Π^neq)`，丢弃高阶 Hermite 模态
    ///
    /// 幂等：重复应用结果不变（舍入误差内）。
    fn regularize(
        &self,
        cell: &mut CellData<S, D>,
        rho_bar: S,
        j: &[S; 3],
        j_sqr: S,
        pi_neq: &[S; 6],
        theta_bar: S,
    ) {
        cell[0] = self.compute_equilibrium(0, rho_bar, j, j_sqr, theta_bar)
            + templates::from_pi_to_fneq::<S, D>(0, pi_neq);
        let half = D::Q / 2;
        for i_pop in 1..=half {
            cell[i_pop] = self.compute_equilibrium(i_pop, rho_bar, j, j_sqr, theta_bar);
            cell[i_pop + half] =
                self.compute_equilibrium(i_pop + half, rho_bar, j, j_sqr, theta_bar);
            let f_neq = templates::from_pi_to_fneq::<S, D>(i_pop, pi_neq);
            cell[i_pop] += f_neq;
            cell[i_pop + half] += f_neq;
        }
    }

    /// 偏应力（非平衡二阶矩）
    fn compute_deviatoric_stress(&self, cell: &CellData<S, D>) -> [S; 6] {
        let (rho_bar, j) = moments::get_rho_bar_j(cell);
        moments::compute_pi_neq(cell, rho_bar, &j)
    }

    /// 热流：等温族恒为零
    fn compute_heat_flux(&self, _cell: &CellData<S, D>) -> [S; 3] {
        [S::ZERO; 3]
    }

    /// 温度：等温族恒为 1
    fn compute_temperature(&self, _cell: &CellData<S, D>) -> S {
        S::ONE
    }

    /// 给定阶数下的分解变量个数
    fn num_decomposed_variables(&self, order: usize) -> usize {
        let num_variables = if order == 0 {
            // 阶 0: 密度 + 动量 + f^neq
            1 + D::D + D::Q
        } else {
            // 阶 ≥1: 密度 + 动量 + Π^neq
            1 + D::D + D::N
        };
        num_variables + D::NUM_SCALARS
    }

    /// 分解单元状态到平坦标量序列
    fn decompose(&self, cell: &CellData<S, D>, raw_data: &mut Vec<S>, order: usize) {
        raw_data.resize(self.num_decomposed_variables(order), S::ZERO);
        if order == 0 {
            let (rho_bar, j) = moments::get_rho_bar_j(cell);
            let j_sqr = moments::norm_sqr(&j);
            raw_data[0] = rho_bar;
            raw_data[1..1 + D::D].copy_from_slice(&j[..D::D]);
            for i_pop in 0..D::Q {
                raw_data[1 + D::D + i_pop] =
                    cell[i_pop] - self.compute_equilibrium(i_pop, rho_bar, &j, j_sqr, S::ZERO);
            }
            let offset = 1 + D::D + D::Q;
            raw_data[offset..offset + D::NUM_SCALARS].copy_from_slice(cell.external());
        } else {
            let (rho_bar, j, pi_neq) = moments::compute_rho_bar_j_pi_neq(cell);
            raw_data[0] = rho_bar;
            raw_data[1..1 + D::D].copy_from_slice(&j[..D::D]);
            raw_data[1 + D::D..1 + D::D + D::N].copy_from_slice(&pi_neq[..D::N]);
            let offset = 1 + D::D + D::N;
            raw_data[offset..offset + D::NUM_SCALARS].copy_from_slice(cell.external());
        }
    }

    /// 从平坦标量序列重组单元状态（分解的精确逆运算）
    fn recompose(
        &self,
        cell: &mut CellData<S, D>,
        raw_data: &[S],
        order: usize,
    ) -> Result<(), DynamicsError> {
        let expected = self.num_decomposed_variables(order);
        if raw_data.len() != expected {
            return Err(DynamicsError::DecompositionSizeMismatch {
                expected,
                actual: raw_data.len(),
            });
        }

        let rho_bar = raw_data[0];
        let mut j = [S::ZERO; 3];
        j[..D::D].copy_from_slice(&raw_data[1..1 + D::D]);
        let j_sqr = moments::norm_sqr(&j);

        if order == 0 {
            for i_pop in 0..D::Q {
                cell[i_pop] = self.compute_equilibrium(i_pop, rho_bar, &j, j_sqr, S::ZERO)
                    + raw_data[1 + D::D + i_pop];
            }
            let offset = 1 + D::D + D::Q;
            cell.external_mut()
                .copy_from_slice(&raw_data[offset..offset + D::NUM_SCALARS]);
        } else {
            let mut pi_neq = [S::ZERO; 6];
            pi_neq[..D::N].copy_from_slice(&raw_data[1 + D::D..1 + D::D + D::N]);
            self.regularize(cell, rho_bar, &j, j_sqr, &pi_neq, S::ZERO);
            let offset = 1 + D::D + D::N;
            cell.external_mut()
                .copy_from_slice(&raw_data[offset..offset + D::NUM_SCALARS]);
        }
        Ok(())
    }

    /// 按 (xDxInv, xDt) 缩放分解数据的物理单位
    fn rescale_decomposed(
        &self,
        raw_data: &mut [S],
        x_dx_inv: S,
        x_dt: S,
        order: usize,
    ) -> Result<(), DynamicsError> {
        let expected = self.num_decomposed_variables(order);
        if raw_data.len() != expected {
            return Err(DynamicsError::DecompositionSizeMismatch {
                expected,
                actual: raw_data.len(),
            });
        }

        // ρ̄ 是尺度不变量，raw_data[0] 不动

        // 速度按 dx/dt 量纲缩放
        let vel_scale = x_dt * x_dx_inv;
        for v in raw_data[1..1 + D::D].iter_mut() {
            *v *= vel_scale;
        }

        // 非平衡部分按 1/dt 量纲缩放
        let neq_len = if order == 0 { D::Q } else { D::N };
        for v in raw_data[1 + D::D..1 + D::D + neq_len].iter_mut() {
            *v *= x_dt;
        }

        // 外部标量不缩放，其量纲由具体子类负责
        Ok(())
    }

    /// 读取参数；未支持的标识返回 0
    fn get_parameter(&self, which: DynamicParam) -> S {
        match which {
            DynamicParam::OmegaShear => self.omega(),
            _ => S::ZERO,
        }
    }

    /// 写入参数；未支持的标识静默忽略
    fn set_parameter(&mut self, which: DynamicParam, value: S) {
        if which == DynamicParam::OmegaShear {
            self.set_omega(value);
        }
    }
}

impl<S: Scalar, D: Descriptor> Clone for Box<dyn Dynamics<S, D>> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// 复合动力学接口
///
/// 持有一个基础动力学，在委托碰撞之前执行一步分布补全
/// （典型用途：RLB 正则化预处理）。
pub trait CompositeDynamics<S: Scalar, D: Descriptor>: Dynamics<S, D> {
    /// 基础动力学只读访问
    fn base_dynamics(&self) -> &dyn Dynamics<S, D>;

    /// 碰撞前的分布补全步骤
    fn complete_populations(&self, cell: &mut CellData<S, D>);
}
