// crates/lk_physics/src/dynamics/entropic.rs

//! 熵稳定动力学 (Karlin–Succi–Chikatamarla)
//!
//! 碰撞前求解稳定化参数 α，使离散 H 定理成立：
//! 在加权分布 `f̃_i = f̄_i + t_i` 上找 α > 0 满足
//! `H(f̃) = H(f̃ - α f^neq)`，其中 `H(x) = Σ x_i ln(x_i / t_i)`。
//!
//! Newton-Raphson 自 α = 2 出发，参数固定为 var = 100、迭代上限 10000，
//! 不做运行期配置，保证结果可复现。终止条件：
//! `|α_{n+1} - α_n| < 100 ε` 或 `|H(f̃) - H(f̃ - α f^neq)| < 100 ε`。
//! 每次 H 评估要求 `f̃_i - α f^neq_i > 0`；违反或不收敛都是致命数值失败，
//! 以结构化错误携带最后一个 α 迭代值与熵残差向上传播。

use lk_foundation::Scalar;

use crate::cell::CellData;
use crate::descriptor::Descriptor;
use crate::dynamics::{templates, Dynamics, DynamicsError};
use crate::moments;
use crate::statistics::BlockStatistics;

/// Newton-Raphson 容差放大系数
const NR_VAR: f64 = 100.0;

/// Newton-Raphson 迭代上限
const NR_MAX_ITERATIONS: usize = 10_000;

// ============================================================
// H 函数与 α 求解（族内共享）
// ============================================================

/// 离散 H 函数: `Σ x_i ln(x_i / t_i)`，要求逐项严格为正
fn compute_entropy<S: Scalar, D: Descriptor>(f: &[S]) -> Result<S, DynamicsError> {
    let mut entropy = S::ZERO;
    for (i_pop, &fi) in f.iter().enumerate() {
        if !(fi > S::ZERO) {
            return Err(DynamicsError::NonPositivePopulation {
                i_pop,
                value: fi.to_f64(),
            });
        }
        entropy += fi * (fi / D::t::<S>(i_pop)).ln();
    }
    Ok(entropy)
}

/// 熵增长: `H(f̃) - H(f̃ - α f^neq)`
fn compute_entropy_growth<S: Scalar, D: Descriptor>(
    f: &[S],
    f_neq: &[S],
    alpha: S,
) -> Result<S, DynamicsError> {
    let mut f_alpha = D::zeroed_pops::<S>();
    for (i_pop, slot) in f_alpha.as_mut().iter_mut().enumerate() {
        *slot = f[i_pop] - alpha * f_neq[i_pop];
    }
    Ok(compute_entropy::<S, D>(f)? - compute_entropy::<S, D>(f_alpha.as_ref())?)
}

/// 熵增长对 α 的导数: `Σ f^neq_i ln((f̃_i - α f^neq_i) / t_i)`
fn compute_entropy_growth_derivative<S: Scalar, D: Descriptor>(
    f: &[S],
    f_neq: &[S],
    alpha: S,
) -> Result<S, DynamicsError> {
    let mut derivative = S::ZERO;
    for i_pop in 0..D::Q {
        let tmp = f[i_pop] - alpha * f_neq[i_pop];
        if !(tmp > S::ZERO) {
            return Err(DynamicsError::NonPositivePopulation {
                i_pop,
                value: tmp.to_f64(),
            });
        }
        derivative += f_neq[i_pop] * (tmp / D::t::<S>(i_pop)).ln();
    }
    Ok(derivative)
}

/// Newton-Raphson 求解 α，返回实际迭代次数
///
/// `alpha` 以初值 2 传入，原位更新为收敛值。
fn solve_alpha<S: Scalar, D: Descriptor>(
    alpha: &mut S,
    f: &[S],
    f_neq: &[S],
) -> Result<usize, DynamicsError> {
    let epsilon = S::EPSILON;
    let var = S::from_f64_lossless(NR_VAR);
    let error_max = epsilon * var;

    let mut error = S::ONE;
    let mut residual = S::ZERO;
    for count in 0..NR_MAX_ITERATIONS {
        let ent_growth = compute_entropy_growth::<S, D>(f, f_neq, *alpha)?;
        residual = ent_growth;
        let ent_growth_derivative =
            compute_entropy_growth_derivative::<S, D>(f, f_neq, *alpha)?;
        if error < error_max || ent_growth.abs() < var * epsilon {
            return Ok(count);
        }
        let alpha_guess = *alpha - ent_growth / ent_growth_derivative;
        error = (*alpha - alpha_guess).abs();
        *alpha = alpha_guess;
    }
    Err(DynamicsError::EntropicNonConvergence {
        iterations: NR_MAX_ITERATIONS,
        last_alpha: alpha.to_f64(),
        residual: residual.to_f64(),
    })
}

// ============================================================
// EntropicBgk
// ============================================================

/// 熵稳定 BGK 动力学
///
/// 有效松弛率 `ω_tot = ω α / 2`；α = 2 时退化为标准松弛。
#[derive(Debug, Clone, Copy)]
pub struct EntropicBgk<S: Scalar> {
    omega: S,
}

impl<S: Scalar> EntropicBgk<S> {
    /// 以给定松弛率创建
    pub fn new(omega: S) -> Self {
        Self { omega }
    }
}

impl<S: Scalar, D: Descriptor> Dynamics<S, D> for EntropicBgk<S> {
    fn name(&self) -> &'static str {
        "EntropicBGK"
    }

    fn clone_box(&self) -> Box<dyn Dynamics<S, D>> {
        Box::new(*self)
    }

    fn omega(&self) -> S {
        self.omega
    }

    fn set_omega(&mut self, omega: S) {
        self.omega = omega;
    }

    fn collide(
        &mut self,
        cell: &mut CellData<S, D>,
        statistics: &mut BlockStatistics<S>,
    ) -> Result<(), DynamicsError> {
        let (rho, u) = moments::compute_rho_u(cell);
        let u_sqr = moments::norm_sqr(&u);

        let mut f = D::zeroed_pops::<S>();
        let mut f_eq = D::zeroed_pops::<S>();
        let mut f_neq = D::zeroed_pops::<S>();
        for i_pop in 0..D::Q {
            let eq = templates::entropic_equilibrium::<S, D>(i_pop, rho, &u);
            let t = D::t::<S>(i_pop);
            f_neq.as_mut()[i_pop] = cell[i_pop] - eq;
            f.as_mut()[i_pop] = cell[i_pop] + t;
            f_eq.as_mut()[i_pop] = eq + t;
        }

        let mut alpha = S::TWO;
        solve_alpha::<S, D>(&mut alpha, f.as_ref(), f_neq.as_ref())?;

        let omega_tot = self.omega * S::HALF * alpha;
        for i_pop in 0..D::Q {
            cell[i_pop] *= S::ONE - omega_tot;
            cell[i_pop] += omega_tot * (f_eq.as_ref()[i_pop] - D::t::<S>(i_pop));
        }

        if cell.takes_statistics() {
            statistics.gather_statistics(D::rho_bar(rho), u_sqr);
        }
        Ok(())
    }

    fn compute_equilibrium(
        &self,
        i_pop: usize,
        rho_bar: S,
        j: &[S; 3],
        j_sqr: S,
        _theta_bar: S,
    ) -> S {
        let _ = j_sqr;
        let rho = D::full_rho(rho_bar);
        let inv_rho = D::inv_rho(rho_bar);
        let mut u = [S::ZERO; 3];
        for (uk, jk) in u.iter_mut().zip(j.iter()) {
            *uk = *jk * inv_rho;
        }
        templates::entropic_equilibrium::<S, D>(i_pop, rho, &u)
    }
}

// ============================================================
// ForcedEntropicBgk
// ============================================================

/// 带 Guo 体积力的熵稳定 BGK 动力学
///
/// α 求解之后按 Guo 半力修正 `u ← u + F/2` 重新评估平衡态做熵稳定松弛，
/// 最后加 Guo 力项 `Δf_i = t_i (1 - ω_tot/2)(…c·F…)`。
#[derive(Debug, Clone, Copy)]
pub struct ForcedEntropicBgk<S: Scalar> {
    omega: S,
}

impl<S: Scalar> ForcedEntropicBgk<S> {
    /// 以给定松弛率创建
    pub fn new(omega: S) -> Self {
        Self { omega }
    }
}

impl<S: Scalar, D: Descriptor> Dynamics<S, D> for ForcedEntropicBgk<S> {
    fn name(&self) -> &'static str {
        "ForcedEntropicBGK"
    }

    fn clone_box(&self) -> Box<dyn Dynamics<S, D>> {
        Box::new(*self)
    }

    fn omega(&self) -> S {
        self.omega
    }

    fn set_omega(&mut self, omega: S) {
        self.omega = omega;
    }

    fn collide(
        &mut self,
        cell: &mut CellData<S, D>,
        statistics: &mut BlockStatistics<S>,
    ) -> Result<(), DynamicsError> {
        let force_offset =
            D::FORCE_OFFSET.ok_or(DynamicsError::MissingExternalField { field: "force" })?;

        let (rho, mut u) = moments::compute_rho_u(cell);

        let mut f = D::zeroed_pops::<S>();
        let mut f_neq = D::zeroed_pops::<S>();
        for i_pop in 0..D::Q {
            let eq = templates::entropic_equilibrium::<S, D>(i_pop, rho, &u);
            f_neq.as_mut()[i_pop] = cell[i_pop] - eq;
            f.as_mut()[i_pop] = cell[i_pop] + D::t::<S>(i_pop);
        }

        let mut alpha = S::TWO;
        solve_alpha::<S, D>(&mut alpha, f.as_ref(), f_neq.as_ref())?;

        // Guo 半力修正后的速度进入平衡态与统计量
        let force = cell.get_external_vector(force_offset);
        for i_d in 0..D::D {
            u[i_d] += force[i_d] * S::HALF;
        }
        let u_sqr = moments::norm_sqr(&u);

        let omega_tot = self.omega * S::HALF * alpha;
        for i_pop in 0..D::Q {
            cell[i_pop] *= S::ONE - omega_tot;
            cell[i_pop] += omega_tot * templates::entropic_equilibrium::<S, D>(i_pop, rho, &u);
        }
        templates::add_guo_force(cell, &u, &force, omega_tot);

        if cell.takes_statistics() {
            statistics.gather_statistics(D::rho_bar(rho), u_sqr);
        }
        Ok(())
    }

    fn compute_equilibrium(
        &self,
        i_pop: usize,
        rho_bar: S,
        j: &[S; 3],
        j_sqr: S,
        _theta_bar: S,
    ) -> S {
        let _ = j_sqr;
        let rho = D::full_rho(rho_bar);
        let inv_rho = D::inv_rho(rho_bar);
        let mut u = [S::ZERO; 3];
        for (uk, jk) in u.iter_mut().zip(j.iter()) {
            *uk = *jk * inv_rho;
        }
        templates::entropic_equilibrium::<S, D>(i_pop, rho, &u)
    }
}
