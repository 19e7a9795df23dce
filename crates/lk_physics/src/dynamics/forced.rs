// crates/lk_physics/src/dynamics/forced.rs

//! 带体积力的 BGK 动力学 (Guo 格式)
//!
//! - [`GuoExternalForceBgk`]: 可压平衡态 + Guo 力项
//! - [`GuoExternalForceIncBgk`]: 不可压平衡态 + Guo 力项

use lk_foundation::Scalar;

use crate::cell::CellData;
use crate::descriptor::Descriptor;
use crate::dynamics::{templates, Dynamics, DynamicsError};
use crate::moments;
use crate::statistics::BlockStatistics;

/// Guo 强迫 BGK 动力学
///
/// 碰撞速度取 `u = j/ρ + F/2`（半力修正），松弛到 `f̄^eq(ρ̄, ρu)`，
/// 再加幅值为 ω 的 Guo 力项。宏观速度的一致定义为 `(j + F/2)/ρ`。
#[derive(Debug, Clone, Copy)]
pub struct GuoExternalForceBgk<S: Scalar> {
    omega: S,
}

impl<S: Scalar> GuoExternalForceBgk<S> {
    /// 以给定松弛率创建
    pub fn new(omega: S) -> Self {
        Self { omega }
    }
}

impl<S: Scalar, D: Descriptor> Dynamics<S, D> for GuoExternalForceBgk<S> {
    fn name(&self) -> &'static str {
        "GuoExternalForceBGK"
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
        let force = cell.get_external_vector(force_offset);

        let (rho_bar, j) = moments::get_rho_bar_j(cell);
        let rho = D::full_rho(rho_bar);
        let inv_rho = D::inv_rho(rho_bar);

        let mut u = [S::ZERO; 3];
        for i_d in 0..D::D {
            u[i_d] = j[i_d] * inv_rho + force[i_d] * S::HALF;
        }

        let mut j_guo = [S::ZERO; 3];
        for i_d in 0..D::D {
            j_guo[i_d] = u[i_d] * rho;
        }

        templates::bgk_ma2_collision(cell, rho_bar, &j_guo, self.omega);
        templates::add_guo_force(cell, &u, &force, self.omega);

        if cell.takes_statistics() {
            statistics.gather_statistics(rho_bar, moments::norm_sqr(&u));
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
        let inv_rho = D::inv_rho(rho_bar);
        templates::bgk_ma2_equilibrium::<S, D>(i_pop, rho_bar, inv_rho, j, j_sqr)
    }
}

// ============================================================
// GuoExternalForceIncBgk
// ============================================================

/// Guo 强迫不可压 BGK 动力学
///
/// 不可压模型取 ρ₀ = 1：速度即动量，`u = j + F/2`，
/// 松弛走不可压碰撞核（O(Ma²) 项 `1/ρ` 取 1），再加幅值为 ω 的
/// Guo 力项。无体积力时与 [`IncBgk`](crate::dynamics::IncBgk) 逐项一致。
#[derive(Debug, Clone, Copy)]
pub struct GuoExternalForceIncBgk<S: Scalar> {
    omega: S,
}

impl<S: Scalar> GuoExternalForceIncBgk<S> {
    /// 以给定松弛率创建
    pub fn new(omega: S) -> Self {
        Self { omega }
    }
}

impl<S: Scalar, D: Descriptor> Dynamics<S, D> for GuoExternalForceIncBgk<S> {
    fn name(&self) -> &'static str {
        "GuoExternalForceIncBGK"
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
        let force = cell.get_external_vector(force_offset);

        let (rho_bar, j) = moments::get_rho_bar_j(cell);

        let mut u = [S::ZERO; 3];
        for i_d in 0..D::D {
            u[i_d] = j[i_d] + force[i_d] * S::HALF;
        }

        templates::bgk_inc_collision(cell, rho_bar, &u, self.omega);
        templates::add_guo_force(cell, &u, &force, self.omega);

        if cell.takes_statistics() {
            statistics.gather_statistics(rho_bar, moments::norm_sqr(&u));
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
        templates::bgk_ma2_equilibrium::<S, D>(i_pop, rho_bar, S::ONE, j, j_sqr)
    }
}
