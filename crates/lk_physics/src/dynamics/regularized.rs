// crates/lk_physics/src/dynamics/regularized.rs

//! 正则化动力学
//!
//! - [`RegularizedBgk`]: 碰撞前由 (ρ̄, j, Π^neq) 重建分布，
//!   丢弃高阶 Hermite 模态后做 BGK 松弛
//! - [`Rlb`]: 复合动力学，持有任意基础动力学，先执行分布补全
//!   （正则化重建）再委托基础碰撞

use lk_foundation::Scalar;

use crate::cell::CellData;
use crate::descriptor::Descriptor;
use crate::dynamics::{
    templates, CompositeDynamics, DynamicParam, Dynamics, DynamicsError,
};
use crate::moments;
use crate::statistics::BlockStatistics;

// ============================================================
// RegularizedBgk
// ============================================================

/// 正则化 BGK 动力学
#[derive(Debug, Clone, Copy)]
pub struct RegularizedBgk<S: Scalar> {
    omega: S,
}

impl<S: Scalar> RegularizedBgk<S> {
    /// 以给定松弛率创建
    pub fn new(omega: S) -> Self {
        Self { omega }
    }
}

impl<S: Scalar, D: Descriptor> Dynamics<S, D> for RegularizedBgk<S> {
    fn name(&self) -> &'static str {
        "RegularizedBGK"
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
        let (rho_bar, j, pi_neq) = moments::compute_rho_bar_j_pi_neq(cell);
        let u_sqr = templates::rlb_collision(cell, rho_bar, &j, &pi_neq, self.omega);
        if cell.takes_statistics() {
            statistics.gather_statistics(rho_bar, u_sqr);
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
// Rlb 复合动力学
// ============================================================

/// RLB 复合动力学
///
/// 分布补全把单元投影到正则化流形 `f̄ = f̄^eq + f^neq(Π^neq)`，
/// 之后把碰撞完全委托给基础动力学。参数读写与分解/重组同样委托。
pub struct Rlb<S: Scalar, D: Descriptor> {
    base: Box<dyn Dynamics<S, D>>,
}

impl<S: Scalar, D: Descriptor> Rlb<S, D> {
    /// 包装一个基础动力学
    pub fn new(base: Box<dyn Dynamics<S, D>>) -> Self {
        Self { base }
    }
}

impl<S: Scalar, D: Descriptor> Dynamics<S, D> for Rlb<S, D> {
    fn name(&self) -> &'static str {
        "RLB"
    }

    fn clone_box(&self) -> Box<dyn Dynamics<S, D>> {
        Box::new(Rlb {
            base: self.base.clone_box(),
        })
    }

    fn omega(&self) -> S {
        self.base.omega()
    }

    fn set_omega(&mut self, omega: S) {
        self.base.set_omega(omega);
    }

    fn collide(
        &mut self,
        cell: &mut CellData<S, D>,
        statistics: &mut BlockStatistics<S>,
    ) -> Result<(), DynamicsError> {
        self.complete_populations(cell);
        self.base.collide(cell, statistics)
    }

    fn compute_equilibrium(
        &self,
        i_pop: usize,
        rho_bar: S,
        j: &[S; 3],
        j_sqr: S,
        theta_bar: S,
    ) -> S {
        self.base
            .compute_equilibrium(i_pop, rho_bar, j, j_sqr, theta_bar)
    }

    fn get_parameter(&self, which: DynamicParam) -> S {
        self.base.get_parameter(which)
    }

    fn set_parameter(&mut self, which: DynamicParam, value: S) {
        self.base.set_parameter(which, value);
    }
}

impl<S: Scalar, D: Descriptor> CompositeDynamics<S, D> for Rlb<S, D> {
    fn base_dynamics(&self) -> &dyn Dynamics<S, D> {
        self.base.as_ref()
    }

    fn complete_populations(&self, cell: &mut CellData<S, D>) {
        let (rho_bar, j, pi_neq) = moments::compute_rho_bar_j_pi_neq(cell);
        let j_sqr = moments::norm_sqr(&j);
        for i_pop in 0..D::Q {
            cell[i_pop] = self
                .base
                .compute_equilibrium(i_pop, rho_bar, &j, j_sqr, S::ZERO)
                + templates::from_pi_to_fneq::<S, D>(i_pop, &pi_neq);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::descriptor::{D2Q9, D3Q19};
    use crate::dynamics::bgk::Bgk;
    use approx::assert_relative_eq;

    fn perturbed_cell() -> Cell<f64, D3Q19> {
        let mut cell: Cell<f64, D3Q19> = Cell::new(Box::new(RegularizedBgk::new(0.9)));
        cell.ini_equilibrium(1.01, &[0.02, -0.01, 0.03]);
        cell[2] += 3e-3;
        cell[7] -= 1e-3;
        cell[11] += 2e-3;
        cell
    }

    #[test]
    fn test_regularized_conservation() {
        let mut cell = perturbed_cell();
        let (rho_bar0, j0) = moments::get_rho_bar_j(cell.data());

        let mut stats = BlockStatistics::new();
        cell.collide(&mut stats).unwrap();
        let (rho_bar1, j1) = moments::get_rho_bar_j(cell.data());

        assert_relative_eq!(rho_bar0, rho_bar1, epsilon = 1e-14);
        for k in 0..3 {
            assert_relative_eq!(j0[k], j1[k], epsilon = 1e-14);
        }
    }

    #[test]
    fn test_regularize_idempotent() {
        let mut cell = perturbed_cell();
        let dynamics = RegularizedBgk::new(0.9);

        let (rho_bar, j, pi_neq) = moments::compute_rho_bar_j_pi_neq(cell.data());
        let j_sqr = moments::norm_sqr(&j);
        Dynamics::<f64, D3Q19>::regularize(
            &dynamics,
            cell.data_mut(),
            rho_bar,
            &j,
            j_sqr,
            &pi_neq,
            0.0,
        );
        let once: Vec<f64> = cell.data().f().to_vec();

        // 第二次正则化: 矩不变，分布不变
        let (rho_bar2, j2, pi_neq2) = moments::compute_rho_bar_j_pi_neq(cell.data());
        let j_sqr2 = moments::norm_sqr(&j2);
        Dynamics::<f64, D3Q19>::regularize(
            &dynamics,
            cell.data_mut(),
            rho_bar2,
            &j2,
            j_sqr2,
            &pi_neq2,
            0.0,
        );
        for i_pop in 0..D3Q19::Q {
            assert_relative_eq!(cell[i_pop], once[i_pop], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_rlb_composite_matches_regularized_bgk() {
        // RLB(BGK) 与 RegularizedBGK 在 ω=1 时给出相同结果:
        // 两者都把非平衡部分全部替换为零阶重建
        let mut a = perturbed_cell();
        let mut b = perturbed_cell();
        a.define_dynamics(Box::new(Rlb::new(Box::new(Bgk::new(1.0)))));
        b.define_dynamics(Box::new(RegularizedBgk::new(1.0)));

        let mut stats_a = BlockStatistics::new();
        let mut stats_b = BlockStatistics::new();
        a.collide(&mut stats_a).unwrap();
        b.collide(&mut stats_b).unwrap();

        for i_pop in 0..D3Q19::Q {
            assert_relative_eq!(a[i_pop], b[i_pop], epsilon = 1e-13);
        }
    }

    #[test]
    fn test_rlb_delegates_parameters() {
        let mut rlb: Rlb<f64, D2Q9> = Rlb::new(Box::new(Bgk::new(0.7)));
        assert_relative_eq!(Dynamics::<f64, D2Q9>::omega(&rlb), 0.7);
        rlb.set_parameter(DynamicParam::OmegaShear, 1.1);
        assert_relative_eq!(rlb.base_dynamics().omega(), 1.1);
    }
}
