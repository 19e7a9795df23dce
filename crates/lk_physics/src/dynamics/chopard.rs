// crates/lk_physics/src/dynamics/chopard.rs

//! Chopard 动力学
//!
//! 声速逐点可调的 BGK 变体。平衡态通过修正项 `κ = vs² - cs²`
//! 把描述符声速替换为站点声速 `vs²`；`vs² = cs²` 时退化为标准 BGK。

use lk_foundation::Scalar;

use crate::cell::CellData;
use crate::descriptor::{c_dot, Descriptor};
use crate::dynamics::{DynamicParam, Dynamics, DynamicsError};
use crate::moments;
use crate::statistics::BlockStatistics;

/// 可调声速动力学
#[derive(Debug, Clone, Copy)]
pub struct ChopardDynamics<S: Scalar> {
    vs2: S,
    omega: S,
}

impl<S: Scalar> ChopardDynamics<S> {
    /// 以站点声速平方与松弛率创建
    pub fn new(vs2: S, omega: S) -> Self {
        Self { vs2, omega }
    }

    /// 站点声速平方
    pub fn vs2(&self) -> S {
        self.vs2
    }

    /// 设置站点声速平方
    pub fn set_vs2(&mut self, vs2: S) {
        self.vs2 = vs2;
    }

    fn equilibrium<D: Descriptor>(
        i_pop: usize,
        rho_bar: S,
        inv_rho: S,
        j: &[S; 3],
        j_sqr: S,
        vs2: S,
    ) -> S {
        let inv_cs2 = D::inv_cs2::<S>();
        let kappa = vs2 - D::cs2::<S>();
        let t = D::t::<S>(i_pop);
        if i_pop == 0 {
            inv_cs2
                * (kappa * (t - S::ONE) + rho_bar * (t * vs2 - kappa)
                    - inv_rho * j_sqr * t * S::HALF * inv_cs2)
        } else {
            let c_j = c_dot(&D::C[i_pop], j);
            inv_cs2
                * t
                * (kappa + rho_bar * vs2 + c_j + inv_rho * S::HALF * (inv_cs2 * c_j * c_j - j_sqr))
        }
    }
}

impl<S: Scalar, D: Descriptor> Dynamics<S, D> for ChopardDynamics<S> {
    fn name(&self) -> &'static str {
        "Chopard"
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
        let (rho_bar, j) = moments::get_rho_bar_j(cell);
        let j_sqr = moments::norm_sqr(&j);
        let inv_rho = D::inv_rho(rho_bar);
        for i_pop in 0..D::Q {
            cell[i_pop] *= S::ONE - self.omega;
            cell[i_pop] += self.omega
                * Self::equilibrium::<D>(i_pop, rho_bar, inv_rho, &j, j_sqr, self.vs2);
        }
        if cell.takes_statistics() {
            statistics.gather_statistics(rho_bar, inv_rho * inv_rho * j_sqr);
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
        Self::equilibrium::<D>(i_pop, rho_bar, inv_rho, j, j_sqr, self.vs2)
    }

    fn get_parameter(&self, which: DynamicParam) -> S {
        match which {
            DynamicParam::OmegaShear => self.omega,
            DynamicParam::SqrSpeedOfSound => self.vs2,
            _ => S::ZERO,
        }
    }

    fn set_parameter(&mut self, which: DynamicParam, value: S) {
        // 分支严格互斥：设置 ω 不得波及 vs²
        match which {
            DynamicParam::OmegaShear => self.omega = value,
            DynamicParam::SqrSpeedOfSound => self.vs2 = value,
            _ => {}
        }
    }
}
