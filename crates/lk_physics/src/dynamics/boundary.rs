// crates/lk_physics/src/dynamics/boundary.rs

//! 边界与惰性动力学
//!
//! - [`BounceBack`]: 半程反弹无滑移壁，碰撞交换相反方向分布对
//! - [`NoDynamics`]: 惰性站点，碰撞不做任何事

use lk_foundation::Scalar;

use crate::cell::CellData;
use crate::descriptor::Descriptor;
use crate::dynamics::{Dynamics, DynamicsError};
use crate::statistics::BlockStatistics;

// ============================================================
// BounceBack
// ============================================================

/// 半程反弹壁动力学
///
/// 壁面站点不是体相单元：不收集统计量，也不保持体相意义下的动量。
#[derive(Debug, Clone, Copy, Default)]
pub struct BounceBack;

impl BounceBack {
    /// 创建反弹壁
    pub fn new() -> Self {
        Self
    }
}

impl<S: Scalar, D: Descriptor> Dynamics<S, D> for BounceBack {
    fn name(&self) -> &'static str {
        "BounceBack"
    }

    fn clone_box(&self) -> Box<dyn Dynamics<S, D>> {
        Box::new(*self)
    }

    fn omega(&self) -> S {
        S::ZERO
    }

    fn set_omega(&mut self, _omega: S) {}

    fn collide(
        &mut self,
        cell: &mut CellData<S, D>,
        _statistics: &mut BlockStatistics<S>,
    ) -> Result<(), DynamicsError> {
        let half = D::Q / 2;
        for i_pop in 1..=half {
            let opp = D::OPPOSITE[i_pop];
            let f = cell.f_mut();
            f.swap(i_pop, opp);
        }
        Ok(())
    }

    fn compute_equilibrium(
        &self,
        _i_pop: usize,
        _rho_bar: S,
        _j: &[S; 3],
        _j_sqr: S,
        _theta_bar: S,
    ) -> S {
        S::ZERO
    }
}

// ============================================================
// NoDynamics
// ============================================================

/// 惰性动力学（固体内部或未初始化区域）
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDynamics;

impl NoDynamics {
    /// 创建惰性动力学
    pub fn new() -> Self {
        Self
    }
}

impl<S: Scalar, D: Descriptor> Dynamics<S, D> for NoDynamics {
    fn name(&self) -> &'static str {
        "NoDynamics"
    }

    fn clone_box(&self) -> Box<dyn Dynamics<S, D>> {
        Box::new(*self)
    }

    fn omega(&self) -> S {
        S::ZERO
    }

    fn set_omega(&mut self, _omega: S) {}

    fn collide(
        &mut self,
        _cell: &mut CellData<S, D>,
        _statistics: &mut BlockStatistics<S>,
    ) -> Result<(), DynamicsError> {
        Ok(())
    }

    fn compute_equilibrium(
        &self,
        _i_pop: usize,
        _rho_bar: S,
        _j: &[S; 3],
        _j_sqr: S,
        _theta_bar: S,
    ) -> S {
        S::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::descriptor::D2Q9;

    #[test]
    fn test_bounce_back_reverses_populations() {
        let mut cell: Cell<f64, D2Q9> = Cell::new(Box::new(BounceBack::new()));
        for i_pop in 0..D2Q9::Q {
            cell[i_pop] = i_pop as f64;
        }

        let mut stats = BlockStatistics::new();
        cell.collide(&mut stats).unwrap();

        assert_eq!(cell[0], 0.0);
        for i_pop in 1..D2Q9::Q {
            assert_eq!(cell[i_pop], D2Q9::OPPOSITE[i_pop] as f64);
        }
    }

    #[test]
    fn test_bounce_back_involution() {
        // 连续两次反弹恢复原状
        let mut cell: Cell<f64, D2Q9> = Cell::new(Box::new(BounceBack::new()));
        for i_pop in 0..D2Q9::Q {
            cell[i_pop] = (i_pop * i_pop) as f64 * 0.01;
        }
        let before: Vec<f64> = cell.data().f().to_vec();

        let mut stats = BlockStatistics::new();
        cell.collide(&mut stats).unwrap();
        cell.collide(&mut stats).unwrap();

        assert_eq!(cell.data().f(), &before[..]);
    }

    #[test]
    fn test_no_dynamics_is_inert() {
        let mut cell: Cell<f64, D2Q9> = Cell::new(Box::new(NoDynamics::new()));
        cell[3] = 0.5;
        let mut stats = BlockStatistics::new();
        cell.collide(&mut stats).unwrap();
        assert_eq!(cell[3], 0.5);
        stats.evaluate();
        assert_eq!(stats.num_cells(), 0);
    }
}
