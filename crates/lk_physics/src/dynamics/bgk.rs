// crates/lk_physics/src/dynamics/bgk.rs

//! BGK 动力学族
//!
//! - [`Bgk`]: 标准单松弛碰撞
//! - [`ExternalMomentBgk`]: 矩来自外部标量区而非分布本身
//! - [`IncBgk`]: 不可压变体
//! - [`ConstRhoBgk`]: 按上一步平均密度修正的全局常密度变体

use lk_foundation::Scalar;

use crate::cell::CellData;
use crate::descriptor::Descriptor;
use crate::dynamics::{templates, Dynamics, DynamicsError};
use crate::moments;
use crate::statistics::{BlockStatistics, AV_RHO_BAR};

// ============================================================
// Bgk
// ============================================================

/// 标准 BGK 动力学
///
/// `f̄ ← f̄ + ω (f̄^eq(ρ̄, j) - f̄)`，平衡态为二阶 Maxwell 展开。
/// 碰撞精确保持质量与动量（浮点舍入内）。
#[derive(Debug, Clone, Copy)]
pub struct Bgk<S: Scalar> {
    omega: S,
}

impl<S: Scalar> Bgk<S> {
    /// 以给定松弛率创建
    pub fn new(omega: S) -> Self {
        Self { omega }
    }
}

impl<S: Scalar, D: Descriptor> Dynamics<S, D> for Bgk<S> {
    fn name(&self) -> &'static str {
        "BGK"
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
        let u_sqr = templates::bgk_ma2_collision(cell, rho_bar, &j, self.omega);
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
// ExternalMomentBgk
// ============================================================

/// 外部矩 BGK 动力学
///
/// ρ 与 j 不从分布导出，而是读取外部标量区中由耦合写入的值。
#[derive(Debug, Clone, Copy)]
pub struct ExternalMomentBgk<S: Scalar> {
    omega: S,
}

impl<S: Scalar> ExternalMomentBgk<S> {
    /// 以给定松弛率创建
    pub fn new(omega: S) -> Self {
        Self { omega }
    }
}

impl<S: Scalar, D: Descriptor> Dynamics<S, D> for ExternalMomentBgk<S> {
    fn name(&self) -> &'static str {
        "ExternalMomentBGK"
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
        let density_offset =
            D::DENSITY_OFFSET.ok_or(DynamicsError::MissingExternalField { field: "density" })?;
        let momentum_offset =
            D::MOMENTUM_OFFSET.ok_or(DynamicsError::MissingExternalField { field: "momentum" })?;

        let rho = cell.get_external(density_offset);
        let rho_bar = D::rho_bar(rho);
        let j = cell.get_external_vector(momentum_offset);

        let u_sqr = templates::bgk_ma2_collision(cell, rho_bar, &j, self.omega);
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
// IncBgk
// ============================================================

/// 不可压 BGK 动力学
///
/// 与标准 BGK 的唯一区别：平衡态 O(Ma²) 项中的 `1/ρ` 取 1。
#[derive(Debug, Clone, Copy)]
pub struct IncBgk<S: Scalar> {
    omega: S,
}

impl<S: Scalar> IncBgk<S> {
    /// 以给定松弛率创建
    pub fn new(omega: S) -> Self {
        Self { omega }
    }
}

impl<S: Scalar, D: Descriptor> Dynamics<S, D> for IncBgk<S> {
    fn name(&self) -> &'static str {
        "IncBGK"
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
        let u_sqr = templates::bgk_inc_collision(cell, rho_bar, &j, self.omega);
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
        templates::bgk_ma2_equilibrium::<S, D>(i_pop, rho_bar, S::ONE, j, j_sqr)
    }
}

// ============================================================
// ConstRhoBgk
// ============================================================

/// 常密度修正 BGK 动力学
///
/// 碰撞前按上一步发布的 `avRhoBar` 计算密度偏差，将平衡态整体
/// 缩放 `ratioRho = 1 + deltaRho/ρ`，把全局平均密度拉回目标值。
/// 统计量以 `ρ̄ + deltaRho` 收集。
#[derive(Debug, Clone, Copy)]
pub struct ConstRhoBgk<S: Scalar> {
    omega: S,
}

impl<S: Scalar> ConstRhoBgk<S> {
    /// 以给定松弛率创建
    pub fn new(omega: S) -> Self {
        Self { omega }
    }
}

impl<S: Scalar, D: Descriptor> Dynamics<S, D> for ConstRhoBgk<S> {
    fn name(&self) -> &'static str {
        "ConstRhoBGK"
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
        let rho = D::full_rho(rho_bar);

        // 读到的是上一步发布的平均值，不会观察到本步的半更新累加
        let delta_rho = -statistics.get_average(AV_RHO_BAR)
            + (S::ONE - S::from_f64_lossless(D::SKORDOS_FACTOR));
        let ratio_rho = S::ONE + delta_rho / rho;

        let u_sqr =
            templates::bgk_ma2_const_rho_collision(cell, rho_bar, &j, ratio_rho, self.omega);
        if cell.takes_statistics() {
            statistics.gather_statistics(rho_bar + delta_rho, u_sqr);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::descriptor::{D2Q9, D3Q19, MomentD3Q19};
    use approx::assert_relative_eq;

    #[test]
    fn test_bgk_equilibrium_fixed_point() {
        let mut cell: Cell<f64, D2Q9> = Cell::new(Box::new(Bgk::new(0.9)));
        cell.ini_equilibrium(1.0, &[0.1, 0.0, 0.0]);
        let before: Vec<f64> = cell.data().f().to_vec();

        let mut stats = BlockStatistics::new();
        cell.collide(&mut stats).unwrap();

        for i_pop in 0..D2Q9::Q {
            assert_relative_eq!(cell[i_pop], before[i_pop], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_bgk_mass_momentum_conservation() {
        let mut cell: Cell<f64, D3Q19> = Cell::new(Box::new(Bgk::new(1.3)));
        cell.ini_equilibrium(1.05, &[0.03, -0.02, 0.01]);
        // 偏离平衡
        cell[1] += 2e-3;
        cell[10] -= 1e-3;
        cell[4] += 5e-4;

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
    fn test_external_moment_bgk_uses_externals() {
        let mut cell: Cell<f64, MomentD3Q19> = Cell::new(Box::new(ExternalMomentBgk::new(1.0)));
        cell.ini_equilibrium(1.0, &[0.0; 3]);
        // 外部耦合提供的矩与分布不同
        cell.data_mut().set_external(0, 1.02);
        cell.data_mut().set_external(1, 0.02);

        let mut stats = BlockStatistics::new();
        cell.collide(&mut stats).unwrap();

        // ω = 1 时分布被整体替换为外部矩的平衡态
        let (rho_bar, j) = moments::get_rho_bar_j(cell.data());
        assert_relative_eq!(rho_bar, 0.02, epsilon = 1e-14);
        assert_relative_eq!(j[0], 0.02, epsilon = 1e-14);
    }

    #[test]
    fn test_external_moment_bgk_missing_field() {
        // D3Q19 没有外部矩布局，碰撞必须报告前置条件违反
        let mut cell: Cell<f64, D3Q19> = Cell::new(Box::new(ExternalMomentBgk::new(1.0)));
        let mut stats = BlockStatistics::new();
        let err = cell.collide(&mut stats).unwrap_err();
        assert!(matches!(err, DynamicsError::MissingExternalField { .. }));
    }

    #[test]
    fn test_inc_bgk_fixed_point() {
        let mut cell: Cell<f64, D2Q9> = Cell::new(Box::new(IncBgk::new(1.1)));
        cell.ini_equilibrium(1.0, &[0.05, -0.02, 0.0]);
        let before: Vec<f64> = cell.data().f().to_vec();

        let mut stats = BlockStatistics::new();
        cell.collide(&mut stats).unwrap();
        for i_pop in 0..D2Q9::Q {
            assert_relative_eq!(cell[i_pop], before[i_pop], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_const_rho_statistics_shift() {
        // 发布的平均密度为 0.1 时，碰撞把每个单元的 ρ̄ 平移 -0.1
        let mut stats = BlockStatistics::new();
        stats.gather_statistics(0.1, 0.0);
        stats.evaluate();

        let mut cell: Cell<f64, D3Q19> = Cell::new(Box::new(ConstRhoBgk::new(1.0)));
        cell.ini_equilibrium(1.1, &[0.0; 3]);
        cell.collide(&mut stats).unwrap();

        let (rho_bar, _) = moments::get_rho_bar_j(cell.data());
        assert_relative_eq!(rho_bar, 0.0, epsilon = 1e-14);
    }
}
