// crates/lk_physics/src/cell.rs

//! 格点单元
//!
//! [`CellData`] 保存一个格点的分布数组、外部标量区与统计开关；
//! [`Cell`] 在其上附加该格点拥有的动力学实例。
//! 数据与动力学分离存储，碰撞时可同时获得动力学的共享借用与
//! 数据的可变借用，不产生别名。

use lk_foundation::Scalar;

use crate::descriptor::Descriptor;
use crate::dynamics::{Dynamics, DynamicsError};
use crate::moments;
use crate::statistics::BlockStatistics;

// ============================================================
// CellData
// ============================================================

/// 单元数据: `Q` 个分布值 + 外部标量区 + 统计开关
///
/// 分布按移权约定存储（`f̄ = f - t`），静止平衡态为全零。
#[derive(Debug, Clone, Copy)]
pub struct CellData<S: Scalar, D: Descriptor> {
    f: D::Pops<S>,
    external: D::Ext<S>,
    takes_statistics: bool,
}

impl<S: Scalar, D: Descriptor> Default for CellData<S, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scalar, D: Descriptor> CellData<S, D> {
    /// 创建全零单元数据（统计默认开启）
    pub fn new() -> Self {
        Self {
            f: D::zeroed_pops(),
            external: D::zeroed_ext(),
            takes_statistics: true,
        }
    }

    /// 分布数组只读切片
    #[inline]
    pub fn f(&self) -> &[S] {
        self.f.as_ref()
    }

    /// 分布数组可变切片
    #[inline]
    pub fn f_mut(&mut self) -> &mut [S] {
        self.f.as_mut()
    }

    /// 外部标量区只读切片
    #[inline]
    pub fn external(&self) -> &[S] {
        self.external.as_ref()
    }

    /// 外部标量区可变切片
    #[inline]
    pub fn external_mut(&mut self) -> &mut [S] {
        self.external.as_mut()
    }

    /// 读取外部标量
    #[inline]
    pub fn get_external(&self, offset: usize) -> S {
        self.external.as_ref()[offset]
    }

    /// 写入外部标量
    #[inline]
    pub fn set_external(&mut self, offset: usize, value: S) {
        self.external.as_mut()[offset] = value;
    }

    /// 从外部标量区读取一个 `D::D` 维向量（不足 3 维时高位补零）
    #[inline]
    pub fn get_external_vector(&self, offset: usize) -> [S; 3] {
        let ext = self.external.as_ref();
        let mut v = [S::ZERO; 3];
        for (i, vi) in v.iter_mut().enumerate().take(D::D) {
            *vi = ext[offset + i];
        }
        v
    }

    /// 本单元是否参与统计收集
    #[inline]
    pub fn takes_statistics(&self) -> bool {
        self.takes_statistics
    }

    /// 设置统计开关
    #[inline]
    pub fn set_takes_statistics(&mut self, status: bool) {
        self.takes_statistics = status;
    }
}

impl<S: Scalar, D: Descriptor> std::ops::Index<usize> for CellData<S, D> {
    type Output = S;

    #[inline]
    fn index(&self, i_pop: usize) -> &S {
        &self.f.as_ref()[i_pop]
    }
}

impl<S: Scalar, D: Descriptor> std::ops::IndexMut<usize> for CellData<S, D> {
    #[inline]
    fn index_mut(&mut self, i_pop: usize) -> &mut S {
        &mut self.f.as_mut()[i_pop]
    }
}

// ============================================================
// Cell
// ============================================================

/// 格点单元: 数据 + 其拥有的动力学实例
pub struct Cell<S: Scalar, D: Descriptor> {
    data: CellData<S, D>,
    dynamics: Box<dyn Dynamics<S, D>>,
}

impl<S: Scalar, D: Descriptor> Clone for Cell<S, D> {
    fn clone(&self) -> Self {
        Self {
            data: self.data,
            dynamics: self.dynamics.clone_box(),
        }
    }
}

impl<S: Scalar, D: Descriptor> std::fmt::Debug for Cell<S, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("data", &self.data)
            .field("dynamics", &self.dynamics.name())
            .finish()
    }
}

impl<S: Scalar, D: Descriptor> Cell<S, D> {
    /// 以给定动力学创建全零单元
    pub fn new(dynamics: Box<dyn Dynamics<S, D>>) -> Self {
        Self {
            data: CellData::new(),
            dynamics,
        }
    }

    /// 单元数据只读访问
    #[inline]
    pub fn data(&self) -> &CellData<S, D> {
        &self.data
    }

    /// 单元数据可变访问
    #[inline]
    pub fn data_mut(&mut self) -> &mut CellData<S, D> {
        &mut self.data
    }

    /// 动力学只读访问
    #[inline]
    pub fn dynamics(&self) -> &dyn Dynamics<S, D> {
        self.dynamics.as_ref()
    }

    /// 动力学可变访问（调参用）
    #[inline]
    pub fn dynamics_mut(&mut self) -> &mut dyn Dynamics<S, D> {
        self.dynamics.as_mut()
    }

    /// 替换本单元的动力学
    pub fn define_dynamics(&mut self, dynamics: Box<dyn Dynamics<S, D>>) {
        self.dynamics = dynamics;
    }

    /// 执行一次本地碰撞
    #[inline]
    pub fn collide(
        &mut self,
        statistics: &mut BlockStatistics<S>,
    ) -> Result<(), DynamicsError> {
        let Self { data, dynamics } = self;
        dynamics.collide(data, statistics)
    }

    /// 将单元初始化到给定 (ρ, u) 的平衡态
    pub fn ini_equilibrium(&mut self, rho: S, u: &[S; 3]) {
        let rho_bar = D::rho_bar(rho);
        let mut j = [S::ZERO; 3];
        for (ji, ui) in j.iter_mut().zip(u.iter()) {
            *ji = rho * *ui;
        }
        let j_sqr = moments::norm_sqr(&j);
        for i_pop in 0..D::Q {
            self.data[i_pop] = self
                .dynamics
                .compute_equilibrium(i_pop, rho_bar, &j, j_sqr, S::ZERO);
        }
    }

    /// 按给定阶数分解单元状态
    pub fn decompose(&self, order: usize) -> Vec<S> {
        let mut raw_data = Vec::new();
        self.dynamics.decompose(&self.data, &mut raw_data, order);
        raw_data
    }

    /// 从分解数据重组单元状态
    pub fn recompose(&mut self, raw_data: &[S], order: usize) -> Result<(), DynamicsError> {
        let Self { data, dynamics } = self;
        dynamics.recompose(data, raw_data, order)
    }
}

impl<S: Scalar, D: Descriptor> std::ops::Index<usize> for Cell<S, D> {
    type Output = S;

    #[inline]
    fn index(&self, i_pop: usize) -> &S {
        &self.data[i_pop]
    }
}

impl<S: Scalar, D: Descriptor> std::ops::IndexMut<usize> for Cell<S, D> {
    #[inline]
    fn index_mut(&mut self, i_pop: usize) -> &mut S {
        &mut self.data[i_pop]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{D2Q9, D3Q19, ForcedD3Q19};
    use crate::dynamics::bgk::Bgk;
    use approx::assert_relative_eq;

    #[test]
    fn test_cell_zero_init() {
        let cell: Cell<f64, D3Q19> = Cell::new(Box::new(Bgk::new(1.0)));
        for i_pop in 0..D3Q19::Q {
            assert_eq!(cell[i_pop], 0.0);
        }
        assert!(cell.data().takes_statistics());
    }

    #[test]
    fn test_external_roundtrip() {
        let mut cell: Cell<f64, ForcedD3Q19> = Cell::new(Box::new(Bgk::new(1.0)));
        cell.data_mut().set_external(0, 1.0e-5);
        cell.data_mut().set_external(2, -2.0e-5);
        let f = cell.data().get_external_vector(0);
        assert_eq!(f, [1.0e-5, 0.0, -2.0e-5]);
    }

    #[test]
    fn test_ini_equilibrium_rest() {
        // ρ=1, u=0 的平衡态在移权约定下是全零分布
        let mut cell: Cell<f64, D2Q9> = Cell::new(Box::new(Bgk::new(0.9)));
        cell.ini_equilibrium(1.0, &[0.0; 3]);
        for i_pop in 0..D2Q9::Q {
            assert_relative_eq!(cell[i_pop], 0.0, epsilon = 1e-16);
        }
    }

    #[test]
    fn test_clone_deep() {
        let mut a: Cell<f64, D2Q9> = Cell::new(Box::new(Bgk::new(0.7)));
        a.ini_equilibrium(1.0, &[0.05, 0.0, 0.0]);
        let b = a.clone();
        assert_eq!(a.dynamics().name(), b.dynamics().name());
        for i_pop in 0..D2Q9::Q {
            assert_eq!(a[i_pop], b[i_pop]);
        }
    }
}
