// crates/lk_physics/src/moments.rs

//! 矩计算工具
//!
//! 对单元数据的纯函数矩计算，不经过动力学分派。
//! 全部基于移权存储约定: `ρ̄ = Σ f̄_i`，`j = Σ f̄_i c_i`
//! （权重的一阶矩为零，移权不影响动量）。
//!
//! 非平衡二阶矩按上三角行主序存储:
//! 2 维 `[xx, xy, yy]`，3 维 `[xx, xy, xz, yy, yz, zz]`。

use lk_foundation::Scalar;

use crate::cell::CellData;
use crate::descriptor::Descriptor;

/// 三维向量模方
#[inline]
pub fn norm_sqr<S: Scalar>(v: &[S; 3]) -> S {
    v[0] * v[0] + v[1] * v[1] + v[2] * v[2]
}

/// 计算约化密度与动量: `ρ̄ = Σ f̄_i`, `j_k = Σ f̄_i c_ik`
pub fn get_rho_bar_j<S: Scalar, D: Descriptor>(cell: &CellData<S, D>) -> (S, [S; 3]) {
    let mut rho_bar = S::ZERO;
    let mut j = [S::ZERO; 3];
    for (i_pop, &fi) in cell.f().iter().enumerate() {
        rho_bar += fi;
        let c = &D::C[i_pop];
        for (jk, ck) in j.iter_mut().zip(c.iter()) {
            match ck {
                1 => *jk += fi,
                -1 => *jk -= fi,
                _ => {}
            }
        }
    }
    (rho_bar, j)
}

/// 计算非平衡二阶矩 Π^neq
///
/// `Π^neq_{αβ} = Σ f̄_i c_iα c_iβ - (j_α j_β / ρ + cs² ρ̄ δ_{αβ})`
pub fn compute_pi_neq<S: Scalar, D: Descriptor>(
    cell: &CellData<S, D>,
    rho_bar: S,
    j: &[S; 3],
) -> [S; 6] {
    let inv_rho = D::inv_rho(rho_bar);
    let cs2 = D::cs2::<S>();
    let f = cell.f();

    let mut pi_neq = [S::ZERO; 6];
    let mut i_pi = 0;
    for i_a in 0..D::D {
        for i_b in i_a..D::D {
            let mut acc = S::ZERO;
            for (i_pop, &fi) in f.iter().enumerate() {
                match D::C[i_pop][i_a] * D::C[i_pop][i_b] {
                    1 => acc += fi,
                    -1 => acc -= fi,
                    _ => {}
                }
            }
            acc -= inv_rho * j[i_a] * j[i_b];
            if i_a == i_b {
                acc -= cs2 * rho_bar;
            }
            pi_neq[i_pi] = acc;
            i_pi += 1;
        }
    }
    pi_neq
}

/// 融合计算 (ρ̄, j, Π^neq)
pub fn compute_rho_bar_j_pi_neq<S: Scalar, D: Descriptor>(
    cell: &CellData<S, D>,
) -> (S, [S; 3], [S; 6]) {
    let (rho_bar, j) = get_rho_bar_j(cell);
    let pi_neq = compute_pi_neq(cell, rho_bar, &j);
    (rho_bar, j, pi_neq)
}

/// 计算全密度与格子速度: `ρ = 1 + ρ̄`, `u_k = j_k / ρ`
pub fn compute_rho_u<S: Scalar, D: Descriptor>(cell: &CellData<S, D>) -> (S, [S; 3]) {
    let (rho_bar, j) = get_rho_bar_j(cell);
    let rho = D::full_rho(rho_bar);
    let inv_rho = D::inv_rho(rho_bar);
    let mut u = [S::ZERO; 3];
    for (uk, jk) in u.iter_mut().zip(j.iter()) {
        *uk = *jk * inv_rho;
    }
    (rho, u)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::descriptor::{D2Q9, D3Q19, Descriptor};
    use crate::dynamics::bgk::Bgk;
    use approx::assert_relative_eq;

    #[test]
    fn test_rest_moments() {
        let cell: Cell<f64, D3Q19> = Cell::new(Box::new(Bgk::new(1.0)));
        let (rho_bar, j) = get_rho_bar_j(cell.data());
        assert_eq!(rho_bar, 0.0);
        assert_eq!(j, [0.0; 3]);
    }

    #[test]
    fn test_moments_match_initialization() {
        let mut cell: Cell<f64, D2Q9> = Cell::new(Box::new(Bgk::new(1.0)));
        let u0 = [0.08, -0.03, 0.0];
        cell.ini_equilibrium(1.1, &u0);

        let (rho_bar, j) = get_rho_bar_j(cell.data());
        assert_relative_eq!(rho_bar, 0.1, epsilon = 1e-13);
        for k in 0..2 {
            assert_relative_eq!(j[k], 1.1 * u0[k], epsilon = 1e-13);
        }

        let (rho, u) = compute_rho_u(cell.data());
        assert_relative_eq!(rho, 1.1, epsilon = 1e-13);
        for k in 0..2 {
            assert_relative_eq!(u[k], u0[k], epsilon = 1e-13);
        }
    }

    #[test]
    fn test_pi_neq_vanishes_at_equilibrium() {
        // 二阶截断平衡态的 Π^neq 为 O(u³) 小量
        let mut cell: Cell<f64, D3Q19> = Cell::new(Box::new(Bgk::new(1.0)));
        let u0 = [0.02, 0.01, -0.015];
        cell.ini_equilibrium(1.0, &u0);

        let (rho_bar, j) = get_rho_bar_j(cell.data());
        let pi_neq = compute_pi_neq(cell.data(), rho_bar, &j);
        for i_pi in 0..D3Q19::N {
            assert!(pi_neq[i_pi].abs() < 1e-5, "pi_neq[{i_pi}] = {}", pi_neq[i_pi]);
        }
    }

    #[test]
    fn test_pi_neq_detects_off_equilibrium() {
        let mut cell: Cell<f64, D2Q9> = Cell::new(Box::new(Bgk::new(1.0)));
        cell.ini_equilibrium(1.0, &[0.0; 3]);
        // 人为扰动一对相反方向，ρ̄ 与 j 保持不变时 Π^neq 应非零
        cell[2] += 1e-3;
        cell[6] += 1e-3;

        let (rho_bar, j) = get_rho_bar_j(cell.data());
        assert_relative_eq!(rho_bar, 2e-3, epsilon = 1e-15);
        assert_relative_eq!(j[0], 0.0, epsilon = 1e-15);

        let pi_neq = compute_pi_neq(cell.data(), rho_bar, &j);
        assert!(pi_neq[0].abs() > 1e-4); // xx 分量
    }
}
