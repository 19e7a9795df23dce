// crates/lk_physics/src/dynamics/templates.rs

//! 碰撞与平衡态数值核
//!
//! 与具体动力学类型解耦的逐单元数值核。全部基于移权存储约定，
//! 离散速度分量只取 {-1, 0, 1}，点积与幂运算用分支代替浮点转换。

use lk_foundation::Scalar;

use crate::cell::CellData;
use crate::descriptor::{c_dot, Descriptor};
use crate::moments;

/// 二阶 Maxwell 展开平衡态（移权形式）
///
/// `f̄^eq_i = t_i (ρ̄ + c_i·j/cs² + (1/(2ρ cs⁴))((c_i·j)² - cs² j²))`
///
/// 不可压变体通过传入 `inv_rho = 1` 复用本函数。
#[inline]
pub fn bgk_ma2_equilibrium<S: Scalar, D: Descriptor>(
    i_pop: usize,
    rho_bar: S,
    inv_rho: S,
    j: &[S; 3],
    j_sqr: S,
) -> S {
    let inv_cs2 = D::inv_cs2::<S>();
    let c_j = c_dot(&D::C[i_pop], j);
    D::t::<S>(i_pop)
        * (rho_bar + inv_cs2 * c_j + inv_cs2 * S::HALF * inv_rho * (inv_cs2 * c_j * c_j - j_sqr))
}

/// BGK 碰撞: `f̄ ← (1-ω) f̄ + ω f̄^eq`，返回 u²
pub fn bgk_ma2_collision<S: Scalar, D: Descriptor>(
    cell: &mut CellData<S, D>,
    rho_bar: S,
    j: &[S; 3],
    omega: S,
) -> S {
    let inv_rho = D::inv_rho(rho_bar);
    let j_sqr = moments::norm_sqr(j);
    for i_pop in 0..D::Q {
        cell[i_pop] *= S::ONE - omega;
        cell[i_pop] += omega * bgk_ma2_equilibrium::<S, D>(i_pop, rho_bar, inv_rho, j, j_sqr);
    }
    j_sqr * inv_rho * inv_rho
}

/// 不可压 BGK 碰撞: O(Ma²) 项中 `1/ρ` 取 1，返回 j²
pub fn bgk_inc_collision<S: Scalar, D: Descriptor>(
    cell: &mut CellData<S, D>,
    rho_bar: S,
    j: &[S; 3],
    omega: S,
) -> S {
    let inv_rho = S::ONE;
    let j_sqr = moments::norm_sqr(j);
    for i_pop in 0..D::Q {
        cell[i_pop] *= S::ONE - omega;
        cell[i_pop] += omega * bgk_ma2_equilibrium::<S, D>(i_pop, rho_bar, inv_rho, j, j_sqr);
    }
    j_sqr
}

/// 常密度修正 BGK 碰撞
///
/// 平衡态（全分布形式）整体乘 `ratioRho`；移权约定下体现为
/// `f̄ ← ratioRho (f̄^eq + t) - t + (1-ω)(f̄ - f̄^eq)`。返回 u²。
pub fn bgk_ma2_const_rho_collision<S: Scalar, D: Descriptor>(
    cell: &mut CellData<S, D>,
    rho_bar: S,
    j: &[S; 3],
    ratio_rho: S,
    omega: S,
) -> S {
    let inv_rho = D::inv_rho(rho_bar);
    let j_sqr = moments::norm_sqr(j);
    for i_pop in 0..D::Q {
        let f_eq = bgk_ma2_equilibrium::<S, D>(i_pop, rho_bar, inv_rho, j, j_sqr);
        let t = D::t::<S>(i_pop);
        cell[i_pop] =
            ratio_rho * (f_eq + t) - t + (S::ONE - omega) * (cell[i_pop] - f_eq);
    }
    j_sqr * inv_rho * inv_rho
}

/// 由 Π^neq 重建第 `i_pop` 个方向的非平衡分布
///
/// `f^neq_i = (t_i/(2 cs⁴)) Σ_{αβ} (c_iα c_iβ - cs² δ_{αβ}) Π^neq_{αβ}`
///
/// 只遍历上三角，非对角元素按对称性计双倍。
#[inline]
pub fn from_pi_to_fneq<S: Scalar, D: Descriptor>(i_pop: usize, pi_neq: &[S; 6]) -> S {
    let cs2 = D::cs2::<S>();
    let inv_cs2 = D::inv_cs2::<S>();
    let c = &D::C[i_pop];

    let mut f_neq = S::ZERO;
    let mut i_pi = 0;
    for i_a in 0..D::D {
        for i_b in i_a..D::D {
            let coeff = if i_a == i_b {
                S::from_i32_lossless(c[i_a] * c[i_a]) - cs2
            } else {
                S::TWO * S::from_i32_lossless(c[i_a] * c[i_b])
            };
            f_neq += coeff * pi_neq[i_pi];
            i_pi += 1;
        }
    }
    f_neq * D::t::<S>(i_pop) * inv_cs2 * inv_cs2 * S::HALF
}

/// 正则化 BGK 碰撞
///
/// `f̄_i ← f̄^eq_i + (1-ω) f^neq_i(Π^neq)`，利用反向配对将循环减半。
/// 返回 u²。
pub fn rlb_collision<S: Scalar, D: Descriptor>(
    cell: &mut CellData<S, D>,
    rho_bar: S,
    j: &[S; 3],
    pi_neq: &[S; 6],
    omega: S,
) -> S {
    let inv_rho = D::inv_rho(rho_bar);
    let j_sqr = moments::norm_sqr(j);
    let one_minus_omega = S::ONE - omega;

    cell[0] = bgk_ma2_equilibrium::<S, D>(0, rho_bar, inv_rho, j, j_sqr)
        + one_minus_omega * from_pi_to_fneq::<S, D>(0, pi_neq);

    let half = D::Q / 2;
    for i_pop in 1..=half {
        cell[i_pop] = bgk_ma2_equilibrium::<S, D>(i_pop, rho_bar, inv_rho, j, j_sqr);
        cell[i_pop + half] =
            bgk_ma2_equilibrium::<S, D>(i_pop + half, rho_bar, inv_rho, j, j_sqr);
        let f_neq = one_minus_omega * from_pi_to_fneq::<S, D>(i_pop, pi_neq);
        cell[i_pop] += f_neq;
        cell[i_pop + half] += f_neq;
    }
    j_sqr * inv_rho * inv_rho
}

/// 熵稳定族的指数积形式平衡态（移权形式）
///
/// `f̄^eq_i = t_i (ρ Π_α (2-√(1+3u_α²)) ((2u_α+√(1+3u_α²))/(1-u_α))^{c_iα} - 1)`
pub fn entropic_equilibrium<S: Scalar, D: Descriptor>(i_pop: usize, rho: S, u: &[S; 3]) -> S {
    let three = S::from_f64_lossless(3.0);
    let mut prod = S::ONE;
    for i_d in 0..D::D {
        let u_d = u[i_d];
        let b = (S::ONE + three * u_d * u_d).sqrt();
        let base = (S::TWO * u_d + b) / (S::ONE - u_d);
        let pow_c = match D::C[i_pop][i_d] {
            1 => base,
            -1 => S::ONE / base,
            _ => S::ONE,
        };
        prod *= (S::TWO - b) * pow_c;
    }
    D::t::<S>(i_pop) * (rho * prod - S::from_f64_lossless(D::SKORDOS_FACTOR))
}

/// Guo 体积力项
///
/// `Δf_i = t_i (1 - A/2) [ (c_i - u)/cs² + (c_i·u) c_i/cs⁴ ]·F`
///
/// `amplitude` 为有效松弛率（普通强迫取 ω，熵稳定强迫取 ω_tot）。
pub fn add_guo_force<S: Scalar, D: Descriptor>(
    cell: &mut CellData<S, D>,
    u: &[S; 3],
    force: &[S; 3],
    amplitude: S,
) {
    let inv_cs2 = D::inv_cs2::<S>();
    let prefactor = S::ONE - amplitude * S::HALF;
    for i_pop in 0..D::Q {
        let c = &D::C[i_pop];
        let c_u = c_dot(c, u) * inv_cs2 * inv_cs2;
        let mut force_term = S::ZERO;
        for i_d in 0..D::D {
            force_term +=
                ((S::from_i32_lossless(c[i_d]) - u[i_d]) * inv_cs2 + c_u * S::from_i32_lossless(c[i_d]))
                    * force[i_d];
        }
        cell[i_pop] += force_term * D::t::<S>(i_pop) * prefactor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::descriptor::{D2Q9, D3Q19};
    use crate::dynamics::bgk::Bgk;
    use approx::assert_relative_eq;

    #[test]
    fn test_equilibrium_moments() {
        // 平衡态本身的矩: Σ f̄^eq = ρ̄, Σ f̄^eq c = j
        let rho_bar = 0.05f64;
        let j = [0.08, -0.02, 0.01];
        let j_sqr = moments::norm_sqr(&j);
        let inv_rho = D3Q19::inv_rho(rho_bar);

        let mut sum = 0.0;
        let mut mom = [0.0; 3];
        for i_pop in 0..D3Q19::Q {
            let f_eq = bgk_ma2_equilibrium::<f64, D3Q19>(i_pop, rho_bar, inv_rho, &j, j_sqr);
            sum += f_eq;
            for k in 0..3 {
                mom[k] += f_eq * D3Q19::C[i_pop][k] as f64;
            }
        }
        assert_relative_eq!(sum, rho_bar, epsilon = 1e-14);
        for k in 0..3 {
            assert_relative_eq!(mom[k], j[k], epsilon = 1e-14);
        }
    }

    #[test]
    fn test_from_pi_to_fneq_projects_back() {
        // 由 Π^neq 重建的 f^neq 的二阶矩应回到 Π^neq
        let pi_neq = [2e-4f64, -1e-4, 5e-5, 3e-4, -2e-5, 1e-4];
        let mut moment = [0.0f64; 6];
        for i_pop in 0..D3Q19::Q {
            let f_neq = from_pi_to_fneq::<f64, D3Q19>(i_pop, &pi_neq);
            let c = &D3Q19::C[i_pop];
            let mut i_pi = 0;
            for a in 0..3 {
                for b in a..3 {
                    moment[i_pi] += f_neq * (c[a] * c[b]) as f64;
                    i_pi += 1;
                }
            }
        }
        for i_pi in 0..6 {
            assert_relative_eq!(moment[i_pi], pi_neq[i_pi], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_entropic_equilibrium_reduces_to_weights_at_rest() {
        // u = 0: 乘积因子为 1，f̄^eq = t (ρ - 1)
        for i_pop in 0..D2Q9::Q {
            let f_eq = entropic_equilibrium::<f64, D2Q9>(i_pop, 1.0, &[0.0; 3]);
            assert_relative_eq!(f_eq, 0.0, epsilon = 1e-15);

            let f_eq = entropic_equilibrium::<f64, D2Q9>(i_pop, 1.2, &[0.0; 3]);
            assert_relative_eq!(f_eq, 0.2 * D2Q9::T[i_pop], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_entropic_equilibrium_mass() {
        // 张量积格子（权重按维度因子化）上指数积形式的质量精确:
        // Σ f̄^eq = ρ - 1
        use crate::descriptor::D3Q27;
        let rho = 1.05f64;
        let u = [0.06, -0.04, 0.02];
        let mut sum = 0.0;
        for i_pop in 0..D3Q27::Q {
            sum += entropic_equilibrium::<f64, D3Q27>(i_pop, rho, &u);
        }
        assert_relative_eq!(sum, rho - 1.0, epsilon = 1e-13);
    }

    #[test]
    fn test_guo_force_zeroth_moment() {
        // Guo 项的零阶矩为零（不改变质量）
        let mut cell: Cell<f64, D2Q9> = Cell::new(Box::new(Bgk::new(1.0)));
        let before: f64 = cell.data().f().iter().sum();
        add_guo_force::<f64, D2Q9>(
            cell.data_mut(),
            &[0.05, 0.01, 0.0],
            &[1e-5, -2e-5, 0.0],
            0.9,
        );
        let after: f64 = cell.data().f().iter().sum();
        assert_relative_eq!(after, before, epsilon = 1e-18);
    }

    #[test]
    fn test_guo_force_first_moment() {
        // Guo 项的一阶矩为 (1 - A/2) F
        let mut cell: Cell<f64, D2Q9> = Cell::new(Box::new(Bgk::new(1.0)));
        let force = [1e-5, -2e-5, 0.0];
        let amplitude = 0.8;
        add_guo_force::<f64, D2Q9>(cell.data_mut(), &[0.03, 0.02, 0.0], &force, amplitude);
        let (_, j) = moments::get_rho_bar_j(cell.data());
        for k in 0..2 {
            assert_relative_eq!(j[k], (1.0 - amplitude / 2.0) * force[k], epsilon = 1e-18);
        }
    }
}
