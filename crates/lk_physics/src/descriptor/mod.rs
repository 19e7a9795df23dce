// crates/lk_physics/src/descriptor/mod.rs

//! 格子描述符
//!
//! 描述符以编译期常量的形式携带离散速度集的全部几何信息：
//! 空间维数 `D`、速度数 `Q`、权重表 `T`、速度表 `C`、声速平方及其倒数、
//! 反向索引表 `OPPOSITE`，以及单元外部标量区的布局。
//!
//! # 存储约定
//!
//! 单元内保存的是**移权分布** `f̄_i = f_i - t_i`（`SKORDOS_FACTOR = 1`），
//! 因此 `ρ̄ = Σ f̄_i = ρ - 1`，静止平衡态下所有分量为零。
//! 全部矩计算与平衡态公式均基于该约定。
//!
//! # 速度排序约定
//!
//! 索引 0 为静止速度；`1..=Q/2` 为"负半球"，其反向速度为 `i + Q/2`。
//! 阶 1 重组与正则化利用该配对关系将循环减半。

use std::fmt::Debug;

use lk_foundation::Scalar;

pub mod d2q9;
pub mod d3q19;
pub mod d3q27;

pub use d2q9::{D2Q9, ForcedD2Q9};
pub use d3q19::{D3Q19, ForcedD3Q19, MomentD3Q19};
pub use d3q27::D3Q27;

/// 格子描述符接口
///
/// 运行期无状态；实现者为零尺寸类型，所有数据为编译期常量。
/// 2 维格子的速度表 z 分量恒为零，从而所有核心代码统一按 3 维编写。
pub trait Descriptor: Copy + Clone + Debug + Default + Send + Sync + 'static {
    /// 空间维数（2 或 3）
    const D: usize;

    /// 离散速度数
    const Q: usize;

    /// 对称二阶矩独立分量数: `D*(D+1)/2`
    const N: usize;

    /// 格子声速平方
    const CS2: f64;

    /// 格子声速平方的倒数
    const INV_CS2: f64;

    /// 移权存储约定因子（1 = 存储 `f - t`）
    const SKORDOS_FACTOR: f64 = 1.0;

    /// 离散速度表，分量取值 {-1, 0, 1}；2 维格子 z 分量为 0
    const C: &'static [[i32; 3]];

    /// 权重表
    const T: &'static [f64];

    /// 反向速度索引表: `C[OPPOSITE[i]] == -C[i]`
    const OPPOSITE: &'static [usize];

    /// 外部标量区长度
    const NUM_SCALARS: usize;

    /// 外部密度标量偏移（外部矩动力学使用）
    const DENSITY_OFFSET: Option<usize>;

    /// 外部动量向量偏移（占 `D` 个标量）
    const MOMENTUM_OFFSET: Option<usize>;

    /// 外部体积力向量偏移（占 `D` 个标量）
    const FORCE_OFFSET: Option<usize>;

    /// 分布数组存储类型: `[S; Q]`
    type Pops<S: Scalar>: Copy + Clone + Debug + Send + Sync + AsRef<[S]> + AsMut<[S]>;

    /// 外部标量区存储类型: `[S; NUM_SCALARS]`
    type Ext<S: Scalar>: Copy + Clone + Debug + Send + Sync + AsRef<[S]> + AsMut<[S]>;

    /// 全零分布数组
    fn zeroed_pops<S: Scalar>() -> Self::Pops<S>;

    /// 全零外部标量区
    fn zeroed_ext<S: Scalar>() -> Self::Ext<S>;

    /// `1 / (1 + ρ̄)`
    ///
    /// 退化密度 (ρ → 0) 走安全除法，返回 0：真空单元对矩不产生贡献。
    #[inline]
    fn inv_rho<S: Scalar>(rho_bar: S) -> S {
        S::ONE.safe_div(S::ONE + rho_bar, S::ZERO)
    }

    /// `ρ = 1 + ρ̄`
    #[inline]
    fn full_rho<S: Scalar>(rho_bar: S) -> S {
        S::ONE + rho_bar
    }

    /// `ρ̄ = ρ - 1`
    #[inline]
    fn rho_bar<S: Scalar>(rho: S) -> S {
        rho - S::ONE
    }

    /// 权重（转换到运行标量）
    #[inline]
    fn t<S: Scalar>(i_pop: usize) -> S {
        S::from_f64_lossless(Self::T[i_pop])
    }

    /// 声速平方（转换到运行标量）
    #[inline]
    fn cs2<S: Scalar>() -> S {
        S::from_f64_lossless(Self::CS2)
    }

    /// 声速平方倒数（转换到运行标量）
    #[inline]
    fn inv_cs2<S: Scalar>() -> S {
        S::from_f64_lossless(Self::INV_CS2)
    }
}

/// 离散速度与向量的点积
///
/// 速度分量只取 {-1, 0, 1}，用分支代替浮点转换与乘法。
#[inline]
pub fn c_dot<S: Scalar>(c: &[i32; 3], v: &[S; 3]) -> S {
    let mut acc = S::ZERO;
    for (ci, vi) in c.iter().zip(v.iter()) {
        match ci {
            1 => acc += *vi,
            -1 => acc -= *vi,
            _ => {}
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_tables<D: Descriptor>() {
        assert_eq!(D::C.len(), D::Q);
        assert_eq!(D::T.len(), D::Q);
        assert_eq!(D::OPPOSITE.len(), D::Q);
        assert_eq!(D::N, D::D * (D::D + 1) / 2);

        // 权重归一
        let sum: f64 = D::T.iter().sum();
        assert!((sum - 1.0).abs() < 1e-14, "权重和 = {sum}");

        // 速度一阶矩为零
        for axis in 0..3 {
            let m1: i64 = D::C
                .iter()
                .zip(D::T.iter())
                .map(|(c, _)| c[axis] as i64)
                .sum();
            assert_eq!(m1, 0);
        }

        // 二阶矩: Σ t_i c_iα c_iβ = cs2 δ_αβ
        for a in 0..D::D {
            for b in 0..D::D {
                let m2: f64 = D::C
                    .iter()
                    .zip(D::T.iter())
                    .map(|(c, t)| t * (c[a] * c[b]) as f64)
                    .sum();
                let expected = if a == b { D::CS2 } else { 0.0 };
                assert!((m2 - expected).abs() < 1e-14, "m2[{a}][{b}] = {m2}");
            }
        }

        // 反向表自洽
        for i in 0..D::Q {
            let opp = D::OPPOSITE[i];
            assert_eq!(D::OPPOSITE[opp], i);
            for axis in 0..3 {
                assert_eq!(D::C[opp][axis], -D::C[i][axis]);
            }
        }

        // 配对排序: opp(i) = i + Q/2 (1 <= i <= Q/2)
        for i in 1..=D::Q / 2 {
            assert_eq!(D::OPPOSITE[i], i + D::Q / 2);
        }
    }

    #[test]
    fn test_d2q9_tables() {
        check_tables::<D2Q9>();
    }

    #[test]
    fn test_d3q19_tables() {
        check_tables::<D3Q19>();
    }

    #[test]
    fn test_d3q27_tables() {
        check_tables::<D3Q27>();
    }

    #[test]
    fn test_external_layouts() {
        assert_eq!(D2Q9::NUM_SCALARS, 0);
        assert_eq!(ForcedD2Q9::NUM_SCALARS, 2);
        assert_eq!(ForcedD2Q9::FORCE_OFFSET, Some(0));
        assert_eq!(ForcedD3Q19::NUM_SCALARS, 3);
        assert_eq!(MomentD3Q19::DENSITY_OFFSET, Some(0));
        assert_eq!(MomentD3Q19::MOMENTUM_OFFSET, Some(1));
    }

    #[test]
    fn test_rho_helpers() {
        let rho_bar = 0.25f64;
        assert!((D3Q19::full_rho(rho_bar) - 1.25).abs() < 1e-15);
        assert!((D3Q19::inv_rho(rho_bar) - 0.8).abs() < 1e-15);
        assert!((D3Q19::rho_bar(1.25f64) - 0.25).abs() < 1e-15);

        // 真空单元: ρ = 0 时安全除法回退到 0 而非 Inf
        assert_eq!(D3Q19::inv_rho(-1.0f64), 0.0);
    }

    #[test]
    fn test_c_dot() {
        let v = [1.0f64, 2.0, 3.0];
        assert_eq!(c_dot(&[1, -1, 0], &v), -1.0);
        assert_eq!(c_dot(&[0, 0, 0], &v), 0.0);
        assert_eq!(c_dot(&[-1, -1, -1], &v), -6.0);
    }
}
