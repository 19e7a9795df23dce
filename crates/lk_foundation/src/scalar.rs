// crates/lk_foundation/src/scalar.rs

//! 统一标量类型抽象
//!
//! 提供编译期精度选择的唯一接口，支持数值算法在 f32 和 f64 之间零成本切换。
//!
//! # 设计原则
//!
//! 1. **单一职责**: 仅解决精度切换问题，不定义物理常量
//! 2. **零成本抽象**: `#[inline]` + 编译期单态化
//! 3. **密封 trait**: 只有 f32 和 f64 可以实现
//!
//! # 使用示例
//!
//! ```
//! use lk_foundation::Scalar;
//!
//! fn relaxation_factor<S: Scalar>(omega: S) -> S {
//!     S::ONE - omega
//! }
//!
//! let a = relaxation_factor(0.8f32);
//! let b = relaxation_factor(0.8f64);
//! ```

use std::fmt::{Debug, Display};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num_traits::{Float, FromPrimitive, NumAssign};

// 密封 trait，禁止外部实现
mod private {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// 统一标量类型约束
///
/// 所有数值计算必须使用此 trait 作为泛型边界。
///
/// # 架构约束
///
/// - **必须**: 作为泛型约束使用，如 `<S: Scalar>`
/// - **禁止**: 作为 trait 对象使用，如 `&dyn Scalar`
///
/// # 实现类型
///
/// - `f32`: 内存占用减半，适合超大网格
/// - `f64`: 高精度模式（默认）
pub trait Scalar:
    private::Sealed
    + Float
    + FromPrimitive
    + NumAssign
    + Copy
    + Clone
    + Debug
    + Display
    + Send
    + Sync
    + Sum
    + Default
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
{
    /// 零值: `0.0`
    const ZERO: Self;

    /// 单位值: `1.0`
    const ONE: Self;

    /// 二: `2.0`
    const TWO: Self;

    /// 一半: `0.5`
    const HALF: Self;

    /// 机器精度（Machine epsilon）
    const EPSILON: Self;

    /// 最小正值
    const MIN_POSITIVE: Self;

    /// 最大有限值
    const MAX: Self;

    /// 从 f64 配置值转换到运行时标量类型（f32 目标可能丢失精度）
    fn from_f64_lossless(v: f64) -> Self;

    /// 从 i32 转换（用于离散速度分量等小整数表）
    fn from_i32_lossless(v: i32) -> Self;

    /// 转换回 f64（用于输出或跨模块接口）
    fn to_f64(self) -> f64;

    /// 安全除法（防止除零）
    #[inline]
    fn safe_div(self, rhs: Self, fallback: Self) -> Self {
        if rhs.abs() < Self::MIN_POSITIVE {
            fallback
        } else {
            self / rhs
        }
    }

    /// 检查是否有限（非 NaN/Inf）
    #[inline]
    fn is_safe(self) -> bool {
        self.is_finite()
    }
}

// ============================================================================
// f32 实现
// ============================================================================

impl Scalar for f32 {
    const ZERO: f32 = 0.0;
    const ONE: f32 = 1.0;
    const TWO: f32 = 2.0;
    const HALF: f32 = 0.5;
    const EPSILON: f32 = f32::EPSILON;
    const MIN_POSITIVE: f32 = f32::MIN_POSITIVE;
    const MAX: f32 = f32::MAX;

    #[inline]
    fn from_f64_lossless(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn from_i32_lossless(v: i32) -> Self {
        v as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

// ============================================================================
// f64 实现
// ============================================================================

impl Scalar for f64 {
    const ZERO: f64 = 0.0;
    const ONE: f64 = 1.0;
    const TWO: f64 = 2.0;
    const HALF: f64 = 0.5;
    const EPSILON: f64 = f64::EPSILON;
    const MIN_POSITIVE: f64 = f64::MIN_POSITIVE;
    const MAX: f64 = f64::MAX;

    #[inline]
    fn from_f64_lossless(v: f64) -> Self {
        v
    }

    #[inline]
    fn from_i32_lossless(v: i32) -> Self {
        v as f64
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_constants() {
        assert_eq!(f32::ZERO, 0.0f32);
        assert_eq!(f64::ONE, 1.0f64);
        assert_eq!(f64::HALF, 0.5f64);
    }

    #[test]
    fn test_from_f64() {
        let v: f32 = Scalar::from_f64_lossless(3.14159265358979);
        assert!((v - 3.1415927).abs() < 1e-6);

        let v: f64 = Scalar::from_f64_lossless(3.14159265358979);
        assert!((v - 3.14159265358979).abs() < 1e-14);
    }

    #[test]
    fn test_safe_div() {
        let a: f64 = 1.0;
        assert_eq!(a.safe_div(0.0, 999.0), 999.0);
        assert!((a.safe_div(2.0, 999.0) - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_is_safe() {
        assert!(1.0f64.is_safe());
        assert!((-0.5f32).is_safe());
        assert!(!f64::NAN.is_safe());
        assert!(!f64::INFINITY.is_safe());
    }

    fn generic_function<S: Scalar>(x: S) -> S {
        x * S::TWO + S::ONE
    }

    #[test]
    fn test_generic_usage() {
        assert!((generic_function(1.0f32) - 3.0f32).abs() < 1e-6);
        assert!((generic_function(1.0f64) - 3.0f64).abs() < 1e-14);
    }
}
