// crates/lk_physics/src/descriptor/d3q19.rs

//! D3Q19 速度集
//!
//! 三维十九速格子。索引 0 为静止速度，1..=9 为负半球（反向速度为 i+9）。

use lk_foundation::Scalar;

use super::Descriptor;

const C: [[i32; 3]; 19] = [
    [0, 0, 0],
    [-1, 0, 0],
    [0, -1, 0],
    [0, 0, -1],
    [-1, -1, 0],
    [-1, 1, 0],
    [-1, 0, -1],
    [-1, 0, 1],
    [0, -1, -1],
    [0, -1, 1],
    [1, 0, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 1, 0],
    [1, -1, 0],
    [1, 0, 1],
    [1, 0, -1],
    [0, 1, 1],
    [0, 1, -1],
];

const T: [f64; 19] = [
    1.0 / 3.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
];

const OPPOSITE: [usize; 19] = [
    0, 10, 11, 12, 13, 14, 15, 16, 17, 18, 1, 2, 3, 4, 5, 6, 7, 8, 9,
];

/// 标准 D3Q19 描述符（无外部标量）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct D3Q19;

impl Descriptor for D3Q19 {
    const D: usize = 3;
    const Q: usize = 19;
    const N: usize = 6;
    const CS2: f64 = 1.0 / 3.0;
    const INV_CS2: f64 = 3.0;
    const C: &'static [[i32; 3]] = &C;
    const T: &'static [f64] = &T;
    const OPPOSITE: &'static [usize] = &OPPOSITE;
    const NUM_SCALARS: usize = 0;
    const DENSITY_OFFSET: Option<usize> = None;
    const MOMENTUM_OFFSET: Option<usize> = None;
    const FORCE_OFFSET: Option<usize> = None;

    type Pops<S: Scalar> = [S; 19];
    type Ext<S: Scalar> = [S; 0];

    #[inline]
    fn zeroed_pops<S: Scalar>() -> [S; 19] {
        [S::ZERO; 19]
    }

    #[inline]
    fn zeroed_ext<S: Scalar>() -> [S; 0] {
        []
    }
}

/// 带体积力外部场的 D3Q19 描述符
///
/// 外部标量区: `[Fx, Fy, Fz]`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForcedD3Q19;

impl Descriptor for ForcedD3Q19 {
    const D: usize = 3;
    const Q: usize = 19;
    const N: usize = 6;
    const CS2: f64 = 1.0 / 3.0;
    const INV_CS2: f64 = 3.0;
    const C: &'static [[i32; 3]] = &C;
    const T: &'static [f64] = &T;
    const OPPOSITE: &'static [usize] = &OPPOSITE;
    const NUM_SCALARS: usize = 3;
    const DENSITY_OFFSET: Option<usize> = None;
    const MOMENTUM_OFFSET: Option<usize> = None;
    const FORCE_OFFSET: Option<usize> = Some(0);

    type Pops<S: Scalar> = [S; 19];
    type Ext<S: Scalar> = [S; 3];

    #[inline]
    fn zeroed_pops<S: Scalar>() -> [S; 19] {
        [S::ZERO; 19]
    }

    #[inline]
    fn zeroed_ext<S: Scalar>() -> [S; 3] {
        [S::ZERO; 3]
    }
}

/// 带外部矩的 D3Q19 描述符
///
/// 外部标量区: `[ρ, jx, jy, jz]`，供外部耦合直接提供矩的动力学使用。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MomentD3Q19;

impl Descriptor for MomentD3Q19 {
    const D: usize = 3;
    const Q: usize = 19;
    const N: usize = 6;
    const CS2: f64 = 1.0 / 3.0;
    const INV_CS2: f64 = 3.0;
    const C: &'static [[i32; 3]] = &C;
    const T: &'static [f64] = &T;
    const OPPOSITE: &'static [usize] = &OPPOSITE;
    const NUM_SCALARS: usize = 4;
    const DENSITY_OFFSET: Option<usize> = Some(0);
    const MOMENTUM_OFFSET: Option<usize> = Some(1);
    const FORCE_OFFSET: Option<usize> = None;

    type Pops<S: Scalar> = [S; 19];
    type Ext<S: Scalar> = [S; 4];

    #[inline]
    fn zeroed_pops<S: Scalar>() -> [S; 19] {
        [S::ZERO; 19]
    }

    #[inline]
    fn zeroed_ext<S: Scalar>() -> [S; 4] {
        [S::ZERO; 4]
    }
}
