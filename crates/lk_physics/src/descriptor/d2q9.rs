// crates/lk_physics/src/descriptor/d2q9.rs

//! D2Q9 速度集
//!
//! 二维九速格子，z 分量恒为零。索引 0 为静止速度，
//! 1..=4 为负半球（反向速度为 i+4）。

use lk_foundation::Scalar;

use super::Descriptor;

const C: [[i32; 3]; 9] = [
    [0, 0, 0],
    [-1, 1, 0],
    [-1, 0, 0],
    [-1, -1, 0],
    [0, -1, 0],
    [1, -1, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
];

const T: [f64; 9] = [
    4.0 / 9.0,
    1.0 / 36.0,
    1.0 / 9.0,
    1.0 / 36.0,
    1.0 / 9.0,
    1.0 / 36.0,
    1.0 / 9.0,
    1.0 / 36.0,
    1.0 / 9.0,
];

const OPPOSITE: [usize; 9] = [0, 5, 6, 7, 8, 1, 2, 3, 4];

/// 标准 D2Q9 描述符（无外部标量）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct D2Q9;

impl Descriptor for D2Q9 {
    const D: usize = 2;
    const Q: usize = 9;
    const N: usize = 3;
    const CS2: f64 = 1.0 / 3.0;
    const INV_CS2: f64 = 3.0;
    const C: &'static [[i32; 3]] = &C;
    const T: &'static [f64] = &T;
    const OPPOSITE: &'static [usize] = &OPPOSITE;
    const NUM_SCALARS: usize = 0;
    const DENSITY_OFFSET: Option<usize> = None;
    const MOMENTUM_OFFSET: Option<usize> = None;
    const FORCE_OFFSET: Option<usize> = None;

    type Pops<S: Scalar> = [S; 9];
    type Ext<S: Scalar> = [S; 0];

    #[inline]
    fn zeroed_pops<S: Scalar>() -> [S; 9] {
        [S::ZERO; 9]
    }

    #[inline]
    fn zeroed_ext<S: Scalar>() -> [S; 0] {
        []
    }
}

/// 带体积力外部场的 D2Q9 描述符
///
/// 外部标量区: `[Fx, Fy]`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForcedD2Q9;

impl Descriptor for ForcedD2Q9 {
    const D: usize = 2;
    const Q: usize = 9;
    const N: usize = 3;
    const CS2: f64 = 1.0 / 3.0;
    const INV_CS2: f64 = 3.0;
    const C: &'static [[i32; 3]] = &C;
    const T: &'static [f64] = &T;
    const OPPOSITE: &'static [usize] = &OPPOSITE;
    const NUM_SCALARS: usize = 2;
    const DENSITY_OFFSET: Option<usize> = None;
    const MOMENTUM_OFFSET: Option<usize> = None;
    const FORCE_OFFSET: Option<usize> = Some(0);

    type Pops<S: Scalar> = [S; 9];
    type Ext<S: Scalar> = [S; 2];

    #[inline]
    fn zeroed_pops<S: Scalar>() -> [S; 9] {
        [S::ZERO; 9]
    }

    #[inline]
    fn zeroed_ext<S: Scalar>() -> [S; 2] {
        [S::ZERO; 2]
    }
}
