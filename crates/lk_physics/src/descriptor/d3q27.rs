// crates/lk_physics/src/descriptor/d3q27.rs

//! D3Q27 速度集
//!
//! 三维二十七速格子。索引 0 为静止速度，1..=13 为负半球（反向速度为 i+13）。

use lk_foundation::Scalar;

use super::Descriptor;

const C: [[i32; 3]; 27] = [
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
    [-1, -1, -1],
    [-1, -1, 1],
    [-1, 1, -1],
    [-1, 1, 1],
    [1, 0, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 1, 0],
    [1, -1, 0],
    [1, 0, 1],
    [1, 0, -1],
    [0, 1, 1],
    [0, 1, -1],
    [1, 1, 1],
    [1, 1, -1],
    [1, -1, 1],
    [1, -1, -1],
];

const W0: f64 = 8.0 / 27.0;
const W1: f64 = 2.0 / 27.0;
const W2: f64 = 1.0 / 54.0;
const W3: f64 = 1.0 / 216.0;

const T: [f64; 27] = [
    W0, W1, W1, W1, W2, W2, W2, W2, W2, W2, W3, W3, W3, W3, W1, W1, W1, W2, W2, W2, W2, W2, W2,
    W3, W3, W3, W3,
];

const OPPOSITE: [usize; 27] = [
    0, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12,
    13,
];

/// 标准 D3Q27 描述符（无外部标量）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct D3Q27;

impl Descriptor for D3Q27 {
    const D: usize = 3;
    const Q: usize = 27;
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

    type Pops<S: Scalar> = [S; 27];
    type Ext<S: Scalar> = [S; 0];

    #[inline]
    fn zeroed_pops<S: Scalar>() -> [S; 27] {
        [S::ZERO; 27]
    }

    #[inline]
    fn zeroed_ext<S: Scalar>() -> [S; 0] {
        []
    }
}
