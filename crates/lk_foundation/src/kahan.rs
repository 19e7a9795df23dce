// crates/lk_foundation/src/kahan.rs

//! Kahan 补偿求和
//!
//! 长时间步进中统计量累加次数巨大，朴素求和的舍入误差会随单元数线性增长。
//! Kahan 算法将误差压到与累加次数无关的量级。

use crate::scalar::Scalar;

/// Kahan 求和器（泛型版）
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanSum<S: Scalar> {
    sum: S,
    compensation: S,
}

impl<S: Scalar> KahanSum<S> {
    /// 创建新的求和器
    pub fn new() -> Self {
        Self {
            sum: S::ZERO,
            compensation: S::ZERO,
        }
    }

    /// 添加一个值
    #[inline]
    pub fn add(&mut self, value: S) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    /// 合并另一个求和器（用于分区归并）
    #[inline]
    pub fn merge(&mut self, other: &Self) {
        self.add(other.sum);
        self.add(-other.compensation);
    }

    /// 获取当前求和值
    #[inline]
    pub fn value(&self) -> S {
        self.sum
    }

    /// 清零
    #[inline]
    pub fn reset(&mut self) {
        self.sum = S::ZERO;
        self.compensation = S::ZERO;
    }

    /// 从迭代器求和
    pub fn sum_iter<I: IntoIterator<Item = S>>(iter: I) -> S {
        let mut kahan = Self::new();
        for v in iter {
            kahan.add(v);
        }
        kahan.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kahan_basic() {
        let mut k = KahanSum::<f64>::new();
        k.add(1.0);
        k.add(2.0);
        k.add(3.0);
        assert_eq!(k.value(), 6.0);
    }

    #[test]
    fn test_kahan_compensation() {
        // 朴素求和会丢失小量，Kahan 不会
        let mut k = KahanSum::<f64>::new();
        k.add(1.0);
        for _ in 0..10 {
            k.add(1e-16);
        }
        assert!((k.value() - (1.0 + 10.0e-16)).abs() < 1e-18);
    }

    #[test]
    fn test_kahan_merge() {
        let mut a = KahanSum::<f64>::new();
        let mut b = KahanSum::<f64>::new();
        for i in 0..100 {
            a.add(i as f64 * 0.1);
            b.add(i as f64 * 0.2);
        }
        let mut merged = a;
        merged.merge(&b);

        let mut direct = KahanSum::<f64>::new();
        for i in 0..100 {
            direct.add(i as f64 * 0.1);
        }
        for i in 0..100 {
            direct.add(i as f64 * 0.2);
        }
        assert!((merged.value() - direct.value()).abs() < 1e-12);
    }

    #[test]
    fn test_sum_iter() {
        let v = vec![0.1f64; 10];
        let s = KahanSum::sum_iter(v);
        assert!((s - 1.0).abs() < 1e-15);
    }
}
