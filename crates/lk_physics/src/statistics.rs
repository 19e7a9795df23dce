// crates/lk_physics/src/statistics.rs

//! 块级统计量
//!
//! [`BlockStatistics`] 维护一个时间步内逐单元收集的标量观测量。
//! 固有观测量为平均约化密度、平均速度平方与最大速度平方；
//! 归约型数据处理器可另行订阅额外的平均 / 求和 / 最大值观测量。
//!
//! # 发布边界
//!
//! 累加缓冲与已发布值显式分离为双缓冲：步内 `gather_*` 写入累加缓冲，
//! 步末 [`evaluate`](BlockStatistics::evaluate) 将其发布并清零。
//! 步内读取（如常密度动力学读 `avRhoBar`）只会看到**上一步**发布的值，
//! 不会观察到半更新状态。
//!
//! # 分区归并
//!
//! [`merge`](BlockStatistics::merge) 合并两个分区的累加缓冲，
//! 满足结合律与交换律，供并行碰撞的逐分区累加器归并使用。

use lk_foundation::{KahanSum, LkError, LkResult, Scalar};

/// 固有观测量: 平均约化密度 ρ̄
pub const AV_RHO_BAR: usize = 0;

/// 固有观测量: 平均速度平方 u²
pub const AV_U_SQR: usize = 1;

/// 固有观测量: 最大速度平方 u²
pub const MAX_U_SQR: usize = 0;

/// 块级统计量累加器
#[derive(Debug, Clone)]
pub struct BlockStatistics<S: Scalar> {
    // 累加缓冲（当前步）
    average_running: Vec<KahanSum<S>>,
    sum_running: Vec<KahanSum<S>>,
    max_running: Vec<S>,
    num_cells_running: u64,

    // 已发布值（上一步）
    average_published: Vec<S>,
    sum_published: Vec<S>,
    max_published: Vec<S>,
    num_cells_published: u64,
}

impl<S: Scalar> Default for BlockStatistics<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scalar> BlockStatistics<S> {
    /// 创建统计量对象，并订阅固有观测量
    pub fn new() -> Self {
        let mut stats = Self {
            average_running: Vec::new(),
            sum_running: Vec::new(),
            max_running: Vec::new(),
            num_cells_running: 0,
            average_published: Vec::new(),
            sum_published: Vec::new(),
            max_published: Vec::new(),
            num_cells_published: 0,
        };
        let av_rho_bar = stats.subscribe_average();
        let av_u_sqr = stats.subscribe_average();
        let max_u_sqr = stats.subscribe_max();
        debug_assert_eq!(av_rho_bar, AV_RHO_BAR);
        debug_assert_eq!(av_u_sqr, AV_U_SQR);
        debug_assert_eq!(max_u_sqr, MAX_U_SQR);
        stats
    }

    // ========== 订阅 ==========

    /// 订阅一个平均值观测量，返回其索引
    pub fn subscribe_average(&mut self) -> usize {
        self.average_running.push(KahanSum::new());
        self.average_published.push(S::ZERO);
        self.average_running.len() - 1
    }

    /// 订阅一个求和观测量，返回其索引
    pub fn subscribe_sum(&mut self) -> usize {
        self.sum_running.push(KahanSum::new());
        self.sum_published.push(S::ZERO);
        self.sum_running.len() - 1
    }

    /// 订阅一个最大值观测量，返回其索引
    ///
    /// 观测量约定为非负（速度平方、范数等），累加缓冲以零初始化。
    pub fn subscribe_max(&mut self) -> usize {
        self.max_running.push(S::ZERO);
        self.max_published.push(S::ZERO);
        self.max_running.len() - 1
    }

    // ========== 收集 ==========

    /// 向平均值观测量累加一个样本；非有限样本被忽略
    #[inline]
    pub fn gather_average(&mut self, which: usize, value: S) {
        if value.is_safe() {
            self.average_running[which].add(value);
        }
    }

    /// 向求和观测量累加一个样本；非有限样本被忽略
    #[inline]
    pub fn gather_sum(&mut self, which: usize, value: S) {
        if value.is_safe() {
            self.sum_running[which].add(value);
        }
    }

    /// 向最大值观测量提交一个样本
    #[inline]
    pub fn gather_max(&mut self, which: usize, value: S) {
        if value > self.max_running[which] {
            self.max_running[which] = value;
        }
    }

    /// 记录一个参与统计的单元
    #[inline]
    pub fn increment_stats(&mut self) {
        self.num_cells_running += 1;
    }

    /// 碰撞算子的标准收集入口: ρ̄ 与 u² 各记一个样本
    #[inline]
    pub fn gather_statistics(&mut self, rho_bar: S, u_sqr: S) {
        self.gather_average(AV_RHO_BAR, rho_bar);
        self.gather_average(AV_U_SQR, u_sqr);
        self.gather_max(MAX_U_SQR, u_sqr);
        self.increment_stats();
    }

    // ========== 发布与读取 ==========

    /// 发布当前步累加结果并清零累加缓冲
    pub fn evaluate(&mut self) {
        let n = self.num_cells_running;
        let inv_n = if n == 0 {
            S::ZERO
        } else {
            S::ONE / S::from_f64_lossless(n as f64)
        };
        for (pub_v, run_v) in self
            .average_published
            .iter_mut()
            .zip(self.average_running.iter_mut())
        {
            *pub_v = run_v.value() * inv_n;
            run_v.reset();
        }
        for (pub_v, run_v) in self
            .sum_published
            .iter_mut()
            .zip(self.sum_running.iter_mut())
        {
            *pub_v = run_v.value();
            run_v.reset();
        }
        for (pub_v, run_v) in self
            .max_published
            .iter_mut()
            .zip(self.max_running.iter_mut())
        {
            *pub_v = *run_v;
            *run_v = S::ZERO;
        }
        self.num_cells_published = n;
        self.num_cells_running = 0;
    }

    /// 读取上一步发布的平均值
    #[inline]
    pub fn get_average(&self, which: usize) -> S {
        self.average_published[which]
    }

    /// 读取上一步发布的求和值
    #[inline]
    pub fn get_sum(&self, which: usize) -> S {
        self.sum_published[which]
    }

    /// 读取上一步发布的最大值
    #[inline]
    pub fn get_max(&self, which: usize) -> S {
        self.max_published[which]
    }

    /// 上一步参与统计的单元数
    #[inline]
    pub fn num_cells(&self) -> u64 {
        self.num_cells_published
    }

    /// 复制订阅表，得到一个累加缓冲与发布值全零的新对象
    ///
    /// 供并行碰撞创建线程本地累加器。
    pub fn fresh(&self) -> Self {
        Self {
            average_running: vec![KahanSum::new(); self.average_running.len()],
            sum_running: vec![KahanSum::new(); self.sum_running.len()],
            max_running: vec![S::ZERO; self.max_running.len()],
            num_cells_running: 0,
            average_published: vec![S::ZERO; self.average_published.len()],
            sum_published: vec![S::ZERO; self.sum_published.len()],
            max_published: vec![S::ZERO; self.max_published.len()],
            num_cells_published: 0,
        }
    }

    // ========== 分区归并 ==========

    /// 合并另一分区的累加缓冲（不触碰已发布值）
    ///
    /// 两个对象必须订阅了相同的观测量表。
    pub fn merge(&mut self, other: &Self) -> LkResult<()> {
        LkError::check_size(
            "average observables",
            self.average_running.len(),
            other.average_running.len(),
        )?;
        LkError::check_size(
            "sum observables",
            self.sum_running.len(),
            other.sum_running.len(),
        )?;
        LkError::check_size(
            "max observables",
            self.max_running.len(),
            other.max_running.len(),
        )?;

        for (a, b) in self
            .average_running
            .iter_mut()
            .zip(other.average_running.iter())
        {
            a.merge(b);
        }
        for (a, b) in self.sum_running.iter_mut().zip(other.sum_running.iter()) {
            a.merge(b);
        }
        for (a, b) in self.max_running.iter_mut().zip(other.max_running.iter()) {
            if *b > *a {
                *a = *b;
            }
        }
        self.num_cells_running += other.num_cells_running;
        Ok(())
    }
}
