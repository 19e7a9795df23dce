// crates/lk_physics/src/processor/reductive.rs

//! 归约处理器生成器
//!
//! 输出为全局标量（求和、最大值、范数）的算子走归约族：
//! 生成器持有一份统计量模板，函数对象在构造时订阅所需观测量；
//! 每次 `generate()` 产出的处理器携带一份全新的累加器，
//! 执行后在处理器上读取结果，不与其它执行共享状态。

use lk_foundation::Scalar;

use crate::descriptor::Descriptor;
use crate::engine::block::AtomicBlock3d;
use crate::geometry::Box3D;
use crate::processor::{BlockDomain, DataProcessor3d, ProcessorError};
use crate::statistics::BlockStatistics;

/// 归约处理函数对象
pub trait ReductiveProcessingFunctional3d<S: Scalar, D: Descriptor>: Send + Sync {
    /// 函数对象名称（诊断用）
    fn name(&self) -> &'static str;

    /// 在生成器的统计量模板上订阅观测量（构造时调用一次）
    fn subscribe(&mut self, _statistics: &mut BlockStatistics<S>) {}

    /// 在冻结的域上执行归约，样本写入 `statistics` 的累加缓冲
    fn process_box(
        &self,
        domain: Box3D,
        blocks: &mut [&mut AtomicBlock3d<S, D>],
        statistics: &mut BlockStatistics<S>,
    ) -> Result<(), ProcessorError>;

    /// 作用区域声明（默认体相）
    fn applies_to(&self) -> BlockDomain {
        BlockDomain::Bulk
    }

    /// 单位制变更时换算内嵌物理参数（默认无操作）
    fn rescale(&mut self, _x_dx_inv: f64, _x_dt: f64) {}

    /// 写入模式: 归约默认只读所有输入块
    fn modification_pattern(&self, is_written: &mut Vec<bool>) {
        for w in is_written.iter_mut() {
            *w = false;
        }
    }

    /// 沿某方向的空间延伸（默认纯本地）
    fn extent_along(&self, _direction: usize) -> i64 {
        0
    }

    /// 多态深拷贝
    fn clone_box(&self) -> Box<dyn ReductiveProcessingFunctional3d<S, D>>;
}

// ============================================================
// 盒状归约生成器
// ============================================================

/// 盒状归约数据处理器生成器
pub struct ReductiveBoxedDataProcessorGenerator3d<S: Scalar, D: Descriptor> {
    domain: Box3D,
    functional: Box<dyn ReductiveProcessingFunctional3d<S, D>>,
    statistics: BlockStatistics<S>,
}

impl<S: Scalar, D: Descriptor> ReductiveBoxedDataProcessorGenerator3d<S, D> {
    /// 以作用盒与函数对象创建；函数对象在此订阅其观测量
    pub fn new(
        domain: Box3D,
        mut functional: Box<dyn ReductiveProcessingFunctional3d<S, D>>,
    ) -> Self {
        let mut statistics = BlockStatistics::new();
        functional.subscribe(&mut statistics);
        Self {
            domain,
            functional,
            statistics,
        }
    }

    /// 当前作用盒
    pub fn domain(&self) -> Box3D {
        self.domain
    }

    /// 统计量模板只读句柄
    pub fn statistics(&self) -> &BlockStatistics<S> {
        &self.statistics
    }

    /// 统计量模板可变句柄
    pub fn statistics_mut(&mut self) -> &mut BlockStatistics<S> {
        &mut self.statistics
    }

    /// 平移作用域
    pub fn shift(&mut self, dx: i64, dy: i64, dz: i64) {
        self.domain = self.domain.shift(dx, dy, dz);
    }

    /// 作用域坐标放大
    pub fn multiply(&mut self, scale: i64) {
        self.domain = self.domain.multiply(scale);
    }

    /// 作用域坐标缩小
    pub fn divide(&mut self, scale: i64) {
        self.domain = self.domain.divide(scale);
    }

    /// 把作用域收窄到与 `sub_domain` 的交集，返回是否非空
    pub fn extract(&mut self, sub_domain: Box3D) -> bool {
        match self.domain.intersect(&sub_domain) {
            Some(intersection) => {
                self.domain = intersection;
                true
            }
            None => false,
        }
    }

    /// 作用区域声明
    pub fn applies_to(&self) -> BlockDomain {
        self.functional.applies_to()
    }

    /// 单位制变更时换算内嵌物理参数
    pub fn rescale(&mut self, x_dx_inv: f64, x_dt: f64) {
        self.functional.rescale(x_dx_inv, x_dt);
    }

    /// 写入模式
    pub fn modification_pattern(&self, is_written: &mut Vec<bool>) {
        self.functional.modification_pattern(is_written);
    }

    /// 冻结当前域，生成携带全新累加器的归约处理器
    pub fn generate(&self) -> ReductiveBoxedDataProcessor3d<S, D> {
        ReductiveBoxedDataProcessor3d {
            domain: self.domain,
            functional: self.functional.clone_box(),
            statistics: self.statistics.fresh(),
        }
    }
}

/// 盒状归约处理器（生成产物，域已冻结，自带累加器）
pub struct ReductiveBoxedDataProcessor3d<S: Scalar, D: Descriptor> {
    domain: Box3D,
    functional: Box<dyn ReductiveProcessingFunctional3d<S, D>>,
    statistics: BlockStatistics<S>,
}

impl<S: Scalar, D: Descriptor> ReductiveBoxedDataProcessor3d<S, D> {
    /// 执行归约并发布结果，返回统计量只读句柄
    pub fn execute(
        &mut self,
        blocks: &mut [&mut AtomicBlock3d<S, D>],
    ) -> Result<&BlockStatistics<S>, ProcessorError> {
        let Self {
            domain,
            functional,
            statistics,
        } = self;
        functional.process_box(*domain, blocks, statistics)?;
        statistics.evaluate();
        Ok(&self.statistics)
    }

    /// 统计量只读句柄
    pub fn statistics(&self) -> &BlockStatistics<S> {
        &self.statistics
    }

    /// 统计量可变句柄
    pub fn statistics_mut(&mut self) -> &mut BlockStatistics<S> {
        &mut self.statistics
    }
}

impl<S: Scalar, D: Descriptor> DataProcessor3d<S, D> for ReductiveBoxedDataProcessor3d<S, D> {
    fn process(&mut self, blocks: &mut [&mut AtomicBlock3d<S, D>]) -> Result<(), ProcessorError> {
        let Self {
            domain,
            functional,
            statistics,
        } = self;
        functional.process_box(*domain, blocks, statistics)
    }

    fn extent_along(&self, direction: usize) -> i64 {
        self.functional.extent_along(direction)
    }
}
