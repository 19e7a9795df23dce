// crates/lk_physics/src/processor/generator.rs

//! 非归约处理器生成器
//!
//! 盒状与点状两种域形状，共享同一套变换词汇。
//! `extract(sub)` 把生成器的域收窄到与 `sub` 的交集并返回是否非空；
//! 返回 `false` 表示域为空（非致命），调用方必须跳过生成。

use lk_foundation::Scalar;

use crate::descriptor::Descriptor;
use crate::engine::block::AtomicBlock3d;
use crate::geometry::{Box3D, DotList3D};
use crate::processor::{BlockDomain, DataProcessor3d, ProcessorError};

// ============================================================
// 函数对象接口
// ============================================================

/// 盒状处理函数对象
///
/// 实现实际的非本地计算；生成器负责域的裁剪与冻结。
pub trait ProcessingFunctional3d<S: Scalar, D: Descriptor>: Send + Sync {
    /// 函数对象名称（诊断用）
    fn name(&self) -> &'static str;

    /// 在冻结的域上对块元组执行计算
    fn process_box(
        &self,
        domain: Box3D,
        blocks: &mut [&mut AtomicBlock3d<S, D>],
    ) -> Result<(), ProcessorError>;

    /// 作用区域声明（默认体相）
    fn applies_to(&self) -> BlockDomain {
        BlockDomain::Bulk
    }

    /// 单位制变更时换算内嵌物理参数（默认无操作）
    fn rescale(&mut self, _x_dx_inv: f64, _x_dt: f64) {}

    /// 写入模式: 对每个输入块报告是否会被写入（默认全部写入）
    ///
    /// 调用方按块元组长度预置 `is_written`。
    fn modification_pattern(&self, is_written: &mut Vec<bool>) {
        for w in is_written.iter_mut() {
            *w = true;
        }
    }

    /// 沿某方向的空间延伸（默认纯本地）
    fn extent_along(&self, _direction: usize) -> i64 {
        0
    }

    /// 多态深拷贝
    fn clone_box(&self) -> Box<dyn ProcessingFunctional3d<S, D>>;
}

/// 点状处理函数对象
pub trait DotProcessingFunctional3d<S: Scalar, D: Descriptor>: Send + Sync {
    /// 函数对象名称（诊断用）
    fn name(&self) -> &'static str;

    /// 在冻结的点列上对块元组执行计算
    fn process_dots(
        &self,
        dots: &DotList3D,
        blocks: &mut [&mut AtomicBlock3d<S, D>],
    ) -> Result<(), ProcessorError>;

    /// 作用区域声明（默认体相）
    fn applies_to(&self) -> BlockDomain {
        BlockDomain::Bulk
    }

    /// 单位制变更时换算内嵌物理参数（默认无操作）
    fn rescale(&mut self, _x_dx_inv: f64, _x_dt: f64) {}

    /// 写入模式（默认全部写入）
    fn modification_pattern(&self, is_written: &mut Vec<bool>) {
        for w in is_written.iter_mut() {
            *w = true;
        }
    }

    /// 沿某方向的空间延伸（默认纯本地）
    fn extent_along(&self, _direction: usize) -> i64 {
        0
    }

    /// 多态深拷贝
    fn clone_box(&self) -> Box<dyn DotProcessingFunctional3d<S, D>>;
}

// ============================================================
// 生成器接口
// ============================================================

/// 数据处理器生成器
///
/// 处理器模板：携带可变换的作用域，`generate()` 冻结当前域并产出
/// 可执行处理器。同一生成器可多次生成。
pub trait DataProcessorGenerator3d<S: Scalar, D: Descriptor> {
    /// 平移作用域
    fn shift(&mut self, dx: i64, dy: i64, dz: i64);

    /// 作用域坐标放大 `scale` 倍
    fn multiply(&mut self, scale: i64);

    /// 作用域坐标缩小 `scale` 倍
    fn divide(&mut self, scale: i64);

    /// 把作用域收窄到与 `sub_domain` 的交集，返回是否非空
    fn extract(&mut self, sub_domain: Box3D) -> bool;

    /// 冻结当前域，生成可执行处理器
    fn generate(&self) -> Box<dyn DataProcessor3d<S, D>>;

    /// 作用区域声明
    fn applies_to(&self) -> BlockDomain;

    /// 单位制变更时换算内嵌物理参数
    fn rescale(&mut self, x_dx_inv: f64, x_dt: f64);

    /// 写入模式
    fn modification_pattern(&self, is_written: &mut Vec<bool>);

    /// 多态深拷贝
    fn clone_box(&self) -> Box<dyn DataProcessorGenerator3d<S, D>>;
}

// ============================================================
// 盒状生成器
// ============================================================

/// 盒状数据处理器生成器
pub struct BoxedDataProcessorGenerator3d<S: Scalar, D: Descriptor> {
    domain: Box3D,
    functional: Box<dyn ProcessingFunctional3d<S, D>>,
}

impl<S: Scalar, D: Descriptor> BoxedDataProcessorGenerator3d<S, D> {
    /// 以作用盒与函数对象创建
    pub fn new(domain: Box3D, functional: Box<dyn ProcessingFunctional3d<S, D>>) -> Self {
        Self { domain, functional }
    }

    /// 当前作用盒
    pub fn domain(&self) -> Box3D {
        self.domain
    }
}

/// 盒状处理器（生成产物，域已冻结）
pub struct BoxedDataProcessor3d<S: Scalar, D: Descriptor> {
    domain: Box3D,
    functional: Box<dyn ProcessingFunctional3d<S, D>>,
}

impl<S: Scalar, D: Descriptor> DataProcessor3d<S, D> for BoxedDataProcessor3d<S, D> {
    fn process(&mut self, blocks: &mut [&mut AtomicBlock3d<S, D>]) -> Result<(), ProcessorError> {
        self.functional.process_box(self.domain, blocks)
    }

    fn extent_along(&self, direction: usize) -> i64 {
        self.functional.extent_along(direction)
    }
}

impl<S: Scalar, D: Descriptor> DataProcessorGenerator3d<S, D>
    for BoxedDataProcessorGenerator3d<S, D>
{
    fn shift(&mut self, dx: i64, dy: i64, dz: i64) {
        self.domain = self.domain.shift(dx, dy, dz);
    }

    fn multiply(&mut self, scale: i64) {
        self.domain = self.domain.multiply(scale);
    }

    fn divide(&mut self, scale: i64) {
        self.domain = self.domain.divide(scale);
    }

    fn extract(&mut self, sub_domain: Box3D) -> bool {
        match self.domain.intersect(&sub_domain) {
            Some(intersection) => {
                self.domain = intersection;
                true
            }
            None => false,
        }
    }

    fn generate(&self) -> Box<dyn DataProcessor3d<S, D>> {
        Box::new(BoxedDataProcessor3d {
            domain: self.domain,
            functional: self.functional.clone_box(),
        })
    }

    fn applies_to(&self) -> BlockDomain {
        self.functional.applies_to()
    }

    fn rescale(&mut self, x_dx_inv: f64, x_dt: f64) {
        self.functional.rescale(x_dx_inv, x_dt);
    }

    fn modification_pattern(&self, is_written: &mut Vec<bool>) {
        self.functional.modification_pattern(is_written);
    }

    fn clone_box(&self) -> Box<dyn DataProcessorGenerator3d<S, D>> {
        Box::new(Self {
            domain: self.domain,
            functional: self.functional.clone_box(),
        })
    }
}

// ============================================================
// 点状生成器
// ============================================================

/// 点状数据处理器生成器
pub struct DottedDataProcessorGenerator3d<S: Scalar, D: Descriptor> {
    dots: DotList3D,
    functional: Box<dyn DotProcessingFunctional3d<S, D>>,
}

impl<S: Scalar, D: Descriptor> DottedDataProcessorGenerator3d<S, D> {
    /// 以点列与函数对象创建
    pub fn new(dots: DotList3D, functional: Box<dyn DotProcessingFunctional3d<S, D>>) -> Self {
        Self { dots, functional }
    }

    /// 当前点列
    pub fn dots(&self) -> &DotList3D {
        &self.dots
    }
}

/// 点状处理器（生成产物，点列已冻结）
pub struct DottedDataProcessor3d<S: Scalar, D: Descriptor> {
    dots: DotList3D,
    functional: Box<dyn DotProcessingFunctional3d<S, D>>,
}

impl<S: Scalar, D: Descriptor> DataProcessor3d<S, D> for DottedDataProcessor3d<S, D> {
    fn process(&mut self, blocks: &mut [&mut AtomicBlock3d<S, D>]) -> Result<(), ProcessorError> {
        self.functional.process_dots(&self.dots, blocks)
    }

    fn extent_along(&self, direction: usize) -> i64 {
        self.functional.extent_along(direction)
    }
}

impl<S: Scalar, D: Descriptor> DataProcessorGenerator3d<S, D>
    for DottedDataProcessorGenerator3d<S, D>
{
    fn shift(&mut self, dx: i64, dy: i64, dz: i64) {
        self.dots = self.dots.shift(dx, dy, dz);
    }

    fn multiply(&mut self, scale: i64) {
        self.dots = self.dots.multiply(scale);
    }

    fn divide(&mut self, scale: i64) {
        self.dots = self.dots.divide(scale);
    }

    fn extract(&mut self, sub_domain: Box3D) -> bool {
        self.dots.extract(sub_domain)
    }

    fn generate(&self) -> Box<dyn DataProcessor3d<S, D>> {
        Box::new(DottedDataProcessor3d {
            dots: self.dots.clone(),
            functional: self.functional.clone_box(),
        })
    }

    fn applies_to(&self) -> BlockDomain {
        self.functional.applies_to()
    }

    fn rescale(&mut self, x_dx_inv: f64, x_dt: f64) {
        self.functional.rescale(x_dx_inv, x_dt);
    }

    fn modification_pattern(&self, is_written: &mut Vec<bool>) {
        self.functional.modification_pattern(is_written);
    }

    fn clone_box(&self) -> Box<dyn DataProcessorGenerator3d<S, D>> {
        Box::new(Self {
            dots: self.dots.clone(),
            functional: self.functional.clone_box(),
        })
    }
}
