// crates/lk_physics/src/processor/builtin.rs

//! 内建处理函数对象
//!
//! - [`SetConstantExternalForce`]: 在盒域内写常值体积力（场耦合写入示例）
//! - [`AverageDensityFunctional`]: 盒域平均密度归约

use lk_foundation::Scalar;

use crate::descriptor::Descriptor;
use crate::engine::block::AtomicBlock3d;
use crate::engine::lattice::BlockLatticeBase3d;
use crate::geometry::Box3D;
use crate::moments;
use crate::processor::generator::ProcessingFunctional3d;
use crate::processor::reductive::ReductiveProcessingFunctional3d;
use crate::processor::ProcessorError;
use crate::statistics::{BlockStatistics, AV_RHO_BAR};

// ============================================================
// SetConstantExternalForce
// ============================================================

/// 在盒域内把常值体积力写入单元外部标量区
///
/// 只作用于单个块；域超出块范围的部分被裁掉。
#[derive(Debug, Clone, Copy)]
pub struct SetConstantExternalForce<S: Scalar> {
    force: [S; 3],
}

impl<S: Scalar> SetConstantExternalForce<S> {
    /// 以给定力向量创建
    pub fn new(force: [S; 3]) -> Self {
        Self { force }
    }
}

impl<S: Scalar, D: Descriptor> ProcessingFunctional3d<S, D> for SetConstantExternalForce<S> {
    fn name(&self) -> &'static str {
        "SetConstantExternalForce"
    }

    fn process_box(
        &self,
        domain: Box3D,
        blocks: &mut [&mut AtomicBlock3d<S, D>],
    ) -> Result<(), ProcessorError> {
        if blocks.len() != 1 {
            return Err(ProcessorError::WrongBlockCount {
                expected: 1,
                actual: blocks.len(),
            });
        }
        let force_offset = match D::FORCE_OFFSET {
            Some(offset) => offset,
            None => return Ok(()),
        };
        let block = &mut *blocks[0];
        let domain = match domain.intersect(&block.full_box()) {
            Some(d) => d,
            None => return Ok(()),
        };
        for x in domain.x0..=domain.x1 {
            for y in domain.y0..=domain.y1 {
                for z in domain.z0..=domain.z1 {
                    let cell = block.get_mut(x, y, z);
                    for i_d in 0..D::D {
                        cell.data_mut().set_external(force_offset + i_d, self.force[i_d]);
                    }
                }
            }
        }
        Ok(())
    }

    fn rescale(&mut self, x_dx_inv: f64, x_dt: f64) {
        // 体积力是加速度量纲 dx/dt²: 速度因子 xDt·xDxInv 再乘一次 xDt
        let scale = S::from_f64_lossless(x_dt * x_dt * x_dx_inv);
        for f in self.force.iter_mut() {
            *f *= scale;
        }
    }

    fn clone_box(&self) -> Box<dyn ProcessingFunctional3d<S, D>> {
        Box::new(*self)
    }
}

// ============================================================
// AverageDensityFunctional
// ============================================================

/// 盒域平均约化密度归约
///
/// 结果通过固有观测量 `AV_RHO_BAR` 读出。
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageDensityFunctional;

impl AverageDensityFunctional {
    /// 创建归约函数对象
    pub fn new() -> Self {
        Self
    }
}

impl<S: Scalar, D: Descriptor> ReductiveProcessingFunctional3d<S, D>
    for AverageDensityFunctional
{
    fn name(&self) -> &'static str {
        "AverageDensity"
    }

    fn process_box(
        &self,
        domain: Box3D,
        blocks: &mut [&mut AtomicBlock3d<S, D>],
        statistics: &mut BlockStatistics<S>,
    ) -> Result<(), ProcessorError> {
        if blocks.len() != 1 {
            return Err(ProcessorError::WrongBlockCount {
                expected: 1,
                actual: blocks.len(),
            });
        }
        let block = &*blocks[0];
        let domain = match domain.intersect(&block.full_box()) {
            Some(d) => d,
            None => return Ok(()),
        };
        for x in domain.x0..=domain.x1 {
            for y in domain.y0..=domain.y1 {
                for z in domain.z0..=domain.z1 {
                    let (rho_bar, _) = moments::get_rho_bar_j(block.get(x, y, z).data());
                    statistics.gather_average(AV_RHO_BAR, rho_bar);
                    statistics.increment_stats();
                }
            }
        }
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn ReductiveProcessingFunctional3d<S, D>> {
        Box::new(*self)
    }
}
