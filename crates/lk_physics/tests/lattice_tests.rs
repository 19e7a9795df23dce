// tests/lattice_tests.rs

//! 块格子引擎验证
//!
//! # 测试覆盖
//!
//! - 周期域上的推式迁移语义与可逆性
//! - 匀速漂移场景（平衡态 + 迁移平移不变）
//! - 包络写入
//! - 常密度稳定化场景
//! - 处理器调度顺序与归约处理器
//! - 串行/并行碰撞一致性

use approx::assert_relative_eq;

use lk_physics::{
    get_stored_average_density, moments, AtomicBlock3d, AverageDensityFunctional, Bgk,
    BlockLatticeBase3d, BounceBack, Box3D, ConstRhoBgk, Descriptor, Dot3D, DotList3D,
    DottedDataProcessorGenerator3d, GuoExternalForceBgk, LatticeError, ParallelConfig,
    ParallelStrategy, ReductiveBoxedDataProcessorGenerator3d, SetConstantExternalForce,
    BoxedDataProcessorGenerator3d, DataProcessor3d, DataProcessorGenerator3d, D2Q9, D3Q19,
    ForcedD2Q9, AV_RHO_BAR, AV_U_SQR,
};

// ============================================================
// 迁移语义
// ============================================================

/// 给每个 (格点, 方向) 一个唯一可辨识的值
fn tag(x: i64, y: i64, z: i64, i_pop: usize) -> f64 {
    ((x * 100 + y * 10 + z) as f64) + (i_pop as f64) * 1e-3
}

#[test]
fn test_periodic_stream_push_semantics() {
    // 性质: 迁移后 f[i](x + c_i) == 迁移前 f[i](x)，周期回绕
    let mut block: AtomicBlock3d<f64, D3Q19> =
        AtomicBlock3d::new(4, 4, 4, Box::new(Bgk::new(1.0)));
    for axis in 0..3 {
        block.set_periodic(axis, true);
    }

    let full = block.full_box();
    for x in full.x0..=full.x1 {
        for y in full.y0..=full.y1 {
            for z in full.z0..=full.z1 {
                let cell = block.get_mut(x, y, z);
                for i_pop in 0..D3Q19::Q {
                    cell[i_pop] = tag(x, y, z, i_pop);
                }
            }
        }
    }

    block.stream_all().unwrap();

    for x in full.x0..=full.x1 {
        for y in full.y0..=full.y1 {
            for z in full.z0..=full.z1 {
                for i_pop in 0..D3Q19::Q {
                    let c = &D3Q19::C[i_pop];
                    let tx = (x + c[0] as i64).rem_euclid(4);
                    let ty = (y + c[1] as i64).rem_euclid(4);
                    let tz = (z + c[2] as i64).rem_euclid(4);
                    assert_eq!(
                        block.get(tx, ty, tz)[i_pop],
                        tag(x, y, z, i_pop),
                        "f[{i_pop}] 从 ({x},{y},{z}) 到 ({tx},{ty},{tz}) 迁移错误"
                    );
                }
            }
        }
    }
}

#[test]
fn test_stream_reversibility_on_periodic_box() {
    // 逆向迁移（沿反向速度再推一次）恢复原状
    let mut block: AtomicBlock3d<f64, D2Q9> = AtomicBlock3d::new(8, 8, 1, Box::new(Bgk::new(1.0)));
    block.set_periodic(0, true);
    block.set_periodic(1, true);
    block.set_periodic(2, true);

    let full = block.full_box();
    let mut original = Vec::new();
    for x in full.x0..=full.x1 {
        for y in full.y0..=full.y1 {
            let cell = block.get_mut(x, y, 0);
            for i_pop in 0..D2Q9::Q {
                cell[i_pop] = tag(x, y, 0, i_pop);
            }
            original.push(cell.data().f().to_vec());
        }
    }

    block.stream_all().unwrap();

    // 手工逆迁移: 每个分布退回其来源格点
    let mut restored = vec![vec![0.0; D2Q9::Q]; (8 * 8) as usize];
    for x in full.x0..=full.x1 {
        for y in full.y0..=full.y1 {
            let cell = block.get(x, y, 0);
            for i_pop in 0..D2Q9::Q {
                let c = &D2Q9::C[i_pop];
                let sx = (x - c[0] as i64).rem_euclid(8);
                let sy = (y - c[1] as i64).rem_euclid(8);
                restored[(sx * 8 + sy) as usize][i_pop] = cell[i_pop];
            }
        }
    }
    for (restored_cell, original_cell) in restored.iter().zip(original.iter()) {
        assert_eq!(restored_cell, original_cell);
    }
}

#[test]
fn test_uniform_drift_scenario() {
    // D2Q9, ρ=1, u=(0.1,0): 平衡态是不动点，均匀场迁移平移不变，
    // 完整一步后分布不变、统计量发布
    let mut block: AtomicBlock3d<f64, D2Q9> = AtomicBlock3d::new(8, 8, 1, Box::new(Bgk::new(1.0)));
    block.set_periodic(0, true);
    block.set_periodic(1, true);
    block.set_periodic(2, true);

    let full = block.full_box();
    for x in full.x0..=full.x1 {
        for y in full.y0..=full.y1 {
            block.get_mut(x, y, 0).ini_equilibrium(1.0, &[0.1, 0.0, 0.0]);
        }
    }
    let reference: Vec<f64> = block.get(3, 4, 0).data().f().to_vec();

    block.collide_and_stream_all().unwrap();

    for x in full.x0..=full.x1 {
        for y in full.y0..=full.y1 {
            let cell = block.get(x, y, 0);
            for i_pop in 0..D2Q9::Q {
                assert_relative_eq!(cell[i_pop], reference[i_pop], epsilon = 1e-14);
            }
        }
    }
    assert_eq!(block.time_counter().time(), 1);
    assert_relative_eq!(
        block.statistics().get_average(AV_U_SQR),
        0.01,
        max_relative = 1e-12
    );
}

#[test]
fn test_bulk_stream_writes_envelope() {
    // 包络宽度 1: 体相边缘的分布写入包络圈
    let mut block: AtomicBlock3d<f64, D3Q19> =
        AtomicBlock3d::new(5, 5, 5, Box::new(Bgk::new(1.0)));
    block.set_envelope_width(1);
    let bulk = block.bulk();
    assert_eq!(bulk, Box3D::new(1, 3, 1, 3, 1, 3));

    // 体相边缘格点: 朝 +x 的分布（方向 10: c=(1,0,0)）
    block.get_mut(3, 2, 2)[10] = 0.75;
    block.stream_all().unwrap();

    assert_eq!(block.get(4, 2, 2)[10], 0.75, "包络未接收到体相迁出的分布");
}

// ============================================================
// 常密度稳定化场景
// ============================================================

#[test]
fn test_const_rho_stabilization() {
    // 轻微非均匀密度，100 步后平均密度回到 1（1e-12 内）
    let mut block: AtomicBlock3d<f64, D3Q19> =
        AtomicBlock3d::new(4, 4, 4, Box::new(ConstRhoBgk::new(1.0)));
    let full = block.full_box();
    for x in full.x0..=full.x1 {
        for y in full.y0..=full.y1 {
            for z in full.z0..=full.z1 {
                let rho = 1.0 + 0.01 * (((x + 2 * y + 3 * z) % 5) as f64 - 2.0);
                block.get_mut(x, y, z).ini_equilibrium(rho, &[0.0; 3]);
            }
        }
    }

    for _ in 0..100 {
        block.collide_all().unwrap();
        block.evaluate_statistics();
    }

    let stored_density: f64 = get_stored_average_density(&block);
    assert!(
        (stored_density - 1.0).abs() < 1e-12,
        "平均密度未稳定到 1: {stored_density}"
    );
}

// ============================================================
// 处理器调度
// ============================================================

#[test]
fn test_bulk_processor_runs_before_collision() {
    // 前置体积力处理器 + Guo 强迫动力学: 完整一步后流体获得动量
    let mut block: AtomicBlock3d<f64, ForcedD2Q9> =
        AtomicBlock3d::new(4, 4, 1, Box::new(GuoExternalForceBgk::new(1.0)));
    block.set_periodic(0, true);
    block.set_periodic(1, true);
    block.set_periodic(2, true);
    let full = block.full_box();
    for x in full.x0..=full.x1 {
        for y in full.y0..=full.y1 {
            block.get_mut(x, y, 0).ini_equilibrium(1.0, &[0.0; 3]);
        }
    }

    let generator = BoxedDataProcessorGenerator3d::new(
        full,
        Box::new(SetConstantExternalForce::new([1e-4, 0.0, 0.0])),
    );
    let id = block.attach_processor(&generator);
    assert_eq!(block.num_processors(), 1);

    block.collide_and_stream_all().unwrap();

    let (_, j) = moments::get_rho_bar_j(block.get(1, 1, 0).data());
    assert_relative_eq!(j[0], 1e-4, epsilon = 1e-16);

    block.remove_processor(id).unwrap();
    assert_eq!(block.num_processors(), 0);
    assert!(matches!(
        block.remove_processor(id),
        Err(LatticeError::ProcessorNotFound { .. })
    ));
}

#[test]
fn test_generator_transform_composition() {
    // shift(a); shift(b) == shift(a+b); multiply(s); divide(s) == identity
    let functional = SetConstantExternalForce::new([0.0f64; 3]);
    let base = Box3D::new(0, 4, 2, 6, 0, 0);

    let mut a: BoxedDataProcessorGenerator3d<f64, ForcedD2Q9> =
        BoxedDataProcessorGenerator3d::new(base, Box::new(functional));
    a.shift(1, 2, 3);
    a.shift(4, 5, 6);
    let mut b: BoxedDataProcessorGenerator3d<f64, ForcedD2Q9> =
        BoxedDataProcessorGenerator3d::new(base, Box::new(functional));
    b.shift(5, 7, 9);
    assert_eq!(a.domain(), b.domain());

    let mut c: BoxedDataProcessorGenerator3d<f64, ForcedD2Q9> =
        BoxedDataProcessorGenerator3d::new(base, Box::new(functional));
    c.multiply(3);
    c.divide(3);
    assert_eq!(c.domain(), base);
}

#[test]
fn test_generator_extract_empty_domain() {
    let functional = SetConstantExternalForce::new([0.0f64; 3]);
    let mut generator: BoxedDataProcessorGenerator3d<f64, ForcedD2Q9> =
        BoxedDataProcessorGenerator3d::new(Box3D::new(0, 3, 0, 3, 0, 0), Box::new(functional));

    assert!(generator.extract(Box3D::new(2, 5, 2, 5, 0, 0)));
    assert_eq!(generator.domain(), Box3D::new(2, 3, 2, 3, 0, 0));

    // 不相交: 返回 false，调用方必须跳过生成
    assert!(!generator.extract(Box3D::new(10, 12, 10, 12, 0, 0)));
}

#[test]
fn test_modification_pattern() {
    let generator: BoxedDataProcessorGenerator3d<f64, ForcedD2Q9> =
        BoxedDataProcessorGenerator3d::new(
            Box3D::new(0, 1, 0, 1, 0, 0),
            Box::new(SetConstantExternalForce::new([0.0f64; 3])),
        );
    let mut is_written = vec![false; 1];
    generator.modification_pattern(&mut is_written);
    assert_eq!(is_written, vec![true]);

    let reductive: ReductiveBoxedDataProcessorGenerator3d<f64, D2Q9> =
        ReductiveBoxedDataProcessorGenerator3d::new(
            Box3D::new(0, 1, 0, 1, 0, 0),
            Box::new(AverageDensityFunctional::new()),
        );
    let mut is_written = vec![true; 1];
    reductive.modification_pattern(&mut is_written);
    assert_eq!(is_written, vec![false], "归约处理器只读输入块");
}

#[test]
fn test_reductive_average_density() {
    let mut block: AtomicBlock3d<f64, D3Q19> =
        AtomicBlock3d::new(4, 4, 4, Box::new(Bgk::new(1.0)));
    let full = block.full_box();
    let mut expected_sum = 0.0;
    let sub = Box3D::new(1, 2, 0, 3, 1, 3);
    for x in full.x0..=full.x1 {
        for y in full.y0..=full.y1 {
            for z in full.z0..=full.z1 {
                let rho = 1.0 + 0.002 * ((x * 7 + y * 3 + z) % 4) as f64;
                block.get_mut(x, y, z).ini_equilibrium(rho, &[0.0; 3]);
                if sub.contains(x, y, z) {
                    expected_sum += rho - 1.0;
                }
            }
        }
    }
    let expected_average = expected_sum / sub.n_cells() as f64;

    let generator: ReductiveBoxedDataProcessorGenerator3d<f64, D3Q19> =
        ReductiveBoxedDataProcessorGenerator3d::new(
            sub,
            Box::new(AverageDensityFunctional::new()),
        );
    let mut processor = generator.generate();
    let statistics = processor.execute(&mut [&mut block]).unwrap();
    assert_relative_eq!(
        statistics.get_average(AV_RHO_BAR),
        expected_average,
        epsilon = 1e-13
    );
    assert_eq!(statistics.num_cells(), sub.n_cells() as u64);
}

#[test]
fn test_dotted_processor_on_selected_sites() {
    // 点状生成器: 只在列出的格点写入体积力
    struct ForceAtDots {
        force: [f64; 3],
    }

    impl lk_physics::DotProcessingFunctional3d<f64, ForcedD2Q9> for ForceAtDots {
        fn name(&self) -> &'static str {
            "ForceAtDots"
        }

        fn process_dots(
            &self,
            dots: &DotList3D,
            blocks: &mut [&mut AtomicBlock3d<f64, ForcedD2Q9>],
        ) -> Result<(), lk_physics::ProcessorError> {
            let block = &mut *blocks[0];
            for dot in dots.dots() {
                let cell = block.get_mut(dot.x, dot.y, dot.z);
                for i_d in 0..2 {
                    cell.data_mut().set_external(i_d, self.force[i_d]);
                }
            }
            Ok(())
        }

        fn clone_box(
            &self,
        ) -> Box<dyn lk_physics::DotProcessingFunctional3d<f64, ForcedD2Q9>> {
            Box::new(ForceAtDots { force: self.force })
        }
    }

    let mut block: AtomicBlock3d<f64, ForcedD2Q9> =
        AtomicBlock3d::new(4, 4, 1, Box::new(Bgk::new(1.0)));
    let mut dots = DotList3D::new();
    dots.push(Dot3D::new(0, 0, 0));
    dots.push(Dot3D::new(2, 3, 0));

    let generator = DottedDataProcessorGenerator3d::new(
        dots,
        Box::new(ForceAtDots {
            force: [5e-4, 0.0, 0.0],
        }),
    );
    let mut processor = generator.generate();
    processor.process(&mut [&mut block]).unwrap();

    assert_eq!(block.get(2, 3, 0).data().get_external(0), 5e-4);
    assert_eq!(block.get(1, 1, 0).data().get_external(0), 0.0);
}

// ============================================================
// 并行一致性
// ============================================================

#[test]
fn test_parallel_matches_sequential() {
    let build = |strategy: ParallelStrategy| {
        let mut block: AtomicBlock3d<f64, D3Q19> =
            AtomicBlock3d::new(8, 6, 6, Box::new(Bgk::new(0.8)));
        block.set_parallel_config(ParallelConfig {
            strategy,
            min_parallel_size: 1,
        });
        let full = block.full_box();
        for x in full.x0..=full.x1 {
            for y in full.y0..=full.y1 {
                for z in full.z0..=full.z1 {
                    let rho = 1.0 + 0.01 * ((x + y + z) % 3) as f64;
                    let u = [0.01 * (x % 2) as f64, -0.005 * (y % 2) as f64, 0.0];
                    block.get_mut(x, y, z).ini_equilibrium(rho, &u);
                }
            }
        }
        block
    };

    let mut sequential = build(ParallelStrategy::Sequential);
    let mut parallel = build(ParallelStrategy::SlabChunks);
    sequential.collide_all().unwrap();
    parallel.collide_all().unwrap();
    sequential.evaluate_statistics();
    parallel.evaluate_statistics();

    let full = sequential.full_box();
    for x in full.x0..=full.x1 {
        for y in full.y0..=full.y1 {
            for z in full.z0..=full.z1 {
                let a = sequential.get(x, y, z);
                let b = parallel.get(x, y, z);
                for i_pop in 0..D3Q19::Q {
                    assert_eq!(a[i_pop], b[i_pop], "并行碰撞改变了数值结果");
                }
            }
        }
    }
    assert_relative_eq!(
        sequential.statistics().get_average(AV_RHO_BAR),
        parallel.statistics().get_average(AV_RHO_BAR),
        epsilon = 1e-13
    );
}

// ============================================================
// 边界动力学
// ============================================================

#[test]
fn test_bounce_back_wall_reflects() {
    // 一维通道截面: 壁面把入射分布原路送回
    let mut block: AtomicBlock3d<f64, D2Q9> = AtomicBlock3d::new(1, 4, 1, Box::new(Bgk::new(1.0)));
    block.set_periodic(0, true);
    block.set_periodic(2, true);
    block
        .define_dynamics(Box3D::new(0, 0, 0, 0, 0, 0), &BounceBack::new())
        .unwrap();
    block
        .define_dynamics(Box3D::new(0, 0, 3, 3, 0, 0), &BounceBack::new())
        .unwrap();

    let full = block.full_box();
    for y in 0..4 {
        block.get_mut(0, y, 0).ini_equilibrium(1.0, &[0.0; 3]);
    }
    // 朝壁面 (-y, 方向 4: c=(0,-1,0)) 注入额外分布
    block.get_mut(0, 1, 0)[4] += 1e-2;

    let mass_before: f64 = (0..4)
        .map(|y| moments::get_rho_bar_j(block.get(0, y, 0).data()).0)
        .sum();

    // 两步: 入射 → 反弹返回
    block.collide_and_stream(full).unwrap();
    block.collide_and_stream(full).unwrap();

    let mass_after: f64 = (0..4)
        .map(|y| moments::get_rho_bar_j(block.get(0, y, 0).data()).0)
        .sum();
    assert_relative_eq!(mass_before, mass_after, epsilon = 1e-14);

    // 反射分布回到 +y 方向（方向 8: c=(0,1,0)）
    assert!(block.get(0, 1, 0)[8] > 1e-3, "反弹分布未返回流体");
}
