// -------------------------------------------------------------------------
// SCPN CryoFlow -- Engine Benchmark
// Measures the collision sampler in isolation and full trajectories
// through a synthetic uniform flow at two gas densities.
// -------------------------------------------------------------------------

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

use cryo_core::trajectory::{run_trajectory, EngineContext};
use cryo_field::flow::{FlowField, FlowSample};
use cryo_field::geometry::Geometry;
use cryo_kinetics::collision::collide;
use cryo_kinetics::proposal::ProposalTable;
use cryo_types::config::SimConfig;
use cryo_types::record::TrajectoryDiagnostics;

/// Self-contained uniform flow so benchmarks need no input files.
fn make_flow(density: f64) -> FlowField {
    let mut samples = Vec::new();
    for i in 0..20 {
        for j in 0..10 {
            samples.push(FlowSample {
                z: -0.05 + i as f64 * 0.005,
                r: j as f64 * 0.004,
                v_axial: 100.0,
                v_radial: 0.0,
                v_phi: 0.0,
                temperature: 4.0,
                density,
            });
        }
    }
    FlowField::new(samples).expect("bench flow is valid")
}

fn bench_collision_sampler(c: &mut Criterion) {
    let cfg = SimConfig::default();
    let flow = make_flow(1e20);
    let table = ProposalTable::generate(
        flow.t_min,
        flow.t_max,
        1.5 * flow.max_bulk_speed,
        cfg.gas_mass,
        1,
    );
    let cell = *table.lookup(4.0, 50.0);

    c.bench_function("collide_single", |b| {
        let mut rng = StdRng::seed_from_u64(2);
        let mut diag = TrajectoryDiagnostics::default();
        b.iter(|| {
            let mut v = [30.0, -10.0, 120.0];
            collide(
                black_box(&mut v),
                &[0.0, 0.0, 100.0],
                4.0,
                &cell,
                cfg.particle_mass,
                cfg.gas_mass,
                &mut rng,
                &mut diag,
            );
            v
        })
    });
}

fn bench_trajectory(c: &mut Criterion) {
    let mut group = c.benchmark_group("trajectory");
    for density in [1e18, 1e19] {
        let cfg = SimConfig::default();
        let flow = make_flow(density);
        let geom = Geometry::new(Vec::new(), -0.05, 0.05, 0.04);
        let table = ProposalTable::generate(
            flow.t_min,
            flow.t_max,
            1.5 * flow.max_bulk_speed,
            cfg.gas_mass,
            1,
        );
        let ctx = EngineContext {
            config: &cfg,
            flow: &flow,
            geometry: &geom,
            table: &table,
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("rho_{density:e}")),
            &density,
            |b, _| {
                let mut rng = StdRng::seed_from_u64(3);
                b.iter(|| {
                    run_trajectory(
                        &ctx,
                        black_box([0.0, 0.0, -0.04]),
                        black_box([0.0, 0.0, 60.0]),
                        &mut rng,
                        None,
                    )
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_collision_sampler, bench_trajectory);
criterion_main!(benches);
