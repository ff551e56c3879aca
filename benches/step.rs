use std::hint::black_box;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use central2d::grid::{Layout, StepBuffers};
use central2d::meshing::periodic_wrap;
use central2d::solvers::{step_pair, StepSize};
use central2d::{ExecutionMode, Partition, Scenario, ShallowWater, Simulation, SimulationConfig};




fn macro_iteration_kernel(c: &mut Criterion) {
    let model = ShallowWater::default();
    let mut group = c.benchmark_group("step_pair");

    for &n in &[64, 256] {
        let layout = Layout::new(n, n, 4, 3);
        let mut buffers = StepBuffers::allocate(&layout).unwrap();
        let dx = 2.0 / n as f32;
        let size = StepSize { dt: 0.1 * dx, dx, dy: dx };

        for (x, y) in layout.interior().iter() {
            let centre = ((x as f32 - 3.5) * dx, (y as f32 - 3.5) * dx);
            let k = layout.index(0, x as usize, y as usize);
            let mut u = [0.0; 3];
            Scenario::DamBreak.apply((2.0, 2.0), centre, &mut u);
            buffers.current[k] = u[0];
        }

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                periodic_wrap(&mut buffers.current, &layout);
                step_pair(&mut buffers, &layout, &model, size);
                black_box(buffers.current[layout.index(0, 4, 4)])
            })
        });
    }
    group.finish();
}

fn tiled_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");
    group.sample_size(10);

    for &(label, partition, execution) in &[
        ("1x1-serial", Partition::single(), ExecutionMode::Serial),
        ("2x2-threads", Partition::new(2, 2), ExecutionMode::Threads(4)),
        ("4x4-threads", Partition::new(4, 4), ExecutionMode::Threads(4)),
        ("2x2-pinned", Partition::new(2, 2), ExecutionMode::Pinned(4)),
    ] {
        let config = SimulationConfig { nx: 128, ny: 128, partition, execution, ..SimulationConfig::default() };
        let mut sim = Simulation::new(config, ShallowWater::default()).unwrap();
        sim.initialize(Scenario::DamBreak.initial_condition((2.0, 2.0)));

        group.bench_function(label, |b| {
            b.iter(|| black_box(sim.run(0.001).unwrap()))
        });
    }
    group.finish();
}

criterion_group!(benches, macro_iteration_kernel, tiled_run);
criterion_main!(benches);
