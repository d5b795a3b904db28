use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use gridiron::{GridConfig, NodeGrid};

fn populated_grid(occupants: u32) -> NodeGrid {
    let mut grid = NodeGrid::new();
    grid.configure(GridConfig {
        arena_width: 8192.0,
        arena_height: 8192.0,
        node_dimension: 512.0,
    })
    .unwrap();

    // Scatter occupants on a deterministic diagonal-ish lattice.
    for id in 0..occupants {
        let x = ((id * 97) % 8192) as f32;
        let y = -(((id * 193) % 8192) as f32);
        let _ = grid.process_position(id, Vec3::new(x, y, 0.0));
    }

    grid
}

fn bench_nodes_overlapping(c: &mut Criterion) {
    let grid = populated_grid(512);
    let center = Vec3::new(4096.0, -4096.0, 0.0);

    c.bench_function("nodes_overlapping_small", |b| {
        b.iter(|| black_box(grid.nodes_overlapping(black_box(center), black_box(200.0))))
    });

    c.bench_function("nodes_overlapping_large", |b| {
        b.iter(|| black_box(grid.nodes_overlapping(black_box(center), black_box(2000.0))))
    });
}

fn bench_area_scan(c: &mut Criterion) {
    let grid = populated_grid(512);
    let center = Vec3::new(4096.0, -4096.0, 0.0);

    c.bench_function("area_scan", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for index in grid.nodes_overlapping(center, 1200.0) {
                hits += grid.occupants(black_box(index)).len();
            }
            black_box(hits)
        })
    });
}

fn bench_process_position(c: &mut Criterion) {
    let mut grid = populated_grid(512);

    c.bench_function("process_position", |b| {
        let mut step = 0u32;
        b.iter(|| {
            step = step.wrapping_add(37);
            let x = (step % 8192) as f32;
            grid.process_position(0, Vec3::new(x, -64.0, 0.0))
        })
    });
}

criterion_group!(
    benches,
    bench_nodes_overlapping,
    bench_area_scan,
    bench_process_position
);
criterion_main!(benches);
