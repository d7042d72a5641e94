use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::DVec3;

use carve_3d::carving::CarvingSession;
use carve_3d::occupancy::{GridDims, OccupancyGrid, VoxelMapping};
use carve_3d::ray::{intersect, Aabb, Ray, SlabPolicy};

fn fan_of_rays(n: usize, side: f64) -> Vec<Ray> {
    (0..n)
        .filter_map(|i| {
            let a = i as f64 / n as f64 * std::f64::consts::FRAC_PI_2;
            let origin = DVec3::new(-1.0, side / 2.0, side / 2.0);
            Ray::new(origin, DVec3::new(a.cos(), a.sin() * 0.3, 0.1))
        })
        .collect()
}

fn bench_slab(c: &mut Criterion) {
    let bbox = Aabb::new(DVec3::splat(-1.0), DVec3::splat(1.0)).unwrap();
    let rays = fan_of_rays(1024, 0.0);

    c.bench_function("slab_1024_rays", |b| {
        b.iter(|| {
            rays.iter()
                .filter(|r| intersect(black_box(r), &bbox).is_some())
                .count()
        })
    });
}

fn bench_carving(c: &mut Criterion) {
    let mut group = c.benchmark_group("Carving");

    for side in [16usize, 32].iter() {
        let dims = GridDims::new(*side, *side, *side);
        let mapping = VoxelMapping::new(DVec3::ZERO, 1.0).unwrap();
        let rays = fan_of_rays(32, *side as f64);

        group.bench_with_input(BenchmarkId::new("mark_rays", side), &rays, |b, rays| {
            b.iter(|| {
                let mut grid = OccupancyGrid::new(dims).unwrap();
                for r in rays {
                    black_box(grid.mark_ray(r, &mapping, SlabPolicy::Symmetric));
                }
                grid
            })
        });

        group.bench_with_input(BenchmarkId::new("session_4_views", side), &rays, |b, rays| {
            b.iter(|| {
                let mut session =
                    CarvingSession::new(dims, mapping, SlabPolicy::Symmetric).unwrap();
                for _ in 0..4 {
                    session.begin_view().unwrap();
                    for r in rays {
                        session.add_ray(r).unwrap();
                    }
                    session.end_view().unwrap();
                }
                black_box(session.into_grid().unwrap())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_slab, bench_carving);
criterion_main!(benches);
