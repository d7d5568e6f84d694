use clip_geom::test_support::world_grid;
use clip_geom::Camera;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::{Point3, Vector3};

fn criterion_benchmark(c: &mut Criterion) {
    let camera = Camera::from_view(
        Point3::new(0.0, 1.8, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(0.0, 1.0, 0.0),
        90.0,
        16.0 / 9.0,
        0.1,
        500.0,
    );

    let points: Vec<Point3<f64>> = world_grid(20, 2);
    println!("{} points", points.len());

    c.bench_function("project points", |b| {
        b.iter(|| {
            for point in &points {
                black_box(camera.project(black_box(point)));
            }
        });
    });

    c.bench_function("project lines", |b| {
        b.iter(|| {
            for pair in points.chunks_exact(2) {
                black_box(camera.project_line(black_box(&pair[0]), black_box(&pair[1])));
            }
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
