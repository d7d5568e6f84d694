//! Utilities for testing projection pipelines.
use nalgebra::{convert, Point3, RealField};

/// Generate a yaw/pitch grid in degrees.
///
/// Yaw covers `[0, 360)` and pitch `[-75, 75]`, both sampled every
/// `step_degrees`, staying clear of the poles where yaw becomes
/// degenerate.
pub fn direction_grid<R: RealField>(step_degrees: usize) -> Vec<(R, R)> {
    let mut grid = Vec::new();
    for yaw in num_iter::range_step(0i64, 360, step_degrees as i64) {
        for pitch in num_iter::range_step(-75i64, 76, step_degrees as i64) {
            grid.push((convert(yaw as f64), convert(pitch as f64)));
        }
    }
    grid
}

/// Generate a grid of world points in a slab in front of the origin.
///
/// Points cover `[-extent, extent]` in x and y at several depths, sampled
/// every `step` units. Some of them fall outside a typical frustum on
/// purpose, so projection benchmarks and tests exercise both visibility
/// outcomes.
pub fn world_grid<R: RealField>(extent: i64, step: usize) -> Vec<Point3<R>> {
    let mut points = Vec::new();
    for z in num_iter::range_step(1i64, 4 * extent, extent.max(1) * 2) {
        for y in num_iter::range_step(-extent, extent + 1, step as i64) {
            for x in num_iter::range_step(-extent, extent + 1, step as i64) {
                points.push(Point3::new(
                    convert(x as f64),
                    convert(y as f64),
                    convert(z as f64),
                ));
            }
        }
    }
    points
}
