//! Construction of the camera transform from its factor matrices.
//!
//! Points are treated as row vectors multiplied on the left, so a composed
//! matrix `A * B * C` applies `A` first. The full camera transform is
//! `translation * rotation * perspective`: world points are moved into the
//! camera-relative frame, rotated into the view frame, then projected into
//! homogeneous clip space with view-space depth landing in the w channel.

use nalgebra::{convert as c, Matrix4, Point3, RealField, RowVector4, Vector3};

/// Convert an angle in degrees to radians.
#[inline]
pub(crate) fn degrees_to_radians<R: RealField>(degrees: R) -> R {
    degrees * R::pi() / c(180.0)
}

/// Unit direction vector for a yaw/pitch pair, both in degrees.
///
/// This uses the angle convention of the recorded-event feeds this library
/// annotates: yaw sweeps in the x/y ground plane and pitch tilts toward +z.
/// The result has magnitude 1 for any input by construction.
pub fn direction<R: RealField>(yaw_degrees: R, pitch_degrees: R) -> Vector3<R> {
    let yaw = degrees_to_radians(yaw_degrees);
    let pitch = degrees_to_radians(pitch_degrees);
    Vector3::new(
        yaw.clone().cos() * pitch.clone().cos(),
        yaw.sin() * pitch.clone().cos(),
        pitch.sin(),
    )
}

/// Row-vector translation moving `position` to the origin.
///
/// Pure negation of the camera position into the last matrix row.
pub fn translation<R: RealField>(position: &Point3<R>) -> Matrix4<R> {
    #[rustfmt::skip]
    let m = Matrix4::new(
        c(1.0), c(0.0), c(0.0), c(0.0),
        c(0.0), c(1.0), c(0.0), c(0.0),
        c(0.0), c(0.0), c(1.0), c(0.0),
        -position.x.clone(), -position.y.clone(), -position.z.clone(), c(1.0),
    );
    m
}

/// Row-vector rotation aligning `forward` with the +z view axis.
///
/// The rotation is derived from `forward` alone: yaw about y, then pitch
/// about x. Camera roll is therefore always zero, and the `up` vector
/// accepted by [`Camera::from_view`](crate::Camera::from_view) has no
/// effect here (see DESIGN.md).
pub fn rotation<R: RealField>(forward: &Vector3<R>) -> Matrix4<R> {
    let yaw = forward.x.clone().atan2(forward.z.clone());
    let pitch = (-forward.y.clone()).asin();

    let (sy, cy) = (yaw.clone().sin(), yaw.cos());
    let (sp, cp) = (pitch.clone().sin(), pitch.cos());

    #[rustfmt::skip]
    let about_y = Matrix4::new(
        cy.clone(), c(0.0), sy.clone(), c(0.0),
        c(0.0),     c(1.0), c(0.0),     c(0.0),
        -sy,        c(0.0), cy,         c(0.0),
        c(0.0),     c(0.0), c(0.0),     c(1.0),
    );
    #[rustfmt::skip]
    let about_x = Matrix4::new(
        c(1.0), c(0.0),     c(0.0),      c(0.0),
        c(0.0), cp.clone(), -sp.clone(), c(0.0),
        c(0.0), sp,         cp,          c(0.0),
        c(0.0), c(0.0),     c(0.0),      c(1.0),
    );
    about_y * about_x
}

/// Row-vector perspective projection for a symmetric frustum.
///
/// `y_scale = cot(fov / 2)`, `x_scale = y_scale / aspect`; the depth terms
/// are `a = (far + near) / (far - near)` and
/// `b = 2 * near * far / (far - near)`. View-space z is copied into the w
/// output channel to support the subsequent perspective divide.
///
/// Parameters are not validated: `near >= far` or a fov outside
/// (0°, 180°) produce a degenerate matrix, and the resulting NaN or
/// infinite coordinates propagate into projection results uncaught.
pub fn perspective<R: RealField>(fov_degrees: R, aspect: R, near: R, far: R) -> Matrix4<R> {
    let half_fov = degrees_to_radians(fov_degrees) / c(2.0);
    let y_scale = c::<f64, R>(1.0) / half_fov.tan();
    let x_scale = y_scale.clone() / aspect;

    let depth = far.clone() - near.clone();
    let a = (far.clone() + near.clone()) / depth.clone();
    let b = c::<f64, R>(2.0) * near * far / depth;

    #[rustfmt::skip]
    let m = Matrix4::new(
        x_scale, c(0.0),  c(0.0), c(0.0),
        c(0.0),  y_scale, c(0.0), c(0.0),
        c(0.0),  c(0.0),  a,      c(1.0),
        c(0.0),  c(0.0),  -b,     c(0.0),
    );
    m
}

/// Compose the full camera transform for a row-vector convention.
///
/// Translation applies first, then rotation, then projection.
pub fn build_view_matrix<R: RealField>(
    position: &Point3<R>,
    forward: &Vector3<R>,
    fov_degrees: R,
    aspect: R,
    near: R,
    far: R,
) -> Matrix4<R> {
    translation(position) * rotation(forward) * perspective(fov_degrees, aspect, near, far)
}

/// Fixed viewport remap from normalized device coordinates to the unit
/// screen square: x and y are scaled by 0.5 and offset by 0.5, and the z
/// column is zero, so output z is always exactly 0.
pub(crate) fn viewport<R: RealField>() -> Matrix4<R> {
    #[rustfmt::skip]
    let m = Matrix4::new(
        c(0.5), c(0.0), c(0.0), c(0.0),
        c(0.0), c(0.5), c(0.0), c(0.0),
        c(0.0), c(0.0), c(0.0), c(0.0),
        c(0.5), c(0.5), c(0.0), c(1.0),
    );
    m
}

/// Remap a point in normalized device coordinates to the unit viewport.
pub(crate) fn ndc_to_screen<R: RealField>(ndc: RowVector4<R>) -> Point3<R> {
    let s = ndc * viewport::<R>();
    Point3::new(s[0].clone(), s[1].clone(), s[2].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::RowVector4;

    #[test]
    fn direction_is_unit_length() {
        for (yaw, pitch) in crate::test_support::direction_grid::<f64>(15) {
            let d = direction(yaw, pitch);
            approx::assert_abs_diff_eq!(d.norm(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn rotation_sends_forward_to_plus_z() {
        for forward in [
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.6, 0.0, 0.8),
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(0.48, 0.6, 0.64),
        ] {
            let rotated = RowVector4::new(forward.x, forward.y, forward.z, 0.0)
                * rotation(&forward);
            approx::assert_abs_diff_eq!(rotated[0], 0.0, epsilon = 1e-12);
            approx::assert_abs_diff_eq!(rotated[1], 0.0, epsilon = 1e-12);
            approx::assert_abs_diff_eq!(rotated[2], forward.norm(), epsilon = 1e-12);
        }
    }

    #[test]
    fn translation_applies_before_rotation() {
        let position = Point3::new(3.0, -4.0, 5.0);
        let forward = Vector3::new(0.6, 0.0, 0.8);
        let view = build_view_matrix(&position, &forward, 90.0, 1.0, 1.0, 100.0);

        // The camera position itself must collapse onto the view axis with
        // zero depth in the w channel.
        let h = RowVector4::new(position.x, position.y, position.z, 1.0) * view;
        approx::assert_abs_diff_eq!(h[0], 0.0, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(h[1], 0.0, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(h[3], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn perspective_copies_depth_into_w() {
        let m = perspective(90.0, 2.0, 1.0, 100.0);
        let h = RowVector4::new(3.0, -2.0, 7.0, 1.0) * m;

        // cot(45 deg) == 1, so y_scale is 1 and x_scale is 1/aspect.
        approx::assert_abs_diff_eq!(h[0], 1.5, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(h[1], -2.0, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(h[3], 7.0, epsilon = 1e-12);

        let a = 101.0 / 99.0;
        let b = 200.0 / 99.0;
        approx::assert_abs_diff_eq!(h[2], 7.0 * a - b, epsilon = 1e-12);
    }

    #[test]
    fn depth_maps_near_and_far_onto_unit_range() {
        let m = perspective(90.0, 1.0, 1.0, 100.0);
        let near = RowVector4::new(0.0, 0.0, 1.0, 1.0) * m.clone();
        let far = RowVector4::new(0.0, 0.0, 100.0, 1.0) * m;
        approx::assert_abs_diff_eq!(near[2] / near[3], -1.0, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(far[2] / far[3], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn viewport_remap_zeroes_depth() {
        let screen = ndc_to_screen(RowVector4::new(-1.0, 1.0, 0.7, 1.0));
        approx::assert_abs_diff_eq!(screen.x, 0.0, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(screen.y, 1.0, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(screen.z, 0.0, epsilon = 1e-12);
    }
}
