//! Remapping a source-specific axis convention onto the camera frame.
//!
//! Recorded event feeds rarely share the canonical x-right, y-up,
//! z-forward convention of the camera pipeline. A [`FrameAdapter`] wraps a
//! [`Camera`] together with a fixed 4x4 linear remap: camera position and
//! forward direction are remapped at construction, and every input point
//! is remapped at projection time. Outputs are already in the canonical
//! screen convention and are not remapped.
//!
//! The remap is applied as a genuine vector-matrix multiplication rather
//! than a per-axis sign/swap table, so it composes correctly if it is
//! later combined with other transforms. Which adapter to use is a
//! configuration choice made at construction; there is no subtyping
//! involved.

use nalgebra::{convert as c, Matrix4, Point3, RealField, RowVector4, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use crate::view_matrix::direction;
use crate::{Camera, ProjectedLine, ProjectedPoint};

/// A camera whose inputs arrive in a source-specific axis convention.
///
/// # Examples
///
/// ```
/// use clip_geom::*;
/// use nalgebra::{Point3, Vector3};
///
/// // Events recorded in a z-up frame, camera looking east.
/// let adapter = FrameAdapter::z_up(
///     Point3::new(100.0, 100.0, 64.0),
///     Vector3::new(1.0, 0.0, 0.0),
///     Vector3::new(0.0, 0.0, 1.0),
///     90.0, 16.0 / 9.0, 1.0, 4000.0,
/// );
///
/// let result = adapter.project(&Point3::new(400.0, 100.0, 64.0));
/// assert_eq!(result.visibility, Visibility::Visible);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FrameAdapter<R: RealField> {
    remap: Matrix4<R>,
    camera: Camera<R>,
}

impl<R: RealField> FrameAdapter<R> {
    /// Create an adapter with an arbitrary fixed remap matrix.
    ///
    /// `position` and `forward` are given in the source convention and are
    /// remapped before the camera is built. The `up` vector is passed
    /// through unchanged; it does not influence the view rotation (see
    /// [`Camera::from_view`]).
    #[allow(clippy::too_many_arguments)]
    pub fn with_remap(
        remap: Matrix4<R>,
        position: Point3<R>,
        forward: Vector3<R>,
        up: Vector3<R>,
        fov: R,
        aspect: R,
        near: R,
        far: R,
    ) -> Self {
        let camera = Camera::from_view(
            remap_point(&remap, &position),
            remap_vector(&remap, &forward),
            up,
            fov,
            aspect,
            near,
            far,
        );
        Self { remap, camera }
    }

    /// Create an adapter for a z-up source frame (x-east, y-north, z-up),
    /// the convention used by the recorded game events this library
    /// annotates.
    ///
    /// The remap swaps the y and z axes; it is an orthogonal permutation,
    /// so it is its own inverse.
    pub fn z_up(
        position: Point3<R>,
        forward: Vector3<R>,
        up: Vector3<R>,
        fov: R,
        aspect: R,
        near: R,
        far: R,
    ) -> Self {
        Self::with_remap(z_up_remap(), position, forward, up, fov, aspect, near, far)
    }

    /// Create a z-up adapter from yaw/pitch view angles in degrees, as
    /// carried by the event feed alongside the eye position.
    pub fn from_angles(
        position: Point3<R>,
        yaw_degrees: R,
        pitch_degrees: R,
        fov: R,
        aspect: R,
        near: R,
        far: R,
    ) -> Self {
        let forward = direction(yaw_degrees, pitch_degrees);
        let up = Vector3::new(R::zero(), R::zero(), R::one());
        Self::z_up(position, forward, up, fov, aspect, near, far)
    }

    /// Return the wrapped canonical-frame camera.
    #[inline]
    pub fn camera(&self) -> &Camera<R> {
        &self.camera
    }

    /// Return the fixed remap matrix.
    #[inline]
    pub fn remap(&self) -> &Matrix4<R> {
        &self.remap
    }

    /// Project a source-frame world point to normalized screen
    /// coordinates.
    pub fn project(&self, point: &Point3<R>) -> ProjectedPoint<R> {
        self.camera.project(&remap_point(&self.remap, point))
    }

    /// Project a source-frame world segment, clipping it to the frustum.
    pub fn project_line(&self, a: &Point3<R>, b: &Point3<R>) -> ProjectedLine<R> {
        self.camera.project_line(
            &remap_point(&self.remap, a),
            &remap_point(&self.remap, b),
        )
    }

    /// Lazily project a sequence of source-frame world points.
    ///
    /// Order-preserving and one-to-one, like
    /// [`Camera::project_points`].
    pub fn project_points<'a, I>(
        &'a self,
        points: I,
    ) -> impl Iterator<Item = ProjectedPoint<R>> + 'a
    where
        I: IntoIterator<Item = Point3<R>>,
        I::IntoIter: 'a,
    {
        points
            .into_iter()
            .map(move |point| self.project(&point))
    }
}

/// The y/z axis swap taking a z-up frame to the canonical y-up frame.
fn z_up_remap<R: RealField>() -> Matrix4<R> {
    #[rustfmt::skip]
    let m = Matrix4::new(
        c(1.0), c(0.0), c(0.0), c(0.0),
        c(0.0), c(0.0), c(1.0), c(0.0),
        c(0.0), c(1.0), c(0.0), c(0.0),
        c(0.0), c(0.0), c(0.0), c(1.0),
    );
    m
}

fn remap_point<R: RealField>(remap: &Matrix4<R>, point: &Point3<R>) -> Point3<R> {
    let h = RowVector4::new(
        point.x.clone(),
        point.y.clone(),
        point.z.clone(),
        R::one(),
    ) * remap;
    Point3::new(h[0].clone(), h[1].clone(), h[2].clone())
}

fn remap_vector<R: RealField>(remap: &Matrix4<R>, vector: &Vector3<R>) -> Vector3<R> {
    let h = RowVector4::new(
        vector.x.clone(),
        vector.y.clone(),
        vector.z.clone(),
        R::zero(),
    ) * remap;
    Vector3::new(h[0].clone(), h[1].clone(), h[2].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LineVisibility, Visibility};

    fn test_adapter() -> FrameAdapter<f64> {
        FrameAdapter::z_up(
            Point3::new(0.0, 0.0, 64.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            90.0,
            1.0,
            1.0,
            4000.0,
        )
    }

    #[test]
    fn orthogonal_remap_round_trips_points() {
        let remap = z_up_remap::<f64>();
        let inverse = remap.try_inverse().unwrap();
        for point in [
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(-4.5, 0.0, 12.25),
            Point3::new(0.0, -7.0, 0.5),
        ] {
            let roundtrip = remap_point(&inverse, &remap_point(&remap, &point));
            approx::assert_abs_diff_eq!(roundtrip, point, epsilon = 1e-12);
        }
    }

    #[test]
    fn point_ahead_of_camera_lands_at_center() {
        let adapter = test_adapter();
        let result = adapter.project(&Point3::new(0.0, 500.0, 64.0));
        assert_eq!(result.visibility, Visibility::Visible);
        approx::assert_abs_diff_eq!(result.position.x, 0.5, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(result.position.y, 0.5, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(result.distance, 500.0, epsilon = 1e-12);
    }

    #[test]
    fn source_frame_height_moves_points_up_the_screen() {
        let adapter = test_adapter();
        let eye_level = adapter.project(&Point3::new(0.0, 100.0, 64.0));
        let raised = adapter.project(&Point3::new(0.0, 100.0, 80.0));
        assert!(raised.position.y > eye_level.position.y);
    }

    #[test]
    fn adapter_projection_matches_wrapped_camera() {
        let adapter = test_adapter();
        let source = Point3::new(12.0, 300.0, 50.0);
        let canonical = Point3::new(12.0, 50.0, 300.0);

        let via_adapter = adapter.project(&source);
        let via_camera = adapter.camera().project(&canonical);
        assert!(via_adapter == via_camera);
    }

    #[test]
    fn from_angles_looks_along_the_feed_direction() {
        // Yaw 0, pitch 0 points east in the source frame.
        let adapter = FrameAdapter::from_angles(
            Point3::new(0.0, 0.0, 64.0),
            0.0,
            0.0,
            90.0,
            1.0,
            1.0,
            4000.0,
        );
        let result = adapter.project(&Point3::new(500.0, 0.0, 64.0));
        assert_eq!(result.visibility, Visibility::Visible);
        approx::assert_abs_diff_eq!(result.position.x, 0.5, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(result.position.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn kill_line_running_behind_the_camera_is_partial() {
        let adapter = test_adapter();
        let line = adapter.project_line(
            &Point3::new(0.0, 500.0, 64.0),
            &Point3::new(0.0, -500.0, 64.0),
        );
        assert_eq!(line.visibility, LineVisibility::Partial);
        assert_eq!(line.from.visibility, Visibility::Visible);
        assert_eq!(line.to.visibility, Visibility::Clipped);
    }

    #[test]
    fn batch_projection_remaps_every_point() {
        let adapter = test_adapter();
        let points = vec![
            Point3::new(0.0, 500.0, 64.0),
            Point3::new(100.0, 200.0, 0.0),
            Point3::new(-50.0, 80.0, 120.0),
        ];
        let batch: Vec<_> = adapter.project_points(points.iter().cloned()).collect();
        assert_eq!(batch.len(), points.len());
        for (single, from_batch) in points.iter().map(|p| adapter.project(p)).zip(&batch) {
            assert!(&single == from_batch);
        }
    }

    #[test]
    #[cfg(feature = "serde-serialize")]
    fn test_serde() {
        let expected = test_adapter();
        let buf = serde_json::to_string(&expected).unwrap();
        let actual: FrameAdapter<f64> = serde_json::from_str(&buf).unwrap();
        assert!(expected == actual);
    }
}
