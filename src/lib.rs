#![cfg_attr(not(feature = "std"), no_std)]
#![deny(rust_2018_idioms, unsafe_code, missing_docs)]
#![cfg_attr(not(doctest), doc = include_str!("../README.md"))]

//! # Examples
//!
//! ## Example - projecting a world-space segment to screen coordinates.
//!
//! ```
//! use clip_geom::*;
//! use nalgebra::{Point3, Vector3};
//!
//! // Camera at the origin looking down +z.
//! let camera = Camera::from_view(
//!     Point3::origin(),
//!     Vector3::new(0.0, 0.0, 1.0),
//!     Vector3::new(0.0, 1.0, 0.0),
//!     90.0,        // vertical fov in degrees
//!     16.0 / 9.0,  // aspect
//!     1.0,         // near
//!     1000.0,      // far
//! );
//!
//! // This segment starts in front of the camera and runs behind it, so
//! // only part of it survives clipping.
//! let line = camera.project_line(
//!     &Point3::new(0.0, 0.0, 20.0),
//!     &Point3::new(0.0, 0.0, -20.0),
//! );
//!
//! assert_eq!(line.visibility, LineVisibility::Partial);
//! assert_eq!(line.from.visibility, Visibility::Visible);
//! assert_eq!(line.to.visibility, Visibility::Clipped);
//! ```
//!
//! ## Example - remapping a z-up event feed onto the camera frame.
//!
//! ```
//! use clip_geom::*;
//! use nalgebra::{Point3, Vector3};
//!
//! // Recorded events use x-east, y-north, z-up coordinates. The adapter
//! // remaps them onto the canonical x-right, y-up, z-forward frame before
//! // projecting.
//! let adapter = FrameAdapter::z_up(
//!     Point3::new(0.0, 0.0, 64.0),  // eye position, z is height
//!     Vector3::new(0.0, 1.0, 0.0),  // looking north
//!     Vector3::new(0.0, 0.0, 1.0),  // up is +z in this frame
//!     90.0, 16.0 / 9.0, 1.0, 4000.0,
//! );
//!
//! // A point straight ahead of the camera lands at the viewport center.
//! let result = adapter.project(&Point3::new(0.0, 500.0, 64.0));
//! assert_eq!(result.visibility, Visibility::Visible);
//! approx::assert_abs_diff_eq!(result.position.x, 0.5, epsilon = 1e-12);
//! approx::assert_abs_diff_eq!(result.position.y, 0.5, epsilon = 1e-12);
//! ```

#[cfg(not(feature = "std"))]
extern crate core as std;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use nalgebra::{Point3, RealField};

mod view_matrix;
pub use view_matrix::{build_view_matrix, direction, perspective, rotation, translation};

mod camera;
pub use camera::Camera;

/// Cohen-Sutherland clipping of segments in normalized screen space.
pub mod clip2d;

/// Cohen-Sutherland clipping of segments in homogeneous clip space.
pub mod clip3d;

mod adapter;
pub use adapter::FrameAdapter;

#[cfg(feature = "std")]
pub mod test_support;

/// Whether a projected point landed inside the view frustum.
///
/// The projected position is returned in either case; callers must check
/// this tag before trusting the coordinate. Degenerate inputs can also
/// surface as NaN or infinite coordinates with the tag still set to
/// `Visible`, so extreme-magnitude results should be treated as an implicit
/// clipping signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum Visibility {
    /// The point is inside the view frustum.
    Visible,
    /// The point is outside the view frustum.
    Clipped,
}

/// Whether a projected segment survived clipping, and how much of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum LineVisibility {
    /// Both endpoints were inside the frustum; no clipping took place.
    Visible,
    /// The segment crossed at least one frustum boundary and was shortened
    /// to the visible part.
    Partial,
    /// The segment lies entirely outside the frustum.
    Clipped,
}

/// A world point projected to normalized screen coordinates.
///
/// Screen x and y are in `[0, 1]` when the point is visible. The z
/// component is always 0 after the viewport remap; depth information
/// survives only in `distance`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ProjectedPoint<R: RealField> {
    /// Whether the point landed inside the frustum.
    pub visibility: Visibility,
    /// Position on the unit viewport. Meaningful only when `visibility` is
    /// [`Visibility::Visible`]; still populated otherwise.
    pub position: Point3<R>,
    /// Euclidean distance from the camera to the original world point,
    /// measured before any transform.
    pub distance: R,
}

/// A world segment projected and clipped to the unit viewport.
///
/// When `visibility` is [`LineVisibility::Partial`], an endpoint that
/// started outside the frustum has been replaced by the boundary
/// intersection but keeps its original [`Visibility::Clipped`] tag.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ProjectedLine<R: RealField> {
    /// Overall visibility of the segment.
    pub visibility: LineVisibility,
    /// First endpoint, clipped to the viewport when necessary.
    pub from: ProjectedPoint<R>,
    /// Second endpoint, clipped to the viewport when necessary.
    pub to: ProjectedPoint<R>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "std"))]
    compile_error!("tests require std");

    #[test]
    fn visibility_tags_are_plain_values() {
        assert_eq!(Visibility::Visible, Visibility::Visible);
        assert_ne!(Visibility::Visible, Visibility::Clipped);
        assert_ne!(LineVisibility::Partial, LineVisibility::Clipped);
    }

    #[test]
    #[cfg(feature = "serde-serialize")]
    fn test_projected_point_serde() {
        let expected = ProjectedPoint {
            visibility: Visibility::Visible,
            position: Point3::new(0.25_f64, 0.75, 0.0),
            distance: 12.5,
        };

        let buf = serde_json::to_string(&expected).unwrap();
        let actual: ProjectedPoint<f64> = serde_json::from_str(&buf).unwrap();
        assert!(expected == actual);
    }

    #[test]
    #[cfg(feature = "serde-serialize")]
    fn test_projected_line_serde() {
        let endpoint = |x: f64| ProjectedPoint {
            visibility: Visibility::Clipped,
            position: Point3::new(x, 0.5, 0.0),
            distance: 3.0,
        };
        let expected = ProjectedLine {
            visibility: LineVisibility::Partial,
            from: endpoint(0.0),
            to: endpoint(1.0),
        };

        let buf = serde_json::to_string(&expected).unwrap();
        let actual: ProjectedLine<f64> = serde_json::from_str(&buf).unwrap();
        assert!(expected == actual);
    }
}
