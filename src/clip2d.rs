//! Cohen-Sutherland segment clipping against the unit viewport.
//!
//! This variant operates on two already-projected, already-remapped points
//! in `[0, 1] x [0, 1]` screen space, clipping against the four viewport
//! edges.
//!
//! It is a reference path: because the perspective divide has already
//! happened, points behind the camera arrive with their coordinates
//! mirrored through the origin and this clipper cannot handle them
//! correctly. Production line projection clips in homogeneous clip space
//! instead (see [`clip3d`](crate::clip3d)), before the divide.

use nalgebra::{convert as c, Point2, RealField};

use crate::{LineVisibility, Visibility};

const INSIDE: u8 = 0;
const LEFT: u8 = 0b0001;
const RIGHT: u8 = 0b0010;
const BOTTOM: u8 = 0b0100;
const TOP: u8 = 0b1000;

/// One of the four edges of the unit viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// `x < 0`.
    Left,
    /// `x > 1`.
    Right,
    /// `y < 0`.
    Bottom,
    /// `y > 1`.
    Top,
}

/// The decision taken on each clip-loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClipDecision {
    Accept,
    Reject,
    Clip(Edge),
}

impl Edge {
    /// Exact intersection of the segment from `a` to `b` with this edge,
    /// from the standard parametric line/edge solve.
    pub fn intersect<R: RealField>(&self, a: &Point2<R>, b: &Point2<R>) -> Point2<R> {
        let dx = b.x.clone() - a.x.clone();
        let dy = b.y.clone() - a.y.clone();

        match self {
            Edge::Left => {
                let y = a.y.clone() + dy * (c::<f64, R>(0.0) - a.x.clone()) / dx;
                Point2::new(c(0.0), y)
            }
            Edge::Right => {
                let y = a.y.clone() + dy * (c::<f64, R>(1.0) - a.x.clone()) / dx;
                Point2::new(c(1.0), y)
            }
            Edge::Bottom => {
                let x = a.x.clone() + dx * (c::<f64, R>(0.0) - a.y.clone()) / dy;
                Point2::new(x, c(0.0))
            }
            Edge::Top => {
                let x = a.x.clone() + dx * (c::<f64, R>(1.0) - a.y.clone()) / dy;
                Point2::new(x, c(1.0))
            }
        }
    }
}

fn outcode<R: RealField>(p: &Point2<R>) -> u8 {
    let mut code = INSIDE;
    if p.x < R::zero() {
        code |= LEFT;
    }
    if p.x > R::one() {
        code |= RIGHT;
    }
    if p.y < R::zero() {
        code |= BOTTOM;
    }
    if p.y > R::one() {
        code |= TOP;
    }
    code
}

fn decide(out0: u8, out1: u8) -> ClipDecision {
    if out0 | out1 == INSIDE {
        return ClipDecision::Accept;
    }
    if out0 & out1 != INSIDE {
        return ClipDecision::Reject;
    }
    let outside = if out0 != INSIDE { out0 } else { out1 };
    let edge = if outside & TOP != 0 {
        Edge::Top
    } else if outside & BOTTOM != 0 {
        Edge::Bottom
    } else if outside & RIGHT != 0 {
        Edge::Right
    } else {
        Edge::Left
    };
    ClipDecision::Clip(edge)
}

/// A segment clipped to the unit viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct ClippedScreenSegment<R: RealField> {
    /// Overall visibility of the segment.
    pub visibility: LineVisibility,
    /// The endpoints after clipping.
    pub points: [Point2<R>; 2],
    /// Per-endpoint visibility, taken from each endpoint's original
    /// pre-clip outcode.
    pub flags: [Visibility; 2],
}

/// Clip a screen-space segment against the four viewport edges.
///
/// Both points must already be in normalized screen coordinates; see the
/// module documentation for the behind-camera precondition.
pub fn clip_segment<R: RealField>(a: Point2<R>, b: Point2<R>) -> ClippedScreenSegment<R> {
    let original = [outcode(&a), outcode(&b)];
    let mut points = [a, b];
    let mut out = original;

    let mut clipped_any = false;
    let visibility = loop {
        match decide(out[0], out[1]) {
            ClipDecision::Accept => {
                break if clipped_any {
                    LineVisibility::Partial
                } else {
                    LineVisibility::Visible
                };
            }
            ClipDecision::Reject => break LineVisibility::Clipped,
            ClipDecision::Clip(edge) => {
                clipped_any = true;
                let idx = if out[0] != INSIDE { 0 } else { 1 };
                let intersection = edge.intersect(&points[0], &points[1]);
                points[idx] = intersection;
                out[idx] = outcode(&points[idx]);
            }
        }
    };

    let flags = original.map(|code| {
        if code == INSIDE {
            Visibility::Visible
        } else {
            Visibility::Clipped
        }
    });

    ClippedScreenSegment {
        visibility,
        points,
        flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn fully_inside_segment_is_untouched() {
        let clipped = clip_segment(p(0.1, 0.2), p(0.9, 0.8));
        assert_eq!(clipped.visibility, LineVisibility::Visible);
        assert_eq!(clipped.points, [p(0.1, 0.2), p(0.9, 0.8)]);
        assert_eq!(clipped.flags, [Visibility::Visible, Visibility::Visible]);
    }

    #[test]
    fn endpoint_past_right_edge_is_clipped_to_boundary() {
        let clipped = clip_segment(p(0.5, 0.5), p(1.5, 0.5));
        assert_eq!(clipped.visibility, LineVisibility::Partial);
        assert_eq!(clipped.points[1], p(1.0, 0.5));
        // The clipped endpoint keeps its original outside flag even though
        // its stored position is now on the edge.
        assert_eq!(clipped.flags, [Visibility::Visible, Visibility::Clipped]);
    }

    #[test]
    fn segment_sharing_an_outside_region_is_trivially_rejected() {
        let clipped = clip_segment(p(1.2, 0.1), p(1.5, 0.9));
        assert_eq!(clipped.visibility, LineVisibility::Clipped);
        // Trivial reject leaves the points untouched.
        assert_eq!(clipped.points, [p(1.2, 0.1), p(1.5, 0.9)]);
    }

    #[test]
    fn segment_spanning_the_viewport_clips_both_ends() {
        let clipped = clip_segment(p(-0.5, 0.5), p(1.5, 0.5));
        assert_eq!(clipped.visibility, LineVisibility::Partial);
        assert_eq!(clipped.points, [p(0.0, 0.5), p(1.0, 0.5)]);
        assert_eq!(clipped.flags, [Visibility::Clipped, Visibility::Clipped]);
    }

    #[test]
    fn corner_miss_is_rejected_after_one_clip_step() {
        // Both endpoints are outside different edges but the segment never
        // enters the viewport: the first clip step exposes the shared
        // outside region.
        let clipped = clip_segment(p(-0.5, 0.9), p(0.1, 1.5));
        assert_eq!(clipped.visibility, LineVisibility::Clipped);
    }

    #[test]
    fn diagonal_crossing_lands_on_both_edges() {
        let clipped = clip_segment(p(-0.2, 0.3), p(1.1, 0.9));
        assert_eq!(clipped.visibility, LineVisibility::Partial);

        let [e0, e1] = clipped.points;
        approx::assert_abs_diff_eq!(e0.x, 0.0, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(e1.x, 1.0, epsilon = 1e-12);
        // Both intersections stay on the original line.
        let slope = (0.9 - 0.3) / (1.1 + 0.2);
        approx::assert_abs_diff_eq!(e0.y, 0.3 + slope * 0.2, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(e1.y, 0.3 + slope * 1.2, epsilon = 1e-12);
    }

    #[test]
    fn edge_solutions_are_exact() {
        let a = p(0.5, -0.5);
        let b = p(0.5, 1.5);
        assert_eq!(Edge::Bottom.intersect(&a, &b), p(0.5, 0.0));
        assert_eq!(Edge::Top.intersect(&a, &b), p(0.5, 1.0));

        let a = p(-1.0, 0.0);
        let b = p(3.0, 1.0);
        assert_eq!(Edge::Left.intersect(&a, &b), p(0.0, 0.25));
        assert_eq!(Edge::Right.intersect(&a, &b), p(1.0, 0.5));
    }
}
