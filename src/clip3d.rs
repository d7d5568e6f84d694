//! Cohen-Sutherland segment clipping in homogeneous clip space.
//!
//! Clipping runs on the raw view-matrix output (x, y, z, w), before the
//! perspective divide. This is the production path for line projection:
//! unlike the screen-space variant in [`clip2d`](crate::clip2d) it handles
//! endpoints behind the camera, because nothing has been divided by a
//! negative w yet.
//!
//! The clip volume is bounded by six planes expressed against the z
//! channel. Four of them are the usual symmetric frustum sides; the near
//! plane sits at `z = 0` and the far plane compares z against the camera's
//! configured far distance directly rather than using a w-relative test.
//! That far-plane convention is a quirk of this clipper, kept for parity
//! with the overlay pipeline it was extracted from.
//!
//! Each loop iteration makes one explicit decision: trivially accept,
//! trivially reject, or clip one endpoint against one named plane
//! with that plane's closed-form solution for the segment parameter t. The
//! six formulas are not interchangeable; each one snaps the coordinate it
//! solved for onto its plane instead of re-interpolating it, so a clipped
//! endpoint is numerically exactly on the boundary.

use nalgebra::{Point3, RealField, RowVector4};

use crate::view_matrix::ndc_to_screen;
use crate::{LineVisibility, Visibility};

/// Hard cap on clip-loop iterations.
///
/// This forces termination on degenerate or NaN input. When the cap is
/// hit, whatever partially clipped state exists is returned with no
/// distinct error signal; the cap is a liveness guarantee, not a
/// correctness guarantee.
pub const MAX_CLIP_ITERATIONS: usize = 30;

const INSIDE: u8 = 0;
const TOP: u8 = 0b00_0001;
const BOTTOM: u8 = 0b00_0010;
const RIGHT: u8 = 0b00_0100;
const LEFT: u8 = 0b00_1000;
const NEAR: u8 = 0b01_0000;
const FAR: u8 = 0b10_0000;

/// One of the six frustum planes bounding the clip volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipPlane {
    /// `y > z`.
    Top,
    /// `y < -z`.
    Bottom,
    /// `x > z`.
    Right,
    /// `x < -z`.
    Left,
    /// `z < 0`.
    Near,
    /// `z > far`, against the configured far distance.
    Far,
}

/// The decision taken on each clip-loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClipDecision {
    /// Both outcodes are zero: the remaining segment is inside.
    Accept,
    /// The outcodes share an outside region: nothing is visible.
    Reject,
    /// One endpoint violates the named plane and must be clipped to it.
    Clip(ClipPlane),
}

impl ClipPlane {
    /// Solve for the parameter t (along the segment from `h0` to `h1`) at
    /// which the segment crosses this plane.
    ///
    /// A parallel segment yields a zero denominator; the resulting
    /// infinity or NaN propagates into the clipped point uncaught, and the
    /// iteration cap keeps the loop finite.
    pub fn solve<R: RealField>(&self, h0: &RowVector4<R>, h1: &RowVector4<R>, far: &R) -> R {
        let (x0, y0, z0) = (h0[0].clone(), h0[1].clone(), h0[2].clone());
        let (x1, y1, z1) = (h1[0].clone(), h1[1].clone(), h1[2].clone());
        let dx = x1 - x0.clone();
        let dy = y1 - y0.clone();
        let dz = z1.clone() - z0.clone();

        match self {
            ClipPlane::Top => (z0 - y0) / (dy - dz),
            ClipPlane::Bottom => -(z0 + y0) / (dy + dz),
            ClipPlane::Right => (z0 - x0) / (dx - dz),
            ClipPlane::Left => -(z0 + x0) / (dx + dz),
            ClipPlane::Near => z0.clone() / (z0 - z1),
            ClipPlane::Far => (far.clone() - z0) / dz,
        }
    }

    /// Interpolate the segment at parameter `t` and snap the solved
    /// coordinate exactly onto this plane.
    pub fn at<R: RealField>(
        &self,
        h0: &RowVector4<R>,
        h1: &RowVector4<R>,
        t: R,
        far: &R,
    ) -> RowVector4<R> {
        let lerp = |i: usize| {
            let a = h0[i].clone();
            h0[i].clone() + t.clone() * (h1[i].clone() - a)
        };
        let (x, y, z, w) = (lerp(0), lerp(1), lerp(2), lerp(3));

        match self {
            ClipPlane::Top => RowVector4::new(x, z.clone(), z, w),
            ClipPlane::Bottom => RowVector4::new(x, -z.clone(), z, w),
            ClipPlane::Right => RowVector4::new(z.clone(), y, z, w),
            ClipPlane::Left => RowVector4::new(-z.clone(), y, z, w),
            ClipPlane::Near => RowVector4::new(x, y, R::zero(), w),
            ClipPlane::Far => RowVector4::new(x, y, far.clone(), w),
        }
    }
}

fn outcode<R: RealField>(h: &RowVector4<R>, far: &R) -> u8 {
    let (x, y, z) = (h[0].clone(), h[1].clone(), h[2].clone());
    let mut code = INSIDE;
    if y.clone() > z.clone() {
        code |= TOP;
    }
    if y < -z.clone() {
        code |= BOTTOM;
    }
    if x.clone() > z.clone() {
        code |= RIGHT;
    }
    if x < -z.clone() {
        code |= LEFT;
    }
    if z < R::zero() {
        code |= NEAR;
    }
    if z > far.clone() {
        code |= FAR;
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
    let plane = if outside & TOP != 0 {
        ClipPlane::Top
    } else if outside & BOTTOM != 0 {
        ClipPlane::Bottom
    } else if outside & RIGHT != 0 {
        ClipPlane::Right
    } else if outside & LEFT != 0 {
        ClipPlane::Left
    } else if outside & NEAR != 0 {
        ClipPlane::Near
    } else {
        ClipPlane::Far
    };
    ClipDecision::Clip(plane)
}

/// A segment clipped to the frustum, still in homogeneous clip space.
#[derive(Debug, Clone, PartialEq)]
pub struct ClippedSegment<R: RealField> {
    /// Overall visibility of the segment.
    pub visibility: LineVisibility,
    /// The endpoints after clipping, before the perspective divide.
    pub clip: [RowVector4<R>; 2],
    /// Per-endpoint visibility, taken from each endpoint's original
    /// pre-clip outcode: an endpoint that started outside is reported
    /// clipped even though its stored position is now on the boundary.
    pub flags: [Visibility; 2],
    /// The [t_min, t_max] parameter bracket touched by clip steps.
    /// Informational only; the clip loop never consults it.
    pub bracket: (R, R),
}

/// Clip a segment against the six frustum planes.
///
/// `h0` and `h1` are the endpoints' raw view-matrix output, before the
/// perspective divide. `far` is the camera's configured far distance.
pub fn clip_segment<R: RealField>(
    h0: RowVector4<R>,
    h1: RowVector4<R>,
    far: R,
) -> ClippedSegment<R> {
    let original = [outcode(&h0, &far), outcode(&h1, &far)];
    let mut h = [h0, h1];
    let mut out = original;

    let mut t_min = R::zero();
    let mut t_max = R::one();
    let mut clipped_any = false;
    let mut rejected = false;

    for _ in 0..MAX_CLIP_ITERATIONS {
        match decide(out[0], out[1]) {
            ClipDecision::Accept => break,
            ClipDecision::Reject => {
                rejected = true;
                break;
            }
            ClipDecision::Clip(plane) => {
                clipped_any = true;
                let idx = if out[0] != INSIDE { 0 } else { 1 };
                let t = plane.solve(&h[0], &h[1], &far);
                // Each iteration produces a fresh endpoint value; nothing
                // is mutated in place across iterations.
                let snapped = plane.at(&h[0], &h[1], t.clone(), &far);
                if idx == 0 {
                    t_min = t;
                } else {
                    t_max = t;
                }
                h[idx] = snapped;
                out[idx] = outcode(&h[idx], &far);
            }
        }
    }

    let visibility = if rejected {
        LineVisibility::Clipped
    } else if clipped_any {
        LineVisibility::Partial
    } else {
        LineVisibility::Visible
    };
    let flags = original.map(|code| {
        if code == INSIDE {
            Visibility::Visible
        } else {
            Visibility::Clipped
        }
    });

    ClippedSegment {
        visibility,
        clip: h,
        flags,
        bracket: (t_min, t_max),
    }
}

/// Perform the perspective divide on a clipped segment and remap both
/// endpoints to the unit viewport.
pub fn to_screen<R: RealField>(segment: &ClippedSegment<R>) -> [Point3<R>; 2] {
    let [h0, h1] = &segment.clip;
    let w0 = h0[3].clone();
    let w1 = h1[3].clone();

    let p0 = RowVector4::new(
        h0[0].clone() / w0.clone(),
        h0[1].clone() / w0.clone(),
        h0[2].clone() / w0.clone(),
        R::one(),
    );
    // Known quirk, preserved deliberately: the second endpoint's depth
    // divides the first endpoint's z by the first endpoint's w. The
    // viewport remap zeroes the z channel immediately afterwards, so
    // nothing downstream observes the shared depth. See DESIGN.md before
    // changing this.
    let p1 = RowVector4::new(
        h1[0].clone() / w1.clone(),
        h1[1].clone() / w1,
        h0[2].clone() / w0,
        R::one(),
    );

    [ndc_to_screen(p0), ndc_to_screen(p1)]
}
