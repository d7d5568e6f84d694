use nalgebra::{convert, Matrix4, Point3, RealField, RowVector4, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use crate::view_matrix::{build_view_matrix, direction, ndc_to_screen};
use crate::{clip3d, ProjectedLine, ProjectedPoint, Visibility};

/// A perspective camera with fixed intrinsics that projects world
/// coordinates onto the unit viewport.
///
/// All fields are fixed for the camera's lifetime. The view matrix is a
/// pure function of the other fields, computed once at construction and
/// never recomputed, so a `Camera` can be read concurrently from several
/// threads without synchronization.
///
/// Construction parameters are not validated: `near >= far` or a field of
/// view outside (0°, 180°) are caller-avoided undefined behavior that
/// surface as NaN or infinite projection results.
///
/// # Examples
///
/// ```
/// use clip_geom::*;
/// use nalgebra::{Point3, Vector3};
///
/// let camera = Camera::from_view(
///     Point3::new(0.0, 1.0, 0.0),
///     Vector3::new(0.0, 0.0, 1.0),
///     Vector3::new(0.0, 1.0, 0.0),
///     90.0, 16.0 / 9.0, 1.0, 1000.0,
/// );
///
/// let result = camera.project(&Point3::new(0.0, 1.0, 10.0));
/// assert_eq!(result.visibility, Visibility::Visible);
/// approx::assert_abs_diff_eq!(result.position.x, 0.5);
/// approx::assert_abs_diff_eq!(result.position.y, 0.5);
/// approx::assert_abs_diff_eq!(result.distance, 10.0);
/// ```
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize))]
pub struct Camera<R: RealField> {
    position: Point3<R>,
    forward: Vector3<R>,
    up: Vector3<R>,
    fov: R,
    aspect: R,
    near: R,
    far: R,
    #[cfg_attr(feature = "serde-serialize", serde(skip))]
    view: Matrix4<R>,
}

impl<R: RealField> std::fmt::Debug for Camera<R> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // This should match the auto derived Debug implementation but not
        // print the cached view matrix.
        fmt.debug_struct("Camera")
            .field("position", &self.position)
            .field("forward", &self.forward)
            .field("up", &self.up)
            .field("fov", &self.fov)
            .field("aspect", &self.aspect)
            .field("near", &self.near)
            .field("far", &self.far)
            .finish()
    }
}

impl<R: RealField> Camera<R> {
    /// Create a camera from a position and a forward direction.
    ///
    /// `fov` is the vertical field of view in degrees. The `up` vector is
    /// stored but does not influence the view rotation, which is derived
    /// from `forward` alone; camera roll is always zero (see DESIGN.md).
    pub fn from_view(
        position: Point3<R>,
        forward: Vector3<R>,
        up: Vector3<R>,
        fov: R,
        aspect: R,
        near: R,
        far: R,
    ) -> Self {
        let view = build_view_matrix(
            &position,
            &forward,
            fov.clone(),
            aspect.clone(),
            near.clone(),
            far.clone(),
        );
        Self {
            position,
            forward,
            up,
            fov,
            aspect,
            near,
            far,
            view,
        }
    }

    /// Create a camera from a position and yaw/pitch angles in degrees.
    ///
    /// The forward direction is built with [`direction`], using the angle
    /// convention of the recorded-event feeds this library annotates.
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
        let up = Vector3::new(R::zero(), R::one(), R::zero());
        Self::from_view(position, forward, up, fov, aspect, near, far)
    }

    /// Return the camera position.
    #[inline]
    pub fn position(&self) -> &Point3<R> {
        &self.position
    }

    /// Return the forward direction.
    #[inline]
    pub fn forward(&self) -> &Vector3<R> {
        &self.forward
    }

    /// Return the stored up vector.
    #[inline]
    pub fn up(&self) -> &Vector3<R> {
        &self.up
    }

    /// Return the vertical field of view in degrees.
    #[inline]
    pub fn fov(&self) -> R {
        self.fov.clone()
    }

    /// Return the aspect ratio.
    #[inline]
    pub fn aspect(&self) -> R {
        self.aspect.clone()
    }

    /// Return the near plane distance.
    #[inline]
    pub fn near(&self) -> R {
        self.near.clone()
    }

    /// Return the far plane distance.
    #[inline]
    pub fn far(&self) -> R {
        self.far.clone()
    }

    /// Return the precomputed view matrix.
    #[inline]
    pub fn view_matrix(&self) -> &Matrix4<R> {
        &self.view
    }

    /// Project a world point to normalized screen coordinates.
    ///
    /// The point is tagged [`Visibility::Clipped`] when its normalized
    /// device coordinates fall outside `[-1, 1]` in x or y, or when the
    /// depth channel is negative. The position is returned either way.
    pub fn project(&self, point: &Point3<R>) -> ProjectedPoint<R> {
        let distance = nalgebra::distance(&self.position, point);

        let h = point.to_homogeneous().transpose() * &self.view;
        let x = h[0].clone() / h[3].clone();
        let y = h[1].clone() / h[3].clone();
        let z = h[2].clone() / h[3].clone();

        let one: R = convert(1.0);
        let visibility = if x.clone().abs() > one.clone()
            || y.clone().abs() > one
            || z < R::zero()
        {
            Visibility::Clipped
        } else {
            Visibility::Visible
        };

        let position = ndc_to_screen(RowVector4::new(x, y, z, convert(1.0)));
        ProjectedPoint {
            visibility,
            position,
            distance,
        }
    }

    /// Project a world segment, clipping it to the view frustum.
    ///
    /// Clipping runs in homogeneous clip space before the perspective
    /// divide (see [`clip3d`](crate::clip3d)), so segments crossing the
    /// camera plane are handled correctly.
    pub fn project_line(&self, a: &Point3<R>, b: &Point3<R>) -> ProjectedLine<R> {
        let distance_a = nalgebra::distance(&self.position, a);
        let distance_b = nalgebra::distance(&self.position, b);

        let h0 = a.to_homogeneous().transpose() * &self.view;
        let h1 = b.to_homogeneous().transpose() * &self.view;

        let clipped = clip3d::clip_segment(h0, h1, self.far.clone());
        let [p0, p1] = clip3d::to_screen(&clipped);

        ProjectedLine {
            visibility: clipped.visibility,
            from: ProjectedPoint {
                visibility: clipped.flags[0],
                position: p0,
                distance: distance_a,
            },
            to: ProjectedPoint {
                visibility: clipped.flags[1],
                position: p1,
                distance: distance_b,
            },
        }
    }

    /// Lazily project a sequence of world points.
    ///
    /// The returned iterator is order-preserving and one-to-one: no
    /// filtering takes place, clipped points are simply tagged.
    pub fn project_points<'a, I>(
        &'a self,
        points: I,
    ) -> impl Iterator<Item = ProjectedPoint<R>> + 'a
    where
        I: IntoIterator<Item = Point3<R>>,
        I::IntoIter: 'a,
    {
        points.into_iter().map(move |point| self.project(&point))
    }
}

// The view matrix is skipped during serialization and rebuilt through the
// constructor on deserialize; see the note about serde derive for cached
// fields on the teacher type this mirrors.
#[cfg(feature = "serde-serialize")]
impl<'de, R: RealField + serde::Deserialize<'de>> serde::Deserialize<'de> for Camera<R> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de;
        use std::fmt;

        #[derive(Deserialize)]
        #[serde(field_identifier, rename_all = "lowercase")]
        enum Field {
            Position,
            Forward,
            Up,
            Fov,
            Aspect,
            Near,
            Far,
        }

        struct CameraVisitor<'de, R2: RealField + serde::Deserialize<'de>>(
            std::marker::PhantomData<&'de R2>,
        );

        impl<'de, R2: RealField + serde::Deserialize<'de>> serde::de::Visitor<'de>
            for CameraVisitor<'de, R2>
        {
            type Value = Camera<R2>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("struct Camera")
            }

            fn visit_seq<V>(self, mut seq: V) -> std::result::Result<Camera<R2>, V::Error>
            where
                V: serde::de::SeqAccess<'de>,
            {
                let position = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let forward = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                let up = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(2, &self))?;
                let fov = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(3, &self))?;
                let aspect = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(4, &self))?;
                let near = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(5, &self))?;
                let far = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(6, &self))?;
                Ok(Camera::from_view(
                    position, forward, up, fov, aspect, near, far,
                ))
            }

            fn visit_map<V>(self, mut map: V) -> std::result::Result<Camera<R2>, V::Error>
            where
                V: serde::de::MapAccess<'de>,
            {
                let mut position = None;
                let mut forward = None;
                let mut up = None;
                let mut fov = None;
                let mut aspect = None;
                let mut near = None;
                let mut far = None;
                while let Some(key) = map.next_key()? {
                    match key {
                        Field::Position => {
                            if position.is_some() {
                                return Err(de::Error::duplicate_field("position"));
                            }
                            position = Some(map.next_value()?);
                        }
                        Field::Forward => {
                            if forward.is_some() {
                                return Err(de::Error::duplicate_field("forward"));
                            }
                            forward = Some(map.next_value()?);
                        }
                        Field::Up => {
                            if up.is_some() {
                                return Err(de::Error::duplicate_field("up"));
                            }
                            up = Some(map.next_value()?);
                        }
                        Field::Fov => {
                            if fov.is_some() {
                                return Err(de::Error::duplicate_field("fov"));
                            }
                            fov = Some(map.next_value()?);
                        }
                        Field::Aspect => {
                            if aspect.is_some() {
                                return Err(de::Error::duplicate_field("aspect"));
                            }
                            aspect = Some(map.next_value()?);
                        }
                        Field::Near => {
                            if near.is_some() {
                                return Err(de::Error::duplicate_field("near"));
                            }
                            near = Some(map.next_value()?);
                        }
                        Field::Far => {
                            if far.is_some() {
                                return Err(de::Error::duplicate_field("far"));
                            }
                            far = Some(map.next_value()?);
                        }
                    }
                }
                let position = position.ok_or_else(|| de::Error::missing_field("position"))?;
                let forward = forward.ok_or_else(|| de::Error::missing_field("forward"))?;
                let up = up.ok_or_else(|| de::Error::missing_field("up"))?;
                let fov = fov.ok_or_else(|| de::Error::missing_field("fov"))?;
                let aspect = aspect.ok_or_else(|| de::Error::missing_field("aspect"))?;
                let near = near.ok_or_else(|| de::Error::missing_field("near"))?;
                let far = far.ok_or_else(|| de::Error::missing_field("far"))?;
                Ok(Camera::from_view(
                    position, forward, up, fov, aspect, near, far,
                ))
            }
        }

        const FIELDS: &[&str] = &[
            "position", "forward", "up", "fov", "aspect", "near", "far",
        ];
        deserializer.deserialize_struct("Camera", FIELDS, CameraVisitor(std::marker::PhantomData))
    }
}

#[cfg(feature = "serde-serialize")]
fn _test_camera_is_serialize() {
    // Compile-time test to ensure Camera implements Serialize trait.
    fn implements<T: serde::Serialize>() {}
    implements::<Camera<f64>>();
}

#[cfg(feature = "serde-serialize")]
fn _test_camera_is_deserialize() {
    // Compile-time test to ensure Camera implements Deserialize trait.
    fn implements<'de, T: serde::Deserialize<'de>>() {}
    implements::<Camera<f64>>();
}
