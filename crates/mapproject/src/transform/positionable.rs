//! Rigid placement of a native transform in volume space.

use nalgebra::{Rotation3, Vector3};

use super::{CoordinateTransform, InvertibleTransform, RealLocalizable, TransformError};

/// Cartesian axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    fn unit(self) -> nalgebra::Unit<Vector3<f64>> {
        match self {
            Self::X => Vector3::x_axis(),
            Self::Y => Vector3::y_axis(),
            Self::Z => Vector3::z_axis(),
        }
    }
}

impl TryFrom<usize> for Axis {
    type Error = TransformError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::X),
            1 => Ok(Self::Y),
            2 => Ok(Self::Z),
            other => Err(TransformError::InvalidAxis(other)),
        }
    }
}

/// Wraps a native-to-Cartesian transform with a position and per-axis rotations.
///
/// Forward: `p' = Rx · Ry · Rz · f(p) + t`, so the accumulated Z rotation is
/// applied first and the translation last. The inverse undoes the steps in
/// reverse order and is only available when the wrapped transform is
/// invertible.
#[derive(Debug, Clone)]
pub struct PositionableTransform<Tr> {
    transform: Tr,
    rotations: [Rotation3<f64>; 3],
    composed: Rotation3<f64>,
    translation: Vector3<f64>,
}

impl<Tr> PositionableTransform<Tr> {
    /// Place `transform` at the origin with no rotation.
    pub fn new(transform: Tr) -> Self {
        Self {
            transform,
            rotations: [Rotation3::identity(); 3],
            composed: Rotation3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// The wrapped native transform.
    pub fn inner(&self) -> &Tr {
        &self.transform
    }

    // ── rotation ──

    /// Accumulate a rotation of `radians` about `axis`.
    pub fn rotate(&mut self, axis: Axis, radians: f64) {
        let step = Rotation3::from_axis_angle(&axis.unit(), radians);
        let r = &mut self.rotations[axis.index()];
        *r = step * *r;
        let [rx, ry, rz] = self.rotations;
        self.composed = rx * ry * rz;
    }

    /// Accumulate a rotation about the axis with index `axis`.
    pub fn rotate_index(&mut self, axis: usize, radians: f64) -> Result<(), TransformError> {
        self.rotate(Axis::try_from(axis)?, radians);
        Ok(())
    }

    /// Accumulated rotation about one axis.
    pub fn rotation(&self, axis: Axis) -> &Rotation3<f64> {
        &self.rotations[axis.index()]
    }

    /// Combined rotation `Rx · Ry · Rz`.
    pub fn composed_rotation(&self) -> &Rotation3<f64> {
        &self.composed
    }

    // ── position ──

    /// Current translation.
    pub fn position(&self) -> [f64; 3] {
        [self.translation.x, self.translation.y, self.translation.z]
    }

    pub fn position_axis(&self, axis: Axis) -> f64 {
        self.translation[axis.index()]
    }

    pub fn set_position<V: Into<f64> + Copy>(&mut self, position: [V; 3]) {
        let position: [f64; 3] = position.map(Into::into);
        self.translation = Vector3::from(position);
    }

    pub fn set_position_axis<V: Into<f64>>(&mut self, axis: Axis, value: V) {
        self.translation[axis.index()] = value.into();
    }

    pub fn set_position_from<L: RealLocalizable<3>>(&mut self, position: &L) {
        self.translation = Vector3::from(position.real_position());
    }

    pub fn move_by<V: Into<f64> + Copy>(&mut self, distance: [V; 3]) {
        let distance: [f64; 3] = distance.map(Into::into);
        self.translation += Vector3::from(distance);
    }

    pub fn move_axis<V: Into<f64>>(&mut self, axis: Axis, distance: V) {
        self.translation[axis.index()] += distance.into();
    }

    pub fn move_by_localizable<L: RealLocalizable<3>>(&mut self, distance: &L) {
        self.translation += Vector3::from(distance.real_position());
    }

    /// Step one unit forward along `axis`.
    pub fn fwd(&mut self, axis: Axis) {
        self.translation[axis.index()] += 1.0;
    }

    /// Step one unit backward along `axis`.
    pub fn bck(&mut self, axis: Axis) {
        self.translation[axis.index()] -= 1.0;
    }
}

impl<Tr> RealLocalizable<3> for PositionableTransform<Tr> {
    fn real_position(&self) -> [f64; 3] {
        self.position()
    }
}

impl<Tr, const S: usize> CoordinateTransform<S, 3> for PositionableTransform<Tr>
where
    Tr: CoordinateTransform<S, 3>,
{
    #[inline]
    fn apply(&self, source: [f64; S]) -> [f64; 3] {
        let p = self.composed * Vector3::from(self.transform.apply(source)) + self.translation;
        [p.x, p.y, p.z]
    }
}

impl<Tr, const S: usize> InvertibleTransform<S, 3> for PositionableTransform<Tr>
where
    Tr: InvertibleTransform<S, 3>,
{
    #[inline]
    fn apply_inverse(&self, target: [f64; 3]) -> [f64; S] {
        let local = self.composed.inverse() * (Vector3::from(target) - self.translation);
        self.transform.apply_inverse([local.x, local.y, local.z])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{angle_diff, seeded};
    use crate::transform::{IdentityTransform, SphericalToCartesian};
    use approx::assert_abs_diff_eq;
    use rand::Rng;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS: f64 = 1e-12;

    fn assert_close(got: [f64; 3], expected: [f64; 3]) {
        for d in 0..3 {
            assert_abs_diff_eq!(got[d], expected[d], epsilon = EPS);
        }
    }

    #[test]
    fn identity_without_pose() {
        let t = PositionableTransform::new(IdentityTransform);
        for p in [[-5.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, -5.0]] {
            assert_close(t.apply(p), p);
            assert_close(t.apply_inverse(p), p);
        }
    }

    #[test]
    fn rotations_accumulate_per_axis() {
        let mut t = PositionableTransform::new(IdentityTransform);

        t.rotate(Axis::X, FRAC_PI_2);
        assert_close(t.apply([-5.0, 0.0, 0.0]), [-5.0, 0.0, 0.0]);

        t.rotate(Axis::X, FRAC_PI_2);
        assert_close(t.apply([0.0, -5.0, 0.0]), [0.0, 5.0, 0.0]);

        t.rotate(Axis::X, FRAC_PI_2);
        assert_close(t.apply([0.0, 0.0, -5.0]), [0.0, -5.0, 0.0]);

        t.rotate(Axis::Y, FRAC_PI_2);
        assert_close(t.apply([-5.0, 0.0, 0.0]), [0.0, 5.0, 0.0]);

        t.rotate(Axis::Y, FRAC_PI_2);
        assert_close(t.apply([0.0, -5.0, 0.0]), [0.0, 0.0, 5.0]);

        t.rotate(Axis::Y, FRAC_PI_2);
        assert_close(t.apply([0.0, 0.0, -5.0]), [5.0, 0.0, 0.0]);

        t.rotate(Axis::Z, FRAC_PI_2);
        assert_close(t.apply([-5.0, 0.0, 0.0]), [0.0, 0.0, 5.0]);
    }

    #[test]
    fn single_axis_rotation_is_right_handed() {
        let mut t = PositionableTransform::new(IdentityTransform);
        t.rotate(Axis::Z, FRAC_PI_2);
        assert_close(t.apply([1.0, 0.0, 0.0]), [0.0, 1.0, 0.0]);
        t.rotate(Axis::Z, -FRAC_PI_2);
        assert_close(t.apply([1.0, 0.0, 0.0]), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn translation_applies_after_rotation() {
        let mut t = PositionableTransform::new(IdentityTransform);
        t.set_position([10i32, 20, 30]);
        t.rotate(Axis::Z, PI);
        assert_close(t.apply([1.0, 0.0, 0.0]), [9.0, 20.0, 30.0]);
        assert_close(t.apply_inverse([9.0, 20.0, 30.0]), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn position_mutators() {
        let mut t = PositionableTransform::new(SphericalToCartesian);
        t.set_position([1.0f32, 2.0, 3.0]);
        t.move_by([1u32, 1, 1]);
        t.move_axis(Axis::Z, -0.5);
        t.fwd(Axis::X);
        t.bck(Axis::Y);
        assert_eq!(t.position(), [3.0, 2.0, 3.5]);
        t.set_position_axis(Axis::Y, 7i32);
        assert_eq!(t.position_axis(Axis::Y), 7.0);

        let mut other = PositionableTransform::new(IdentityTransform);
        other.set_position_from(&t);
        other.move_by_localizable(&[1.0f64, 1.0, 1.0]);
        assert_eq!(other.position(), [4.0, 8.0, 4.5]);
    }

    #[test]
    fn rotate_index_rejects_bad_axis() {
        let mut t = PositionableTransform::new(IdentityTransform);
        assert_eq!(t.rotate_index(3, 1.0), Err(TransformError::InvalidAxis(3)));
        assert!(t.rotate_index(2, 1.0).is_ok());
    }

    #[test]
    fn round_trip_with_pose() {
        let mut t = PositionableTransform::new(SphericalToCartesian);
        t.set_position([600.0, 600.0, 425.0]);
        t.rotate(Axis::X, 0.3);
        t.rotate(Axis::Y, -1.1);
        t.rotate(Axis::Z, 2.0);
        let src = [120.0, 1.2, -0.4];
        let back = t.apply_inverse(t.apply(src));
        for d in 0..3 {
            assert_abs_diff_eq!(back[d], src[d], epsilon = 1e-9);
        }
    }

    fn random_spherical(rng: &mut impl Rng) -> [f64; 3] {
        [
            rng.gen_range(5.0..200.0),
            rng.gen_range(0.05..PI - 0.05),
            rng.gen_range(-PI..PI),
        ]
    }

    #[test]
    fn unposed_matches_wrapped_transform() {
        let t = PositionableTransform::new(SphericalToCartesian);
        let mut rng = seeded(505);
        for _ in 0..2_000 {
            let src = random_spherical(&mut rng);
            assert_close(t.apply(src), SphericalToCartesian.apply(src));
            let p = SphericalToCartesian.apply(src);
            assert_close(t.apply_inverse(p), SphericalToCartesian.apply_inverse(p));
        }
    }

    #[test]
    fn random_poses_round_trip() {
        let mut rng = seeded(606);
        for _ in 0..200 {
            let mut t = PositionableTransform::new(SphericalToCartesian);
            t.set_position([
                rng.gen_range(-500.0..500.0),
                rng.gen_range(-500.0..500.0),
                rng.gen_range(-500.0..500.0),
            ]);
            for axis in Axis::ALL {
                t.rotate(axis, rng.gen_range(-PI..PI));
            }
            for _ in 0..50 {
                let src = random_spherical(&mut rng);
                let back = t.apply_inverse(t.apply(src));
                assert_abs_diff_eq!(back[0], src[0], epsilon = 1e-8);
                assert_abs_diff_eq!(back[1], src[1], epsilon = 1e-8);
                assert_abs_diff_eq!(angle_diff(back[2], src[2]), 0.0, epsilon = 1e-8);
            }
        }
    }
}
