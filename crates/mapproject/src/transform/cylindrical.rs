use super::{CoordinateTransform, InvertibleTransform, PolarToCartesian};

/// `(r, θ, h)` to `(x, y, z)`: polar in the xy-plane, height passed through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CylindricalToCartesian;

impl CoordinateTransform<3, 3> for CylindricalToCartesian {
    #[inline]
    fn apply(&self, [r, theta, h]: [f64; 3]) -> [f64; 3] {
        let [x, y] = PolarToCartesian.apply([r, theta]);
        [x, y, h]
    }
}

impl InvertibleTransform<3, 3> for CylindricalToCartesian {
    #[inline]
    fn apply_inverse(&self, [x, y, z]: [f64; 3]) -> [f64; 3] {
        let [r, theta] = PolarToCartesian.apply_inverse([x, y]);
        [r, theta, z]
    }
}
