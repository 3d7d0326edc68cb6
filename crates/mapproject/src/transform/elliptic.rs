use super::{CoordinateTransform, TransformError};

/// Elliptic coordinates `(μ, ν)` to `(x, y)` with focal distance `a`:
/// `x = a·cosh μ·cos ν`, `y = a·sinh μ·sin ν`.
///
/// The default focal distance is `0`, which collapses every point onto the
/// origin; set it with [`EllipticToCartesian::new`]. There is no inverse.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EllipticToCartesian {
    focal_distance: f64,
}

impl EllipticToCartesian {
    pub fn new(focal_distance: f64) -> Self {
        Self { focal_distance }
    }

    pub fn focal_distance(&self) -> f64 {
        self.focal_distance
    }

    /// Always fails with [`TransformError::UnsupportedInverse`].
    pub fn apply_inverse(&self, _target: [f64; 2]) -> Result<[f64; 2], TransformError> {
        Err(TransformError::UnsupportedInverse("elliptic coordinates"))
    }
}

impl CoordinateTransform<2, 2> for EllipticToCartesian {
    #[inline]
    fn apply(&self, [mu, nu]: [f64; 2]) -> [f64; 2] {
        let a = self.focal_distance;
        [a * mu.cosh() * nu.cos(), a * mu.sinh() * nu.sin()]
    }
}

/// Elliptic cylindrical coordinates `(μ, ν, z)` to `(x, y, z)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EllipticCylindricalToCartesian {
    elliptic: EllipticToCartesian,
}

impl EllipticCylindricalToCartesian {
    pub fn new(focal_distance: f64) -> Self {
        Self {
            elliptic: EllipticToCartesian::new(focal_distance),
        }
    }

    /// Always fails with [`TransformError::UnsupportedInverse`].
    pub fn apply_inverse(&self, _target: [f64; 3]) -> Result<[f64; 3], TransformError> {
        Err(TransformError::UnsupportedInverse("elliptic cylindrical coordinates"))
    }
}

impl CoordinateTransform<3, 3> for EllipticCylindricalToCartesian {
    #[inline]
    fn apply(&self, [mu, nu, z]: [f64; 3]) -> [f64; 3] {
        let [x, y] = self.elliptic.apply([mu, nu]);
        [x, y, z]
    }
}
