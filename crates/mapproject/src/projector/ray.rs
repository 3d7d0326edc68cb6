//! Straight sampling rays through continuous volume space.

/// Ray construction errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RayError {
    /// A start, end, or step coordinate is NaN or infinite.
    NonFinite,
    /// A ray with more than one sample needs a non-zero step.
    ZeroStep,
}

impl std::fmt::Display for RayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinite => write!(f, "ray coordinates must be finite"),
            Self::ZeroStep => write!(f, "ray step is zero on every axis"),
        }
    }
}

impl std::error::Error for RayError {}

/// Evenly spaced sample positions `start + k·step` for `k = 0..=n_steps`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    start: [f64; 3],
    step: [f64; 3],
    n_steps: usize,
}

impl Ray {
    /// Ray from `start` to `end` whose step advances one unit along the
    /// dominant axis.
    ///
    /// Coincident endpoints give a single-sample ray.
    pub fn between(start: [f64; 3], end: [f64; 3]) -> Result<Self, RayError> {
        if start.iter().chain(end.iter()).any(|c| !c.is_finite()) {
            return Err(RayError::NonFinite);
        }
        let delta = [end[0] - start[0], end[1] - start[1], end[2] - start[2]];
        let longest = delta.iter().fold(0.0f64, |m, d| m.max(d.abs()));
        if longest == 0.0 {
            return Ok(Self {
                start,
                step: [0.0; 3],
                n_steps: 0,
            });
        }
        let step = delta.map(|d| d / longest);
        let n_steps = (0..3)
            .filter(|&d| step[d] != 0.0)
            .map(|d| (delta[d] / step[d]).abs().round() as usize)
            .max()
            .unwrap_or(0);
        Ok(Self {
            start,
            step,
            n_steps,
        })
    }

    /// Ray with an explicit step and number of steps.
    pub fn with_step(start: [f64; 3], step: [f64; 3], n_steps: usize) -> Result<Self, RayError> {
        if start.iter().chain(step.iter()).any(|c| !c.is_finite()) {
            return Err(RayError::NonFinite);
        }
        if n_steps > 0 && step.iter().all(|&s| s == 0.0) {
            return Err(RayError::ZeroStep);
        }
        Ok(Self {
            start,
            step,
            n_steps,
        })
    }

    pub fn start(&self) -> [f64; 3] {
        self.start
    }

    pub fn step(&self) -> [f64; 3] {
        self.step
    }

    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Number of sample positions (`n_steps + 1`).
    pub fn len(&self) -> usize {
        self.n_steps + 1
    }

    /// A ray always has at least its start sample.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Last sample position.
    pub fn end(&self) -> [f64; 3] {
        self.point(self.n_steps)
    }

    /// Sample position `k`.
    #[inline]
    pub fn point(&self, k: usize) -> [f64; 3] {
        let k = k as f64;
        [
            self.start[0] + k * self.step[0],
            self.start[1] + k * self.step[1],
            self.start[2] + k * self.step[2],
        ]
    }

    /// Iterate all sample positions from start to end.
    pub fn points(&self) -> RayPoints {
        RayPoints { ray: *self, k: 0 }
    }
}

/// Iterator over the sample positions of a [`Ray`].
#[derive(Debug, Clone)]
pub struct RayPoints {
    ray: Ray,
    k: usize,
}

impl Iterator for RayPoints {
    type Item = [f64; 3];

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.k > self.ray.n_steps {
            return None;
        }
        let p = self.ray.point(self.k);
        self.k += 1;
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.ray.n_steps + 1).saturating_sub(self.k);
        (left, Some(left))
    }
}

impl ExactSizeIterator for RayPoints {}
