//! Integer-lattice line walks and statistics over the visited voxels.

use serde::{Deserialize, Serialize};

use crate::volume::Volume;

/// Lattice points along a straight line between two grid points.
///
/// Position `k` is `round(start + k·step)` where `step` advances one unit on
/// the dominant axis, so the walk ends exactly on `end`.
#[derive(Debug, Clone)]
pub struct GridLine<const N: usize> {
    start: [i64; N],
    step: [f64; N],
    n_steps: usize,
    k: usize,
}

impl<const N: usize> GridLine<N> {
    /// Walk from `start` to `end` inclusive. With `include_start == false`
    /// the first yielded point is the one after `start`.
    pub fn new(start: [i64; N], end: [i64; N], include_start: bool) -> Self {
        let delta: [i64; N] = std::array::from_fn(|d| end[d] - start[d]);
        let n_steps = delta.iter().map(|d| d.unsigned_abs()).max().unwrap_or(0) as usize;
        let step = if n_steps == 0 {
            [0.0; N]
        } else {
            delta.map(|d| d as f64 / n_steps as f64)
        };
        Self {
            start,
            step,
            n_steps,
            k: usize::from(!include_start),
        }
    }

    /// Number of unit steps between the endpoints.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }
}

impl<const N: usize> Iterator for GridLine<N> {
    type Item = [i64; N];

    fn next(&mut self) -> Option<Self::Item> {
        if self.k > self.n_steps {
            return None;
        }
        let k = self.k as f64;
        self.k += 1;
        Some(std::array::from_fn(|d| {
            self.start[d] + (k * self.step[d]).round() as i64
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.n_steps + 1).saturating_sub(self.k);
        (left, Some(left))
    }
}

impl<const N: usize> ExactSizeIterator for GridLine<N> {}

/// Statistic computed over the voxels visited by a [`GridLine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridStatistic {
    #[default]
    Max,
    Min,
    Mean,
}

impl GridStatistic {
    pub fn name(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
            Self::Mean => "mean",
        }
    }
}

impl std::str::FromStr for GridStatistic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "max" | "maximum" => Ok(Self::Max),
            "min" | "minimum" => Ok(Self::Min),
            "mean" | "average" => Ok(Self::Mean),
            other => Err(format!("unknown statistic '{}'", other)),
        }
    }
}

/// Reads raw voxels along integer grid lines.
///
/// Points outside the volume are skipped; a line with no point inside has no
/// statistic.
#[derive(Debug, Clone, Copy)]
pub struct GridIntensityProjector<'a> {
    volume: &'a Volume<f32>,
}

impl<'a> GridIntensityProjector<'a> {
    pub fn new(volume: &'a Volume<f32>) -> Self {
        Self { volume }
    }

    /// Statistic over the inclusive line from `start` to `end`.
    pub fn compute(&self, start: [i64; 3], end: [i64; 3], statistic: GridStatistic) -> Option<f32> {
        let values = GridLine::new(start, end, true).filter_map(|p| self.volume.get_signed(p));
        match statistic {
            GridStatistic::Max => values.reduce(f32::max),
            GridStatistic::Min => values.reduce(f32::min),
            GridStatistic::Mean => {
                let (sum, n) = values.fold((0.0f64, 0usize), |(s, n), v| (s + v as f64, n + 1));
                (n > 0).then(|| (sum / n as f64) as f32)
            }
        }
    }

    pub fn maximum(&self, start: [i64; 3], end: [i64; 3]) -> Option<f32> {
        self.compute(start, end, GridStatistic::Max)
    }

    pub fn minimum(&self, start: [i64; 3], end: [i64; 3]) -> Option<f32> {
        self.compute(start, end, GridStatistic::Min)
    }

    pub fn mean(&self, start: [i64; 3], end: [i64; 3]) -> Option<f32> {
        self.compute(start, end, GridStatistic::Mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_visits_both_endpoints() {
        let pts: Vec<_> = GridLine::new([0i64, 0, 0], [4, 2, 0], true).collect();
        assert_eq!(pts.first(), Some(&[0, 0, 0]));
        assert_eq!(pts.last(), Some(&[4, 2, 0]));
        assert_eq!(pts.len(), 5);
        assert!(pts.windows(2).all(|w| (w[1][0] - w[0][0]) == 1));
    }

    #[test]
    fn excluding_start_skips_first_point() {
        let pts: Vec<_> = GridLine::new([3i64, 3], [3, 0], false).collect();
        assert_eq!(pts, vec![[3, 2], [3, 1], [3, 0]]);
    }

    #[test]
    fn single_point_line() {
        let pts: Vec<_> = GridLine::new([1i64, 1, 1], [1, 1, 1], true).collect();
        assert_eq!(pts, vec![[1, 1, 1]]);
        assert_eq!(GridLine::new([1i64, 1, 1], [1, 1, 1], false).count(), 0);
    }

    #[test]
    fn statistics_over_row() {
        let mut v = Volume::new(6, 1, 1);
        for x in 0..6 {
            v.set(x, 0, 0, [3.0, 1.0, 4.0, 1.0, 5.0, 9.0][x]);
        }
        let p = GridIntensityProjector::new(&v);
        assert_eq!(p.maximum([0, 0, 0], [4, 0, 0]), Some(5.0));
        assert_eq!(p.minimum([0, 0, 0], [4, 0, 0]), Some(1.0));
        assert_eq!(p.mean([0, 0, 0], [3, 0, 0]), Some(2.25));
        // points past the edge are ignored
        assert_eq!(p.maximum([3, 0, 0], [9, 0, 0]), Some(9.0));
        assert_eq!(p.mean([10, 0, 0], [12, 0, 0]), None);
    }
}
