//! Centroids of labelled regions.
//!
//! Label volumes use `0` for background. Slice positions are reported
//! 1-based, matching how slice stacks are numbered by acquisition tools;
//! [`LabelCenter::grid_position`] converts back to 0-based volume indices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::volume::{Volume, VoxelSize};

/// Centroid of one label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelCenter {
    pub label: u16,
    /// Number of voxels carrying the label.
    pub count: usize,
    pub x: f64,
    pub y: f64,
    /// Mean 1-based slice number.
    pub slice: f64,
}

impl LabelCenter {
    /// Centroid in 0-based volume coordinates.
    pub fn grid_position(&self) -> [f64; 3] {
        [self.x, self.y, self.slice - 1.0]
    }

    /// Centroid rounded to the nearest voxel, slice kept 1-based.
    pub fn rounded(&self) -> [i64; 3] {
        [self.x, self.y, self.slice].map(|c| c.round() as i64)
    }

    /// Physical position: `(x·vx, y·vy, (slice - 1)·vz)`.
    pub fn calibrated(&self, voxel: VoxelSize) -> [f64; 3] {
        let [x, y, z] = self.grid_position();
        [x * voxel.x, y * voxel.y, z * voxel.z]
    }
}

/// Centroid of every non-zero label, sorted by label.
pub fn find_label_centers(labels: &Volume<u16>) -> Vec<LabelCenter> {
    let [w, h, d] = labels.dims();
    let mut sums: BTreeMap<u16, ([f64; 3], usize)> = BTreeMap::new();
    for z in 0..d {
        let plane = labels.slice(z);
        for y in 0..h {
            for x in 0..w {
                let label = plane[y * w + x];
                if label == 0 {
                    continue;
                }
                let (acc, n) = sums.entry(label).or_insert(([0.0; 3], 0));
                acc[0] += x as f64;
                acc[1] += y as f64;
                acc[2] += (z + 1) as f64;
                *n += 1;
            }
        }
    }
    tracing::debug!(labels = sums.len(), "computed label centroids");
    sums.into_iter()
        .map(|(label, (acc, n))| {
            let n_f = n as f64;
            LabelCenter {
                label,
                count: n,
                x: acc[0] / n_f,
                y: acc[1] / n_f,
                slice: acc[2] / n_f,
            }
        })
        .collect()
}

/// How [`center_table`] reports positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CenterTableOptions {
    /// Round centroids to the nearest voxel first.
    pub round: bool,
    /// Convert to physical units; positions are 0-based otherwise.
    pub voxel_size: Option<VoxelSize>,
}

/// One row of a centroid table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CenterRow {
    pub label: u16,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Tabulate centroids in 0-based (or calibrated) coordinates.
pub fn center_table(centers: &[LabelCenter], options: CenterTableOptions) -> Vec<CenterRow> {
    centers
        .iter()
        .map(|c| {
            let mut c = *c;
            if options.round {
                let [x, y, slice] = c.rounded();
                c.x = x as f64;
                c.y = y as f64;
                c.slice = slice as f64;
            }
            let [x, y, z] = match options.voxel_size {
                Some(voxel) => c.calibrated(voxel),
                None => c.grid_position(),
            };
            CenterRow {
                label: c.label,
                x,
                y,
                z,
            }
        })
        .collect()
}

/// Draw each centroid as a cube of side `2·radius + 1` carrying its label.
/// Cubes are clipped to `dims`.
pub fn render_centers(centers: &[LabelCenter], dims: [usize; 3], radius: usize) -> Volume<u16> {
    let mut out = Volume::new(dims[0], dims[1], dims[2]);
    let r = i64::try_from(radius).unwrap_or(i64::MAX);
    for c in centers {
        let [cx, cy, slice] = c.rounded();
        let [xs, ys, zs] = [(cx, dims[0]), (cy, dims[1]), (slice - 1, dims[2])]
            .map(|(centre, len)| clipped_span(centre, r, len));
        for z in zs {
            for y in ys.clone() {
                for x in xs.clone() {
                    out.set(x, y, z, c.label);
                }
            }
        }
    }
    out
}

/// `[centre - r, centre + r]` intersected with `0..len`.
fn clipped_span(centre: i64, r: i64, len: usize) -> std::ops::Range<usize> {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let lo = centre.saturating_sub(r).clamp(0, len);
    let hi = centre.saturating_add(r).saturating_add(1).clamp(0, len);
    lo as usize..hi.max(lo) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn three_voxel_label() -> Volume<u16> {
        let mut v = Volume::new(10, 10, 5);
        v.set(1, 2, 0, 7);
        v.set(2, 2, 1, 7);
        v.set(3, 5, 3, 7);
        v.set(8, 8, 4, 3);
        v
    }

    #[test]
    fn centroid_is_arithmetic_mean() {
        let centers = find_label_centers(&three_voxel_label());
        assert_eq!(centers.len(), 2);
        assert_eq!(centers[0].label, 3);
        let c = centers[1];
        assert_eq!(c.label, 7);
        assert_eq!(c.count, 3);
        assert_abs_diff_eq!(c.x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.y, 3.0, epsilon = 1e-12);
        // slices 1, 2, 4
        assert_abs_diff_eq!(c.slice, 7.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.grid_position()[2], 4.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn calibration_drops_one_from_slice() {
        let c = LabelCenter {
            label: 1,
            count: 1,
            x: 4.0,
            y: 2.0,
            slice: 3.0,
        };
        let p = c.calibrated(VoxelSize::new(0.5, 0.25, 2.0));
        assert_eq!(p, [2.0, 0.5, 4.0]);
    }

    #[test]
    fn table_rounds_then_calibrates() {
        let centers = find_label_centers(&three_voxel_label());
        let rows = center_table(
            &centers,
            CenterTableOptions {
                round: true,
                voxel_size: Some(VoxelSize::new(1.0, 1.0, 3.0)),
            },
        );
        assert_eq!(rows[1], CenterRow { label: 7, x: 2.0, y: 3.0, z: 3.0 });
        let rows = center_table(&centers, CenterTableOptions::default());
        assert_eq!(rows[0], CenterRow { label: 3, x: 8.0, y: 8.0, z: 4.0 });
    }

    #[test]
    fn rendered_cubes_are_clipped() {
        let centers = find_label_centers(&three_voxel_label());
        let img = render_centers(&centers, [10, 10, 5], 1);
        // label 3 sits in the corner (8, 8, slice 5): its cube is clipped
        assert_eq!(img.get(9, 9, 4), Some(3));
        assert_eq!(img.get(7, 7, 3), Some(3));
        assert_eq!(img.as_slice().iter().filter(|&&v| v == 3).count(), 3 * 3 * 2);
        // label 7 centred at (2, 3, slice 2)
        assert_eq!(img.get(2, 3, 1), Some(7));
        assert_eq!(img.get(1, 2, 0), Some(7));
        assert_eq!(img.as_slice().iter().filter(|&&v| v == 7).count(), 27);
    }

    #[test]
    fn huge_render_radius_fills_only_the_volume() {
        let centers = find_label_centers(&three_voxel_label());
        let img = render_centers(&centers, [10, 10, 5], usize::MAX);
        // the later label overwrites every voxel
        assert!(img.as_slice().iter().all(|&v| v == 7));
    }

    #[test]
    fn spans_are_clipped_to_the_axis() {
        assert_eq!(clipped_span(2, 1, 10), 1..4);
        assert_eq!(clipped_span(0, 3, 10), 0..4);
        assert_eq!(clipped_span(9, 3, 10), 6..10);
        assert_eq!(clipped_span(-5, 1, 10), 0..0);
        assert_eq!(clipped_span(20, 1, 10), 10..10);
    }
}
