//! Raster grain machinery.
//!
//! A raster variant paints its cross-section onto a normalized square grid
//! (domain [-1, 1] across the casting tube, cells outside the unit circle
//! masked). A fast-marching distance transform turns the core map into a
//! regression map: each cell holds the regression depth at which it joins
//! the burned-out core. Geometry queries then reduce to thresholding that
//! map — marching squares for the burning perimeter, a cell count for the
//! face area.

use ndarray::Array2;

use srm_contour::{Connectedness, MIN_MAP_DIM, distance_field, find_contours};
use srm_geometry::{clean_contour, contour_length};

use crate::GrainError;

// Window width for the face-area lookup smoothing.
const FACE_AREA_SMOOTHING_WINDOW: usize = 31;

/// Edge exclusion band, in map cells, used when measuring perimeters. Keeps
/// numerically-induced segments where the core touches the casting tube from
/// counting as burning surface.
pub const EDGE_TOLERANCE_CELLS: f64 = 3.0;

/// Regression state of a raster cross-section, built once per grain at
/// simulation setup and immutable afterward.
#[derive(Debug, Clone)]
pub struct RasterCore {
    map_dim: usize,
    /// Regression depth at which each cell burns out, in normalized units
    /// (1.0 spans the grain radius).
    regression_map: Array2<f64>,
    mask: Array2<bool>,
    /// Largest regression depth on the map, in normalized units.
    wall_web_norm: f64,
    // Smoothed count of unburned cells per map-row of regression depth.
    face_cell_counts: Vec<f64>,
}

impl RasterCore {
    /// Builds the core for a cross-section described by `open`: given
    /// normalized coordinates in [-1, 1], return true where there is no
    /// propellant (the core cavity).
    pub fn build(
        map_dim: usize,
        open: impl Fn(f64, f64) -> bool,
    ) -> Result<RasterCore, GrainError> {
        if map_dim < MIN_MAP_DIM {
            return Err(srm_contour::ContourError::MapTooSmall {
                dim: map_dim,
                min: MIN_MAP_DIM,
            }
            .into());
        }

        let mut core_map = Array2::from_elem((map_dim, map_dim), 1.0);
        let mut mask = Array2::from_elem((map_dim, map_dim), false);
        let scale = 2.0 / (map_dim as f64 - 1.0);
        for r in 0..map_dim {
            for c in 0..map_dim {
                let x = -1.0 + c as f64 * scale;
                let y = -1.0 + r as f64 * scale;
                if x * x + y * y > 1.0 {
                    mask[[r, c]] = true;
                } else if open(x, y) {
                    core_map[[r, c]] = 0.0;
                }
            }
        }

        // Cell-unit distances, scaled so a value of 1.0 spans the radius.
        let mut regression_map = distance_field(&core_map, &mask);
        let cell_to_norm = 2.0 / map_dim as f64;
        regression_map.mapv_inplace(|d| d * cell_to_norm);

        let wall_web_norm = regression_map.iter().copied().fold(0.0, f64::max);

        let face_cell_counts = build_face_lookup(&regression_map, &mask, map_dim, wall_web_norm);

        Ok(RasterCore {
            map_dim,
            regression_map,
            mask,
            wall_web_norm,
            face_cell_counts,
        })
    }

    pub fn map_dim(&self) -> usize {
        self.map_dim
    }

    pub fn wall_web_norm(&self) -> f64 {
        self.wall_web_norm
    }

    pub fn regression_map(&self) -> &Array2<f64> {
        &self.regression_map
    }

    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    /// Burning perimeter at a normalized regression depth, in map cells,
    /// with the edge exclusion band applied.
    pub fn perimeter_cells(&self, norm_depth: f64) -> f64 {
        let contours = match find_contours(&self.regression_map, norm_depth, Connectedness::Low) {
            Ok(contours) => contours,
            Err(_) => return 0.0,
        };
        contours
            .iter()
            .map(|contour| contour_length(contour, self.map_dim as f64, EDGE_TOLERANCE_CELLS))
            .sum()
    }

    /// Unburned face cells remaining at a normalized regression depth,
    /// linearly interpolated between lookup samples.
    pub fn face_cells(&self, norm_depth: f64) -> f64 {
        let position = norm_depth * self.map_dim as f64;
        let index = position as usize;
        if position < 0.0 || index >= self.face_cell_counts.len() - 1 {
            // Past burnout.
            return 0.0;
        }
        let t = position - index as f64;
        self.face_cell_counts[index] * (1.0 - t) + self.face_cell_counts[index + 1] * t
    }
}

fn build_face_lookup(
    regression_map: &Array2<f64>,
    mask: &Array2<bool>,
    map_dim: usize,
    wall_web_norm: f64,
) -> Vec<f64> {
    // Sorting the in-domain depths once turns each level poll into a binary
    // search instead of a full sweep of the map.
    let mut depths: Vec<f64> = regression_map
        .indexed_iter()
        .filter(|((r, c), _)| !mask[[*r, *c]])
        .map(|(_, value)| *value)
        .collect();
    depths.sort_by(f64::total_cmp);

    let samples = (wall_web_norm * map_dim as f64) as usize + 2;
    let raw: Vec<f64> = (0..samples)
        .map(|i| {
            let level = i as f64 / map_dim as f64;
            let below = depths.partition_point(|d| *d <= level);
            (depths.len() - below) as f64
        })
        .collect();

    // Centered moving average knocks down the stair-stepping that cell
    // counting introduces. The window shrinks symmetrically at the ends so
    // the endpoint values are not dragged toward the interior.
    let half = FACE_AREA_SMOOTHING_WINDOW / 2;
    (0..raw.len())
        .map(|i| {
            let reach = half.min(i).min(raw.len() - 1 - i);
            let window = &raw[i - reach..=i + reach];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}

/// Converts a physical length (m) to normalized map units for a grain of the
/// given diameter.
pub fn normalize(value: f64, diameter_m: f64) -> f64 {
    value / (0.5 * diameter_m)
}

/// Converts normalized map units back to a physical length (m).
pub fn unnormalize(value: f64, diameter_m: f64) -> f64 {
    value / 2.0 * diameter_m
}

/// Converts a distance in map cells to meters.
pub fn map_to_length(cells: f64, diameter_m: f64, map_dim: usize) -> f64 {
    diameter_m * cells / map_dim as f64
}

/// Converts an area in map cells to square meters.
pub fn map_to_area(cells: f64, diameter_m: f64, map_dim: usize) -> f64 {
    diameter_m * diameter_m * cells / (map_dim * map_dim) as f64
}

// Shared `CoreShape` plumbing for raster variants, which all keep their
// regression state in an `Option<RasterCore>`.

pub(crate) fn wall_web(core: &Option<RasterCore>, diameter_m: f64) -> f64 {
    match core {
        Some(core) => unnormalize(core.wall_web_norm(), diameter_m),
        None => 0.0,
    }
}

pub(crate) fn core_perimeter(core: &Option<RasterCore>, diameter_m: f64, reg_dist: f64) -> f64 {
    match core {
        Some(core) => {
            let cells = core.perimeter_cells(normalize(reg_dist, diameter_m));
            map_to_length(cells, diameter_m, core.map_dim())
        }
        None => 0.0,
    }
}

pub(crate) fn face_area(core: &Option<RasterCore>, diameter_m: f64, reg_dist: f64) -> f64 {
    match core {
        Some(core) => {
            let cells = core.face_cells(normalize(reg_dist, diameter_m));
            map_to_area(cells, diameter_m, core.map_dim())
        }
        None => 0.0,
    }
}

pub(crate) fn setup(
    slot: &mut Option<RasterCore>,
    map_dim: usize,
    open: impl Fn(f64, f64) -> bool,
) -> Result<(), GrainError> {
    *slot = Some(RasterCore::build(map_dim, open)?);
    Ok(())
}

/// Preview data for a raster cross-section: the core map, the regression
/// map, and contour sets at equally spaced depths with their lengths.
#[derive(Debug, Clone)]
pub struct RegressionData {
    /// 0 where the core is open, 1 where propellant remains, NaN outside the
    /// casting tube.
    pub core_map: Array2<f64>,
    pub regression_map: Array2<f64>,
    /// One entry per contour level, each a set of cleaned polylines in map
    /// coordinates.
    pub contours: Vec<Vec<Vec<[f64; 2]>>>,
    /// Physical contour length (m) per level.
    pub contour_lengths: Vec<f64>,
}

/// Builds preview regression data for a raster cross-section at an arbitrary
/// map resolution, independent of any simulation setup state.
pub fn regression_data(
    map_dim: usize,
    num_contours: usize,
    diameter_m: f64,
    open: impl Fn(f64, f64) -> bool,
) -> Result<RegressionData, GrainError> {
    let core = RasterCore::build(map_dim, open)?;
    let reg_max = core.wall_web_norm();

    let mut core_map = Array2::from_elem((map_dim, map_dim), 1.0);
    for ((r, c), value) in core.regression_map().indexed_iter() {
        if core.mask()[[r, c]] {
            core_map[[r, c]] = f64::NAN;
        } else if *value == 0.0 {
            core_map[[r, c]] = 0.0;
        }
    }

    let mut contours = Vec::with_capacity(num_contours);
    let mut contour_lengths = Vec::with_capacity(num_contours);
    for step in 0..num_contours {
        let depth = if num_contours > 1 {
            reg_max * step as f64 / (num_contours as f64 - 1.0)
        } else {
            0.0
        };
        let level_contours = find_contours(core.regression_map(), depth, Connectedness::Low)?;
        let mut level_length_cells = 0.0;
        let mut cleaned = Vec::with_capacity(level_contours.len());
        for contour in &level_contours {
            level_length_cells += contour_length(contour, map_dim as f64, EDGE_TOLERANCE_CELLS);
            cleaned.push(clean_contour(contour, map_dim as f64, EDGE_TOLERANCE_CELLS));
        }
        contours.push(cleaned);
        contour_lengths.push(map_to_length(level_length_cells, diameter_m, map_dim));
    }

    Ok(RegressionData {
        core_map,
        regression_map: core.regression_map().clone(),
        contours,
        contour_lengths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    // A plain circular core, which has exact analytic answers to compare
    // against.
    fn circular_core(map_dim: usize, core_radius_norm: f64) -> RasterCore {
        RasterCore::build(map_dim, |x, y| {
            x * x + y * y < core_radius_norm * core_radius_norm
        })
        .expect("build core")
    }

    #[test]
    fn rejects_small_maps() {
        let result = RasterCore::build(32, |_, _| false);
        assert!(result.is_err());
    }

    #[test]
    fn wall_web_matches_annulus_thickness() {
        let core = circular_core(128, 0.4);
        // Web spans from the core edge to the casting tube: 0.6 normalized,
        // within a few cells of discretization error.
        let cell = 2.0 / 128.0;
        assert!((core.wall_web_norm() - 0.6).abs() < 3.0 * cell);
    }

    #[test]
    fn perimeter_tracks_growing_circle() {
        let map_dim = 128;
        let core = circular_core(map_dim, 0.4);
        for depth in [0.05, 0.2, 0.4] {
            let cells = core.perimeter_cells(depth);
            // Expected: circumference of the regressed circle, in cells.
            let expected = 2.0 * PI * (0.4 + depth) * map_dim as f64 / 2.0;
            let relative_error = (cells - expected).abs() / expected;
            assert!(relative_error < 0.08, "depth {depth}: {cells} vs {expected}");
        }
    }

    #[test]
    fn face_cells_shrink_monotonically() {
        let core = circular_core(128, 0.3);
        let mut last = f64::INFINITY;
        for step in 0..10 {
            let depth = core.wall_web_norm() * step as f64 / 10.0;
            let cells = core.face_cells(depth);
            assert!(cells <= last + 1e-9);
            last = cells;
        }
        // Past burnout there is nothing left.
        assert_eq!(core.face_cells(core.wall_web_norm() + 0.1), 0.0);
    }

    #[test]
    fn regression_data_produces_requested_levels() {
        let data = regression_data(96, 5, 0.08, |x, y| x * x + y * y < 0.25 * 0.25)
            .expect("regression data");
        assert_eq!(data.contours.len(), 5);
        assert_eq!(data.contour_lengths.len(), 5);
        // The unregressed perimeter is the core circumference.
        let expected = PI * 0.25 * 0.08;
        assert_relative_eq!(data.contour_lengths[0], expected, max_relative = 0.1);
        // Deeper levels are longer circles, until the front reaches the wall.
        assert!(data.contour_lengths[1] > data.contour_lengths[0]);
    }
}
