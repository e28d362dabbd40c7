//! Iso-contour extraction over 2-D scalar grids.
//!
//! The marching-squares pass emits oriented line segments cell by cell; the
//! assembly pass stitches them into ordered polylines. A fast-marching
//! distance solver produces the regression maps that raster grain geometry
//! is queried against.

pub mod assemble;
pub mod distance;
pub mod march;

pub use assemble::assemble_contours;
pub use distance::distance_field;
pub use march::{Connectedness, Segment, march_segments};

use ndarray::Array2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContourError {
    #[error("input grid must be at least 2x2, got {rows}x{cols}")]
    GridTooSmall { rows: usize, cols: usize },
    #[error("map dimension must be {min} or larger to get good results, got {dim}")]
    MapTooSmall { dim: usize, min: usize },
}

/// Smallest raster map dimension that produces usable regression data.
pub const MIN_MAP_DIM: usize = 64;

/// Returns the total length of the iso-valued contours of `grid` at `level`,
/// using the distance between two adjacent grid points as the base unit.
pub fn find_perimeter(
    grid: &Array2<f64>,
    level: f64,
    connectedness: Connectedness,
) -> Result<f64, ContourError> {
    let segments = march_segments(grid, level, connectedness)?;
    Ok(segments
        .iter()
        .map(|seg| {
            let dr = seg.to[0] - seg.from[0];
            let dc = seg.to[1] - seg.from[1];
            (dr * dr + dc * dc).sqrt()
        })
        .sum())
}

/// Returns the assembled iso-contours of `grid` at `level`, each a polyline
/// of `[row, col]` points, ordered by creation (top-to-bottom, left-to-right).
pub fn find_contours(
    grid: &Array2<f64>,
    level: f64,
    connectedness: Connectedness,
) -> Result<Vec<Vec<[f64; 2]>>, ContourError> {
    let segments = march_segments(grid, level, connectedness)?;
    Ok(assemble_contours(&segments))
}
