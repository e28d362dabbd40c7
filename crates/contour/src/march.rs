//! Per-cell marching-squares evaluation.
//!
//! Each 2x2 cell of the grid is classified by which corners sit above the
//! iso-level; the 16-case table emits zero, one, or two oriented segments
//! with crossing points linearly interpolated along the cell edges. The two
//! ambiguous saddle cases honor the configured connectedness tie-break.

use ndarray::Array2;

use crate::ContourError;

/// Tie-break rule for saddle cells: `Low` keeps above-level regions
/// 4-connected, `High` joins them across the cell diagonal (8-connected).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectedness {
    Low,
    High,
}

/// An oriented contour segment in `[row, col]` grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: [f64; 2],
    pub to: [f64; 2],
}

impl Segment {
    fn new(from: [f64; 2], to: [f64; 2]) -> Self {
        Self { from, to }
    }
}

// Interpolated offset of the level crossing between two corner values.
fn frac(from_value: f64, to_value: f64, level: f64) -> f64 {
    if to_value == from_value {
        return 0.0;
    }
    (level - from_value) / (to_value - from_value)
}

/// Runs marching squares over `grid` at `level`, emitting oriented segments
/// cell by cell in row-major order. Cells with any non-finite corner are
/// skipped, which lets callers mark invalid regions with NaN.
pub fn march_segments(
    grid: &Array2<f64>,
    level: f64,
    connectedness: Connectedness,
) -> Result<Vec<Segment>, ContourError> {
    let (rows, cols) = grid.dim();
    if rows < 2 || cols < 2 {
        return Err(ContourError::GridTooSmall { rows, cols });
    }

    let connect_high = connectedness == Connectedness::High;
    let mut segments = Vec::new();

    for r0 in 0..rows - 1 {
        let r1 = r0 + 1;
        for c0 in 0..cols - 1 {
            let c1 = c0 + 1;
            let ul = grid[[r0, c0]];
            let ur = grid[[r0, c1]];
            let ll = grid[[r1, c0]];
            let lr = grid[[r1, c1]];

            if !(ul.is_finite() && ur.is_finite() && ll.is_finite() && lr.is_finite()) {
                continue;
            }

            let case = usize::from(ul > level)
                | usize::from(ur > level) << 1
                | usize::from(ll > level) << 2
                | usize::from(lr > level) << 3;
            if case == 0 || case == 15 {
                continue;
            }

            let r0f = r0 as f64;
            let r1f = r1 as f64;
            let c0f = c0 as f64;
            let c1f = c1 as f64;
            let top = [r0f, c0f + frac(ul, ur, level)];
            let bottom = [r1f, c0f + frac(ll, lr, level)];
            let left = [r0f + frac(ul, ll, level), c0f];
            let right = [r0f + frac(ur, lr, level), c1f];

            match case {
                1 => segments.push(Segment::new(top, left)),
                2 => segments.push(Segment::new(right, top)),
                3 => segments.push(Segment::new(right, left)),
                4 => segments.push(Segment::new(left, bottom)),
                5 => segments.push(Segment::new(top, bottom)),
                6 => {
                    if connect_high {
                        segments.push(Segment::new(left, top));
                        segments.push(Segment::new(right, bottom));
                    } else {
                        segments.push(Segment::new(right, top));
                        segments.push(Segment::new(left, bottom));
                    }
                }
                7 => segments.push(Segment::new(right, bottom)),
                8 => segments.push(Segment::new(bottom, right)),
                9 => {
                    if connect_high {
                        segments.push(Segment::new(top, right));
                        segments.push(Segment::new(bottom, left));
                    } else {
                        segments.push(Segment::new(top, left));
                        segments.push(Segment::new(bottom, right));
                    }
                }
                10 => segments.push(Segment::new(bottom, top)),
                11 => segments.push(Segment::new(bottom, left)),
                12 => segments.push(Segment::new(left, right)),
                13 => segments.push(Segment::new(top, right)),
                14 => segments.push(Segment::new(left, top)),
                _ => unreachable!(),
            }
        }
    }

    Ok(segments)
}
