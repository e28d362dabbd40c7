//! Multi-source fast-marching distance transform.
//!
//! Solves the eikonal equation |∇T| = 1 outward from the zero-valued region
//! of a core map, in grid-cell units. Cells outside the domain mask never
//! participate, so webs are measured to the open core only, not to the
//! casting tube.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ndarray::Array2;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Wavefront {
    distance: f64,
    cell: (usize, usize),
}

impl Eq for Wavefront {}

// Min-heap ordering on distance.
impl Ord for Wavefront {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for Wavefront {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// First-order upwind update: the smaller axis neighbors act as the quadratic's
// known values. Falls back to the one-sided update when the axes disagree by
// more than one cell.
fn upwind_update(horizontal: Option<f64>, vertical: Option<f64>) -> f64 {
    match (horizontal, vertical) {
        (Some(a), Some(b)) => {
            if (a - b).abs() < 1.0 {
                let sum = a + b;
                0.5 * (sum + (2.0 - (a - b).powi(2)).sqrt())
            } else {
                a.min(b) + 1.0
            }
        }
        (Some(a), None) => a + 1.0,
        (None, Some(b)) => b + 1.0,
        (None, None) => f64::INFINITY,
    }
}

/// Computes the distance, in cell units, from every in-domain cell to the
/// zero-valued region of `core_map`. `mask` marks cells outside the domain;
/// they are returned as 0 and never traversed. Zero-valued core cells seed
/// the wavefront at distance 0.
pub fn distance_field(core_map: &Array2<f64>, mask: &Array2<bool>) -> Array2<f64> {
    let (rows, cols) = core_map.dim();
    let mut distance = Array2::from_elem((rows, cols), f64::INFINITY);
    let mut known = Array2::from_elem((rows, cols), false);
    let mut heap = BinaryHeap::new();

    for r in 0..rows {
        for c in 0..cols {
            if mask[[r, c]] {
                distance[[r, c]] = 0.0;
                continue;
            }
            if core_map[[r, c]] == 0.0 {
                distance[[r, c]] = 0.0;
                heap.push(Wavefront {
                    distance: 0.0,
                    cell: (r, c),
                });
            }
        }
    }

    let neighbors = |r: usize, c: usize| {
        let mut out = [(0usize, 0usize); 4];
        let mut count = 0;
        if r > 0 {
            out[count] = (r - 1, c);
            count += 1;
        }
        if r + 1 < rows {
            out[count] = (r + 1, c);
            count += 1;
        }
        if c > 0 {
            out[count] = (r, c - 1);
            count += 1;
        }
        if c + 1 < cols {
            out[count] = (r, c + 1);
            count += 1;
        }
        (out, count)
    };

    while let Some(front) = heap.pop() {
        let (r, c) = front.cell;
        if known[[r, c]] {
            continue;
        }
        known[[r, c]] = true;

        let (cells, count) = neighbors(r, c);
        for &(nr, nc) in &cells[..count] {
            if known[[nr, nc]] || mask[[nr, nc]] || core_map[[nr, nc]] == 0.0 {
                continue;
            }

            let known_value = |cell_r: usize, cell_c: usize| -> Option<f64> {
                (known[[cell_r, cell_c]] && !mask[[cell_r, cell_c]])
                    .then(|| distance[[cell_r, cell_c]])
            };
            let pair_min = |a: Option<f64>, b: Option<f64>| match (a, b) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (first, second) => first.or(second),
            };

            let west = (nc > 0).then(|| known_value(nr, nc - 1)).flatten();
            let east = (nc + 1 < cols).then(|| known_value(nr, nc + 1)).flatten();
            let north = (nr > 0).then(|| known_value(nr - 1, nc)).flatten();
            let south = (nr + 1 < rows).then(|| known_value(nr + 1, nc)).flatten();

            let horizontal = pair_min(west, east);
            let vertical = pair_min(north, south);
            let updated = upwind_update(horizontal, vertical);
            if updated < distance[[nr, nc]] {
                distance[[nr, nc]] = updated;
                heap.push(Wavefront {
                    distance: updated,
                    cell: (nr, nc),
                });
            }
        }
    }

    // Unreached in-domain cells (isolated pockets) and masked cells read as 0
    // so they never register as remaining web.
    distance.mapv_inplace(|d| if d.is_finite() { d } else { 0.0 });
    distance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_grows_away_from_the_core() {
        // A single open cell in the middle of a 7x7 propellant block.
        let mut core = Array2::from_elem((7, 7), 1.0);
        core[[3, 3]] = 0.0;
        let mask = Array2::from_elem((7, 7), false);
        let field = distance_field(&core, &mask);

        assert_eq!(field[[3, 3]], 0.0);
        assert_eq!(field[[3, 4]], 1.0);
        assert_eq!(field[[2, 3]], 1.0);
        // Diagonal neighbor: the upwind quadratic gives (2 + sqrt(2)) / 2.
        let expected_diag = 0.5 * (2.0 + 2.0_f64.sqrt());
        assert!((field[[2, 4]] - expected_diag).abs() < 1e-12);
        // Monotone along a row.
        assert!(field[[3, 5]] > field[[3, 4]]);
        assert!(field[[3, 6]] > field[[3, 5]]);
    }

    #[test]
    fn masked_cells_do_not_carry_the_front() {
        let mut core = Array2::from_elem((5, 5), 1.0);
        core[[0, 0]] = 0.0;
        let mut mask = Array2::from_elem((5, 5), false);
        // Wall of masked cells across the middle row except one gap.
        for c in 0..4 {
            mask[[2, c]] = true;
        }
        let field = distance_field(&core, &mask);
        // The front must route through the gap at (2, 4).
        assert!(field[[4, 0]] > field[[1, 0]] + 2.0);
        assert_eq!(field[[2, 0]], 0.0);
    }

    #[test]
    fn annulus_distance_approximates_radial_web() {
        // Circular core of radius 8 cells inside a 64x64 map.
        let dim = 64;
        let center = (dim as f64 - 1.0) / 2.0;
        let mut core = Array2::from_elem((dim, dim), 1.0);
        let mut mask = Array2::from_elem((dim, dim), false);
        for r in 0..dim {
            for c in 0..dim {
                let dr = r as f64 - center;
                let dc = c as f64 - center;
                let radius = (dr * dr + dc * dc).sqrt();
                if radius < 8.0 {
                    core[[r, c]] = 0.0;
                }
                if radius > center {
                    mask[[r, c]] = true;
                }
            }
        }
        let field = distance_field(&core, &mask);
        // A cell 20 cells out radially is ~12 cells from the core edge.
        let probe = field[[dim / 2, dim / 2 + 20]];
        assert!((probe - 12.0).abs() < 1.5, "probe distance {probe}");
    }
}
