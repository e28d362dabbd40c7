//! Geometry primitives for grain and nozzle calculations.
//!
//! Everything here is a pure function over non-negative reals. Frustum
//! formulas degrade correctly to cones when one end diameter is zero.

use std::f64::consts::PI;

/// A truncated cone described by its two end diameters and its length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub diameter_a_m: f64,
    pub diameter_b_m: f64,
    pub length_m: f64,
}

/// Returns the area of a circle with diameter `dia`.
pub fn circle_area(dia: f64) -> f64 {
    (dia / 2.0).powi(2) * PI
}

/// Returns the perimeter (circumference) of a circle with diameter `dia`.
pub fn circle_perimeter(dia: f64) -> f64 {
    dia * PI
}

/// Returns the diameter of a circle with area `area`.
pub fn circle_diameter_from_area(area: f64) -> f64 {
    2.0 * (area / PI).sqrt()
}

/// Returns the lateral surface area of a tube (cylinder without end caps).
pub fn tube_area(dia: f64, height: f64) -> f64 {
    dia * PI * height
}

/// Returns the surface area of a cylinder, end caps included.
pub fn cylinder_area(dia: f64, height: f64) -> f64 {
    2.0 * circle_area(dia) + tube_area(dia, height)
}

/// Returns the volume of a cylinder.
pub fn cylinder_volume(dia: f64, height: f64) -> f64 {
    height * circle_area(dia)
}

/// Returns the lateral surface area of a frustum with end diameters `dia_a`
/// and `dia_b` and length `length`.
pub fn frustum_lateral_surface_area(dia_a: f64, dia_b: f64, length: f64) -> f64 {
    let radius_a = dia_a / 2.0;
    let radius_b = dia_b / 2.0;
    PI * (radius_a + radius_b) * ((radius_a - radius_b).abs().powi(2) + length.powi(2)).sqrt()
}

/// Returns the volume of a frustum with end diameters `dia_a` and `dia_b`
/// and length `length`.
pub fn frustum_volume(dia_a: f64, dia_b: f64, length: f64) -> f64 {
    let radius_a = dia_a / 2.0;
    let radius_b = dia_b / 2.0;
    PI * (length / 3.0) * (radius_a.powi(2) + radius_a * radius_b + radius_b.powi(2))
}

/// Splits a frustum on the plane at `split_position` measured from the
/// `dia_a` face. The shared face diameter is linearly interpolated along the
/// axis, so the two halves always line up exactly at the split plane.
pub fn split_frustum(dia_a: f64, dia_b: f64, length: f64, split_position: f64) -> (Frustum, Frustum) {
    let split_diameter = dia_a + (dia_b - dia_a) * (split_position / length);
    (
        Frustum {
            diameter_a_m: dia_a,
            diameter_b_m: split_diameter,
            length_m: split_position,
        },
        Frustum {
            diameter_a_m: split_diameter,
            diameter_b_m: dia_b,
            length_m: length - split_position,
        },
    )
}

/// Returns the distance between two points.
pub fn dist(p1: [f64; 2], p2: [f64; 2]) -> f64 {
    ((p1[0] - p2[0]).powi(2) + (p1[1] - p2[1]).powi(2)).sqrt()
}

/// Returns the total length of all segments in a closed contour whose
/// endpoint is not within `tolerance` of the edge of a circle with diameter
/// `map_size`. Used to discard spurious segments where a raster core touches
/// the casting tube.
pub fn contour_length(contour: &[[f64; 2]], map_size: f64, tolerance: f64) -> f64 {
    if contour.len() < 2 {
        return 0.0;
    }
    let center = [map_size / 2.0, map_size / 2.0];
    let limit = map_size / 2.0 - tolerance;
    let mut total = 0.0;
    for i in 0..contour.len() {
        let prev = contour[(i + contour.len() - 1) % contour.len()];
        let point = contour[i];
        if dist(point, center) < limit {
            total += dist(point, prev);
        }
    }
    total
}

/// Returns the contour with any points within `tolerance` of a circle of
/// diameter `map_size` removed.
pub fn clean_contour(contour: &[[f64; 2]], map_size: f64, tolerance: f64) -> Vec<[f64; 2]> {
    let center = [map_size / 2.0, map_size / 2.0];
    let limit = map_size / 2.0 - tolerance;
    contour
        .iter()
        .copied()
        .filter(|point| dist(*point, center) < limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn circle_area_reference() {
        assert_relative_eq!(circle_area(0.5), 0.19634954, epsilon = 1e-8);
    }

    #[test]
    fn circle_perimeter_reference() {
        assert_relative_eq!(circle_perimeter(0.5), 1.57079633, epsilon = 1e-8);
    }

    #[test]
    fn diameter_from_area_inverts_area() {
        assert_relative_eq!(circle_diameter_from_area(0.19634954), 0.5, epsilon = 1e-8);
        let dia = 0.0827;
        assert_relative_eq!(
            circle_diameter_from_area(circle_area(dia)),
            dia,
            epsilon = 1e-12
        );
    }

    #[test]
    fn tube_area_reference() {
        assert_relative_eq!(tube_area(0.5, 2.0), 3.14159265, epsilon = 1e-8);
    }

    #[test]
    fn cylinder_area_reference() {
        assert_relative_eq!(cylinder_area(0.5, 2.0), 3.53429174, epsilon = 1e-8);
    }

    #[test]
    fn cylinder_volume_reference() {
        assert_relative_eq!(cylinder_volume(0.5, 2.0), 0.39269908, epsilon = 1e-8);
    }

    #[test]
    fn frustum_lateral_surface_area_reference() {
        assert_relative_eq!(
            frustum_lateral_surface_area(2.0, 3.0, 5.0),
            39.46576927,
            epsilon = 1e-8
        );
    }

    #[test]
    fn frustum_volume_cone_case() {
        assert_relative_eq!(frustum_volume(0.0, 10.0, 10.0), 261.79938779, epsilon = 1e-8);
    }

    #[test]
    fn frustum_volume_frustum_case() {
        assert_relative_eq!(
            frustum_volume(10.0, 30.0, 50.0),
            17016.96020694,
            epsilon = 1e-8
        );
    }

    #[test]
    fn split_frustum_simple_case() {
        let (upper, lower) = split_frustum(1.0, 2.0, 4.0, 2.0);
        assert_eq!(
            upper,
            Frustum {
                diameter_a_m: 1.0,
                diameter_b_m: 1.5,
                length_m: 2.0
            }
        );
        assert_eq!(
            lower,
            Frustum {
                diameter_a_m: 1.5,
                diameter_b_m: 2.0,
                length_m: 2.0
            }
        );
    }

    #[test]
    fn split_frustum_inverted_case() {
        let (upper, lower) = split_frustum(2.0, 1.0, 4.0, 2.0);
        assert_eq!(upper.diameter_b_m, 1.5);
        assert_eq!(lower.diameter_a_m, 1.5);
    }

    #[test]
    fn split_frustum_shared_face_lines_up() {
        let (upper, lower) = split_frustum(1.0, 3.0, 3.0, 1.0);
        assert_eq!(upper.diameter_b_m, lower.diameter_a_m);
    }

    #[test]
    fn two_splits_reconstruct_total_length() {
        let (first, rest) = split_frustum(1.0, 3.0, 7.0, 2.5);
        let (second, third) = split_frustum(
            rest.diameter_a_m,
            rest.diameter_b_m,
            rest.length_m,
            1.75,
        );
        assert_relative_eq!(
            first.length_m + second.length_m + third.length_m,
            7.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn dist_cases() {
        assert_eq!(dist([5.0, 5.0], [5.0, 5.0]), 0.0);
        assert_eq!(dist([5.0, 5.0], [6.0, 5.0]), 1.0);
        assert_eq!(dist([5.0, 5.0], [5.0, 6.0]), 1.0);
        assert_relative_eq!(dist([0.0, 0.0], [-1.0, -1.0]), 2.0_f64.sqrt());
    }

    #[test]
    fn contour_length_excludes_edge_band() {
        // A square path around the center of a 10x10 map, one corner pushed
        // outside the exclusion band.
        let contour = [[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 9.9]];
        let with_band = contour_length(&contour, 10.0, 3.0);
        let without_band = contour_length(&contour, 10.0, 0.0);
        assert!(with_band < without_band);
    }

    #[test]
    fn clean_contour_drops_outer_points() {
        let contour = [[5.0, 5.0], [9.9, 5.0]];
        let cleaned = clean_contour(&contour, 10.0, 3.0);
        assert_eq!(cleaned, vec![[5.0, 5.0]]);
    }
}
