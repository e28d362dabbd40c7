//! End-burning grain: a solid cylinder burning on its aft face only.

use srm_core::alerts::SimAlert;
use srm_geometry::{circle_area, cylinder_volume};

use crate::{GrainGeometry, base_geometry_errors};

#[derive(Debug, Clone, PartialEq)]
pub struct EndBurnerGrain {
    pub diameter_m: f64,
    pub length_m: f64,
}

impl GrainGeometry for EndBurnerGrain {
    fn diameter(&self) -> f64 {
        self.diameter_m
    }

    fn length(&self) -> f64 {
        self.length_m
    }

    fn surface_area_at_regression(&self, _reg_dist: f64) -> f64 {
        circle_area(self.diameter_m)
    }

    fn volume_at_regression(&self, reg_dist: f64) -> f64 {
        cylinder_volume(self.diameter_m, self.length_m - reg_dist)
    }

    fn web_remaining(&self, reg_dist: f64) -> f64 {
        self.length_m - reg_dist
    }

    // An end burner has no port; the motor's port/throat checks skip it.
    fn port_area(&self, _reg_dist: f64) -> Option<f64> {
        None
    }

    fn end_positions(&self, reg_dist: f64) -> (f64, f64) {
        (0.0, self.length_m - reg_dist)
    }

    // Nothing flows through an end burner's face.
    fn mass_flux(
        &self,
        _mass_in: f64,
        _dt: f64,
        _reg_dist: f64,
        _d_reg_dist: f64,
        _position: f64,
        _density: f64,
    ) -> f64 {
        0.0
    }

    fn geometry_errors(&self) -> Vec<SimAlert> {
        base_geometry_errors(self.diameter_m, self.length_m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn test_grain() -> EndBurnerGrain {
        EndBurnerGrain {
            diameter_m: 0.05,
            length_m: 0.2,
        }
    }

    #[test]
    fn burning_face_is_constant() {
        let grain = test_grain();
        assert_relative_eq!(
            grain.surface_area_at_regression(0.0),
            grain.surface_area_at_regression(0.1)
        );
    }

    #[test]
    fn web_is_remaining_length() {
        let grain = test_grain();
        assert_relative_eq!(grain.web_remaining(0.0), 0.2);
        assert_relative_eq!(grain.web_remaining(0.15), 0.05);
    }

    #[test]
    fn volume_shrinks_linearly() {
        let grain = test_grain();
        let consumed = grain.volume_slice(0.0, 0.01);
        assert_relative_eq!(consumed, circle_area(0.05) * 0.01, epsilon = 1e-12);
    }

    #[test]
    fn no_port_and_no_flux() {
        let grain = test_grain();
        assert!(grain.port_area(0.0).is_none());
        assert_eq!(grain.peak_mass_flux(0.0, 0.03, 0.0, 1e-4, 1700.0), 0.0);
    }
}
