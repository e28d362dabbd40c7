//! Conical grain: a BATES-like grain whose core has different diameters at
//! each end, forming a frustum of constant half-angle.
//!
//! Regression expands both core diameters radially; exposed ends add an
//! axial term. Once the larger core end reaches the casting tube it clamps
//! at the grain diameter and the length is recomputed to keep the half-angle
//! constant, which is how the grain's effective length shrinks as it
//! approaches burnout at its wide end.

use srm_core::alerts::{SimAlert, SimAlertLevel, SimAlertType};
use srm_geometry::{
    Frustum, circle_area, cylinder_volume, frustum_lateral_surface_area, frustum_volume,
    split_frustum,
};

use crate::{GrainGeometry, InhibitedEnds, base_geometry_errors};

#[derive(Debug, Clone, PartialEq)]
pub struct ConicalGrain {
    pub diameter_m: f64,
    pub length_m: f64,
    pub forward_core_diameter_m: f64,
    pub aft_core_diameter_m: f64,
    pub inhibited_ends: InhibitedEnds,
}

impl ConicalGrain {
    /// True when the core's forward diameter is larger than its aft diameter.
    pub fn is_core_inverted(&self) -> bool {
        self.forward_core_diameter_m > self.aft_core_diameter_m
    }

    // Half-angle of the core, which regression does not change.
    fn half_angle(&self) -> f64 {
        let (major, minor) = if self.is_core_inverted() {
            (self.forward_core_diameter_m, self.aft_core_diameter_m)
        } else {
            (self.aft_core_diameter_m, self.forward_core_diameter_m)
        };
        ((major - minor) / (2.0 * self.length_m)).atan()
    }

    /// Dimensions of the core frustum at a regression depth, as
    /// (forward diameter, aft diameter, length).
    pub fn frustum_info(&self, reg_dist: f64) -> (f64, f64, f64) {
        let grain_diameter = self.diameter_m;
        let forward_exposed = self.inhibited_ends.top_exposed();
        let aft_exposed = self.inhibited_ends.bottom_exposed();

        // Work in terms of the core's large and small ends.
        let (core_major, core_minor, major_exposed, minor_exposed) = if self.is_core_inverted() {
            (
                self.forward_core_diameter_m,
                self.aft_core_diameter_m,
                forward_exposed,
                aft_exposed,
            )
        } else {
            (
                self.aft_core_diameter_m,
                self.forward_core_diameter_m,
                aft_exposed,
                forward_exposed,
            )
        };

        let angle = self.half_angle();
        // Expand both diameters by the radial component of the regression
        // vector; exposed ends also slide axially along the core wall.
        let major_axial = if major_exposed { reg_dist * 2.0 * angle.tan() } else { 0.0 };
        let minor_axial = if minor_exposed { reg_dist * 2.0 * angle.tan() } else { 0.0 };
        let reg_major = core_major + reg_dist * 2.0 * angle.cos() - major_axial;
        let reg_minor = core_minor + reg_dist * 2.0 * angle.cos() + minor_axial;

        // Once the large end reaches the casting tube it clamps there; the
        // small end never clamps (that point is burnout), so it determines
        // the remaining length at the constant half-angle.
        let major_frustum_diameter = if reg_major >= grain_diameter {
            grain_diameter
        } else {
            reg_major
        };
        let minor_frustum_diameter = reg_minor;
        let grain_length = (major_frustum_diameter - minor_frustum_diameter) / (2.0 * angle.tan());

        if self.is_core_inverted() {
            (major_frustum_diameter, minor_frustum_diameter, grain_length)
        } else {
            (minor_frustum_diameter, major_frustum_diameter, grain_length)
        }
    }

    // Mass flow past an axial position, and the local port diameter there.
    fn mass_flow(
        &self,
        mass_in: f64,
        dt: f64,
        reg_dist: f64,
        d_reg_dist: f64,
        position: f64,
        density: f64,
    ) -> (f64, f64) {
        let (fwd0, aft0, len0) = self.frustum_info(reg_dist);
        let (fwd1, aft1, len1) = self.frustum_info(reg_dist + d_reg_dist);
        let grain_diameter = self.diameter_m;
        let aft_exposed = self.inhibited_ends.bottom_exposed();
        let forward_exposed = self.inhibited_ends.top_exposed();

        let (unstepped_partial, stepped_partial): (Frustum, Frustum) = if position > d_reg_dist {
            let aft_shift = if aft_exposed { d_reg_dist } else { 0.0 };
            let (unstepped, _) = split_frustum(fwd0, aft0, len0, position - aft_shift);
            let (stepped, _) = split_frustum(fwd1, aft1, len1, len1);
            (unstepped, stepped)
        } else {
            let forward_shift = if forward_exposed { d_reg_dist } else { 0.0 };
            let (unstepped, _) = split_frustum(fwd0, aft0, len0, position + forward_shift);
            let (stepped, _) = split_frustum(fwd1, aft1, len1, position);
            (unstepped, stepped)
        };

        let unstepped_core = frustum_volume(
            unstepped_partial.diameter_a_m,
            unstepped_partial.diameter_b_m,
            unstepped_partial.length_m,
        );
        let stepped_core = frustum_volume(
            stepped_partial.diameter_a_m,
            stepped_partial.diameter_b_m,
            stepped_partial.length_m,
        );
        let unstepped_prop =
            cylinder_volume(grain_diameter, unstepped_partial.length_m) - unstepped_core;
        let stepped_prop = cylinder_volume(grain_diameter, stepped_partial.length_m) - stepped_core;

        let mass_flow = (unstepped_prop - stepped_prop) * density / dt + mass_in;
        (mass_flow, stepped_partial.diameter_b_m)
    }
}

impl GrainGeometry for ConicalGrain {
    fn diameter(&self) -> f64 {
        self.diameter_m
    }

    fn length(&self) -> f64 {
        self.length_m
    }

    fn surface_area_at_regression(&self, reg_dist: f64) -> f64 {
        let (forward, aft, length) = self.frustum_info(reg_dist);
        let mut surface_area = frustum_lateral_surface_area(forward, aft, length);

        let full_face_area = circle_area(self.diameter_m);
        if self.inhibited_ends.top_exposed() {
            surface_area += full_face_area - circle_area(forward);
        }
        if self.inhibited_ends.bottom_exposed() {
            surface_area += full_face_area - circle_area(aft);
        }
        surface_area
    }

    fn volume_at_regression(&self, reg_dist: f64) -> f64 {
        let (forward, aft, length) = self.frustum_info(reg_dist);
        let core_volume = frustum_volume(forward, aft, length);
        cylinder_volume(self.diameter_m, length) - core_volume
    }

    fn web_remaining(&self, reg_dist: f64) -> f64 {
        let (forward, aft, length) = self.frustum_info(reg_dist);
        let wall_left = (self.diameter_m - aft.min(forward)) / 2.0;
        if self.inhibited_ends == InhibitedEnds::Both {
            return wall_left;
        }
        wall_left.min(length)
    }

    fn port_area(&self, reg_dist: f64) -> Option<f64> {
        let (_, aft, _) = self.frustum_info(reg_dist);
        Some(circle_area(aft))
    }

    fn end_positions(&self, reg_dist: f64) -> (f64, f64) {
        let original_length = self.length_m;
        let grain_diameter = self.diameter_m;
        let (forward_diameter, aft_diameter, current_length) = self.frustum_info(reg_dist);
        let forward_exposed = self.inhibited_ends.top_exposed();
        let aft_exposed = self.inhibited_ends.bottom_exposed();

        let (core_major, minor_exposed) = if self.is_core_inverted() {
            (forward_diameter, aft_exposed)
        } else {
            (aft_diameter, forward_exposed)
        };

        if core_major < grain_diameter {
            let forward_regression = if forward_exposed { reg_dist } else { 0.0 };
            let aft_regression = if aft_exposed { reg_dist } else { 0.0 };
            (forward_regression, original_length - aft_regression)
        } else {
            let minor_regression = if minor_exposed { reg_dist } else { 0.0 };
            let major_regression = (original_length - current_length) - minor_regression;
            let (forward_regression, aft_regression) = if self.is_core_inverted() {
                (major_regression, minor_regression)
            } else {
                (minor_regression, major_regression)
            };
            (forward_regression, original_length - aft_regression)
        }
    }

    fn mass_flux(
        &self,
        mass_in: f64,
        dt: f64,
        reg_dist: f64,
        d_reg_dist: f64,
        position: f64,
        density: f64,
    ) -> f64 {
        let (mass_flow, port_diameter) =
            self.mass_flow(mass_in, dt, reg_dist, d_reg_dist, position, density);
        mass_flow / circle_area(port_diameter)
    }

    // The peak can sit at either end depending on the core taper.
    fn peak_mass_flux(
        &self,
        mass_in: f64,
        dt: f64,
        reg_dist: f64,
        d_reg_dist: f64,
        density: f64,
    ) -> f64 {
        let (_, _, length) = self.frustum_info(reg_dist);
        let forward = self.mass_flux(mass_in, dt, reg_dist, d_reg_dist, 0.0, density);
        let aft = self.mass_flux(mass_in, dt, reg_dist, d_reg_dist, length, density);
        forward.max(aft)
    }

    fn geometry_errors(&self) -> Vec<SimAlert> {
        let mut errors = base_geometry_errors(self.diameter_m, self.length_m);
        let error = |description: &str| {
            SimAlert::new(SimAlertLevel::Error, SimAlertType::Geometry, description)
        };
        if self.aft_core_diameter_m == self.forward_core_diameter_m {
            errors.push(error(
                "Core diameters cannot be the same, use a BATES for this case.",
            ));
        }
        if self.aft_core_diameter_m > self.diameter_m {
            errors.push(error("Aft core diameter cannot be larger than grain diameter."));
        }
        if self.forward_core_diameter_m > self.diameter_m {
            errors.push(error(
                "Forward core diameter cannot be larger than grain diameter.",
            ));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn inverted_grain() -> ConicalGrain {
        ConicalGrain {
            diameter_m: 0.01,
            length_m: 0.1,
            forward_core_diameter_m: 0.0025,
            aft_core_diameter_m: 0.002,
            inhibited_ends: InhibitedEnds::Both,
        }
    }

    #[test]
    fn detects_core_inversion() {
        assert!(inverted_grain().is_core_inverted());
        let regular = ConicalGrain {
            forward_core_diameter_m: 0.003,
            aft_core_diameter_m: 0.004,
            ..inverted_grain()
        };
        assert!(!regular.is_core_inverted());
    }

    #[test]
    fn frustum_info_reference_values() {
        let grain = inverted_grain();

        let unregressed = grain.frustum_info(0.0);
        assert_relative_eq!(unregressed.0, 0.0025, epsilon = 1e-8);
        assert_relative_eq!(unregressed.1, 0.002, epsilon = 1e-8);
        assert_relative_eq!(unregressed.2, 0.1, epsilon = 1e-8);

        let before_hitting_wall = grain.frustum_info(0.001);
        assert_relative_eq!(before_hitting_wall.0, 0.004499993750029296, epsilon = 1e-12);
        assert_relative_eq!(before_hitting_wall.1, 0.003999993750029297, epsilon = 1e-12);
        assert_relative_eq!(before_hitting_wall.2, 0.1, epsilon = 1e-8);

        let hit_wall = grain.frustum_info(0.0038);
        assert_relative_eq!(hit_wall.0, 0.01, epsilon = 1e-12);
        assert_relative_eq!(hit_wall.1, 0.009599976250111327, epsilon = 1e-12);
        assert_relative_eq!(hit_wall.2, 0.08000474997773462, epsilon = 1e-12);
    }

    #[test]
    fn surface_area_reference_values() {
        let mut grain = inverted_grain();

        let forward_face_area = 7.36310778e-5;
        let aft_face_area = 7.53982236e-5;
        let lateral_area = 0.00070686055598659;

        assert_relative_eq!(
            grain.surface_area_at_regression(0.0),
            lateral_area,
            epsilon = 1e-10
        );
        assert_relative_eq!(
            grain.surface_area_at_regression(0.001),
            0.0013351790867045452,
            epsilon = 1e-10
        );

        grain.inhibited_ends = InhibitedEnds::Top;
        assert_relative_eq!(
            grain.surface_area_at_regression(0.0),
            lateral_area + aft_face_area,
            epsilon = 1e-10
        );

        grain.inhibited_ends = InhibitedEnds::Bottom;
        assert_relative_eq!(
            grain.surface_area_at_regression(0.0),
            lateral_area + forward_face_area,
            epsilon = 1e-10
        );

        grain.inhibited_ends = InhibitedEnds::Neither;
        assert_relative_eq!(
            grain.surface_area_at_regression(0.0),
            lateral_area + forward_face_area + aft_face_area,
            epsilon = 1e-10
        );
    }

    #[test]
    fn volume_reference_values() {
        let grain = inverted_grain();
        assert_relative_eq!(
            grain.volume_at_regression(0.0),
            7.454737567580781e-6,
            epsilon = 1e-14
        );
        assert_relative_eq!(
            grain.volume_at_regression(0.001),
            6.433724127569215e-6,
            epsilon = 1e-14
        );
        assert_relative_eq!(
            grain.volume_at_regression(0.0038),
            2.480054353678591e-7,
            epsilon = 1e-14
        );
    }

    #[test]
    fn web_reference_values() {
        let mut grain = inverted_grain();
        assert_relative_eq!(grain.web_remaining(0.0), 0.004, epsilon = 5e-8);
        assert_relative_eq!(grain.web_remaining(0.001), 0.003, epsilon = 5e-8);
        assert_relative_eq!(grain.web_remaining(0.0038), 0.0002, epsilon = 5e-8);

        grain.forward_core_diameter_m = 0.002;
        grain.aft_core_diameter_m = 0.0025;
        assert_relative_eq!(grain.web_remaining(0.0), 0.004, epsilon = 5e-8);
        assert_relative_eq!(grain.web_remaining(0.001), 0.003, epsilon = 5e-8);
        assert_relative_eq!(grain.web_remaining(0.0038), 0.0002, epsilon = 5e-8);
    }

    #[test]
    fn equal_core_diameters_are_rejected() {
        let grain = ConicalGrain {
            forward_core_diameter_m: 0.002,
            aft_core_diameter_m: 0.002,
            ..inverted_grain()
        };
        let errors = grain.geometry_errors();
        assert!(errors.iter().any(|e| e.description.contains("BATES")));
    }
}
