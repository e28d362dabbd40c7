//! Nozzle thrust and flow model.
//!
//! Uses 1-D isentropic expansion relations throughout. The throat diameter
//! drifts over a burn as erosion (dominant at high pressure) and slag
//! deposition (dominant at low pressure) compete; the instantaneous change is
//! carried by the simulation as a separate `d_throat` term so the nozzle
//! definition itself stays immutable.

use serde::{Deserialize, Serialize};

use srm_core::alerts::{SimAlert, SimAlertLevel, SimAlertType};
use srm_core::rootfind;
use srm_geometry::circle_area;

const EXIT_PRESSURE_ITERS: usize = 80;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nozzle {
    pub throat_m: f64,
    pub exit_m: f64,
    /// Fraction of ideal performance retained after combustion and friction
    /// losses, in (0, 1].
    pub efficiency: f64,
    pub div_angle_deg: f64,
    pub conv_angle_deg: f64,
    pub throat_length_m: f64,
    /// Slag deposition coefficient ((m*Pa)/s).
    pub slag_coeff: f64,
    /// Erosion coefficient (m/(s*Pa)).
    pub erosion_coeff: f64,
}

/// Expansion ratio required to produce a given exit/chamber pressure ratio.
pub fn expansion_ratio_from_pressure_ratio(k: f64, pressure_ratio: f64) -> f64 {
    ((k + 1.0) / 2.0).powf(1.0 / (k - 1.0))
        * pressure_ratio.powf(1.0 / k)
        * (((k + 1.0) / (k - 1.0)) * (1.0 - pressure_ratio.powf((k - 1.0) / k))).sqrt()
}

impl Nozzle {
    /// Throat area including the accumulated diameter change from
    /// erosion/slag.
    pub fn throat_area(&self, d_throat: f64) -> f64 {
        circle_area(self.throat_m + d_throat)
    }

    pub fn exit_area(&self) -> f64 {
        circle_area(self.exit_m)
    }

    /// Area expansion ratio of the unmodified nozzle.
    pub fn expansion_ratio(&self) -> f64 {
        (self.exit_m / self.throat_m).powi(2)
    }

    /// Exit pressure for a specific-heat ratio and chamber pressure, from the
    /// isentropic area-ratio relation solved on its supersonic branch.
    /// Returns 0 when the chamber pressure is negligible or the solve fails.
    pub fn exit_pressure(&self, k: f64, chamber_pressure_pa: f64) -> f64 {
        if chamber_pressure_pa <= 1e-6 {
            return 0.0;
        }
        let inverse_expansion = 1.0 / self.expansion_ratio();
        // The reciprocal expansion ratio rises from 0 to 1 as the pressure
        // ratio climbs toward the sonic value, so the root is bracketed below
        // the critical ratio.
        let critical_ratio = (2.0 / (k + 1.0)).powf(k / (k - 1.0));
        let solved = rootfind::bisect(
            |ratio| inverse_expansion - expansion_ratio_from_pressure_ratio(k, ratio),
            1e-9,
            critical_ratio,
            1e-12,
            1e-12,
            EXIT_PRESSURE_ITERS,
        );
        match solved {
            Some(ratio) => ratio * chamber_pressure_pa,
            None => 0.0,
        }
    }

    /// Thrust coefficient of an ideal nozzle at the given conditions,
    /// including the pressure-area term for under/over-expansion.
    pub fn ideal_thrust_coeff(
        &self,
        chamber_pressure_pa: f64,
        ambient_pressure_pa: f64,
        k: f64,
        d_throat: f64,
        exit_pressure_pa: Option<f64>,
    ) -> f64 {
        if chamber_pressure_pa == 0.0 {
            return 0.0;
        }
        let exit_pressure =
            exit_pressure_pa.unwrap_or_else(|| self.exit_pressure(k, chamber_pressure_pa));
        let momentum = ((2.0 * k.powi(2) / (k - 1.0))
            * (2.0 / (k + 1.0)).powf((k + 1.0) / (k - 1.0))
            * (1.0 - (exit_pressure / chamber_pressure_pa).powf((k - 1.0) / k)))
        .sqrt();
        let pressure_term = (exit_pressure - ambient_pressure_pa) * self.exit_area()
            / (self.throat_area(d_throat) * chamber_pressure_pa);
        momentum + pressure_term
    }

    /// Ideal thrust coefficient scaled by nozzle efficiency and the
    /// divergence loss of a conical exit section.
    pub fn adjusted_thrust_coeff(
        &self,
        chamber_pressure_pa: f64,
        ambient_pressure_pa: f64,
        k: f64,
        d_throat: f64,
        exit_pressure_pa: Option<f64>,
    ) -> f64 {
        let divergence_loss = (1.0 + self.div_angle_deg.to_radians().cos()) / 2.0;
        self.efficiency
            * divergence_loss
            * self.ideal_thrust_coeff(
                chamber_pressure_pa,
                ambient_pressure_pa,
                k,
                d_throat,
                exit_pressure_pa,
            )
    }

    /// Throat diameter change over a timestep from competing erosion and slag
    /// deposition. Erosion scales with pressure, slag with its reciprocal.
    pub fn throat_drift(&self, pressure_pa: f64, dt_s: f64) -> f64 {
        let slag_rate = if pressure_pa == 0.0 {
            0.0
        } else {
            self.slag_coeff / pressure_pa
        };
        let erosion_rate = pressure_pa * self.erosion_coeff;
        dt_s * (2.0 * erosion_rate - 2.0 * slag_rate)
    }

    pub fn geometry_errors(&self) -> Vec<SimAlert> {
        let mut errors = Vec::new();
        let error = |description: &str| {
            SimAlert::new(SimAlertLevel::Error, SimAlertType::Geometry, description).at("Nozzle")
        };
        if self.throat_m == 0.0 {
            errors.push(error("Throat diameter must not be 0"));
        }
        if self.exit_m < self.throat_m {
            errors.push(error("Exit diameter must not be smaller than throat diameter"));
        }
        if self.efficiency <= 0.0 || self.efficiency > 1.0 {
            errors.push(error("Efficiency must be in (0, 1]"));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn test_nozzle() -> Nozzle {
        Nozzle {
            throat_m: 0.01,
            exit_m: 0.03,
            efficiency: 0.9,
            div_angle_deg: 15.0,
            conv_angle_deg: 45.0,
            throat_length_m: 0.005,
            slag_coeff: 0.0,
            erosion_coeff: 0.0,
        }
    }

    #[test]
    fn expansion_ratio_is_area_ratio() {
        assert_relative_eq!(test_nozzle().expansion_ratio(), 9.0, epsilon = 1e-12);
    }

    #[test]
    fn throat_area_tracks_diameter_drift() {
        let nozzle = test_nozzle();
        assert_relative_eq!(nozzle.throat_area(0.0), circle_area(0.01));
        assert_relative_eq!(nozzle.throat_area(0.002), circle_area(0.012));
    }

    #[test]
    fn exit_pressure_solves_the_area_ratio_relation() {
        let nozzle = test_nozzle();
        let k = 1.2;
        let chamber = 5e6;
        let exit = nozzle.exit_pressure(k, chamber);
        assert!(exit > 0.0 && exit < chamber);
        // The recovered pressure ratio must reproduce the expansion ratio.
        let ratio = exit / chamber;
        assert_relative_eq!(
            expansion_ratio_from_pressure_ratio(k, ratio),
            1.0 / nozzle.expansion_ratio(),
            max_relative = 1e-6
        );
    }

    #[test]
    fn exit_pressure_is_zero_for_dead_chamber() {
        assert_eq!(test_nozzle().exit_pressure(1.2, 0.0), 0.0);
    }

    #[test]
    fn thrust_coeff_decreases_with_ambient_pressure() {
        let nozzle = test_nozzle();
        let vacuum = nozzle.ideal_thrust_coeff(5e6, 0.0, 1.2, 0.0, None);
        let sea_level = nozzle.ideal_thrust_coeff(5e6, 101325.0, 1.2, 0.0, None);
        assert!(vacuum > sea_level);
        assert!(sea_level > 1.0);
    }

    #[test]
    fn adjusted_coeff_applies_efficiency_and_divergence_loss() {
        let nozzle = test_nozzle();
        let ideal = nozzle.ideal_thrust_coeff(5e6, 101325.0, 1.2, 0.0, None);
        let adjusted = nozzle.adjusted_thrust_coeff(5e6, 101325.0, 1.2, 0.0, None);
        let divergence_loss = (1.0 + 15.0_f64.to_radians().cos()) / 2.0;
        assert_relative_eq!(adjusted, ideal * 0.9 * divergence_loss, epsilon = 1e-12);
    }

    #[test]
    fn throat_drift_sign_follows_dominant_mechanism() {
        let mut nozzle = test_nozzle();
        nozzle.erosion_coeff = 1e-12;
        nozzle.slag_coeff = 1e2;
        // High pressure: erosion dominates, the throat opens up.
        assert!(nozzle.throat_drift(2e7, 0.03) > 0.0);
        // Low pressure: slag deposition dominates, the throat closes.
        assert!(nozzle.throat_drift(1e4, 0.03) < 0.0);
        // Dead chamber deposits nothing.
        assert_eq!(nozzle.throat_drift(0.0, 0.03), 0.0);
    }

    #[test]
    fn geometry_errors_flag_bad_dimensions() {
        let mut nozzle = test_nozzle();
        nozzle.throat_m = 0.0;
        nozzle.exit_m = 0.0;
        let errors = nozzle.geometry_errors();
        assert_eq!(errors.len(), 1);
        nozzle.throat_m = 0.02;
        nozzle.exit_m = 0.01;
        let errors = nozzle.geometry_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].description.contains("Exit diameter"));
        assert_eq!(errors[0].location.as_deref(), Some("Nozzle"));
    }
}
