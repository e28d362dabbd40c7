//! Rod and tube grain: a BATES-style tube with a fully-uninhibited rod of
//! propellant supported in the center of the core.

use srm_core::alerts::{SimAlert, SimAlertLevel, SimAlertType};
use srm_core::units;
use srm_geometry::{circle_area, circle_perimeter};

use crate::{CoreShape, InhibitedEnds};

#[derive(Debug, Clone, PartialEq)]
pub struct RodTubeGrain {
    pub diameter_m: f64,
    pub length_m: f64,
    pub core_diameter_m: f64,
    pub rod_diameter_m: f64,
    /// Diameter of the inert support the rod burns down to.
    pub support_diameter_m: f64,
    pub inhibited_ends: InhibitedEnds,
}

impl RodTubeGrain {
    fn tube_web(&self) -> f64 {
        (self.diameter_m - self.core_diameter_m) / 2.0
    }

    fn rod_web(&self) -> f64 {
        (self.rod_diameter_m - self.support_diameter_m) / 2.0
    }
}

impl CoreShape for RodTubeGrain {
    fn outer_diameter(&self) -> f64 {
        self.diameter_m
    }

    fn grain_length(&self) -> f64 {
        self.length_m
    }

    fn inhibited_ends(&self) -> InhibitedEnds {
        self.inhibited_ends
    }

    fn wall_web(&self) -> f64 {
        self.tube_web().max(self.rod_web())
    }

    fn core_perimeter(&self, reg_dist: f64) -> f64 {
        let tube_perimeter = if reg_dist < self.tube_web() {
            circle_perimeter(self.core_diameter_m + 2.0 * reg_dist)
        } else {
            0.0
        };
        let rod_perimeter = if reg_dist < self.rod_web() {
            circle_perimeter(self.rod_diameter_m - 2.0 * reg_dist)
        } else {
            0.0
        };
        tube_perimeter + rod_perimeter
    }

    fn face_area(&self, reg_dist: f64) -> f64 {
        let tube_area = if reg_dist < self.tube_web() {
            circle_area(self.diameter_m) - circle_area(self.core_diameter_m + 2.0 * reg_dist)
        } else {
            0.0
        };
        let rod_area = if reg_dist < self.rod_web() {
            circle_area(self.rod_diameter_m - 2.0 * reg_dist)
                - circle_area(self.support_diameter_m)
        } else {
            0.0
        };
        tube_area + rod_area
    }

    fn shape_errors(&self) -> Vec<SimAlert> {
        let error = |description: &str| {
            SimAlert::new(SimAlertLevel::Error, SimAlertType::Geometry, description)
        };
        let mut errors = Vec::new();
        if self.core_diameter_m == 0.0 {
            errors.push(error("Core diameter must not be 0"));
        }
        if self.core_diameter_m >= self.diameter_m {
            errors.push(error("Core diameter must be less than grain diameter"));
        }
        if self.rod_diameter_m >= self.core_diameter_m {
            errors.push(error("Rod diameter must be less than core diameter"));
        }
        errors
    }

    fn shape_details(&self, length_unit: &str) -> String {
        let fmt = |value: f64| {
            units::conv_format(value, "m", length_unit, 3)
                .unwrap_or_else(|_| format!("{value} m"))
        };
        format!(
            "Length: {}, Core: {}, Rod: {}",
            fmt(self.length_m),
            fmt(self.core_diameter_m),
            fmt(self.rod_diameter_m)
        )
    }
}
