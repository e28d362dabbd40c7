//! BATES grain: a simple cylindrical core.
//!
//! Kept analytic rather than raster-based since the circle math is exact and
//! much cheaper than regressing a core map.

use srm_core::alerts::{SimAlert, SimAlertLevel, SimAlertType};
use srm_core::units;
use srm_geometry::{circle_area, circle_perimeter};

use crate::{CoreShape, InhibitedEnds};

#[derive(Debug, Clone, PartialEq)]
pub struct BatesGrain {
    pub diameter_m: f64,
    pub length_m: f64,
    pub core_diameter_m: f64,
    pub inhibited_ends: InhibitedEnds,
}

impl CoreShape for BatesGrain {
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
        (self.diameter_m - self.core_diameter_m) / 2.0
    }

    fn core_perimeter(&self, reg_dist: f64) -> f64 {
        circle_perimeter(self.core_diameter_m + 2.0 * reg_dist)
    }

    fn face_area(&self, reg_dist: f64) -> f64 {
        let outer = circle_area(self.diameter_m);
        let inner = circle_area(self.core_diameter_m + 2.0 * reg_dist);
        outer - inner
    }

    fn shape_errors(&self) -> Vec<SimAlert> {
        let mut errors = Vec::new();
        if self.core_diameter_m == 0.0 {
            errors.push(SimAlert::new(
                SimAlertLevel::Error,
                SimAlertType::Geometry,
                "Core diameter must not be 0",
            ));
        }
        if self.core_diameter_m >= self.diameter_m {
            errors.push(SimAlert::new(
                SimAlertLevel::Error,
                SimAlertType::Geometry,
                "Core diameter must be less than grain diameter",
            ));
        }
        errors
    }

    fn shape_details(&self, length_unit: &str) -> String {
        let fmt = |value: f64| {
            units::conv_format(value, "m", length_unit, 3)
                .unwrap_or_else(|_| format!("{value} m"))
        };
        format!(
            "Length: {}, Core: {}",
            fmt(self.length_m),
            fmt(self.core_diameter_m)
        )
    }
}
