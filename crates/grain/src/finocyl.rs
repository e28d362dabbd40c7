//! Finocyl grain: a circular core with radial fin slots, regressed on a
//! raster map.

use srm_core::alerts::{SimAlert, SimAlertLevel, SimAlertType};
use srm_core::units;

use crate::raster::{self, RasterCore, normalize};
use crate::{CoreShape, GrainError, InhibitedEnds};

#[derive(Debug, Clone)]
pub struct FinocylGrain {
    pub diameter_m: f64,
    pub length_m: f64,
    pub core_diameter_m: f64,
    pub fin_count: u32,
    pub fin_width_m: f64,
    /// Radial extent of each fin slot beyond the core radius.
    pub fin_length_m: f64,
    pub inhibited_ends: InhibitedEnds,
    core: Option<RasterCore>,
}

impl FinocylGrain {
    pub fn new(
        diameter_m: f64,
        length_m: f64,
        core_diameter_m: f64,
        fin_count: u32,
        fin_width_m: f64,
        fin_length_m: f64,
        inhibited_ends: InhibitedEnds,
    ) -> Self {
        Self {
            diameter_m,
            length_m,
            core_diameter_m,
            fin_count,
            fin_width_m,
            fin_length_m,
            inhibited_ends,
            core: None,
        }
    }

    /// True where the cross-section is open, in normalized coordinates.
    pub fn is_open(&self, x: f64, y: f64) -> bool {
        let core_radius = normalize(self.core_diameter_m, self.diameter_m) / 2.0;
        if x * x + y * y < core_radius * core_radius {
            return true;
        }
        let fin_width = normalize(self.fin_width_m, self.diameter_m);
        let fin_reach = core_radius + normalize(self.fin_length_m, self.diameter_m);
        for fin in 0..self.fin_count {
            let theta = 2.0 * std::f64::consts::PI * f64::from(fin) / f64::from(self.fin_count);
            let (sin, cos) = theta.sin_cos();
            // Distance along the fin axis and across it.
            let along = x * cos + y * sin;
            let across = (x * -sin + y * cos).abs();
            if across < fin_width / 2.0 && along >= 0.0 && along <= fin_reach {
                return true;
            }
        }
        false
    }
}

impl PartialEq for FinocylGrain {
    // Regression state is derived, not part of the grain's identity.
    fn eq(&self, other: &Self) -> bool {
        self.diameter_m == other.diameter_m
            && self.length_m == other.length_m
            && self.core_diameter_m == other.core_diameter_m
            && self.fin_count == other.fin_count
            && self.fin_width_m == other.fin_width_m
            && self.fin_length_m == other.fin_length_m
            && self.inhibited_ends == other.inhibited_ends
    }
}

impl CoreShape for FinocylGrain {
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
        raster::wall_web(&self.core, self.diameter_m)
    }

    fn core_perimeter(&self, reg_dist: f64) -> f64 {
        raster::core_perimeter(&self.core, self.diameter_m, reg_dist)
    }

    fn face_area(&self, reg_dist: f64) -> f64 {
        raster::face_area(&self.core, self.diameter_m, reg_dist)
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
        if self.fin_count > 0 {
            if self.fin_width_m == 0.0 {
                errors.push(error("Fin width must not be 0"));
            }
            if self.core_diameter_m / 2.0 + self.fin_length_m > self.diameter_m / 2.0 {
                errors.push(error("Fins must not extend beyond the grain diameter"));
            }
        }
        errors
    }

    fn shape_setup(&mut self, map_dim: usize) -> Result<(), GrainError> {
        let core = RasterCore::build(map_dim, |x, y| self.is_open(x, y))?;
        self.core = Some(core);
        Ok(())
    }

    fn shape_details(&self, length_unit: &str) -> String {
        let fmt = |value: f64| {
            units::conv_format(value, "m", length_unit, 3)
                .unwrap_or_else(|_| format!("{value} m"))
        };
        format!(
            "Length: {}, Core: {}, Fins: {}",
            fmt(self.length_m),
            fmt(self.core_diameter_m),
            self.fin_count
        )
    }
}
