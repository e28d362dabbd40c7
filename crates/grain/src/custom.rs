//! Custom grain: an arbitrary cross-section described by one or more
//! polygons, rasterized onto the core map.

use srm_core::alerts::{SimAlert, SimAlertLevel, SimAlertType};
use srm_core::units;
use srm_geometry::dist;

use crate::raster::{self, RasterCore, normalize};
use crate::{CoreShape, GrainError, InhibitedEnds};

#[derive(Debug, Clone)]
pub struct CustomGrain {
    pub diameter_m: f64,
    pub length_m: f64,
    /// Core polygons in meters, relative to the grain center.
    pub core_polygons: Vec<Vec<[f64; 2]>>,
    pub inhibited_ends: InhibitedEnds,
    core: Option<RasterCore>,
}

impl CustomGrain {
    pub fn new(
        diameter_m: f64,
        length_m: f64,
        core_polygons: Vec<Vec<[f64; 2]>>,
        inhibited_ends: InhibitedEnds,
    ) -> Self {
        Self {
            diameter_m,
            length_m,
            core_polygons,
            inhibited_ends,
            core: None,
        }
    }

    /// True where some core polygon covers the point, in normalized
    /// coordinates.
    pub fn is_open(&self, x: f64, y: f64) -> bool {
        let radius = self.diameter_m / 2.0;
        let point = [x * radius, y * radius];
        self.core_polygons
            .iter()
            .any(|polygon| point_in_polygon(point, polygon))
    }
}

// Ray casting with the even-odd rule.
fn point_in_polygon(point: [f64; 2], polygon: &[[f64; 2]]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a[1] > point[1]) != (b[1] > point[1]) {
            let crossing = (b[0] - a[0]) * (point[1] - a[1]) / (b[1] - a[1]) + a[0];
            if point[0] < crossing {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

impl PartialEq for CustomGrain {
    // Regression state is derived, not part of the grain's identity.
    fn eq(&self, other: &Self) -> bool {
        self.diameter_m == other.diameter_m
            && self.length_m == other.length_m
            && self.core_polygons == other.core_polygons
            && self.inhibited_ends == other.inhibited_ends
    }
}

impl CoreShape for CustomGrain {
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
        if self.core_polygons.is_empty() {
            errors.push(error("Core geometry must contain at least one polygon"));
        }
        let radius = self.diameter_m / 2.0;
        for polygon in &self.core_polygons {
            if polygon.len() < 3 {
                errors.push(error("Core polygons must have at least three points"));
            }
            if polygon
                .iter()
                .any(|point| dist(*point, [0.0, 0.0]) > radius)
            {
                errors.push(error("Core geometry must not extend beyond the grain diameter"));
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
        format!(
            "Length: {}, Polygons: {}",
            units::conv_format(self.length_m, "m", length_unit, 3)
                .unwrap_or_else(|_| format!("{} m", self.length_m)),
            self.core_polygons.len()
        )
    }
}
