//! Propellant grain geometry.
//!
//! A grain is a solid piece of propellant with a defined cross-section that
//! burns inward from its exposed surfaces. Every variant answers the same
//! geometry queries as a function of regression depth: burning surface area,
//! remaining propellant volume, web left before burnout, port flow area, and
//! mass flux at a station. Closed-form variants (BATES, conical, end burner,
//! rod and tube) answer analytically; raster variants (finocyl, custom)
//! regress a discretized cross-section through a distance field and extract
//! the burning perimeter with marching squares.

pub mod bates;
pub mod conical;
pub mod custom;
pub mod end_burner;
pub mod finocyl;
pub mod perforated;
pub mod raster;
pub mod rod_tube;

pub use bates::BatesGrain;
pub use conical::ConicalGrain;
pub use custom::CustomGrain;
pub use end_burner::EndBurnerGrain;
pub use finocyl::FinocylGrain;
pub use perforated::CoreShape;
pub use raster::{RasterCore, RegressionData};
pub use rod_tube::RodTubeGrain;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use srm_core::alerts::{SimAlert, SimAlertLevel, SimAlertType};
use srm_core::units;
use srm_geometry::cylinder_volume;

#[derive(Debug, Error)]
pub enum GrainError {
    #[error(transparent)]
    Contour(#[from] srm_contour::ContourError),
}

/// Which grain faces are inhibited from burning. "Top" is the forward
/// (head) end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InhibitedEnds {
    Neither,
    Top,
    Bottom,
    Both,
}

impl InhibitedEnds {
    pub fn top_exposed(self) -> bool {
        matches!(self, InhibitedEnds::Neither | InhibitedEnds::Bottom)
    }

    pub fn bottom_exposed(self) -> bool {
        matches!(self, InhibitedEnds::Neither | InhibitedEnds::Top)
    }

    pub fn exposed_faces(self) -> u32 {
        u32::from(self.top_exposed()) + u32::from(self.bottom_exposed())
    }
}

/// The geometry contract every grain variant answers, polymorphic over
/// regression depth. Depths are linear distances burned inward since
/// ignition; they only grow over a simulation.
pub trait GrainGeometry {
    /// Outer (casting tube) diameter, fixed for the grain's lifetime.
    fn diameter(&self) -> f64;

    /// Unburned grain length.
    fn length(&self) -> f64;

    /// Burning surface area after regressing `reg_dist`.
    fn surface_area_at_regression(&self, reg_dist: f64) -> f64;

    /// Propellant volume remaining after regressing `reg_dist`.
    fn volume_at_regression(&self, reg_dist: f64) -> f64;

    /// Shortest distance the grain still has to regress to burn out.
    fn web_remaining(&self, reg_dist: f64) -> f64;

    /// Cross-sectional flow area of the port, or `None` for grains without
    /// one (end burners).
    fn port_area(&self, reg_dist: f64) -> Option<f64>;

    /// Positions of the grain ends relative to the original (unburned)
    /// forward face, as `(forward, aft)`.
    fn end_positions(&self, reg_dist: f64) -> (f64, f64);

    /// Mass flux at a position along the grain measured from the head end,
    /// given the mass flow entering from upstream, the timestep, the
    /// regression state, and the propellant density.
    fn mass_flux(
        &self,
        mass_in: f64,
        dt: f64,
        reg_dist: f64,
        d_reg_dist: f64,
        position: f64,
        density: f64,
    ) -> f64;

    /// Peak mass flux through the grain. Assumed to occur at the aft end
    /// unless a variant knows better.
    fn peak_mass_flux(
        &self,
        mass_in: f64,
        dt: f64,
        reg_dist: f64,
        d_reg_dist: f64,
        density: f64,
    ) -> f64 {
        let (_, aft) = self.end_positions(reg_dist);
        self.mass_flux(mass_in, dt, reg_dist, d_reg_dist, aft, density)
    }

    /// Validation diagnostics. Errors prevent simulation; warnings flag
    /// suspect but simulable inputs.
    fn geometry_errors(&self) -> Vec<SimAlert>;

    /// One-time preparation before a simulation run. Raster variants build
    /// their core map at the configured grid resolution here.
    fn simulation_setup(&mut self, map_dim: usize) -> Result<(), GrainError> {
        let _ = map_dim;
        Ok(())
    }

    /// Short human-readable description in the requested length unit.
    fn details(&self, length_unit: &str) -> String {
        format!(
            "Length: {}",
            units::conv_format(self.length(), "m", length_unit, 3)
                .unwrap_or_else(|_| format!("{} m", self.length()))
        )
    }

    /// Propellant volume consumed while regressing from `reg_dist` by
    /// `d_reg_dist`.
    fn volume_slice(&self, reg_dist: f64, d_reg_dist: f64) -> f64 {
        self.volume_at_regression(reg_dist) - self.volume_at_regression(reg_dist + d_reg_dist)
    }

    /// True while the grain still has propellant to burn.
    fn is_web_left(&self, reg_dist: f64, burnout_thres: f64) -> bool {
        self.web_remaining(reg_dist) > burnout_thres
    }

    /// Grain length once inhibition and regression are accounted for.
    fn regressed_length(&self, reg_dist: f64) -> f64 {
        let (forward, aft) = self.end_positions(reg_dist);
        aft - forward
    }

    /// Volume of the bounding cylinder around the grain.
    fn bounding_volume(&self) -> f64 {
        cylinder_volume(self.diameter(), self.length())
    }

    /// Empty (non-propellant) volume inside the bounding cylinder.
    fn free_volume(&self, reg_dist: f64) -> f64 {
        self.bounding_volume() - self.volume_at_regression(reg_dist)
    }
}

/// Checks shared by every variant: zero dimensions cannot be simulated.
pub(crate) fn base_geometry_errors(diameter_m: f64, length_m: f64) -> Vec<SimAlert> {
    let mut errors = Vec::new();
    if diameter_m == 0.0 {
        errors.push(SimAlert::new(
            SimAlertLevel::Error,
            SimAlertType::Geometry,
            "Diameter must not be 0",
        ));
    }
    if length_m == 0.0 {
        errors.push(SimAlert::new(
            SimAlertLevel::Error,
            SimAlertType::Geometry,
            "Length must not be 0",
        ));
    }
    errors
}

/// A propellant grain, closed over the supported cross-section variants.
#[derive(Debug, Clone)]
pub enum Grain {
    Bates(BatesGrain),
    Conical(ConicalGrain),
    EndBurner(EndBurnerGrain),
    RodTube(RodTubeGrain),
    Finocyl(FinocylGrain),
    Custom(CustomGrain),
}

impl Grain {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Grain::Bates(_) => "BATES",
            Grain::Conical(_) => "Conical",
            Grain::EndBurner(_) => "End Burner",
            Grain::RodTube(_) => "Rod and Tube",
            Grain::Finocyl(_) => "Finocyl",
            Grain::Custom(_) => "Custom",
        }
    }

    // Perforated variants share their geometry answers through `CoreShape`;
    // the conical and end-burning grains answer directly.
    fn core_shape(&self) -> Option<&dyn CoreShape> {
        match self {
            Grain::Bates(g) => Some(g),
            Grain::RodTube(g) => Some(g),
            Grain::Finocyl(g) => Some(g),
            Grain::Custom(g) => Some(g),
            Grain::Conical(_) | Grain::EndBurner(_) => None,
        }
    }

    fn core_shape_mut(&mut self) -> Option<&mut dyn CoreShape> {
        match self {
            Grain::Bates(g) => Some(g),
            Grain::RodTube(g) => Some(g),
            Grain::Finocyl(g) => Some(g),
            Grain::Custom(g) => Some(g),
            Grain::Conical(_) | Grain::EndBurner(_) => None,
        }
    }

    /// Face map, regression map, and equally spaced contour sets for preview
    /// rendering. Only raster variants carry this data.
    pub fn regression_data(
        &self,
        map_dim: usize,
        num_contours: usize,
    ) -> Option<Result<RegressionData, GrainError>> {
        match self {
            Grain::Finocyl(g) => Some(raster::regression_data(
                map_dim,
                num_contours,
                g.diameter_m,
                |x, y| g.is_open(x, y),
            )),
            Grain::Custom(g) => Some(raster::regression_data(
                map_dim,
                num_contours,
                g.diameter_m,
                |x, y| g.is_open(x, y),
            )),
            _ => None,
        }
    }
}

impl GrainGeometry for Grain {
    fn diameter(&self) -> f64 {
        if let Some(shape) = self.core_shape() {
            return shape.outer_diameter();
        }
        match self {
            Grain::Conical(g) => g.diameter(),
            Grain::EndBurner(g) => g.diameter(),
            _ => unreachable!(),
        }
    }

    fn length(&self) -> f64 {
        if let Some(shape) = self.core_shape() {
            return shape.grain_length();
        }
        match self {
            Grain::Conical(g) => g.length(),
            Grain::EndBurner(g) => g.length(),
            _ => unreachable!(),
        }
    }

    fn surface_area_at_regression(&self, reg_dist: f64) -> f64 {
        if let Some(shape) = self.core_shape() {
            return perforated::surface_area(shape, reg_dist);
        }
        match self {
            Grain::Conical(g) => g.surface_area_at_regression(reg_dist),
            Grain::EndBurner(g) => g.surface_area_at_regression(reg_dist),
            _ => unreachable!(),
        }
    }

    fn volume_at_regression(&self, reg_dist: f64) -> f64 {
        if let Some(shape) = self.core_shape() {
            return perforated::volume(shape, reg_dist);
        }
        match self {
            Grain::Conical(g) => g.volume_at_regression(reg_dist),
            Grain::EndBurner(g) => g.volume_at_regression(reg_dist),
            _ => unreachable!(),
        }
    }

    fn web_remaining(&self, reg_dist: f64) -> f64 {
        if let Some(shape) = self.core_shape() {
            return perforated::web_remaining(shape, reg_dist);
        }
        match self {
            Grain::Conical(g) => g.web_remaining(reg_dist),
            Grain::EndBurner(g) => g.web_remaining(reg_dist),
            _ => unreachable!(),
        }
    }

    fn port_area(&self, reg_dist: f64) -> Option<f64> {
        if let Some(shape) = self.core_shape() {
            return Some(perforated::port_area(shape, reg_dist));
        }
        match self {
            Grain::Conical(g) => g.port_area(reg_dist),
            Grain::EndBurner(g) => g.port_area(reg_dist),
            _ => unreachable!(),
        }
    }

    fn end_positions(&self, reg_dist: f64) -> (f64, f64) {
        if let Some(shape) = self.core_shape() {
            return perforated::end_positions(shape, reg_dist);
        }
        match self {
            Grain::Conical(g) => g.end_positions(reg_dist),
            Grain::EndBurner(g) => g.end_positions(reg_dist),
            _ => unreachable!(),
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
        if let Some(shape) = self.core_shape() {
            return perforated::mass_flux(
                shape, mass_in, dt, reg_dist, d_reg_dist, position, density,
            );
        }
        match self {
            Grain::Conical(g) => g.mass_flux(mass_in, dt, reg_dist, d_reg_dist, position, density),
            Grain::EndBurner(g) => {
                g.mass_flux(mass_in, dt, reg_dist, d_reg_dist, position, density)
            }
            _ => unreachable!(),
        }
    }

    fn peak_mass_flux(
        &self,
        mass_in: f64,
        dt: f64,
        reg_dist: f64,
        d_reg_dist: f64,
        density: f64,
    ) -> f64 {
        match self {
            // The conical grain's peak can sit at either end.
            Grain::Conical(g) => g.peak_mass_flux(mass_in, dt, reg_dist, d_reg_dist, density),
            _ => {
                let (_, aft) = self.end_positions(reg_dist);
                self.mass_flux(mass_in, dt, reg_dist, d_reg_dist, aft, density)
            }
        }
    }

    fn geometry_errors(&self) -> Vec<SimAlert> {
        if let Some(shape) = self.core_shape() {
            return perforated::geometry_errors(shape);
        }
        match self {
            Grain::Conical(g) => g.geometry_errors(),
            Grain::EndBurner(g) => g.geometry_errors(),
            _ => unreachable!(),
        }
    }

    fn simulation_setup(&mut self, map_dim: usize) -> Result<(), GrainError> {
        if let Some(shape) = self.core_shape_mut() {
            return shape.shape_setup(map_dim);
        }
        Ok(())
    }

    fn details(&self, length_unit: &str) -> String {
        if let Some(shape) = self.core_shape() {
            return shape.shape_details(length_unit);
        }
        match self {
            Grain::Conical(g) => g.details(length_unit),
            Grain::EndBurner(g) => g.details(length_unit),
            _ => unreachable!(),
        }
    }
}
