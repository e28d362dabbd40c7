//! Shared behavior for grains with a hole of some shape through the center.
//!
//! A perforated variant only has to describe its core: perimeter and face
//! area as functions of regression depth, plus the maximum wall web. The
//! rest of the grain contract (surfaces, volumes, port, mass flux) follows
//! from those quantities and the inhibitor configuration.

use srm_core::alerts::SimAlert;
use srm_core::units;
use srm_geometry::circle_area;

use crate::{GrainError, InhibitedEnds, base_geometry_errors};

/// Core description supplied by a perforated grain variant.
pub trait CoreShape {
    fn outer_diameter(&self) -> f64;
    fn grain_length(&self) -> f64;
    fn inhibited_ends(&self) -> InhibitedEnds;

    /// Maximum distance from the core surface to the wall; the grain burns
    /// out radially once this much web is consumed.
    fn wall_web(&self) -> f64;

    /// Perimeter of the core cross-section after regressing `reg_dist`.
    fn core_perimeter(&self, reg_dist: f64) -> f64;

    /// Area of the grain face after regressing `reg_dist`: the face of an
    /// equal-diameter end burner minus the port area.
    fn face_area(&self, reg_dist: f64) -> f64;

    /// Variant-specific validation beyond the base dimension checks.
    fn shape_errors(&self) -> Vec<SimAlert>;

    /// One-time simulation preparation hook.
    fn shape_setup(&mut self, map_dim: usize) -> Result<(), GrainError> {
        let _ = map_dim;
        Ok(())
    }

    /// Variant-specific details line.
    fn shape_details(&self, length_unit: &str) -> String {
        format!(
            "Length: {}",
            units::conv_format(self.grain_length(), "m", length_unit, 3)
                .unwrap_or_else(|_| format!("{} m", self.grain_length()))
        )
    }
}

pub(crate) fn end_positions(shape: &dyn CoreShape, reg_dist: f64) -> (f64, f64) {
    let length = shape.grain_length();
    match shape.inhibited_ends() {
        InhibitedEnds::Neither => (reg_dist, length - reg_dist),
        InhibitedEnds::Top => (0.0, length - reg_dist),
        InhibitedEnds::Bottom => (reg_dist, length),
        InhibitedEnds::Both => (0.0, length),
    }
}

pub(crate) fn regressed_length(shape: &dyn CoreShape, reg_dist: f64) -> f64 {
    let (forward, aft) = end_positions(shape, reg_dist);
    aft - forward
}

pub(crate) fn surface_area(shape: &dyn CoreShape, reg_dist: f64) -> f64 {
    let face_area = shape.face_area(reg_dist);
    let core_area = shape.core_perimeter(reg_dist) * regressed_length(shape, reg_dist);
    let exposed_faces = f64::from(shape.inhibited_ends().exposed_faces());
    core_area + exposed_faces * face_area
}

pub(crate) fn volume(shape: &dyn CoreShape, reg_dist: f64) -> f64 {
    shape.face_area(reg_dist) * regressed_length(shape, reg_dist)
}

pub(crate) fn web_remaining(shape: &dyn CoreShape, reg_dist: f64) -> f64 {
    let wall_left = shape.wall_web() - reg_dist;
    if shape.inhibited_ends() == InhibitedEnds::Both {
        return wall_left;
    }
    wall_left.min(regressed_length(shape, reg_dist))
}

pub(crate) fn port_area(shape: &dyn CoreShape, reg_dist: f64) -> f64 {
    circle_area(shape.outer_diameter()) - shape.face_area(reg_dist)
}

pub(crate) fn mass_flux(
    shape: &dyn CoreShape,
    mass_in: f64,
    dt: f64,
    reg_dist: f64,
    d_reg_dist: f64,
    position: f64,
    density: f64,
) -> f64 {
    let diameter = shape.outer_diameter();
    let (forward, aft) = end_positions(shape, reg_dist);

    // Above the forward face the flow is just the inflow through the casting
    // tube.
    if position < forward {
        return mass_in / circle_area(diameter);
    }
    // Within the grain: inflow plus the face above and the core up to this
    // position, flowing through the port.
    if position <= aft {
        let (top, counted_core_length) = if matches!(
            shape.inhibited_ends(),
            InhibitedEnds::Top | InhibitedEnds::Both
        ) {
            (0.0, position)
        } else {
            (
                shape.face_area(reg_dist + d_reg_dist) * d_reg_dist * density,
                position - (forward + d_reg_dist),
            )
        };
        let core = (port_area(shape, reg_dist + d_reg_dist) * counted_core_length
            - port_area(shape, reg_dist) * counted_core_length)
            * density;
        let mass_flow = mass_in + (top + core) / dt;
        return mass_flow / port_area(shape, reg_dist + d_reg_dist);
    }
    // Past the aft end: everything the grain produced this step, flowing
    // through the casting tube.
    let volume_slice = volume(shape, reg_dist) - volume(shape, reg_dist + d_reg_dist);
    let mass_flow = mass_in + volume_slice * density / dt;
    mass_flow / circle_area(diameter)
}

pub(crate) fn geometry_errors(shape: &dyn CoreShape) -> Vec<SimAlert> {
    let mut errors = base_geometry_errors(shape.outer_diameter(), shape.grain_length());
    errors.extend(shape.shape_errors());
    errors
}
