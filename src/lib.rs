//! Internal-ballistics simulation for solid rocket motors.
//!
//! Simulates a motor's burn over time by coupling grain regression, chamber
//! pressure, and nozzle thrust, producing pressure/thrust/mass-flow time
//! series and flagging design-rule violations. Keeping the engine in library
//! crates lets multiple front-ends (CLI, GUI, parameter sweeps) share it;
//! this facade re-exports the workspace crates under one roof.

pub use srm_config as config;
pub use srm_contour as contour;
pub use srm_core as core;
pub use srm_export as export;
pub use srm_geometry as geometry;
pub use srm_grain as grain;
pub use srm_nozzle as nozzle;
pub use srm_propellant as propellant;
pub use srm_sim as sim;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
