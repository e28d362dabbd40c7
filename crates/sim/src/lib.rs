//! Motor assembly and the burn simulation loop.
//!
//! A `Motor` couples grain regression, chamber pressure, and nozzle thrust
//! over fixed timesteps, producing a `SimulationResult` with per-timestep
//! channels and any alerts raised along the way.

pub mod channels;
pub mod motor;
pub mod result;
mod schema;

pub use channels::{Channel, GrainChannel, SimChannels};
pub use motor::{Motor, QuickResults};
pub use result::SimulationResult;
