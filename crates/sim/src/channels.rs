//! Time-series channels recorded over a simulation.
//!
//! Scalar channels hold one value per timestep; grain channels hold one
//! value per grain per timestep. Each carries a display name and the unit
//! its data is stored in (always the internal SI unit).

/// A scalar-per-timestep log channel.
#[derive(Debug, Clone)]
pub struct Channel {
    pub name: &'static str,
    pub unit: &'static str,
    data: Vec<f64>,
}

impl Channel {
    fn new(name: &'static str, unit: &'static str) -> Self {
        Self {
            name,
            unit,
            data: Vec::new(),
        }
    }

    pub fn push(&mut self, value: f64) {
        self.data.push(value);
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn point(&self, index: usize) -> f64 {
        self.data[index]
    }

    pub fn last(&self) -> f64 {
        *self.data.last().expect("channel has data")
    }

    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn average(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }
}

/// A vector-per-timestep log channel, one entry per grain.
#[derive(Debug, Clone)]
pub struct GrainChannel {
    pub name: &'static str,
    pub unit: &'static str,
    data: Vec<Vec<f64>>,
}

impl GrainChannel {
    fn new(name: &'static str, unit: &'static str) -> Self {
        Self {
            name,
            unit,
            data: Vec::new(),
        }
    }

    pub fn push(&mut self, values: Vec<f64>) {
        self.data.push(values);
    }

    pub fn data(&self) -> &[Vec<f64>] {
        &self.data
    }

    pub fn point(&self, index: usize) -> &[f64] {
        &self.data[index]
    }

    pub fn last(&self) -> &[f64] {
        self.data.last().expect("channel has data")
    }

    /// Largest single value recorded for any grain.
    pub fn max(&self) -> f64 {
        self.data
            .iter()
            .flatten()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Grain index holding the channel's maximum value.
    pub fn max_location(&self) -> Option<usize> {
        let value = self.max();
        self.data
            .iter()
            .find_map(|frame| frame.iter().position(|v| *v == value))
    }
}

/// Every channel a simulation produces.
#[derive(Debug, Clone)]
pub struct SimChannels {
    pub time: Channel,
    pub kn: Channel,
    pub pressure: Channel,
    pub force: Channel,
    pub volume_loading: Channel,
    pub exit_pressure: Channel,
    pub d_throat: Channel,
    pub mass: GrainChannel,
    pub mass_flow: GrainChannel,
    pub mass_flux: GrainChannel,
    pub regression: GrainChannel,
    pub web: GrainChannel,
    pub mach_number: GrainChannel,
}

impl SimChannels {
    pub fn new() -> Self {
        Self {
            time: Channel::new("Time", "s"),
            kn: Channel::new("Kn", ""),
            pressure: Channel::new("Chamber Pressure", "Pa"),
            force: Channel::new("Thrust", "N"),
            volume_loading: Channel::new("Volume Loading", "%"),
            exit_pressure: Channel::new("Nozzle Exit Pressure", "Pa"),
            d_throat: Channel::new("Change in Throat Diameter", "m"),
            mass: GrainChannel::new("Propellant Mass", "kg"),
            mass_flow: GrainChannel::new("Mass Flow", "kg/s"),
            mass_flux: GrainChannel::new("Mass Flux", "kg/(m^2*s)"),
            regression: GrainChannel::new("Regression Depth", "m"),
            web: GrainChannel::new("Web", "m"),
            mach_number: GrainChannel::new("Core Mach Number", ""),
        }
    }
}

impl Default for SimChannels {
    fn default() -> Self {
        Self::new()
    }
}
