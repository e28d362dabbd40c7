//! Simulation results: channels, alerts, and the derived scalar metrics the
//! query surface exposes.

use srm_core::alerts::{SimAlert, SimAlertLevel};
use srm_core::constants::STANDARD_GRAVITY;
use srm_geometry::circle_area;
use srm_grain::GrainGeometry;

use crate::channels::SimChannels;
use crate::motor::Motor;

/// All results from a single simulation: the motor snapshot it was computed
/// from, the per-timestep channels, a success flag, and any alerts raised
/// while validating or running.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub motor: Motor,
    pub channels: SimChannels,
    pub alerts: Vec<SimAlert>,
    pub success: bool,
}

impl SimulationResult {
    pub(crate) fn new(motor: Motor) -> Self {
        Self {
            motor,
            channels: SimChannels::new(),
            alerts: Vec::new(),
            success: false,
        }
    }

    pub fn add_alert(&mut self, alert: SimAlert) {
        self.alerts.push(alert);
    }

    pub fn alerts_by_level(&self, level: SimAlertLevel) -> Vec<&SimAlert> {
        self.alerts
            .iter()
            .filter(|alert| alert.level == level)
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        !self.alerts_by_level(SimAlertLevel::Error).is_empty()
    }

    /// Time from ignition until thrust last exceeded the burnout threshold.
    pub fn burn_time(&self) -> f64 {
        self.channels.time.last()
    }

    pub fn initial_kn(&self) -> f64 {
        self.channels.kn.point(0)
    }

    pub fn peak_kn(&self) -> f64 {
        self.channels.kn.max()
    }

    pub fn average_pressure(&self) -> f64 {
        self.channels.pressure.average()
    }

    pub fn max_pressure(&self) -> f64 {
        self.channels.pressure.max()
    }

    pub fn min_exit_pressure(&self) -> f64 {
        self.channels.exit_pressure.min()
    }

    /// Fraction of recorded samples in which `data` sits below `threshold`.
    pub fn percent_below_threshold(data: &[f64], threshold: f64) -> f64 {
        if data.is_empty() {
            return 0.0;
        }
        let below = data.iter().filter(|value| **value < threshold).count();
        below as f64 / data.len() as f64
    }

    /// Total impulse, integrated up to `stop` samples if given.
    pub fn impulse(&self, stop: Option<usize>) -> f64 {
        let time = self.channels.time.data();
        let force = self.channels.force.data();
        let end = stop.unwrap_or(time.len()).min(time.len());
        let mut impulse = 0.0;
        let mut last_time = 0.0;
        for (t, f) in time[..end].iter().zip(&force[..end]) {
            impulse += f * (t - last_time);
            last_time = *t;
        }
        impulse
    }

    pub fn average_force(&self) -> f64 {
        self.channels.force.average()
    }

    /// Standard amateur rocketry designation (H128, M1297) for the motor.
    pub fn designation(&self) -> String {
        let impulse = self.impulse(None);
        // Below the A-class floor there is no designation (and no log of 0).
        if impulse < 1.25 {
            return "N/A".to_string();
        }
        let class_index = (impulse / 1.25).log2() as u32;
        let class_letter = char::from_u32('A' as u32 + class_index).unwrap_or('?');
        format!("{}{}", class_letter, self.average_force() as i64)
    }

    /// Designation with the total impulse prepended.
    pub fn full_designation(&self) -> String {
        format!("{:.0}{}", self.impulse(None), self.designation())
    }

    /// How far between its class's minimum and maximum impulse this motor
    /// sits.
    pub fn impulse_class_percentage(&self) -> f64 {
        let impulse = self.impulse(None);
        if impulse < 1.25 {
            return 0.0;
        }
        let class_min = 1.25 * 2.0_f64.powi((impulse / 1.25).log2() as i32);
        (impulse - class_min) / class_min
    }

    pub fn peak_mass_flux(&self) -> f64 {
        self.channels.mass_flux.max()
    }

    /// Grain index where the peak mass flux was observed.
    pub fn peak_mass_flux_location(&self) -> Option<usize> {
        self.channels.mass_flux.max_location()
    }

    pub fn peak_mach_number(&self) -> f64 {
        self.channels.mach_number.max()
    }

    pub fn peak_mach_number_location(&self) -> Option<usize> {
        self.channels.mach_number.max_location()
    }

    /// Specific impulse delivered, optionally up to a sample index.
    pub fn isp(&self, index: Option<usize>) -> f64 {
        let prop_mass = match index {
            None => self.propellant_mass(0),
            Some(index) => self.propellant_mass(0) - self.propellant_mass(index),
        };
        if prop_mass == 0.0 {
            return 0.0;
        }
        self.impulse(index) / (prop_mass * STANDARD_GRAVITY)
    }

    /// Port/throat area ratio of the aft-most grain, or `None` for motors
    /// without a port.
    pub fn port_ratio(&self) -> Option<f64> {
        let aft_port = self.motor.grains.last()?.port_area(0.0)?;
        Some(aft_port / circle_area(self.motor.nozzle.throat_m))
    }

    /// Total length of all propellant before the burn.
    pub fn propellant_length(&self) -> f64 {
        self.motor.grains.iter().map(|grain| grain.length()).sum()
    }

    /// Total propellant mass at a sample index (0 for the unburned motor).
    pub fn propellant_mass(&self, index: usize) -> f64 {
        self.channels.mass.point(index).iter().sum()
    }

    /// Percentage of the motor volume occupied by propellant at a sample.
    pub fn volume_loading(&self, index: usize) -> f64 {
        self.channels.volume_loading.point(index)
    }

    /// Thrust coefficient at the average burn pressure, losses excluded.
    pub fn ideal_thrust_coefficient(&self) -> f64 {
        let Some(propellant) = &self.motor.propellant else {
            return 0.0;
        };
        let chamber = self.average_pressure();
        let Some(props) = propellant.combustion_properties(chamber) else {
            return 0.0;
        };
        self.motor.nozzle.ideal_thrust_coeff(
            chamber,
            self.motor.config.amb_pressure_pa,
            props.k,
            0.0,
            None,
        )
    }

    /// Thrust coefficient at the average burn pressure, losses included.
    pub fn adjusted_thrust_coefficient(&self) -> f64 {
        let Some(propellant) = &self.motor.propellant else {
            return 0.0;
        };
        let chamber = self.average_pressure();
        let Some(props) = propellant.combustion_properties(chamber) else {
            return 0.0;
        };
        self.motor.nozzle.adjusted_thrust_coeff(
            chamber,
            self.motor.config.amb_pressure_pa,
            props.k,
            0.0,
            None,
        )
    }

    /// Whether the burn loop should keep stepping, based on the thrust from
    /// the last timestep relative to the peak so far.
    pub(crate) fn should_continue(&self, thrust_thres_pct: f64) -> bool {
        // With only one data point there is nothing to compare.
        if self.channels.time.len() == 1 {
            return true;
        }
        self.channels.force.last() > thrust_thres_pct * 0.01 * self.channels.force.max()
    }
}
