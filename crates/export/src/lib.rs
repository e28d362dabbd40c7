//! Export helpers for simulation artifacts: a CSV of the time-series
//! channels and a JSON summary of the derived metrics.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use srm_core::units::{self, UnitError};
use srm_sim::channels::{Channel, GrainChannel};
use srm_sim::SimulationResult;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Unit(#[from] UnitError),
}

/// Options for the channel CSV: display units keyed by internal unit, plus
/// channel names and grain indices to leave out.
#[derive(Debug, Default, Clone)]
pub struct CsvOptions {
    /// Conversions applied on the way out, e.g. `("Pa", "psi")`.
    pub display_units: Vec<(String, String)>,
    pub exclude_channels: HashSet<String>,
    pub exclude_grains: HashSet<usize>,
}

impl CsvOptions {
    fn output_unit<'a>(&'a self, internal: &'a str) -> &'a str {
        self.display_units
            .iter()
            .find(|(from, _)| from == internal)
            .map(|(_, to)| to.as_str())
            .unwrap_or(internal)
    }
}

fn scalar_header(channel: &Channel, unit: &str) -> String {
    if unit.is_empty() {
        channel.name.to_string()
    } else {
        format!("{}({})", channel.name, unit)
    }
}

fn grain_headers(
    channel: &GrainChannel,
    unit: &str,
    grain_count: usize,
    excluded: &HashSet<usize>,
) -> Vec<String> {
    (0..grain_count)
        .filter(|gid| !excluded.contains(gid))
        .map(|gid| {
            if unit.is_empty() {
                format!("{}(G{})", channel.name, gid + 1)
            } else {
                format!("{}(G{};{})", channel.name, gid + 1, unit)
            }
        })
        .collect()
}

/// Writes every channel of a result to CSV, one row per timestep. Grain
/// channels expand to one column per grain.
pub fn write_channels_csv<W: Write>(
    writer: W,
    result: &SimulationResult,
    options: &CsvOptions,
) -> Result<(), ExportError> {
    let channels = &result.channels;
    let scalars: [&Channel; 7] = [
        &channels.time,
        &channels.kn,
        &channels.pressure,
        &channels.force,
        &channels.volume_loading,
        &channels.exit_pressure,
        &channels.d_throat,
    ];
    let per_grain: [&GrainChannel; 6] = [
        &channels.mass,
        &channels.mass_flow,
        &channels.mass_flux,
        &channels.regression,
        &channels.web,
        &channels.mach_number,
    ];

    let grain_count = result.motor.grains.len();
    let included_scalar: Vec<&Channel> = scalars
        .into_iter()
        .filter(|channel| !options.exclude_channels.contains(channel.name))
        .collect();
    let included_grain: Vec<&GrainChannel> = per_grain
        .into_iter()
        .filter(|channel| !options.exclude_channels.contains(channel.name))
        .collect();

    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = Vec::new();
    for channel in &included_scalar {
        header.push(scalar_header(channel, options.output_unit(channel.unit)));
    }
    for channel in &included_grain {
        header.extend(grain_headers(
            channel,
            options.output_unit(channel.unit),
            grain_count,
            &options.exclude_grains,
        ));
    }
    csv_writer.write_record(&header)?;

    let samples = channels.time.len();
    for index in 0..samples {
        let mut row = Vec::new();
        for channel in &included_scalar {
            let unit = options.output_unit(channel.unit);
            let value = units::convert(channel.point(index), channel.unit, unit)?;
            row.push(format!("{value:.5}"));
        }
        for channel in &included_grain {
            let unit = options.output_unit(channel.unit);
            for (gid, value) in channel.point(index).iter().enumerate() {
                if !options.exclude_grains.contains(&gid) {
                    let value = units::convert(*value, channel.unit, unit)?;
                    row.push(format!("{value:.5}"));
                }
            }
        }
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Derived metrics of a finished run, shaped for a JSON sidecar.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSummary {
    pub success: bool,
    pub designation: String,
    pub full_designation: String,
    pub burn_time_s: f64,
    pub impulse_ns: f64,
    pub isp_s: f64,
    pub average_force_n: f64,
    pub average_pressure_pa: f64,
    pub max_pressure_pa: f64,
    pub initial_kn: f64,
    pub peak_kn: f64,
    pub peak_mass_flux: f64,
    pub peak_mass_flux_grain: Option<usize>,
    pub peak_mach_number: f64,
    pub peak_mach_number_grain: Option<usize>,
    pub port_ratio: Option<f64>,
    pub propellant_mass_kg: f64,
    pub propellant_length_m: f64,
    pub volume_loading_pct: f64,
    pub ideal_thrust_coefficient: f64,
    pub adjusted_thrust_coefficient: f64,
    pub alerts: Vec<String>,
}

impl MetricSummary {
    pub fn from_result(result: &SimulationResult) -> Self {
        Self {
            success: result.success,
            designation: result.designation(),
            full_designation: result.full_designation(),
            burn_time_s: result.burn_time(),
            impulse_ns: result.impulse(None),
            isp_s: result.isp(None),
            average_force_n: result.average_force(),
            average_pressure_pa: result.average_pressure(),
            max_pressure_pa: result.max_pressure(),
            initial_kn: result.initial_kn(),
            peak_kn: result.peak_kn(),
            peak_mass_flux: result.peak_mass_flux(),
            peak_mass_flux_grain: result.peak_mass_flux_location(),
            peak_mach_number: result.peak_mach_number(),
            peak_mach_number_grain: result.peak_mach_number_location(),
            port_ratio: result.port_ratio(),
            propellant_mass_kg: result.propellant_mass(0),
            propellant_length_m: result.propellant_length(),
            volume_loading_pct: result.volume_loading(0),
            ideal_thrust_coefficient: result.ideal_thrust_coefficient(),
            adjusted_thrust_coefficient: result.adjusted_thrust_coefficient(),
            alerts: result.alerts.iter().map(|alert| alert.to_string()).collect(),
        }
    }
}

/// Writes the metric summary as pretty JSON.
pub fn write_summary_json(path: &Path, result: &SimulationResult) -> Result<(), ExportError> {
    let summary = MetricSummary::from_result(result);
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &summary)?;
    Ok(())
}
