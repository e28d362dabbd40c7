use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use srm_ballistics::config::load_motor;
use srm_ballistics::core::alerts::SimAlertLevel;
use srm_ballistics::core::units;
use srm_ballistics::export::{CsvOptions, write_channels_csv, write_summary_json};
use srm_ballistics::grain::GrainGeometry;
use srm_ballistics::sim::Motor;

#[derive(Parser)]
#[command(author, version, about = "Internal-ballistics simulator for solid rocket motors")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate a motor file and print the burn summary
    Run {
        /// Motor definition (YAML or TOML)
        motor_file: PathBuf,

        /// Write the simulated channels to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the derived metrics to a JSON file
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Suppress the per-step progress readout
        #[arg(long)]
        quiet: bool,
    },
    /// Validate a motor file and print its static metrics without running
    Check {
        /// Motor definition (YAML or TOML)
        motor_file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            motor_file,
            csv,
            summary,
            quiet,
        } => run(motor_file, csv, summary, quiet),
        Command::Check { motor_file } => check(motor_file),
    }
}

fn run(
    motor_file: PathBuf,
    csv: Option<PathBuf>,
    summary: Option<PathBuf>,
    quiet: bool,
) -> anyhow::Result<()> {
    let record = load_motor(&motor_file)
        .with_context(|| format!("loading {}", motor_file.display()))?;
    let motor = Motor::from_config(&record);

    let result = if quiet {
        motor.run_simulation()
    } else {
        let mut last_percent = -1i64;
        motor.run_simulation_observed(|fraction| {
            let percent = (fraction * 100.0) as i64;
            if percent > last_percent {
                last_percent = percent;
                eprint!("\rSimulating: {percent:>3}%");
                let _ = std::io::stderr().flush();
            }
            false
        })
    };
    if !quiet {
        eprintln!();
    }

    for alert in &result.alerts {
        eprintln!("{alert}");
    }

    if result.success {
        let max_pressure = units::conv_format(result.max_pressure(), "Pa", "psi", 1)?;
        let average_force = units::conv_format(result.average_force(), "N", "lbf", 1)?;
        println!("Designation: {}", result.full_designation());
        println!("Burn time: {:.2} s", result.burn_time());
        println!("Impulse: {:.1} Ns", result.impulse(None));
        println!("ISP: {:.1} s", result.isp(None));
        println!(
            "Average force: {:.1} N ({})",
            result.average_force(),
            average_force
        );
        println!(
            "Max pressure: {:.0} Pa ({})",
            result.max_pressure(),
            max_pressure
        );
        println!("Initial Kn: {:.1}", result.initial_kn());
        println!("Peak mass flux: {:.1} kg/(m^2*s)", result.peak_mass_flux());
        if let Some(ratio) = result.port_ratio() {
            println!("Port/throat ratio: {ratio:.2}");
        }
    }

    if let Some(path) = csv {
        let file = std::fs::File::create(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        write_channels_csv(file, &result, &CsvOptions::default())?;
    }
    if let Some(path) = summary {
        write_summary_json(&path, &result)?;
    }

    if !result.success {
        bail!("simulation did not complete successfully");
    }
    if !result.alerts_by_level(SimAlertLevel::Error).is_empty() {
        bail!("simulation produced error-level alerts");
    }
    Ok(())
}

fn check(motor_file: PathBuf) -> anyhow::Result<()> {
    let record = load_motor(&motor_file)
        .with_context(|| format!("loading {}", motor_file.display()))?;
    let motor = Motor::from_config(&record);

    let mut clean = true;
    for (gid, grain) in motor.grains.iter().enumerate() {
        for alert in grain.geometry_errors() {
            clean = false;
            eprintln!("Grain {}: {alert}", gid + 1);
        }
    }
    for alert in motor.nozzle.geometry_errors() {
        clean = false;
        eprintln!("{alert}");
    }
    if let Some(propellant) = &motor.propellant {
        for alert in propellant.validation_errors() {
            clean = false;
            eprintln!("{alert}");
        }
    } else {
        clean = false;
        eprintln!("No propellant set; the motor cannot be simulated");
    }

    let quick = motor.quick_results();
    println!("Volume loading: {:.1} %", quick.volume_loading);
    println!("Initial Kn: {:.1}", quick.initial_kn);
    println!("Propellant mass: {:.3} kg", quick.propellant_mass_kg);
    match quick.port_ratio {
        Some(ratio) => println!("Port/throat ratio: {ratio:.2}"),
        None => println!("Port/throat ratio: N/A"),
    }
    println!("Propellant length: {:.3} m", quick.length_m);

    if !clean {
        bail!("motor file has validation problems");
    }
    Ok(())
}
