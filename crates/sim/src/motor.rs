//! The motor: grains, nozzle, propellant, and the burn simulation loop.

use srm_config::SimConfig;
use srm_core::alerts::{SimAlert, SimAlertLevel, SimAlertType};
use srm_core::constants::GAS_CONSTANT;
use srm_core::rootfind;
use srm_geometry::circle_area;
use srm_grain::{Grain, GrainGeometry};
use srm_nozzle::Nozzle;
use srm_propellant::Propellant;

use crate::result::SimulationResult;

// scipy-equivalent Newton termination for the Mach solve.
const MACH_SOLVE_TOL: f64 = 1.48e-8;
const MACH_SOLVE_ITERS: usize = 50;

/// A motor: an ordered list of grains (head end first), a nozzle, an
/// optional propellant, and the simulation configuration. Without a
/// propellant the motor can be edited but not simulated.
#[derive(Debug, Clone)]
pub struct Motor {
    pub grains: Vec<Grain>,
    pub nozzle: Nozzle,
    pub propellant: Option<Propellant>,
    pub config: SimConfig,
}

/// Static metrics computed without running the timestep loop, for
/// interactive preview use.
#[derive(Debug, Clone, Default)]
pub struct QuickResults {
    pub volume_loading: f64,
    pub initial_kn: f64,
    pub propellant_mass_kg: f64,
    pub port_ratio: Option<f64>,
    pub length_m: f64,
}

impl Motor {
    /// Total burning surface area at the given per-grain regression depths.
    /// Grains whose web has dropped below the burnout threshold no longer
    /// contribute.
    pub fn burning_surface_area(&self, reg_depths: &[f64]) -> f64 {
        let burnout_thres = self.config.burnout_web_thres_m;
        self.grains
            .iter()
            .zip(reg_depths)
            .filter(|(grain, reg)| grain.is_web_left(**reg, burnout_thres))
            .map(|(grain, reg)| grain.surface_area_at_regression(*reg))
            .sum()
    }

    /// Kn at the given regression state and accumulated throat change.
    pub fn kn(&self, reg_depths: &[f64], d_throat: f64) -> f64 {
        self.burning_surface_area(reg_depths) / self.nozzle.throat_area(d_throat)
    }

    /// Steady-state chamber pressure at the given regression state. Kn is
    /// computed unless passed in, which saves time on motors where surface
    /// area is expensive.
    pub fn ideal_pressure(&self, reg_depths: &[f64], d_throat: f64, kn: Option<f64>) -> f64 {
        let Some(propellant) = &self.propellant else {
            return 0.0;
        };
        let kn = kn.unwrap_or_else(|| self.kn(reg_depths, d_throat));
        propellant.pressure_from_kn(kn)
    }

    /// Thrust at a chamber pressure. Exit pressure is solved unless passed.
    pub fn thrust(&self, chamber_pressure: f64, d_throat: f64, exit_pressure: Option<f64>) -> f64 {
        let Some(propellant) = &self.propellant else {
            return 0.0;
        };
        let Some(props) = propellant.combustion_properties(chamber_pressure) else {
            return 0.0;
        };
        let thrust_coeff = self.nozzle.adjusted_thrust_coeff(
            chamber_pressure,
            self.config.amb_pressure_pa,
            props.k,
            d_throat,
            exit_pressure,
        );
        (thrust_coeff * self.nozzle.throat_area(d_throat) * chamber_pressure).max(0.0)
    }

    /// Volume inside the motor not occupied by propellant.
    pub fn free_volume(&self, reg_depths: &[f64]) -> f64 {
        self.grains
            .iter()
            .zip(reg_depths)
            .map(|(grain, reg)| grain.free_volume(*reg))
            .sum()
    }

    /// Bounding-cylinder volume of the combustion chamber.
    pub fn total_volume(&self) -> f64 {
        self.grains.iter().map(|grain| grain.bounding_volume()).sum()
    }

    /// Mach number in a grain core for a chamber pressure and mass flux,
    /// from the compressible mass-flux relation solved by Newton's method.
    /// Falls back to 0 when the solve diverges or the chamber is dead.
    pub fn mach_number(&self, chamber_pressure: f64, mass_flux: f64) -> f64 {
        let Some(propellant) = &self.propellant else {
            return 0.0;
        };
        if chamber_pressure <= 1e-6 {
            return 0.0;
        }
        let Some(props) = propellant.combustion_properties(chamber_pressure) else {
            return 0.0;
        };
        let gamma = props.k;
        let a = chamber_pressure * gamma.sqrt() / (GAS_CONSTANT * props.t).sqrt();
        let c = (gamma + 1.0) / (2.0 * (gamma - 1.0));
        let b = move |m: f64| 1.0 + ((gamma - 1.0) / 2.0) * m * m;

        let solved = rootfind::newton(
            |m| a * m * b(m).powf(c) - mass_flux,
            |m| {
                let db_dm = (gamma - 1.0) * m;
                a * (b(m).powf(c) + m * c * b(m).powf(c - 1.0) * db_dm)
            },
            0.5,
            MACH_SOLVE_TOL,
            MACH_SOLVE_ITERS,
        );
        solved.unwrap_or(0.0).max(0.0)
    }

    /// Runs a full burn simulation.
    pub fn run_simulation(&self) -> SimulationResult {
        self.run_simulation_observed(|_| false)
    }

    /// Runs a full burn simulation, reporting a completion fraction in
    /// [0, 1] to `progress` once per timestep. A truthy return requests
    /// cancellation, producing a partial, non-success result.
    pub fn run_simulation_observed(
        &self,
        mut progress: impl FnMut(f64) -> bool,
    ) -> SimulationResult {
        let burnout_web_thres = self.config.burnout_web_thres_m;
        let burnout_thrust_thres = self.config.burnout_thrust_thres_pct;
        let dt = self.config.timestep_s;

        let mut motor = self.clone();
        let mut sim_res = SimulationResult::new(self.clone());

        // Validate the motor's structure and geometry.
        if motor.grains.is_empty() {
            sim_res.add_alert(
                SimAlert::new(
                    SimAlertLevel::Error,
                    SimAlertType::Constraint,
                    "Motor must have at least one propellant grain",
                )
                .at("Motor"),
            );
        }
        for (gid, grain) in motor.grains.iter().enumerate() {
            // End burners have to be at the forward end.
            if matches!(grain, Grain::EndBurner(_)) && gid != 0 {
                sim_res.add_alert(
                    SimAlert::new(
                        SimAlertLevel::Error,
                        SimAlertType::Constraint,
                        "End burning grains must be the forward-most grain in the motor",
                    )
                    .at(format!("Grain {}", gid + 1)),
                );
            }
            for mut alert in grain.geometry_errors() {
                alert.location = Some(format!("Grain {}", gid + 1));
                sim_res.add_alert(alert);
            }
        }
        for alert in motor.nozzle.geometry_errors() {
            sim_res.add_alert(alert);
        }
        match &motor.propellant {
            None => sim_res.add_alert(
                SimAlert::new(
                    SimAlertLevel::Error,
                    SimAlertType::Constraint,
                    "Motor must have a propellant set",
                )
                .at("Motor"),
            ),
            Some(propellant) => {
                for alert in propellant.validation_errors() {
                    sim_res.add_alert(alert);
                }
            }
        }

        // Any error aborts before a single timestep is produced.
        if sim_res.has_errors() {
            return sim_res;
        }

        let density = motor
            .propellant
            .as_ref()
            .map(|p| p.density_kg_m3)
            .expect("propellant present after validation");

        // This doesn't change over the burn.
        let motor_volume = motor.total_volume();

        // Generate core maps for raster grains.
        let map_dim = motor.config.map_dim;
        for (gid, grain) in motor.grains.iter_mut().enumerate() {
            if let Err(err) = grain.simulation_setup(map_dim) {
                sim_res.add_alert(
                    SimAlert::new(SimAlertLevel::Error, SimAlertType::Geometry, err.to_string())
                        .at(format!("Grain {}", gid + 1)),
                );
                return sim_res;
            }
        }
        // The snapshot a result carries reflects the prepared grains.
        sim_res.motor = motor.clone();

        let grain_count = motor.grains.len();
        let mut per_grain_reg = vec![0.0; grain_count];

        // At t = 0 the motor has ignited.
        sim_res.channels.time.push(0.0);
        sim_res.channels.kn.push(motor.kn(&per_grain_reg, 0.0));
        sim_res
            .channels
            .pressure
            .push(motor.ideal_pressure(&per_grain_reg, 0.0, None));
        sim_res.channels.force.push(0.0);
        sim_res.channels.mass.push(
            motor
                .grains
                .iter()
                .map(|grain| grain.volume_at_regression(0.0) * density)
                .collect(),
        );
        sim_res
            .channels
            .volume_loading
            .push(100.0 * (1.0 - motor.free_volume(&per_grain_reg) / motor_volume));
        sim_res.channels.mass_flow.push(vec![0.0; grain_count]);
        sim_res.channels.mass_flux.push(vec![0.0; grain_count]);
        sim_res.channels.regression.push(vec![0.0; grain_count]);
        sim_res.channels.web.push(
            motor
                .grains
                .iter()
                .map(|grain| grain.web_remaining(0.0))
                .collect(),
        );
        sim_res.channels.exit_pressure.push(0.0);
        sim_res.channels.d_throat.push(0.0);
        sim_res.channels.mach_number.push(vec![0.0; grain_count]);

        // Check the initial port/throat ratio.
        if let Some(aft_port) = motor.grains.last().and_then(|grain| grain.port_area(0.0)) {
            let min_allowed = motor.config.min_port_throat;
            let ratio = aft_port / circle_area(motor.nozzle.throat_m);
            if ratio < min_allowed {
                sim_res.add_alert(SimAlert::new(
                    SimAlertLevel::Warning,
                    SimAlertType::Constraint,
                    format!(
                        "Initial port/throat ratio of {ratio:.3} was less than {min_allowed:.3}"
                    ),
                ));
            }
        }

        let initial_webs: Vec<f64> = motor
            .grains
            .iter()
            .map(|grain| grain.web_remaining(0.0))
            .collect();

        // Perform timesteps.
        while sim_res.should_continue(burnout_thrust_thres) {
            let propellant = motor.propellant.as_ref().expect("propellant present");

            // Regress each grain from the previous step's pressure, walking
            // head to aft and accumulating the mass flow between grains.
            let mut mass_flow = 0.0;
            let mut per_grain_mass = vec![0.0; grain_count];
            let mut per_grain_mass_flow = vec![0.0; grain_count];
            let mut per_grain_mass_flux = vec![0.0; grain_count];
            let mut per_grain_web = vec![0.0; grain_count];
            for (gid, grain) in motor.grains.iter().enumerate() {
                if grain.web_remaining(per_grain_reg[gid]) > burnout_web_thres {
                    // Regression at the current pressure.
                    let reg = dt * propellant.burn_rate(sim_res.channels.pressure.last());
                    // Mass flux through this grain, fed by everything above.
                    per_grain_mass_flux[gid] =
                        grain.peak_mass_flux(mass_flow, dt, per_grain_reg[gid], reg, density);
                    // Mass after this step's regression.
                    per_grain_mass[gid] =
                        grain.volume_at_regression(per_grain_reg[gid]) * density;
                    // The change in grain mass adds to the mass flow.
                    mass_flow +=
                        (sim_res.channels.mass.last()[gid] - per_grain_mass[gid]) / dt;
                    // Apply the regression.
                    per_grain_reg[gid] += reg;
                    per_grain_web[gid] = grain.web_remaining(per_grain_reg[gid]);
                }
                per_grain_mass_flow[gid] = mass_flow;
            }
            sim_res.channels.regression.push(per_grain_reg.clone());
            sim_res.channels.web.push(per_grain_web);
            sim_res
                .channels
                .volume_loading
                .push(100.0 * (1.0 - motor.free_volume(&per_grain_reg) / motor_volume));
            sim_res.channels.mass.push(per_grain_mass);
            sim_res.channels.mass_flow.push(per_grain_mass_flow);
            sim_res.channels.mass_flux.push(per_grain_mass_flux.clone());

            // Kn and pressure from the current regression state.
            let d_throat = sim_res.channels.d_throat.last();
            sim_res
                .channels
                .kn
                .push(motor.kn(&per_grain_reg, d_throat));
            let last_kn = sim_res.channels.kn.last();
            let pressure = motor.ideal_pressure(&per_grain_reg, d_throat, Some(last_kn));
            sim_res.channels.pressure.push(pressure);

            // Core Mach number per grain.
            let per_grain_mach: Vec<f64> = per_grain_mass_flux
                .iter()
                .map(|flux| motor.mach_number(pressure, *flux))
                .collect();
            sim_res.channels.mach_number.push(per_grain_mach);

            // Exit pressure, then thrust.
            let exit_pressure = match propellant.combustion_properties(pressure) {
                Some(props) => motor.nozzle.exit_pressure(props.k, pressure),
                None => 0.0,
            };
            sim_res.channels.exit_pressure.push(exit_pressure);

            let force = motor.thrust(
                sim_res.channels.pressure.last(),
                d_throat,
                Some(exit_pressure),
            );
            sim_res.channels.force.push(force);

            sim_res
                .channels
                .time
                .push(sim_res.channels.time.last() + dt);

            // Slag deposition and erosion of the throat.
            sim_res
                .channels
                .d_throat
                .push(d_throat + motor.nozzle.throat_drift(pressure, dt));

            // Progress tracks the grain with the largest share of web left.
            let web_fraction = motor
                .grains
                .iter()
                .zip(per_grain_reg.iter())
                .zip(initial_webs.iter())
                .map(|((grain, reg), initial)| {
                    if *initial > 0.0 {
                        grain.web_remaining(*reg) / initial
                    } else {
                        0.0
                    }
                })
                .fold(0.0, f64::max);
            if progress(1.0 - web_fraction) {
                // Cancelled: hand back the partial, non-success result.
                return sim_res;
            }
        }

        sim_res.success = true;

        if sim_res.peak_mass_flux() > motor.config.max_mass_flux {
            sim_res.add_alert(
                SimAlert::new(
                    SimAlertLevel::Warning,
                    SimAlertType::Constraint,
                    "Peak mass flux exceeded configured limit",
                )
                .at("Motor"),
            );
        }
        if sim_res.max_pressure() > motor.config.max_pressure_pa {
            sim_res.add_alert(
                SimAlert::new(
                    SimAlertLevel::Warning,
                    SimAlertType::Constraint,
                    "Max pressure exceeded configured limit",
                )
                .at("Motor"),
            );
        }
        if sim_res.peak_mach_number() > motor.config.max_mach_number {
            sim_res.add_alert(
                SimAlert::new(
                    SimAlertLevel::Warning,
                    SimAlertType::Constraint,
                    "Max core Mach number exceeded configured limit",
                )
                .at("Motor"),
            );
        }
        let separation_fraction = SimulationResult::percent_below_threshold(
            sim_res.channels.exit_pressure.data(),
            motor.config.amb_pressure_pa * motor.config.sep_pressure_ratio,
        );
        if separation_fraction > motor.config.flow_separation_warn_percent {
            sim_res.add_alert(
                SimAlert::new(
                    SimAlertLevel::Warning,
                    SimAlertType::Value,
                    "Low exit pressure, nozzle flow may separate",
                )
                .at("Nozzle"),
            );
        }
        if sim_res.average_force() < burnout_thrust_thres {
            sim_res.add_alert(
                SimAlert::new(
                    SimAlertLevel::Error,
                    SimAlertType::Value,
                    "Motor did not generate thrust. Check chamber pressure and expansion ratio.",
                )
                .at("Motor"),
            );
        }

        // Report only the first datapoint with a pressure outside the
        // propellant's tabs to avoid repeating the alert every step.
        if let Some(propellant) = &motor.propellant {
            let pressures: Vec<f64> = sim_res.channels.pressure.data().to_vec();
            for pressure in pressures {
                if pressure > 0.0 {
                    let mut errors = propellant.pressure_errors(pressure);
                    if !errors.is_empty() {
                        sim_res.add_alert(errors.remove(0));
                        break;
                    }
                }
            }
        }

        sim_res
    }

    /// Computes static (t = 0) metrics without running the timestep loop.
    /// Geometry errors or an empty motor produce zeroed results.
    pub fn quick_results(&self) -> QuickResults {
        let mut results = QuickResults::default();

        let mut motor = self.clone();
        let density = motor.propellant.as_ref().map(|p| p.density_kg_m3);
        let throat_area = motor.nozzle.throat_area(0.0);
        let motor_volume = motor.total_volume();

        if motor_volume == 0.0 {
            return results;
        }

        let map_dim = motor.config.map_dim;
        for grain in motor.grains.iter_mut() {
            if grain
                .geometry_errors()
                .iter()
                .any(|alert| alert.level == SimAlertLevel::Error)
            {
                return results;
            }
            if grain.simulation_setup(map_dim).is_err() {
                return results;
            }
        }

        let per_grain_reg = vec![0.0; motor.grains.len()];
        results.volume_loading =
            100.0 * (1.0 - motor.free_volume(&per_grain_reg) / motor_volume);
        if throat_area != 0.0 {
            results.initial_kn = motor.kn(&per_grain_reg, 0.0);
            results.port_ratio = motor
                .grains
                .last()
                .and_then(|grain| grain.port_area(0.0))
                .map(|aft_port| aft_port / circle_area(motor.nozzle.throat_m));
        }
        if let Some(density) = density {
            results.propellant_mass_kg = motor
                .grains
                .iter()
                .map(|grain| grain.volume_at_regression(0.0) * density)
                .sum();
        }
        results.length_m = motor.grains.iter().map(|grain| grain.length()).sum();

        results
    }
}
