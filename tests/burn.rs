use approx::assert_relative_eq;

use srm_ballistics::config::SimConfig;
use srm_ballistics::core::alerts::SimAlertLevel;
use srm_ballistics::grain::{BatesGrain, EndBurnerGrain, Grain, InhibitedEnds};
use srm_ballistics::nozzle::Nozzle;
use srm_ballistics::propellant::{BurnRateTab, Propellant};
use srm_ballistics::sim::Motor;

fn cherry_limeade() -> Propellant {
    Propellant {
        name: "MIT - Cherry Limeade".to_string(),
        density_kg_m3: 1670.0,
        tabs: vec![BurnRateTab {
            min_pressure_pa: 0.0,
            max_pressure_pa: 6.895e6,
            a: 3.517054143255937e-5,
            n: 0.3273,
            k: 1.21,
            t: 2800.0,
            m: 23.67,
        }],
    }
}

fn bates_motor() -> Motor {
    Motor {
        grains: vec![Grain::Bates(BatesGrain {
            diameter_m: 0.083,
            length_m: 0.12,
            core_diameter_m: 0.03,
            inhibited_ends: InhibitedEnds::Both,
        })],
        nozzle: Nozzle {
            throat_m: 0.0102,
            exit_m: 0.0306,
            efficiency: 0.9,
            div_angle_deg: 15.0,
            conv_angle_deg: 45.0,
            throat_length_m: 0.005,
            slag_coeff: 0.0,
            erosion_coeff: 0.0,
        },
        propellant: Some(cherry_limeade()),
        config: SimConfig::default(),
    }
}

#[test]
fn bates_burn_runs_to_completion() {
    let motor = bates_motor();
    let result = motor.run_simulation();

    assert!(result.success);
    assert!(result.alerts_by_level(SimAlertLevel::Error).is_empty());
    assert!(result.channels.time.len() > 10);
    assert!(result.burn_time() > 1.0);
    assert!(result.impulse(None) > 0.0);
    assert!(result.isp(None) > 50.0);
}

#[test]
fn bates_channels_start_steady_and_grow_progressively() {
    let motor = bates_motor();
    let result = motor.run_simulation();
    assert!(result.success);

    let kn = result.channels.kn.data();
    let pressure = result.channels.pressure.data();
    let samples = kn.len();

    // The burn opens at a steady baseline: the first simulated step sits
    // within a couple percent of the ignition value.
    assert_relative_eq!(kn[1], kn[0], max_relative = 0.02);
    assert_relative_eq!(pressure[1], pressure[0], max_relative = 0.05);

    // An inhibited cylindrical core burns progressively: kn and pressure
    // climb monotonically as the core diameter grows toward the wall. The
    // final sample drops to zero when the web is consumed.
    for i in 1..samples - 2 {
        assert!(kn[i + 1] >= kn[i] - 1e-9, "kn dipped at step {i}");
        assert!(
            pressure[i + 1] >= pressure[i] - 1e-6,
            "pressure dipped at step {i}"
        );
    }
    assert_eq!(kn[samples - 1], 0.0);
}

#[test]
fn regression_is_monotone_and_web_depletes() {
    let motor = bates_motor();
    let result = motor.run_simulation();
    assert!(result.success);

    let regression = result.channels.regression.data();
    let web = result.channels.web.data();
    for i in 0..regression.len() - 1 {
        assert!(regression[i + 1][0] >= regression[i][0]);
        assert!(web[i + 1][0] <= web[i][0] + 1e-12);
    }
    // The grain burned out: the final web reading is below the threshold.
    let final_web = web.last().unwrap()[0];
    assert!(final_web < motor.config.burnout_web_thres_m);
}

#[test]
fn burned_out_grains_stop_contributing_surface() {
    let motor = bates_motor();
    let result = motor.run_simulation();
    assert!(result.success);

    // After burnout the burning area, and with it Kn, is gone.
    let kn = result.channels.kn.data();
    assert_eq!(*kn.last().unwrap(), 0.0);
    // And the thrust decays to (essentially) nothing.
    let force = result.channels.force.data();
    assert!(*force.last().unwrap() <= 0.001 * result.channels.force.max());
}

#[test]
fn end_burner_holds_a_neutral_profile() {
    let motor = Motor {
        grains: vec![Grain::EndBurner(EndBurnerGrain {
            diameter_m: 0.05,
            length_m: 0.03,
        })],
        nozzle: Nozzle {
            throat_m: 0.006,
            exit_m: 0.012,
            efficiency: 0.9,
            div_angle_deg: 15.0,
            conv_angle_deg: 45.0,
            throat_length_m: 0.004,
            slag_coeff: 0.0,
            erosion_coeff: 0.0,
        },
        propellant: Some(cherry_limeade()),
        config: SimConfig::default(),
    };
    let result = motor.run_simulation();
    assert!(result.success);
    assert!(result.alerts_by_level(SimAlertLevel::Error).is_empty());

    // The burning face never changes, so Kn and pressure hold flat until
    // the web runs out.
    let kn = result.channels.kn.data();
    let baseline = kn[0];
    for value in &kn[..kn.len() - 1] {
        assert_relative_eq!(*value, baseline, max_relative = 1e-9);
    }
    assert_eq!(*kn.last().unwrap(), 0.0);

    // An end burner reports no port.
    assert!(result.port_ratio().is_none());
}

#[test]
fn stacked_grains_accumulate_mass_flow_aft() {
    let mut motor = bates_motor();
    motor.grains.push(Grain::Bates(BatesGrain {
        diameter_m: 0.083,
        length_m: 0.12,
        core_diameter_m: 0.03,
        inhibited_ends: InhibitedEnds::Both,
    }));
    let result = motor.run_simulation();
    assert!(result.success);

    // Mid-burn, the aft grain passes more flow than the head grain.
    let mid = result.channels.mass_flow.data().len() / 2;
    let frame = result.channels.mass_flow.point(mid);
    assert!(frame[1] > frame[0]);
    assert!(frame[0] > 0.0);

    // And the aft grain sees the higher flux.
    assert_eq!(result.peak_mass_flux_location(), Some(1));
}

#[test]
fn erosion_opens_the_throat_over_the_burn() {
    let mut motor = bates_motor();
    motor.nozzle.erosion_coeff = 1e-12;
    let result = motor.run_simulation();
    assert!(result.success);

    let d_throat = result.channels.d_throat.data();
    assert_eq!(d_throat[0], 0.0);
    assert!(*d_throat.last().unwrap() > 0.0);
    // Accumulated drift stays tiny against the throat itself.
    assert!(*d_throat.last().unwrap() < 0.1 * motor.nozzle.throat_m);
}
