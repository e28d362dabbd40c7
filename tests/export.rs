use srm_ballistics::config::SimConfig;
use srm_ballistics::export::{CsvOptions, MetricSummary, write_channels_csv};
use srm_ballistics::grain::{BatesGrain, Grain, InhibitedEnds};
use srm_ballistics::nozzle::Nozzle;
use srm_ballistics::propellant::{BurnRateTab, Propellant};
use srm_ballistics::sim::Motor;

fn test_motor() -> Motor {
    Motor {
        grains: vec![
            Grain::Bates(BatesGrain {
                diameter_m: 0.083,
                length_m: 0.12,
                core_diameter_m: 0.03,
                inhibited_ends: InhibitedEnds::Both,
            }),
            Grain::Bates(BatesGrain {
                diameter_m: 0.083,
                length_m: 0.1,
                core_diameter_m: 0.03,
                inhibited_ends: InhibitedEnds::Both,
            }),
        ],
        nozzle: Nozzle {
            throat_m: 0.0125,
            exit_m: 0.0375,
            efficiency: 0.9,
            div_angle_deg: 15.0,
            conv_angle_deg: 45.0,
            throat_length_m: 0.005,
            slag_coeff: 0.0,
            erosion_coeff: 0.0,
        },
        propellant: Some(Propellant {
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
        }),
        config: SimConfig::default(),
    }
}

#[test]
fn csv_expands_grain_channels_into_columns() {
    let result = test_motor().run_simulation();
    assert!(result.success);

    let mut buffer = Vec::new();
    write_channels_csv(&mut buffer, &result, &CsvOptions::default()).unwrap();
    let csv = String::from_utf8(buffer).unwrap();

    let header = csv.lines().next().unwrap();
    assert!(header.contains("Time(s)"));
    assert!(header.contains("Kn"));
    assert!(header.contains("Propellant Mass(G1;kg)"));
    assert!(header.contains("Propellant Mass(G2;kg)"));
    assert!(header.contains("Web(G2;m)"));

    // One row per timestep plus the header.
    assert_eq!(csv.lines().count(), result.channels.time.len() + 1);
    // Every row has the same number of fields.
    let columns = header.split(',').count();
    for line in csv.lines().skip(1) {
        assert_eq!(line.split(',').count(), columns);
    }
}

#[test]
fn csv_honors_unit_conversions_and_exclusions() {
    let result = test_motor().run_simulation();

    let mut options = CsvOptions::default();
    options
        .display_units
        .push(("Pa".to_string(), "psi".to_string()));
    options.exclude_channels.insert("Core Mach Number".to_string());
    options.exclude_grains.insert(0);

    let mut buffer = Vec::new();
    write_channels_csv(&mut buffer, &result, &options).unwrap();
    let csv = String::from_utf8(buffer).unwrap();
    let header = csv.lines().next().unwrap();

    assert!(header.contains("Chamber Pressure(psi)"));
    assert!(!header.contains("Core Mach Number"));
    assert!(!header.contains("(G1"));
    assert!(header.contains("(G2"));
}

#[test]
fn summary_captures_the_derived_metrics() {
    let result = test_motor().run_simulation();
    let summary = MetricSummary::from_result(&result);

    assert!(summary.success);
    assert!(summary.impulse_ns > 0.0);
    assert!(summary.isp_s > 50.0);
    assert!((summary.propellant_length_m - 0.22).abs() < 1e-12);
    assert!(summary.port_ratio.unwrap() > 1.0);
    assert!(!summary.designation.is_empty());
    let json = serde_json::to_string(&summary).unwrap();
    assert!(json.contains("\"burn_time_s\""));
}
