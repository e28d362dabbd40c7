use assert_cmd::Command;
use predicates::prelude::*;

const SAMPLE_MOTOR: &str = "
version: 1
nozzle:
  throat_m: 0.0102
  exit_m: 0.0306
  efficiency: 0.9
  div_angle_deg: 15.0
propellant:
  name: MIT - Cherry Limeade
  density_kg_m3: 1670.0
  tabs:
    - min_pressure_pa: 0.0
      max_pressure_pa: 6895000.0
      a: 3.517054143255937e-5
      n: 0.3273
      k: 1.21
      t: 2800.0
      m: 23.67
grains:
  - type: bates
    diameter_m: 0.083
    length_m: 0.12
    core_diameter_m: 0.03
    inhibited_ends: both
";

fn write_motor(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("motor.yaml");
    std::fs::write(&path, SAMPLE_MOTOR).unwrap();
    path
}

#[test]
fn run_prints_the_burn_summary() {
    let dir = tempfile::tempdir().unwrap();
    let motor = write_motor(&dir);

    Command::cargo_bin("srm")
        .unwrap()
        .args(["run", "--quiet"])
        .arg(&motor)
        .assert()
        .success()
        .stdout(predicate::str::contains("Designation:"))
        .stdout(predicate::str::contains("Burn time:"))
        .stdout(predicate::str::contains("Initial Kn:"));
}

#[test]
fn run_writes_csv_and_summary_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let motor = write_motor(&dir);
    let csv_path = dir.path().join("channels.csv");
    let summary_path = dir.path().join("summary.json");

    Command::cargo_bin("srm")
        .unwrap()
        .args(["run", "--quiet"])
        .arg(&motor)
        .arg("--csv")
        .arg(&csv_path)
        .arg("--summary")
        .arg(&summary_path)
        .assert()
        .success();

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let header = csv.lines().next().unwrap();
    assert!(header.contains("Time(s)"));
    assert!(header.contains("Chamber Pressure(Pa)"));
    assert!(header.contains("Mass Flux(G1;kg/(m^2*s))"));
    assert!(csv.lines().count() > 10);

    let summary = std::fs::read_to_string(&summary_path).unwrap();
    assert!(summary.contains("\"success\": true"));
    assert!(summary.contains("\"impulse_ns\""));
}

#[test]
fn run_fails_on_invalid_motors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("motor.yaml");
    let broken = SAMPLE_MOTOR.replace("core_diameter_m: 0.03", "core_diameter_m: 0.09");
    std::fs::write(&path, broken).unwrap();

    Command::cargo_bin("srm")
        .unwrap()
        .args(["run", "--quiet"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Core diameter"));
}

#[test]
fn check_reports_static_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let motor = write_motor(&dir);

    Command::cargo_bin("srm")
        .unwrap()
        .arg("check")
        .arg(&motor)
        .assert()
        .success()
        .stdout(predicate::str::contains("Volume loading:"))
        .stdout(predicate::str::contains("Port/throat ratio:"));
}

#[test]
fn check_fails_without_a_propellant() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("motor.yaml");
    let no_propellant = SAMPLE_MOTOR.replace(
        "propellant:
  name: MIT - Cherry Limeade
  density_kg_m3: 1670.0
  tabs:
    - min_pressure_pa: 0.0
      max_pressure_pa: 6895000.0
      a: 3.517054143255937e-5
      n: 0.3273
      k: 1.21
      t: 2800.0
      m: 23.67",
        "propellant: null",
    );
    std::fs::write(&path, no_propellant).unwrap();

    Command::cargo_bin("srm")
        .unwrap()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No propellant set"));
}
