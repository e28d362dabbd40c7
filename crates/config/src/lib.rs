//! Motor file schema and loaders.
//!
//! The nested record mirrors the runtime model: one nozzle, an optional
//! propellant, an ordered list of grains tagged by type, and the simulation
//! limits. Files load from YAML or TOML (sniffed by extension) and save as
//! YAML. The envelope carries a schema version; files from a newer version
//! are refused, and migrating older ones is a concern for external tooling,
//! not this crate.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current motor file schema version.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NozzleConfig {
    pub throat_m: f64,
    pub exit_m: f64,
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
    #[serde(default)]
    pub div_angle_deg: f64,
    #[serde(default)]
    pub conv_angle_deg: f64,
    #[serde(default)]
    pub throat_length_m: f64,
    #[serde(default)]
    pub slag_coeff: f64,
    #[serde(default)]
    pub erosion_coeff: f64,
}

fn default_efficiency() -> f64 {
    1.0
}

/// Propellant record: name, density, and the pressure-banded burn-rate tabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropellantConfig {
    pub name: String,
    pub density_kg_m3: f64,
    pub tabs: Vec<BurnRateTabConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnRateTabConfig {
    pub min_pressure_pa: f64,
    pub max_pressure_pa: f64,
    pub a: f64,
    pub n: f64,
    pub k: f64,
    pub t: f64,
    pub m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InhibitedEndsConfig {
    Neither,
    Top,
    Bottom,
    #[default]
    Both,
}

/// Grain record, tagged by cross-section type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GrainConfig {
    Bates {
        diameter_m: f64,
        length_m: f64,
        core_diameter_m: f64,
        #[serde(default)]
        inhibited_ends: InhibitedEndsConfig,
    },
    Conical {
        diameter_m: f64,
        length_m: f64,
        forward_core_diameter_m: f64,
        aft_core_diameter_m: f64,
        #[serde(default)]
        inhibited_ends: InhibitedEndsConfig,
    },
    EndBurner {
        diameter_m: f64,
        length_m: f64,
    },
    RodTube {
        diameter_m: f64,
        length_m: f64,
        core_diameter_m: f64,
        rod_diameter_m: f64,
        #[serde(default)]
        support_diameter_m: f64,
        #[serde(default)]
        inhibited_ends: InhibitedEndsConfig,
    },
    Finocyl {
        diameter_m: f64,
        length_m: f64,
        core_diameter_m: f64,
        fin_count: u32,
        fin_width_m: f64,
        fin_length_m: f64,
        #[serde(default)]
        inhibited_ends: InhibitedEndsConfig,
    },
    Custom {
        diameter_m: f64,
        length_m: f64,
        core_polygons: Vec<Vec<[f64; 2]>>,
        #[serde(default)]
        inhibited_ends: InhibitedEndsConfig,
    },
}

/// Simulation limits and parameters. Defaults follow the stock preferences
/// of the reference tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub max_pressure_pa: f64,
    pub max_mass_flux: f64,
    pub max_mach_number: f64,
    pub min_port_throat: f64,
    pub flow_separation_warn_percent: f64,
    pub burnout_web_thres_m: f64,
    pub burnout_thrust_thres_pct: f64,
    pub timestep_s: f64,
    pub amb_pressure_pa: f64,
    pub map_dim: usize,
    pub sep_pressure_ratio: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_pressure_pa: 1500.0 * 6895.0,
            max_mass_flux: 2.0 / 0.001422,
            max_mach_number: 1.0,
            min_port_throat: 2.0,
            flow_separation_warn_percent: 0.05,
            burnout_web_thres_m: 0.001 / 39.37,
            burnout_thrust_thres_pct: 0.1,
            timestep_s: 0.03,
            amb_pressure_pa: 101325.0,
            map_dim: 750,
            // Summerfield criterion.
            sep_pressure_ratio: 0.4,
        }
    }
}

/// The complete motor file record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorFileConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    pub nozzle: NozzleConfig,
    pub propellant: Option<PropellantConfig>,
    pub grains: Vec<GrainConfig>,
    #[serde(default)]
    pub config: SimConfig,
}

fn default_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read motor file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to write TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("motor file is from schema version {found}, this build supports up to {supported}")]
    FutureVersion { found: u32, supported: u32 },
}

/// Loads a motor record from a YAML or TOML file, sniffing by extension.
pub fn load_motor<P: AsRef<Path>>(path: P) -> Result<MotorFileConfig, ConfigError> {
    let path = path.as_ref();
    let record: MotorFileConfig = if path
        .extension()
        .map(|ext| ext == "toml")
        .unwrap_or(false)
    {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)?
    } else {
        let reader = File::open(path)?;
        serde_yaml::from_reader(reader)?
    };
    if record.version > SCHEMA_VERSION {
        return Err(ConfigError::FutureVersion {
            found: record.version,
            supported: SCHEMA_VERSION,
        });
    }
    Ok(record)
}

/// Saves a motor record as YAML.
pub fn save_motor<P: AsRef<Path>>(path: P, record: &MotorFileConfig) -> Result<(), ConfigError> {
    let file = File::create(path)?;
    serde_yaml::to_writer(file, record)?;
    Ok(())
}

/// Stock propellant catalog carried for convenience, matching the reference
/// tool's library.
pub fn stock_propellants() -> Vec<PropellantConfig> {
    let single_tab = |name: &str, density: f64, max_pressure: f64, a, n, k, t, m| {
        PropellantConfig {
            name: name.to_string(),
            density_kg_m3: density,
            tabs: vec![BurnRateTabConfig {
                min_pressure_pa: 0.0,
                max_pressure_pa: max_pressure,
                a,
                n,
                k,
                t,
                m,
            }],
        }
    };

    let nakka = |name: &str, density: f64, bands: &[(f64, f64, f64, f64)], k: f64, t: f64, m: f64| {
        PropellantConfig {
            name: name.to_string(),
            density_kg_m3: density,
            tabs: bands
                .iter()
                .map(|(min_pressure, max_pressure, a, n)| BurnRateTabConfig {
                    min_pressure_pa: *min_pressure,
                    max_pressure_pa: *max_pressure,
                    a: *a,
                    n: *n,
                    k,
                    t,
                    m,
                })
                .collect(),
        }
    };

    vec![
        single_tab(
            "MIT - Cherry Limeade",
            1670.0,
            6.895e6,
            3.517054143255937e-5,
            0.3273,
            1.21,
            2800.0,
            23.67,
        ),
        single_tab(
            "MIT - Ocean Water",
            1650.0,
            6.895e6,
            1.467e-5,
            0.382,
            1.25,
            2600.0,
            23.67,
        ),
        nakka(
            "Nakka - KNDX",
            1785.0,
            &[
                (103425.0, 779135.0, 1.7096289148678155e-6, 0.619),
                (779135.0, 2571835.0, 0.008553459092346196, -0.009),
                (2571835.0, 5929700.0, 2.90330733578913e-7, 0.688),
                (5929700.0, 8501535.0, 0.1330457207587796, -0.148),
                (8501535.0, 11204375.0, 1.0537671694797537e-5, 0.444),
            ],
            1.1308,
            1625.0,
            42.39,
        ),
        nakka(
            "Nakka - KNSB",
            1750.0,
            &[
                (103425.0, 806715.0, 1.9253259619746373e-6, 0.625),
                (806715.0, 1503110.0, 0.6656608561590813, -0.313),
                (1503110.0, 3792250.0, 0.009528121181782798, -0.0145),
                (3792250.0, 7032900.0, 2.709667768835332e-6, 0.5245),
                (7032900.0, 10673460.0, 0.00417677261069904, 0.059),
            ],
            1.1361,
            1520.0,
            39.9,
        ),
        single_tab(
            "Nakka - KNSU",
            1800.0,
            10342500.0,
            0.00010073115141607291,
            0.319,
            1.133,
            1720.0,
            41.98,
        ),
        single_tab(
            "RCS - White Lightning",
            1820.230130676801,
            10342500.0,
            5.710516747228669e-6,
            0.45,
            1.243,
            2339.0,
            27.125,
        ),
        single_tab(
            "RCS - Blue Thunder",
            1625.0868456817973,
            10342500.0,
            6.994600946367753e-5,
            0.321,
            1.235,
            2616.5,
            22.959,
        ),
    ]
}

/// Looks up a stock propellant by name (case-insensitive).
pub fn stock_propellant(name: &str) -> Option<PropellantConfig> {
    stock_propellants()
        .into_iter()
        .find(|prop| prop.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> MotorFileConfig {
        MotorFileConfig {
            version: SCHEMA_VERSION,
            nozzle: NozzleConfig {
                throat_m: 0.0102,
                exit_m: 0.0306,
                efficiency: 0.9,
                div_angle_deg: 15.0,
                conv_angle_deg: 45.0,
                throat_length_m: 0.005,
                slag_coeff: 0.0,
                erosion_coeff: 0.0,
            },
            propellant: stock_propellant("MIT - Cherry Limeade"),
            grains: vec![GrainConfig::Bates {
                diameter_m: 0.083,
                length_m: 0.12,
                core_diameter_m: 0.03,
                inhibited_ends: InhibitedEndsConfig::Both,
            }],
            config: SimConfig::default(),
        }
    }

    #[test]
    fn yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("motor.yaml");
        let record = sample_record();
        save_motor(&path, &record).unwrap();
        let loaded = load_motor(&path).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn toml_files_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("motor.toml");
        let record = sample_record();
        let text = toml::to_string(&record).unwrap();
        std::fs::write(&path, text).unwrap();
        let loaded = load_motor(&path).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn future_versions_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("motor.yaml");
        let mut record = sample_record();
        record.version = SCHEMA_VERSION + 1;
        save_motor(&path, &record).unwrap();
        assert!(matches!(
            load_motor(&path),
            Err(ConfigError::FutureVersion { .. })
        ));
    }

    #[test]
    fn grain_tags_deserialize() {
        let yaml = "
version: 1
nozzle:
  throat_m: 0.01
  exit_m: 0.03
propellant: null
grains:
  - type: end_burner
    diameter_m: 0.05
    length_m: 0.2
  - type: finocyl
    diameter_m: 0.083
    length_m: 0.12
    core_diameter_m: 0.02
    fin_count: 6
    fin_width_m: 0.004
    fin_length_m: 0.02
    inhibited_ends: neither
";
        let record: MotorFileConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(record.grains.len(), 2);
        assert!(matches!(record.grains[0], GrainConfig::EndBurner { .. }));
        assert!(matches!(
            record.grains[1],
            GrainConfig::Finocyl { fin_count: 6, .. }
        ));
    }

    #[test]
    fn stock_catalog_contains_reference_propellants() {
        let catalog = stock_propellants();
        assert_eq!(catalog.len(), 7);
        let kndx = stock_propellant("nakka - kndx").unwrap();
        assert_eq!(kndx.tabs.len(), 5);
        assert!(stock_propellant("unobtanium").is_none());
    }
}
