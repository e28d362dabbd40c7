//! Conversions between the motor file schema and the runtime model.
//!
//! A motor built from a config record and serialized back must reproduce
//! identical simulation output, so these mappings are strictly structural.

use srm_config::{
    BurnRateTabConfig, GrainConfig, InhibitedEndsConfig, MotorFileConfig, NozzleConfig,
    PropellantConfig, SCHEMA_VERSION,
};
use srm_grain::{
    BatesGrain, ConicalGrain, CustomGrain, EndBurnerGrain, FinocylGrain, Grain, GrainGeometry,
    InhibitedEnds, RodTubeGrain,
};
use srm_nozzle::Nozzle;
use srm_propellant::{BurnRateTab, Propellant};

use crate::motor::Motor;

fn inhibited_from_config(config: InhibitedEndsConfig) -> InhibitedEnds {
    match config {
        InhibitedEndsConfig::Neither => InhibitedEnds::Neither,
        InhibitedEndsConfig::Top => InhibitedEnds::Top,
        InhibitedEndsConfig::Bottom => InhibitedEnds::Bottom,
        InhibitedEndsConfig::Both => InhibitedEnds::Both,
    }
}

fn inhibited_to_config(ends: InhibitedEnds) -> InhibitedEndsConfig {
    match ends {
        InhibitedEnds::Neither => InhibitedEndsConfig::Neither,
        InhibitedEnds::Top => InhibitedEndsConfig::Top,
        InhibitedEnds::Bottom => InhibitedEndsConfig::Bottom,
        InhibitedEnds::Both => InhibitedEndsConfig::Both,
    }
}

fn grain_from_config(config: &GrainConfig) -> Grain {
    match config {
        GrainConfig::Bates {
            diameter_m,
            length_m,
            core_diameter_m,
            inhibited_ends,
        } => Grain::Bates(BatesGrain {
            diameter_m: *diameter_m,
            length_m: *length_m,
            core_diameter_m: *core_diameter_m,
            inhibited_ends: inhibited_from_config(*inhibited_ends),
        }),
        GrainConfig::Conical {
            diameter_m,
            length_m,
            forward_core_diameter_m,
            aft_core_diameter_m,
            inhibited_ends,
        } => Grain::Conical(ConicalGrain {
            diameter_m: *diameter_m,
            length_m: *length_m,
            forward_core_diameter_m: *forward_core_diameter_m,
            aft_core_diameter_m: *aft_core_diameter_m,
            inhibited_ends: inhibited_from_config(*inhibited_ends),
        }),
        GrainConfig::EndBurner {
            diameter_m,
            length_m,
        } => Grain::EndBurner(EndBurnerGrain {
            diameter_m: *diameter_m,
            length_m: *length_m,
        }),
        GrainConfig::RodTube {
            diameter_m,
            length_m,
            core_diameter_m,
            rod_diameter_m,
            support_diameter_m,
            inhibited_ends,
        } => Grain::RodTube(RodTubeGrain {
            diameter_m: *diameter_m,
            length_m: *length_m,
            core_diameter_m: *core_diameter_m,
            rod_diameter_m: *rod_diameter_m,
            support_diameter_m: *support_diameter_m,
            inhibited_ends: inhibited_from_config(*inhibited_ends),
        }),
        GrainConfig::Finocyl {
            diameter_m,
            length_m,
            core_diameter_m,
            fin_count,
            fin_width_m,
            fin_length_m,
            inhibited_ends,
        } => Grain::Finocyl(FinocylGrain::new(
            *diameter_m,
            *length_m,
            *core_diameter_m,
            *fin_count,
            *fin_width_m,
            *fin_length_m,
            inhibited_from_config(*inhibited_ends),
        )),
        GrainConfig::Custom {
            diameter_m,
            length_m,
            core_polygons,
            inhibited_ends,
        } => Grain::Custom(CustomGrain::new(
            *diameter_m,
            *length_m,
            core_polygons.clone(),
            inhibited_from_config(*inhibited_ends),
        )),
    }
}

fn grain_to_config(grain: &Grain) -> GrainConfig {
    match grain {
        Grain::Bates(g) => GrainConfig::Bates {
            diameter_m: g.diameter_m,
            length_m: g.length_m,
            core_diameter_m: g.core_diameter_m,
            inhibited_ends: inhibited_to_config(g.inhibited_ends),
        },
        Grain::Conical(g) => GrainConfig::Conical {
            diameter_m: g.diameter_m,
            length_m: g.length_m,
            forward_core_diameter_m: g.forward_core_diameter_m,
            aft_core_diameter_m: g.aft_core_diameter_m,
            inhibited_ends: inhibited_to_config(g.inhibited_ends),
        },
        Grain::EndBurner(g) => GrainConfig::EndBurner {
            diameter_m: g.diameter_m,
            length_m: g.length_m,
        },
        Grain::RodTube(g) => GrainConfig::RodTube {
            diameter_m: g.diameter_m,
            length_m: g.length_m,
            core_diameter_m: g.core_diameter_m,
            rod_diameter_m: g.rod_diameter_m,
            support_diameter_m: g.support_diameter_m,
            inhibited_ends: inhibited_to_config(g.inhibited_ends),
        },
        Grain::Finocyl(g) => GrainConfig::Finocyl {
            diameter_m: g.diameter_m,
            length_m: g.length_m,
            core_diameter_m: g.core_diameter_m,
            fin_count: g.fin_count,
            fin_width_m: g.fin_width_m,
            fin_length_m: g.fin_length_m,
            inhibited_ends: inhibited_to_config(g.inhibited_ends),
        },
        Grain::Custom(g) => GrainConfig::Custom {
            diameter_m: g.diameter_m,
            length_m: g.length_m,
            core_polygons: g.core_polygons.clone(),
            inhibited_ends: inhibited_to_config(g.inhibited_ends),
        },
    }
}

fn propellant_from_config(config: &PropellantConfig) -> Propellant {
    Propellant {
        name: config.name.clone(),
        density_kg_m3: config.density_kg_m3,
        tabs: config
            .tabs
            .iter()
            .map(|tab| BurnRateTab {
                min_pressure_pa: tab.min_pressure_pa,
                max_pressure_pa: tab.max_pressure_pa,
                a: tab.a,
                n: tab.n,
                k: tab.k,
                t: tab.t,
                m: tab.m,
            })
            .collect(),
    }
}

fn propellant_to_config(propellant: &Propellant) -> PropellantConfig {
    PropellantConfig {
        name: propellant.name.clone(),
        density_kg_m3: propellant.density_kg_m3,
        tabs: propellant
            .tabs
            .iter()
            .map(|tab| BurnRateTabConfig {
                min_pressure_pa: tab.min_pressure_pa,
                max_pressure_pa: tab.max_pressure_pa,
                a: tab.a,
                n: tab.n,
                k: tab.k,
                t: tab.t,
                m: tab.m,
            })
            .collect(),
    }
}

fn nozzle_from_config(config: &NozzleConfig) -> Nozzle {
    Nozzle {
        throat_m: config.throat_m,
        exit_m: config.exit_m,
        efficiency: config.efficiency,
        div_angle_deg: config.div_angle_deg,
        conv_angle_deg: config.conv_angle_deg,
        throat_length_m: config.throat_length_m,
        slag_coeff: config.slag_coeff,
        erosion_coeff: config.erosion_coeff,
    }
}

fn nozzle_to_config(nozzle: &Nozzle) -> NozzleConfig {
    NozzleConfig {
        throat_m: nozzle.throat_m,
        exit_m: nozzle.exit_m,
        efficiency: nozzle.efficiency,
        div_angle_deg: nozzle.div_angle_deg,
        conv_angle_deg: nozzle.conv_angle_deg,
        throat_length_m: nozzle.throat_length_m,
        slag_coeff: nozzle.slag_coeff,
        erosion_coeff: nozzle.erosion_coeff,
    }
}

impl Motor {
    /// Builds a motor from a nested configuration record.
    pub fn from_config(record: &MotorFileConfig) -> Motor {
        Motor {
            grains: record.grains.iter().map(grain_from_config).collect(),
            nozzle: nozzle_from_config(&record.nozzle),
            propellant: record.propellant.as_ref().map(propellant_from_config),
            config: record.config.clone(),
        }
    }

    /// Serializes the motor back to the same nested shape.
    pub fn to_config(&self) -> MotorFileConfig {
        MotorFileConfig {
            version: SCHEMA_VERSION,
            nozzle: nozzle_to_config(&self.nozzle),
            propellant: self.propellant.as_ref().map(propellant_to_config),
            grains: self.grains.iter().map(grain_to_config).collect(),
            config: self.config.clone(),
        }
    }
}
