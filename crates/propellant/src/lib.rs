//! Propellant combustion model.
//!
//! A propellant owns an ordered set of pressure-banded burn-rate tabs, each
//! defining Vieille's law `r = a*P^n` and the combustion gas properties valid
//! in that band. Chamber pressure follows from Kn by balancing mass generated
//! against mass ejected through a choked throat.

use serde::{Deserialize, Serialize};

use srm_core::alerts::{SimAlert, SimAlertLevel, SimAlertType};
use srm_core::constants::GAS_CONSTANT;
use srm_core::rootfind;

/// One pressure band of the burn-rate law, with the gas properties that hold
/// across it: specific-heat ratio `k`, combustion temperature `t` (K), and
/// exhaust molar mass `m` (kg/kmol).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnRateTab {
    pub min_pressure_pa: f64,
    pub max_pressure_pa: f64,
    pub a: f64,
    pub n: f64,
    pub k: f64,
    pub t: f64,
    pub m: f64,
}

impl BurnRateTab {
    fn contains(&self, pressure_pa: f64) -> bool {
        pressure_pa >= self.min_pressure_pa && pressure_pa <= self.max_pressure_pa
    }

    // Distance from the band, zero inside it.
    fn distance_to(&self, pressure_pa: f64) -> f64 {
        if pressure_pa < self.min_pressure_pa {
            self.min_pressure_pa - pressure_pa
        } else if pressure_pa > self.max_pressure_pa {
            pressure_pa - self.max_pressure_pa
        } else {
            0.0
        }
    }
}

/// Combustion properties pulled from a single tab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombustionProperties {
    pub a: f64,
    pub n: f64,
    pub k: f64,
    pub t: f64,
    pub m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Propellant {
    pub name: String,
    pub density_kg_m3: f64,
    pub tabs: Vec<BurnRateTab>,
}

const PRESSURE_SOLVE_ITERS: usize = 80;

impl Propellant {
    /// Returns the tab whose band contains `pressure_pa`, or the nearest tab
    /// when none does. Calculations never fail on an out-of-band pressure;
    /// the condition is surfaced separately through `pressure_errors`.
    pub fn tab_for_pressure(&self, pressure_pa: f64) -> Option<&BurnRateTab> {
        if let Some(tab) = self.tabs.iter().find(|tab| tab.contains(pressure_pa)) {
            return Some(tab);
        }
        self.tabs.iter().min_by(|a, b| {
            a.distance_to(pressure_pa)
                .total_cmp(&b.distance_to(pressure_pa))
        })
    }

    /// Linear burn rate (m/s) at a chamber pressure, from Vieille's law.
    pub fn burn_rate(&self, pressure_pa: f64) -> f64 {
        match self.tab_for_pressure(pressure_pa) {
            Some(tab) => tab.a * pressure_pa.powf(tab.n),
            None => 0.0,
        }
    }

    /// Burn-rate coefficients and gas properties at a chamber pressure.
    pub fn combustion_properties(&self, pressure_pa: f64) -> Option<CombustionProperties> {
        self.tab_for_pressure(pressure_pa).map(|tab| CombustionProperties {
            a: tab.a,
            n: tab.n,
            k: tab.k,
            t: tab.t,
            m: tab.m,
        })
    }

    // Choked mass flow per unit throat area and unit chamber pressure:
    // sqrt(k / (Rs*T)) * (2 / (k+1))^((k+1) / (2*(k-1))).
    fn choked_flow_factor(tab: &BurnRateTab) -> f64 {
        let specific_gas = GAS_CONSTANT / tab.m;
        ((tab.k / (specific_gas * tab.t))
            * (2.0 / (tab.k + 1.0)).powf((tab.k + 1.0) / (tab.k - 1.0)))
        .sqrt()
    }

    // Steady-state mass balance residual at a candidate pressure: mass
    // generated by the burning surface minus mass ejected through the throat,
    // both per unit throat area.
    fn mass_balance_residual(&self, kn: f64, pressure_pa: f64) -> f64 {
        match self.tab_for_pressure(pressure_pa) {
            Some(tab) => {
                let generated = kn * self.density_kg_m3 * tab.a * pressure_pa.powf(tab.n);
                let ejected = pressure_pa * Self::choked_flow_factor(tab);
                generated - ejected
            }
            None => 0.0,
        }
    }

    // Closed-form steady-state pressure for a single tab, valid when a and n
    // do not vary with pressure.
    fn tab_pressure_from_kn(&self, kn: f64, tab: &BurnRateTab) -> f64 {
        let num = kn * self.density_kg_m3 * tab.a;
        (num / Self::choked_flow_factor(tab)).powf(1.0 / (1.0 - tab.n))
    }

    /// Steady-state chamber pressure for a burning-surface-to-throat area
    /// ratio `kn`, found by inverting `massGenerated(P) = massEjected(P)`.
    ///
    /// The balance is solved by bounded bisection across the full tab domain,
    /// since the burn-rate exponent and gas properties can change across tab
    /// boundaries. If bracketing fails the per-tab closed form is used
    /// instead, keeping the result finite for any input.
    pub fn pressure_from_kn(&self, kn: f64) -> f64 {
        if kn <= 0.0 || self.tabs.is_empty() {
            return 0.0;
        }

        let upper = self
            .tabs
            .iter()
            .map(|tab| tab.max_pressure_pa)
            .fold(0.0, f64::max)
            .max(1.0);
        let solved = rootfind::bisect(
            |p| self.mass_balance_residual(kn, p),
            1.0,
            upper,
            1e-6,
            1e-9,
            PRESSURE_SOLVE_ITERS,
        );
        if let Some(pressure) = solved {
            return pressure.max(0.0);
        }

        // Fallback: evaluate each tab's closed form and keep the highest
        // pressure that lands inside (or nearest to) its own band.
        let mut best = 0.0_f64;
        for tab in &self.tabs {
            let candidate = self.tab_pressure_from_kn(kn, tab);
            if candidate.is_finite() && tab.contains(candidate) {
                best = best.max(candidate);
            }
        }
        if best == 0.0 {
            for tab in &self.tabs {
                let candidate = self.tab_pressure_from_kn(kn, tab);
                if candidate.is_finite() {
                    best = best.max(candidate.clamp(tab.min_pressure_pa, tab.max_pressure_pa));
                }
            }
        }
        best
    }

    /// Forward evaluation: the Kn that sustains a given chamber pressure.
    pub fn kn_from_pressure(&self, pressure_pa: f64) -> f64 {
        if pressure_pa <= 0.0 {
            return 0.0;
        }
        match self.tab_for_pressure(pressure_pa) {
            Some(tab) => {
                let ejected = pressure_pa * Self::choked_flow_factor(tab);
                let generated_per_kn =
                    self.density_kg_m3 * tab.a * pressure_pa.powf(tab.n);
                ejected / generated_per_kn
            }
            None => 0.0,
        }
    }

    /// Configuration problems that prevent simulation.
    pub fn validation_errors(&self) -> Vec<SimAlert> {
        let mut errors = Vec::new();
        if self.tabs.is_empty() {
            errors.push(SimAlert::new(
                SimAlertLevel::Error,
                SimAlertType::Constraint,
                "Propellant must have at least one burn rate tab",
            ));
        }
        for (index, tab) in self.tabs.iter().enumerate() {
            if tab.min_pressure_pa >= tab.max_pressure_pa {
                errors.push(SimAlert::new(
                    SimAlertLevel::Error,
                    SimAlertType::Constraint,
                    format!(
                        "Burn rate tab {} has an inverted pressure range",
                        index + 1
                    ),
                ));
            }
            for other in &self.tabs[index + 1..] {
                if tab.min_pressure_pa < other.max_pressure_pa
                    && other.min_pressure_pa < tab.max_pressure_pa
                {
                    errors.push(SimAlert::new(
                        SimAlertLevel::Error,
                        SimAlertType::Constraint,
                        "Burn rate tab pressure ranges must not overlap",
                    ));
                }
            }
        }
        errors
    }

    /// Reports a chamber pressure that falls outside every tab's band.
    /// The value is still simulated against the nearest tab, so this is
    /// attached to the result instead of aborting the run.
    pub fn pressure_errors(&self, pressure_pa: f64) -> Vec<SimAlert> {
        if self.tabs.iter().any(|tab| tab.contains(pressure_pa)) {
            return Vec::new();
        }
        vec![SimAlert::new(
            SimAlertLevel::Error,
            SimAlertType::Value,
            format!(
                "Chamber pressure of {:.3} MPa is outside of the propellant's pressure range",
                pressure_pa / 1e6
            ),
        )]
    }
}
