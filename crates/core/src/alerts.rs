//! Simulation alert taxonomy shared by the grain, nozzle, propellant, and simulation crates.

use std::fmt;

/// Severity of a simulation alert. Errors prevent or invalidate a run,
/// warnings flag suspect values that can still be simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimAlertLevel {
    Error,
    Warning,
    Message,
}

impl fmt::Display for SimAlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimAlertLevel::Error => "Error",
            SimAlertLevel::Warning => "Warning",
            SimAlertLevel::Message => "Message",
        };
        write!(f, "{name}")
    }
}

/// Variety of issue an alert is associated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimAlertType {
    Geometry,
    Constraint,
    Value,
}

impl fmt::Display for SimAlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SimAlertType::Geometry => "Geometry",
            SimAlertType::Constraint => "Constraint",
            SimAlertType::Value => "Value",
        };
        write!(f, "{name}")
    }
}

/// A possible problem with a motor, carrying severity, kind, a human-readable
/// description, and a location tag ("Grain 2", "Nozzle", "Motor") for attribution.
#[derive(Debug, Clone)]
pub struct SimAlert {
    pub level: SimAlertLevel,
    pub kind: SimAlertType,
    pub description: String,
    pub location: Option<String>,
}

impl SimAlert {
    pub fn new(level: SimAlertLevel, kind: SimAlertType, description: impl Into<String>) -> Self {
        Self {
            level,
            kind,
            description: description.into(),
            location: None,
        }
    }

    /// Builder-style location tag, used when attributing grain alerts by index.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for SimAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(
                f,
                "{} ({}, {}): {}",
                self.level, self.kind, loc, self.description
            ),
            None => write!(f, "{} ({}): {}", self.level, self.kind, self.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location_when_set() {
        let alert = SimAlert::new(
            SimAlertLevel::Warning,
            SimAlertType::Constraint,
            "Max pressure exceeded configured limit",
        )
        .at("Motor");
        assert_eq!(
            alert.to_string(),
            "Warning (Constraint, Motor): Max pressure exceeded configured limit"
        );
    }
}
