//! Unit labels and conversion rates between the internal SI units and display units.
//!
//! All calculations in the workspace are done in the base units that key this
//! table; conversions only happen at presentation and export boundaries.

use thiserror::Error;

/// Base units used internally, with their long-form labels.
pub const UNIT_LABELS: &[(&str, &str)] = &[
    ("m", "Length"),
    ("m^3", "Volume"),
    ("m/s", "Velocity"),
    ("N", "Force"),
    ("Ns", "Impulse"),
    ("Pa", "Pressure"),
    ("kg", "Mass"),
    ("kg/m^3", "Density"),
    ("kg/s", "Mass Flow"),
    ("kg/(m^2*s)", "Mass Flux"),
    ("m/(s*Pa^n)", "Burn Rate Coefficient"),
    ("(m*Pa)/s", "Nozzle Slag Coefficient"),
    ("m/(s*Pa)", "Nozzle Erosion Coefficient"),
];

// (base unit, display unit, multiplier from base to display)
const UNIT_TABLE: &[(&str, &str, f64)] = &[
    ("m", "cm", 100.0),
    ("m", "mm", 1000.0),
    ("m", "in", 39.37),
    ("m", "ft", 3.28),
    ("m^3", "cm^3", 1e6),
    ("m^3", "mm^3", 1e9),
    ("m^3", "in^3", 39.37 * 39.37 * 39.37),
    ("m^3", "ft^3", 3.28 * 3.28 * 3.28),
    ("m/s", "cm/s", 100.0),
    ("m/s", "mm/s", 1000.0),
    ("m/s", "ft/s", 3.28),
    ("m/s", "in/s", 39.37),
    ("N", "lbf", 0.2248),
    ("Ns", "lbfs", 0.2248),
    ("Pa", "MPa", 1.0 / 1e6),
    ("Pa", "psi", 1.0 / 6895.0),
    ("kg", "g", 1000.0),
    ("kg", "lb", 2.205),
    ("kg", "oz", 2.205 * 16.0),
    ("kg/m^3", "lb/in^3", 3.61273e-5),
    ("kg/m^3", "g/cm^3", 0.001),
    ("kg/s", "lb/s", 2.205),
    ("kg/s", "g/s", 1000.0),
    ("kg/(m^2*s)", "lb/(in^2*s)", 0.001422),
    ("(m*Pa)/s", "(m*MPa)/s", 1e6),
    ("(m*Pa)/s", "(in*psi)/s", 0.00571014715),
    ("m/(s*Pa)", "thou/(s*psi)", 271447138.0),
    ("m/(s*Pa)", "um/(s*mPa)", 1e9),
    // Ratio converts m/s to in/s. The pressure exponent must be handled separately.
    ("m/(s*Pa^n)", "in/(s*psi^n)", 39.37),
    ("m/(s*Pa^n)", "mm/(s*Pa^n)", 1000.0),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitError {
    #[error("cannot find conversion from <{from}> to <{to}>")]
    UnknownConversion { from: String, to: String },
}

/// Returns the ratio to convert between the two units.
pub fn conversion_rate(from: &str, to: &str) -> Result<f64, UnitError> {
    if from == to {
        return Ok(1.0);
    }
    for (base, display, rate) in UNIT_TABLE {
        if *base == from && *display == to {
            return Ok(*rate);
        }
        if *display == from && *base == to {
            return Ok(1.0 / rate);
        }
    }
    Err(UnitError::UnknownConversion {
        from: from.to_string(),
        to: to.to_string(),
    })
}

/// Converts `quantity` from `from` units to `to` units.
pub fn convert(quantity: f64, from: &str, to: &str) -> Result<f64, UnitError> {
    Ok(quantity * conversion_rate(from, to)?)
}

/// Converts a slice of values between units, reusing a single rate lookup.
pub fn convert_all(quantities: &[f64], from: &str, to: &str) -> Result<Vec<f64>, UnitError> {
    let rate = conversion_rate(from, to)?;
    Ok(quantities.iter().map(|q| q * rate).collect())
}

/// Converts and formats a quantity as a rounded string with the unit appended.
pub fn conv_format(quantity: f64, from: &str, to: &str, places: usize) -> Result<String, UnitError> {
    let converted = convert(quantity, from, to)?;
    Ok(format!("{converted:.places$} {to}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn pascals_to_psi_and_back() {
        let psi = convert(6895.0, "Pa", "psi").unwrap();
        assert_relative_eq!(psi, 1.0, epsilon = 1e-12);
        let pa = convert(psi, "psi", "Pa").unwrap();
        assert_relative_eq!(pa, 6895.0, epsilon = 1e-9);
    }

    #[test]
    fn identity_conversion_is_free() {
        assert_eq!(conversion_rate("kg", "kg").unwrap(), 1.0);
    }

    #[test]
    fn unknown_pair_is_an_error() {
        assert!(matches!(
            conversion_rate("Pa", "lbf"),
            Err(UnitError::UnknownConversion { .. })
        ));
    }

    #[test]
    fn formats_with_unit_suffix() {
        let text = conv_format(10342500.0, "Pa", "psi", 0).unwrap();
        assert_eq!(text, "1500 psi");
    }

    #[test]
    fn converts_slices_with_one_lookup() {
        let meters = [1.0, 2.0];
        let inches = convert_all(&meters, "m", "in").unwrap();
        assert_relative_eq!(inches[0], 39.37);
        assert_relative_eq!(inches[1], 78.74);
    }
}
