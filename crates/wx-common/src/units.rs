//! Units attached to grid fields and station measurements.
//!
//! Values are carried in whatever unit the source delivered; converting them
//! for display is left to the consumer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Units {
    Kelvin,
    Celsius,
    Fahrenheit,
    Percent,
    MetersPerSecond,
    Knots,
    MilesPerHour,
    Degrees,
    Pascals,
    Hectopascals,
    InchesOfMercury,
    Meters,
    StatuteMiles,
    /// Anything the catalog reports that we have no name for.
    Other(String),
    Unknown,
}

impl Units {
    /// Map a unit symbol (UCUM or a common abbreviation) to a unit.
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol.trim() {
            "K" => Units::Kelvin,
            "°C" | "degC" | "Cel" | "C" => Units::Celsius,
            "°F" | "degF" | "[degF]" | "F" => Units::Fahrenheit,
            "%" => Units::Percent,
            "m/s" | "m s-1" | "m.s-1" => Units::MetersPerSecond,
            "kt" | "kts" | "[kn_i]" | "knots" => Units::Knots,
            "mph" | "[mi_i]/h" => Units::MilesPerHour,
            "°" | "deg" | "degree" | "degrees" => Units::Degrees,
            "Pa" => Units::Pascals,
            "hPa" | "mb" | "mbar" => Units::Hectopascals,
            "inHg" | "[in_i'Hg]" => Units::InchesOfMercury,
            "m" => Units::Meters,
            "mi" | "SM" | "[mi_i]" => Units::StatuteMiles,
            "" => Units::Unknown,
            other => Units::Other(other.to_string()),
        }
    }

    /// Canonical display symbol.
    pub fn symbol(&self) -> &str {
        match self {
            Units::Kelvin => "K",
            Units::Celsius => "°C",
            Units::Fahrenheit => "°F",
            Units::Percent => "%",
            Units::MetersPerSecond => "m/s",
            Units::Knots => "kt",
            Units::MilesPerHour => "mph",
            Units::Degrees => "°",
            Units::Pascals => "Pa",
            Units::Hectopascals => "hPa",
            Units::InchesOfMercury => "inHg",
            Units::Meters => "m",
            Units::StatuteMiles => "mi",
            Units::Other(s) => s,
            Units::Unknown => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_symbol() {
        assert_eq!(Units::from_symbol("K"), Units::Kelvin);
        assert_eq!(Units::from_symbol("m s-1"), Units::MetersPerSecond);
        assert_eq!(Units::from_symbol(" hPa "), Units::Hectopascals);
        assert_eq!(Units::from_symbol(""), Units::Unknown);
        assert_eq!(Units::from_symbol("J/kg"), Units::Other("J/kg".to_string()));
    }

    #[test]
    fn test_symbol_round_trips_known_units() {
        for unit in [Units::Kelvin, Units::Knots, Units::Percent, Units::InchesOfMercury] {
            assert_eq!(Units::from_symbol(unit.symbol()), unit);
        }
    }
}
