use serde_derive::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EdoxabanError, Result};

/// Physical dimension of a [Unit]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Dimensionless,
    Time,
    Rate,
    Mass,
    Amount,
    Volume,
    Concentration,
    MassConcentration,
    Area,
    Flow,
    VolumePerMass,
    FlowPerMass,
    MolarMass,
}

/// A unit symbol together with its factor relative to the model unit of its dimension
///
/// Model units are `min`, `1/min`, `mg`, `mmole`, `l`, `mM`, `mg/l`, `m^2`,
/// `l/min`, `l/kg`, `l/min/kg` and `g/mole`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    pub symbol: &'static str,
    pub dimension: Dimension,
    pub factor: f64,
}

const UNITS: &[(&[&str], Dimension, f64)] = &[
    (&["dimensionless", "-", ""], Dimension::Dimensionless, 1.0),
    (&["%", "percent"], Dimension::Dimensionless, 0.01),
    (&["min", "minute"], Dimension::Time, 1.0),
    (&["s", "second", "sec"], Dimension::Time, 1.0 / 60.0),
    (&["hr", "h", "hour"], Dimension::Time, 60.0),
    (&["day", "d"], Dimension::Time, 1440.0),
    (&["1/min"], Dimension::Rate, 1.0),
    (&["1/s"], Dimension::Rate, 60.0),
    (&["1/hr", "1/h"], Dimension::Rate, 1.0 / 60.0),
    (&["1/day"], Dimension::Rate, 1.0 / 1440.0),
    (&["mg"], Dimension::Mass, 1.0),
    (&["g"], Dimension::Mass, 1e3),
    (&["kg"], Dimension::Mass, 1e6),
    (&["µg", "ug", "microgram"], Dimension::Mass, 1e-3),
    (&["ng"], Dimension::Mass, 1e-6),
    (&["mole", "mol"], Dimension::Amount, 1e3),
    (&["mmole", "mmol"], Dimension::Amount, 1.0),
    (&["µmole", "umole", "µmol", "umol"], Dimension::Amount, 1e-3),
    (&["nmole", "nmol"], Dimension::Amount, 1e-6),
    (&["l", "liter", "L"], Dimension::Volume, 1.0),
    (&["ml", "mL"], Dimension::Volume, 1e-3),
    (&["M", "mole/l"], Dimension::Concentration, 1e3),
    (&["mM", "mmole/l", "mmol/l"], Dimension::Concentration, 1.0),
    (&["µM", "uM", "µmole/l", "umole/l", "µmol/l"], Dimension::Concentration, 1e-3),
    (&["nM", "nmole/l", "nmol/l"], Dimension::Concentration, 1e-6),
    (&["mg/l", "µg/ml", "ug/ml"], Dimension::MassConcentration, 1.0),
    (&["mg/ml", "g/l"], Dimension::MassConcentration, 1e3),
    (&["ng/ml", "µg/l", "ug/l"], Dimension::MassConcentration, 1e-3),
    (&["m^2", "m2"], Dimension::Area, 1.0),
    (&["l/min"], Dimension::Flow, 1.0),
    (&["l/hr"], Dimension::Flow, 1.0 / 60.0),
    (&["ml/min", "ml/min/1.73m^2"], Dimension::Flow, 1e-3),
    (&["l/kg"], Dimension::VolumePerMass, 1.0),
    (&["ml/kg"], Dimension::VolumePerMass, 1e-3),
    (&["l/min/kg"], Dimension::FlowPerMass, 1.0),
    (&["ml/s/kg"], Dimension::FlowPerMass, 0.06),
    (&["g/mole", "g/mol"], Dimension::MolarMass, 1.0),
];

impl Unit {
    /// Look up a unit symbol in the unit table
    pub fn parse(symbol: &str) -> Result<Unit> {
        let trimmed = symbol.trim();
        UNITS
            .iter()
            .find_map(|(symbols, dimension, factor)| {
                symbols
                    .iter()
                    .find(|s| **s == trimmed)
                    .map(|s| Unit {
                        symbol: *s,
                        dimension: *dimension,
                        factor: *factor,
                    })
            })
            .ok_or_else(|| EdoxabanError::UnknownUnit(symbol.to_string()))
    }

    /// Factor converting a value in `self` into `target`
    pub fn factor_to(&self, target: &Unit) -> Result<f64> {
        if self.dimension != target.dimension {
            return Err(EdoxabanError::IncompatibleUnits {
                from: self.symbol.to_string(),
                to: target.symbol.to_string(),
            });
        }
        Ok(self.factor / target.factor)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

/// Convert `value` from the unit `from` into the unit `to`
pub fn convert(value: f64, from: &str, to: &str) -> Result<f64> {
    let from = Unit::parse(from)?;
    let to = Unit::parse(to)?;
    Ok(value * from.factor_to(&to)?)
}

/// A value with a unit symbol, resolved lazily against the unit table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
}

impl Quantity {
    pub fn new(value: f64, unit: &str) -> Self {
        Quantity {
            value,
            unit: unit.to_string(),
        }
    }

    pub fn dimensionless(value: f64) -> Self {
        Quantity::new(value, "dimensionless")
    }

    pub fn dimension(&self) -> Result<Dimension> {
        Ok(Unit::parse(&self.unit)?.dimension)
    }

    /// Magnitude of the quantity expressed in `unit`
    pub fn to(&self, unit: &str) -> Result<f64> {
        convert(self.value, &self.unit, unit)
    }

    /// Convert a mass (or mass concentration) into an amount (or molar concentration)
    ///
    /// Quantities that already are amounts or molar concentrations are returned in model units.
    pub fn mass_to_amount(&self, mr: f64) -> Result<Quantity> {
        let unit = Unit::parse(&self.unit)?;
        match unit.dimension {
            Dimension::Mass => Ok(Quantity::new(self.value * unit.factor / mr, "mmole")),
            Dimension::MassConcentration => {
                Ok(Quantity::new(self.value * unit.factor / mr, "mM"))
            }
            Dimension::Amount => Ok(Quantity::new(self.value * unit.factor, "mmole")),
            Dimension::Concentration => Ok(Quantity::new(self.value * unit.factor, "mM")),
            _ => Err(EdoxabanError::IncompatibleUnits {
                from: self.unit.clone(),
                to: "mmole".to_string(),
            }),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_conversion() {
        assert_eq!(convert(2.0, "hr", "min").unwrap(), 120.0);
        assert!((convert(30.0, "s", "min").unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_concentration_conversion() {
        let nm = convert(1.0, "µM", "nM").unwrap();
        assert!((nm - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_incompatible_units() {
        let err = convert(1.0, "mg", "min").unwrap_err();
        assert!(matches!(err, EdoxabanError::IncompatibleUnits { .. }));
    }

    #[test]
    fn test_unknown_unit() {
        assert!(matches!(
            Unit::parse("furlong"),
            Err(EdoxabanError::UnknownUnit(_))
        ));
    }

    #[test]
    fn test_mass_to_amount() {
        // 548.058 ng/ml edoxaban is 1 µM
        let q = Quantity::new(548.058, "ng/ml").mass_to_amount(548.058).unwrap();
        assert_eq!(q.unit, "mM");
        assert!((q.to("µM").unwrap() - 1.0).abs() < 1e-12);

        let dose = Quantity::new(60.0, "mg").mass_to_amount(548.058).unwrap();
        assert!((dose.value - 60.0 / 548.058).abs() < 1e-12);
    }
}
