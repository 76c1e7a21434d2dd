use ndarray::{Array2, ArrayView1, Axis};

use crate::error::{EdoxabanError, Result};
use crate::routines::units::Quantity;

/// Timecourse of all model outputs in model units
///
/// The first column is `time` in min. Phase boundaries appear twice, once
/// before and once after the changes of the next phase are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct TimecourseResult {
    pub columns: Vec<String>,
    pub data: Array2<f64>,
}

impl TimecourseResult {
    pub fn new(columns: Vec<String>, data: Array2<f64>) -> Self {
        TimecourseResult { columns, data }
    }

    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    pub fn time(&self) -> ArrayView1<f64> {
        self.data.column(0)
    }

    pub fn column(&self, name: &str) -> Result<ArrayView1<f64>> {
        let index = self
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| EdoxabanError::MissingOutput(name.to_string()))?;
        Ok(self.data.column(index))
    }

    /// Value of `name` at the end of the simulation
    pub fn final_value(&self, name: &str) -> Result<f64> {
        let column = self.column(name)?;
        column
            .iter()
            .last()
            .copied()
            .ok_or_else(|| EdoxabanError::MissingOutput(name.to_string()))
    }

    /// Linear interpolation of `name` at time `t` (min)
    ///
    /// Returns `None` outside of the simulated time span. At duplicated phase
    /// boundaries the value before the boundary changes is used.
    pub fn interpolate(&self, name: &str, t: f64) -> Result<Option<f64>> {
        let y = self.column(name)?;
        let time = self.time();
        let n = time.len();
        if n == 0 || t < time[0] || t > time[n - 1] || t.is_nan() {
            return Ok(None);
        }
        let upper = time.iter().position(|ti| *ti >= t).unwrap_or(n - 1);
        if time[upper] == t || upper == 0 {
            return Ok(Some(y[upper]));
        }
        let lower = upper - 1;
        let w = (t - time[lower]) / (time[upper] - time[lower]);
        Ok(Some(y[lower] + w * (y[upper] - y[lower])))
    }

    /// Result restricted to rows with `time >= t` (min)
    pub fn since(&self, t: f64) -> TimecourseResult {
        let rows: Vec<usize> = self
            .time()
            .iter()
            .enumerate()
            .filter(|(_, ti)| **ti >= t)
            .map(|(i, _)| i)
            .collect();
        TimecourseResult::new(self.columns.clone(), self.data.select(Axis(0), &rows))
    }
}

/// One simulated point of a parameter scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPoint {
    /// Index into each scan dimension
    pub indices: Vec<usize>,
    /// Scanned symbols and their values at this point
    pub values: Vec<(String, Quantity)>,
    pub result: TimecourseResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub dimensions: Vec<String>,
    pub points: Vec<ScanPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationResult {
    Timecourse(TimecourseResult),
    Scan(ScanResult),
}

impl SimulationResult {
    pub fn timecourse(&self) -> Option<&TimecourseResult> {
        match self {
            SimulationResult::Timecourse(tc) => Some(tc),
            SimulationResult::Scan(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn result() -> TimecourseResult {
        TimecourseResult::new(
            vec!["time".to_string(), "y".to_string()],
            array![[0.0, 0.0], [10.0, 1.0], [10.0, 5.0], [20.0, 3.0]],
        )
    }

    #[test]
    fn test_interpolation() {
        let r = result();
        assert_eq!(r.interpolate("y", 5.0).unwrap(), Some(0.5));
        assert_eq!(r.interpolate("y", 10.0).unwrap(), Some(1.0));
        assert_eq!(r.interpolate("y", 15.0).unwrap(), Some(4.0));
        assert_eq!(r.interpolate("y", 25.0).unwrap(), None);
        assert!(r.interpolate("z", 5.0).is_err());
    }

    #[test]
    fn test_since() {
        let r = result().since(10.0);
        assert_eq!(r.len(), 3);
        assert_eq!(r.final_value("y").unwrap(), 3.0);
    }
}
