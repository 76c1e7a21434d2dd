use serde_derive::{Deserialize, Serialize};

use crate::error::{EdoxabanError, Result};
use crate::routines::units::Quantity;

/// Ordered set of model changes, keyed by parameter or state symbol
///
/// Inserting a symbol that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Changes(Vec<(String, Quantity)>);

impl Changes {
    pub fn new() -> Self {
        Changes(Vec::new())
    }

    /// Builder variant of [Changes::insert]
    pub fn with(mut self, sid: &str, value: Quantity) -> Self {
        self.insert(sid, value);
        self
    }

    pub fn insert(&mut self, sid: &str, value: Quantity) {
        match self.0.iter_mut().find(|(key, _)| key == sid) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((sid.to_string(), value)),
        }
    }

    /// Insert all changes of `other`, overriding existing symbols
    pub fn extend(&mut self, other: &Changes) {
        for (sid, value) in other.iter() {
            self.insert(sid, value.clone());
        }
    }

    pub fn get(&self, sid: &str) -> Option<&Quantity> {
        self.0.iter().find(|(key, _)| key == sid).map(|(_, q)| q)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Quantity)> {
        self.0.iter().map(|(sid, q)| (sid.as_str(), q))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Quantity)> for Changes {
    fn from_iter<I: IntoIterator<Item = (String, Quantity)>>(iter: I) -> Self {
        let mut changes = Changes::new();
        for (sid, q) in iter {
            changes.insert(&sid, q);
        }
        changes
    }
}

/// One integration interval with the changes applied at its start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timecourse {
    /// Start time in min
    pub start: f64,
    /// End time in min
    pub end: f64,
    /// Number of output intervals, `steps + 1` points are recorded
    pub steps: usize,
    pub changes: Changes,
}

impl Timecourse {
    pub fn new(start: f64, end: f64, steps: usize, changes: Changes) -> Self {
        Timecourse {
            start,
            end,
            steps,
            changes,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.end > self.start) {
            return Err(EdoxabanError::InvalidTimecourse(format!(
                "end {} must be larger than start {}",
                self.end, self.start
            )));
        }
        if self.steps == 0 {
            return Err(EdoxabanError::InvalidTimecourse(
                "at least one step is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// A multi-phase simulation protocol
///
/// Phases run back to back; state and parameters carry over from one phase to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimecourseSim {
    pub timecourses: Vec<Timecourse>,
    /// Time in min assigned to the first recorded point
    pub time_offset: f64,
}

impl TimecourseSim {
    pub fn new(timecourses: Vec<Timecourse>) -> Self {
        TimecourseSim {
            timecourses,
            time_offset: 0.0,
        }
    }

    pub fn with_time_offset(mut self, time_offset: f64) -> Self {
        self.time_offset = time_offset;
        self
    }

    /// Total simulated time in min
    pub fn duration(&self) -> f64 {
        self.timecourses.iter().map(|tc| tc.duration()).sum()
    }

    /// Add changes to the first phase with lower priority than the phase's own changes
    pub fn with_base_changes(mut self, base: &Changes) -> Self {
        if let Some(first) = self.timecourses.first_mut() {
            let mut changes = base.clone();
            changes.extend(&first.changes);
            first.changes = changes;
        }
        self
    }

    /// Add changes to the first phase, overriding what the phase sets
    pub fn with_overrides(mut self, overrides: &Changes) -> Self {
        if let Some(first) = self.timecourses.first_mut() {
            first.changes.extend(overrides);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.timecourses.is_empty() {
            return Err(EdoxabanError::InvalidTimecourse(
                "simulation without timecourses".to_string(),
            ));
        }
        self.timecourses.iter().try_for_each(|tc| tc.validate())
    }
}

/// One scanned dimension: parallel value lists for one or more symbols
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanDimension {
    pub sid: String,
    pub changes: Vec<(String, Vec<Quantity>)>,
}

impl ScanDimension {
    /// Dimension scanning a single symbol
    pub fn new(sid: &str, symbol: &str, values: Vec<Quantity>) -> Self {
        ScanDimension {
            sid: sid.to_string(),
            changes: vec![(symbol.to_string(), values)],
        }
    }

    pub fn len(&self) -> Result<usize> {
        let mut lengths = self.changes.iter().map(|(_, values)| values.len());
        let n = lengths
            .next()
            .ok_or_else(|| EdoxabanError::InvalidScan(format!("dimension `{}` is empty", self.sid)))?;
        if n == 0 || lengths.any(|m| m != n) {
            return Err(EdoxabanError::InvalidScan(format!(
                "dimension `{}` needs value lists of equal, non-zero length",
                self.sid
            )));
        }
        Ok(n)
    }

    /// Changes at position `index` of this dimension
    pub fn changes_at(&self, index: usize) -> Changes {
        self.changes
            .iter()
            .map(|(sid, values)| (sid.clone(), values[index].clone()))
            .collect()
    }
}

/// Parameter scan: the Cartesian product of all dimensions applied to one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSim {
    pub simulation: TimecourseSim,
    pub dimensions: Vec<ScanDimension>,
}

impl ScanSim {
    pub fn new(simulation: TimecourseSim, dimensions: Vec<ScanDimension>) -> Self {
        ScanSim {
            simulation,
            dimensions,
        }
    }

    /// Index tuples of all scan points, the last dimension varying fastest
    pub fn points(&self) -> Result<Vec<Vec<usize>>> {
        let mut points: Vec<Vec<usize>> = vec![Vec::new()];
        for dimension in &self.dimensions {
            let n = dimension.len()?;
            points = points
                .into_iter()
                .flat_map(|point| {
                    (0..n).map(move |i| {
                        let mut next = point.clone();
                        next.push(i);
                        next
                    })
                })
                .collect();
        }
        Ok(points)
    }

    /// Changes of one scan point
    pub fn changes_at(&self, point: &[usize]) -> Changes {
        let mut changes = Changes::new();
        for (dimension, index) in self.dimensions.iter().zip(point) {
            changes.extend(&dimension.changes_at(*index));
        }
        changes
    }

    /// The timecourse simulation of one scan point
    pub fn simulation_at(&self, point: &[usize]) -> TimecourseSim {
        self.simulation.clone().with_overrides(&self.changes_at(point))
    }
}

/// Any simulation an experiment can define
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Simulation {
    Timecourse(TimecourseSim),
    Scan(ScanSim),
}

impl Simulation {
    pub fn with_base_changes(self, base: &Changes) -> Self {
        match self {
            Simulation::Timecourse(sim) => Simulation::Timecourse(sim.with_base_changes(base)),
            Simulation::Scan(mut scan) => {
                scan.simulation = scan.simulation.with_base_changes(base);
                Simulation::Scan(scan)
            }
        }
    }

    pub fn with_overrides(self, overrides: &Changes) -> Self {
        match self {
            Simulation::Timecourse(sim) => Simulation::Timecourse(sim.with_overrides(overrides)),
            Simulation::Scan(mut scan) => {
                scan.simulation = scan.simulation.with_overrides(overrides);
                Simulation::Scan(scan)
            }
        }
    }
}

impl From<TimecourseSim> for Simulation {
    fn from(sim: TimecourseSim) -> Self {
        Simulation::Timecourse(sim)
    }
}

impl From<ScanSim> for Simulation {
    fn from(scan: ScanSim) -> Self {
        Simulation::Scan(scan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mg(value: f64) -> Quantity {
        Quantity::new(value, "mg")
    }

    #[test]
    fn test_changes_replace_in_place() {
        let mut changes = Changes::new().with("BW", Quantity::new(70.0, "kg")).with("PODOSE_edo", mg(60.0));
        changes.insert("BW", Quantity::new(80.0, "kg"));
        assert_eq!(changes.len(), 2);
        assert_eq!(changes.get("BW").map(|q| q.value), Some(80.0));
        assert_eq!(changes.iter().next().map(|(sid, _)| sid), Some("BW"));
    }

    #[test]
    fn test_base_changes_have_lower_priority() {
        let sim = TimecourseSim::new(vec![Timecourse::new(
            0.0,
            60.0,
            10,
            Changes::new().with("PODOSE_edo", mg(60.0)),
        )]);
        let base = Changes::new().with("PODOSE_edo", mg(1.0)).with("LI__EDO2M4_Vmax", Quantity::new(0.2, "1/min"));
        let sim = sim.with_base_changes(&base);
        let changes = &sim.timecourses[0].changes;
        assert_eq!(changes.get("PODOSE_edo"), Some(&mg(60.0)));
        assert!(changes.get("LI__EDO2M4_Vmax").is_some());

        let sim = sim.with_overrides(&Changes::new().with("PODOSE_edo", mg(30.0)));
        assert_eq!(sim.timecourses[0].changes.get("PODOSE_edo"), Some(&mg(30.0)));
    }

    #[test]
    fn test_invalid_timecourses() {
        assert!(Timecourse::new(10.0, 10.0, 5, Changes::new()).validate().is_err());
        assert!(Timecourse::new(0.0, 10.0, 0, Changes::new()).validate().is_err());
        assert!(TimecourseSim::new(vec![]).validate().is_err());
    }

    #[test]
    fn test_scan_points_are_cartesian() {
        let sim = TimecourseSim::new(vec![Timecourse::new(0.0, 10.0, 1, Changes::new())]);
        let scan = ScanSim::new(
            sim,
            vec![
                ScanDimension::new("dim_dose", "PODOSE_edo", vec![mg(10.0), mg(20.0), mg(30.0)]),
                ScanDimension::new("dim_bw", "BW", vec![Quantity::new(60.0, "kg"), Quantity::new(90.0, "kg")]),
            ],
        );
        let points = scan.points().unwrap();
        assert_eq!(points.len(), 6);
        assert_eq!(points[1], vec![0, 1]);
        let changes = scan.changes_at(&points[5]);
        assert_eq!(changes.get("PODOSE_edo"), Some(&mg(30.0)));
        assert_eq!(changes.get("BW").map(|q| q.value), Some(90.0));
    }

    #[test]
    fn test_scan_dimension_lengths_must_match() {
        let dimension = ScanDimension {
            sid: "dim".to_string(),
            changes: vec![
                ("BW".to_string(), vec![Quantity::new(60.0, "kg")]),
                ("PODOSE_edo".to_string(), vec![mg(1.0), mg(2.0)]),
            ],
        };
        assert!(dimension.len().is_err());
    }
}
