use ndarray::Array1;
use std::collections::BTreeMap;

use crate::experiments::studies::hours;
use crate::experiments::{default_changes, SimulationExperiment};
use crate::model::ModelKind;
use crate::routines::units::Quantity;
use crate::simulator::{Changes, Simulation, Timecourse, TimecourseSim};

/// Plasma edoxaban clamped at 0 to 1 µM for one day on the coagulation model
#[derive(Debug, Clone, Copy, Default)]
pub struct CoagulationExperiment;

impl CoagulationExperiment {
    /// Clamped plasma concentrations in µM
    pub fn concentrations() -> Array1<f64> {
        Array1::linspace(0.0, 1.0, 6)
    }
}

fn plasma_edo(value: f64) -> Changes {
    Changes::new().with("[Cve_edo]", Quantity::new(value, "µM"))
}

impl SimulationExperiment for CoagulationExperiment {
    fn sid(&self) -> &'static str {
        "CoagulationExperiment"
    }

    fn model(&self) -> ModelKind {
        ModelKind::Coagulation
    }

    /// Only the pharmacodynamic part of the reference fit
    fn default_changes(&self) -> Changes {
        default_changes()
            .iter()
            .filter(|(sid, _)| sid.starts_with("Emax_") || sid.starts_with("EC50_"))
            .map(|(sid, q)| (sid.to_string(), q.clone()))
            .collect()
    }

    fn simulations(&self) -> BTreeMap<String, Simulation> {
        Self::concentrations()
            .iter()
            .enumerate()
            .map(|(k, edo)| {
                let sim = TimecourseSim::new(vec![
                    Timecourse::new(0.0, hours(5.0), 500, plasma_edo(0.0)),
                    Timecourse::new(0.0, hours(24.0), 2000, plasma_edo(*edo)),
                    Timecourse::new(0.0, hours(24.0), 2000, plasma_edo(0.0)),
                ])
                .with_time_offset(-hours(5.0));
                (format!("coagulation_{}", k), sim.into())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pharmacodynamic_defaults() {
        let changes = CoagulationExperiment.default_changes();
        assert_eq!(changes.len(), 4);
        assert!(changes.get("EC50_edo_PT").is_some());
        assert!(changes.get("KI__EDOEX_k").is_none());
    }

    #[test]
    fn test_time_offset() {
        let simulations = CoagulationExperiment.simulations();
        assert_eq!(simulations.len(), 6);
        let Simulation::Timecourse(sim) = &simulations["coagulation_5"] else {
            panic!("timecourse expected");
        };
        assert_eq!(sim.time_offset, -300.0);
        assert_eq!(
            sim.timecourses[1].changes.get("[Cve_edo]"),
            Some(&Quantity::new(1.0, "µM"))
        );
    }
}
