use std::collections::BTreeMap;

use super::{hours, mg};
use crate::experiments::metadata::{Coadministration, Fasting, MappingMetaData, Tissue};
use crate::experiments::{task_id, SimulationExperiment};
use crate::fitting::mapping::FitMapping;
use crate::simulator::{Changes, Simulation, Timecourse, TimecourseSim};

/// Microdosed factor Xa inhibitor cocktail and therapeutic edoxaban with and without clarithromycin
#[derive(Debug, Clone, Copy, Default)]
pub struct Lenard2024;

// doses in mg, the cocktail contains 50 µg edoxaban
const DOSES: [(&str, f64); 4] = [
    ("API25, RIV25, EDO50, CLAR", 0.050),
    ("API25, RIV25, EDO50", 0.050),
    ("EDO60, CLAR", 60.0),
    ("EDO60", 60.0),
];

impl SimulationExperiment for Lenard2024 {
    fn sid(&self) -> &'static str {
        "Lenard2024"
    }

    fn dataset_tables(&self) -> Vec<&'static str> {
        vec!["Fig2"]
    }

    fn simulations(&self) -> BTreeMap<String, Simulation> {
        DOSES
            .iter()
            .map(|(intervention, dose)| {
                let sim = TimecourseSim::new(vec![Timecourse::new(
                    0.0,
                    hours(50.0),
                    500,
                    Changes::new().with("PODOSE_edo", mg(*dose)),
                )]);
                (intervention.to_string(), sim.into())
            })
            .collect()
    }

    fn fit_mappings(&self) -> BTreeMap<String, FitMapping> {
        DOSES
            .iter()
            .map(|(intervention, _)| {
                let coadministration = if intervention.contains("CLAR") {
                    Coadministration::Clarithromycin
                } else {
                    Coadministration::None
                };
                (
                    format!("fm_edoxaban_{}", intervention),
                    FitMapping::new(
                        &format!("edoxaban_{}", intervention),
                        &task_id(intervention),
                        "[Cve_edo]",
                        MappingMetaData::new(Tissue::Plasma, Fasting::NotReported)
                            .with_coadministration(coadministration),
                    ),
                )
            })
            .collect()
    }
}
