use std::collections::BTreeMap;

use super::{hours, mg};
use crate::experiments::metadata::{Fasting, MappingMetaData, Tissue};
use crate::experiments::{task_id, SimulationExperiment};
use crate::fitting::mapping::FitMapping;
use crate::simulator::{Changes, Simulation, Timecourse, TimecourseSim};

/// Single oral doses of 60 and 180 mg with prothrombin time
#[derive(Debug, Clone, Copy, Default)]
pub struct Brown2015;

const DOSES: [(&str, f64); 2] = [("ED60", 60.0), ("ED180", 180.0)];

impl SimulationExperiment for Brown2015 {
    fn sid(&self) -> &'static str {
        "Brown2015"
    }

    fn dataset_tables(&self) -> Vec<&'static str> {
        vec!["Fig2", "Fig3", "Fig4"]
    }

    fn simulations(&self) -> BTreeMap<String, Simulation> {
        DOSES
            .iter()
            .map(|(intervention, dose)| {
                let sim = TimecourseSim::new(vec![Timecourse::new(
                    0.0,
                    hours(73.0),
                    800,
                    Changes::new().with("PODOSE_edo", mg(*dose)),
                )]);
                (intervention.to_string(), sim.into())
            })
            .collect()
    }

    fn fit_mappings(&self) -> BTreeMap<String, FitMapping> {
        let mut mappings = BTreeMap::new();
        for (intervention, _) in DOSES {
            let task = task_id(intervention);
            mappings.insert(
                format!("fm_edoxaban_{}", intervention),
                FitMapping::new(
                    &format!("edoxaban_{}", intervention),
                    &task,
                    "[Cve_edo]",
                    MappingMetaData::new(Tissue::Plasma, Fasting::Fasted),
                ),
            );
            mappings.insert(
                format!("fm_{}_PT", intervention),
                FitMapping::new(
                    &format!("PT_{}", intervention),
                    &task,
                    "PT_change",
                    MappingMetaData::new(Tissue::Plasma, Fasting::Fasted),
                ),
            );
        }
        mappings
    }
}
