use std::collections::BTreeMap;

use super::{hours, kg, mg};
use crate::experiments::metadata::{Fasting, MappingMetaData, Tissue};
use crate::experiments::{fasting_map, task_id, SimulationExperiment};
use crate::fitting::mapping::FitMapping;
use crate::routines::units::Quantity;
use crate::simulator::{Changes, Simulation, Timecourse, TimecourseSim};

/// Bioequivalence of reference and test tablets under fasted and fed conditions
#[derive(Debug, Clone, Copy, Default)]
pub struct Liu2022;

const BODYWEIGHTS: [(&str, f64); 4] = [
    ("fastedR", 69.2),
    ("fastedT", 69.2),
    ("fedR", 69.4),
    ("fedT", 69.4),
];

fn fasting(intervention: &str) -> Fasting {
    if intervention.starts_with("fed") {
        Fasting::Fed
    } else {
        Fasting::Fasted
    }
}

impl SimulationExperiment for Liu2022 {
    fn sid(&self) -> &'static str {
        "Liu2022"
    }

    fn dataset_tables(&self) -> Vec<&'static str> {
        vec!["Fig1", "Fig2"]
    }

    fn simulations(&self) -> BTreeMap<String, Simulation> {
        BODYWEIGHTS
            .iter()
            .map(|(intervention, bw)| {
                let sim = TimecourseSim::new(vec![Timecourse::new(
                    0.0,
                    hours(50.0),
                    500,
                    Changes::new()
                        .with("BW", kg(*bw))
                        .with("PODOSE_edo", mg(60.0))
                        .with(
                            "GU__F_edo_abs",
                            Quantity::dimensionless(fasting_map(fasting(intervention))),
                        ),
                )]);
                (intervention.to_string(), sim.into())
            })
            .collect()
    }

    fn fit_mappings(&self) -> BTreeMap<String, FitMapping> {
        BODYWEIGHTS
            .iter()
            .map(|(intervention, _)| {
                (
                    format!("fm_edoxaban_{}", intervention),
                    FitMapping::new(
                        &format!("edoxaban_{}", intervention),
                        &task_id(intervention),
                        "[Cve_edo]",
                        MappingMetaData::new(Tissue::Plasma, fasting(intervention)),
                    )
                    .without_sd(),
                )
            })
            .collect()
    }
}
