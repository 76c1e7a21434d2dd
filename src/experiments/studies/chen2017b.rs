use std::collections::BTreeMap;

use super::{hours, kg, mg};
use crate::experiments::metadata::{Fasting, MappingMetaData, Tissue};
use crate::experiments::{task_id, SimulationExperiment};
use crate::fitting::mapping::FitMapping;
use crate::simulator::{Changes, Simulation, Timecourse, TimecourseSim};

/// Single oral doses of 30, 60 and 90 mg in healthy Chinese subjects
#[derive(Debug, Clone, Copy, Default)]
pub struct Chen2017b;

const BODYWEIGHT: f64 = 61.2;
const DOSES: [(&str, f64); 3] = [("ED30", 30.0), ("ED60", 60.0), ("ED90", 90.0)];
const INFOS_PK: [(&str, &str); 3] = [
    ("[Cve_edo]", "edoxaban"),
    ("[Cve_m4]", "M4"),
    ("Aurine_edo", "edoxaban_urine"),
];
const INFOS_PD: [(&str, &str); 2] = [("aPTT_change", "aPTT_change"), ("PT_change", "PT_change")];

impl SimulationExperiment for Chen2017b {
    fn sid(&self) -> &'static str {
        "Chen2017b"
    }

    fn dataset_tables(&self) -> Vec<&'static str> {
        vec!["Fig1", "Fig2", "Tab2A"]
    }

    fn simulations(&self) -> BTreeMap<String, Simulation> {
        DOSES
            .iter()
            .map(|(intervention, dose)| {
                let sim = TimecourseSim::new(vec![Timecourse::new(
                    0.0,
                    hours(50.0),
                    500,
                    Changes::new()
                        .with("BW", kg(BODYWEIGHT))
                        .with("PODOSE_edo", mg(*dose)),
                )]);
                (format!("po_{}", intervention), sim.into())
            })
            .collect()
    }

    fn fit_mappings(&self) -> BTreeMap<String, FitMapping> {
        let mut mappings = BTreeMap::new();
        for (intervention, _) in DOSES {
            let task = task_id(&format!("po_{}", intervention));
            // urinary recovery keeps the plasma classification of the study
            for (sid, name) in INFOS_PK.iter().chain(INFOS_PD.iter()) {
                mappings.insert(
                    format!("fm_po_{}_{}", intervention, name),
                    FitMapping::new(
                        &format!("{}_{}", name, intervention),
                        &task,
                        sid,
                        MappingMetaData::new(Tissue::Plasma, Fasting::Fasted),
                    ),
                );
            }
        }
        mappings
    }
}
