use std::collections::BTreeMap;

use super::{hours, kg, mg};
use crate::experiments::metadata::{Fasting, MappingMetaData, Tissue};
use crate::experiments::{task_id, SimulationExperiment};
use crate::fitting::mapping::FitMapping;
use crate::model::Substance;
use crate::simulator::{Changes, Simulation, Timecourse, TimecourseSim};

/// Mass balance of a single oral 60 mg dose of [14C]-edoxaban
#[derive(Debug, Clone, Copy, Default)]
pub struct Bathala2012;

const INTERVENTION: &str = "ED60";

const INFOS_PK: [(&str, Option<&str>); 12] = [
    ("[Cve_edo]", Some("edoxaban")),
    ("[Cve_m4]", Some("M4")),
    ("[Cve_m6]", Some("M6")),
    ("[Cve_edo_total]", None),
    ("Aurine_edo", Some("edoxaban_urine")),
    ("Aurine_m4", Some("M4_urine")),
    ("Aurine_m6", Some("M6_urine")),
    ("Aurine_edo_total", Some("edoxaban_metabolites_urine")),
    ("Afeces_edo", Some("edoxaban_feces")),
    ("Afeces_m4", Some("M4_feces")),
    ("Afeces_m6", Some("M6_feces")),
    ("Afeces_edo_total", Some("edoxaban_metabolites_feces")),
];

impl SimulationExperiment for Bathala2012 {
    fn sid(&self) -> &'static str {
        "Bathala2012"
    }

    fn dataset_tables(&self) -> Vec<&'static str> {
        vec!["Fig2", "Fig3", "Tab2A"]
    }

    // only the plasma figure reports masses
    fn substance_for_dataset(&self, table: &str, label: &str) -> Option<Substance> {
        if table != "Fig3" {
            return None;
        }
        if label.starts_with("edoxaban") {
            Some(Substance::Edo)
        } else if label.starts_with("M4_") {
            Some(Substance::M4)
        } else if label.starts_with("M6_") {
            Some(Substance::M6)
        } else {
            None
        }
    }

    fn simulations(&self) -> BTreeMap<String, Simulation> {
        let sim = TimecourseSim::new(vec![Timecourse::new(
            0.0,
            hours(170.0),
            2000,
            Changes::new().with("BW", kg(85.0)).with("PODOSE_edo", mg(60.0)),
        )]);
        BTreeMap::from([(INTERVENTION.to_string(), sim.into())])
    }

    fn fit_mappings(&self) -> BTreeMap<String, FitMapping> {
        let mut mappings = BTreeMap::new();
        for (sid, name) in INFOS_PK {
            let Some(name) = name else { continue };
            let tissue = if name.contains("urine") {
                Tissue::Urine
            } else if name.contains("feces") {
                Tissue::Feces
            } else {
                Tissue::Plasma
            };
            mappings.insert(
                format!("fm_{}_{}", name, INTERVENTION),
                FitMapping::new(
                    &format!("{}_{}", name, INTERVENTION),
                    &task_id(INTERVENTION),
                    sid,
                    MappingMetaData::new(tissue, Fasting::Fasted),
                ),
            );
        }
        mappings
    }
}
