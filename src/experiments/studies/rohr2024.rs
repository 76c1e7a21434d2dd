use std::collections::BTreeMap;

use super::{hours, mg};
use crate::experiments::metadata::{Coadministration, Dosing, Fasting, MappingMetaData, Tissue};
use crate::experiments::{task_id, SimulationExperiment};
use crate::fitting::mapping::FitMapping;
use crate::model::Substance;
use crate::simulator::{Changes, Simulation, Timecourse, TimecourseSim};

/// Microdosed factor Xa inhibitor cocktail with and without ritonavir
#[derive(Debug, Clone, Copy, Default)]
pub struct Rohr2024;

const INTERVENTIONS: [&str; 2] = ["API25, RIV25, EDO50, RITx5", "API25, RIV25, EDO50"];
// 50 µg edoxaban
const DOSE: f64 = 0.050;
const INFOS_PK: [(&str, &str); 2] = [("[Cve_edo]", "edoxaban"), ("Aurine_edo", "edoxaban_urine")];

impl SimulationExperiment for Rohr2024 {
    fn sid(&self) -> &'static str {
        "Rohr2024"
    }

    fn dataset_tables(&self) -> Vec<&'static str> {
        vec!["Fig2", "Tab1A"]
    }

    fn substance_for_dataset(&self, _table: &str, label: &str) -> Option<Substance> {
        if label.starts_with("edoxaban") && !label.contains("urine") {
            Some(Substance::Edo)
        } else {
            None
        }
    }

    fn simulations(&self) -> BTreeMap<String, Simulation> {
        INTERVENTIONS
            .iter()
            .map(|intervention| {
                let sim = TimecourseSim::new(vec![Timecourse::new(
                    0.0,
                    hours(30.0),
                    500,
                    Changes::new().with("PODOSE_edo", mg(DOSE)),
                )]);
                (intervention.to_string(), sim.into())
            })
            .collect()
    }

    fn fit_mappings(&self) -> BTreeMap<String, FitMapping> {
        let mut mappings = BTreeMap::new();
        for intervention in INTERVENTIONS {
            let coadministration = if intervention.contains("RIT") {
                Coadministration::Ritonavir
            } else {
                Coadministration::None
            };
            for (sid, name) in INFOS_PK {
                let tissue = if name.contains("urine") { Tissue::Urine } else { Tissue::Plasma };
                mappings.insert(
                    format!("fm_{}_{}", name, intervention),
                    FitMapping::new(
                        &format!("{}_{}", name, intervention),
                        &task_id(intervention),
                        sid,
                        MappingMetaData::new(tissue, Fasting::Fasted)
                            .with_dosing(Dosing::Multiple)
                            .with_coadministration(coadministration),
                    ),
                );
            }
        }
        mappings
    }
}
