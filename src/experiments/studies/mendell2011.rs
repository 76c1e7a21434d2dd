use std::collections::BTreeMap;

use super::{hours, kg, mg, seconds};
use crate::experiments::metadata::{Fasting, MappingMetaData, Tissue};
use crate::experiments::{fasting_map, task_id, SimulationExperiment};
use crate::fitting::mapping::FitMapping;
use crate::routines::units::Quantity;
use crate::simulator::{Changes, Simulation, Timecourse, TimecourseSim};

/// Food effect in Japanese and Caucasian subjects after 60 mg
#[derive(Debug, Clone, Copy, Default)]
pub struct Mendell2011;

struct Group {
    key: &'static str,
    bodyweight: f64,
    pt: f64,
    aptt: f64,
}

const GROUPS: [Group; 4] = [
    Group { key: "japanFed", bodyweight: 67.2, pt: 12.4, aptt: 34.8 },
    Group { key: "caucasFed", bodyweight: 75.6, pt: 12.5, aptt: 37.4 },
    Group { key: "japanFast", bodyweight: 67.2, pt: 12.8, aptt: 35.5 },
    Group { key: "caucasFast", bodyweight: 75.6, pt: 12.5, aptt: 33.7 },
];

const INFOS_PK: [(&str, &str); 2] = [("[Cve_edo]", "edoxaban"), ("Aurine_edo", "edoxaban_urine")];
const INFOS_PD: [(&str, &str); 2] = [("aPTT", "aPTT"), ("PT", "PT")];

fn fasting(group: &str) -> Fasting {
    if group.contains("Fed") {
        Fasting::Fed
    } else {
        Fasting::Fasted
    }
}

impl SimulationExperiment for Mendell2011 {
    fn sid(&self) -> &'static str {
        "Mendell2011"
    }

    fn dataset_tables(&self) -> Vec<&'static str> {
        vec!["Fig1", "Fig2", "Fig3", "Tab4A"]
    }

    fn simulations(&self) -> BTreeMap<String, Simulation> {
        GROUPS
            .iter()
            .map(|group| {
                let sim = TimecourseSim::new(vec![Timecourse::new(
                    0.0,
                    hours(25.0),
                    500,
                    Changes::new()
                        .with("BW", kg(group.bodyweight))
                        .with("PODOSE_edo", mg(60.0))
                        .with(
                            "GU__F_edo_abs",
                            Quantity::dimensionless(fasting_map(fasting(group.key))),
                        )
                        .with("PT_ref", seconds(group.pt))
                        .with("aPTT_ref", seconds(group.aptt)),
                )]);
                (group.key.to_string(), sim.into())
            })
            .collect()
    }

    fn fit_mappings(&self) -> BTreeMap<String, FitMapping> {
        let mut mappings = BTreeMap::new();
        for group in GROUPS.iter() {
            let task = task_id(group.key);
            for (sid, name) in INFOS_PK {
                let urine = name.contains("urine");
                let tissue = if urine { Tissue::Urine } else { Tissue::Plasma };
                let mapping = FitMapping::new(
                    &format!("{}_{}", name, group.key),
                    &task,
                    sid,
                    MappingMetaData::new(tissue, fasting(group.key)),
                );
                let mapping = if urine { mapping } else { mapping.without_sd() };
                mappings.insert(format!("fm_{}_{}", name, group.key), mapping);
            }
            for (sid, name) in INFOS_PD {
                mappings.insert(
                    format!("fm_{}_{}", group.key, name),
                    FitMapping::new(
                        &format!("{}_{}", name, group.key),
                        &task,
                        sid,
                        MappingMetaData::new(Tissue::Plasma, fasting(group.key)),
                    )
                    .without_sd(),
                );
            }
        }
        mappings
    }
}
