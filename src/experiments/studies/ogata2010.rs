use std::collections::BTreeMap;

use super::{hours, kg, mg, seconds};
use crate::experiments::metadata::{Dosing, Fasting, MappingMetaData, Tissue};
use crate::experiments::{task_id, SimulationExperiment};
use crate::fitting::mapping::FitMapping;
use crate::simulator::{Changes, Simulation, Timecourse, TimecourseSim};

/// Single ascending doses (10 to 150 mg) and ten days of once daily dosing in Japanese subjects
#[derive(Debug, Clone, Copy, Default)]
pub struct Ogata2010;

const BODYWEIGHT: f64 = 59.3;

struct Intervention {
    key: &'static str,
    dose: f64,
    pt: f64,
    aptt: f64,
}

const INTERVENTIONS: [Intervention; 10] = [
    Intervention { key: "placebo", dose: 0.0, pt: 13.77, aptt: 19.3 },
    Intervention { key: "ED10", dose: 10.0, pt: 14.15, aptt: 19.7 },
    Intervention { key: "ED30", dose: 30.0, pt: 13.96, aptt: 22.9 },
    Intervention { key: "ED60", dose: 60.0, pt: 13.77, aptt: 21.9 },
    Intervention { key: "ED90", dose: 90.0, pt: 13.21, aptt: 23.8 },
    Intervention { key: "ED120", dose: 120.0, pt: 15.28, aptt: 21.9 },
    Intervention { key: "ED150", dose: 150.0, pt: 15.47, aptt: 23.2 },
    Intervention { key: "mED60", dose: 60.0, pt: 14.0, aptt: 33.0 },
    Intervention { key: "mED90", dose: 90.0, pt: 14.0, aptt: 33.0 },
    Intervention { key: "mED120", dose: 120.0, pt: 14.0, aptt: 33.0 },
];

const INFOS_PK: [(&str, &str); 2] = [("[Cve_edo]", "edoxaban"), ("Aurine_edo", "edoxaban_urine")];
const INFOS_PD: [(&str, &str); 2] = [("aPTT", "aPTT"), ("PT", "PT")];

impl Intervention {
    fn multiple(&self) -> bool {
        self.key.starts_with('m')
    }

    fn dosing(&self) -> Dosing {
        if self.multiple() {
            Dosing::Multiple
        } else {
            Dosing::Single
        }
    }

    fn simulation(&self) -> TimecourseSim {
        let dose = || Changes::new().with("PODOSE_edo", mg(self.dose));
        let first = dose()
            .with("BW", kg(BODYWEIGHT))
            .with("PT_ref", seconds(self.pt))
            .with("aPTT_ref", seconds(self.aptt));

        if !self.multiple() {
            return TimecourseSim::new(vec![Timecourse::new(0.0, hours(50.0), 1000, first)]);
        }
        let mut timecourses = vec![Timecourse::new(0.0, hours(48.0), 1000, first)];
        timecourses.extend((0..7).map(|_| Timecourse::new(0.0, hours(24.0), 500, dose())));
        timecourses.push(Timecourse::new(0.0, hours(50.0), 1000, dose()));
        TimecourseSim::new(timecourses)
    }
}

impl SimulationExperiment for Ogata2010 {
    fn sid(&self) -> &'static str {
        "Ogata2010"
    }

    fn dataset_tables(&self) -> Vec<&'static str> {
        vec!["Fig1", "Fig2", "Fig3", "Fig4", "Tab1A"]
    }

    fn simulations(&self) -> BTreeMap<String, Simulation> {
        INTERVENTIONS
            .iter()
            .map(|intervention| (intervention.key.to_string(), intervention.simulation().into()))
            .collect()
    }

    fn fit_mappings(&self) -> BTreeMap<String, FitMapping> {
        let mut mappings = BTreeMap::new();
        for intervention in INTERVENTIONS.iter() {
            let task = task_id(intervention.key);
            for (sid, name) in INFOS_PK {
                let urine = name.contains("urine");
                // no pharmacokinetics for placebo, no urine collection for multiple dosing
                if intervention.key == "placebo" || (urine && intervention.multiple()) {
                    continue;
                }
                let tissue = if urine { Tissue::Urine } else { Tissue::Plasma };
                let mapping = FitMapping::new(
                    &format!("{}_{}", name, intervention.key),
                    &task,
                    sid,
                    MappingMetaData::new(tissue, Fasting::Fasted).with_dosing(intervention.dosing()),
                );
                let mapping = if urine { mapping } else { mapping.without_sd() };
                mappings.insert(format!("fm_{}_{}", name, intervention.key), mapping);
            }
            for (sid, name) in INFOS_PD {
                mappings.insert(
                    format!("fm_{}_{}", intervention.key, name),
                    FitMapping::new(
                        &format!("{}_{}", name, intervention.key),
                        &task,
                        sid,
                        MappingMetaData::new(Tissue::Plasma, Fasting::Fasted)
                            .with_dosing(intervention.dosing()),
                    ),
                );
            }
        }
        mappings
    }
}
