use std::collections::BTreeMap;

use super::{hours, kg, mg};
use crate::experiments::metadata::{Dosing, Fasting, MappingMetaData, Tissue};
use crate::experiments::{task_id, SimulationExperiment};
use crate::fitting::mapping::FitMapping;
use crate::simulator::{Changes, Simulation, Timecourse, TimecourseSim};

/// Once daily 60 mg for eight days
#[derive(Debug, Clone, Copy, Default)]
pub struct Chen2017a;

const INTERVENTION: &str = "mED60";
const DOSE: f64 = 60.0;
const INFOS_PK: [(&str, &str); 2] = [("[Cve_edo]", "edoxaban"), ("[Cve_m4]", "M4")];

impl SimulationExperiment for Chen2017a {
    fn sid(&self) -> &'static str {
        "Chen2017a"
    }

    fn dataset_tables(&self) -> Vec<&'static str> {
        vec!["Fig1"]
    }

    fn simulations(&self) -> BTreeMap<String, Simulation> {
        let dose = || Changes::new().with("PODOSE_edo", mg(DOSE));
        let mut timecourses = vec![Timecourse::new(
            0.0,
            hours(48.0),
            500,
            dose().with("BW", kg(61.8)),
        )];
        timecourses.extend((0..6).map(|_| Timecourse::new(0.0, hours(24.0), 500, dose())));
        timecourses.push(Timecourse::new(0.0, hours(50.0), 500, dose()));
        BTreeMap::from([(
            INTERVENTION.to_string(),
            TimecourseSim::new(timecourses).into(),
        )])
    }

    fn fit_mappings(&self) -> BTreeMap<String, FitMapping> {
        INFOS_PK
            .iter()
            .map(|(sid, name)| {
                (
                    format!("fm_{}_{}", name, INTERVENTION),
                    FitMapping::new(
                        &format!("{}_{}", name, INTERVENTION),
                        &task_id(INTERVENTION),
                        sid,
                        MappingMetaData::new(Tissue::Plasma, Fasting::NotReported)
                            .with_dosing(Dosing::Multiple),
                    ),
                )
            })
            .collect()
    }
}
