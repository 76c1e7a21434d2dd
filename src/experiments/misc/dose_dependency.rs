use std::collections::BTreeMap;

use crate::experiments::studies::{hours, mg};
use crate::experiments::SimulationExperiment;
use crate::model::Substance;
use crate::routines::units::Quantity;
use crate::simulator::{Changes, Simulation, Timecourse, TimecourseSim};

/// Oral and intravenous doses from 0 to 160 mg, once or on seven consecutive days
#[derive(Debug, Clone, Copy, Default)]
pub struct DoseDependencyExperiment;

impl DoseDependencyExperiment {
    pub const DOSES: [f64; 5] = [0.0, 20.0, 40.0, 80.0, 160.0];
    pub const ROUTES: [&'static str; 2] = ["IV", "PO"];
    pub const DOSING: [&'static str; 2] = ["single", "multiple"];
    const DAYS: usize = 7;

    pub fn simulation_key(route: &str, dose: f64, dosing: &str) -> String {
        format!("edo_{}_{}_{}", route, dose, dosing)
    }
}

/// Empty urine and feces collections at the start of a dosing day
fn collection_reset() -> Changes {
    let mut changes = Changes::new();
    for compartment in ["Aurine", "Afeces"] {
        for substance in Substance::ALL {
            changes.insert(
                &format!("{}_{}", compartment, substance.suffix()),
                Quantity::new(0.0, "mmole"),
            );
        }
    }
    changes
}

impl SimulationExperiment for DoseDependencyExperiment {
    fn sid(&self) -> &'static str {
        "DoseDependencyExperiment"
    }

    fn simulations(&self) -> BTreeMap<String, Simulation> {
        let mut simulations = BTreeMap::new();
        for route in Self::ROUTES {
            let dose_sid = format!("{}DOSE_edo", route);
            for dose in Self::DOSES {
                for dosing in Self::DOSING {
                    let day = |changes: Changes| {
                        Timecourse::new(0.0, hours(24.0), 1000, changes.with(&dose_sid, mg(dose)))
                    };
                    let mut timecourses = vec![day(Changes::new())];
                    if dosing == "multiple" {
                        timecourses.extend((1..Self::DAYS).map(|_| day(collection_reset())));
                    }
                    simulations.insert(
                        Self::simulation_key(route, dose, dosing),
                        TimecourseSim::new(timecourses).into(),
                    );
                }
            }
        }
        simulations
    }
}
