//! Simulation experiments reproducing clinical edoxaban studies
pub mod data;
pub mod metadata;
pub mod misc;
pub mod registry;
pub mod scans;
pub mod studies;

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::{EdoxabanError, Result};
use crate::fitting::mapping::FitMapping;
use crate::model::{ModelKind, Substance};
use crate::routines::units::Quantity;
use crate::simulator::{Changes, Simulation, SimulationResult, Simulator};
use data::{DataSet, DataSource};
use metadata::Fasting;

/// Datasets of one experiment keyed by label
pub type Datasets = BTreeMap<String, DataSet>;

/// A reproducible simulation protocol with its data and fit mappings
pub trait SimulationExperiment: Send + Sync {
    /// Identifier, also the prefix of the data tables
    fn sid(&self) -> &'static str;

    fn model(&self) -> ModelKind {
        ModelKind::Body
    }

    /// Data tables (figure or table ids) of the study
    fn dataset_tables(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Substance whose molecular weight converts a dataset to amounts, `None` keeps it unchanged
    fn substance_for_dataset(&self, _table: &str, label: &str) -> Option<Substance> {
        data::substance_for_label(label)
    }

    /// Simulations keyed by simulation id
    fn simulations(&self) -> BTreeMap<String, Simulation>;

    fn fit_mappings(&self) -> BTreeMap<String, FitMapping> {
        BTreeMap::new()
    }

    /// Changes applied to every simulation below the protocol changes
    fn default_changes(&self) -> Changes {
        default_changes()
    }

    /// Simulations with default changes, keyed by task id
    fn tasks(&self) -> BTreeMap<String, Simulation> {
        let defaults = self.default_changes();
        self.simulations()
            .into_iter()
            .map(|(key, sim)| (task_id(&key), sim.with_base_changes(&defaults)))
            .collect()
    }
}

/// Task id of a simulation
pub fn task_id(simulation: &str) -> String {
    format!("task_{}", simulation)
}

/// Fraction of edoxaban absorbed depending on the fasting state
pub fn fasting_map(fasting: Fasting) -> f64 {
    match fasting {
        Fasting::NotReported | Fasting::Fasted => 0.82,
        Fasting::Fed => 1.0,
    }
}

/// Renal function relative to normal for an impairment class
pub fn renal_map(class: &str) -> Option<f64> {
    match class {
        "Normal renal function" | "Normal" => Some(101.0 / 101.0),
        "Mild renal impairment" | "Mild" => Some(50.0 / 101.0),
        "Moderate renal impairment" | "Moderate" => Some(35.0 / 101.0),
        "Severe renal impairment" | "Severe" => Some(20.0 / 101.0),
        _ => None,
    }
}

/// Degree of cirrhosis for a Child-Pugh class
pub fn cirrhosis_map(class: &str) -> Option<f64> {
    match class {
        "Control" => Some(0.0),
        "Mild cirrhosis" | "Mild" => Some(0.3994897959183674),
        "Moderate cirrhosis" | "Moderate" => Some(0.6979591836734694),
        "Severe cirrhosis" | "Severe" => Some(0.8127551020408164),
        _ => None,
    }
}

/// Changes for a renal function class and a cirrhosis class
pub fn impairment_changes(renal: Option<&str>, cirrhosis: Option<&str>) -> Result<Changes> {
    let mut changes = Changes::new();
    if let Some(class) = renal {
        let value = renal_map(class).ok_or_else(|| EdoxabanError::UnknownClass(class.to_string()))?;
        changes.insert("KI__f_renal_function", Quantity::dimensionless(value));
    }
    if let Some(class) = cirrhosis {
        let value = cirrhosis_map(class).ok_or_else(|| EdoxabanError::UnknownClass(class.to_string()))?;
        changes.insert("f_cirrhosis", Quantity::dimensionless(value));
    }
    Ok(changes)
}

/// Parameter set from the reference fit
pub fn default_changes() -> Changes {
    Changes::new()
        .with("GU__Ka_dis_edo", Quantity::new(0.3559517961123874, "1/hr"))
        .with("GU__EDOABS_k", Quantity::new(0.021312888266795352, "1/min"))
        .with("LI__EDO2M4_Vmax", Quantity::new(0.02467742534326666, "1/min"))
        .with("LI__EDO2M6_f", Quantity::dimensionless(0.20000000005912993))
        .with("LI__EDO2MX_f", Quantity::dimensionless(9.999946086529825))
        .with("LI__MXEXBI_k", Quantity::new(9.999998121216769e-05, "1/min"))
        .with("KI__EDOEX_k", Quantity::new(1.5766419182037374, "1/min"))
        .with("KI__M4EX_k", Quantity::new(1.7146667975857133, "1/min"))
        .with("KI__M6EX_k", Quantity::new(0.5765035347258279, "1/min"))
        .with("KI__MXEX_k", Quantity::new(2.8819072042706586, "1/min"))
        .with("Emax_PT", Quantity::dimensionless(3.6762994520462455))
        .with("EC50_edo_PT", Quantity::new(0.0027062726583800974, "mM"))
        .with("Emax_aPTT", Quantity::dimensionless(1.9397792689345885))
        .with("EC50_edo_aPTT", Quantity::new(0.0008459875594125807, "mM"))
}

/// Display label and unit of a model output
pub fn display(sid: &str) -> Option<(&'static str, &'static str)> {
    let info = match sid {
        "time" => ("time", "hr"),
        "[Cve_edo]" => ("edoxaban (plasma)", "nM"),
        "[Cve_m4]" => ("M4 (plasma)", "nM"),
        "[Cve_m6]" => ("M6 (plasma)", "nM"),
        "[Cve_mx]" => ("Mx (plasma)", "nM"),
        "[Cve_edo_total]" => ("edoxaban + metabolites (plasma)", "nM"),
        "Aurine_edo" => ("edoxaban (urine)", "µmole"),
        "Aurine_m4" => ("M4 (urine)", "µmole"),
        "Aurine_m6" => ("M6 (urine)", "µmole"),
        "Aurine_mx" => ("Mx (urine)", "µmole"),
        "Aurine_edo_total" => ("edoxaban + metabolites (urine)", "µmole"),
        "Afeces_edo" => ("edoxaban (feces)", "µmole"),
        "Afeces_m4" => ("M4 (feces)", "µmole"),
        "Afeces_m6" => ("M6 (feces)", "µmole"),
        "Afeces_mx" => ("Mx (feces)", "µmole"),
        "Afeces_edo_total" => ("edoxaban + metabolites (feces)", "µmole"),
        "PT" => ("prothrombin time", "s"),
        "PT_change" => ("PT change", "s"),
        "PT_ratio" => ("PT ratio", "dimensionless"),
        "aPTT" => ("activated partial thromboplastin time", "s"),
        "aPTT_change" => ("aPTT change", "s"),
        "aPTT_ratio" => ("aPTT ratio", "dimensionless"),
        "Xa_inhibition" => ("factor Xa inhibition", "dimensionless"),
        "PODOSE_edo" => ("oral dose edoxaban", "mg"),
        "IVDOSE_edo" => ("iv dose edoxaban", "mg"),
        "KI__f_renal_function" => ("renal function", "dimensionless"),
        "KI__egfr" => ("eGFR", "ml/min"),
        "KI__crcl" => ("creatinine clearance", "ml/min"),
        "f_cirrhosis" => ("cirrhosis degree", "dimensionless"),
        "GU__F_edo_abs" => ("fraction absorbed", "dimensionless"),
        "BW" => ("bodyweight", "kg"),
        _ => return None,
    };
    Some(info)
}

/// Load all datasets of an experiment, converting masses with the substance molecular weight
pub fn load_datasets(experiment: &dyn SimulationExperiment, source: &DataSource) -> Result<Datasets> {
    let mut datasets = Datasets::new();
    for table in experiment.dataset_tables() {
        for (label, dataset) in source.read_table(experiment.sid(), table)? {
            let dataset = match experiment.substance_for_dataset(table, &label) {
                Some(substance) => dataset.mass_to_amount(data::molecular_weight(substance))?,
                None => dataset,
            };
            if datasets.insert(label.clone(), dataset).is_some() {
                tracing::warn!("{}: dataset `{}` defined in more than one table", experiment.sid(), label);
            }
        }
    }
    tracing::debug!("{}: loaded {} datasets", experiment.sid(), datasets.len());
    Ok(datasets)
}

/// Simulation results of one experiment keyed by task id
#[derive(Debug, Clone)]
pub struct ExperimentResult {
    pub sid: String,
    pub results: BTreeMap<String, SimulationResult>,
}

/// Run all tasks of an experiment, optionally with changes overriding the protocols
///
/// The model kind comes from the experiment, the tolerances from `simulator`.
pub fn run_experiment(
    experiment: &dyn SimulationExperiment,
    overrides: Option<&Changes>,
    simulator: &Simulator,
) -> Result<ExperimentResult> {
    let now = Instant::now();
    let simulator = Simulator::new(experiment.model()).with_tolerances(simulator.rtol, simulator.atol);
    let tasks: Vec<(String, Simulation)> = experiment.tasks().into_iter().collect();
    let results = tasks
        .into_par_iter()
        .map(|(task, sim)| {
            let sim = match overrides {
                Some(changes) => sim.with_overrides(changes),
                None => sim,
            };
            let result = simulator.run(&sim).map_err(|e| {
                tracing::error!("{}: {} failed: {}", experiment.sid(), task, e);
                e
            })?;
            Ok((task, result))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;
    tracing::info!(
        "{}: {} tasks simulated in {:.2?}",
        experiment.sid(),
        results.len(),
        now.elapsed()
    );
    Ok(ExperimentResult {
        sid: experiment.sid().to_string(),
        results,
    })
}

/// Check that every mapping refers to an existing task and output
pub fn validate_mappings(experiment: &dyn SimulationExperiment) -> Result<()> {
    let tasks = experiment.tasks();
    for (key, mapping) in experiment.fit_mappings() {
        if !tasks.contains_key(&mapping.observable.task) {
            return Err(EdoxabanError::MissingTask(format!(
                "{} (mapping `{}` of {})",
                mapping.observable.task,
                key,
                experiment.sid()
            )));
        }
        if crate::model::body::output_index(&mapping.observable.yid).is_none() {
            return Err(EdoxabanError::MissingOutput(mapping.observable.yid.clone()));
        }
    }
    Ok(())
}
