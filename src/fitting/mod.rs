//! Parameter estimation against the clinical datasets of the studies
pub mod mapping;
pub mod optimizer;
pub mod problem;

use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{EdoxabanError, Result};
use crate::experiments::metadata::{Coadministration, Dosing, Health, Route};
use crate::experiments::registry;
use crate::experiments::SimulationExperiment;
use mapping::FitMapping;

pub use optimizer::{FitResult, FitRun, Optimizer};
pub use problem::{OptimizationProblem, ResidualKind, WeightingCurves, WeightingPoints};

/// A bounded model parameter to estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitParameter {
    pub pid: String,
    pub lower_bound: f64,
    pub start_value: f64,
    pub upper_bound: f64,
    pub unit: String,
}

impl FitParameter {
    pub fn new(pid: &str, lower_bound: f64, start_value: f64, upper_bound: f64, unit: &str) -> Self {
        FitParameter {
            pid: pid.to_string(),
            lower_bound,
            start_value,
            upper_bound,
            unit: unit.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if crate::model::parameters::info(&self.pid).is_none() {
            return Err(EdoxabanError::UnknownSymbol(self.pid.clone()));
        }
        if !(self.lower_bound < self.upper_bound) {
            return Err(EdoxabanError::InvalidFit(format!(
                "`{}`: lower bound {} must be smaller than upper bound {}",
                self.pid, self.lower_bound, self.upper_bound
            )));
        }
        if self.start_value < self.lower_bound || self.start_value > self.upper_bound {
            return Err(EdoxabanError::InvalidFit(format!(
                "`{}`: start value {} outside of [{}, {}]",
                self.pid, self.start_value, self.lower_bound, self.upper_bound
            )));
        }
        Ok(())
    }
}

impl fmt::Display for FitParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} [{}, {}] {}",
            self.pid, self.start_value, self.lower_bound, self.upper_bound, self.unit
        )
    }
}

pub fn parameters_pharmacokinetics() -> Vec<FitParameter> {
    vec![
        // dissolution and absorption
        FitParameter::new("GU__Ka_dis_edo", 1e-3, 2.0, 100.0, "1/hr"),
        FitParameter::new("GU__EDOABS_k", 0.001, 0.1, 10.0, "1/min"),
        // hepatic metabolism
        FitParameter::new("LI__EDO2M4_Vmax", 1e-4, 1e-3, 10.0, "1/min"),
        FitParameter::new("LI__EDO2M6_f", 0.2, 55.1 / 145.5, 0.5, "dimensionless"),
        FitParameter::new("LI__EDO2MX_f", 2.0, 5.5, 10.0, "dimensionless"),
        FitParameter::new("LI__MXEXBI_k", 1e-6, 1e-4, 1e-4, "1/min"),
        // renal excretion
        FitParameter::new("KI__EDOEX_k", 1e-4, 1.0, 10.0, "1/min"),
        FitParameter::new("KI__M4EX_k", 1e-4, 1.0, 10.0, "1/min"),
        FitParameter::new("KI__M6EX_k", 1e-4, 1.0, 10.0, "1/min"),
        FitParameter::new("KI__MXEX_k", 1e-4, 1.0, 10.0, "1/min"),
    ]
}

pub fn parameters_pharmacodynamics() -> Vec<FitParameter> {
    vec![
        FitParameter::new("Emax_PT", 0.1, 1.0, 10.0, "dimensionless"),
        FitParameter::new("EC50_edo_PT", 1e-7, 0.00034, 1e-2, "mM"),
        FitParameter::new("Emax_aPTT", 0.1, 1.0, 10.0, "dimensionless"),
        FitParameter::new("EC50_edo_aPTT", 1e-7, 0.00034, 1e-2, "mM"),
    ]
}

pub fn parameters_all() -> Vec<FitParameter> {
    let mut parameters = parameters_pharmacokinetics();
    parameters.extend(parameters_pharmacodynamics());
    parameters
}

/// Parameter group by name: `pharmacokinetics`, `pharmacodynamics` or `all`
pub fn parameter_group(name: &str) -> Result<Vec<FitParameter>> {
    match name {
        "pharmacokinetics" => Ok(parameters_pharmacokinetics()),
        "pharmacodynamics" => Ok(parameters_pharmacodynamics()),
        "all" => Ok(parameters_all()),
        _ => Err(EdoxabanError::InvalidFit(format!(
            "unknown parameter group `{}`, expected one of: pharmacokinetics, pharmacodynamics, all",
            name
        ))),
    }
}

/// Predicate selecting the mappings that take part in a fit
pub type MetadataFilter = fn(&str, &FitMapping) -> bool;

const PK_OBSERVABLES: [&str; 15] = [
    "Cve_edo",
    "Cve_m4",
    "Cve_m6",
    "Cve_mx",
    "Cve_edo_total",
    "Aurine_edo",
    "Aurine_m4",
    "Aurine_m6",
    "Aurine_mx",
    "Aurine_edo_total",
    "Afeces_edo",
    "Afeces_m4",
    "Afeces_m6",
    "Afeces_mx",
    "Afeces_edo_total",
];

const PD_OBSERVABLES: [&str; 7] = [
    "PT",
    "PT_change",
    "PT_ratio",
    "aPTT",
    "aPTT_change",
    "aPTT_ratio",
    "Xa_inhibition",
];

/// Mappings of the reference population
///
/// Oral or intravenous single doses in healthy (or T2DM, hypertensive) subjects
/// without co-administered drugs; outliers are removed.
pub fn filter_baseline(_key: &str, mapping: &FitMapping) -> bool {
    let metadata = &mapping.metadata;
    matches!(metadata.route, Route::Po | Route::Iv)
        && metadata.coadministration == Coadministration::None
        && matches!(metadata.health, Health::Healthy | Health::T2dm | Health::Hypertension)
        && metadata.dosing != Dosing::Multiple
        && !metadata.outlier
}

/// Plasma, urine and feces amounts of edoxaban and its metabolites, with the `_edo_total` sums
pub fn filter_pharmacokinetics(_key: &str, mapping: &FitMapping) -> bool {
    PK_OBSERVABLES.contains(&mapping.observable_sid())
}

/// Coagulation readouts
pub fn filter_pharmacodynamics(_key: &str, mapping: &FitMapping) -> bool {
    PD_OBSERVABLES.contains(&mapping.observable_sid())
}

/// An experiment together with the mappings selected for a fit
#[derive(Clone)]
pub struct FitExperiment {
    pub experiment: Arc<dyn SimulationExperiment>,
    pub mappings: BTreeMap<String, FitMapping>,
    /// Relative weight of the experiment in the cost
    pub weight: f64,
}

impl fmt::Debug for FitExperiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FitExperiment")
            .field("experiment", &self.experiment.sid())
            .field("mappings", &self.mappings.keys().collect::<Vec<_>>())
            .field("weight", &self.weight)
            .finish()
    }
}

/// Select the mappings passing all filters; experiments without mappings are dropped
pub fn f_fitexp(
    experiments: Vec<Arc<dyn SimulationExperiment>>,
    filters: &[MetadataFilter],
) -> Vec<FitExperiment> {
    experiments
        .into_iter()
        .filter_map(|experiment| {
            let mappings: BTreeMap<String, FitMapping> = experiment
                .fit_mappings()
                .into_iter()
                .filter(|(key, mapping)| filters.iter().all(|f| f(key, mapping)))
                .collect();
            if mappings.is_empty() {
                tracing::debug!("{}: no mappings after filtering", experiment.sid());
                None
            } else {
                Some(FitExperiment {
                    experiment,
                    mappings,
                    weight: 1.0,
                })
            }
        })
        .collect()
}

/// All mappings of all studies
pub fn f_fitexp_all() -> Vec<FitExperiment> {
    f_fitexp(registry::studies(), &[])
}

/// Mappings of the reference population
pub fn f_fitexp_control() -> Vec<FitExperiment> {
    f_fitexp(registry::studies(), &[filter_baseline])
}

pub fn f_fitexp_pharmacokinetics() -> Vec<FitExperiment> {
    f_fitexp(registry::studies(), &[filter_baseline, filter_pharmacokinetics])
}

pub fn f_fitexp_pharmacodynamics() -> Vec<FitExperiment> {
    f_fitexp(registry::studies(), &[filter_baseline, filter_pharmacodynamics])
}

/// Fit experiments by filter name: `all`, `control`, `pharmacokinetics` or `pharmacodynamics`
pub fn fit_experiments(filter: &str) -> Result<Vec<FitExperiment>> {
    match filter {
        "all" => Ok(f_fitexp_all()),
        "control" => Ok(f_fitexp_control()),
        "pharmacokinetics" => Ok(f_fitexp_pharmacokinetics()),
        "pharmacodynamics" => Ok(f_fitexp_pharmacodynamics()),
        _ => Err(EdoxabanError::InvalidFit(format!(
            "unknown filter `{}`, expected one of: all, control, pharmacokinetics, pharmacodynamics",
            filter
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiments::metadata::{Fasting, MappingMetaData, Tissue};

    fn mapping(yid: &str, metadata: MappingMetaData) -> FitMapping {
        FitMapping::new("edoxaban_ED60", "task_ED60", yid, metadata)
    }

    #[test]
    fn test_parameter_groups_are_valid() {
        for parameter in parameters_all() {
            parameter.validate().unwrap();
        }
        assert_eq!(parameters_all().len(), 14);
        assert!(parameter_group("metabolism").is_err());
    }

    #[test]
    fn test_baseline_filter() {
        let meta = MappingMetaData::new(Tissue::Plasma, Fasting::Fasted);
        assert!(filter_baseline("fm", &mapping("[Cve_edo]", meta)));
        assert!(!filter_baseline(
            "fm",
            &mapping("[Cve_edo]", meta.with_coadministration(Coadministration::Ritonavir))
        ));
        assert!(!filter_baseline("fm", &mapping("[Cve_edo]", meta.with_dosing(Dosing::Multiple))));
        assert!(!filter_baseline("fm", &mapping("[Cve_edo]", meta.with_health(Health::RenalImpairment))));
        assert!(!filter_baseline("fm", &mapping("[Cve_edo]", meta.as_outlier())));
        assert!(filter_baseline("fm", &mapping("[Cve_edo]", meta.with_health(Health::T2dm))));
    }

    #[test]
    fn test_observable_filters() {
        let meta = MappingMetaData::new(Tissue::Plasma, Fasting::Fasted);
        assert!(filter_pharmacokinetics("fm", &mapping("[Cve_m4]", meta)));
        assert!(filter_pharmacokinetics("fm", &mapping("Aurine_edo_total", meta)));
        assert!(filter_pharmacokinetics("fm", &mapping("[Cve_edo_total]", meta)));
        assert!(filter_pharmacokinetics("fm", &mapping("Afeces_edo_total", meta)));
        assert!(!filter_pharmacokinetics("fm", &mapping("PT_change", meta)));
        assert!(filter_pharmacodynamics("fm", &mapping("PT_change", meta)));
        assert!(!filter_pharmacodynamics("fm", &mapping("[Cve_edo]", meta)));
    }

    #[test]
    fn test_fitexp_drops_empty_experiments() {
        let all = f_fitexp_all();
        let pd = f_fitexp_pharmacodynamics();
        // Bathala2012 and Rohr2024 report pharmacokinetics only
        assert!(pd.len() < all.len());
        assert!(pd
            .iter()
            .flat_map(|fe| fe.mappings.values())
            .all(|m| filter_pharmacodynamics("", m) && filter_baseline("", m)));
        assert!(pd
            .iter()
            .all(|fe| fe.experiment.sid() != "Rohr2024" && fe.experiment.sid() != "Bathala2012"));
    }
}
