//! Least-squares problem over all selected mappings
use rayon::prelude::*;
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{FitExperiment, FitParameter};
use crate::error::{EdoxabanError, Result};
use crate::experiments::data::DataSource;
use crate::experiments::{load_datasets, Datasets, SimulationExperiment};
use crate::model::body::output_unit;
use crate::routines::units::Quantity;
use crate::simulator::{Changes, Simulation, Simulator, TimecourseResult};

/// How the difference between model and data is scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResidualKind {
    /// Difference in model units
    Absolute,
    /// Difference relative to the mean magnitude of the curve
    #[default]
    Normalized,
}

/// Weighting of the individual data points of a curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightingPoints {
    None,
    /// Divide by the standard deviation where it is reported and used
    #[default]
    Sd,
}

/// Weighting of whole curves against each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightingCurves {
    None,
    /// Every curve contributes equally regardless of its number of points
    #[default]
    Points,
    /// Curves weighted with the square root of the number of subjects
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProblemOptions {
    #[serde(default)]
    pub residual: ResidualKind,
    #[serde(default)]
    pub weighting_points: WeightingPoints,
    #[serde(default)]
    pub weighting_curves: WeightingCurves,
}

/// Reference data of one mapping in model units, ready for comparison
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedMapping {
    pub key: String,
    pub task: String,
    pub yid: String,
    /// Time in min
    pub time: Vec<f64>,
    pub values: Vec<f64>,
    /// Combined point and curve weight of every data point
    pub weights: Vec<f64>,
    /// Divisor of the residuals
    pub scale: f64,
}

impl PreparedMapping {
    fn new(
        key: &str,
        mapping: &super::mapping::FitMapping,
        datasets: &Datasets,
        experiment: &str,
        options: &ProblemOptions,
    ) -> Result<Option<PreparedMapping>> {
        let label = &mapping.reference.dataset;
        let dataset = datasets.get(label).ok_or_else(|| EdoxabanError::MissingDataset {
            table: experiment.to_string(),
            label: label.clone(),
        })?;
        let yid = &mapping.observable.yid;
        let unit = output_unit(yid).ok_or_else(|| EdoxabanError::MissingOutput(yid.clone()))?;
        let (values, sd) = dataset.values_in(unit)?;

        let mut points: Vec<(f64, f64, Option<f64>, Option<f64>)> = Vec::new();
        for i in 0..dataset.len() {
            if values[i].is_finite() && dataset.time[i].is_finite() {
                let sd = sd[i].filter(|s| mapping.reference.use_sd && s.is_finite() && *s > 0.0);
                points.push((dataset.time[i], values[i], sd, dataset.count[i]));
            }
        }
        if points.is_empty() {
            tracing::warn!("{}: mapping `{}` has no usable data points", experiment, key);
            return Ok(None);
        }

        let n = points.len() as f64;
        let scale = match options.residual {
            ResidualKind::Absolute => 1.0,
            ResidualKind::Normalized => {
                let mean = points.iter().map(|(_, y, _, _)| y.abs()).sum::<f64>() / n;
                if mean > 0.0 {
                    mean
                } else {
                    1.0
                }
            }
        };
        let curve_weight = match options.weighting_curves {
            WeightingCurves::None => 1.0,
            WeightingCurves::Points => 1.0 / n.sqrt(),
            WeightingCurves::Count => {
                let counts: Vec<f64> = points.iter().filter_map(|(_, _, _, c)| *c).collect();
                if counts.is_empty() {
                    1.0
                } else {
                    (counts.iter().sum::<f64>() / counts.len() as f64).sqrt()
                }
            }
        };
        let weights = points
            .iter()
            .map(|(_, _, sd, _)| {
                let point_weight = match (options.weighting_points, sd) {
                    // sd relative to the curve scale, so normalized and absolute agree
                    (WeightingPoints::Sd, Some(sd)) => scale / sd,
                    _ => 1.0,
                };
                point_weight * curve_weight
            })
            .collect();

        Ok(Some(PreparedMapping {
            key: key.to_string(),
            task: mapping.observable.task.clone(),
            yid: yid.clone(),
            time: points.iter().map(|p| p.0).collect(),
            values: points.iter().map(|p| p.1).collect(),
            weights,
            scale,
        }))
    }
}

/// One experiment of the problem with the tasks its mappings need
#[derive(Clone)]
pub struct ProblemExperiment {
    pub experiment: Arc<dyn SimulationExperiment>,
    pub tasks: BTreeMap<String, Simulation>,
    pub mappings: Vec<PreparedMapping>,
    pub weight: f64,
}

/// Weighted residual of one data point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Residual {
    pub experiment: String,
    pub mapping: String,
    pub yid: String,
    /// Time in min
    pub time: f64,
    pub data: f64,
    pub model: f64,
    pub residual: f64,
}

/// Cost over all experiments for a vector of parameter values
#[derive(Clone)]
pub struct OptimizationProblem {
    pub parameters: Vec<FitParameter>,
    pub experiments: Vec<ProblemExperiment>,
    pub options: ProblemOptions,
    pub rtol: f64,
    pub atol: f64,
}

impl OptimizationProblem {
    /// Build the problem from in-memory datasets keyed by experiment sid
    pub fn new(
        fit_experiments: Vec<FitExperiment>,
        parameters: Vec<FitParameter>,
        options: ProblemOptions,
        data: &BTreeMap<String, Datasets>,
    ) -> Result<Self> {
        if parameters.is_empty() {
            return Err(EdoxabanError::InvalidFit("no parameters to fit".to_string()));
        }
        for parameter in &parameters {
            parameter.validate()?;
        }

        let empty = Datasets::new();
        let mut experiments = Vec::new();
        for fit_experiment in fit_experiments {
            let sid = fit_experiment.experiment.sid();
            let datasets = data.get(sid).unwrap_or(&empty);
            let all_tasks = fit_experiment.experiment.tasks();
            let mut mappings = Vec::new();
            for (key, mapping) in &fit_experiment.mappings {
                if !all_tasks.contains_key(&mapping.observable.task) {
                    return Err(EdoxabanError::MissingTask(format!(
                        "{} (mapping `{}` of {})",
                        mapping.observable.task, key, sid
                    )));
                }
                if let Some(prepared) = PreparedMapping::new(key, mapping, datasets, sid, &options)? {
                    mappings.push(prepared);
                }
            }
            if mappings.is_empty() {
                continue;
            }
            let tasks = all_tasks
                .into_iter()
                .filter(|(task, _)| mappings.iter().any(|m| &m.task == task))
                .collect();
            experiments.push(ProblemExperiment {
                experiment: fit_experiment.experiment,
                tasks,
                mappings,
                weight: fit_experiment.weight,
            });
        }
        if experiments.is_empty() {
            return Err(EdoxabanError::InvalidFit("no mappings with data".to_string()));
        }

        let problem = OptimizationProblem {
            parameters,
            experiments,
            options,
            rtol: 1e-6,
            atol: 1e-10,
        };
        tracing::info!(
            "Optimization problem with {} parameters, {} experiments, {} mappings and {} data points",
            problem.parameters.len(),
            problem.experiments.len(),
            problem.n_mappings(),
            problem.n_points()
        );
        Ok(problem)
    }

    /// Build the problem reading the datasets of every experiment from `source`
    pub fn from_source(
        fit_experiments: Vec<FitExperiment>,
        parameters: Vec<FitParameter>,
        options: ProblemOptions,
        source: &DataSource,
    ) -> Result<Self> {
        let data = fit_experiments
            .iter()
            .map(|fe| {
                let datasets = load_datasets(fe.experiment.as_ref(), source)?;
                Ok((fe.experiment.sid().to_string(), datasets))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;
        OptimizationProblem::new(fit_experiments, parameters, options, &data)
    }

    pub fn with_tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.rtol = rtol;
        self.atol = atol;
        self
    }

    pub fn n_mappings(&self) -> usize {
        self.experiments.iter().map(|e| e.mappings.len()).sum()
    }

    pub fn n_points(&self) -> usize {
        self.experiments
            .iter()
            .flat_map(|e| e.mappings.iter())
            .map(|m| m.time.len())
            .sum()
    }

    pub fn lower_bounds(&self) -> Vec<f64> {
        self.parameters.iter().map(|p| p.lower_bound).collect()
    }

    pub fn upper_bounds(&self) -> Vec<f64> {
        self.parameters.iter().map(|p| p.upper_bound).collect()
    }

    pub fn start_values(&self) -> Vec<f64> {
        self.parameters.iter().map(|p| p.start_value).collect()
    }

    /// Parameter values as changes overriding the protocols
    pub fn changes(&self, values: &[f64]) -> Changes {
        self.parameters
            .iter()
            .zip(values)
            .map(|(p, v)| (p.pid.clone(), Quantity::new(*v, &p.unit)))
            .collect()
    }

    fn simulate(
        &self,
        experiment: &ProblemExperiment,
        overrides: &Changes,
    ) -> Result<BTreeMap<String, TimecourseResult>> {
        let simulator =
            Simulator::new(experiment.experiment.model()).with_tolerances(self.rtol, self.atol);
        experiment
            .tasks
            .par_iter()
            .map(|(task, sim)| {
                let result = simulator.run(&sim.clone().with_overrides(overrides))?;
                let timecourse = result.timecourse().cloned().ok_or_else(|| {
                    EdoxabanError::InvalidFit(format!("task `{}` is not a timecourse", task))
                })?;
                Ok((task.clone(), timecourse))
            })
            .collect()
    }

    /// Weighted residuals of all data points, points outside the simulated time are skipped
    pub fn residuals(&self, values: &[f64]) -> Result<Vec<Residual>> {
        if values.len() != self.parameters.len() {
            return Err(EdoxabanError::InvalidFit(format!(
                "expected {} parameter values, got {}",
                self.parameters.len(),
                values.len()
            )));
        }
        let overrides = self.changes(values);
        let per_experiment = self
            .experiments
            .par_iter()
            .map(|experiment| {
                let results = self.simulate(experiment, &overrides)?;
                let sid = experiment.experiment.sid();
                let mut residuals = Vec::new();
                for mapping in &experiment.mappings {
                    let result = results
                        .get(&mapping.task)
                        .ok_or_else(|| EdoxabanError::MissingTask(mapping.task.clone()))?;
                    for i in 0..mapping.time.len() {
                        let Some(model) = result.interpolate(&mapping.yid, mapping.time[i])? else {
                            tracing::warn!(
                                "{}: `{}` point at {} min outside of the simulation",
                                sid,
                                mapping.key,
                                mapping.time[i]
                            );
                            continue;
                        };
                        let r = (model - mapping.values[i]) / mapping.scale;
                        residuals.push(Residual {
                            experiment: sid.to_string(),
                            mapping: mapping.key.clone(),
                            yid: mapping.yid.clone(),
                            time: mapping.time[i],
                            data: mapping.values[i],
                            model,
                            residual: r * mapping.weights[i] * experiment.weight.sqrt(),
                        });
                    }
                }
                Ok(residuals)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(per_experiment.into_iter().flatten().collect())
    }

    /// Half the sum of squared weighted residuals
    pub fn cost(&self, values: &[f64]) -> Result<f64> {
        let residuals = self.residuals(values)?;
        Ok(0.5 * residuals.iter().map(|r| r.residual.powi(2)).sum::<f64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiments::data::DataSet;
    use crate::experiments::metadata::{Fasting, MappingMetaData, Tissue};
    use crate::fitting::mapping::FitMapping;

    fn dataset(values: Vec<f64>, sd: Vec<Option<f64>>) -> DataSet {
        DataSet {
            label: "curve".to_string(),
            time: (0..values.len()).map(|i| 60.0 * i as f64).collect(),
            count: vec![Some(16.0); values.len()],
            mean: values,
            sd,
            unit: "µM".to_string(),
        }
    }

    fn mapping() -> FitMapping {
        FitMapping::new("curve", "task_x", "[Cve_edo]", MappingMetaData::new(Tissue::Plasma, Fasting::Fasted))
    }

    fn datasets(ds: DataSet) -> Datasets {
        Datasets::from([("curve".to_string(), ds)])
    }

    #[test]
    fn test_prepared_mapping_units_and_weights() {
        let options = ProblemOptions {
            residual: ResidualKind::Normalized,
            weighting_points: WeightingPoints::Sd,
            weighting_curves: WeightingCurves::Points,
        };
        let ds = dataset(vec![1.0, 3.0, f64::NAN, 2.0], vec![Some(0.5), None, None, Some(0.0)]);
        let prepared = PreparedMapping::new("fm", &mapping(), &datasets(ds), "Test", &options)
            .unwrap()
            .unwrap();
        for (value, expected) in prepared.values.iter().zip([1e-3, 3e-3, 2e-3]) {
            assert!((value - expected).abs() < 1e-15);
        }
        assert_eq!(prepared.time, vec![0.0, 60.0, 180.0]);
        assert!((prepared.scale - 2e-3).abs() < 1e-15);
        let curve = 1.0 / 3f64.sqrt();
        assert!((prepared.weights[0] - 4.0 * curve).abs() < 1e-12);
        assert!((prepared.weights[1] - curve).abs() < 1e-12);
        // zero sd is treated as unknown
        assert!((prepared.weights[2] - curve).abs() < 1e-12);
    }

    #[test]
    fn test_sd_ignored_without_use_sd() {
        let options = ProblemOptions::default();
        let ds = dataset(vec![1.0, 1.0], vec![Some(0.1), Some(0.1)]);
        let prepared = PreparedMapping::new("fm", &mapping().without_sd(), &datasets(ds), "Test", &options)
            .unwrap()
            .unwrap();
        assert!(prepared.weights.iter().all(|w| (w - 1.0 / 2f64.sqrt()).abs() < 1e-12));
    }

    #[test]
    fn test_count_weighting() {
        let options = ProblemOptions {
            residual: ResidualKind::Absolute,
            weighting_points: WeightingPoints::None,
            weighting_curves: WeightingCurves::Count,
        };
        let ds = dataset(vec![1.0, 2.0], vec![None, None]);
        let prepared = PreparedMapping::new("fm", &mapping(), &datasets(ds), "Test", &options)
            .unwrap()
            .unwrap();
        assert_eq!(prepared.scale, 1.0);
        assert_eq!(prepared.weights, vec![4.0, 4.0]);
    }

    #[test]
    fn test_missing_dataset_and_incompatible_units() {
        let options = ProblemOptions::default();
        assert!(matches!(
            PreparedMapping::new("fm", &mapping(), &Datasets::new(), "Test", &options),
            Err(EdoxabanError::MissingDataset { .. })
        ));
        let mut ds = dataset(vec![1.0], vec![None]);
        ds.unit = "s".to_string();
        assert!(PreparedMapping::new("fm", &mapping(), &datasets(ds), "Test", &options).is_err());
    }
}
