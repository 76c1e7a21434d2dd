//! Bounded multi-start Nelder-Mead on the transformed parameter space
use argmin::core::{CostFunction, Error, Executor, State};
use argmin::solver::neldermead::NelderMead;
use rayon::prelude::*;
use serde_derive::{Deserialize, Serialize};
use std::time::Instant;

use super::problem::{OptimizationProblem, Residual};
use crate::error::{EdoxabanError, Result};

/// Distance to a bound, as a fraction of the range, below which a warning is raised
const BOUND_WARNING: f64 = 0.05;
const FRACTION_EPS: f64 = 1e-6;

fn sigmoid(u: f64) -> f64 {
    1.0 / (1.0 + (-u).exp())
}

fn logit(f: f64) -> f64 {
    (f / (1.0 - f)).ln()
}

/// Maps unbounded optimizer coordinates onto the parameter box
///
/// Parameters with a positive lower bound are scaled logarithmically.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundTransform {
    lower: Vec<f64>,
    upper: Vec<f64>,
    log: Vec<bool>,
}

impl BoundTransform {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Self {
        let log = lower.iter().map(|lb| *lb > 0.0).collect();
        BoundTransform { lower, upper, log }
    }

    fn range(&self, i: usize) -> (f64, f64) {
        if self.log[i] {
            (self.lower[i].log10(), self.upper[i].log10())
        } else {
            (self.lower[i], self.upper[i])
        }
    }

    /// Position of each value within its bounds, in `[0, 1]` of the scaled range
    pub fn fractions(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let (a, b) = self.range(i);
                let x = if self.log[i] { v.log10() } else { *v };
                ((x - a) / (b - a)).clamp(0.0, 1.0)
            })
            .collect()
    }

    pub fn from_fractions(&self, fractions: &[f64]) -> Vec<f64> {
        fractions
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let (a, b) = self.range(i);
                let x = a + (b - a) * f;
                if self.log[i] {
                    10f64.powf(x)
                } else {
                    x
                }
            })
            .collect()
    }

    pub fn to_unbounded(&self, values: &[f64]) -> Vec<f64> {
        self.fractions(values)
            .into_iter()
            .map(|f| logit(f.clamp(FRACTION_EPS, 1.0 - FRACTION_EPS)))
            .collect()
    }

    pub fn to_bounded(&self, u: &[f64]) -> Vec<f64> {
        let fractions: Vec<f64> = u.iter().map(|ui| sigmoid(*ui)).collect();
        self.from_fractions(&fractions)
    }
}

struct TransformedProblem<'a> {
    problem: &'a OptimizationProblem,
    transform: &'a BoundTransform,
}

impl<'a> CostFunction for TransformedProblem<'a> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, u: &Self::Param) -> std::result::Result<Self::Output, Error> {
        let values = self.transform.to_bounded(u);
        match self.problem.cost(&values) {
            Ok(cost) if cost.is_finite() => Ok(cost),
            Ok(_) => Ok(f64::INFINITY),
            Err(e) => {
                tracing::debug!("Cost evaluation failed: {}", e);
                Ok(f64::INFINITY)
            }
        }
    }
}

/// Initial simplex around a point in unbounded coordinates
fn create_initial_simplex(initial_point: &[f64]) -> Vec<Vec<f64>> {
    let mut simplex = vec![initial_point.to_vec()];
    for i in 0..initial_point.len() {
        let mut vertex = initial_point.to_vec();
        vertex[i] += 0.5;
        simplex.push(vertex);
    }
    simplex
}

/// Result of one local optimization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitRun {
    pub start: Vec<f64>,
    pub values: Vec<f64>,
    pub cost: f64,
    pub iterations: u64,
    /// Wall time in seconds
    pub duration: f64,
}

/// Best parameters over all runs of a multi-start optimization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    pub pids: Vec<String>,
    pub units: Vec<String>,
    pub values: Vec<f64>,
    pub cost: f64,
    /// All runs, sorted by cost
    pub runs: Vec<FitRun>,
    pub residuals: Vec<Residual>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Optimizer {
    /// Number of local optimizations, the first one from the start values
    pub starts: usize,
    pub seed: u32,
    pub max_iters: u64,
    pub sd_tolerance: f64,
}

impl Default for Optimizer {
    fn default() -> Self {
        Optimizer {
            starts: 10,
            seed: 1234,
            max_iters: 500,
            sd_tolerance: 1e-6,
        }
    }
}

/// Parameters closer than [BOUND_WARNING] to a bound
pub fn bound_warnings(problem: &OptimizationProblem, transform: &BoundTransform, values: &[f64]) -> Vec<String> {
    transform
        .fractions(values)
        .iter()
        .zip(&problem.parameters)
        .zip(values)
        .filter_map(|((f, p), v)| {
            if *f < BOUND_WARNING {
                Some(format!("`{}` = {} is close to its lower bound {}", p.pid, v, p.lower_bound))
            } else if *f > 1.0 - BOUND_WARNING {
                Some(format!("`{}` = {} is close to its upper bound {}", p.pid, v, p.upper_bound))
            } else {
                None
            }
        })
        .collect()
}

impl Optimizer {
    /// Start points in parameter space: the start values followed by Sobol samples
    pub fn start_points(&self, problem: &OptimizationProblem, transform: &BoundTransform) -> Vec<Vec<f64>> {
        let n = problem.parameters.len() as u32;
        let mut starts = vec![problem.start_values()];
        for i in 1..self.starts.max(1) {
            let fractions: Vec<f64> = (0..n)
                .map(|d| sobol_burley::sample(i as u32, d, self.seed) as f64)
                .collect();
            starts.push(transform.from_fractions(&fractions));
        }
        starts
    }

    fn run_local(
        &self,
        problem: &OptimizationProblem,
        transform: &BoundTransform,
        start: Vec<f64>,
    ) -> Result<FitRun> {
        let now = Instant::now();
        let cost_function = TransformedProblem { problem, transform };
        let simplex = create_initial_simplex(&transform.to_unbounded(&start));
        let solver: NelderMead<Vec<f64>, f64> = NelderMead::new(simplex)
            .with_sd_tolerance(self.sd_tolerance)
            .map_err(|e| EdoxabanError::Optimization(e.to_string()))?;
        let res = Executor::new(cost_function, solver)
            .configure(|state| state.max_iters(self.max_iters))
            .run()
            .map_err(|e| EdoxabanError::Optimization(e.to_string()))?;

        let state = res.state();
        let best = state
            .get_best_param()
            .ok_or_else(|| EdoxabanError::Optimization("no best parameters".to_string()))?;
        let run = FitRun {
            start,
            values: transform.to_bounded(best),
            cost: state.get_best_cost(),
            iterations: state.get_iter(),
            duration: now.elapsed().as_secs_f64(),
        };
        tracing::info!("Run finished after {} iterations with cost {:.6e}", run.iterations, run.cost);
        Ok(run)
    }

    /// Multi-start optimization, local runs in parallel
    pub fn fit(&self, problem: &OptimizationProblem) -> Result<FitResult> {
        let now = Instant::now();
        let transform = BoundTransform::new(problem.lower_bounds(), problem.upper_bounds());
        let starts = self.start_points(problem, &transform);
        tracing::info!("Starting {} optimizations of {} parameters", starts.len(), problem.parameters.len());

        let mut runs = starts
            .into_par_iter()
            .map(|start| self.run_local(problem, &transform, start))
            .collect::<Result<Vec<_>>>()?;
        runs.sort_by(|a, b| a.cost.total_cmp(&b.cost));

        let best = runs
            .first()
            .filter(|run| run.cost.is_finite())
            .ok_or_else(|| EdoxabanError::Optimization("no run reached a finite cost".to_string()))?;
        let values = best.values.clone();
        let warnings = bound_warnings(problem, &transform, &values);
        for warning in &warnings {
            tracing::warn!("{}", warning);
        }
        let residuals = problem.residuals(&values)?;
        tracing::info!("Optimization finished in {:.2?}, best cost {:.6e}", now.elapsed(), best.cost);

        Ok(FitResult {
            pids: problem.parameters.iter().map(|p| p.pid.clone()).collect(),
            units: problem.parameters.iter().map(|p| p.unit.clone()).collect(),
            values,
            cost: best.cost,
            residuals,
            runs,
            warnings,
        })
    }
}
