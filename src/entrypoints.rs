use crate::experiments::data::DataSource;
use crate::experiments::{registry, ExperimentResult};
use crate::fitting::{self, FitResult, OptimizationProblem};
use crate::logger;
use crate::routines::output;
use crate::routines::settings::*;
use crate::simulator::Simulator;

use eyre::{Result, WrapErr};
use std::path::Path;
use std::time::Instant;

/// Simulate the experiments of a group
///
/// The group is taken from `simulation.group` of the settings. Every experiment
/// writes one TSV file per task into `{output}/{group}/{experiment}/`.
pub fn simulate(settings: &Settings) -> Result<Vec<ExperimentResult>> {
    let now = Instant::now();
    logger::setup_log(settings)?;
    tracing::info!("Simulating experiment group `{}`", settings.simulation.group);

    let output_dir = Path::new(&settings.paths.output);
    write_settings_to_file(settings, output_dir)?;
    let simulator = Simulator::default().with_tolerances(settings.config.rtol, settings.config.atol);
    let results = registry::run_simulation_experiments(&settings.simulation.group, output_dir, &simulator)
        .wrap_err_with(|| format!("simulation of group `{}` failed", settings.simulation.group))?;

    tracing::info!("Total time: {:.2?}", now.elapsed());
    Ok(results)
}

/// Estimate model parameters against the study datasets
///
/// The mappings are selected with `fit.filter`, the parameters with
/// `fit.parameters`. The best parameters, all runs and the residuals of the
/// best fit are written to `{output}/fit_{filter}/`.
pub fn fit(settings: &Settings) -> Result<FitResult> {
    let now = Instant::now();
    logger::setup_log(settings)?;
    tracing::info!(
        "Fitting `{}` parameters against `{}` mappings",
        settings.fit.parameters,
        settings.fit.filter
    );

    let experiments = fitting::fit_experiments(&settings.fit.filter)?;
    let parameters = fitting::parameter_group(&settings.fit.parameters)?;
    for parameter in &parameters {
        tracing::debug!("{}", parameter);
    }

    let source = DataSource::new(&settings.paths.data);
    let problem = OptimizationProblem::from_source(experiments, parameters, settings.fit.problem, &source)
        .wrap_err_with(|| format!("reading the datasets from {} failed", settings.paths.data))?
        .with_tolerances(settings.config.rtol, settings.config.atol);

    let result = settings.fit.optimizer.fit(&problem)?;
    for (pid, value) in result.pids.iter().zip(&result.values) {
        tracing::info!("{} = {:.6e}", pid, value);
    }

    let output_dir = Path::new(&settings.paths.output).join(format!("fit_{}", settings.fit.filter));
    write_settings_to_file(settings, &output_dir)?;
    output::write_fit_result(&output_dir, &result)?;

    tracing::info!("Total time: {:.2?}", now.elapsed());
    Ok(result)
}
