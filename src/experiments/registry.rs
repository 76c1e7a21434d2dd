//! Named groups of experiments and the simulation runner
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use super::misc::{CoagulationExperiment, DoseDependencyExperiment};
use super::scans::EdoxabanParameterScan;
use super::studies::*;
use super::{run_experiment, validate_mappings, ExperimentResult, SimulationExperiment};
use crate::error::{EdoxabanError, Result};
use crate::routines::output;
use crate::simulator::Simulator;

pub const GROUPS: [&str; 9] = [
    "studies",
    "dose_dependency",
    "multi",
    "food",
    "ddi",
    "hepatic_impairment",
    "misc",
    "scan",
    "all",
];

/// All clinical studies
pub fn studies() -> Vec<Arc<dyn SimulationExperiment>> {
    vec![
        Arc::new(Bathala2012),
        Arc::new(Brown2015),
        Arc::new(Chen2017a),
        Arc::new(Chen2017b),
        Arc::new(Lenard2024),
        Arc::new(Liu2022),
        Arc::new(Mendell2011),
        Arc::new(Ogata2010),
        Arc::new(Rohr2024),
    ]
}

fn misc() -> Vec<Arc<dyn SimulationExperiment>> {
    vec![Arc::new(DoseDependencyExperiment), Arc::new(CoagulationExperiment)]
}

fn scan() -> Vec<Arc<dyn SimulationExperiment>> {
    vec![Arc::new(EdoxabanParameterScan)]
}

/// Experiments of a named group
pub fn experiments_for_group(group: &str) -> Result<Vec<Arc<dyn SimulationExperiment>>> {
    let experiments: Vec<Arc<dyn SimulationExperiment>> = match group {
        "studies" => studies(),
        "dose_dependency" => vec![Arc::new(Brown2015), Arc::new(Chen2017b), Arc::new(Ogata2010)],
        "multi" => vec![Arc::new(Chen2017a), Arc::new(Ogata2010), Arc::new(Rohr2024)],
        "food" => vec![Arc::new(Mendell2011), Arc::new(Liu2022)],
        "ddi" => vec![Arc::new(Lenard2024), Arc::new(Rohr2024)],
        // no hepatic impairment study is available
        "hepatic_impairment" => Vec::new(),
        "misc" => misc(),
        "scan" => scan(),
        "all" => studies().into_iter().chain(misc()).chain(scan()).collect(),
        _ => {
            return Err(EdoxabanError::UnknownGroup {
                group: group.to_string(),
                valid: GROUPS.join(", "),
            })
        }
    };
    Ok(experiments)
}

/// Simulate all experiments of a group and write their results to `output_dir`
pub fn run_simulation_experiments(
    group: &str,
    output_dir: &Path,
    simulator: &Simulator,
) -> Result<Vec<ExperimentResult>> {
    let experiments = experiments_for_group(group)?;
    run_experiments(&experiments, &output_dir.join(group), simulator)
}

/// Simulate a custom selection of experiments
pub fn run_experiments(
    experiments: &[Arc<dyn SimulationExperiment>],
    output_dir: &Path,
    simulator: &Simulator,
) -> Result<Vec<ExperimentResult>> {
    let now = Instant::now();
    if experiments.is_empty() {
        tracing::warn!("No experiments to simulate");
        return Ok(Vec::new());
    }
    std::fs::create_dir_all(output_dir)?;
    let mut results = Vec::with_capacity(experiments.len());
    for experiment in experiments {
        validate_mappings(experiment.as_ref())?;
        let result = run_experiment(experiment.as_ref(), None, simulator)?;
        output::write_experiment(output_dir, &result)?;
        results.push(result);
    }
    tracing::info!(
        "Simulated {} experiments in {:.2?}, results in {}",
        results.len(),
        now.elapsed(),
        output_dir.display()
    );
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups() {
        for group in GROUPS {
            assert!(experiments_for_group(group).is_ok());
        }
        assert_eq!(experiments_for_group("all").unwrap().len(), 12);
        match experiments_for_group("renal") {
            Err(EdoxabanError::UnknownGroup { valid, .. }) => assert!(valid.contains("food")),
            _ => panic!("unknown group accepted"),
        }
    }

    #[test]
    fn test_all_mappings_are_consistent() {
        for experiment in experiments_for_group("all").unwrap() {
            validate_mappings(experiment.as_ref()).unwrap();
        }
    }
}
