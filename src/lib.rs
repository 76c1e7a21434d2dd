//! Whole-body PBPK/PD model of edoxaban
//!
//! The crate bundles the model of edoxaban and its metabolites, a simulator for
//! multi-phase timecourses and parameter scans, simulation experiments of
//! published clinical studies and a bounded multi-start parameter estimation
//! across these studies.
//!
//! ```no_run
//! use edoxaban::prelude::*;
//!
//! let settings = read_settings("config/edoxaban.toml").unwrap();
//! entrypoints::simulate(&settings).unwrap();
//! ```
pub mod entrypoints;
pub mod error;
pub mod experiments;
pub mod fitting;
pub mod logger;
pub mod model;
pub mod routines;
pub mod simulator;

pub mod prelude {
    pub use crate::entrypoints;
    pub use crate::error::{EdoxabanError, Result};
    pub use crate::experiments::data::{DataSet, DataSource};
    pub use crate::experiments::metadata::*;
    pub use crate::experiments::registry::{experiments_for_group, run_simulation_experiments};
    pub use crate::experiments::{run_experiment, ExperimentResult, SimulationExperiment};
    pub use crate::fitting::mapping::FitMapping;
    pub use crate::fitting::problem::ProblemOptions;
    pub use crate::fitting::{
        FitExperiment, FitParameter, FitResult, OptimizationProblem, Optimizer, ResidualKind,
        WeightingCurves, WeightingPoints,
    };
    pub use crate::model::{ModelKind, Substance};
    pub use crate::routines::pk::{pharmacodynamics, pharmacokinetics};
    pub use crate::routines::settings::{read_settings, Settings};
    pub use crate::routines::units::Quantity;
    pub use crate::simulator::{
        Changes, ScanDimension, ScanSim, Simulation, SimulationResult, Simulator, Timecourse,
        TimecourseResult, TimecourseSim,
    };
}

//Tests
mod tests;
