//! Synthetic protocols exploring the model without clinical data
mod coagulation;
mod dose_dependency;

pub use coagulation::CoagulationExperiment;
pub use dose_dependency::DoseDependencyExperiment;
