// Tab separated output
pub mod output;
// Noncompartmental pharmacokinetics
pub mod pk;
// Routines for settings
pub mod settings;
// Units of the model and the datasets
pub mod units;
