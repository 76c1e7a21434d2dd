use config::Config as eConfig;
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::fitting::problem::ProblemOptions;
use crate::fitting::Optimizer;

/// Settings of a simulation or fitting run
///
/// Read from a TOML file, every value can be overridden by an environment
/// variable with the `EDOXABAN` prefix and `__` between nested keys, e.g.
/// `EDOXABAN_SIMULATION__GROUP=food` or `EDOXABAN_FIT__OPTIMIZER__MAX_ITERS=100`.
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Settings {
    pub paths: Paths,
    #[serde(default)]
    pub config: Config,
    #[serde(default)]
    pub simulation: Simulate,
    #[serde(default)]
    pub fit: Fit,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Paths {
    /// Directory with the digitized study tables
    #[serde(default = "default_data")]
    pub data: String,
    #[serde(default = "default_output")]
    pub output: String,
    pub log: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_rtol")]
    pub rtol: f64,
    #[serde(default = "default_atol")]
    pub atol: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: default_log_level(),
            rtol: default_rtol(),
            atol: default_atol(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Simulate {
    /// Experiment group, see `experiments::registry::GROUPS`
    #[serde(default = "default_group")]
    pub group: String,
}

impl Default for Simulate {
    fn default() -> Self {
        Simulate {
            group: default_group(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Fit {
    /// Mapping filter: `all`, `control`, `pharmacokinetics` or `pharmacodynamics`
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Parameter group: `pharmacokinetics`, `pharmacodynamics` or `all`
    #[serde(default = "default_parameters")]
    pub parameters: String,
    #[serde(default)]
    pub optimizer: Optimizer,
    #[serde(default)]
    pub problem: ProblemOptions,
}

impl Default for Fit {
    fn default() -> Self {
        Fit {
            filter: default_filter(),
            parameters: default_parameters(),
            optimizer: Optimizer::default(),
            problem: ProblemOptions::default(),
        }
    }
}

pub fn read_settings(path: &str) -> Result<Settings> {
    read_settings_from(path, environment())
}

pub(crate) fn environment() -> config::Environment {
    config::Environment::with_prefix("EDOXABAN")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

pub(crate) fn read_settings_from(path: &str, environment: config::Environment) -> Result<Settings> {
    let parsed = eConfig::builder()
        .add_source(config::File::with_name(path).format(config::FileFormat::Toml))
        .add_source(environment)
        .build()?;

    let settings: Settings = parsed.try_deserialize()?;
    Ok(settings)
}

/// Write the settings in use to `settings.json` in `dir`
pub fn write_settings_to_file(settings: &Settings, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let serialized = serde_json::to_string_pretty(settings)?;
    std::fs::write(dir.join("settings.json"), serialized)?;
    Ok(())
}

// *********************************
// Default values for deserializing
// *********************************
fn default_data() -> String {
    "data".to_string()
}

fn default_output() -> String {
    "results".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rtol() -> f64 {
    1e-6
}

fn default_atol() -> f64 {
    1e-10
}

fn default_group() -> String {
    "all".to_string()
}

fn default_filter() -> String {
    "control".to_string()
}

fn default_parameters() -> String {
    "pharmacokinetics".to_string()
}
