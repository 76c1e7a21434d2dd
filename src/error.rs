use thiserror::Error;

/// Errors raised while building, simulating or fitting the edoxaban model
#[derive(Error, Debug)]
pub enum EdoxabanError {
    #[error("Unknown model symbol `{0}`")]
    UnknownSymbol(String),
    #[error("Unknown unit `{0}`")]
    UnknownUnit(String),
    #[error("Cannot convert `{from}` to `{to}`")]
    IncompatibleUnits { from: String, to: String },
    #[error("Invalid timecourse: {0}")]
    InvalidTimecourse(String),
    #[error("Invalid scan: {0}")]
    InvalidScan(String),
    #[error("Integration failed at t={time} min: {reason}")]
    Integration { time: f64, reason: String },
    #[error("Dataset `{label}` not found in `{table}`")]
    MissingDataset { table: String, label: String },
    #[error("Data table `{0}` could not be found")]
    MissingTable(String),
    #[error("Task `{0}` is not defined by the experiment")]
    MissingTask(String),
    #[error("Output `{0}` is not available in the simulation results")]
    MissingOutput(String),
    #[error("Unknown experiment group `{group}`, valid groups are: {valid}")]
    UnknownGroup { group: String, valid: String },
    #[error("Unknown impairment class `{0}`")]
    UnknownClass(String),
    #[error("Invalid fit setup: {0}")]
    InvalidFit(String),
    #[error("Optimization failed: {0}")]
    Optimization(String),
    #[error("Too few points to calculate `{0}`")]
    InsufficientData(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EdoxabanError>;
