use serde_derive::{Deserialize, Serialize};

use crate::experiments::metadata::MappingMetaData;

/// Reference side of a mapping: a dataset of the experiment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitData {
    pub dataset: String,
    /// Use the `mean_sd` column for weighting
    pub use_sd: bool,
}

/// Simulated side of a mapping: an output of one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitObservable {
    pub task: String,
    pub yid: String,
}

/// Links a dataset to a simulated output under a metadata classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitMapping {
    pub reference: FitData,
    pub observable: FitObservable,
    pub metadata: MappingMetaData,
}

impl FitMapping {
    pub fn new(dataset: &str, task: &str, yid: &str, metadata: MappingMetaData) -> Self {
        FitMapping {
            reference: FitData {
                dataset: dataset.to_string(),
                use_sd: true,
            },
            observable: FitObservable {
                task: task.to_string(),
                yid: yid.to_string(),
            },
            metadata,
        }
    }

    /// Ignore the standard deviations of the dataset
    pub fn without_sd(mut self) -> Self {
        self.reference.use_sd = false;
        self
    }

    /// Observable symbol without concentration brackets, e.g. `Cve_edo`
    pub fn observable_sid(&self) -> &str {
        self.observable
            .yid
            .trim_start_matches('[')
            .trim_end_matches(']')
    }
}
