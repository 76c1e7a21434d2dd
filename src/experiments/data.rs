//! Digitized clinical data in PK-DB table format
//!
//! A table `{study}_{figure}.tsv` holds one row per data point. Rows are
//! grouped by `label` into [DataSet]s; extra columns are ignored.
use serde_derive::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{EdoxabanError, Result};
use crate::model::{BodyParameters, Substance};
use crate::routines::units::{Dimension, Quantity, Unit};

#[derive(Debug, Deserialize)]
struct DataRow {
    label: String,
    time: f64,
    #[serde(default = "default_time_unit")]
    time_unit: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    mean: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    mean_sd: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    value: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    count: Option<f64>,
    unit: String,
}

fn default_time_unit() -> String {
    "hr".to_string()
}

/// One digitized curve, time in min
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    pub label: String,
    pub time: Vec<f64>,
    pub mean: Vec<f64>,
    pub sd: Vec<Option<f64>>,
    pub count: Vec<Option<f64>>,
    pub unit: String,
}

impl DataSet {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Convert masses and mass concentrations into amounts and molar
    /// concentrations with the molecular weight `mr` (g/mole)
    pub fn mass_to_amount(mut self, mr: f64) -> Result<DataSet> {
        let dimension = Unit::parse(&self.unit)?.dimension;
        if !matches!(dimension, Dimension::Mass | Dimension::MassConcentration) {
            return Ok(self);
        }
        let target = Quantity::new(1.0, &self.unit).mass_to_amount(mr)?;
        for value in self.mean.iter_mut() {
            *value *= target.value;
        }
        for sd in self.sd.iter_mut().flatten() {
            *sd *= target.value;
        }
        self.unit = target.unit;
        Ok(self)
    }

    /// Data values expressed in `unit`
    pub fn values_in(&self, unit: &str) -> Result<(Vec<f64>, Vec<Option<f64>>)> {
        let f = Unit::parse(&self.unit)?.factor_to(&Unit::parse(unit)?)?;
        Ok((
            self.mean.iter().map(|v| v * f).collect(),
            self.sd.iter().map(|sd| sd.map(|v| v * f)).collect(),
        ))
    }
}

/// Parse a PK-DB table into its datasets, keyed by label
pub fn read_datasets<R: Read>(reader: R) -> Result<BTreeMap<String, DataSet>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut datasets: BTreeMap<String, DataSet> = BTreeMap::new();
    for row in reader.deserialize() {
        let row: DataRow = row?;
        let time = Quantity::new(row.time, &row.time_unit).to("min")?;
        let mean = row.mean.or(row.value).unwrap_or(f64::NAN);
        let dataset = datasets.entry(row.label.clone()).or_insert_with(|| DataSet {
            label: row.label.clone(),
            time: Vec::new(),
            mean: Vec::new(),
            sd: Vec::new(),
            count: Vec::new(),
            unit: row.unit.clone(),
        });
        // rows of one label share the unit of its first row
        let (mean, sd) = if row.unit == dataset.unit {
            (mean, row.mean_sd)
        } else {
            let factor = Quantity::new(1.0, &row.unit).to(&dataset.unit)?;
            (mean * factor, row.mean_sd.map(|sd| sd * factor))
        };
        dataset.time.push(time);
        dataset.mean.push(mean);
        dataset.sd.push(sd);
        dataset.count.push(row.count);
    }
    Ok(datasets)
}

/// Directory holding the data tables of all studies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub path: PathBuf,
}

impl DataSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        DataSource {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn table_path(&self, study: &str, table: &str) -> PathBuf {
        self.path.join(format!("{}_{}.tsv", study, table))
    }

    /// Read one table of a study
    pub fn read_table(&self, study: &str, table: &str) -> Result<BTreeMap<String, DataSet>> {
        let path = self.table_path(study, table);
        if !path.exists() {
            return Err(EdoxabanError::MissingTable(path.display().to_string()));
        }
        let file = std::fs::File::open(&path)?;
        read_datasets(file)
    }
}

/// Infer the substance of a dataset label from its prefix
pub fn substance_for_label(label: &str) -> Option<Substance> {
    if label.starts_with("M4") {
        Some(Substance::M4)
    } else if label.starts_with("M6") {
        Some(Substance::M6)
    } else if label.starts_with("edoxaban") {
        Some(Substance::Edo)
    } else {
        None
    }
}

/// Molecular weight used for the conversion of a substance
pub fn molecular_weight(substance: Substance) -> f64 {
    BodyParameters::default().mr(substance)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "study\tlabel\ttime\ttime_unit\tmean\tmean_sd\tcount\tunit
Test2000\tedoxaban_ED60\t1\thr\t274.0\t54.8\t12\tng/ml
Test2000\tedoxaban_ED60\t2\thr\t200.0\t\t12\tng/ml
Test2000\tPT_ED60\t0.5\thr\t14.2\t0.3\t12\ts
";

    #[test]
    fn test_read_groups_by_label() {
        let datasets = read_datasets(TABLE.as_bytes()).unwrap();
        assert_eq!(datasets.len(), 2);
        let edo = &datasets["edoxaban_ED60"];
        assert_eq!(edo.time, vec![60.0, 120.0]);
        assert_eq!(edo.sd, vec![Some(54.8), None]);
        assert_eq!(datasets["PT_ED60"].unit, "s");
    }

    #[test]
    fn test_mixed_units_within_label() {
        let table = "label\ttime\ttime_unit\tmean\tmean_sd\tcount\tunit
edoxaban_ED60\t1\thr\t100.0\t10.0\t12\tng/ml
edoxaban_ED60\t2\thr\t0.1\t0.01\t12\tµg/ml
";
        let datasets = read_datasets(table.as_bytes()).unwrap();
        let edo = &datasets["edoxaban_ED60"];
        assert_eq!(edo.unit, "ng/ml");
        assert!((edo.mean[1] - 100.0).abs() < 1e-9);
        let sd = edo.sd[1].unwrap();
        assert!((sd - 10.0).abs() < 1e-9, "sd {}", sd);
    }

    #[test]
    fn test_mass_conversion() {
        let datasets = read_datasets(TABLE.as_bytes()).unwrap();
        let mr = molecular_weight(Substance::Edo);
        let edo = datasets["edoxaban_ED60"].clone().mass_to_amount(mr).unwrap();
        assert_eq!(edo.unit, "mM");
        assert!((edo.mean[0] - 274.0e-3 / mr).abs() < 1e-15);

        let pt = datasets["PT_ED60"].clone().mass_to_amount(mr).unwrap();
        assert_eq!(pt.mean, vec![14.2]);
    }

    #[test]
    fn test_substance_for_label() {
        assert_eq!(substance_for_label("M4_urine_ED60"), Some(Substance::M4));
        assert_eq!(substance_for_label("edoxaban_metabolites_urine_ED60"), Some(Substance::Edo));
        assert_eq!(substance_for_label("aPTT_ED60"), None);
    }

    #[test]
    fn test_missing_table() {
        let source = DataSource::new("/nonexistent");
        assert!(matches!(
            source.read_table("Test2000", "Fig1"),
            Err(EdoxabanError::MissingTable(_))
        ));
    }
}
