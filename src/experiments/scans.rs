//! Parameter scans of physiological factors on edoxaban pharmacokinetics
use ndarray::Array1;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::experiments::studies::mg;
use crate::experiments::SimulationExperiment;
use crate::routines::pk::{self, PdParameters, PkParameters, PK_SUBSTANCES};
use crate::routines::units::Quantity;
use crate::simulator::{Changes, ScanDimension, ScanResult, ScanSim, Simulation, Timecourse, TimecourseSim};

const NUM_POINTS: usize = 10;

/// One scanned model parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ScanInfo {
    pub key: &'static str,
    pub parameter: &'static str,
    /// Reference value of the parameter
    pub default: f64,
    pub values: Vec<f64>,
    pub unit: &'static str,
    pub label: &'static str,
}

fn with_default(values: Array1<f64>, default: f64) -> Vec<f64> {
    let mut values = values.to_vec();
    values.push(default);
    values.sort_by(|a, b| a.total_cmp(b));
    values
}

/// Bodyweight, cirrhosis, renal function, dose and fraction absorbed after 60 mg edoxaban
#[derive(Debug, Clone, Copy, Default)]
pub struct EdoxabanParameterScan;

impl EdoxabanParameterScan {
    /// min
    pub const TEND: f64 = 48.0 * 60.0;
    pub const STEPS: usize = 2000;
    /// mg
    pub const DOSE: f64 = 60.0;

    pub fn scans() -> Vec<ScanInfo> {
        vec![
            ScanInfo {
                key: "bodyweight_scan",
                parameter: "BW",
                default: 75.0,
                values: with_default(Array1::linspace(40.0, 200.0, NUM_POINTS), 75.0),
                unit: "kg",
                label: "bodyweight [kg]",
            },
            ScanInfo {
                key: "hepatic_scan",
                parameter: "f_cirrhosis",
                default: 0.0,
                values: Array1::linspace(0.0, 0.9, NUM_POINTS).to_vec(),
                unit: "dimensionless",
                label: "cirrhosis degree [-]",
            },
            ScanInfo {
                key: "renal_scan",
                parameter: "KI__f_renal_function",
                default: 1.0,
                values: with_default(Array1::logspace(10.0, -1.0, 1.0, NUM_POINTS), 1.0),
                unit: "dimensionless",
                label: "renal function [-]",
            },
            ScanInfo {
                key: "dose_scan",
                parameter: "PODOSE_edo",
                default: 30.0,
                values: vec![1.0, 5.0, 7.5, 15.0, 30.0, 60.0, 90.0, 120.0, 150.0],
                unit: "mg",
                label: "edoxaban dose [mg]",
            },
            ScanInfo {
                key: "food_scan",
                parameter: "GU__F_edo_abs",
                default: 0.82,
                values: with_default(Array1::logspace(10.0, -1.0, 0.0, NUM_POINTS), 0.82),
                unit: "dimensionless",
                label: "fraction absorbed [-]",
            },
        ]
    }

    pub fn simulation_key(scan: &ScanInfo) -> String {
        format!("scan_po_{}", scan.key)
    }
}

impl SimulationExperiment for EdoxabanParameterScan {
    fn sid(&self) -> &'static str {
        "EdoxabanParameterScan"
    }

    fn simulations(&self) -> BTreeMap<String, Simulation> {
        Self::scans()
            .iter()
            .map(|scan| {
                let simulation = TimecourseSim::new(vec![Timecourse::new(
                    0.0,
                    Self::TEND,
                    Self::STEPS,
                    Changes::new().with("PODOSE_edo", mg(Self::DOSE)),
                )]);
                let values = scan.values.iter().map(|v| Quantity::new(*v, scan.unit)).collect();
                let dimension = ScanDimension::new("dim_scan", scan.parameter, values);
                (
                    Self::simulation_key(scan),
                    ScanSim::new(simulation, vec![dimension]).into(),
                )
            })
            .collect()
    }
}

/// Pharmacokinetic parameters of one scan point
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPk {
    pub values: Vec<(String, Quantity)>,
    pub pk: Vec<PkParameters>,
    pub pd: Vec<PdParameters>,
}

/// PK of edoxaban, M4 and M6 and PD extrema for every point of a scan
pub fn scan_pharmacokinetics(result: &ScanResult) -> Result<Vec<ScanPk>> {
    result
        .points
        .iter()
        .map(|point| {
            let pk = PK_SUBSTANCES
                .iter()
                .map(|s| pk::pharmacokinetics(&point.result, *s))
                .collect::<Result<Vec<_>>>()?;
            Ok(ScanPk {
                values: point.values.clone(),
                pk,
                pd: pk::pharmacodynamics(&point.result)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_ranges() {
        let scans = EdoxabanParameterScan::scans();
        assert_eq!(scans.len(), 5);
        let bw = &scans[0];
        assert_eq!(bw.values.len(), 11);
        assert!(bw.values.contains(&75.0));
        assert!(bw.values.windows(2).all(|w| w[0] <= w[1]));

        let renal = &scans[2];
        assert!((renal.values[0] - 0.1).abs() < 1e-12);
        assert!((renal.values[10] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_scan_simulations() {
        let simulations = EdoxabanParameterScan.simulations();
        let Simulation::Scan(scan) = &simulations["scan_po_dose_scan"] else {
            panic!("scan expected");
        };
        assert_eq!(scan.points().unwrap().len(), 9);
        assert_eq!(scan.dimensions[0].changes[0].0, "PODOSE_edo");
    }
}
