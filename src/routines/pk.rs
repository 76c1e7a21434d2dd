//! Non-compartmental pharmacokinetics and pharmacodynamic summaries of simulated timecourses
//!
//! All values are reported in display units: concentrations in µmole/l,
//! areas in µmole/l*hr, times in hr and clearances in ml/min.
use ndarray::{s, ArrayView1};
use ndarray_stats::QuantileExt;
use serde_derive::Serialize;

use crate::error::{EdoxabanError, Result};
use crate::model::{BodyParameters, Substance};
use crate::simulator::TimecourseResult;

/// mM*min to µmole/l*hr
const AUC_FACTOR: f64 = 1000.0 / 60.0;
const MIN_TERMINAL_POINTS: usize = 3;

/// Substances with a plasma profile reported in the tables
pub const PK_SUBSTANCES: [Substance; 3] = [Substance::Edo, Substance::M4, Substance::M6];

/// Outputs summarized by [pharmacodynamics]
pub const PD_OUTPUTS: [(&str, &str); 3] = [
    ("PT", "s"),
    ("aPTT", "s"),
    ("Xa_inhibition", "dimensionless"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PkParameters {
    pub substance: String,
    /// Applied dose in mmole
    pub dose: f64,
    pub auc: f64,
    pub aucinf: f64,
    pub cmax: f64,
    pub tmax: f64,
    pub kel: f64,
    pub thalf: f64,
    pub vd: f64,
    pub cl: f64,
    pub cl_renal: f64,
    pub cl_hepatic: f64,
}

impl PkParameters {
    pub const UNITS: [(&'static str, &'static str); 10] = [
        ("auc", "µmole/l*hr"),
        ("aucinf", "µmole/l*hr"),
        ("cmax", "µmole/l"),
        ("tmax", "hr"),
        ("kel", "1/hr"),
        ("thalf", "hr"),
        ("vd", "l"),
        ("cl", "ml/min"),
        ("cl_renal", "ml/min"),
        ("cl_hepatic", "ml/min"),
    ];

    pub fn values(&self) -> [f64; 10] {
        [
            self.auc,
            self.aucinf,
            self.cmax,
            self.tmax,
            self.kel,
            self.thalf,
            self.vd,
            self.cl,
            self.cl_renal,
            self.cl_hepatic,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdParameters {
    pub sid: String,
    pub unit: String,
    pub baseline: f64,
    pub max: f64,
    pub min: f64,
    /// Time of the maximum in hr
    pub tmax: f64,
}

#[inline]
fn auc_segment(t1: f64, c1: f64, t2: f64, c2: f64) -> f64 {
    let dt = t2 - t1;
    if dt <= 0.0 {
        return 0.0;
    }
    // linear up, log down
    if c2 < c1 && c2 > 0.0 && ((c1 / c2) - 1.0).abs() >= 1e-10 {
        (c1 - c2) * dt / (c1 / c2).ln()
    } else {
        (c1 + c2) / 2.0 * dt
    }
}

/// Area under the curve from the first to the last point
pub fn auc(time: &ArrayView1<f64>, c: &ArrayView1<f64>) -> f64 {
    (1..time.len())
        .map(|i| auc_segment(time[i - 1], c[i - 1], time[i], c[i]))
        .sum()
}

/// Fraction of cmax below which concentrations are not quantifiable
const LLOQ_FRACTION: f64 = 1e-4;
/// Absolute limit of quantification in mM, well above the integrator noise
const LLOQ_ABS: f64 = 1e-9;
const MIN_R_SQUARED: f64 = 0.9;
/// Minimal span of the terminal points in half-lives
const MIN_SPAN_RATIO: f64 = 2.0;
/// Adjusted R² within this tolerance of the best one count as equally good
const R_SQUARED_TOLERANCE: f64 = 1e-4;

/// Log-linear regression over the terminal points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalPhase {
    /// Elimination rate in 1/min
    pub kel: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub n_points: usize,
    /// Index of the first regression point
    pub first: usize,
    /// Index of the last quantifiable point
    pub last: usize,
}

/// Limit of quantification of a profile with maximum `cmax` (mM)
pub fn lloq(cmax: f64) -> f64 {
    (cmax * LLOQ_FRACTION).max(LLOQ_ABS)
}

/// Index of the last point above `limit`
pub fn tlast_index(c: &ArrayView1<f64>, limit: f64) -> Option<usize> {
    c.iter().rposition(|ci| *ci > limit)
}

/// Best-fit terminal phase
///
/// Walks back from `last`, adding one point at a time. Among the regressions with
/// R² >= 0.9 spanning at least two half-lives, the one with the most points whose
/// adjusted R² is within tolerance of the best is kept. Points up to and
/// including `imax` are never used.
pub fn terminal_phase(
    time: &ArrayView1<f64>,
    c: &ArrayView1<f64>,
    imax: usize,
    last: usize,
) -> Option<TerminalPhase> {
    if last <= imax {
        return None;
    }
    let t_ref = time[last];
    let (mut sx, mut sy, mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    let mut n = 0usize;
    let mut best: Option<TerminalPhase> = None;
    let mut best_adj = f64::NEG_INFINITY;

    for i in (imax + 1..=last).rev() {
        if c[i] <= 0.0 {
            continue;
        }
        let x = time[i] - t_ref;
        let y = c[i].ln();
        sx += x;
        sy += y;
        sxx += x * x;
        sxy += x * y;
        syy += y * y;
        n += 1;
        if n < MIN_TERMINAL_POINTS {
            continue;
        }

        let nf = n as f64;
        let cxx = sxx - sx * sx / nf;
        let cxy = sxy - sx * sy / nf;
        let cyy = syy - sy * sy / nf;
        if cxx <= 0.0 {
            continue;
        }
        let slope = cxy / cxx;
        if slope >= 0.0 {
            continue;
        }
        let r_squared = if cyy <= 0.0 { 1.0 } else { (cxy * cxy / (cxx * cyy)).min(1.0) };
        if r_squared < MIN_R_SQUARED {
            continue;
        }
        let kel = -slope;
        let span = time[last] - time[i];
        if span * kel / std::f64::consts::LN_2 < MIN_SPAN_RATIO {
            continue;
        }
        let adj_r_squared = 1.0 - (1.0 - r_squared) * (nf - 1.0) / (nf - 2.0);
        // candidates grow in points, so a similar fit always wins
        if adj_r_squared >= best_adj - R_SQUARED_TOLERANCE {
            best_adj = best_adj.max(adj_r_squared);
            best = Some(TerminalPhase {
                kel,
                r_squared,
                adj_r_squared,
                n_points: n,
                first: i,
                last,
            });
        }
    }
    best
}

/// Pharmacokinetic parameters of one substance
///
/// Dose dependent parameters (`vd`, `cl`, `cl_hepatic`) are only defined for edoxaban.
pub fn pharmacokinetics(result: &TimecourseResult, substance: Substance) -> Result<PkParameters> {
    if result.len() < 2 {
        return Err(EdoxabanError::InsufficientData("auc".to_string()));
    }
    let sid = substance.suffix();
    let time = result.time();
    let c = result.column(&format!("[Cve_{}]", sid))?;

    let mr = BodyParameters::default().mr(Substance::Edo);
    let dose = match substance {
        Substance::Edo => {
            (result.column("PODOSE_edo")?[0] + result.column("IVDOSE_edo")?[0]) / mr
        }
        _ => f64::NAN,
    };

    let imax = c
        .argmax_skipnan()
        .map_err(|_| EdoxabanError::InsufficientData("cmax".to_string()))?;
    let cmax = c[imax];
    let tmax = time[imax] - time[0];
    let auc_end = auc(&time, &c);

    // below the limit of quantification the profile is integrator noise
    let (kel, aucinf) = match tlast_index(&c, lloq(cmax)) {
        Some(last) => {
            let auc_last = auc(&time.slice(s![..=last]), &c.slice(s![..=last]));
            match terminal_phase(&time, &c, imax, last) {
                Some(phase) => (phase.kel, auc_last + c[last] / phase.kel),
                None => (f64::NAN, f64::NAN),
            }
        }
        None => (f64::NAN, f64::NAN),
    };

    let vd = dose / (kel * aucinf);
    let cl = dose / aucinf;
    let urine = result.column(&format!("Aurine_{}", sid))?;
    let a_urine = urine[urine.len() - 1] - urine[0];
    let cl_renal = a_urine / auc_end;
    let cl_hepatic = cl - cl_renal;

    Ok(PkParameters {
        substance: sid.to_string(),
        dose,
        auc: auc_end * AUC_FACTOR,
        aucinf: aucinf * AUC_FACTOR,
        cmax: cmax * 1000.0,
        tmax: tmax / 60.0,
        kel: kel * 60.0,
        thalf: std::f64::consts::LN_2 / kel / 60.0,
        vd,
        cl: cl * 1000.0,
        cl_renal: cl_renal * 1000.0,
        cl_hepatic: cl_hepatic * 1000.0,
    })
}

/// Baseline, extrema and time of maximum of the coagulation readouts
pub fn pharmacodynamics(result: &TimecourseResult) -> Result<Vec<PdParameters>> {
    PD_OUTPUTS
        .iter()
        .map(|(sid, unit)| {
            let y = result.column(sid)?;
            let imax = y
                .argmax_skipnan()
                .map_err(|_| EdoxabanError::InsufficientData(sid.to_string()))?;
            let min = *y.min_skipnan();
            let time = result.time();
            Ok(PdParameters {
                sid: sid.to_string(),
                unit: unit.to_string(),
                baseline: y[0],
                max: y[imax],
                min,
                tmax: (time[imax] - time[0]) / 60.0,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    /// One compartment bolus: c = c0 * exp(-k t)
    fn bolus(c0: f64, k: f64) -> TimecourseResult {
        let columns: Vec<String> = ["time", "[Cve_edo]", "Aurine_edo", "PODOSE_edo", "IVDOSE_edo"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let time = Array1::linspace(0.0, 2000.0, 2001);
        let mut data = Array2::zeros((time.len(), columns.len()));
        for (i, t) in time.iter().enumerate() {
            data[[i, 0]] = *t;
            data[[i, 1]] = c0 * (-k * t).exp();
            data[[i, 2]] = 0.0;
            data[[i, 4]] = 1.0;
        }
        TimecourseResult::new(columns, data)
    }

    #[test]
    fn test_auc_linear_segments() {
        let t = ndarray::array![0.0, 1.0, 2.0];
        let c = ndarray::array![0.0, 2.0, 2.0];
        assert!((auc(&t.view(), &c.view()) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_exponential_decay() {
        let k = 0.005;
        let pk = pharmacokinetics(&bolus(0.01, k), Substance::Edo).unwrap();
        assert!((pk.kel - k * 60.0).abs() < 1e-9);
        assert!((pk.thalf - std::f64::consts::LN_2 / k / 60.0).abs() < 1e-6);
        assert_eq!(pk.tmax, 0.0);
        assert!((pk.cmax - 10.0).abs() < 1e-12);
        // aucinf = c0 / k in mM*min
        assert!((pk.aucinf - 0.01 / k * AUC_FACTOR).abs() / pk.aucinf < 1e-6);
        assert_eq!(pk.cl_renal, 0.0);
    }

    #[test]
    fn test_noise_below_quantification_is_ignored() {
        let k = 0.01;
        let mut result = bolus(0.01, k);
        // integrator noise around zero in the tail
        for i in 1500..result.len() {
            result.data[[i, 1]] = if i % 2 == 0 { 5e-11 } else { -5e-11 };
        }
        let pk = pharmacokinetics(&result, Substance::Edo).unwrap();
        assert!((pk.kel - k * 60.0).abs() < 1e-9, "kel {}", pk.kel);
        assert!(pk.aucinf.is_finite() && pk.vd.is_finite() && pk.cl.is_finite());
        assert!((pk.aucinf - 0.01 / k * AUC_FACTOR).abs() / pk.aucinf < 1e-6);
    }

    #[test]
    fn test_terminal_phase_after_distribution() {
        // fast distribution phase followed by slow elimination
        let time = Array1::linspace(0.0, 3000.0, 3001);
        let c = time.mapv(|t: f64| 0.009 * (-0.05 * t).exp() + 0.001 * (-0.002 * t).exp());
        let phase = terminal_phase(&time.view(), &c.view(), 0, c.len() - 1).unwrap();
        assert!((phase.kel - 0.002).abs() / 0.002 < 1e-2, "kel {}", phase.kel);
        assert!(phase.adj_r_squared > 0.999);
        // the distribution phase is left out
        assert!(phase.first > 20, "first {}", phase.first);
    }

    #[test]
    fn test_no_terminal_phase_without_decline() {
        let time = Array1::linspace(0.0, 100.0, 11);
        let c = Array1::from_elem(11, 1e-3);
        assert_eq!(terminal_phase(&time.view(), &c.view(), 0, 10), None);
        // tmax at the last quantifiable point
        assert_eq!(terminal_phase(&time.view(), &c.view(), 10, 10), None);
    }

    #[test]
    fn test_metabolites_have_no_dose() {
        let mut result = bolus(0.01, 0.005);
        result.columns[1] = "[Cve_m4]".to_string();
        result.columns[2] = "Aurine_m4".to_string();
        let pk = pharmacokinetics(&result, Substance::M4).unwrap();
        assert!(pk.cl.is_nan());
        assert!(pk.kel > 0.0);
    }
}
