//! Renal sub-model: urinary excretion of edoxaban and metabolites
use super::{idx, BodyParameters, State, Substance};

/// Urinary excretion in mmole/min, indexed by [Substance::index]
pub fn excretion(x: &State, p: &BodyParameters) -> [f64; 4] {
    let vpl = p.plasma_volume();
    let vki = p.kidney_volume();
    let rates = [p.ki_edoex_k, p.ki_m4ex_k, p.ki_m6ex_k, p.ki_mxex_k];
    let mut fluxes = [0.0; 4];
    for s in Substance::ALL {
        let c = x[idx::plasma(s)] / vpl;
        fluxes[s.index()] = p.ki_f_renal_function * vki * rates[s.index()] * c;
    }
    fluxes
}

pub fn apply(fluxes: &[f64; 4], dx: &mut State) {
    for s in Substance::ALL {
        dx[idx::plasma(s)] -= fluxes[s.index()];
        dx[idx::urine(s)] += fluxes[s.index()];
    }
}

/// Estimated glomerular filtration rate in ml/min
pub fn egfr(p: &BodyParameters) -> f64 {
    p.ki_f_renal_function * p.ki_egfr_healthy
}

/// Creatinine clearance in ml/min
pub fn crcl(p: &BodyParameters) -> f64 {
    egfr(p) * p.ki_bsa / 1.73 * 1.1
}
