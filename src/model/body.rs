//! Whole-body model combining the sub-models with plasma, rest tissue and dose states
use super::coagulation::Coagulation;
use super::intestine::IntestineFluxes;
use super::liver::LiverFluxes;
use super::{idx, kidney, BodyParameters, ModelKind, State, Substance, N_STATES};

pub const N_OUTPUTS: usize = 30;

/// Model outputs with their model units
pub const OUTPUTS: [(&str, &str); N_OUTPUTS] = [
    ("[Cve_edo]", "mM"),
    ("[Cve_m4]", "mM"),
    ("[Cve_m6]", "mM"),
    ("[Cve_mx]", "mM"),
    ("[Cve_edo_total]", "mM"),
    ("Aurine_edo", "mmole"),
    ("Aurine_m4", "mmole"),
    ("Aurine_m6", "mmole"),
    ("Aurine_mx", "mmole"),
    ("Aurine_edo_total", "mmole"),
    ("Afeces_edo", "mmole"),
    ("Afeces_m4", "mmole"),
    ("Afeces_m6", "mmole"),
    ("Afeces_mx", "mmole"),
    ("Afeces_edo_total", "mmole"),
    ("PT", "s"),
    ("PT_change", "s"),
    ("PT_ratio", "dimensionless"),
    ("aPTT", "s"),
    ("aPTT_change", "s"),
    ("aPTT_ratio", "dimensionless"),
    ("Xa_inhibition", "dimensionless"),
    ("PODOSE_edo", "mg"),
    ("IVDOSE_edo", "mg"),
    ("KI__f_renal_function", "dimensionless"),
    ("KI__egfr", "ml/min"),
    ("KI__crcl", "ml/min"),
    ("f_cirrhosis", "dimensionless"),
    ("GU__F_edo_abs", "dimensionless"),
    ("BW", "kg"),
];

/// Position of an output in [OUTPUTS]
pub fn output_index(sid: &str) -> Option<usize> {
    OUTPUTS.iter().position(|(name, _)| *name == sid)
}

/// Model unit of an output
pub fn output_unit(sid: &str) -> Option<&'static str> {
    OUTPUTS.iter().find(|(name, _)| *name == sid).map(|(_, unit)| *unit)
}

/// Evaluate all outputs for a state, in the order of [OUTPUTS]
pub fn outputs(x: &State, p: &BodyParameters) -> [f64; N_OUTPUTS] {
    let vpl = p.plasma_volume();
    let mut y = [0.0; N_OUTPUTS];
    for s in Substance::ALL {
        let k = s.index();
        y[k] = x[idx::plasma(s)] / vpl;
        y[4] += y[k];
        y[5 + k] = x[idx::urine(s)];
        y[9] += y[5 + k];
        y[10 + k] = x[idx::feces(s)];
        y[14] += y[10 + k];
    }
    let coag = Coagulation::new(y[0], p);
    y[15] = coag.pt;
    y[16] = coag.pt_change();
    y[17] = coag.pt_ratio();
    y[18] = coag.aptt;
    y[19] = coag.aptt_change();
    y[20] = coag.aptt_ratio();
    y[21] = coag.xa_inhibition;
    y[22] = x[idx::PODOSE_EDO];
    y[23] = x[idx::IVDOSE_EDO];
    y[24] = p.ki_f_renal_function;
    y[25] = kidney::egfr(p);
    y[26] = kidney::crcl(p);
    y[27] = p.f_cirrhosis;
    y[28] = p.gu_f_edo_abs;
    y[29] = p.bw;
    y
}

/// Right-hand side of the model for a fixed parameter set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub parameters: BodyParameters,
    pub kind: ModelKind,
}

impl Body {
    pub fn new(parameters: BodyParameters, kind: ModelKind) -> Self {
        Body { parameters, kind }
    }

    /// Time derivatives of the state in mmole/min (mg/min for the dose states)
    pub fn derivatives(&self, x: &State, dx: &mut State) {
        dx.fill(0.0);
        if self.kind == ModelKind::Coagulation {
            return;
        }
        let p = &self.parameters;

        let gut = IntestineFluxes::new(x, p);
        gut.apply(p, dx);

        let iv = p.ki_edo * x[idx::IVDOSE_EDO] / p.mr_edo;
        dx[idx::IVDOSE_EDO] -= iv * p.mr_edo;
        dx[idx::plasma(Substance::Edo)] += iv;

        let liver = LiverFluxes::new(x, p);
        liver.apply(gut.absorption, p, dx);

        let renal = kidney::excretion(x, p);
        kidney::apply(&renal, dx);

        // perfusion-limited distribution into the rest of the body
        let q_re = p.fqre * p.cardiac_output();
        let c_pl = x[idx::plasma(Substance::Edo)] / p.plasma_volume();
        let c_re = x[idx::REST_EDO] / p.rest_volume();
        let distribution = q_re * (c_pl - c_re / p.kp_edo);
        dx[idx::plasma(Substance::Edo)] -= distribution;
        dx[idx::REST_EDO] += distribution;
    }

    /// Total drug-related amount in mmole, including the remaining doses
    pub fn total_amount(&self, x: &State) -> f64 {
        let p = &self.parameters;
        let doses = (x[idx::PODOSE_EDO] + x[idx::IVDOSE_EDO]) / p.mr_edo;
        let amounts: f64 = (0..N_STATES)
            .filter(|i| *i != idx::PODOSE_EDO && *i != idx::IVDOSE_EDO)
            .map(|i| x[i])
            .sum();
        doses + amounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_state() -> State {
        let mut x = State::zeros();
        x[idx::PODOSE_EDO] = 30.0;
        x[idx::IVDOSE_EDO] = 10.0;
        x[idx::lumen(Substance::Edo)] = 0.02;
        x[idx::plasma(Substance::Edo)] = 0.01;
        x[idx::liver(Substance::Edo)] = 0.005;
        x[idx::liver(Substance::M4)] = 0.001;
        x[idx::plasma(Substance::M6)] = 0.001;
        x[idx::lumen(Substance::Mx)] = 0.002;
        x[idx::REST_EDO] = 0.03;
        x
    }

    #[test]
    fn test_derivatives_conserve_mass() {
        let body = Body::new(BodyParameters::default(), ModelKind::Body);
        let x = loaded_state();
        let mut dx = State::zeros();
        body.derivatives(&x, &mut dx);
        let p = &body.parameters;
        let net = (dx[idx::PODOSE_EDO] + dx[idx::IVDOSE_EDO]) / p.mr_edo
            + (0..N_STATES)
                .filter(|i| *i != idx::PODOSE_EDO && *i != idx::IVDOSE_EDO)
                .map(|i| dx[i])
                .sum::<f64>();
        assert!(net.abs() < 1e-12, "net flux {}", net);
    }

    #[test]
    fn test_coagulation_model_is_static() {
        let body = Body::new(BodyParameters::default(), ModelKind::Coagulation);
        let mut dx = State::zeros();
        body.derivatives(&loaded_state(), &mut dx);
        assert!(dx.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_outputs_of_empty_state() {
        let p = BodyParameters::default();
        let y = outputs(&State::zeros(), &p);
        assert!(y[..15].iter().all(|v| *v == 0.0));
        assert_eq!(y[output_index("PT").unwrap()], p.pt_ref);
        assert_eq!(y[output_index("aPTT_ratio").unwrap()], 1.0);
        assert_eq!(y[output_index("BW").unwrap()], 75.0);
    }

    #[test]
    fn test_total_outputs() {
        let p = BodyParameters::default();
        let mut x = State::zeros();
        x[idx::urine(Substance::Edo)] = 1.0;
        x[idx::urine(Substance::M4)] = 2.0;
        let y = outputs(&x, &p);
        assert_eq!(y[output_index("Aurine_edo_total").unwrap()], 3.0);
        assert_eq!(output_unit("[Cve_m6]"), Some("mM"));
    }
}
