//! Coagulation sub-model: direct Emax effects of plasma edoxaban on PT, aPTT and factor Xa
use super::BodyParameters;

/// Coagulation readouts for a plasma edoxaban concentration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coagulation {
    /// Prothrombin time in s
    pub pt: f64,
    /// Activated partial thromboplastin time in s
    pub aptt: f64,
    /// Fractional inhibition of factor Xa
    pub xa_inhibition: f64,
    pt_ref: f64,
    aptt_ref: f64,
}

fn emax(e: f64, ec50: f64, c: f64) -> f64 {
    if c <= 0.0 {
        return 0.0;
    }
    e * c / (c + ec50)
}

impl Coagulation {
    /// `c_edo` is the plasma edoxaban concentration in mM
    pub fn new(c_edo: f64, p: &BodyParameters) -> Self {
        Coagulation {
            pt: p.pt_ref * (1.0 + emax(p.emax_pt, p.ec50_edo_pt, c_edo)),
            aptt: p.aptt_ref * (1.0 + emax(p.emax_aptt, p.ec50_edo_aptt, c_edo)),
            xa_inhibition: emax(p.emax_xa, p.ec50_edo_xa, c_edo),
            pt_ref: p.pt_ref,
            aptt_ref: p.aptt_ref,
        }
    }

    pub fn pt_change(&self) -> f64 {
        self.pt - self.pt_ref
    }

    pub fn pt_ratio(&self) -> f64 {
        self.pt / self.pt_ref
    }

    pub fn aptt_change(&self) -> f64 {
        self.aptt - self.aptt_ref
    }

    pub fn aptt_ratio(&self) -> f64 {
        self.aptt / self.aptt_ref
    }
}
