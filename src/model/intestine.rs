//! Intestinal sub-model: tablet dissolution, absorption and fecal excretion
use super::{idx, BodyParameters, State, Substance};

/// Fluxes of the intestine in mmole/min
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntestineFluxes {
    /// Dissolution of the oral dose into the lumen
    pub dissolution: f64,
    /// Edoxaban absorbed into the portal vein
    pub absorption: f64,
    /// Unabsorbed edoxaban excreted in feces
    pub excretion_edo: f64,
    /// Fecal excretion of M4, M6 and Mx
    pub excretion_metabolites: [f64; 3],
}

impl IntestineFluxes {
    pub fn new(x: &State, p: &BodyParameters) -> Self {
        let dissolution = p.gu_ka_dis_edo / 60.0 * x[idx::PODOSE_EDO] / p.mr_edo;
        let absorption_edo = p.gu_f_absorption * p.gu_edoabs_k * x[idx::lumen(Substance::Edo)];

        let rates = [p.gu_m4exc_k, p.gu_m6exc_k, p.gu_mxexc_k];
        let mut excretion_metabolites = [0.0; 3];
        for (k, s) in Substance::METABOLITES.iter().enumerate() {
            excretion_metabolites[k] = p.gu_f_absorption * rates[k] * x[idx::lumen(*s)];
        }

        IntestineFluxes {
            dissolution,
            absorption: p.gu_f_edo_abs * absorption_edo,
            excretion_edo: (1.0 - p.gu_f_edo_abs) * absorption_edo,
            excretion_metabolites,
        }
    }

    /// Apply the fluxes to the lumen, dose and feces states
    pub fn apply(&self, p: &BodyParameters, dx: &mut State) {
        dx[idx::PODOSE_EDO] -= self.dissolution * p.mr_edo;
        dx[idx::lumen(Substance::Edo)] += self.dissolution - self.absorption - self.excretion_edo;
        dx[idx::feces(Substance::Edo)] += self.excretion_edo;
        for (k, s) in Substance::METABOLITES.iter().enumerate() {
            dx[idx::lumen(*s)] -= self.excretion_metabolites[k];
            dx[idx::feces(*s)] += self.excretion_metabolites[k];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorption_split() {
        let p = BodyParameters::default();
        let mut x = State::zeros();
        x[idx::lumen(Substance::Edo)] = 0.1;
        let f = IntestineFluxes::new(&x, &p);
        let total = f.absorption + f.excretion_edo;
        assert!((total - p.gu_edoabs_k * 0.1).abs() < 1e-15);
        assert!((f.absorption / total - p.gu_f_edo_abs).abs() < 1e-12);
    }

    #[test]
    fn test_dissolution_of_tablet() {
        let p = BodyParameters::default();
        let mut x = State::zeros();
        x[idx::PODOSE_EDO] = 60.0;
        let f = IntestineFluxes::new(&x, &p);
        let mut dx = State::zeros();
        f.apply(&p, &mut dx);
        assert!((dx[idx::PODOSE_EDO] + p.gu_ka_dis_edo / 60.0 * 60.0).abs() < 1e-12);
        assert!(dx[idx::lumen(Substance::Edo)] > 0.0);
    }
}
