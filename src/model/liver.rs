//! Hepatic sub-model: uptake, metabolism to M4/M6/Mx, metabolite export and biliary excretion
//!
//! Cirrhosis reduces the functional liver mass by `f_cirrhosis` and shunts the
//! same fraction of portal inflow directly into the systemic circulation.
use super::{idx, BodyParameters, State, Substance};

/// Fluxes of the liver in mmole/min
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LiverFluxes {
    /// Net edoxaban uptake from plasma
    pub import_edo: f64,
    /// Conversion of edoxaban to M4, M6 and Mx
    pub metabolism: [f64; 3],
    /// Net metabolite export to plasma
    pub export: [f64; 3],
    /// Metabolite excretion into bile
    pub biliary: [f64; 3],
}

impl LiverFluxes {
    pub fn new(x: &State, p: &BodyParameters) -> Self {
        let vli = p.liver_volume();
        let vpl = p.plasma_volume();
        let functional = 1.0 - p.f_cirrhosis;

        let c_edo_li = x[idx::liver(Substance::Edo)] / vli;
        let c_edo_pl = x[idx::plasma(Substance::Edo)] / vpl;
        let import_edo = p.li_edoim_vmax * vli * (c_edo_pl - c_edo_li);

        let edo2m4 = functional * p.li_edo2m4_vmax * vli * c_edo_li;
        let metabolism = [edo2m4, p.li_edo2m6_f * edo2m4, p.li_edo2mx_f * edo2m4];

        let export_rates = [p.li_m4ex_vmax, p.li_m6ex_vmax, p.li_mxex_vmax];
        let mut export = [0.0; 3];
        let mut biliary = [0.0; 3];
        for (k, s) in Substance::METABOLITES.iter().enumerate() {
            let c_li = x[idx::liver(*s)] / vli;
            let c_pl = x[idx::plasma(*s)] / vpl;
            export[k] = export_rates[k] * vli * (c_li - c_pl);
            biliary[k] = p.li_mxexbi_k * vli * c_li;
        }

        LiverFluxes {
            import_edo,
            metabolism,
            export,
            biliary,
        }
    }

    /// Apply hepatic fluxes together with the portal inflow of absorbed edoxaban
    pub fn apply(&self, portal_inflow: f64, p: &BodyParameters, dx: &mut State) {
        let shunted = p.f_cirrhosis * portal_inflow;
        dx[idx::plasma(Substance::Edo)] += shunted - self.import_edo;
        dx[idx::liver(Substance::Edo)] +=
            portal_inflow - shunted + self.import_edo - self.metabolism.iter().sum::<f64>();

        for (k, s) in Substance::METABOLITES.iter().enumerate() {
            dx[idx::liver(*s)] += self.metabolism[k] - self.export[k] - self.biliary[k];
            dx[idx::plasma(*s)] += self.export[k];
            // bile drains into the intestinal lumen
            dx[idx::lumen(*s)] += self.biliary[k];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metabolite_ratios() {
        let p = BodyParameters::default();
        let mut x = State::zeros();
        x[idx::liver(Substance::Edo)] = 0.01;
        let f = LiverFluxes::new(&x, &p);
        assert!((f.metabolism[1] / f.metabolism[0] - p.li_edo2m6_f).abs() < 1e-12);
        assert!((f.metabolism[2] / f.metabolism[0] - p.li_edo2mx_f).abs() < 1e-12);
        assert!(f.import_edo < 0.0);
    }

    #[test]
    fn test_complete_cirrhosis_stops_metabolism() {
        let mut p = BodyParameters::default();
        p.f_cirrhosis = 1.0;
        let mut x = State::zeros();
        x[idx::liver(Substance::Edo)] = 0.01;
        let f = LiverFluxes::new(&x, &p);
        assert_eq!(f.metabolism, [0.0; 3]);

        let mut dx = State::zeros();
        LiverFluxes::default().apply(1.0, &p, &mut dx);
        assert_eq!(dx[idx::plasma(Substance::Edo)], 1.0);
        assert_eq!(dx[idx::liver(Substance::Edo)], 0.0);
    }
}
