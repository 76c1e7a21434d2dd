use serde_derive::{Deserialize, Serialize};

use crate::error::{EdoxabanError, Result};

/// Static description of a model parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterInfo {
    pub sid: &'static str,
    pub value: f64,
    pub unit: &'static str,
    pub name: &'static str,
}

macro_rules! model_parameters {
    ($( $field:ident => $sid:literal, $value:expr, $unit:literal, $name:literal; )*) => {
        /// Numerical values of all model parameters, in the units of [PARAMETERS]
        #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
        pub struct BodyParameters {
            $(pub $field: f64,)*
        }

        impl Default for BodyParameters {
            fn default() -> Self {
                BodyParameters {
                    $($field: $value,)*
                }
            }
        }

        /// Parameter table of the whole-body model
        pub static PARAMETERS: &[ParameterInfo] = &[
            $(ParameterInfo { sid: $sid, value: $value, unit: $unit, name: $name },)*
        ];

        impl BodyParameters {
            /// Current value of the parameter `sid`
            pub fn get(&self, sid: &str) -> Option<f64> {
                match sid {
                    $($sid => Some(self.$field),)*
                    _ => None,
                }
            }

            fn slot(&mut self, sid: &str) -> Option<&mut f64> {
                match sid {
                    $($sid => Some(&mut self.$field),)*
                    _ => None,
                }
            }
        }
    };
}

model_parameters! {
    // whole body
    bw => "BW", 75.0, "kg", "body weight";
    cobw => "COBW", 0.0929, "l/min/kg", "cardiac output per body weight";
    fvpl => "FVpl", 0.0435, "l/kg", "plasma volume per body weight";
    fvli => "FVli", 0.021, "l/kg", "liver volume per body weight";
    fvki => "FVki", 0.0044, "l/kg", "kidney volume per body weight";
    fvre => "FVre", 0.5, "l/kg", "rest tissue volume per body weight";
    fqre => "FQre", 0.45, "dimensionless", "fraction of cardiac output to rest tissue";
    kp_edo => "Kp_edo", 2.0, "dimensionless", "tissue to plasma partition edoxaban";
    f_cirrhosis => "f_cirrhosis", 0.0, "dimensionless", "severity of cirrhosis";
    ki_edo => "Ki_edo", 1.386, "1/min", "application rate iv dose";
    mr_edo => "Mr_edo", 548.058, "g/mole", "molecular weight edoxaban";
    mr_m4 => "Mr_m4", 521.0, "g/mole", "molecular weight M4";
    mr_m6 => "Mr_m6", 534.0, "g/mole", "molecular weight M6";
    mr_mx => "Mr_mx", 521.0, "g/mole", "molecular weight Mx";

    // intestine
    gu_f_edo_abs => "GU__F_edo_abs", 0.82, "dimensionless", "fraction absorbed edoxaban";
    gu_edoabs_k => "GU__EDOABS_k", 0.05, "1/min", "rate of edoxaban absorption";
    gu_f_absorption => "GU__f_absorption", 1.0, "dimensionless", "scaling factor absorption";
    gu_ka_dis_edo => "GU__Ka_dis_edo", 0.15, "1/hr", "dissolution rate edoxaban tablet";
    gu_m4exc_k => "GU__M4EXC_k", 0.1, "1/min", "rate of M4 fecal excretion";
    gu_m6exc_k => "GU__M6EXC_k", 0.1, "1/min", "rate of M6 fecal excretion";
    gu_mxexc_k => "GU__MXEXC_k", 0.1, "1/min", "rate of Mx fecal excretion";

    // liver
    li_edoim_vmax => "LI__EDOIM_Vmax", 10.0, "1/min", "rate of edoxaban import";
    li_edo2m4_vmax => "LI__EDO2M4_Vmax", 0.1, "1/min", "rate of edoxaban conversion to M4";
    li_edo2m6_f => "LI__EDO2M6_f", 55.1 / 145.5, "dimensionless", "ratio of M6 to M4 conversion";
    li_edo2mx_f => "LI__EDO2MX_f", (97.6 - 72.8 - 3.49 - 2.11) / 3.49, "dimensionless", "ratio of Mx to M4 conversion";
    li_m4ex_vmax => "LI__M4EX_Vmax", 10.0, "1/min", "rate of M4 export";
    li_m6ex_vmax => "LI__M6EX_Vmax", 10.0, "1/min", "rate of M6 export";
    li_mxex_vmax => "LI__MXEX_Vmax", 10.0, "1/min", "rate of Mx export";
    li_mxexbi_k => "LI__MXEXBI_k", 1e-4, "1/min", "rate of metabolite biliary excretion";

    // kidney
    ki_bsa => "KI__BSA", 1.73, "m^2", "body surface area";
    ki_f_renal_function => "KI__f_renal_function", 1.0, "dimensionless", "scaling of renal function";
    ki_egfr_healthy => "KI__egfr_healthy", 100.0, "ml/min", "estimated GFR healthy";
    ki_edoex_k => "KI__EDOEX_k", 0.16, "1/min", "rate of edoxaban urinary excretion";
    ki_m4ex_k => "KI__M4EX_k", 0.15, "1/min", "rate of M4 urinary excretion";
    ki_m6ex_k => "KI__M6EX_k", 0.15, "1/min", "rate of M6 urinary excretion";
    ki_mxex_k => "KI__MXEX_k", 0.15, "1/min", "rate of Mx urinary excretion";

    // coagulation
    pt_ref => "PT_ref", 12.5, "s", "reference prothrombin time";
    aptt_ref => "aPTT_ref", 28.4, "s", "reference activated partial thromboplastin time";
    emax_pt => "Emax_PT", 3.55309, "dimensionless", "maximal effect on PT";
    ec50_edo_pt => "EC50_edo_PT", 0.00358, "mM", "half-maximal edoxaban concentration for PT";
    emax_aptt => "Emax_aPTT", 0.950019, "dimensionless", "maximal effect on aPTT";
    ec50_edo_aptt => "EC50_edo_aPTT", 0.0004089, "mM", "half-maximal edoxaban concentration for aPTT";
    emax_xa => "Emax_Xa", 0.686093, "dimensionless", "maximal inhibition of factor Xa";
    ec50_edo_xa => "EC50_edo_Xa", 0.0002959, "mM", "half-maximal edoxaban concentration for Xa inhibition";
}

/// Table entry of the parameter `sid`
pub fn info(sid: &str) -> Option<&'static ParameterInfo> {
    PARAMETERS.iter().find(|p| p.sid == sid)
}

impl BodyParameters {
    /// Set the parameter `sid` to `value` (given in the table unit)
    pub fn set(&mut self, sid: &str, value: f64) -> Result<()> {
        match self.slot(sid) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(EdoxabanError::UnknownSymbol(sid.to_string())),
        }
    }

    /// Molecular weight of a substance in g/mole
    pub fn mr(&self, substance: super::Substance) -> f64 {
        use super::Substance;
        match substance {
            Substance::Edo => self.mr_edo,
            Substance::M4 => self.mr_m4,
            Substance::M6 => self.mr_m6,
            Substance::Mx => self.mr_mx,
        }
    }

    pub fn plasma_volume(&self) -> f64 {
        self.fvpl * self.bw
    }

    pub fn liver_volume(&self) -> f64 {
        self.fvli * self.bw
    }

    pub fn kidney_volume(&self) -> f64 {
        self.fvki * self.bw
    }

    pub fn rest_volume(&self) -> f64 {
        self.fvre * self.bw
    }

    pub fn cardiac_output(&self) -> f64 {
        self.cobw * self.bw
    }
}
