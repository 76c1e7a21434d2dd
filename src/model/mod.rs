//! Whole-body PBPK/PD model of edoxaban and its metabolites M4, M6 and Mx
//!
//! The model is assembled from the intestine, liver, kidney and coagulation
//! sub-models. Amounts are in mmole, volumes in l and time in min; the two
//! dose states are tracked in mg.
pub mod body;
pub mod coagulation;
pub mod intestine;
pub mod kidney;
pub mod liver;
pub mod parameters;

use serde_derive::{Deserialize, Serialize};
use std::fmt;

pub use body::{outputs, Body, OUTPUTS};
pub use parameters::{BodyParameters, ParameterInfo, PARAMETERS};

/// Number of state variables of the whole-body model
pub const N_STATES: usize = 23;

pub type State = ode_solvers::SVector<f64, N_STATES>;

/// Substances tracked by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Substance {
    Edo,
    M4,
    M6,
    Mx,
}

impl Substance {
    pub const ALL: [Substance; 4] = [Substance::Edo, Substance::M4, Substance::M6, Substance::Mx];
    pub const METABOLITES: [Substance; 3] = [Substance::M4, Substance::M6, Substance::Mx];

    pub fn index(&self) -> usize {
        match self {
            Substance::Edo => 0,
            Substance::M4 => 1,
            Substance::M6 => 2,
            Substance::Mx => 3,
        }
    }

    /// Suffix used in model symbols, e.g. `edo` in `[Cve_edo]`
    pub fn suffix(&self) -> &'static str {
        match self {
            Substance::Edo => "edo",
            Substance::M4 => "m4",
            Substance::M6 => "m6",
            Substance::Mx => "mx",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Substance> {
        Substance::ALL.into_iter().find(|s| s.suffix() == suffix)
    }
}

impl fmt::Display for Substance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// Which equations are integrated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelKind {
    /// The complete whole-body model
    #[default]
    Body,
    /// Coagulation readouts only, plasma edoxaban is held at the value it is set to
    Coagulation,
}

/// Positions of the model states in [State]
pub mod idx {
    use super::Substance;

    pub const PODOSE_EDO: usize = 0;
    pub const IVDOSE_EDO: usize = 1;
    const LUMEN: usize = 2;
    const FECES: usize = 6;
    const PLASMA: usize = 10;
    const LIVER: usize = 14;
    pub const REST_EDO: usize = 18;
    const URINE: usize = 19;

    pub fn lumen(s: Substance) -> usize {
        LUMEN + s.index()
    }

    pub fn feces(s: Substance) -> usize {
        FECES + s.index()
    }

    pub fn plasma(s: Substance) -> usize {
        PLASMA + s.index()
    }

    pub fn liver(s: Substance) -> usize {
        LIVER + s.index()
    }

    pub fn urine(s: Substance) -> usize {
        URINE + s.index()
    }
}

/// How a symbol addresses the state vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTarget {
    /// Dose state in mg
    Dose(usize),
    /// Amount state in mmole
    Amount(usize),
    /// Plasma concentration in mM, stored as plasma amount
    PlasmaConcentration(Substance),
}

impl StateTarget {
    /// Resolve a state symbol such as `PODOSE_edo`, `Aurine_m4` or `[Cve_edo]`
    pub fn resolve(sid: &str) -> Option<StateTarget> {
        match sid {
            "PODOSE_edo" => return Some(StateTarget::Dose(idx::PODOSE_EDO)),
            "IVDOSE_edo" => return Some(StateTarget::Dose(idx::IVDOSE_EDO)),
            "Are_edo" => return Some(StateTarget::Amount(idx::REST_EDO)),
            _ => {}
        }
        if let Some(inner) = sid.strip_prefix("[Cve_").and_then(|s| s.strip_suffix(']')) {
            return Substance::from_suffix(inner).map(StateTarget::PlasmaConcentration);
        }
        let (prefix, suffix) = sid.split_once('_')?;
        let substance = Substance::from_suffix(suffix)?;
        let index = match prefix {
            "Alumen" => idx::lumen(substance),
            "Afeces" => idx::feces(substance),
            "Aplasma" => idx::plasma(substance),
            "Ali" => idx::liver(substance),
            "Aurine" => idx::urine(substance),
            _ => return None,
        };
        Some(StateTarget::Amount(index))
    }

    /// Unit in which values for this target are given
    pub fn unit(&self) -> &'static str {
        match self {
            StateTarget::Dose(_) => "mg",
            StateTarget::Amount(_) => "mmole",
            StateTarget::PlasmaConcentration(_) => "mM",
        }
    }

    /// Write `value` (in [StateTarget::unit]) into the state vector
    pub fn assign(&self, x: &mut State, value: f64, p: &BodyParameters) {
        match self {
            StateTarget::Dose(i) | StateTarget::Amount(i) => x[*i] = value,
            StateTarget::PlasmaConcentration(s) => x[idx::plasma(*s)] = value * p.plasma_volume(),
        }
    }
}
