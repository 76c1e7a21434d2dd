//! Metadata taxonomy attached to every fit mapping
use serde_derive::{Deserialize, Serialize};
use std::fmt;

macro_rules! metadata_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $($variant,)*
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

metadata_enum! {
    /// Sampled tissue
    Tissue {
        Plasma => "plasma",
        Serum => "serum",
        Urine => "urine",
        Feces => "feces",
    }
}

metadata_enum! {
    /// Route of application
    Route {
        Po => "po",
        Iv => "iv",
    }
}

metadata_enum! {
    Dosing {
        Single => "single",
        Multiple => "multiple",
        Continuous => "continuous",
    }
}

metadata_enum! {
    ApplicationForm {
        Tablet => "tablet",
        Solution => "solution",
        Capsule => "capsule",
        Mixed => "mixed",
    }
}

metadata_enum! {
    /// Health status of the subjects
    Health {
        Healthy => "healthy",
        T2dm => "T2DM",
        Hypertension => "hypertension",
        RenalImpairment => "renal impairment",
        HepaticImpairment => "hepatic impairment",
        AtrialFibrillation => "atrial fibrillation",
    }
}

metadata_enum! {
    Fasting {
        NotReported => "not reported",
        Fasted => "fasted",
        Fed => "fed",
    }
}

metadata_enum! {
    /// Drugs given together with edoxaban
    Coadministration {
        None => "none",
        Clarithromycin => "clarithromycin",
        Ritonavir => "ritonavir",
        Ketoconazole => "ketoconazole",
        Quinidine => "quinidine",
        Verapamil => "verapamil",
        Rifampicin => "rifampicin",
        Esomeprazole => "esomeprazole",
    }
}

/// Metadata of one mapping between simulation and data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingMetaData {
    pub tissue: Tissue,
    pub route: Route,
    pub application_form: ApplicationForm,
    pub dosing: Dosing,
    pub health: Health,
    pub fasting: Fasting,
    pub coadministration: Coadministration,
    /// Excluded from fitting
    pub outlier: bool,
}

impl MappingMetaData {
    /// Healthy subjects with a single oral tablet and no co-medication
    pub fn new(tissue: Tissue, fasting: Fasting) -> Self {
        MappingMetaData {
            tissue,
            route: Route::Po,
            application_form: ApplicationForm::Tablet,
            dosing: Dosing::Single,
            health: Health::Healthy,
            fasting,
            coadministration: Coadministration::None,
            outlier: false,
        }
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.route = route;
        self
    }

    pub fn with_dosing(mut self, dosing: Dosing) -> Self {
        self.dosing = dosing;
        self
    }

    pub fn with_health(mut self, health: Health) -> Self {
        self.health = health;
        self
    }

    pub fn with_coadministration(mut self, coadministration: Coadministration) -> Self {
        self.coadministration = coadministration;
        self
    }

    pub fn with_application_form(mut self, application_form: ApplicationForm) -> Self {
        self.application_form = application_form;
        self
    }

    pub fn as_outlier(mut self) -> Self {
        self.outlier = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let meta = MappingMetaData::new(Tissue::Plasma, Fasting::Fasted);
        assert_eq!(meta.route, Route::Po);
        assert_eq!(meta.coadministration, Coadministration::None);
        assert!(!meta.outlier);
        assert_eq!(Health::T2dm.to_string(), "T2DM");
    }
}
