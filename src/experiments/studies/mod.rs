//! Published clinical studies of edoxaban
mod bathala2012;
mod brown2015;
mod chen2017a;
mod chen2017b;
mod lenard2024;
mod liu2022;
mod mendell2011;
mod ogata2010;
mod rohr2024;

pub use bathala2012::Bathala2012;
pub use brown2015::Brown2015;
pub use chen2017a::Chen2017a;
pub use chen2017b::Chen2017b;
pub use lenard2024::Lenard2024;
pub use liu2022::Liu2022;
pub use mendell2011::Mendell2011;
pub use ogata2010::Ogata2010;
pub use rohr2024::Rohr2024;

use crate::routines::units::Quantity;

pub(crate) fn hours(value: f64) -> f64 {
    value * 60.0
}

pub(crate) fn mg(value: f64) -> Quantity {
    Quantity::new(value, "mg")
}

pub(crate) fn kg(value: f64) -> Quantity {
    Quantity::new(value, "kg")
}

pub(crate) fn seconds(value: f64) -> Quantity {
    Quantity::new(value, "s")
}
