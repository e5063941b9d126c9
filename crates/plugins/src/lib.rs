mod directionality;
mod formatting;
mod links;

pub use crate::directionality::*;
pub use crate::formatting::*;
pub use crate::links::*;
