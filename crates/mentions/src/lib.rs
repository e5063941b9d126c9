mod candidate;
mod config;
mod plugin;
mod resolver;
mod session;
mod splice;

pub use crate::candidate::*;
pub use crate::config::*;
pub use crate::plugin::*;
pub use crate::resolver::*;
pub use crate::session::*;
pub use crate::splice::*;
