mod command;
mod config;
mod error;
mod event;
mod field;
mod host;
pub mod icons;
pub mod markup;
mod panel;
mod plugin;
mod surface;
mod toolbar;

pub use crate::command::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::event::*;
pub use crate::field::*;
pub use crate::host::*;
pub use crate::markup::{Attrs, Element, NBSP, Node, ZERO_WIDTH_SPACE};
pub use crate::panel::*;
pub use crate::plugin::*;
pub use crate::surface::*;
pub use crate::toolbar::*;
