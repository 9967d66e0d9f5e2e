//! Plugin declarations and the invocation runner.

mod descriptor;
mod runner;

pub use descriptor::RegisteredEventsPlugin;
pub use runner::{PluginError, PluginRunner};
