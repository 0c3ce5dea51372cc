#[cfg(feature = "cli")]
pub mod cli;
pub mod env;
pub mod workflow;

pub use env::{ConnectionSettings, F5osSettings};
pub use workflow::WorkflowConfig;
