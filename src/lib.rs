pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{AutoConfirm, LocalStorage, StdinCheckpoint};
pub use app::workflows::{As3Workflow, FastWorkflow, InstanceWorkflow, Session};
pub use config::{ConnectionSettings, WorkflowConfig};
pub use core::{CmClient, WorkflowEngine};
pub use domain::model::{
    AccessToken, ApiMethod, ApiResponse, Declaration, DeploymentSummary, InstanceProvider,
};
pub use utils::error::{CmError, Result};
