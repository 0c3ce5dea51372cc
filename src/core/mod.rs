pub mod as3;
pub mod client;
pub mod engine;
pub mod fast;
pub mod instances;
pub mod wait;

pub use crate::domain::model::{Declaration, DeploymentSummary};
pub use crate::domain::ports::{Checkpoint, Storage, Workflow};
pub use crate::utils::error::Result;
pub use client::CmClient;
pub use engine::WorkflowEngine;
