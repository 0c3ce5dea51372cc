pub mod as3;
pub mod fast;
pub mod instance;

pub use as3::As3Workflow;
pub use fast::FastWorkflow;
pub use instance::InstanceWorkflow;

use crate::core::client::CmClient;
use crate::domain::ports::{Checkpoint, Storage};
use std::sync::Arc;

/// What every workflow needs: the API client, somewhere to read
/// declarations from and a way to pause for the operator.
#[derive(Clone)]
pub struct Session<S: Storage> {
    pub client: Arc<CmClient>,
    pub storage: S,
    pub checkpoint: Arc<dyn Checkpoint>,
}

impl<S: Storage> Session<S> {
    pub fn new(client: Arc<CmClient>, storage: S, checkpoint: Arc<dyn Checkpoint>) -> Self {
        Self {
            client,
            storage,
            checkpoint,
        }
    }
}
