use crate::domain::model::WorkflowContext;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Operator pause between workflow phases. Returning an error stops the run.
pub trait Checkpoint: Send + Sync {
    fn confirm(&self, prompt: &str) -> Result<()>;
}

#[async_trait]
pub trait Workflow: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self, context: &mut WorkflowContext) -> Result<()>;
}
