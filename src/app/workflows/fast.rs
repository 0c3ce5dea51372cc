use super::Session;
use crate::adapters::storage::load_declaration;
use crate::config::workflow::FastSection;
use crate::core::wait::{wait_for, PollSettings};
use crate::domain::model::WorkflowContext;
use crate::domain::ports::{Storage, Workflow};
use crate::utils::error::Result;
use async_trait::async_trait;

pub struct FastWorkflow<S: Storage> {
    session: Session<S>,
    section: FastSection,
    polling: PollSettings,
}

impl<S: Storage> FastWorkflow<S> {
    pub fn new(session: Session<S>, section: FastSection, polling: PollSettings) -> Self {
        Self {
            session,
            section,
            polling,
        }
    }
}

#[async_trait]
impl<S: Storage> Workflow for FastWorkflow<S> {
    fn name(&self) -> &str {
        "fast"
    }

    async fn run(&self, context: &mut WorkflowContext) -> Result<()> {
        let client = &self.session.client;

        println!("\nReading FAST template from '{}'\n", self.section.template);
        let template = load_declaration(&self.session.storage, &self.section.template).await?;
        println!("Reading FAST deployment from '{}'\n", self.section.deployment);
        let deployment = load_declaration(&self.session.storage, &self.section.deployment).await?;
        context.step_done("read declarations");

        println!("Sending FAST Application Service template declaration to CM API");
        let appsvc_id = client.post_fast_appsvc(&template).await?;
        println!("FAST Application Service with ID {} has been created\n", appsvc_id);
        context.step_done("post application service");

        self.session
            .checkpoint
            .confirm(&format!("Deploy FAST Application Service ID {}", appsvc_id))?;

        println!("Deploying FAST Application Service ID {}", appsvc_id);
        let deployed = match client.deploy_fast_appsvc(&appsvc_id, &deployment).await {
            Ok(result) => {
                println!("FAST Application Deployment accepted:\n{:#}\n", result);
                context.step_done("deploy application service");
                true
            }
            // The application service still exists; fall through to deletion.
            Err(e) => {
                println!("FAST Application Deployment failed: {}\n", e);
                context.warn(format!("deploy {}: {}", appsvc_id, e));
                false
            }
        };

        if let Some(tenant) = self.section.tenant.as_deref().filter(|_| deployed) {
            println!("Waiting for FAST tenant '{}'", tenant);
            let found = wait_for(self.polling, &format!("FAST tenant {}", tenant), move || {
                client.get_fast_appsvc_by_name(tenant)
            })
            .await?;
            println!("Found FAST tenant {} with ID {}\n", tenant, found);
            context.step_done("find tenant");
        }

        self.session.checkpoint.confirm(&format!(
            "Continue with deletion of FAST Application Service ID {}",
            appsvc_id
        ))?;

        println!("Deleting FAST Application Service with ID of {}", appsvc_id);
        let deleted = client.delete_fast_appsvc(&appsvc_id).await?;
        println!("FAST Application Service deletion response:\n{:#}\n", deleted);
        context.step_done("delete application service");

        Ok(())
    }
}
