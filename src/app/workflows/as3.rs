use super::Session;
use crate::adapters::storage::load_declaration;
use crate::config::workflow::As3Section;
use crate::core::wait::{wait_for, PollSettings};
use crate::domain::model::WorkflowContext;
use crate::domain::ports::{Storage, Workflow};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Create, deploy, find, optionally update, and delete an AS3 declaration.
pub struct As3Workflow<S: Storage> {
    session: Session<S>,
    section: As3Section,
    polling: PollSettings,
}

impl<S: Storage> As3Workflow<S> {
    pub fn new(session: Session<S>, section: As3Section, polling: PollSettings) -> Self {
        Self {
            session,
            section,
            polling,
        }
    }

    async fn deploy(&self, context: &mut WorkflowContext, declaration_id: &str) -> Result<()> {
        let targets = &self.section.targets;
        println!(
            "Deploying AS3 declaration ID {} to {}",
            declaration_id,
            targets.join(", ")
        );

        let summary = self
            .session
            .client
            .deploy_declaration(declaration_id, targets)
            .await?;
        println!("Deployment result: {}\n", summary);

        if summary.is_complete() {
            context.step_done(format!("deploy {}", declaration_id));
        } else {
            context.warn(format!("deploy {}: {}", declaration_id, summary));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: Storage> Workflow for As3Workflow<S> {
    fn name(&self) -> &str {
        "as3"
    }

    async fn run(&self, context: &mut WorkflowContext) -> Result<()> {
        let client = &self.session.client;
        let tenant = self.section.tenant.as_str();

        println!("\nReading AS3 declaration from '{}'\n", self.section.declaration);
        let declaration = load_declaration(&self.session.storage, &self.section.declaration).await?;
        context.step_done("read declaration");

        println!("Sending AS3 declaration to CM API");
        let posted_id = client.post_declaration(&declaration).await?;
        println!("AS3 Declaration with ID {} has been created\n", posted_id);
        context.step_done("post declaration");

        self.deploy(context, &posted_id).await?;

        println!("Searching AS3 declarations for tenant named '{}'", tenant);
        let mut declaration_id = wait_for(self.polling, &format!("AS3 tenant {}", tenant), move || {
            client.get_declaration_by_name(tenant)
        })
        .await?;
        println!(
            "Successfully found AS3 tenant {} with ID {}\n",
            tenant, declaration_id
        );
        context.step_done("find tenant");

        if let Some(updated) = &self.section.updated_declaration {
            self.session.checkpoint.confirm(&format!(
                "Continue with updating AS3 declaration ID {}",
                declaration_id
            ))?;

            println!("\nReading AS3 declaration from '{}'\n", updated);
            let declaration = load_declaration(&self.session.storage, updated).await?;

            println!("Updating AS3 declaration ID {}", declaration_id);
            declaration_id = client.put_declaration(&declaration_id, &declaration).await?;
            println!("AS3 Declaration with ID {} has been updated\n", declaration_id);
            context.step_done("update declaration");
        }

        self.session.checkpoint.confirm(&format!(
            "Continue with deletion of AS3 declaration ID {}",
            declaration_id
        ))?;

        println!("Deleting declaration with ID of {}", declaration_id);
        let message = client.delete_declaration(&declaration_id).await?;
        println!("{}: {}\n", declaration_id, message);
        context.step_done("delete declaration");

        Ok(())
    }
}
