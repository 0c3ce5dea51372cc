use super::Session;
use crate::adapters::storage::load_declaration;
use crate::config::workflow::InstanceSection;
use crate::core::wait::{wait_for, PollSettings};
use crate::domain::model::{TenantDeletion, WorkflowContext};
use crate::domain::ports::{Storage, Workflow};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Instantiate a BIG-IP Next instance on an F5OS provider, wait for it to be
/// discovered, then remove it from Central Manager and the provider.
pub struct InstanceWorkflow<S: Storage> {
    session: Session<S>,
    section: InstanceSection,
    polling: PollSettings,
}

impl<S: Storage> InstanceWorkflow<S> {
    pub fn new(session: Session<S>, section: InstanceSection, polling: PollSettings) -> Self {
        Self {
            session,
            section,
            polling,
        }
    }

    fn tenant_name(&self) -> &str {
        self.section
            .tenant_name
            .as_deref()
            .unwrap_or(&self.section.instance_name)
    }
}

#[async_trait]
impl<S: Storage> Workflow for InstanceWorkflow<S> {
    fn name(&self) -> &str {
        "instance"
    }

    async fn run(&self, context: &mut WorkflowContext) -> Result<()> {
        let client = &self.session.client;
        let section = &self.section;

        let provider_id = client.get_f5os_provider_by_name(&section.provider_name).await?;
        println!("F5OS provider '{}' has ID {}", section.provider_name, provider_id);
        context.step_done("find provider");

        println!("\nReading instance declaration from '{}'\n", section.declaration);
        let declaration = load_declaration(&self.session.storage, &section.declaration).await?;

        let task = client
            .post_instance_instantiation(section.provider, &declaration)
            .await?;
        println!("Instantiation of '{}' started: {}", section.instance_name, task);
        context.step_done("start instantiation");

        self.session.checkpoint.confirm(&format!(
            "Wait for instance '{}' to be discovered",
            section.instance_name
        ))?;

        let hostname = section.instance_name.as_str();
        let instance_id = wait_for(self.polling, &format!("instance {}", hostname), move || {
            client.get_instance_by_name(hostname)
        })
        .await?;
        println!("Instance '{}' discovered with ID {}", hostname, instance_id);
        context.step_done("discover instance");

        self.session
            .checkpoint
            .confirm("Continue with instance/tenant deletion")?;

        let deletion = client
            .delete_instance(&instance_id, self.tenant_name())
            .await?;
        println!("Instance deletion status: {}", deletion.cm_status);
        let cm_accepted = deletion.cm_accepted();
        if !cm_accepted {
            context.warn(format!(
                "instance {} deletion rejected with status {}: {}",
                instance_id, deletion.cm_status, deletion.cm_body
            ));
        }
        match deletion.tenant {
            TenantDeletion::Deleted { status } => {
                println!("F5OS tenant deletion status: {}", status);
                context.step_done(if cm_accepted {
                    "delete instance and tenant"
                } else {
                    "delete tenant"
                });
            }
            TenantDeletion::Failed { status } => {
                println!("F5OS tenant deletion status: {}", status);
                if cm_accepted {
                    context.step_done("delete instance");
                }
                context.warn(format!(
                    "F5OS tenant '{}' deletion failed with status {}",
                    self.tenant_name(),
                    status
                ));
            }
            TenantDeletion::Skipped => {
                if cm_accepted {
                    context.step_done("delete instance");
                }
                context.warn(format!(
                    "F5OS tenant '{}' not deleted: no F5OS endpoint configured",
                    self.tenant_name()
                ));
            }
        }

        Ok(())
    }
}
