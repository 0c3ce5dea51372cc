//! F5OS providers and BIG-IP Next instance lifecycle.

use crate::core::client::{expect_success, parse_body, rejected, required_str, CmClient};
use crate::domain::model::{
    ApiMethod, Declaration, InstanceDeletion, InstanceProvider, TenantDeletion,
};
use crate::utils::error::{CmError, Result};
use serde_json::{json, Value};

const PROVIDERS_PATH: &str = "/api/v1/spaces/default/providers/f5os";
const INSTANCES_PATH: &str = "/api/v1/spaces/default/instances";

impl CmClient {
    pub async fn get_f5os_provider_by_name(&self, name: &str) -> Result<String> {
        let response = self.request(ApiMethod::Get, PROVIDERS_PATH, None).await?;
        if !response.is_success() {
            return Err(rejected("get_f5os_provider_by_name", response));
        }

        response
            .find_embedded_id("providers", "name", name)
            .ok_or_else(|| CmError::NotFoundError {
                message: format!("Unable to find F5OS provider with name '{}'", name),
            })
    }

    /// Starts instantiating a BIG-IP Next instance and returns the task path.
    pub async fn post_instance_instantiation(
        &self,
        provider: InstanceProvider,
        declaration: &Declaration,
    ) -> Result<String> {
        let path = format!("{}/instantiation/{}", INSTANCES_PATH, provider);
        let response = self
            .request(ApiMethod::Post, &path, Some(declaration.as_value()))
            .await?;
        tracing::debug!("post_instance_instantiation response: {}", response.body);

        let response = expect_success("post_instance_instantiation", response)?;
        let task = required_str("post_instance_instantiation", &response, "path")?;
        tracing::info!("🛠️ Instantiation on {} started: {}", provider, task);
        Ok(task)
    }

    /// Looks an instance up by hostname and returns its id.
    pub async fn get_instance_by_name(&self, hostname: &str) -> Result<String> {
        let response = self.request(ApiMethod::Get, INSTANCES_PATH, None).await?;
        if !response.is_success() {
            return Err(rejected("get_instance_by_name", response));
        }

        response
            .find_embedded_id("devices", "hostname", hostname)
            .ok_or_else(|| CmError::NotFoundError {
                message: format!("Unable to find BIG-IP Next instance with name '{}'", hostname),
            })
    }

    /// Fetches a task document such as the one returned by instantiation or deletion.
    pub async fn get_task(&self, task_path: &str) -> Result<Value> {
        let response = self.request(ApiMethod::Get, task_path, None).await?;
        Ok(expect_success("get_task", response)?.body)
    }

    /// Removes an instance from Central Manager (keeping a backup), then
    /// removes the tenant from the F5OS appliance hosting it.
    ///
    /// Deleting through Central Manager alone leaves the tenant running on
    /// the provider, so the tenant step runs whatever Central Manager answers;
    /// check [`InstanceDeletion::cm_accepted`]. Without F5OS settings the
    /// second step is skipped.
    pub async fn delete_instance(
        &self,
        instance_id: &str,
        tenant_name: &str,
    ) -> Result<InstanceDeletion> {
        let path = format!("{}/{}", INSTANCES_PATH, instance_id);
        let body = json!({ "save_backup": true });
        let response = self.request(ApiMethod::Delete, &path, Some(&body)).await?;
        tracing::info!(
            "🗑️ Instance {} deletion requested, status {}",
            instance_id,
            response.status
        );

        let task_path = response.str_field("path").map(str::to_string);
        if !response.is_success() {
            tracing::error!(
                "❌ delete_instance failed with status {}: {}",
                response.status,
                response.body
            );
        }

        let tenant = self.delete_f5os_tenant(tenant_name).await?;
        Ok(InstanceDeletion {
            cm_status: response.status,
            cm_body: response.body,
            task_path,
            tenant,
        })
    }

    /// Deletes a tenant through the F5OS restconf API with basic auth.
    pub async fn delete_f5os_tenant(&self, tenant_name: &str) -> Result<TenantDeletion> {
        let Some(f5os) = self.f5os() else {
            tracing::warn!(
                "⚠️ F5OS_ENDPOINT not configured, tenant '{}' left on its provider",
                tenant_name
            );
            return Ok(TenantDeletion::Skipped);
        };

        let url = format!(
            "{}/restconf/data/f5-tenants:tenants/tenant={}",
            f5os.endpoint, tenant_name
        );
        tracing::debug!("📡 DELETE {}", url);

        let response = self
            .http()
            .delete(&url)
            .basic_auth(&f5os.username, Some(&f5os.password))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = parse_body(&response.bytes().await?);
            tracing::error!(
                "❌ F5OS tenant '{}' deletion failed with status {}: {}",
                tenant_name,
                status,
                body
            );
            return Ok(TenantDeletion::Failed {
                status: status.as_u16(),
            });
        }

        tracing::info!("🗑️ F5OS tenant '{}' deleted", tenant_name);
        Ok(TenantDeletion::Deleted {
            status: status.as_u16(),
        })
    }
}
