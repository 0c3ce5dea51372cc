//! AS3 declaration lifecycle under `/mgmt/shared/appsvcs/declare`.

use crate::core::client::{expect_success, rejected, required_str, CmClient};
use crate::domain::model::{ApiMethod, Declaration, DeploymentSummary};
use crate::utils::error::{CmError, Result};
use serde_json::{json, Value};

const DECLARE_PATH: &str = "/mgmt/shared/appsvcs/declare";

fn declaration_path(declaration_id: &str) -> String {
    format!("{}/{}", DECLARE_PATH, declaration_id)
}

impl CmClient {
    /// Creates a declaration and returns its id.
    pub async fn post_declaration(&self, declaration: &Declaration) -> Result<String> {
        let response = self
            .request(ApiMethod::Post, DECLARE_PATH, Some(declaration.as_value()))
            .await?;
        let response = expect_success("post_declaration", response)?;
        let id = required_str("post_declaration", &response, "id")?;
        tracing::info!("📄 AS3 declaration {} created", id);
        Ok(id)
    }

    pub async fn patch_declaration(&self, declaration: &Declaration) -> Result<String> {
        let response = self
            .request(ApiMethod::Patch, DECLARE_PATH, Some(declaration.as_value()))
            .await?;
        tracing::debug!("patch_declaration response: {}", response.body);
        let response = expect_success("patch_declaration", response)?;
        required_str("patch_declaration", &response, "id")
    }

    /// Replaces an existing declaration; the server may hand back a new id.
    pub async fn put_declaration(
        &self,
        declaration_id: &str,
        declaration: &Declaration,
    ) -> Result<String> {
        let response = self
            .request(
                ApiMethod::Put,
                &declaration_path(declaration_id),
                Some(declaration.as_value()),
            )
            .await?;
        let response = expect_success("put_declaration", response)?;
        required_str("put_declaration", &response, "id")
    }

    /// Deletes a declaration and returns the server's message.
    pub async fn delete_declaration(&self, declaration_id: &str) -> Result<String> {
        let response = self
            .request(ApiMethod::Delete, &declaration_path(declaration_id), None)
            .await?;
        let response = expect_success("delete_declaration", response)?;
        required_str("delete_declaration", &response, "message")
    }

    pub async fn get_declaration(&self, declaration_id: &str) -> Result<Value> {
        let response = self
            .request(ApiMethod::Get, &declaration_path(declaration_id), None)
            .await?;
        Ok(expect_success("get_declaration", response)?.body)
    }

    pub async fn list_declarations(&self) -> Result<Vec<Value>> {
        let response = self.request(ApiMethod::Get, DECLARE_PATH, None).await?;
        let response = expect_success("list_declarations", response)?;
        Ok(response.embedded("appsvcs").to_vec())
    }

    /// Finds the declaration that owns `tenant_name` and returns its id.
    pub async fn get_declaration_by_name(&self, tenant_name: &str) -> Result<String> {
        let response = self.request(ApiMethod::Get, DECLARE_PATH, None).await?;
        if !response.is_success() {
            return Err(rejected("get_declaration_by_name", response));
        }

        response
            .find_embedded_id("appsvcs", "tenant_name", tenant_name)
            .ok_or_else(|| CmError::NotFoundError {
                message: format!("Unable to find deployment with tenant name {}", tenant_name),
            })
    }

    /// Deploys a declaration to each target in turn. Only 202 counts as
    /// accepted; a failed target, including one that cannot be reached,
    /// does not stop the remaining ones. A failed login does.
    pub async fn deploy_declaration(
        &self,
        declaration_id: &str,
        targets: &[String],
    ) -> Result<DeploymentSummary> {
        let path = format!("{}/deployments", declaration_path(declaration_id));
        let mut summary = DeploymentSummary::default();

        for target in targets {
            let body = json!({ "target": target });
            let response = match self.request(ApiMethod::Post, &path, Some(&body)).await {
                Ok(response) => response,
                Err(e @ CmError::AuthenticationError { .. }) => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        "🚀 Deployment of {} to {} failed: {}",
                        declaration_id,
                        target,
                        e
                    );
                    summary.record_failure(target);
                    continue;
                }
            };

            if response.status == 202 {
                tracing::info!("🚀 Deployment of {} to {} accepted", declaration_id, target);
                summary.record_success(target, response.body);
            } else {
                tracing::warn!(
                    "🚀 Deployment of {} to {} failed with status {}: {}",
                    declaration_id,
                    target,
                    response.status,
                    response.body
                );
                summary.record_failure(target);
            }
        }

        Ok(summary)
    }
}
