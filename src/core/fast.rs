//! FAST application services under `/mgmt/shared/fast/appsvcs`.

use crate::core::client::{expect_success, rejected, required_str, CmClient};
use crate::domain::model::{ApiMethod, Declaration};
use crate::utils::error::{CmError, Result};
use serde_json::Value;

const APPSVCS_PATH: &str = "/mgmt/shared/fast/appsvcs/";

fn appsvc_path(appsvc_id: &str) -> String {
    format!("{}{}", APPSVCS_PATH, appsvc_id)
}

impl CmClient {
    /// Creates an application service from a FAST template declaration.
    pub async fn post_fast_appsvc(&self, template: &Declaration) -> Result<String> {
        let response = self
            .request(ApiMethod::Post, APPSVCS_PATH, Some(template.as_value()))
            .await?;
        tracing::debug!("post_fast_appsvc response:\n{:#}", response.body);

        match response.status {
            // The server reports template errors as 500 with a message.
            500 => {
                let message = response
                    .str_field("message")
                    .unwrap_or("internal server error")
                    .to_string();
                tracing::error!("❌ post_fast_appsvc failed: {}", message);
                Err(CmError::RejectedError {
                    operation: "post_fast_appsvc".to_string(),
                    status: 500,
                    body: Value::String(message),
                })
            }
            _ if !response.is_success() => Err(rejected("post_fast_appsvc", response)),
            _ => {
                let id = required_str("post_fast_appsvc", &response, "id")?;
                tracing::info!("🧩 FAST application service {} created", id);
                Ok(id)
            }
        }
    }

    pub async fn patch_fast_appsvc(&self, appsvc_id: &str, declaration: &Declaration) -> Result<String> {
        let response = self
            .request(
                ApiMethod::Patch,
                &appsvc_path(appsvc_id),
                Some(declaration.as_value()),
            )
            .await?;
        tracing::debug!("patch_fast_appsvc response: {}", response.body);
        let response = expect_success("patch_fast_appsvc", response)?;
        required_str("patch_fast_appsvc", &response, "id")
    }

    /// Deletes an application service and its deployments; returns the response body.
    pub async fn delete_fast_appsvc(&self, appsvc_id: &str) -> Result<Value> {
        let response = self
            .request(ApiMethod::Delete, &appsvc_path(appsvc_id), None)
            .await?;
        tracing::debug!("delete_fast_appsvc response:\n{:#}", response.body);
        Ok(expect_success("delete_fast_appsvc", response)?.body)
    }

    /// Deploys an application service. Only 202 counts as accepted.
    pub async fn deploy_fast_appsvc(&self, appsvc_id: &str, deployment: &Declaration) -> Result<Value> {
        let path = format!("{}/deployments", appsvc_path(appsvc_id));
        let response = self
            .request(ApiMethod::Post, &path, Some(deployment.as_value()))
            .await?;
        tracing::debug!("deploy_fast_appsvc response:\n{:#}", response.body);

        if response.status == 202 {
            tracing::info!("🚀 FAST application service {} deployment accepted", appsvc_id);
            Ok(response.body)
        } else {
            Err(rejected("deploy_fast_appsvc", response))
        }
    }

    pub async fn list_fast_appsvcs(&self) -> Result<Vec<Value>> {
        let response = self.request(ApiMethod::Get, APPSVCS_PATH, None).await?;
        let response = expect_success("list_fast_appsvcs", response)?;
        Ok(response.embedded("appsvcs").to_vec())
    }

    pub async fn get_fast_appsvc_by_name(&self, tenant_name: &str) -> Result<String> {
        let response = self.request(ApiMethod::Get, APPSVCS_PATH, None).await?;
        if !response.is_success() {
            return Err(rejected("get_fast_appsvc_by_name", response));
        }

        response
            .find_embedded_id("appsvcs", "tenant_name", tenant_name)
            .ok_or_else(|| CmError::NotFoundError {
                message: format!(
                    "Unable to find FAST Application Service with tenant name {}",
                    tenant_name
                ),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::tests::{mock_login, settings_for};
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> CmClient {
        CmClient::new(&settings_for(server)).unwrap()
    }

    #[tokio::test]
    async fn test_post_fast_appsvc() {
        let server = MockServer::start();
        mock_login(&server);
        let post = server.mock(|when, then| {
            when.method(POST).path(APPSVCS_PATH);
            then.status(201).json_body(json!({"id": "fast-1"}));
        });

        let id = client_for(&server)
            .post_fast_appsvc(&Declaration::new(json!({"template_name": "examples/http"})))
            .await
            .unwrap();

        post.assert();
        assert_eq!(id, "fast-1");
    }

    #[tokio::test]
    async fn test_post_fast_appsvc_server_error_uses_message() {
        let server = MockServer::start();
        mock_login(&server);
        server.mock(|when, then| {
            when.method(POST).path(APPSVCS_PATH);
            then.status(500)
                .json_body(json!({"message": "template not found", "code": 500}));
        });

        let err = client_for(&server)
            .post_fast_appsvc(&Declaration::new(json!({})))
            .await
            .unwrap_err();

        match err {
            CmError::RejectedError { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, json!("template not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_post_fast_appsvc_bad_request_keeps_body() {
        let server = MockServer::start();
        mock_login(&server);
        server.mock(|when, then| {
            when.method(POST).path(APPSVCS_PATH);
            then.status(400).json_body(json!({"errors": ["parameters.pool is required"]}));
        });

        let err = client_for(&server)
            .post_fast_appsvc(&Declaration::new(json!({})))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CmError::RejectedError { status: 400, ref body, .. } if body["errors"][0] == "parameters.pool is required"
        ));
    }

    #[tokio::test]
    async fn test_deploy_fast_appsvc() {
        let server = MockServer::start();
        mock_login(&server);
        server.mock(|when, then| {
            when.method(POST)
                .path("/mgmt/shared/fast/appsvcs/fast-1/deployments")
                .json_body(json!({"deployments": [{"target": {"address": "10.1.1.7"}}]}));
            then.status(202).json_body(json!({"deployments": [{"id": "d-1"}]}));
        });
        server.mock(|when, then| {
            when.method(POST)
                .path("/mgmt/shared/fast/appsvcs/fast-2/deployments");
            then.status(409).json_body(json!({"message": "already deployed"}));
        });

        let client = client_for(&server);
        let deployment =
            Declaration::new(json!({"deployments": [{"target": {"address": "10.1.1.7"}}]}));

        let body = client.deploy_fast_appsvc("fast-1", &deployment).await.unwrap();
        assert_eq!(body["deployments"][0]["id"], "d-1");

        let err = client.deploy_fast_appsvc("fast-2", &deployment).await.unwrap_err();
        assert!(matches!(err, CmError::RejectedError { status: 409, .. }));
    }

    #[tokio::test]
    async fn test_delete_and_find_fast_appsvc() {
        let server = MockServer::start();
        mock_login(&server);
        server.mock(|when, then| {
            when.method(GET).path(APPSVCS_PATH);
            then.status(200).json_body(json!({
                "_embedded": {"appsvcs": [{"id": "fast-1", "tenant_name": "FastTenant"}]}
            }));
        });
        let delete = server.mock(|when, then| {
            when.method(DELETE).path("/mgmt/shared/fast/appsvcs/fast-1");
            then.status(202).json_body(json!({"id": "fast-1", "status": "deleting"}));
        });

        let client = client_for(&server);
        let id = client.get_fast_appsvc_by_name("FastTenant").await.unwrap();
        assert_eq!(id, "fast-1");

        let err = client.get_fast_appsvc_by_name("Other").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to find FAST Application Service with tenant name Other"
        );

        let body = client.delete_fast_appsvc(&id).await.unwrap();
        delete.assert();
        assert_eq!(body["status"], "deleting");
    }
}
