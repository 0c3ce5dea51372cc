use crate::utils::error::{CmError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An AS3 declaration, FAST template or instance document. The body is
/// forwarded to the API untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Declaration(serde_json::Value);

impl Declaration {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(Self(serde_json::from_slice(bytes)?))
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

pub type DeploymentTarget = String;

#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Patch,
    Put,
    Post,
    Delete,
}

impl ApiMethod {
    pub const ALLOWED: [ApiMethod; 5] = [
        ApiMethod::Get,
        ApiMethod::Patch,
        ApiMethod::Put,
        ApiMethod::Post,
        ApiMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiMethod::Get => "get",
            ApiMethod::Patch => "patch",
            ApiMethod::Put => "put",
            ApiMethod::Post => "post",
            ApiMethod::Delete => "delete",
        }
    }
}

impl FromStr for ApiMethod {
    type Err = CmError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALLOWED
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CmError::InvalidMethod {
                method: s.to_string(),
            })
    }
}

impl From<ApiMethod> for reqwest::Method {
    fn from(method: ApiMethod) -> Self {
        match method {
            ApiMethod::Get => reqwest::Method::GET,
            ApiMethod::Patch => reqwest::Method::PATCH,
            ApiMethod::Put => reqwest::Method::PUT,
            ApiMethod::Post => reqwest::Method::POST,
            ApiMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// Infrastructure a BIG-IP Next instance can be instantiated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceProvider {
    Rseries,
    Velos,
    Vsphere,
}

impl InstanceProvider {
    pub const ALLOWED: [InstanceProvider; 3] = [
        InstanceProvider::Rseries,
        InstanceProvider::Velos,
        InstanceProvider::Vsphere,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceProvider::Rseries => "rseries",
            InstanceProvider::Velos => "velos",
            InstanceProvider::Vsphere => "vsphere",
        }
    }

    fn allowed_list() -> String {
        let names: Vec<&str> = Self::ALLOWED.iter().map(|p| p.as_str()).collect();
        format!("[{}]", names.join(", "))
    }
}

impl FromStr for InstanceProvider {
    type Err = CmError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALLOWED
            .into_iter()
            .find(|provider| provider.as_str() == s)
            .ok_or_else(|| CmError::InvalidProvider {
                provider: s.to_string(),
                allowed: Self::allowed_list(),
            })
    }
}

impl fmt::Display for InstanceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw outcome of a single API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.body.get(field).and_then(|v| v.as_str())
    }

    /// Items under `_embedded.<collection>`, empty when the key is absent.
    pub fn embedded(&self, collection: &str) -> &[serde_json::Value] {
        self.body
            .get("_embedded")
            .and_then(|e| e.get(collection))
            .and_then(|c| c.as_array())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `id` of the first embedded item whose `key` equals `value`.
    pub fn find_embedded_id(&self, collection: &str, key: &str, value: &str) -> Option<String> {
        self.embedded(collection)
            .iter()
            .find(|item| item.get(key).and_then(|v| v.as_str()) == Some(value))
            .and_then(|item| item.get("id"))
            .map(|id| match id {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    }
}

/// Result of deploying one declaration to several targets, one request each.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeploymentSummary {
    pub attempted: usize,
    pub successful: Vec<(DeploymentTarget, serde_json::Value)>,
    pub failed: Vec<DeploymentTarget>,
}

impl DeploymentSummary {
    pub fn record_success(&mut self, target: &str, body: serde_json::Value) {
        self.attempted += 1;
        self.successful.push((target.to_string(), body));
    }

    pub fn record_failure(&mut self, target: &str) {
        self.attempted += 1;
        self.failed.push(target.to_string());
    }

    pub fn success_count(&self) -> usize {
        self.successful.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.success_count() == self.attempted
    }
}

impl fmt::Display for DeploymentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_complete() {
            write!(
                f,
                "{} of {} were successful",
                self.success_count(),
                self.attempted
            )
        } else {
            write!(
                f,
                "{} of {} were successful. The following failed: {}",
                self.success_count(),
                self.attempted,
                self.failed.join(", ")
            )
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TenantDeletion {
    Deleted { status: u16 },
    Failed { status: u16 },
    Skipped,
}

/// Outcome of both deletion steps. The tenant step runs even when
/// Central Manager refuses the instance deletion.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceDeletion {
    pub cm_status: u16,
    pub cm_body: serde_json::Value,
    pub task_path: Option<String>,
    pub tenant: TenantDeletion,
}

impl InstanceDeletion {
    pub fn cm_accepted(&self) -> bool {
        (200..300).contains(&self.cm_status)
    }
}

/// Progress of one workflow run, handed to each step in turn.
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    pub run_id: String,
    pub completed_steps: Vec<String>,
    pub warnings: Vec<String>,
}

impl WorkflowContext {
    pub fn new(run_id: String) -> Self {
        Self {
            run_id,
            completed_steps: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn step_done(&mut self, step: impl Into<String>) {
        let step = step.into();
        tracing::debug!("✔️ [{}] {}", self.run_id, step);
        self.completed_steps.push(step);
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        tracing::warn!("⚠️ [{}] {}", self.run_id, warning);
        self.warnings.push(warning);
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowReport {
    pub workflow: String,
    pub run_id: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub duration: std::time::Duration,
    pub completed_steps: Vec<String>,
    pub warnings: Vec<String>,
}

impl WorkflowReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_allow_list() {
        assert_eq!("get".parse::<ApiMethod>().unwrap(), ApiMethod::Get);
        assert_eq!("DELETE".parse::<ApiMethod>().unwrap(), ApiMethod::Delete);
        let err = "head".parse::<ApiMethod>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid method 'head'");
    }

    #[test]
    fn test_provider_allow_list() {
        assert_eq!(
            "rseries".parse::<InstanceProvider>().unwrap(),
            InstanceProvider::Rseries
        );
        let err = "aws".parse::<InstanceProvider>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid provider 'aws'. Must be one of [rseries, velos, vsphere]"
        );
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("eyJhbGciOi");
        assert_eq!(format!("{:?}", token), "AccessToken(***)");
        assert_eq!(token.secret(), "eyJhbGciOi");
    }

    #[test]
    fn test_declaration_rejects_non_json() {
        assert!(Declaration::from_slice(b"{\"class\": \"AS3\"}").is_ok());
        assert!(matches!(
            Declaration::from_slice(b"not json"),
            Err(CmError::SerializationError(_))
        ));
    }

    #[test]
    fn test_find_embedded_id() {
        let response = ApiResponse {
            status: 200,
            body: json!({
                "_embedded": {
                    "appsvcs": [
                        {"id": "a1", "tenant_name": "Other"},
                        {"id": "b2", "tenant_name": "JuiceShopTenant"}
                    ]
                }
            }),
        };
        assert_eq!(
            response.find_embedded_id("appsvcs", "tenant_name", "JuiceShopTenant"),
            Some("b2".to_string())
        );
        assert_eq!(response.find_embedded_id("appsvcs", "tenant_name", "Missing"), None);
        assert!(response.embedded("devices").is_empty());
    }

    #[test]
    fn test_deployment_summary_partial_failure() {
        let mut summary = DeploymentSummary::default();
        summary.record_success("10.1.1.11", json!({"id": "d1"}));
        summary.record_failure("10.1.1.100");
        summary.record_failure("10.1.1.101");

        assert!(!summary.is_complete());
        assert_eq!(
            summary.to_string(),
            "1 of 3 were successful. The following failed: 10.1.1.100, 10.1.1.101"
        );
    }

    #[test]
    fn test_deployment_summary_complete() {
        let mut summary = DeploymentSummary::default();
        summary.record_success("10.1.1.7", json!({}));
        assert!(summary.is_complete());
        assert_eq!(summary.to_string(), "1 of 1 were successful");
    }
}
