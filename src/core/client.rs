use crate::config::env::{ConnectionSettings, F5osSettings};
use crate::domain::model::{AccessToken, ApiMethod, ApiResponse};
use crate::utils::error::{CmError, Result};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::Mutex;

const LOGIN_PATH: &str = "/api/login";
const CLIENT_USER_AGENT: &str = concat!("cm-client/", env!("CARGO_PKG_VERSION"));

/// Central Manager API client. Logs in once and reuses the bearer token for
/// every later request made through [`CmClient::request`].
pub struct CmClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
    f5os: Option<F5osSettings>,
    session_token: Mutex<Option<AccessToken>>,
}

impl CmClient {
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        // CM and F5OS appliances ship self-signed certificates.
        let http = Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: settings.endpoint.clone(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            f5os: settings.f5os.clone(),
            session_token: Mutex::new(None),
        })
    }

    /// Starts the session with a token obtained elsewhere; no login is made.
    pub fn with_token(self, token: AccessToken) -> Self {
        Self {
            session_token: Mutex::new(Some(token)),
            ..self
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn f5os(&self) -> Option<&F5osSettings> {
        self.f5os.as_ref()
    }

    /// Exchanges the configured credentials for a bearer token.
    pub async fn login(&self) -> Result<AccessToken> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        tracing::debug!("🔑 Logging in to {} as {}", url, self.username);

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .json(&json!({"username": self.username, "password": self.password}))
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = parse_body(&response.bytes().await?);

        match body.get("access_token").and_then(Value::as_str) {
            Some(token) => {
                tracing::debug!("🔑 Login succeeded");
                Ok(AccessToken::new(token))
            }
            None => {
                let reported = match body.get("status") {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => status.to_string(),
                };
                tracing::error!("🔑 Login failed with status {}", reported);
                Err(CmError::AuthenticationError { status: reported })
            }
        }
    }

    /// Sends one request. Without a token a login is performed first and
    /// the resulting token is used for this call only.
    pub async fn api_call(
        &self,
        method: ApiMethod,
        path: &str,
        token: Option<&AccessToken>,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let token = match token {
            Some(token) => token.clone(),
            None => self.login().await?,
        };

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("📡 {} {}", method, url);

        let mut request = self
            .http
            .request(method.into(), &url)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .bearer_auth(token.secret());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = parse_body(&response.bytes().await?);
        tracing::debug!("📡 {} {} -> {}", method, path, status);

        Ok(ApiResponse { status, body })
    }

    /// Like [`CmClient::api_call`], but with the session token, logging in on first use.
    pub async fn request(
        &self,
        method: ApiMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let token = self.session_token().await?;
        self.api_call(method, path, Some(&token), body).await
    }

    async fn session_token(&self) -> Result<AccessToken> {
        let mut guard = self.session_token.lock().await;
        if let Some(token) = guard.as_ref() {
            return Ok(token.clone());
        }
        let token = self.login().await?;
        *guard = Some(token.clone());
        Ok(token)
    }
}

/// Parses a response body as JSON; empty or non-JSON bodies become `null`.
pub(crate) fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes).unwrap_or_else(|e| {
        tracing::debug!("Response body is not JSON ({}), ignoring it", e);
        Value::Null
    })
}

/// Maps a non-success response to [`CmError::RejectedError`].
pub(crate) fn expect_success(operation: &str, response: ApiResponse) -> Result<ApiResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(rejected(operation, response))
    }
}

pub(crate) fn rejected(operation: &str, response: ApiResponse) -> CmError {
    tracing::error!(
        "❌ {} failed with status {}: {}",
        operation,
        response.status,
        response.body
    );
    CmError::RejectedError {
        operation: operation.to_string(),
        status: response.status,
        body: response.body,
    }
}

/// Pulls a string field out of a successful response.
pub(crate) fn required_str(operation: &str, response: &ApiResponse, field: &str) -> Result<String> {
    response
        .str_field(field)
        .map(str::to_string)
        .ok_or_else(|| CmError::MissingFieldError {
            operation: operation.to_string(),
            field: field.to_string(),
        })
}
