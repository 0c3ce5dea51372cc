use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmError {
    #[error("API request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid method '{method}'")]
    InvalidMethod { method: String },

    #[error("Invalid provider '{provider}'. Must be one of {allowed}")]
    InvalidProvider { provider: String, allowed: String },

    #[error("Authorization failed with a {status} error")]
    AuthenticationError { status: String },

    #[error("{operation} failed with status {status}: {body}")]
    RejectedError {
        operation: String,
        status: u16,
        body: serde_json::Value,
    },

    #[error("{operation} response is missing the '{field}' field")]
    MissingFieldError { operation: String, field: String },

    #[error("{message}")]
    NotFoundError { message: String },

    #[error("Timed out after {waited:?} waiting for {what}")]
    TimeoutError { what: String, waited: Duration },

    #[error("Workflow aborted at checkpoint: {step}")]
    AbortedError { step: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Configuration,
    Api,
    Input,
    Operator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CmError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CmError::HttpError(_) | CmError::TimeoutError { .. } => ErrorCategory::Network,
            CmError::AuthenticationError { .. } => ErrorCategory::Authentication,
            CmError::ConfigError { .. }
            | CmError::InvalidConfigValueError { .. }
            | CmError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CmError::RejectedError { .. }
            | CmError::MissingFieldError { .. }
            | CmError::NotFoundError { .. } => ErrorCategory::Api,
            CmError::IoError(_)
            | CmError::SerializationError(_)
            | CmError::InvalidMethod { .. }
            | CmError::InvalidProvider { .. } => ErrorCategory::Input,
            CmError::AbortedError { .. } => ErrorCategory::Operator,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CmError::AbortedError { .. } => ErrorSeverity::Low,
            CmError::HttpError(_) | CmError::TimeoutError { .. } => ErrorSeverity::Medium,
            CmError::ConfigError { .. }
            | CmError::InvalidConfigValueError { .. }
            | CmError::MissingConfigError { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check that the Central Manager endpoint is reachable and try again"
            }
            ErrorCategory::Authentication => "Verify USERNAME and PASSWORD in your .env file",
            ErrorCategory::Configuration => {
                "Review the .env file and workflow configuration for missing or invalid values"
            }
            ErrorCategory::Api => {
                "Inspect the response body above and the Central Manager UI for details"
            }
            ErrorCategory::Input => "Check the declaration file paths and their JSON syntax",
            ErrorCategory::Operator => "Re-run the workflow when ready to continue",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CmError::HttpError(e) if e.is_connect() => {
                "Could not connect to the Central Manager API".to_string()
            }
            CmError::HttpError(e) if e.is_timeout() => {
                "The Central Manager API did not respond in time".to_string()
            }
            CmError::RejectedError {
                operation, status, ..
            } => format!("{} was rejected by the API ({})", operation, status),
            other => other.to_string(),
        }
    }

    /// True for lookups that may succeed once the server catches up.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CmError::NotFoundError { .. })
    }
}

pub type Result<T> = std::result::Result<T, CmError>;
