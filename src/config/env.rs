use crate::utils::error::{CmError, Result};
use crate::utils::validation::{
    normalize_endpoint, validate_non_empty_string, validate_range, validate_required_field,
    Validate,
};
use std::fmt;
use std::time::Duration;

pub const ENDPOINT: &str = "ENDPOINT";
pub const USERNAME: &str = "USERNAME";
pub const PASSWORD: &str = "PASSWORD";
pub const F5OS_ENDPOINT: &str = "F5OS_ENDPOINT";
pub const F5OS_USERNAME: &str = "F5OS_USERNAME";
pub const F5OS_PASSWORD: &str = "F5OS_PASSWORD";
pub const REQUEST_TIMEOUT: &str = "CM_REQUEST_TIMEOUT_SECS";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Loads variables from a `.env` file into the process environment.
///
/// Without an explicit path a missing `.env` is fine: the process
/// environment may already carry everything. An explicit path must exist.
pub fn load_env_file(path: Option<&str>) -> Result<()> {
    match path {
        Some(path) => {
            dotenv::from_filename(path).map_err(|e| CmError::ConfigError {
                message: format!("Failed to load env file '{}': {}", path, e),
            })?;
            tracing::debug!("Loaded environment from {}", path);
        }
        None => match dotenv::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => tracing::debug!("No .env file found, using process env"),
            Err(e) => {
                return Err(CmError::ConfigError {
                    message: format!("Failed to parse .env file: {}", e),
                })
            }
        },
    }
    Ok(())
}

#[derive(Clone)]
pub struct F5osSettings {
    pub endpoint: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for F5osSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("F5osSettings")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Where the Central Manager lives and how to log in to it.
#[derive(Clone)]
pub struct ConnectionSettings {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub f5os: Option<F5osSettings>,
    pub request_timeout: Duration,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"***")
            .field("f5os", &self.f5os)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ConnectionSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key/value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let endpoint = normalize_endpoint(ENDPOINT, validate_required_field(ENDPOINT, &get(ENDPOINT))?)?;
        let username = validate_required_field(USERNAME, &get(USERNAME))?.clone();
        let password = validate_required_field(PASSWORD, &get(PASSWORD))?.clone();

        let f5os = match get(F5OS_ENDPOINT) {
            Some(raw) => Some(F5osSettings {
                endpoint: normalize_endpoint(F5OS_ENDPOINT, &raw)?,
                username: validate_required_field(F5OS_USERNAME, &get(F5OS_USERNAME))?.clone(),
                password: validate_required_field(F5OS_PASSWORD, &get(F5OS_PASSWORD))?.clone(),
            }),
            None => None,
        };

        let timeout_secs = match get(REQUEST_TIMEOUT) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| CmError::InvalidConfigValueError {
                    field: REQUEST_TIMEOUT.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let settings = Self {
            endpoint,
            username,
            password,
            f5os,
            request_timeout: Duration::from_secs(timeout_secs),
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for ConnectionSettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string(USERNAME, &self.username)?;
        validate_non_empty_string(PASSWORD, &self.password)?;
        validate_range(REQUEST_TIMEOUT, self.request_timeout.as_secs(), 1, 600)?;

        tracing::debug!("✅ Connection settings validated for {}", self.endpoint);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_minimal_settings() {
        let settings = ConnectionSettings::from_lookup(lookup_from(&[
            (ENDPOINT, "testcmapi.f5demo.com"),
            (USERNAME, "thebestusername"),
            (PASSWORD, "theworstpassword"),
        ]))
        .unwrap();

        assert_eq!(settings.endpoint, "https://testcmapi.f5demo.com");
        assert_eq!(settings.username, "thebestusername");
        assert!(settings.f5os.is_none());
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_password() {
        let err = ConnectionSettings::from_lookup(lookup_from(&[
            (ENDPOINT, "testcmapi.f5demo.com"),
            (USERNAME, "admin"),
            (PASSWORD, "  "),
        ]))
        .unwrap_err();

        assert!(matches!(err, CmError::MissingConfigError { ref field } if field == PASSWORD));
    }

    #[test]
    fn test_f5os_requires_credentials() {
        let err = ConnectionSettings::from_lookup(lookup_from(&[
            (ENDPOINT, "cm.example.com"),
            (USERNAME, "admin"),
            (PASSWORD, "secret"),
            (F5OS_ENDPOINT, "10.1.1.5:8888"),
        ]))
        .unwrap_err();

        assert!(matches!(err, CmError::MissingConfigError { ref field } if field == F5OS_USERNAME));
    }

    #[test]
    fn test_f5os_and_timeout() {
        let settings = ConnectionSettings::from_lookup(lookup_from(&[
            (ENDPOINT, "cm.example.com"),
            (USERNAME, "admin"),
            (PASSWORD, "secret"),
            (F5OS_ENDPOINT, "10.1.1.5:8888"),
            (F5OS_USERNAME, "f5os-admin"),
            (F5OS_PASSWORD, "f5os-secret"),
            (REQUEST_TIMEOUT, "90"),
        ]))
        .unwrap();

        let f5os = settings.f5os.as_ref().unwrap();
        assert_eq!(f5os.endpoint, "https://10.1.1.5:8888");
        assert_eq!(settings.request_timeout, Duration::from_secs(90));
    }

    #[test]
    fn test_invalid_timeout() {
        let result = ConnectionSettings::from_lookup(lookup_from(&[
            (ENDPOINT, "cm.example.com"),
            (USERNAME, "admin"),
            (PASSWORD, "secret"),
            (REQUEST_TIMEOUT, "soon"),
        ]));
        assert!(matches!(result, Err(CmError::InvalidConfigValueError { .. })));

        let result = ConnectionSettings::from_lookup(lookup_from(&[
            (ENDPOINT, "cm.example.com"),
            (USERNAME, "admin"),
            (PASSWORD, "secret"),
            (REQUEST_TIMEOUT, "0"),
        ]));
        assert!(matches!(result, Err(CmError::InvalidConfigValueError { .. })));
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let settings = ConnectionSettings::from_lookup(lookup_from(&[
            (ENDPOINT, "cm.example.com"),
            (USERNAME, "admin"),
            (PASSWORD, "hunter2"),
        ]))
        .unwrap();
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }
}
