use crate::core::wait::PollSettings;
use crate::domain::model::InstanceProvider;
use crate::utils::error::{CmError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_range, validate_required_field,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Declarations and names used by the workflows. Every section is optional;
/// a workflow asks for its own section and fails if it is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub as3: Option<As3Section>,
    pub fast: Option<FastSection>,
    pub instance: Option<InstanceSection>,
    #[serde(default)]
    pub polling: PollingSection,
    /// Directory declaration paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct As3Section {
    pub declaration: String,
    /// Second version PUT over the first one before deletion.
    pub updated_declaration: Option<String>,
    pub targets: Vec<String>,
    pub tenant: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastSection {
    pub template: String,
    pub deployment: String,
    pub tenant: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSection {
    pub provider_name: String,
    pub provider: InstanceProvider,
    pub declaration: String,
    pub instance_name: String,
    /// F5OS tenant to remove; defaults to the instance name.
    pub tenant_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingSection {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_tenant_timeout_secs")]
    pub tenant_timeout_secs: u64,
    #[serde(default = "default_instance_timeout_secs")]
    pub instance_timeout_secs: u64,
}

const MAX_POLL_INTERVAL_SECS: u64 = 60 * 60;
const MAX_POLL_TIMEOUT_SECS: u64 = 24 * 60 * 60;

fn default_interval_secs() -> u64 {
    2
}

fn default_tenant_timeout_secs() -> u64 {
    60
}

fn default_instance_timeout_secs() -> u64 {
    15 * 60
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            tenant_timeout_secs: default_tenant_timeout_secs(),
            instance_timeout_secs: default_instance_timeout_secs(),
        }
    }
}

impl PollingSection {
    pub fn tenant(&self) -> PollSettings {
        PollSettings::new(
            Duration::from_secs(self.interval_secs),
            Duration::from_secs(self.tenant_timeout_secs),
        )
    }

    pub fn instance(&self) -> PollSettings {
        PollSettings::new(
            Duration::from_secs(self.interval_secs),
            Duration::from_secs(self.instance_timeout_secs),
        )
    }
}

impl WorkflowConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CmError::IoError)?;
        let mut config = Self::from_toml_str(&content)?;
        config.base_dir = path
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: Self =
            toml::from_str(&processed_content).map_err(|e| CmError::InvalidConfigValueError {
                field: "workflow_toml".to_string(),
                value: String::new(),
                reason: format!("TOML parsing error: {}", e),
            })?;
        config.base_dir = PathBuf::from(".");
        Ok(config)
    }

    /// Replaces `${VAR}` with the variable's value. Unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| CmError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn as3(&self) -> Result<&As3Section> {
        validate_required_field("as3", &self.as3)
    }

    pub fn fast(&self) -> Result<&FastSection> {
        validate_required_field("fast", &self.fast)
    }

    pub fn instance(&self) -> Result<&InstanceSection> {
        validate_required_field("instance", &self.instance)
    }
}

impl Validate for As3Section {
    fn validate(&self) -> Result<()> {
        let mut files = vec![self.declaration.clone()];
        files.extend(self.updated_declaration.iter().cloned());
        validate_file_extensions("as3.declaration", &files, &["json"])?;
        validate_non_empty_string("as3.tenant", &self.tenant)?;
        if self.targets.is_empty() {
            return Err(CmError::MissingConfigError {
                field: "as3.targets".to_string(),
            });
        }
        for target in &self.targets {
            validate_non_empty_string("as3.targets", target)?;
        }
        Ok(())
    }
}

impl Validate for FastSection {
    fn validate(&self) -> Result<()> {
        validate_file_extensions(
            "fast.template",
            &[self.template.clone(), self.deployment.clone()],
            &["json"],
        )?;
        if let Some(tenant) = &self.tenant {
            validate_non_empty_string("fast.tenant", tenant)?;
        }
        Ok(())
    }
}

impl Validate for InstanceSection {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("instance.provider_name", &self.provider_name)?;
        validate_non_empty_string("instance.instance_name", &self.instance_name)?;
        validate_file_extensions(
            "instance.declaration",
            std::slice::from_ref(&self.declaration),
            &["json"],
        )
    }
}

impl Validate for WorkflowConfig {
    fn validate(&self) -> Result<()> {
        validate_range(
            "polling.interval_secs",
            self.polling.interval_secs,
            1,
            MAX_POLL_INTERVAL_SECS,
        )?;
        validate_range(
            "polling.tenant_timeout_secs",
            self.polling.tenant_timeout_secs,
            self.polling.interval_secs,
            MAX_POLL_TIMEOUT_SECS,
        )?;
        validate_range(
            "polling.instance_timeout_secs",
            self.polling.instance_timeout_secs,
            self.polling.interval_secs,
            MAX_POLL_TIMEOUT_SECS,
        )?;

        if let Some(as3) = &self.as3 {
            as3.validate()?;
        }
        if let Some(fast) = &self.fast {
            fast.validate()?;
        }
        if let Some(instance) = &self.instance {
            instance.validate()?;
        }
        Ok(())
    }
}
