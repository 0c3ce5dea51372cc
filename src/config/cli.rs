use crate::config::workflow::{As3Section, FastSection, InstanceSection};
use crate::domain::model::{ApiMethod, InstanceProvider};
use crate::utils::error::{CmError, Result};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cm-client")]
#[command(about = "Drive AS3, FAST and instance lifecycles on BIG-IP Next Central Manager")]
#[command(version, arg_required_else_help = true)]
pub struct Cli {
    /// Env file with ENDPOINT, USERNAME, PASSWORD and optional F5OS_* settings
    #[arg(long, global = true, env = "CM_ENV_FILE")]
    pub env_file: Option<String>,

    /// TOML workflow file; declaration paths are resolved relative to it
    #[arg(short, long, global = true, env = "CM_WORKFLOW_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Continue through every checkpoint without asking
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create, deploy, find, update and delete an AS3 declaration
    As3(As3Args),
    /// Create, deploy and delete a FAST application service
    Fast(FastArgs),
    /// Instantiate and delete a BIG-IP Next instance on an F5OS provider
    Instance(InstanceArgs),
    /// Single AS3 declaration operations
    #[command(subcommand)]
    Declaration(DeclarationCommand),
    /// Single FAST application service operations
    #[command(subcommand)]
    Appsvc(AppsvcCommand),
    /// F5OS provider lookups
    #[command(subcommand)]
    Provider(ProviderCommand),
    /// Single BIG-IP Next instance operations
    #[command(subcommand)]
    Device(DeviceCommand),
    /// Send one raw request and print the response
    Call(CallArgs),
}

#[derive(Debug, Default, Args)]
pub struct As3Args {
    #[arg(long)]
    pub declaration: Option<String>,
    /// Declaration PUT over the first one before deletion
    #[arg(long)]
    pub updated_declaration: Option<String>,
    /// Deployment target, repeatable
    #[arg(long = "target")]
    pub targets: Vec<String>,
    #[arg(long)]
    pub tenant: Option<String>,
}

impl As3Args {
    /// Overlays the flags on the `[as3]` section; without a section every flag is required.
    pub fn merge(self, section: Option<As3Section>) -> Result<As3Section> {
        let mut section = match section {
            Some(section) => section,
            None => As3Section {
                declaration: required("--declaration", self.declaration.clone())?,
                updated_declaration: None,
                targets: Vec::new(),
                tenant: required("--tenant", self.tenant.clone())?,
            },
        };

        if let Some(declaration) = self.declaration {
            section.declaration = declaration;
        }
        if self.updated_declaration.is_some() {
            section.updated_declaration = self.updated_declaration;
        }
        if !self.targets.is_empty() {
            section.targets = self.targets;
        }
        if let Some(tenant) = self.tenant {
            section.tenant = tenant;
        }
        Ok(section)
    }
}

#[derive(Debug, Default, Args)]
pub struct FastArgs {
    #[arg(long)]
    pub template: Option<String>,
    #[arg(long)]
    pub deployment: Option<String>,
    /// Wait for this tenant to appear after deploying
    #[arg(long)]
    pub tenant: Option<String>,
}

impl FastArgs {
    pub fn merge(self, section: Option<FastSection>) -> Result<FastSection> {
        let mut section = match section {
            Some(section) => section,
            None => FastSection {
                template: required("--template", self.template.clone())?,
                deployment: required("--deployment", self.deployment.clone())?,
                tenant: None,
            },
        };

        if let Some(template) = self.template {
            section.template = template;
        }
        if let Some(deployment) = self.deployment {
            section.deployment = deployment;
        }
        if self.tenant.is_some() {
            section.tenant = self.tenant;
        }
        Ok(section)
    }
}

#[derive(Debug, Default, Args)]
pub struct InstanceArgs {
    /// F5OS provider name as registered in Central Manager
    #[arg(long)]
    pub provider_name: Option<String>,
    /// One of rseries, velos, vsphere
    #[arg(long)]
    pub provider: Option<InstanceProvider>,
    #[arg(long)]
    pub declaration: Option<String>,
    #[arg(long)]
    pub instance_name: Option<String>,
    /// F5OS tenant to delete; defaults to the instance name
    #[arg(long)]
    pub tenant_name: Option<String>,
}

impl InstanceArgs {
    pub fn merge(self, section: Option<InstanceSection>) -> Result<InstanceSection> {
        let mut section = match section {
            Some(section) => section,
            None => InstanceSection {
                provider_name: required("--provider-name", self.provider_name.clone())?,
                provider: required("--provider", self.provider)?,
                declaration: required("--declaration", self.declaration.clone())?,
                instance_name: required("--instance-name", self.instance_name.clone())?,
                tenant_name: None,
            },
        };

        if let Some(provider_name) = self.provider_name {
            section.provider_name = provider_name;
        }
        if let Some(provider) = self.provider {
            section.provider = provider;
        }
        if let Some(declaration) = self.declaration {
            section.declaration = declaration;
        }
        if let Some(instance_name) = self.instance_name {
            section.instance_name = instance_name;
        }
        if self.tenant_name.is_some() {
            section.tenant_name = self.tenant_name;
        }
        Ok(section)
    }
}

fn required<T>(flag: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| CmError::MissingConfigError {
        field: flag.to_string(),
    })
}

#[derive(Debug, Subcommand)]
pub enum DeclarationCommand {
    List,
    Get { id: String },
    /// Find the declaration owning a tenant
    Find { tenant: String },
    Post { file: String },
    Put { id: String, file: String },
    Patch { file: String },
    Deploy {
        id: String,
        #[arg(required = true)]
        targets: Vec<String>,
    },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum AppsvcCommand {
    List,
    Find { tenant: String },
    Post { file: String },
    Patch { id: String, file: String },
    Deploy { id: String, file: String },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum ProviderCommand {
    Find { name: String },
}

#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    Find { hostname: String },
    Instantiate {
        provider: InstanceProvider,
        file: String,
    },
    Task { path: String },
    /// Delete the instance from Central Manager and its tenant from F5OS
    Delete { id: String, tenant: String },
}

#[derive(Debug, Args)]
pub struct CallArgs {
    /// One of get, patch, put, post, delete
    pub method: ApiMethod,
    pub path: String,
    /// JSON file sent as the request body
    #[arg(long)]
    pub body: Option<String>,
}
