use clap::Parser;
use cm_client::adapters::storage::load_declaration;
use cm_client::config::cli::{
    AppsvcCommand, CallArgs, Cli, Command, DeclarationCommand, DeviceCommand, ProviderCommand,
};
use cm_client::config::env::load_env_file;
use cm_client::domain::model::{TenantDeletion, WorkflowReport};
use cm_client::domain::ports::{Checkpoint, Workflow};
use cm_client::utils::error::{CmError, ErrorSeverity, Result};
use cm_client::utils::{logger, validation::Validate};
use cm_client::{
    As3Workflow, AutoConfirm, CmClient, ConnectionSettings, FastWorkflow, InstanceWorkflow,
    LocalStorage, Session, StdinCheckpoint, WorkflowConfig, WorkflowEngine,
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting cm-client");

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ cm-client failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    load_env_file(cli.env_file.as_deref())?;

    let settings = ConnectionSettings::from_env()?;
    settings.validate()?;
    tracing::debug!("Connection settings: {:?}", settings);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading workflow configuration from: {}", path);
            WorkflowConfig::from_file(path)?
        }
        None => WorkflowConfig {
            base_dir: PathBuf::from("."),
            ..WorkflowConfig::default()
        },
    };
    config.validate()?;

    let client = Arc::new(CmClient::new(&settings)?);
    let storage = LocalStorage::new(config.base_dir.clone());
    let checkpoint: Arc<dyn Checkpoint> = if cli.yes {
        Arc::new(AutoConfirm::new())
    } else {
        Arc::new(StdinCheckpoint)
    };
    let session = Session::new(client.clone(), storage.clone(), checkpoint);

    match cli.command {
        Command::As3(args) => {
            let section = args.merge(config.as3.clone())?;
            section.validate()?;
            let workflow = As3Workflow::new(session, section, config.polling.tenant());
            run_workflow(workflow).await
        }
        Command::Fast(args) => {
            let section = args.merge(config.fast.clone())?;
            section.validate()?;
            let workflow = FastWorkflow::new(session, section, config.polling.tenant());
            run_workflow(workflow).await
        }
        Command::Instance(args) => {
            let section = args.merge(config.instance.clone())?;
            section.validate()?;
            let workflow = InstanceWorkflow::new(session, section, config.polling.instance());
            run_workflow(workflow).await
        }
        Command::Declaration(command) => run_declaration(&client, &storage, command).await,
        Command::Appsvc(command) => run_appsvc(&client, &storage, command).await,
        Command::Provider(ProviderCommand::Find { name }) => {
            let id = client.get_f5os_provider_by_name(&name).await?;
            println!("{}", id);
            Ok(())
        }
        Command::Device(command) => run_device(&client, &storage, command).await,
        Command::Call(args) => run_call(&client, &storage, args).await,
    }
}

async fn run_workflow<W: Workflow>(workflow: W) -> Result<()> {
    let report = WorkflowEngine::new(workflow).run().await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &WorkflowReport) {
    println!(
        "✅ {} workflow {} completed {} step(s)",
        report.workflow,
        report.run_id,
        report.completed_steps.len()
    );
    for warning in &report.warnings {
        println!("⚠️ {}", warning);
    }
}

fn print_json(value: &Value) {
    println!("{:#}", value);
}

async fn run_declaration(
    client: &CmClient,
    storage: &LocalStorage,
    command: DeclarationCommand,
) -> Result<()> {
    match command {
        DeclarationCommand::List => {
            for item in client.list_declarations().await? {
                print_json(&item);
            }
        }
        DeclarationCommand::Get { id } => print_json(&client.get_declaration(&id).await?),
        DeclarationCommand::Find { tenant } => {
            println!("{}", client.get_declaration_by_name(&tenant).await?)
        }
        DeclarationCommand::Post { file } => {
            let declaration = load_declaration(storage, &file).await?;
            println!("{}", client.post_declaration(&declaration).await?);
        }
        DeclarationCommand::Put { id, file } => {
            let declaration = load_declaration(storage, &file).await?;
            println!("{}", client.put_declaration(&id, &declaration).await?);
        }
        DeclarationCommand::Patch { file } => {
            let declaration = load_declaration(storage, &file).await?;
            println!("{}", client.patch_declaration(&declaration).await?);
        }
        DeclarationCommand::Deploy { id, targets } => {
            let summary = client.deploy_declaration(&id, &targets).await?;
            println!("{}", summary);
        }
        DeclarationCommand::Delete { id } => {
            println!("{}: {}", id, client.delete_declaration(&id).await?)
        }
    }
    Ok(())
}

async fn run_appsvc(client: &CmClient, storage: &LocalStorage, command: AppsvcCommand) -> Result<()> {
    match command {
        AppsvcCommand::List => {
            for item in client.list_fast_appsvcs().await? {
                print_json(&item);
            }
        }
        AppsvcCommand::Find { tenant } => {
            println!("{}", client.get_fast_appsvc_by_name(&tenant).await?)
        }
        AppsvcCommand::Post { file } => {
            let template = load_declaration(storage, &file).await?;
            println!("{}", client.post_fast_appsvc(&template).await?);
        }
        AppsvcCommand::Patch { id, file } => {
            let declaration = load_declaration(storage, &file).await?;
            println!("{}", client.patch_fast_appsvc(&id, &declaration).await?);
        }
        AppsvcCommand::Deploy { id, file } => {
            let deployment = load_declaration(storage, &file).await?;
            print_json(&client.deploy_fast_appsvc(&id, &deployment).await?);
        }
        AppsvcCommand::Delete { id } => print_json(&client.delete_fast_appsvc(&id).await?),
    }
    Ok(())
}

async fn run_device(client: &CmClient, storage: &LocalStorage, command: DeviceCommand) -> Result<()> {
    match command {
        DeviceCommand::Find { hostname } => {
            println!("{}", client.get_instance_by_name(&hostname).await?)
        }
        DeviceCommand::Instantiate { provider, file } => {
            let declaration = load_declaration(storage, &file).await?;
            println!(
                "{}",
                client.post_instance_instantiation(provider, &declaration).await?
            );
        }
        DeviceCommand::Task { path } => print_json(&client.get_task(&path).await?),
        DeviceCommand::Delete { id, tenant } => {
            let deletion = client.delete_instance(&id, &tenant).await?;
            println!("Instance deletion status: {}", deletion.cm_status);
            if let Some(task) = &deletion.task_path {
                println!("Deletion task: {}", task);
            }
            match deletion.tenant {
                TenantDeletion::Deleted { status } | TenantDeletion::Failed { status } => {
                    println!("F5OS tenant deletion status: {}", status)
                }
                TenantDeletion::Skipped => println!("F5OS tenant deletion skipped"),
            }
            if !deletion.cm_accepted() {
                return Err(CmError::RejectedError {
                    operation: "delete_instance".to_string(),
                    status: deletion.cm_status,
                    body: deletion.cm_body,
                });
            }
        }
    }
    Ok(())
}

async fn run_call(client: &CmClient, storage: &LocalStorage, args: CallArgs) -> Result<()> {
    let body = match &args.body {
        Some(file) => Some(load_declaration(storage, file).await?),
        None => None,
    };
    let response = client
        .request(args.method, &args.path, body.as_ref().map(|d| d.as_value()))
        .await?;

    println!("{}", response.status);
    print_json(&response.body);
    if response.is_success() {
        Ok(())
    } else {
        Err(CmError::RejectedError {
            operation: format!("{} {}", args.method, args.path),
            status: response.status,
            body: response.body,
        })
    }
}
