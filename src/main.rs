use azure_dataplane::azure::{
    AadCredential, ArmClient, BlobTransferService, DataFactoryClient, DataFactoryTransferService,
    ResourceId, SecretClient,
};
use azure_dataplane::utils::monitor::SystemMonitor;
use azure_dataplane::utils::{logger, validation::Validate};
use azure_dataplane::{AppConfig, CliConfig, ServiceKind, TransferServiceRegistry};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting Azure data-plane transfer");
    if cli.verbose {
        tracing::debug!("Transferring via {:?}", cli.via);
    }

    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let monitor = SystemMonitor::new(cli.monitor);
    if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    let registry = match build_registry(&cli).await {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!("❌ Setup failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let request = cli.to_request();
    monitor.log_stats("Transfer start");

    match registry.transfer(&request).await {
        Ok(report) => {
            monitor.log_final_stats();
            tracing::info!("✅ Transfer completed successfully!");
            println!("✅ Transfer completed successfully!");
            if let Some(bytes) = report.bytes {
                println!("📦 {} bytes copied", bytes);
            }
            if let Some(run_id) = &report.pipeline_run_id {
                println!("🏭 Pipeline run: {}", run_id);
            }
        }
        Err(e) => {
            monitor.log_final_stats();
            tracing::error!("❌ Transfer failed: {}", e);
            eprintln!("❌ {}", e);

            // Distinct exit code for failures worth re-submitting.
            let exit_code = if e.retryable() { 2 } else { 1 };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn build_registry(cli: &CliConfig) -> azure_dataplane::Result<TransferServiceRegistry> {
    let mut registry = TransferServiceRegistry::new();

    match cli.via {
        ServiceKind::Blob => {
            let retry = match &cli.config {
                Some(path) => {
                    let config = AppConfig::from_file(path)?;
                    config.validate()?;
                    config.retry_policy()
                }
                None => Default::default(),
            };
            registry.register(Arc::new(BlobTransferService::new(retry)));
        }
        ServiceKind::DataFactory => {
            let path = cli
                .config
                .as_ref()
                .ok_or(azure_dataplane::TransferError::MissingConfig {
                    field: "--config (required for data-factory transfers)".to_string(),
                })?;
            let config = AppConfig::from_file(path)?;
            config.validate()?;

            let azure =
                config
                    .azure
                    .as_ref()
                    .ok_or(azure_dataplane::TransferError::MissingConfig {
                        field: "azure".to_string(),
                    })?;
            let factory_config =
                config
                    .data_factory
                    .as_ref()
                    .ok_or(azure_dataplane::TransferError::MissingConfig {
                        field: "data_factory".to_string(),
                    })?;

            let credential: Arc<AadCredential> = Arc::new(AadCredential::new(
                config.authority_host(),
                &azure.tenant_id,
                &azure.client_id,
                &azure.client_secret,
            ));

            let factory_id =
                ResourceId::parse("data_factory.resource_id", &factory_config.resource_id)?;
            let vault_id = ResourceId::parse(
                "data_factory.key_vault_resource_id",
                &factory_config.key_vault_resource_id,
            )?;

            let arm = ArmClient::new(config.management_endpoint(), credential.clone());
            let factory = arm.get_factory(&factory_id).await?;
            tracing::info!("Using data factory {}", factory.name);
            let vault_uri = arm.get_vault_uri(&vault_id).await?;

            let secrets = SecretClient::new(vault_uri, credential.clone());
            let client =
                DataFactoryClient::new(config.management_endpoint(), credential, &factory_id);

            registry.register(Arc::new(DataFactoryTransferService::new(
                client,
                secrets,
                config.data_factory_options(),
            )));
        }
    }

    Ok(registry)
}
