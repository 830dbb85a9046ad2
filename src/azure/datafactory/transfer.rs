use crate::azure::datafactory::client::DataFactoryClient;
use crate::azure::datafactory::models::{
    DatasetResource, LinkedServiceResource, PipelineResource, PipelineRunStatus,
};
use crate::azure::schema;
use crate::domain::model::{DataAddress, DataFlowRequest, TransferReport};
use crate::domain::ports::{SecretStore, TransferService};
use crate::utils::error::{Result, TransferError};
use crate::utils::validation;
use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DataFactoryOptions {
    /// Name of the key-vault linked service already defined in the factory.
    pub key_vault_linked_service: String,
    pub poll_interval: Duration,
    pub max_duration: Duration,
    pub data_integration_units: u32,
}

impl Default for DataFactoryOptions {
    fn default() -> Self {
        Self {
            key_vault_linked_service: "AzureKeyVault".to_string(),
            poll_interval: Duration::from_secs(5),
            max_duration: Duration::from_secs(600),
            data_integration_units: 32,
        }
    }
}

/// Runs blob-to-blob copies through an existing Data Factory: account keys
/// go into the vault, linked services and datasets are created per side,
/// then a one-activity copy pipeline is run and polled to completion.
pub struct DataFactoryTransferService<S: SecretStore> {
    client: DataFactoryClient,
    secrets: S,
    options: DataFactoryOptions,
}

impl<S: SecretStore> DataFactoryTransferService<S> {
    pub fn new(client: DataFactoryClient, secrets: S, options: DataFactoryOptions) -> Self {
        Self {
            client,
            secrets,
            options,
        }
    }

    /// Vault secret + linked service + dataset for one side of the copy.
    async fn provision_dataset(&self, name: &str, address: &DataAddress) -> Result<()> {
        let account = address.require(schema::ACCOUNT_NAME)?;
        let key = address.require(schema::SHARED_KEY)?;
        let container = address.require(schema::CONTAINER_NAME)?;

        self.secrets.set_secret(name, key).await?;

        let linked_service = LinkedServiceResource::azure_storage(
            account,
            &self.options.key_vault_linked_service,
            name,
        );
        self.client
            .create_linked_service(name, &linked_service)
            .await?;

        let dataset = DatasetResource::binary_blob(
            name,
            container,
            address.property(schema::BLOB_NAME).map(str::to_string),
        );
        self.client.create_dataset(name, &dataset).await
    }

    async fn await_run(&self, base_name: &str, run_id: String) -> Result<TransferReport> {
        let deadline = tokio::time::Instant::now() + self.options.max_duration;

        loop {
            let run = self.client.get_run(&run_id).await?;
            let status: PipelineRunStatus = run.status.parse()?;
            tracing::info!(
                "Pipeline run status is {} {} for {}",
                run.status,
                run.message.as_deref().unwrap_or(""),
                base_name
            );

            match status {
                PipelineRunStatus::Queued | PipelineRunStatus::InProgress => {
                    if tokio::time::Instant::now() >= deadline {
                        return Err(TransferError::Timeout {
                            seconds: self.options.max_duration.as_secs(),
                        });
                    }
                    tokio::time::sleep(self.options.poll_interval).await;
                }
                PipelineRunStatus::Succeeded => {
                    return Ok(TransferReport::pipeline_run(run_id));
                }
                _ => {
                    return Err(TransferError::PipelineRun {
                        run_id,
                        status: run.status,
                        message: run.message.unwrap_or_default(),
                    });
                }
            }
        }
    }
}

#[async_trait]
impl<S: SecretStore> TransferService for DataFactoryTransferService<S> {
    fn can_handle(&self, request: &DataFlowRequest) -> bool {
        request.source.kind == schema::TYPE && request.destination.kind == schema::TYPE
    }

    /// The destination must carry exactly the account, container and shared
    /// key; anything else would silently change what the pipeline writes.
    fn validate(&self, request: &DataFlowRequest) -> Result<()> {
        let mut properties = request.destination.properties.clone();

        let account = properties
            .remove(schema::ACCOUNT_NAME)
            .ok_or(TransferError::MissingProperty {
                name: schema::ACCOUNT_NAME,
            })?;
        validation::validate_account_name(&account)?;

        let container = properties
            .remove(schema::CONTAINER_NAME)
            .ok_or(TransferError::MissingProperty {
                name: schema::CONTAINER_NAME,
            })?;
        validation::validate_container_name(&container)?;

        let shared_key = properties
            .remove(schema::SHARED_KEY)
            .ok_or(TransferError::MissingProperty {
                name: schema::SHARED_KEY,
            })?;
        validation::validate_shared_key(&shared_key)?;

        if let Some(unexpected) = properties.keys().next() {
            return Err(TransferError::UnexpectedProperty {
                name: unexpected.clone(),
            });
        }
        Ok(())
    }

    async fn transfer(&self, request: &DataFlowRequest) -> Result<TransferReport> {
        let base_name = format!("xfer-{}", Uuid::new_v4());
        tracing::info!("Creating data factory pipeline for {}", base_name);

        let source_name = format!("{}-src", base_name);
        let destination_name = format!("{}-dst", base_name);

        self.provision_dataset(&source_name, &request.source).await?;
        self.provision_dataset(&destination_name, &request.destination)
            .await?;

        let pipeline = PipelineResource::blob_copy(
            &source_name,
            &destination_name,
            self.options.data_integration_units,
            "0.00:10:00",
        );
        self.client.create_pipeline(&base_name, &pipeline).await?;

        let run_id = self.client.create_run(&base_name).await?;

        tracing::info!("Awaiting pipeline completion for {}", base_name);
        self.await_run(&base_name, run_id).await
    }
}
