//! Serde models for the factory resources the copy pipeline needs. Shapes
//! follow the Data Factory management API (2018-06-01).

use crate::utils::error::TransferError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize)]
pub struct LinkedServiceReference {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(rename = "referenceName")]
    pub reference_name: String,
}

impl LinkedServiceReference {
    pub fn new(reference_name: impl Into<String>) -> Self {
        Self {
            kind: "LinkedServiceReference",
            reference_name: reference_name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyVaultSecretReference {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub store: LinkedServiceReference,
    #[serde(rename = "secretName")]
    pub secret_name: String,
}

impl KeyVaultSecretReference {
    pub fn new(store: impl Into<String>, secret_name: impl Into<String>) -> Self {
        Self {
            kind: "AzureKeyVaultSecret",
            store: LinkedServiceReference::new(store),
            secret_name: secret_name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageLinkedServiceProperties {
    #[serde(rename = "connectionString")]
    pub connection_string: String,
    #[serde(rename = "accountKey")]
    pub account_key: KeyVaultSecretReference,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkedServiceResource {
    pub properties: LinkedService,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkedService {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(rename = "typeProperties")]
    pub type_properties: StorageLinkedServiceProperties,
}

impl LinkedServiceResource {
    /// Storage linked service whose account key lives in the key vault
    /// behind `store` under `secret_name`.
    pub fn azure_storage(account: &str, store: &str, secret_name: &str) -> Self {
        Self {
            properties: LinkedService {
                kind: "AzureStorage",
                type_properties: StorageLinkedServiceProperties {
                    connection_string: format!(
                        "DefaultEndpointsProtocol=https;AccountName={};",
                        account
                    ),
                    account_key: KeyVaultSecretReference::new(store, secret_name),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlobStorageLocation {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub container: String,
    #[serde(rename = "fileName", skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetResource {
    pub properties: BinaryDataset,
}

#[derive(Debug, Clone, Serialize)]
pub struct BinaryDataset {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(rename = "linkedServiceName")]
    pub linked_service_name: LinkedServiceReference,
    #[serde(rename = "typeProperties")]
    pub type_properties: BinaryDatasetProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct BinaryDatasetProperties {
    pub location: BlobStorageLocation,
}

impl DatasetResource {
    pub fn binary_blob(
        linked_service: &str,
        container: impl Into<String>,
        file_name: Option<String>,
    ) -> Self {
        Self {
            properties: BinaryDataset {
                kind: "Binary",
                linked_service_name: LinkedServiceReference::new(linked_service),
                type_properties: BinaryDatasetProperties {
                    location: BlobStorageLocation {
                        kind: "AzureBlobStorageLocation",
                        container: container.into(),
                        file_name,
                    },
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetReference {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(rename = "referenceName")]
    pub reference_name: String,
}

impl DatasetReference {
    pub fn new(reference_name: impl Into<String>) -> Self {
        Self {
            kind: "DatasetReference",
            reference_name: reference_name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CopySource {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CopySink {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CopyActivityProperties {
    pub source: CopySource,
    pub sink: CopySink,
    #[serde(rename = "validateDataConsistency")]
    pub validate_data_consistency: bool,
    #[serde(rename = "dataIntegrationUnits")]
    pub data_integration_units: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CopyActivity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub inputs: Vec<DatasetReference>,
    pub outputs: Vec<DatasetReference>,
    #[serde(rename = "typeProperties")]
    pub type_properties: CopyActivityProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElapsedTimeMetricPolicy {
    pub duration: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelinePolicy {
    #[serde(rename = "elapsedTimeMetric")]
    pub elapsed_time_metric: ElapsedTimeMetricPolicy,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineResource {
    pub properties: Pipeline,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pipeline {
    pub activities: Vec<CopyActivity>,
    pub policy: PipelinePolicy,
}

impl PipelineResource {
    /// Single blob-to-blob copy activity between two binary datasets.
    pub fn blob_copy(
        source_dataset: &str,
        destination_dataset: &str,
        data_integration_units: u32,
        elapsed_time_metric: &str,
    ) -> Self {
        Self {
            properties: Pipeline {
                activities: vec![CopyActivity {
                    name: "CopyActivity".to_string(),
                    kind: "Copy",
                    inputs: vec![DatasetReference::new(source_dataset)],
                    outputs: vec![DatasetReference::new(destination_dataset)],
                    type_properties: CopyActivityProperties {
                        source: CopySource { kind: "BlobSource" },
                        sink: CopySink { kind: "BlobSink" },
                        validate_data_consistency: true,
                        data_integration_units,
                    },
                }],
                policy: PipelinePolicy {
                    elapsed_time_metric: ElapsedTimeMetricPolicy {
                        duration: elapsed_time_metric.to_string(),
                    },
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRunResponse {
    #[serde(rename = "runId")]
    pub run_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PipelineRun {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineRunStatus {
    Queued,
    InProgress,
    Succeeded,
    Failed,
    Canceling,
    Cancelled,
}

impl PipelineRunStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PipelineRunStatus::Queued | PipelineRunStatus::InProgress)
    }
}

impl FromStr for PipelineRunStatus {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Queued" => Ok(PipelineRunStatus::Queued),
            "InProgress" => Ok(PipelineRunStatus::InProgress),
            "Succeeded" => Ok(PipelineRunStatus::Succeeded),
            "Failed" => Ok(PipelineRunStatus::Failed),
            "Canceling" => Ok(PipelineRunStatus::Canceling),
            "Cancelled" => Ok(PipelineRunStatus::Cancelled),
            other => Err(TransferError::UnexpectedResponse {
                service: "datafactory",
                message: format!("unknown pipeline run status '{}'", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linked_service_shape() {
        let resource = LinkedServiceResource::azure_storage("acct1", "AzureKeyVault", "xfer-1-src");
        let json = serde_json::to_value(&resource).unwrap();

        assert_eq!(json["properties"]["type"], "AzureStorage");
        assert_eq!(
            json["properties"]["typeProperties"]["connectionString"],
            "DefaultEndpointsProtocol=https;AccountName=acct1;"
        );
        assert_eq!(
            json["properties"]["typeProperties"]["accountKey"]["type"],
            "AzureKeyVaultSecret"
        );
        assert_eq!(
            json["properties"]["typeProperties"]["accountKey"]["store"]["referenceName"],
            "AzureKeyVault"
        );
        assert_eq!(
            json["properties"]["typeProperties"]["accountKey"]["secretName"],
            "xfer-1-src"
        );
    }

    #[test]
    fn test_dataset_omits_missing_file_name() {
        let with_name = DatasetResource::binary_blob("ls", "container", Some("blob.bin".into()));
        let without_name = DatasetResource::binary_blob("ls", "container", None);

        let with_json = serde_json::to_value(&with_name).unwrap();
        let without_json = serde_json::to_value(&without_name).unwrap();

        assert_eq!(
            with_json["properties"]["typeProperties"]["location"]["fileName"],
            "blob.bin"
        );
        assert!(without_json["properties"]["typeProperties"]["location"]
            .get("fileName")
            .is_none());
    }

    #[test]
    fn test_pipeline_shape() {
        let pipeline = PipelineResource::blob_copy("src-ds", "dst-ds", 32, "0.00:10:00");
        let json = serde_json::to_value(&pipeline).unwrap();

        let activity = &json["properties"]["activities"][0];
        assert_eq!(activity["type"], "Copy");
        assert_eq!(activity["inputs"][0]["referenceName"], "src-ds");
        assert_eq!(activity["outputs"][0]["referenceName"], "dst-ds");
        assert_eq!(activity["typeProperties"]["source"]["type"], "BlobSource");
        assert_eq!(activity["typeProperties"]["sink"]["type"], "BlobSink");
        assert_eq!(activity["typeProperties"]["validateDataConsistency"], true);
        assert_eq!(activity["typeProperties"]["dataIntegrationUnits"], 32);
        assert_eq!(
            json["properties"]["policy"]["elapsedTimeMetric"]["duration"],
            "0.00:10:00"
        );
    }

    #[test]
    fn test_run_status_parsing() {
        assert_eq!(
            "InProgress".parse::<PipelineRunStatus>().unwrap(),
            PipelineRunStatus::InProgress
        );
        assert!("Succeeded".parse::<PipelineRunStatus>().unwrap().is_terminal());
        assert!(!"Queued".parse::<PipelineRunStatus>().unwrap().is_terminal());
        assert!("Exploded".parse::<PipelineRunStatus>().is_err());
    }
}
