use crate::utils::error::{Result, TransferError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Claim key under which the control plane embeds the (encrypted) data
/// address in consumer access tokens.
pub const DATA_ADDRESS_CLAIM: &str = "dad";

/// Where data lives: a type discriminator plus free-form string properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataAddress {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub properties: HashMap<String, String>,
}

impl DataAddress {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &'static str) -> Result<&str> {
        self.property(key)
            .ok_or(TransferError::MissingProperty { name: key })
    }
}

/// A request to move one blob of data from a source to a destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFlowRequest {
    pub id: String,
    pub process_id: String,
    pub source: DataAddress,
    pub destination: DataAddress,
}

impl DataFlowRequest {
    pub fn new(source: DataAddress, destination: DataAddress) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            process_id: Uuid::new_v4().to_string(),
            source,
            destination,
        }
    }
}

/// What a completed transfer produced. The direct path reports bytes moved;
/// the Data Factory path reports the pipeline run that did the copying.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransferReport {
    pub bytes: Option<u64>,
    pub pipeline_run_id: Option<String>,
}

impl TransferReport {
    pub fn bytes(n: u64) -> Self {
        Self {
            bytes: Some(n),
            ..Self::default()
        }
    }

    pub fn pipeline_run(run_id: impl Into<String>) -> Self {
        Self {
            pipeline_run_id: Some(run_id.into()),
            ..Self::default()
        }
    }
}

/// Claim set carried by a consumer access token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimToken {
    #[serde(flatten)]
    pub claims: HashMap<String, serde_json::Value>,
}

impl ClaimToken {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.claims.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.claims.get(key).and_then(|v| v.as_str())
    }
}
