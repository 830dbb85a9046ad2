use crate::domain::model::{ClaimToken, DataFlowRequest, TransferReport};
use crate::utils::error::Result;
use async_trait::async_trait;

/// A way of moving the data a request describes. Implementations advertise
/// which requests they understand via `can_handle`; the registry dispatches
/// to the first one that does.
#[async_trait]
pub trait TransferService: Send + Sync {
    fn can_handle(&self, request: &DataFlowRequest) -> bool;

    fn validate(&self, request: &DataFlowRequest) -> Result<()>;

    async fn transfer(&self, request: &DataFlowRequest) -> Result<TransferReport>;
}

/// Writes secrets into an external vault.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn set_secret(&self, name: &str, value: &str) -> Result<()>;
}

/// Produces bearer tokens scoped to an Azure resource endpoint.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self, resource: &str) -> Result<String>;
}

/// Symmetric encryption for data addresses travelling inside tokens.
pub trait DataEncrypter: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String>;
    fn decrypt(&self, ciphertext: &str) -> Result<String>;
}

/// Validates consumer access tokens and surfaces their claims.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str) -> Result<ClaimToken>;
}
