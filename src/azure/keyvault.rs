use crate::domain::ports::{AccessTokenProvider, SecretStore};
use crate::utils::error::{Result, TransferError};
use async_trait::async_trait;
use std::sync::Arc;

const API_VERSION: &str = "7.4";

/// The AAD resource secrets tokens are scoped to, regardless of which vault
/// instance the client talks to.
const VAULT_RESOURCE: &str = "https://vault.azure.net";

/// Writes secrets to an Azure Key Vault over its REST API.
pub struct SecretClient {
    http: reqwest::Client,
    vault_url: String,
    credential: Arc<dyn AccessTokenProvider>,
}

impl SecretClient {
    pub fn new(vault_url: impl Into<String>, credential: Arc<dyn AccessTokenProvider>) -> Self {
        let vault_url = vault_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            vault_url,
            credential,
        }
    }
}

#[async_trait]
impl SecretStore for SecretClient {
    async fn set_secret(&self, name: &str, value: &str) -> Result<()> {
        let token = self.credential.access_token(VAULT_RESOURCE).await?;
        let url = format!(
            "{}/secrets/{}?api-version={}",
            self.vault_url, name, API_VERSION
        );

        tracing::debug!("Storing secret {} in {}", name, self.vault_url);
        let response = self
            .http
            .put(&url)
            .bearer_auth(token)
            .json(&serde_json::json!({ "value": value }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::Api {
                service: "keyvault",
                status,
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::auth::AadCredential;
    use httpmock::prelude::*;

    fn credential_for(server: &MockServer) -> Arc<dyn AccessTokenProvider> {
        server.mock(|when, then| {
            when.method(POST).path("/tenant/oauth2/v2.0/token");
            then.status(200).json_body(serde_json::json!({
                "access_token": "vault-token",
                "expires_in": 3600
            }));
        });
        Arc::new(AadCredential::new(
            server.base_url(),
            "tenant",
            "client",
            "secret",
        ))
    }

    #[tokio::test]
    async fn test_set_secret_puts_value() {
        let server = MockServer::start();
        let credential = credential_for(&server);

        let secret_mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/secrets/xfer-1-src")
                .query_param("api-version", API_VERSION)
                .header("authorization", "Bearer vault-token")
                .json_body(serde_json::json!({ "value": "account-key" }));
            then.status(200).json_body(serde_json::json!({
                "value": "account-key",
                "id": format!("{}/secrets/xfer-1-src/abc", server.base_url())
            }));
        });

        let client = SecretClient::new(server.base_url(), credential);
        client.set_secret("xfer-1-src", "account-key").await.unwrap();

        secret_mock.assert();
    }

    #[tokio::test]
    async fn test_set_secret_surfaces_api_errors() {
        let server = MockServer::start();
        let credential = credential_for(&server);

        server.mock(|when, then| {
            when.method(PUT).path_contains("/secrets/");
            then.status(403).body("forbidden");
        });

        let client = SecretClient::new(server.base_url(), credential);
        let result = client.set_secret("name", "value").await;

        assert!(matches!(
            result,
            Err(TransferError::Api { service: "keyvault", status: 403, .. })
        ));
    }
}
