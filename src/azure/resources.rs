use crate::domain::ports::AccessTokenProvider;
use crate::utils::error::{Result, TransferError};
use serde::Deserialize;
use std::sync::Arc;

pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

const KEY_VAULT_API_VERSION: &str = "2022-07-01";
const DATA_FACTORY_API_VERSION: &str = "2018-06-01";

/// Parsed ARM resource id:
/// `/subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    pub subscription_id: String,
    pub resource_group: String,
    pub provider: String,
    pub resource_type: String,
    pub name: String,
    pub raw: String,
}

impl ResourceId {
    pub fn parse(field: &str, raw: &str) -> Result<Self> {
        let invalid = |reason: &str| TransferError::InvalidConfigValue {
            field: field.to_string(),
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        let segments: Vec<&str> = raw.trim_matches('/').split('/').collect();
        if segments.len() != 8 {
            return Err(invalid(
                "expected /subscriptions/{id}/resourceGroups/{group}/providers/{namespace}/{type}/{name}",
            ));
        }
        if !segments[0].eq_ignore_ascii_case("subscriptions")
            || !segments[2].eq_ignore_ascii_case("resourceGroups")
            || !segments[4].eq_ignore_ascii_case("providers")
        {
            return Err(invalid("not an ARM resource id"));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid("resource id contains empty segments"));
        }

        Ok(Self {
            subscription_id: segments[1].to_string(),
            resource_group: segments[3].to_string(),
            provider: segments[5].to_string(),
            resource_type: segments[6].to_string(),
            name: segments[7].to_string(),
            raw: raw.to_string(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenericResource {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub properties: serde_json::Value,
}

/// Thin reader over the ARM generic-resource API. Used at startup to make
/// sure the configured factory exists and to resolve a vault's URI.
pub struct ArmClient {
    http: reqwest::Client,
    endpoint: String,
    credential: Arc<dyn AccessTokenProvider>,
}

impl ArmClient {
    pub fn new(endpoint: impl Into<String>, credential: Arc<dyn AccessTokenProvider>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            credential,
        }
    }

    pub async fn get_by_id(&self, resource_id: &str, api_version: &str) -> Result<GenericResource> {
        let token = self.credential.access_token(&self.endpoint).await?;
        let url = format!(
            "{}{}?api-version={}",
            self.endpoint.trim_end_matches('/'),
            resource_id,
            api_version
        );

        let response = self.http.get(&url).bearer_auth(token).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::Api {
                service: "resource manager",
                status,
                body,
            });
        }

        Ok(response.json().await?)
    }

    /// Confirms the factory resource exists and returns it.
    pub async fn get_factory(&self, factory: &ResourceId) -> Result<GenericResource> {
        self.get_by_id(&factory.raw, DATA_FACTORY_API_VERSION).await
    }

    /// Reads `properties.vaultUri` off a Key Vault resource.
    pub async fn get_vault_uri(&self, vault: &ResourceId) -> Result<String> {
        let resource = self.get_by_id(&vault.raw, KEY_VAULT_API_VERSION).await?;
        resource
            .properties
            .get("vaultUri")
            .and_then(|v| v.as_str())
            .map(|s| s.trim_end_matches('/').to_string())
            .ok_or_else(|| TransferError::UnexpectedResponse {
                service: "resource manager",
                message: format!("vault {} has no vaultUri property", resource.name),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACTORY_ID: &str =
        "/subscriptions/sub-1/resourceGroups/rg-1/providers/Microsoft.DataFactory/factories/my-factory";

    #[test]
    fn test_parse_resource_id() {
        let id = ResourceId::parse("data_factory.resource_id", FACTORY_ID).unwrap();
        assert_eq!(id.subscription_id, "sub-1");
        assert_eq!(id.resource_group, "rg-1");
        assert_eq!(id.provider, "Microsoft.DataFactory");
        assert_eq!(id.resource_type, "factories");
        assert_eq!(id.name, "my-factory");
    }

    #[test]
    fn test_parse_rejects_malformed_ids() {
        assert!(ResourceId::parse("f", "not-a-resource-id").is_err());
        assert!(ResourceId::parse("f", "/subscriptions/sub-1").is_err());
        assert!(ResourceId::parse(
            "f",
            "/subscriptions/sub-1/groups/rg/providers/Microsoft.KeyVault/vaults/v"
        )
        .is_err());
        assert!(ResourceId::parse(
            "f",
            "/subscriptions//resourceGroups/rg/providers/Microsoft.KeyVault/vaults/v"
        )
        .is_err());
    }

    #[test]
    fn test_parse_is_case_insensitive_on_markers() {
        let raw = "/Subscriptions/sub-1/resourcegroups/rg-1/Providers/Microsoft.KeyVault/vaults/kv";
        let id = ResourceId::parse("keyvault.resource_id", raw).unwrap();
        assert_eq!(id.name, "kv");
    }
}
