use crate::azure::auth::DEFAULT_AUTHORITY_HOST;
use crate::azure::datafactory::DataFactoryOptions;
use crate::azure::resources::{ResourceId, DEFAULT_MANAGEMENT_ENDPOINT};
use crate::core::retry::RetryPolicy;
use crate::utils::error::{Result, TransferError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub azure: Option<AzureConfig>,
    pub data_factory: Option<DataFactoryConfig>,
    pub transfer: Option<TransferConfig>,
    pub api: Option<ApiConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub authority_host: Option<String>,
    pub management_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFactoryConfig {
    pub resource_id: String,
    pub key_vault_resource_id: String,
    pub key_vault_linked_service: Option<String>,
    pub poll_interval_seconds: Option<u64>,
    pub max_duration_seconds: Option<u64>,
    pub data_integration_units: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    pub retry_attempts: Option<u32>,
    pub retry_delay_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub bind_address: String,
    pub token_secret: String,
    pub encryption_key: String,
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TransferError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| TransferError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` with the environment value; unset variables
    /// are left as-is so validation can point at them.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(azure) = &self.azure {
            validation::validate_non_empty_string("azure.tenant_id", &azure.tenant_id)?;
            validation::validate_non_empty_string("azure.client_id", &azure.client_id)?;
            validation::validate_non_empty_string("azure.client_secret", &azure.client_secret)?;
            if let Some(host) = &azure.authority_host {
                validation::validate_url("azure.authority_host", host)?;
            }
            if let Some(endpoint) = &azure.management_endpoint {
                validation::validate_url("azure.management_endpoint", endpoint)?;
            }
        }

        if let Some(data_factory) = &self.data_factory {
            if self.azure.is_none() {
                return Err(TransferError::MissingConfig {
                    field: "azure".to_string(),
                });
            }
            ResourceId::parse("data_factory.resource_id", &data_factory.resource_id)?;
            ResourceId::parse(
                "data_factory.key_vault_resource_id",
                &data_factory.key_vault_resource_id,
            )?;
            if let Some(interval) = data_factory.poll_interval_seconds {
                validation::validate_positive_number(
                    "data_factory.poll_interval_seconds",
                    interval,
                    1,
                )?;
            }
            if let Some(max) = data_factory.max_duration_seconds {
                validation::validate_positive_number("data_factory.max_duration_seconds", max, 1)?;
            }
            if let Some(units) = data_factory.data_integration_units {
                validation::validate_range("data_factory.data_integration_units", units, 2, 256)?;
            }
        }

        if let Some(transfer) = &self.transfer {
            if let Some(attempts) = transfer.retry_attempts {
                validation::validate_positive_number(
                    "transfer.retry_attempts",
                    attempts as u64,
                    1,
                )?;
            }
        }

        if let Some(api) = &self.api {
            validation::validate_non_empty_string("api.bind_address", &api.bind_address)?;
            if api.bind_address.parse::<std::net::SocketAddr>().is_err() {
                return Err(TransferError::InvalidConfigValue {
                    field: "api.bind_address".to_string(),
                    value: api.bind_address.clone(),
                    reason: "not a valid socket address".to_string(),
                });
            }
            validation::validate_non_empty_string("api.token_secret", &api.token_secret)?;
            validation::validate_non_empty_string("api.encryption_key", &api.encryption_key)?;
        }

        Ok(())
    }

    pub fn authority_host(&self) -> &str {
        self.azure
            .as_ref()
            .and_then(|a| a.authority_host.as_deref())
            .unwrap_or(DEFAULT_AUTHORITY_HOST)
    }

    pub fn management_endpoint(&self) -> &str {
        self.azure
            .as_ref()
            .and_then(|a| a.management_endpoint.as_deref())
            .unwrap_or(DEFAULT_MANAGEMENT_ENDPOINT)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let transfer = self.transfer.as_ref();
        let attempts = transfer.and_then(|t| t.retry_attempts).unwrap_or(3);
        let delay = transfer.and_then(|t| t.retry_delay_seconds).unwrap_or(2);
        RetryPolicy::new(attempts, Duration::from_secs(delay))
    }

    pub fn data_factory_options(&self) -> DataFactoryOptions {
        let defaults = DataFactoryOptions::default();
        let Some(config) = &self.data_factory else {
            return defaults;
        };

        DataFactoryOptions {
            key_vault_linked_service: config
                .key_vault_linked_service
                .clone()
                .unwrap_or(defaults.key_vault_linked_service),
            poll_interval: config
                .poll_interval_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.poll_interval),
            max_duration: config
                .max_duration_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.max_duration),
            data_integration_units: config
                .data_integration_units
                .unwrap_or(defaults.data_integration_units),
        }
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
