pub mod toml_config;

pub use toml_config::{ApiConfig, AppConfig, AzureConfig, DataFactoryConfig, TransferConfig};

#[cfg(feature = "cli")]
pub use cli::{CliConfig, ServiceKind};

#[cfg(feature = "cli")]
mod cli {
    use crate::azure::schema;
    use crate::domain::model::{DataAddress, DataFlowRequest};
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::{Parser, ValueEnum};
    use std::path::PathBuf;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    pub enum ServiceKind {
        /// Direct copy through the blob service.
        Blob,
        /// Copy orchestrated by an Azure Data Factory pipeline.
        DataFactory,
    }

    #[derive(Debug, Clone, Parser)]
    #[command(name = "dataplane")]
    #[command(about = "Copies a blob between Azure storage accounts")]
    pub struct CliConfig {
        /// TOML configuration file; required for Data Factory transfers.
        #[arg(long)]
        pub config: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "blob")]
        pub via: ServiceKind,

        #[arg(long)]
        pub source_account: String,

        #[arg(long)]
        pub source_container: String,

        #[arg(long)]
        pub source_blob: String,

        #[arg(long, env = "SOURCE_SHARED_KEY", hide_env_values = true)]
        pub source_key: String,

        #[arg(long)]
        pub source_endpoint: Option<String>,

        #[arg(long)]
        pub dest_account: String,

        #[arg(long)]
        pub dest_container: String,

        /// Defaults to the source blob name.
        #[arg(long)]
        pub dest_blob: Option<String>,

        #[arg(long, env = "DEST_SHARED_KEY", hide_env_values = true)]
        pub dest_key: String,

        #[arg(long)]
        pub dest_endpoint: Option<String>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log system stats while the transfer runs")]
        pub monitor: bool,
    }

    impl CliConfig {
        pub fn to_request(&self) -> DataFlowRequest {
            let mut source = DataAddress::new(schema::TYPE)
                .with_property(schema::ACCOUNT_NAME, &self.source_account)
                .with_property(schema::CONTAINER_NAME, &self.source_container)
                .with_property(schema::BLOB_NAME, &self.source_blob)
                .with_property(schema::SHARED_KEY, &self.source_key);
            if let Some(endpoint) = &self.source_endpoint {
                source = source.with_property(schema::ENDPOINT, endpoint);
            }

            let mut destination = DataAddress::new(schema::TYPE)
                .with_property(schema::ACCOUNT_NAME, &self.dest_account)
                .with_property(schema::CONTAINER_NAME, &self.dest_container)
                .with_property(schema::SHARED_KEY, &self.dest_key);
            if let Some(blob) = &self.dest_blob {
                destination = destination.with_property(schema::BLOB_NAME, blob);
            }
            if let Some(endpoint) = &self.dest_endpoint {
                destination = destination.with_property(schema::ENDPOINT, endpoint);
            }

            DataFlowRequest::new(source, destination)
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_account_name(&self.source_account)?;
            validation::validate_container_name(&self.source_container)?;
            validation::validate_blob_name(&self.source_blob)?;
            validation::validate_shared_key(&self.source_key)?;

            validation::validate_account_name(&self.dest_account)?;
            validation::validate_container_name(&self.dest_container)?;
            if let Some(blob) = &self.dest_blob {
                validation::validate_blob_name(blob)?;
            }
            validation::validate_shared_key(&self.dest_key)?;

            if let Some(endpoint) = &self.source_endpoint {
                validation::validate_url("source_endpoint", endpoint)?;
            }
            if let Some(endpoint) = &self.dest_endpoint {
                validation::validate_url("dest_endpoint", endpoint)?;
            }
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn config() -> CliConfig {
            CliConfig::parse_from([
                "dataplane",
                "--source-account",
                "srcaccount",
                "--source-container",
                "src-container",
                "--source-blob",
                "data.bin",
                "--source-key",
                "a2V5LWJ5dGVz",
                "--dest-account",
                "dstaccount",
                "--dest-container",
                "dst-container",
                "--dest-key",
                "a2V5LWJ5dGVz",
            ])
        }

        #[test]
        fn test_minimal_arguments_validate() {
            let config = config();
            assert!(config.validate().is_ok());
            assert_eq!(config.via, ServiceKind::Blob);
        }

        #[test]
        fn test_to_request_builds_blob_addresses() {
            let request = config().to_request();
            assert_eq!(request.source.kind, schema::TYPE);
            assert_eq!(request.source.property(schema::BLOB_NAME), Some("data.bin"));
            assert_eq!(
                request.destination.property(schema::ACCOUNT_NAME),
                Some("dstaccount")
            );
            assert!(request.destination.property(schema::BLOB_NAME).is_none());
        }

        #[test]
        fn test_invalid_account_fails_validation() {
            let mut config = config();
            config.source_account = "Not-Valid".to_string();
            assert!(config.validate().is_err());
        }
    }
}
