pub mod api;
pub mod azure;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, ServiceKind};

pub use azure::{BlobTransferService, DataFactoryTransferService};
pub use config::AppConfig;
pub use core::{RetryPolicy, TransferServiceRegistry};
pub use domain::{DataAddress, DataFlowRequest, TransferReport, TransferService};
pub use utils::error::{Result, TransferError};
