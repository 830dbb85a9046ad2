// Domain layer: core models and ports (interfaces).

pub mod model;
pub mod ports;

pub use model::{ClaimToken, DataAddress, DataFlowRequest, TransferReport, DATA_ADDRESS_CLAIM};
pub use ports::{AccessTokenProvider, DataEncrypter, SecretStore, TokenValidator, TransferService};
