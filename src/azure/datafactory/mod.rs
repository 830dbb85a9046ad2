pub mod client;
pub mod models;
pub mod transfer;

pub use client::DataFactoryClient;
pub use transfer::{DataFactoryOptions, DataFactoryTransferService};
