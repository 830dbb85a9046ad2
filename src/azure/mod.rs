pub mod auth;
pub mod blob;
pub mod datafactory;
pub mod keyvault;
pub mod resources;
pub mod schema;

pub use auth::AadCredential;
pub use blob::{BlobClient, BlobTransferService};
pub use datafactory::{DataFactoryClient, DataFactoryOptions, DataFactoryTransferService};
pub use keyvault::SecretClient;
pub use resources::{ArmClient, ResourceId};
