//! Property names understood by the Azure blob data-address type.

pub const TYPE: &str = "AzureStorage";

pub const ACCOUNT_NAME: &str = "account";
pub const CONTAINER_NAME: &str = "container";
pub const BLOB_NAME: &str = "blob";
pub const SHARED_KEY: &str = "sharedKey";

/// Optional per-address override of the blob service endpoint. Defaults to
/// the public-cloud endpoint for the account.
pub const ENDPOINT: &str = "endpoint";

pub fn default_blob_endpoint(account: &str) -> String {
    format!("https://{}.blob.core.windows.net", account)
}
