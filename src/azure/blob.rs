use crate::azure::schema;
use crate::core::retry::RetryPolicy;
use crate::domain::model::{DataAddress, DataFlowRequest, TransferReport};
use crate::domain::ports::TransferService;
use crate::utils::error::{Result, TransferError};
use crate::utils::validation;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const X_MS_VERSION: &str = "2021-08-06";
const OCTET_STREAM: &str = "application/octet-stream";

/// Blob service client authenticating with the account shared key.
pub struct BlobClient {
    http: reqwest::Client,
    endpoint: String,
    account: String,
    key: Vec<u8>,
}

impl BlobClient {
    pub fn new(account: &str, shared_key: &str, endpoint: Option<&str>) -> Result<Self> {
        let key = BASE64
            .decode(shared_key)
            .map_err(|_| TransferError::InvalidProperty {
                field: schema::SHARED_KEY,
                reason: "shared key is not valid base64".to_string(),
            })?;

        let endpoint = endpoint
            .map(|e| e.trim_end_matches('/').to_string())
            .unwrap_or_else(|| schema::default_blob_endpoint(account));

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
            account: account.to_string(),
            key,
        })
    }

    pub async fn get_blob(&self, container: &str, blob: &str) -> Result<Vec<u8>> {
        let path = format!("/{}/{}", container, blob);
        let date = rfc1123_now();
        let headers = vec![
            ("x-ms-date".to_string(), date.clone()),
            ("x-ms-version".to_string(), X_MS_VERSION.to_string()),
        ];
        let authorization = self.authorization("GET", 0, "", &path, &[], &headers);

        let response = self
            .http
            .get(format!("{}{}", self.endpoint, path))
            .header("x-ms-date", &date)
            .header("x-ms-version", X_MS_VERSION)
            .header("Authorization", authorization)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::Api {
                service: "blob",
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    pub async fn put_blob(&self, container: &str, blob: &str, data: &[u8]) -> Result<()> {
        let path = format!("/{}/{}", container, blob);
        let date = rfc1123_now();
        let headers = vec![
            ("x-ms-blob-type".to_string(), "BlockBlob".to_string()),
            ("x-ms-date".to_string(), date.clone()),
            ("x-ms-version".to_string(), X_MS_VERSION.to_string()),
        ];
        let authorization =
            self.authorization("PUT", data.len() as u64, OCTET_STREAM, &path, &[], &headers);

        let response = self
            .http
            .put(format!("{}{}", self.endpoint, path))
            .header("x-ms-blob-type", "BlockBlob")
            .header("x-ms-date", &date)
            .header("x-ms-version", X_MS_VERSION)
            .header("Content-Type", OCTET_STREAM)
            .header("Authorization", authorization)
            .body(data.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::Api {
                service: "blob",
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    pub async fn container_exists(&self, container: &str) -> Result<bool> {
        let path = format!("/{}", container);
        let query = [("restype", "container")];
        let date = rfc1123_now();
        let headers = vec![
            ("x-ms-date".to_string(), date.clone()),
            ("x-ms-version".to_string(), X_MS_VERSION.to_string()),
        ];
        let authorization = self.authorization("GET", 0, "", &path, &query, &headers);

        let response = self
            .http
            .get(format!("{}{}?restype=container", self.endpoint, path))
            .header("x-ms-date", &date)
            .header("x-ms-version", X_MS_VERSION)
            .header("Authorization", authorization)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status.as_u16() == 404 {
            return Ok(false);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransferError::Api {
            service: "blob",
            status: status.as_u16(),
            body,
        })
    }

    pub async fn create_container(&self, container: &str) -> Result<()> {
        let path = format!("/{}", container);
        let query = [("restype", "container")];
        let date = rfc1123_now();
        let headers = vec![
            ("x-ms-date".to_string(), date.clone()),
            ("x-ms-version".to_string(), X_MS_VERSION.to_string()),
        ];
        let authorization = self.authorization("PUT", 0, "", &path, &query, &headers);

        let response = self
            .http
            .put(format!("{}{}?restype=container", self.endpoint, path))
            .header("x-ms-date", &date)
            .header("x-ms-version", X_MS_VERSION)
            .header("Authorization", authorization)
            .send()
            .await?;

        let status = response.status();
        // 409: container already exists, which is fine for our purposes.
        if status.is_success() || status.as_u16() == 409 {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(TransferError::Api {
            service: "blob",
            status: status.as_u16(),
            body,
        })
    }

    fn authorization(
        &self,
        verb: &str,
        content_length: u64,
        content_type: &str,
        path: &str,
        query: &[(&str, &str)],
        ms_headers: &[(String, String)],
    ) -> String {
        let string_to_sign = string_to_sign(
            &self.account,
            verb,
            content_length,
            content_type,
            path,
            query,
            ms_headers,
        );

        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length");
        mac.update(string_to_sign.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());

        format!("SharedKey {}:{}", self.account, signature)
    }
}

/// Shared Key string-to-sign, per the 2019-12-12+ wire format: twelve
/// newline-terminated standard headers, then canonicalized `x-ms-*`
/// headers, then the canonicalized resource.
fn string_to_sign(
    account: &str,
    verb: &str,
    content_length: u64,
    content_type: &str,
    path: &str,
    query: &[(&str, &str)],
    ms_headers: &[(String, String)],
) -> String {
    let length = if content_length == 0 {
        String::new()
    } else {
        content_length.to_string()
    };

    let mut sorted_headers: Vec<&(String, String)> = ms_headers.iter().collect();
    sorted_headers.sort_by(|a, b| a.0.cmp(&b.0));
    let canonical_headers: String = sorted_headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();

    let mut canonical_resource = format!("/{}{}", account, path);
    let mut sorted_query: Vec<&(&str, &str)> = query.iter().collect();
    sorted_query.sort_by(|a, b| a.0.cmp(b.0));
    for (name, value) in sorted_query {
        canonical_resource.push_str(&format!("\n{}:{}", name, value));
    }

    format!(
        "{}\n\n\n{}\n\n{}\n\n\n\n\n\n\n{}{}",
        verb, length, content_type, canonical_headers, canonical_resource
    )
}

fn rfc1123_now() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Copies a blob between two storage accounts by reading it from the source
/// and writing it to the destination container, creating the container if
/// it does not exist yet. Every remote call runs under the retry policy.
pub struct BlobTransferService {
    retry: RetryPolicy,
}

impl BlobTransferService {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    fn client_for(address: &DataAddress) -> Result<BlobClient> {
        let account = address.require(schema::ACCOUNT_NAME)?;
        let key = address.require(schema::SHARED_KEY)?;
        BlobClient::new(account, key, address.property(schema::ENDPOINT))
    }

    fn validate_address(address: &DataAddress, needs_blob: bool) -> Result<()> {
        validation::validate_account_name(address.require(schema::ACCOUNT_NAME)?)?;
        validation::validate_container_name(address.require(schema::CONTAINER_NAME)?)?;
        validation::validate_shared_key(address.require(schema::SHARED_KEY)?)?;
        if needs_blob {
            validation::validate_blob_name(address.require(schema::BLOB_NAME)?)?;
        } else if let Some(blob) = address.property(schema::BLOB_NAME) {
            validation::validate_blob_name(blob)?;
        }
        Ok(())
    }
}

impl Default for BlobTransferService {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

#[async_trait]
impl TransferService for BlobTransferService {
    fn can_handle(&self, request: &DataFlowRequest) -> bool {
        request.source.kind == schema::TYPE && request.destination.kind == schema::TYPE
    }

    fn validate(&self, request: &DataFlowRequest) -> Result<()> {
        Self::validate_address(&request.source, true)?;
        Self::validate_address(&request.destination, false)?;
        Ok(())
    }

    async fn transfer(&self, request: &DataFlowRequest) -> Result<TransferReport> {
        let source = Self::client_for(&request.source)?;
        let destination = Self::client_for(&request.destination)?;

        let source_container = request.source.require(schema::CONTAINER_NAME)?;
        let blob_name = request.source.require(schema::BLOB_NAME)?;
        let destination_container = request.destination.require(schema::CONTAINER_NAME)?;
        // Destination keeps the source blob name unless told otherwise.
        let destination_blob = request
            .destination
            .property(schema::BLOB_NAME)
            .unwrap_or(blob_name);

        tracing::info!(
            "Copying blob {} from {} to {}",
            blob_name,
            source_container,
            destination_container
        );

        let data = self
            .retry
            .run("download source blob", || {
                source.get_blob(source_container, blob_name)
            })
            .await?;

        let exists = self
            .retry
            .run("check destination container", || {
                destination.container_exists(destination_container)
            })
            .await?;
        if !exists {
            tracing::info!("Creating destination container {}", destination_container);
            self.retry
                .run("create destination container", || {
                    destination.create_container(destination_container)
                })
                .await?;
        }

        self.retry
            .run("upload destination blob", || {
                destination.put_blob(destination_container, destination_blob, &data)
            })
            .await?;

        tracing::info!("Copied {} bytes", data.len());
        Ok(TransferReport::bytes(data.len() as u64))
    }
}
