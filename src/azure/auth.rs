use crate::domain::ports::AccessTokenProvider;
use crate::utils::error::{Result, TransferError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::Mutex;

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Tokens are refreshed this long before their actual expiry.
const EXPIRY_WINDOW_SECONDS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Client-credentials flow against Azure AD. Tokens are cached per scope
/// and re-requested inside the expiry window.
pub struct AadCredential {
    http: reqwest::Client,
    authority_host: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
    cache: Mutex<HashMap<String, CachedToken>>,
}

impl AadCredential {
    pub fn new(
        authority_host: impl Into<String>,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            authority_host: authority_host.into(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    async fn request_token(&self, scope: &str) -> Result<CachedToken> {
        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host.trim_end_matches('/'),
            self.tenant_id
        );

        tracing::debug!("Requesting AAD token for scope {}", scope);
        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", scope),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::Auth {
                message: format!("token endpoint returned {}: {}", status, body),
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(CachedToken {
            token: token.access_token,
            expires_at: Utc::now()
                + Duration::seconds((token.expires_in - EXPIRY_WINDOW_SECONDS).max(0)),
        })
    }
}

#[async_trait]
impl AccessTokenProvider for AadCredential {
    async fn access_token(&self, resource: &str) -> Result<String> {
        let scope = format!("{}/.default", resource.trim_end_matches('/'));

        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.get(&scope) {
            if cached.expires_at > Utc::now() {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.request_token(&scope).await?;
        let token = fresh.token.clone();
        cache.insert(scope, fresh);
        Ok(token)
    }
}
