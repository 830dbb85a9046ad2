use crate::api::ApiState;
use crate::domain::model::DATA_ADDRESS_CLAIM;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Validates the consumer token on behalf of the data plane and hands back
/// its claims, with the data-address claim decrypted for immediate use.
pub async fn validate(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    let token = match bearer_token(&headers) {
        Some(token) => token,
        None => {
            return bad_request("Missing token");
        }
    };

    let mut claims = match state.token_validator.validate(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("Token validation failed: {}", e);
            return bad_request("Token validation failed");
        }
    };

    if let Some(encrypted) = claims.get_str(DATA_ADDRESS_CLAIM).map(str::to_string) {
        match state.encrypter.decrypt(&encrypted) {
            Ok(decrypted) => {
                claims
                    .claims
                    .insert(DATA_ADDRESS_CLAIM.to_string(), decrypted.into());
            }
            Err(e) => {
                tracing::warn!("Data address decryption failed: {}", e);
                return bad_request("Token validation failed");
            }
        }
    }

    (StatusCode::OK, Json(claims)).into_response()
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}
