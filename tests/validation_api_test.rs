use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use azure_dataplane::api::{self, AesGcmEncrypter, ApiState, Hs256TokenValidator};
use azure_dataplane::domain::model::DATA_ADDRESS_CLAIM;
use azure_dataplane::domain::ports::DataEncrypter;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;
use tower::ServiceExt;

const TOKEN_SECRET: &str = "validation-api-secret";

fn encryption_key() -> String {
    BASE64.encode([42u8; 32])
}

fn router() -> axum::Router {
    let state = ApiState {
        token_validator: Arc::new(Hs256TokenValidator::new(TOKEN_SECRET)),
        encrypter: Arc::new(AesGcmEncrypter::from_base64_key(&encryption_key()).unwrap()),
    };
    api::router(state)
}

fn token_with_data_address(encrypted_address: &str) -> String {
    let claims = serde_json::json!({
        "foo": "bar",
        "hello": "world",
        DATA_ADDRESS_CLAIM: encrypted_address,
        "exp": chrono::Utc::now().timestamp() + 600
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TOKEN_SECRET.as_bytes()),
    )
    .unwrap()
}

async fn get_validation(app: axum::Router, authorization: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().uri("/validation");
    if let Some(value) = authorization {
        builder = builder.header("Authorization", value);
    }
    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn valid_token_returns_decrypted_claims() {
    let encrypter = AesGcmEncrypter::from_base64_key(&encryption_key()).unwrap();
    let plaintext_address = r#"{"type":"AzureStorage","account":"srcaccount"}"#;
    let encrypted = encrypter.encrypt(plaintext_address).unwrap();

    let token = token_with_data_address(&encrypted);
    let (status, json) = get_validation(router(), Some(&format!("Bearer {}", token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["foo"], "bar");
    assert_eq!(json["hello"], "world");
    assert_eq!(json[DATA_ADDRESS_CLAIM], plaintext_address);
}

#[tokio::test]
async fn raw_token_without_bearer_prefix_is_accepted() {
    let encrypter = AesGcmEncrypter::from_base64_key(&encryption_key()).unwrap();
    let encrypted = encrypter.encrypt("address").unwrap();

    let token = token_with_data_address(&encrypted);
    let (status, json) = get_validation(router(), Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[DATA_ADDRESS_CLAIM], "address");
}

#[tokio::test]
async fn token_signed_with_wrong_secret_is_rejected() {
    let claims = serde_json::json!({
        "exp": chrono::Utc::now().timestamp() + 600
    });
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();

    let (status, json) = get_validation(router(), Some(&format!("Bearer {}", token))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Token validation failed");
}

#[tokio::test]
async fn missing_authorization_header_is_rejected() {
    let (status, json) = get_validation(router(), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing token");
}

#[tokio::test]
async fn garbage_data_address_claim_is_rejected() {
    let token = token_with_data_address("not-really-encrypted");
    let (status, _) = get_validation(router(), Some(&format!("Bearer {}", token))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
