pub mod controller;
pub mod security;

use crate::domain::ports::{DataEncrypter, TokenValidator};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use security::{AesGcmEncrypter, Hs256TokenValidator};

#[derive(Clone)]
pub struct ApiState {
    pub token_validator: Arc<dyn TokenValidator>,
    pub encrypter: Arc<dyn DataEncrypter>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/validation", get(controller::validate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
