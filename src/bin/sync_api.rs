use anyhow::Context;
use azure_dataplane::api::{self, AesGcmEncrypter, ApiState, Hs256TokenValidator};
use azure_dataplane::utils::logger;
use azure_dataplane::utils::validation::Validate;
use azure_dataplane::AppConfig;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init_server_logger();

    let config_path =
        std::env::var("DATAPLANE_CONFIG").unwrap_or_else(|_| "dataplane.toml".to_string());
    let config = AppConfig::from_file(&config_path)
        .with_context(|| format!("failed to load {}", config_path))?;
    config.validate()?;

    let api_config = config
        .api
        .context("[api] section is required to run the validation API")?;

    let state = ApiState {
        token_validator: Arc::new(Hs256TokenValidator::new(&api_config.token_secret)),
        encrypter: Arc::new(AesGcmEncrypter::from_base64_key(&api_config.encryption_key)?),
    };
    let app = api::router(state);

    let addr: SocketAddr = api_config
        .bind_address
        .parse()
        .context("invalid api.bind_address")?;
    tracing::info!("🚀 Validation API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
