use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfig { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid {field}: {reason}")]
    InvalidProperty { field: &'static str, reason: String },

    #[error("Missing property {name}")]
    MissingProperty { name: &'static str },

    #[error("Unexpected property {name}")]
    UnexpectedProperty { name: String },

    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("{service} returned {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from {service}: {message}")]
    UnexpectedResponse {
        service: &'static str,
        message: String,
    },

    #[error("Pipeline run {run_id} ended as {status}: {message}")]
    PipelineRun {
        run_id: String,
        status: String,
        message: String,
    },

    #[error("Transfer timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Token rejected: {message}")]
    TokenInvalid { message: String },

    #[error("Crypto failure: {message}")]
    Crypto { message: String },

    #[error("No transfer service can handle request {id}")]
    NoServiceFound { id: String },
}

pub type Result<T> = std::result::Result<T, TransferError>;

impl TransferError {
    /// Whether the caller may reasonably re-submit the request. Remote-side
    /// and transport failures are retryable; validation, configuration and
    /// credential problems are not.
    pub fn retryable(&self) -> bool {
        match self {
            TransferError::Http(e) => e.is_timeout() || e.is_connect(),
            TransferError::Api { status, .. } => *status == 429 || *status >= 500,
            TransferError::PipelineRun { .. } => true,
            TransferError::Timeout { .. } => true,
            TransferError::Io(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_retryable_by_status() {
        let throttled = TransferError::Api {
            service: "blob",
            status: 429,
            body: String::new(),
        };
        let server = TransferError::Api {
            service: "blob",
            status: 503,
            body: String::new(),
        };
        let not_found = TransferError::Api {
            service: "blob",
            status: 404,
            body: String::new(),
        };

        assert!(throttled.retryable());
        assert!(server.retryable());
        assert!(!not_found.retryable());
    }

    #[test]
    fn test_validation_errors_are_fatal() {
        let err = TransferError::InvalidProperty {
            field: "account",
            reason: "too short".to_string(),
        };
        assert!(!err.retryable());

        let err = TransferError::UnexpectedProperty {
            name: "folder".to_string(),
        };
        assert!(!err.retryable());
    }

    #[test]
    fn test_pipeline_run_failure_is_retryable() {
        let err = TransferError::PipelineRun {
            run_id: "run-1".to_string(),
            status: "Failed".to_string(),
            message: "copy failed".to_string(),
        };
        assert!(err.retryable());
    }
}
