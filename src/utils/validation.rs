use crate::utils::error::{Result, TransferError};
use base64::Engine;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Storage account names: 3-24 characters, lowercase letters and digits only.
pub fn validate_account_name(value: &str) -> Result<()> {
    if value.len() < 3 || value.len() > 24 {
        return Err(TransferError::InvalidProperty {
            field: "account",
            reason: "account name must be between 3 and 24 characters".to_string(),
        });
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    {
        return Err(TransferError::InvalidProperty {
            field: "account",
            reason: "account name can only contain lowercase letters and digits".to_string(),
        });
    }
    Ok(())
}

/// Container names: 3-63 characters, lowercase letters, digits and hyphens;
/// must start and end with a letter or digit; no consecutive hyphens.
pub fn validate_container_name(value: &str) -> Result<()> {
    let invalid = |reason: String| TransferError::InvalidProperty {
        field: "container",
        reason,
    };

    if value.len() < 3 || value.len() > 63 {
        return Err(invalid(
            "container name must be between 3 and 63 characters".to_string(),
        ));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid(
            "container name can only contain lowercase letters, digits and hyphens".to_string(),
        ));
    }
    let first = value.chars().next().unwrap_or('-');
    let last = value.chars().last().unwrap_or('-');
    if first == '-' || last == '-' {
        return Err(invalid(
            "container name must start and end with a letter or digit".to_string(),
        ));
    }
    if value.contains("--") {
        return Err(invalid(
            "container name cannot contain consecutive hyphens".to_string(),
        ));
    }
    Ok(())
}

/// Blob names: 1-1024 characters, at most 254 path segments, must not end
/// with a dot or a slash.
pub fn validate_blob_name(value: &str) -> Result<()> {
    let invalid = |reason: String| TransferError::InvalidProperty {
        field: "blob",
        reason,
    };

    if value.is_empty() {
        return Err(invalid("blob name cannot be empty".to_string()));
    }
    if value.len() > 1024 {
        return Err(invalid(
            "blob name cannot be longer than 1024 characters".to_string(),
        ));
    }
    if value.split('/').count() > 254 {
        return Err(invalid(
            "blob name cannot contain more than 254 path segments".to_string(),
        ));
    }
    if value.ends_with('.') || value.ends_with('/') {
        return Err(invalid(
            "blob name cannot end with a dot or a slash".to_string(),
        ));
    }
    Ok(())
}

/// Shared keys are opaque to us beyond being non-empty base64.
pub fn validate_shared_key(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TransferError::InvalidProperty {
            field: "sharedKey",
            reason: "shared key cannot be empty".to_string(),
        });
    }
    if base64::engine::general_purpose::STANDARD
        .decode(value)
        .is_err()
    {
        return Err(TransferError::InvalidProperty {
            field: "sharedKey",
            reason: "shared key is not valid base64".to_string(),
        });
    }
    Ok(())
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(TransferError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(TransferError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(TransferError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TransferError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(TransferError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(TransferError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
