use crate::domain::model::ClaimToken;
use crate::domain::ports::{DataEncrypter, TokenValidator};
use crate::utils::error::{Result, TransferError};
use aes_gcm::aead::{Aead, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Key, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

/// Validates HS256-signed consumer tokens issued by the control plane.
pub struct Hs256TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Hs256TokenValidator {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl TokenValidator for Hs256TokenValidator {
    fn validate(&self, token: &str) -> Result<ClaimToken> {
        let data = decode::<ClaimToken>(token, &self.decoding_key, &self.validation).map_err(
            |e| TransferError::TokenInvalid {
                message: e.to_string(),
            },
        )?;
        Ok(data.claims)
    }
}

const NONCE_LENGTH: usize = 12;

/// AES-256-GCM with the nonce prepended to the ciphertext; base64 on the
/// wire so the value can ride inside a JWT claim.
pub struct AesGcmEncrypter {
    cipher: Aes256Gcm,
}

impl AesGcmEncrypter {
    pub fn from_base64_key(key: &str) -> Result<Self> {
        let bytes = BASE64.decode(key).map_err(|_| TransferError::Crypto {
            message: "encryption key is not valid base64".to_string(),
        })?;
        if bytes.len() != 32 {
            return Err(TransferError::Crypto {
                message: format!("encryption key must be 32 bytes, got {}", bytes.len()),
            });
        }
        Ok(Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&bytes)),
        })
    }
}

impl DataEncrypter for AesGcmEncrypter {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext =
            self.cipher
                .encrypt(&nonce, plaintext.as_bytes())
                .map_err(|_| TransferError::Crypto {
                    message: "encryption failed".to_string(),
                })?;

        let mut payload = nonce.to_vec();
        payload.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(payload))
    }

    fn decrypt(&self, value: &str) -> Result<String> {
        let payload = BASE64.decode(value).map_err(|_| TransferError::Crypto {
            message: "ciphertext is not valid base64".to_string(),
        })?;
        if payload.len() <= NONCE_LENGTH {
            return Err(TransferError::Crypto {
                message: "ciphertext too short".to_string(),
            });
        }

        let (nonce, ciphertext) = payload.split_at(NONCE_LENGTH);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| TransferError::Crypto {
                message: "decryption failed".to_string(),
            })?;

        String::from_utf8(plaintext).map_err(|_| TransferError::Crypto {
            message: "decrypted payload is not UTF-8".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn test_key() -> String {
        BASE64.encode([7u8; 32])
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let encrypter = AesGcmEncrypter::from_base64_key(&test_key()).unwrap();

        let plaintext = r#"{"type":"AzureStorage","account":"src"}"#;
        let ciphertext = encrypter.encrypt(plaintext).unwrap();
        assert_ne!(ciphertext, plaintext);

        assert_eq!(encrypter.decrypt(&ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn test_nonces_differ_between_encryptions() {
        let encrypter = AesGcmEncrypter::from_base64_key(&test_key()).unwrap();
        let a = encrypter.encrypt("same input").unwrap();
        let b = encrypter.encrypt("same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tampered_ciphertext_is_rejected() {
        let encrypter = AesGcmEncrypter::from_base64_key(&test_key()).unwrap();
        let ciphertext = encrypter.encrypt("payload").unwrap();

        let mut bytes = BASE64.decode(&ciphertext).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        let tampered = BASE64.encode(bytes);

        assert!(matches!(
            encrypter.decrypt(&tampered),
            Err(TransferError::Crypto { .. })
        ));
    }

    #[test]
    fn test_key_length_is_enforced() {
        let short = BASE64.encode([1u8; 16]);
        assert!(AesGcmEncrypter::from_base64_key(&short).is_err());
        assert!(AesGcmEncrypter::from_base64_key("***").is_err());
    }

    #[test]
    fn test_token_validator_accepts_valid_token() {
        let claims = serde_json::json!({
            "foo": "bar",
            "exp": chrono::Utc::now().timestamp() + 600
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"token-secret"),
        )
        .unwrap();

        let validator = Hs256TokenValidator::new("token-secret");
        let claim_token = validator.validate(&token).unwrap();
        assert_eq!(claim_token.get_str("foo"), Some("bar"));
    }

    #[test]
    fn test_token_validator_rejects_wrong_secret() {
        let claims = serde_json::json!({
            "exp": chrono::Utc::now().timestamp() + 600
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"other-secret"),
        )
        .unwrap();

        let validator = Hs256TokenValidator::new("token-secret");
        assert!(matches!(
            validator.validate(&token),
            Err(TransferError::TokenInvalid { .. })
        ));
    }

    #[test]
    fn test_token_validator_rejects_expired_token() {
        let claims = serde_json::json!({
            "exp": chrono::Utc::now().timestamp() - 600
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"token-secret"),
        )
        .unwrap();

        let validator = Hs256TokenValidator::new("token-secret");
        assert!(validator.validate(&token).is_err());
    }
}
