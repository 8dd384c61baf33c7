//! Bearer token verification.
//!
//! Verification belongs to the identity provider; the gateway only needs a
//! [`TokenVerifier`] that turns a token into trusted claims. [`JwtVerifier`]
//! checks signatures locally with a configured HMAC secret or PEM public key.

use std::fs;
use std::str::FromStr;

use jsonwebtoken::{decode, errors::ErrorKind as JwtErrorKind, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use crate::config::{AuthConfig, ConfigError};
use crate::error::GatewayError;

/// Verified token claims.
pub type Claims = Map<String, Value>;

/// Validates a bearer token and exposes its claims.
pub trait TokenVerifier: Send + Sync + std::fmt::Debug {
    fn verify(&self, token: &str) -> Result<Claims, GatewayError>;
}

/// Local JWT signature and claim validation.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

impl JwtVerifier {
    /// Build a verifier from `[auth]`, or `None` when no key is configured.
    pub fn from_config(config: &AuthConfig) -> Result<Option<Self>, ConfigError> {
        let algorithm = Algorithm::from_str(&config.algorithm)
            .map_err(|e| ConfigError::Verifier(format!("unknown algorithm `{}`: {}", config.algorithm, e)))?;

        let decoding_key = match (algorithm, &config.secret, &config.public_key_path) {
            (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512, Some(secret), _) => {
                DecodingKey::from_secret(secret.as_bytes())
            }
            (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512, None, _) => return Ok(None),
            (_, _, Some(path)) => {
                let pem = fs::read(path)?;
                let key = match algorithm {
                    Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(&pem),
                    Algorithm::EdDSA => DecodingKey::from_ed_pem(&pem),
                    _ => DecodingKey::from_rsa_pem(&pem),
                };
                key.map_err(|e| ConfigError::Verifier(format!("invalid public key {}: {}", path, e)))?
            }
            (_, _, None) => return Ok(None),
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway_secs;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Some(Self {
            decoding_key,
            validation,
        }))
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Claims, GatewayError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => GatewayError::InvalidToken("token expired".into()),
                _ => GatewayError::InvalidToken(e.to_string()),
            })
    }
}
