//! Token signing and verification

use super::types::Claims;
use crate::auth::types::Identity;
use crate::config::AuthConfig;
use crate::utils::error::{GatewayError, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use uuid::Uuid;

/// Signs and verifies HS256 tokens with the shared gateway secret
#[derive(Clone)]
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
}

impl std::fmt::Debug for JwtHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtHandler")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl JwtHandler {
    /// Create a new JWT handler
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer: config.issuer.clone(),
        }
    }

    /// Sign a token for `subject` holding `roles`, valid for `ttl`
    pub fn create_token(&self, subject: &str, roles: Vec<String>, ttl: Duration) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| GatewayError::internal(format!("System time error: {}", e)))?
            .as_secs();

        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now + ttl.as_secs(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
            roles,
        };

        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, &claims, &self.encoding_key).map_err(GatewayError::Jwt)?;

        debug!("Created token for subject: {}", subject);
        Ok(token)
    }

    /// Verify signature, expiry and issuer
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(token_data) => {
                debug!("Token verified for subject: {}", token_data.claims.sub);
                Ok(token_data.claims)
            }
            Err(e) => {
                warn!("Token verification failed: {}", e);
                Err(GatewayError::unauthorized("Invalid or expired credential"))
            }
        }
    }

    /// Verify a token and turn its claims into an identity
    pub fn identity_from_token(&self, token: &str) -> Result<Identity> {
        let claims = self.verify_token(token)?;
        if claims.sub.is_empty() {
            return Err(GatewayError::unauthorized("Credential has no subject"));
        }

        Ok(Identity {
            expires_at: claims.expires_at(),
            subject: claims.sub,
            roles: claims.roles,
        })
    }
}
