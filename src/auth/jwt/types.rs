//! Token claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried by a gateway bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Issued at, seconds since the epoch
    pub iat: u64,
    /// Expiry, seconds since the epoch
    pub exp: u64,
    pub iss: String,
    /// Unique token id
    pub jti: String,
    /// Role names the policy store resolves to rules
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.exp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}
