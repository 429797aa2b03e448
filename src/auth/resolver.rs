//! Credential resolution
//!
//! `JwtIdentityResolver` verifies bearer tokens; `CachedIdentityResolver` puts a bounded
//! TTL cache in front of any resolver so repeated requests with the same credential skip
//! verification.

use super::jwt::JwtHandler;
use super::policy::IdentityResolver;
use super::types::Identity;
use crate::config::AuthConfig;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Resolves HS256 bearer tokens
#[derive(Debug, Clone)]
pub struct JwtIdentityResolver {
    jwt: JwtHandler,
}

impl JwtIdentityResolver {
    pub fn new(jwt: JwtHandler) -> Self {
        Self { jwt }
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve_identity(&self, credential: &str) -> Result<Identity> {
        self.jwt.identity_from_token(credential)
    }
}

/// Cache-first wrapper around another resolver
pub struct CachedIdentityResolver {
    inner: Arc<dyn IdentityResolver>,
    cache: Cache<String, Identity>,
}

impl CachedIdentityResolver {
    pub fn new(inner: Arc<dyn IdentityResolver>, ttl: Duration, capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn from_config(inner: Arc<dyn IdentityResolver>, config: &AuthConfig) -> Self {
        Self::new(
            inner,
            Duration::from_secs(config.credential_cache_ttl_secs),
            config.credential_cache_capacity,
        )
    }

    /// Drop a cached credential
    pub async fn invalidate(&self, credential: &str) {
        self.cache.invalidate(credential).await;
    }
}

#[async_trait]
impl IdentityResolver for CachedIdentityResolver {
    async fn resolve_identity(&self, credential: &str) -> Result<Identity> {
        if let Some(identity) = self.cache.get(credential).await {
            // A token can expire before its cache entry does.
            if !identity.is_expired(Utc::now()) {
                return Ok(identity);
            }
            self.cache.invalidate(credential).await;
        }

        debug!("Credential cache miss");
        let identity = self.inner.resolve_identity(credential).await?;
        self.cache
            .insert(credential.to_string(), identity.clone())
            .await;
        Ok(identity)
    }
}
