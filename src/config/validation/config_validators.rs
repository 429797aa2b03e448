//! Validators for the gateway configuration sections

use super::trait_def::Validate;
use crate::config::models::*;
use std::collections::HashSet;

/// Upper bound for every configured timeout and interval
const MAX_TIMEOUT_SECS: u64 = 3600;

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<(), String> {
        self.server
            .validate()
            .map_err(|e| format!("Server config error: {}", e))?;
        self.auth
            .validate()
            .map_err(|e| format!("Auth config error: {}", e))?;
        self.cluster
            .validate()
            .map_err(|e| format!("Cluster config error: {}", e))?;
        self.functions
            .validate()
            .map_err(|e| format!("Functions config error: {}", e))?;
        Ok(())
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port cannot be 0".to_string());
        }
        if self.max_body_size == 0 {
            return Err("Max body size cannot be 0".to_string());
        }
        if let Some(0) = self.workers {
            return Err("Worker count cannot be 0".to_string());
        }
        Ok(())
    }
}

impl Validate for AuthConfig {
    fn validate(&self) -> Result<(), String> {
        if self.jwt_secret.len() < 32 {
            return Err("JWT secret must be at least 32 characters long for security".to_string());
        }
        if self.jwt_secret == "your-secret-key" || self.jwt_secret == "change-me" {
            return Err("JWT secret must not use default values".to_string());
        }
        if self.issuer.is_empty() {
            return Err("Token issuer cannot be empty".to_string());
        }
        if self.credential_cache_ttl_secs == 0 {
            return Err("Credential cache TTL must be greater than 0".to_string());
        }
        if self.credential_cache_capacity == 0 {
            return Err("Credential cache capacity must be greater than 0".to_string());
        }

        let mut role_names = HashSet::new();
        for role in &self.roles {
            if role.name.is_empty() {
                return Err("Role name cannot be empty".to_string());
            }
            if !role_names.insert(role.name.as_str()) {
                return Err(format!("Duplicate role: {}", role.name));
            }
        }
        for subject in &self.subjects {
            if subject.subject.is_empty() {
                return Err("Subject cannot be empty".to_string());
            }
        }
        Ok(())
    }
}

impl Validate for ClusterConfig {
    fn validate(&self) -> Result<(), String> {
        if self.node_id.is_empty() {
            return Err("Node id cannot be empty".to_string());
        }
        if self.propagation_timeout_secs == 0 {
            return Err("Propagation timeout must be greater than 0".to_string());
        }
        if self.propagation_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(format!(
                "Propagation timeout must not exceed {}s",
                MAX_TIMEOUT_SECS
            ));
        }
        if self.reconcile_interval_secs > MAX_TIMEOUT_SECS {
            return Err(format!(
                "Reconcile interval must not exceed {}s",
                MAX_TIMEOUT_SECS
            ));
        }
        if self.max_value_bytes == 0 {
            return Err("Max value size must be greater than 0".to_string());
        }

        let mut member_ids = HashSet::new();
        for member in &self.members {
            if member.id.is_empty() {
                return Err("Member id cannot be empty".to_string());
            }
            if !member_ids.insert(member.id.as_str()) {
                return Err(format!("Duplicate member: {}", member.id));
            }
            validate_http_url(&member.address)
                .map_err(|e| format!("Member {} has an invalid address: {}", member.id, e))?;
        }

        if let Some(quorum) = self.quorum {
            if quorum == 0 {
                return Err("Quorum must be at least 1".to_string());
            }
            let peers = self.members.iter().filter(|m| m.id != self.node_id).count();
            if peers > 0 && quorum > peers {
                return Err(format!(
                    "Quorum {} exceeds the number of peers ({})",
                    quorum, peers
                ));
            }
        }

        if !self.members.is_empty() && self.cluster_token.is_empty() {
            return Err("A cluster token is required when peers are configured".to_string());
        }
        Ok(())
    }
}

impl Validate for FunctionsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.default_timeout_secs == 0 {
            return Err("Default timeout must be greater than 0".to_string());
        }
        if self.max_timeout_secs < self.default_timeout_secs {
            return Err(format!(
                "Max timeout ({}s) must not be lower than the default timeout ({}s)",
                self.max_timeout_secs, self.default_timeout_secs
            ));
        }
        if self.max_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(format!(
                "Max timeout must not exceed {}s",
                MAX_TIMEOUT_SECS
            ));
        }
        if self.post_action_timeout_ms > MAX_TIMEOUT_SECS * 1000 {
            return Err(format!(
                "Post-action timeout must not exceed {}s",
                MAX_TIMEOUT_SECS
            ));
        }
        if self.post_action_timeout_ms == 0 {
            return Err("Post-action timeout must be greater than 0".to_string());
        }
        for (name, address) in &self.services {
            if name.is_empty() {
                return Err("Service name cannot be empty".to_string());
            }
            validate_http_url(address)
                .map_err(|e| format!("Service {} has an invalid address: {}", name, e))?;
        }
        Ok(())
    }
}

fn validate_http_url(address: &str) -> Result<(), String> {
    let url = url::Url::parse(address).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}
