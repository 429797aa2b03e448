//! Authorization types
//!
//! Resource types and actions form closed sets known to the gateway; rules and the
//! post-actions they attach are deserialized straight from the policy section of the
//! configuration file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute name -> value pairs describing what a request touches, e.g.
/// `{project: "p1", id: "*"}`
pub type Scope = BTreeMap<String, String>;

/// Build a scope from attribute pairs
pub fn scope_of<I, K, V>(pairs: I) -> Scope
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Kind of resource a request is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    /// Per-project authentication provider settings
    AuthProvider,
    /// User-defined function exposed through a service
    Function,
    /// Any other project configuration kind
    Config,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::AuthProvider => "auth-provider",
            ResourceType::Function => "function",
            ResourceType::Config => "config",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation requested on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Modify,
    Invoke,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Modify => "modify",
            Action::Invoke => "invoke",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vote cast by a matching rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    #[default]
    Allow,
    Deny,
}

/// Side effect attached to an allow decision, run after a successful invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PostAction {
    /// Write an audit record
    Audit { event: String },
    /// Consume part of the caller's allowance for a named quota
    DecrementQuota {
        quota: String,
        #[serde(default = "default_quota_amount")]
        amount: u64,
    },
    /// Remove a top-level field from the invocation result
    RedactField { field: String },
}

fn default_quota_amount() -> u64 {
    1
}

impl PostAction {
    /// Caller-scoped resource this action mutates; actions sharing a key never interleave
    pub fn resource_key(&self, subject: &str) -> Option<String> {
        match self {
            PostAction::DecrementQuota { quota, .. } => Some(format!("quota:{subject}:{quota}")),
            PostAction::Audit { .. } | PostAction::RedactField { .. } => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PostAction::Audit { .. } => "audit",
            PostAction::DecrementQuota { .. } => "decrement_quota",
            PostAction::RedactField { .. } => "redact_field",
        }
    }
}

/// A single policy rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRule {
    /// Resource type the rule applies to
    pub resource: ResourceType,
    /// Action the rule applies to
    pub action: Action,
    /// Attribute patterns the request scope must satisfy
    #[serde(default)]
    pub scope: Scope,
    /// Allow or deny
    #[serde(default)]
    pub effect: Effect,
    /// Higher priority levels shadow lower ones
    #[serde(default)]
    pub priority: i32,
    /// Side effects attached when this rule grants access
    #[serde(default)]
    pub post_actions: Vec<PostAction>,
}

impl AuthorizationRule {
    /// Allow rule with default priority and no post-actions
    pub fn allow(resource: ResourceType, action: Action, scope: Scope) -> Self {
        Self {
            resource,
            action,
            scope,
            effect: Effect::Allow,
            priority: 0,
            post_actions: Vec::new(),
        }
    }

    /// Deny rule with default priority
    pub fn deny(resource: ResourceType, action: Action, scope: Scope) -> Self {
        Self {
            effect: Effect::Deny,
            ..Self::allow(resource, action, scope)
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_post_action(mut self, action: PostAction) -> Self {
        self.post_actions.push(action);
        self
    }
}

/// Resolved caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Token subject
    pub subject: String,
    /// Roles granted to the subject
    pub roles: Vec<String>,
    /// When the credential stops being valid
    pub expires_at: Option<DateTime<Utc>>,
}

impl Identity {
    pub fn new<S: Into<String>>(subject: S, roles: Vec<String>) -> Self {
        Self {
            subject: subject.into(),
            roles,
            expires_at: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Outcome of evaluating a rule set against a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow {
        /// Post-actions of the granting rules, in rule order
        post_actions: Vec<PostAction>,
    },
    Deny {
        reason: String,
    },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow { .. })
    }
}
