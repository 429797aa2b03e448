//! Authentication and authorization
//!
//! Every operation the gateway exposes goes through [`Authorizer`]: the bearer
//! credential is resolved to an identity and the identity's rules are evaluated
//! against the resource type, action and scope of the request.

pub mod authorizer;
pub mod jwt;
pub mod matcher;
pub mod policy;
pub mod resolver;
pub mod types;


pub use authorizer::Authorizer;
pub use policy::{IdentityResolver, PolicyEvaluator, StaticPolicyStore, evaluate_rules};
pub use resolver::{CachedIdentityResolver, JwtIdentityResolver};
pub use types::{
    Action, AuthorizationRule, Decision, Effect, Identity, PostAction, ResourceType, Scope,
    scope_of,
};
