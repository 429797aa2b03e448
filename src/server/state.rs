//! Application state shared across HTTP handlers

use crate::auth::Authorizer;
use crate::config::Config;
use crate::core::audit::TracingAuditSink;
use crate::core::functions::{
    FunctionDispatcher, HttpFunctionInvoker, PostActionExecutor, QuotaLedger, TimeoutPolicy,
};
use crate::core::sync::{
    ClusterMembership, ConfigSynchronizer, HttpClusterTransport, MemoryConfigStore,
};
use crate::utils::error::Result;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// Every component is constructed once and shared behind an `Arc`; handlers never build
/// their own.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration (shared read-only)
    pub config: Arc<Config>,
    /// Credential and policy checks
    pub authorizer: Arc<Authorizer>,
    /// Replicated configuration store
    pub synchronizer: Arc<ConfigSynchronizer>,
    /// Function call pipeline
    pub dispatcher: Arc<FunctionDispatcher>,
}

impl AppState {
    /// Create a new AppState from already built components
    pub fn new(
        config: Config,
        authorizer: Arc<Authorizer>,
        synchronizer: Arc<ConfigSynchronizer>,
        dispatcher: Arc<FunctionDispatcher>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            authorizer,
            synchronizer,
            dispatcher,
        }
    }

    /// Wire the production components described by `config`
    pub fn from_config(config: Config) -> Result<Self> {
        let authorizer = Arc::new(Authorizer::from_config(config.auth()));

        let cluster = config.cluster();
        let membership = Arc::new(ClusterMembership::new(
            &cluster.node_id,
            cluster.members.clone(),
        ));
        let transport = Arc::new(HttpClusterTransport::new(
            &cluster.node_id,
            &cluster.cluster_token,
            cluster.propagation_timeout(),
        )?);
        let synchronizer = Arc::new(ConfigSynchronizer::new(
            cluster,
            Arc::new(MemoryConfigStore::new()),
            membership,
            transport,
        ));

        let functions = config.functions();
        let post_actions = Arc::new(PostActionExecutor::new(
            Arc::new(TracingAuditSink),
            Arc::new(QuotaLedger::new(functions.quotas.clone())),
            functions.post_action_timeout(),
        ));
        let dispatcher = Arc::new(FunctionDispatcher::new(
            Arc::clone(&authorizer),
            Arc::new(HttpFunctionInvoker::from_config(functions)?),
            post_actions,
            TimeoutPolicy::from_config(functions),
        ));

        Ok(Self::new(config, authorizer, synchronizer, dispatcher))
    }

    /// Get gateway configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
