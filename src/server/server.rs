//! HTTP server core implementation

use crate::config::{Config, ServerConfig};
use crate::core::sync::Reconciler;
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{GatewayError, Result};
use actix_web::{App, HttpServer as ActixHttpServer, middleware::DefaultHeaders, web};
use std::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_actix_web::TracingLogger;

/// HTTP server
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
    /// Stops background tasks when the server exits
    shutdown: CancellationToken,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");
        Ok(Self::with_state(AppState::from_config(config.clone())?))
    }

    /// Create a server around prepared state
    pub fn with_state(state: AppState) -> Self {
        Self {
            config: state.config.server().clone(),
            state,
            shutdown: CancellationToken::new(),
        }
    }

    /// Create the Actix-web application
    fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let max_body_size = state.config.server().max_body_size;

        App::new()
            .app_data(state)
            .app_data(routes::json_config(max_body_size))
            .wrap(TracingLogger::default())
            .wrap(DefaultHeaders::new().add(("Server", "tenantgate")))
            .configure(routes::configure_routes)
    }

    fn spawn_background_tasks(&self) {
        let cluster = self.state.config.cluster();
        match cluster.reconcile_interval() {
            Some(interval) => {
                Reconciler::new(
                    self.state.synchronizer.clone(),
                    interval,
                    cluster.propagation_timeout(),
                )
                .spawn(self.shutdown.clone());
            }
            None => info!("Periodic reconciliation disabled"),
        }
    }

    /// Start the HTTP server on the configured address
    pub async fn start(self) -> Result<()> {
        let bind_addr = self.config.address();
        let listener = TcpListener::bind(&bind_addr)
            .map_err(|e| GatewayError::config(format!("Failed to bind {}: {}", bind_addr, e)))?;
        self.start_on(listener).await
    }

    /// Serve on an already bound listener until the server stops
    pub async fn start_on(self, listener: TcpListener) -> Result<()> {
        let workers = self.config.worker_count();
        let local_addr = listener
            .local_addr()
            .map_err(|e| GatewayError::internal(format!("Listener has no address: {}", e)))?;

        info!("Starting HTTP server on {}", local_addr);
        self.spawn_background_tasks();

        let state = web::Data::new(self.state.clone());
        let server = ActixHttpServer::new(move || Self::create_app(state.clone()))
            .workers(workers)
            .shutdown_timeout(self.config.shutdown_timeout_secs)
            .listen(listener)
            .map_err(|e| GatewayError::config(format!("Failed to listen on {}: {}", local_addr, e)))?
            .run();

        info!("HTTP server listening on {} with {} workers", local_addr, workers);

        let result = server
            .await
            .map_err(|e| GatewayError::internal(format!("Server error: {}", e)));

        self.shutdown.cancel();
        info!("HTTP server stopped");
        result
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
