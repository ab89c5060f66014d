//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the auth API and the forwarding fallback
//! - Wire up middleware (edge router, timeout, request ID, tracing)
//! - Forward passed-through requests to the upstream web application
//! - Swap in new router settings when the config changes
//! - Run the session sweeper and the optional admin API
//! - Shut down gracefully on signal

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{FromRef, State},
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri,
    },
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::{self, AdminState};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::auth;
use crate::http::middleware::edge_middleware;
use crate::http::request::{request_id_header, RequestIdExt};
use crate::http::response::json_error;
use crate::observability::{metrics, spans};
use crate::routing::{Decision, EdgeRouter};
use crate::session::{self, MemorySessionStore, SessionState, UserDirectory};

/// Settings that follow config reloads.
#[derive(Debug)]
pub struct GatewayRuntime {
    pub router: EdgeRouter,
    pub upstream: Authority,
}

impl GatewayRuntime {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let upstream = Authority::from_str(&config.upstream.address)
            .map_err(|_| GatewayError::Upstream(config.upstream.address.clone()))?;
        Ok(Self {
            router: EdgeRouter::from_config(config),
            upstream,
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ArcSwap<GatewayRuntime>>,
    pub client: Client<HttpConnector, Body>,
    pub sessions: SessionState,
    pub users: Arc<UserDirectory>,
}

impl AppState {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let runtime = GatewayRuntime::from_config(config)?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            runtime: Arc::new(ArcSwap::from_pointee(runtime)),
            client,
            sessions: Arc::new(MemorySessionStore::from_config(&config.sessions)),
            users: Arc::new(UserDirectory::new(config.users.clone())),
        })
    }
}

impl FromRef<AppState> for SessionState {
    fn from_ref(state: &AppState) -> SessionState {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Arc<UserDirectory> {
    fn from_ref(state: &AppState) -> Arc<UserDirectory> {
        state.users.clone()
    }
}

/// Build the gateway router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
    let mut app = Router::new();
    if config.auth_api.enabled {
        app = app.nest(&config.auth_api.prefix, auth::routes());
    }

    app.fallback(forward_handler)
        .layer(middleware::from_fn_with_state(state.clone(), edge_middleware))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id_header(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(spans::http_span))
                .layer(PropagateRequestIdLayer::new(request_id_header())),
        )
}

/// HTTP server for the portal gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    state: AppState,
}

impl GatewayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let state = AppState::from_config(&config)?;
        let router = build_router(&config, state.clone());
        Ok(Self {
            router,
            config,
            state,
        })
    }

    /// Run the server until `shutdown` fires.
    ///
    /// `config_updates` carries validated configs from the file watcher;
    /// routing settings and the upstream address are swapped in place.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), GatewayError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            deployment = ?self.config.deployment,
            dev_bypass = self.state.runtime.load().router.dev_bypass().is_some(),
            "Gateway starting"
        );

        tokio::spawn(session::run_sweeper(
            self.state.sessions.clone(),
            Duration::from_secs(self.config.sessions.sweep_interval_secs),
            shutdown.resubscribe(),
        ));

        tokio::spawn(apply_config_updates(
            self.state.runtime.clone(),
            config_updates,
            shutdown.resubscribe(),
        ));

        if self.config.admin.enabled {
            let admin_listener = TcpListener::bind(&self.config.admin.bind_address)
                .await
                .map_err(|source| GatewayError::Bind {
                    address: self.config.admin.bind_address.clone(),
                    source,
                })?;
            let admin_state = AdminState::new(&self.config, &self.state);
            let admin_app = admin::setup_admin_router(admin_state);
            let mut admin_shutdown = shutdown.resubscribe();
            tracing::info!(address = %self.config.admin.bind_address, "Admin API starting");
            tokio::spawn(async move {
                let served = axum::serve(admin_listener, admin_app)
                    .with_graceful_shutdown(async move {
                        let _ = admin_shutdown.recv().await;
                    })
                    .await;
                if let Err(e) = served {
                    tracing::error!(error = %e, "Admin API stopped with error");
                }
            });
        }

        let mut shutdown = shutdown;
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn apply_config_updates(
    runtime: Arc<ArcSwap<GatewayRuntime>>,
    mut updates: mpsc::UnboundedReceiver<GatewayConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(config) = update else { break };
                match GatewayRuntime::from_config(&config) {
                    Ok(next) => {
                        runtime.store(Arc::new(next));
                        tracing::info!(
                            upstream = %config.upstream.address,
                            "Routing configuration reloaded; session and user settings apply on restart"
                        );
                    }
                    Err(e) => tracing::error!(error = %e, "Ignoring config update"),
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

/// Forward a passed-through request to the upstream web application.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request.headers().request_id().to_string();
    let method = request.method().to_string();
    let upstream = state.runtime.load().upstream.clone();

    match request.extensions().get::<Decision>() {
        Some(decision) => tracing::debug!(
            request_id = %request_id,
            decision = decision.kind.as_str(),
            role = ?decision.role,
            locale = %decision.locale,
            "Forwarding routed request"
        ),
        None => tracing::trace!(request_id = %request_id, "Forwarding unrouted request"),
    }

    let (parts, body) = request.into_parts();

    let mut uri_parts = parts.uri.into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(upstream);
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    let uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Could not build upstream URI");
            return json_error(StatusCode::BAD_REQUEST, "Invalid request URI");
        }
    };

    let mut builder = Request::builder().method(parts.method).uri(uri);
    if let Some(headers) = builder.headers_mut() {
        headers.extend(parts.headers);
    }
    let upstream_request = match builder.body(body) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Could not build upstream request");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Could not build upstream request");
        }
    };

    match state.client.request(upstream_request).await {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), start_time);
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body)).into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_request(&method, 502, start_time);
            json_error(StatusCode::BAD_GATEWAY, "Upstream request failed")
        }
    }
}
