//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware
//! - Dispatch per the routing table: stats endpoint, classification
//!   pipeline on `/`, passthrough for everything else
//! - Compose classifier, forwarder and stats collector
//! - Serve with graceful shutdown
//!
//! # Routing
//! ```text
//! HEAD/PUT/DELETE/PATCH  → forward unconditionally, any path
//! ANY  /stats            → stats snapshot (never counted)
//! GET/POST /             → bot pipeline: HUMAN → record + forward
//!                                        BOT   → record bot + fixed reply
//! ANY  <other path>      → record + forward, no classification
//! ```

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Method, Request},
    response::{IntoResponse, Json, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::classifier::{Classifier, Verdict};
use crate::config::BotgateConfig;
use crate::features::FeatureCache;
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::proxy::Forwarder;
use crate::stats::StatsCollector;

/// Fixed reply for intercepted bot traffic; no backend call is made.
const BOT_GREETING: &str = "Hello bot, have a nice day!\n";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub features: Arc<FeatureCache>,
    pub classifier: Arc<Classifier>,
    pub stats: Arc<StatsCollector>,
    pub bot_manager_enabled: bool,
}

/// HTTP front door for the proxy.
pub struct HttpServer {
    router: Router,
    config: BotgateConfig,
}

impl HttpServer {
    /// Create a new HTTP server wired to the shared feature cache and stats.
    pub fn new(
        config: BotgateConfig,
        features: Arc<FeatureCache>,
        stats: Arc<StatsCollector>,
    ) -> Result<Self, axum::http::Error> {
        let forwarder = Arc::new(Forwarder::new(&config.backend)?);
        let classifier = Arc::new(Classifier::new(&config.bot_manager));

        let state = AppState {
            forwarder,
            features,
            classifier,
            stats,
            bot_manager_enabled: config.bot_manager.enabled,
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(front_door))
            .route("/", any(front_door))
            .with_state(state)
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener until
    /// Ctrl+C or the shutdown signal.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            bot_manager = self.config.bot_manager.enabled,
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &BotgateConfig {
        &self.config
    }
}

/// Main dispatch handler; every path and method lands here.
async fn front_door(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request.request_id().unwrap_or("unknown").to_string();

    tracing::debug!(
        request_id = %request_id,
        peer = %peer,
        method = %method,
        path = %path,
        "inbound request"
    );

    // These methods bypass classification and stats entirely, whatever the
    // path.
    if method == Method::HEAD
        || method == Method::PUT
        || method == Method::DELETE
        || method == Method::PATCH
    {
        return state.forwarder.forward(request).await;
    }

    if path == "/stats" {
        return Json(state.stats.snapshot()).into_response();
    }

    let classifiable = method == Method::GET || method == Method::POST;
    if path == "/" && classifiable && state.bot_manager_enabled {
        let row_count = state.features.row_count();
        match state.classifier.classify(row_count) {
            Verdict::Human => {
                state.stats.record(&method, &path);
                state.forwarder.forward(request).await
            }
            Verdict::Bot => {
                tracing::debug!(
                    request_id = %request_id,
                    rows = row_count,
                    "intercepting bot request"
                );
                state.stats.record_bot(&method, &path);
                bot_reply()
            }
        }
    } else {
        state.stats.record(&method, &path);
        state.forwarder.forward(request).await
    }
}

fn bot_reply() -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        BOT_GREETING,
    )
        .into_response()
}

/// Wait for Ctrl+C or the process-wide shutdown signal.
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received");
        }
        _ = shutdown.recv() => {
            tracing::info!("shutdown signal received");
        }
    }
}
