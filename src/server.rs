//! HTTP server for landmark frames from an out-of-process hand tracker.
//!
//! This module provides an HTTP server that:
//! - Accepts one landmark frame per request via POST /frames
//! - Steps the gesture recognizer and returns the resulting event
//! - Exposes session counters via GET /stats
//!
//! The server only recognizes gestures; it never injects input.
//!
//! # Architecture
//!
//! ```text
//! Browser hand tracker ──→ POST /frames ──→ handbridge ──→ {event, state}
//!                                              ↓
//!                                       [Gesture Recognizer]
//! ```

use crate::config::{Config, FALLBACK_SCREEN_SIZE};
use crate::core::{GestureEvent, GestureRecognizer, GestureState, ScreenMapper};
use crate::source::FrameRecord;
use crate::stats::{create_shared_stats, SharedSessionStats, StatsSnapshot};
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
    /// Recognizer and mapping settings
    pub app: Config,
}

impl ServerConfig {
    pub fn new(port: u16, app: Config) -> Self {
        Self { port, app }
    }
}

/// Recognizer plus the clock that maps frame offsets onto it.
struct Pipeline {
    recognizer: GestureRecognizer,
    base: Instant,
    last: Instant,
}

impl Pipeline {
    /// Frames carrying a usable `t` are placed at `base + t`; others at the
    /// wall clock. Time never runs backwards.
    fn timestamp(&mut self, record: &FrameRecord) -> Instant {
        let at = record
            .offset_from(self.base)
            .and_then(|offset| self.base.checked_add(offset))
            .unwrap_or_else(Instant::now)
            .max(self.last);
        self.last = at;
        at
    }
}

/// Shared server state
pub struct ServerState {
    pipeline: Mutex<Pipeline>,
    stats: SharedSessionStats,
}

impl ServerState {
    pub fn new(config: &ServerConfig) -> Self {
        let app = &config.app;
        let (width, height) = app.screen_size.unwrap_or(FALLBACK_SCREEN_SIZE);
        let mapper = ScreenMapper::new(app.mapping_region, width, height, app.clamp_to_screen);
        let now = Instant::now();

        Self {
            pipeline: Mutex::new(Pipeline {
                recognizer: GestureRecognizer::new(app.gesture.clone(), mapper),
                base: now,
                last: now,
            }),
            stats: create_shared_stats(),
        }
    }
}

/// Response from the frames endpoint
#[derive(Debug, Clone, Serialize)]
pub struct FramesResponse {
    pub event: GestureEvent,
    pub state: GestureState,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /frames
///
/// Runs one recognizer tick. A frame with malformed landmarks counts as
/// "no hand" rather than an error.
async fn frames(
    State(state): State<Arc<ServerState>>,
    Json(record): Json<FrameRecord>,
) -> Json<FramesResponse> {
    let frame = match record.to_frame() {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!("Malformed frame treated as no hand: {}", e);
            None
        }
    };

    let mut pipeline = state.pipeline.lock().await;
    let now = pipeline.timestamp(&record);
    let event = pipeline.recognizer.step(frame.as_ref(), now);
    let current = pipeline.recognizer.state();
    drop(pipeline);

    state.stats.record_frame(frame.is_some());
    if event.kind.is_actionable() {
        state.stats.record_event();
        tracing::info!("{}", event);
    }

    Json(FramesResponse {
        event,
        state: current,
    })
}

/// GET /stats
async fn stats(State(state): State<Arc<ServerState>>) -> Json<StatsSnapshot> {
    Json(state.stats.snapshot())
}

/// Unknown routes.
async fn fallback() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "No such endpoint".to_string(),
            code: "NOT_FOUND".to_string(),
        }),
    )
}

/// Run the HTTP server
pub async fn run(
    config: ServerConfig,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let state = Arc::new(ServerState::new(&config));

    let app = Router::new()
        .route("/health", get(health))
        .route("/frames", post(frames))
        .route("/stats", get(stats))
        .fallback(fallback)
        .layer(
            CorsLayer::new()
                .allow_origin([
                    HeaderValue::from_static("http://localhost"),
                    HeaderValue::from_static("http://127.0.0.1"),
                ])
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("HandBridge server listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}
