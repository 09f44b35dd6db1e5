use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use kvweb_registry::StoreRegistry;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, Level};

use crate::browse::Browser;

#[derive(Clone)]
pub struct AppState {
    pub browser: Browser,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(registry: Arc<StoreRegistry>, mount: &str) -> Self {
        Self {
            browser: Browser::new(registry, mount),
            start_time: Instant::now(),
        }
    }

    fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

type SharedState = Arc<AppState>;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    mount: String,
    stores: usize,
    uptime_secs: u64,
}

/// Bind `addr`, log the browse URL and serve from a background task.
///
/// Returns the bound address, which differs from `addr` when it asked for an
/// ephemeral port.
pub async fn spawn_server(
    state: AppState,
    addr: &str,
) -> Result<(SocketAddr, JoinHandle<Result<()>>)> {
    let listener = bind_listener(addr).await?;
    let local_addr = log_listening(&listener, &state)?;
    let handle = tokio::spawn(serve(listener, state));
    Ok((local_addr, handle))
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let app = build_router(Arc::new(state));
    axum::serve(listener, app)
        .await
        .context("browser server terminated unexpectedly")
}

/// Bind `addr` and serve in the foreground, returning once `shutdown`
/// resolves and in-flight requests have completed.
pub async fn start_server_with_shutdown<F>(state: AppState, addr: &str, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = bind_listener(addr).await?;
    log_listening(&listener, &state)?;
    let app = build_router(Arc::new(state));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("browser server terminated unexpectedly")
}

pub async fn bind_listener(addr: &str) -> Result<TcpListener> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("failed to bind browser listener on {socket_addr}"))
    } else {
        TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind browser listener on {addr}"))
    }
}

fn log_listening(listener: &TcpListener, state: &AppState) -> Result<SocketAddr> {
    let local_addr = listener
        .local_addr()
        .context("failed to read bound browser address")?;
    info!(
        "kvweb browser on: http://{}{}/",
        local_addr,
        state.browser.mount()
    );
    Ok(local_addr)
}

/// `/health` plus the browse tree. Anything under the mount is resolved by
/// [`handle_browse`]; paths outside it fall through to a 404 there too.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .fallback(handle_browse)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        mount: state.browser.mount().to_string(),
        stores: state.browser.registry().len(),
        uptime_secs: state.uptime_seconds(),
    })
}

async fn handle_browse(State(state): State<SharedState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    if tracing::enabled!(Level::DEBUG) {
        debug!(
            "path: {}, stores: {:?}",
            uri.path(),
            state.browser.registry().list_names()
        );
    }

    match state.browser.respond(uri.path()) {
        Ok(browsed) => browsed.into_response(),
        Err(err) => err.into_response(),
    }
}
