//! HTTP server setup and request handling.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all redirect handler
//! - Wire up middleware (timeout, request ID, tracing)
//! - Resolve the request host against the redirection engine
//! - Answer 301 / 404 / 500 per resolution outcome
//!
//! # Data Flow
//! ```text
//! Request
//!     → host from Host header (URI authority as fallback)
//!     → engine.resolve(request context)
//!         Redirect(target) → 301, Location: https://<target>, empty body
//!         NotFound         → 404
//!         render error     → 500, error text as body
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RedirectorConfig;
use crate::engine::{RedirectEngine, RequestContext, Resolution};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RedirectEngine>,
}

/// HTTP server for the redirect surface.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over the given engine.
    pub fn new(config: &RedirectorConfig, engine: Arc<RedirectEngine>) -> Self {
        let state = AppState { engine };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RedirectorConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(redirect_handler))
            .route("/", any(redirect_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "redirect listener starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("redirect listener draining");
            })
            .await?;

        tracing::info!("redirect listener stopped");
        Ok(())
    }
}

/// Catch-all handler: every path on every method is a redirect lookup.
async fn redirect_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let response = resolve_request(&state, &request);
    metrics::record_request(response.status().as_u16());
    response
}

fn resolve_request(state: &AppState, request: &Request<Body>) -> Response {
    let Some(host) = request_host(request) else {
        tracing::debug!("request carries no host");
        return not_found();
    };

    let uri = request.uri();
    let ctx = RequestContext::new(
        host,
        uri.path(),
        uri.query().unwrap_or(""),
        request.headers(),
    );

    match state.engine.resolve(&ctx) {
        Ok(Resolution::Redirect(target)) => redirect_response(host, &target),
        Ok(Resolution::NotFound) => {
            tracing::debug!(host = %host, "no redirect rule");
            not_found()
        }
        Err(err) => {
            tracing::error!(host = %host, error = %err, "target rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Host the request was addressed to: the Host header, or the URI
/// authority for absolute-form and HTTP/2 requests.
fn request_host(request: &Request<Body>) -> Option<&str> {
    if let Some(value) = request.headers().get(header::HOST) {
        return value.to_str().ok();
    }
    request.uri().authority().map(|authority| authority.as_str())
}

fn redirect_response(host: &str, target: &str) -> Response {
    let location = format!("https://{target}");
    tracing::debug!(host = %host, location = %location, "redirecting");

    match Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(header::LOCATION, &location)
        .header(header::CONTENT_LENGTH, "0")
        .body(Body::empty())
    {
        Ok(response) => response,
        Err(err) => {
            // A rendered target can contain bytes that are not legal in a
            // header value.
            tracing::error!(location = %location, error = %err, "unusable redirect target");
            (StatusCode::INTERNAL_SERVER_ERROR, "unusable redirect target").into_response()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "no redirect rule for host").into_response()
}
