//! HTTP server setup and request entry point.
//!
//! # Responsibilities
//! - Create the Axum router and wire up middleware (timeout, tracing)
//! - Map request paths to registered [`RequestHandler`]s
//! - Run the synchronous pipeline on the blocking pool per request
//! - Resolve server-side forwards through registered [`ForwardRenderer`]s
//!
//! # Design Decisions
//! - Handler lookup is exact-path; unknown paths get a plain 404 before the
//!   pipeline is entered
//! - A forward whose target has no renderer is a deployment error and
//!   answers 404, mirroring a missing template

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, Response, StatusCode},
    response::IntoResponse,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::http::request::request_info;
use crate::http::transport::{Action, BufferedTransport};
use crate::pipeline::{Pipeline, RequestHandler, RequestInfo};

/// Renders the page a server-side forward points at.
///
/// The analogue of a template engine: given the original request and the
/// forward target path, produce the HTML body.
pub trait ForwardRenderer: Send + Sync {
    fn render(&self, req: &RequestInfo, target: &str) -> String;
}

#[derive(Clone)]
struct ServerState {
    pipeline: Arc<Pipeline>,
    handlers: Arc<HashMap<String, Arc<dyn RequestHandler>>>,
    renderers: Arc<HashMap<String, Arc<dyn ForwardRenderer>>>,
    session_cookie: String,
}

/// HTTP front end for a [`Pipeline`].
pub struct PipelineServer {
    config: PipelineConfig,
    pipeline: Arc<Pipeline>,
    handlers: HashMap<String, Arc<dyn RequestHandler>>,
    renderers: HashMap<String, Arc<dyn ForwardRenderer>>,
}

impl PipelineServer {
    pub fn new(config: PipelineConfig, pipeline: Pipeline) -> Self {
        Self {
            config,
            pipeline: Arc::new(pipeline),
            handlers: HashMap::new(),
            renderers: HashMap::new(),
        }
    }

    /// Mount a handler at an exact request path.
    pub fn register(&mut self, path: impl Into<String>, handler: Arc<dyn RequestHandler>) {
        self.handlers.insert(path.into(), handler);
    }

    /// Mount a renderer for a forward target path.
    pub fn register_renderer(&mut self, path: impl Into<String>, renderer: Arc<dyn ForwardRenderer>) {
        self.renderers.insert(path.into(), renderer);
    }

    /// Serve until the task is cancelled or the listener fails.
    pub async fn run(self, listener: TcpListener) -> std::io::Result<()> {
        let state = ServerState {
            pipeline: self.pipeline,
            handlers: Arc::new(self.handlers),
            renderers: Arc::new(self.renderers),
            session_cookie: self.config.web.session_cookie.clone(),
        };

        let app = Router::new()
            .route("/", any(entry))
            .route("/{*path}", any(entry))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.listener.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http());

        info!(
            code = "server-start",
            bind = %self.config.listener.bind_address,
            "listening"
        );
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }
}

async fn entry(
    State(state): State<ServerState>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response<Body> {
    let (parts, _body) = request.into_parts();
    let info = request_info(&parts, Some(remote), &state.session_cookie);

    let Some(handler) = state.handlers.get(&info.path).cloned() else {
        warn!(code = "no-handler", path = %info.path, "no handler registered");
        return StatusCode::NOT_FOUND.into_response();
    };

    let pipeline = state.pipeline.clone();
    let run_info = info.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let mut transport = BufferedTransport::new();
        pipeline.handle(&run_info, handler.as_ref(), &mut transport);
        transport
    })
    .await;

    let transport = match joined {
        Ok(transport) => transport,
        Err(err) => {
            warn!(code = "worker-lost", cause = %err, "pipeline task aborted");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if let Action::Forward(target) = transport.action() {
        return resolve_forward(&state, &info, &target.clone());
    }
    transport.into_response()
}

/// Resolve a server-side forward into a rendered HTML response.
fn resolve_forward(state: &ServerState, info: &RequestInfo, target: &str) -> Response<Body> {
    // Renderers are keyed by bare path; the forward URL may carry a query
    // string and fragment.
    let path = target.split(['?', '#']).next().unwrap_or(target);
    let Some(renderer) = state.renderers.get(path) else {
        warn!(code = "no-renderer", target = %path, "no renderer for forward target");
        return StatusCode::NOT_FOUND.into_response();
    };

    let html = renderer.render(info, target);
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(html))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
