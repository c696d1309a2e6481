//! Demo server: a small handler set mounted on the request pipeline.
//!
//! ```text
//! Client ──▶ http (Axum) ──▶ pipeline ──▶ handler ──▶ dispatch ──▶ response
//!                               │
//!                               └── device classification, gates, telemetry
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use pagegate::http::ForwardRenderer;
use pagegate::observability::{self, logging};
use pagegate::page::Download;
use pagegate::pipeline::{AppFailure, RequestHandler, RequestInfo, Transaction};
use pagegate::{classify, PageResult, PageUrl, Pipeline, PipelineConfig, PipelineServer};

#[derive(Debug, Parser)]
#[command(name = "pagegate", about = "Request pipeline demo server")]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Greets the caller with its classified device.
struct HelloHandler;

impl RequestHandler for HelloHandler {
    fn execute(
        &self,
        req: &RequestInfo,
        _tx: Option<&mut dyn Transaction>,
    ) -> Result<PageResult, AppFailure> {
        let device = classify(&req.user_agent);
        let body = format!(
            "hello from {}\ndevice: {}\n",
            observability::host_name(),
            device
        );
        Ok(PageResult::Download(Download::text(body)))
    }

    fn client_ip(&self, req: &RequestInfo) -> String {
        req.remote_addr.clone()
    }
}

/// Bounces a retired path to its replacement.
struct LegacyRedirectHandler;

impl RequestHandler for LegacyRedirectHandler {
    fn execute(
        &self,
        _req: &RequestInfo,
        _tx: Option<&mut dyn Transaction>,
    ) -> Result<PageResult, AppFailure> {
        let mut url = PageUrl::new("/hello");
        url.add_param("from", "legacy");
        Ok(PageResult::Redirect(url))
    }

    fn client_ip(&self, req: &RequestInfo) -> String {
        req.remote_addr.clone()
    }
}

/// Minimal error page; a real deployment would plug in a template engine.
struct ErrorPageRenderer;

impl ForwardRenderer for ErrorPageRenderer {
    fn render(&self, _req: &RequestInfo, target: &str) -> String {
        format!("<html><body><h1>error</h1><p>{target}</p></body></html>")
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init("pagegate=debug,tower_http=debug");

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => pagegate::load_config(path)?,
        None => PipelineConfig::default(),
    };
    info!(
        bind_address = %config.listener.bind_address,
        config = %serde_json::to_string(&config).unwrap_or_default(),
        "configuration loaded"
    );

    let pipeline = Pipeline::new(config.web.clone());
    let error_page_path = config.web.error_page_path.clone();
    let bind_address = config.listener.bind_address.clone();

    let mut server = PipelineServer::new(config, pipeline);
    server.register("/hello", Arc::new(HelloHandler));
    server.register("/legacy", Arc::new(LegacyRedirectHandler));
    server.register_renderer(error_page_path, Arc::new(ErrorPageRenderer));

    let listener = TcpListener::bind(&bind_address).await?;
    info!(address = %listener.local_addr()?, "listening for connections");
    server.run(listener).await?;
    Ok(())
}
