//! End-to-end tests over a real listener.
//!
//! Each test boots a server on a fixed loopback port, drives it with a
//! plain HTTP client, and asserts on the wire-level behavior: bodies,
//! redirects, status codes, and error pages.

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use pagegate::http::ForwardRenderer;
use pagegate::page::Download;
use pagegate::pipeline::{AppFailure, RequestHandler, RequestInfo, Transaction};
use pagegate::{PageResult, PageUrl, Pipeline, PipelineConfig, PipelineServer, RouteConfig};
use tokio::net::TcpListener;

struct GreetingHandler;

impl RequestHandler for GreetingHandler {
    fn execute(
        &self,
        req: &RequestInfo,
        _tx: Option<&mut dyn Transaction>,
    ) -> Result<PageResult, AppFailure> {
        let body = format!("hello {}", req.session_id);
        Ok(PageResult::Download(Download::text(body)))
    }

    fn client_ip(&self, req: &RequestInfo) -> String {
        req.remote_addr.clone()
    }
}

struct BounceHandler;

impl RequestHandler for BounceHandler {
    fn execute(
        &self,
        _req: &RequestInfo,
        _tx: Option<&mut dyn Transaction>,
    ) -> Result<PageResult, AppFailure> {
        let mut url = PageUrl::new("/landing");
        url.add_param("from", "legacy");
        Ok(PageResult::Redirect(url))
    }

    fn client_ip(&self, req: &RequestInfo) -> String {
        req.remote_addr.clone()
    }
}

struct PostOnlyHandler;

impl RequestHandler for PostOnlyHandler {
    fn route(&self) -> RouteConfig {
        RouteConfig {
            allowed_methods: vec![Method::POST],
            ..RouteConfig::default()
        }
    }

    fn execute(
        &self,
        _req: &RequestInfo,
        _tx: Option<&mut dyn Transaction>,
    ) -> Result<PageResult, AppFailure> {
        Ok(PageResult::Download(Download::text("accepted")))
    }

    fn client_ip(&self, req: &RequestInfo) -> String {
        req.remote_addr.clone()
    }
}

struct EchoTargetRenderer;

impl ForwardRenderer for EchoTargetRenderer {
    fn render(&self, _req: &RequestInfo, target: &str) -> String {
        format!("error:{target}")
    }
}

async fn spawn_server(config: PipelineConfig) -> String {
    let pipeline = Pipeline::new(config.web.clone());
    let error_page_path = config.web.error_page_path.clone();

    let mut server = PipelineServer::new(config, pipeline);
    server.register("/greet", Arc::new(GreetingHandler));
    server.register("/legacy", Arc::new(BounceHandler));
    server.register("/postonly", Arc::new(PostOnlyHandler));
    server.register_renderer(error_page_path, Arc::new(EchoTargetRenderer));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server.run(listener));
    tokio::time::sleep(Duration::from_millis(50)).await;
    format!("http://{addr}")
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn download_page_serves_text_body() {
    let base = spawn_server(PipelineConfig::default()).await;

    let resp = client()
        .get(format!("{base}/greet"))
        .header("cookie", "sid=s-777")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/html; charset=utf-8"
    );
    assert_eq!(resp.text().await.unwrap(), "hello s-777");
}

#[tokio::test]
async fn redirect_carries_base_path_prefix() {
    let mut config = PipelineConfig::default();
    config.web.base_path = "/app".to_string();
    let base = spawn_server(config).await;

    let resp = client()
        .get(format!("{base}/legacy"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 302);
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "/app/landing?from=legacy"
    );
}

#[tokio::test]
async fn unknown_path_is_404() {
    let base = spawn_server(PipelineConfig::default()).await;

    let resp = client()
        .get(format!("{base}/nowhere"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn forward_to_unregistered_renderer_is_404() {
    let config = PipelineConfig::default();
    let pipeline = Pipeline::new(config.web.clone());
    let mut server = PipelineServer::new(config, pipeline);
    server.register("/postonly", Arc::new(PostOnlyHandler));
    // No renderer for the error page target.

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server.run(listener));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let resp = client()
        .get(format!("http://{addr}/postonly"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn disallowed_method_renders_the_error_page() {
    let base = spawn_server(PipelineConfig::default()).await;

    let resp = client()
        .get(format!("{base}/postonly"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/html; charset=utf-8"
    );
    let body = resp.text().await.unwrap();
    assert!(body.starts_with("error:/error?"));
    assert!(body.contains("error_code=method-not-allowed"));

    let resp = client()
        .post(format!("{base}/postonly"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "accepted");
}
