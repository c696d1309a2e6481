//! Buffered transport backing the Axum adapter.
//!
//! The pipeline core is synchronous and writes through the [`Transport`]
//! trait. This implementation buffers everything and converts the recorded
//! terminal action into an Axum response once the blocking call returns.

use axum::body::Body;
use axum::http::{header, Response, StatusCode};

use crate::dispatch::{Transport, TransportError};

/// Terminal action recorded by the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Action {
    /// No page was produced; respond 200 with an empty body.
    #[default]
    None,
    /// Body bytes were written.
    Body,
    /// Client-side redirect to the given URL.
    Redirect(String),
    /// Bare status code, no body.
    Status(StatusCode),
    /// Server-side forward; the server resolves the target after the
    /// pipeline returns.
    Forward(String),
}

/// In-memory [`Transport`] for the Axum server adapter.
#[derive(Debug, Default)]
pub struct BufferedTransport {
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    action: Action,
}

impl BufferedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Convert the buffered output into a response. A forward action has no
    /// direct response; reaching it here means the server failed to resolve
    /// the target, so it degrades to a 500.
    pub fn into_response(self) -> Response<Body> {
        let result = match self.action {
            Action::None => Response::builder()
                .status(StatusCode::OK)
                .body(Body::empty()),
            Action::Body => {
                let mut builder = Response::builder().status(StatusCode::OK);
                for (name, value) in &self.headers {
                    builder = builder.header(name, value);
                }
                builder.body(Body::from(self.body))
            }
            Action::Redirect(url) => Response::builder()
                .status(StatusCode::FOUND)
                .header(header::LOCATION, url)
                .body(Body::empty()),
            Action::Status(status) => Response::builder().status(status).body(Body::empty()),
            Action::Forward(_) => Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Body::empty()),
        };
        result.unwrap_or_else(|_| {
            let mut resp = Response::new(Body::empty());
            *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            resp
        })
    }
}

impl Transport for BufferedTransport {
    fn set_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.body.extend_from_slice(bytes);
        self.action = Action::Body;
        Ok(())
    }

    fn send_redirect(&mut self, url: &str) -> Result<(), TransportError> {
        self.action = Action::Redirect(url.to_string());
        Ok(())
    }

    fn send_status(&mut self, status: StatusCode) -> Result<(), TransportError> {
        self.action = Action::Status(status);
        Ok(())
    }

    fn forward(&mut self, url: &str) -> Result<(), TransportError> {
        self.action = Action::Forward(url.to_string());
        Ok(())
    }
}
