//! Page results: the closed set of outcomes application logic can produce.
//!
//! The dispatcher matches exhaustively on [`PageResult`], so adding a
//! variant forces every realization path to be handled.

pub mod mime;
pub mod url;

use axum::http::StatusCode;

pub use mime::{DefaultMimeLookup, DownloadKind, MimeLookup};
pub use url::PageUrl;

/// Outcome of application logic, realized by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResult {
    /// Internal hand-off to another path; the original request passes
    /// through unchanged.
    Forward(PageUrl),
    /// Client-side redirect. Site-relative targets get the deployment base
    /// path prefixed at realization time.
    Redirect(PageUrl),
    /// Byte payload streamed to the client.
    Download(Download),
    /// Bare status code, no body.
    RawStatus(StatusCode),
    /// No further transport action.
    None,
}

impl PageResult {
    /// Forward to a plain path.
    pub fn forward(path: impl Into<String>) -> Self {
        PageResult::Forward(PageUrl::new(path))
    }

    /// Redirect to a plain path.
    pub fn redirect(path: impl Into<String>) -> Self {
        PageResult::Redirect(PageUrl::new(path))
    }
}

/// Payload and headers for a download response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    bytes: Vec<u8>,
    kind: DownloadKind,
    content_type: Option<String>,
    filename: Option<String>,
}

impl Download {
    /// Binary payload; content type defaults to the binary kind.
    pub fn binary(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            kind: DownloadKind::Binary,
            content_type: None,
            filename: None,
        }
    }

    /// Text payload, UTF-8 encoded; content type defaults to the text kind.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            bytes: text.into().into_bytes(),
            kind: DownloadKind::Text,
            content_type: None,
            filename: None,
        }
    }

    /// Override the default content type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Force a download dialog with this attachment filename.
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn kind(&self) -> DownloadKind {
        self.kind
    }

    /// Resolved content type: an explicit value wins over the kind default.
    pub fn resolved_content_type(&self, mime: &dyn MimeLookup) -> String {
        match &self.content_type {
            Some(ct) if !ct.is_empty() => ct.clone(),
            _ => mime.content_type(self.kind),
        }
    }

    pub fn attachment_filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }
}
