//! Realization of page results against the transport layer.
//!
//! # Responsibilities
//! - Switch exhaustively on the page variant and drive the transport
//! - Resolve download content types and attachment headers
//! - Prefix the deployment base path onto site-relative redirects
//! - Classify realization failures (benign disconnect vs. fault) and log
//!   them without re-entering the pipeline's error path

use axum::http::StatusCode;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::page::{MimeLookup, PageResult};

/// Transport-level write failure.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    /// True when the client went away mid-write; benign, not a fault.
    pub disconnect: bool,
}

impl TransportError {
    pub fn fault(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            disconnect: false,
        }
    }

    pub fn disconnect(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            disconnect: true,
        }
    }
}

/// Output primitives the dispatcher drives.
pub trait Transport {
    fn set_header(&mut self, name: &str, value: &str);
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
    fn send_redirect(&mut self, url: &str) -> Result<(), TransportError>;
    fn send_status(&mut self, status: StatusCode) -> Result<(), TransportError>;
    /// Internal, same-process hand-off to another path.
    fn forward(&mut self, url: &str) -> Result<(), TransportError>;
}

/// How a dispatch ended. Used for logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalOutcome {
    pub kind: OutcomeKind,
    pub detail: String,
}

impl TerminalOutcome {
    fn new(kind: OutcomeKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Forwarded,
    Redirected,
    Downloaded,
    StatusSent,
    NoAction,
    ClientDisconnect,
    TransportFault,
}

impl OutcomeKind {
    pub fn label(&self) -> &'static str {
        match self {
            OutcomeKind::Forwarded => "forwarded",
            OutcomeKind::Redirected => "redirected",
            OutcomeKind::Downloaded => "downloaded",
            OutcomeKind::StatusSent => "status-sent",
            OutcomeKind::NoAction => "no-action",
            OutcomeKind::ClientDisconnect => "client-disconnect",
            OutcomeKind::TransportFault => "transport-fault",
        }
    }
}

/// Realizes a [`PageResult`] and reports a terminal outcome. Never raises
/// back to the caller.
pub struct Dispatcher<'a> {
    base_path: &'a str,
    mime: &'a dyn MimeLookup,
    page_log: bool,
}

impl<'a> Dispatcher<'a> {
    pub fn new(base_path: &'a str, mime: &'a dyn MimeLookup, page_log: bool) -> Self {
        Self {
            base_path,
            mime,
            page_log,
        }
    }

    pub fn realize(&self, page: &PageResult, transport: &mut dyn Transport) -> TerminalOutcome {
        match page {
            PageResult::Download(download) => {
                transport.set_header("Content-Type", &download.resolved_content_type(self.mime));
                if let Some(filename) = download.attachment_filename() {
                    transport.set_header(
                        "Content-Disposition",
                        &format!("attachment; filename=\"{filename}\""),
                    );
                }
                match transport.write_bytes(download.bytes()) {
                    Ok(()) => {
                        let detail = format!("{} bytes", download.bytes().len());
                        self.log_move(&format!("response download ({detail})"));
                        TerminalOutcome::new(OutcomeKind::Downloaded, detail)
                    }
                    Err(e) => self.write_failure(e),
                }
            }
            PageResult::Forward(url) => {
                let target = url.render();
                match transport.forward(&target) {
                    Ok(()) => {
                        self.log_move(&format!("forward to {target}"));
                        TerminalOutcome::new(OutcomeKind::Forwarded, target)
                    }
                    Err(e) => self.write_failure(e),
                }
            }
            PageResult::Redirect(url) => {
                let mut target = url.render();
                if url.is_site_relative() {
                    target = format!("{}{}", self.base_path, target);
                }
                match transport.send_redirect(&target) {
                    Ok(()) => {
                        self.log_move(&format!("redirect to {target}"));
                        TerminalOutcome::new(OutcomeKind::Redirected, target)
                    }
                    Err(e) => self.write_failure(e),
                }
            }
            PageResult::RawStatus(status) => match transport.send_status(*status) {
                Ok(()) => {
                    self.log_move(&format!("response status {status}"));
                    TerminalOutcome::new(OutcomeKind::StatusSent, status.as_u16().to_string())
                }
                Err(e) => self.write_failure(e),
            },
            PageResult::None => TerminalOutcome::new(OutcomeKind::NoAction, ""),
        }
    }

    fn write_failure(&self, e: TransportError) -> TerminalOutcome {
        if e.disconnect {
            warn!(code = "client-disconnect", error = %e, "client went away during response");
            TerminalOutcome::new(OutcomeKind::ClientDisconnect, e.message)
        } else {
            error!(code = "dispatch-failed", error = %e, "response realization failed");
            TerminalOutcome::new(OutcomeKind::TransportFault, e.message)
        }
    }

    fn log_move(&self, message: &str) {
        if self.page_log {
            info!(code = "page-move", "{message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{DefaultMimeLookup, Download, PageUrl};

    #[derive(Default)]
    struct RecordingTransport {
        headers: Vec<(String, String)>,
        written: Vec<u8>,
        redirects: Vec<String>,
        statuses: Vec<StatusCode>,
        forwards: Vec<String>,
        fail_write_disconnect: Option<bool>,
    }

    impl Transport for RecordingTransport {
        fn set_header(&mut self, name: &str, value: &str) {
            self.headers.push((name.to_string(), value.to_string()));
        }

        fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
            match self.fail_write_disconnect {
                Some(true) => Err(TransportError::disconnect("peer reset")),
                Some(false) => Err(TransportError::fault("pipe burst")),
                None => {
                    self.written.extend_from_slice(bytes);
                    Ok(())
                }
            }
        }

        fn send_redirect(&mut self, url: &str) -> Result<(), TransportError> {
            self.redirects.push(url.to_string());
            Ok(())
        }

        fn send_status(&mut self, status: StatusCode) -> Result<(), TransportError> {
            self.statuses.push(status);
            Ok(())
        }

        fn forward(&mut self, url: &str) -> Result<(), TransportError> {
            self.forwards.push(url.to_string());
            Ok(())
        }
    }

    fn dispatcher(base_path: &str) -> Dispatcher<'_> {
        Dispatcher::new(base_path, &DefaultMimeLookup, false)
    }

    #[test]
    fn site_relative_redirect_gets_base_path() {
        let mut transport = RecordingTransport::default();
        let page = PageResult::redirect("/foo");
        let outcome = dispatcher("/app").realize(&page, &mut transport);
        assert_eq!(outcome.kind, OutcomeKind::Redirected);
        assert_eq!(transport.redirects, vec!["/app/foo".to_string()]);
    }

    #[test]
    fn absolute_redirect_is_unchanged() {
        let mut transport = RecordingTransport::default();
        let page = PageResult::redirect("https://other/x");
        dispatcher("/app").realize(&page, &mut transport);
        assert_eq!(transport.redirects, vec!["https://other/x".to_string()]);
    }

    #[test]
    fn redirect_carries_accumulated_params() {
        let mut transport = RecordingTransport::default();
        let mut url = PageUrl::new("/next");
        url.add_param("from", "here");
        dispatcher("").realize(&PageResult::Redirect(url), &mut transport);
        assert_eq!(transport.redirects, vec!["/next?from=here".to_string()]);
    }

    #[test]
    fn download_resolves_default_content_type() {
        let mut transport = RecordingTransport::default();
        let page = PageResult::Download(Download::binary(vec![1, 2, 3]));
        let outcome = dispatcher("").realize(&page, &mut transport);
        assert_eq!(outcome.kind, OutcomeKind::Downloaded);
        assert_eq!(
            transport.headers,
            vec![("Content-Type".to_string(), "application/octet-stream".to_string())]
        );
        assert_eq!(transport.written, vec![1, 2, 3]);
    }

    #[test]
    fn explicit_content_type_overrides_lookup() {
        let mut transport = RecordingTransport::default();
        let page = PageResult::Download(Download::binary(vec![0]).content_type("image/png"));
        dispatcher("").realize(&page, &mut transport);
        assert_eq!(transport.headers[0].1, "image/png");
    }

    #[test]
    fn filename_sets_attachment_disposition() {
        let mut transport = RecordingTransport::default();
        let page = PageResult::Download(Download::text("csv,data").filename("report.csv"));
        dispatcher("").realize(&page, &mut transport);
        assert_eq!(
            transport.headers[1],
            (
                "Content-Disposition".to_string(),
                "attachment; filename=\"report.csv\"".to_string()
            )
        );
    }

    #[test]
    fn disconnect_during_download_is_benign() {
        let mut transport = RecordingTransport {
            fail_write_disconnect: Some(true),
            ..Default::default()
        };
        let page = PageResult::Download(Download::binary(vec![0; 16]));
        let outcome = dispatcher("").realize(&page, &mut transport);
        assert_eq!(outcome.kind, OutcomeKind::ClientDisconnect);
    }

    #[test]
    fn other_write_failures_are_faults() {
        let mut transport = RecordingTransport {
            fail_write_disconnect: Some(false),
            ..Default::default()
        };
        let page = PageResult::Download(Download::binary(vec![0; 16]));
        let outcome = dispatcher("").realize(&page, &mut transport);
        assert_eq!(outcome.kind, OutcomeKind::TransportFault);
    }

    #[test]
    fn forward_renders_query_and_fragment() {
        let mut transport = RecordingTransport::default();
        let mut url = PageUrl::new("/detail");
        url.add_param("id", "42");
        url.set_fragment("top");
        let outcome = dispatcher("").realize(&PageResult::Forward(url), &mut transport);
        assert_eq!(outcome.kind, OutcomeKind::Forwarded);
        assert_eq!(transport.forwards, vec!["/detail?id=42#top".to_string()]);
    }

    #[test]
    fn raw_status_sends_bare_code() {
        let mut transport = RecordingTransport::default();
        let outcome =
            dispatcher("").realize(&PageResult::RawStatus(StatusCode::NOT_FOUND), &mut transport);
        assert_eq!(outcome.kind, OutcomeKind::StatusSent);
        assert_eq!(transport.statuses, vec![StatusCode::NOT_FOUND]);
    }

    #[test]
    fn none_takes_no_transport_action() {
        let mut transport = RecordingTransport::default();
        let outcome = dispatcher("").realize(&PageResult::None, &mut transport);
        assert_eq!(outcome.kind, OutcomeKind::NoAction);
        assert!(transport.headers.is_empty());
        assert!(transport.written.is_empty());
        assert!(transport.redirects.is_empty());
        assert!(transport.statuses.is_empty());
        assert!(transport.forwards.is_empty());
    }
}
