//! Transport-neutral view of one inbound request.

use axum::http::Method;

/// Everything the pipeline and application logic may read about a request.
///
/// Built once by the transport adapter; header fields default to empty
/// strings when absent.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub scheme: String,
    pub host: String,
    pub user_agent: String,
    pub referer: String,
    /// au handset identifier (`X-Up-Subno`).
    pub au_uid: String,
    /// SoftBank handset identifier (`x-jphone-uid`).
    pub softbank_uid: String,
    /// Peer address as seen by the listener. Application code resolves the
    /// real client IP through its own hook, since proxy topology varies.
    pub remote_addr: String,
    /// Session identifier, or a fresh correlation id when none exists.
    pub session_id: String,
}

impl RequestInfo {
    /// URI with its query string, as it appears in the access log.
    pub fn uri(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

impl Default for RequestInfo {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query: String::new(),
            scheme: "http".to_string(),
            host: String::new(),
            user_agent: String::new(),
            referer: String::new(),
            au_uid: String::new(),
            softbank_uid: String::new(),
            remote_addr: String::new(),
            session_id: String::new(),
        }
    }
}
