//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files;
//! every section falls back to its defaults when omitted.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    /// Listener configuration (bind address, timeout).
    pub listener: ListenerConfig,

    /// Web-layer behavior shared by every route.
    pub web: WebConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Web-layer behavior shared by every route.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WebConfig {
    /// Forward target used by the default error page hook.
    pub error_page_path: String,

    /// Deployment base path prefixed onto site-relative redirects.
    pub base_path: String,

    /// Cookie carrying the session identifier.
    pub session_cookie: String,

    /// Whether page transitions are logged.
    pub page_log: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            error_page_path: "/error".to_string(),
            base_path: String::new(),
            session_cookie: "sid".to_string(),
            page_log: true,
        }
    }
}
