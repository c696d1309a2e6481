//! Cross-cutting observability: logging, metrics, host identity.
//!
//! # Design Decisions
//! - Every log event carries a short `code` field so lines stay grep-able
//! - Metrics go through the `metrics` facade; exposition is the embedder's
//!   concern
//! - The process host name is resolved once, idempotently; resolution
//!   failure degrades to an empty string and is logged a single time

pub mod logging;
pub mod metrics;

use std::sync::OnceLock;

use tracing::error;

static HOST_NAME: OnceLock<String> = OnceLock::new();

/// Process host name, resolved on first use and cached for the process
/// lifetime. Empty when resolution fails.
pub fn host_name() -> &'static str {
    HOST_NAME.get_or_init(|| match resolve_host_name() {
        Some(name) => name,
        None => {
            error!(code = "hostname-failed", "could not resolve server host name");
            String::new()
        }
    })
}

fn resolve_host_name() -> Option<String> {
    if let Ok(name) = std::env::var("HOSTNAME") {
        let name = name.trim();
        if !name.is_empty() {
            return Some(name.to_string());
        }
    }
    std::fs::read_to_string("/etc/hostname")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_name_is_stable_across_calls() {
        assert_eq!(host_name(), host_name());
    }
}
