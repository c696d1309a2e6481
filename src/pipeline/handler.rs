//! The application seam: route declaration, main logic and overridable hooks.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::page::{PageResult, PageUrl};
use crate::pipeline::error::{AppFailure, ErrorRecord};
use crate::pipeline::request::RequestInfo;
use crate::pipeline::route::RouteConfig;
use crate::pipeline::transaction::Transaction;

/// One servlet-style entry point driven by the pipeline.
///
/// `execute` and `client_ip` are mandatory; the remaining hooks have
/// defaults most routes keep.
pub trait RequestHandler: Send + Sync {
    /// Gating requirements for this route.
    fn route(&self) -> RouteConfig {
        RouteConfig::default()
    }

    /// Main application logic. The transaction, if the route declared one,
    /// is borrowed for the duration of the call; committing and releasing
    /// it stays with the pipeline.
    fn execute(
        &self,
        req: &RequestInfo,
        tx: Option<&mut dyn Transaction>,
    ) -> Result<PageResult, AppFailure>;

    /// Resolve the caller's IP address. Proxy topology varies per
    /// deployment, so the embedder decides which header or peer address to
    /// trust.
    fn client_ip(&self, req: &RequestInfo) -> String;

    /// Allowed caller addresses. Empty means unrestricted. May use the open
    /// transaction to look the list up.
    fn permit_ips(
        &self,
        _req: &RequestInfo,
        _tx: Option<&mut dyn Transaction>,
    ) -> Result<Vec<String>, AppFailure> {
        Ok(Vec::new())
    }

    /// Login predicate for routes with `required_login`.
    fn is_logged_in(&self, _req: &RequestInfo) -> Result<bool, AppFailure> {
        Ok(true)
    }

    /// Page returned when the login gate fails. Not an error path.
    fn not_logged_in_page(&self, _req: &RequestInfo) -> Result<PageResult, AppFailure> {
        Ok(PageResult::None)
    }

    /// Build the page realized for a classified failure. The default
    /// forwards to the configured error page with the code, cause chain and
    /// a timestamp as rendering context.
    fn error_page(&self, record: &ErrorRecord, error_page_path: &str) -> PageResult {
        let mut url = PageUrl::new(error_page_path);
        url.add_param("error_code", record.code.clone());
        url.add_param("cause", record.cause_chain.join(" <- "));
        url.add_param("timestamp", now_epoch_secs().to_string());
        PageResult::Forward(url)
    }
}

fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
