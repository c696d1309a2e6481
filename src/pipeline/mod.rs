//! Request-processing pipeline.
//!
//! # Responsibilities
//! - Run one invocation per inbound request: method gate, scoped
//!   transaction, IP and login gates, application logic
//! - Classify failures into the error taxonomy, log each exactly once, and
//!   convert them into a page via the error-page hook
//! - Guarantee the transactional resource is released exactly once on every
//!   exit path, panics included
//! - Emit access, timing and outcome telemetry
//!
//! # State sequence
//! ```text
//! Start → MethodCheck → {TxOpen|NoTx} → IpCheck → LoginCheck
//!       → {Execute|(NotLoggedInResult)}
//!       → {(Success)|ErrorClassify → Rollback → (ErrorResult)}
//!       → Cleanup → Dispatch → (Done)
//! ```

pub mod context;
pub mod error;
pub mod handler;
pub mod request;
pub mod route;
pub mod transaction;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::WebConfig;
use crate::device;
use crate::dispatch::{Dispatcher, TerminalOutcome, Transport};
use crate::observability::metrics;
use crate::page::{DefaultMimeLookup, MimeLookup, PageResult};

pub use context::RequestContext;
pub use error::{AppFailure, ErrorRecord, Severity, TxError};
pub use error::{
    CODE_FATAL, CODE_IP_DENIED, CODE_METHOD_NOT_ALLOWED, CODE_RUNTIME_ERROR, CODE_SQL_ERROR,
};
pub use handler::RequestHandler;
pub use request::RequestInfo;
pub use route::RouteConfig;
pub use transaction::{Transaction, TransactionProvider};

/// Orchestrates the per-request sequence and owns its resources.
pub struct Pipeline {
    web: WebConfig,
    tx_provider: Option<Arc<dyn TransactionProvider>>,
    mime: Arc<dyn MimeLookup>,
}

impl Pipeline {
    pub fn new(web: WebConfig) -> Self {
        Self {
            web,
            tx_provider: None,
            mime: Arc::new(DefaultMimeLookup),
        }
    }

    /// Supply the transactional resource provider. Routes declaring
    /// `needs_transaction` fail with `sql-error` without one.
    pub fn with_transaction_provider(mut self, provider: Arc<dyn TransactionProvider>) -> Self {
        self.tx_provider = Some(provider);
        self
    }

    /// Replace the built-in content-type lookup.
    pub fn with_mime_lookup(mut self, mime: Arc<dyn MimeLookup>) -> Self {
        self.mime = mime;
        self
    }

    /// Run one request end to end and realize the resulting page.
    ///
    /// Never returns an error: every failure is classified, logged once,
    /// rolled back if a transaction is open, and converted into a page.
    pub fn handle(
        &self,
        req: &RequestInfo,
        handler: &dyn RequestHandler,
        transport: &mut dyn Transport,
    ) -> TerminalOutcome {
        let mut ctx = RequestContext::new(req.session_id.clone());
        info!(code = "client-info", "{}", client_info_line(req, handler));

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.run(req, handler, &mut ctx)));
        let page = match result {
            Ok(Ok(page)) => page,
            // An explicit status short-circuit skips rollback, error logging
            // and the error page; the uncommitted transaction is simply
            // released below.
            Ok(Err(AppFailure::HttpStatus(status))) => PageResult::RawStatus(status),
            Ok(Err(failure)) => self.failure_page(&failure, req, handler, &mut ctx),
            Err(payload) => {
                let failure = AppFailure::Fatal(panic_message(payload));
                self.failure_page(&failure, req, handler, &mut ctx)
            }
        };
        ctx.close();

        let dispatcher = Dispatcher::new(&self.web.base_path, self.mime.as_ref(), self.web.page_log);
        let outcome = dispatcher.realize(&page, transport);

        info!(
            code = "pipeline-end",
            session_id = %req.session_id,
            elapsed_ms = ctx.elapsed_millis() as u64,
            outcome = outcome.kind.label(),
            "pipeline end"
        );
        metrics::record_request(req.method.as_str(), outcome.kind.label(), ctx.started());
        outcome
    }

    fn run(
        &self,
        req: &RequestInfo,
        handler: &dyn RequestHandler,
        ctx: &mut RequestContext,
    ) -> Result<PageResult, AppFailure> {
        let route = handler.route();

        // Method gate: nothing is acquired before this passes.
        if !route.allows(&req.method) {
            return Err(AppFailure::warning(
                CODE_METHOD_NOT_ALLOWED,
                format!("{} requests are not permitted", req.method),
            ));
        }

        // Transactional resource, scoped to this invocation.
        if route.needs_transaction {
            let provider = self.tx_provider.as_ref().ok_or_else(|| {
                AppFailure::Sql(TxError::Acquire(
                    "no transaction provider configured".to_string(),
                ))
            })?;
            ctx.attach(provider.begin()?);
        }

        // IP gate: only enforced when the handler declares an allow-list.
        let permitted = handler.permit_ips(req, ctx.tx_mut())?;
        if !permitted.is_empty() {
            let ip = handler.client_ip(req);
            if !permitted.iter().any(|p| p == &ip) {
                return Err(AppFailure::business(
                    CODE_IP_DENIED,
                    format!("connections from {ip} are not permitted"),
                ));
            }
        }

        // Login gate, then application logic. The not-logged-in branch is a
        // routing decision, not an error.
        let page = if route.required_login && !handler.is_logged_in(req)? {
            handler.not_logged_in_page(req)?
        } else {
            handler.execute(req, ctx.tx_mut())?
        };

        ctx.commit()?;
        Ok(page)
    }

    fn failure_page(
        &self,
        failure: &AppFailure,
        req: &RequestInfo,
        handler: &dyn RequestHandler,
        ctx: &mut RequestContext,
    ) -> PageResult {
        let record = ErrorRecord::classify(failure);
        let chain = record.cause_chain.join(" <- ");
        match record.severity {
            Severity::Warn => warn!(
                code = %record.code,
                session_id = %req.session_id,
                cause = %chain,
                "request failed"
            ),
            Severity::Error => error!(
                code = %record.code,
                session_id = %req.session_id,
                cause = %chain,
                "request failed"
            ),
        }
        if ctx.has_tx() {
            ctx.rollback();
        }
        // The hook is caller-overridable; a panic here must not escape the
        // pipeline either. Degrade to no page, the failure is already logged.
        let page = panic::catch_unwind(AssertUnwindSafe(|| {
            handler.error_page(&record, &self.web.error_page_path)
        }));
        match page {
            Ok(page) => page,
            Err(_) => {
                error!(
                    code = "error-page-failed",
                    session_id = %req.session_id,
                    error_code = %record.code,
                    "error page hook failed"
                );
                PageResult::None
            }
        }
    }
}

/// Access-log line: device type, method, origin, URI, referer, UA, caller IP.
fn client_info_line(req: &RequestInfo, handler: &dyn RequestHandler) -> String {
    let device = device::classify(&req.user_agent);
    format!(
        "[{}] [type]{} [method]{} [host]{}://{} [uri]{} [ref]{} [ua]{} [IP]{}",
        req.session_id,
        device.category.label(),
        req.method,
        req.scheme,
        req.host,
        req.uri(),
        req.referer,
        req.user_agent,
        handler.client_ip(req),
    )
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unidentified panic".to_string()
    }
}
