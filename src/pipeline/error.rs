//! Failure taxonomy and classification for the request pipeline.

use axum::http::StatusCode;
use thiserror::Error;

/// Taxonomy code for a rejected HTTP method.
pub const CODE_METHOD_NOT_ALLOWED: &str = "method-not-allowed";
/// Taxonomy code for a caller outside the IP allow-list.
pub const CODE_IP_DENIED: &str = "ip-denied";
/// Taxonomy code for storage / transaction failures.
pub const CODE_SQL_ERROR: &str = "sql-error";
/// Taxonomy code for uncaught application failures.
pub const CODE_RUNTIME_ERROR: &str = "runtime-error";
/// Taxonomy code for non-recoverable faults.
pub const CODE_FATAL: &str = "fatal";

/// Transactional resource failures.
#[derive(Debug, Error)]
pub enum TxError {
    #[error("transaction acquire failed: {0}")]
    Acquire(String),
    #[error("commit failed: {0}")]
    Commit(String),
    #[error("rollback failed: {0}")]
    Rollback(String),
    #[error("close failed: {0}")]
    Close(String),
}

/// Failures application logic and the pipeline gates can raise.
#[derive(Debug, Error)]
pub enum AppFailure {
    /// Short-circuit with a bare HTTP status, bypassing the error page.
    #[error("http status {0}")]
    HttpStatus(StatusCode),

    /// Expected application-level condition, logged at warn severity.
    #[error("[{code}] {message}")]
    Warning { code: String, message: String },

    /// Application-declared business error carrying its own code.
    #[error("[{code}] {message}")]
    Business { code: String, message: String },

    /// Storage / transaction failure.
    #[error("transaction failure")]
    Sql(#[from] TxError),

    /// Any other recoverable failure from application logic.
    #[error("runtime failure")]
    Runtime(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-recoverable fault (panic in application logic).
    #[error("fatal: {0}")]
    Fatal(String),
}

impl AppFailure {
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        AppFailure::Warning {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn business(code: impl Into<String>, message: impl Into<String>) -> Self {
        AppFailure::Business {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppFailure::Runtime(Box::new(err))
    }
}

/// Log severity attached to a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warn,
    Error,
}

/// A classified failure, consumed once to build the error page.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub code: String,
    /// Outermost failure first.
    pub cause_chain: Vec<String>,
    pub severity: Severity,
}

impl ErrorRecord {
    /// Classify a failure into its taxonomy code, severity and cause chain.
    ///
    /// `HttpStatus` normally never reaches this point; the pipeline maps it
    /// straight to a raw-status page.
    pub fn classify(failure: &AppFailure) -> Self {
        let (code, severity) = match failure {
            AppFailure::HttpStatus(_) => ("http-status".to_string(), Severity::Warn),
            AppFailure::Warning { code, .. } => (code.clone(), Severity::Warn),
            AppFailure::Business { code, .. } => (code.clone(), Severity::Error),
            AppFailure::Sql(_) => (CODE_SQL_ERROR.to_string(), Severity::Error),
            AppFailure::Runtime(_) => (CODE_RUNTIME_ERROR.to_string(), Severity::Error),
            AppFailure::Fatal(_) => (CODE_FATAL.to_string(), Severity::Error),
        };
        Self {
            code,
            cause_chain: cause_chain(failure),
            severity,
        }
    }
}

/// Walk `Error::source`, collecting messages outermost first.
fn cause_chain(failure: &AppFailure) -> Vec<String> {
    let mut chain = vec![failure.to_string()];
    let mut source = std::error::Error::source(failure);
    while let Some(err) = source {
        chain.push(err.to_string());
        source = err.source();
    }
    chain
}
