//! Per-request pipeline context.

use std::time::Instant;

use tracing::error;

use crate::pipeline::error::TxError;
use crate::pipeline::transaction::Transaction;

/// State exclusively owned by one `handle` invocation.
///
/// The transactional handle lives and dies here: application logic borrows
/// it, but commit, rollback and release happen only through this context.
pub struct RequestContext {
    session_id: String,
    started: Instant,
    tx: Option<Box<dyn Transaction>>,
}

impl RequestContext {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            started: Instant::now(),
            tx: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn elapsed_millis(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    pub fn attach(&mut self, tx: Box<dyn Transaction>) {
        self.tx = Some(tx);
    }

    /// Reborrow through the box so the trait object's lifetime shrinks to
    /// this borrow instead of staying `'static`.
    pub fn tx_mut(&mut self) -> Option<&mut dyn Transaction> {
        match &mut self.tx {
            Some(tx) => Some(&mut **tx),
            None => None,
        }
    }

    pub fn has_tx(&self) -> bool {
        self.tx.is_some()
    }

    /// Commit the open transaction, if any.
    pub fn commit(&mut self) -> Result<(), TxError> {
        match self.tx.as_deref_mut() {
            Some(tx) => tx.commit(),
            None => Ok(()),
        }
    }

    /// Attempt a rollback without releasing the resource. A failure here is
    /// logged and never masks the failure that triggered it.
    pub fn rollback(&mut self) {
        if let Some(tx) = self.tx.as_deref_mut() {
            if let Err(e) = tx.rollback() {
                error!(
                    code = "rollback-failed",
                    session_id = %self.session_id,
                    error = %e,
                    "transaction rollback failed"
                );
            }
        }
    }

    /// Release the transactional resource. The handle is taken out on the
    /// first call, so the resource is closed exactly once.
    pub fn close(&mut self) {
        if let Some(mut tx) = self.tx.take() {
            if let Err(e) = tx.close() {
                error!(
                    code = "tx-close-failed",
                    session_id = %self.session_id,
                    error = %e,
                    "transaction close failed"
                );
            }
        }
    }
}

impl Drop for RequestContext {
    fn drop(&mut self) {
        // Backstop for exit paths that never reached the explicit close.
        self.close();
    }
}
