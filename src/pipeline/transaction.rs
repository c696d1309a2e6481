//! Transactional resource seam.
//!
//! The pipeline owns acquisition, commit, rollback and release; application
//! logic only ever borrows the open transaction and must never close it.

use crate::pipeline::error::TxError;

/// One transactional resource, exclusively owned by one in-flight request.
pub trait Transaction: Send {
    fn commit(&mut self) -> Result<(), TxError>;
    fn rollback(&mut self) -> Result<(), TxError>;
    /// Release the underlying resource. The pipeline calls this exactly once.
    fn close(&mut self) -> Result<(), TxError>;
}

/// Source of transactions, supplied by the embedding environment.
pub trait TransactionProvider: Send + Sync {
    fn begin(&self) -> Result<Box<dyn Transaction>, TxError>;
}
