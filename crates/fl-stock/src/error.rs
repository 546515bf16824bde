//! Stock error type.

use thiserror::Error;

use fl_core::ToteId;

/// Errors raised while stocking totes at setup.  In-run transfers that do
/// not fit are skipped rather than reported.
#[derive(Debug, Error)]
pub enum StockError {
    #[error("{0} has no room for the tiles")]
    ToteFull(ToteId),

    #[error("{0} added out of id order")]
    OutOfOrder(ToteId),
}

pub type StockResult<T> = Result<T, StockError>;
