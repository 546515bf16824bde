//! Allocator setup errors.

use thiserror::Error;

use fl_core::ToteId;

/// Errors raised while building the resource pools.  Allocation itself
/// never errors: an agent with nothing to do vacates.
#[derive(Debug, Error)]
pub enum AllocError {
    #[error("{0} does not rest on a storage slot")]
    UnplacedTote(ToteId),

    #[error("the waypoint graph has no storage slots")]
    NoStorage,
}

pub type AllocResult<T> = Result<T, AllocError>;
