//! Framework error type.
//!
//! Sub-crates define their own error enums; `fl-sim` wraps them all into
//! `SimError` through `#[from]` conversions.

use thiserror::Error;

/// Base error type for `fl-core`.
#[derive(Debug, Error)]
pub enum FlError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `fl-core`.
pub type FlResult<T> = Result<T, FlError>;
