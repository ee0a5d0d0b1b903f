//! Core error type.
//!
//! Sub-crates define their own error enums and either convert `CoreError`
//! into them via `From` impls or wrap it as one variant.  Both patterns are
//! acceptable; prefer whichever keeps error sites clean.

use thiserror::Error;

/// Errors from rd-core primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid timestamp `{0}`: {1}")]
    Timestamp(String, &'static str),
}

/// Shorthand result type for rd-core operations.
pub type CoreResult<T> = Result<T, CoreError>;
