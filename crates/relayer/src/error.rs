//! Per-connection relay errors.

use thiserror::Error;

/// Why a connection stopped being usable.
///
/// Read errors, undecodable frames and a clean close all end a connection the
/// same way; the variants exist for logging.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("transport error: {0}")]
    Transport(#[from] axum::Error),
    #[error("undecodable message: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("connection closed")]
    Closed,
    #[error("broadcaster intake closed")]
    IntakeClosed,
}
