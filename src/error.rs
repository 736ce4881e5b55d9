//! Error types for zgeo.
//!
//! Only the fallible edges of the crate return [`ZSetError`]: configuration
//! loading, plane construction and position-derived inserts. Conditional
//! rejections and absent sets are reported through return values instead.

use thiserror::Error;

/// Errors returned by zgeo operations.
#[derive(Debug, Error)]
pub enum ZSetError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Coordinate ({x}, {y}) is outside the plane bounds")]
    OutOfBounds { x: f64, y: f64 },

    #[error("Invalid geohash step: {0}")]
    InvalidStep(u8),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ZSetError>;
