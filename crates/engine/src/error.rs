//! Error types for the engine crate.
//!
//! Only structural failures surface here. Per-request problems (an input
//! title that resolves to nothing, a preference set with no known
//! movies) degrade to smaller or empty result sets instead.

use thiserror::Error;

/// Errors raised while constructing the model or its cached artifacts.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The catalog table was empty
    #[error("Cannot build model: catalog is empty")]
    EmptyCatalog,

    /// The rating log was empty
    #[error("Cannot build model: rating log is empty")]
    EmptyRatings,

    /// The cached similarity artifact could not be read or written
    #[error("Similarity cache error at {path}: {reason}")]
    Cache { path: String, reason: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, EngineError>;
