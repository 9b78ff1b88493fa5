//! Component Error Types
//!
//! Errors raised by the platform primitives and metadata parsing. Load
//! failures themselves are recorded as `LoadFlags` on the affected descriptor
//! and never surface as errors from the loader.

use std::path::Path;
use thiserror::Error;

/// Result type for component operations
pub type ComponentResult<T> = Result<T, ComponentError>;

/// Error types for component discovery and loading
#[derive(Error, Debug, Clone)]
pub enum ComponentError {
    /// Metadata document is empty, malformed or missing a required field
    #[error("Invalid component metadata: {message}")]
    InvalidMetadata { message: String },

    /// The artifact could not be opened
    #[error("Unable to load component {path}: {message}")]
    LoadFailed { path: String, message: String },

    /// A required exported symbol is absent from the artifact
    #[error("Component {path} does not export symbol '{symbol}'")]
    MissingSymbol { path: String, symbol: String },

    /// Metadata JSON could not be decoded
    #[error("JSON error: {message}")]
    Json { message: String },
}

impl ComponentError {
    /// Create an invalid metadata error
    pub fn invalid_metadata<S: Into<String>>(message: S) -> Self {
        Self::InvalidMetadata { message: message.into() }
    }

    /// Create a load failure for the artifact at `path`
    pub fn load_failed<S: Into<String>>(path: &Path, message: S) -> Self {
        Self::LoadFailed {
            path: path.display().to_string(),
            message: message.into(),
        }
    }

    /// Create a missing symbol error
    pub fn missing_symbol<S: Into<String>>(path: &Path, symbol: S) -> Self {
        Self::MissingSymbol {
            path: path.display().to_string(),
            symbol: symbol.into(),
        }
    }
}

impl From<serde_json::Error> for ComponentError {
    fn from(err: serde_json::Error) -> Self {
        ComponentError::Json { message: err.to_string() }
    }
}
