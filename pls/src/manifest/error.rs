//! Manifest error types.

use thiserror::Error;

/// Errors raised while reading or writing version-bearing manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The file exists but is not valid JSON of the expected shape.
    #[error("Failed to decode manifest '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Serializing the updated manifest failed.
    #[error("Failed to encode manifest '{path}': {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The project manifest is valid JSON but not an object.
    #[error("Invalid project manifest '{path}': {message}")]
    InvalidProjectManifest { path: String, message: String },
}
