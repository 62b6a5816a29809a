//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("Failed to parse settings in '{path}': {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A branch name is not a valid git reference name.
    #[error("Invalid branch name '{name}': {message}")]
    InvalidBranchName { name: String, message: String },

    /// A repository was not given as `owner/name`.
    #[error("Invalid repository '{value}': expected 'owner/name'")]
    InvalidRepository { value: String },

    /// A required setting was neither given nor found in the environment.
    #[error("Missing required setting '{name}' (set it explicitly or via ${env_var})")]
    MissingSetting { name: String, env_var: String },
}
