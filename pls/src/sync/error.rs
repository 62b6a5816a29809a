//! Synchronizer error types.

use crate::config::ConfigError;
use crate::manifest::ManifestError;
use crate::store::StoreError;
use crate::templates::TemplateError;
use crate::version::VersionError;

/// Errors that abort a synchronization run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Malformed version or invalid transition.
    #[error(transparent)]
    Version(#[from] VersionError),

    /// A remote call failed or a branch is missing.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The versions manifest or project manifest could not be read or written.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The pull request title or body template failed to render.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Neither manifest carries a current version.
    #[error("No current version found in '{versions_manifest}' or '{project_manifest}'")]
    MissingVersion {
        versions_manifest: String,
        project_manifest: String,
    },
}
