#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod changelog;
pub mod commit_builder;
pub mod config;
pub mod debug_log;
pub mod manifest;
pub mod metadata;
pub mod options;
pub mod rate_limit;
pub mod store;
pub mod sync;
pub mod templates;
pub mod version;

pub use changelog::render_changelog;
pub use commit_builder::{publish, CommitBuilder, UnpublishedCommit};
pub use config::{
    load_settings, parse_repository, require_setting, resolve_setting, validate_branch_name, ConfigError,
    ReleaseSettings, SyncConfig,
};
pub use debug_log::DebugEntry;
pub use manifest::{ManifestError, VersionsManifest, VersionsManifestEntry};
pub use metadata::{extract_version, ReleaseMetadata};
pub use options::{build_options, ParsedOptions, VersionOption};
pub use rate_limit::{guard_core_budget, CoreBudget};
pub use store::{
    Commit, CommitSource, ContentStore, GitHubStore, MemoryStore, Notifier, PullRequest,
    StoreError,
};
pub use sync::{
    FileChange, Plan, ReleasePlan, ReleaseSynchronizer, SyncError, SyncOutcome, SyncRequest,
};
pub use templates::{TemplateError, TemplateRenderer};
pub use version::{
    classify, compute_bump, get_next_version, next_version, transition, BumpType, Stage,
    VersionBump, VersionError,
};
