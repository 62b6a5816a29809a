//! Read-only release plan.

use crate::metadata::{encode, ReleaseMetadata};
use crate::store::PullRequest;
use crate::version::{BumpType, VersionBump};

/// New content for one file on the release branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub content: String,
}

/// Everything a run would write, computed without mutating anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    /// Base commit the manifests were read from. The release commit is built
    /// on top of it.
    pub base_sha: String,

    /// Bump recomputed from the commit history.
    pub bump: VersionBump,

    /// Version this run releases. Differs from `bump.to` when a selection
    /// made in the pull request is kept.
    pub version: String,

    /// Bump type of `version`.
    pub bump_type: BumpType,

    /// Pull request title.
    pub title: String,

    /// Pull request body. An existing body keeps everything outside the
    /// options, changelog and debug blocks.
    pub body: String,

    /// Files written on the release branch.
    pub changes: Vec<FileChange>,

    /// Open release pull request, if one exists.
    pub existing: Option<PullRequest>,

    /// Whether `version` differs from the version the pull request advertised.
    pub selection_changed: bool,

    /// Version the pull request advertised before this run.
    pub previous_version: Option<String>,
}

impl ReleasePlan {
    /// Returns true when the released version comes from the pull request
    /// rather than from the commit history.
    #[must_use]
    pub fn is_user_selection(&self) -> bool {
        self.version != self.bump.to
    }

    /// Commit message for the release commit.
    #[must_use]
    pub fn commit_message(&self) -> String {
        encode(&ReleaseMetadata::new(
            &self.version,
            &self.bump.from,
            self.bump_type,
        ))
    }
}

/// Result of planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Nothing to release.
    NoOp { reason: String },

    /// A release to apply.
    Release(Box<ReleasePlan>),
}
