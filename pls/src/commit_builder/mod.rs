//! Working-tree-free commit construction.
//!
//! A [`CommitBuilder`] stages file contents in memory and turns them into
//! blob, tree and commit objects on top of a base commit. [`CommitBuilder::commit`]
//! returns an [`UnpublishedCommit`] that no ref points at; [`publish`] is the
//! only call that moves a branch. A branch is therefore never reset before
//! its replacement commit exists, so a pull request never sees its branch
//! drop to zero commits ahead of base.

use crate::store::{ContentStore, StoreError, TreeEntry};
use std::collections::BTreeMap;
use tracing::{debug, info, info_span, Instrument};

/// Stages file changes against a resolved base commit.
pub struct CommitBuilder<'a> {
    store: &'a dyn ContentStore,
    base_ref: String,
    base_commit: String,
    base_tree: String,
    changes: BTreeMap<String, String>,
}

/// A commit object that exists remotely but is not referenced by any branch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "an unpublished commit is inert until passed to `publish`"]
pub struct UnpublishedCommit {
    sha: String,
    base_commit: String,
}

impl UnpublishedCommit {
    /// Id of the new commit.
    #[must_use]
    pub fn sha(&self) -> &str {
        &self.sha
    }

    /// Id of its sole parent.
    #[must_use]
    pub fn base_commit(&self) -> &str {
        &self.base_commit
    }
}

impl<'a> CommitBuilder<'a> {
    /// Resolves `base_ref` to its commit and tree.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RefNotFound`] if the branch does not exist, or
    /// [`StoreError::Remote`] if the lookups fail.
    pub async fn begin(store: &'a dyn ContentStore, base_ref: &str) -> Result<Self, StoreError> {
        let base_commit = store.resolve_ref(base_ref).await?;
        Self::start(store, base_ref, base_commit).await
    }

    /// Starts from a known base commit, skipping ref resolution. Use this
    /// when staged content was derived from that exact commit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Remote`] if the commit cannot be read.
    pub async fn begin_at(store: &'a dyn ContentStore, base_commit: &str) -> Result<Self, StoreError> {
        Self::start(store, base_commit, base_commit.to_string()).await
    }

    async fn start(store: &'a dyn ContentStore, base_ref: &str, base_commit: String) -> Result<Self, StoreError> {
        let base_tree = store.commit_tree(&base_commit).await?;
        debug!(base_ref, base_commit = %base_commit, base_tree = %base_tree, "Resolved base");

        Ok(Self {
            store,
            base_ref: base_ref.to_string(),
            base_commit,
            base_tree,
            changes: BTreeMap::new(),
        })
    }

    /// Stages new content for `path`. Later calls for the same path win.
    pub fn stage(&mut self, path: impl Into<String>, content: impl Into<String>) -> &mut Self {
        self.changes.insert(path.into(), content.into());
        self
    }

    /// Paths staged so far, in sorted order.
    pub fn staged_paths(&self) -> impl Iterator<Item = &str> {
        self.changes.keys().map(String::as_str)
    }

    #[must_use]
    pub fn base_commit(&self) -> &str {
        &self.base_commit
    }

    /// Writes one blob per staged path, one tree layered on the base tree and
    /// one commit whose sole parent is the base commit. No ref is touched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if any object cannot be created. Objects
    /// created before the failure stay unreferenced.
    pub async fn commit(self, message: &str) -> Result<UnpublishedCommit, StoreError> {
        let paths: Vec<&str> = self.staged_paths().collect();
        let span = info_span!("commit", base = %self.base_ref, files = ?paths);

        async {
            let tree = if self.changes.is_empty() {
                self.base_tree.clone()
            } else {
                let mut entries = Vec::with_capacity(self.changes.len());
                for (path, content) in &self.changes {
                    let blob_sha = self.store.create_blob(content).await?;
                    entries.push(TreeEntry {
                        path: path.clone(),
                        blob_sha,
                    });
                }
                self.store.create_tree(&self.base_tree, &entries).await?
            };

            let parents = [self.base_commit.clone()];
            let sha = self.store.create_commit(message, &tree, &parents).await?;
            info!(sha = %sha, "Built commit");

            Ok(UnpublishedCommit {
                sha,
                base_commit: self.base_commit.clone(),
            })
        }
        .instrument(span)
        .await
    }
}

/// Points `branch` at a built commit. This is the only call in the commit
/// flow that moves a branch.
///
/// # Errors
///
/// Returns [`StoreError`] if the ref update fails (for example a
/// non-fast-forward without `force`).
pub async fn publish(
    store: &dyn ContentStore,
    commit: UnpublishedCommit,
    branch: &str,
    force: bool,
) -> Result<String, StoreError> {
    store.update_ref(branch, &commit.sha, force).await?;
    info!(branch, sha = %commit.sha, force, "Published commit");
    Ok(commit.sha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Operation};

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.seed_branch(
            "main",
            "chore: release v1.0.0",
            &[("package.json", "{\"version\": \"1.0.0\"}\n"), ("README.md", "hello\n")],
        );
        store
    }

    #[tokio::test]
    async fn begin_fails_for_missing_branch() {
        let store = MemoryStore::new();
        let result = CommitBuilder::begin(&store, "main").await;
        assert!(matches!(result, Err(StoreError::RefNotFound { .. })));
    }

    #[tokio::test]
    async fn commit_does_not_move_any_ref() {
        let store = seeded();
        let base = store.head("main").unwrap();

        let mut builder = CommitBuilder::begin(&store, "main").await.unwrap();
        builder.stage("package.json", "{\"version\": \"1.1.0\"}\n");
        let commit = builder.commit("chore: release v1.1.0").await.unwrap();

        assert_eq!(store.head("main"), Some(base.clone()));
        assert_eq!(commit.base_commit(), base);
        assert_eq!(store.commit_parents(commit.sha()), vec![base]);
        assert!(!store
            .operations()
            .iter()
            .any(|op| matches!(op, Operation::UpdateRef { .. })));
    }

    #[tokio::test]
    async fn commit_layers_changes_on_base_tree() {
        let store = seeded();

        let mut builder = CommitBuilder::begin(&store, "main").await.unwrap();
        builder
            .stage("package.json", "{\"version\": \"1.1.0\"}\n")
            .stage(".pls/versions.json", "{}\n");
        let commit = builder.commit("chore: release v1.1.0").await.unwrap();

        assert_eq!(
            store.file(commit.sha(), "package.json").as_deref(),
            Some("{\"version\": \"1.1.0\"}\n")
        );
        assert_eq!(store.file(commit.sha(), ".pls/versions.json").as_deref(), Some("{}\n"));
        assert_eq!(store.file(commit.sha(), "README.md").as_deref(), Some("hello\n"));
    }

    #[tokio::test]
    async fn publish_moves_branch_after_commit_exists() {
        let store = seeded();

        let mut builder = CommitBuilder::begin(&store, "main").await.unwrap();
        builder.stage("package.json", "{}\n");
        let commit = builder.commit("chore: release v1.1.0").await.unwrap();
        let sha = publish(&store, commit, "pls-release", true).await.unwrap();

        assert_eq!(store.head("pls-release"), Some(sha.clone()));
        let operations = store.operations();
        let created = operations
            .iter()
            .position(|op| matches!(op, Operation::CreateCommit { sha: s, .. } if *s == sha))
            .unwrap();
        let published = operations
            .iter()
            .position(|op| matches!(op, Operation::UpdateRef { .. }))
            .unwrap();
        assert!(created < published);
    }

    #[tokio::test]
    async fn failed_tree_leaves_branches_untouched() {
        let store = seeded();
        let base = store.head("main").unwrap();
        store.fail_on("create_tree");

        let mut builder = CommitBuilder::begin(&store, "main").await.unwrap();
        builder.stage("package.json", "{}\n");
        let result = builder.commit("chore: release v1.1.0").await;

        assert!(matches!(result, Err(StoreError::Remote { .. })));
        assert_eq!(store.head("main"), Some(base));
        assert_eq!(store.head("pls-release"), None);
    }

    #[tokio::test]
    async fn begin_at_ignores_later_branch_moves() {
        let store = seeded();
        let planned = store.head("main").unwrap();
        store.seed_commit("main", "feat: later work");

        let mut builder = CommitBuilder::begin_at(&store, &planned).await.unwrap();
        builder.stage("package.json", "{}\n").stage(".pls/versions.json", "{}\n");
        assert_eq!(
            builder.staged_paths().collect::<Vec<_>>(),
            vec![".pls/versions.json", "package.json"]
        );
        let commit = builder.commit("chore: release v1.1.0").await.unwrap();

        assert_eq!(commit.base_commit(), planned);
        assert_eq!(store.commit_parents(commit.sha()), vec![planned]);
    }

    #[tokio::test]
    async fn empty_stage_reuses_base_tree() {
        let store = seeded();

        let builder = CommitBuilder::begin(&store, "main").await.unwrap();
        let commit = builder.commit("chore: empty").await.unwrap();

        assert_eq!(store.file(commit.sha(), "README.md").as_deref(), Some("hello\n"));
        assert!(!store
            .operations()
            .iter()
            .any(|op| matches!(op, Operation::CreateTree { .. })));
    }
}
