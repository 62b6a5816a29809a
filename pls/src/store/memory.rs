//! In-process store used by tests and local experiments.
//!
//! Objects get sequential ids rather than content hashes; trees are flat
//! `path -> blob` maps. Every mutating call is recorded as an [`Operation`]
//! so callers can assert on ordering.

use super::{commits_after_release, Commit, CommitSource, ContentStore, Notifier, PullRequest, StoreError, TreeEntry};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A mutating call observed by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateBlob { sha: String },
    CreateTree { sha: String, base_tree: String },
    CreateCommit { sha: String, parents: Vec<String> },
    UpdateRef { branch: String, sha: String, force: bool },
    CreatePullRequest { number: u64 },
    UpdatePullRequest { number: u64 },
    Notify { number: u64 },
}

#[derive(Debug, Clone)]
struct StoredCommit {
    tree: String,
    parents: Vec<String>,
    message: String,
    author: String,
    date: String,
}

#[derive(Debug, Default)]
struct State {
    next_object: u64,
    next_pull_request: u64,
    refs: BTreeMap<String, String>,
    blobs: HashMap<String, String>,
    trees: HashMap<String, BTreeMap<String, String>>,
    commits: HashMap<String, StoredCommit>,
    pull_requests: Vec<PullRequest>,
    comments: Vec<(u64, String)>,
    operations: Vec<Operation>,
    failing: Vec<String>,
}

impl State {
    fn object_id(&mut self) -> String {
        self.next_object += 1;
        format!("{:040x}", self.next_object)
    }

    fn fail_if(&self, operation: &str) -> Result<(), StoreError> {
        if self.failing.iter().any(|f| f == operation) {
            return Err(StoreError::remote(operation, Some(500), "injected failure"));
        }
        Ok(())
    }

    fn resolve(&self, reference: &str) -> Option<String> {
        self.refs
            .get(reference)
            .cloned()
            .or_else(|| self.commits.contains_key(reference).then(|| reference.to_string()))
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> bool {
        let mut pending = vec![descendant.to_string()];
        while let Some(sha) = pending.pop() {
            if sha == ancestor {
                return true;
            }
            if let Some(commit) = self.commits.get(&sha) {
                pending.extend(commit.parents.iter().cloned());
            }
        }
        false
    }

    fn insert_commit(&mut self, tree: String, parents: Vec<String>, message: &str) -> String {
        let sha = self.object_id();
        self.commits.insert(
            sha.clone(),
            StoredCommit {
                tree,
                parents,
                message: message.to_string(),
                author: "pls".to_string(),
                date: chrono::Utc::now().to_rfc3339(),
            },
        );
        sha
    }
}

/// A [`ContentStore`], [`CommitSource`] and [`Notifier`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates `branch` with a root commit holding `files`. Returns the sha.
    pub fn seed_branch(&self, branch: &str, message: &str, files: &[(&str, &str)]) -> String {
        let mut state = self.state();
        let mut tree = BTreeMap::new();
        for (path, content) in files {
            let blob = state.object_id();
            state.blobs.insert(blob.clone(), (*content).to_string());
            tree.insert((*path).to_string(), blob);
        }
        let tree_sha = state.object_id();
        state.trees.insert(tree_sha.clone(), tree);
        let sha = state.insert_commit(tree_sha, Vec::new(), message);
        state.refs.insert(branch.to_string(), sha.clone());
        sha
    }

    /// Adds a commit with an unchanged tree on top of `branch`.
    ///
    /// # Panics
    ///
    /// Panics if `branch` was never seeded.
    pub fn seed_commit(&self, branch: &str, message: &str) -> String {
        let mut state = self.state();
        let parent = state.refs[branch].clone();
        let tree = state.commits[&parent].tree.clone();
        let sha = state.insert_commit(tree, vec![parent], message);
        state.refs.insert(branch.to_string(), sha.clone());
        sha
    }

    /// Adds a commit on top of `branch` that replaces `files` and inherits
    /// every other path. Returns the sha.
    ///
    /// # Panics
    ///
    /// Panics if `branch` was never seeded.
    pub fn seed_change(&self, branch: &str, message: &str, files: &[(&str, &str)]) -> String {
        let mut state = self.state();
        let parent = state.refs[branch].clone();
        let mut tree = state.trees[&state.commits[&parent].tree].clone();
        for (path, content) in files {
            let blob = state.object_id();
            state.blobs.insert(blob.clone(), (*content).to_string());
            tree.insert((*path).to_string(), blob);
        }
        let tree_sha = state.object_id();
        state.trees.insert(tree_sha.clone(), tree);
        let sha = state.insert_commit(tree_sha, vec![parent], message);
        state.refs.insert(branch.to_string(), sha.clone());
        sha
    }

    /// Opens a pull request without recording an operation.
    pub fn seed_pull_request(&self, branch: &str, title: &str, body: &str) -> u64 {
        let mut state = self.state();
        state.next_pull_request += 1;
        let number = state.next_pull_request;
        state.pull_requests.push(PullRequest {
            number,
            url: format!("https://example.test/pull/{number}"),
            title: title.to_string(),
            branch: branch.to_string(),
            body: body.to_string(),
        });
        number
    }

    /// Makes every later call of `operation` (for example `"create_tree"`)
    /// fail with a remote error.
    pub fn fail_on(&self, operation: &str) {
        self.state().failing.push(operation.to_string());
    }

    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        self.state().operations.clone()
    }

    #[must_use]
    pub fn pull_requests(&self) -> Vec<PullRequest> {
        self.state().pull_requests.clone()
    }

    #[must_use]
    pub fn comments(&self) -> Vec<(u64, String)> {
        self.state().comments.clone()
    }

    #[must_use]
    pub fn head(&self, branch: &str) -> Option<String> {
        self.state().refs.get(branch).cloned()
    }

    /// Returns the content of `path` at a branch or commit.
    #[must_use]
    pub fn file(&self, reference: &str, path: &str) -> Option<String> {
        let state = self.state();
        let sha = state.resolve(reference)?;
        let tree = state.trees.get(&state.commits.get(&sha)?.tree)?;
        state.blobs.get(tree.get(path)?).cloned()
    }

    #[must_use]
    pub fn commit_message(&self, sha: &str) -> Option<String> {
        self.state().commits.get(sha).map(|c| c.message.clone())
    }

    #[must_use]
    pub fn commit_parents(&self, sha: &str) -> Vec<String> {
        self.state()
            .commits
            .get(sha)
            .map(|c| c.parents.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn resolve_ref(&self, branch: &str) -> Result<String, StoreError> {
        let state = self.state();
        state.fail_if("resolve_ref")?;
        state
            .refs
            .get(branch)
            .cloned()
            .ok_or_else(|| StoreError::ref_not_found(format!("heads/{branch}")))
    }

    async fn commit_tree(&self, commit_sha: &str) -> Result<String, StoreError> {
        let state = self.state();
        state.fail_if("commit_tree")?;
        state
            .commits
            .get(commit_sha)
            .map(|c| c.tree.clone())
            .ok_or_else(|| StoreError::remote("commit_tree", Some(404), format!("no commit {commit_sha}")))
    }

    async fn read_file(&self, path: &str, reference: &str) -> Result<Option<String>, StoreError> {
        self.state().fail_if("read_file")?;
        Ok(self.file(reference, path))
    }

    async fn create_blob(&self, content: &str) -> Result<String, StoreError> {
        let mut state = self.state();
        state.fail_if("create_blob")?;
        let sha = state.object_id();
        state.blobs.insert(sha.clone(), content.to_string());
        state.operations.push(Operation::CreateBlob { sha: sha.clone() });
        Ok(sha)
    }

    async fn create_tree(&self, base_tree: &str, entries: &[TreeEntry]) -> Result<String, StoreError> {
        let mut state = self.state();
        state.fail_if("create_tree")?;
        let mut tree = state
            .trees
            .get(base_tree)
            .cloned()
            .ok_or_else(|| StoreError::remote("create_tree", Some(422), format!("no tree {base_tree}")))?;
        for entry in entries {
            if !state.blobs.contains_key(&entry.blob_sha) {
                return Err(StoreError::remote(
                    "create_tree",
                    Some(422),
                    format!("no blob {}", entry.blob_sha),
                ));
            }
            tree.insert(entry.path.clone(), entry.blob_sha.clone());
        }
        let sha = state.object_id();
        state.trees.insert(sha.clone(), tree);
        state.operations.push(Operation::CreateTree {
            sha: sha.clone(),
            base_tree: base_tree.to_string(),
        });
        Ok(sha)
    }

    async fn create_commit(
        &self,
        message: &str,
        tree: &str,
        parents: &[String],
    ) -> Result<String, StoreError> {
        let mut state = self.state();
        state.fail_if("create_commit")?;
        if !state.trees.contains_key(tree) {
            return Err(StoreError::remote("create_commit", Some(422), format!("no tree {tree}")));
        }
        let sha = state.insert_commit(tree.to_string(), parents.to_vec(), message);
        state.operations.push(Operation::CreateCommit {
            sha: sha.clone(),
            parents: parents.to_vec(),
        });
        Ok(sha)
    }

    async fn update_ref(&self, branch: &str, sha: &str, force: bool) -> Result<(), StoreError> {
        let mut state = self.state();
        state.fail_if("update_ref")?;
        if !state.commits.contains_key(sha) {
            return Err(StoreError::remote("update_ref", Some(422), "Object does not exist"));
        }
        if let Some(current) = state.refs.get(branch) {
            if !force && !state.is_ancestor(current, sha) {
                return Err(StoreError::remote("update_ref", Some(422), "Update is not a fast forward"));
            }
        }
        state.refs.insert(branch.to_string(), sha.to_string());
        state.operations.push(Operation::UpdateRef {
            branch: branch.to_string(),
            sha: sha.to_string(),
            force,
        });
        Ok(())
    }

    async fn find_open_pull_request(&self, head_branch: &str) -> Result<Option<PullRequest>, StoreError> {
        let state = self.state();
        state.fail_if("find_open_pull_request")?;
        Ok(state.pull_requests.iter().find(|pr| pr.branch == head_branch).cloned())
    }

    async fn create_pull_request(
        &self,
        title: &str,
        head: &str,
        _base: &str,
        body: &str,
    ) -> Result<PullRequest, StoreError> {
        self.state().fail_if("create_pull_request")?;
        let number = self.seed_pull_request(head, title, body);
        let mut state = self.state();
        state.operations.push(Operation::CreatePullRequest { number });
        Ok(state.pull_requests[state.pull_requests.len() - 1].clone())
    }

    async fn update_pull_request(&self, number: u64, title: &str, body: &str) -> Result<(), StoreError> {
        let mut state = self.state();
        state.fail_if("update_pull_request")?;
        let pr = state
            .pull_requests
            .iter_mut()
            .find(|pr| pr.number == number)
            .ok_or_else(|| StoreError::remote("update_pull_request", Some(404), format!("no pull request #{number}")))?;
        pr.title = title.to_string();
        pr.body = body.to_string();
        state.operations.push(Operation::UpdatePullRequest { number });
        Ok(())
    }
}

#[async_trait]
impl CommitSource for MemoryStore {
    async fn commits_since(&self, branch: &str, since: Option<&str>) -> Result<Vec<Commit>, StoreError> {
        let state = self.state();
        state.fail_if("commits_since")?;
        let mut cursor = state.refs.get(branch).cloned();
        let mut history = Vec::new();
        while let Some(sha) = cursor {
            let Some(stored) = state.commits.get(&sha) else {
                break;
            };
            history.push(Commit::new(sha.clone(), stored.message.clone()).with_author(stored.author.clone(), stored.date.clone()));
            cursor = stored.parents.first().cloned();
        }
        Ok(commits_after_release(history, since))
    }
}

#[async_trait]
impl Notifier for MemoryStore {
    async fn notify(&self, pr_number: u64, text: &str) -> Result<(), StoreError> {
        let mut state = self.state();
        state.fail_if("notify")?;
        state.comments.push((pr_number, text.to_string()));
        state.operations.push(Operation::Notify { number: pr_number });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trees_inherit_unchanged_paths() {
        let store = MemoryStore::new();
        let base = store.seed_branch("main", "chore: init", &[("a.txt", "a"), ("b.txt", "b")]);
        let base_tree = store.commit_tree(&base).await.unwrap();

        let blob = store.create_blob("b2").await.unwrap();
        let tree = store
            .create_tree(
                &base_tree,
                &[TreeEntry {
                    path: "b.txt".to_string(),
                    blob_sha: blob,
                }],
            )
            .await
            .unwrap();
        let commit = store.create_commit("change b", &tree, &[base]).await.unwrap();

        assert_eq!(store.file(&commit, "a.txt").as_deref(), Some("a"));
        assert_eq!(store.file(&commit, "b.txt").as_deref(), Some("b2"));
        assert_eq!(store.file("main", "b.txt").as_deref(), Some("b"));
    }

    #[test]
    fn seeded_change_inherits_other_paths() {
        let store = MemoryStore::new();
        let base = store.seed_branch("main", "chore: init", &[("a.txt", "a"), ("b.txt", "b")]);
        let sha = store.seed_change("main", "feat: edit b", &[("b.txt", "b2")]);

        assert_eq!(store.head("main"), Some(sha.clone()));
        assert_eq!(store.commit_parents(&sha), vec![base.clone()]);
        assert_eq!(store.file("main", "a.txt").as_deref(), Some("a"));
        assert_eq!(store.file("main", "b.txt").as_deref(), Some("b2"));
        assert_eq!(store.file(&base, "b.txt").as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn rejects_non_fast_forward_without_force() {
        let store = MemoryStore::new();
        store.seed_branch("main", "chore: init", &[]);
        let other = store.seed_branch("other", "chore: other root", &[]);

        let result = store.update_ref("main", &other, false).await;
        assert!(matches!(result, Err(StoreError::Remote { status: Some(422), .. })));

        store.update_ref("main", &other, true).await.unwrap();
        assert_eq!(store.head("main"), Some(other));
    }

    #[tokio::test]
    async fn missing_branch_is_ref_not_found() {
        let store = MemoryStore::new();
        let result = store.resolve_ref("main").await;
        assert!(matches!(result, Err(StoreError::RefNotFound { .. })));
    }

    #[tokio::test]
    async fn lists_commits_since_last_release() {
        let store = MemoryStore::new();
        store.seed_branch("main", "chore: release v1.0.0", &[]);
        store.seed_commit("main", "feat: add X");
        store.seed_commit("main", "fix: y");

        let commits = store.commits_since("main", None).await.unwrap();
        let messages: Vec<_> = commits.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, ["feat: add X", "fix: y"]);
    }

    #[tokio::test]
    async fn injected_failures_surface_as_remote_errors() {
        let store = MemoryStore::new();
        store.fail_on("create_blob");
        let result = store.create_blob("x").await;
        assert!(matches!(result, Err(StoreError::Remote { .. })));
    }
}
