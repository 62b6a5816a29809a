//! Release pull request synchronization.
//!
//! One run reads the base branch, recomputes the version bump, keeps a
//! version picked in the open release pull request, regenerates the pull
//! request body and rebuilds the release branch:
//!
//! 1. resolve the base tip and read both manifests at it
//! 2. list commits since the last release and compute the bump
//! 3. read the options block of the open pull request, if any
//! 4. render title, body and manifest changes ([`ReleaseSynchronizer::plan`]);
//!    an existing body keeps its text outside the managed blocks
//! 5. build the release commit on the base commit read in step 1, then
//!    publish it
//! 6. open or update the pull request, then optionally comment
//!
//! Step 5 never resets the release branch before its replacement commit
//! exists.

mod error;
mod outcome;
mod plan;

pub use error::SyncError;
pub use outcome::SyncOutcome;
pub use plan::{FileChange, Plan, ReleasePlan};

use crate::changelog::{changelog_section, render_changelog, splice_changelog};
use crate::commit_builder::{publish, CommitBuilder};
use crate::config::SyncConfig;
use crate::debug_log::{self, DebugEntry};
use crate::manifest::{project_version, set_project_version, VersionsManifest, ROOT_PACKAGE};
use crate::metadata::extract_version;
use crate::options::{self, build_options, ParsedOptions, VersionOption, OPTIONS_END};
use crate::store::{CommitSource, ContentStore, Notifier, PullRequest};
use crate::templates::{BodyContext, TemplateRenderer};
use crate::version::{compute_bump, parse_version, BumpType, Stage};
use tracing::{debug, info, info_span, warn, Instrument};

/// Per-run input supplied by the operator.
#[derive(Debug, Clone, Default)]
pub struct SyncRequest {
    /// Explicit prerelease move. Overrides any selection in the pull request.
    pub transition: Option<Stage>,

    /// Entry appended to the debug log of the pull request body.
    pub debug_entry: Option<DebugEntry>,
}

impl SyncRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_transition(mut self, stage: Stage) -> Self {
        self.transition = Some(stage);
        self
    }

    #[must_use]
    pub fn with_debug_entry(mut self, entry: DebugEntry) -> Self {
        self.debug_entry = Some(entry);
        self
    }
}

/// Release state read from the base tip.
struct BaseState {
    current: String,
    anchor: Option<String>,
    versions: VersionsManifest,
    project_path: String,
    project: Option<String>,
}

/// Keeps the release branch and pull request in line with the base branch.
pub struct ReleaseSynchronizer<'a> {
    store: &'a dyn ContentStore,
    source: &'a dyn CommitSource,
    notifier: &'a dyn Notifier,
    config: SyncConfig,
    renderer: TemplateRenderer,
}

impl<'a> ReleaseSynchronizer<'a> {
    /// Creates a synchronizer over separate collaborators.
    pub fn new(
        store: &'a dyn ContentStore,
        source: &'a dyn CommitSource,
        notifier: &'a dyn Notifier,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            source,
            notifier,
            config,
            renderer: TemplateRenderer::new(),
        }
    }

    /// Creates a synchronizer over one backend implementing all three roles.
    pub fn with_backend<B>(backend: &'a B, config: SyncConfig) -> Self
    where
        B: ContentStore + CommitSource + Notifier,
    {
        Self::new(backend, backend, backend, config)
    }

    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Computes what a run would write without mutating anything.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] if the base branch is missing, a remote read
    /// fails, a manifest is malformed, no current version exists, the
    /// requested transition is invalid or a template fails to render.
    pub async fn plan(&self, request: &SyncRequest) -> Result<Plan, SyncError> {
        let span = info_span!(
            "plan",
            base = %self.config.base_branch(),
            branch = %self.config.release_branch()
        );
        self.plan_release(request).instrument(span).await
    }

    /// Plans and applies a run.
    ///
    /// # Returns
    ///
    /// [`SyncOutcome::NoOp`] when there is nothing to release, otherwise the
    /// created or updated pull request.
    ///
    /// # Errors
    ///
    /// Everything [`plan`](Self::plan) can return, plus any failed remote
    /// write. A failure after the commit is built but before it is published
    /// leaves every branch untouched.
    pub async fn sync(&self, request: &SyncRequest) -> Result<SyncOutcome, SyncError> {
        let span = info_span!(
            "sync",
            base = %self.config.base_branch(),
            branch = %self.config.release_branch()
        );

        async {
            match self.plan_release(request).await? {
                Plan::NoOp { reason } => {
                    info!(reason = %reason, "Nothing to release");
                    Ok(SyncOutcome::NoOp { reason })
                }
                Plan::Release(plan) => self.apply(*plan).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn plan_release(&self, request: &SyncRequest) -> Result<Plan, SyncError> {
        let base = self.config.base_branch();
        let base_sha = self.store.resolve_ref(base).await?;
        let state = self.read_base_state(&base_sha).await?;

        let mut commits = self.source.commits_since(base, state.anchor.as_deref()).await?;
        commits.retain(|commit| extract_version(&commit.message).is_none());
        info!(current = %state.current, commits = commits.len(), "Collected commits");

        if commits.is_empty() && request.transition.is_none() {
            return Ok(Plan::NoOp {
                reason: format!("no commits since v{}", state.current),
            });
        }
        let Some(bump) = compute_bump(&state.current, &commits, request.transition)? else {
            return Ok(Plan::NoOp {
                reason: format!("nothing to release on top of v{}", state.current),
            });
        };

        let existing = self
            .store
            .find_open_pull_request(self.config.release_branch())
            .await?;
        let parsed = existing.as_ref().and_then(|pr| options::parse(&pr.body));
        let kept = match request.transition {
            Some(_) => None,
            None => kept_selection(parsed.as_ref(), &bump.to, &state.current),
        };

        let (version, bump_type) = match &kept {
            Some(option) => {
                info!(selected = %option.version, computed = %bump.to, "Keeping version selected in pull request");
                (option.version.clone(), option.bump_type)
            }
            None => (bump.to.clone(), bump.bump_type),
        };

        let menu = build_options(&state.current, &bump, kept.as_ref())?;
        let block = options::render(&menu);
        let changelog = changelog_section(&render_changelog(&version, &bump.commits));
        let settings = self.config.settings();

        // An existing body keeps its prose; only the managed blocks change.
        let refreshed = existing
            .as_ref()
            .and_then(|pr| options::splice(&pr.body, &block))
            .map(|body| with_changelog(body, &changelog));
        let mut body = match refreshed {
            Some(body) => body,
            None => self.renderer.render_body(
                &settings.pr_body_template,
                &BodyContext {
                    version: &version,
                    from: &state.current,
                    bump_type: bump_type.as_str(),
                    options: &block,
                    changelog: &changelog,
                },
            )?,
        };

        let mut entries = existing
            .as_ref()
            .map(|pr| debug_log::parse(&pr.body))
            .unwrap_or_default();
        if let Some(entry) = request.debug_entry.clone() {
            entries.push(
                entry
                    .with_detail("current", &state.current)
                    .with_detail("computed", &bump.to)
                    .with_detail("effective", &version)
                    .with_detail("type", bump_type)
                    .with_detail("commits", bump.commits.len())
                    .with_detail("source", if kept.is_some() { "pull request" } else { "commits" }),
            );
        }
        if !entries.is_empty() {
            body = debug_log::write(&body, &entries);
        }

        let title = self.renderer.render_title(&settings.pr_title_format, &version)?;
        let previous_version = existing
            .as_ref()
            .and_then(|pr| advertised_version(pr, parsed.as_ref()));
        let selection_changed = match (&existing, &previous_version) {
            (Some(_), Some(previous)) => *previous != version,
            (Some(pr), None) => options::has_selection_changed(&pr.body, &body),
            (None, _) => false,
        };

        let changes = self.file_changes(state, &version)?;
        debug!(files = changes.len(), version = %version, "Planned release");

        Ok(Plan::Release(Box::new(ReleasePlan {
            base_sha,
            bump,
            version,
            bump_type,
            title,
            body,
            changes,
            existing,
            selection_changed,
            previous_version,
        })))
    }

    async fn read_base_state(&self, base_sha: &str) -> Result<BaseState, SyncError> {
        let versions_path = self.config.versions_manifest();
        let versions = match self.store.read_file(versions_path, base_sha).await? {
            Some(content) => VersionsManifest::parse(&content, versions_path)?,
            None => VersionsManifest::default(),
        };

        let root = versions.entry(ROOT_PACKAGE);
        let project_path = root
            .as_ref()
            .and_then(|entry| entry.version_file.clone())
            .unwrap_or_else(|| self.config.project_manifest().to_string());
        let project = self.store.read_file(&project_path, base_sha).await?;

        let recorded = root
            .as_ref()
            .map(|entry| entry.version.clone())
            .filter(|version| !version.is_empty());
        let current = match recorded {
            Some(version) => version,
            None => project
                .as_deref()
                .map(|content| project_version(content, &project_path))
                .transpose()?
                .flatten()
                .ok_or_else(|| SyncError::MissingVersion {
                    versions_manifest: versions_path.to_string(),
                    project_manifest: project_path.clone(),
                })?,
        };

        Ok(BaseState {
            current,
            anchor: root.and_then(|entry| entry.sha),
            versions,
            project_path,
            project,
        })
    }

    fn file_changes(&self, state: BaseState, version: &str) -> Result<Vec<FileChange>, SyncError> {
        let versions_path = self.config.versions_manifest();
        let mut versions = state.versions;
        versions.set_version(ROOT_PACKAGE, version);

        let mut changes = vec![FileChange {
            path: versions_path.to_string(),
            content: versions.to_json(versions_path)?,
        }];
        if let Some(content) = state.project.as_deref() {
            changes.push(FileChange {
                content: set_project_version(content, &state.project_path, version)?,
                path: state.project_path,
            });
        }
        Ok(changes)
    }

    async fn apply(&self, plan: ReleasePlan) -> Result<SyncOutcome, SyncError> {
        let base = self.config.base_branch();
        let branch = self.config.release_branch();

        // Build on the commit the manifests were read from, not the moving tip.
        let mut builder = CommitBuilder::begin_at(self.store, &plan.base_sha).await?;
        for change in &plan.changes {
            builder.stage(change.path.as_str(), change.content.as_str());
        }
        let commit = builder.commit(&plan.commit_message()).await?;
        // Force: the branch is rebuilt from the base every run.
        let sha = publish(self.store, commit, branch, true).await?;
        info!(sha = %sha, version = %plan.version, "Release branch updated");

        match plan.existing {
            None => {
                let pr = self
                    .store
                    .create_pull_request(&plan.title, branch, base, &plan.body)
                    .await?;
                info!(number = pr.number, url = %pr.url, "Opened release pull request");
                Ok(SyncOutcome::Created {
                    number: pr.number,
                    url: pr.url,
                    version: plan.version,
                })
            }
            Some(pr) => {
                self.store
                    .update_pull_request(pr.number, &plan.title, &plan.body)
                    .await?;
                info!(number = pr.number, "Updated release pull request");

                if plan.selection_changed && self.config.settings().notify {
                    self.notify_change(&pr, plan.previous_version.as_deref(), &plan.version)
                        .await;
                }
                Ok(SyncOutcome::Updated {
                    number: pr.number,
                    url: pr.url,
                    version: plan.version,
                    selection_changed: plan.selection_changed,
                })
            }
        }
    }

    async fn notify_change(&self, pr: &PullRequest, previous: Option<&str>, version: &str) {
        let text = match previous {
            Some(previous) => format!("Release version changed from v{previous} to v{version}."),
            None => format!("Release version changed to v{version}."),
        };
        if let Err(e) = self.notifier.notify(pr.number, &text).await {
            warn!(number = pr.number, error = %e, "Failed to post version change comment");
        }
    }
}

/// Returns the selection of the pull request if it should replace the
/// recomputed `target`.
///
/// The selection must differ from `target`, be either a checked alternative
/// or a stage transition, and still lie ahead of `current`. A plain bump
/// left over from an earlier run loses to the recomputed one.
fn kept_selection(parsed: Option<&ParsedOptions>, target: &str, current: &str) -> Option<VersionOption> {
    let parsed = parsed?;
    let selected = parsed.selected.as_ref()?;
    if selected.version == target {
        return None;
    }
    if !parsed.is_user_choice() && selected.bump_type != BumpType::Transition {
        return None;
    }

    let ahead = match (parse_version(&selected.version), parse_version(current)) {
        (Ok(selected), Ok(current)) => selected > current,
        _ => false,
    };
    if !ahead {
        warn!(selected = %selected.version, current, "Ignoring selection that is not ahead of the current version");
        return None;
    }
    Some(selected.clone())
}

/// Replaces the changelog section of `body`. A body without one gets the
/// section right after the options block.
fn with_changelog(body: String, section: &str) -> String {
    if let Some(spliced) = splice_changelog(&body, section) {
        return spliced;
    }
    match body.find(OPTIONS_END) {
        Some(start) => {
            let at = start + OPTIONS_END.len();
            format!("{}\n\n{section}{}", &body[..at], &body[at..])
        }
        None => body,
    }
}

/// Version the pull request advertised: its title first, then the current
/// line of its options block.
fn advertised_version(pr: &PullRequest, parsed: Option<&ParsedOptions>) -> Option<String> {
    extract_version(&pr.title).or_else(|| {
        parsed
            .and_then(|p| p.current.as_ref())
            .map(|option| option.version.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(options: Vec<VersionOption>, checked: Option<usize>) -> ParsedOptions {
        let current = options.first().cloned();
        let selected = checked.map(|i| options[i].clone()).or_else(|| current.clone());
        ParsedOptions {
            options,
            selected,
            current,
        }
    }

    fn stable_menu() -> Vec<VersionOption> {
        vec![
            VersionOption::new("1.3.0", BumpType::Minor, "minor").selected(),
            VersionOption::new("1.3.0-alpha.0", BumpType::Transition, "alpha"),
        ]
    }

    #[test]
    fn keeps_checked_alternative() {
        let parsed = parsed(stable_menu(), Some(1));

        let kept = kept_selection(Some(&parsed), "1.3.0", "1.2.0").unwrap();
        assert_eq!(kept.version, "1.3.0-alpha.0");
    }

    #[test]
    fn recomputed_bump_replaces_stale_status_quo() {
        let parsed = parsed(
            vec![VersionOption::new("1.2.1", BumpType::Patch, "patch").selected()],
            None,
        );

        assert_eq!(kept_selection(Some(&parsed), "1.3.0", "1.2.0"), None);
    }

    #[test]
    fn keeps_transition_status_quo() {
        let parsed = parsed(
            vec![VersionOption::new("1.3.0-alpha.0", BumpType::Transition, "alpha").selected()],
            None,
        );

        let kept = kept_selection(Some(&parsed), "1.3.0", "1.2.0").unwrap();
        assert_eq!(kept.version, "1.3.0-alpha.0");
    }

    #[test]
    fn ignores_selection_behind_current() {
        let parsed = parsed(stable_menu(), Some(1));

        assert_eq!(kept_selection(Some(&parsed), "1.3.1", "1.3.0"), None);
    }

    #[test]
    fn no_pull_request_keeps_nothing() {
        assert_eq!(kept_selection(None, "1.3.0", "1.2.0"), None);
    }

    #[test]
    fn changelog_is_replaced_in_place() {
        let old = changelog_section("## 1.3.0\n\nNo changes.");
        let new = changelog_section("## 1.4.0\n\nNo changes.");
        let body = format!("Note.\n\n{OPTIONS_END}\n\n{old}\n\nSigned off.\n");

        assert_eq!(
            with_changelog(body, &new),
            format!("Note.\n\n{OPTIONS_END}\n\n{new}\n\nSigned off.\n")
        );
    }

    #[test]
    fn missing_changelog_goes_after_options() {
        let new = changelog_section("## 1.4.0\n\nNo changes.");
        let body = format!("Note.\n\n{OPTIONS_END}\n\nSigned off.\n");

        assert_eq!(
            with_changelog(body, &new),
            format!("Note.\n\n{OPTIONS_END}\n\n{new}\n\nSigned off.\n")
        );
    }

    #[test]
    fn advertised_version_prefers_title() {
        let pr = PullRequest {
            number: 1,
            url: String::new(),
            title: "chore: release v1.3.0".to_string(),
            branch: "pls-release".to_string(),
            body: String::new(),
        };
        assert_eq!(advertised_version(&pr, None), Some("1.3.0".to_string()));

        let custom = PullRequest {
            title: "Release".to_string(),
            ..pr
        };
        let parsed = parsed(stable_menu(), Some(1));
        assert_eq!(advertised_version(&custom, Some(&parsed)), Some("1.3.0".to_string()));
    }
}
