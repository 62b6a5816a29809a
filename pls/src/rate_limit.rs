//! GitHub core API budget guard.
//!
//! [`GitHubStore`](crate::store::GitHubStore) checks the core budget before
//! each mutating call group and sleeps until the window resets when only a
//! handful of requests remain.

use octocrab::Octocrab;
use std::time::Duration;
use tracing::{info, warn};

/// Maximum time to wait for rate limit reset (1 hour).
const MAX_WAIT_SECS: u64 = 3600;

/// Minimum remaining requests before proactively waiting.
const MIN_REMAINING_THRESHOLD: u32 = 5;

/// Core API budget of the authenticated client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreBudget {
    /// Requests remaining in the current window.
    pub remaining: u32,

    /// Unix timestamp when the window resets.
    pub reset: u64,

    /// Total requests allowed per window.
    pub limit: u32,
}

/// Fetches the current core budget.
///
/// # Errors
///
/// Returns an error if the rate limit API call fails.
pub async fn fetch_core_budget(octocrab: &Octocrab) -> Result<CoreBudget, octocrab::Error> {
    let rate_limit = octocrab.ratelimit().get().await?;
    let core = &rate_limit.resources.core;

    Ok(CoreBudget {
        remaining: u32::try_from(core.remaining).unwrap_or(u32::MAX),
        reset: core.reset,
        limit: u32::try_from(core.limit).unwrap_or(u32::MAX),
    })
}

/// Returns how long to wait before spending more of `budget`, given the
/// current unix time `now`.
///
/// # Returns
///
/// `None` when enough requests remain or the window already reset. Waits are
/// capped at one hour.
#[must_use]
pub fn wait_for_budget(budget: &CoreBudget, now: u64) -> Option<Duration> {
    if budget.remaining >= MIN_REMAINING_THRESHOLD || budget.reset <= now {
        return None;
    }

    let wait_secs = budget.reset - now;
    if wait_secs > MAX_WAIT_SECS {
        warn!(
            wait_secs,
            max_wait = MAX_WAIT_SECS,
            "Rate limit reset too far in future, capping wait time"
        );
    }
    Some(Duration::from_secs(wait_secs.min(MAX_WAIT_SECS)))
}

/// Waits for the core budget to recover if it is nearly exhausted.
///
/// # Errors
///
/// Returns an error if the rate limit check fails.
pub async fn guard_core_budget(octocrab: &Octocrab) -> Result<(), octocrab::Error> {
    let budget = fetch_core_budget(octocrab).await?;
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    if let Some(wait) = wait_for_budget(&budget, now) {
        info!(
            remaining = budget.remaining,
            wait_secs = wait.as_secs(),
            "Rate limit low, waiting for reset"
        );
        tokio::time::sleep(wait).await;
    }
    Ok(())
}
