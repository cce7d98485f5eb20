//! This module defines the `VoteLedger`, the only entry point allowed to move
//! vote counters.
//!
//! Each cast is delegated to the repository as one atomic unit per target. A
//! lost uniqueness race is resolved by re-running the cast, which re-reads the
//! stored vote and lands on the toggle-off or switch branch instead of
//! creating a second vote.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use curation_repository::{VoteRepository, VoteRepositoryError};
use curation_shared::types::{
    CounterDrift, TargetId, TargetKind, UserId, VoteDirection, VoteOutcome, VotesCount,
};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, instrument, warn};

use crate::errors::CoreError;

/// Default number of retries after a uniqueness race.
const DEFAULT_CONFLICT_RETRIES: usize = 3;

/// Default multiplier, in milliseconds, for the retry backoff.
const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 5;

/// Retry behaviour of the `VoteLedger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteLedgerConfig {
    /// How many times a cast is re-run after losing a uniqueness race.
    pub conflict_retries: usize,
    /// Backoff multiplier in milliseconds. The nth retry waits about `2^n` times this.
    pub retry_base_delay_ms: u64,
}

impl Default for VoteLedgerConfig {
    fn default() -> Self {
        Self {
            conflict_retries: DEFAULT_CONFLICT_RETRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
        }
    }
}

/// Casts votes and reads vote state on behalf of the request layer.
pub struct VoteLedger {
    repository: Arc<dyn VoteRepository>,
    config: VoteLedgerConfig,
}

impl VoteLedger {
    /// Creates a new `VoteLedger` with the default retry configuration.
    pub fn new(repository: Arc<dyn VoteRepository>) -> Self {
        Self::with_config(repository, VoteLedgerConfig::default())
    }

    pub fn with_config(repository: Arc<dyn VoteRepository>, config: VoteLedgerConfig) -> Self {
        Self { repository, config }
    }

    /// Casts a vote given the wire `voteType` string.
    ///
    /// # Arguments
    ///
    /// * `voter_id` - The authenticated user casting the vote
    /// * `target_id` - The website or comment being voted on
    /// * `kind` - The kind of `target_id`
    /// * `vote_type` - `"upvote"` or `"downvote"`
    ///
    /// # Returns
    ///
    /// * `Ok(VoteOutcome)` - The target's counters and the voter's resulting vote
    /// * `Err(CoreError::InvalidVoteType)` - `vote_type` is not a known direction
    /// * `Err(CoreError::TargetNotFound)` - The target does not exist
    /// * `Err(CoreError::VoteConflict)` - A uniqueness race outlived every retry
    pub async fn cast_vote(
        &self,
        voter_id: UserId,
        target_id: TargetId,
        kind: TargetKind,
        vote_type: &str,
    ) -> Result<VoteOutcome, CoreError> {
        let direction = vote_type.parse::<VoteDirection>()?;
        self.cast(voter_id, target_id, kind, direction).await
    }

    /// Casts a vote in an already-parsed direction.
    ///
    /// Exactly one ledger mutation and one counter mutation are committed per
    /// successful call. Failed attempts commit nothing.
    #[instrument(skip_all, fields(voter_id = %voter_id, target_id = %target_id, kind = %kind))]
    pub async fn cast(
        &self,
        voter_id: UserId,
        target_id: TargetId,
        kind: TargetKind,
        direction: VoteDirection,
    ) -> Result<VoteOutcome, CoreError> {
        let retry = ExponentialBackoff::from_millis(2)
            .factor(self.config.retry_base_delay_ms.max(1))
            .max_delay(Duration::from_millis(250))
            .map(jitter)
            .take(self.config.conflict_retries);

        let outcome = RetryIf::start(
            retry,
            || self.repository.cast_vote(voter_id, target_id, kind, direction),
            |e: &VoteRepositoryError| {
                let retryable = e.is_retryable();
                if retryable {
                    warn!(error = %e, "Vote raced a concurrent insert, re-reading state");
                }
                retryable
            },
        )
        .await?;

        info!(
            direction = %direction,
            upvotes = outcome.upvotes,
            downvotes = outcome.downvotes,
            user_vote = ?outcome.user_vote,
            "Vote recorded"
        );
        Ok(outcome)
    }

    /// Annotates a batch of targets with the voter's own vote.
    ///
    /// Issues a single repository read regardless of the batch size. Every
    /// requested target appears in the result, mapped to `None` when the voter
    /// has not voted on it.
    pub async fn get_user_votes(
        &self,
        voter_id: UserId,
        kind: TargetKind,
        target_ids: &[TargetId],
    ) -> Result<HashMap<TargetId, Option<VoteDirection>>, CoreError> {
        if target_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut user_votes: HashMap<TargetId, Option<VoteDirection>> =
            target_ids.iter().map(|id| (*id, None)).collect();
        let unique_ids: Vec<TargetId> = user_votes.keys().copied().collect();

        let votes = self
            .repository
            .get_user_votes(voter_id, kind, &unique_ids)
            .await?;
        for vote in votes {
            user_votes.insert(vote.target_id, Some(vote.direction));
        }
        Ok(user_votes)
    }

    /// Returns the stored counters of a target.
    pub async fn votes_count(
        &self,
        kind: TargetKind,
        target_id: TargetId,
    ) -> Result<VotesCount, CoreError> {
        Ok(self.repository.get_votes_count(kind, target_id).await?)
    }

    /// Lists targets whose counters disagree with the ledger, without changing anything.
    pub async fn audit_counters(&self, kind: TargetKind) -> Result<Vec<CounterDrift>, CoreError> {
        let drifts = self.repository.find_counter_drift(kind).await?;
        if !drifts.is_empty() {
            warn!(kind = %kind, drifted = drifts.len(), "Counter drift detected");
        }
        Ok(drifts)
    }

    /// Offline repair: rewrites drifted counters from the vote ledger.
    ///
    /// Counts are recomputed at repair time, so votes cast after the audit are
    /// kept. Returns each repaired drift with `expected` set to the written
    /// counters.
    pub async fn repair_counters(&self, kind: TargetKind) -> Result<Vec<CounterDrift>, CoreError> {
        let drifts = self.audit_counters(kind).await?;
        let written = self.repository.repair_counter_drift(&drifts).await?;

        let repaired: Vec<CounterDrift> = drifts
            .into_iter()
            .filter_map(|drift| {
                written
                    .iter()
                    .find(|count| count.target_id == drift.stored.target_id)
                    .map(|count| CounterDrift {
                        stored: drift.stored,
                        expected: *count,
                    })
            })
            .collect();
        info!(kind = %kind, repaired = repaired.len(), "Counters reconciled with the vote ledger");
        Ok(repaired)
    }
}
