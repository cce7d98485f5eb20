//! This module defines the `VoteRepository` trait, which provides an interface
//! to the vote ledger and the counters projected onto votable entities.
use crate::errors::VoteRepositoryError;
use curation_shared::types::{
    CounterDrift, TargetId, TargetKind, UserId, Vote, VoteDirection, VoteOutcome, VotesCount,
};

/// A trait that defines the interface for interacting with the vote ledger.
///
/// Implementors must keep every target's counters equal to the number of ledger
/// records per direction. Counters move only through `cast_vote`, except for
/// the offline `repair_counter_drift`.
#[async_trait::async_trait]
pub trait VoteRepository: Send + Sync {
    /// Casts a vote as a single atomic unit per target.
    ///
    /// Reads the voter's current vote, plans the `VoteTransition`, applies the
    /// ledger mutation and the paired counter delta, and returns the new tally.
    /// Concurrent casts on the same target are serialized.
    ///
    /// # Arguments
    ///
    /// * `voter_id` - The user casting the vote
    /// * `target_id` - The voted entity
    /// * `kind` - Whether the entity is a website or a comment
    /// * `direction` - The requested direction
    ///
    /// # Returns
    ///
    /// * `Ok(VoteOutcome)` - Counters after the cast and the voter's resulting vote
    /// * `Err(VoteRepositoryError::TargetNotFound)` - The entity does not exist
    /// * `Err(VoteRepositoryError::DuplicateVote)` - Lost a uniqueness race; safe to retry
    async fn cast_vote(
        &self,
        voter_id: UserId,
        target_id: TargetId,
        kind: TargetKind,
        direction: VoteDirection,
    ) -> Result<VoteOutcome, VoteRepositoryError>;

    /// Retrieves the voter's votes on a batch of targets in one read.
    ///
    /// Targets without a vote are simply absent from the result.
    async fn get_user_votes(
        &self,
        voter_id: UserId,
        kind: TargetKind,
        target_ids: &[TargetId],
    ) -> Result<Vec<Vote>, VoteRepositoryError>;

    /// Retrieves the stored counters of a single target.
    async fn get_votes_count(
        &self,
        kind: TargetKind,
        target_id: TargetId,
    ) -> Result<VotesCount, VoteRepositoryError>;

    /// Lists every target of `kind` whose counters disagree with the ledger.
    async fn find_counter_drift(&self, kind: TargetKind) -> Result<Vec<CounterDrift>, VoteRepositoryError>;

    /// Rewrites the counters of the drifted targets from the ledger, in one transaction.
    ///
    /// Counts are recomputed under the same per-target lock `cast_vote` takes,
    /// so votes committed after the audit are kept. The `expected` side of
    /// each drift is not trusted. Targets deleted since the audit are skipped.
    ///
    /// Returns the counters as written. This is an offline repair tool and
    /// must not be used in the request path.
    async fn repair_counter_drift(
        &self,
        drifts: &[CounterDrift],
    ) -> Result<Vec<VotesCount>, VoteRepositoryError>;

    /// Checks that the ledger and target tables exist.
    async fn check_tables_created(&self) -> Result<bool, VoteRepositoryError>;
}
