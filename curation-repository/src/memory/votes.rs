use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use curation_shared::types::{
    CounterDrift, TargetId, TargetKind, UserId, Vote, VoteDirection, VoteOutcome, VoteTransition,
    VotesCount,
};
use tokio::sync::Mutex;

use crate::{VoteRepository, VoteRepositoryError};

type VoteKey = (UserId, TargetId, TargetKind);

#[derive(Default)]
struct LedgerState {
    targets: HashMap<(TargetKind, TargetId), VotesCount>,
    votes: HashMap<VoteKey, Vote>,
}

/// Vote repository held entirely in memory.
///
/// The whole read-plan-write sequence of a cast runs under one lock, which
/// gives the same all-or-nothing behaviour as the PostgreSQL transaction.
#[derive(Default)]
pub struct InMemoryVoteRepository {
    state: Mutex<LedgerState>,
    pending_conflicts: AtomicUsize,
}

impl InMemoryVoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a votable entity with initial counters.
    pub async fn insert_target(&self, kind: TargetKind, id: TargetId, upvotes: i64, downvotes: i64) {
        let mut state = self.state.lock().await;
        state
            .targets
            .insert((kind, id), VotesCount::new(id, kind, upvotes, downvotes));
    }

    /// Overwrites a target's counters without touching the ledger.
    pub async fn set_counters(&self, kind: TargetKind, id: TargetId, upvotes: i64, downvotes: i64) {
        self.insert_target(kind, id, upvotes, downvotes).await;
    }

    /// Every ledger record on the given target.
    pub async fn votes_on(&self, kind: TargetKind, target_id: TargetId) -> Vec<Vote> {
        let state = self.state.lock().await;
        state
            .votes
            .values()
            .filter(|v| v.target_kind == kind && v.target_id == target_id)
            .cloned()
            .collect()
    }

    /// Makes the next `count` casts fail with `DuplicateVote` before touching state,
    /// as if another request had won the insert race.
    pub fn inject_conflicts(&self, count: usize) {
        self.pending_conflicts.store(count, Ordering::SeqCst);
    }

    fn take_conflict(&self) -> bool {
        self.pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn ledger_count(state: &LedgerState, kind: TargetKind, target_id: TargetId) -> VotesCount {
        let mut count = VotesCount::new(target_id, kind, 0, 0);
        for vote in state
            .votes
            .values()
            .filter(|v| v.target_kind == kind && v.target_id == target_id)
        {
            match vote.direction {
                VoteDirection::Upvote => count.upvotes += 1,
                VoteDirection::Downvote => count.downvotes += 1,
            }
        }
        count
    }
}

#[async_trait]
impl VoteRepository for InMemoryVoteRepository {
    async fn cast_vote(
        &self,
        voter_id: UserId,
        target_id: TargetId,
        kind: TargetKind,
        direction: VoteDirection,
    ) -> Result<VoteOutcome, VoteRepositoryError> {
        let mut state = self.state.lock().await;

        if !state.targets.contains_key(&(kind, target_id)) {
            return Err(VoteRepositoryError::TargetNotFound {
                kind,
                id: target_id,
            });
        }
        if self.take_conflict() {
            return Err(VoteRepositoryError::DuplicateVote {
                voter_id,
                target_id,
                kind,
            });
        }

        let key = (voter_id, target_id, kind);
        let existing = state.votes.get(&key).map(|v| v.direction);
        let transition = VoteTransition::plan(existing, direction);

        match transition {
            VoteTransition::Create(direction) | VoteTransition::Switch { to: direction, .. } => {
                state.votes.insert(
                    key,
                    Vote {
                        voter_id,
                        target_id,
                        target_kind: kind,
                        direction,
                        voted_at: Utc::now(),
                    },
                );
            }
            VoteTransition::Remove(_) => {
                state.votes.remove(&key);
            }
        }

        let count = state
            .targets
            .get_mut(&(kind, target_id))
            .ok_or(VoteRepositoryError::TargetNotFound {
                kind,
                id: target_id,
            })?;
        count.apply(transition.delta());

        Ok(count.outcome(transition.resulting_vote()))
    }

    async fn get_user_votes(
        &self,
        voter_id: UserId,
        kind: TargetKind,
        target_ids: &[TargetId],
    ) -> Result<Vec<Vote>, VoteRepositoryError> {
        let state = self.state.lock().await;
        Ok(target_ids
            .iter()
            .filter_map(|target_id| state.votes.get(&(voter_id, *target_id, kind)).cloned())
            .collect())
    }

    async fn get_votes_count(
        &self,
        kind: TargetKind,
        target_id: TargetId,
    ) -> Result<VotesCount, VoteRepositoryError> {
        let state = self.state.lock().await;
        state
            .targets
            .get(&(kind, target_id))
            .copied()
            .ok_or(VoteRepositoryError::TargetNotFound {
                kind,
                id: target_id,
            })
    }

    async fn find_counter_drift(
        &self,
        kind: TargetKind,
    ) -> Result<Vec<CounterDrift>, VoteRepositoryError> {
        let state = self.state.lock().await;
        let mut drifts: Vec<CounterDrift> = state
            .targets
            .values()
            .filter(|stored| stored.target_kind == kind)
            .filter_map(|stored| {
                let expected = Self::ledger_count(&state, kind, stored.target_id);
                (expected != *stored).then_some(CounterDrift {
                    stored: *stored,
                    expected,
                })
            })
            .collect();
        drifts.sort_by_key(|d| d.stored.target_id);
        Ok(drifts)
    }

    async fn repair_counter_drift(
        &self,
        drifts: &[CounterDrift],
    ) -> Result<Vec<VotesCount>, VoteRepositoryError> {
        let mut state = self.state.lock().await;
        let mut repaired = Vec::with_capacity(drifts.len());
        for drift in drifts {
            let key = (drift.stored.target_kind, drift.stored.target_id);
            if !state.targets.contains_key(&key) {
                continue;
            }
            let count = Self::ledger_count(&state, key.0, key.1);
            state.targets.insert(key, count);
            repaired.push(count);
        }
        Ok(repaired)
    }

    async fn check_tables_created(&self) -> Result<bool, VoteRepositoryError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_cast_on_unknown_target() {
        let repository = InMemoryVoteRepository::new();
        let result = repository
            .cast_vote(Uuid::new_v4(), Uuid::new_v4(), TargetKind::Website, VoteDirection::Upvote)
            .await;
        assert!(matches!(result, Err(VoteRepositoryError::TargetNotFound { .. })));
    }

    #[tokio::test]
    async fn test_same_id_under_other_kind_is_a_different_target() {
        let repository = InMemoryVoteRepository::new();
        let target = Uuid::new_v4();
        repository.insert_target(TargetKind::Website, target, 0, 0).await;

        let result = repository
            .cast_vote(Uuid::new_v4(), target, TargetKind::Comment, VoteDirection::Upvote)
            .await;
        assert!(matches!(result, Err(VoteRepositoryError::TargetNotFound { .. })));
    }

    #[tokio::test]
    async fn test_injected_conflict_leaves_state_untouched() {
        let repository = InMemoryVoteRepository::new();
        let target = Uuid::new_v4();
        repository.insert_target(TargetKind::Comment, target, 0, 0).await;
        repository.inject_conflicts(1);

        let voter = Uuid::new_v4();
        let first = repository
            .cast_vote(voter, target, TargetKind::Comment, VoteDirection::Downvote)
            .await;
        assert!(matches!(first, Err(VoteRepositoryError::DuplicateVote { .. })));
        assert!(repository.votes_on(TargetKind::Comment, target).await.is_empty());

        let second = repository
            .cast_vote(voter, target, TargetKind::Comment, VoteDirection::Downvote)
            .await
            .unwrap();
        assert_eq!(second.downvotes, 1);
    }

    #[tokio::test]
    async fn test_drift_detection_and_repair() {
        let repository = InMemoryVoteRepository::new();
        let target = Uuid::new_v4();
        repository.insert_target(TargetKind::Website, target, 0, 0).await;
        repository
            .cast_vote(Uuid::new_v4(), target, TargetKind::Website, VoteDirection::Upvote)
            .await
            .unwrap();
        repository.set_counters(TargetKind::Website, target, 7, 3).await;

        let drifts = repository.find_counter_drift(TargetKind::Website).await.unwrap();
        assert_eq!(drifts.len(), 1);
        assert_eq!(drifts[0].expected.upvotes, 1);
        assert_eq!(drifts[0].expected.downvotes, 0);

        repository.repair_counter_drift(&drifts).await.unwrap();
        assert!(repository.find_counter_drift(TargetKind::Website).await.unwrap().is_empty());
        let count = repository.get_votes_count(TargetKind::Website, target).await.unwrap();
        assert_eq!((count.upvotes, count.downvotes), (1, 0));
    }

    #[tokio::test]
    async fn test_repair_keeps_votes_cast_after_the_audit() {
        let repository = InMemoryVoteRepository::new();
        let target = Uuid::new_v4();
        repository.insert_target(TargetKind::Website, target, 0, 0).await;
        repository
            .cast_vote(Uuid::new_v4(), target, TargetKind::Website, VoteDirection::Downvote)
            .await
            .unwrap();
        repository.set_counters(TargetKind::Website, target, 9, 1).await;
        let drifts = repository.find_counter_drift(TargetKind::Website).await.unwrap();

        // Lands between the audit and the repair.
        repository
            .cast_vote(Uuid::new_v4(), target, TargetKind::Website, VoteDirection::Upvote)
            .await
            .unwrap();
        let repaired = repository.repair_counter_drift(&drifts).await.unwrap();

        assert_eq!((repaired[0].upvotes, repaired[0].downvotes), (1, 1));
        let count = repository.get_votes_count(TargetKind::Website, target).await.unwrap();
        assert_eq!((count.upvotes, count.downvotes), (1, 1));
        assert!(repository.find_counter_drift(TargetKind::Website).await.unwrap().is_empty());
    }
}
