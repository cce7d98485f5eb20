use serde::{Deserialize, Serialize};

use crate::types::{TargetId, TargetKind, VoteDirection, VotesDelta};

/// Represents the denormalized vote counters stored on a votable entity.
///
/// Counters are only ever moved by a `VotesDelta` paired with a ledger mutation,
/// and never drop below zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VotesCount {
    pub target_id: TargetId,
    pub target_kind: TargetKind,
    pub upvotes: i64,
    pub downvotes: i64,
}

impl VotesCount {
    pub fn new(target_id: TargetId, target_kind: TargetKind, upvotes: i64, downvotes: i64) -> Self {
        Self {
            target_id,
            target_kind,
            upvotes,
            downvotes,
        }
    }

    /// Applies a delta, flooring each counter at zero.
    pub fn apply(&mut self, delta: VotesDelta) {
        self.upvotes = (self.upvotes + delta.upvotes).max(0);
        self.downvotes = (self.downvotes + delta.downvotes).max(0);
    }

    /// Builds the caller-facing result for this tally and the voter's resulting vote.
    pub fn outcome(&self, user_vote: Option<VoteDirection>) -> VoteOutcome {
        VoteOutcome {
            upvotes: self.upvotes,
            downvotes: self.downvotes,
            user_vote,
        }
    }
}

/// The result of casting a vote, as returned to API clients.
///
/// Serializes to `{ "upvotes": .., "downvotes": .., "userVote": "upvote" | "downvote" | null }`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcome {
    pub upvotes: i64,
    pub downvotes: i64,
    pub user_vote: Option<VoteDirection>,
}

/// A target whose stored counters disagree with the vote ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CounterDrift {
    pub stored: VotesCount,
    pub expected: VotesCount,
}
