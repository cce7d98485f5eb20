//! The per-(voter, target) vote state machine.
//!
//! States are `NoVote`, `Upvoted` and `Downvoted`. Every cast moves the pair
//! along exactly one edge, and every edge carries exactly one ledger mutation
//! and one counter delta.
use serde::{Deserialize, Serialize};

use crate::types::VoteDirection;

/// The signed change applied to a target's counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VotesDelta {
    pub upvotes: i64,
    pub downvotes: i64,
}

impl VotesDelta {
    fn for_direction(direction: VoteDirection, amount: i64) -> Self {
        match direction {
            VoteDirection::Upvote => VotesDelta {
                upvotes: amount,
                downvotes: 0,
            },
            VoteDirection::Downvote => VotesDelta {
                upvotes: 0,
                downvotes: amount,
            },
        }
    }
}

/// The ledger mutation required to honour a cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// No vote existed: insert one.
    Create(VoteDirection),
    /// The same direction was cast again: delete the vote.
    Remove(VoteDirection),
    /// The other direction was cast: rewrite the vote in place.
    Switch {
        from: VoteDirection,
        to: VoteDirection,
    },
}

impl VoteTransition {
    /// Plans the transition from the voter's stored vote (if any) and the requested direction.
    pub fn plan(existing: Option<VoteDirection>, requested: VoteDirection) -> Self {
        match existing {
            None => VoteTransition::Create(requested),
            Some(stored) if stored == requested => VoteTransition::Remove(stored),
            Some(stored) => VoteTransition::Switch {
                from: stored,
                to: requested,
            },
        }
    }

    /// The counter delta paired with this transition.
    pub fn delta(&self) -> VotesDelta {
        match *self {
            VoteTransition::Create(direction) => VotesDelta::for_direction(direction, 1),
            VoteTransition::Remove(direction) => VotesDelta::for_direction(direction, -1),
            VoteTransition::Switch { from, to } => {
                let removed = VotesDelta::for_direction(from, -1);
                let added = VotesDelta::for_direction(to, 1);
                VotesDelta {
                    upvotes: removed.upvotes + added.upvotes,
                    downvotes: removed.downvotes + added.downvotes,
                }
            }
        }
    }

    /// The voter's vote after the transition is applied.
    pub fn resulting_vote(&self) -> Option<VoteDirection> {
        match *self {
            VoteTransition::Create(direction) => Some(direction),
            VoteTransition::Remove(_) => None,
            VoteTransition::Switch { to, .. } => Some(to),
        }
    }
}
