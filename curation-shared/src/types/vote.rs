use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ParseError;
use crate::types::{TargetId, UserId};

/// Represents the direction of a vote cast by a user.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    /// Indicates an upvote or positive endorsement.
    Upvote,
    /// Indicates a downvote or negative endorsement.
    Downvote,
}

impl VoteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDirection::Upvote => "upvote",
            VoteDirection::Downvote => "downvote",
        }
    }

    /// Returns the other direction.
    pub fn opposite(&self) -> Self {
        match self {
            VoteDirection::Upvote => VoteDirection::Downvote,
            VoteDirection::Downvote => VoteDirection::Upvote,
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteDirection {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(VoteDirection::Upvote),
            "downvote" => Ok(VoteDirection::Downvote),
            other => Err(ParseError::InvalidVoteDirection(other.to_string())),
        }
    }
}

/// The kind of entity a vote targets.
///
/// Each kind owns its own counter pair, so the same identifier under two kinds
/// names two unrelated targets.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetKind {
    Website,
    Comment,
}

impl TargetKind {
    pub const ALL: [TargetKind; 2] = [TargetKind::Website, TargetKind::Comment];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Website => "Website",
            TargetKind::Comment => "Comment",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetKind {
    type Err = ParseError;

    /// Accepts the canonical name as well as its lowercase form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Website" | "website" => Ok(TargetKind::Website),
            "Comment" | "comment" => Ok(TargetKind::Comment),
            other => Err(ParseError::InvalidTargetKind(other.to_string())),
        }
    }
}

/// Represents one user's standing vote on one target.
///
/// At most one `Vote` exists per (voter, target, kind). A repeated vote in the
/// same direction removes it, a vote in the other direction mutates it in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub voter_id: UserId,
    pub target_id: TargetId,
    pub target_kind: TargetKind,
    pub direction: VoteDirection,
    pub voted_at: DateTime<Utc>,
}
