use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ParseError;
use crate::types::UserId;

/// Account standing of a user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum UserStatus {
    Active,
    Suspended,
    Banned,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "Active",
            UserStatus::Suspended => "Suspended",
            UserStatus::Banned => "Banned",
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(UserStatus::Active),
            "Suspended" => Ok(UserStatus::Suspended),
            "Banned" => Ok(UserStatus::Banned),
            other => Err(ParseError::InvalidUserStatus(other.to_string())),
        }
    }
}

/// The authenticated user as seen by the authorization gate.
///
/// Users are owned by the account layer; the core only reads the role name and
/// status carried here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub role: String,
    pub status: UserStatus,
}

impl User {
    pub fn new(id: UserId, role: impl Into<String>, status: UserStatus) -> Self {
        Self {
            id,
            role: role.into(),
            status,
        }
    }
}
