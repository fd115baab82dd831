//! Player entity - account, wallet and role.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::PlayerId;

/// Authorization role attached to an account.
///
/// `Mj` (maitre du jeu) accounts may author dungeons; everyone plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player,
    Mj,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Player => "player",
            Role::Mj => "mj",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player" => Ok(Role::Player),
            "mj" => Ok(Role::Mj),
            other => Err(DomainError::parse(format!("unknown role: {}", other))),
        }
    }
}

/// A player account.
///
/// `gold` is the wallet balance; it is only ever mutated through the ledger
/// operations so it can never go negative. The password hash is never
/// serialized into responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub gold: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    /// Creates a fresh account with an empty wallet.
    pub fn new(
        display_name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PlayerId::new(),
            display_name: display_name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            gold: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
