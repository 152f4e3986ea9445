use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::components::id::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("username `{0}` is already taken")]
    UsernameTaken(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: PlayerId,
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub chat_banned: bool,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(id: PlayerId, username: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            username: username.into(),
            role,
            chat_banned: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Usernames are compared case-insensitively and without surrounding
/// whitespace.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}
