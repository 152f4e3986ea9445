use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::components::id::{AnnouncementId, PlayerId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub message: String,
    pub active: bool,
    pub author: PlayerId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Announcement {
    pub fn new(author: PlayerId, title: impl Into<String>, message: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            message: message.into(),
            active: true,
            author,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnnouncementError {
    #[error("no announcement with id {0}")]
    UnknownAnnouncement(AnnouncementId),
    #[error("announcement title must not be empty")]
    EmptyTitle,
}
