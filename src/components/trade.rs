use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use uuid::Uuid;

use crate::components::id::{ItemId, PlayerId, TradeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TradeStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl TradeStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TradeStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeLine {
    pub item_id: ItemId,
    pub quantity: u32,
}

impl TradeLine {
    pub fn new(item_id: ItemId, quantity: u32) -> Self {
        Self { item_id, quantity }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TradeError {
    #[error("no player named `{username}`{}", suggestion_hint(.suggestion))]
    UnknownUser {
        username: String,
        suggestion: Option<String>,
    },
    #[error("cannot trade with yourself")]
    SelfTrade,
    #[error("a trade must offer or request at least one item")]
    EmptyTrade,
    #[error("trade quantities must be greater than zero")]
    ZeroQuantity,
    #[error("item {0} is not in the catalog")]
    UnknownItem(ItemId),
    #[error("no trade with id {0}")]
    UnknownTrade(TradeId),
    #[error("trade {id} is already {status}")]
    NotPending { id: TradeId, status: TradeStatus },
    #[error("only the {role} of trade {id} may do that")]
    NotParticipant { id: TradeId, role: &'static str },
    #[error("{player} only holds {available} of {item}, needs {needed}")]
    MissingItems {
        player: String,
        item: ItemId,
        needed: u32,
        available: u32,
    },
    #[error("{player} has no room for the traded items")]
    NoRoom { player: String },
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(username) => format!(", did you mean `{username}`?"),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub sender: PlayerId,
    pub receiver: PlayerId,
    pub offered: Option<TradeLine>,
    pub requested: Option<TradeLine>,
    #[serde(default)]
    pub message: Option<String>,
    pub status: TradeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trade {
    pub fn new(
        sender: PlayerId,
        receiver: PlayerId,
        offered: Option<TradeLine>,
        requested: Option<TradeLine>,
        message: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            sender,
            receiver,
            offered,
            requested,
            message,
            status: TradeStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.sender == player || self.receiver == player
    }

    pub fn is_pending(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Moves a pending trade into a terminal state.
    pub fn resolve(&mut self, status: TradeStatus) -> Result<(), TradeError> {
        if !self.is_pending() {
            return Err(TradeError::NotPending {
                id: self.id,
                status: self.status,
            });
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn trade() -> Trade {
        Trade::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Some(TradeLine::new(ItemId::from_str("item.pebble"), 1)),
            None,
            None,
        )
    }

    #[test]
    fn new_trade_is_pending() {
        let trade = trade();
        assert!(trade.is_pending());
        assert!(trade.involves(trade.sender));
        assert!(!trade.involves(Uuid::new_v4()));
    }

    #[rstest]
    #[case(TradeStatus::Pending, false)]
    #[case(TradeStatus::Accepted, true)]
    #[case(TradeStatus::Rejected, true)]
    #[case(TradeStatus::Cancelled, true)]
    fn terminal_statuses(#[case] status: TradeStatus, #[case] terminal: bool) {
        assert_eq!(status.is_terminal(), terminal);
        let mut trade = trade();
        trade.status = status;
        assert_eq!(trade.is_pending(), !terminal);
    }

    #[test]
    fn terminal_states_are_final() {
        let mut trade = trade();
        trade.resolve(TradeStatus::Rejected).unwrap();
        assert_eq!(
            trade.resolve(TradeStatus::Accepted),
            Err(TradeError::NotPending {
                id: trade.id,
                status: TradeStatus::Rejected,
            })
        );
        assert_eq!(trade.status, TradeStatus::Rejected);
    }

    #[test]
    fn unknown_user_message_includes_suggestion() {
        let error = TradeError::UnknownUser {
            username: "alcie".to_string(),
            suggestion: Some("alice".to_string()),
        };
        assert_eq!(
            error.to_string(),
            "no player named `alcie`, did you mean `alice`?"
        );
    }
}
