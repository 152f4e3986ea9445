use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PlayerId = Uuid;

pub type TradeId = Uuid;

pub type InventoryEntryId = Uuid;

pub type MessageId = Uuid;

pub type AnnouncementId = Uuid;

pub type GachaRecordId = Uuid;

pub type TransactionId = Uuid;

pub type EventId = Uuid;

pub type ListenerId = Uuid;

macro_rules! id_newtypes {
    ($($name:ident),+) => {
        $(
            #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(String);

            impl $name {
                pub fn from_str(s: impl Into<String>) -> Self {
                    $name(s.into())
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )+
    };
}

id_newtypes!(ItemId);
