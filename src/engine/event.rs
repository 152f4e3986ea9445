use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::components::{
    chat::ChatChannel,
    currency::{Currency, Price},
    gacha::GachaTier,
    id::{
        AnnouncementId, EventId, InventoryEntryId, ItemId, ListenerId, MessageId, PlayerId,
        TradeId,
    },
    profile::Role,
    trade::TradeStatus,
    upgrade::UpgradeKind,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: EventId,
    pub kind: EventKind,
    pub at: DateTime<Utc>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            at: Utc::now(),
        }
    }

    /// Every player whose view of the game is changed by the event.
    pub fn players(&self) -> Vec<PlayerId> {
        match &self.kind {
            EventKind::PlayerRegistered { player }
            | EventKind::PlayerRemoved { player }
            | EventKind::Clicked { player, .. }
            | EventKind::IdleIncome { player, .. }
            | EventKind::UpgradePurchased { player, .. }
            | EventKind::ProgressReset { player }
            | EventKind::CurrencyGranted { player, .. }
            | EventKind::ItemObtained { player, .. }
            | EventKind::EquipChanged { player, .. }
            | EventKind::RoleChanged { player, .. }
            | EventKind::ChatBanChanged { player, .. } => vec![*player],
            EventKind::TradeCreated {
                sender, receiver, ..
            }
            | EventKind::TradeStatusChanged {
                sender, receiver, ..
            } => vec![*sender, *receiver],
            EventKind::ChatMessageSent { sender, channel, .. } => match channel {
                ChatChannel::Global => vec![*sender],
                ChatChannel::Private { recipient } => vec![*sender, *recipient],
            },
            EventKind::AnnouncementChanged { .. }
            | EventKind::MaintenanceChanged { .. }
            | EventKind::CatalogChanged { .. }
            | EventKind::SettingsChanged => Vec::new(),
        }
    }

    pub fn concerns(&self, player: PlayerId) -> bool {
        self.players().contains(&player)
    }

    /// Events every client sees regardless of who they are.
    pub fn is_broadcast(&self) -> bool {
        match &self.kind {
            EventKind::ChatMessageSent { channel, .. } => *channel == ChatChannel::Global,
            EventKind::AnnouncementChanged { .. }
            | EventKind::MaintenanceChanged { .. }
            | EventKind::CatalogChanged { .. }
            | EventKind::SettingsChanged => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSource {
    Gacha(GachaTier),
    Trade(TradeId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    PlayerRegistered {
        player: PlayerId,
    },
    PlayerRemoved {
        player: PlayerId,
    },
    Clicked {
        player: PlayerId,
        score_gained: u64,
        coins_gained: u64,
        gems_gained: u64,
    },
    IdleIncome {
        player: PlayerId,
        score_gained: u64,
        coins_gained: u64,
    },
    UpgradePurchased {
        player: PlayerId,
        upgrade: UpgradeKind,
        cost: Price,
    },
    ProgressReset {
        player: PlayerId,
    },
    CurrencyGranted {
        player: PlayerId,
        currency: Currency,
        amount: u64,
    },
    ItemObtained {
        player: PlayerId,
        item: ItemId,
        quantity: u32,
        is_new: bool,
        source: ItemSource,
    },
    EquipChanged {
        player: PlayerId,
        entry: InventoryEntryId,
        equipped: bool,
    },
    TradeCreated {
        trade: TradeId,
        sender: PlayerId,
        receiver: PlayerId,
    },
    TradeStatusChanged {
        trade: TradeId,
        sender: PlayerId,
        receiver: PlayerId,
        status: TradeStatus,
    },
    ChatMessageSent {
        message: MessageId,
        sender: PlayerId,
        channel: ChatChannel,
    },
    AnnouncementChanged {
        announcement: AnnouncementId,
        change: Change,
    },
    MaintenanceChanged {
        enabled: bool,
    },
    CatalogChanged {
        item: ItemId,
        change: Change,
    },
    SettingsChanged,
    RoleChanged {
        player: PlayerId,
        role: Role,
    },
    ChatBanChanged {
        player: PlayerId,
        banned: bool,
    },
}

pub type EventLog = Vec<Event>;

pub type EventFilter = Arc<dyn Fn(&Event) -> bool + Send + Sync + 'static>;
pub type EventCallback = Arc<dyn Fn(&Event) + Send + Sync + 'static>;

#[derive(Clone)]
pub struct EventListener {
    pub id: ListenerId,
    pub filter: EventFilter,
    pub callback: EventCallback,
}

impl fmt::Debug for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl EventListener {
    pub fn new(filter: EventFilter, callback: EventCallback) -> Self {
        Self {
            id: Uuid::new_v4(),
            filter,
            callback,
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        (self.filter)(event)
    }

    pub fn notify(&self, event: &Event) {
        (self.callback)(event);
    }
}

pub mod filters {
    use std::sync::Arc;

    use super::{Event, EventFilter};
    use crate::components::id::PlayerId;

    /// What a player's client would subscribe to: their own changes plus
    /// broadcasts.
    pub fn player_feed(player: PlayerId) -> EventFilter {
        Arc::new(move |event: &Event| event.is_broadcast() || event.concerns(player))
    }

    pub fn matching<F>(predicate: F) -> EventFilter
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        Arc::new(predicate)
    }
}
