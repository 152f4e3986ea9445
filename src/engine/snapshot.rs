use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    components::{
        announcement::Announcement,
        chat::ChatMessage,
        currency::{CurrencyTransaction, Wallet},
        gacha::GachaRecord,
        items::{inventory::Inventory, item::Item},
        profile::{Profile, normalize_username},
        progress::GameProgress,
        settings::{EconomySettings, MaintenanceSettings, SettingsError},
        trade::Trade,
    },
    engine::game_state::GameState,
    registry::registry::{ItemRegistry, RegistryError},
    systems,
};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to access snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to (de)serialize snapshot: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    #[error("snapshot catalog is invalid: {0}")]
    Catalog(#[from] RegistryError),
    #[error("snapshot lists player {0} twice")]
    DuplicatePlayer(String),
    #[error("snapshot has more than one player named `{0}`")]
    DuplicateUsername(String),
    #[error("snapshot settings are invalid: {0}")]
    Settings(#[from] SettingsError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub profile: Profile,
    pub wallet: Wallet,
    pub progress: GameProgress,
    pub inventory: Inventory,
}

/// Everything needed to bring a `GameState` back, minus the event log and
/// listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub settings: EconomySettings,
    #[serde(default)]
    pub maintenance: MaintenanceSettings,
    pub catalog: Vec<Item>,
    pub players: Vec<PlayerSnapshot>,
    #[serde(default)]
    pub trades: Vec<Trade>,
    #[serde(default)]
    pub chat_log: Vec<ChatMessage>,
    #[serde(default)]
    pub announcements: Vec<Announcement>,
    #[serde(default)]
    pub gacha_history: Vec<GachaRecord>,
    #[serde(default)]
    pub transactions: Vec<CurrencyTransaction>,
}

impl Snapshot {
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Saved snapshot with {} players to {:?}", self.players.len(), path);
        Ok(())
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(&fs::read_to_string(path)?)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot {
        let mut players: Vec<PlayerSnapshot> = self
            .players
            .values()
            .map(|entity| PlayerSnapshot {
                profile: systems::helpers::cloned::<Profile>(&self.world, *entity),
                wallet: systems::helpers::cloned::<Wallet>(&self.world, *entity),
                progress: systems::helpers::cloned::<GameProgress>(
                    &self.world,
                    *entity,
                ),
                inventory: systems::helpers::cloned::<Inventory>(
                    &self.world,
                    *entity,
                ),
            })
            .collect();
        players.sort_by(|a, b| a.profile.username.cmp(&b.profile.username));

        let mut catalog: Vec<Item> = self.catalog.values().cloned().collect();
        catalog.sort_by(|a, b| a.id.cmp(&b.id));

        Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            settings: self.settings.clone(),
            maintenance: self.maintenance.clone(),
            catalog,
            players,
            trades: self.trades.clone(),
            chat_log: self.chat_log.clone(),
            announcements: self.announcements.clone(),
            gacha_history: self.gacha_history.clone(),
            transactions: self.transactions.clone(),
        }
    }

    pub fn from_snapshot(snapshot: Snapshot, seed: Option<u64>) -> Result<Self, SnapshotError> {
        snapshot.settings.validate()?;
        let catalog = ItemRegistry::from_entries(snapshot.catalog)?;
        let mut game_state = match seed {
            Some(seed) => GameState::with_seed(catalog, snapshot.settings, seed),
            None => GameState::new(catalog, snapshot.settings),
        };

        for player in snapshot.players {
            if game_state.players.contains_key(&player.profile.id) {
                return Err(SnapshotError::DuplicatePlayer(player.profile.username));
            }
            if game_state
                .find_player_by_username(&player.profile.username)
                .is_some()
            {
                return Err(SnapshotError::DuplicateUsername(normalize_username(
                    &player.profile.username,
                )));
            }
            game_state.spawn_player(
                player.profile,
                player.wallet,
                player.progress,
                player.inventory,
            );
        }

        game_state.maintenance = snapshot.maintenance;
        game_state.trades = snapshot.trades;
        game_state.chat_log = snapshot.chat_log;
        game_state.announcements = snapshot.announcements;
        game_state.gacha_history = snapshot.gacha_history;
        game_state.transactions = snapshot.transactions;
        Ok(game_state)
    }
}
