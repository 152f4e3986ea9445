use crate::{
    components::{
        announcement::AnnouncementError,
        chat::ChatError,
        currency::WalletError,
        gacha::GachaError,
        id::PlayerId,
        items::inventory::{EquipError, InventoryError},
        profile::ProfileError,
        settings::SettingsError,
        trade::TradeError,
        upgrade::UpgradeError,
    },
    engine::snapshot::SnapshotError,
    registry::registry::RegistryError,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("the game is under maintenance: {message}")]
    Maintenance { message: String },
    #[error("player {player} is not an admin")]
    NotAdmin { player: PlayerId },
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("no player with id {0}")]
    UnknownPlayer(PlayerId),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Equip(#[from] EquipError),
    #[error(transparent)]
    Upgrade(#[from] UpgradeError),
    #[error(transparent)]
    Gacha(#[from] GachaError),
    #[error(transparent)]
    Trade(#[from] TradeError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error(transparent)]
    Announcement(#[from] AnnouncementError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
