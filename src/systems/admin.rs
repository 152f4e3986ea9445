use chrono::{DateTime, Utc};
use strum::IntoEnumIterator;
use tracing::{info, warn};

use crate::{
    components::{
        currency::{Currency, CurrencyTransaction, Wallet},
        id::{ItemId, PlayerId},
        items::item::Item,
        profile::{Profile, Role},
        progress::GameProgress,
        settings::{EconomySettings, MaintenanceSettings},
        trade::TradeStatus,
    },
    engine::{
        error::GameError,
        event::{Change, EventKind},
        game_state::GameState,
    },
    systems,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub username: String,
    pub role: Role,
    pub chat_banned: bool,
    pub created_at: DateTime<Utc>,
    pub coins: u64,
    pub gems: u64,
    pub score: u64,
}

/// Narrows the player list. Empty fields match everyone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerQuery {
    /// Case-insensitive substring of the username.
    pub search: Option<String>,
    pub role: Option<Role>,
}

impl PlayerQuery {
    pub fn search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Default::default()
        }
    }

    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Default::default()
        }
    }

    pub fn matches(&self, profile: &Profile) -> bool {
        let search_matches = match self.search.as_deref().map(str::trim) {
            Some(search) if !search.is_empty() => profile
                .username
                .to_lowercase()
                .contains(&search.to_lowercase()),
            _ => true,
        };
        search_matches && self.role.is_none_or(|role| profile.role == role)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analytics {
    pub player_count: usize,
    pub total_coins: u64,
    pub total_gems: u64,
    pub average_coins: f64,
    pub average_gems: f64,
    pub trade_count: usize,
    pub trades_by_status: Vec<(TradeStatus, usize)>,
    pub gacha_pulls: usize,
}

/// Players matching `query`, newest account first.
pub fn list_players(
    game_state: &GameState,
    admin: PlayerId,
    query: &PlayerQuery,
) -> Result<Vec<PlayerSummary>, GameError> {
    game_state.ensure_admin(admin)?;
    let mut players: Vec<PlayerSummary> = game_state
        .world
        .query::<(&Profile, &Wallet, &GameProgress)>()
        .iter()
        .filter(|(_, (profile, _, _))| query.matches(profile))
        .map(|(_, (profile, wallet, progress))| PlayerSummary {
            id: profile.id,
            username: profile.username.clone(),
            role: profile.role,
            chat_banned: profile.chat_banned,
            created_at: profile.created_at,
            coins: wallet.coins(),
            gems: wallet.gems(),
            score: progress.score,
        })
        .collect();
    players.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.username.cmp(&b.username))
    });
    Ok(players)
}

pub fn set_role(
    game_state: &mut GameState,
    admin: PlayerId,
    target: PlayerId,
    role: Role,
) -> Result<(), GameError> {
    game_state.ensure_admin(admin)?;
    let entity = game_state.player_entity(target)?;
    systems::helpers::component_mut::<Profile>(&mut game_state.world, entity).role = role;

    info!("Player {} is now {} (set by {})", target, role, admin);
    game_state.emit(EventKind::RoleChanged {
        player: target,
        role,
    });
    Ok(())
}

pub fn set_chat_banned(
    game_state: &mut GameState,
    admin: PlayerId,
    target: PlayerId,
    banned: bool,
) -> Result<(), GameError> {
    game_state.ensure_admin(admin)?;
    let entity = game_state.player_entity(target)?;
    systems::helpers::component_mut::<Profile>(&mut game_state.world, entity).chat_banned =
        banned;

    info!(
        "Player {} {} chat by {}",
        target,
        if banned { "banned from" } else { "allowed back into" },
        admin
    );
    game_state.emit(EventKind::ChatBanChanged {
        player: target,
        banned,
    });
    Ok(())
}

/// Removes a player entirely. Their pending trades are cancelled first;
/// history records are kept.
pub fn delete_player(
    game_state: &mut GameState,
    admin: PlayerId,
    target: PlayerId,
) -> Result<Profile, GameError> {
    game_state.ensure_admin(admin)?;
    let entity = game_state.player_entity(target)?;
    let profile = systems::helpers::cloned::<Profile>(&game_state.world, entity);

    let cancelled = systems::trading::cancel_trades_involving(game_state, target);
    if game_state.world.despawn(entity).is_err() {
        warn!("Player {} had no entity to despawn", target);
    }
    game_state.players.remove(&target);

    info!(
        "Player {} ({}) deleted by {}, {} pending trades cancelled",
        profile.username, target, admin, cancelled
    );
    game_state.emit(EventKind::PlayerRemoved { player: target });
    Ok(profile)
}

pub fn reset_player(
    game_state: &mut GameState,
    admin: PlayerId,
    target: PlayerId,
) -> Result<(), GameError> {
    game_state.ensure_admin(admin)?;
    systems::progress::reset_progress(game_state, admin, target)
}

pub fn grant_currency(
    game_state: &mut GameState,
    admin: PlayerId,
    target: PlayerId,
    currency: Currency,
    amount: u64,
) -> Result<(), GameError> {
    game_state.ensure_admin(admin)?;
    let entity = game_state.player_entity(target)?;
    systems::helpers::component_mut::<Wallet>(&mut game_state.world, entity)
        .deposit(currency, amount);

    info!("{} granted {} {} to {}", admin, amount, currency, target);
    game_state.record_transaction(CurrencyTransaction::grant(
        target,
        currency,
        amount,
        "admin grant",
    ));
    game_state.emit(EventKind::CurrencyGranted {
        player: target,
        currency,
        amount,
    });
    Ok(())
}

pub fn create_item(
    game_state: &mut GameState,
    admin: PlayerId,
    item: Item,
) -> Result<(), GameError> {
    game_state.ensure_admin(admin)?;
    let id = item.id.clone();
    game_state.catalog.insert(item)?;

    info!("Item {} added to the catalog", id);
    game_state.emit(EventKind::CatalogChanged {
        item: id,
        change: Change::Created,
    });
    Ok(())
}

pub fn update_item(
    game_state: &mut GameState,
    admin: PlayerId,
    item: Item,
) -> Result<Item, GameError> {
    game_state.ensure_admin(admin)?;
    let id = item.id.clone();
    let previous = game_state.catalog.update(item)?;

    info!("Item {} updated", id);
    game_state.emit(EventKind::CatalogChanged {
        item: id,
        change: Change::Updated,
    });
    Ok(previous)
}

/// Removes an item from the catalog. Copies already in inventories stay
/// where they are but no longer drop or grant effects.
pub fn delete_item(
    game_state: &mut GameState,
    admin: PlayerId,
    item: &ItemId,
) -> Result<Item, GameError> {
    game_state.ensure_admin(admin)?;
    let removed = game_state.catalog.remove(item)?;

    info!("Item {} removed from the catalog", item);
    game_state.emit(EventKind::CatalogChanged {
        item: item.clone(),
        change: Change::Deleted,
    });
    Ok(removed)
}

pub fn set_maintenance(
    game_state: &mut GameState,
    admin: PlayerId,
    maintenance: MaintenanceSettings,
) -> Result<(), GameError> {
    game_state.ensure_admin(admin)?;
    let enabled = maintenance.enabled;
    game_state.maintenance = maintenance;

    if enabled {
        warn!(
            "Maintenance mode enabled by {}: {}",
            admin, game_state.maintenance.message
        );
    } else {
        info!("Maintenance mode disabled by {}", admin);
    }
    game_state.emit(EventKind::MaintenanceChanged { enabled });
    Ok(())
}

/// Replaces the economy settings. Existing slot upgrades and balances are
/// left alone.
pub fn update_settings(
    game_state: &mut GameState,
    admin: PlayerId,
    settings: EconomySettings,
) -> Result<(), GameError> {
    game_state.ensure_admin(admin)?;
    settings.validate()?;
    game_state.settings = settings;

    info!("Economy settings updated by {}", admin);
    game_state.emit(EventKind::SettingsChanged);
    Ok(())
}

pub fn analytics(game_state: &GameState, admin: PlayerId) -> Result<Analytics, GameError> {
    game_state.ensure_admin(admin)?;

    let (player_count, total_coins, total_gems) = game_state
        .world
        .query::<&Wallet>()
        .iter()
        .fold((0usize, 0u64, 0u64), |(count, coins, gems), (_, wallet)| {
            (
                count + 1,
                coins.saturating_add(wallet.coins()),
                gems.saturating_add(wallet.gems()),
            )
        });
    let average = |total: u64| {
        if player_count == 0 {
            0.0
        } else {
            total as f64 / player_count as f64
        }
    };

    Ok(Analytics {
        player_count,
        total_coins,
        total_gems,
        average_coins: average(total_coins),
        average_gems: average(total_gems),
        trade_count: game_state.trades.len(),
        trades_by_status: TradeStatus::iter()
            .map(|status| {
                let count = game_state
                    .trades
                    .iter()
                    .filter(|trade| trade.status == status)
                    .count();
                (status, count)
            })
            .collect(),
        gacha_pulls: game_state.gacha_history.len(),
    })
}
