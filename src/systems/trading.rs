use hecs::Entity;
use tracing::{debug, info};

use crate::{
    components::{
        id::{PlayerId, TradeId},
        items::inventory::Inventory,
        profile::Profile,
        trade::{Trade, TradeError, TradeLine, TradeStatus},
    },
    engine::{
        error::GameError,
        event::{EventKind, ItemSource},
        game_state::GameState,
    },
    systems,
};

/// Closest registered username, if any is reasonably close.
pub fn suggest_username(game_state: &GameState, username: &str) -> Option<String> {
    let needle = username.trim().to_lowercase();
    game_state
        .usernames()
        .into_iter()
        .map(|candidate| {
            let score = strsim::jaro_winkler(&needle, &candidate.to_lowercase());
            (candidate, score)
        })
        .filter(|(_, score)| *score >= 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(candidate, _)| candidate)
}

fn username(game_state: &GameState, entity: Entity) -> String {
    systems::helpers::component::<Profile>(&game_state.world, entity)
        .username
        .clone()
}

fn check_line(game_state: &GameState, line: &Option<TradeLine>) -> Result<(), TradeError> {
    if let Some(line) = line {
        if line.quantity == 0 {
            return Err(TradeError::ZeroQuantity);
        }
        if !game_state.catalog.contains(&line.item_id) {
            return Err(TradeError::UnknownItem(line.item_id.clone()));
        }
    }
    Ok(())
}

fn check_holds(
    game_state: &GameState,
    entity: Entity,
    line: &Option<TradeLine>,
) -> Result<(), TradeError> {
    let Some(line) = line else {
        return Ok(());
    };
    let available = systems::helpers::component::<Inventory>(&game_state.world, entity)
        .quantity_of(&line.item_id);
    if available < line.quantity {
        return Err(TradeError::MissingItems {
            player: username(game_state, entity),
            item: line.item_id.clone(),
            needed: line.quantity,
            available,
        });
    }
    Ok(())
}

/// Whether `entity` can take `incoming` once `outgoing` has left its
/// inventory.
fn check_capacity(
    game_state: &GameState,
    entity: Entity,
    outgoing: &Option<TradeLine>,
    incoming: &Option<TradeLine>,
) -> Result<(), TradeError> {
    let Some(incoming) = incoming else {
        return Ok(());
    };
    let held = systems::helpers::component::<Inventory>(&game_state.world, entity)
        .total_quantity();
    let leaving = outgoing
        .as_ref()
        .map(|line| u64::from(line.quantity))
        .unwrap_or(0);
    let capacity = systems::inventory::capacity(&game_state.world, entity);
    if held - leaving + u64::from(incoming.quantity) > u64::from(capacity) {
        return Err(TradeError::NoRoom {
            player: username(game_state, entity),
        });
    }
    Ok(())
}

pub fn create_trade(
    game_state: &mut GameState,
    sender: PlayerId,
    receiver_username: &str,
    offered: Option<TradeLine>,
    requested: Option<TradeLine>,
    message: Option<String>,
) -> Result<TradeId, GameError> {
    let sender_entity = game_state.ensure_playable(sender)?;
    let receiver = game_state
        .find_player_by_username(receiver_username)
        .ok_or_else(|| TradeError::UnknownUser {
            username: receiver_username.trim().to_string(),
            suggestion: suggest_username(game_state, receiver_username),
        })?;
    if receiver == sender {
        return Err(TradeError::SelfTrade.into());
    }
    if offered.is_none() && requested.is_none() {
        return Err(TradeError::EmptyTrade.into());
    }
    check_line(game_state, &offered)?;
    check_line(game_state, &requested)?;
    check_holds(game_state, sender_entity, &offered)?;

    let message = message
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty());
    let trade = Trade::new(sender, receiver, offered, requested, message);
    let id = trade.id;
    game_state.trades.push(trade);

    info!("Trade {} created by {} for {}", id, sender, receiver);
    game_state.emit(EventKind::TradeCreated {
        trade: id,
        sender,
        receiver,
    });
    Ok(id)
}

fn trade_index(game_state: &GameState, trade: TradeId) -> Result<usize, TradeError> {
    game_state
        .trades
        .iter()
        .position(|t| t.id == trade)
        .ok_or(TradeError::UnknownTrade(trade))
}

fn ensure_pending(trade: &Trade) -> Result<(), TradeError> {
    if !trade.is_pending() {
        return Err(TradeError::NotPending {
            id: trade.id,
            status: trade.status,
        });
    }
    Ok(())
}

fn set_status(
    game_state: &mut GameState,
    index: usize,
    status: TradeStatus,
) -> Result<(), GameError> {
    let trade = &mut game_state.trades[index];
    trade.resolve(status)?;
    let (id, sender, receiver) = (trade.id, trade.sender, trade.receiver);

    info!("Trade {} is now {}", id, status);
    game_state.emit(EventKind::TradeStatusChanged {
        trade: id,
        sender,
        receiver,
        status,
    });
    Ok(())
}

/// Swaps both sides' items. Either everything moves or nothing does.
pub fn accept_trade(
    game_state: &mut GameState,
    player: PlayerId,
    trade: TradeId,
) -> Result<(), GameError> {
    let receiver_entity = game_state.ensure_playable(player)?;
    let index = trade_index(game_state, trade)?;
    let pending = game_state.trades[index].clone();
    ensure_pending(&pending)?;
    if pending.receiver != player {
        return Err(TradeError::NotParticipant {
            id: trade,
            role: "receiver",
        }
        .into());
    }
    let sender_entity = game_state.player_entity(pending.sender)?;

    check_holds(game_state, sender_entity, &pending.offered)?;
    check_holds(game_state, receiver_entity, &pending.requested)?;
    check_capacity(
        game_state,
        sender_entity,
        &pending.offered,
        &pending.requested,
    )?;
    check_capacity(
        game_state,
        receiver_entity,
        &pending.requested,
        &pending.offered,
    )?;

    // Everything is validated, so the transfers below cannot fail.
    let mut sender_inventory =
        systems::helpers::cloned::<Inventory>(&game_state.world, sender_entity);
    let mut receiver_inventory =
        systems::helpers::cloned::<Inventory>(&game_state.world, receiver_entity);
    let mut obtained = Vec::new();

    if let Some(line) = &pending.offered {
        sender_inventory.remove_item(&line.item_id, line.quantity)?;
        let is_new = receiver_inventory.add_item(&line.item_id, line.quantity, u32::MAX)?;
        obtained.push((pending.receiver, line.clone(), is_new));
    }
    if let Some(line) = &pending.requested {
        receiver_inventory.remove_item(&line.item_id, line.quantity)?;
        let is_new = sender_inventory.add_item(&line.item_id, line.quantity, u32::MAX)?;
        obtained.push((pending.sender, line.clone(), is_new));
    }

    systems::helpers::replace(&mut game_state.world, sender_entity, sender_inventory);
    systems::helpers::replace(&mut game_state.world, receiver_entity, receiver_inventory);
    set_status(game_state, index, TradeStatus::Accepted)?;

    for (player, line, is_new) in obtained {
        debug!("{} received {}x {}", player, line.quantity, line.item_id);
        game_state.emit(EventKind::ItemObtained {
            player,
            item: line.item_id,
            quantity: line.quantity,
            is_new,
            source: ItemSource::Trade(trade),
        });
    }
    Ok(())
}

pub fn reject_trade(
    game_state: &mut GameState,
    player: PlayerId,
    trade: TradeId,
) -> Result<(), GameError> {
    game_state.ensure_playable(player)?;
    let index = trade_index(game_state, trade)?;
    let pending = &game_state.trades[index];
    ensure_pending(pending)?;
    if pending.receiver != player {
        return Err(TradeError::NotParticipant {
            id: trade,
            role: "receiver",
        }
        .into());
    }
    set_status(game_state, index, TradeStatus::Rejected)
}

/// Withdraws a pending trade. Only the sender or an admin may do this.
pub fn cancel_trade(
    game_state: &mut GameState,
    player: PlayerId,
    trade: TradeId,
) -> Result<(), GameError> {
    let entity = game_state.ensure_playable(player)?;
    let index = trade_index(game_state, trade)?;
    let pending = &game_state.trades[index];
    ensure_pending(pending)?;
    let is_admin = systems::helpers::component::<Profile>(&game_state.world, entity).is_admin();
    if pending.sender != player && !is_admin {
        return Err(TradeError::NotParticipant {
            id: trade,
            role: "sender",
        }
        .into());
    }
    set_status(game_state, index, TradeStatus::Cancelled)
}

/// Cancels every pending trade involving `player`.
pub(crate) fn cancel_trades_involving(game_state: &mut GameState, player: PlayerId) -> usize {
    let pending: Vec<usize> = game_state
        .trades
        .iter()
        .enumerate()
        .filter(|(_, trade)| trade.is_pending() && trade.involves(player))
        .map(|(index, _)| index)
        .collect();
    for index in &pending {
        // Only pending trades were collected, so resolving cannot fail
        let _ = set_status(game_state, *index, TradeStatus::Cancelled);
    }
    pending.len()
}

pub fn trade(game_state: &GameState, trade: TradeId) -> Option<&Trade> {
    game_state.trades.iter().find(|t| t.id == trade)
}

/// Pending trades waiting on `player`, newest first.
pub fn incoming(game_state: &GameState, player: PlayerId) -> Vec<&Trade> {
    game_state
        .trades
        .iter()
        .rev()
        .filter(|trade| trade.receiver == player && trade.is_pending())
        .collect()
}

/// Every trade `player` has sent, newest first.
pub fn outgoing(game_state: &GameState, player: PlayerId) -> Vec<&Trade> {
    game_state
        .trades
        .iter()
        .rev()
        .filter(|trade| trade.sender == player)
        .collect()
}

pub fn all_trades(game_state: &GameState, admin: PlayerId) -> Result<Vec<&Trade>, GameError> {
    game_state.ensure_admin(admin)?;
    Ok(game_state.trades.iter().rev().collect())
}
