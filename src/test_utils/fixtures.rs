use rstest::fixture;

use crate::{
    components::{
        currency::{Currency, Wallet},
        id::{InventoryEntryId, ItemId, PlayerId},
        items::inventory::Inventory,
        profile::{Profile, Role},
        progress::GameProgress,
        settings::EconomySettings,
    },
    engine::game_state::GameState,
    registry::items::default_catalog,
    systems,
};

#[fixture]
pub fn game_state() -> GameState {
    GameState::with_seed(default_catalog(), EconomySettings::default(), 42)
}

pub fn player(game_state: &mut GameState, username: &str) -> PlayerId {
    game_state
        .register_player(username, Role::User)
        .expect("test username should be free")
}

pub fn alice(game_state: &mut GameState) -> PlayerId {
    player(game_state, "alice")
}

pub fn bob(game_state: &mut GameState) -> PlayerId {
    player(game_state, "bob")
}

pub fn admin(game_state: &mut GameState) -> PlayerId {
    game_state
        .register_player("admin", Role::Admin)
        .expect("test username should be free")
}

/// Puts items straight into a player's inventory, skipping capacity.
pub fn give_item(
    game_state: &mut GameState,
    player: PlayerId,
    item_id: &ItemId,
    quantity: u32,
) -> InventoryEntryId {
    let entity = game_state.player_entity(player).unwrap();
    let mut inventory =
        systems::helpers::component_mut::<Inventory>(&mut game_state.world, entity);
    inventory.add_item(item_id, quantity, u32::MAX).unwrap();
    let id = inventory.entry_for_item(item_id).unwrap().id;
    id
}

pub fn grant_coins(game_state: &mut GameState, player: PlayerId, amount: u64) {
    let entity = game_state.player_entity(player).unwrap();
    systems::helpers::component_mut::<Wallet>(&mut game_state.world, entity)
        .deposit(Currency::Coins, amount);
}

pub fn set_progress(
    game_state: &mut GameState,
    player: PlayerId,
    update: impl FnOnce(&mut GameProgress),
) {
    let entity = game_state.player_entity(player).unwrap();
    systems::helpers::update(&mut game_state.world, entity, update);
}

pub fn set_chat_banned(game_state: &mut GameState, player: PlayerId, banned: bool) {
    let entity = game_state.player_entity(player).unwrap();
    systems::helpers::update(&mut game_state.world, entity, |profile: &mut Profile| {
        profile.chat_banned = banned;
    });
}
