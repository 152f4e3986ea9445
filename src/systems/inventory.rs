use hecs::{Entity, World};

use crate::{
    components::{
        id::{ItemId, PlayerId},
        items::{
            inventory::{Inventory, InventoryEntry, InventoryError, InventoryFilter},
            item::Item,
        },
        progress::GameProgress,
    },
    engine::{error::GameError, game_state::GameState},
    systems,
};

/// An inventory entry joined with its catalog item. `item` is `None` when
/// the item has been removed from the catalog since it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryView {
    pub entry: InventoryEntry,
    pub item: Option<Item>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryUsage {
    pub used: u64,
    pub capacity: u32,
    pub equipped: usize,
    pub max_equip: u32,
}

pub fn capacity(world: &World, entity: Entity) -> u32 {
    systems::helpers::component::<GameProgress>(world, entity).max_inventory
}

pub fn add_item(
    world: &mut World,
    entity: Entity,
    item_id: &ItemId,
    quantity: u32,
) -> Result<bool, InventoryError> {
    let capacity = capacity(world, entity);
    systems::helpers::component_mut::<Inventory>(world, entity).add_item(
        item_id,
        quantity,
        capacity,
    )
}

pub fn remove_item(
    world: &mut World,
    entity: Entity,
    item_id: &ItemId,
    quantity: u32,
) -> Result<(), InventoryError> {
    systems::helpers::component_mut::<Inventory>(world, entity).remove_item(item_id, quantity)
}

pub fn check_room(world: &World, entity: Entity, quantity: u32) -> Result<(), InventoryError> {
    let capacity = capacity(world, entity);
    systems::helpers::component::<Inventory>(world, entity).check_room(quantity, capacity)
}

/// The player's items, newest first.
pub fn inventory_view(
    game_state: &GameState,
    player: PlayerId,
    filter: InventoryFilter,
) -> Result<Vec<InventoryView>, GameError> {
    let entity = game_state.player_entity(player)?;
    let inventory = systems::helpers::component::<Inventory>(&game_state.world, entity);
    Ok(inventory
        .newest_first()
        .filter_map(|entry| {
            let item = game_state.catalog.get(&entry.item_id);
            filter.matches(entry, item).then(|| InventoryView {
                entry: entry.clone(),
                item: item.cloned(),
            })
        })
        .collect())
}

pub fn usage(game_state: &GameState, player: PlayerId) -> Result<InventoryUsage, GameError> {
    let entity = game_state.player_entity(player)?;
    let inventory = systems::helpers::component::<Inventory>(&game_state.world, entity);
    let progress = systems::helpers::component::<GameProgress>(&game_state.world, entity);
    Ok(InventoryUsage {
        used: inventory.total_quantity(),
        capacity: progress.max_inventory,
        equipped: inventory.equipped_count(),
        max_equip: progress.max_equip,
    })
}
