use hecs::{Entity, World};
use tracing::debug;

use crate::{
    components::{
        id::{InventoryEntryId, PlayerId},
        items::{
            bonuses::{EffectiveStats, StatBonuses},
            inventory::Inventory,
        },
        progress::GameProgress,
    },
    engine::{error::GameError, event::EventKind, game_state::GameState},
    registry::registry::ItemRegistry,
    systems,
};

pub fn stat_bonuses(world: &World, catalog: &ItemRegistry, entity: Entity) -> StatBonuses {
    let inventory = systems::helpers::component::<Inventory>(world, entity);
    StatBonuses::from_equipped(inventory.equipped(), |id| catalog.get(id).cloned())
}

pub fn effective_stats(world: &World, catalog: &ItemRegistry, entity: Entity) -> EffectiveStats {
    let bonuses = stat_bonuses(world, catalog, entity);
    let progress = systems::helpers::component::<GameProgress>(world, entity);
    EffectiveStats::compute(&progress, &bonuses)
}

/// Bonuses broken down per equipped item, plus the totals they add up to.
pub fn stats_breakdown(
    game_state: &GameState,
    player: PlayerId,
) -> Result<(StatBonuses, EffectiveStats), GameError> {
    let entity = game_state.player_entity(player)?;
    let bonuses = stat_bonuses(&game_state.world, &game_state.catalog, entity);
    let progress = systems::helpers::component::<GameProgress>(&game_state.world, entity);
    let stats = EffectiveStats::compute(&progress, &bonuses);
    Ok((bonuses, stats))
}

/// Equips or unequips an inventory entry. Returns whether anything changed.
pub fn set_equipped(
    game_state: &mut GameState,
    player: PlayerId,
    entry: InventoryEntryId,
    equipped: bool,
) -> Result<bool, GameError> {
    let entity = game_state.ensure_playable(player)?;
    let max_equip =
        systems::helpers::component::<GameProgress>(&game_state.world, entity).max_equip;

    let changed = systems::helpers::component_mut::<Inventory>(&mut game_state.world, entity)
        .set_equipped(&entry, equipped, max_equip)?;

    if changed {
        debug!(
            "Player {} {} entry {}",
            player,
            if equipped { "equipped" } else { "unequipped" },
            entry
        );
        game_state.emit(EventKind::EquipChanged {
            player,
            entry,
            equipped,
        });
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        components::items::inventory::EquipError,
        engine::error::AccessError,
        registry::items::{
            GOLDEN_MOUSE_ID, LUCKY_PENNY_ID, PEBBLE_ID, STEEL_CURSOR_ID, WOODEN_CURSOR_ID,
        },
        test_utils::fixtures::{self, game_state},
    };

    #[rstest]
    fn equipping_changes_effective_stats(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        let cursor = fixtures::give_item(&mut game_state, alice, &STEEL_CURSOR_ID, 2);
        let penny = fixtures::give_item(&mut game_state, alice, &LUCKY_PENNY_ID, 1);

        assert!(set_equipped(&mut game_state, alice, cursor, true).unwrap());
        assert!(set_equipped(&mut game_state, alice, penny, true).unwrap());

        let (bonuses, stats) = stats_breakdown(&game_state, alice).unwrap();
        // Two cursors in one stack still count once
        assert_eq!(bonuses.click_power.total(), 3.0);
        assert_eq!(stats.click_power, 4);
        assert_eq!(stats.coin_multiplier, 1.05);
    }

    #[rstest]
    fn equip_limit_uses_max_equip(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        let entries: Vec<_> = [
            &*WOODEN_CURSOR_ID,
            &*STEEL_CURSOR_ID,
            &*GOLDEN_MOUSE_ID,
            &*PEBBLE_ID,
        ]
        .into_iter()
        .map(|id| fixtures::give_item(&mut game_state, alice, id, 1))
        .collect();

        for entry in &entries[..3] {
            set_equipped(&mut game_state, alice, *entry, true).unwrap();
        }
        assert!(matches!(
            set_equipped(&mut game_state, alice, entries[3], true),
            Err(GameError::Equip(EquipError::SlotsFull { max: 3 }))
        ));

        // Unequipping is always allowed and frees a slot
        assert!(set_equipped(&mut game_state, alice, entries[0], false).unwrap());
        assert!(set_equipped(&mut game_state, alice, entries[3], true).unwrap());
    }

    #[rstest]
    fn repeated_equip_is_idempotent(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        let entry = fixtures::give_item(&mut game_state, alice, &PEBBLE_ID, 1);
        game_state.take_events();

        assert!(set_equipped(&mut game_state, alice, entry, true).unwrap());
        assert!(!set_equipped(&mut game_state, alice, entry, true).unwrap());
        assert_eq!(game_state.take_events().len(), 1);
    }

    #[rstest]
    fn equip_blocked_during_maintenance(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        let entry = fixtures::give_item(&mut game_state, alice, &PEBBLE_ID, 1);
        game_state.maintenance.enabled = true;
        assert!(matches!(
            set_equipped(&mut game_state, alice, entry, true),
            Err(GameError::Access(AccessError::Maintenance { .. }))
        ));
    }
}
