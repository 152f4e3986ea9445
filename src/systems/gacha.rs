use rand::{
    Rng,
    distr::{Distribution, weighted::WeightedIndex},
    seq::IndexedRandom,
};
use tracing::info;

use crate::{
    components::{
        currency::{Currency, CurrencyTransaction, Wallet},
        gacha::{GachaError, GachaRecord, GachaResult, GachaTier, RarityOdds},
        id::PlayerId,
        items::item::{Item, Rarity},
        progress::GameProgress,
        settings::{EconomySettings, RarityWeights},
    },
    engine::{
        error::GameError,
        event::{EventKind, ItemSource},
        game_state::GameState,
    },
    registry::registry::ItemRegistry,
    systems,
};

/// Rarities that can actually drop: positive weight and at least one item in
/// the catalog.
fn droppable(weights: &RarityWeights, catalog: &ItemRegistry) -> Vec<(Rarity, u32)> {
    weights
        .iter()
        .filter(|(rarity, weight)| *weight > 0 && !catalog.by_rarity(*rarity).is_empty())
        .collect()
}

pub fn odds(settings: &EconomySettings, catalog: &ItemRegistry, tier: GachaTier) -> RarityOdds {
    let tier_settings = tier.settings(settings);
    let droppable = droppable(&tier_settings.weights, catalog);
    let total: u64 = droppable.iter().map(|(_, weight)| u64::from(*weight)).sum();

    RarityOdds {
        tier,
        price: tier_settings.price,
        odds: droppable
            .into_iter()
            .map(|(rarity, weight)| (rarity, f64::from(weight) / total as f64))
            .collect(),
    }
}

pub fn draw_rarity<R: Rng + ?Sized>(
    rng: &mut R,
    weights: &RarityWeights,
    catalog: &ItemRegistry,
) -> Option<Rarity> {
    let droppable = droppable(weights, catalog);
    let index =
        WeightedIndex::new(droppable.iter().map(|(_, weight)| u64::from(*weight))).ok()?;
    Some(droppable[index.sample(rng)].0)
}

/// Draws a rarity by weight, then an item uniformly within that rarity.
pub fn draw_item<R: Rng + ?Sized>(
    rng: &mut R,
    settings: &EconomySettings,
    catalog: &ItemRegistry,
    tier: GachaTier,
) -> Result<Item, GachaError> {
    let rarity = draw_rarity(rng, &tier.settings(settings).weights, catalog)
        .ok_or(GachaError::NoItemsAvailable(tier))?;
    catalog
        .by_rarity(rarity)
        .choose(rng)
        .map(|item| (*item).clone())
        .ok_or(GachaError::NoItemsAvailable(tier))
}

/// A single pull. Nothing changes unless every check passes and the item
/// lands in the inventory.
pub fn pull(
    game_state: &mut GameState,
    player: PlayerId,
    tier: GachaTier,
) -> Result<GachaResult, GameError> {
    let entity = game_state.ensure_playable(player)?;
    let price = tier.settings(&game_state.settings).price;

    let mut wallet = systems::helpers::cloned::<Wallet>(&game_state.world, entity);
    wallet.spend(&price)?;

    systems::inventory::check_room(&game_state.world, entity, 1)?;

    let item = draw_item(
        &mut game_state.rng,
        &game_state.settings,
        &game_state.catalog,
        tier,
    )?;

    let is_new = systems::inventory::add_item(&mut game_state.world, entity, &item.id, 1)?;
    systems::helpers::replace(&mut game_state.world, entity, wallet);
    if price.currency == Currency::Coins {
        systems::helpers::component_mut::<GameProgress>(&mut game_state.world, entity)
            .record_spend(price.amount);
    }

    let record = GachaRecord::new(player, tier, price, &item);
    let record_id = record.id;
    game_state.gacha_history.push(record);
    game_state.record_transaction(
        CurrencyTransaction::spend(player, &price, format!("gacha:{}", tier))
            .with_reference(record_id),
    );

    info!(
        "Player {} pulled {} ({}) from the {} tier{}",
        player,
        item.name,
        item.rarity,
        tier,
        if is_new { ", new!" } else { "" }
    );
    game_state.emit(EventKind::ItemObtained {
        player,
        item: item.id.clone(),
        quantity: 1,
        is_new,
        source: ItemSource::Gacha(tier),
    });

    Ok(GachaResult {
        item,
        is_new,
        record_id,
    })
}

/// The player's pulls, newest first.
pub fn history(game_state: &GameState, player: PlayerId) -> Vec<&GachaRecord> {
    game_state
        .gacha_history
        .iter()
        .rev()
        .filter(|record| record.player == player)
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::{
        components::{
            currency::{Price, WalletError},
            id::ItemId,
            items::inventory::{Inventory, InventoryError},
        },
        test_utils::fixtures::{self, game_state},
    };

    fn catalog(items: &[(&str, Rarity)]) -> ItemRegistry {
        ItemRegistry::from_entries(items.iter().map(|(id, rarity)| Item {
            id: ItemId::from_str(*id),
            name: id.to_string(),
            rarity: *rarity,
            ..Default::default()
        }))
        .unwrap()
    }

    #[rstest]
    fn odds_sum_to_one(game_state: GameState) {
        for tier in GachaTier::iter() {
            let odds = odds(&game_state.settings, &game_state.catalog, tier);
            let total: f64 = odds.odds.iter().map(|(_, chance)| chance).sum();
            assert!((total - 1.0).abs() < 1e-9, "{} odds sum to {}", tier, total);
        }
    }

    #[test]
    fn odds_skip_empty_rarities() {
        let settings = EconomySettings::default();
        let catalog = catalog(&[("item.a", Rarity::Common), ("item.b", Rarity::Rare)]);
        let odds = odds(&settings, &catalog, GachaTier::Basic);
        assert_eq!(odds.chance(Rarity::Legendary), 0.0);
        assert!((odds.chance(Rarity::Common) - 70.0 / 95.0).abs() < 1e-9);
        assert!((odds.chance(Rarity::Rare) - 25.0 / 95.0).abs() < 1e-9);
    }

    #[test]
    fn zero_weight_rarity_never_drops() {
        let mut settings = EconomySettings::default();
        settings.gacha.basic.weights = RarityWeights::new(0, 1, 0, 0);
        let catalog = catalog(&[("item.a", Rarity::Common), ("item.b", Rarity::Rare)]);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let item = draw_item(&mut rng, &settings, &catalog, GachaTier::Basic).unwrap();
            assert_eq!(item.rarity, Rarity::Rare);
        }
    }

    #[test]
    fn huge_weights_still_draw() {
        let mut settings = EconomySettings::default();
        settings.gacha.legendary.weights = RarityWeights::new(u32::MAX, u32::MAX, 1, 1);
        settings.validate().unwrap();
        let catalog = catalog(&[
            ("item.c", Rarity::Common),
            ("item.r", Rarity::Rare),
            ("item.e", Rarity::Epic),
            ("item.l", Rarity::Legendary),
        ]);

        let odds = odds(&settings, &catalog, GachaTier::Legendary);
        assert!(odds.chance(Rarity::Common) > 0.49);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let item = draw_item(&mut rng, &settings, &catalog, GachaTier::Legendary).unwrap();
            assert!(matches!(item.rarity, Rarity::Common | Rarity::Rare));
        }
    }

    #[test]
    fn draw_from_empty_catalog() {
        let settings = EconomySettings::default();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            draw_item(&mut rng, &settings, &ItemRegistry::new(), GachaTier::Premium),
            Err(GachaError::NoItemsAvailable(GachaTier::Premium))
        );
    }

    #[test]
    fn draws_follow_weights() {
        let settings = EconomySettings::default();
        let catalog = catalog(&[
            ("item.c", Rarity::Common),
            ("item.r", Rarity::Rare),
            ("item.e", Rarity::Epic),
            ("item.l", Rarity::Legendary),
        ]);
        let mut rng = StdRng::seed_from_u64(1234);
        let draws = 10_000;
        let commons = (0..draws)
            .filter(|_| {
                draw_rarity(&mut rng, &settings.gacha.basic.weights, &catalog)
                    == Some(Rarity::Common)
            })
            .count();
        let ratio = commons as f64 / draws as f64;
        assert!((ratio - 0.70).abs() < 0.03, "common ratio was {}", ratio);
    }

    #[rstest]
    fn pull_charges_and_adds_item(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        fixtures::grant_coins(&mut game_state, alice, 150);

        let result = pull(&mut game_state, alice, GachaTier::Basic).unwrap();
        assert!(result.is_new);

        let status = systems::progress::player_status(&game_state, alice).unwrap();
        assert_eq!(status.wallet.coins(), 50);
        assert_eq!(status.progress.total_spent, 100);

        let entity = game_state.player_entity(alice).unwrap();
        let inventory = systems::helpers::component::<Inventory>(&game_state.world, entity);
        assert_eq!(inventory.quantity_of(&result.item.id), 1);
        drop(inventory);

        let history = history(&game_state, alice);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].item_id, result.item.id);
        assert_eq!(history[0].price, Price::coins(100));
    }

    #[rstest]
    fn legendary_tier_costs_gems(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        pull(&mut game_state, alice, GachaTier::Legendary).unwrap();

        let status = systems::progress::player_status(&game_state, alice).unwrap();
        assert_eq!(status.wallet.gems(), 9);
        assert_eq!(status.progress.total_spent, 0);
    }

    #[rstest]
    fn failed_pull_changes_nothing(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        fixtures::grant_coins(&mut game_state, alice, 99);
        game_state.take_events();

        assert!(matches!(
            pull(&mut game_state, alice, GachaTier::Basic),
            Err(GameError::Wallet(WalletError::InsufficientFunds { .. }))
        ));
        assert!(game_state.gacha_history.is_empty());
        assert!(game_state.take_events().is_empty());
        assert_eq!(
            systems::progress::player_status(&game_state, alice)
                .unwrap()
                .wallet
                .coins(),
            99
        );
    }

    #[rstest]
    fn pull_with_full_inventory(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        fixtures::set_progress(&mut game_state, alice, |progress| progress.max_inventory = 0);

        assert!(matches!(
            pull(&mut game_state, alice, GachaTier::Legendary),
            Err(GameError::Inventory(InventoryError::Full { .. }))
        ));
        assert_eq!(
            systems::progress::player_status(&game_state, alice)
                .unwrap()
                .wallet
                .gems(),
            10
        );
    }

    #[rstest]
    fn pull_with_empty_catalog(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        game_state.catalog = ItemRegistry::new();
        assert!(matches!(
            pull(&mut game_state, alice, GachaTier::Legendary),
            Err(GameError::Gacha(GachaError::NoItemsAvailable(GachaTier::Legendary)))
        ));
        assert!(game_state.transactions.is_empty());
    }

    #[rstest]
    fn duplicate_pull_is_not_new(mut game_state: GameState) {
        let mut settings = EconomySettings::default();
        settings.gacha.legendary.weights = RarityWeights::new(0, 0, 0, 1);
        game_state.settings = settings;
        game_state.catalog = catalog(&[("item.only", Rarity::Legendary)]);
        let alice = fixtures::alice(&mut game_state);

        assert!(pull(&mut game_state, alice, GachaTier::Legendary).unwrap().is_new);
        assert!(!pull(&mut game_state, alice, GachaTier::Legendary).unwrap().is_new);
    }
}
