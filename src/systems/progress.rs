use rand::Rng;
use tracing::{debug, info};

use crate::{
    components::{
        currency::{Currency, CurrencyTransaction, Price, Wallet},
        id::PlayerId,
        items::bonuses::{EffectiveStats, StatBonuses},
        profile::Profile,
        progress::{ClickOutcome, GameProgress, IdleOutcome},
        upgrade::{UpgradeError, UpgradeKind},
    },
    engine::{error::GameError, event::EventKind, game_state::GameState},
    systems,
};

/// Everything the play screen shows about one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStatus {
    pub profile: Profile,
    pub wallet: Wallet,
    pub progress: GameProgress,
    pub bonuses: StatBonuses,
    pub stats: EffectiveStats,
}

pub fn player_status(game_state: &GameState, player: PlayerId) -> Result<PlayerStatus, GameError> {
    let entity = game_state.player_entity(player)?;
    let (bonuses, stats) = systems::loadout::stats_breakdown(game_state, player)?;
    Ok(PlayerStatus {
        profile: systems::helpers::cloned::<Profile>(&game_state.world, entity),
        wallet: systems::helpers::cloned::<Wallet>(&game_state.world, entity),
        progress: systems::helpers::cloned::<GameProgress>(
            &game_state.world,
            entity,
        ),
        bonuses,
        stats,
    })
}

pub fn click(game_state: &mut GameState, player: PlayerId) -> Result<ClickOutcome, GameError> {
    let entity = game_state.ensure_playable(player)?;
    let stats = systems::loadout::effective_stats(&game_state.world, &game_state.catalog, entity);
    let gem_chance = game_state.settings.gem_chance_per_click.clamp(0.0, 1.0);
    let found_gem = game_state.rng.random_bool(gem_chance);

    let outcome = systems::helpers::component_mut::<GameProgress>(&mut game_state.world, entity)
        .register_click(&stats, found_gem);
    {
        let mut wallet =
            systems::helpers::component_mut::<Wallet>(&mut game_state.world, entity);
        wallet.deposit(Currency::Coins, outcome.coins_gained);
        wallet.deposit(Currency::Gems, outcome.gems_gained);
    }

    if found_gem {
        debug!("Player {} found a gem while clicking", player);
    }
    game_state.emit(EventKind::Clicked {
        player,
        score_gained: outcome.score_gained,
        coins_gained: outcome.coins_gained,
        gems_gained: outcome.gems_gained,
    });
    Ok(outcome)
}

/// Auto-clicker income for one player over `seconds`.
pub fn tick(
    game_state: &mut GameState,
    player: PlayerId,
    seconds: u64,
) -> Result<IdleOutcome, GameError> {
    let entity = game_state.ensure_playable(player)?;
    let stats = systems::loadout::effective_stats(&game_state.world, &game_state.catalog, entity);

    let outcome = systems::helpers::component_mut::<GameProgress>(&mut game_state.world, entity)
        .register_idle(&stats, seconds);
    if outcome == IdleOutcome::default() {
        return Ok(outcome);
    }
    systems::helpers::component_mut::<Wallet>(&mut game_state.world, entity)
        .deposit(Currency::Coins, outcome.coins_gained);

    game_state.emit(EventKind::IdleIncome {
        player,
        score_gained: outcome.score_gained,
        coins_gained: outcome.coins_gained,
    });
    Ok(outcome)
}

/// Runs `tick` for every player allowed to play right now.
pub fn tick_all(game_state: &mut GameState, seconds: u64) -> Vec<(PlayerId, IdleOutcome)> {
    let mut players: Vec<PlayerId> = game_state.players.keys().copied().collect();
    players.sort();
    players
        .into_iter()
        .filter_map(|player| {
            tick(game_state, player, seconds)
                .ok()
                .filter(|outcome| *outcome != IdleOutcome::default())
                .map(|outcome| (player, outcome))
        })
        .collect()
}

pub fn upgrade_cost(
    game_state: &GameState,
    player: PlayerId,
    upgrade: UpgradeKind,
) -> Result<Price, GameError> {
    let entity = game_state.player_entity(player)?;
    let progress = systems::helpers::component::<GameProgress>(&game_state.world, entity);
    Ok(upgrade.cost(&progress, &game_state.settings))
}

pub fn buy_upgrade(
    game_state: &mut GameState,
    player: PlayerId,
    upgrade: UpgradeKind,
) -> Result<Price, GameError> {
    let entity = game_state.ensure_playable(player)?;
    let progress = systems::helpers::cloned::<GameProgress>(&game_state.world, entity);
    let cost = upgrade.cost(&progress, &game_state.settings);

    if !upgrade.can_apply(&progress, &game_state.settings) {
        return Err(UpgradeError::MaxLevel(upgrade).into());
    }
    systems::helpers::component_mut::<Wallet>(&mut game_state.world, entity)
        .spend(&cost)
        .map_err(UpgradeError::from)?;

    {
        let mut progress =
            systems::helpers::component_mut::<GameProgress>(&mut game_state.world, entity);
        upgrade.apply(&mut progress, &game_state.settings)?;
        progress.record_spend(cost.amount);
    }

    info!("Player {} bought {} for {}", player, upgrade, cost);
    game_state.record_transaction(CurrencyTransaction::spend(
        player,
        &cost,
        format!("upgrade:{}", upgrade),
    ));
    game_state.emit(EventKind::UpgradePurchased {
        player,
        upgrade,
        cost,
    });
    Ok(cost)
}

/// Puts a player back to a fresh start. Players may reset themselves, admins
/// may reset anyone.
pub fn reset_progress(
    game_state: &mut GameState,
    actor: PlayerId,
    target: PlayerId,
) -> Result<(), GameError> {
    let entity = if actor == target {
        game_state.ensure_playable(actor)?
    } else {
        game_state.ensure_admin(actor)?;
        game_state.player_entity(target)?
    };

    systems::helpers::component_mut::<GameProgress>(&mut game_state.world, entity).reset();

    let starting = [
        (Currency::Coins, game_state.settings.starting_coins),
        (Currency::Gems, game_state.settings.starting_gems),
    ];
    for (currency, amount) in starting {
        let previous = {
            let mut wallet =
                systems::helpers::component_mut::<Wallet>(&mut game_state.world, entity);
            let previous = wallet.balance(currency);
            wallet.set(currency, amount);
            previous
        };
        if amount > previous {
            game_state.record_transaction(CurrencyTransaction::grant(
                target,
                currency,
                amount - previous,
                "reset",
            ));
        } else if previous > amount {
            game_state.record_transaction(CurrencyTransaction::spend(
                target,
                &Price {
                    currency,
                    amount: previous - amount,
                },
                "reset",
            ));
        }
    }

    info!("Player {} progress reset by {}", target, actor);
    game_state.emit(EventKind::ProgressReset { player: target });
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        components::{currency::WalletError, settings::EconomySettings},
        engine::error::AccessError,
        registry::items::{CLOCKWORK_HAND_ID, TREASURE_MAP_ID},
        test_utils::fixtures::{self, game_state},
    };

    #[rstest]
    fn click_earns_score(mut game_state: GameState) {
        game_state.settings.gem_chance_per_click = 0.0;
        let alice = fixtures::alice(&mut game_state);

        for _ in 0..10 {
            click(&mut game_state, alice).unwrap();
        }

        let status = player_status(&game_state, alice).unwrap();
        assert_eq!(status.progress.score, 10);
        assert_eq!(status.progress.clicks, 10);
        // Click power 1 earns no coins
        assert_eq!(status.wallet.coins(), 0);
        assert_eq!(status.wallet.gems(), 10);
    }

    #[rstest]
    fn click_always_finds_gem_at_full_chance(mut game_state: GameState) {
        game_state.settings.gem_chance_per_click = 1.0;
        let alice = fixtures::alice(&mut game_state);
        let outcome = click(&mut game_state, alice).unwrap();
        assert_eq!(outcome.gems_gained, 1);
        assert_eq!(player_status(&game_state, alice).unwrap().wallet.gems(), 11);
    }

    #[rstest]
    fn click_coins_use_multiplier(mut game_state: GameState) {
        game_state.settings.gem_chance_per_click = 0.0;
        let alice = fixtures::alice(&mut game_state);
        fixtures::set_progress(&mut game_state, alice, |progress| progress.click_power = 10);
        let map = fixtures::give_item(&mut game_state, alice, &TREASURE_MAP_ID, 1);
        systems::loadout::set_equipped(&mut game_state, alice, map, true).unwrap();

        let outcome = click(&mut game_state, alice).unwrap();
        // floor(10 / 5 * 1.35)
        assert_eq!(outcome.coins_gained, 2);
        assert_eq!(outcome.score_gained, 10);
    }

    #[rstest]
    fn tick_without_auto_clickers_is_a_no_op(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        game_state.take_events();
        assert_eq!(tick(&mut game_state, alice, 60).unwrap(), IdleOutcome::default());
        assert!(game_state.take_events().is_empty());
    }

    #[rstest]
    fn tick_uses_equipped_auto_power(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        fixtures::set_progress(&mut game_state, alice, |progress| progress.auto_clickers = 2);
        let hand = fixtures::give_item(&mut game_state, alice, &CLOCKWORK_HAND_ID, 1);
        systems::loadout::set_equipped(&mut game_state, alice, hand, true).unwrap();

        let outcome = tick(&mut game_state, alice, 5).unwrap();
        // 2 clickers * (1 + 3) power * 5 seconds
        assert_eq!(outcome.score_gained, 40);
        assert_eq!(outcome.coins_gained, 4);
    }

    #[rstest]
    fn tick_all_skips_idle_players(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        let _bob = fixtures::bob(&mut game_state);
        fixtures::set_progress(&mut game_state, alice, |progress| progress.auto_clickers = 1);

        let outcomes = tick_all(&mut game_state, 10);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].0, alice);
        assert_eq!(outcomes[0].1.score_gained, 10);
    }

    #[rstest]
    fn buy_upgrade_spends_coins(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        fixtures::grant_coins(&mut game_state, alice, 260);

        assert_eq!(
            buy_upgrade(&mut game_state, alice, UpgradeKind::ClickPower).unwrap(),
            Price::coins(100)
        );
        assert_eq!(
            upgrade_cost(&game_state, alice, UpgradeKind::ClickPower).unwrap(),
            Price::coins(150)
        );
        buy_upgrade(&mut game_state, alice, UpgradeKind::ClickPower).unwrap();

        let status = player_status(&game_state, alice).unwrap();
        assert_eq!(status.progress.click_power, 3);
        assert_eq!(status.progress.total_spent, 250);
        assert_eq!(status.wallet.coins(), 10);
        // Clicks are untouched by purchases
        assert_eq!(status.progress.clicks, 0);

        let spent: i64 = game_state
            .transactions
            .iter()
            .filter(|t| t.player == alice && t.reason.starts_with("upgrade"))
            .map(|t| t.amount)
            .sum();
        assert_eq!(spent, -250);
    }

    #[rstest]
    fn buy_upgrade_without_funds(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        fixtures::grant_coins(&mut game_state, alice, 499);

        assert!(matches!(
            buy_upgrade(&mut game_state, alice, UpgradeKind::AutoClicker),
            Err(GameError::Upgrade(UpgradeError::Wallet(
                WalletError::InsufficientFunds {
                    needed: 500,
                    available: 499,
                    ..
                }
            )))
        ));
        let status = player_status(&game_state, alice).unwrap();
        assert_eq!(status.wallet.coins(), 499);
        assert_eq!(status.progress.auto_clickers, 0);
    }

    #[rstest]
    fn slot_upgrades(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        fixtures::grant_coins(&mut game_state, alice, 300);

        buy_upgrade(&mut game_state, alice, UpgradeKind::InventorySlots).unwrap();
        buy_upgrade(&mut game_state, alice, UpgradeKind::EquipSlots).unwrap();

        let status = player_status(&game_state, alice).unwrap();
        assert_eq!(status.progress.max_inventory, 25);
        assert_eq!(status.progress.max_equip, 4);
        assert_eq!(status.wallet.coins(), 0);
    }

    #[rstest]
    fn self_reset_keeps_slots(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        fixtures::grant_coins(&mut game_state, alice, 1000);
        buy_upgrade(&mut game_state, alice, UpgradeKind::EquipSlots).unwrap();
        buy_upgrade(&mut game_state, alice, UpgradeKind::ClickPower).unwrap();

        reset_progress(&mut game_state, alice, alice).unwrap();

        let status = player_status(&game_state, alice).unwrap();
        let settings = EconomySettings::default();
        assert_eq!(status.progress.click_power, 1);
        assert_eq!(status.progress.total_spent, 0);
        assert_eq!(status.progress.max_equip, 4);
        assert_eq!(status.wallet.coins(), settings.starting_coins);
        assert_eq!(status.wallet.gems(), settings.starting_gems);
    }

    #[rstest]
    fn resetting_others_requires_admin(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        let bob = fixtures::bob(&mut game_state);
        let admin = fixtures::admin(&mut game_state);

        assert!(matches!(
            reset_progress(&mut game_state, bob, alice),
            Err(GameError::Access(AccessError::NotAdmin { .. }))
        ));
        reset_progress(&mut game_state, admin, alice).unwrap();
    }

    #[rstest]
    fn gameplay_blocked_during_maintenance(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        let admin = fixtures::admin(&mut game_state);
        game_state.maintenance.enabled = true;

        assert!(matches!(
            click(&mut game_state, alice),
            Err(GameError::Access(AccessError::Maintenance { .. }))
        ));
        assert!(click(&mut game_state, admin).is_ok());
        // Reads stay available
        assert!(player_status(&game_state, alice).is_ok());
    }
}
