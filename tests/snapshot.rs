extern crate clicker_rs;

mod tests {
    use clicker_rs::{
        components::{
            gacha::GachaTier,
            items::inventory::InventoryFilter,
            settings::{EconomySettings, MaintenanceSettings, RarityWeights, SettingsError},
            trade::TradeLine,
            upgrade::UpgradeKind,
        },
        engine::{
            error::GameError,
            game_state::GameState,
            snapshot::{SNAPSHOT_VERSION, Snapshot, SnapshotError},
        },
        registry::items::{PEBBLE_ID, default_catalog},
        systems,
        test_utils::fixtures,
    };
    use uuid::Uuid;

    fn played_game() -> GameState {
        let settings = EconomySettings {
            gem_chance_per_click: 0.0,
            ..Default::default()
        };
        let mut game_state = GameState::with_seed(default_catalog(), settings, 99);
        let alice = fixtures::alice(&mut game_state);
        let bob = fixtures::bob(&mut game_state);
        let admin = fixtures::admin(&mut game_state);

        fixtures::grant_coins(&mut game_state, alice, 1_000);
        systems::progress::buy_upgrade(&mut game_state, alice, UpgradeKind::AutoClicker).unwrap();
        systems::progress::tick(&mut game_state, alice, 30).unwrap();
        systems::gacha::pull(&mut game_state, alice, GachaTier::Basic).unwrap();
        systems::gacha::pull(&mut game_state, bob, GachaTier::Legendary).unwrap();
        fixtures::give_item(&mut game_state, alice, &PEBBLE_ID, 1);
        systems::trading::create_trade(
            &mut game_state,
            alice,
            "bob",
            Some(TradeLine::new(PEBBLE_ID.clone(), 1)),
            None,
            Some("for you".to_string()),
        )
        .unwrap();
        systems::chat::send_global(&mut game_state, bob, "thanks!").unwrap();
        systems::announcements::create_announcement(&mut game_state, admin, "Hello", "World")
            .unwrap();
        systems::admin::set_maintenance(
            &mut game_state,
            admin,
            MaintenanceSettings {
                enabled: true,
                ..Default::default()
            },
        )
        .unwrap();
        game_state
    }

    #[test]
    fn snapshot_round_trip_through_disk() {
        let game_state = played_game();
        let snapshot = game_state.snapshot();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        snapshot.save_to_path(&path).unwrap();

        let loaded = Snapshot::load_from_path(&path).unwrap();
        assert_eq!(loaded, snapshot);

        let restored = GameState::from_snapshot(loaded, Some(1)).unwrap();
        let again = restored.snapshot();
        assert_eq!(again.players, snapshot.players);
        assert_eq!(again.catalog, snapshot.catalog);
        assert_eq!(again.trades, snapshot.trades);
        assert_eq!(again.chat_log, snapshot.chat_log);
        assert_eq!(again.announcements, snapshot.announcements);
        assert_eq!(again.gacha_history, snapshot.gacha_history);
        assert_eq!(again.transactions, snapshot.transactions);
        assert!(restored.maintenance.enabled);

        let alice = restored.find_player_by_username("alice").unwrap();
        let bob = restored.find_player_by_username("bob").unwrap();
        assert_eq!(systems::trading::incoming(&restored, bob).len(), 1);
        assert_eq!(
            systems::leaderboard::rank_of(&restored, alice).unwrap(),
            1
        );
        assert_eq!(
            systems::inventory::inventory_view(&restored, alice, InventoryFilter::All)
                .unwrap()
                .len(),
            game_state
                .snapshot()
                .players
                .iter()
                .find(|player| player.profile.id == alice)
                .unwrap()
                .inventory
                .entries()
                .len()
        );
    }

    #[test]
    fn newer_snapshot_versions_are_refused() {
        let mut snapshot = played_game().snapshot();
        snapshot.version = SNAPSHOT_VERSION + 1;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.json");
        snapshot.save_to_path(&path).unwrap();

        assert!(matches!(
            Snapshot::load_from_path(&path),
            Err(SnapshotError::UnsupportedVersion(version)) if version == SNAPSHOT_VERSION + 1
        ));
    }

    #[test]
    fn duplicate_players_are_refused() {
        let mut snapshot = played_game().snapshot();
        let copy = snapshot.players[0].clone();
        snapshot.players.push(copy);

        assert!(matches!(
            GameState::from_snapshot(snapshot, None),
            Err(SnapshotError::DuplicatePlayer(_))
        ));
    }

    #[test]
    fn clashing_usernames_are_refused() {
        let mut snapshot = played_game().snapshot();
        let mut copy = snapshot.players[0].clone();
        copy.profile.id = Uuid::new_v4();
        copy.profile.username = format!(" {} ", copy.profile.username.to_uppercase());
        let expected = snapshot.players[0].profile.username.clone();
        snapshot.players.push(copy);

        match GameState::from_snapshot(snapshot, None) {
            Err(SnapshotError::DuplicateUsername(username)) => assert_eq!(username, expected),
            other => panic!("expected a username clash, got {:?}", other.err()),
        }
    }

    #[test]
    fn invalid_settings_are_refused() {
        let mut snapshot = played_game().snapshot();
        snapshot.settings.gacha.premium.weights = RarityWeights::new(0, 0, 0, 0);

        assert!(matches!(
            GameState::from_snapshot(snapshot, None),
            Err(SnapshotError::Settings(SettingsError::ZeroWeights(
                GachaTier::Premium
            )))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let error: GameError = Snapshot::load_from_path(dir.path().join("nope.json"))
            .unwrap_err()
            .into();
        assert!(matches!(error, GameError::Snapshot(SnapshotError::Io(_))));
    }
}
