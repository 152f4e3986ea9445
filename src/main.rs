use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clicker_rs::{
    components::{
        gacha::GachaTier,
        id::PlayerId,
        items::inventory::InventoryFilter,
        profile::Role,
        settings::EconomySettings,
        upgrade::UpgradeKind,
    },
    engine::{error::GameError, game_state::GameState},
    registry::{items::default_catalog, registry::ItemRegistry},
    systems,
};
use strum::IntoEnumIterator;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "clicker")]
#[command(about = "Clicker economy sandbox", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the drop rates of every gacha tier
    Rates {
        /// Economy settings JSON file
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Directory of item JSON files to use instead of the built-in catalog
        #[arg(short, long)]
        items_dir: Option<PathBuf>,
    },

    /// List the item catalog
    Catalog {
        /// Directory of item JSON files to use instead of the built-in catalog
        #[arg(short, long)]
        items_dir: Option<PathBuf>,
    },

    /// Run bot players against the economy and print the leaderboard
    Simulate {
        /// Number of bot players
        #[arg(short, long, default_value_t = 5)]
        players: usize,

        /// Simulated seconds of play
        #[arg(long, default_value_t = 600)]
        seconds: u64,

        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Economy settings JSON file
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Directory of item JSON files to use instead of the built-in catalog
        #[arg(short, long)]
        items_dir: Option<PathBuf>,

        /// Write a snapshot of the final state to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn load_catalog(items_dir: Option<PathBuf>) -> Result<ItemRegistry, GameError> {
    match items_dir {
        Some(dir) => Ok(ItemRegistry::load_from_directory(dir)?),
        None => Ok(default_catalog()),
    }
}

fn load_settings(path: Option<PathBuf>) -> Result<EconomySettings, GameError> {
    match path {
        Some(path) => Ok(EconomySettings::load_from_path(path)?),
        None => Ok(EconomySettings::default()),
    }
}

fn print_rates(settings: &EconomySettings, catalog: &ItemRegistry) {
    for tier in GachaTier::iter() {
        let odds = systems::gacha::odds(settings, catalog, tier);
        println!("{} ({})", tier, odds.price);
        for (rarity, chance) in &odds.odds {
            println!("  {:<10} {:>6.2}%", rarity.to_string(), chance * 100.0);
        }
    }
}

fn print_catalog(catalog: &ItemRegistry) {
    for item in catalog.sorted() {
        let effect = item
            .effect
            .as_ref()
            .map(|effect| format!("{} +{}", effect.kind, effect.value))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<24} {:<22} {}",
            item.rarity.to_string(),
            item.id.to_string(),
            item.name,
            effect
        );
    }
}

/// One bot turn: buy the cheapest affordable upgrade, pull from the best
/// tier it can pay for and equip anything new.
fn bot_turn(game_state: &mut GameState, bot: PlayerId) -> Result<(), GameError> {
    let status = systems::progress::player_status(game_state, bot)?;

    let cheapest = UpgradeKind::iter()
        .filter_map(|upgrade| {
            systems::progress::upgrade_cost(game_state, bot, upgrade)
                .ok()
                .map(|cost| (upgrade, cost))
        })
        .filter(|(_, cost)| status.wallet.can_afford(cost))
        .min_by_key(|(_, cost)| cost.amount);
    if let Some((upgrade, _)) = cheapest {
        systems::progress::buy_upgrade(game_state, bot, upgrade)?;
    }

    let wallet = systems::progress::player_status(game_state, bot)?.wallet;
    let tier = GachaTier::iter()
        .rev()
        .find(|tier| wallet.can_afford(&tier.settings(&game_state.settings).price));
    let Some(tier) = tier else {
        return Ok(());
    };

    match systems::gacha::pull(game_state, bot, tier) {
        Ok(result) if result.is_new => {
            let entry = systems::inventory::inventory_view(game_state, bot, InventoryFilter::All)?
                .into_iter()
                .find(|view| view.entry.item_id == result.item.id)
                .map(|view| view.entry.id);
            if let Some(entry) = entry {
                if let Err(error) = systems::loadout::set_equipped(game_state, bot, entry, true) {
                    debug!("Bot {} kept {} in the bag: {}", bot, result.item.name, error);
                }
            }
        }
        Ok(_) => {}
        Err(GameError::Inventory(error)) => debug!("Bot {} skipped a pull: {}", bot, error),
        Err(error) => return Err(error),
    }
    Ok(())
}

fn simulate(
    mut game_state: GameState,
    players: usize,
    seconds: u64,
    save: Option<PathBuf>,
) -> Result<(), GameError> {
    let bots: Vec<PlayerId> = (0..players)
        .map(|index| game_state.register_player(&format!("bot{:02}", index + 1), Role::User))
        .collect::<Result<_, _>>()?;

    for second in 0..seconds {
        for (index, bot) in bots.iter().enumerate() {
            for _ in 0..=(index % 5) {
                systems::progress::click(&mut game_state, *bot)?;
            }
        }
        systems::progress::tick_all(&mut game_state, 1);

        if second % 10 == 9 {
            for bot in &bots {
                bot_turn(&mut game_state, *bot)?;
            }
        }
        game_state.take_events();
    }

    info!(
        "Simulated {} seconds for {} players, {} gacha pulls",
        seconds,
        players,
        game_state.gacha_history.len()
    );

    for entry in systems::leaderboard::leaderboard(&game_state, game_state.settings.leaderboard_size)
    {
        println!(
            "{:>3}. {:<10} {:>12} score {:>10} clicks",
            entry.rank, entry.username, entry.score, entry.clicks
        );
    }

    if let Some(path) = save {
        game_state.snapshot().save_to_path(&path)?;
        info!("Saved snapshot to {}", path.display());
    }
    Ok(())
}

fn main() -> Result<(), GameError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clicker_rs=info,clicker=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Rates {
            settings,
            items_dir,
        } => {
            let settings = load_settings(settings)?;
            let catalog = load_catalog(items_dir)?;
            print_rates(&settings, &catalog);
        }

        Command::Catalog { items_dir } => {
            print_catalog(&load_catalog(items_dir)?);
        }

        Command::Simulate {
            players,
            seconds,
            seed,
            settings,
            items_dir,
            save,
        } => {
            let settings = load_settings(settings)?;
            let catalog = load_catalog(items_dir)?;
            let game_state = match seed {
                Some(seed) => GameState::with_seed(catalog, settings, seed),
                None => GameState::new(catalog, settings),
            };
            simulate(game_state, players, seconds, save)?;
        }
    }

    Ok(())
}
