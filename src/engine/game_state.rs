use std::collections::HashMap;

use hecs::{Entity, World};
use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, info};

use crate::{
    components::{
        announcement::Announcement,
        chat::ChatMessage,
        currency::{CurrencyTransaction, Wallet},
        gacha::GachaRecord,
        id::{ItemId, ListenerId, PlayerId},
        items::{inventory::Inventory, item::Item},
        profile::{Profile, ProfileError, Role, normalize_username},
        progress::GameProgress,
        settings::{EconomySettings, MaintenanceSettings},
        trade::Trade,
    },
    engine::{
        error::{AccessError, GameError},
        event::{Event, EventCallback, EventFilter, EventKind, EventListener, EventLog},
    },
    registry::registry::ItemRegistry,
    systems,
};

pub struct GameState {
    pub world: World,
    pub players: HashMap<PlayerId, Entity>,

    pub catalog: ItemRegistry,
    pub settings: EconomySettings,
    pub maintenance: MaintenanceSettings,

    pub trades: Vec<Trade>,
    pub chat_log: Vec<ChatMessage>,
    pub announcements: Vec<Announcement>,
    pub gacha_history: Vec<GachaRecord>,
    pub transactions: Vec<CurrencyTransaction>,

    pub event_log: EventLog,
    event_listeners: Vec<EventListener>,

    pub rng: StdRng,
}

impl GameState {
    pub fn new(catalog: ItemRegistry, settings: EconomySettings) -> Self {
        Self::with_rng(catalog, settings, StdRng::from_os_rng())
    }

    /// Same as `new`, but every random draw is reproducible.
    pub fn with_seed(catalog: ItemRegistry, settings: EconomySettings, seed: u64) -> Self {
        Self::with_rng(catalog, settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: ItemRegistry, settings: EconomySettings, rng: StdRng) -> Self {
        Self {
            world: World::new(),
            players: HashMap::new(),
            catalog,
            settings,
            maintenance: MaintenanceSettings::default(),
            trades: Vec::new(),
            chat_log: Vec::new(),
            announcements: Vec::new(),
            gacha_history: Vec::new(),
            transactions: Vec::new(),
            event_log: EventLog::new(),
            event_listeners: Vec::new(),
            rng,
        }
    }

    pub fn register_player(
        &mut self,
        username: &str,
        role: Role,
    ) -> Result<PlayerId, GameError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ProfileError::EmptyUsername.into());
        }
        if self.find_player_by_username(username).is_some() {
            return Err(ProfileError::UsernameTaken(username.to_string()).into());
        }

        let id = PlayerId::new_v4();
        let profile = Profile::new(id, username, role);
        self.spawn_player(
            profile,
            Wallet::new(self.settings.starting_coins, self.settings.starting_gems),
            GameProgress::new(&self.settings),
            Inventory::new(),
        );

        info!("Registered player {} ({}) as {}", username, id, role);
        self.emit(EventKind::PlayerRegistered { player: id });
        Ok(id)
    }

    pub(crate) fn spawn_player(
        &mut self,
        profile: Profile,
        wallet: Wallet,
        progress: GameProgress,
        inventory: Inventory,
    ) -> Entity {
        let id = profile.id;
        let entity = self.world.spawn((profile, wallet, progress, inventory));
        self.players.insert(id, entity);
        entity
    }

    pub fn player_entity(&self, player: PlayerId) -> Result<Entity, GameError> {
        self.players
            .get(&player)
            .copied()
            .ok_or(GameError::UnknownPlayer(player))
    }

    pub fn profile(&self, player: PlayerId) -> Result<Profile, GameError> {
        let entity = self.player_entity(player)?;
        Ok(systems::helpers::cloned::<Profile>(
            &self.world,
            entity,
        ))
    }

    pub fn find_player_by_username(&self, username: &str) -> Option<PlayerId> {
        let username = normalize_username(username);
        self.world
            .query::<&Profile>()
            .iter()
            .find(|(_, profile)| normalize_username(&profile.username) == username)
            .map(|(_, profile)| profile.id)
    }

    pub fn usernames(&self) -> Vec<String> {
        self.world
            .query::<&Profile>()
            .iter()
            .map(|(_, profile)| profile.username.clone())
            .collect()
    }

    pub fn item(&self, item_id: &ItemId) -> Option<&Item> {
        self.catalog.get(item_id)
    }

    /// Gate for gameplay mutations. Admins keep playing through maintenance.
    pub fn ensure_playable(&self, player: PlayerId) -> Result<Entity, GameError> {
        let entity = self.player_entity(player)?;
        if self.maintenance.enabled
            && !systems::helpers::component::<Profile>(&self.world, entity).is_admin()
        {
            return Err(AccessError::Maintenance {
                message: self.maintenance.message.clone(),
            }
            .into());
        }
        Ok(entity)
    }

    pub fn ensure_admin(&self, player: PlayerId) -> Result<Entity, GameError> {
        let entity = self.player_entity(player)?;
        if !systems::helpers::component::<Profile>(&self.world, entity).is_admin() {
            return Err(AccessError::NotAdmin { player }.into());
        }
        Ok(entity)
    }

    pub fn record_transaction(&mut self, transaction: CurrencyTransaction) {
        debug!(
            "Transaction {}: {} {} for {} ({})",
            transaction.id,
            transaction.amount,
            transaction.currency,
            transaction.player,
            transaction.reason
        );
        self.transactions.push(transaction);
    }

    /// Appends the event to the log and hands it to every matching listener,
    /// in subscription order.
    pub fn emit(&mut self, kind: EventKind) {
        let event = Event::new(kind);
        for listener in &self.event_listeners {
            if listener.matches(&event) {
                listener.notify(&event);
            }
        }
        self.event_log.push(event);
    }

    pub fn subscribe(&mut self, filter: EventFilter, callback: EventCallback) -> ListenerId {
        let listener = EventListener::new(filter, callback);
        let id = listener.id;
        self.event_listeners.push(listener);
        id
    }

    pub fn unsubscribe(&mut self, listener: ListenerId) -> bool {
        let before = self.event_listeners.len();
        self.event_listeners.retain(|l| l.id != listener);
        self.event_listeners.len() != before
    }

    pub fn take_events(&mut self) -> EventLog {
        std::mem::take(&mut self.event_log)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{engine::event::filters, registry::items::default_catalog};

    fn game_state() -> GameState {
        GameState::with_seed(default_catalog(), EconomySettings::default(), 7)
    }

    #[test]
    fn register_player_with_starting_balance() {
        let mut game_state = game_state();
        let id = game_state.register_player("alice", Role::User).unwrap();
        let entity = game_state.player_entity(id).unwrap();

        let wallet = systems::helpers::component::<Wallet>(&game_state.world, entity);
        assert_eq!(wallet.coins(), 0);
        assert_eq!(wallet.gems(), 10);
        drop(wallet);

        assert_eq!(game_state.find_player_by_username("ALICE "), Some(id));
    }

    #[test]
    fn usernames_are_unique_and_non_empty() {
        let mut game_state = game_state();
        game_state.register_player("alice", Role::User).unwrap();
        assert!(matches!(
            game_state.register_player("Alice", Role::User),
            Err(GameError::Profile(ProfileError::UsernameTaken(_)))
        ));
        assert!(matches!(
            game_state.register_player("   ", Role::User),
            Err(GameError::Profile(ProfileError::EmptyUsername))
        ));
    }

    #[test]
    fn maintenance_blocks_users_not_admins() {
        let mut game_state = game_state();
        let user = game_state.register_player("alice", Role::User).unwrap();
        let admin = game_state.register_player("root", Role::Admin).unwrap();
        game_state.maintenance.enabled = true;

        assert!(matches!(
            game_state.ensure_playable(user),
            Err(GameError::Access(AccessError::Maintenance { .. }))
        ));
        assert!(game_state.ensure_playable(admin).is_ok());
    }

    #[test]
    fn listeners_receive_matching_events() {
        let mut game_state = game_state();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let listener = game_state.subscribe(
            filters::matching(|event| matches!(event.kind, EventKind::PlayerRegistered { .. })),
            Arc::new(move |event: &Event| sink.lock().unwrap().push(event.id)),
        );

        game_state.register_player("alice", Role::User).unwrap();
        game_state.emit(EventKind::SettingsChanged);
        assert_eq!(received.lock().unwrap().len(), 1);

        assert!(game_state.unsubscribe(listener));
        assert!(!game_state.unsubscribe(listener));
        game_state.register_player("bob", Role::User).unwrap();
        assert_eq!(received.lock().unwrap().len(), 1);

        assert_eq!(game_state.take_events().len(), 3);
        assert!(game_state.event_log.is_empty());
    }
}
