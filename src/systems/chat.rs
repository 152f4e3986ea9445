use tracing::debug;

use crate::{
    components::{
        chat::{ChatChannel, ChatError, ChatMessage, validate_body},
        id::{MessageId, PlayerId},
        profile::Profile,
    },
    engine::{error::GameError, event::EventKind, game_state::GameState},
    systems,
};

fn send(
    game_state: &mut GameState,
    sender: PlayerId,
    channel: ChatChannel,
    body: &str,
) -> Result<MessageId, GameError> {
    let entity = game_state.ensure_playable(sender)?;
    if systems::helpers::component::<Profile>(&game_state.world, entity).chat_banned {
        return Err(ChatError::Banned.into());
    }
    if let ChatChannel::Private { recipient } = channel {
        if recipient == sender {
            return Err(ChatError::SelfMessage.into());
        }
        game_state.player_entity(recipient)?;
    }
    let body = validate_body(body, game_state.settings.chat_message_max_len)?;

    let message = ChatMessage::new(sender, channel, body);
    let id = message.id;
    game_state.chat_log.push(message);

    debug!("Chat message {} from {}", id, sender);
    game_state.emit(EventKind::ChatMessageSent {
        message: id,
        sender,
        channel,
    });
    Ok(id)
}

pub fn send_global(
    game_state: &mut GameState,
    sender: PlayerId,
    body: &str,
) -> Result<MessageId, GameError> {
    send(game_state, sender, ChatChannel::Global, body)
}

pub fn send_private(
    game_state: &mut GameState,
    sender: PlayerId,
    recipient: PlayerId,
    body: &str,
) -> Result<MessageId, GameError> {
    send(game_state, sender, ChatChannel::Private { recipient }, body)
}

fn most_recent<'a>(
    game_state: &'a GameState,
    keep: impl Fn(&ChatMessage) -> bool,
) -> Vec<&'a ChatMessage> {
    let mut messages: Vec<&ChatMessage> = game_state
        .chat_log
        .iter()
        .rev()
        .filter(|message| keep(message))
        .take(game_state.settings.chat_history_limit)
        .collect();
    messages.reverse();
    messages
}

/// The latest global messages, oldest first.
pub fn global_history(game_state: &GameState) -> Vec<&ChatMessage> {
    most_recent(game_state, ChatMessage::is_global)
}

/// The latest messages between two players, oldest first.
pub fn private_history(game_state: &GameState, a: PlayerId, b: PlayerId) -> Vec<&ChatMessage> {
    most_recent(game_state, |message| message.is_between(a, b))
}

/// Everyone `player` could start a private conversation with, by username.
pub fn directory(game_state: &GameState, player: PlayerId) -> Vec<(PlayerId, String)> {
    let mut players: Vec<(PlayerId, String)> = game_state
        .world
        .query::<&Profile>()
        .iter()
        .filter(|(_, profile)| profile.id != player)
        .map(|(_, profile)| (profile.id, profile.username.clone()))
        .collect();
    players.sort_by(|a, b| a.1.cmp(&b.1));
    players
}
