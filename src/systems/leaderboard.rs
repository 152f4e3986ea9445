use std::cmp::Ordering;

use crate::{
    components::{id::PlayerId, profile::Profile, progress::GameProgress},
    engine::{error::GameError, game_state::GameState},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub player: PlayerId,
    pub username: String,
    pub score: u64,
    pub clicks: u64,
}

fn by_standing(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.clicks.cmp(&a.clicks))
        .then_with(|| a.username.cmp(&b.username))
}

fn standings(game_state: &GameState) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = game_state
        .world
        .query::<(&Profile, &GameProgress)>()
        .iter()
        .map(|(_, (profile, progress))| LeaderboardEntry {
            rank: 0,
            player: profile.id,
            username: profile.username.clone(),
            score: progress.score,
            clicks: progress.clicks,
        })
        .collect();
    entries.sort_by(by_standing);
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index + 1;
    }
    entries
}

/// The top `limit` players by score.
pub fn leaderboard(game_state: &GameState, limit: usize) -> Vec<LeaderboardEntry> {
    let mut entries = standings(game_state);
    entries.truncate(limit);
    entries
}

/// 1-based rank of `player` across everyone.
pub fn rank_of(game_state: &GameState, player: PlayerId) -> Result<usize, GameError> {
    standings(game_state)
        .into_iter()
        .find(|entry| entry.player == player)
        .map(|entry| entry.rank)
        .ok_or(GameError::UnknownPlayer(player))
}
