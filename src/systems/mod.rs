pub mod admin;
pub mod announcements;
pub mod chat;
pub mod gacha;
pub mod helpers;
pub mod inventory;
pub mod leaderboard;
pub mod loadout;
pub mod progress;
pub mod trading;
