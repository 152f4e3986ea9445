pub mod announcement;
pub mod chat;
pub mod currency;
pub mod gacha;
pub mod id;
pub mod items;
pub mod profile;
pub mod progress;
pub mod settings;
pub mod trade;
pub mod upgrade;
