pub mod bonuses;
pub mod inventory;
pub mod item;
