pub mod items;
pub mod registry;
