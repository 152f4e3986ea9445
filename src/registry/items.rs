use std::sync::LazyLock;

use crate::{
    components::{
        id::ItemId,
        items::item::{EffectKind, Item, ItemEffect, Rarity},
    },
    registry::registry::ItemRegistry,
};

macro_rules! catalog_item {
    ($id_name:ident, $item_name:ident, $id:literal, $name:literal, $description:literal, $rarity:expr, $icon:literal, $effect:expr) => {
        pub static $id_name: LazyLock<ItemId> = LazyLock::new(|| ItemId::from_str($id));

        static $item_name: LazyLock<Item> = LazyLock::new(|| Item {
            id: $id_name.clone(),
            name: $name.to_string(),
            description: $description.to_string(),
            rarity: $rarity,
            effect: $effect,
            icon: $icon.to_string(),
        });
    };
}

catalog_item!(
    WOODEN_CURSOR_ID,
    WOODEN_CURSOR,
    "item.wooden_cursor",
    "Wooden Cursor",
    "A sturdy cursor whittled from oak.",
    Rarity::Common,
    "🖱️",
    Some(ItemEffect::new(EffectKind::ClickPower, 1.0))
);

catalog_item!(
    LUCKY_PENNY_ID,
    LUCKY_PENNY,
    "item.lucky_penny",
    "Lucky Penny",
    "Found heads up. Coins seem to follow it.",
    Rarity::Common,
    "🪙",
    Some(ItemEffect::new(EffectKind::CoinMultiplier, 0.05))
);

catalog_item!(
    WIND_UP_TOY_ID,
    WIND_UP_TOY,
    "item.wind_up_toy",
    "Wind-up Toy",
    "Keeps clicking for a little while after you let go.",
    Rarity::Common,
    "🧸",
    Some(ItemEffect::new(EffectKind::AutoPower, 1.0))
);

catalog_item!(
    PEBBLE_ID,
    PEBBLE,
    "item.pebble",
    "Smooth Pebble",
    "It doesn't do anything, but it's nice to hold.",
    Rarity::Common,
    "🪨",
    None
);

catalog_item!(
    STEEL_CURSOR_ID,
    STEEL_CURSOR,
    "item.steel_cursor",
    "Steel Cursor",
    "Heavier than it looks, and it clicks harder too.",
    Rarity::Rare,
    "⚙️",
    Some(ItemEffect::new(EffectKind::ClickPower, 3.0))
);

catalog_item!(
    PIGGY_BANK_ID,
    PIGGY_BANK,
    "item.piggy_bank",
    "Piggy Bank",
    "Every coin you earn gets a little company.",
    Rarity::Rare,
    "🐷",
    Some(ItemEffect::new(EffectKind::CoinMultiplier, 0.15))
);

catalog_item!(
    CLOCKWORK_HAND_ID,
    CLOCKWORK_HAND,
    "item.clockwork_hand",
    "Clockwork Hand",
    "Ticks along while you're away.",
    Rarity::Rare,
    "⏱️",
    Some(ItemEffect::new(EffectKind::AutoPower, 3.0))
);

catalog_item!(
    GOLDEN_MOUSE_ID,
    GOLDEN_MOUSE,
    "item.golden_mouse",
    "Golden Mouse",
    "A mouse made of solid gold. Surprisingly ergonomic.",
    Rarity::Epic,
    "🐭",
    Some(ItemEffect::new(EffectKind::ClickPower, 8.0))
);

catalog_item!(
    TREASURE_MAP_ID,
    TREASURE_MAP,
    "item.treasure_map",
    "Treasure Map",
    "X marks more coins.",
    Rarity::Epic,
    "🗺️",
    Some(ItemEffect::new(EffectKind::CoinMultiplier, 0.35))
);

catalog_item!(
    ROBOT_ARM_ID,
    ROBOT_ARM,
    "item.robot_arm",
    "Robot Arm",
    "Industrial-grade idle clicking.",
    Rarity::Epic,
    "🦾",
    Some(ItemEffect::new(EffectKind::AutoPower, 8.0))
);

catalog_item!(
    DRAGON_CLAW_ID,
    DRAGON_CLAW,
    "item.dragon_claw",
    "Dragon Claw",
    "Each click lands with the weight of a dragon.",
    Rarity::Legendary,
    "🐉",
    Some(ItemEffect::new(EffectKind::ClickPower, 25.0))
);

catalog_item!(
    MIDAS_CROWN_ID,
    MIDAS_CROWN,
    "item.midas_crown",
    "Crown of Midas",
    "Everything you touch turns to coins.",
    Rarity::Legendary,
    "👑",
    Some(ItemEffect::new(EffectKind::CoinMultiplier, 1.0))
);

pub static DEFAULT_ITEMS: LazyLock<Vec<Item>> = LazyLock::new(|| {
    vec![
        WOODEN_CURSOR.to_owned(),
        LUCKY_PENNY.to_owned(),
        WIND_UP_TOY.to_owned(),
        PEBBLE.to_owned(),
        STEEL_CURSOR.to_owned(),
        PIGGY_BANK.to_owned(),
        CLOCKWORK_HAND.to_owned(),
        GOLDEN_MOUSE.to_owned(),
        TREASURE_MAP.to_owned(),
        ROBOT_ARM.to_owned(),
        DRAGON_CLAW.to_owned(),
        MIDAS_CROWN.to_owned(),
    ]
});

/// The built-in catalog, used when no item directory is given.
pub fn default_catalog() -> ItemRegistry {
    let mut registry = ItemRegistry::new();
    for item in DEFAULT_ITEMS.iter() {
        registry.entries.insert(item.id.clone(), item.clone());
    }
    registry
}
