use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::components::id::ItemId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl FromStr for Rarity {
    type Err = serde_plain::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_plain::from_str(&s.trim().to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EffectKind {
    ClickPower,
    AutoPower,
    CoinMultiplier,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemEffect {
    pub kind: EffectKind,
    pub value: f64,
}

impl ItemEffect {
    pub fn new(kind: EffectKind, value: f64) -> Self {
        Self { kind, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rarity: Rarity,
    #[serde(default)]
    pub effect: Option<ItemEffect>,
    #[serde(default)]
    pub icon: String,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            id: ItemId::from_str("item.unnamed"),
            name: "Mystery Trinket".to_string(),
            description: String::new(),
            rarity: Rarity::Common,
            effect: None,
            icon: "🎁".to_string(),
        }
    }
}
