use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use strum::{Display, EnumIter};
use uuid::Uuid;

use crate::components::{
    currency::Price,
    id::{GachaRecordId, ItemId, PlayerId},
    items::item::{Item, Rarity},
    settings::{EconomySettings, GachaTierSettings},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GachaTier {
    Basic,
    Premium,
    Legendary,
}

impl FromStr for GachaTier {
    type Err = serde_plain::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_plain::from_str(&s.trim().to_lowercase())
    }
}

impl GachaTier {
    pub fn settings(self, settings: &EconomySettings) -> &GachaTierSettings {
        settings.gacha.tier(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GachaError {
    #[error("the catalog has no items that the {0} tier can drop")]
    NoItemsAvailable(GachaTier),
}

/// One pull, kept in the append-only gacha history.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GachaRecord {
    pub id: GachaRecordId,
    pub player: PlayerId,
    pub tier: GachaTier,
    #[serde_as(as = "DisplayFromStr")]
    pub price: Price,
    pub item_id: ItemId,
    pub rarity: Rarity,
    pub at: DateTime<Utc>,
}

impl GachaRecord {
    pub fn new(player: PlayerId, tier: GachaTier, price: Price, item: &Item) -> Self {
        Self {
            id: Uuid::new_v4(),
            player,
            tier,
            price,
            item_id: item.id.clone(),
            rarity: item.rarity,
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GachaResult {
    pub item: Item,
    /// The player did not hold this item before the pull.
    pub is_new: bool,
    pub record_id: GachaRecordId,
}

/// Probability of each rarity for one tier, as shown on the rates table.
#[derive(Debug, Clone, PartialEq)]
pub struct RarityOdds {
    pub tier: GachaTier,
    pub price: Price,
    pub odds: Vec<(Rarity, f64)>,
}

impl RarityOdds {
    pub fn chance(&self, rarity: Rarity) -> f64 {
        self.odds
            .iter()
            .find(|(r, _)| *r == rarity)
            .map(|(_, chance)| *chance)
            .unwrap_or(0.0)
    }
}
