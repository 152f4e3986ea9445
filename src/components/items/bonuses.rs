use std::{collections::HashMap, fmt};

use crate::components::{
    id::ItemId,
    items::{
        inventory::InventoryEntry,
        item::{EffectKind, Item},
    },
    progress::GameProgress,
};

#[derive(Debug, Hash, Eq, PartialEq, Clone)]
pub enum BonusSource {
    Base,
    Item(ItemId),
}

impl fmt::Display for BonusSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BonusSource::Base => write!(f, "Base"),
            BonusSource::Item(id) => write!(f, "Item: {}", id),
        }
    }
}

/// Additive bonuses to one stat, keyed by where they come from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BonusSet {
    bonuses: HashMap<BonusSource, f64>,
}

impl BonusSet {
    pub fn new() -> Self {
        Self {
            bonuses: HashMap::new(),
        }
    }

    pub fn add_bonus(&mut self, source: BonusSource, value: f64) {
        if value == 0.0 {
            return;
        }
        *self.bonuses.entry(source).or_insert(0.0) += value;
    }

    pub fn get(&self, source: &BonusSource) -> Option<f64> {
        self.bonuses.get(source).copied()
    }

    pub fn total(&self) -> f64 {
        self.bonuses.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.bonuses.values().all(|value| *value == 0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BonusSource, &f64)> {
        self.bonuses.iter()
    }
}

impl fmt::Display for BonusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self
            .bonuses
            .iter()
            .filter(|(_, value)| **value != 0.0)
            .map(|(source, value)| {
                let sign = if *value >= 0.0 { "+" } else { "-" };
                format!("{} {} ({})", sign, value.abs(), source)
            })
            .collect();
        parts.sort();
        write!(f, "{}", parts.join(" "))
    }
}

/// Bonuses from everything a player has equipped. Every equipped entry
/// contributes its effect exactly once, regardless of stack size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatBonuses {
    pub click_power: BonusSet,
    pub auto_power: BonusSet,
    pub coin_multiplier: BonusSet,
}

impl StatBonuses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_equipped<'a, F>(entries: impl IntoIterator<Item = &'a InventoryEntry>, lookup: F) -> Self
    where
        F: Fn(&ItemId) -> Option<Item>,
    {
        let mut bonuses = Self::new();
        for entry in entries.into_iter().filter(|entry| entry.equipped) {
            let Some(item) = lookup(&entry.item_id) else {
                continue;
            };
            if let Some(effect) = item.effect {
                bonuses
                    .set_for_mut(effect.kind)
                    .add_bonus(BonusSource::Item(item.id.clone()), effect.value);
            }
        }
        bonuses
    }

    pub fn set_for(&self, kind: EffectKind) -> &BonusSet {
        match kind {
            EffectKind::ClickPower => &self.click_power,
            EffectKind::AutoPower => &self.auto_power,
            EffectKind::CoinMultiplier => &self.coin_multiplier,
        }
    }

    fn set_for_mut(&mut self, kind: EffectKind) -> &mut BonusSet {
        match kind {
            EffectKind::ClickPower => &mut self.click_power,
            EffectKind::AutoPower => &mut self.auto_power,
            EffectKind::CoinMultiplier => &mut self.coin_multiplier,
        }
    }
}

/// The numbers click and idle income are actually computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveStats {
    pub click_power: u64,
    pub auto_power: u64,
    pub coin_multiplier: f64,
}

impl EffectiveStats {
    pub fn compute(progress: &GameProgress, bonuses: &StatBonuses) -> Self {
        let click_power = (f64::from(progress.click_power) + bonuses.click_power.total()).round();
        let auto_power =
            (f64::from(progress.auto_click_power) + bonuses.auto_power.total()).round();
        let coin_multiplier = 1.0 + bonuses.coin_multiplier.total();

        Self {
            click_power: click_power.max(1.0) as u64,
            auto_power: auto_power.max(0.0) as u64,
            coin_multiplier: coin_multiplier.max(0.0),
        }
    }
}
