use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use strum::IntoEnumIterator;

use crate::components::{currency::Price, gacha::GachaTier, items::item::Rarity};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("rarity weights for the {0} tier add up to zero")]
    ZeroWeights(GachaTier),
    #[error("cost curve `{curve}` has growth {growth}, expected at least 1.0")]
    InvalidGrowth { curve: &'static str, growth: f64 },
    #[error("gem chance {0} is not a probability")]
    InvalidChance(f64),
    #[error("inventory upgrades must add at least one slot")]
    ZeroSlotStep,
}

/// Relative drop weights of the four rarity tiers for one gacha tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityWeights {
    pub common: u32,
    pub rare: u32,
    pub epic: u32,
    pub legendary: u32,
}

impl RarityWeights {
    pub fn new(common: u32, rare: u32, epic: u32, legendary: u32) -> Self {
        Self {
            common,
            rare,
            epic,
            legendary,
        }
    }

    pub fn weight(&self, rarity: Rarity) -> u32 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
        }
    }

    pub fn total(&self) -> u64 {
        Rarity::iter().map(|rarity| u64::from(self.weight(rarity))).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Rarity, u32)> + '_ {
        Rarity::iter().map(|rarity| (rarity, self.weight(rarity)))
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GachaTierSettings {
    #[serde_as(as = "DisplayFromStr")]
    pub price: Price,
    pub weights: RarityWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GachaSettings {
    pub basic: GachaTierSettings,
    pub premium: GachaTierSettings,
    pub legendary: GachaTierSettings,
}

impl Default for GachaSettings {
    fn default() -> Self {
        Self {
            basic: GachaTierSettings {
                price: Price::coins(100),
                weights: RarityWeights::new(70, 25, 4, 1),
            },
            premium: GachaTierSettings {
                price: Price::coins(500),
                weights: RarityWeights::new(40, 40, 15, 5),
            },
            legendary: GachaTierSettings {
                price: Price::gems(1),
                weights: RarityWeights::new(20, 30, 30, 20),
            },
        }
    }
}

impl GachaSettings {
    pub fn tier(&self, tier: GachaTier) -> &GachaTierSettings {
        match tier {
            GachaTier::Basic => &self.basic,
            GachaTier::Premium => &self.premium,
            GachaTier::Legendary => &self.legendary,
        }
    }
}

/// `floor(base * growth^level)`, saturating at `u64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostCurve {
    pub base: u64,
    pub growth: f64,
}

impl CostCurve {
    pub const fn new(base: u64, growth: f64) -> Self {
        Self { base, growth }
    }

    pub fn cost(&self, level: u32) -> u64 {
        let cost = (self.base as f64 * self.growth.powf(f64::from(level))).floor();
        if !cost.is_finite() || cost >= u64::MAX as f64 {
            u64::MAX
        } else {
            cost as u64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomySettings {
    pub gacha: GachaSettings,
    pub starting_coins: u64,
    pub starting_gems: u64,
    pub default_inventory_slots: u32,
    pub default_equip_slots: u32,
    pub inventory_slots_per_upgrade: u32,
    pub inventory_upgrade: CostCurve,
    pub equip_upgrade: CostCurve,
    pub click_power_upgrade: CostCurve,
    pub auto_clicker_upgrade: CostCurve,
    pub auto_power_upgrade: CostCurve,
    pub gem_chance_per_click: f64,
    pub leaderboard_size: usize,
    pub chat_history_limit: usize,
    pub chat_message_max_len: usize,
}

impl Default for EconomySettings {
    fn default() -> Self {
        Self {
            gacha: GachaSettings::default(),
            starting_coins: 0,
            starting_gems: 10,
            default_inventory_slots: 20,
            default_equip_slots: 3,
            inventory_slots_per_upgrade: 5,
            inventory_upgrade: CostCurve::new(100, 1.5),
            equip_upgrade: CostCurve::new(200, 2.0),
            click_power_upgrade: CostCurve::new(100, 1.5),
            auto_clicker_upgrade: CostCurve::new(500, 2.0),
            auto_power_upgrade: CostCurve::new(1000, 2.5),
            gem_chance_per_click: 0.01,
            leaderboard_size: 10,
            chat_history_limit: 100,
            chat_message_max_len: 500,
        }
    }
}

impl EconomySettings {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        for tier in GachaTier::iter() {
            if self.gacha.tier(tier).weights.total() == 0 {
                return Err(SettingsError::ZeroWeights(tier));
            }
        }

        for (curve, cost_curve) in [
            ("inventory_upgrade", &self.inventory_upgrade),
            ("equip_upgrade", &self.equip_upgrade),
            ("click_power_upgrade", &self.click_power_upgrade),
            ("auto_clicker_upgrade", &self.auto_clicker_upgrade),
            ("auto_power_upgrade", &self.auto_power_upgrade),
        ] {
            if !(cost_curve.growth >= 1.0) {
                return Err(SettingsError::InvalidGrowth {
                    curve,
                    growth: cost_curve.growth,
                });
            }
        }

        if !(0.0..=1.0).contains(&self.gem_chance_per_click) {
            return Err(SettingsError::InvalidChance(self.gem_chance_per_click));
        }

        if self.inventory_slots_per_upgrade == 0 {
            return Err(SettingsError::ZeroSlotStep);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceSettings {
    pub enabled: bool,
    pub message: String,
    pub estimated_duration: String,
}

impl Default for MaintenanceSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            message: "We're performing scheduled maintenance. Please check back soon!"
                .to_string(),
            estimated_duration: "30 minutes".to_string(),
        }
    }
}
