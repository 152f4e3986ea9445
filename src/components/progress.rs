use serde::{Deserialize, Serialize};

use crate::components::{items::bonuses::EffectiveStats, settings::EconomySettings};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProgress {
    pub score: u64,
    pub clicks: u64,
    pub click_power: u32,
    pub auto_clickers: u32,
    pub auto_click_power: u32,
    pub total_spent: u64,
    pub max_inventory: u32,
    pub max_equip: u32,
}

impl Default for GameProgress {
    fn default() -> Self {
        Self::new(&EconomySettings::default())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    pub score_gained: u64,
    pub coins_gained: u64,
    pub gems_gained: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdleOutcome {
    pub score_gained: u64,
    pub coins_gained: u64,
}

impl GameProgress {
    pub fn new(settings: &EconomySettings) -> Self {
        Self {
            score: 0,
            clicks: 0,
            click_power: 1,
            auto_clickers: 0,
            auto_click_power: 1,
            total_spent: 0,
            max_inventory: settings.default_inventory_slots,
            max_equip: settings.default_equip_slots,
        }
    }

    /// Clears the run back to a fresh start. Slot upgrades are kept.
    pub fn reset(&mut self) {
        self.score = 0;
        self.clicks = 0;
        self.click_power = 1;
        self.auto_clickers = 0;
        self.auto_click_power = 1;
        self.total_spent = 0;
    }

    pub fn register_click(&mut self, stats: &EffectiveStats, found_gem: bool) -> ClickOutcome {
        let coins = stats.click_power as f64 / 5.0 * stats.coin_multiplier;
        let outcome = ClickOutcome {
            score_gained: stats.click_power,
            coins_gained: coins.floor() as u64,
            gems_gained: u64::from(found_gem),
        };
        self.score = self.score.saturating_add(outcome.score_gained);
        self.clicks = self.clicks.saturating_add(1);
        outcome
    }

    /// Income from auto-clickers over `seconds` of elapsed time.
    pub fn register_idle(&mut self, stats: &EffectiveStats, seconds: u64) -> IdleOutcome {
        if self.auto_clickers == 0 || seconds == 0 {
            return IdleOutcome::default();
        }
        let per_second = u64::from(self.auto_clickers).saturating_mul(stats.auto_power);
        let earnings = per_second.saturating_mul(seconds);
        let coins = earnings as f64 / 10.0 * stats.coin_multiplier;
        let outcome = IdleOutcome {
            score_gained: earnings,
            coins_gained: coins.floor() as u64,
        };
        self.score = self.score.saturating_add(outcome.score_gained);
        outcome
    }

    pub fn record_spend(&mut self, amount: u64) {
        self.total_spent = self.total_spent.saturating_add(amount);
    }
}
