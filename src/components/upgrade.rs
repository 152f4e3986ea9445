use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::components::{
    currency::{Price, WalletError},
    progress::GameProgress,
    settings::EconomySettings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UpgradeKind {
    ClickPower,
    AutoClicker,
    AutoPower,
    InventorySlots,
    EquipSlots,
}

impl FromStr for UpgradeKind {
    type Err = serde_plain::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_plain::from_str(&s.trim().to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpgradeError {
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error("{0} is already at its maximum level")]
    MaxLevel(UpgradeKind),
}

impl UpgradeKind {
    /// How many times this upgrade has been bought, as far as the cost curve
    /// is concerned.
    pub fn level(self, progress: &GameProgress, settings: &EconomySettings) -> u32 {
        match self {
            UpgradeKind::ClickPower => progress.click_power.saturating_sub(1),
            UpgradeKind::AutoClicker => progress.auto_clickers,
            UpgradeKind::AutoPower => progress.auto_click_power.saturating_sub(1),
            UpgradeKind::InventorySlots => {
                progress
                    .max_inventory
                    .saturating_sub(settings.default_inventory_slots)
                    / settings.inventory_slots_per_upgrade.max(1)
            }
            UpgradeKind::EquipSlots => progress
                .max_equip
                .saturating_sub(settings.default_equip_slots),
        }
    }

    /// Upgrades are always paid in coins.
    pub fn cost(self, progress: &GameProgress, settings: &EconomySettings) -> Price {
        let curve = match self {
            UpgradeKind::ClickPower => &settings.click_power_upgrade,
            UpgradeKind::AutoClicker => &settings.auto_clicker_upgrade,
            UpgradeKind::AutoPower => &settings.auto_power_upgrade,
            UpgradeKind::InventorySlots => &settings.inventory_upgrade,
            UpgradeKind::EquipSlots => &settings.equip_upgrade,
        };
        Price::coins(curve.cost(self.level(progress, settings)))
    }

    pub fn apply(
        self,
        progress: &mut GameProgress,
        settings: &EconomySettings,
    ) -> Result<(), UpgradeError> {
        let (value, step) = match self {
            UpgradeKind::ClickPower => (&mut progress.click_power, 1),
            UpgradeKind::AutoClicker => (&mut progress.auto_clickers, 1),
            UpgradeKind::AutoPower => (&mut progress.auto_click_power, 1),
            UpgradeKind::InventorySlots => (
                &mut progress.max_inventory,
                settings.inventory_slots_per_upgrade,
            ),
            UpgradeKind::EquipSlots => (&mut progress.max_equip, 1),
        };
        *value = value
            .checked_add(step)
            .ok_or(UpgradeError::MaxLevel(self))?;
        Ok(())
    }

    /// Checks that the upgrade can be applied without touching `progress`.
    pub fn can_apply(self, progress: &GameProgress, settings: &EconomySettings) -> bool {
        let mut preview = progress.clone();
        self.apply(&mut preview, settings).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(UpgradeKind::ClickPower, 100)]
    #[case(UpgradeKind::AutoClicker, 500)]
    #[case(UpgradeKind::AutoPower, 1000)]
    #[case(UpgradeKind::InventorySlots, 100)]
    #[case(UpgradeKind::EquipSlots, 200)]
    fn first_upgrade_costs_base(#[case] kind: UpgradeKind, #[case] expected: u64) {
        let settings = EconomySettings::default();
        let progress = GameProgress::new(&settings);
        assert_eq!(kind.cost(&progress, &settings), Price::coins(expected));
    }

    #[rstest]
    #[case(UpgradeKind::ClickPower, 2, 225)]
    #[case(UpgradeKind::AutoClicker, 2, 2000)]
    #[case(UpgradeKind::AutoPower, 2, 6250)]
    #[case(UpgradeKind::InventorySlots, 2, 225)]
    #[case(UpgradeKind::EquipSlots, 3, 1600)]
    fn cost_grows_with_level(
        #[case] kind: UpgradeKind,
        #[case] purchases: u32,
        #[case] expected: u64,
    ) {
        let settings = EconomySettings::default();
        let mut progress = GameProgress::new(&settings);
        for _ in 0..purchases {
            kind.apply(&mut progress, &settings).unwrap();
        }
        assert_eq!(kind.cost(&progress, &settings), Price::coins(expected));
    }

    #[test]
    fn inventory_upgrade_adds_step() {
        let settings = EconomySettings::default();
        let mut progress = GameProgress::new(&settings);
        UpgradeKind::InventorySlots
            .apply(&mut progress, &settings)
            .unwrap();
        assert_eq!(progress.max_inventory, 25);
    }

    #[test]
    fn overflowing_upgrade_is_rejected() {
        let settings = EconomySettings::default();
        let mut progress = GameProgress {
            auto_clickers: u32::MAX,
            ..GameProgress::new(&settings)
        };
        assert!(!UpgradeKind::AutoClicker.can_apply(&progress, &settings));
        assert_eq!(
            UpgradeKind::AutoClicker.apply(&mut progress, &settings),
            Err(UpgradeError::MaxLevel(UpgradeKind::AutoClicker))
        );
    }

    #[test]
    fn upgrade_kind_from_str() {
        assert_eq!(
            "auto_clicker".parse::<UpgradeKind>().unwrap(),
            UpgradeKind::AutoClicker
        );
    }
}
