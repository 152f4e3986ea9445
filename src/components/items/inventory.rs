use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::components::{
    id::{InventoryEntryId, ItemId},
    items::item::{Item, Rarity},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub id: InventoryEntryId,
    pub item_id: ItemId,
    pub quantity: u32,
    pub equipped: bool,
    pub obtained_at: DateTime<Utc>,
}

impl InventoryEntry {
    pub fn new(item_id: ItemId, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id,
            quantity,
            equipped: false,
            obtained_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InventoryError {
    #[error("quantity must be greater than zero")]
    ZeroQuantity,
    #[error("inventory is full: holding {held} of {capacity}, cannot add {adding}")]
    Full { held: u64, capacity: u32, adding: u32 },
    #[error("not enough {item}: needed {needed}, have {available}")]
    InsufficientQuantity {
        item: ItemId,
        needed: u32,
        available: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EquipError {
    #[error("no inventory entry {0}")]
    UnknownEntry(InventoryEntryId),
    #[error("all {max} equipment slots are in use")]
    SlotsFull { max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryFilter {
    All,
    Equipped,
    Rarity(Rarity),
}

impl InventoryFilter {
    /// `item` is `None` when the entry points at an item that has since been
    /// removed from the catalog; such entries only show up for `All` and
    /// `Equipped`.
    pub fn matches(&self, entry: &InventoryEntry, item: Option<&Item>) -> bool {
        match self {
            InventoryFilter::All => true,
            InventoryFilter::Equipped => entry.equipped,
            InventoryFilter::Rarity(rarity) => item.is_some_and(|item| item.rarity == *rarity),
        }
    }
}

/// Item stacks owned by a player, in the order they were first obtained.
/// There is at most one entry per item id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    entries: Vec<InventoryEntry>,
}

impl Inventory {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[InventoryEntry] {
        &self.entries
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.entries.iter().rev()
    }

    pub fn entry(&self, id: &InventoryEntryId) -> Option<&InventoryEntry> {
        self.entries.iter().find(|entry| entry.id == *id)
    }

    pub fn entry_for_item(&self, item_id: &ItemId) -> Option<&InventoryEntry> {
        self.entries.iter().find(|entry| entry.item_id == *item_id)
    }

    pub fn quantity_of(&self, item_id: &ItemId) -> u32 {
        self.entry_for_item(item_id)
            .map(|entry| entry.quantity)
            .unwrap_or(0)
    }

    pub fn total_quantity(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| u64::from(entry.quantity))
            .sum()
    }

    pub fn has_room_for(&self, quantity: u32, capacity: u32) -> bool {
        self.total_quantity() + u64::from(quantity) <= u64::from(capacity)
    }

    pub fn check_room(&self, quantity: u32, capacity: u32) -> Result<(), InventoryError> {
        if quantity == 0 {
            return Err(InventoryError::ZeroQuantity);
        }
        if !self.has_room_for(quantity, capacity) {
            return Err(InventoryError::Full {
                held: self.total_quantity(),
                capacity,
                adding: quantity,
            });
        }
        Ok(())
    }

    /// Adds `quantity` of an item, stacking onto an existing entry. Returns
    /// `true` if the player did not hold the item before.
    pub fn add_item(
        &mut self,
        item_id: &ItemId,
        quantity: u32,
        capacity: u32,
    ) -> Result<bool, InventoryError> {
        self.check_room(quantity, capacity)?;

        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.item_id == *item_id)
        {
            entry.quantity = entry.quantity.saturating_add(quantity);
            return Ok(false);
        }

        self.entries
            .push(InventoryEntry::new(item_id.clone(), quantity));
        Ok(true)
    }

    pub fn can_remove(&self, item_id: &ItemId, quantity: u32) -> Result<(), InventoryError> {
        if quantity == 0 {
            return Err(InventoryError::ZeroQuantity);
        }
        let available = self.quantity_of(item_id);
        if available < quantity {
            return Err(InventoryError::InsufficientQuantity {
                item: item_id.clone(),
                needed: quantity,
                available,
            });
        }
        Ok(())
    }

    /// Removes `quantity` of an item. A stack that reaches zero is dropped,
    /// which also takes it out of the equipped set.
    pub fn remove_item(&mut self, item_id: &ItemId, quantity: u32) -> Result<(), InventoryError> {
        self.can_remove(item_id, quantity)?;
        if let Some(index) = self
            .entries
            .iter()
            .position(|entry| entry.item_id == *item_id)
        {
            let entry = &mut self.entries[index];
            entry.quantity -= quantity;
            if entry.quantity == 0 {
                self.entries.remove(index);
            }
        }
        Ok(())
    }

    pub fn equipped(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.entries.iter().filter(|entry| entry.equipped)
    }

    pub fn equipped_count(&self) -> usize {
        self.equipped().count()
    }

    /// Returns whether the flag actually changed.
    pub fn set_equipped(
        &mut self,
        id: &InventoryEntryId,
        equipped: bool,
        max_equip: u32,
    ) -> Result<bool, EquipError> {
        let equipped_count = self.equipped_count();
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == *id)
            .ok_or(EquipError::UnknownEntry(*id))?;

        if entry.equipped == equipped {
            return Ok(false);
        }
        if equipped && equipped_count >= max_equip as usize {
            return Err(EquipError::SlotsFull { max: max_equip });
        }
        entry.equipped = equipped;
        Ok(true)
    }
}
