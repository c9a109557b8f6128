//! # Player Model
//!
//! The persistent character: stats, equipment, a bounded inventory, the active
//! quest log and the world-flag bitmask.

use crate::config::{INVENTORY_CAPACITY, MAX_STACK, QUEST_CAPACITY};
use crate::content::{ContentLibrary, ItemKind};
use crate::{DescentError, DescentResult, Position};
use serde::{Deserialize, Serialize};

/// One inventory slot. Quantities stay within `1..=MAX_STACK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySlot {
    pub item_id: u16,
    pub quantity: u8,
}

/// A bounded list of item stacks with unique item ids.
///
/// # Examples
///
/// ```
/// use descent::Inventory;
///
/// let mut bag = Inventory::default();
/// bag.add(1, 3);
/// bag.add(1, 98);
/// assert_eq!(bag.quantity(1), 99);
/// bag.remove(1, 200);
/// assert!(bag.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<InventorySlot>,
}

impl Inventory {
    /// Adds `quantity` units of an item.
    ///
    /// An existing stack grows up to `MAX_STACK`. A new stack is opened only
    /// while fewer than `INVENTORY_CAPACITY` slots are used; otherwise the
    /// items are dropped. Returns true if anything was stored.
    pub fn add(&mut self, item_id: u16, quantity: u8) -> bool {
        if quantity == 0 {
            return false;
        }

        if let Some(slot) = self.slots.iter_mut().find(|s| s.item_id == item_id) {
            slot.quantity = slot.quantity.saturating_add(quantity).min(MAX_STACK);
            return true;
        }

        if self.slots.len() < INVENTORY_CAPACITY {
            self.slots.push(InventorySlot {
                item_id,
                quantity: quantity.min(MAX_STACK),
            });
            return true;
        }

        false
    }

    /// Removes up to `quantity` units, deleting the slot when none remain.
    pub fn remove(&mut self, item_id: u16, quantity: u8) {
        if let Some(index) = self.slots.iter().position(|s| s.item_id == item_id) {
            if quantity >= self.slots[index].quantity {
                self.slots.remove(index);
            } else {
                self.slots[index].quantity -= quantity;
            }
        }
    }

    /// Units held of an item, 0 when absent.
    pub fn quantity(&self, item_id: u16) -> u8 {
        self.slots
            .iter()
            .find(|s| s.item_id == item_id)
            .map(|s| s.quantity)
            .unwrap_or(0)
    }

    pub fn get(&self, index: usize) -> Option<&InventorySlot> {
        self.slots.get(index)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InventorySlot> {
        self.slots.iter()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

/// Progress on one accepted quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestProgress {
    pub quest_id: u16,
    pub progress: u8,
}

/// Accepted quests, at most `QUEST_CAPACITY` of them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuestLog {
    entries: Vec<QuestProgress>,
}

impl QuestLog {
    /// Accepts a quest. Fails when it is already active or the log is full.
    pub fn accept(&mut self, quest_id: u16) -> bool {
        if self.is_active(quest_id) || self.entries.len() >= QUEST_CAPACITY {
            return false;
        }
        self.entries.push(QuestProgress {
            quest_id,
            progress: 0,
        });
        true
    }

    /// Restores an entry with saved progress.
    pub fn restore(&mut self, quest_id: u16, progress: u8) -> bool {
        if self.accept(quest_id) {
            if let Some(entry) = self.entries.last_mut() {
                entry.progress = progress;
            }
            true
        } else {
            false
        }
    }

    pub fn remove(&mut self, quest_id: u16) {
        self.entries.retain(|entry| entry.quest_id != quest_id);
    }

    pub fn is_active(&self, quest_id: u16) -> bool {
        self.entries.iter().any(|entry| entry.quest_id == quest_id)
    }

    pub fn progress(&self, quest_id: u16) -> Option<u8> {
        self.entries
            .iter()
            .find(|entry| entry.quest_id == quest_id)
            .map(|entry| entry.progress)
    }

    /// Advances every kill quest targeting `enemy_id`, up to its goal.
    pub fn record_kill(&mut self, content: &ContentLibrary, enemy_id: u16) {
        for entry in &mut self.entries {
            let Some(quest) = content.quest(entry.quest_id) else {
                continue;
            };
            if quest.counts_kill_of(enemy_id) && entry.progress < quest.target_count {
                entry.progress += 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuestProgress> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// 32-bit mask of one-shot world events, addressed by bit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorldFlags(pub u32);

impl WorldFlags {
    /// Bit indices wrap at 32.
    pub fn is_set(self, index: u32) -> bool {
        self.0 & (1 << (index % 32)) != 0
    }

    pub fn set(&mut self, index: u32) {
        self.0 |= 1 << (index % 32);
    }
}

/// Equipped item ids, 0 meaning the slot is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: u16,
    pub armor: u16,
    pub accessory: u16,
}

/// The player character.
///
/// `Default` is the all-zero character that save files are decoded onto.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub hp: u16,
    pub max_hp: u16,
    pub mp: u16,
    pub max_mp: u16,
    pub atk: u16,
    pub def: u16,
    pub mag: u16,
    pub spd: u16,
    pub level: u8,
    pub xp: u32,
    pub xp_next: u32,
    pub gold: u32,
    /// Dungeon currently explored, 0 while in town
    pub dungeon_id: u16,
    pub position: Position,
    pub floor: u8,
    pub equipment: Equipment,
    pub inventory: Inventory,
    pub quests: QuestLog,
    pub world_flags: WorldFlags,
}

impl Player {
    /// A fresh level 1 character with starting gold and three herbs.
    pub fn new_game(content: &ContentLibrary) -> Self {
        let mut inventory = Inventory::default();
        inventory.add(1, 3);

        Self {
            name: "Arlen".to_string(),
            hp: 30,
            max_hp: 30,
            mp: 10,
            max_mp: 10,
            atk: 5,
            def: 3,
            mag: 4,
            spd: 4,
            level: 1,
            xp: 0,
            xp_next: content.xp_for_level(2),
            gold: 50,
            dungeon_id: 0,
            position: Position::default(),
            floor: 0,
            equipment: Equipment::default(),
            inventory,
            quests: QuestLog::default(),
            world_flags: WorldFlags::default(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    /// Subtracts damage, clamping hit points at zero.
    pub fn take_damage(&mut self, amount: i32) {
        let amount = amount.max(0).min(u16::MAX as i32) as u16;
        self.hp = self.hp.saturating_sub(amount);
    }

    /// Restores hit points and mana without exceeding their maximums.
    pub fn restore(&mut self, hp: i32, mp: i32) {
        if hp > 0 {
            self.hp = (self.hp as i32 + hp).min(self.max_hp as i32) as u16;
        }
        if mp > 0 {
            self.mp = (self.mp as i32 + mp).min(self.max_mp as i32) as u16;
        }
    }

    pub fn heal_full(&mut self) {
        self.hp = self.max_hp;
        self.mp = self.max_mp;
    }

    /// Pays `amount` gold if affordable.
    pub fn spend_gold(&mut self, amount: u32) -> bool {
        if self.gold >= amount {
            self.gold -= amount;
            true
        } else {
            false
        }
    }

    /// Attack bonus of the equipped weapon.
    pub fn weapon_bonus(&self, content: &ContentLibrary) -> i32 {
        match self.equipped_kind(content, self.equipment.weapon) {
            Some(ItemKind::Weapon { attack_bonus }) => attack_bonus as i32,
            _ => 0,
        }
    }

    /// Defense bonus of the equipped armor.
    pub fn armor_bonus(&self, content: &ContentLibrary) -> i32 {
        match self.equipped_kind(content, self.equipment.armor) {
            Some(ItemKind::Armor { defense_bonus }) => defense_bonus as i32,
            _ => 0,
        }
    }

    /// Magic bonus of the equipped accessory.
    pub fn magic_bonus(&self, content: &ContentLibrary) -> i32 {
        match self.equipped_kind(content, self.equipment.accessory) {
            Some(ItemKind::Accessory { magic_bonus }) => magic_bonus as i32,
            _ => 0,
        }
    }

    fn equipped_kind(&self, content: &ContentLibrary, item_id: u16) -> Option<ItemKind> {
        if item_id == 0 {
            return None;
        }
        content.item(item_id).map(|item| item.kind)
    }

    /// Puts an equippable item into its slot. The item stays in the inventory.
    pub fn equip(&mut self, item_id: u16, kind: ItemKind) -> DescentResult<()> {
        match kind {
            ItemKind::Weapon { .. } => self.equipment.weapon = item_id,
            ItemKind::Armor { .. } => self.equipment.armor = item_id,
            ItemKind::Accessory { .. } => self.equipment.accessory = item_id,
            _ => {
                return Err(DescentError::InvalidAction(format!(
                    "item {} cannot be equipped",
                    item_id
                )))
            }
        }
        Ok(())
    }

    /// Pretty JSON snapshot of the character, for debugging.
    pub fn to_json(&self) -> DescentResult<String> {
        serde_json::to_string_pretty(self).map_err(DescentError::from)
    }

    pub fn from_json(json: &str) -> DescentResult<Self> {
        serde_json::from_str(json).map_err(DescentError::from)
    }
}
