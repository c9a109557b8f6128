//! # Content Records
//!
//! Typed records decoded from content blocks.
//!
//! Items arrive with two generic stat fields whose meaning depends on the
//! item type. They are decoded into [`ItemRecord`] first and converted into
//! an [`Item`] carrying an [`ItemKind`] with named fields.

use super::{parse_id_list, parse_number, truncate_field, Record};
use crate::config::ENEMY_POOL_CAPACITY;
use serde::{Deserialize, Serialize};

/// Enemy combat behaviour.
///
/// Unknown tags decode as [`AiBehavior::Basic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AiBehavior {
    /// Plain physical attacks
    #[default]
    Basic,
    /// Casts a spell half of the time
    Magic,
    /// Sometimes braces instead of attacking
    Defensive,
    /// Mixes magic blasts, heavy strikes and plain attacks
    Boss,
}

impl AiBehavior {
    /// Decodes a numeric AI tag.
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            1 => AiBehavior::Magic,
            2 => AiBehavior::Defensive,
            3 => AiBehavior::Boss,
            _ => AiBehavior::Basic,
        }
    }
}

/// An enemy as described by content, and the live opponent of a fight.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u16,
    pub name: String,
    pub hp: u16,
    pub max_hp: u16,
    pub atk: u16,
    pub def: u16,
    pub mag: u16,
    pub spd: u16,
    pub xp_reward: u16,
    pub gold_reward: u16,
    /// Item that may drop on defeat, 0 for none
    pub drop_item: u16,
    /// Drop probability in percent
    pub drop_chance: u8,
    pub ai: AiBehavior,
}

impl Enemy {
    /// Stand-in opponent used when an enemy id is missing from content.
    pub fn fallback() -> Self {
        Self {
            id: 1,
            name: "Slime".to_string(),
            hp: 10,
            max_hp: 10,
            atk: 3,
            def: 1,
            mag: 0,
            spd: 2,
            xp_reward: 3,
            gold_reward: 2,
            drop_item: 0,
            drop_chance: 0,
            ai: AiBehavior::Basic,
        }
    }

    /// Returns true once the enemy has no hit points left.
    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }
}

impl Record for Enemy {
    const TAG: &'static str = "[ENEMY]";
    const KIND: &'static str = "enemy";

    fn id(&self) -> u16 {
        self.id
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "id" => self.id = parse_number(value),
            "name" => self.name = truncate_field(value, 19),
            "hp" => {
                self.hp = parse_number(value);
                self.max_hp = self.hp;
            }
            "atk" => self.atk = parse_number(value),
            "def" => self.def = parse_number(value),
            "mag" => self.mag = parse_number(value),
            "spd" => self.spd = parse_number(value),
            "xp" => self.xp_reward = parse_number(value),
            "gold" => self.gold_reward = parse_number(value),
            "drop" => self.drop_item = parse_number(value),
            "dropChance" => self.drop_chance = parse_number(value),
            "ai" => self.ai = AiBehavior::from_tag(parse_number(value)),
            _ => {}
        }
    }
}

/// Item block exactly as stored in content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemRecord {
    pub id: u16,
    pub name: String,
    pub item_type: u8,
    pub value: u16,
    pub stat1: i16,
    pub stat2: i16,
    pub desc: String,
}

impl Record for ItemRecord {
    const TAG: &'static str = "[ITEM]";
    const KIND: &'static str = "item";

    fn id(&self) -> u16 {
        self.id
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "id" => self.id = parse_number(value),
            "name" => self.name = truncate_field(value, 19),
            "type" => self.item_type = parse_number(value),
            "value" => self.value = parse_number(value),
            "stat1" => self.stat1 = parse_number(value),
            "stat2" => self.stat2 = parse_number(value),
            "desc" => self.desc = truncate_field(value, 47),
            _ => {}
        }
    }
}

/// What an item does, with its stat fields named per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Used up to restore hit points and mana
    Consumable { hp_restore: i16, mp_restore: i16 },
    /// Adds to physical attack damage while equipped
    Weapon { attack_bonus: i16 },
    /// Reduces physical damage taken while equipped
    Armor { defense_bonus: i16 },
    /// Adds to spell damage while equipped
    Accessory { magic_bonus: i16 },
    /// Quest or story item with no direct use
    Key,
}

impl ItemKind {
    /// Single-letter label used in item lists.
    pub fn letter(&self) -> char {
        match self {
            ItemKind::Consumable { .. } => 'C',
            ItemKind::Weapon { .. } => 'W',
            ItemKind::Armor { .. } => 'A',
            ItemKind::Accessory { .. } => 'R',
            ItemKind::Key => 'K',
        }
    }
}

/// An item definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u16,
    pub name: String,
    /// Shop price; items sell back for half
    pub value: u16,
    pub kind: ItemKind,
    pub description: String,
}

impl Item {
    /// Returns true for items that can be used up from the inventory.
    pub fn is_consumable(&self) -> bool {
        matches!(self.kind, ItemKind::Consumable { .. })
    }

    /// Gold paid when selling one unit to a shop.
    pub fn sell_price(&self) -> u16 {
        self.value / 2
    }
}

impl From<ItemRecord> for Item {
    fn from(record: ItemRecord) -> Self {
        // Unknown type tags fall back to tag 0.
        let kind = match record.item_type {
            1 => ItemKind::Weapon {
                attack_bonus: record.stat1,
            },
            2 => ItemKind::Armor {
                defense_bonus: record.stat1,
            },
            3 => ItemKind::Accessory {
                magic_bonus: record.stat2,
            },
            4 => ItemKind::Key,
            _ => ItemKind::Consumable {
                hp_restore: record.stat1,
                mp_restore: record.stat2,
            },
        };

        Self {
            id: record.id,
            name: record.name,
            value: record.value,
            kind,
            description: record.desc,
        }
    }
}

/// Effect category of a spell.
///
/// Unknown tags decode as [`SpellKind::Damage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpellKind {
    #[default]
    Damage,
    Heal,
    Buff,
    Debuff,
}

impl SpellKind {
    /// Decodes a numeric spell type tag.
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            1 => SpellKind::Heal,
            2 => SpellKind::Buff,
            3 => SpellKind::Debuff,
            _ => SpellKind::Damage,
        }
    }

    /// Short label for spell lists.
    pub fn label(&self) -> &'static str {
        match self {
            SpellKind::Damage => "ATK",
            SpellKind::Heal => "HEAL",
            SpellKind::Buff => "BUFF",
            SpellKind::Debuff => "DBUF",
        }
    }
}

/// A spell definition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Spell {
    pub id: u16,
    pub name: String,
    pub mp_cost: u8,
    pub kind: SpellKind,
    pub power: u16,
    /// Character level required to cast
    pub unlock_level: u8,
}

impl Record for Spell {
    const TAG: &'static str = "[SPELL]";
    const KIND: &'static str = "spell";

    fn id(&self) -> u16 {
        self.id
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "id" => self.id = parse_number(value),
            "name" => self.name = truncate_field(value, 15),
            "mpCost" => self.mp_cost = parse_number(value),
            "type" => self.kind = SpellKind::from_tag(parse_number(value)),
            "power" => self.power = parse_number(value),
            "level" => self.unlock_level = parse_number(value),
            _ => {}
        }
    }
}

/// Goal of a quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestObjective {
    /// Defeat `count` enemies with id `target`
    Kill { target: u16, count: u8 },
    /// Objective type this engine does not track
    Other { kind: u8 },
}

/// Rewards paid out when a quest is turned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuestReward {
    pub gold: u16,
    /// Item granted on completion, 0 for none
    pub item: u16,
    pub xp: u32,
}

/// A quest definition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Quest {
    pub id: u16,
    pub name: String,
    pub description: String,
    pub kind: u8,
    pub target: u16,
    pub target_count: u8,
    pub reward: QuestReward,
}

impl Quest {
    /// The objective described by this quest's type and target fields.
    pub fn objective(&self) -> QuestObjective {
        match self.kind {
            0 => QuestObjective::Kill {
                target: self.target,
                count: self.target_count,
            },
            kind => QuestObjective::Other { kind },
        }
    }

    /// Returns true if defeating `enemy_id` advances this quest.
    pub fn counts_kill_of(&self, enemy_id: u16) -> bool {
        matches!(self.objective(), QuestObjective::Kill { target, .. } if target == enemy_id)
    }
}

impl Record for Quest {
    const TAG: &'static str = "[QUEST]";
    const KIND: &'static str = "quest";

    fn id(&self) -> u16 {
        self.id
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "id" => self.id = parse_number(value),
            "name" => self.name = truncate_field(value, 23),
            "desc" => self.description = truncate_field(value, 63),
            "type" => self.kind = parse_number(value),
            "target" => self.target = parse_number(value),
            "count" => self.target_count = parse_number(value),
            "gold" => self.reward.gold = parse_number(value),
            "item" => self.reward.item = parse_number(value),
            "xp" => self.reward.xp = parse_number(value),
            _ => {}
        }
    }
}

/// Static description of a dungeon, from its `[INFO]` block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DungeonInfo {
    pub id: u16,
    pub name: String,
    pub floors: u8,
    /// Recommended character level
    pub min_level: u8,
    /// Chance in percent of a fight on each floor or door step
    pub encounter_rate: u8,
    /// Enemies met in random encounters
    pub enemy_pool: Vec<u16>,
    /// Enemy fought on the boss tile, 0 for "last pool entry"
    pub boss_id: u16,
}

impl DungeonInfo {
    /// Enemy fought on a boss tile.
    pub fn boss(&self) -> Option<u16> {
        if self.boss_id > 0 {
            Some(self.boss_id)
        } else {
            self.enemy_pool.last().copied()
        }
    }
}

impl Record for DungeonInfo {
    const TAG: &'static str = "[INFO]";
    const KIND: &'static str = "dungeon";

    fn id(&self) -> u16 {
        self.id
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "id" => self.id = parse_number(value),
            "name" => self.name = truncate_field(value, 23),
            "floors" => self.floors = parse_number(value),
            "minLevel" => self.min_level = parse_number(value),
            "encounterRate" => self.encounter_rate = parse_number(value),
            "enemies" => self.enemy_pool = parse_id_list(value, ENEMY_POOL_CAPACITY),
            "bossId" => self.boss_id = parse_number(value),
            _ => {}
        }
    }
}

/// A shop's stock list, from a `[SHOP]` block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShopRecord {
    pub id: u16,
    pub name: String,
    pub items: String,
}

impl Record for ShopRecord {
    const TAG: &'static str = "[SHOP]";
    const KIND: &'static str = "shop";

    fn id(&self) -> u16 {
        self.id
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "id" => self.id = parse_number(value),
            "name" => self.name = truncate_field(value, 23),
            "items" => self.items = value.to_string(),
            _ => {}
        }
    }
}

/// One purchasable line in a shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    pub item_id: u16,
    pub name: String,
    pub price: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::find;

    #[test]
    fn test_enemy_hp_sets_max_hp() {
        let source = "[ENEMY]\nid=4\nname=Skeleton Warrior Of The Deep\nhp=30\nai=2\n";
        let enemy: Enemy = find(source, 4).unwrap();
        assert_eq!(enemy.hp, 30);
        assert_eq!(enemy.max_hp, 30);
        assert_eq!(enemy.name.chars().count(), 19);
        assert_eq!(enemy.ai, AiBehavior::Defensive);
    }

    #[test]
    fn test_unknown_tags_fall_back_to_zero_variant() {
        assert_eq!(AiBehavior::from_tag(9), AiBehavior::Basic);
        assert_eq!(SpellKind::from_tag(200), SpellKind::Damage);

        let record = ItemRecord {
            id: 1,
            item_type: 12,
            stat1: 5,
            stat2: 2,
            ..ItemRecord::default()
        };
        assert_eq!(
            Item::from(record).kind,
            ItemKind::Consumable {
                hp_restore: 5,
                mp_restore: 2
            }
        );
    }

    #[test]
    fn test_item_stat_fields_are_named_by_type() {
        let source = "[ITEM]\nid=10\ntype=1\nstat1=4\nstat2=9\n[ITEM]\nid=30\ntype=3\nstat1=1\nstat2=3\n";
        let sword = Item::from(find::<ItemRecord>(source, 10).unwrap());
        assert_eq!(sword.kind, ItemKind::Weapon { attack_bonus: 4 });
        let ring = Item::from(find::<ItemRecord>(source, 30).unwrap());
        assert_eq!(ring.kind, ItemKind::Accessory { magic_bonus: 3 });
    }

    #[test]
    fn test_quest_kill_objective() {
        let source = "[QUEST]\nid=1\ntype=0\ntarget=3\ncount=5\ngold=40\nxp=25\n";
        let quest: Quest = find(source, 1).unwrap();
        assert_eq!(quest.objective(), QuestObjective::Kill { target: 3, count: 5 });
        assert!(quest.counts_kill_of(3));
        assert!(!quest.counts_kill_of(4));
        assert_eq!(quest.reward.xp, 25);

        let other = Quest {
            kind: 2,
            target: 3,
            ..quest
        };
        assert!(!other.counts_kill_of(3));
    }

    #[test]
    fn test_dungeon_boss_falls_back_to_last_pool_entry() {
        let source = "[INFO]\nid=2\nenemies=3,4,5\n";
        let info: DungeonInfo = find(source, 2).unwrap();
        assert_eq!(info.boss(), Some(5));

        let empty = DungeonInfo::default();
        assert_eq!(empty.boss(), None);
    }
}
