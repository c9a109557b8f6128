//! # Content Library
//!
//! Holds the raw content sources the engine looks records up in.
//!
//! The built-in library embeds the text files under `assets/content/` at
//! compile time. Tests and tools can swap any source for their own text.

use super::{
    decode_floor, find, parse_id_list, xp_for_level, DungeonInfo, Enemy, FloorCodes, Item,
    ItemRecord, Quest, Record, ShopItem, ShopRecord, Spell,
};
use crate::config::{DUNGEON_LIST_CAPACITY, SHOP_CAPACITY};
use log::{debug, warn};
use std::borrow::Cow;

const ENEMIES: &str = include_str!("../../assets/content/enemies.txt");
const ITEMS: &str = include_str!("../../assets/content/items.txt");
const SPELLS: &str = include_str!("../../assets/content/spells.txt");
const QUESTS: &str = include_str!("../../assets/content/quests.txt");
const SHOPS: &str = include_str!("../../assets/content/shops.txt");
const LEVEL_CURVE: &str = include_str!("../../assets/content/levelcurve.txt");
const DUNGEON_1: &str = include_str!("../../assets/content/dungeon1.txt");
const DUNGEON_2: &str = include_str!("../../assets/content/dungeon2.txt");
const DUNGEON_3: &str = include_str!("../../assets/content/dungeon3.txt");
const DUNGEON_4: &str = include_str!("../../assets/content/dungeon4.txt");

/// A dungeon as listed on the selection screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DungeonEntry {
    pub id: u16,
    pub name: String,
    pub min_level: u8,
}

/// The set of content sources the game reads from.
#[derive(Debug, Clone)]
pub struct ContentLibrary {
    pub enemies: Cow<'static, str>,
    pub items: Cow<'static, str>,
    pub spells: Cow<'static, str>,
    pub quests: Cow<'static, str>,
    pub shops: Cow<'static, str>,
    pub level_curve: Cow<'static, str>,
    /// Dungeon sources keyed by the slot they are addressed by
    pub dungeons: Vec<(u16, Cow<'static, str>)>,
}

impl Default for ContentLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ContentLibrary {
    /// The content shipped with the game.
    pub fn builtin() -> Self {
        Self {
            enemies: Cow::Borrowed(ENEMIES),
            items: Cow::Borrowed(ITEMS),
            spells: Cow::Borrowed(SPELLS),
            quests: Cow::Borrowed(QUESTS),
            shops: Cow::Borrowed(SHOPS),
            level_curve: Cow::Borrowed(LEVEL_CURVE),
            dungeons: vec![
                (1, Cow::Borrowed(DUNGEON_1)),
                (2, Cow::Borrowed(DUNGEON_2)),
                (3, Cow::Borrowed(DUNGEON_3)),
                (4, Cow::Borrowed(DUNGEON_4)),
            ],
        }
    }

    /// A library with every source empty.
    pub fn empty() -> Self {
        Self {
            enemies: Cow::Borrowed(""),
            items: Cow::Borrowed(""),
            spells: Cow::Borrowed(""),
            quests: Cow::Borrowed(""),
            shops: Cow::Borrowed(""),
            level_curve: Cow::Borrowed(""),
            dungeons: Vec::new(),
        }
    }

    /// Replaces the dungeon sources.
    pub fn with_dungeons(mut self, dungeons: Vec<(u16, String)>) -> Self {
        self.dungeons = dungeons
            .into_iter()
            .map(|(id, source)| (id, Cow::Owned(source)))
            .collect();
        self
    }

    fn lookup<R: Record>(source: &str, id: u16) -> Option<R> {
        let record = find::<R>(source, id);
        if record.is_none() {
            debug!("{} {} not found", R::KIND, id);
        }
        record
    }

    pub fn enemy(&self, id: u16) -> Option<Enemy> {
        Self::lookup(&self.enemies, id)
    }

    /// Looks up an enemy, substituting the fallback opponent when missing.
    pub fn enemy_or_fallback(&self, id: u16) -> Enemy {
        self.enemy(id).unwrap_or_else(|| {
            warn!("enemy {} missing from content, using fallback", id);
            Enemy::fallback()
        })
    }

    pub fn item(&self, id: u16) -> Option<Item> {
        Self::lookup::<ItemRecord>(&self.items, id).map(Item::from)
    }

    pub fn spell(&self, id: u16) -> Option<Spell> {
        Self::lookup(&self.spells, id)
    }

    pub fn quest(&self, id: u16) -> Option<Quest> {
        Self::lookup(&self.quests, id)
    }

    /// Display name of a shop, or a generic label when the shop is unknown.
    pub fn shop_name(&self, shop_id: u16) -> String {
        match find::<ShopRecord>(&self.shops, shop_id) {
            Some(shop) if !shop.name.is_empty() => shop.name,
            _ => format!("Shop {}", shop_id),
        }
    }

    /// Lists what a shop sells, priced at each item's value.
    ///
    /// Ids missing from the item source are skipped and at most
    /// `SHOP_CAPACITY` entries are returned.
    pub fn shop_items(&self, shop_id: u16) -> Vec<ShopItem> {
        let Some(shop) = find::<ShopRecord>(&self.shops, shop_id) else {
            debug!("shop {} not found", shop_id);
            return Vec::new();
        };

        parse_id_list(&shop.items, usize::MAX)
            .into_iter()
            .filter_map(|item_id| self.item(item_id))
            .take(SHOP_CAPACITY)
            .map(|item| ShopItem {
                item_id: item.id,
                name: item.name,
                price: item.value,
            })
            .collect()
    }

    fn dungeon_source(&self, id: u16) -> Option<&str> {
        self.dungeons
            .iter()
            .find(|(slot, _)| *slot == id)
            .map(|(_, source)| source.as_ref())
    }

    /// Reads the `[INFO]` block of a dungeon. A block without a positive id
    /// does not count as a dungeon.
    pub fn dungeon_info(&self, id: u16) -> Option<DungeonInfo> {
        let source = self.dungeon_source(id)?;
        super::records::<DungeonInfo>(source)
            .next()
            .filter(|info| info.id > 0)
    }

    /// Decodes one floor of a dungeon into `codes`.
    ///
    /// Returns `false` (leaving `codes` cleared) when the dungeon or the floor
    /// does not exist.
    pub fn load_floor(&self, dungeon_id: u16, floor: u8, codes: &mut FloorCodes) -> bool {
        match self.dungeon_source(dungeon_id) {
            Some(source) => decode_floor(source, floor, codes),
            None => {
                for row in codes.iter_mut() {
                    row.fill(0);
                }
                false
            }
        }
    }

    /// Experience total required to reach `level`.
    pub fn xp_for_level(&self, level: u8) -> u32 {
        xp_for_level(&self.level_curve, level)
    }

    /// Lists every dungeon with a readable info block, in slot order.
    pub fn scan_dungeons(&self) -> Vec<DungeonEntry> {
        let mut slots: Vec<u16> = self.dungeons.iter().map(|(slot, _)| *slot).collect();
        slots.sort_unstable();

        let entries: Vec<DungeonEntry> = slots
            .into_iter()
            .filter_map(|slot| self.dungeon_info(slot).map(|info| (slot, info)))
            .take(DUNGEON_LIST_CAPACITY)
            .map(|(slot, info)| DungeonEntry {
                id: slot,
                name: info.name,
                min_level: info.min_level,
            })
            .collect();

        debug!("found {} dungeons", entries.len());
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAP_HEIGHT, MAP_WIDTH};
    use crate::content::ItemKind;

    #[test]
    fn test_builtin_starting_items_exist() {
        let library = ContentLibrary::builtin();
        let herb = library.item(1).unwrap();
        assert_eq!(herb.name, "Herb");
        assert!(herb.is_consumable());
        assert!(library.item(2).unwrap().is_consumable());
        assert!(matches!(
            library.item(5).unwrap().kind,
            ItemKind::Consumable { .. }
        ));
    }

    #[test]
    fn test_missing_enemy_uses_fallback() {
        let library = ContentLibrary::empty();
        let enemy = library.enemy_or_fallback(42);
        assert_eq!(enemy.name, "Slime");
        assert_eq!(enemy.max_hp, 10);
    }

    #[test]
    fn test_shop_skips_missing_items() {
        let mut library = ContentLibrary::empty();
        library.items = Cow::Borrowed("[ITEM]\nid=1\nname=Herb\nvalue=8\n[ITEM]\nid=3\nname=Rope\nvalue=4\n");
        library.shops = Cow::Borrowed("[SHOP]\nid=1\nname=Corner\nitems=1,2,3\n");

        let stock = library.shop_items(1);
        assert_eq!(stock.len(), 2);
        assert_eq!(stock[0].price, 8);
        assert_eq!(stock[1].name, "Rope");
        assert!(library.shop_items(9).is_empty());
        assert_eq!(library.shop_name(1), "Corner");
        assert_eq!(library.shop_name(9), "Shop 9");
    }

    #[test]
    fn test_shop_stock_is_bounded() {
        let mut library = ContentLibrary::empty();
        let mut items = String::new();
        for id in 1..=20 {
            items.push_str(&format!("[ITEM]\nid={}\nname=Thing{}\nvalue=1\n", id, id));
        }
        let ids: Vec<String> = (1..=20).map(|id| id.to_string()).collect();
        library.items = Cow::Owned(items);
        library.shops = Cow::Owned(format!("[SHOP]\nid=1\nitems={}\n", ids.join(",")));
        assert_eq!(library.shop_items(1).len(), SHOP_CAPACITY);
    }

    #[test]
    fn test_builtin_dungeons_scan() {
        let library = ContentLibrary::builtin();
        let dungeons = library.scan_dungeons();
        assert!(!dungeons.is_empty());
        assert!(dungeons.len() <= DUNGEON_LIST_CAPACITY);

        for entry in &dungeons {
            let info = library.dungeon_info(entry.id).unwrap();
            assert!(info.floors >= 1);
            assert!(!info.enemy_pool.is_empty());
            let mut codes = [[0u8; MAP_WIDTH]; MAP_HEIGHT];
            for floor in 1..=info.floors {
                assert!(library.load_floor(entry.id, floor, &mut codes));
            }
        }
    }

    #[test]
    fn test_info_without_id_is_not_a_dungeon() {
        let library = ContentLibrary::empty()
            .with_dungeons(vec![(1, "[INFO]\nname=Nameless\n".to_string())]);
        assert!(library.dungeon_info(1).is_none());
        assert!(library.scan_dungeons().is_empty());
    }

    #[test]
    fn test_builtin_level_curve_is_strictly_increasing() {
        let library = ContentLibrary::builtin();
        let mut previous = 0;
        for level in 2..=100u8 {
            let xp = library.xp_for_level(level);
            assert!(xp > previous, "level {} needs {} <= {}", level, xp, previous);
            previous = xp;
        }
    }
}
