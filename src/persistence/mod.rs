//! # Persistence Module
//!
//! Numbered save slots in a sectioned `key=value` text format:
//!
//! ```text
//! [PLAYER]
//! name=Arlen
//! hp=30
//! ...
//! [INVENTORY]
//! 1=3
//! [QUESTS]
//! 2=1
//! [FLAGS]
//! worldFlags=5
//! ```
//!
//! Decoding is forgiving. Each line belongs to the section named by the most
//! recent `[...]` header, unknown keys are skipped and missing keys stay zero.

pub mod storage;

pub use storage::*;

use crate::config::{MAX_STACK, SAVE_SLOTS};
use crate::content::{parse_number, split_key_value, truncate_field};
use crate::{DescentError, DescentResult, Player};
use log::{info, warn};
use std::fmt::Write as _;

/// Location of a save slot inside `dir`.
///
/// # Examples
///
/// ```
/// use descent::save_path;
///
/// assert_eq!(save_path("/rpg", 2), "/rpg/save2.dat");
/// ```
pub fn save_path(dir: &str, slot: u8) -> String {
    format!("{}/save{}.dat", dir.trim_end_matches('/'), slot)
}

fn check_slot(slot: u8) -> DescentResult<()> {
    if (1..=SAVE_SLOTS).contains(&slot) {
        Ok(())
    } else {
        Err(DescentError::InvalidAction(format!(
            "save slot {} is out of range",
            slot
        )))
    }
}

/// Serializes a player into the save text format.
pub fn encode_save(player: &Player) -> String {
    let mut out = String::new();
    let fields: [(&str, String); 20] = [
        ("name", player.name.clone()),
        ("hp", player.hp.to_string()),
        ("maxHp", player.max_hp.to_string()),
        ("mp", player.mp.to_string()),
        ("maxMp", player.max_mp.to_string()),
        ("atk", player.atk.to_string()),
        ("def", player.def.to_string()),
        ("mag", player.mag.to_string()),
        ("spd", player.spd.to_string()),
        ("level", player.level.to_string()),
        ("xp", player.xp.to_string()),
        ("xpNext", player.xp_next.to_string()),
        ("gold", player.gold.to_string()),
        ("dungeon", player.dungeon_id.to_string()),
        ("posX", player.position.x.to_string()),
        ("posY", player.position.y.to_string()),
        ("floor", player.floor.to_string()),
        ("weapon", player.equipment.weapon.to_string()),
        ("armor", player.equipment.armor.to_string()),
        ("accessory", player.equipment.accessory.to_string()),
    ];

    // Writing into a String cannot fail.
    let _ = writeln!(out, "[PLAYER]");
    for (key, value) in fields {
        let _ = writeln!(out, "{}={}", key, value);
    }

    let _ = writeln!(out, "[INVENTORY]");
    for slot in player.inventory.iter() {
        let _ = writeln!(out, "{}={}", slot.item_id, slot.quantity);
    }

    let _ = writeln!(out, "[QUESTS]");
    for quest in player.quests.iter() {
        let _ = writeln!(out, "{}={}", quest.quest_id, quest.progress);
    }

    let _ = writeln!(out, "[FLAGS]");
    let _ = writeln!(out, "worldFlags={}", player.world_flags.0);
    out
}

fn apply_player_field(player: &mut Player, key: &str, value: &str) {
    match key {
        "name" => player.name = truncate_field(value, 15),
        "hp" => player.hp = parse_number(value),
        "maxHp" => player.max_hp = parse_number(value),
        "mp" => player.mp = parse_number(value),
        "maxMp" => player.max_mp = parse_number(value),
        "atk" => player.atk = parse_number(value),
        "def" => player.def = parse_number(value),
        "mag" => player.mag = parse_number(value),
        "spd" => player.spd = parse_number(value),
        "level" => player.level = parse_number(value),
        "xp" => player.xp = parse_number(value),
        "xpNext" => player.xp_next = parse_number(value),
        "gold" => player.gold = parse_number(value),
        "dungeon" => player.dungeon_id = parse_number(value),
        "posX" => player.position.x = parse_number(value),
        "posY" => player.position.y = parse_number(value),
        "floor" => player.floor = parse_number(value),
        "weapon" => player.equipment.weapon = parse_number(value),
        "armor" => player.equipment.armor = parse_number(value),
        "accessory" => player.equipment.accessory = parse_number(value),
        _ => {}
    }
}

/// Decodes save text onto an all-zero player.
///
/// Inventory lines with a zero quantity are skipped, larger quantities are
/// capped at the stack limit and repeated ids merge into one slot.
pub fn decode_save(text: &str) -> Player {
    let mut player = Player::default();
    let mut section = "";

    for raw in text.lines() {
        let line = raw.trim();
        if line.starts_with('[') {
            section = line;
            continue;
        }
        let Some((key, value)) = split_key_value(line) else {
            continue;
        };
        let key = key.trim();

        match section {
            "[PLAYER]" => apply_player_field(&mut player, key, value),
            "[INVENTORY]" => {
                let item_id: u16 = parse_number(key);
                let quantity: u32 = parse_number(value);
                player
                    .inventory
                    .add(item_id, quantity.min(MAX_STACK as u32) as u8);
            }
            "[QUESTS]" => {
                player
                    .quests
                    .restore(parse_number(key), parse_number(value));
            }
            "[FLAGS]" if key == "worldFlags" => player.world_flags.0 = parse_number(value),
            _ => {}
        }
    }

    player
}

/// Returns true if the slot holds a save file.
pub fn save_exists(storage: &dyn Storage, dir: &str, slot: u8) -> bool {
    check_slot(slot).is_ok() && storage.exists(&save_path(dir, slot))
}

/// Writes the player into a save slot, replacing any previous save.
///
/// The new save is written beside the old one and moved over it, so a failed
/// write leaves the previous save intact.
pub fn save_game(
    storage: &mut dyn Storage,
    dir: &str,
    slot: u8,
    player: &Player,
) -> DescentResult<()> {
    check_slot(slot)?;
    let path = save_path(dir, slot);
    let staging = format!("{}.tmp", path);
    storage.mkdir(dir)?;
    if let Err(e) = storage.write(&staging, &encode_save(player)) {
        let _ = storage.remove(&staging);
        return Err(e);
    }
    storage.rename(&staging, &path)?;
    info!("saved {} to slot {}", player.name, slot);
    Ok(())
}

/// Reads the player stored in a save slot.
pub fn load_game(storage: &dyn Storage, dir: &str, slot: u8) -> DescentResult<Player> {
    check_slot(slot)?;
    let path = save_path(dir, slot);
    if !storage.exists(&path) {
        return Err(DescentError::SaveNotFound(slot));
    }
    let text = storage.read_to_string(&path).map_err(|e| {
        warn!("reading {} failed: {}", path, e);
        e
    })?;
    let player = decode_save(&text);
    info!("loaded {} (level {}) from slot {}", player.name, player.level, slot);
    Ok(player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentLibrary;
    use crate::Position;

    fn sample_player() -> Player {
        let content = ContentLibrary::builtin();
        let mut player = Player::new_game(&content);
        player.gold = 1234;
        player.position = Position::new(7, 9);
        player.floor = 2;
        player.dungeon_id = 3;
        player.equipment.weapon = 11;
        player.inventory.add(2, 4);
        player.quests.restore(3, 2);
        player.world_flags.set(5);
        player
    }

    #[test]
    fn test_encode_lists_every_section() {
        let text = encode_save(&sample_player());
        for header in ["[PLAYER]", "[INVENTORY]", "[QUESTS]", "[FLAGS]"] {
            assert!(text.contains(header));
        }
        assert!(text.contains("xpNext="));
        assert!(text.contains("posX=7"));
        assert!(text.contains("worldFlags=32"));
    }

    #[test]
    fn test_decode_roundtrip() {
        let player = sample_player();
        assert_eq!(decode_save(&encode_save(&player)), player);
    }

    #[test]
    fn test_decode_tolerates_reordering_and_junk() {
        let text = "stray=1\n[FLAGS]\nworldFlags=9\n[QUESTS]\n4=1\n[PLAYER]\nmystery=5\ngold=77\nlevel=3\n\
                    [INVENTORY]\n1=0\n2=150\n2=5\nnonsense\n";
        let player = decode_save(text);
        assert_eq!(player.gold, 77);
        assert_eq!(player.level, 3);
        assert_eq!(player.hp, 0);
        assert_eq!(player.world_flags.0, 9);
        assert_eq!(player.quests.progress(4), Some(1));
        assert_eq!(player.inventory.quantity(1), 0);
        assert_eq!(player.inventory.quantity(2), MAX_STACK);
        assert_eq!(player.inventory.len(), 1);
    }

    #[test]
    fn test_slots_and_missing_saves() {
        let mut storage = MemoryStorage::new();
        let player = sample_player();
        assert!(save_game(&mut storage, "/rpg", 4, &player).is_err());
        assert!(!save_exists(&storage, "/rpg", 2));
        assert!(matches!(
            load_game(&storage, "/rpg", 2),
            Err(DescentError::SaveNotFound(2))
        ));

        save_game(&mut storage, "/rpg", 2, &player).unwrap();
        assert!(save_exists(&storage, "/rpg", 2));
        assert_eq!(load_game(&storage, "/rpg", 2).unwrap(), player);
    }

    #[test]
    fn test_read_only_storage_reports_error() {
        let mut storage = MemoryStorage::read_only();
        let result = save_game(&mut storage, "/rpg", 1, &sample_player());
        assert!(matches!(result, Err(DescentError::Storage(_))));
    }

    /// Storage whose writes always fail after the directory exists.
    struct BrokenWrites(MemoryStorage);

    impl Storage for BrokenWrites {
        fn exists(&self, path: &str) -> bool {
            self.0.exists(path)
        }

        fn remove(&mut self, path: &str) -> DescentResult<()> {
            self.0.remove(path)
        }

        fn mkdir(&mut self, path: &str) -> DescentResult<()> {
            self.0.mkdir(path)
        }

        fn read_to_string(&self, path: &str) -> DescentResult<String> {
            self.0.read_to_string(path)
        }

        fn write(&mut self, _path: &str, _contents: &str) -> DescentResult<()> {
            Err(DescentError::Storage("disk full".to_string()))
        }

        fn rename(&mut self, from: &str, to: &str) -> DescentResult<()> {
            self.0.rename(from, to)
        }
    }

    #[test]
    fn test_failed_write_keeps_previous_save() {
        let old = sample_player();
        let mut inner = MemoryStorage::new();
        save_game(&mut inner, "/rpg", 1, &old).unwrap();

        let mut storage = BrokenWrites(inner);
        let mut newer = old.clone();
        newer.gold = 1;
        assert!(save_game(&mut storage, "/rpg", 1, &newer).is_err());

        assert_eq!(load_game(&storage, "/rpg", 1).unwrap(), old);
        assert!(!storage.exists("/rpg/save1.dat.tmp"));
    }

    #[test]
    fn test_overwrite_leaves_no_staging_file() {
        let mut storage = MemoryStorage::new();
        let mut player = sample_player();
        save_game(&mut storage, "/rpg", 1, &player).unwrap();
        player.gold = 5;
        save_game(&mut storage, "/rpg", 1, &player).unwrap();

        assert_eq!(load_game(&storage, "/rpg", 1).unwrap().gold, 5);
        let files: Vec<&str> = storage.files().collect();
        assert_eq!(files, vec!["/rpg/save1.dat"]);
    }
}
