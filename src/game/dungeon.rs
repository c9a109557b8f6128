//! # Dungeon Module
//!
//! Floor tile maps, movement and the effects of stepping onto a tile.
//!
//! A floor is a fixed 16×12 grid rebuilt from content every time the player
//! changes floors. The only floor state that survives a reload lives on the
//! player: opened chests are recorded in the world flags.

use crate::config::{MAP_HEIGHT, MAP_WIDTH};
use crate::content::{ContentLibrary, DungeonInfo, FloorCodes};
use crate::{DescentError, DescentResult, Direction, GameRng, Player, Position};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Kinds of dungeon tiles, in content code order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    Wall,
    Floor,
    Door,
    StairsDown,
    StairsUp,
    Chest,
    /// Occupied by a townsperson; passable and inert
    Npc,
    Trap,
    Boss,
    Entrance,
}

impl TileType {
    /// Decodes a content tile code. Unknown codes read as walls.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => TileType::Floor,
            2 => TileType::Door,
            3 => TileType::StairsDown,
            4 => TileType::StairsUp,
            5 => TileType::Chest,
            6 => TileType::Npc,
            7 => TileType::Trap,
            8 => TileType::Boss,
            9 => TileType::Entrance,
            _ => TileType::Wall,
        }
    }

    pub fn is_passable(self) -> bool {
        self != TileType::Wall
    }
}

/// The tiles of the current floor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TileMap {
    tiles: [[TileType; MAP_WIDTH]; MAP_HEIGHT],
}

impl TileMap {
    pub fn from_codes(codes: &FloorCodes) -> Self {
        let mut map = Self::default();
        for (row, code_row) in map.tiles.iter_mut().zip(codes.iter()) {
            for (tile, &code) in row.iter_mut().zip(code_row.iter()) {
                *tile = TileType::from_code(code);
            }
        }
        map
    }

    /// Loads one floor of a dungeon from content.
    pub fn load(content: &ContentLibrary, dungeon_id: u16, floor: u8) -> DescentResult<Self> {
        let mut codes = [[0u8; MAP_WIDTH]; MAP_HEIGHT];
        if !content.load_floor(dungeon_id, floor, &mut codes) {
            return Err(DescentError::InvalidState(format!(
                "dungeon {} has no floor {}",
                dungeon_id, floor
            )));
        }
        Ok(Self::from_codes(&codes))
    }

    /// Tile at `pos`; off-map positions read as walls.
    pub fn get(&self, pos: Position) -> TileType {
        if pos.in_bounds() {
            self.tiles[pos.y as usize][pos.x as usize]
        } else {
            TileType::Wall
        }
    }

    pub fn set(&mut self, pos: Position, tile: TileType) {
        if pos.in_bounds() {
            self.tiles[pos.y as usize][pos.x as usize] = tile;
        }
    }

    /// Last tile of a kind in row-major scan order.
    pub fn find_last(&self, tile: TileType) -> Option<Position> {
        let mut found = None;
        for (y, row) in self.tiles.iter().enumerate() {
            for (x, &t) in row.iter().enumerate() {
                if t == tile {
                    found = Some(Position::new(x as u8, y as u8));
                }
            }
        }
        found
    }

    pub fn rows(&self) -> impl Iterator<Item = &[TileType; MAP_WIDTH]> {
        self.tiles.iter()
    }
}

/// World-flag index of the chest on `floor` in row `y`.
///
/// Chests in the same row of the same floor share a key.
pub fn chest_key(floor: u8, y: u8) -> u32 {
    (floor.saturating_sub(1) as u32) * 16 + (y as u32 % MAP_HEIGHT as u32)
}

/// Contents of an opened chest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChestLoot {
    Items { item_id: u16, quantity: u8 },
    Gold(u32),
}

/// Rolls chest contents: herbs 40%, ether 20%, gold 20%, elixir 20%.
pub fn roll_chest_loot(rng: &mut GameRng) -> ChestLoot {
    let roll = rng.percent();
    if roll < 40 {
        ChestLoot::Items {
            item_id: 1,
            quantity: 1 + rng.below(2) as u8,
        }
    } else if roll < 60 {
        ChestLoot::Items {
            item_id: 2,
            quantity: 1,
        }
    } else if roll < 80 {
        ChestLoot::Gold(20 + rng.below(30))
    } else {
        ChestLoot::Items {
            item_id: 5,
            quantity: 1,
        }
    }
}

/// Trap damage on `floor`: `3 + floor*2 + 0..=3`.
pub fn trap_damage(floor: u8, rng: &mut GameRng) -> i32 {
    3 + floor as i32 * 2 + rng.below(4) as i32
}

/// What happened when the player tried to move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Wall or map edge; nothing changed
    Blocked,
    /// Moved onto a tile without further effect
    Moved,
    /// Took the stairs to another floor
    FloorChanged { floor: u8 },
    /// Took the stairs up from floor 1
    ExitedToTown,
    /// Opened a chest for the first time
    Treasure(ChestLoot),
    /// Stepped on a trap
    Trap { damage: i32 },
    /// Stepped on the boss tile
    Boss { enemy_id: u16 },
    /// A random encounter was rolled
    Encounter { enemy_id: u16 },
}

/// The dungeon the player is exploring and its current floor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DungeonRun {
    pub info: DungeonInfo,
    pub map: TileMap,
}

impl DungeonRun {
    /// Enters a dungeon on floor 1 at its entrance tile.
    ///
    /// The last entrance in scan order wins; without one the player starts
    /// at (1, 1).
    pub fn enter(
        content: &ContentLibrary,
        dungeon_id: u16,
        player: &mut Player,
    ) -> DescentResult<Self> {
        let info = content
            .dungeon_info(dungeon_id)
            .ok_or(DescentError::ContentNotFound {
                kind: "dungeon",
                id: dungeon_id,
            })?;
        let map = TileMap::load(content, dungeon_id, 1)?;

        player.dungeon_id = dungeon_id;
        player.floor = 1;
        player.position = map
            .find_last(TileType::Entrance)
            .unwrap_or(Position::new(1, 1));

        info!("entering {} (min level {})", info.name, info.min_level);
        Ok(Self { info, map })
    }

    /// Moves one step and resolves the tile stepped onto.
    pub fn step(
        &mut self,
        player: &mut Player,
        direction: Direction,
        content: &ContentLibrary,
        rng: &mut GameRng,
    ) -> MoveOutcome {
        let Some(target) = player.position.step(direction) else {
            return MoveOutcome::Blocked;
        };
        let tile = self.map.get(target);
        if !tile.is_passable() {
            return MoveOutcome::Blocked;
        }

        player.position = target;

        match tile {
            TileType::StairsDown => self.descend(player, content),
            TileType::StairsUp => self.ascend(player, content),
            TileType::Chest => {
                let key = chest_key(player.floor, target.y);
                if player.world_flags.is_set(key) {
                    return MoveOutcome::Moved;
                }
                player.world_flags.set(key);
                let loot = roll_chest_loot(rng);
                match loot {
                    ChestLoot::Items { item_id, quantity } => {
                        player.inventory.add(item_id, quantity);
                    }
                    ChestLoot::Gold(amount) => player.gold = player.gold.saturating_add(amount),
                }
                debug!("chest {} opened: {:?}", key, loot);
                MoveOutcome::Treasure(loot)
            }
            TileType::Boss => match self.info.boss() {
                Some(enemy_id) => MoveOutcome::Boss { enemy_id },
                None => MoveOutcome::Moved,
            },
            TileType::Trap => {
                let damage = trap_damage(player.floor, rng);
                player.take_damage(damage);
                self.map.set(target, TileType::Floor);
                MoveOutcome::Trap { damage }
            }
            TileType::Floor | TileType::Door => match self.roll_encounter(rng) {
                Some(enemy_id) => MoveOutcome::Encounter { enemy_id },
                None => MoveOutcome::Moved,
            },
            _ => MoveOutcome::Moved,
        }
    }

    /// Rolls for a random encounter against the dungeon's pool.
    pub fn roll_encounter(&self, rng: &mut GameRng) -> Option<u16> {
        if !rng.chance(self.info.encounter_rate as u32) {
            return None;
        }
        rng.pick(&self.info.enemy_pool).copied()
    }

    fn descend(&mut self, player: &mut Player, content: &ContentLibrary) -> MoveOutcome {
        if player.floor >= self.info.floors {
            return MoveOutcome::Moved;
        }
        self.change_floor(player, content, player.floor + 1, TileType::StairsUp)
    }

    fn ascend(&mut self, player: &mut Player, content: &ContentLibrary) -> MoveOutcome {
        if player.floor <= 1 {
            player.dungeon_id = 0;
            info!("left {} by the stairs", self.info.name);
            return MoveOutcome::ExitedToTown;
        }
        self.change_floor(player, content, player.floor - 1, TileType::StairsDown)
    }

    fn change_floor(
        &mut self,
        player: &mut Player,
        content: &ContentLibrary,
        floor: u8,
        arrival: TileType,
    ) -> MoveOutcome {
        let mut codes = [[0u8; MAP_WIDTH]; MAP_HEIGHT];
        if !content.load_floor(player.dungeon_id, floor, &mut codes) {
            warn!(
                "{} has no floor {}, staying on floor {}",
                self.info.name, floor, player.floor
            );
            return MoveOutcome::Moved;
        }
        self.map = TileMap::from_codes(&codes);
        player.floor = floor;
        if let Some(pos) = self.map.find_last(arrival) {
            player.position = pos;
        }
        debug!("{} floor {}", self.info.name, floor);
        MoveOutcome::FloorChanged { floor }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_content(rate: u8) -> ContentLibrary {
        let source = format!(
            "[INFO]\nid=1\nname=Test Hole\nfloors=2\nminLevel=1\nencounterRate={}\nenemies=1,2\n\
             [FLOOR1]\nmap=0000000000000000\nmap=0917135000000000\nmap=0100000000000000\n\
             [FLOOR2]\nmap=0000000000000000\nmap=0418000000000000\n",
            rate
        );
        ContentLibrary::empty().with_dungeons(vec![(1, source)])
    }

    #[test]
    fn test_tile_codes() {
        assert_eq!(TileType::from_code(0), TileType::Wall);
        assert_eq!(TileType::from_code(6), TileType::Npc);
        assert_eq!(TileType::from_code(9), TileType::Entrance);
        assert_eq!(TileType::from_code(42), TileType::Wall);
        assert!(TileType::Npc.is_passable());
    }

    #[test]
    fn test_enter_places_player_on_entrance() {
        let content = test_content(0);
        let mut player = Player::new_game(&content);
        let run = DungeonRun::enter(&content, 1, &mut player).unwrap();
        assert_eq!(player.position, Position::new(1, 1));
        assert_eq!(player.floor, 1);
        assert_eq!(player.dungeon_id, 1);
        assert_eq!(run.info.name, "Test Hole");
        assert!(DungeonRun::enter(&content, 7, &mut player).is_err());
    }

    #[test]
    fn test_walls_block_movement() {
        let content = test_content(0);
        let mut player = Player::new_game(&content);
        let mut run = DungeonRun::enter(&content, 1, &mut player).unwrap();
        let mut rng = GameRng::seeded(1);
        assert_eq!(
            run.step(&mut player, Direction::North, &content, &mut rng),
            MoveOutcome::Blocked
        );
        assert_eq!(player.position, Position::new(1, 1));
        assert_eq!(
            run.step(&mut player, Direction::South, &content, &mut rng),
            MoveOutcome::Moved
        );
    }

    #[test]
    fn test_trap_becomes_floor() {
        let content = test_content(0);
        let mut player = Player::new_game(&content);
        let mut run = DungeonRun::enter(&content, 1, &mut player).unwrap();
        let mut rng = GameRng::seeded(1);
        player.position = Position::new(2, 1);

        let outcome = run.step(&mut player, Direction::East, &content, &mut rng);
        let MoveOutcome::Trap { damage } = outcome else {
            panic!("expected trap, got {:?}", outcome);
        };
        assert!((5..=8).contains(&damage));
        assert_eq!(player.hp, 30 - damage as u16);
        assert_eq!(run.map.get(Position::new(3, 1)), TileType::Floor);
    }

    #[test]
    fn test_stairs_round_trip() {
        let content = test_content(0);
        let mut player = Player::new_game(&content);
        let mut run = DungeonRun::enter(&content, 1, &mut player).unwrap();
        let mut rng = GameRng::seeded(1);
        player.position = Position::new(4, 1);

        assert_eq!(
            run.step(&mut player, Direction::East, &content, &mut rng),
            MoveOutcome::FloorChanged { floor: 2 }
        );
        assert_eq!(player.position, Position::new(1, 1));

        player.position = Position::new(2, 1);
        assert_eq!(
            run.step(&mut player, Direction::West, &content, &mut rng),
            MoveOutcome::FloorChanged { floor: 1 }
        );
        assert_eq!(player.position, Position::new(5, 1));
    }

    #[test]
    fn test_missing_floor_keeps_current_map() {
        let source = "[INFO]\nid=1\nname=Half Dug\nfloors=3\n[FLOOR1]\nmap=0913000000000000\n";
        let content = ContentLibrary::empty().with_dungeons(vec![(1, source.to_string())]);
        let mut player = Player::new_game(&content);
        let mut run = DungeonRun::enter(&content, 1, &mut player).unwrap();
        let mut rng = GameRng::seeded(1);
        let before = run.map.clone();

        player.position = Position::new(2, 0);
        assert_eq!(
            run.step(&mut player, Direction::East, &content, &mut rng),
            MoveOutcome::Moved
        );
        assert_eq!(player.floor, 1);
        assert_eq!(player.position, Position::new(3, 0));
        assert_eq!(run.map, before);
    }

    #[test]
    fn test_boss_defaults_to_last_pool_entry() {
        let content = test_content(0);
        let mut player = Player::new_game(&content);
        let mut run = DungeonRun::enter(&content, 1, &mut player).unwrap();
        let mut rng = GameRng::seeded(1);
        player.position = Position::new(4, 1);
        run.step(&mut player, Direction::East, &content, &mut rng);

        player.position = Position::new(2, 1);
        assert_eq!(
            run.step(&mut player, Direction::East, &content, &mut rng),
            MoveOutcome::Boss { enemy_id: 2 }
        );
    }

    #[test]
    fn test_full_encounter_rate_always_fights() {
        let content = test_content(100);
        let mut player = Player::new_game(&content);
        let run = DungeonRun::enter(&content, 1, &mut player).unwrap();
        let mut rng = GameRng::seeded(9);
        for _ in 0..100 {
            let enemy = run.roll_encounter(&mut rng).unwrap();
            assert!(enemy == 1 || enemy == 2);
        }
    }

    #[test]
    fn test_empty_pool_never_fights() {
        let source = "[INFO]\nid=1\nname=Quiet\nfloors=1\nencounterRate=100\n[FLOOR1]\nmap=1111\n";
        let content = ContentLibrary::empty().with_dungeons(vec![(1, source.to_string())]);
        let mut player = Player::new_game(&content);
        let run = DungeonRun::enter(&content, 1, &mut player).unwrap();
        let mut rng = GameRng::seeded(9);
        assert_eq!(run.roll_encounter(&mut rng), None);
    }

    #[test]
    fn test_chest_key() {
        assert_eq!(chest_key(1, 3), 3);
        assert_eq!(chest_key(2, 3), 19);
        assert_eq!(chest_key(1, 15), 3);
    }
}
