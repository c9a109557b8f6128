//! # Game State Module
//!
//! The screen state machine that ties every game system together.
//!
//! [`GameState`] is the single application context. It owns the player, the
//! fight and dungeon in progress, per-screen cursors, and the collaborators
//! (audio, storage). Input arrives one device key code at a time through
//! [`GameState::handle_key`]; each key is processed to completion, including
//! the short pacing pauses that keep combat messages readable.
//!
//! Nothing is drawn while a key is handled. Mutations raise a
//! [`RedrawSignal`] which the host consumes with [`GameState::render`].

use crate::audio::{AudioSink, Jingle, LogAudio, Track};
use crate::config::{LIST_PAGE_SIZE, SAVE_SLOTS, SPELL_PAGE_SIZE};
use crate::content::{ContentLibrary, DungeonEntry, ItemKind, ShopItem};
use crate::game::{
    check_level_up, ChestLoot, Combat, Direction, DungeonRun, EnemyTurn, GameRng, LevelGains,
    MoveOutcome, Player, TurnPhase,
};
use crate::input::{Key, KeyboardMode};
use crate::persistence::{load_game, save_exists, save_game, MemoryStorage, Storage};
use crate::rendering::{paint_screen, RefreshMode, Surface};
use crate::scenes::Screen;
use crate::{DescentError, EngineConfig};
use log::{debug, info, warn};
use std::time::Duration;

/// Whether the host should keep running after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    /// Back was pressed on the title screen
    ExitRequested,
}

/// Pending redraw state, consumed by [`GameState::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RedrawSignal {
    /// A different screen is now current
    pub screen_changed: bool,
    /// Something on the current screen changed
    pub dirty: bool,
    /// The next commit should use the slow full refresh
    pub full_refresh: bool,
}

impl RedrawSignal {
    pub fn is_pending(&self) -> bool {
        self.screen_changed || self.dirty
    }
}

/// The shop being browsed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShopView {
    pub shop_id: u16,
    pub name: String,
    pub items: Vec<ShopItem>,
    /// Buying from the shop; false while selling from the inventory
    pub buy_mode: bool,
    /// Page of the buy list
    pub page: usize,
}

/// Session counters shown on the status screen. Not saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameStatistics {
    pub steps_taken: u32,
    pub battles_won: u32,
    pub chests_opened: u32,
}

/// Central game state and screen state machine.
pub struct GameState {
    content: ContentLibrary,
    config: EngineConfig,
    rng: GameRng,
    audio: Box<dyn AudioSink>,
    storage: Box<dyn Storage>,
    player: Player,
    screen: Screen,
    /// Screen that "back" returns to from Inventory and Status
    previous: Screen,
    keyboard_mode: KeyboardMode,
    music_muted: bool,
    combat: Option<Combat>,
    /// Recent combat lines, oldest first
    combat_log: Vec<String>,
    dungeon: Option<DungeonRun>,
    dungeon_list: Vec<DungeonEntry>,
    shop: ShopView,
    inventory_page: usize,
    spell_page: usize,
    quest_page: usize,
    status: String,
    level_gains: Option<LevelGains>,
    treasure: Option<ChestLoot>,
    statistics: GameStatistics,
    redraw: RedrawSignal,
    track: Option<Track>,
}

const COMBAT_LOG_LINES: usize = 3;

impl GameState {
    /// Creates the game on its title screen.
    ///
    /// Scans the content library for dungeons, plays the start-up jingle and
    /// starts the title track.
    pub fn new(
        content: ContentLibrary,
        config: EngineConfig,
        audio: Box<dyn AudioSink>,
        storage: Box<dyn Storage>,
    ) -> Self {
        let rng = GameRng::new(config.seed);
        let dungeon_list = content.scan_dungeons();
        info!(
            "game ready: {} dungeons, seed {:?}",
            dungeon_list.len(),
            rng.seed()
        );

        let mut state = Self {
            player: Player::new_game(&content),
            content,
            config,
            rng,
            audio,
            storage,
            screen: Screen::Title,
            previous: Screen::Title,
            keyboard_mode: KeyboardMode::Normal,
            music_muted: false,
            combat: None,
            combat_log: Vec::new(),
            dungeon: None,
            dungeon_list,
            shop: ShopView::default(),
            inventory_page: 0,
            spell_page: 0,
            quest_page: 0,
            status: String::new(),
            level_gains: None,
            treasure: None,
            statistics: GameStatistics::default(),
            redraw: RedrawSignal {
                screen_changed: true,
                dirty: true,
                full_refresh: true,
            },
            track: None,
        };

        state.audio.play_jingle(Jingle::Startup);
        state.sync_audio();
        state
    }

    /// A game with built-in content, in-memory saves, a logging audio sink,
    /// a fixed seed and no pacing delays.
    pub fn headless(seed: u64) -> Self {
        Self::new(
            ContentLibrary::builtin(),
            EngineConfig::for_testing(seed),
            Box::new(LogAudio::new()),
            Box::new(MemoryStorage::new()),
        )
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn previous_screen(&self) -> Screen {
        self.previous
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn content(&self) -> &ContentLibrary {
        &self.content
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn combat(&self) -> Option<&Combat> {
        self.combat.as_ref()
    }

    pub fn combat_log(&self) -> &[String] {
        &self.combat_log
    }

    pub fn dungeon(&self) -> Option<&DungeonRun> {
        self.dungeon.as_ref()
    }

    pub fn dungeon_list(&self) -> &[DungeonEntry] {
        &self.dungeon_list
    }

    pub fn shop(&self) -> &ShopView {
        &self.shop
    }

    pub fn inventory_page(&self) -> usize {
        self.inventory_page
    }

    pub fn spell_page(&self) -> usize {
        self.spell_page
    }

    pub fn quest_page(&self) -> usize {
        self.quest_page
    }

    /// The transient player-facing message.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn keyboard_mode(&self) -> KeyboardMode {
        self.keyboard_mode
    }

    pub fn music_muted(&self) -> bool {
        self.music_muted
    }

    /// Stat gains of the most recent level-up.
    pub fn level_gains(&self) -> Option<LevelGains> {
        self.level_gains
    }

    /// Contents of the most recently opened chest.
    pub fn treasure(&self) -> Option<ChestLoot> {
        self.treasure
    }

    pub fn statistics(&self) -> GameStatistics {
        self.statistics
    }

    pub fn redraw_signal(&self) -> RedrawSignal {
        self.redraw
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw.is_pending()
    }

    /// Occupancy of each save slot, slot 1 first.
    pub fn save_slots(&self) -> Vec<bool> {
        (1..=SAVE_SLOTS)
            .map(|slot| save_exists(self.storage.as_ref(), &self.config.save_dir, slot))
            .collect()
    }

    /// Paints the current screen and commits it, consuming the redraw signal.
    pub fn render(&mut self, surface: &mut dyn Surface) {
        let mode = if self.redraw.full_refresh {
            RefreshMode::Full
        } else {
            RefreshMode::Fast
        };
        surface.clear();
        paint_screen(self, surface);
        surface.commit(mode);
        self.redraw = RedrawSignal::default();
    }

    /// Processes one device key code. Code 0 means no key and does nothing.
    pub fn handle_key(&mut self, code: u8) -> KeyOutcome {
        let Some(key) = Key::from_code(code) else {
            return KeyOutcome::Continue;
        };

        match key {
            Key::Shift => {
                self.keyboard_mode = self.keyboard_mode.after_shift();
                self.mark_dirty();
                return KeyOutcome::Continue;
            }
            Key::Fn => {
                self.keyboard_mode = self.keyboard_mode.after_fn();
                self.mark_dirty();
                return KeyOutcome::Continue;
            }
            _ => {}
        }

        if key.is_letter('m') && self.screen.allows_mute() {
            self.toggle_music();
            return KeyOutcome::Continue;
        }

        if key == Key::Back && self.screen == Screen::Title {
            self.set_status("Exiting...");
            self.track = None;
            self.audio.set_track(None);
            return KeyOutcome::ExitRequested;
        }

        match self.screen {
            Screen::Title => self.handle_title(key),
            Screen::LoadSelect => self.handle_load_select(key),
            Screen::Town => self.handle_town(key),
            Screen::Shop => self.handle_shop(key),
            Screen::Inn => self.handle_inn(key),
            Screen::QuestBoard => self.handle_quest_board(key),
            Screen::Inventory => self.handle_inventory(key),
            Screen::DungeonSelect => self.handle_dungeon_select(key),
            Screen::Dungeon => self.handle_dungeon(key),
            Screen::Combat => self.handle_combat(key),
            Screen::CombatMagic => self.handle_combat_magic(key),
            Screen::CombatItem => self.handle_combat_item(key),
            Screen::CombatResult => self.handle_combat_result(),
            Screen::LevelUp => {
                self.combat = None;
                self.go_with_full_refresh(Screen::Dungeon);
            }
            Screen::Treasure => self.go(Screen::Dungeon),
            Screen::Dialogue => {
                if key == Key::Back || key == Key::Confirm {
                    self.go(self.previous);
                }
            }
            Screen::GameOver => {
                self.combat = None;
                self.dungeon = None;
                self.go_with_full_refresh(Screen::Title);
            }
            Screen::Status => {
                if key == Key::Back || key == Key::Confirm {
                    self.go(self.previous);
                }
            }
        }

        self.sync_audio();
        KeyOutcome::Continue
    }

    /// Starts a fight against `enemy_id`, or the fallback enemy when the
    /// id is unknown.
    pub fn start_combat(&mut self, enemy_id: u16) {
        let enemy = self.content.enemy_or_fallback(enemy_id);
        info!("encounter: {} (id {})", enemy.name, enemy.id);
        self.combat = Some(Combat::new(enemy));
        self.combat_log.clear();
        self.previous = self.screen;
        self.audio.play_jingle(Jingle::Encounter);
        self.go(Screen::Combat);
        self.set_status("Encounter!");
        self.sync_audio();
    }

    fn go(&mut self, screen: Screen) {
        if screen != self.screen {
            debug!("screen {:?} -> {:?}", self.screen, screen);
        }
        self.screen = screen;
        self.redraw.screen_changed = true;
    }

    fn go_with_full_refresh(&mut self, screen: Screen) {
        self.go(screen);
        self.redraw.full_refresh = true;
    }

    fn mark_dirty(&mut self) {
        self.redraw.dirty = true;
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        self.mark_dirty();
    }

    fn sync_audio(&mut self) {
        let wanted = self.screen.track();
        if wanted != self.track {
            self.track = wanted;
            self.audio.set_track(wanted);
        }
    }

    fn toggle_music(&mut self) {
        self.music_muted = !self.music_muted;
        self.audio.set_music_muted(self.music_muted);
        let message = if self.music_muted {
            "Music: OFF"
        } else {
            "Music: ON"
        };
        self.set_status(message);
    }

    fn pause(&self, millis: u64) {
        if millis > 0 {
            std::thread::sleep(Duration::from_millis(millis));
        }
    }

    /// Zero-based list index selected by a digit key on `page`.
    fn list_index(key: Key, page: usize) -> Option<usize> {
        key.menu_digit()
            .map(|digit| page * LIST_PAGE_SIZE + digit as usize - 1)
    }

    fn page_left(page: &mut usize) -> bool {
        if *page > 0 {
            *page -= 1;
            true
        } else {
            false
        }
    }

    fn page_right(page: &mut usize, count: usize) -> bool {
        if (*page + 1) * LIST_PAGE_SIZE < count {
            *page += 1;
            true
        } else {
            false
        }
    }

    fn handle_title(&mut self, key: Key) {
        if key == Key::Confirm {
            self.go(Screen::LoadSelect);
        }
    }

    fn handle_load_select(&mut self, key: Key) {
        if key.is_letter('n') {
            self.player = Player::new_game(&self.content);
            self.dungeon = None;
            self.combat = None;
            info!("new game started");
            self.go(Screen::Town);
            self.set_status("New Adventure!");
            return;
        }

        if key == Key::Back {
            self.go(Screen::Title);
            return;
        }

        let Some(slot) = key.menu_digit().filter(|slot| *slot <= SAVE_SLOTS) else {
            return;
        };
        match load_game(self.storage.as_ref(), &self.config.save_dir, slot) {
            Ok(player) => {
                self.player = player;
                self.dungeon = None;
                self.combat = None;
                self.go(Screen::Town);
                self.set_status("Game Loaded!");
            }
            Err(DescentError::SaveNotFound(_)) => self.set_status("No save in slot!"),
            Err(e) => {
                warn!("load from slot {} failed: {}", slot, e);
                self.set_status("Load failed!");
            }
        }
    }

    fn handle_town(&mut self, key: Key) {
        match key {
            Key::Char(c @ '1'..='3') => self.open_shop(c as u16 - '0' as u16),
            Key::Char('4') => self.go(Screen::Inn),
            Key::Char('5') => {
                if self.dungeon_list.is_empty() {
                    self.set_status("No dungeons found!");
                } else {
                    self.go(Screen::DungeonSelect);
                }
            }
            Key::Char('6') | Key::Char('i') | Key::Char('I') => {
                self.inventory_page = 0;
                self.previous = Screen::Town;
                self.go(Screen::Inventory);
            }
            Key::Char('7') => self.save_to_slot(1),
            Key::Char('8') => self.go(Screen::QuestBoard),
            Key::Char('s') | Key::Char('S') => {
                self.previous = Screen::Town;
                self.go(Screen::Status);
            }
            Key::Back => self.go(Screen::Title),
            _ => {}
        }
    }

    fn save_to_slot(&mut self, slot: u8) {
        match save_game(
            self.storage.as_mut(),
            &self.config.save_dir,
            slot,
            &self.player,
        ) {
            Ok(()) => self.set_status("Game Saved!"),
            Err(e) => {
                warn!("save to slot {} failed: {}", slot, e);
                self.set_status("Save failed!");
            }
        }
    }

    fn open_shop(&mut self, shop_id: u16) {
        self.shop = ShopView {
            shop_id,
            name: self.content.shop_name(shop_id),
            items: self.content.shop_items(shop_id),
            buy_mode: true,
            page: 0,
        };
        self.inventory_page = 0;
        let name = self.shop.name.clone();
        self.go(Screen::Shop);
        self.set_status(name);
    }

    fn handle_shop(&mut self, key: Key) {
        match key {
            Key::Back => self.go(Screen::Town),
            Key::Left => {
                let page = if self.shop.buy_mode {
                    &mut self.shop.page
                } else {
                    &mut self.inventory_page
                };
                if Self::page_left(page) {
                    self.mark_dirty();
                }
            }
            Key::Right => {
                let moved = if self.shop.buy_mode {
                    Self::page_right(&mut self.shop.page, self.shop.items.len())
                } else {
                    Self::page_right(&mut self.inventory_page, self.player.inventory.len())
                };
                if moved {
                    self.mark_dirty();
                }
            }
            _ if self.shop.buy_mode => self.handle_shop_buy(key),
            _ => self.handle_shop_sell(key),
        }
    }

    fn handle_shop_buy(&mut self, key: Key) {
        if key.is_letter('s') {
            self.shop.buy_mode = false;
            self.inventory_page = 0;
            self.mark_dirty();
            return;
        }

        let Some(index) = Self::list_index(key, self.shop.page) else {
            return;
        };
        let Some(offer) = self.shop.items.get(index).cloned() else {
            return;
        };

        if self.player.gold < offer.price as u32 {
            self.set_status("Not enough gold!");
            return;
        }
        if !self.player.inventory.add(offer.item_id, 1) {
            self.set_status("Inventory full!");
            return;
        }
        self.player.gold -= offer.price as u32;
        self.audio.play_jingle(Jingle::ShopBuy);
        info!("bought {} for {}g", offer.name, offer.price);
        self.set_status(format!("Bought {}!", offer.name));
    }

    fn handle_shop_sell(&mut self, key: Key) {
        if key.is_letter('b') {
            self.shop.buy_mode = true;
            self.shop.page = 0;
            self.mark_dirty();
            return;
        }

        let Some(index) = Self::list_index(key, self.inventory_page) else {
            return;
        };
        let Some(slot) = self.player.inventory.get(index).copied() else {
            return;
        };
        let Some(item) = self.content.item(slot.item_id) else {
            return;
        };

        let price = item.sell_price();
        self.player.gold = self.player.gold.saturating_add(price as u32);
        self.player.inventory.remove(item.id, 1);
        info!("sold {} for {}g", item.name, price);
        self.set_status(format!("Sold {} +{}g", item.name, price));
    }

    /// Gold the inn charges for a night.
    pub fn inn_cost(&self) -> u32 {
        self.player.level as u32 * 5
    }

    fn handle_inn(&mut self, key: Key) {
        match key {
            Key::Char('1') | Key::Confirm => {
                if self.player.spend_gold(self.inn_cost()) {
                    self.player.heal_full();
                    self.audio.play_jingle(Jingle::Heal);
                    self.set_status("HP & MP restored!");
                } else {
                    self.set_status("Not enough gold!");
                }
            }
            Key::Back => self.go(Screen::Town),
            _ => {}
        }
    }

    /// Quest id shown at `index` (zero-based) on the current board page.
    pub fn quest_id_at(&self, index: usize) -> u16 {
        (self.quest_page * LIST_PAGE_SIZE + index + 1) as u16
    }

    fn handle_quest_board(&mut self, key: Key) {
        match key {
            Key::Char(c @ '1'..='6') => {
                let quest_id = self.quest_id_at((c as u8 - b'1') as usize);
                self.select_quest(quest_id);
            }
            Key::Left => {
                if Self::page_left(&mut self.quest_page) {
                    self.mark_dirty();
                }
            }
            Key::Right => {
                let next_first = self.quest_id_at(LIST_PAGE_SIZE);
                if self.content.quest(next_first).is_some() {
                    self.quest_page += 1;
                    self.mark_dirty();
                }
            }
            Key::Back => self.go(Screen::Town),
            _ => {}
        }
    }

    fn select_quest(&mut self, quest_id: u16) {
        let Some(quest) = self.content.quest(quest_id) else {
            return;
        };

        match self.player.quests.progress(quest_id) {
            None => {
                if self.player.quests.accept(quest_id) {
                    info!("accepted quest {}", quest.name);
                    self.set_status(format!("Accepted: {}", quest.name));
                } else {
                    self.set_status("Quest log full!");
                }
            }
            Some(progress) if progress >= quest.target_count => {
                let reward = quest.reward;
                self.player.gold = self.player.gold.saturating_add(reward.gold as u32);
                self.player.xp = self.player.xp.saturating_add(reward.xp);
                if reward.item > 0 {
                    self.player.inventory.add(reward.item, 1);
                }
                self.player.quests.remove(quest_id);
                info!("completed quest {}", quest.name);
                self.set_status(format!("Quest done! +{}g +{}xp", reward.gold, reward.xp));
            }
            Some(_) => {}
        }
    }

    fn handle_inventory(&mut self, key: Key) {
        match key {
            Key::Back => self.go(self.previous),
            Key::Left => {
                if Self::page_left(&mut self.inventory_page) {
                    self.mark_dirty();
                }
            }
            Key::Right => {
                if Self::page_right(&mut self.inventory_page, self.player.inventory.len()) {
                    self.mark_dirty();
                }
            }
            _ => {
                let Some(index) = Self::list_index(key, self.inventory_page) else {
                    return;
                };
                let Some(slot) = self.player.inventory.get(index).copied() else {
                    return;
                };
                let Some(item) = self.content.item(slot.item_id) else {
                    return;
                };

                match item.kind {
                    ItemKind::Consumable {
                        hp_restore,
                        mp_restore,
                    } => {
                        self.player.restore(hp_restore as i32, mp_restore as i32);
                        self.player.inventory.remove(item.id, 1);
                        self.set_status(format!("Used {}!", item.name));
                    }
                    ItemKind::Key => {}
                    kind => {
                        if self.player.equip(item.id, kind).is_ok() {
                            self.set_status(format!("Equipped {}!", item.name));
                        }
                    }
                }
            }
        }
    }

    fn handle_dungeon_select(&mut self, key: Key) {
        if key == Key::Back {
            self.go(Screen::Town);
            return;
        }

        let Some(digit) = key.menu_digit() else {
            return;
        };
        let Some(entry) = self.dungeon_list.get(digit as usize - 1).cloned() else {
            return;
        };

        if self.player.level < entry.min_level {
            debug!(
                "entering {} below its suggested level {}",
                entry.name, entry.min_level
            );
        }

        match DungeonRun::enter(&self.content, entry.id, &mut self.player) {
            Ok(run) => {
                let message = format!("Entering {}...", run.info.name);
                self.dungeon = Some(run);
                self.go(Screen::Dungeon);
                self.set_status(message);
            }
            Err(e) => {
                warn!("cannot enter dungeon {}: {}", entry.id, e);
                self.set_status("Dungeon unavailable!");
            }
        }
    }

    fn handle_dungeon(&mut self, key: Key) {
        let direction = match key {
            k if k.is_letter('w') => Direction::North,
            k if k.is_letter('s') => Direction::South,
            k if k.is_letter('a') => Direction::West,
            k if k.is_letter('d') => Direction::East,
            k if k.is_letter('i') => {
                self.inventory_page = 0;
                self.previous = Screen::Dungeon;
                self.go(Screen::Inventory);
                return;
            }
            Key::Back => {
                self.player.dungeon_id = 0;
                self.dungeon = None;
                self.go_with_full_refresh(Screen::Town);
                self.set_status("Left dungeon");
                return;
            }
            _ => return,
        };

        let Some(run) = self.dungeon.as_mut() else {
            warn!("dungeon screen without a dungeon run");
            self.go(Screen::Town);
            return;
        };
        let outcome = run.step(&mut self.player, direction, &self.content, &mut self.rng);
        if outcome != MoveOutcome::Blocked {
            self.statistics.steps_taken += 1;
        }

        match outcome {
            MoveOutcome::Blocked => {}
            MoveOutcome::Moved => self.mark_dirty(),
            MoveOutcome::FloorChanged { floor } => {
                self.redraw.full_refresh = true;
                self.set_status(format!("Floor {}", floor));
            }
            MoveOutcome::ExitedToTown => {
                self.dungeon = None;
                self.go_with_full_refresh(Screen::Town);
                self.set_status("Returned to town");
            }
            MoveOutcome::Treasure(loot) => {
                self.treasure = Some(loot);
                self.statistics.chests_opened += 1;
                self.audio.play_jingle(Jingle::Treasure);
                self.go(Screen::Treasure);
            }
            MoveOutcome::Trap { damage } => {
                self.audio.play_jingle(Jingle::Hit);
                self.set_status(format!("Trap! -{} HP!", damage));
                if self.player.is_dead() {
                    info!("{} died to a trap", self.player.name);
                    self.audio.play_jingle(Jingle::Defeat);
                    self.go(Screen::GameOver);
                }
            }
            MoveOutcome::Boss { enemy_id } | MoveOutcome::Encounter { enemy_id } => {
                self.start_combat(enemy_id)
            }
        }
    }

    fn push_combat_line(&mut self, line: String) {
        self.combat_log.push(line);
        if self.combat_log.len() > COMBAT_LOG_LINES {
            self.combat_log.remove(0);
        }
    }

    /// Shows the player's action, waits, then lets the enemy answer.
    fn finish_player_action(&mut self) {
        let Some(message) = self.combat.as_ref().map(|c| c.message.clone()) else {
            return;
        };
        self.push_combat_line(message.clone());
        self.set_status(message);
        self.pause(self.config.action_delay_ms);
        self.resolve_enemy_turn();
    }

    fn resolve_enemy_turn(&mut self) {
        let Some(combat) = self.combat.as_mut() else {
            return;
        };
        let turn = combat.resolve_enemy_turn(&mut self.player, &self.content, &mut self.rng);
        let message = combat.message.clone();

        match turn {
            EnemyTurn::Victory(report) => {
                self.statistics.battles_won += 1;
                self.audio.play_jingle(Jingle::Victory);
                self.go(Screen::CombatResult);
                self.set_status(format!("+{} XP +{}g", report.xp, report.gold));
            }
            EnemyTurn::Acted(action) => {
                self.push_combat_line(message.clone());
                self.set_status(message);
                if action.damage() > 0 {
                    self.audio.play_jingle(Jingle::Hit);
                }
                self.pause(self.config.enemy_delay_ms);
                if self.player.is_dead() {
                    self.audio.play_jingle(Jingle::Defeat);
                    self.go(Screen::GameOver);
                }
            }
        }
    }

    fn handle_combat(&mut self, key: Key) {
        let Some(combat) = self.combat.as_mut() else {
            warn!("combat screen without a fight");
            self.go(Screen::Dungeon);
            return;
        };
        if combat.phase != TurnPhase::Choose {
            return;
        }

        match key {
            Key::Char('1') => {
                combat.player_attack(&self.player, &self.content, &mut self.rng);
                self.finish_player_action();
            }
            Key::Char('2') => {
                combat.player_defend();
                self.finish_player_action();
            }
            Key::Char('3') => {
                self.spell_page = 0;
                self.go(Screen::CombatMagic);
            }
            Key::Char('4') => {
                self.inventory_page = 0;
                self.go(Screen::CombatItem);
            }
            k if k == Key::Char('5') || k.is_letter('f') => {
                if combat.try_flee(&self.player, &mut self.rng) {
                    info!("escaped from {}", combat.enemy.name);
                    self.set_status("Escaped!");
                    self.pause(self.config.enemy_delay_ms);
                    self.combat = None;
                    self.go_with_full_refresh(Screen::Dungeon);
                } else {
                    self.finish_player_action();
                }
            }
            _ => {}
        }
    }

    /// Spell id shown at `index` (zero-based) on the current magic page.
    pub fn spell_id_at(&self, index: usize) -> u16 {
        (self.spell_page * SPELL_PAGE_SIZE + index + 1) as u16
    }

    fn back_to_combat_menu(&mut self) {
        if let Some(combat) = self.combat.as_mut() {
            combat.phase = TurnPhase::Choose;
        }
        self.go(Screen::Combat);
    }

    fn handle_combat_magic(&mut self, key: Key) {
        match key {
            Key::Back => self.back_to_combat_menu(),
            Key::Left => {
                if Self::page_left(&mut self.spell_page) {
                    self.mark_dirty();
                }
            }
            Key::Right => {
                let next_first = self.spell_id_at(SPELL_PAGE_SIZE);
                if self.content.spell(next_first).is_some() {
                    self.spell_page += 1;
                    self.mark_dirty();
                }
            }
            Key::Char(c @ '1'..='8') => {
                let spell_id = self.spell_id_at((c as u8 - b'1') as usize);
                let Some(spell) = self.content.spell(spell_id) else {
                    return;
                };
                if spell.unlock_level > self.player.level {
                    return;
                }
                let Some(combat) = self.combat.as_mut() else {
                    return;
                };
                match combat.cast(&mut self.player, &self.content, &spell, &mut self.rng) {
                    Ok(_) => {
                        self.go(Screen::Combat);
                        self.finish_player_action();
                    }
                    Err(DescentError::InvalidAction(message)) => self.set_status(message),
                    Err(e) => warn!("cast of {} failed: {}", spell.name, e),
                }
            }
            _ => {}
        }
    }

    fn handle_combat_item(&mut self, key: Key) {
        match key {
            Key::Back => self.back_to_combat_menu(),
            Key::Left => {
                if Self::page_left(&mut self.inventory_page) {
                    self.mark_dirty();
                }
            }
            Key::Right => {
                if Self::page_right(&mut self.inventory_page, self.player.inventory.len()) {
                    self.mark_dirty();
                }
            }
            _ => {
                let Some(index) = Self::list_index(key, self.inventory_page) else {
                    return;
                };
                let Some(slot) = self.player.inventory.get(index).copied() else {
                    return;
                };
                let Some(item) = self.content.item(slot.item_id) else {
                    self.set_status("Can't use that!");
                    return;
                };
                let Some(combat) = self.combat.as_mut() else {
                    return;
                };
                match combat.use_item(&mut self.player, &item) {
                    Ok(()) => {
                        self.go(Screen::Combat);
                        self.finish_player_action();
                    }
                    Err(DescentError::InvalidAction(message)) => self.set_status(message),
                    Err(e) => warn!("using {} failed: {}", item.name, e),
                }
            }
        }
    }

    fn handle_combat_result(&mut self) {
        match check_level_up(&mut self.player, &self.content, &mut self.rng) {
            Some(gains) => {
                self.level_gains = Some(gains);
                self.audio.play_jingle(Jingle::LevelUp);
                self.go(Screen::LevelUp);
                self.set_status(format!("Level {}!", self.player.level));
            }
            None => {
                self.combat = None;
                self.go_with_full_refresh(Screen::Dungeon);
            }
        }
    }
}
