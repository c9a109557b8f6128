//! # User Interface Elements
//!
//! The screen painter: one painting routine per [`Screen`], built from a few
//! shared elements (heading, status bar, HP bars, paged lists, the dungeon
//! map).

use crate::config::{LIST_PAGE_SIZE, MAP_HEIGHT, MAP_WIDTH, SPELL_PAGE_SIZE};
use crate::game::{chest_key, ChestLoot, GameState, Position, TileType};
use crate::input::KeyboardMode;
use crate::rendering::{FontSize, Ink, Surface, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::scenes::Screen;

/// Pixel size of one map tile.
pub const TILE_SIZE: i32 = 13;

const HEADING_Y: i32 = 28;
const RULE_Y: i32 = 36;
const BODY_Y: i32 = 60;
const ROW_HEIGHT: i32 = 22;
const STATUS_RULE_Y: i32 = 214;
const MAP_ORIGIN: (i32, i32) = (4, 44);
const SIDEBAR_X: i32 = 220;

/// Paints the current screen of `state`. The caller clears and commits.
pub fn paint_screen(state: &GameState, surface: &mut dyn Surface) {
    paint(state, state.screen(), surface);
}

fn paint(state: &GameState, screen: Screen, surface: &mut dyn Surface) {
    match screen {
        Screen::Title => paint_title(state, surface),
        Screen::LoadSelect => paint_load_select(state, surface),
        Screen::Town => paint_town(state, surface),
        Screen::Shop => paint_shop(state, surface),
        Screen::Inn => paint_inn(state, surface),
        Screen::QuestBoard => paint_quest_board(state, surface),
        Screen::Inventory => paint_inventory(state, surface),
        Screen::DungeonSelect => paint_dungeon_select(state, surface),
        Screen::Dungeon => paint_dungeon(state, surface),
        Screen::Combat => paint_combat(state, surface),
        Screen::CombatMagic => paint_combat_magic(state, surface),
        Screen::CombatItem => paint_combat_item(state, surface),
        Screen::CombatResult => paint_combat_result(state, surface),
        Screen::LevelUp => paint_level_up(state, surface),
        Screen::Treasure => paint_treasure(state, surface),
        Screen::Dialogue => paint_dialogue(state, surface),
        Screen::GameOver => paint_game_over(state, surface),
        Screen::Status => paint_status(state, surface),
    }
}

/// X coordinate that centers `text` on the canvas.
pub fn centered_x(text: &str, font: FontSize) -> i32 {
    let width = text.chars().count() as i32 * font.char_width();
    ((SCREEN_WIDTH - width) / 2).max(0)
}

fn draw_centered(surface: &mut dyn Surface, text: &str, y: i32, font: FontSize) {
    surface.draw_text(centered_x(text, font), y, text, font);
}

fn heading(surface: &mut dyn Surface, text: &str) {
    draw_centered(surface, text, HEADING_Y, FontSize::Heading);
    surface.draw_line(30, RULE_Y, SCREEN_WIDTH - 30, RULE_Y, Ink::Black);
}

/// Bottom bar: the transient message, key hints and mode indicators.
fn status_bar(state: &GameState, surface: &mut dyn Surface, hint: &str) {
    surface.draw_line(0, STATUS_RULE_Y, SCREEN_WIDTH, STATUS_RULE_Y, Ink::Black);
    surface.draw_text(4, 226, state.status(), FontSize::Small);
    surface.draw_text(4, SCREEN_HEIGHT - 3, hint, FontSize::Small);

    let mut indicators = Vec::new();
    match state.keyboard_mode() {
        KeyboardMode::Normal => {}
        KeyboardMode::Shift => indicators.push("SH"),
        KeyboardMode::Func => indicators.push("FN"),
        KeyboardMode::FnShift => indicators.push("FN+SH"),
    }
    if state.music_muted() {
        indicators.push("MUTE");
    }
    if !indicators.is_empty() {
        let text = indicators.join(" ");
        let x = SCREEN_WIDTH - 4 - text.len() as i32 * FontSize::Small.char_width();
        surface.draw_text(x, 226, &text, FontSize::Small);
    }
}

/// Outlined bar filled in proportion to `current / max`.
pub fn hp_bar(surface: &mut dyn Surface, x: i32, y: i32, w: i32, h: i32, current: u16, max: u16) {
    surface.draw_rect(x, y, w, h, Ink::Black);
    if max == 0 {
        return;
    }
    let inner = w - 4;
    let filled = (inner as i64 * current.min(max) as i64 / max as i64) as i32;
    if filled > 0 {
        surface.fill_rect(x + 2, y + 2, filled, h - 4, Ink::Black);
    }
}

fn rows(surface: &mut dyn Surface, x: i32, y: i32, lines: &[String], font: FontSize) {
    for (i, line) in lines.iter().enumerate() {
        surface.draw_text(x, y + i as i32 * ROW_HEIGHT, line, font);
    }
}

fn page_footer(surface: &mut dyn Surface, page: usize, count: usize, page_size: usize) {
    let pages = count.div_ceil(page_size).max(1);
    if pages > 1 {
        let text = format!("< Page {}/{} >", page + 1, pages);
        draw_centered(surface, &text, 206, FontSize::Small);
    }
}

fn item_name(state: &GameState, item_id: u16) -> String {
    state
        .content()
        .item(item_id)
        .map(|item| item.name)
        .unwrap_or_else(|| format!("Item {}", item_id))
}

fn vitals_line(state: &GameState) -> String {
    let player = state.player();
    format!(
        "HP {}/{}  MP {}/{}  {}g",
        player.hp, player.max_hp, player.mp, player.max_mp, player.gold
    )
}

fn paint_title(state: &GameState, surface: &mut dyn Surface) {
    draw_centered(surface, Screen::Title.title(), 70, FontSize::Banner);
    surface.draw_line(40, 80, 280, 80, Ink::Black);
    for (i, radius) in [3, 5, 3].into_iter().enumerate() {
        surface.fill_circle(130 + i as i32 * 30, 120, radius, Ink::Black);
    }
    draw_centered(surface, "A Pocket Mage RPG", 170, FontSize::Regular);
    draw_centered(surface, "ENTER:Start  BKSP:Exit", 195, FontSize::Small);
    status_bar(state, surface, "ENTER:Start <:Exit M:Mute");
}

fn paint_load_select(state: &GameState, surface: &mut dyn Surface) {
    heading(surface, Screen::LoadSelect.title());
    let mut lines = vec!["N) New Game".to_string()];
    for (i, occupied) in state.save_slots().into_iter().enumerate() {
        let slot = i + 1;
        if occupied {
            lines.push(format!("{}) Continue - Slot {}", slot, slot));
        } else {
            lines.push(format!("{}) Empty Slot {}", slot, slot));
        }
    }
    rows(surface, 40, BODY_Y + 10, &lines, FontSize::Regular);
    status_bar(state, surface, "N:New  1-3:Load  <:Back");
}

fn paint_town(state: &GameState, surface: &mut dyn Surface) {
    heading(surface, Screen::Town.title());
    let left = [
        "1) General Store",
        "2) Magic Shop",
        "3) Elite Armory",
        "4) Inn",
    ];
    let right = ["5) Dungeons", "6) Inventory", "7) Save", "8) Quests"];
    for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
        let y = BODY_Y + i as i32 * ROW_HEIGHT;
        surface.draw_text(14, y, l, FontSize::Small);
        surface.draw_text(170, y, r, FontSize::Small);
    }
    surface.draw_text(14, BODY_Y + 4 * ROW_HEIGHT, "S) Status", FontSize::Small);

    let player = state.player();
    let summary = format!("{}  Lv {}", player.name, player.level);
    draw_centered(surface, &summary, 174, FontSize::Regular);
    draw_centered(surface, &vitals_line(state), 196, FontSize::Small);
    status_bar(state, surface, "1-8:Choose S:Status <:Title");
}

fn paint_shop(state: &GameState, surface: &mut dyn Surface) {
    let shop = state.shop();
    heading(surface, &shop.name.to_uppercase());
    let gold = format!("Gold: {}", state.player().gold);
    surface.draw_text(SCREEN_WIDTH - 90, 52, &gold, FontSize::Small);

    if shop.buy_mode {
        surface.draw_text(14, 52, "BUY", FontSize::Small);
        let lines: Vec<String> = shop
            .items
            .iter()
            .skip(shop.page * LIST_PAGE_SIZE)
            .take(LIST_PAGE_SIZE)
            .enumerate()
            .map(|(i, offer)| format!("{}) {:<14} {:>4}g", i + 1, offer.name, offer.price))
            .collect();
        rows(surface, 14, BODY_Y + 14, &lines, FontSize::Small);
        page_footer(surface, shop.page, shop.items.len(), LIST_PAGE_SIZE);
        status_bar(state, surface, "1-6:Buy S:Sell <>:Page BKSP:Exit");
    } else {
        surface.draw_text(14, 52, "SELL", FontSize::Small);
        let page = state.inventory_page();
        let lines: Vec<String> = state
            .player()
            .inventory
            .iter()
            .skip(page * LIST_PAGE_SIZE)
            .take(LIST_PAGE_SIZE)
            .enumerate()
            .map(|(i, slot)| {
                let price = state
                    .content()
                    .item(slot.item_id)
                    .map(|item| item.sell_price())
                    .unwrap_or(0);
                format!(
                    "{}) {:<14} x{:<2} {:>4}g",
                    i + 1,
                    item_name(state, slot.item_id),
                    slot.quantity,
                    price
                )
            })
            .collect();
        rows(surface, 14, BODY_Y + 14, &lines, FontSize::Small);
        page_footer(surface, page, state.player().inventory.len(), LIST_PAGE_SIZE);
        status_bar(state, surface, "1-6:Sell B:Buy <>:Page BKSP:Exit");
    }
}

fn paint_inn(state: &GameState, surface: &mut dyn Surface) {
    heading(surface, Screen::Inn.title());
    let lines = vec![
        "A warm bed and a hot meal.".to_string(),
        format!("Rest: {} gold", state.inn_cost()),
        String::new(),
        "1) Rest".to_string(),
    ];
    rows(surface, 30, BODY_Y + 10, &lines, FontSize::Small);
    draw_centered(surface, &vitals_line(state), 196, FontSize::Small);
    status_bar(state, surface, "1/ENTER:Rest  BKSP:Back");
}

fn paint_quest_board(state: &GameState, surface: &mut dyn Surface) {
    heading(surface, Screen::QuestBoard.title());
    let player = state.player();
    let mut lines = Vec::new();
    for i in 0..LIST_PAGE_SIZE {
        let quest_id = state.quest_id_at(i);
        let Some(quest) = state.content().quest(quest_id) else {
            continue;
        };
        let tag = match player.quests.progress(quest_id) {
            None => String::new(),
            Some(progress) if progress >= quest.target_count => " [DONE]".to_string(),
            Some(progress) => format!(" [{}/{}]", progress, quest.target_count),
        };
        lines.push(format!("{}) {}{}", i + 1, quest.name, tag));
    }
    if lines.is_empty() {
        lines.push("No quests posted.".to_string());
    }
    rows(surface, 14, BODY_Y, &lines, FontSize::Small);

    let active = format!("Active: {}", player.quests.len());
    surface.draw_text(SCREEN_WIDTH - 80, 206, &active, FontSize::Small);
    if state.quest_page() > 0 {
        surface.draw_text(14, 206, &format!("Page {}", state.quest_page() + 1), FontSize::Small);
    }
    status_bar(state, surface, "1-6:Accept/Turn in <>:Page BKSP:Back");
}

/// Inventory rows for `page`, marking equipped items.
fn inventory_lines(state: &GameState, page: usize, consumables_only: bool) -> Vec<String> {
    let player = state.player();
    let equipment = player.equipment;
    player
        .inventory
        .iter()
        .skip(page * LIST_PAGE_SIZE)
        .take(LIST_PAGE_SIZE)
        .enumerate()
        .map(|(i, slot)| {
            let item = state.content().item(slot.item_id);
            let letter = item.as_ref().map(|item| item.kind.letter()).unwrap_or('?');
            let usable = item.as_ref().is_some_and(|item| item.is_consumable());
            let equipped = slot.item_id != 0
                && [equipment.weapon, equipment.armor, equipment.accessory]
                    .contains(&slot.item_id);
            let marker = if equipped {
                " [E]"
            } else if consumables_only && !usable {
                " -"
            } else {
                ""
            };
            format!(
                "{}) {} {} x{}{}",
                i + 1,
                letter,
                item_name(state, slot.item_id),
                slot.quantity,
                marker
            )
        })
        .collect()
}

fn paint_inventory(state: &GameState, surface: &mut dyn Surface) {
    heading(surface, Screen::Inventory.title());
    let page = state.inventory_page();
    let mut lines = inventory_lines(state, page, false);
    if lines.is_empty() {
        lines.push("(empty)".to_string());
    }
    rows(surface, 14, BODY_Y, &lines, FontSize::Small);

    // Description of the first item on the page.
    if let Some(slot) = state.player().inventory.get(page * LIST_PAGE_SIZE) {
        if let Some(item) = state.content().item(slot.item_id) {
            surface.draw_text(14, 196, &item.description, FontSize::Small);
        }
    }
    page_footer(surface, page, state.player().inventory.len(), LIST_PAGE_SIZE);
    status_bar(state, surface, "1-6:Use/Equip <>:Page BKSP:Back");
}

fn paint_dungeon_select(state: &GameState, surface: &mut dyn Surface) {
    heading(surface, Screen::DungeonSelect.title());
    let level = state.player().level;
    let lines: Vec<String> = state
        .dungeon_list()
        .iter()
        .take(9)
        .enumerate()
        .map(|(i, entry)| {
            let warning = if level < entry.min_level { " !" } else { "" };
            format!("{}) {} (Lv {}+){}", i + 1, entry.name, entry.min_level, warning)
        })
        .collect();
    rows(surface, 20, BODY_Y, &lines, FontSize::Small);
    status_bar(state, surface, "1-9:Enter  BKSP:Back");
}

fn glyph(surface: &mut dyn Surface, x: i32, y: i32, text: &str) {
    surface.draw_text(x + 3, y + TILE_SIZE - 3, text, FontSize::Small);
}

fn paint_tile(surface: &mut dyn Surface, x: i32, y: i32, tile: TileType, opened: bool) {
    let t = TILE_SIZE;
    match tile {
        TileType::Wall => surface.fill_rect(x, y, t, t, Ink::Black),
        // Traps look like floor until stepped on.
        TileType::Floor | TileType::Trap => surface.draw_pixel(x + t / 2, y + t / 2, Ink::Black),
        TileType::Door => surface.draw_rect(x + 2, y + 1, t - 4, t - 2, Ink::Black),
        TileType::StairsDown => glyph(surface, x, y, ">"),
        TileType::StairsUp => glyph(surface, x, y, "<"),
        TileType::Chest if opened => surface.draw_rect(x + 2, y + 4, t - 4, t - 6, Ink::Black),
        TileType::Chest => surface.fill_rect(x + 2, y + 4, t - 4, t - 6, Ink::Black),
        TileType::Npc => surface.fill_circle(x + t / 2, y + t / 2, 3, Ink::Black),
        TileType::Boss => glyph(surface, x, y, "B"),
        TileType::Entrance => glyph(surface, x, y, "E"),
    }
}

/// Draws the 16x12 floor map with the player marker.
pub fn paint_map(state: &GameState, surface: &mut dyn Surface) {
    let Some(run) = state.dungeon() else {
        return;
    };
    let player = state.player();
    let (ox, oy) = MAP_ORIGIN;

    surface.draw_rect(
        ox - 1,
        oy - 1,
        MAP_WIDTH as i32 * TILE_SIZE + 2,
        MAP_HEIGHT as i32 * TILE_SIZE + 2,
        Ink::Black,
    );
    for (y, row) in run.map.rows().enumerate() {
        let opened = player
            .world_flags
            .is_set(chest_key(player.floor, y as u8));
        for (x, tile) in row.iter().enumerate() {
            let px = ox + x as i32 * TILE_SIZE;
            let py = oy + y as i32 * TILE_SIZE;
            if Position::new(x as u8, y as u8) == player.position {
                surface.fill_circle(px + TILE_SIZE / 2, py + TILE_SIZE / 2, 5, Ink::Black);
                surface.fill_circle(px + TILE_SIZE / 2, py + TILE_SIZE / 2, 2, Ink::White);
            } else {
                paint_tile(surface, px, py, *tile, opened);
            }
        }
    }
}

fn paint_dungeon(state: &GameState, surface: &mut dyn Surface) {
    let player = state.player();
    let name = state
        .dungeon()
        .map(|run| run.info.name.clone())
        .unwrap_or_else(|| Screen::Dungeon.title().to_string());
    surface.draw_text(4, 30, &name, FontSize::Regular);
    paint_map(state, surface);

    let x = SIDEBAR_X;
    let floors = state.dungeon().map(|run| run.info.floors).unwrap_or(0);
    surface.draw_text(x, 56, &format!("Floor {}/{}", player.floor, floors), FontSize::Small);
    surface.draw_text(x, 76, &format!("Lv {}", player.level), FontSize::Small);
    surface.draw_text(x, 96, &format!("HP {}/{}", player.hp, player.max_hp), FontSize::Small);
    hp_bar(surface, x, 100, 90, 8, player.hp, player.max_hp);
    surface.draw_text(x, 124, &format!("MP {}/{}", player.mp, player.max_mp), FontSize::Small);
    hp_bar(surface, x, 128, 90, 8, player.mp, player.max_mp);
    surface.draw_text(x, 152, &format!("Gold {}", player.gold), FontSize::Small);

    status_bar(state, surface, "WASD:Move I:Items BKSP:Leave");
}

fn paint_combat(state: &GameState, surface: &mut dyn Surface) {
    let Some(combat) = state.combat() else {
        heading(surface, Screen::Combat.title());
        status_bar(state, surface, "");
        return;
    };
    let enemy = &combat.enemy;
    let player = state.player();

    draw_centered(surface, &enemy.name, 30, FontSize::Heading);
    hp_bar(surface, 40, 40, 240, 12, enemy.hp, enemy.max_hp);
    let mut enemy_line = format!("HP {}/{}", enemy.hp, enemy.max_hp);
    if combat.enemy_defending {
        enemy_line.push_str("  [guarding]");
    }
    draw_centered(surface, &enemy_line, 68, FontSize::Small);

    rows(surface, 14, 92, state.combat_log(), FontSize::Small);

    surface.draw_line(0, 150, SCREEN_WIDTH, 150, Ink::Black);
    let defending = if combat.player_defending { " DEF" } else { "" };
    surface.draw_text(
        14,
        166,
        &format!("HP {}/{}{}", player.hp, player.max_hp, defending),
        FontSize::Small,
    );
    hp_bar(surface, 110, 158, 80, 8, player.hp, player.max_hp);
    surface.draw_text(200, 166, &format!("MP {}/{}", player.mp, player.max_mp), FontSize::Small);
    surface.draw_text(
        14,
        194,
        "1)Attack 2)Defend 3)Magic 4)Item 5)Flee",
        FontSize::Small,
    );
    status_bar(state, surface, "1-5:Act F:Flee");
}

fn paint_combat_magic(state: &GameState, surface: &mut dyn Surface) {
    heading(surface, Screen::CombatMagic.title());
    let player = state.player();
    let mut lines = Vec::new();
    for i in 0..SPELL_PAGE_SIZE {
        let Some(spell) = state.content().spell(state.spell_id_at(i)) else {
            continue;
        };
        let line = if spell.unlock_level > player.level {
            format!("{}) ---- (Lv {})", i + 1, spell.unlock_level)
        } else {
            format!(
                "{}) {:<12} {} {:>2}MP",
                i + 1,
                spell.name,
                spell.kind.label(),
                spell.mp_cost
            )
        };
        lines.push(line);
    }
    for (i, line) in lines.iter().enumerate() {
        surface.draw_text(14, 54 + i as i32 * 18, line, FontSize::Small);
    }
    surface.draw_text(
        SCREEN_WIDTH - 90,
        206,
        &format!("MP {}/{}", player.mp, player.max_mp),
        FontSize::Small,
    );
    status_bar(state, surface, "1-8:Cast <>:Page BKSP:Back");
}

fn paint_combat_item(state: &GameState, surface: &mut dyn Surface) {
    heading(surface, Screen::CombatItem.title());
    let page = state.inventory_page();
    let mut lines = inventory_lines(state, page, true);
    if lines.is_empty() {
        lines.push("(empty)".to_string());
    }
    rows(surface, 14, BODY_Y, &lines, FontSize::Small);
    page_footer(surface, page, state.player().inventory.len(), LIST_PAGE_SIZE);
    status_bar(state, surface, "1-6:Use <>:Page BKSP:Back");
}

fn paint_combat_result(state: &GameState, surface: &mut dyn Surface) {
    heading(surface, Screen::CombatResult.title());
    let mut lines = Vec::new();
    if let Some(combat) = state.combat() {
        lines.push(format!("Defeated {}!", combat.enemy.name));
        if let Some(report) = combat.victory {
            lines.push(format!("+{} XP", report.xp));
            lines.push(format!("+{} Gold", report.gold));
            if let Some(item_id) = report.drop {
                lines.push(format!("Found {}!", item_name(state, item_id)));
            }
        }
    }
    let player = state.player();
    lines.push(format!("XP {}/{}", player.xp, player.xp_next));
    for (i, line) in lines.iter().enumerate() {
        draw_centered(surface, line, BODY_Y + 10 + i as i32 * ROW_HEIGHT, FontSize::Regular);
    }
    status_bar(state, surface, "Any key: Continue");
}

fn paint_level_up(state: &GameState, surface: &mut dyn Surface) {
    heading(surface, Screen::LevelUp.title());
    let player = state.player();
    draw_centered(surface, &format!("Level {}", player.level), BODY_Y + 4, FontSize::Heading);
    if let Some(gains) = state.level_gains() {
        let lines = vec![
            format!("HP +{}   MP +{}", gains.hp, gains.mp),
            format!("ATK +{}  DEF +{}", gains.atk, gains.def),
            format!("MAG +{}  SPD +{}", gains.mag, gains.spd),
        ];
        for (i, line) in lines.iter().enumerate() {
            draw_centered(surface, line, BODY_Y + 40 + i as i32 * ROW_HEIGHT, FontSize::Regular);
        }
    }
    status_bar(state, surface, "Any key: Continue");
}

fn paint_treasure(state: &GameState, surface: &mut dyn Surface) {
    heading(surface, Screen::Treasure.title());
    surface.draw_rect(130, 60, 60, 40, Ink::Black);
    surface.draw_line(130, 74, 190, 74, Ink::Black);
    surface.fill_rect(156, 70, 8, 10, Ink::Black);

    let text = match state.treasure() {
        Some(ChestLoot::Items { item_id, quantity }) => {
            format!("Found {} x{}!", item_name(state, item_id), quantity)
        }
        Some(ChestLoot::Gold(amount)) => format!("Found {} gold!", amount),
        None => "The chest is empty.".to_string(),
    };
    draw_centered(surface, &text, 140, FontSize::Regular);
    status_bar(state, surface, "Any key: Continue");
}

fn paint_dialogue(state: &GameState, surface: &mut dyn Surface) {
    heading(surface, Screen::Dialogue.title());
    status_bar(state, surface, "ENTER/BKSP:Back");
}

fn paint_game_over(state: &GameState, surface: &mut dyn Surface) {
    draw_centered(surface, Screen::GameOver.title(), 80, FontSize::Banner);
    let cause = match state.combat() {
        Some(combat) => format!("Slain by {}.", combat.enemy.name),
        None => "You have fallen.".to_string(),
    };
    draw_centered(surface, &cause, 130, FontSize::Regular);
    let player = state.player();
    let summary = format!("Level {}  Gold {}", player.level, player.gold);
    draw_centered(surface, &summary, 160, FontSize::Small);
    status_bar(state, surface, "Any key: Title");
}

fn paint_status(state: &GameState, surface: &mut dyn Surface) {
    heading(surface, Screen::Status.title());
    let player = state.player();
    let content = state.content();
    let left = vec![
        format!("{}  Lv {}", player.name, player.level),
        format!("HP {}/{}", player.hp, player.max_hp),
        format!("MP {}/{}", player.mp, player.max_mp),
        format!("XP {}/{}", player.xp, player.xp_next),
        format!("Gold {}", player.gold),
    ];
    let right = vec![
        format!("ATK {} +{}", player.atk, player.weapon_bonus(content)),
        format!("DEF {} +{}", player.def, player.armor_bonus(content)),
        format!("MAG {} +{}", player.mag, player.magic_bonus(content)),
        format!("SPD {}", player.spd),
        format!("Quests {}", player.quests.len()),
    ];
    for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
        let y = 54 + i as i32 * 18;
        surface.draw_text(14, y, l, FontSize::Small);
        surface.draw_text(170, y, r, FontSize::Small);
    }

    let gear_name = |item_id: u16| {
        content
            .item(item_id)
            .map(|item| item.name)
            .unwrap_or_else(|| "-".to_string())
    };
    let gear = [
        format!("W: {}", gear_name(player.equipment.weapon)),
        format!("A: {}", gear_name(player.equipment.armor)),
        format!("R: {}", gear_name(player.equipment.accessory)),
    ];
    for (i, line) in gear.iter().enumerate() {
        surface.draw_text(14, 150 + i as i32 * 14, line, FontSize::Small);
    }

    let stats = state.statistics();
    surface.draw_text(170, 150, &format!("Steps {}", stats.steps_taken), FontSize::Small);
    surface.draw_text(170, 164, &format!("Wins {}", stats.battles_won), FontSize::Small);
    surface.draw_text(170, 178, &format!("Chests {}", stats.chests_opened), FontSize::Small);
    status_bar(state, surface, "ENTER/BKSP:Back");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::codes;
    use crate::rendering::{DrawOp, RecordingSurface};

    fn painted(state: &GameState) -> RecordingSurface {
        let mut surface = RecordingSurface::new();
        paint_screen(state, &mut surface);
        surface
    }

    #[test]
    fn test_centered_text() {
        assert_eq!(centered_x("", FontSize::Small), SCREEN_WIDTH / 2);
        let x = centered_x("ABCD", FontSize::Regular);
        assert_eq!(x * 2 + 4 * FontSize::Regular.char_width(), SCREEN_WIDTH);
    }

    #[test]
    fn test_hp_bar_fill() {
        let mut surface = RecordingSurface::new();
        hp_bar(&mut surface, 0, 0, 104, 10, 50, 100);
        assert_eq!(
            surface.ops[1],
            DrawOp::FillRect {
                x: 2,
                y: 2,
                w: 50,
                h: 6,
                ink: Ink::Black
            }
        );

        let mut empty = RecordingSurface::new();
        hp_bar(&mut empty, 0, 0, 104, 10, 0, 100);
        assert_eq!(empty.ops.len(), 1);
    }

    #[test]
    fn test_every_screen_paints_something() {
        let mut state = GameState::headless(1);
        state.handle_key(codes::ENTER);
        state.handle_key(b'n');
        for screen in Screen::ALL {
            let mut surface = RecordingSurface::new();
            paint(&state, screen, &mut surface);
            assert!(!surface.ops.is_empty(), "{:?}", screen);
        }
    }

    #[test]
    fn test_town_lists_menu() {
        let mut state = GameState::headless(2);
        state.handle_key(codes::ENTER);
        state.handle_key(b'n');
        let surface = painted(&state);
        assert!(surface.contains_text("THORNWALL"));
        assert!(surface.contains_text("5) Dungeons"));
        assert!(surface.contains_text("HP 30/30"));
    }

    #[test]
    fn test_map_marks_player() {
        let mut state = GameState::headless(3);
        state.handle_key(codes::ENTER);
        state.handle_key(b'n');
        state.handle_key(b'5');
        state.handle_key(b'1');
        assert_eq!(state.screen(), Screen::Dungeon);

        let surface = painted(&state);
        let pos = state.player().position;
        let cx = MAP_ORIGIN.0 + pos.x as i32 * TILE_SIZE + TILE_SIZE / 2;
        let cy = MAP_ORIGIN.1 + pos.y as i32 * TILE_SIZE + TILE_SIZE / 2;
        assert!(surface.ops.contains(&DrawOp::Circle {
            cx,
            cy,
            radius: 5,
            ink: Ink::Black
        }));
        assert!(surface.contains_text("Floor 1/"));
    }

    #[test]
    fn test_status_bar_shows_mute() {
        let mut state = GameState::headless(4);
        state.handle_key(b'm');
        let surface = painted(&state);
        assert!(surface.contains_text("MUTE"));
        assert!(surface.contains_text("Music: OFF"));
    }
}
