//! Tests for painting screens and for when the game asks to be redrawn.

use descent::input::codes;
use descent::{
    paint_screen, DrawOp, GameState, Ink, RecordingSurface, RefreshMode, Screen, SCREEN_HEIGHT,
    SCREEN_WIDTH,
};

fn in_town(seed: u64, surface: &mut RecordingSurface) -> GameState {
    let mut state = GameState::headless(seed);
    state.handle_key(codes::ENTER);
    state.handle_key(b'n');
    state.render(surface);
    state
}

#[test]
fn test_first_frame_is_a_full_refresh() {
    let mut state = GameState::headless(1);
    let mut surface = RecordingSurface::new();

    assert!(state.needs_redraw());
    state.render(&mut surface);

    assert_eq!(surface.commits, vec![RefreshMode::Full]);
    assert!(!state.needs_redraw());
    assert!(surface.contains_text("MAGE'S DESCENT"));
    assert!(surface.contains_text("ENTER:Start  BKSP:Exit"));
}

#[test]
fn test_screen_change_is_a_fast_refresh() {
    let mut state = GameState::headless(2);
    let mut surface = RecordingSurface::new();
    state.render(&mut surface);

    state.handle_key(codes::ENTER);
    assert!(state.redraw_signal().screen_changed);
    assert!(!state.redraw_signal().full_refresh);
    state.render(&mut surface);

    assert_eq!(surface.commits, vec![RefreshMode::Full, RefreshMode::Fast]);
    assert!(surface.contains_text("SELECT GAME"));
    assert!(surface.contains_text("N) New Game"));
    assert!(surface.contains_text("1) Empty Slot 1"));
}

#[test]
fn test_ignored_keys_do_not_redraw() {
    let mut state = GameState::headless(3);
    let mut surface = RecordingSurface::new();
    state.render(&mut surface);

    state.handle_key(b'z');
    state.handle_key(codes::LEFT);
    state.handle_key(codes::NONE);
    assert!(!state.needs_redraw());
}

#[test]
fn test_town_frame_shows_menu_and_message() {
    let mut surface = RecordingSurface::new();
    let state = in_town(4, &mut surface);

    assert_eq!(state.screen(), Screen::Town);
    assert!(surface.contains_text("THORNWALL"));
    assert!(surface.contains_text("1) General Store"));
    assert!(surface.contains_text("8) Quests"));
    assert!(surface.contains_text("HP 30/30  MP 10/10  50g"));
    assert!(surface.contains_text("New Adventure!"));
}

#[test]
fn test_status_message_alone_marks_dirty() {
    let mut surface = RecordingSurface::new();
    let mut state = in_town(5, &mut surface);

    state.handle_key(b'4');
    state.render(&mut surface);
    state.handle_key(b'1');

    let signal = state.redraw_signal();
    assert!(signal.dirty);
    assert!(!signal.screen_changed);
    state.render(&mut surface);
    assert!(surface.contains_text("HP & MP restored!"));
    assert_eq!(surface.commits.last(), Some(&RefreshMode::Fast));
}

#[test]
fn test_leaving_the_dungeon_flashes_the_panel() {
    let mut surface = RecordingSurface::new();
    let mut state = in_town(6, &mut surface);

    state.handle_key(b'5');
    state.handle_key(b'1');
    state.render(&mut surface);
    assert!(surface.contains_text("Floor 1/2"));
    assert_eq!(surface.commits.last(), Some(&RefreshMode::Fast));

    state.handle_key(codes::BACKSPACE);
    state.render(&mut surface);
    assert_eq!(surface.commits.last(), Some(&RefreshMode::Full));
    assert!(surface.contains_text("Left dungeon"));
}

#[test]
fn test_player_marker_drawn_on_map() {
    let mut surface = RecordingSurface::new();
    let mut state = in_town(7, &mut surface);
    state.handle_key(b'5');
    state.handle_key(b'1');
    state.render(&mut surface);

    let circles = surface
        .last_frame
        .iter()
        .filter(|op| matches!(op, DrawOp::Circle { .. }))
        .count();
    assert_eq!(circles, 2);
    assert!(surface
        .last_frame
        .iter()
        .any(|op| matches!(op, DrawOp::Circle { ink: Ink::White, .. })));
}

#[test]
fn test_combat_frame_names_the_enemy() {
    let mut surface = RecordingSurface::new();
    let mut state = in_town(8, &mut surface);
    state.start_combat(1);
    state.render(&mut surface);

    assert!(surface.contains_text("Slime"));
    assert!(surface.contains_text("HP 10/10"));
    assert!(surface.contains_text("1)Attack 2)Defend 3)Magic 4)Item 5)Flee"));
}

#[test]
fn test_modifier_and_mute_indicators() {
    let mut surface = RecordingSurface::new();
    let mut state = in_town(9, &mut surface);

    state.handle_key(codes::SHIFT);
    state.handle_key(codes::FN);
    state.handle_key(b'm');
    state.render(&mut surface);
    assert!(surface.contains_text("FN+SH MUTE"));
    assert!(surface.contains_text("Music: OFF"));
}

#[test]
fn test_painter_stays_on_canvas() {
    let mut surface = RecordingSurface::new();
    let mut state = in_town(10, &mut surface);
    state.handle_key(b'5');
    state.handle_key(b'1');

    state.render(&mut surface);
    assert!(surface.ops.is_empty());
    paint_screen(&state, &mut surface);
    for op in &surface.ops {
        match op {
            DrawOp::FillRect { x, y, w, h, .. } | DrawOp::DrawRect { x, y, w, h, .. } => {
                assert!(*x >= 0 && *y >= 0, "{:?}", op);
                assert!(x + w <= SCREEN_WIDTH && y + h <= SCREEN_HEIGHT, "{:?}", op);
            }
            DrawOp::Text { x, y, .. } | DrawOp::Pixel { x, y, .. } => {
                assert!((0..SCREEN_WIDTH).contains(x), "{:?}", op);
                assert!((0..=SCREEN_HEIGHT).contains(y), "{:?}", op);
            }
            _ => {}
        }
    }
}
