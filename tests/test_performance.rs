//! Performance tests for content lookups, key handling and painting.
//!
//! Content is decoded from text on every lookup, so these keep an eye on the
//! cost of doing that once per key press on a slow device.

use descent::input::codes;
use descent::{ContentLibrary, GameState, RecordingSurface, Screen};
use std::time::Instant;

#[test]
fn test_content_lookup_performance() {
    let content = ContentLibrary::builtin();

    let start = Instant::now();
    for round in 0..1_000u16 {
        let id = round % 12 + 1;
        let _ = content.enemy(id);
        let _ = content.item(id);
        let _ = content.spell(id % 8 + 1);
        let _ = content.quest(id % 6 + 1);
    }
    let elapsed = start.elapsed();

    println!("4000 content lookups took: {:?}", elapsed);
    assert!(
        elapsed.as_millis() < 2_000,
        "content lookups too slow: {:?}",
        elapsed
    );
}

#[test]
fn test_dungeon_scan_performance() {
    let content = ContentLibrary::builtin();

    let start = Instant::now();
    for _ in 0..200 {
        assert!(!content.scan_dungeons().is_empty());
    }
    let elapsed = start.elapsed();

    println!("200 dungeon scans took: {:?}", elapsed);
    assert!(elapsed.as_millis() < 2_000);
}

#[test]
fn test_key_handling_performance() {
    let mut state = GameState::headless(31337);
    state.handle_key(codes::ENTER);
    state.handle_key(b'n');

    let start = Instant::now();
    for _ in 0..500 {
        // Shop, page around, back out, open and close the quest board.
        state.handle_key(b'1');
        state.handle_key(codes::RIGHT);
        state.handle_key(codes::LEFT);
        state.handle_key(codes::BACKSPACE);
        state.handle_key(b'8');
        state.handle_key(codes::BACKSPACE);
    }
    let elapsed = start.elapsed();

    assert_eq!(state.screen(), Screen::Town);
    println!("3000 key presses took: {:?}", elapsed);
    assert!(elapsed.as_millis() < 2_000, "key handling too slow: {:?}", elapsed);
}

#[test]
fn test_render_performance() {
    let mut state = GameState::headless(8);
    state.handle_key(codes::ENTER);
    state.handle_key(b'n');
    state.handle_key(b'5');
    state.handle_key(b'1');
    assert_eq!(state.screen(), Screen::Dungeon);

    let mut surface = RecordingSurface::new();
    let start = Instant::now();
    for _ in 0..200 {
        state.render(&mut surface);
    }
    let elapsed = start.elapsed();

    assert_eq!(surface.frame_count(), 200);
    println!("200 dungeon frames took: {:?}", elapsed);
    assert!(elapsed.as_millis() < 2_000, "painting too slow: {:?}", elapsed);
}
