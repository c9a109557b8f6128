//! # Mage's Descent
//!
//! A turn-based dungeon RPG engine built for small handheld devices.
//!
//! ## Architecture Overview
//!
//! The engine is a single-threaded state machine driven by key presses. Each
//! key is processed to completion before the next one is read:
//!
//! - **Content**: read-only `[TAG]` + `key=value` text blocks decoded on every lookup
//! - **Game**: player model, dungeon traversal, combat resolution and the screen state machine
//! - **Persistence**: numbered save slots in a sectioned `key=value` text format
//! - **Rendering / Audio / Input**: thin collaborator traits the host implements
//!
//! The core never renders on its own. It raises a redraw signal that the host
//! consumes through [`GameState::render`].

pub mod audio;
pub mod content;
pub mod game;
pub mod input;
pub mod persistence;
pub mod rendering;
pub mod scenes;

// Core module re-exports
pub use audio::*;
pub use content::*;
pub use game::*;
pub use input::*;
pub use persistence::*;
pub use rendering::*;
pub use scenes::*;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Core error type for the Descent engine.
#[derive(thiserror::Error, Debug)]
pub enum DescentError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Storage backend refused an operation
    #[error("Storage error: {0}")]
    Storage(String),

    /// The requested save slot holds no save file
    #[error("No save in slot {0}")]
    SaveNotFound(u8),

    /// A content lookup found no record with the requested id
    #[error("{kind} {id} not found in content")]
    ContentNotFound { kind: &'static str, id: u16 },
}

/// Result type used throughout the Descent codebase.
pub type DescentResult<T> = Result<T, DescentError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Dungeon map width in tiles
    pub const MAP_WIDTH: usize = 16;

    /// Dungeon map height in tiles
    pub const MAP_HEIGHT: usize = 12;

    /// Maximum number of distinct inventory slots
    pub const INVENTORY_CAPACITY: usize = 20;

    /// Maximum stack size of a single inventory slot
    pub const MAX_STACK: u8 = 99;

    /// Maximum number of simultaneously accepted quests
    pub const QUEST_CAPACITY: usize = 8;

    /// Maximum number of enemy ids in a dungeon's encounter pool
    pub const ENEMY_POOL_CAPACITY: usize = 8;

    /// Maximum number of items a shop lists
    pub const SHOP_CAPACITY: usize = 16;

    /// Maximum number of dungeons listed on the selection screen
    pub const DUNGEON_LIST_CAPACITY: usize = 10;

    /// Entries per page on item, shop and quest lists
    pub const LIST_PAGE_SIZE: usize = 6;

    /// Entries per page on the spell list
    pub const SPELL_PAGE_SIZE: usize = 8;

    /// Number of save slots
    pub const SAVE_SLOTS: u8 = 3;

    /// Highest reachable character level
    pub const MAX_LEVEL: u8 = 99;

    /// Delay after a player combat action so its message stays visible
    pub const DEFAULT_ACTION_DELAY_MS: u64 = 600;

    /// Delay after an enemy action or a successful escape
    pub const DEFAULT_ENEMY_DELAY_MS: u64 = 800;
}

/// Runtime configuration of the engine.
///
/// Loaded from a JSON file by the host; every field has a default so partial
/// files are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pause after player combat actions, in milliseconds
    pub action_delay_ms: u64,
    /// Pause after enemy actions and escapes, in milliseconds
    pub enemy_delay_ms: u64,
    /// Fixed RNG seed; `None` seeds from system entropy
    pub seed: Option<u64>,
    /// Directory (inside the storage root) holding save files
    pub save_dir: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            action_delay_ms: config::DEFAULT_ACTION_DELAY_MS,
            enemy_delay_ms: config::DEFAULT_ENEMY_DELAY_MS,
            seed: None,
            save_dir: "/rpg".to_string(),
        }
    }
}

impl EngineConfig {
    /// Configuration for tests: no pacing delays and a fixed seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use descent::EngineConfig;
    ///
    /// let config = EngineConfig::for_testing(7);
    /// assert_eq!(config.action_delay_ms, 0);
    /// assert_eq!(config.seed, Some(7));
    /// ```
    pub fn for_testing(seed: u64) -> Self {
        Self {
            action_delay_ms: 0,
            enemy_delay_ms: 0,
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Reads a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> DescentResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parses a configuration from JSON text.
    pub fn from_json(json: &str) -> DescentResult<Self> {
        serde_json::from_str(json).map_err(DescentError::from)
    }

    /// Serializes the configuration to pretty JSON.
    pub fn to_json(&self) -> DescentResult<String> {
        serde_json::to_string_pretty(self).map_err(DescentError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = EngineConfig::from_json(r#"{ "seed": 99 }"#).unwrap();
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.action_delay_ms, config::DEFAULT_ACTION_DELAY_MS);
        assert_eq!(config.save_dir, "/rpg");
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = EngineConfig::for_testing(3);
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(DescentError::Serde(_))
        ));
    }
}
