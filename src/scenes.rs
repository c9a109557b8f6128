//! # Scene Management System
//!
//! The game's screens and the host loop that drives them.
//!
//! [`Screen`] names every state of the game's state machine along with the
//! per-screen metadata the engine needs (background track, whether the mute
//! key is live). [`SceneManager`] owns a [`GameState`] and wires it to the
//! macroquad window: one key per frame in, one redraw out when the state
//! asks for it.

use crate::audio::Track;
use crate::game::{GameState, KeyOutcome};
use crate::input::InputHandler;
use crate::rendering::MacroquadDisplay;
use crate::DescentResult;
use log::info;
use macroquad::prelude::*;
use serde::{Deserialize, Serialize};

/// The screens of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Title,
    LoadSelect,
    Town,
    Shop,
    Inn,
    QuestBoard,
    Inventory,
    DungeonSelect,
    Dungeon,
    Combat,
    CombatMagic,
    CombatItem,
    CombatResult,
    LevelUp,
    Treasure,
    /// Reserved for NPC conversations; nothing enters it yet
    Dialogue,
    GameOver,
    Status,
}

impl Screen {
    /// Every screen, in declaration order.
    pub const ALL: [Screen; 18] = [
        Screen::Title,
        Screen::LoadSelect,
        Screen::Town,
        Screen::Shop,
        Screen::Inn,
        Screen::QuestBoard,
        Screen::Inventory,
        Screen::DungeonSelect,
        Screen::Dungeon,
        Screen::Combat,
        Screen::CombatMagic,
        Screen::CombatItem,
        Screen::CombatResult,
        Screen::LevelUp,
        Screen::Treasure,
        Screen::Dialogue,
        Screen::GameOver,
        Screen::Status,
    ];

    /// Background track that loops while this screen is shown.
    ///
    /// # Examples
    ///
    /// ```
    /// use descent::{Screen, Track};
    ///
    /// assert_eq!(Screen::Shop.track(), Some(Track::Town));
    /// assert_eq!(Screen::CombatItem.track(), Some(Track::Combat));
    /// assert_eq!(Screen::GameOver.track(), None);
    /// ```
    pub fn track(self) -> Option<Track> {
        match self {
            Screen::Title | Screen::LoadSelect => Some(Track::Title),
            Screen::Town
            | Screen::Shop
            | Screen::Inn
            | Screen::QuestBoard
            | Screen::DungeonSelect
            | Screen::Inventory
            | Screen::Status => Some(Track::Town),
            Screen::Dungeon | Screen::Treasure => Some(Track::Dungeon),
            Screen::Combat | Screen::CombatMagic | Screen::CombatItem => Some(Track::Combat),
            Screen::CombatResult
            | Screen::LevelUp
            | Screen::Dialogue
            | Screen::GameOver => None,
        }
    }

    /// Whether `m` toggles music here. Screens with item or spell lists
    /// keep the key for themselves.
    pub fn allows_mute(self) -> bool {
        !matches!(
            self,
            Screen::CombatMagic | Screen::CombatItem | Screen::Inventory
        )
    }

    /// Heading shown at the top of the screen.
    pub fn title(self) -> &'static str {
        match self {
            Screen::Title => "MAGE'S DESCENT",
            Screen::LoadSelect => "SELECT GAME",
            Screen::Town => "THORNWALL",
            Screen::Shop => "SHOP",
            Screen::Inn => "THE RESTING MAGE",
            Screen::QuestBoard => "QUEST BOARD",
            Screen::Inventory => "INVENTORY",
            Screen::DungeonSelect => "SELECT DUNGEON",
            Screen::Dungeon => "DUNGEON",
            Screen::Combat => "COMBAT",
            Screen::CombatMagic => "MAGIC",
            Screen::CombatItem => "ITEMS",
            Screen::CombatResult => "VICTORY!",
            Screen::LevelUp => "LEVEL UP!",
            Screen::Treasure => "TREASURE!",
            Screen::Dialogue => "...",
            Screen::GameOver => "GAME OVER",
            Screen::Status => "STATUS",
        }
    }

    /// Screens that belong to a fight in progress.
    pub fn is_combat(self) -> bool {
        matches!(
            self,
            Screen::Combat | Screen::CombatMagic | Screen::CombatItem
        )
    }
}

/// Runs the game inside a macroquad window.
pub struct SceneManager {
    game_state: GameState,
    display: MacroquadDisplay,
    input_handler: InputHandler,
}

impl SceneManager {
    pub fn new(game_state: GameState, input_handler: InputHandler) -> Self {
        Self {
            game_state,
            display: MacroquadDisplay::new(),
            input_handler,
        }
    }

    /// Runs the main loop until the player exits from the title screen.
    pub async fn run(&mut self) -> DescentResult<()> {
        loop {
            if let Some(code) = self.input_handler.poll() {
                if self.game_state.handle_key(code) == KeyOutcome::ExitRequested {
                    info!("exit requested");
                    break;
                }
            }

            if self.game_state.needs_redraw() {
                self.game_state.render(&mut self.display);
            }
            self.display.present();

            next_frame().await;
        }
        Ok(())
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_screen_listed_once() {
        let mut seen = std::collections::HashSet::new();
        for screen in Screen::ALL {
            assert!(seen.insert(screen));
        }
        assert_eq!(seen.len(), 18);
    }

    #[test]
    fn test_mute_disabled_on_list_screens() {
        let muteless: Vec<Screen> = Screen::ALL
            .into_iter()
            .filter(|screen| !screen.allows_mute())
            .collect();
        assert_eq!(
            muteless,
            vec![Screen::Inventory, Screen::CombatMagic, Screen::CombatItem]
        );
    }

    #[test]
    fn test_combat_screens_share_the_combat_track() {
        for screen in Screen::ALL {
            if screen.is_combat() {
                assert_eq!(screen.track(), Some(Track::Combat));
            }
        }
        assert_eq!(Screen::Treasure.track(), Some(Track::Dungeon));
        assert_eq!(Screen::LevelUp.track(), None);
    }
}
