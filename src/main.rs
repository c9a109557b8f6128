//! # Mage's Descent Main Entry Point
//!
//! Parses the command line, sets up logging and storage, and runs the game
//! in a macroquad window.

use clap::Parser;
use descent::{
    ContentLibrary, DescentError, DescentResult, EngineConfig, FsStorage, GameState, InputHandler,
    LogAudio, SceneManager,
};
use log::{info, warn};
use macroquad::prelude::*;
use std::path::{Path, PathBuf};

/// Command line arguments for Mage's Descent.
#[derive(Parser, Debug)]
#[command(name = "descent")]
#[command(about = "Mage's Descent: a turn-based dungeon RPG for small handheld devices")]
#[command(version)]
struct Args {
    /// Fixed random seed (default: seeded from system entropy)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Host directory standing in for the device storage root
    #[arg(long, default_value = "descent-data")]
    data_dir: PathBuf,

    /// JSON engine configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of extra `dungeon<N>.txt` files that replace the built-in dungeons
    #[arg(long)]
    dungeons: Option<PathBuf>,

    /// Log filter (error, warn, info, debug, trace or a module=level list)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Disable the pauses after combat messages
    #[arg(long)]
    no_pacing: bool,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Mage's Descent".to_string(),
        window_width: 960,
        window_height: 720,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() -> DescentResult<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .parse_filters(&args.log_level)
        .format_timestamp_millis()
        .init();

    info!("Starting Mage's Descent v{}", descent::VERSION);

    let config = load_config(&args)?;
    let content = load_content(&args)?;

    std::fs::create_dir_all(&args.data_dir)?;
    info!("storage root: {}", args.data_dir.display());
    let storage = FsStorage::new(&args.data_dir);

    let game_state = GameState::new(
        content,
        config,
        Box::new(LogAudio::new()),
        Box::new(storage),
    );

    let mut scene_manager = SceneManager::new(game_state, InputHandler::new());
    scene_manager.run().await?;

    info!("Goodbye!");
    Ok(())
}

fn load_config(args: &Args) -> DescentResult<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("loading configuration from {}", path.display());
            EngineConfig::load(path)?
        }
        None => EngineConfig::default(),
    };

    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.no_pacing {
        config.action_delay_ms = 0;
        config.enemy_delay_ms = 0;
    }
    Ok(config)
}

fn load_content(args: &Args) -> DescentResult<ContentLibrary> {
    let content = ContentLibrary::builtin();
    let Some(dir) = &args.dungeons else {
        return Ok(content);
    };

    let dungeons = read_dungeon_files(dir)?;
    if dungeons.is_empty() {
        return Err(DescentError::InvalidState(format!(
            "no dungeon<N>.txt files in {}",
            dir.display()
        )));
    }
    info!("loaded {} dungeon files from {}", dungeons.len(), dir.display());
    Ok(content.with_dungeons(dungeons))
}

/// Reads every `dungeon<N>.txt` in `dir`, keyed by `N`.
fn read_dungeon_files(dir: &Path) -> DescentResult<Vec<(u16, String)>> {
    let mut dungeons = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(slot) = name
            .strip_prefix("dungeon")
            .and_then(|rest| rest.strip_suffix(".txt"))
            .and_then(|n| n.parse::<u16>().ok())
        else {
            continue;
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => dungeons.push((slot, text)),
            Err(e) => warn!("skipping {}: {}", path.display(), e),
        }
    }
    Ok(dungeons)
}
