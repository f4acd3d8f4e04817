//! Ember Engine main entry point.
//!
//! The central coordinator of a game engine, built on:
//! - **bevy_ecs** for resource and system scheduling
//! - **crossbeam-channel** for the background 60 Hz tic thread bridge
//! - **configparser** for cvar persistence
//!
//! This executable drives the coordinator on its own: it initializes the
//! engine from the command line and the archived configuration, then runs
//! the frame loop until quit is requested.
//!
//! # Main Loop
//!
//! 1. Initialize logging and parse the command line
//! 2. `Engine::init` registers cvars, loads the config file, applies `+set`
//!    overrides, and spawns the tic thread
//! 3. Run `frame()` repeatedly; recoverable errors drop back to the loop,
//!    fatal errors shut down and exit nonzero
//! 4. On quit, `shutdown()` persists modified archive cvars and joins the
//!    tic thread
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- +set developer 1 +set show_fps 1
//! ```

mod engine;
mod error;
mod events;
mod resources;
mod systems;

use crate::engine::{Common, DEFAULT_CONFIG_PATH, Engine};
use clap::Parser;
use std::path::PathBuf;

/// Ember Engine
#[derive(Parser)]
#[command(version, about = "Ember Engine - the common engine coordinator")]
struct Cli {
    /// Path to the engine configuration file (default: ./engine.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the active configuration to PATH and exit.
    /// Useful for generating a fresh config file.
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,

    /// Engine startup arguments, e.g. `+set developer 1`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    log::info!("Starting the Ember Engine!");
    let mut engine = Engine::new(config_path);
    if let Err(e) = engine.init(&cli.args) {
        log::error!("initialization failed: {}", e);
        std::process::exit(1);
    }

    // Early-exit: dump the active configuration and quit (no frame loop)
    if let Some(path) = cli.write_config {
        if let Err(e) = engine.write_config_to_file(&path) {
            eprintln!("Error: {e}");
            engine.shutdown();
            std::process::exit(1);
        }
        println!("Configuration written to {}", path.display());
        engine.shutdown();
        return;
    }

    // --------------- Main loop ---------------
    while !engine.is_quitting() {
        match engine.frame() {
            Ok(()) => {}
            Err(e) if e.is_fatal() => {
                log::error!("{}", e);
                engine.shutdown();
                std::process::exit(1);
            }
            Err(e) => {
                // Recoverable: report and drop back to the frame loop.
                log::error!("{}", e);
            }
        }
    }
    engine.shutdown();
}
