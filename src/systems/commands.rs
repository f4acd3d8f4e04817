//! Deferred command execution system.
//!
//! Drains the [`CommandQueue`] on the main thread. Execution is gated on
//! the `allow_console` cvar so locked-down builds can refuse externally
//! injected commands wholesale.

use crate::resources::commandqueue::{CommandQueue, ConsoleCmd};
use crate::resources::console::Console;
use crate::resources::cvars::CVarRegistry;
use crate::resources::enginestate::{EngineStates, NextEngineState};
use crate::resources::warnings::{WarningQueue, print_warnings};
use bevy_ecs::prelude::*;
use log::warn;

/// Execute every pending console command.
pub fn execute_pending_commands(
    mut queue: ResMut<CommandQueue>,
    mut cvars: ResMut<CVarRegistry>,
    mut console: ResMut<Console>,
    mut warnings: ResMut<WarningQueue>,
    mut next_state: ResMut<NextEngineState>,
) {
    if queue.is_empty() {
        return;
    }
    if !cvars.get_bool("allow_console") {
        warn!("discarding {} console commands: console disabled", queue.len());
        queue.clear();
        return;
    }
    for cmd in queue.drain() {
        match cmd {
            ConsoleCmd::Set { name, value } => {
                if let Err(e) = cvars.set(&name, &value) {
                    let line = format!("WARNING: {}", e);
                    console.write(&line);
                    warnings.push_unique(&e);
                }
            }
            ConsoleCmd::Quit => {
                next_state.set(EngineStates::Quitting);
            }
            ConsoleCmd::PrintWarnings => {
                print_warnings(&mut console, &warnings);
            }
        }
    }
}
