//! Cvar change detection system.
//!
//! Monitors [`CVarRegistry`] for changes and pushes the values that other
//! parts of the engine mirror: the simulation time scale and the cadence
//! enable flags shared with the background tic thread.

use crate::resources::asynctick::AsyncBridge;
use crate::resources::cvars::CVarRegistry;
use crate::resources::frametime::FrameTime;
use bevy_ecs::prelude::*;
use log::debug;

/// System that applies cvar changes.
///
/// Runs every frame; does work only when the registry was added or written
/// since the last run. Mirrored values:
/// - `time_scale` -> [`FrameTime::time_scale`]
/// - `async_input` / `async_sound` -> the atomic flags in the shared
///   [`AsyncCore`](crate::resources::asynctick::AsyncCore)
pub fn apply_cvar_changes(
    cvars: Option<Res<CVarRegistry>>,
    mut time: ResMut<FrameTime>,
    bridge: Option<Res<AsyncBridge>>,
) {
    let Some(cvars) = cvars else {
        return;
    };
    if !(cvars.is_changed() || cvars.is_added()) {
        return;
    }

    let time_scale = cvars.get_float("time_scale") as f32;
    if time_scale > 0.0 && (time.time_scale - time_scale).abs() > f32::EPSILON {
        debug!("time_scale changed to {}", time_scale);
        time.time_scale = time_scale;
    }

    if let Some(bridge) = bridge {
        bridge.core.set_input_enabled(cvars.get_bool("async_input"));
        bridge.core.set_sound_enabled(cvars.get_bool("async_sound"));
    }
}
