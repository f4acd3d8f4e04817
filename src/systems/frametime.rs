//! Frame time update and per-frame diagnostics.

use crate::resources::asynctick::AsyncStats;
use crate::resources::cvars::CVarRegistry;
use crate::resources::frametime::{FrameSpeeds, FrameTime};
use bevy_ecs::prelude::*;
use log::info;

/// Frames between periodic diagnostic lines, roughly once a second at the
/// nominal tic rate.
const REPORT_INTERVAL_FRAMES: u64 = 60;

/// Advance the [`FrameTime`] resource by one frame.
///
/// `raw_dt` is the unscaled wall-clock delta in seconds. The resource
/// applies the current `time_scale` and updates elapsed, delta, and the FPS
/// ring.
pub fn update_frame_time(world: &mut World, raw_dt: f32) {
    let mut time = world.resource_mut::<FrameTime>();
    time.advance(raw_dt);
}

/// Print the diagnostics enabled by cvars.
///
/// - `show_fps` — averaged frame rate
/// - `speeds` — wall-clock cost of the previous frame's phases
/// - `show_async_stats` — background cadence counters
pub fn report_frame_stats(
    time: Res<FrameTime>,
    speeds: Res<FrameSpeeds>,
    stats: Option<Res<AsyncStats>>,
    cvars: Option<Res<CVarRegistry>>,
) {
    let Some(cvars) = cvars else {
        return;
    };
    if time.frame_count == 0 || time.frame_count % REPORT_INTERVAL_FRAMES != 0 {
        return;
    }

    if cvars.get_bool("show_fps") {
        info!("fps: {:.1}", time.average_fps());
    }
    if cvars.get_bool("speeds") {
        info!(
            "frame: {:.2}ms update: {:.2}ms",
            speeds.frame_ms, speeds.update_ms
        );
    }
    if cvars.get_bool("show_async_stats") {
        if let Some(stats) = stats {
            info!(
                "tics: {} total, {} last frame, input pulses: {}, sound pulses: {}",
                stats.last_tic, stats.tics_last_frame, stats.input_pulses, stats.sound_pulses
            );
        }
    }
}
