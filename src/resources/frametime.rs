//! Frame timing resource.
//!
//! Tracks elapsed simulation time, the scaled per-frame delta, and a small
//! ring of raw deltas used to average the displayed frame rate. The
//! coordinator advances it once per foreground frame with the measured
//! wall-clock delta.

use arrayvec::ArrayVec;
use bevy_ecs::prelude::Resource;

/// Raw deltas retained for FPS averaging.
pub const FPS_SAMPLES: usize = 64;

#[derive(Resource, Clone)]
pub struct FrameTime {
    /// Scaled seconds since the engine started running frames.
    pub elapsed: f32,
    /// Scaled delta of the current frame in seconds.
    pub delta: f32,
    /// Multiplier applied to raw deltas, mirrored from the `time_scale` cvar.
    pub time_scale: f32,
    /// Foreground frames completed.
    pub frame_count: u64,
    samples: ArrayVec<f32, FPS_SAMPLES>,
}

impl Default for FrameTime {
    fn default() -> Self {
        FrameTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
            samples: ArrayVec::new(),
        }
    }
}

impl FrameTime {
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Advance by one frame. `raw_dt` is the unscaled wall-clock delta in
    /// seconds; scaling applies to `elapsed`/`delta` but the FPS ring keeps
    /// the raw value.
    pub fn advance(&mut self, raw_dt: f32) {
        let scaled = raw_dt * self.time_scale;
        self.elapsed += scaled;
        self.delta = scaled;
        self.frame_count += 1;
        if self.samples.is_full() {
            self.samples.remove(0);
        }
        self.samples.push(raw_dt);
    }

    /// Average frames per second over the retained samples, `0.0` until the
    /// first frame.
    pub fn average_fps(&self) -> f32 {
        let total: f32 = self.samples.iter().sum();
        if total <= f32::EPSILON {
            return 0.0;
        }
        self.samples.len() as f32 / total
    }
}

/// Wall-clock cost of the previous frame's phases in milliseconds, written
/// by the coordinator and reported when the `speeds` cvar is set.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct FrameSpeeds {
    /// Whole frame.
    pub frame_ms: f32,
    /// Update schedule only.
    pub update_ms: f32,
}
