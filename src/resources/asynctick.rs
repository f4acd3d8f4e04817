//! Resources that bridge the main thread with the background tic thread.
//!
//! The tic thread drives the fixed 60 Hz cadence the foreground frame loop
//! cannot guarantee on its own: input sampling and sound mix pulses keep
//! their rate even when a frame stalls. Use [`spawn_async`] once at the end of
//! initialization to start the thread and insert the [`AsyncBridge`] and
//! `Messages<AsyncMessage>` resources; call [`shutdown_async`] during
//! teardown to stop and join it.
//!
//! The tic counter itself is a relaxed atomic: readers on any thread may
//! load it without locking, and the only writer is the cadence step.

use crate::events::asynctick::{AsyncCmd, AsyncMessage};
use crate::systems::asynctick::async_thread;
use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

/// Fixed cadence of the background tic thread.
pub const TIC_RATE_HZ: u32 = 60;

/// Wall-clock period of one tic.
pub const TIC_PERIOD: Duration = Duration::from_micros(1_000_000 / TIC_RATE_HZ as u64);

/// Sound mix granularity per tic at 44.1 kHz output.
pub const SAMPLES_PER_TIC: u32 = 44_100 / TIC_RATE_HZ;

/// State shared between the main thread and the tic thread.
pub struct AsyncCore {
    tic_number: AtomicU32,
    input_enabled: AtomicBool,
    sound_enabled: AtomicBool,
    tx_msg: Sender<AsyncMessage>,
}

impl AsyncCore {
    pub fn new(tx_msg: Sender<AsyncMessage>) -> Self {
        AsyncCore {
            tic_number: AtomicU32::new(0),
            input_enabled: AtomicBool::new(false),
            sound_enabled: AtomicBool::new(false),
            tx_msg,
        }
    }

    /// Current tic count. Monotonically increasing, readable from any
    /// thread.
    pub fn tic_number(&self) -> u32 {
        self.tic_number.load(Ordering::Relaxed)
    }

    /// Mirror of the `async_input` cvar.
    pub fn set_input_enabled(&self, enabled: bool) {
        self.input_enabled.store(enabled, Ordering::Relaxed);
    }

    /// Mirror of the `async_sound` cvar.
    pub fn set_sound_enabled(&self, enabled: bool) {
        self.sound_enabled.store(enabled, Ordering::Relaxed);
    }

    /// One tic: bump the counter and emit the cadence messages. Send errors
    /// are ignored so a disconnected receiver during shutdown cannot wedge
    /// the thread.
    pub fn step(&self) {
        let tic = self.tic_number.fetch_add(1, Ordering::Relaxed) + 1;
        let _ = self.tx_msg.send(AsyncMessage::TicElapsed { tic });
        if self.input_enabled.load(Ordering::Relaxed) {
            let _ = self.tx_msg.send(AsyncMessage::InputSampled { tic });
        }
        if self.sound_enabled.load(Ordering::Relaxed) {
            let _ = self.tx_msg.send(AsyncMessage::SoundMixed {
                tic,
                samples: SAMPLES_PER_TIC,
            });
        }
    }
}

/// Shared bridge between the ECS world and the tic thread.
///
/// This resource is created by [`spawn_async`]. The coordinator reads the
/// tic counter via [`AsyncBridge::core`] and systems poll for cadence
/// messages via [`AsyncBridge::rx_msg`].
#[derive(Resource)]
pub struct AsyncBridge {
    /// Cadence state shared with the tic thread.
    pub core: Arc<AsyncCore>,
    /// Sender for [`AsyncCmd`] messages (ECS -> tic thread).
    pub tx_cmd: Sender<AsyncCmd>,
    /// Receiver for [`AsyncMessage`] messages (tic thread -> ECS).
    pub rx_msg: Receiver<AsyncMessage>,
    /// Join handle for the background tic thread.
    pub handle: std::thread::JoinHandle<()>,
}

/// Per-frame cadence statistics, reported when `show_async_stats` is set.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct AsyncStats {
    /// Tic count observed at the end of the previous frame.
    pub last_tic: u32,
    /// Tics that elapsed during the previous frame.
    pub tics_last_frame: u32,
    /// Input samples generated since startup.
    pub input_pulses: u64,
    /// Sound mix pulses produced since startup.
    pub sound_pulses: u64,
}

/// Spawn the tic thread and register bridge resources.
///
/// Must not be called before the rest of initialization has completed: the
/// cadence starts immediately.
pub fn spawn_async(world: &mut World) {
    let (tx_cmd, rx_cmd) = unbounded::<AsyncCmd>();
    let (tx_msg, rx_msg) = unbounded::<AsyncMessage>();
    let core = Arc::new(AsyncCore::new(tx_msg));

    let thread_core = Arc::clone(&core);
    let handle = std::thread::spawn(move || async_thread(thread_core, rx_cmd));

    world.insert_resource(AsyncBridge {
        core,
        tx_cmd,
        rx_msg,
        handle,
    });
    world.insert_resource(Messages::<AsyncMessage>::default());
    world.insert_resource(AsyncStats::default());
}

/// Gracefully request shutdown of the tic thread and join it.
///
/// If the bridge resource exists, sends [`AsyncCmd::Shutdown`], waits for
/// the thread to exit, and removes the resource from the world.
pub fn shutdown_async(world: &mut World) {
    if let Some(bridge) = world.remove_resource::<AsyncBridge>() {
        let _ = bridge.tx_cmd.send(AsyncCmd::Shutdown);
        let _ = bridge.handle.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_increments_monotonically() {
        let (tx_msg, rx_msg) = unbounded::<AsyncMessage>();
        let core = AsyncCore::new(tx_msg);
        assert_eq!(core.tic_number(), 0);
        core.step();
        core.step();
        core.step();
        assert_eq!(core.tic_number(), 3);
        let tics: Vec<u32> = rx_msg
            .try_iter()
            .map(|msg| match msg {
                AsyncMessage::TicElapsed { tic } => tic,
                other => panic!("unexpected message {:?}", other),
            })
            .collect();
        assert_eq!(tics, [1, 2, 3]);
    }

    #[test]
    fn test_pulses_follow_enable_flags() {
        let (tx_msg, rx_msg) = unbounded::<AsyncMessage>();
        let core = AsyncCore::new(tx_msg);
        core.set_input_enabled(true);
        core.set_sound_enabled(true);
        core.step();
        let messages: Vec<AsyncMessage> = rx_msg.try_iter().collect();
        assert_eq!(messages.len(), 3);
        assert!(matches!(messages[1], AsyncMessage::InputSampled { tic: 1 }));
        assert!(matches!(
            messages[2],
            AsyncMessage::SoundMixed {
                tic: 1,
                samples: SAMPLES_PER_TIC
            }
        ));
    }
}
