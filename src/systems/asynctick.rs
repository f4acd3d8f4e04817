//! Background tic thread and the systems that bridge it with the ECS world.
//!
//! - [`async_thread`] runs on its own OS thread, steps the shared
//!   [`AsyncCore`](crate::resources::asynctick::AsyncCore) at a fixed 60 Hz
//!   and exits on [`AsyncCmd::Shutdown`](crate::events::asynctick::AsyncCmd)
//!   or when the command channel disconnects.
//! - [`poll_async_messages`] non-blockingly drains the thread's message
//!   receiver into Bevy ECS' message queue each frame.
//! - [`update_bevy_async_messages`] advances the ECS message queue so newly
//!   written messages become readable by message subscribers.
//! - [`update_async_stats`] folds the drained messages into the per-frame
//!   cadence statistics.
//!
//! The cadence step itself never touches world state; the main thread
//! communicates with it via lock-free channels and atomics.

use crate::events::asynctick::{AsyncCmd, AsyncMessage};
use crate::resources::asynctick::{AsyncBridge, AsyncCore, AsyncStats, TIC_PERIOD};
use bevy_ecs::prelude::{MessageReader, MessageWriter, Messages, Res, ResMut};
use crossbeam_channel::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Instant;

/// Drain any pending messages from the tic thread and enqueue them into the
/// ECS [`Messages<AsyncMessage>`] mailbox.
///
/// Non-blocking; intended to run each frame on the main thread. The bridge
/// is optional so partial worlds (tests, pre-init pumps) can run the
/// schedule without a live thread.
pub fn poll_async_messages(
    bridge: Option<Res<AsyncBridge>>,
    mut writer: MessageWriter<AsyncMessage>,
) {
    let Some(bridge) = bridge else {
        return;
    };
    writer.write_batch(bridge.rx_msg.try_iter());
}

/// Advance the ECS message queue for [`AsyncMessage`].
///
/// Run this after [`poll_async_messages`] so messages written this frame
/// become visible to readers in the same frame.
pub fn update_bevy_async_messages(mut messages: ResMut<Messages<AsyncMessage>>) {
    messages.update();
}

/// Fold drained cadence messages into [`AsyncStats`].
pub fn update_async_stats(mut stats: ResMut<AsyncStats>, mut reader: MessageReader<AsyncMessage>) {
    let mut latest_tic = None;
    for msg in reader.read() {
        match msg {
            AsyncMessage::TicElapsed { tic } => latest_tic = Some(*tic),
            AsyncMessage::InputSampled { .. } => stats.input_pulses += 1,
            AsyncMessage::SoundMixed { .. } => stats.sound_pulses += 1,
        }
    }
    if let Some(tic) = latest_tic {
        stats.tics_last_frame = tic.saturating_sub(stats.last_tic);
        stats.last_tic = tic;
    }
}

/// Entry point of the dedicated tic thread.
///
/// Steps the shared core once per [`TIC_PERIOD`], sleeping to the next tic
/// boundary in between. If stepping falls behind (debugger, scheduler
/// stall) the boundary resyncs to now instead of bursting to catch up, so
/// the counter stays monotonic at the nominal rate.
///
/// This function blocks until it receives [`AsyncCmd::Shutdown`] or the
/// command channel disconnects, then exits cleanly.
pub fn async_thread(core: Arc<AsyncCore>, rx_cmd: Receiver<AsyncCmd>) {
    eprintln!(
        "[async] tic thread starting (id={:?})",
        std::thread::current().id()
    );

    let mut next = Instant::now() + TIC_PERIOD;
    'run: loop {
        loop {
            match rx_cmd.try_recv() {
                Ok(AsyncCmd::Shutdown) => {
                    eprintln!("[async] shutdown requested");
                    break 'run;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    eprintln!("[async] command channel closed");
                    break 'run;
                }
            }
        }

        core.step();

        let now = Instant::now();
        if next > now {
            std::thread::sleep(next - now);
        } else {
            next = now;
        }
        next += TIC_PERIOD;
    } // 'run

    eprintln!(
        "[async] tic thread exiting (id={:?})",
        std::thread::current().id()
    );
}
