//! Deferred warning queue resource.
//!
//! Warnings print immediately but are also gathered here so the full batch
//! can be reported once a long operation (startup, level load) finishes.
//! The queue is bounded and deduplicated: a flood of identical warnings
//! costs one slot, and past [`MAX_QUEUED_WARNINGS`] new warnings still print
//! but are no longer retained.

use crate::resources::console::Console;
use arrayvec::ArrayVec;
use bevy_ecs::prelude::Resource;

/// Upper bound on retained warnings.
pub const MAX_QUEUED_WARNINGS: usize = 256;

/// Bounded, deduplicated queue of warning messages.
#[derive(Resource, Default)]
pub struct WarningQueue {
    warnings: ArrayVec<String, MAX_QUEUED_WARNINGS>,
    caption: String,
}

impl WarningQueue {
    pub fn new() -> Self {
        WarningQueue::default()
    }

    /// Queue a warning unless it is a duplicate or the queue is full.
    /// Returns whether the message was retained.
    pub fn push_unique(&mut self, message: &str) -> bool {
        if self.warnings.iter().any(|w| w == message) {
            return false;
        }
        self.warnings.try_push(message.to_string()).is_ok()
    }

    /// Drop all queued warnings and record the phase they will be gathered
    /// during from now on.
    pub fn clear(&mut self, caption: &str) {
        self.warnings.clear();
        self.caption = caption.to_string();
    }

    /// Phase caption recorded by the last [`WarningQueue::clear`].
    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.warnings.iter()
    }
}

/// Flush the queued warnings to the console with a header and count.
pub fn print_warnings(console: &mut Console, queue: &WarningQueue) {
    if queue.is_empty() {
        return;
    }
    console.write("------------- Warnings -------------");
    if queue.caption().is_empty() {
        console.write("during engine run...");
    } else {
        let caption = format!("during {}...", queue.caption());
        console.write(&caption);
    }
    for warning in queue.iter() {
        let line = format!("WARNING: {}", warning);
        console.write(&line);
    }
    let count = format!("{} warnings", queue.len());
    console.write(&count);
}
