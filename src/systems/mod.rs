//! Engine systems.
//!
//! This module groups the ECS systems that advance the coordinator each
//! frame plus the background tic thread entry point.
//!
//! Submodules overview
//! - [`asynctick`] – bridge with the tic thread (poll/update message queues)
//! - [`commands`] – drain and execute deferred console commands
//! - [`cvars`] – apply cvar changes to the values other modules mirror
//! - [`enginestate`] – check for pending state transitions and trigger events
//! - [`frametime`] – advance frame timing and print per-frame diagnostics

pub mod asynctick;
pub mod commands;
pub mod cvars;
pub mod enginestate;
pub mod frametime;
