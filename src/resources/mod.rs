//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems and the coordinator during execution. Each submodule
//! documents the semantics and intended usage of its resource(s).
//!
//! Overview
//! - `asynctick` – bridge and channels for the background tic thread
//! - `commandqueue` – deferred console commands awaiting execution
//! - `console` – print surface with history and output redirection
//! - `cvars` – registry of engine configuration variables
//! - `enginestate` – authoritative and pending high-level engine state
//! - `frametime` – frame timing and FPS averaging
//! - `langdict` – language specific strings keyed by `#str_` ids
//! - `tools` – editor tool activation flags
//! - `warnings` – bounded queue of deferred warnings
pub mod asynctick;
pub mod commandqueue;
pub mod console;
pub mod cvars;
pub mod enginestate;
pub mod frametime;
pub mod langdict;
pub mod tools;
pub mod warnings;
