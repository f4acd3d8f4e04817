//! Ember Engine common library.
//!
//! This module exposes the engine coordinator, its ECS resources, systems,
//! and events for use in integration tests and as a reusable library.

pub mod engine;
pub mod error;
pub mod events;
pub mod resources;
pub mod systems;
