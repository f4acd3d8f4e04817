//! High-level engine lifecycle state resources.
//!
//! These resources track the authoritative current state of the engine and
//! any pending transition requested by systems or the coordinator. See
//! `crate::events::enginestate::observe_enginestate_change_event` for how a
//! transition is applied.

use bevy_ecs::prelude::Resource;

/// Discrete lifecycle states the engine can be in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum EngineStates {
    #[default]
    None,
    Setup,
    Running,
    Quitting,
}

/// Representation of a requested next state.
///
/// Use [`NextEngineState::set`] to mark a transition as pending; an
/// observer will later apply it and reset the value to
/// [`NextEngineStates::Unchanged`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NextEngineStates {
    #[default]
    Unchanged,
    Pending(EngineStates),
}

/// Authoritative current engine state.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineState {
    current: EngineStates,
}

impl EngineState {
    /// Create a new state initialized to [`EngineStates::None`].
    pub fn new() -> Self {
        EngineState {
            current: EngineStates::None,
        }
    }

    /// Read-only access to the current state.
    pub fn get(&self) -> &EngineStates {
        &self.current
    }

    /// Update the current state immediately.
    ///
    /// Prefer requesting transitions via [`NextEngineState`] and the event
    /// observer so the transition is logged and applied in one place.
    pub fn set(&mut self, state: EngineStates) {
        self.current = state;
    }
}

impl Default for EngineState {
    fn default() -> Self {
        EngineState::new()
    }
}

/// Intent to change to a new engine state.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Hash)]
pub struct NextEngineState {
    next: NextEngineStates,
}

impl NextEngineState {
    /// Create a new value initialized to [`NextEngineStates::Unchanged`].
    pub fn new() -> Self {
        NextEngineState {
            next: NextEngineStates::Unchanged,
        }
    }

    /// Get the current transition request.
    pub fn get(&self) -> &NextEngineStates {
        &self.next
    }

    /// Request a transition to `next` by marking it as pending.
    pub fn set(&mut self, next: EngineStates) {
        self.next = NextEngineStates::Pending(next);
    }

    /// Reset to [`NextEngineStates::Unchanged`].
    pub fn reset(&mut self) {
        self.next = NextEngineStates::Unchanged;
    }
}

impl Default for NextEngineState {
    fn default() -> Self {
        NextEngineState::new()
    }
}
