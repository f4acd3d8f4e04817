//! Engine state transition event and observer.
//!
//! Systems request a change to the high-level [`EngineStates`] by updating
//! [`NextEngineState`]. Emitting an [`EngineStateChangedEvent`] then
//! triggers the observer in this module, which applies the transition to
//! [`EngineState`] and logs it. This decouples the intent to change state
//! from the mechanics of applying it and avoids borrowing conflicts.

use crate::resources::enginestate::NextEngineStates::{Pending, Unchanged};
use crate::resources::enginestate::{EngineState, NextEngineState};
use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{debug, info, warn};

/// Event used to indicate that a pending engine state transition should be
/// applied.
#[derive(Event, Debug, Clone, Copy)]
pub struct EngineStateChangedEvent {}

/// Observer that applies a pending engine state transition.
///
/// Reads the intention from [`NextEngineState`]; if pending, copies the new
/// value into [`EngineState`] and clears the request. If any required
/// resource is missing, logs a diagnostic and returns.
pub fn observe_enginestate_change_event(
    _trigger: On<EngineStateChangedEvent>,
    mut next_engine_state: Option<ResMut<NextEngineState>>,
    mut engine_state: Option<ResMut<EngineState>>,
) {
    debug!("EngineStateChangedEvent triggered");

    if let (Some(next_engine_state), Some(engine_state)) =
        (next_engine_state.as_deref_mut(), engine_state.as_deref_mut())
    {
        let next_state_value = next_engine_state.get().clone();
        match next_state_value {
            Pending(new_state) => {
                info!(
                    "Transitioning from {:?} to {:?}",
                    engine_state.get(),
                    new_state
                );
                engine_state.set(new_state);
                next_engine_state.reset();
            }
            Unchanged => {
                debug!("No state change pending.");
            }
        }
    } else {
        warn!(
            "One or more resources missing in observe_enginestate_change_event. next_state: {:?}, engine_state: {:?}",
            next_engine_state.is_some(),
            engine_state.is_some()
        );
    }
}
