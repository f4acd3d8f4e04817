use crate::events::enginestate::EngineStateChangedEvent;
use crate::resources::enginestate::{EngineState, EngineStates, NextEngineState, NextEngineStates};
use bevy_ecs::prelude::*;

pub fn check_pending_state(mut commands: Commands, next_state: Res<NextEngineState>) {
    // Check if there is a pending state change
    if let NextEngineStates::Pending(_new_state) = next_state.get() {
        commands.trigger(EngineStateChangedEvent {});
    }
}

pub fn state_is_running(state: Res<EngineState>) -> bool {
    matches!(state.get(), EngineStates::Running)
}
