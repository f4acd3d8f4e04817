//! Commands and messages for the background tic thread.

use bevy_ecs::message::Message;

/// Commands sent *to* the tic thread
#[derive(Debug)]
pub enum AsyncCmd {
    Shutdown,
}

/// Messages sent *back* from the tic thread, one batch per tic
#[derive(Message, Debug, Clone)]
pub enum AsyncMessage {
    /// The tic counter advanced.
    TicElapsed { tic: u32 },
    /// An input sample was generated this tic (`async_input` enabled).
    InputSampled { tic: u32 },
    /// A sound mix pulse was produced this tic (`async_sound` enabled).
    SoundMixed { tic: u32, samples: u32 },
}
