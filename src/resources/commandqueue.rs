//! Deferred console command queue.
//!
//! Text commands reach the engine from tools and blocking front ends, and
//! are executed on the main thread once per frame (or on demand through
//! `gui_frame`). Only the small command set the coordinator itself owns is
//! parsed here; anything else is reported back as unknown.

use bevy_ecs::prelude::Resource;
use smallvec::SmallVec;

/// A parsed console command.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCmd {
    /// `set <name> <value...>` — write a cvar.
    Set { name: String, value: String },
    /// `quit` — request an orderly engine exit.
    Quit,
    /// `warnings` — print the queued warnings.
    PrintWarnings,
}

/// Pending commands awaiting execution on the main thread.
#[derive(Resource, Debug, Default)]
pub struct CommandQueue {
    queue: Vec<ConsoleCmd>,
}

impl CommandQueue {
    pub fn new() -> Self {
        CommandQueue::default()
    }

    /// Parse one line of command text and queue it.
    pub fn queue_text(&mut self, text: &str) -> Result<(), String> {
        let tokens: SmallVec<[&str; 4]> = text.split_whitespace().collect();
        let Some(&verb) = tokens.first() else {
            return Ok(());
        };
        match verb {
            "set" => {
                if tokens.len() < 3 {
                    return Err(format!("usage: set <cvar> <value>, got '{}'", text.trim()));
                }
                self.queue.push(ConsoleCmd::Set {
                    name: tokens[1].to_string(),
                    value: tokens[2..].join(" "),
                });
                Ok(())
            }
            "quit" => {
                self.queue.push(ConsoleCmd::Quit);
                Ok(())
            }
            "warnings" => {
                self.queue.push(ConsoleCmd::PrintWarnings);
                Ok(())
            }
            unknown => Err(format!("unknown command '{}'", unknown)),
        }
    }

    /// Queue an already parsed command.
    pub fn push(&mut self, cmd: ConsoleCmd) {
        self.queue.push(cmd);
    }

    /// Take every pending command, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<ConsoleCmd> {
        std::mem::take(&mut self.queue)
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_joins_value_tokens() {
        let mut queue = CommandQueue::new();
        queue.queue_text("set greeting hello brave world").unwrap();
        assert_eq!(
            queue.drain(),
            vec![ConsoleCmd::Set {
                name: "greeting".to_string(),
                value: "hello brave world".to_string(),
            }]
        );
    }

    #[test]
    fn test_unknown_and_malformed_commands_rejected() {
        let mut queue = CommandQueue::new();
        assert!(queue.queue_text("frobnicate now").is_err());
        assert!(queue.queue_text("set lonely").is_err());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_blank_text_is_ignored() {
        let mut queue = CommandQueue::new();
        queue.queue_text("   ").unwrap();
        assert!(queue.is_empty());
    }
}
