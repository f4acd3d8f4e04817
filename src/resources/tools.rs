//! Editor tool activation flags.
//!
//! External tools (level editor, script debugger, particle editor, ...)
//! register themselves with the engine so tool-aware code can branch on
//! which editors are live and whether one currently has input focus.

use bevy_ecs::prelude::Resource;
use rustc_hash::FxHashMap;

/// Identifies one built-in editor tool. Values are single bits so a set of
/// active tools packs into a [`ToolFlags`] mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ToolFlag {
    LevelEditor = 1 << 1,
    GuiEditor = 1 << 2,
    Debugger = 1 << 3,
    ScriptEditor = 1 << 4,
    LightEditor = 1 << 5,
    SoundEditor = 1 << 6,
    DeclEditor = 1 << 7,
    RagdollEditor = 1 << 8,
    ParticleEditor = 1 << 9,
    DialogEditor = 1 << 10,
    NavMeshEditor = 1 << 11,
}

/// Bitmask of active editor tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToolFlags(u32);

impl ToolFlags {
    pub const NONE: ToolFlags = ToolFlags(0);

    pub fn insert(&mut self, tool: ToolFlag) {
        self.0 |= tool as u32;
    }

    pub fn remove(&mut self, tool: ToolFlag) {
        self.0 &= !(tool as u32);
    }

    pub fn contains(self, tool: ToolFlag) -> bool {
        self.0 & tool as u32 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Which editor tools are initialized and whether one has focus.
#[derive(Resource, Default)]
pub struct ToolState {
    active: ToolFlags,
    /// True while an editor has input focus; frame-loop code that competes
    /// with tools for input checks this.
    tool_focus: bool,
    launch_args: FxHashMap<ToolFlag, FxHashMap<String, String>>,
}

impl ToolState {
    pub fn new() -> Self {
        ToolState::default()
    }

    /// Record a tool as initialized with its launch arguments and mark its
    /// bit active. Re-initializing replaces the stored arguments.
    pub fn init_tool(&mut self, tool: ToolFlag, args: &FxHashMap<String, String>) {
        self.active.insert(tool);
        self.launch_args.insert(tool, args.clone());
    }

    /// Toggle editor focus.
    pub fn activate(&mut self, active: bool) {
        self.tool_focus = active;
    }

    pub fn active_tools(&self) -> ToolFlags {
        self.active
    }

    pub fn has_focus(&self) -> bool {
        self.tool_focus
    }

    /// Launch arguments a tool was initialized with, if any.
    pub fn tool_args(&self, tool: ToolFlag) -> Option<&FxHashMap<String, String>> {
        self.launch_args.get(&tool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_insert_remove_contains() {
        let mut flags = ToolFlags::NONE;
        assert!(flags.is_empty());
        flags.insert(ToolFlag::LevelEditor);
        flags.insert(ToolFlag::Debugger);
        assert!(flags.contains(ToolFlag::LevelEditor));
        assert!(flags.contains(ToolFlag::Debugger));
        assert!(!flags.contains(ToolFlag::SoundEditor));
        flags.remove(ToolFlag::LevelEditor);
        assert!(!flags.contains(ToolFlag::LevelEditor));
        assert!(!flags.is_empty());
    }

    #[test]
    fn test_init_tool_records_args_and_focus_toggles() {
        let mut state = ToolState::new();
        let mut args = FxHashMap::default();
        args.insert("map".to_string(), "hangar".to_string());
        state.init_tool(ToolFlag::LevelEditor, &args);
        assert!(state.active_tools().contains(ToolFlag::LevelEditor));
        assert_eq!(
            state
                .tool_args(ToolFlag::LevelEditor)
                .and_then(|a| a.get("map"))
                .map(String::as_str),
            Some("hangar")
        );
        assert!(!state.has_focus());
        state.activate(true);
        assert!(state.has_focus());
    }
}
