//! Configuration variable registry resource.
//!
//! A cvar is a named, engine-global configuration variable with a persisted
//! value and access flags. Subsystems declare their cvars with
//! [`CVarRegistry::register`]; values can then be read and written from any
//! system, overridden from the startup command line with `+set name value`
//! constructs, and persisted to an INI configuration file.
//!
//! # Configuration File Format
//!
//! ```ini
//! [cvars]
//! async_sound = 1
//! time_scale = 1.0
//! ```
//!
//! Precedence at startup is command line over config file over declared
//! default: the config file is executed first and the pending `+set`
//! constructs are applied on top of it.

use bevy_ecs::prelude::Resource;
use configparser::ini::Ini;
use log::info;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use std::path::Path;

/// INI section the config writers place cvars under.
pub const CVAR_SECTION: &str = "cvars";

/// Access and persistence flags for a cvar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CVarFlags(u32);

impl CVarFlags {
    pub const NONE: CVarFlags = CVarFlags(0);
    /// Persisted to the user configuration file.
    pub const ARCHIVE: CVarFlags = CVarFlags(1 << 0);
    /// Only settable from the startup command line.
    pub const INIT: CVarFlags = CVarFlags(1 << 1);
    /// Never settable after registration.
    pub const ROM: CVarFlags = CVarFlags(1 << 2);

    /// True if every flag in `other` is set in `self`.
    pub fn contains(self, other: CVarFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any flag in `other` is set in `self`.
    pub fn intersects(self, other: CVarFlags) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for CVarFlags {
    type Output = CVarFlags;
    fn bitor(self, rhs: CVarFlags) -> CVarFlags {
        CVarFlags(self.0 | rhs.0)
    }
}

/// Value interpretation of a cvar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CVarKind {
    Bool,
    Int,
    Float,
    #[default]
    Text,
}

/// A single configuration variable.
///
/// The authoritative value is the string; the integer and float caches are
/// refreshed on every accepted set so readers never parse per frame.
#[derive(Debug, Clone)]
pub struct CVar {
    pub name: String,
    pub value: String,
    pub default: String,
    pub kind: CVarKind,
    pub flags: CVarFlags,
    pub description: String,
    /// Set on every accepted write, cleared only by [`CVarRegistry::clear_modified`].
    pub modified: bool,
    int_value: i64,
    float_value: f64,
    /// False for placeholders created by setting a not-yet-registered name.
    declared: bool,
}

impl CVar {
    fn new(name: &str, value: &str, kind: CVarKind, flags: CVarFlags, description: &str) -> Self {
        let mut cvar = CVar {
            name: name.to_string(),
            value: value.to_string(),
            default: value.to_string(),
            kind,
            flags,
            description: description.to_string(),
            modified: false,
            int_value: 0,
            float_value: 0.0,
            declared: true,
        };
        cvar.refresh_caches();
        cvar
    }

    fn refresh_caches(&mut self) {
        self.float_value = self.value.parse::<f64>().unwrap_or(0.0);
        self.int_value = match self.kind {
            CVarKind::Bool => {
                let truthy = self.value == "1" || self.value.eq_ignore_ascii_case("true");
                i64::from(truthy)
            }
            CVarKind::Float => self.float_value as i64,
            _ => self.value.parse::<i64>().unwrap_or(0),
        };
    }

    pub fn as_bool(&self) -> bool {
        self.int_value != 0
    }

    pub fn as_int(&self) -> i64 {
        self.int_value
    }

    pub fn as_float(&self) -> f64 {
        self.float_value
    }
}

/// Registry of all configuration variables.
///
/// Lives in the ECS world; the coordinator and systems read it via
/// `Res<CVarRegistry>` and write it via `ResMut`, so cvar writes participate
/// in bevy change detection (see
/// [`apply_cvar_changes`](crate::systems::cvars::apply_cvar_changes)).
#[derive(Resource, Debug, Default)]
pub struct CVarRegistry {
    vars: FxHashMap<String, CVar>,
    /// `+set name value` constructs captured from the command line, consumed
    /// by [`CVarRegistry::startup_variable`].
    pending_sets: Vec<(String, String)>,
    startup_phase: bool,
}

impl CVarRegistry {
    /// Create an empty registry in the startup phase.
    pub fn new() -> Self {
        CVarRegistry {
            vars: FxHashMap::default(),
            pending_sets: Vec::new(),
            startup_phase: true,
        }
    }

    /// Declare a cvar with its default value, kind, flags, and description.
    ///
    /// If a startup `set` already created a placeholder entry for the name,
    /// the placeholder's value wins but the declared default, kind, flags,
    /// and description are adopted. Re-registering a declared cvar keeps the
    /// current value.
    pub fn register(
        &mut self,
        name: &str,
        default: &str,
        kind: CVarKind,
        flags: CVarFlags,
        description: &str,
    ) {
        match self.vars.entry(name.to_string()) {
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if existing.declared {
                    return;
                }
                existing.default = default.to_string();
                // A startup set must not smuggle a value into a ROM cvar.
                if flags.contains(CVarFlags::ROM) {
                    existing.value = default.to_string();
                    existing.modified = false;
                }
                existing.kind = kind;
                existing.flags = flags;
                existing.description = description.to_string();
                existing.declared = true;
                existing.refresh_caches();
            }
            Entry::Vacant(slot) => {
                slot.insert(CVar::new(name, default, kind, flags, description));
            }
        }
    }

    /// Set a cvar from normal engine code.
    ///
    /// ROM cvars are always rejected; INIT cvars are rejected outside the
    /// startup command line. Setting an unregistered name creates a Text
    /// placeholder so config files may reference cvars declared by
    /// not-yet-loaded subsystems.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), String> {
        self.set_checked(name, value, false)
    }

    fn set_checked(&mut self, name: &str, value: &str, from_cmdline: bool) -> Result<(), String> {
        let startup_cmdline = self.startup_phase && from_cmdline;
        match self.vars.entry(name.to_string()) {
            Entry::Vacant(slot) => {
                let mut placeholder = CVar::new(name, value, CVarKind::Text, CVarFlags::NONE, "");
                placeholder.declared = false;
                placeholder.modified = true;
                slot.insert(placeholder);
                Ok(())
            }
            Entry::Occupied(mut slot) => {
                let cvar = slot.get_mut();
                if cvar.flags.contains(CVarFlags::ROM) {
                    return Err(format!("cvar '{}' is read only", name));
                }
                if cvar.flags.contains(CVarFlags::INIT) && !startup_cmdline {
                    return Err(format!(
                        "cvar '{}' can only be set on the command line",
                        name
                    ));
                }
                if cvar.value != value {
                    cvar.value = value.to_string();
                    cvar.refresh_caches();
                }
                cvar.modified = true;
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&CVar> {
        self.vars.get(name)
    }

    /// Bool value of a cvar, `false` if unknown.
    pub fn get_bool(&self, name: &str) -> bool {
        self.vars.get(name).map(CVar::as_bool).unwrap_or(false)
    }

    /// Integer value of a cvar, `0` if unknown.
    pub fn get_int(&self, name: &str) -> i64 {
        self.vars.get(name).map(CVar::as_int).unwrap_or(0)
    }

    /// Float value of a cvar, `0.0` if unknown.
    pub fn get_float(&self, name: &str) -> f64 {
        self.vars.get(name).map(CVar::as_float).unwrap_or(0.0)
    }

    /// String value of a cvar, `""` if unknown.
    pub fn get_text(&self, name: &str) -> &str {
        self.vars.get(name).map(|c| c.value.as_str()).unwrap_or("")
    }

    /// Iterate all cvars in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &CVar> {
        self.vars.values()
    }

    /// True while startup `+set` handling is still permitted.
    pub fn in_startup_phase(&self) -> bool {
        self.startup_phase
    }

    /// Close the startup phase. INIT cvars become immutable afterwards.
    pub fn end_startup(&mut self) {
        self.startup_phase = false;
        self.pending_sets.clear();
    }

    /// Number of captured `+set` constructs not yet applied.
    pub fn pending_set_count(&self) -> usize {
        self.pending_sets.len()
    }

    /// Scan the startup command line for `+set name value` constructs and
    /// store them for [`CVarRegistry::startup_variable`]. The value extends
    /// to the next `+`-prefixed argument. Returns a warning message per
    /// malformed construct.
    pub fn capture_startup_sets(&mut self, args: &[String]) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut i = 0;
        while i < args.len() {
            if args[i] != "+set" {
                i += 1;
                continue;
            }
            let Some(name) = args.get(i + 1) else {
                warnings.push("malformed '+set' with no cvar name".to_string());
                break;
            };
            let mut value_parts: Vec<&str> = Vec::new();
            let mut j = i + 2;
            while j < args.len() && !args[j].starts_with('+') {
                value_parts.push(args[j].as_str());
                j += 1;
            }
            if value_parts.is_empty() {
                warnings.push(format!("malformed '+set {}' with no value", name));
            } else {
                self.pending_sets
                    .push((name.clone(), value_parts.join(" ")));
            }
            i = j;
        }
        warnings
    }

    /// Apply captured startup `set` constructs.
    ///
    /// `None` applies every pending set; `Some(name)` applies only the set
    /// with the exact name. Applied entries are removed. Only used during
    /// startup. Returns a warning message per rejected set.
    pub fn startup_variable(&mut self, name: Option<&str>) -> Vec<String> {
        let mut warnings = Vec::new();
        let pending = std::mem::take(&mut self.pending_sets);
        for (set_name, set_value) in pending {
            let matches = name.is_none_or(|n| n == set_name);
            if !matches {
                self.pending_sets.push((set_name, set_value));
                continue;
            }
            if let Err(e) = self.set_checked(&set_name, &set_value, true) {
                warnings.push(e);
            }
        }
        warnings
    }

    /// True if any ARCHIVE cvar has been modified since its flag was cleared.
    pub fn modified_archive(&self) -> bool {
        self.vars
            .values()
            .any(|c| c.flags.contains(CVarFlags::ARCHIVE) && c.modified)
    }

    /// Clear the modified bit of a cvar.
    pub fn clear_modified(&mut self, name: &str) {
        if let Some(cvar) = self.vars.get_mut(name) {
            cvar.modified = false;
        }
    }

    /// Write all ARCHIVE cvars to an INI file under `[cvars]`, keys sorted.
    pub fn write_config_to_file(&self, path: &Path) -> Result<(), String> {
        self.write_flagged_to_file(path, CVarFlags::ARCHIVE, CVAR_SECTION)
    }

    /// Write cvars whose flags intersect `flags` to an INI file under the
    /// given section, keys sorted.
    pub fn write_flagged_to_file(
        &self,
        path: &Path,
        flags: CVarFlags,
        section: &str,
    ) -> Result<(), String> {
        let mut config = Ini::new();
        let mut selected: Vec<&CVar> = self
            .vars
            .values()
            .filter(|c| c.flags.intersects(flags))
            .collect();
        selected.sort_by(|a, b| a.name.cmp(&b.name));
        for cvar in &selected {
            config.set(section, &cvar.name, Some(cvar.value.clone()));
        }
        config
            .write(path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;
        info!("Saved {} cvars to {:?}", selected.len(), path);
        Ok(())
    }

    /// Read an INI file produced by the writers and apply each key as a set.
    ///
    /// Returns the number of applied sets. Rejected sets (ROM, INIT) are
    /// returned as warnings in the error position only when the whole file
    /// cannot be read; individual rejections are collected into `warnings`.
    pub fn exec_config_file(
        &mut self,
        path: &Path,
        warnings: &mut Vec<String>,
    ) -> Result<usize, String> {
        let mut config = Ini::new();
        let map = config
            .load(path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        let mut applied = 0;
        for values in map.values() {
            for (key, value) in values {
                let Some(value) = value else { continue };
                match self.set_checked(key, value, false) {
                    Ok(()) => applied += 1,
                    Err(e) => warnings.push(e),
                }
            }
        }
        info!("Loaded {} cvars from {:?}", applied, path);
        Ok(applied)
    }
}
