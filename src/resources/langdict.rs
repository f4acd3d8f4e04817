//! Language dictionary resource.
//!
//! Localized strings are addressed by keys carrying the [`STR_PREFIX`]
//! marker (`"#str_00001"`); anything else is treated as a literal and
//! returned unchanged. The dictionary loads from a flat JSON object file:
//!
//! ```json
//! {
//!   "#str_00001": "Loading...",
//!   "#str_00002": "Press any key"
//! }
//! ```

use bevy_ecs::prelude::Resource;
use log::info;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::Path;

/// Marker prefix of translatable string keys.
pub const STR_PREFIX: &str = "#str_";

/// Dictionary with language specific strings.
#[derive(Resource, Debug, Default, Clone, Deserialize)]
#[serde(transparent)]
pub struct LangDict {
    table: FxHashMap<String, String>,
}

impl LangDict {
    /// Load a dictionary from a JSON object file.
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read language file {:?}: {}", path, e))?;
        let dict: LangDict = serde_json::from_str(&text)
            .map_err(|e| format!("Failed to parse language file {:?}: {}", path, e))?;
        info!("Loaded {} language strings from {:?}", dict.table.len(), path);
        Ok(dict)
    }

    /// Resolve a string key.
    ///
    /// Keys without the [`STR_PREFIX`] marker are literals and come back
    /// unchanged; marked keys missing from the table also resolve to
    /// themselves so untranslated text stays visible instead of vanishing.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        if !key.starts_with(STR_PREFIX) {
            return key;
        }
        match self.table.get(key) {
            Some(translated) => translated.as_str(),
            None => key,
        }
    }

    /// True if `key` is marked translatable but has no entry.
    pub fn is_missing(&self, key: &str) -> bool {
        key.starts_with(STR_PREFIX) && !self.table.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.table.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
