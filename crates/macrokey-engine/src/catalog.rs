//! Macro definitions and the on-disk store.
//!
//! The store is a flat, statically shaped record list serialized as JSON
//! (`macros.json`). Field names mirror the historical on-disk format, so
//! existing stores load unchanged. The engine only reads these records;
//! editing and persistence policy belong to the surrounding application.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Result;

fn default_true() -> bool {
    true
}

fn default_confidence() -> u8 {
    85
}

fn default_delay_between() -> u64 {
    200
}

/// A hotkey-triggered sequence of action lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicMacro {
    /// Display name.
    pub name: String,
    /// Symbolic trigger token (see the `keycode` vocabulary).
    pub hotkey: String,
    /// Disabled macros are never bound.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Restart the sequence after it completes.
    #[serde(rename = "loop", default)]
    pub looped: bool,
    /// Run while the trigger key is physically held; release cancels.
    #[serde(default)]
    pub hold_mode: bool,
    /// Ordered action lines; execution never reorders them.
    #[serde(default)]
    pub actions: Vec<String>,
}

/// A one-pass skill rotation fired on a trigger edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboMacro {
    /// Display name.
    pub name: String,
    /// Symbolic trigger token.
    pub hotkey: String,
    /// Disabled macros are never bound.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Milliseconds between consecutive skills.
    #[serde(default = "default_delay_between")]
    pub delay_between: u64,
    /// Accepted configuration; no cooldown detection is implemented and
    /// this field never gates execution.
    #[serde(default = "default_true")]
    pub detect_cooldown: bool,
    /// Ordered skill lines; execution never reorders them.
    #[serde(default)]
    pub skills: Vec<String>,
}

/// A single action gated on screen detection.
///
/// Detection is not implemented: `image_path` and `confidence` are
/// configuration for a pluggable detection collaborator, and the action
/// runs unconditionally when invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMacro {
    /// Display name.
    pub name: String,
    /// Template image for the (unimplemented) detector.
    #[serde(default)]
    pub image_path: String,
    /// The single action line to execute.
    pub action: String,
    /// Detection confidence threshold, 0-100.
    #[serde(default = "default_confidence")]
    pub confidence: u8,
    /// Disabled macros are never run.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// The full set of macro definitions, as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroStore {
    /// Basic macros.
    #[serde(rename = "basicMacros", default)]
    pub basic: Vec<BasicMacro>,
    /// Image macros.
    #[serde(rename = "imageMacros", default)]
    pub image: Vec<ImageMacro>,
    /// Combo macros.
    #[serde(rename = "comboMacros", default)]
    pub combo: Vec<ComboMacro>,
}

impl MacroStore {
    /// Load a store from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        // Tolerate a UTF-8 BOM written by older tooling.
        let data = data.trim_start_matches('\u{feff}');
        Ok(serde_json::from_str(data)?)
    }

    /// Load a store, falling back to an empty one on any failure.
    ///
    /// A missing or malformed file is not fatal: the application starts
    /// with an empty catalog and logs why.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(store) => store,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "macro store unavailable; starting empty");
                Self::default()
            }
        }
    }

    /// Write the store as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// True if no macros are defined.
    pub fn is_empty(&self) -> bool {
        self.basic.is_empty() && self.image.is_empty() && self.combo.is_empty()
    }
}
