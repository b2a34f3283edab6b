//! Shared helpers for exercising the engine without an OS backend.
//!
//! Public so integration tests and downstream crates can drive the
//! monitor deterministically.

use std::{collections::HashSet, sync::Arc};

use keycode::VirtualKey;
use parking_lot::Mutex;

use crate::monitor::KeyStateSource;

/// A key-state source whose pressed set is set by the test.
#[derive(Default)]
pub struct ScriptedKeyState {
    pressed: Mutex<HashSet<u16>>,
}

impl ScriptedKeyState {
    /// Create a source with nothing pressed.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Mark a key as physically down.
    pub fn press(&self, key: VirtualKey) {
        self.pressed.lock().insert(key.code());
    }

    /// Mark a key as released.
    pub fn release(&self, key: VirtualKey) {
        self.pressed.lock().remove(&key.code());
    }

    /// Release everything.
    pub fn release_all(&self) {
        self.pressed.lock().clear();
    }
}

impl KeyStateSource for ScriptedKeyState {
    fn is_pressed(&self, key: VirtualKey) -> bool {
        self.pressed.lock().contains(&key.code())
    }
}
