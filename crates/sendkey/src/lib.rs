//! Synthesizes key and mouse-button events for macro playback.
//!
//! A [`SendKey`] posts key down/up and button down/up events to the OS
//! input queue. Events are posted directly with no synthetic repeats or
//! timing; hold durations are the caller's concern.
//!
//! The OS boundary is the [`Injector`] trait. On Windows it is backed by
//! `SendInput`; elsewhere a logging no-op keeps the workspace buildable
//! and testable. Tests inject a recording mock.

use std::sync::Arc;

use keycode::{MouseButton, VirtualKey};
use tracing::trace;

#[cfg(target_os = "windows")]
mod sys;

/// Convenient result type for injection calls.
pub type Result<T> = std::result::Result<T, Error>;

/// Error variants produced by event injection.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The OS rejected the injected event.
    #[error("input injection failed")]
    Inject,
}

/// Posts individual input events to the OS.
pub trait Injector: Send + Sync {
    /// Post a key-down event.
    fn key_down(&self, key: VirtualKey) -> Result<()>;
    /// Post a key-up event.
    fn key_up(&self, key: VirtualKey) -> Result<()>;
    /// Post a button-down event.
    fn button_down(&self, button: MouseButton) -> Result<()>;
    /// Post a button-up event.
    fn button_up(&self, button: MouseButton) -> Result<()>;
}

/// Injector used on targets without a real input backend. Logs and drops.
#[cfg(not(target_os = "windows"))]
struct NullInjector;

#[cfg(not(target_os = "windows"))]
impl Injector for NullInjector {
    fn key_down(&self, key: VirtualKey) -> Result<()> {
        tracing::debug!(code = key.code(), "key_down (no input backend)");
        Ok(())
    }
    fn key_up(&self, key: VirtualKey) -> Result<()> {
        tracing::debug!(code = key.code(), "key_up (no input backend)");
        Ok(())
    }
    fn button_down(&self, button: MouseButton) -> Result<()> {
        tracing::debug!(?button, "button_down (no input backend)");
        Ok(())
    }
    fn button_up(&self, button: MouseButton) -> Result<()> {
        tracing::debug!(?button, "button_up (no input backend)");
        Ok(())
    }
}

/// Cheap-to-clone handle that forwards input events to the platform
/// injector.
#[derive(Clone)]
pub struct SendKey {
    injector: Arc<dyn Injector>,
}

impl Default for SendKey {
    fn default() -> Self {
        Self::new()
    }
}

impl SendKey {
    /// Create a sender backed by the platform injector.
    pub fn new() -> Self {
        #[cfg(target_os = "windows")]
        let injector: Arc<dyn Injector> = Arc::new(sys::WinInjector);
        #[cfg(not(target_os = "windows"))]
        let injector: Arc<dyn Injector> = Arc::new(NullInjector);
        Self { injector }
    }

    /// Create a sender backed by a custom injector (tests/tools).
    pub fn with_injector(injector: Arc<dyn Injector>) -> Self {
        Self { injector }
    }

    /// Post a key-down event.
    pub fn key_down(&self, key: VirtualKey) {
        trace!(code = key.code(), "key_down");
        let _ = self.injector.key_down(key);
    }

    /// Post a key-up event.
    pub fn key_up(&self, key: VirtualKey) {
        trace!(code = key.code(), "key_up");
        let _ = self.injector.key_up(key);
    }

    /// Post a button-down event.
    pub fn button_down(&self, button: MouseButton) {
        trace!(?button, "button_down");
        let _ = self.injector.button_down(button);
    }

    /// Post a button-up event.
    pub fn button_up(&self, button: MouseButton) {
        trace!(?button, "button_up");
        let _ = self.injector.button_up(button);
    }
}

/// One recorded injection, in dispatch order.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// A key went down.
    KeyDown(VirtualKey),
    /// A key came up.
    KeyUp(VirtualKey),
    /// A button went down.
    ButtonDown(MouseButton),
    /// A button came up.
    ButtonUp(MouseButton),
}

/// Injector that records every event for later assertions.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Default)]
pub struct RecordingInjector {
    events: std::sync::Mutex<Vec<InputEvent>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl RecordingInjector {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<InputEvent> {
        self.events.lock().expect("recorder poisoned").clone()
    }

    /// Number of events recorded so far.
    pub fn len(&self) -> usize {
        self.events.lock().expect("recorder poisoned").len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Injector for RecordingInjector {
    fn key_down(&self, key: VirtualKey) -> Result<()> {
        self.events
            .lock()
            .expect("recorder poisoned")
            .push(InputEvent::KeyDown(key));
        Ok(())
    }
    fn key_up(&self, key: VirtualKey) -> Result<()> {
        self.events
            .lock()
            .expect("recorder poisoned")
            .push(InputEvent::KeyUp(key));
        Ok(())
    }
    fn button_down(&self, button: MouseButton) -> Result<()> {
        self.events
            .lock()
            .expect("recorder poisoned")
            .push(InputEvent::ButtonDown(button));
        Ok(())
    }
    fn button_up(&self, button: MouseButton) -> Result<()> {
        self.events
            .lock()
            .expect("recorder poisoned")
            .push(InputEvent::ButtonUp(button));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: u16) -> VirtualKey {
        VirtualKey::new(code)
    }

    #[test]
    fn events_record_in_dispatch_order() {
        let rec = Arc::new(RecordingInjector::new());
        let sk = SendKey::with_injector(rec.clone());
        sk.key_down(key(0x51));
        sk.key_up(key(0x51));
        sk.button_down(MouseButton::Left);
        sk.button_up(MouseButton::Left);
        assert_eq!(
            rec.events(),
            vec![
                InputEvent::KeyDown(key(0x51)),
                InputEvent::KeyUp(key(0x51)),
                InputEvent::ButtonDown(MouseButton::Left),
                InputEvent::ButtonUp(MouseButton::Left),
            ]
        );
    }

    #[test]
    fn clones_share_the_injector() {
        let rec = Arc::new(RecordingInjector::new());
        let sk = SendKey::with_injector(rec.clone());
        let sk2 = sk.clone();
        sk.key_down(key(0x41));
        sk2.key_up(key(0x41));
        assert_eq!(rec.len(), 2);
    }
}
