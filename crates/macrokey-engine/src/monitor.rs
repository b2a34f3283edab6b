//! Polls global key state and raises press/release edges for bindings.
//!
//! The monitor owns all per-binding state: the resolved key code, the
//! trigger mode, and the last observed pressed state used for edge
//! detection. Registration and the poll task share that table through a
//! mutex, so register/unregister calls serialize against polling.
//!
//! Polling reads real-time hardware state independent of window focus,
//! which is what lets macros fire while a game has the foreground. The
//! tick is fixed; there is no OS-level hook.

use std::{sync::Arc, time::Duration};

use keycode::VirtualKey;
use parking_lot::Mutex;
use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{Error, Result};

/// Poll tick for key-state sampling.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How a binding turns key state into executions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerMode {
    /// Fire once per not-pressed → pressed transition.
    EdgePress,
    /// Track the physical key continuously: start on press, cancel on
    /// release.
    Hold,
}

/// A state transition observed for a binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEdge {
    /// The key went from up to down.
    Pressed,
    /// The key went from down to up.
    Released,
}

/// One edge event raised by the poll loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trigger {
    /// The binding that transitioned.
    pub id: u32,
    /// The binding's trigger mode, echoed for the consumer.
    pub mode: TriggerMode,
    /// Which transition occurred.
    pub edge: KeyEdge,
}

/// Reads the current pressed state of a key or button.
///
/// The real source queries the OS; tests script it.
pub trait KeyStateSource: Send + Sync {
    /// True if the key is physically down right now.
    fn is_pressed(&self, key: VirtualKey) -> bool;
}

/// Live key state via GetAsyncKeyState.
#[cfg(target_os = "windows")]
pub struct AsyncKeyState;

#[cfg(target_os = "windows")]
impl KeyStateSource for AsyncKeyState {
    fn is_pressed(&self, key: VirtualKey) -> bool {
        // SAFETY: GetAsyncKeyState has no preconditions.
        let state =
            unsafe { windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState(key.code() as i32) };
        (state as u16 & 0x8000) != 0
    }
}

/// Key-state source for targets without a polling backend: nothing is
/// ever pressed.
#[cfg(not(target_os = "windows"))]
pub struct AsyncKeyState;

#[cfg(not(target_os = "windows"))]
impl KeyStateSource for AsyncKeyState {
    fn is_pressed(&self, _key: VirtualKey) -> bool {
        false
    }
}

/// Per-binding bookkeeping, kept in registration order.
struct Binding {
    id: u32,
    key: VirtualKey,
    mode: TriggerMode,
    /// Last observed pressed state; the edge debounce.
    was_pressed: bool,
}

/// The running poll task.
struct PollTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Registers bindings and polls their pressed state on a fixed tick.
pub struct HotkeyMonitor {
    source: Arc<dyn KeyStateSource>,
    bindings: Arc<Mutex<Vec<Binding>>>,
    task: Mutex<Option<PollTask>>,
}

impl HotkeyMonitor {
    /// Create a monitor reading key state from `source`.
    pub fn new(source: Arc<dyn KeyStateSource>) -> Self {
        Self {
            source,
            bindings: Arc::new(Mutex::new(Vec::new())),
            task: Mutex::new(None),
        }
    }

    /// Register a binding for a symbolic token.
    ///
    /// Fails when the token does not resolve or the id is already
    /// registered; the existing binding is untouched in either case.
    pub fn register(&self, id: u32, token: &str, mode: TriggerMode) -> Result<()> {
        let key = keycode::resolve(token).ok_or_else(|| Error::UnresolvedToken(token.into()))?;
        let mut bindings = self.bindings.lock();
        if bindings.iter().any(|b| b.id == id) {
            return Err(Error::BindingConflict(id));
        }
        debug!(id, token, ?mode, code = key.code(), "binding registered");
        bindings.push(Binding {
            id,
            key,
            mode,
            was_pressed: false,
        });
        Ok(())
    }

    /// Remove a binding. Idempotent.
    pub fn unregister(&self, id: u32) {
        let mut bindings = self.bindings.lock();
        let before = bindings.len();
        bindings.retain(|b| b.id != id);
        if bindings.len() != before {
            debug!(id, "binding unregistered");
        }
    }

    /// Remove all bindings.
    pub fn clear(&self) {
        self.bindings.lock().clear();
    }

    /// Number of registered bindings.
    pub fn binding_count(&self) -> usize {
        self.bindings.lock().len()
    }

    /// True while the poll task is running.
    pub fn is_running(&self) -> bool {
        self.task.lock().is_some()
    }

    /// Start polling, emitting edges on `events`.
    ///
    /// Replaces any previous poll task. All per-binding last-pressed
    /// state is reset first so a restart cannot see stale edges.
    pub fn start(&self, events: UnboundedSender<Trigger>) {
        self.stop();
        for b in self.bindings.lock().iter_mut() {
            b.was_pressed = false;
        }

        let token = CancellationToken::new();
        let cancel = token.clone();
        let source = self.source.clone();
        let bindings = self.bindings.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(POLL_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        trace!("monitor poll cancelled");
                        return;
                    }
                    _ = ticker.tick() => {}
                }
                // Bindings are evaluated in registration order each tick.
                let mut fired: Vec<Trigger> = Vec::new();
                {
                    let mut bindings = bindings.lock();
                    for b in bindings.iter_mut() {
                        let pressed = source.is_pressed(b.key);
                        if pressed == b.was_pressed {
                            continue;
                        }
                        b.was_pressed = pressed;
                        let edge = if pressed {
                            KeyEdge::Pressed
                        } else {
                            KeyEdge::Released
                        };
                        fired.push(Trigger {
                            id: b.id,
                            mode: b.mode,
                            edge,
                        });
                    }
                }
                for t in fired {
                    trace!(id = t.id, edge = ?t.edge, "trigger");
                    if events.send(t).is_err() {
                        // Consumer went away; polling is pointless.
                        return;
                    }
                }
            }
        });
        *self.task.lock() = Some(PollTask { token, handle });
        debug!("monitor started");
    }

    /// Stop polling and reset all per-binding last-pressed state.
    ///
    /// Bindings stay registered; a later [`Self::start`] re-arms them.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.token.cancel();
            task.handle.abort();
            debug!("monitor stopped");
        }
        for b in self.bindings.lock().iter_mut() {
            b.was_pressed = false;
        }
    }
}

impl Drop for HotkeyMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().take() {
            task.token.cancel();
            task.handle.abort();
        }
    }
}
