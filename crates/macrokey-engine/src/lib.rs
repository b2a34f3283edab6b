//! Hotkey-triggered macro engine.
//!
//! The engine ties four pieces together: a symbolic key vocabulary
//! (`keycode`), a polling hotkey monitor, an action interpreter over the
//! `sendkey` input sender, and an executor that enforces a
//! single-active-run policy with cooperative cancellation.
//!
//! [`Engine`] is the facade: load a [`MacroStore`], call
//! [`Engine::start_monitoring`], and enabled macros fire on their
//! hotkeys until [`Engine::stop_monitoring`].

mod catalog;
mod error;
mod executor;
mod interpreter;
mod monitor;
mod script;
pub mod test_support;

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use sendkey::SendKey;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, warn};

pub use catalog::{BasicMacro, ComboMacro, ImageMacro, MacroStore};
pub use error::{Error, Result};
pub use executor::Executor;
pub use interpreter::Interpreter;
pub use monitor::{
    AsyncKeyState, HotkeyMonitor, KeyEdge, KeyStateSource, POLL_INTERVAL, Trigger, TriggerMode,
};
pub use script::{Op, parse_action};

/// First hotkey binding id; ids count up from here per start.
const BASE_BINDING_ID: u32 = 1000;

/// What a binding id maps to while monitoring is active.
enum Bound {
    Basic(BasicMacro),
    Combo(ComboMacro),
}

/// The assembled engine.
///
/// Owns the monitor, the executor, and the driver task that turns
/// trigger edges into macro runs.
pub struct Engine {
    monitor: Arc<HotkeyMonitor>,
    executor: Executor,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine on the OS key state and input backends.
    pub fn new() -> Self {
        Self::with_parts(Arc::new(AsyncKeyState), SendKey::new())
    }

    /// Create an engine on explicit backends. Tests use this with
    /// [`test_support::ScriptedKeyState`] and a recording injector.
    pub fn with_parts(source: Arc<dyn KeyStateSource>, sender: SendKey) -> Self {
        Self {
            monitor: Arc::new(HotkeyMonitor::new(source)),
            executor: Executor::new(Interpreter::new(sender)),
            driver: Mutex::new(None),
        }
    }

    /// Bind every enabled macro in `store` and start polling.
    ///
    /// Basic macros bind in hold mode when they ask for it, edge mode
    /// otherwise; combo macros always bind in edge mode. Image macros
    /// have no hotkey and are never bound. A macro whose hotkey does
    /// not resolve is logged and skipped; the rest still bind.
    ///
    /// Returns the number of bindings installed.
    pub fn start_monitoring(&self, store: &MacroStore) -> usize {
        self.stop_monitoring();
        self.monitor.clear();

        let mut bound: HashMap<u32, Bound> = HashMap::new();
        let mut next_id = BASE_BINDING_ID;

        for mac in store.basic.iter().filter(|m| m.enabled) {
            let mode = if mac.hold_mode {
                TriggerMode::Hold
            } else {
                TriggerMode::EdgePress
            };
            match self.monitor.register(next_id, &mac.hotkey, mode) {
                Ok(()) => {
                    bound.insert(next_id, Bound::Basic(mac.clone()));
                    next_id += 1;
                }
                Err(e) => warn!(name = %mac.name, error = %e, "macro not bound"),
            }
        }
        for mac in store.combo.iter().filter(|m| m.enabled) {
            match self.monitor.register(next_id, &mac.hotkey, TriggerMode::EdgePress) {
                Ok(()) => {
                    bound.insert(next_id, Bound::Combo(mac.clone()));
                    next_id += 1;
                }
                Err(e) => warn!(name = %mac.name, error = %e, "combo not bound"),
            }
        }

        let count = bound.len();
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.monitor.start(tx);

        let executor = self.executor.clone();
        let handle = tokio::spawn(async move {
            // Hold bindings currently down, in press order. Every tick,
            // while one is held and nothing is executing, its macro is
            // restarted, so a non-looping hold macro repeats for the
            // whole hold.
            let mut held: Vec<(u32, BasicMacro)> = Vec::new();
            let mut ticker = time::interval(POLL_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    t = rx.recv() => {
                        let Some(t) = t else { return };
                        let Some(target) = bound.get(&t.id) else { continue };
                        match (t.mode, t.edge) {
                            (TriggerMode::EdgePress, KeyEdge::Pressed) => match target {
                                Bound::Basic(mac) => {
                                    executor.run_basic(mac);
                                }
                                Bound::Combo(mac) => {
                                    executor.run_combo(mac);
                                }
                            },
                            (TriggerMode::Hold, KeyEdge::Pressed) => {
                                if let Bound::Basic(mac) = target {
                                    held.push((t.id, mac.clone()));
                                    executor.run_basic(mac);
                                }
                            }
                            (TriggerMode::Hold, KeyEdge::Released) => {
                                held.retain(|(id, _)| *id != t.id);
                                executor.cancel();
                            }
                            (TriggerMode::EdgePress, KeyEdge::Released) => {}
                        }
                    }
                    _ = ticker.tick() => {
                        if !executor.is_executing()
                            && let Some((_, mac)) = held.first()
                        {
                            executor.run_basic(mac);
                        }
                    }
                }
            }
        });
        *self.driver.lock() = Some(handle);
        debug!(count, "monitoring started");
        count
    }

    /// Stop polling and drop the driver task.
    ///
    /// A run already in flight is not cancelled; use [`Self::cancel`]
    /// for that.
    pub fn stop_monitoring(&self) {
        self.monitor.stop();
        if let Some(handle) = self.driver.lock().take() {
            handle.abort();
            debug!("monitoring stopped");
        }
    }

    /// Stop monitoring, cancel the active run, and wait (bounded) for
    /// the worker to exit.
    pub async fn shutdown(&self) {
        self.stop_monitoring();
        self.executor.cancel_and_wait().await;
    }

    /// True while a macro run is in progress.
    pub fn is_executing(&self) -> bool {
        self.executor.is_executing()
    }

    /// Request cancellation of the current run, if any.
    pub fn cancel(&self) {
        self.executor.cancel();
    }

    /// Run an image macro's action now, subject to the single-run policy.
    ///
    /// Image macros have no hotkey; detection (or a UI) decides when to
    /// invoke them. Returns false when a run is already active.
    pub fn run_image(&self, mac: &ImageMacro) -> bool {
        if !mac.enabled {
            return false;
        }
        self.executor.run_image(mac)
    }

    /// The monitor, for registration introspection.
    pub fn monitor(&self) -> &HotkeyMonitor {
        &self.monitor
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(handle) = self.driver.lock().take() {
            handle.abort();
        }
    }
}
