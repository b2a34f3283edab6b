//! Runs macro action sequences with a single-active-run guarantee.
//!
//! At most one macro run is in progress system-wide. A trigger that
//! arrives while a run is active is dropped, not queued; that is the
//! backpressure policy, chosen so two macros can never fight over the
//! same injected keys.
//!
//! Cancellation is cooperative: it is observed before each action and
//! during inter-action pauses, so latency is bounded by the in-flight
//! op's duration. An injected input already in flight is never torn.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use parking_lot::Mutex;
use tokio::{task::JoinHandle, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{
    catalog::{BasicMacro, ComboMacro, ImageMacro},
    interpreter::Interpreter,
};

/// Pause between consecutive actions of a basic macro.
pub(crate) const ACTION_PAUSE: Duration = Duration::from_millis(50);
/// Extra pause before a looping basic macro restarts.
pub(crate) const LOOP_PAUSE: Duration = Duration::from_millis(100);
/// Maximum time to wait for a cancelled worker to wind down.
const CANCEL_WAIT: Duration = Duration::from_millis(250);

/// A live or recently finished worker task.
struct Run {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// The macro execution engine.
///
/// Clones share the same single-run slot, so any clone can observe
/// [`Executor::is_executing`] or [`Executor::cancel`] the current run.
#[derive(Clone)]
pub struct Executor {
    interp: Interpreter,
    running: Arc<AtomicBool>,
    run: Arc<Mutex<Option<Run>>>,
}

impl Executor {
    /// Create an executor dispatching through `interp`.
    pub fn new(interp: Interpreter) -> Self {
        Self {
            interp,
            running: Arc::new(AtomicBool::new(false)),
            run: Arc::new(Mutex::new(None)),
        }
    }

    /// True while a worker task is running a macro.
    pub fn is_executing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Request cancellation of the current run, if any.
    ///
    /// Returns immediately; the worker stops at its next check point.
    pub fn cancel(&self) {
        if let Some(run) = &*self.run.lock() {
            run.token.cancel();
        }
    }

    /// Cancel the current run and wait (bounded) for the worker to exit.
    pub async fn cancel_and_wait(&self) {
        let run = self.run.lock().take();
        if let Some(run) = run {
            run.token.cancel();
            let _ = tokio::time::timeout(CANCEL_WAIT, run.handle).await;
        }
    }

    /// Claim the single-run slot. Returns `None` when busy.
    fn begin(&self, name: &str) -> Option<CancellationToken> {
        // Reap a finished worker so the slot reflects a live task.
        {
            let mut run = self.run.lock();
            if run.as_ref().is_some_and(|r| r.handle.is_finished()) {
                *run = None;
            }
        }
        if self.running.swap(true, Ordering::SeqCst) {
            trace!(name, "execution busy; trigger dropped");
            return None;
        }
        debug!(name, "macro run starting");
        Some(CancellationToken::new())
    }

    /// Install the worker for the run claimed by [`Self::begin`].
    fn install(&self, token: CancellationToken, handle: JoinHandle<()>) {
        *self.run.lock() = Some(Run { token, handle });
    }

    /// Run a basic macro: actions in order with a fixed pause between
    /// them, restarting after [`LOOP_PAUSE`] when `looped` is set.
    ///
    /// Returns false when the trigger was dropped because a run is
    /// already active.
    pub fn run_basic(&self, mac: &BasicMacro) -> bool {
        let Some(token) = self.begin(&mac.name) else {
            return false;
        };
        let cancel = token.clone();
        let running = self.running.clone();
        let interp = self.interp.clone();
        let actions = mac.actions.clone();
        let looped = mac.looped;
        let name = mac.name.clone();

        let handle = tokio::spawn(async move {
            'run: loop {
                for action in &actions {
                    if cancel.is_cancelled() {
                        break 'run;
                    }
                    interp.run(action).await;
                    tokio::select! {
                        _ = cancel.cancelled() => break 'run,
                        _ = sleep(ACTION_PAUSE) => {}
                    }
                }
                if !looped {
                    break;
                }
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = sleep(LOOP_PAUSE) => {}
                }
            }
            running.store(false, Ordering::SeqCst);
            debug!(name, "macro run finished");
        });
        self.install(token, handle);
        true
    }

    /// Run a combo macro: one pass over the skills, `delay_between`
    /// milliseconds apart. No implicit loop.
    ///
    /// `detect_cooldown` is accepted configuration with no behavior.
    pub fn run_combo(&self, mac: &ComboMacro) -> bool {
        let Some(token) = self.begin(&mac.name) else {
            return false;
        };
        let cancel = token.clone();
        let running = self.running.clone();
        let interp = self.interp.clone();
        let skills = mac.skills.clone();
        let delay = Duration::from_millis(mac.delay_between);
        let name = mac.name.clone();

        let handle = tokio::spawn(async move {
            for skill in &skills {
                if cancel.is_cancelled() {
                    break;
                }
                interp.run(skill).await;
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = sleep(delay) => {}
                }
            }
            running.store(false, Ordering::SeqCst);
            debug!(name, "combo run finished");
        });
        self.install(token, handle);
        true
    }

    /// Run an image macro's single action immediately.
    ///
    /// No image matching happens here; when a detection collaborator
    /// exists it gates this call on a positive match.
    pub fn run_image(&self, mac: &ImageMacro) -> bool {
        let Some(token) = self.begin(&mac.name) else {
            return false;
        };
        let running = self.running.clone();
        let interp = self.interp.clone();
        let action = mac.action.clone();
        let name = mac.name.clone();

        let handle = tokio::spawn(async move {
            interp.run(&action).await;
            running.store(false, Ordering::SeqCst);
            debug!(name, "image action finished");
        });
        self.install(token, handle);
        true
    }
}
