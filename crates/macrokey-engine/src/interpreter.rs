//! Executes parsed action lines through the input sender.

use std::time::Duration;

use sendkey::SendKey;
use tokio::time::sleep;
use tracing::trace;

use crate::script::{self, Op};

/// How long a synthesized press or click is held before release.
pub(crate) const KEY_HOLD: Duration = Duration::from_millis(50);

/// Runs one action line at a time, strictly sequentially.
///
/// Each op blocks the calling task for its hold or wait duration before
/// returning, so a macro's actions never overlap.
#[derive(Clone)]
pub struct Interpreter {
    sender: SendKey,
}

impl Interpreter {
    /// Create an interpreter dispatching through `sender`.
    pub fn new(sender: SendKey) -> Self {
        Self { sender }
    }

    /// Parse and execute one action line.
    ///
    /// Lines that do not parse are skipped without dispatching any input.
    pub async fn run(&self, action: &str) {
        let Some(op) = script::parse_action(action) else {
            trace!(action, "action did not parse; skipped");
            return;
        };
        match op {
            Op::Press(key) => {
                self.sender.key_down(key);
                sleep(KEY_HOLD).await;
                self.sender.key_up(key);
            }
            Op::Click(button) => {
                self.sender.button_down(button);
                sleep(KEY_HOLD).await;
                self.sender.button_up(button);
            }
            Op::Wait(duration) => {
                sleep(duration).await;
            }
        }
    }
}
