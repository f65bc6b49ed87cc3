//! Copy feedback indicators.
//!
//! Each copy action shows a "copied" indicator for a fixed window after it
//! runs. The reference and full-content actions have their own indicator and
//! their own timer. Re-running an action replaces its pending timer, so only
//! the most recent run decides when the indicator turns off.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::clipboard::Clipboard;
use crate::prompt::PromptKind;

/// How long an indicator stays on after a copy.
pub const COPY_FEEDBACK_WINDOW: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Indicator {
    active: bool,
    /// Bumped on every copy; a timer only clears the generation it was armed for.
    generation: u64,
}

/// Snapshot of both copy indicators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyState {
    reference: Indicator,
    full: Indicator,
}

impl CopyState {
    pub fn is_copied(&self, kind: PromptKind) -> bool {
        self.slot(kind).active
    }

    fn slot(&self, kind: PromptKind) -> &Indicator {
        match kind {
            PromptKind::Reference => &self.reference,
            PromptKind::Full => &self.full,
        }
    }

    fn slot_mut(&mut self, kind: PromptKind) -> &mut Indicator {
        match kind {
            PromptKind::Reference => &mut self.reference,
            PromptKind::Full => &mut self.full,
        }
    }
}

fn timer_index(kind: PromptKind) -> usize {
    match kind {
        PromptKind::Reference => 0,
        PromptKind::Full => 1,
    }
}

/// Drives the copy indicators for one page instance.
///
/// Timers run as tokio tasks, so copies must be triggered from inside a
/// runtime. Dropping the controller cancels any pending resets.
pub struct CopyFeedback {
    state: Arc<watch::Sender<CopyState>>,
    timers: [Option<JoinHandle<()>>; 2],
}

impl CopyFeedback {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(CopyState::default());
        Self {
            state: Arc::new(tx),
            timers: [None, None],
        }
    }

    /// Current indicator values.
    pub fn state(&self) -> CopyState {
        *self.state.borrow()
    }

    pub fn is_copied(&self, kind: PromptKind) -> bool {
        self.state().is_copied(kind)
    }

    /// Watch indicator changes, including timer-driven resets.
    pub fn subscribe(&self) -> watch::Receiver<CopyState> {
        self.state.subscribe()
    }

    /// Write `text` to the clipboard and light the indicator for `kind`.
    ///
    /// The clipboard write is best-effort: a failure is logged and the
    /// indicator still turns on.
    pub fn copy(&mut self, kind: PromptKind, text: &str, clipboard: &dyn Clipboard) {
        if let Err(e) = clipboard.write_text(text) {
            warn!("Clipboard write for {} prompt failed: {}", kind, e);
        }
        self.mark_copied(kind);
    }

    /// Turn on the indicator for `kind` and (re)arm its reset timer.
    pub fn mark_copied(&mut self, kind: PromptKind) {
        let idx = timer_index(kind);
        if let Some(previous) = self.timers[idx].take() {
            previous.abort();
        }

        let mut generation = 0;
        self.state.send_modify(|state| {
            let slot = state.slot_mut(kind);
            slot.generation += 1;
            slot.active = true;
            generation = slot.generation;
        });
        debug!("{} prompt copied (generation {})", kind, generation);

        let state = Arc::clone(&self.state);
        self.timers[idx] = Some(tokio::spawn(async move {
            tokio::time::sleep(COPY_FEEDBACK_WINDOW).await;
            state.send_if_modified(|s| {
                let slot = s.slot_mut(kind);
                if slot.active && slot.generation == generation {
                    slot.active = false;
                    true
                } else {
                    false
                }
            });
        }));
    }
}

impl Default for CopyFeedback {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CopyFeedback {
    fn drop(&mut self) {
        for timer in self.timers.iter_mut().filter_map(Option::take) {
            timer.abort();
        }
    }
}
