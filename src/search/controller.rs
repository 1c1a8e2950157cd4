//! Debounced search controller
//!
//! Owns the query text, loading flag, result list and open/closed state of
//! a search dropdown, and decides when the provider gets called:
//!
//! - opening fetches the empty query once, immediately;
//! - each keystroke while open restarts a quiescence timer, and only the
//!   query standing when the timer fires is sent;
//! - closing cancels the timer but not fetches already in flight.
//!
//! Every fetch takes a sequence number when it is issued. A response is
//! applied only if no newer fetch has been issued since, so a slow answer
//! for an old query can never overwrite the results of a newer one.
//!
//! ```text
//! Closed ──open()──► Fetching("") ──► Idle ⇄ DebouncePending ──► Fetching ──► Idle
//!   ▲                                                                          │
//!   └──────────────────────────── close() from any open state ─────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::search::option::{dedupe_by_id, SearchOption};
use crate::search::provider::OptionProvider;

/// Quiescence window between the last keystroke and the fetch.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Delay before the search input is focused after opening.
pub const DEFAULT_FOCUS_DELAY: Duration = Duration::from_millis(100);

/// Timing knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub debounce: Duration,
    pub focus_delay: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            focus_delay: DEFAULT_FOCUS_DELAY,
        }
    }
}

/// Snapshot of what the dropdown shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSession {
    pub query: String,
    pub loading: bool,
    pub options: Vec<SearchOption>,
    /// Keyboard highlight into `options`
    pub highlighted: Option<usize>,
}

/// Observable controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Closed,
    Idle,
    DebouncePending,
    Fetching,
}

#[derive(Debug, Default)]
struct Shared {
    session: SearchSession,
    /// Sequence number of the most recently issued fetch
    latest_seq: u64,
    /// Bumped on every open so a focus timer from an earlier open is ignored
    open_epoch: u64,
    input_focused: bool,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Debounced, sequence-checked search over an [`OptionProvider`].
///
/// Must be used from within a tokio runtime: timers and fetches are spawned
/// tasks. All of them are aborted when the controller is dropped, except
/// fetches already in flight, which settle into state nobody reads.
pub struct SearchController {
    provider: Arc<dyn OptionProvider>,
    settings: SearchSettings,
    shared: Arc<Mutex<Shared>>,
    open: bool,
    debounce_task: Option<JoinHandle<()>>,
    focus_task: Option<JoinHandle<()>>,
}

impl SearchController {
    pub fn new(provider: Arc<dyn OptionProvider>, settings: SearchSettings) -> Self {
        Self {
            provider,
            settings,
            shared: Arc::new(Mutex::new(Shared::default())),
            open: false,
            debounce_task: None,
            focus_task: None,
        }
    }

    pub fn settings(&self) -> SearchSettings {
        self.settings
    }

    pub fn provider(&self) -> Arc<dyn OptionProvider> {
        self.provider.clone()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Closed → open. Fetches the empty query right away and schedules the
    /// input focus. Returns false if already open.
    pub fn open(&mut self) -> bool {
        if self.open {
            return false;
        }
        self.open = true;
        self.cancel_debounce();

        let epoch = {
            let mut shared = lock(&self.shared);
            shared.session.query.clear();
            shared.input_focused = false;
            shared.open_epoch += 1;
            shared.open_epoch
        };

        self.spawn_fetch(String::new());
        self.schedule_focus(epoch);
        tracing::debug!(epoch, "Search dropdown opened");
        true
    }

    /// Open → closed. Cancels the pending timer; keeps the last options so
    /// a re-open shows them until the fresh fetch lands. Returns false if
    /// already closed.
    pub fn close(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        self.cancel_debounce();
        if let Some(task) = self.focus_task.take() {
            task.abort();
        }
        lock(&self.shared).input_focused = false;
        tracing::debug!("Search dropdown closed");
        true
    }

    /// Update the query. While open, (re)starts the debounce timer.
    pub fn set_query(&mut self, text: impl Into<String>) {
        let text = text.into();
        {
            let mut shared = lock(&self.shared);
            shared.session.query = text.clone();
            shared.session.highlighted = None;
        }
        if !self.open {
            return;
        }

        self.cancel_debounce();
        let provider = self.provider.clone();
        let shared = self.shared.clone();
        let delay = self.settings.debounce;
        self.debounce_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let seq = begin_fetch(&shared);
            tokio::spawn(run_fetch(provider, shared, text, seq));
        }));
    }

    /// Clear the query text without scheduling anything
    pub fn reset_query(&mut self) {
        self.cancel_debounce();
        let mut shared = lock(&self.shared);
        shared.session.query.clear();
        shared.session.highlighted = None;
    }

    pub fn state(&self) -> ControllerState {
        if !self.open {
            ControllerState::Closed
        } else if self
            .debounce_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
        {
            ControllerState::DebouncePending
        } else if lock(&self.shared).session.loading {
            ControllerState::Fetching
        } else {
            ControllerState::Idle
        }
    }

    pub fn session(&self) -> SearchSession {
        lock(&self.shared).session.clone()
    }

    pub fn query(&self) -> String {
        lock(&self.shared).session.query.clone()
    }

    pub fn options(&self) -> Vec<SearchOption> {
        lock(&self.shared).session.options.clone()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.shared).session.loading
    }

    /// True once the focus delay after the latest open has elapsed
    pub fn input_focused(&self) -> bool {
        lock(&self.shared).input_focused
    }

    pub fn highlight_next(&mut self) {
        let mut shared = lock(&self.shared);
        let len = shared.session.options.len();
        if len == 0 {
            return;
        }
        shared.session.highlighted = Some(match shared.session.highlighted {
            Some(idx) if idx + 1 < len => idx + 1,
            Some(idx) => idx,
            None => 0,
        });
    }

    pub fn highlight_previous(&mut self) {
        let mut shared = lock(&self.shared);
        if let Some(idx) = shared.session.highlighted {
            shared.session.highlighted = Some(idx.saturating_sub(1));
        }
    }

    pub fn highlighted_option(&self) -> Option<SearchOption> {
        let shared = lock(&self.shared);
        shared
            .session
            .highlighted
            .and_then(|idx| shared.session.options.get(idx).cloned())
    }

    pub fn option_at(&self, idx: usize) -> Option<SearchOption> {
        lock(&self.shared).session.options.get(idx).cloned()
    }

    fn spawn_fetch(&self, query: String) {
        let seq = begin_fetch(&self.shared);
        tokio::spawn(run_fetch(
            self.provider.clone(),
            self.shared.clone(),
            query,
            seq,
        ));
    }

    fn schedule_focus(&mut self, epoch: u64) {
        if let Some(task) = self.focus_task.take() {
            task.abort();
        }
        let shared = self.shared.clone();
        let delay = self.settings.focus_delay;
        self.focus_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut shared = lock(&shared);
            if shared.open_epoch == epoch {
                shared.input_focused = true;
            }
        }));
    }

    fn cancel_debounce(&mut self) {
        if let Some(task) = self.debounce_task.take() {
            task.abort();
        }
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        self.cancel_debounce();
        if let Some(task) = self.focus_task.take() {
            task.abort();
        }
    }
}

/// Issue a new sequence number and flag loading
fn begin_fetch(shared: &Mutex<Shared>) -> u64 {
    let mut shared = lock(shared);
    shared.latest_seq += 1;
    shared.session.loading = true;
    shared.latest_seq
}

async fn run_fetch(
    provider: Arc<dyn OptionProvider>,
    shared: Arc<Mutex<Shared>>,
    query: String,
    seq: u64,
) {
    let outcome = provider.search(&query).await;

    let mut shared = lock(&shared);
    if seq != shared.latest_seq {
        tracing::debug!(
            seq,
            latest = shared.latest_seq,
            query = %query,
            "Discarding stale search response"
        );
        return;
    }

    shared.session.loading = false;
    match outcome {
        Ok(mut options) => {
            let dropped = dedupe_by_id(&mut options);
            if dropped > 0 {
                tracing::warn!(dropped, query = %query, "Provider returned duplicate option ids");
            }
            shared.session.highlighted = if options.is_empty() { None } else { Some(0) };
            shared.session.options = options;
        }
        Err(e) => {
            tracing::warn!(error = %e, query = %query, "Option search failed");
            shared.session.options.clear();
            shared.session.highlighted = None;
        }
    }
}
