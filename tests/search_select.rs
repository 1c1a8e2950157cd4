//! Searchable select behaviour against a recording provider
//!
//! All tests run on a paused clock, so the 300ms debounce and provider
//! latencies are simulated rather than waited for.
//!
//! Run with: cargo test --test search_select

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use campus_console::search::select::DEFAULT_PLACEHOLDER;
use campus_console::search::{Committed, ControllerState};
use campus_console::{
    ApiError, OptionId, OptionProvider, PointerTarget, SearchOption, SearchSettings,
    SearchableSelect, SelectEvent,
};

/// Records every query and answers with one option per query, after an
/// optional per-query delay
#[derive(Default)]
struct RecordingProvider {
    calls: Mutex<Vec<String>>,
    delays: HashMap<String, Duration>,
    defaults: Vec<SearchOption>,
}

impl RecordingProvider {
    fn with_defaults(defaults: Vec<SearchOption>) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    fn delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OptionProvider for RecordingProvider {
    async fn search(&self, query: &str) -> Result<Vec<SearchOption>, ApiError> {
        self.calls.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if query.is_empty() {
            Ok(self.defaults.clone())
        } else {
            Ok(vec![SearchOption::new(100, format!("result for {query}"))])
        }
    }
}

/// Answers the empty query from `defaults`; every other query fails. With
/// `fail_all`, the empty query fails too.
struct FlakyProvider {
    defaults: Vec<SearchOption>,
    fail_all: bool,
    calls: Mutex<Vec<String>>,
}

impl FlakyProvider {
    fn new(defaults: Vec<SearchOption>, fail_all: bool) -> Self {
        Self {
            defaults,
            fail_all,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl OptionProvider for FlakyProvider {
    async fn search(&self, query: &str) -> Result<Vec<SearchOption>, ApiError> {
        self.calls.lock().unwrap().push(query.to_string());
        if self.fail_all || !query.is_empty() {
            Err(ApiError::Transport("connection reset".into()))
        } else {
            Ok(self.defaults.clone())
        }
    }
}

fn people() -> Vec<SearchOption> {
    vec![
        SearchOption::new(42, "Jane Doe").with_sub_label("MAT-042"),
        SearchOption::new(7, "John Smith"),
    ]
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn keystrokes_within_window_send_only_last_query() {
    let provider = Arc::new(RecordingProvider::with_defaults(people()));
    let mut select = SearchableSelect::mount(provider.clone(), SearchSettings::default(), None);

    select.click(PointerTarget::Trigger);
    advance(10).await;

    for text in ["j", "ja", "jan", "jane"] {
        select.type_query(text);
        advance(100).await;
    }
    assert_eq!(
        select.controller().state(),
        ControllerState::DebouncePending
    );

    advance(400).await;
    assert_eq!(provider.calls(), vec!["".to_string(), "jane".to_string()]);
    assert_eq!(select.session().options[0].label, "result for jane");
    assert!(!select.session().loading);
}

#[tokio::test(start_paused = true)]
async fn separate_idle_windows_each_fetch() {
    let provider = Arc::new(RecordingProvider::with_defaults(people()));
    let mut select = SearchableSelect::mount(provider.clone(), SearchSettings::default(), None);
    select.open();

    select.type_query("ja");
    advance(350).await;
    select.type_query("jo");
    advance(350).await;

    assert_eq!(provider.calls(), vec!["", "ja", "jo"]);
}

#[tokio::test(start_paused = true)]
async fn opening_fetches_empty_query_exactly_once() {
    let provider = Arc::new(RecordingProvider::with_defaults(people()));
    let mut select = SearchableSelect::mount(provider.clone(), SearchSettings::default(), None);
    advance(1_000).await;
    assert!(provider.calls().is_empty());

    assert_eq!(select.click(PointerTarget::Trigger), SelectEvent::Opened);
    assert!(!select.controller().input_focused());

    advance(150).await;
    assert!(select.controller().input_focused());

    advance(1_000).await;
    assert_eq!(provider.calls(), vec![String::new()]);
    assert_eq!(select.session().options, people());
}

#[tokio::test(start_paused = true)]
async fn closing_cancels_pending_debounce() {
    let provider = Arc::new(RecordingProvider::with_defaults(people()));
    let mut select = SearchableSelect::mount(provider.clone(), SearchSettings::default(), None);
    select.open();
    advance(10).await;

    select.type_query("jane");
    advance(100).await;
    assert_eq!(select.close(), SelectEvent::Closed);
    advance(1_000).await;

    assert_eq!(provider.calls(), vec![""]);
    // Last good list is kept for the next open
    assert_eq!(select.session().options, people());
}

#[tokio::test(start_paused = true)]
async fn select_then_clear_leaves_empty_and_closed() {
    let provider = Arc::new(RecordingProvider::with_defaults(people()));
    let mut select = SearchableSelect::mount(provider, SearchSettings::default(), None);
    select.open();
    advance(10).await;

    let event = select.click(PointerTarget::Option(0));
    assert_eq!(event, SelectEvent::Changed(Some(OptionId::Num(42))));
    assert!(!select.is_open());
    assert_eq!(select.display_label(), "Jane Doe");

    assert_eq!(
        select.click(PointerTarget::ClearButton),
        SelectEvent::Changed(None)
    );
    assert_eq!(select.value(), None);
    assert!(!select.is_open());
    assert!(!select.shows_clear_button());
    assert_eq!(select.controller().query(), "");
}

#[tokio::test(start_paused = true)]
async fn initial_value_label_resolves_without_opening() {
    let provider = Arc::new(RecordingProvider::with_defaults(people()));
    let mut select = SearchableSelect::mount(
        provider.clone(),
        SearchSettings::default(),
        Some(OptionId::Num(42)),
    );

    select.label_resolved().await;
    assert_eq!(select.display_label(), "Jane Doe");
    assert!(!select.is_open());
    assert_eq!(provider.calls(), vec![""]);
}

#[tokio::test(start_paused = true)]
async fn initial_string_id_matches_numeric_option() {
    let provider = Arc::new(RecordingProvider::with_defaults(people()));
    let mut select = SearchableSelect::mount(
        provider,
        SearchSettings::default(),
        Some(OptionId::Text("7".into())),
    );

    select.label_resolved().await;
    assert_eq!(select.display_label(), "John Smith");
}

#[tokio::test(start_paused = true)]
async fn unresolved_value_is_looked_up_once() {
    let provider = Arc::new(RecordingProvider::with_defaults(people()));
    let mut select = SearchableSelect::mount(
        provider.clone(),
        SearchSettings::default(),
        Some(OptionId::Num(999)),
    );
    select.label_resolved().await;

    select.set_value(Some(OptionId::Num(999)));
    select.label_resolved().await;

    assert_eq!(provider.calls(), vec![""]);
    assert_eq!(select.value(), Some(OptionId::Num(999)));
}

#[tokio::test(start_paused = true)]
async fn stale_response_is_discarded() {
    let provider = Arc::new(
        RecordingProvider::with_defaults(people())
            .delay("slow", Duration::from_millis(2_000))
            .delay("fast", Duration::from_millis(10)),
    );
    let mut select = SearchableSelect::mount(provider.clone(), SearchSettings::default(), None);
    select.open();
    advance(10).await;

    select.type_query("slow");
    advance(350).await;
    assert!(select.session().loading);

    select.type_query("fast");
    advance(350).await;
    assert_eq!(select.session().options[0].label, "result for fast");
    assert!(!select.session().loading);

    advance(3_000).await;
    assert_eq!(provider.calls(), vec!["", "slow", "fast"]);
    assert_eq!(select.session().options[0].label, "result for fast");
}

#[tokio::test(start_paused = true)]
async fn clearing_while_open_searches_empty_query_again() {
    let provider = Arc::new(RecordingProvider::with_defaults(people()));
    let mut select = SearchableSelect::mount(provider.clone(), SearchSettings::default(), None);
    select.open();
    advance(10).await;

    select.type_query("jane");
    advance(400).await;
    assert_eq!(select.session().options[0].label, "result for jane");

    assert_eq!(
        select.click(PointerTarget::ClearButton),
        SelectEvent::Changed(None)
    );
    assert!(select.is_open());
    assert_eq!(select.controller().query(), "");
    assert_eq!(
        select.controller().state(),
        ControllerState::DebouncePending
    );

    advance(1_000).await;
    assert_eq!(provider.calls(), vec!["", "jane", ""]);
    assert_eq!(select.session().options, people());
    assert_eq!(select.controller().state(), ControllerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn clearing_while_closed_does_not_search() {
    let provider = Arc::new(RecordingProvider::with_defaults(people()));
    let mut select = SearchableSelect::mount(provider.clone(), SearchSettings::default(), None);
    select.open();
    advance(10).await;
    select.click(PointerTarget::Option(1));

    select.click(PointerTarget::ClearButton);
    advance(1_000).await;
    assert_eq!(provider.calls(), vec![""]);
    assert!(!select.is_open());
}

#[tokio::test(start_paused = true)]
async fn failed_search_empties_list_without_surfacing() {
    let provider = Arc::new(FlakyProvider::new(people(), false));
    let mut select = SearchableSelect::mount(provider.clone(), SearchSettings::default(), None);
    select.open();
    advance(10).await;
    assert_eq!(select.session().options, people());

    select.type_query("jane");
    advance(400).await;

    let session = select.session();
    assert!(session.options.is_empty());
    assert!(!session.loading);
    assert_eq!(session.highlighted, None);
    assert_eq!(select.controller().state(), ControllerState::Idle);
    assert!(select.is_open());
    assert_eq!(*provider.calls.lock().unwrap(), vec!["", "jane"]);
}

#[tokio::test(start_paused = true)]
async fn failed_label_lookup_leaves_value_unresolved() {
    let provider = Arc::new(FlakyProvider::new(people(), true));
    let mut select = SearchableSelect::mount(
        provider.clone(),
        SearchSettings::default(),
        Some(OptionId::Num(42)),
    );

    select.label_resolved().await;
    assert_eq!(select.committed(), Committed::Unresolved(OptionId::Num(42)));
    assert_eq!(select.value(), Some(OptionId::Num(42)));
    assert_eq!(select.display_label(), DEFAULT_PLACEHOLDER);
    assert!(!select.shows_clear_button());
    assert_eq!(*provider.calls.lock().unwrap(), vec![""]);
}
