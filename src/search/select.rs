//! Searchable select widget state
//!
//! Composes the debounced controller, the committed selection and the
//! component's hit region. Input methods return a [`SelectEvent`] that the
//! caller reacts to, the same way the modal pickers report their results.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;

use crate::search::controller::{SearchController, SearchSession, SearchSettings};
use crate::search::option::{OptionId, SearchOption};
use crate::search::provider::OptionProvider;
use crate::search::region::{Bounds, HitRegion, Point};
use crate::search::selection::{Committed, SelectionState};

/// Default trigger text when nothing is selected
pub const DEFAULT_PLACEHOLDER: &str = "Search...";

/// What a click landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// The closed-state box showing the label
    Trigger,
    /// The clear cross inside the trigger
    ClearButton,
    /// The query field inside the dropdown
    SearchInput,
    /// The n-th option of the current list
    Option(usize),
}

/// Navigation keys handled by the dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Enter,
    Escape,
}

/// Result of an input event
#[derive(Debug, Clone, PartialEq)]
pub enum SelectEvent {
    /// No action taken
    None,
    Opened,
    Closed,
    /// Committed value changed (`None` = cleared)
    Changed(Option<OptionId>),
}

fn lock(selection: &Mutex<SelectionState>) -> MutexGuard<'_, SelectionState> {
    selection.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// State of one mounted searchable select
pub struct SearchableSelect {
    controller: SearchController,
    selection: Arc<Mutex<SelectionState>>,
    region: HitRegion,
    placeholder: String,
    label_lookup: Option<JoinHandle<()>>,
}

impl SearchableSelect {
    /// Mount the widget. If `initial` is set, its label is looked up in the
    /// background with one empty-query search.
    pub fn mount(
        provider: Arc<dyn OptionProvider>,
        settings: SearchSettings,
        initial: Option<OptionId>,
    ) -> Self {
        let mut select = Self {
            controller: SearchController::new(provider, settings),
            selection: Arc::new(Mutex::new(SelectionState::new(initial))),
            region: HitRegion::default(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            label_lookup: None,
        };
        select.start_label_lookup();
        select
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Reconcile with a value owned by the caller
    pub fn set_value(&mut self, value: Option<OptionId>) {
        lock(&self.selection).set_value(value);
        self.start_label_lookup();
    }

    /// Wait for a pending label lookup to finish
    pub async fn label_resolved(&mut self) {
        if let Some(task) = self.label_lookup.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "Label lookup task failed");
                }
            }
        }
    }

    pub fn committed(&self) -> Committed {
        lock(&self.selection).committed().clone()
    }

    pub fn value(&self) -> Option<OptionId> {
        lock(&self.selection).committed().value().cloned()
    }

    /// Label of the committed value, or the placeholder
    pub fn display_label(&self) -> String {
        let selection = lock(&self.selection);
        let label = selection.committed().label();
        if label.is_empty() {
            self.placeholder.clone()
        } else {
            label.to_string()
        }
    }

    /// The clear button is only shown once a label is known
    pub fn shows_clear_button(&self) -> bool {
        !lock(&self.selection).committed().label().is_empty()
    }

    pub fn is_open(&self) -> bool {
        self.controller.is_open()
    }

    pub fn session(&self) -> SearchSession {
        self.controller.session()
    }

    pub fn controller(&self) -> &SearchController {
        &self.controller
    }

    /// Whether `option` is the committed one
    pub fn is_committed(&self, option: &SearchOption) -> bool {
        self.value().is_some_and(|value| value.matches(&option.id))
    }

    /// Route a click to the element it landed on
    pub fn click(&mut self, target: PointerTarget) -> SelectEvent {
        match target {
            PointerTarget::Trigger => self.toggle(),
            // Handled here so it never reaches the trigger's toggle
            PointerTarget::ClearButton => self.clear(),
            PointerTarget::SearchInput => SelectEvent::None,
            PointerTarget::Option(idx) => match self.controller.option_at(idx) {
                Some(option) => self.select(&option),
                None => SelectEvent::None,
            },
        }
    }

    pub fn toggle(&mut self) -> SelectEvent {
        if self.controller.is_open() {
            self.close()
        } else {
            self.open()
        }
    }

    pub fn open(&mut self) -> SelectEvent {
        if self.controller.open() {
            SelectEvent::Opened
        } else {
            SelectEvent::None
        }
    }

    pub fn close(&mut self) -> SelectEvent {
        self.region.set_dropdown(None);
        if self.controller.close() {
            SelectEvent::Closed
        } else {
            SelectEvent::None
        }
    }

    pub fn type_query(&mut self, text: impl Into<String>) {
        self.controller.set_query(text);
    }

    /// Commit an option: set `{id, label}`, close, clear the query
    pub fn select(&mut self, option: &SearchOption) -> SelectEvent {
        lock(&self.selection).select(option);
        self.close();
        self.controller.reset_query();
        tracing::debug!(id = %option.id, "Option selected");
        SelectEvent::Changed(Some(option.id.clone()))
    }

    /// Empty the committed value and the query. Open state is left as is;
    /// while open, the emptied query is searched again after the debounce
    /// window so the list matches the query box.
    pub fn clear(&mut self) -> SelectEvent {
        lock(&self.selection).clear();
        if self.controller.is_open() {
            self.controller.set_query("");
        } else {
            self.controller.reset_query();
        }
        SelectEvent::Changed(None)
    }

    pub fn key(&mut self, key: NavKey) -> SelectEvent {
        if !self.controller.is_open() {
            return SelectEvent::None;
        }
        match key {
            NavKey::Up => {
                self.controller.highlight_previous();
                SelectEvent::None
            }
            NavKey::Down => {
                self.controller.highlight_next();
                SelectEvent::None
            }
            NavKey::Enter => match self.controller.highlighted_option() {
                Some(option) => self.select(&option),
                None => SelectEvent::None,
            },
            NavKey::Escape => self.close(),
        }
    }

    /// Record where the renderer placed the trigger and the open dropdown
    pub fn set_layout(&mut self, trigger: Bounds, dropdown: Option<Bounds>) {
        self.region.set_trigger(trigger);
        self.region.set_dropdown(dropdown);
    }

    /// Pointer pressed somewhere on screen; closes when outside the component
    pub fn pointer_down(&mut self, point: Point) -> SelectEvent {
        if self.controller.is_open() && !self.region.contains(point) {
            self.close()
        } else {
            SelectEvent::None
        }
    }

    fn start_label_lookup(&mut self) {
        let Some(id) = lock(&self.selection).begin_lookup() else {
            return;
        };
        if let Some(previous) = self.label_lookup.take() {
            previous.abort();
        }

        let provider = self.controller.provider();
        let selection = self.selection.clone();
        self.label_lookup = Some(tokio::spawn(async move {
            match provider.search("").await {
                Ok(options) => {
                    if lock(&selection).finish_lookup(&id, &options) {
                        tracing::debug!(id = %id, "Resolved label for initial value");
                    } else {
                        tracing::debug!(id = %id, "Initial value not in default list");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, id = %id, "Label lookup failed");
                }
            }
        }));
    }
}

impl Drop for SearchableSelect {
    fn drop(&mut self) {
        if let Some(task) = self.label_lookup.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::provider::StaticOptions;
    use std::time::Duration;

    fn provider() -> Arc<dyn OptionProvider> {
        Arc::new(StaticOptions::new(vec![
            SearchOption::new(1, "Jane Doe"),
            SearchOption::new(2, "John Smith"),
        ]))
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_option_commits_and_closes() {
        let mut select = SearchableSelect::mount(provider(), SearchSettings::default(), None);
        assert_eq!(select.display_label(), DEFAULT_PLACEHOLDER);
        assert!(!select.shows_clear_button());

        assert_eq!(select.click(PointerTarget::Trigger), SelectEvent::Opened);
        tokio::time::sleep(Duration::from_millis(10)).await;

        let event = select.click(PointerTarget::Option(1));
        assert_eq!(event, SelectEvent::Changed(Some(OptionId::Num(2))));
        assert!(!select.is_open());
        assert_eq!(select.display_label(), "John Smith");
        assert!(select.shows_clear_button());
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_range_option_is_ignored() {
        let mut select = SearchableSelect::mount(provider(), SearchSettings::default(), None);
        select.open();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(select.click(PointerTarget::Option(9)), SelectEvent::None);
        assert!(select.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_outside_pointer_closes() {
        let mut select = SearchableSelect::mount(provider(), SearchSettings::default(), None);
        select.open();
        select.set_layout(
            Bounds::from_origin_size(0.0, 0.0, 100.0, 20.0),
            Some(Bounds::from_origin_size(0.0, 20.0, 100.0, 100.0)),
        );

        assert_eq!(select.pointer_down(Point::new(50.0, 60.0)), SelectEvent::None);
        assert!(select.is_open());
        assert_eq!(select.pointer_down(Point::new(500.0, 60.0)), SelectEvent::Closed);
        assert!(!select.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keyboard_enter_selects_highlighted() {
        let mut select = SearchableSelect::mount(provider(), SearchSettings::default(), None);
        select.open();
        tokio::time::sleep(Duration::from_millis(10)).await;

        select.key(NavKey::Down);
        let event = select.key(NavKey::Enter);
        assert_eq!(event, SelectEvent::Changed(Some(OptionId::Num(2))));
        assert_eq!(select.key(NavKey::Escape), SelectEvent::None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_input_click_is_inert() {
        let mut select = SearchableSelect::mount(provider(), SearchSettings::default(), None);
        select.open();
        assert_eq!(select.click(PointerTarget::SearchInput), SelectEvent::None);
        assert!(select.is_open());
    }
}
