//! Committed selection of a search dropdown
//!
//! Value and label are never stored apart: a committed value is either
//! empty, an id whose label is not known yet, or a resolved `{id, label}`.

use crate::search::option::{OptionId, SearchOption};

/// A resolved `{id, label}` pair
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub id: OptionId,
    pub label: String,
}

impl From<&SearchOption> for Selection {
    fn from(option: &SearchOption) -> Self {
        Self {
            id: option.id.clone(),
            label: option.label.clone(),
        }
    }
}

/// The committed value
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Committed {
    #[default]
    Empty,
    /// Supplied from outside, label still unknown
    Unresolved(OptionId),
    Resolved(Selection),
}

impl Committed {
    pub fn value(&self) -> Option<&OptionId> {
        match self {
            Committed::Empty => None,
            Committed::Unresolved(id) => Some(id),
            Committed::Resolved(selection) => Some(&selection.id),
        }
    }

    /// Label to display; empty unless resolved
    pub fn label(&self) -> &str {
        match self {
            Committed::Resolved(selection) => &selection.label,
            _ => "",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Committed::Empty)
    }
}

/// Selection bookkeeping, including the one-shot label lookup for an
/// externally supplied value.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    committed: Committed,
    /// Last unresolved value a label lookup was started for
    lookup_started_for: Option<OptionId>,
}

impl SelectionState {
    pub fn new(initial: Option<OptionId>) -> Self {
        let mut state = Self::default();
        state.set_value(initial);
        state
    }

    pub fn committed(&self) -> &Committed {
        &self.committed
    }

    /// Reconcile with a value supplied from outside. Keeps the known label
    /// when the id is unchanged.
    pub fn set_value(&mut self, value: Option<OptionId>) {
        let value = value.filter(|id| !id.is_blank());
        self.committed = match value {
            None => Committed::Empty,
            Some(id) => match &self.committed {
                Committed::Resolved(current) if current.id.matches(&id) => {
                    return;
                }
                _ => Committed::Unresolved(id),
            },
        };
    }

    /// The id needing a label lookup, if one has not been started for it yet.
    /// Marks the lookup as started.
    pub fn begin_lookup(&mut self) -> Option<OptionId> {
        let Committed::Unresolved(id) = &self.committed else {
            return None;
        };
        if self
            .lookup_started_for
            .as_ref()
            .is_some_and(|started| started.matches(id))
        {
            return None;
        }
        self.lookup_started_for = Some(id.clone());
        Some(id.clone())
    }

    /// Apply a lookup result for `id`. Ignored unless `id` is still the
    /// unresolved committed value. Returns true if a label was adopted.
    pub fn finish_lookup(&mut self, id: &OptionId, options: &[SearchOption]) -> bool {
        match &self.committed {
            Committed::Unresolved(current) if current.matches(id) => {}
            _ => return false,
        }
        let Some(found) = options.iter().find(|option| option.id.matches(id)) else {
            return false;
        };
        self.committed = Committed::Resolved(Selection {
            id: id.clone(),
            label: found.label.clone(),
        });
        true
    }

    pub fn select(&mut self, option: &SearchOption) {
        self.committed = Committed::Resolved(Selection::from(option));
    }

    pub fn clear(&mut self) {
        self.committed = Committed::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_runs_once_per_value() {
        let mut state = SelectionState::new(Some(OptionId::Num(42)));
        assert_eq!(state.begin_lookup(), Some(OptionId::Num(42)));
        assert_eq!(state.begin_lookup(), None);

        // Not found: stays unresolved, no second lookup
        assert!(!state.finish_lookup(&OptionId::Num(42), &[]));
        assert_eq!(state.begin_lookup(), None);

        state.set_value(Some(OptionId::Num(7)));
        assert_eq!(state.begin_lookup(), Some(OptionId::Num(7)));
    }

    #[test]
    fn test_lookup_matches_string_ids() {
        let mut state = SelectionState::new(Some(OptionId::Num(42)));
        let id = state.begin_lookup().unwrap();
        let options = [SearchOption::new("42", "Jane Doe")];
        assert!(state.finish_lookup(&id, &options));
        assert_eq!(state.committed().label(), "Jane Doe");
    }

    #[test]
    fn test_late_lookup_does_not_override_user_pick() {
        let mut state = SelectionState::new(Some(OptionId::Num(42)));
        let id = state.begin_lookup().unwrap();
        state.select(&SearchOption::new(7, "John Smith"));

        assert!(!state.finish_lookup(&id, &[SearchOption::new(42, "Jane Doe")]));
        assert_eq!(state.committed().label(), "John Smith");
    }

    #[test]
    fn test_set_same_value_keeps_label() {
        let mut state = SelectionState::default();
        state.select(&SearchOption::new(3, "Joan Baez"));
        state.set_value(Some(OptionId::Text("3".into())));
        assert_eq!(state.committed().label(), "Joan Baez");

        state.set_value(Some(OptionId::Num(4)));
        assert_eq!(state.committed(), &Committed::Unresolved(OptionId::Num(4)));
    }

    #[test]
    fn test_blank_value_is_empty() {
        let state = SelectionState::new(Some(OptionId::Text(String::new())));
        assert!(state.committed().is_empty());
    }
}
