//! Selectable search results

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque option identity.
///
/// Backends hand out ids as JSON numbers or strings depending on the
/// endpoint, so equality is checked both natively and on the string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionId {
    Num(i64),
    Text(String),
}

impl OptionId {
    /// Native equality, or equality of the string forms
    pub fn matches(&self, other: &OptionId) -> bool {
        self == other || self.to_string() == other.to_string()
    }

    /// Empty text ids stand for "no value"
    pub fn is_blank(&self) -> bool {
        matches!(self, OptionId::Text(text) if text.trim().is_empty())
    }

    /// Parse user input: integers become `Num`, anything else `Text`
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        trimmed
            .parse::<i64>()
            .map(OptionId::Num)
            .unwrap_or_else(|_| OptionId::Text(trimmed.to_string()))
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionId::Num(n) => write!(f, "{n}"),
            OptionId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for OptionId {
    fn from(value: i64) -> Self {
        OptionId::Num(value)
    }
}

impl From<i32> for OptionId {
    fn from(value: i32) -> Self {
        OptionId::Num(i64::from(value))
    }
}

impl From<&str> for OptionId {
    fn from(value: &str) -> Self {
        OptionId::Text(value.to_string())
    }
}

impl From<String> for OptionId {
    fn from(value: String) -> Self {
        OptionId::Text(value)
    }
}

/// A single remote-search result. Identity is `id`; the labels are display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOption {
    pub id: OptionId,
    pub label: String,
    #[serde(default, rename = "subLabel", skip_serializing_if = "Option::is_none")]
    pub sub_label: Option<String>,
}

impl SearchOption {
    pub fn new(id: impl Into<OptionId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            sub_label: None,
        }
    }

    pub fn with_sub_label(mut self, sub_label: impl Into<String>) -> Self {
        self.sub_label = Some(sub_label.into());
        self
    }
}

/// Drop repeated ids, keeping the first occurrence.
///
/// Returns how many entries were removed.
pub(crate) fn dedupe_by_id(options: &mut Vec<SearchOption>) -> usize {
    let before = options.len();
    let mut seen = HashSet::with_capacity(before);
    options.retain(|option| seen.insert(option.id.to_string()));
    before - options.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_across_representations() {
        assert!(OptionId::Num(42).matches(&OptionId::Text("42".into())));
        assert!(OptionId::Text("42".into()).matches(&OptionId::Num(42)));
        assert!(!OptionId::Num(42).matches(&OptionId::Num(43)));
    }

    #[test]
    fn test_parse() {
        assert_eq!(OptionId::parse(" 17 "), OptionId::Num(17));
        assert_eq!(OptionId::parse("MAT-001"), OptionId::Text("MAT-001".into()));
        assert!(OptionId::parse("").is_blank());
    }

    #[test]
    fn test_deserialize_mixed_ids() {
        let options: Vec<SearchOption> = serde_json::from_str(
            r#"[{"id": 1, "label": "A"}, {"id": "b", "label": "B", "subLabel": "x"}]"#,
        )
        .unwrap();
        assert_eq!(options[0].id, OptionId::Num(1));
        assert_eq!(options[1].sub_label.as_deref(), Some("x"));
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let mut options = vec![
            SearchOption::new(1, "first"),
            SearchOption::new("1", "duplicate"),
            SearchOption::new(2, "second"),
        ];
        assert_eq!(dedupe_by_id(&mut options), 1);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "first");
    }
}
