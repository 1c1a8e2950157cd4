//! Bulk import report

use serde::{Deserialize, Serialize};

/// Outcome of one import attempt as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    pub success_count: u64,
    /// Row-level problems
    #[serde(default)]
    pub errors: Vec<String>,
}

/// How a result is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTone {
    /// Every row went through (green)
    Success,
    /// Some rows were rejected (orange)
    Partial,
}

impl ImportResult {
    pub fn new(success_count: u64, errors: Vec<String>) -> Self {
        Self {
            success_count,
            errors,
        }
    }

    /// Partial result recovered from a failed request
    pub fn failed(errors: Vec<String>) -> Self {
        Self::new(0, errors)
    }

    pub fn tone(&self) -> ResultTone {
        if self.errors.is_empty() {
            ResultTone::Success
        } else {
            ResultTone::Partial
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone() {
        assert_eq!(ImportResult::new(3, vec![]).tone(), ResultTone::Success);
        assert_eq!(
            ImportResult::new(3, vec!["row 5: invalid date".into()]).tone(),
            ResultTone::Partial
        );
    }

    #[test]
    fn test_deserialize_without_errors() {
        let result: ImportResult = serde_json::from_str(r#"{"success_count": 12}"#).unwrap();
        assert_eq!(result, ImportResult::new(12, vec![]));
    }
}
