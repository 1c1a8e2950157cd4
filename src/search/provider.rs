//! Remote option provider abstraction
//!
//! The dropdown never talks to the backend directly; it asks an
//! `OptionProvider`. [`crate::api::RemoteOptionSource`] is the REST
//! implementation, [`StaticOptions`] serves fixed lists.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::search::option::SearchOption;

/// Source of options for a query.
///
/// "No results" is `Ok(vec![])`; `Err` is a transport or backend failure,
/// which the controller logs and degrades to an empty list.
#[async_trait]
pub trait OptionProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchOption>, ApiError>;
}

/// Provider over a fixed list, filtered by case-insensitive substring on
/// label and sub-label.
#[derive(Debug, Clone, Default)]
pub struct StaticOptions {
    options: Vec<SearchOption>,
}

impl StaticOptions {
    pub fn new(options: Vec<SearchOption>) -> Self {
        Self { options }
    }
}

#[async_trait]
impl OptionProvider for StaticOptions {
    async fn search(&self, query: &str) -> Result<Vec<SearchOption>, ApiError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(self.options.clone());
        }
        Ok(self
            .options
            .iter()
            .filter(|option| {
                option.label.to_lowercase().contains(&needle)
                    || option
                        .sub_label
                        .as_deref()
                        .is_some_and(|sub| sub.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }
}
