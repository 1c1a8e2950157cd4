//! REST-backed option provider
//!
//! Queries a list endpoint with `?<search_param>=<query>` and turns each
//! record into a [`SearchOption`] using the configured id field and display
//! templates (`"{first_name} {last_name}"`).

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::api::client::ApiClient;
use crate::config::OptionSourceConfig;
use crate::error::ApiError;
use crate::search::{OptionId, OptionProvider, SearchOption};

pub struct RemoteOptionSource {
    client: Arc<ApiClient>,
    config: OptionSourceConfig,
}

impl RemoteOptionSource {
    pub fn new(client: Arc<ApiClient>, config: OptionSourceConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl OptionProvider for RemoteOptionSource {
    async fn search(&self, query: &str) -> Result<Vec<SearchOption>, ApiError> {
        let mut params = Vec::new();
        let query = query.trim();
        if !query.is_empty() {
            params.push((self.config.search_param.clone(), query.to_string()));
        }
        let payload: Value = self.client.get_json(&self.config.path, &params).await?;
        Ok(options_from_payload(&payload, &self.config))
    }
}

/// Records of a list response: a bare array or a paginated `{results: [...]}`
fn records(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => match map.get("results") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    }
}

pub(crate) fn options_from_payload(
    payload: &Value,
    config: &OptionSourceConfig,
) -> Vec<SearchOption> {
    records(payload)
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|record| {
            let id = match record.get(&config.id_field) {
                Some(Value::Number(n)) => n.as_i64().map(OptionId::Num),
                Some(Value::String(s)) if !s.is_empty() => Some(OptionId::Text(s.clone())),
                _ => None,
            };
            let Some(id) = id else {
                tracing::debug!(field = %config.id_field, "Skipping record without usable id");
                return None;
            };
            let label = render_template(&config.label_template, record);
            let sub_label = config
                .sub_label_template
                .as_deref()
                .map(|template| render_template(template, record))
                .filter(|sub| !sub.is_empty());
            Some(SearchOption {
                label: if label.is_empty() { id.to_string() } else { label },
                id,
                sub_label,
            })
        })
        .collect()
}

/// Replace `{field}` placeholders with record values. Missing or null
/// fields render as nothing; runs of whitespace left behind are collapsed.
pub fn render_template(template: &str, record: &Map<String, Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let field = after[..end].trim();
                match record.get(field) {
                    Some(Value::String(s)) => out.push_str(s),
                    Some(Value::Null) | None => {}
                    Some(other) => out.push_str(&other.to_string()),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
