//! Campus Console - headless core of the university admin console
//!
//! The console's views are thin; the two pieces with real behaviour live
//! here so any renderer (egui, a TUI, a web shell) can drive them:
//!
//! - [`search::SearchableSelect`]: a debounced remote-search dropdown that
//!   keeps a committed `{id, label}` selection in sync with a REST backend.
//! - [`import::ImportOrchestrator`]: the Excel import / template download
//!   flow shared by the student and finance screens.
//!
//! # Architecture
//!
//! ```text
//! UI events ──► SearchableSelect ──► SearchController ──(300ms)──► OptionProvider
//!                     │                     ▲                          │
//!                     ▼                     └──── options (seq-tagged) ┘
//!               SelectionState
//!
//! UI events ──► ImportOrchestrator ──► ImportBackend (REST) ──► RefreshSink
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use campus_console::{ConsoleConfig, api::{ApiClient, RemoteOptionSource}};
//!
//! let config = ConsoleConfig::load()?;
//! let client = Arc::new(ApiClient::new(&config.api)?);
//! let students = RemoteOptionSource::new(client.clone(), config.source("students")?.clone());
//!
//! let mut select = SearchableSelect::mount(Arc::new(students), config.search.settings(), None);
//! select.click(PointerTarget::Trigger);
//! select.type_query("jane");
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod import;
pub mod models;
pub mod search;
pub mod telemetry;

// Re-export main types
pub use config::{ConsoleConfig, ImportConfig, SearchConfig};
pub use error::{ApiError, ApiErrorBody, ConfigError, ConsoleError};
pub use filters::{Filterable, FilteredList, ListFilter};
pub use import::{
    ImportBackend, ImportFile, ImportOrchestrator, ImportOutcome, ImportResult, RefreshSink,
    ResultTone,
};
pub use search::{
    OptionId, OptionProvider, PointerTarget, SearchController, SearchOption, SearchSettings,
    SearchableSelect, SelectEvent, Selection,
};
