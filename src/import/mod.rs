//! Generic Excel import / template download flow

pub mod backend;
pub mod orchestrator;
pub mod result;

pub use backend::{ImportBackend, ImportFile, RefreshSink, XLSX_MIME};
pub use orchestrator::{
    ImportOrchestrator, ImportOutcome, ImportView, GENERIC_FAILURE_MESSAGE, NO_FILE_MESSAGE,
};
pub use result::{ImportResult, ResultTone};
