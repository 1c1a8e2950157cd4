//! Excel import dialog flow
//!
//! Holds at most one picked file, runs the upload through an
//! [`ImportBackend`], and keeps what the dialog shows: the row report, the
//! error line, or both. A failed request that still enumerates row errors
//! is shown as a zero-success report next to the error message.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{FileLimits, ImportProfile};
use crate::error::{ApiError, ApiErrorBody, ConsoleError};
use crate::import::backend::{ImportBackend, ImportFile, RefreshSink};
use crate::import::result::ImportResult;

/// Shown when import is requested before a file is picked
pub const NO_FILE_MESSAGE: &str = "Please select an Excel file.";

/// Shown when a failure carries no usable message
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred during import.";

/// What one `run_import` call ended with
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// Rejected locally; nothing was sent
    Invalid(String),
    Completed(ImportResult),
    Failed {
        message: String,
        partial: Option<ImportResult>,
    },
}

/// Render snapshot of the dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportView {
    pub file_name: Option<String>,
    pub loading: bool,
    pub result: Option<ImportResult>,
    pub error: Option<String>,
}

pub struct ImportOrchestrator {
    backend: Arc<dyn ImportBackend>,
    refresh: Arc<dyn RefreshSink>,
    profile: ImportProfile,
    limits: FileLimits,
    file: Option<ImportFile>,
    loading: bool,
    result: Option<ImportResult>,
    error: Option<String>,
}

impl ImportOrchestrator {
    pub fn new(
        backend: Arc<dyn ImportBackend>,
        refresh: Arc<dyn RefreshSink>,
        profile: ImportProfile,
    ) -> Self {
        Self {
            backend,
            refresh,
            profile,
            limits: FileLimits::default(),
            file: None,
            loading: false,
            result: None,
            error: None,
        }
    }

    pub fn with_limits(mut self, limits: FileLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn profile(&self) -> &ImportProfile {
        &self.profile
    }

    /// Pick a file. Clears any previous report and error. A file that fails
    /// the extension or size check is not kept; the previous pick stays.
    pub fn select_file(&mut self, file: ImportFile) -> Result<(), ConsoleError> {
        self.result = None;
        self.error = None;

        if let Err(message) = self.check_file(&file) {
            tracing::info!(file = %file.name, reason = %message, "Rejected import file");
            self.error = Some(message.clone());
            return Err(ConsoleError::Validation(message));
        }

        self.file = Some(file);
        Ok(())
    }

    fn check_file(&self, file: &ImportFile) -> Result<(), String> {
        let accepted = file
            .extension()
            .is_some_and(|ext| self.limits.extensions.iter().any(|allowed| *allowed == ext));
        if !accepted {
            return Err(format!(
                "Unsupported file '{}': expected {}",
                file.name,
                self.limits
                    .extensions
                    .iter()
                    .map(|ext| format!(".{ext}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        if file.size() > self.limits.max_bytes {
            return Err(format!(
                "File '{}' is {} bytes; the limit is {} bytes",
                file.name,
                file.size(),
                self.limits.max_bytes
            ));
        }
        Ok(())
    }

    pub fn can_import(&self) -> bool {
        self.file.is_some() && !self.loading
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Upload the picked file
    pub async fn run_import(&mut self) -> ImportOutcome {
        let Some(file) = self.file.clone() else {
            self.error = Some(NO_FILE_MESSAGE.to_string());
            return ImportOutcome::Invalid(NO_FILE_MESSAGE.to_string());
        };

        self.loading = true;
        self.error = None;
        self.result = None;

        let outcome = match self.backend.import(&file).await {
            Ok(result) => {
                tracing::info!(
                    file = %file.name,
                    success_count = result.success_count,
                    errors = result.errors.len(),
                    "Import completed"
                );
                if result.success_count > 0 {
                    self.refresh.refresh();
                }
                self.result = Some(result.clone());
                ImportOutcome::Completed(result)
            }
            Err(e) => {
                tracing::warn!(file = %file.name, error = %e, "Import failed");
                let message = failure_message(&e);
                let partial = e
                    .body()
                    .and_then(|body| body.errors.clone())
                    .map(ImportResult::failed);
                self.error = Some(message.clone());
                self.result = partial.clone();
                ImportOutcome::Failed { message, partial }
            }
        };

        self.loading = false;
        outcome
    }

    /// Save the template as `<dir>/<template_file_name>`. Failures are
    /// logged and yield `None`.
    pub async fn download_template(&self, dir: impl AsRef<Path>) -> Option<PathBuf> {
        let bytes = match self.backend.download_template().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "Failed to download template");
                return None;
            }
        };

        let path = dir.as_ref().join(&self.profile.template_file_name);
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            tracing::error!(error = %e, path = %path.display(), "Failed to save template");
            return None;
        }
        tracing::info!(path = %path.display(), bytes = bytes.len(), "Template saved");
        Some(path)
    }

    /// Forget the file and any report, as when the dialog closes
    pub fn reset(&mut self) {
        self.file = None;
        self.loading = false;
        self.result = None;
        self.error = None;
    }

    pub fn view(&self) -> ImportView {
        ImportView {
            file_name: self.file.as_ref().map(|f| f.name.clone()),
            loading: self.loading,
            result: self.result.clone(),
            error: self.error.clone(),
        }
    }
}

fn failure_message(error: &ApiError) -> String {
    error
        .body()
        .and_then(ApiErrorBody::display_message)
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl ImportBackend for Unreachable {
        async fn import(&self, _file: &ImportFile) -> Result<ImportResult, ApiError> {
            Err(ApiError::Transport("connection refused".into()))
        }

        async fn download_template(&self) -> Result<Vec<u8>, ApiError> {
            Err(ApiError::Transport("connection refused".into()))
        }
    }

    fn orchestrator() -> ImportOrchestrator {
        ImportOrchestrator::new(
            Arc::new(Unreachable),
            Arc::new(|| {}),
            ImportProfile::builtin(crate::api::ImportTarget::Expenses),
        )
    }

    #[test]
    fn test_rejects_wrong_extension() {
        let mut orch = orchestrator();
        orch.select_file(ImportFile::new("ok.xlsx", vec![0; 4])).unwrap();

        let err = orch.select_file(ImportFile::new("notes.csv", vec![0; 4]));
        assert!(matches!(err, Err(ConsoleError::Validation(_))));
        // Previous pick survives
        assert_eq!(orch.view().file_name.as_deref(), Some("ok.xlsx"));
        assert!(orch.view().error.is_some());
    }

    #[test]
    fn test_rejects_oversized_file() {
        let mut orch = orchestrator().with_limits(FileLimits {
            max_bytes: 2,
            extensions: vec!["xlsx".into()],
        });
        assert!(orch.select_file(ImportFile::new("big.xlsx", vec![0; 3])).is_err());
        assert!(!orch.can_import());
    }

    #[tokio::test]
    async fn test_transport_failure_uses_generic_message() {
        let mut orch = orchestrator();
        orch.select_file(ImportFile::new("depenses.xlsx", vec![1])).unwrap();

        let outcome = orch.run_import().await;
        assert_eq!(
            outcome,
            ImportOutcome::Failed {
                message: GENERIC_FAILURE_MESSAGE.to_string(),
                partial: None
            }
        );
        assert!(!orch.is_loading());
        assert!(orch.view().result.is_none());
    }

    #[tokio::test]
    async fn test_template_failure_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(orchestrator().download_template(dir.path()).await.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut orch = orchestrator();
        orch.select_file(ImportFile::new("a.xlsx", vec![])).unwrap();
        orch.reset();
        assert_eq!(orch.view(), ImportView::default());
    }
}
