//! Collaborators of the import flow

use std::path::Path;

use async_trait::async_trait;

use crate::error::{ApiError, ConsoleError};
use crate::import::result::ImportResult;

/// MIME type sent with uploaded spreadsheets
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A file picked for upload
#[derive(Debug, Clone, PartialEq)]
pub struct ImportFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImportFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, keeping only its file name
    pub async fn read(path: impl AsRef<Path>) -> Result<Self, ConsoleError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }

    /// Lower-case extension without the dot
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Backend operations behind one import dialog.
///
/// `import` may fail with [`ApiError::Status`] whose body carries both a
/// message and a partial `errors` list.
#[async_trait]
pub trait ImportBackend: Send + Sync {
    async fn import(&self, file: &ImportFile) -> Result<ImportResult, ApiError>;

    /// Spreadsheet template bytes
    async fn download_template(&self) -> Result<Vec<u8>, ApiError>;
}

/// Told when backing data changed and lists should be reloaded
pub trait RefreshSink: Send + Sync {
    fn refresh(&self);
}

impl<F> RefreshSink for F
where
    F: Fn() + Send + Sync,
{
    fn refresh(&self) {
        self()
    }
}
