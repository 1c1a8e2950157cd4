//! REST resources with Excel import/export
//!
//! Every importable resource follows the same layout under its base path:
//! `import_excel/` (multipart POST), `download_template/` and, for finance
//! resources, `export_excel/` with the list filter as query string.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::client::ApiClient;
use crate::error::ApiError;
use crate::filters::ListFilter;
use crate::import::{ImportBackend, ImportFile, ImportResult};
use crate::models::{OutstandingBalance, Paginated};

/// Resource a bulk import targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportTarget {
    Students,
    TuitionPayments,
    Salaries,
    Expenses,
}

impl ImportTarget {
    pub const ALL: [ImportTarget; 4] = [
        ImportTarget::Students,
        ImportTarget::TuitionPayments,
        ImportTarget::Salaries,
        ImportTarget::Expenses,
    ];

    pub fn base_path(self) -> &'static str {
        match self {
            ImportTarget::Students => "students/",
            ImportTarget::TuitionPayments => "finance/tuition-payments/",
            ImportTarget::Salaries => "finance/salaries/",
            ImportTarget::Expenses => "finance/expenses/",
        }
    }

    pub fn import_path(self) -> String {
        format!("{}import_excel/", self.base_path())
    }

    pub fn template_path(self) -> String {
        format!("{}download_template/", self.base_path())
    }

    /// Only finance resources offer a filtered export
    pub fn export_path(self) -> Option<String> {
        match self {
            ImportTarget::Students => None,
            _ => Some(format!("{}export_excel/", self.base_path())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImportTarget::Students => "students",
            ImportTarget::TuitionPayments => "tuition_payments",
            ImportTarget::Salaries => "salaries",
            ImportTarget::Expenses => "expenses",
        }
    }
}

impl fmt::Display for ImportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "students" => Ok(ImportTarget::Students),
            "tuition_payments" | "payments" => Ok(ImportTarget::TuitionPayments),
            "salaries" => Ok(ImportTarget::Salaries),
            "expenses" => Ok(ImportTarget::Expenses),
            other => Err(format!(
                "unknown target '{other}' (expected students, tuition_payments, salaries or expenses)"
            )),
        }
    }
}

/// One importable resource on the backend
#[derive(Clone)]
pub struct ResourceBackend {
    client: Arc<ApiClient>,
    target: ImportTarget,
}

impl ResourceBackend {
    pub fn new(client: Arc<ApiClient>, target: ImportTarget) -> Self {
        Self { client, target }
    }

    pub fn target(&self) -> ImportTarget {
        self.target
    }

    /// Spreadsheet export of the filtered list
    pub async fn export(&self, filter: &ListFilter) -> Result<Vec<u8>, ApiError> {
        let path = self.target.export_path().ok_or_else(|| {
            ApiError::InvalidUrl(format!("{} has no export endpoint", self.target))
        })?;
        self.client.get_bytes(&path, &filter.to_query_params()).await
    }

    /// One page of the filtered list
    pub async fn list<T: DeserializeOwned>(
        &self,
        filter: &ListFilter,
    ) -> Result<Paginated<T>, ApiError> {
        self.client
            .get_json(self.target.base_path(), &filter.to_query_params())
            .await
    }
}

#[async_trait]
impl ImportBackend for ResourceBackend {
    async fn import(&self, file: &ImportFile) -> Result<ImportResult, ApiError> {
        self.client.post_file(&self.target.import_path(), file).await
    }

    async fn download_template(&self) -> Result<Vec<u8>, ApiError> {
        self.client.get_bytes(&self.target.template_path(), &[]).await
    }
}

/// Path of the recovery (outstanding balances) list
pub const OUTSTANDING_BALANCES_PATH: &str = "finance/student-balances/outstanding/";

/// Students with an unpaid balance
pub async fn outstanding_balances(
    client: &ApiClient,
    filter: &ListFilter,
) -> Result<Paginated<OutstandingBalance>, ApiError> {
    client
        .get_json(OUTSTANDING_BALANCES_PATH, &filter.to_query_params())
        .await
}
