//! API client for backend communication

use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiErrorBody, ConsoleError};
use crate::import::{ImportFile, XLSX_MIME};

/// Query parameters as sent on the wire
pub type QueryParams = Vec<(String, String)>;

#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ConsoleError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ApiError::from)?;
        Ok(Self {
            base_url: parse_base(&config.base_url)?,
            http,
            token: config.token(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a path against the base URL. Leading slashes are ignored so
    /// that paths always stay under the base.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|_| ApiError::InvalidUrl(path.to_string()))
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        tracing::debug!(url = %url, "GET");
        let response = self.authorize(self.http.get(url).query(query)).send().await?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn get_bytes(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(path)?;
        tracing::debug!(url = %url, "GET (binary)");
        let response = self.authorize(self.http.get(url).query(query)).send().await?;
        let response = check_status(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// POST a spreadsheet as multipart field `file`
    pub async fn post_file<T: DeserializeOwned>(
        &self,
        path: &str,
        file: &ImportFile,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(XLSX_MIME)?;
        let form = Form::new().part("file", part);

        tracing::debug!(url = %url, file = %file.name, bytes = file.bytes.len(), "POST (multipart)");
        let response = self.authorize(self.http.post(url).multipart(form)).send().await?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn parse_base(raw: &str) -> Result<Url, ApiError> {
    // Url::join drops the last segment unless the base ends with '/'
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized).map_err(|_| ApiError::InvalidUrl(raw.to_string()))
}

/// Turn a non-2xx response into [`ApiError::Status`], keeping whatever
/// structured body the server sent.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ApiErrorBody>(&text).unwrap_or_else(|_| ApiErrorBody {
        message: (!text.trim().is_empty()).then(|| text.trim().to_string()),
        ..ApiErrorBody::default()
    });
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}
