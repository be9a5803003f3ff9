use crate::{
    config::get_config,
    constants::{
        DELETE_ALL_FILES_PATH, GENERATE_RESPONSE_PATH, UPLOAD_CSV_PATH, UPLOAD_PDF_PATH,
    },
    errors::{AuraError, AuraResult},
    models::{BackendMessage, CsvUploadResponse, QueryRequest, QueryResponse},
    transport::send_with_fallback,
    upload::FileKind,
};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

/// Thin client over the inference backend. Cheap to clone; all calls go
/// through the shared transport fallback policy.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config() -> Self {
        let config = get_config();
        Self::new(
            config.backend_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a chat query. A body that is not valid JSON is tolerated by
    /// falling back to the raw text, so a misbehaving deployment still
    /// produces a readable answer.
    pub async fn generate_response(&self, query: &str, kb_flag: bool) -> AuraResult<QueryResponse> {
        let payload = QueryRequest {
            query: query.to_string(),
            kb_flag,
        };

        let url = self.url(GENERATE_RESPONSE_PATH);
        let response = send_with_fallback(GENERATE_RESPONSE_PATH, |_| {
            self.http.post(&url).json(&payload)
        })
        .await?;

        let raw = response
            .text()
            .await
            .map_err(|e| AuraError::parse(format!("failed to read response body: {}", e)))?;

        match serde_json::from_str::<QueryResponse>(&raw) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !raw.trim().is_empty() => Ok(QueryResponse {
                response: raw,
                visualization: None,
            }),
            Err(e) => Err(AuraError::parse(e.to_string())),
        }
    }

    pub async fn upload_pdf(&self, filename: &str, bytes: Vec<u8>) -> AuraResult<BackendMessage> {
        let url = self.url(UPLOAD_PDF_PATH);
        let response = send_with_fallback(UPLOAD_PDF_PATH, |_| {
            self.http
                .post(&url)
                .multipart(file_form(filename, FileKind::Pdf, bytes.clone()))
        })
        .await?;

        response
            .json::<BackendMessage>()
            .await
            .map_err(|e| AuraError::parse(e.to_string()))
    }

    pub async fn upload_csv(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> AuraResult<CsvUploadResponse> {
        let url = self.url(UPLOAD_CSV_PATH);
        let response = send_with_fallback(UPLOAD_CSV_PATH, |_| {
            self.http
                .post(&url)
                .multipart(file_form(filename, FileKind::Csv, bytes.clone()))
        })
        .await?;

        response
            .json::<CsvUploadResponse>()
            .await
            .map_err(|e| AuraError::parse(e.to_string()))
    }

    pub async fn delete_all_files(&self) -> AuraResult<BackendMessage> {
        let url = self.url(DELETE_ALL_FILES_PATH);
        let response =
            send_with_fallback(DELETE_ALL_FILES_PATH, |_| self.http.post(&url)).await?;

        response
            .json::<BackendMessage>()
            .await
            .map_err(|e| AuraError::parse(e.to_string()))
    }
}

/// Multipart forms are consumed on send, so each fallback attempt builds a
/// fresh one from the same bytes.
fn file_form(filename: &str, kind: FileKind, bytes: Vec<u8>) -> Form {
    let mime = match kind {
        FileKind::Pdf => "application/pdf",
        FileKind::Csv => "text/csv",
    };
    let part = Part::bytes(bytes)
        .file_name(filename.to_string())
        .mime_str(mime)
        .unwrap_or_else(|_| Part::bytes(Vec::new()));
    Form::new().part("file", part)
}
