// src/models.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /generate-response/`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub query: String,
    pub kb_flag: bool,
}

/// Answer to a chat query. `visualization` carries zero or more base64
/// data URLs joined by the separator token; absent for plain answers.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    #[serde(default)]
    pub visualization: Option<String>,
}

/// Answer to `POST /upload-csv/`.
#[derive(Debug, Clone, Deserialize)]
pub struct CsvUploadResponse {
    pub file_id: String,
    pub filename: String,
    pub rows: u64,
    pub columns: Vec<String>,
    /// First few rows of the file, one object per row keyed by column name.
    #[serde(default)]
    pub preview: Vec<serde_json::Map<String, Value>>,
}

/// Answer to `POST /upload-pdf/` and `POST /delete-all-files/`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendMessage {
    pub message: String,
}
