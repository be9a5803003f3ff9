// src/upload.rs

use crate::constants::{MAX_CSV_BYTES, MAX_PDF_BYTES, PDF_MAGIC, UNSUPPORTED_FILE_MESSAGE};
use crate::errors::{AuraError, AuraResult};
use crate::models::CsvUploadResponse;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Csv,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(FileKind::Pdf),
            "csv" => Some(FileKind::Csv),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Pdf => "PDF",
            FileKind::Csv => "CSV",
        }
    }
}

/// A file that passed every client-side check and may be sent out.
#[derive(Debug, Clone)]
pub struct ValidatedFile {
    pub filename: String,
    pub kind: FileKind,
    pub bytes: Vec<u8>,
}

/// Runs the full pre-flight gauntlet: extension allow-list, size ceiling,
/// and for PDFs the magic-byte signature. A rejection is a validation
/// error whose display text is ready for the transcript; no rejected file
/// ever touches the network.
pub fn validate_upload(path: &Path, bytes: Vec<u8>) -> AuraResult<ValidatedFile> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let kind = match FileKind::from_path(path) {
        Some(kind) => kind,
        None => return Err(AuraError::validation(UNSUPPORTED_FILE_MESSAGE)),
    };

    let ceiling = match kind {
        FileKind::Pdf => MAX_PDF_BYTES,
        FileKind::Csv => MAX_CSV_BYTES,
    };
    if bytes.len() as u64 > ceiling {
        return Err(AuraError::validation(format!(
            "{} files must be {} MB or smaller; **{}** is {:.1} MB.",
            kind.label(),
            ceiling / (1024 * 1024),
            filename,
            bytes.len() as f64 / (1024.0 * 1024.0)
        )));
    }

    if kind == FileKind::Pdf && !bytes.starts_with(PDF_MAGIC) {
        return Err(AuraError::validation(format!(
            "**{}** doesn't look like a valid PDF document. It may be corrupted or \
             mislabeled.",
            filename
        )));
    }

    Ok(ValidatedFile {
        filename,
        kind,
        bytes,
    })
}

/// Builds the transcript summary for a successful CSV upload: row/column
/// counts, a column-index table, and a preview table from the sample rows.
pub fn csv_summary_markdown(response: &CsvUploadResponse) -> String {
    let mut out = format!("### 📄 {} uploaded\n\n", response.filename);
    out.push_str(&format!(
        "The dataset contains **{} rows** across **{} columns**.\n\n",
        response.rows,
        response.columns.len()
    ));

    out.push_str("| # | Column |\n|---|--------|\n");
    for (i, column) in response.columns.iter().enumerate() {
        out.push_str(&format!("| {} | {} |\n", i + 1, column));
    }

    if !response.preview.is_empty() {
        out.push_str(&format!(
            "\n**Preview (first {} rows):**\n\n",
            response.preview.len()
        ));

        out.push('|');
        for column in &response.columns {
            out.push_str(&format!(" {} |", column));
        }
        out.push_str("\n|");
        for _ in &response.columns {
            out.push_str("---|");
        }
        out.push('\n');

        for row in &response.preview {
            out.push('|');
            for column in &response.columns {
                let cell = row.get(column).map(render_cell).unwrap_or_default();
                out.push_str(&format!(" {} |", cell));
            }
            out.push('\n');
        }
    }

    out.push_str("\nAsk me anything about this data.");
    out
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
