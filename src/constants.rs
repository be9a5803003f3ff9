// Backend routes
pub const GENERATE_RESPONSE_PATH: &str = "/generate-response/";
pub const UPLOAD_PDF_PATH: &str = "/upload-pdf/";
pub const UPLOAD_CSV_PATH: &str = "/upload-csv/";
pub const DELETE_ALL_FILES_PATH: &str = "/delete-all-files/";

/// Token the backend uses to join multiple images into one payload.
pub const VISUALIZATION_SEPARATOR: &str = "||VISUALIZATION_SEPARATOR||";

// Upload ceilings, checked before any request goes out
pub const MAX_PDF_BYTES: u64 = 5 * 1024 * 1024;
pub const MAX_CSV_BYTES: u64 = 10 * 1024 * 1024;

/// Every well-formed PDF starts with this signature.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

pub const UNSUPPORTED_FILE_MESSAGE: &str =
    "Only PDF and CSV files are supported for analysis.";

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
