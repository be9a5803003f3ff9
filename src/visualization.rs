// src/visualization.rs
//
// Charts arrive as base64 data URLs. A terminal can't draw them inline, so
// an openable entry decodes the payload to a temp image and hands it to
// the system viewer.

use crate::errors::{AuraError, AuraResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::io::Write;
use std::path::PathBuf;

/// Extracts the raw image bytes from a `data:image/...;base64,` URL.
pub fn decode_data_url(data_url: &str) -> AuraResult<Vec<u8>> {
    let payload = match data_url.split_once(";base64,") {
        Some((header, payload)) if header.starts_with("data:") => payload,
        _ => {
            return Err(AuraError::parse(
                "visualization payload is not a base64 data URL",
            ))
        }
    };

    STANDARD
        .decode(payload.trim())
        .map_err(|e| AuraError::parse(format!("invalid base64 image data: {}", e)))
}

/// Writes the image to a temp file and opens it with the default viewer.
/// The file is kept on disk so the viewer can outlive this call.
pub fn open_visualization(data_url: &str) -> AuraResult<PathBuf> {
    let bytes = decode_data_url(data_url)?;

    let mut file = tempfile::Builder::new()
        .prefix("aura-viz-")
        .suffix(".png")
        .tempfile()?;
    file.write_all(&bytes)?;
    let (_, path) = file.keep().map_err(|e| AuraError::Io(e.error))?;

    open::that(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data_url() {
        // "hi" in base64
        let bytes = decode_data_url("data:image/png;base64,aGk=").unwrap();
        assert_eq!(bytes, b"hi");
    }

    #[test]
    fn test_decode_rejects_non_data_url() {
        assert!(decode_data_url("https://example.com/chart.png").is_err());
        assert!(decode_data_url("data:image/png;base64,!!!not-base64!!!").is_err());
    }
}
