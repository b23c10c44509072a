//! `data:<mime>;base64,<payload>` transport format.

use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};

use crate::errors::PipelineError;

pub const IMAGE_PREFIX: &str = "data:image/";

pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, Base64.encode(bytes))
}

/// Returns the MIME type and decoded bytes.
pub fn decode(uri: &str) -> Result<(String, Vec<u8>), PipelineError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| PipelineError::InvalidDataUri("missing data: scheme".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| PipelineError::InvalidDataUri("missing payload separator".into()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| PipelineError::InvalidDataUri("payload is not base64".into()))?;
    if mime.is_empty() {
        return Err(PipelineError::InvalidDataUri("empty media type".into()));
    }
    let bytes = Base64
        .decode(payload.trim())
        .map_err(|err| PipelineError::InvalidDataUri(err.to_string()))?;
    Ok((mime.to_ascii_lowercase(), bytes))
}

/// File extension for an image MIME type.
pub fn extension_for(mime: &str) -> &str {
    match mime {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/svg+xml" => "svg",
        other => other
            .strip_prefix("image/")
            .filter(|s| !s.is_empty())
            .unwrap_or("bin"),
    }
}
