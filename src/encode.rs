use crate::error::{ChartError, ChartResult};
use crate::graph::RenderedImage;
use base64::Engine as _;

const BASE64_MARKER: &str = ";base64,";

/// `data:<mime>;base64,<payload>` for an encoded image.
pub fn to_data_uri(image: &RenderedImage) -> ChartResult<String> {
    if image.bytes.is_empty() {
        return Err(ChartError::encoding("rendered image is empty"));
    }
    let payload = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
    Ok(format!(
        "data:{}{}{}",
        image.format.mime_type(),
        BASE64_MARKER,
        payload
    ))
}

/// Split a base64 data URI back into its MIME type and raw bytes.
pub fn decode_data_uri(uri: &str) -> ChartResult<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ChartError::encoding("data URI must start with 'data:'"))?;
    let (mime, payload) = rest
        .split_once(BASE64_MARKER)
        .ok_or_else(|| ChartError::encoding("data URI is not base64 encoded"))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| ChartError::encoding(format!("invalid base64 payload: {}", e)))?;
    Ok((mime.to_string(), bytes))
}
