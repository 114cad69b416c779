//! Uniform response handling and error classification.
//!
//! Every endpoint except the export download funnels its response through
//! [`handle_response`]: 2xx bodies are decoded into the caller's type, any
//! other status becomes [`ApiError::Http`] with the server's `error` message
//! or [`UNKNOWN_ERROR`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::download::Download;
use crate::error::{ApiError, DOWNLOAD_FAILED, UNKNOWN_ERROR};
use crate::http::{HttpResponse, CONTENT_TYPE};

/// Decode a 2xx body as `T`, or classify the failure.
///
/// Use `T = serde_json::Value` to get the body back structurally unchanged.
pub fn handle_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    if !response.is_success() {
        return Err(classify_failure(&response));
    }
    serde_json::from_slice(strip_bom(&response.body))
        .map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Accept a 2xx export as a [`Download`]; any other status fails with
/// [`DOWNLOAD_FAILED`] without looking at the body.
pub fn handle_download(response: HttpResponse) -> Result<Download, ApiError> {
    if !response.is_success() {
        tracing::debug!(status = response.status, "download failed");
        return Err(ApiError::http(response.status, DOWNLOAD_FAILED));
    }
    let content_type = response.header(CONTENT_TYPE).map(str::to_string);
    Ok(Download::new(response.body, content_type))
}

fn classify_failure(response: &HttpResponse) -> ApiError {
    let envelope = serde_json::from_slice::<Value>(strip_bom(&response.body))
        .unwrap_or_else(|_| serde_json::json!({ "error": UNKNOWN_ERROR }));
    let message = error_message(&envelope).unwrap_or_else(|| UNKNOWN_ERROR.to_string());
    tracing::debug!(status = response.status, %message, "request failed");
    ApiError::Http {
        status: response.status,
        message,
    }
}

/// UTF-8 text decoders drop a leading byte-order mark; `serde_json` does not.
fn strip_bom(body: &[u8]) -> &[u8] {
    body.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(body)
}

/// The `error` field of a failure envelope, if it holds anything usable.
///
/// Empty strings, `null`, `false` and `0` count as absent. Other non-string
/// values are rendered as JSON text, so `{"error": {}}` reads `{}` and
/// `{"error": ["a", "b"]}` reads `["a","b"]`. This differs from JavaScript
/// `String()` coercion, which gives `[object Object]` and `a,b`.
fn error_message(envelope: &Value) -> Option<String> {
    match envelope.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
