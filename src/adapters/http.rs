//! Response classification shared by the Google API adapters
//!
//! Every non-success response and every transport failure is turned into an
//! [`ApiError`] here, so nothing past the adapter layer sees `reqwest` types.

use crate::domain::errors::{ApiError, ErrorClass};
use reqwest::Response;
use serde_json::Value;
use url::Url;

/// Google error reasons that mean "slow down", even when sent with a 403
const RATE_LIMIT_REASONS: &[&str] = &["rateLimitExceeded", "userRateLimitExceeded", "quotaExceeded"];

/// Passes a successful response through, classifies anything else
pub async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify(status.as_u16(), &body))
}

/// Classifies a failed response from its status and body
pub fn classify(status: u16, body: &str) -> ApiError {
    let (message, reasons) = parse_error_body(body);
    let message = message.unwrap_or_else(|| format!("HTTP {status}"));
    let err = ApiError::from_status(status, message);

    if status == 403 && reasons.iter().any(|r| RATE_LIMIT_REASONS.contains(&r.as_str())) {
        return err.with_class(ErrorClass::RateLimited);
    }
    err
}

/// Classifies a transport-level failure
pub fn transport(err: reqwest::Error) -> ApiError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        return ApiError::transport(err.to_string());
    }
    if err.is_decode() || err.is_body() {
        // A truncated body is a dropped connection as far as retry is concerned
        return ApiError::transport(format!("failed to read response: {err}"));
    }
    ApiError::fatal(err.to_string())
}

/// Appends path segments to a base URL, percent-encoding each one
pub fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url =
        Url::parse(base).map_err(|e| ApiError::fatal(format!("invalid endpoint {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::fatal(format!("endpoint {base} cannot take a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Decodes a JSON response body
pub async fn json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(transport)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::fatal(format!("unexpected response body: {e}")))
}

/// Extracts the message and reasons of a Google or OAuth error body
///
/// Handles `{"error": {"message": .., "errors": [{"reason": ..}]}}` and the
/// token endpoint's `{"error": "invalid_grant", "error_description": ..}`.
fn parse_error_body(body: &str) -> (Option<String>, Vec<String>) {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        let trimmed = body.trim();
        return ((!trimmed.is_empty()).then(|| trimmed.to_string()), Vec::new());
    };

    match value.get("error") {
        Some(Value::Object(error)) => {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string);
            let reasons = error
                .get("errors")
                .and_then(Value::as_array)
                .map(|errors| {
                    errors
                        .iter()
                        .filter_map(|e| e.get("reason").and_then(Value::as_str))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            (message, reasons)
        }
        Some(Value::String(code)) => {
            let description = value
                .get("error_description")
                .and_then(Value::as_str)
                .map(|d| format!("{code}: {d}"))
                .unwrap_or_else(|| code.clone());
            (Some(description), vec![code.clone()])
        }
        _ => (None, Vec::new()),
    }
}
