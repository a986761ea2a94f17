//! Helpers shared by the clients for external services (match API, auth, payments).

use reqwest::Response;
use serde_json::Value;

/// Drains a failed response into `(status, message)`.
pub async fn failure(response: Response) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    (status, error_message(&body))
}

/// Pulls a human-readable message out of the error bodies the upstreams use:
/// `{"detail": ...}`, `{"message": ...}`, `{"error": "..."}` or
/// `{"error": {"message": ...}}`. Falls back to the raw body.
pub fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    let candidates = [
        value.get("detail"),
        value.get("message"),
        value.get("error").and_then(|e| e.get("message")),
        value.get("error"),
    ];

    let message = candidates
        .into_iter()
        .flatten()
        .find_map(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string());
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_message() {
        assert_eq!(error_message(r#"{"detail": "File too large"}"#), "File too large");
    }

    #[test]
    fn test_nested_error_message() {
        assert_eq!(
            error_message(r#"{"error": {"type": "invalid_request_error", "message": "No such price"}}"#),
            "No such price"
        );
    }

    #[test]
    fn test_flat_error_string() {
        assert_eq!(error_message(r#"{"error": "invalid credentials"}"#), "invalid credentials");
    }

    #[test]
    fn test_detail_wins_over_error() {
        assert_eq!(
            error_message(r#"{"error": "generic", "detail": "specific"}"#),
            "specific"
        );
    }

    #[test]
    fn test_non_string_fields_fall_back_to_body() {
        assert_eq!(error_message(r#"{"detail": [1, 2]}"#), r#"{"detail": [1, 2]}"#);
    }

    #[test]
    fn test_plain_text_body() {
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
    }
}
