use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single outbound request.
///
/// Callers of the public service operations never see these: each one is
/// mapped to a safe default (empty list, empty icon, `None`) at the
/// operation boundary, with a warning on the diagnostic sink.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure while sending the request or reading the body.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The body was not valid JSON for the expected shape.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Valid response, but the payload was empty or `null`.
    #[error("response body was empty or null")]
    EmptyBody,
}

impl FetchError {
    pub(crate) fn status(status: StatusCode, body: &str) -> Self {
        Self::Status { status, body: truncate_body(body) }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    // Cut on a char boundary; byte 200 can land inside a multi-byte
    // character (upstream errors arrive in Ukrainian).
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_truncates_long_bodies() {
        let body = "x".repeat(500);
        let err = FetchError::status(StatusCode::BAD_GATEWAY, &body);

        let msg = err.to_string();
        assert!(msg.contains("502"));
        assert!(msg.ends_with("..."));
        assert!(msg.len() < 300);
    }

    #[test]
    fn short_bodies_are_kept_verbatim() {
        let err = FetchError::status(StatusCode::NOT_FOUND, "no such city");
        assert!(err.to_string().contains("no such city"));
    }

    #[test]
    fn truncation_backs_off_to_a_char_boundary() {
        // Byte 200 falls inside the two-byte 'є'.
        let body = format!("{}ється далі", "x".repeat(199));
        let err = FetchError::status(StatusCode::SERVICE_UNAVAILABLE, &body);

        let msg = err.to_string();
        assert!(msg.contains(&format!("{}...", "x".repeat(199))));
        assert!(!msg.contains('є'));
    }
}
