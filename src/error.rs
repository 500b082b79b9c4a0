//! Error codes shared by every layer.
//!
//! DESIGN
//! ======
//! Each layer owns a closed `thiserror` enum. At the HTTP boundary the enum is
//! rendered as `{ "error": <message>, "code": <E_*>, "retryable": <bool> }` so
//! callers can branch on the kind instead of parsing message text.

use serde::Serialize;

/// Grepable, stable identifier for an error variant.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    pub retryable: bool,
}

impl ErrorBody {
    #[must_use]
    pub fn from_error(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { error: err.to_string(), code: err.error_code(), retryable: err.retryable() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("gateway busy")]
    struct Busy;

    impl ErrorCode for Busy {
        fn error_code(&self) -> &'static str {
            "E_BUSY"
        }

        fn retryable(&self) -> bool {
            true
        }
    }

    #[test]
    fn body_carries_message_code_and_retryable() {
        let json = serde_json::to_value(ErrorBody::from_error(&Busy)).unwrap();
        assert_eq!(json["error"], "gateway busy");
        assert_eq!(json["code"], "E_BUSY");
        assert_eq!(json["retryable"], true);
    }
}
