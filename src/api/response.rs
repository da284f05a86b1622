use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Disposition, FieldError, SuppressReason};

/// Response from a dispatch request.
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    /// Unique identifier for this dispatch
    pub dispatch_id: Uuid,

    /// Outcome (`SENT_LOCAL`, `SENT_FORWARD` or `SUPPRESSED`)
    pub disposition: &'static str,

    /// Why nothing was sent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SuppressReason>,

    /// Policy version used for this dispatch
    pub policy_version: String,

    /// When the dispatch completed
    pub issued_at: DateTime<Utc>,
}

impl DispatchResponse {
    pub fn new(disposition: Disposition, policy_version: String) -> Self {
        DispatchResponse {
            dispatch_id: Uuid::new_v4(),
            disposition: disposition.as_str(),
            reason: disposition.reason(),
            policy_version,
            issued_at: Utc::now(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub policy_version: String,
    pub uptime_secs: u64,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub policy_version: String,
    pub responses: usize,
    pub local_ar: bool,
    pub remote_ar: bool,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
            code: code.into(),
        }
    }

    pub fn invalid_event(e: &FieldError) -> Self {
        ErrorResponse::new(e.to_string(), "INVALID_EVENT")
    }

    pub fn unknown_response(name: &str) -> Self {
        ErrorResponse::new(format!("No active response named {name:?}"), "UNKNOWN_RESPONSE")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_response_serialization() {
        let resp = DispatchResponse::new(Disposition::SentForward, "v1.0".to_string());

        let json = serde_json::to_string(&resp).unwrap();

        assert!(json.contains("SENT_FORWARD"));
        assert!(json.contains("v1.0"));
        assert!(!json.contains("reason"));
    }

    #[test]
    fn test_suppressed_response_carries_reason() {
        let resp = DispatchResponse::new(
            Disposition::Suppressed(SuppressReason::Ignored),
            "v1.0".to_string(),
        );

        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["disposition"], "SUPPRESSED");
        assert_eq!(json["reason"], "ignored");
    }
}
