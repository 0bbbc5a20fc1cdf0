//! NATS message envelopes

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Generic request wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request<T> {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub payload: T,
}

/// Generic success response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessResponse<T> {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub payload: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(request_id: Uuid, payload: T) -> Self {
        Self {
            id: request_id,
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(request_id: Uuid, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: request_id,
            timestamp: Utc::now(),
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Empty payload that accepts both `null` and `{}`
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmptyPayload {}

impl<'de> Deserialize<'de> for EmptyPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer)?;
        Ok(EmptyPayload {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_parses_camel_case_envelope() {
        let json = r#"{
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "timestamp": "2024-03-01T10:00:00Z",
            "payload": {}
        }"#;

        let request: Request<EmptyPayload> = serde_json::from_str(json).unwrap();
        assert_eq!(request.id.to_string(), "123e4567-e89b-12d3-a456-426614174000");
    }

    #[test]
    fn test_empty_payload_accepts_null() {
        let json = r#"{
            "id": "123e4567-e89b-12d3-a456-426614174000",
            "timestamp": "2024-03-01T10:00:00Z",
            "payload": null
        }"#;

        let request: Request<EmptyPayload> = serde_json::from_str(json).unwrap();
        assert_eq!(request.id.to_string(), "123e4567-e89b-12d3-a456-426614174000");
    }

    #[test]
    fn test_error_response_omits_empty_details() {
        let error = ErrorResponse::new(Uuid::nil(), "VALIDATION_ERROR", "Start location is required");
        let json = serde_json::to_string(&error).unwrap();

        assert!(json.contains("\"code\":\"VALIDATION_ERROR\""));
        assert!(!json.contains("details"));
    }
}
