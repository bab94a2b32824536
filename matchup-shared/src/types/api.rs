use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Success envelope: `{ "success": true, "data": ..., "message"? }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data, message: None }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self { success: true, data, message: Some(message.into()) }
    }
}

/// Failure envelope: `{ "success": false, "error": { "code", "message", "details"? } }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }
}

// --- Health ---

/// Ordered from best to worst so `max` picks the overall status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// One dependency probe.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthCheck {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), status: HealthStatus::Healthy, message: None }
    }

    pub fn failing(name: impl Into<String>, status: HealthStatus, message: impl Into<String>) -> Self {
        Self { name: name.into(), status, message: Some(message.into()) }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<HealthCheck>,
}

impl HealthResponse {
    /// Overall status is the worst check, `Healthy` when there are none.
    pub fn from_checks(service: impl Into<String>, version: impl Into<String>, checks: Vec<HealthCheck>) -> Self {
        let status = checks
            .iter()
            .map(|c| c.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);

        Self {
            status,
            service: service.into(),
            version: version.into(),
            checks,
        }
    }

    /// `503` only when a check is unhealthy.
    pub fn http_status(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worst_check_wins() {
        let health = HealthResponse::from_checks(
            "svc",
            "0.1.0",
            vec![
                HealthCheck::healthy("postgres"),
                HealthCheck::failing("rabbitmq", HealthStatus::Degraded, "channel closed"),
            ],
        );
        assert_eq!(health.status, HealthStatus::Degraded);
        assert_eq!(health.http_status(), StatusCode::OK);

        let health = HealthResponse::from_checks(
            "svc",
            "0.1.0",
            vec![HealthCheck::failing("postgres", HealthStatus::Unhealthy, "timeout")],
        );
        assert_eq!(health.http_status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn no_checks_is_healthy_and_omits_the_list() {
        let health = HealthResponse::from_checks("svc", "0.1.0", Vec::new());
        let value = serde_json::to_value(&health).unwrap();

        assert_eq!(value["status"], "healthy");
        assert!(value.get("checks").is_none());
    }

    #[test]
    fn message_is_omitted_when_absent() {
        let value = serde_json::to_value(ApiResponse::ok(1)).unwrap();
        assert!(value.get("message").is_none());

        let value = serde_json::to_value(ApiResponse::ok_with_message(1, "It's a match!")).unwrap();
        assert_eq!(value["message"], "It's a match!");
    }
}
