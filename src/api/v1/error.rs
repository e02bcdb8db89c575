use crate::application_port::*;
use crate::domain_port::PlatformError;
use serde::Serialize;
use std::convert::Infallible;
use tracing::{debug, warn};
use warp::http::StatusCode;
use warp::{Rejection, reject};

/// JSON error body: `{ error, code?, type? }`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            error: message.into(),
            code: None,
            kind: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> Self {
        warn!("Internal error: {}", error);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    }

    fn with_code(mut self, code: Option<&str>) -> Self {
        self.code = code.map(str::to_string);
        self
    }

    fn with_kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }
}

impl reject::Reject for ApiError {}

impl From<PlatformError> for ApiError {
    fn from(error: PlatformError) -> Self {
        let status = match &error {
            PlatformError::NotFound { .. } => StatusCode::NOT_FOUND,
            PlatformError::BalanceInsufficient { .. }
            | PlatformError::Card { .. }
            | PlatformError::InvalidRequest { .. }
            | PlatformError::Authentication { .. }
            | PlatformError::RateLimited { .. }
            | PlatformError::Api { .. }
            | PlatformError::Transport(_) => {
                warn!(error_type = error.error_type(), "platform error: {}", error);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        ApiError::new(status, error.to_string())
            .with_code(error.code())
            .with_kind(error.error_type())
    }
}

impl From<PaymentsError> for ApiError {
    fn from(error: PaymentsError) -> Self {
        match error {
            PaymentsError::Validation(message) => ApiError::bad_request(message),
            PaymentsError::BalanceInsufficient => {
                ApiError::bad_request(error.to_string()).with_code(Some("balance_insufficient"))
            }
            PaymentsError::Platform(e) => ApiError::from(e),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(error: IdentityError) -> Self {
        ApiError::from(PaymentsError::from(error))
    }
}

impl From<WebhookError> for ApiError {
    fn from(error: WebhookError) -> Self {
        match error {
            WebhookError::NotConfigured => ApiError::not_found("Not found"),
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfTolerance
            | WebhookError::InvalidPayload(_) => {
                debug!("rejected webhook: {}", error);
                ApiError::bad_request(error.to_string())
            }
        }
    }
}

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let api_error = if let Some(e) = err.find::<ApiError>() {
        e.clone()
    } else if err.is_not_found() {
        ApiError::not_found("Not found")
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        debug!("malformed request body: {}", e);
        ApiError::bad_request("Invalid JSON body")
    } else if err.find::<reject::InvalidQuery>().is_some() {
        ApiError::bad_request("Invalid query string")
    } else if err.find::<reject::UnsupportedMediaType>().is_some() {
        ApiError::bad_request("Content-Type must be application/json")
    } else if err.find::<reject::PayloadTooLarge>().is_some() {
        ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large")
    } else if err.find::<reject::LengthRequired>().is_some() {
        ApiError::new(StatusCode::LENGTH_REQUIRED, "Content-Length header is required")
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else {
        ApiError::internal(format!("Unhandled rejection: {:?}", err))
    };

    let json = warp::reply::json(&api_error);
    Ok(warp::reply::with_status(json, api_error.status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_body_has_only_the_message() {
        let api_error = ApiError::from(PaymentsError::Validation("Valid amount is required"));
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            serde_json::to_value(&api_error).unwrap(),
            serde_json::json!({ "error": "Valid amount is required" })
        );
    }

    #[test]
    fn vendor_failures_pass_through_as_500() {
        let api_error = ApiError::from(PaymentsError::Platform(PlatformError::Card {
            message: "Your card was declined.".into(),
            code: Some("card_declined".into()),
        }));
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            serde_json::to_value(&api_error).unwrap(),
            serde_json::json!({
                "error": "Your card was declined.",
                "code": "card_declined",
                "type": "card_error"
            })
        );
    }

    #[test]
    fn missing_vendor_resource_is_404() {
        let api_error = ApiError::from(PlatformError::NotFound {
            message: "No such account: 'acct_x'".into(),
        });
        assert_eq!(api_error.status, StatusCode::NOT_FOUND);
        assert_eq!(api_error.code.as_deref(), Some("resource_missing"));
    }

    #[test]
    fn transfer_shortfall_is_400_with_code() {
        let api_error = ApiError::from(PaymentsError::BalanceInsufficient);
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.code.as_deref(), Some("balance_insufficient"));
        assert!(api_error.error.contains("retry"));
    }
}
