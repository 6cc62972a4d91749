//! Typed error handling for the marketplace
//!
//! The catalog query engine itself never fails: unknown sort keys fall back to
//! a default ordering and empty views aggregate to zero. Everything around it
//! (drafts, sessions, the prediction collaborator, configuration) reports
//! failures through [`MarketError`], which maps onto HTTP responses.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: rejected listing drafts and sign-up forms
//! - [`RequestError`]: missing session or a role that may not perform an action
//! - [`ForecastError`]: failures of the external prediction service
//! - [`ConfigError`]: configuration loading and parsing
//!
//! # Example
//!
//! ```rust,ignore
//! match host.add_listing(draft).await {
//!     Ok(listing) => println!("Created {}", listing.id),
//!     Err(MarketError::Request(RequestError::Forbidden { .. })) => {
//!         println!("Only sellers can list surplus");
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Main error type of the crate
#[derive(Debug, Error)]
pub enum MarketError {
    /// Draft or form validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Session or role errors
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A record lookup by id found nothing
    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: String, id: String },

    /// The auth collaborator rejected the credentials or the account
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The prediction service failed
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Internal errors (poisoned locks and the like)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl MarketError {
    /// Shorthand for a missing record
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        MarketError::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            MarketError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MarketError::Request(e) => e.status_code(),
            MarketError::NotFound { .. } => StatusCode::NOT_FOUND,
            MarketError::Auth(_) => StatusCode::UNAUTHORIZED,
            MarketError::Forecast(_) => StatusCode::BAD_GATEWAY,
            MarketError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MarketError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            MarketError::Validation(_) => "VALIDATION_ERROR",
            MarketError::Request(e) => e.error_code(),
            MarketError::NotFound { .. } => "NOT_FOUND",
            MarketError::Auth(_) => "AUTH_FAILED",
            MarketError::Forecast(e) => e.error_code(),
            MarketError::Config(_) => "CONFIG_ERROR",
            MarketError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            MarketError::NotFound { resource, id } => Some(serde_json::json!({
                "resource": resource,
                "id": id,
            })),
            MarketError::Validation(ValidationError::Fields(violations)) => {
                Some(serde_json::json!({ "fields": violations }))
            }
            MarketError::Forecast(ForecastError::Status { endpoint, status }) => {
                Some(serde_json::json!({ "endpoint": endpoint, "status": status }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single rejected field
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Errors raised while validating drafts and forms
#[derive(Debug, Error)]
pub enum ValidationError {
    /// One or more fields were rejected
    #[error("Validation failed for field(s): {}", joined_fields(.0))]
    Fields(Vec<FieldViolation>),
}

fn joined_fields(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// The rejected fields
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            ValidationError::Fields(v) => v,
        }
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| FieldViolation {
                    field: field.to_string(),
                    message: err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string()),
                })
            })
            .collect();
        // field_errors() is backed by a HashMap
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::Fields(violations)
    }
}

impl From<validator::ValidationErrors> for MarketError {
    fn from(errors: validator::ValidationErrors) -> Self {
        MarketError::Validation(errors.into())
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Session and role errors
#[derive(Debug, Error)]
pub enum RequestError {
    /// No signed-in user
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The signed-in role may not do this
    #[error("Forbidden: {message}")]
    Forbidden { message: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
            RequestError::Forbidden { .. } => "FORBIDDEN",
        }
    }
}

// =============================================================================
// Forecast Errors
// =============================================================================

/// Failures of the prediction service
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The request never produced a response
    #[error("Prediction service unreachable at {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// Non-2xx response
    #[error("Prediction service returned {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    /// 2xx response carrying an `error` field
    #[error("Prediction service error at {endpoint}: {message}")]
    Service { endpoint: String, message: String },

    /// Body did not match the expected payload shape
    #[error("Unexpected payload from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl ForecastError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ForecastError::Transport { .. } => "FORECAST_UNREACHABLE",
            ForecastError::Status { .. } => "FORECAST_BAD_STATUS",
            ForecastError::Service { .. } => "FORECAST_SERVICE_ERROR",
            ForecastError::Decode { .. } => "FORECAST_BAD_PAYLOAD",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Cannot read configuration file '{path}': {message}")]
    Io { path: String, message: String },

    /// Configuration could not be parsed
    #[error("Failed to parse configuration{}: {message}", in_file(.file))]
    Parse {
        file: Option<String>,
        message: String,
    },
}

fn in_file(file: &Option<String>) -> String {
    file.as_ref()
        .map(|f| format!(" in '{}'", f))
        .unwrap_or_default()
}

/// Result alias used across the crate
pub type MarketResult<T> = std::result::Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_details() {
        let err = MarketError::not_found("transaction", "42");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        let response = err.to_response();
        assert_eq!(response.code, "NOT_FOUND");
        assert_eq!(response.message, "transaction with id '42' not found");
        assert_eq!(response.details.unwrap()["id"], "42");
    }

    #[test]
    fn test_config_parse_message_with_and_without_file() {
        let with_file = ConfigError::Parse {
            file: Some("market.yaml".to_string()),
            message: "bad indent".to_string(),
        };
        assert_eq!(
            with_file.to_string(),
            "Failed to parse configuration in 'market.yaml': bad indent"
        );

        let without_file = ConfigError::Parse {
            file: None,
            message: "bad indent".to_string(),
        };
        assert_eq!(
            without_file.to_string(),
            "Failed to parse configuration: bad indent"
        );
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let err = ValidationError::Fields(vec![
            FieldViolation {
                field: "name".to_string(),
                message: "required".to_string(),
            },
            FieldViolation {
                field: "price".to_string(),
                message: "required".to_string(),
            },
        ]);
        assert_eq!(err.to_string(), "Validation failed for field(s): name, price");
    }
}
