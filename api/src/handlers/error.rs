//! Error → HTTP mapping
//!
//! Every failure leaves a handler or middleware as an `ApiError`, which renders the
//! shared `ErrorResponse` envelope with the domain's stable code.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use salon_core::errors::{AuthError, DomainError, ErrorCategory};
use salon_shared::errors::{error_codes, ErrorResponse};
use validator::ValidationErrors;

/// Error returned by handlers, middleware and extractors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Invalid request data")]
    Validation(#[from] ValidationErrors),

    /// Malformed JSON body or content type
    #[error("{0}")]
    BadRequest(String),

    #[error("Unknown surface: {0}")]
    UnknownSurface(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl From<salon_core::errors::TokenError> for ApiError {
    fn from(err: salon_core::errors::TokenError) -> Self {
        ApiError::Domain(err.into())
    }
}

/// HTTP status for a domain error category
pub fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::Validation | ErrorCategory::Challenge => StatusCode::BAD_REQUEST,
        ErrorCategory::Authentication => StatusCode::UNAUTHORIZED,
        ErrorCategory::Authorization => StatusCode::FORBIDDEN,
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    fn to_error_response(&self) -> ErrorResponse {
        match self {
            ApiError::Domain(err) => {
                let response = ErrorResponse::new(err.code(), err.client_message());
                match err {
                    DomainError::Auth(AuthError::InvalidOtp { remaining_attempts }) => {
                        response.add_detail("remainingAttempts", remaining_attempts)
                    }
                    _ => response,
                }
            }
            ApiError::Validation(errors) => {
                let mut response =
                    ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request data");
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    response = response.add_detail(field, messages);
                }
                response
            }
            ApiError::BadRequest(message) => {
                ErrorResponse::new(error_codes::BAD_REQUEST, message.clone())
            }
            ApiError::UnknownSurface(surface) => ErrorResponse::new(
                error_codes::UNKNOWN_SURFACE,
                format!("Unknown surface: {}", surface),
            ),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Domain(err) => status_for(err.category()),
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownSurface(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = self.to_error_response();

        if status.is_server_error() {
            tracing::error!(code = %body.error, error = %self, "Request failed");
        } else {
            tracing::debug!(code = %body.error, status = status.as_u16(), "Request rejected");
        }

        HttpResponse::build(status).json(body)
    }
}

/// Map JSON extractor failures into the standard envelope
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    ApiError::BadRequest(format!("Invalid JSON body: {}", err)).into()
}
