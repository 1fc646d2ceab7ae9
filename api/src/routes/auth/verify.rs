use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use salon_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::auth::{AuthResponse, VerifyOtpRequest};
use crate::handlers::error::ApiError;

use super::{request_meta, SurfacePath};

/// Handler for POST /api/v1/{surface}/auth/otp/verify
///
/// Checks the code, applies the surface admission policy and opens a session.
///
/// # Request Body
///
/// ```json
/// {
///     "challengeId": "7f6c3c1e-...",
///     "otp": "123456"
/// }
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// {
///     "success": true,
///     "data": {
///         "accessToken": "eyJ...",
///         "refreshToken": "9b1f...",
///         "expiresIn": 900,
///         "user": { "id": "...", "role": "SALON_OWNER", ... },
///         "sessionId": "...",
///         "surface": "SALON_OWNER"
///     },
///     "timestamp": "..."
/// }
/// ```
///
/// ## Errors
/// - 400 Bad Request: `INVALID_OTP` (with `details.remainingAttempts`),
///   `CHALLENGE_NOT_FOUND`, `CHALLENGE_EXPIRED`, `ATTEMPTS_EXCEEDED`
/// - 403 Forbidden: `SURFACE_MISMATCH`, `PHONE_NOT_ALLOWLISTED`,
///   `ACCOUNT_NOT_AUTHORIZED_FOR_SURFACE`, `EMPLOYEE_INACTIVE`, `EMPLOYEE_UNASSIGNED`
/// - 404 Not Found: `EMPLOYEE_NOT_FOUND`, `ACCOUNT_NOT_FOUND`
pub async fn verify_otp(
    req: HttpRequest,
    state: web::Data<AppState>,
    SurfacePath(surface): SurfacePath,
    request: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let result = state
        .auth
        .verify_otp(&request.challenge_id, &request.otp, surface, request_meta(&req))
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(AuthResponse::from(result))))
}
