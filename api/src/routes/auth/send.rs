use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use salon_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::auth::{ChallengeResponse, SendOtpRequest};
use crate::handlers::error::ApiError;

use super::{request_meta, SurfacePath};

/// Handler for POST /api/v1/{surface}/auth/otp/send
///
/// Issues a new OTP challenge for the phone and delivers the code by SMS.
/// Any earlier active challenge for the same phone and surface is superseded.
///
/// # Request Body
///
/// ```json
/// {
///     "phone": "+15551234567"
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
///         "challengeId": "7f6c3c1e-...",
///         "expiresIn": 300
///     },
///     "timestamp": "..."
/// }
/// ```
///
/// `devCode` is added to `data` outside production.
///
/// ## Errors
/// - 400 Bad Request: `MISSING_PHONE`, `INVALID_PHONE_FORMAT`
/// - 403 Forbidden: `PHONE_NOT_ALLOWLISTED` (admin surface only)
/// - 404 Not Found: `UNKNOWN_SURFACE`
/// - 500 Internal Server Error: SMS delivery or storage failure
pub async fn send_otp(
    req: HttpRequest,
    state: web::Data<AppState>,
    SurfacePath(surface): SurfacePath,
    request: web::Json<SendOtpRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let issued = state
        .auth
        .initiate_otp(&request.phone, surface, request_meta(&req))
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(ChallengeResponse::from(issued))))
}
