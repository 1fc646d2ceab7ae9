use actix_web::{web, HttpResponse};
use validator::Validate;

use salon_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::auth::{ChallengeResponse, ResendOtpRequest};
use crate::handlers::error::ApiError;

use super::SurfacePath;

/// Handler for POST /api/v1/{surface}/auth/otp/resend
///
/// Rotates an active challenge: the old id stops working and a fresh code is
/// sent under a new id. Resends are rate limited per challenge chain.
///
/// ## Errors
/// - 400 Bad Request: `MISSING_CHALLENGE_ID`, `CHALLENGE_NOT_FOUND`,
///   `RESEND_LIMIT_EXCEEDED`
/// - 403 Forbidden: `SURFACE_MISMATCH`
pub async fn resend_otp(
    state: web::Data<AppState>,
    SurfacePath(surface): SurfacePath,
    request: web::Json<ResendOtpRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let issued = state.auth.resend_otp(&request.challenge_id, surface).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(ChallengeResponse::from(issued))))
}
