use actix_web::{web, HttpResponse};
use validator::Validate;

use salon_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::auth::RefreshTokenRequest;
use crate::handlers::error::ApiError;

use super::SurfacePath;

/// Handler for POST /api/v1/{surface}/auth/logout
///
/// Revokes the session behind the refresh token together with every refresh
/// token issued under it. Access tokens for that session stop working at once.
pub async fn logout(
    state: web::Data<AppState>,
    SurfacePath(surface): SurfacePath,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    state.auth.logout(&request.refresh_token, surface).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok("Logged out")))
}
