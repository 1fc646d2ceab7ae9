use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use salon_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::auth::{AuthResponse, RefreshTokenRequest};
use crate::handlers::error::ApiError;

use super::{extract_client_ip, SurfacePath};

/// Handler for POST /api/v1/{surface}/auth/token/refresh
///
/// Exchanges a refresh token for a new access/refresh pair under the same
/// session. The presented refresh token is single-use.
///
/// ## Errors
/// - 401 Unauthorized: `INVALID_REFRESH_TOKEN`, `REFRESH_TOKEN_EXPIRED`,
///   `REFRESH_TOKEN_REVOKED`, `SESSION_INVALID`
/// - 403 Forbidden: `SURFACE_SCOPE_MISMATCH`
pub async fn refresh_tokens(
    req: HttpRequest,
    state: web::Data<AppState>,
    SurfacePath(surface): SurfacePath,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let result = state
        .auth
        .refresh_tokens(&request.refresh_token, surface, extract_client_ip(&req))
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(AuthResponse::from(result))))
}
