use actix_web::HttpResponse;

use salon_shared::types::ApiResponse;

use crate::dto::auth::MeResponse;
use crate::middleware::auth::AuthContext;

/// Handler for GET /api/v1/{surface}/auth/me
///
/// Requires a bearer access token issued for the same surface.
pub async fn me(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(MeResponse::from(&auth)))
}
