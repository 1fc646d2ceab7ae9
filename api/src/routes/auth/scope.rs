use actix_web::HttpResponse;

use salon_shared::types::ApiResponse;

use crate::middleware::tenant::TenantScope;

/// Handler for GET /api/v1/{surface}/auth/scope
///
/// Returns the tenant and branch the caller acts on. Honors `X-Branch-Id`.
pub async fn scope(TenantScope(scope): TenantScope) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(scope))
}
