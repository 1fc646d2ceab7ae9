//! Tenant/branch scope extractor.

use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::LocalBoxFuture;

use salon_core::errors::{DomainError, TokenError};
use salon_core::AccessScope;

use crate::app::AppState;
use crate::handlers::error::ApiError;
use crate::middleware::auth::AuthContext;
use crate::middleware::cors::BRANCH_HEADER;

/// Tenant and branch resolved for the authenticated caller
///
/// Requires `JwtAuth` upstream. The branch comes from `X-Branch-Id` when
/// present and must belong to the caller's tenant; otherwise the user's active
/// branch is used.
#[derive(Debug, Clone, Copy)]
pub struct TenantScope(pub AccessScope);

impl FromRequest for TenantScope {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let auth = req.extensions().get::<AuthContext>().cloned();
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let requested_branch = req
            .headers()
            .get(BRANCH_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Box::pin(async move {
            let auth = auth.ok_or(TokenError::AccessTokenRequired)?;
            let state =
                state.ok_or_else(|| DomainError::internal("AppState is not registered"))?;

            let scope = state
                .auth
                .policy()
                .resolve_scope(&auth.user, requested_branch.as_deref())
                .await?;
            Ok(TenantScope(scope))
        })
    }
}
