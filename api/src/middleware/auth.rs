//! Access-token middleware for protected endpoints.
//!
//! Extracts the bearer token, resolves it through `AuthService::authenticate`
//! (signature, session and user checks) and injects an `AuthContext` into the
//! request. The optional variant logs any failure and continues unauthenticated.

use actix_web::{
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
};
use uuid::Uuid;

use salon_core::errors::{DomainError, TokenError};
use salon_core::{AuthenticatedIdentity, Role, Surface, User, UserProfile};

use crate::app::AppState;
use crate::handlers::error::ApiError;

/// Authenticated caller injected into request extensions
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    /// Surface the access token was issued for
    pub surface: Surface,
    pub session_id: Uuid,
}

impl AuthContext {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn profile(&self) -> UserProfile {
        self.user.profile()
    }
}

impl From<AuthenticatedIdentity> for AuthContext {
    fn from(identity: AuthenticatedIdentity) -> Self {
        Self {
            user: identity.user,
            surface: identity.surface,
            session_id: identity.session_id,
        }
    }
}

/// JWT authentication middleware factory
#[derive(Debug, Clone, Copy)]
pub struct JwtAuth {
    optional: bool,
}

impl JwtAuth {
    /// Reject requests without a valid access token
    pub fn required() -> Self {
        Self { optional: false }
    }

    /// Authenticate when possible; never reject
    pub fn optional() -> Self {
        Self { optional: true }
    }
}

impl Default for JwtAuth {
    fn default() -> Self {
        Self::required()
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            optional: self.optional,
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    optional: bool,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let optional = self.optional;

        Box::pin(async move {
            match authenticate_request(&req).await {
                Ok(context) => {
                    req.extensions_mut().insert(context);
                }
                Err(e) if optional => {
                    tracing::debug!(
                        error = %e,
                        path = %req.path(),
                        event = "optional_auth_skipped",
                        "Continuing without authentication"
                    );
                }
                Err(e) => {
                    tracing::info!(
                        error = %e,
                        path = %req.path(),
                        event = "access_denied",
                        "Rejected unauthenticated request"
                    );
                    return Err(e.into());
                }
            }

            service.call(req).await
        })
    }
}

async fn authenticate_request(req: &ServiceRequest) -> Result<AuthContext, ApiError> {
    let token = extract_bearer_token(req).ok_or(TokenError::AccessTokenRequired)?;
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| DomainError::internal("AppState is not registered"))?;

    let identity = state.auth.authenticate(&token).await?;
    Ok(identity.into())
}

/// Extracts the bearer token from the Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result: Result<Self, ApiError> = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| TokenError::AccessTokenRequired.into());

        ready(result)
    }
}

/// Extractor for optional authentication
pub struct OptionalAuth(pub Option<AuthContext>);

impl FromRequest for OptionalAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let auth = req.extensions().get::<AuthContext>().cloned();
        ready(Ok(OptionalAuth(auth)))
    }
}
