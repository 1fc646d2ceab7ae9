//! Role and surface guards layered inside `JwtAuth`.
//!
//! Both read the `AuthContext` that `JwtAuth` injected; a request reaching a
//! guard without one is treated as unauthenticated.

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures_util::future::LocalBoxFuture;

use salon_core::errors::{AuthError, TokenError};
use salon_core::{Role, Surface};

use crate::handlers::error::ApiError;
use crate::middleware::auth::AuthContext;
use crate::routes::auth::SurfacePath;

type GuardCheck = Rc<dyn Fn(&ServiceRequest) -> Result<(), ApiError>>;

fn auth_context(req: &ServiceRequest) -> Result<AuthContext, ApiError> {
    req.extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or_else(|| TokenError::AccessTokenRequired.into())
}

/// Admit only callers whose role is in the list
#[derive(Clone)]
pub struct RequireRole {
    roles: Rc<[Role]>,
}

impl RequireRole {
    pub fn any_of(roles: &[Role]) -> Self {
        Self {
            roles: Rc::from(roles),
        }
    }

    fn check(&self) -> GuardCheck {
        let roles = Rc::clone(&self.roles);
        Rc::new(move |req: &ServiceRequest| {
            let auth = auth_context(req)?;
            if roles.contains(&auth.role()) {
                Ok(())
            } else {
                tracing::warn!(
                    user_id = %auth.user_id(),
                    role = %auth.role(),
                    path = %req.path(),
                    event = "insufficient_role",
                    "Role not permitted for resource"
                );
                Err(AuthError::InsufficientRole.into())
            }
        })
    }
}

#[derive(Clone)]
enum SurfaceRule {
    AnyOf(Rc<[Surface]>),
    /// Token surface must equal the `{surface}` path segment
    MatchingPath,
}

/// Admit only access tokens issued for the allowed surfaces
#[derive(Clone)]
pub struct RequireSurface {
    rule: SurfaceRule,
}

impl RequireSurface {
    pub fn any_of(surfaces: &[Surface]) -> Self {
        Self {
            rule: SurfaceRule::AnyOf(Rc::from(surfaces)),
        }
    }

    pub fn matching_path() -> Self {
        Self {
            rule: SurfaceRule::MatchingPath,
        }
    }

    fn check(&self) -> GuardCheck {
        let rule = self.rule.clone();
        Rc::new(move |req: &ServiceRequest| {
            let auth = auth_context(req)?;
            let permitted = match &rule {
                SurfaceRule::AnyOf(surfaces) => surfaces.contains(&auth.surface),
                SurfaceRule::MatchingPath => {
                    SurfacePath::from_request_path(req.request())? == auth.surface
                }
            };

            if permitted {
                Ok(())
            } else {
                tracing::warn!(
                    user_id = %auth.user_id(),
                    token_surface = %auth.surface,
                    path = %req.path(),
                    event = "surface_not_permitted",
                    "Token surface not permitted for resource"
                );
                Err(AuthError::SurfaceNotPermitted.into())
            }
        })
    }
}

macro_rules! guard_transform {
    ($guard:ty) => {
        impl<S, B> Transform<S, ServiceRequest> for $guard
        where
            S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
            S::Future: 'static,
            B: 'static,
        {
            type Response = ServiceResponse<B>;
            type Error = Error;
            type InitError = ();
            type Transform = GuardMiddleware<S>;
            type Future = Ready<Result<Self::Transform, Self::InitError>>;

            fn new_transform(&self, service: S) -> Self::Future {
                ready(Ok(GuardMiddleware {
                    service: Rc::new(service),
                    check: self.check(),
                }))
            }
        }
    };
}

guard_transform!(RequireRole);
guard_transform!(RequireSurface);

/// Service shared by the guards: run the check, then the inner service
pub struct GuardMiddleware<S> {
    service: Rc<S>,
    check: GuardCheck,
}

impl<S, B> Service<ServiceRequest> for GuardMiddleware<S>
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
        if let Err(e) = (self.check)(&req) {
            return Box::pin(async move { Err(e.into()) });
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move { service.call(req).await })
    }
}
