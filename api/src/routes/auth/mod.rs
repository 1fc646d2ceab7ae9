//! Authentication route handlers
//!
//! Every route lives under `/api/v1/{surface}/auth`, where `{surface}` is one of
//! `admin`, `salon-owner` or `salon-employee`:
//! - OTP send, resend and verify
//! - Token refresh
//! - Logout
//! - Current identity and tenant scope

pub mod logout;
pub mod me;
pub mod refresh;
pub mod resend;
pub mod scope;
pub mod send;
pub mod verify;

use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};

use salon_core::{ChallengeMeta, Surface};

use crate::handlers::error::ApiError;

/// Surface named by the `{surface}` path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfacePath(pub Surface);

impl SurfacePath {
    pub fn from_request_path(req: &HttpRequest) -> Result<Surface, ApiError> {
        let slug = req.match_info().get("surface").unwrap_or_default();
        Surface::from_slug(slug).ok_or_else(|| ApiError::UnknownSurface(slug.to_string()))
    }
}

impl FromRequest for SurfacePath {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::from_request_path(req).map(SurfacePath))
    }
}

/// Extract client IP address from request
///
/// `X-Forwarded-For` and `X-Real-IP` are taken at face value. The server is
/// expected to sit behind a reverse proxy that overwrites both headers; exposed
/// directly, clients can forge the recorded session and challenge IP.
pub(crate) fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    // First entry of X-Forwarded-For when behind a proxy
    if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
        if let Ok(forwarded_str) = forwarded_for.to_str() {
            if let Some(ip) = forwarded_str.split(',').next().map(str::trim) {
                if !ip.is_empty() {
                    return Some(ip.to_string());
                }
            }
        }
    }

    if let Some(real_ip) = req.headers().get("X-Real-IP") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.trim().to_string());
        }
    }

    req.connection_info().peer_addr().map(str::to_string)
}

/// Extract user agent from request headers
pub(crate) fn extract_user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("User-Agent")
        .and_then(|ua| ua.to_str().ok())
        .map(|s| s.to_string())
}

pub(crate) fn request_meta(req: &HttpRequest) -> ChallengeMeta {
    ChallengeMeta::new(extract_client_ip(req), extract_user_agent(req))
}
