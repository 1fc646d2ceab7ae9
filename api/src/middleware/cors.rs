//! CORS middleware configuration for the salon apps and admin console.
//!
//! Development is permissive. Production only admits the origins listed in
//! `ALLOWED_ORIGINS`.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use salon_shared::config::{CorsConfig, Environment};

/// Header carrying the branch the caller wants to act on
pub const BRANCH_HEADER: &str = "x-branch-id";

/// Creates a CORS middleware instance for the given environment
pub fn create_cors(config: &CorsConfig, environment: Environment) -> Cors {
    if environment.is_production() {
        create_production_cors(config)
    } else {
        create_development_cors(config)
    }
}

fn allowed_methods() -> Vec<Method> {
    vec![Method::GET, Method::POST, Method::OPTIONS]
}

fn allowed_headers() -> Vec<header::HeaderName> {
    vec![
        header::AUTHORIZATION,
        header::ACCEPT,
        header::CONTENT_TYPE,
        header::HeaderName::from_static(BRANCH_HEADER),
        header::HeaderName::from_static("x-app-version"),
        header::HeaderName::from_static("x-platform"),
    ]
}

fn create_development_cors(config: &CorsConfig) -> Cors {
    tracing::info!("Configuring CORS for development environment");

    Cors::default()
        .allow_any_origin()
        .allowed_methods(allowed_methods())
        .allowed_headers(allowed_headers())
        .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
        .max_age(config.max_age)
        .supports_credentials()
}

fn create_production_cors(config: &CorsConfig) -> Cors {
    tracing::info!(
        origins = config.allowed_origins.len(),
        "Configuring CORS for production environment"
    );

    let mut cors = Cors::default()
        .allowed_methods(allowed_methods())
        .allowed_headers(allowed_headers())
        .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
        .max_age(config.max_age);

    for origin in config.allowed_origins.iter().filter(|o| !o.is_empty()) {
        cors = cors.allowed_origin(origin);
    }

    cors
}
