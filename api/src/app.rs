//! Application state and factory
//!
//! Builds the core services from configuration and a set of repositories, and
//! assembles the actix-web route tree shared by `main` and the integration tests.

use std::sync::Arc;

use actix_web::{web, App, HttpResponse};

use salon_core::repositories::{
    ChallengeRepository, InMemoryChallengeRepository, InMemoryRefreshTokenRepository,
    InMemorySessionRepository, InMemoryTenantRepository, InMemoryUserRepository,
    RefreshTokenRepository, SessionRepository, TenantRepository, UserRepository,
};
use salon_core::{
    AuthService, ChallengeService, ChallengeServiceConfig, CleanupService, SessionService,
    SmsSender, SurfacePolicy, TokenService, TokenServiceConfig,
};
use salon_infra::database::{
    DatabasePool, MySqlChallengeRepository, MySqlRefreshTokenRepository, MySqlSessionRepository,
    MySqlTenantRepository, MySqlUserRepository,
};
use salon_shared::config::{AppConfig, Environment};
use salon_shared::errors::{error_codes, ErrorResponse};
use salon_shared::types::HealthResponse;

use crate::handlers::error::json_error_handler;
use crate::middleware::auth::JwtAuth;
use crate::middleware::guards::{RequireRole, RequireSurface};
use crate::routes::auth::{logout, me, refresh, resend, scope, send, verify};

/// Shared state handed to every handler and middleware
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub environment: Environment,
    /// Present when running against MySQL
    pub database: Option<DatabasePool>,
}

/// Persistence backends for the auth core
#[derive(Clone)]
pub struct Repositories {
    pub challenges: Arc<dyn ChallengeRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub tokens: Arc<dyn RefreshTokenRepository>,
    pub users: Arc<dyn UserRepository>,
    pub tenants: Arc<dyn TenantRepository>,
}

impl Repositories {
    /// Process-local repositories for development and tests
    pub fn in_memory() -> Self {
        Self {
            challenges: Arc::new(InMemoryChallengeRepository::new()),
            sessions: Arc::new(InMemorySessionRepository::new()),
            tokens: Arc::new(InMemoryRefreshTokenRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            tenants: Arc::new(InMemoryTenantRepository::new()),
        }
    }

    pub fn mysql(database: &DatabasePool) -> Self {
        let pool = database.get_pool().clone();
        Self {
            challenges: Arc::new(MySqlChallengeRepository::new(pool.clone())),
            sessions: Arc::new(MySqlSessionRepository::new(pool.clone())),
            tokens: Arc::new(MySqlRefreshTokenRepository::new(pool.clone())),
            users: Arc::new(MySqlUserRepository::new(pool.clone())),
            tenants: Arc::new(MySqlTenantRepository::new(pool)),
        }
    }
}

/// Wire the auth orchestrator and its collaborators
pub fn build_auth_service(
    config: &AppConfig,
    repositories: &Repositories,
    sms_sender: Arc<dyn SmsSender>,
) -> AuthService {
    let challenges = Arc::new(ChallengeService::new(
        repositories.challenges.clone(),
        sms_sender,
        ChallengeServiceConfig::from_otp_config(&config.auth.otp, config.environment),
    ));
    let sessions = Arc::new(SessionService::new(repositories.sessions.clone()));
    let tokens = Arc::new(TokenService::new(
        repositories.tokens.clone(),
        sessions.clone(),
        TokenServiceConfig::from_shared(&config.auth.jwt, config.auth.tokens),
    ));
    let policy = Arc::new(SurfacePolicy::new(
        repositories.users.clone(),
        repositories.tenants.clone(),
        config.auth.admin_allowlist.clone(),
    ));

    AuthService::new(
        challenges,
        tokens,
        sessions,
        policy,
        repositories.users.clone(),
    )
}

pub fn build_cleanup_service(config: &AppConfig, repositories: &Repositories) -> CleanupService {
    CleanupService::new(
        repositories.challenges.clone(),
        repositories.sessions.clone(),
        repositories.tokens.clone(),
        config.auth.tokens,
        config.cleanup.clone(),
    )
}

/// Register the health check and the per-surface auth routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check)).service(
        web::scope("/api/v1/{surface}/auth")
            .route("/otp/send", web::post().to(send::send_otp))
            .route("/otp/resend", web::post().to(resend::resend_otp))
            .route("/otp/verify", web::post().to(verify::verify_otp))
            .route("/token/refresh", web::post().to(refresh::refresh_tokens))
            .route("/logout", web::post().to(logout::logout))
            .service(
                web::resource("/me")
                    .wrap(RequireSurface::matching_path())
                    .wrap(JwtAuth::required())
                    .route(web::get().to(me::me)),
            )
            .service(
                web::resource("/scope")
                    .wrap(RequireRole::any_of(&[
                        salon_core::Role::SalonOwner,
                        salon_core::Role::SalonEmployee,
                    ]))
                    .wrap(RequireSurface::matching_path())
                    .wrap(JwtAuth::required())
                    .route(web::get().to(scope::scope)),
            ),
    );
}

/// Create the application with state, JSON error handling and routes
pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .configure(configure)
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let mut health = HealthResponse::healthy("salon-api", env!("CARGO_PKG_VERSION"));

    if let Some(database) = &state.database {
        if database.health_check().await.is_err() {
            health.status = String::from("degraded");
            return HttpResponse::ServiceUnavailable().json(health);
        }
    }

    HttpResponse::Ok().json(health)
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
