//! Shared harness for the HTTP integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{body::MessageBody, dev::ServiceResponse, http::StatusCode, test, web};
use serde_json::{json, Value};

use salon_api::app::{build_auth_service, AppState, Repositories};
use salon_core::repositories::{
    InMemoryChallengeRepository, InMemoryRefreshTokenRepository, InMemorySessionRepository,
    InMemoryTenantRepository, InMemoryUserRepository,
};
use salon_core::services::RecordingSmsSender;
use salon_shared::config::{AppConfig, Environment};

pub const OWNER_PHONE: &str = "+15550001111";
pub const ADMIN_PHONE: &str = "+15550002222";
pub const EMPLOYEE_PHONE: &str = "+15550003333";

pub struct Harness {
    pub config: AppConfig,
    pub sms: Arc<RecordingSmsSender>,
    pub users: Arc<InMemoryUserRepository>,
    pub tenants: Arc<InMemoryTenantRepository>,
    pub state: web::Data<AppState>,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.environment = Environment::Development;
    config.auth.otp.bcrypt_cost = 4;
    config.auth.otp.max_attempts = 3;
    config.auth.admin_allowlist = vec![ADMIN_PHONE.to_string()];
    config
}

pub fn harness() -> Harness {
    let config = test_config();
    let sms = Arc::new(RecordingSmsSender::new());
    let users = Arc::new(InMemoryUserRepository::new());
    let tenants = Arc::new(InMemoryTenantRepository::new());

    let repositories = Repositories {
        challenges: Arc::new(InMemoryChallengeRepository::new()),
        sessions: Arc::new(InMemorySessionRepository::new()),
        tokens: Arc::new(InMemoryRefreshTokenRepository::new()),
        users: users.clone(),
        tenants: tenants.clone(),
    };

    let auth = build_auth_service(&config, &repositories, sms.clone());
    let state = web::Data::new(AppState {
        auth: Arc::new(auth),
        environment: config.environment,
        database: None,
    });

    Harness {
        config,
        sms,
        users,
        tenants,
        state,
    }
}

/// Collapse a service result into status and JSON body, rendering middleware
/// errors the way the server would
pub async fn into_json<B: MessageBody>(
    result: Result<ServiceResponse<B>, actix_web::Error>,
) -> (StatusCode, Value) {
    let (status, bytes) = match result {
        Ok(resp) => {
            let status = resp.status();
            (status, test::read_body(resp).await)
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let bytes = actix_web::body::to_bytes(resp.into_body())
                .await
                .unwrap_or_default();
            (status, bytes)
        }
    };

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub fn post(uri: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post().uri(uri).set_json(body)
}

pub fn get_with_token(uri: &str, access_token: &str) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .insert_header(("Authorization", format!("Bearer {}", access_token)))
}

pub fn send_body(phone: &str) -> Value {
    json!({ "phone": phone })
}

/// Run a `TestRequest` against an initialized app
macro_rules! call {
    ($app:expr, $req:expr) => {
        common::into_json(actix_web::test::try_call_service($app, $req.to_request()).await).await
    };
}

/// Send a code and verify it, yielding the `data` of the verify response
macro_rules! login {
    ($app:expr, $harness:expr, $surface:expr, $phone:expr) => {{
        let (status, body) = call!(
            $app,
            common::post(
                &format!("/api/v1/{}/auth/otp/send", $surface),
                common::send_body($phone)
            )
        );
        assert_eq!(status, actix_web::http::StatusCode::OK, "send failed: {}", body);

        let challenge_id = body["data"]["challengeId"].as_str().unwrap().to_string();
        let code = $harness.sms.last_code_for($phone).unwrap();

        let (status, body) = call!(
            $app,
            common::post(
                &format!("/api/v1/{}/auth/otp/verify", $surface),
                serde_json::json!({ "challengeId": challenge_id, "otp": code })
            )
        );
        assert_eq!(status, actix_web::http::StatusCode::OK, "verify failed: {}", body);
        body["data"].clone()
    }};
}
