//! End-to-end OTP login, refresh and logout over HTTP.

#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use serde_json::json;

use salon_api::app::create_app;
use salon_core::{Role, User};

use common::{get_with_token, harness, post, ADMIN_PHONE, EMPLOYEE_PHONE, OWNER_PHONE};

#[actix_web::test]
async fn test_owner_login_provisions_tenant_and_reaches_me() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    let data = login!(&app, h, "salon-owner", OWNER_PHONE);

    assert_eq!(data["surface"], "SALON_OWNER");
    assert_eq!(data["user"]["role"], "SALON_OWNER");
    assert!(data["user"]["tenantId"].is_string());
    assert!(data["expiresIn"].as_i64().unwrap() > 0);
    assert!(data["user"].get("passwordHash").is_none());

    let access_token = data["accessToken"].as_str().unwrap();
    let (status, body) = call!(&app, get_with_token("/api/v1/salon-owner/auth/me", access_token));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], data["user"]["id"]);
    assert_eq!(body["data"]["sessionId"], data["sessionId"]);
    assert_eq!(h.users.count().await, 1);
    assert_eq!(h.tenants.tenant_count().await, 1);
}

#[actix_web::test]
async fn test_second_owner_login_reuses_user_and_tenant() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    let first = login!(&app, h, "salon-owner", OWNER_PHONE);
    let second = login!(&app, h, "salon-owner", OWNER_PHONE);

    assert_eq!(first["user"]["id"], second["user"]["id"]);
    assert_eq!(first["user"]["tenantId"], second["user"]["tenantId"]);
    assert_ne!(first["sessionId"], second["sessionId"]);
    assert_eq!(h.tenants.tenant_count().await, 1);
}

#[actix_web::test]
async fn test_missing_phone_is_rejected() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    let (status, body) = call!(&app, post("/api/v1/salon-owner/auth/otp/send", json!({})));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "MISSING_PHONE");

    let (status, body) = call!(
        &app,
        post("/api/v1/salon-owner/auth/otp/send", json!({ "phone": "5550001111" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_PHONE_FORMAT");
    assert_eq!(h.sms.sent_count(), 0);
}

#[actix_web::test]
async fn test_malformed_json_uses_error_envelope() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/salon-owner/auth/otp/send")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json");
    let (status, body) = call!(&app, req);

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[actix_web::test]
async fn test_wrong_code_reports_remaining_attempts_then_locks() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    let (_, body) = call!(
        &app,
        post("/api/v1/salon-owner/auth/otp/send", json!({ "phone": OWNER_PHONE }))
    );
    let challenge_id = body["data"]["challengeId"].as_str().unwrap().to_string();
    let code = h.sms.last_code_for(OWNER_PHONE).unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let verify = |otp: &str| {
        post(
            "/api/v1/salon-owner/auth/otp/verify",
            json!({ "challengeId": challenge_id, "otp": otp }),
        )
    };

    let (status, body) = call!(&app, verify(wrong));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_OTP");
    assert_eq!(body["details"]["remainingAttempts"], 2);

    let (_, body) = call!(&app, verify(wrong));
    assert_eq!(body["details"]["remainingAttempts"], 1);

    let (_, body) = call!(&app, verify(wrong));
    assert_eq!(body["error"], "INVALID_OTP");
    assert_eq!(body["details"]["remainingAttempts"], 0);

    // The correct code no longer works once locked
    let (status, body) = call!(&app, verify(code.as_str()));
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "CHALLENGE_NOT_FOUND");
}

#[actix_web::test]
async fn test_resend_invalidates_previous_challenge() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    let (_, body) = call!(
        &app,
        post("/api/v1/salon-owner/auth/otp/send", json!({ "phone": OWNER_PHONE }))
    );
    let first_id = body["data"]["challengeId"].as_str().unwrap().to_string();
    let first_code = h.sms.last_code_for(OWNER_PHONE).unwrap();

    let (status, body) = call!(
        &app,
        post("/api/v1/salon-owner/auth/otp/resend", json!({ "challengeId": first_id }))
    );
    assert_eq!(status, StatusCode::OK);
    let second_id = body["data"]["challengeId"].as_str().unwrap().to_string();
    assert_ne!(first_id, second_id);
    assert_eq!(h.sms.sent_count(), 2);

    let (status, _) = call!(
        &app,
        post(
            "/api/v1/salon-owner/auth/otp/verify",
            json!({ "challengeId": first_id, "otp": first_code })
        )
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let second_code = h.sms.last_code_for(OWNER_PHONE).unwrap();
    let (status, _) = call!(
        &app,
        post(
            "/api/v1/salon-owner/auth/otp/verify",
            json!({ "challengeId": second_id, "otp": second_code })
        )
    );
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_admin_not_on_allowlist_gets_no_code() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    let (status, body) = call!(
        &app,
        post("/api/v1/admin/auth/otp/send", json!({ "phone": "+15559998888" }))
    );

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "PHONE_NOT_ALLOWLISTED");
    assert_eq!(h.sms.sent_count(), 0);
}

#[actix_web::test]
async fn test_allowlisted_admin_without_account_is_not_found() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    let (_, body) = call!(
        &app,
        post("/api/v1/admin/auth/otp/send", json!({ "phone": ADMIN_PHONE }))
    );
    let challenge_id = body["data"]["challengeId"].as_str().unwrap().to_string();
    let code = h.sms.last_code_for(ADMIN_PHONE).unwrap();

    let (status, body) = call!(
        &app,
        post(
            "/api/v1/admin/auth/otp/verify",
            json!({ "challengeId": challenge_id, "otp": code })
        )
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "ACCOUNT_NOT_FOUND");
}

#[actix_web::test]
async fn test_admin_login_succeeds_for_seeded_admin() {
    let h = harness();
    h.users
        .insert(User::new_phone_user(ADMIN_PHONE.to_string(), Role::Admin))
        .await;
    let app = test::init_service(create_app(h.state.clone())).await;

    let data = login!(&app, h, "admin", ADMIN_PHONE);
    assert_eq!(data["surface"], "ADMIN");
    assert_eq!(data["user"]["role"], "ADMIN");
}

#[actix_web::test]
async fn test_inactive_employee_cannot_log_in() {
    let h = harness();
    let mut employee = User::new_phone_user(EMPLOYEE_PHONE.to_string(), Role::SalonEmployee);
    employee.assign_tenant(uuid::Uuid::new_v4());
    employee.is_active = false;
    h.users.insert(employee).await;
    let app = test::init_service(create_app(h.state.clone())).await;

    let (_, body) = call!(
        &app,
        post("/api/v1/salon-employee/auth/otp/send", json!({ "phone": EMPLOYEE_PHONE }))
    );
    let challenge_id = body["data"]["challengeId"].as_str().unwrap().to_string();
    let code = h.sms.last_code_for(EMPLOYEE_PHONE).unwrap();

    let (status, body) = call!(
        &app,
        post(
            "/api/v1/salon-employee/auth/otp/verify",
            json!({ "challengeId": challenge_id, "otp": code })
        )
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "EMPLOYEE_INACTIVE");
}

#[actix_web::test]
async fn test_refresh_token_is_single_use() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    let data = login!(&app, h, "salon-owner", OWNER_PHONE);
    let refresh_token = data["refreshToken"].as_str().unwrap().to_string();

    let (status, body) = call!(
        &app,
        post(
            "/api/v1/salon-owner/auth/token/refresh",
            json!({ "refreshToken": refresh_token })
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sessionId"], data["sessionId"]);
    assert_ne!(body["data"]["refreshToken"], data["refreshToken"]);

    let (status, body) = call!(
        &app,
        post(
            "/api/v1/salon-owner/auth/token/refresh",
            json!({ "refreshToken": refresh_token })
        )
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "REFRESH_TOKEN_REVOKED");
}

#[actix_web::test]
async fn test_refresh_on_other_surface_is_rejected() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    let data = login!(&app, h, "salon-owner", OWNER_PHONE);

    let (status, body) = call!(
        &app,
        post(
            "/api/v1/salon-employee/auth/token/refresh",
            json!({ "refreshToken": data["refreshToken"] })
        )
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "SURFACE_SCOPE_MISMATCH");
}

#[actix_web::test]
async fn test_logout_revokes_access_and_refresh() {
    let h = harness();
    let app = test::init_service(create_app(h.state.clone())).await;

    let data = login!(&app, h, "salon-owner", OWNER_PHONE);
    let access_token = data["accessToken"].as_str().unwrap().to_string();

    let (status, body) = call!(
        &app,
        post(
            "/api/v1/salon-owner/auth/logout",
            json!({ "refreshToken": data["refreshToken"] })
        )
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = call!(&app, get_with_token("/api/v1/salon-owner/auth/me", &access_token));
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "SESSION_INVALID");

    let (status, _) = call!(
        &app,
        post(
            "/api/v1/salon-owner/auth/token/refresh",
            json!({ "refreshToken": data["refreshToken"] })
        )
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
