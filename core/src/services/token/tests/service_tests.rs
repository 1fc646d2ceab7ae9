//! Unit tests for the token service

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use crate::domain::entities::session::{RevocationReason, Session};
use crate::domain::entities::surface::Surface;
use crate::domain::entities::token::Claims;
use crate::errors::{DomainError, TokenError};
use crate::repositories::{InMemoryRefreshTokenRepository, InMemorySessionRepository};
use crate::services::session::SessionService;
use crate::services::token::{hash_token, TokenService, TokenServiceConfig};

const SECRET: &str = "unit-test-secret";

struct Fixture {
    service: Arc<TokenService>,
    sessions: Arc<SessionService>,
    tokens: Arc<InMemoryRefreshTokenRepository>,
}

fn fixture() -> Fixture {
    let tokens = Arc::new(InMemoryRefreshTokenRepository::new());
    let sessions = Arc::new(SessionService::new(Arc::new(InMemorySessionRepository::new())));
    let config = TokenServiceConfig {
        jwt_secret: SECRET.to_string(),
        ..Default::default()
    };
    let service = Arc::new(TokenService::new(tokens.clone(), sessions.clone(), config));
    Fixture {
        service,
        sessions,
        tokens,
    }
}

async fn open_session(f: &Fixture, surface: Surface) -> Session {
    f.sessions
        .create(Uuid::new_v4(), surface, Some("198.51.100.4".to_string()), None)
        .await
        .unwrap()
}

fn assert_token_error<T: std::fmt::Debug>(result: Result<T, DomainError>, expected: TokenError) {
    match result {
        Err(DomainError::Token(e)) => assert_eq!(e, expected),
        other => panic!("expected {:?}, got {:?}", expected, other),
    }
}

#[tokio::test]
async fn test_access_token_round_trip() {
    let f = fixture();
    let user_id = Uuid::new_v4();
    let session_id = Uuid::new_v4();

    let token = f
        .service
        .generate_access_token(user_id, Surface::SalonOwner, session_id)
        .unwrap();
    let claims = f.service.verify_access_token(&token).unwrap();

    assert_eq!(claims.user_id().unwrap(), user_id);
    assert_eq!(claims.session_id().unwrap(), session_id);
    assert_eq!(claims.surface, Surface::SalonOwner);
    assert_eq!(claims.iss, "salon-auth");
    assert_eq!(claims.aud, "salon-api");
    assert_eq!(claims.exp - claims.iat, 900);
}

#[test]
fn test_access_token_requires_session() {
    let f = fixture();
    assert_token_error(
        f.service
            .generate_access_token(Uuid::new_v4(), Surface::Admin, Uuid::nil()),
        TokenError::InvalidSessionIdentifier,
    );
}

#[test]
fn test_access_token_rejections() {
    let f = fixture();
    let good = f
        .service
        .generate_access_token(Uuid::new_v4(), Surface::Admin, Uuid::new_v4())
        .unwrap();

    // tampered signature
    let mut tampered = good.clone();
    tampered.push('x');
    assert_token_error(
        f.service.verify_access_token(&tampered),
        TokenError::InvalidAccessToken,
    );
    assert_token_error(f.service.verify_access_token("not-a-jwt"), TokenError::InvalidAccessToken);

    // signed with another secret
    let claims = Claims::new_access_token(
        Uuid::new_v4(),
        Surface::Admin,
        Uuid::new_v4(),
        900,
        "salon-auth",
        "salon-api",
    );
    let foreign = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();
    assert_token_error(f.service.verify_access_token(&foreign), TokenError::InvalidAccessToken);

    // wrong audience
    let mut claims = claims;
    claims.aud = "someone-else".to_string();
    let wrong_aud = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))
        .unwrap();
    assert_token_error(f.service.verify_access_token(&wrong_aud), TokenError::InvalidAccessToken);

    // wrong token type
    claims.aud = "salon-api".to_string();
    claims.typ = "refresh".to_string();
    let wrong_typ = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))
        .unwrap();
    assert_token_error(f.service.verify_access_token(&wrong_typ), TokenError::InvalidAccessToken);
}

#[test]
fn test_expired_access_token_rejected() {
    let f = fixture();
    let mut claims = Claims::new_access_token(
        Uuid::new_v4(),
        Surface::SalonEmployee,
        Uuid::new_v4(),
        900,
        "salon-auth",
        "salon-api",
    );
    let past = (Utc::now() - Duration::hours(1)).timestamp();
    claims.iat = past - 900;
    claims.nbf = past - 900;
    claims.exp = past;
    let expired = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))
        .unwrap();
    assert_token_error(f.service.verify_access_token(&expired), TokenError::InvalidAccessToken);
}

#[tokio::test]
async fn test_refresh_token_stored_only_as_hash() {
    let f = fixture();
    let session = open_session(&f, Surface::SalonOwner).await;

    let raw = f
        .service
        .generate_refresh_token(session.user_id, Surface::SalonOwner, session.id, None)
        .await
        .unwrap();
    assert_eq!(raw.len(), 96);

    let stored = f.tokens.find_by_session(session.id).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].token_hash, hash_token(&raw));
    assert_ne!(stored[0].token_hash, raw);
    assert_eq!(stored[0].expires_at - stored[0].created_at, Duration::days(30));

    let verified = f.service.verify_refresh_token(&raw).await.unwrap();
    assert_eq!(verified.session_id, session.id);
}

#[tokio::test]
async fn test_verify_refresh_token_errors() {
    let f = fixture();
    assert_token_error(f.service.verify_refresh_token("").await, TokenError::InvalidRefreshToken);
    assert_token_error(
        f.service.verify_refresh_token("deadbeef").await,
        TokenError::InvalidRefreshToken,
    );

    let session = open_session(&f, Surface::Admin).await;
    let raw = f
        .service
        .generate_refresh_token(session.user_id, Surface::Admin, session.id, None)
        .await
        .unwrap();
    let mut record = f.tokens.find_by_session(session.id).await.remove(0);
    record.expires_at = Utc::now() - Duration::seconds(1);
    f.tokens.put(record).await;
    assert_token_error(
        f.service.verify_refresh_token(&raw).await,
        TokenError::RefreshTokenExpired,
    );
}

#[tokio::test]
async fn test_rotation_revokes_predecessor() {
    let f = fixture();
    let session = open_session(&f, Surface::SalonEmployee).await;
    let raw = f
        .service
        .generate_refresh_token(session.user_id, Surface::SalonEmployee, session.id, None)
        .await
        .unwrap();

    let old = f.service.verify_refresh_token(&raw).await.unwrap();
    let (successor, session) = f
        .service
        .rotate_refresh_token(&old, Some("198.51.100.9".to_string()), session)
        .await
        .unwrap();
    assert_ne!(successor, raw);

    let old = f.tokens.find_by_session(session.id).await;
    let predecessor = old.iter().find(|t| t.token_hash == hash_token(&raw)).unwrap();
    assert_eq!(predecessor.revoked_reason, Some(RevocationReason::Rotated));
    assert_eq!(predecessor.replaced_by_token_hash, Some(hash_token(&successor)));

    assert_token_error(
        f.service.verify_refresh_token(&raw).await,
        TokenError::RefreshTokenRevoked,
    );
    let next = f.service.verify_refresh_token(&successor).await.unwrap();
    assert_eq!(next.created_by_ip.as_deref(), Some("198.51.100.9"));
}

#[tokio::test]
async fn test_concurrent_rotation_has_one_winner() {
    let f = fixture();
    let session = open_session(&f, Surface::SalonOwner).await;
    let raw = f
        .service
        .generate_refresh_token(session.user_id, Surface::SalonOwner, session.id, None)
        .await
        .unwrap();
    let old = f.service.verify_refresh_token(&raw).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = f.service.clone();
        let old = old.clone();
        let session = session.clone();
        handles.push(tokio::spawn(async move {
            service.rotate_refresh_token(&old, None, session).await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(e) => assert!(matches!(e, DomainError::Token(TokenError::RefreshTokenRevoked))),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_rotation_requires_active_session() {
    let f = fixture();
    let session = open_session(&f, Surface::Admin).await;
    let raw = f
        .service
        .generate_refresh_token(session.user_id, Surface::Admin, session.id, None)
        .await
        .unwrap();
    let old = f.service.verify_refresh_token(&raw).await.unwrap();

    f.sessions.revoke(session.id, RevocationReason::Logout).await.unwrap();
    let stale = session.clone();
    assert_token_error(
        f.service.rotate_refresh_token(&old, None, stale).await,
        TokenError::SessionInvalid,
    );
}

#[tokio::test]
async fn test_revoke_session_cascades_to_tokens() {
    let f = fixture();
    let session = open_session(&f, Surface::SalonOwner).await;
    let first = f
        .service
        .generate_refresh_token(session.user_id, Surface::SalonOwner, session.id, None)
        .await
        .unwrap();
    let second = f
        .service
        .generate_refresh_token(session.user_id, Surface::SalonOwner, session.id, None)
        .await
        .unwrap();

    let revoked = f
        .service
        .revoke_session(session.id, RevocationReason::Logout)
        .await
        .unwrap();
    assert_eq!(revoked, 2);

    for raw in [&first, &second] {
        assert_token_error(
            f.service.verify_refresh_token(raw).await,
            TokenError::RefreshTokenRevoked,
        );
    }
    for token in f.tokens.find_by_session(session.id).await {
        assert_eq!(token.revoked_reason, Some(RevocationReason::Logout));
    }
    assert!(!f.sessions.find(session.id).await.unwrap().unwrap().is_active);

    // idempotent
    assert_eq!(
        f.service
            .revoke_session(session.id, RevocationReason::Logout)
            .await
            .unwrap(),
        0
    );
}

#[test]
fn test_access_ttl_per_surface() {
    let f = fixture();
    assert_eq!(f.service.access_ttl(Surface::Admin), 900);
    assert_eq!(f.service.access_ttl(Surface::SalonEmployee), 900);
}
