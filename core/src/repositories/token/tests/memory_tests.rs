//! Unit tests for the in-memory refresh token repository

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::session::RevocationReason;
use crate::domain::entities::surface::Surface;
use crate::domain::entities::token::RefreshToken;
use crate::repositories::token::{InMemoryRefreshTokenRepository, RefreshTokenRepository};

fn token(session_id: Uuid, hash: &str) -> RefreshToken {
    RefreshToken::new(
        Uuid::new_v4(),
        session_id,
        Surface::SalonOwner,
        hash.to_string(),
        3600,
        None,
    )
}

#[tokio::test]
async fn test_create_and_find() {
    let repo = InMemoryRefreshTokenRepository::new();
    let t = token(Uuid::new_v4(), "h1");
    repo.create(&t).await.unwrap();
    assert_eq!(repo.find_by_hash("h1").await.unwrap(), Some(t.clone()));
    assert!(repo.find_by_hash("nope").await.unwrap().is_none());
    assert!(repo.create(&t).await.is_err());
}

#[tokio::test]
async fn test_rotate_is_single_use() {
    let repo = InMemoryRefreshTokenRepository::new();
    let session_id = Uuid::new_v4();
    repo.create(&token(session_id, "h1")).await.unwrap();

    assert!(repo.rotate("h1", &token(session_id, "h2")).await.unwrap());
    let old = repo.find_by_hash("h1").await.unwrap().unwrap();
    assert_eq!(old.revoked_reason, Some(RevocationReason::Rotated));
    assert_eq!(old.replaced_by_token_hash.as_deref(), Some("h2"));

    assert!(!repo.rotate("h1", &token(session_id, "h3")).await.unwrap());
    assert!(repo.find_by_hash("h3").await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_rotation_has_single_winner() {
    let repo = Arc::new(InMemoryRefreshTokenRepository::new());
    let session_id = Uuid::new_v4();
    repo.create(&token(session_id, "root")).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = repo.clone();
            let successor = token(session_id, &format!("next-{}", i));
            tokio::spawn(async move { repo.rotate("root", &successor).await.unwrap() })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(repo.find_by_session(session_id).await.len(), 2);
}

#[tokio::test]
async fn test_revoke_by_session() {
    let repo = InMemoryRefreshTokenRepository::new();
    let session_id = Uuid::new_v4();
    let other_session = Uuid::new_v4();
    repo.create(&token(session_id, "a")).await.unwrap();
    repo.create(&token(session_id, "b")).await.unwrap();
    repo.create(&token(other_session, "c")).await.unwrap();

    let revoked = repo
        .revoke_by_session(session_id, RevocationReason::Logout, Utc::now())
        .await
        .unwrap();
    assert_eq!(revoked, 2);
    assert!(repo.find_by_hash("a").await.unwrap().unwrap().is_revoked());
    assert!(!repo.find_by_hash("c").await.unwrap().unwrap().is_revoked());

    // Already revoked tokens are not counted again
    let revoked = repo
        .revoke_by_session(session_id, RevocationReason::Logout, Utc::now())
        .await
        .unwrap();
    assert_eq!(revoked, 0);
}
