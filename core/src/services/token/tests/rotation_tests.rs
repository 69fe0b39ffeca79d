//! Rotation protocol tests: rotation, replay, theft, and cascades

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::token::{DeviceInfo, RefreshToken, RevokedReason, TokenStatus};
use crate::errors::{DomainError, TokenError};
use crate::repositories::{MockTokenRepository, TokenRepository};
use crate::services::token::{TokenService, TokenServiceConfig};

fn device(id: &str) -> DeviceInfo {
    DeviceInfo {
        device_id: id.to_string(),
        device_name: Some("Test Phone".to_string()),
        platform: Some("ios".to_string()),
    }
}

fn create_test_service() -> (TokenService<MockTokenRepository>, Arc<MockTokenRepository>) {
    let repository = Arc::new(MockTokenRepository::new());
    let service = TokenService::new(repository.clone(), TokenServiceConfig::default());
    (service, repository)
}

/// Seeds a family root for `user_id` on `device_id`, returning the
/// client-side secret and the stored record.
async fn seed_root(
    repository: &MockTokenRepository,
    user_id: Uuid,
    device_id: &str,
) -> (String, RefreshToken) {
    let secret = TokenService::<MockTokenRepository>::generate_opaque_secret();
    let root = RefreshToken::family_root(
        user_id,
        device(device_id),
        TokenService::<MockTokenRepository>::hash_secret(&secret),
        30,
    );
    let saved = repository.save(root).await.unwrap();
    (secret, saved)
}

#[tokio::test]
async fn test_rotation_consumes_old_and_creates_sibling() {
    let (service, repository) = create_test_service();
    let user_id = Uuid::new_v4();
    let (secret, root) = seed_root(&repository, user_id, "dev-A").await;

    let tokens = service.rotate(&secret, "dev-A").await.unwrap();

    assert!(!tokens.access_token.is_empty());
    let new_secret = tokens.refresh_token.unwrap();
    assert_ne!(new_secret, secret);
    assert_eq!(tokens.expires_in, 900);

    // Old record is now used, successor is the active tip of the family.
    let family = repository.family_records(root.family_id).await;
    assert_eq!(family.len(), 2);

    let old = family.iter().find(|t| t.id == root.id).unwrap();
    assert_eq!(old.status, TokenStatus::Used);
    assert!(old.used_at.is_some());

    let tip = family.iter().find(|t| t.id != root.id).unwrap();
    assert_eq!(tip.status, TokenStatus::Active);
    assert_eq!(tip.family_id, root.family_id);
    assert_eq!(tip.device_id, "dev-A");
    assert_eq!(
        tip.token_hash,
        TokenService::<MockTokenRepository>::hash_secret(&new_secret)
    );

    // The minted access token carries the same identity.
    let claims = service.verify_access_token(&tokens.access_token).unwrap();
    assert_eq!(claims.user_id().unwrap(), user_id);
    assert_eq!(claims.device_id.as_deref(), Some("dev-A"));
}

#[tokio::test]
async fn test_unknown_secret_is_rejected() {
    let (service, _repository) = create_test_service();

    let result = service.rotate("never-issued-secret", "dev-A").await;

    assert!(matches!(
        result.unwrap_err(),
        DomainError::Token(TokenError::InvalidRefreshToken)
    ));
}

#[tokio::test]
async fn test_device_mismatch_kills_family() {
    let (service, repository) = create_test_service();
    let user_id = Uuid::new_v4();
    let (secret, root) = seed_root(&repository, user_id, "dev-A").await;

    // Correct secret, wrong device: theft verdict.
    let result = service.rotate(&secret, "dev-B").await;
    assert!(matches!(
        result.unwrap_err(),
        DomainError::Token(TokenError::TokenTheftDetected)
    ));

    // The cascade also revoked the legitimate token, forcing the
    // genuine user to re-authenticate.
    let family = repository.family_records(root.family_id).await;
    assert!(family
        .iter()
        .all(|t| t.status == TokenStatus::Revoked
            && t.revoked_reason == Some(RevokedReason::DeviceMismatch)));

    let result = service.rotate(&secret, "dev-A").await;
    assert!(matches!(
        result.unwrap_err(),
        DomainError::Token(TokenError::TokenRevoked)
    ));
}

#[tokio::test]
async fn test_replay_kills_family() {
    let (service, repository) = create_test_service();
    let user_id = Uuid::new_v4();
    let (t0, root) = seed_root(&repository, user_id, "dev-A").await;

    // First rotation succeeds and yields T1.
    let rotated = service.rotate(&t0, "dev-A").await.unwrap();
    let t1 = rotated.refresh_token.unwrap();

    // Replaying T0 is a reuse verdict.
    let result = service.rotate(&t0, "dev-A").await;
    assert!(matches!(
        result.unwrap_err(),
        DomainError::Token(TokenError::TokenReuseDetected)
    ));

    // Every record in the family is revoked, T1 included.
    let family = repository.family_records(root.family_id).await;
    assert_eq!(family.len(), 2);
    assert!(family.iter().all(|t| t.status == TokenStatus::Revoked));

    // The previously fresh T1 now fails as revoked, not as reuse.
    let result = service.rotate(&t1, "dev-A").await;
    assert!(matches!(
        result.unwrap_err(),
        DomainError::Token(TokenError::TokenRevoked)
    ));
}

#[tokio::test]
async fn test_revoked_token_is_terminal() {
    let (service, repository) = create_test_service();
    let user_id = Uuid::new_v4();
    let (secret, root) = seed_root(&repository, user_id, "dev-A").await;

    repository
        .revoke_family(root.family_id, RevokedReason::Logout)
        .await
        .unwrap();

    let result = service.rotate(&secret, "dev-A").await;
    assert!(matches!(
        result.unwrap_err(),
        DomainError::Token(TokenError::TokenRevoked)
    ));

    // No cascade beyond the one already performed, and no new records.
    assert_eq!(repository.family_records(root.family_id).await.len(), 1);
}

#[tokio::test]
async fn test_expired_token_is_rejected_lazily() {
    let (service, repository) = create_test_service();
    let user_id = Uuid::new_v4();

    let secret = TokenService::<MockTokenRepository>::generate_opaque_secret();
    let mut root = RefreshToken::family_root(
        user_id,
        device("dev-A"),
        TokenService::<MockTokenRepository>::hash_secret(&secret),
        30,
    );
    root.expires_at = Utc::now() - Duration::days(1);
    let root = repository.save(root).await.unwrap();

    let result = service.rotate(&secret, "dev-A").await;
    assert!(matches!(
        result.unwrap_err(),
        DomainError::Token(TokenError::RefreshExpired)
    ));

    // Expiry is a rejection, not a compromise: the record keeps its
    // status and no successor appears.
    let family = repository.family_records(root.family_id).await;
    assert_eq!(family.len(), 1);
    assert_eq!(family[0].status, TokenStatus::Active);
}

#[tokio::test]
async fn test_concurrent_rotation_single_winner() {
    let (service, repository) = create_test_service();
    let user_id = Uuid::new_v4();
    let (secret, root) = seed_root(&repository, user_id, "dev-A").await;

    // Two rotations race on the same secret. The mock's write guard
    // serializes them; exactly one may win, the other must surface the
    // reuse verdict rather than silently succeed.
    let service = Arc::new(service);
    let s1 = service.clone();
    let s2 = service.clone();
    let secret1 = secret.clone();
    let secret2 = secret.clone();

    let (r1, r2) = tokio::join!(
        tokio::spawn(async move { s1.rotate(&secret1, "dev-A").await }),
        tokio::spawn(async move { s2.rotate(&secret2, "dev-A").await }),
    );
    let results = [r1.unwrap(), r2.unwrap()];

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(DomainError::Token(TokenError::TokenReuseDetected))
    )));

    // The loser's verdict killed the family, winner's fresh token included.
    let family = repository.family_records(root.family_id).await;
    assert!(family.iter().all(|t| t.status == TokenStatus::Revoked));
}

#[tokio::test]
async fn test_mismatch_beats_status_checks() {
    let (service, repository) = create_test_service();
    let user_id = Uuid::new_v4();
    let (t0, root) = seed_root(&repository, user_id, "dev-A").await;

    // Rotate T0 out, then present the used T0 from a foreign device:
    // the device verdict wins over the reuse verdict.
    service.rotate(&t0, "dev-A").await.unwrap();
    let result = service.rotate(&t0, "dev-B").await;

    assert!(matches!(
        result.unwrap_err(),
        DomainError::Token(TokenError::TokenTheftDetected)
    ));
    let family = repository.family_records(root.family_id).await;
    assert!(family.iter().all(|t| t.status == TokenStatus::Revoked));
}
