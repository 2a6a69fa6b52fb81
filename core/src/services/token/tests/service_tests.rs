//! Unit tests for token service

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use sg_shared::config::{JwtConfig, TokenPolicyConfig};
use uuid::Uuid;

use super::mocks::{
    create_test_context, jwt_config, role_set, MockUserDirectory, UnavailableTokenRepository,
};
use crate::domain::entities::principal::Principal;
use crate::errors::{DomainError, TokenError};
use crate::repositories::{InMemoryTokenRepository, TokenRepository};
use crate::services::token::TokenService;

#[tokio::test]
async fn test_generate_tokens_claims_match_input() {
    let ctx = create_test_context(true);
    let roles = role_set(&["Admin", "Customer"]);
    let before = Utc::now();

    let pair = ctx
        .service
        .generate_tokens(&ctx.principal, &roles, None, None)
        .await
        .unwrap();

    let claims = ctx.service.validate_access_token(&pair.access_token).unwrap();
    assert_eq!(claims.sub, ctx.principal.id.to_string());
    assert_eq!(claims.email, ctx.principal.email);
    assert_eq!(claims.unique_name, ctx.principal.username);
    assert_eq!(claims.name.as_deref(), Some("John Doe"));
    assert_eq!(claims.role.len(), 2);
    assert_eq!(claims.roles(), roles);
    assert_eq!(claims.iss, "test-issuer");
    assert_eq!(claims.aud, "test-audience");

    let expected = before + Duration::minutes(15);
    assert!((pair.expires_at - expected).num_seconds().abs() <= 2);
    assert_eq!(claims.exp, pair.expires_at.timestamp());
}

#[tokio::test]
async fn test_generate_tokens_with_no_roles() {
    let ctx = create_test_context(true);

    let pair = ctx
        .service
        .generate_tokens(&ctx.principal, &BTreeSet::new(), None, None)
        .await
        .unwrap();

    let claims = ctx.service.validate_access_token(&pair.access_token).unwrap();
    assert!(claims.role.is_empty());
}

#[tokio::test]
async fn test_generate_tokens_rejects_nil_principal_id() {
    let ctx = create_test_context(true);
    let anonymous = Principal::new(Uuid::nil(), "ghost", "", "");

    let result = ctx
        .service
        .generate_tokens(&anonymous, &role_set(&["Customer"]), None, None)
        .await;

    assert!(matches!(result, Err(DomainError::Validation { .. })));
    assert_eq!(ctx.repository.len().await, 0);
}

#[tokio::test]
async fn test_generate_tokens_inserts_one_row_per_call() {
    let ctx = create_test_context(true);
    let roles = role_set(&["Customer"]);

    let first = ctx
        .service
        .generate_tokens(&ctx.principal, &roles, Some("10.1.1.1".to_string()), Some("iPhone".to_string()))
        .await
        .unwrap();
    let second = ctx
        .service
        .generate_tokens(&ctx.principal, &roles, None, None)
        .await
        .unwrap();

    assert_ne!(first.refresh_token, second.refresh_token);
    assert_eq!(ctx.repository.len().await, 2);

    let stored = ctx
        .repository
        .find_by_token(&first.refresh_token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.user_id, ctx.principal.id);
    assert_eq!(stored.ip_address.as_deref(), Some("10.1.1.1"));
    assert_eq!(stored.device_info.as_deref(), Some("iPhone"));
    assert_eq!(stored.expires_at, first.refresh_expires_at);
    assert_eq!(stored.expires_at - stored.created_at, Duration::days(7));
}

#[tokio::test]
async fn test_validate_refresh_token_checks_owner() {
    let ctx = create_test_context(true);
    let pair = ctx
        .service
        .generate_tokens(&ctx.principal, &role_set(&["Customer"]), None, None)
        .await
        .unwrap();

    assert!(ctx
        .service
        .validate_refresh_token(&pair.refresh_token, ctx.principal.id)
        .await
        .unwrap());
    assert!(!ctx
        .service
        .validate_refresh_token(&pair.refresh_token, Uuid::new_v4())
        .await
        .unwrap());
    assert!(!ctx.service.validate_refresh_token("", ctx.principal.id).await.unwrap());
    assert!(!ctx
        .service
        .validate_refresh_token("unknown", ctx.principal.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_revoke_refresh_token_twice() {
    let ctx = create_test_context(true);
    let pair = ctx
        .service
        .generate_tokens(&ctx.principal, &role_set(&["Customer"]), None, None)
        .await
        .unwrap();

    assert!(ctx.service.revoke_refresh_token(&pair.refresh_token).await.unwrap());
    assert!(!ctx.service.revoke_refresh_token(&pair.refresh_token).await.unwrap());

    let stored = ctx
        .repository
        .find_by_token(&pair.refresh_token)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_revoked);
    assert!(stored.revoked_at.is_some());
    assert!(!ctx
        .service
        .validate_refresh_token(&pair.refresh_token, ctx.principal.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_revoke_unknown_or_blank_token_is_noop() {
    let ctx = create_test_context(true);

    assert!(!ctx.service.revoke_refresh_token("does-not-exist").await.unwrap());
    assert!(!ctx.service.revoke_refresh_token("").await.unwrap());
}

#[tokio::test]
async fn test_revoke_all_user_tokens_leaves_other_users() {
    let ctx = create_test_context(true);
    let roles = role_set(&["Customer"]);
    let other = super::mocks::test_principal();

    let mine: Vec<_> = issue_refresh_tokens(&ctx, &roles, 3).await;
    let theirs = ctx
        .service
        .generate_tokens(&other, &roles, None, None)
        .await
        .unwrap();

    assert_eq!(ctx.service.revoke_all_user_tokens(ctx.principal.id).await.unwrap(), 3);

    for token in &mine {
        assert!(!ctx
            .service
            .validate_refresh_token(token, ctx.principal.id)
            .await
            .unwrap());
    }
    assert!(ctx
        .service
        .validate_refresh_token(&theirs.refresh_token, other.id)
        .await
        .unwrap());
    assert!(ctx.service.active_sessions(ctx.principal.id).await.unwrap().is_empty());
}

async fn issue_refresh_tokens(
    ctx: &super::mocks::TestContext,
    roles: &BTreeSet<String>,
    count: usize,
) -> Vec<String> {
    let mut tokens = Vec::with_capacity(count);
    for _ in 0..count {
        let pair = ctx
            .service
            .generate_tokens(&ctx.principal, roles, None, None)
            .await
            .unwrap();
        tokens.push(pair.refresh_token);
    }
    tokens
}

#[tokio::test]
async fn test_refresh_with_rotation_consumes_old_token() {
    let ctx = create_test_context(true);
    let pair = ctx
        .service
        .generate_tokens(&ctx.principal, &role_set(&["Customer"]), None, None)
        .await
        .unwrap();

    let renewed = ctx
        .service
        .refresh_tokens(&pair.access_token, &pair.refresh_token, None, Some("laptop".to_string()))
        .await
        .unwrap()
        .expect("refresh should succeed");

    assert_ne!(renewed.refresh_token, pair.refresh_token);
    let claims = ctx.service.validate_access_token(&renewed.access_token).unwrap();
    assert_eq!(claims.roles(), role_set(&["Customer"]));

    assert!(!ctx
        .service
        .validate_refresh_token(&pair.refresh_token, ctx.principal.id)
        .await
        .unwrap());

    // Replaying the consumed token fails
    let replay = ctx
        .service
        .refresh_tokens(&pair.access_token, &pair.refresh_token, None, None)
        .await
        .unwrap();
    assert!(replay.is_none());
}

#[tokio::test]
async fn test_refresh_without_rotation_keeps_old_token() {
    let ctx = create_test_context(false);
    let pair = ctx
        .service
        .generate_tokens(&ctx.principal, &role_set(&["Customer"]), None, None)
        .await
        .unwrap();

    let renewed = ctx
        .service
        .refresh_tokens(&pair.access_token, &pair.refresh_token, None, None)
        .await
        .unwrap();

    assert!(renewed.is_some());
    assert!(ctx
        .service
        .validate_refresh_token(&pair.refresh_token, ctx.principal.id)
        .await
        .unwrap());
    assert_eq!(ctx.repository.len().await, 2);
}

#[tokio::test]
async fn test_refresh_rejects_token_of_another_user() {
    let ctx = create_test_context(true);
    let other = super::mocks::test_principal();
    let roles = role_set(&["Customer"]);

    let mine = ctx
        .service
        .generate_tokens(&ctx.principal, &roles, None, None)
        .await
        .unwrap();
    let theirs = ctx
        .service
        .generate_tokens(&other, &roles, None, None)
        .await
        .unwrap();

    let result = ctx
        .service
        .refresh_tokens(&mine.access_token, &theirs.refresh_token, None, None)
        .await
        .unwrap();
    assert!(result.is_none());
    // The other user's token was not consumed by the failed attempt
    assert!(ctx
        .service
        .validate_refresh_token(&theirs.refresh_token, other.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_refresh_rejects_revoked_token_and_bad_access_token() {
    let ctx = create_test_context(true);
    let pair = ctx
        .service
        .generate_tokens(&ctx.principal, &role_set(&["Customer"]), None, None)
        .await
        .unwrap();

    let garbage = ctx
        .service
        .refresh_tokens("garbage", &pair.refresh_token, None, None)
        .await
        .unwrap();
    assert!(garbage.is_none());

    ctx.service.revoke_refresh_token(&pair.refresh_token).await.unwrap();
    let revoked = ctx
        .service
        .refresh_tokens(&pair.access_token, &pair.refresh_token, None, None)
        .await
        .unwrap();
    assert!(revoked.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_with_same_token_has_one_winner() {
    let ctx = create_test_context(true);
    let pair = ctx
        .service
        .generate_tokens(&ctx.principal, &role_set(&["Customer"]), None, None)
        .await
        .unwrap();
    let service = Arc::new(ctx.service);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            let access = pair.access_token.clone();
            let refresh = pair.refresh_token.clone();
            tokio::spawn(async move {
                service
                    .refresh_tokens(&access, &refresh, None, None)
                    .await
                    .unwrap()
                    .is_some()
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    // Original plus exactly one rotated token
    assert_eq!(ctx.repository.len().await, 2);
}

#[tokio::test]
async fn test_persistence_failures_propagate() {
    let principal = super::mocks::test_principal();
    let service = TokenService::new(
        Arc::new(UnavailableTokenRepository),
        Arc::new(MockUserDirectory::new().with_user(principal.clone(), &["Customer"])),
        &jwt_config(),
        &TokenPolicyConfig::default(),
    )
    .unwrap();

    let generated = service
        .generate_tokens(&principal, &role_set(&["Customer"]), None, None)
        .await;
    assert!(generated.unwrap_err().is_persistence());

    assert!(service.revoke_refresh_token("any").await.unwrap_err().is_persistence());
    assert!(service
        .revoke_all_user_tokens(principal.id)
        .await
        .unwrap_err()
        .is_persistence());
    assert!(service.cleanup_expired_tokens().await.unwrap_err().is_persistence());
}

#[tokio::test]
async fn test_blank_input_short_circuits_before_backend() {
    let service = TokenService::new(
        Arc::new(UnavailableTokenRepository),
        Arc::new(MockUserDirectory::new()),
        &jwt_config(),
        &TokenPolicyConfig::default(),
    )
    .unwrap();

    assert!(!service.validate_refresh_token("", Uuid::new_v4()).await.unwrap());
    assert!(!service.revoke_refresh_token("  ").await.unwrap());
}

#[test]
fn test_service_refuses_empty_secret() {
    let config = JwtConfig {
        secret: String::new(),
        ..jwt_config()
    };

    let result = TokenService::new(
        Arc::new(InMemoryTokenRepository::new()),
        Arc::new(MockUserDirectory::new()),
        &config,
        &TokenPolicyConfig::default(),
    );

    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::MissingSigningKey))
    ));
}

#[test]
fn test_service_refuses_out_of_range_lifetimes() {
    let oversized = [
        jwt_config().with_refresh_expiry_days(100_000_000),
        jwt_config().with_access_expiry_minutes(i64::MAX),
        jwt_config().with_access_expiry_minutes(0),
    ];

    for config in &oversized {
        let result = TokenService::new(
            Arc::new(InMemoryTokenRepository::new()),
            Arc::new(MockUserDirectory::new()),
            config,
            &TokenPolicyConfig::default(),
        );
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
