//! Integration tests for the OAuth token lifecycle

use lsx_core::auth::{ApiSession, Credential, TokenAuthority};
use lsx_core::AuthError;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn authority(server: &MockServer) -> TokenAuthority {
    TokenAuthority::new("client-id", "client-secret").with_endpoints(
        format!("{}/oauth/access_token.php", server.uri()),
        format!("{}/auth/oauth/token", server.uri()),
    )
}

#[tokio::test]
async fn test_exchange_code_returns_both_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/access_token.php"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at-1",
            "refresh_token": "rt-1",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;

    let credential = authority(&server)
        .exchange_code("abc123", "http://127.0.0.1:8765/callback")
        .await
        .unwrap();
    assert_eq!(credential.access_token, "at-1");
    assert_eq!(credential.refresh_token, "rt-1");
}

#[tokio::test]
async fn test_refresh_keeps_old_token_when_not_rotated() {
    let server = MockServer::start().await;

    // No refresh_token in the response: the old one stays valid
    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "at-2"
        })))
        .mount(&server)
        .await;

    let credential = authority(&server).refresh("rt-original").await.unwrap();
    assert_eq!(credential.access_token, "at-2");
    assert_eq!(credential.refresh_token, "rt-original");
}

#[tokio::test]
async fn test_refresh_invalid_grant_is_revoked() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "refresh token revoked"
        })))
        .mount(&server)
        .await;

    let err = authority(&server).refresh("rt-dead").await.unwrap_err();
    assert!(matches!(err, AuthError::RevokedGrant));
}

#[tokio::test]
async fn test_session_refreshes_once_on_401() {
    let server = MockServer::start().await;

    // Stale token gets a 401, fresh token succeeds
    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .and(wiremock::matchers::header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .and(wiremock::matchers::header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@attributes": {},
            "Item": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "refresh_token": "rt-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = ApiSession::new(Credential::new("stale", "rt-1"), authority(&server));
    let url = format!("{}/acct1/Item.json", server.uri());
    let response = session.get(&url, &[]).await.unwrap();
    assert!(response.status().is_success());

    // Rotated credential is visible for persistence
    let credential = session.credential().await;
    assert_eq!(credential.access_token, "fresh");
    assert_eq!(credential.refresh_token, "rt-2");
}

#[tokio::test]
async fn test_second_401_after_refresh_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "still-bad"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = ApiSession::new(Credential::new("stale", "rt-1"), authority(&server));
    let url = format!("{}/acct1/Item.json", server.uri());
    let err = session.get(&url, &[]).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized));
}

#[tokio::test]
async fn test_bearer_only_session_cannot_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/acct1/Item.json"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = ApiSession::bearer_only("token");
    let url = format!("{}/acct1/Item.json", server.uri());
    let err = session.get(&url, &[]).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized));
}
