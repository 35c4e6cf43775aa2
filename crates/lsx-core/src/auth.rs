//! OAuth token lifecycle and authenticated transport
//!
//! [`TokenAuthority`] owns the authorization-code and refresh-token
//! exchanges against the Lightspeed OAuth endpoints. [`ApiSession`] wraps a
//! `reqwest::Client` with the current [`Credential`] and transparently
//! refreshes on 401 - exactly once per request; a second 401 is surfaced to
//! the caller.
//!
//! Rotated refresh tokens are single-use: when a refresh response carries a
//! new `refresh_token`, the old one is dead the moment it was redeemed. The
//! session therefore serializes refresh + credential update behind one
//! mutex, and a task that waited on the lock re-checks whether another task
//! already refreshed before spending the stored refresh token itself.

use crate::error::AuthError;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

// ============================================================================
// OAuth Endpoint Constants
// ============================================================================

/// Browser authorization page.
/// The legacy PHP endpoints avoid the MerchantOS redirect loop on the newer
/// api.lightspeed.app hosts.
pub const AUTHORIZE_URL: &str = "https://cloud.lightspeedapp.com/oauth/authorize.php";

/// Authorization-code exchange endpoint.
pub const TOKEN_URL: &str = "https://cloud.lightspeedapp.com/oauth/access_token.php";

/// Refresh-token exchange endpoint.
pub const REFRESH_URL: &str = "https://cloud.lightspeedapp.com/auth/oauth/token";

/// OAuth scope requested during authorization.
pub const OAUTH_SCOPE: &str = "employee:all";

/// One tenant's OAuth token pair
///
/// Mutated on every successful refresh. The access token is never persisted
/// beyond the owning session unless the caller stores it explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
}

impl Credential {
    /// Create a credential from an access/refresh token pair
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Credential with no refresh token; 401s become fatal immediately
    pub fn access_only(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: String::new(),
        }
    }
}

/// Build the browser authorization URL for the login flow
pub fn authorize_url(client_id: &str, redirect_uri: &str, state: &str) -> String {
    format!(
        "{}?response_type=code&client_id={}&scope={}&state={}&redirect_uri={}",
        AUTHORIZE_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(OAUTH_SCOPE),
        urlencoding::encode(state),
        urlencoding::encode(redirect_uri),
    )
}

/// OAuth client for token exchange and renewal
#[derive(Debug, Clone)]
pub struct TokenAuthority {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    refresh_url: String,
}

impl TokenAuthority {
    /// Create an authority against the production Lightspeed endpoints
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: TOKEN_URL.to_string(),
            refresh_url: REFRESH_URL.to_string(),
        }
    }

    /// Override the token endpoints (tests point these at a mock server)
    pub fn with_endpoints(
        mut self,
        token_url: impl Into<String>,
        refresh_url: impl Into<String>,
    ) -> Self {
        self.token_url = token_url.into();
        self.refresh_url = refresh_url.into();
        self
    }

    /// Exchange an authorization code for an access/refresh token pair
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> std::result::Result<Credential, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
        ];
        let body = self.token_request(&self.token_url, &params).await?;

        let access = required_token(&body, "access_token")?;
        let refresh = required_token(&body, "refresh_token")?;
        Ok(Credential::new(access, refresh))
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The response may rotate the refresh token; when it does not, the old
    /// refresh token remains valid and is carried forward unchanged.
    pub async fn refresh(
        &self,
        refresh_token: &str,
    ) -> std::result::Result<Credential, AuthError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        let body = self.token_request(&self.refresh_url, &params).await?;

        let access = required_token(&body, "access_token")?;
        let refresh = match body.get("refresh_token").and_then(Value::as_str) {
            Some(rotated) if !rotated.trim().is_empty() => rotated.to_string(),
            _ => refresh_token.to_string(),
        };
        Ok(Credential::new(access, refresh))
    }

    async fn token_request(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> std::result::Result<Value, AuthError> {
        let response = self
            .client
            .post(url)
            .form(params)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if !status.is_success() {
            if body.get("error").and_then(Value::as_str) == Some("invalid_grant") {
                return Err(AuthError::RevokedGrant);
            }
            let message = body
                .get("error_description")
                .and_then(Value::as_str)
                .or_else(|| body.get("message").and_then(Value::as_str))
                .map(str::to_string)
                .unwrap_or_else(|| truncate(&text, 300));
            return Err(AuthError::TokenEndpoint {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}

fn required_token(body: &Value, key: &'static str) -> std::result::Result<String, AuthError> {
    body.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(AuthError::MissingField(key))
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        text.to_string()
    } else {
        let mut end = limit;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

/// Authenticated transport for source API requests
///
/// Holds the tenant's credential behind a mutex (the per-tenant refresh
/// lease) and retries a request exactly once after a 401 by refreshing the
/// access token.
#[derive(Debug)]
pub struct ApiSession {
    client: reqwest::Client,
    authority: Option<TokenAuthority>,
    credential: Mutex<Credential>,
}

impl ApiSession {
    /// Session with automatic refresh on 401
    pub fn new(credential: Credential, authority: TokenAuthority) -> Self {
        Self {
            client: reqwest::Client::new(),
            authority: Some(authority),
            credential: Mutex::new(credential),
        }
    }

    /// Plain session with no refresh (access token only)
    pub fn bearer_only(access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            authority: None,
            credential: Mutex::new(Credential::access_only(access_token)),
        }
    }

    /// Snapshot of the current credential (for persistence after rotation)
    pub async fn credential(&self) -> Credential {
        self.credential.lock().await.clone()
    }

    /// Authenticated GET with one 401-triggered refresh retry
    pub async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> std::result::Result<reqwest::Response, AuthError> {
        let access = self.credential.lock().await.access_token.clone();
        let response = self.send(url, query, &access).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let authority = self.authority.as_ref().ok_or(AuthError::Unauthorized)?;
        debug!(url, "Got 401; refreshing access token");
        let fresh = self.refresh_unless_rotated(authority, &access).await?;

        let retry = self.send(url, query, &fresh).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthError::Unauthorized);
        }
        Ok(retry)
    }

    async fn send(
        &self,
        url: &str,
        query: &[(String, String)],
        access_token: &str,
    ) -> std::result::Result<reqwest::Response, AuthError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(access_token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        Ok(response)
    }

    /// Refresh the credential, unless another task already did while we
    /// waited on the lease (detected by the access token having changed).
    async fn refresh_unless_rotated(
        &self,
        authority: &TokenAuthority,
        stale_access: &str,
    ) -> std::result::Result<String, AuthError> {
        let mut credential = self.credential.lock().await;

        if credential.access_token != stale_access {
            return Ok(credential.access_token.clone());
        }
        if credential.refresh_token.is_empty() {
            return Err(AuthError::Unauthorized);
        }

        let fresh = authority.refresh(&credential.refresh_token).await?;
        info!("Refreshed Lightspeed access token");
        *credential = fresh;
        Ok(credential.access_token.clone())
    }
}
