//! Session construction from CLI credentials

use crate::error::{CliError, Result};
use lsx_core::auth::{ApiSession, Credential, TokenAuthority};
use tracing::info;

/// Credentials gathered from flags and environment
#[derive(Debug, Default, Clone)]
pub struct CredentialArgs {
    pub account_id: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl CredentialArgs {
    pub fn account_id(&self) -> Result<&str> {
        non_empty(&self.account_id).ok_or(CliError::MissingCredential("LIGHTSPEED_ACCOUNT_ID"))
    }
}

/// Build an API session from whatever credentials are configured
///
/// With a refresh token and OAuth client credentials the session refreshes
/// itself on 401; an access token missing at startup triggers one bootstrap
/// refresh so a persisted refresh token alone is enough. With only an
/// access token the session is bearer-only and dies on the first 401.
pub async fn build_session(args: &CredentialArgs) -> Result<ApiSession> {
    let access = non_empty(&args.access_token);
    let refresh = non_empty(&args.refresh_token);
    let client_id = non_empty(&args.client_id);
    let client_secret = non_empty(&args.client_secret);

    if let (Some(refresh), Some(client_id), Some(client_secret)) =
        (refresh, client_id, client_secret)
    {
        let authority = TokenAuthority::new(client_id, client_secret);
        let credential = match access {
            Some(access) => Credential::new(access, refresh),
            None => {
                info!("No access token configured; refreshing before first request");
                authority.refresh(refresh).await?
            },
        };
        return Ok(ApiSession::new(credential, authority));
    }

    match access {
        Some(access) => Ok(ApiSession::bearer_only(access)),
        None => Err(CliError::MissingCredential("LIGHTSPEED_ACCESS_TOKEN")),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
