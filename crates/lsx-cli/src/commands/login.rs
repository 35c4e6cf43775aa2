//! `lsx login` - interactive OAuth authorization flow
//!
//! Opens the Lightspeed authorization page, captures the redirect on a
//! loopback listener, exchanges the code for tokens, and persists them to
//! the project's .env file.

use crate::envfile;
use crate::error::{CliError, Result};
use lsx_core::auth::{self, TokenAuthority};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::debug;

/// How long to wait for the user to approve before giving up
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

const CALLBACK_RESPONSE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
<html><body><h3>Authorization received.</h3><p>You can close this window and return to the terminal.</p></body></html>";

pub async fn run(
    client_id: Option<String>,
    client_secret: Option<String>,
    port: u16,
    no_browser: bool,
) -> Result<()> {
    let client_id = required(client_id, "LIGHTSPEED_CLIENT_ID")?;
    let client_secret = required(client_secret, "LIGHTSPEED_CLIENT_SECRET")?;

    let state: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    let redirect_uri = format!("http://127.0.0.1:{port}/callback");
    let url = auth::authorize_url(&client_id, &redirect_uri, &state);

    println!("Authorize this application in your browser:");
    println!("  {url}");

    let (code, returned_state) = if no_browser {
        println!("After approving, paste the full redirect URL here:");
        read_pasted_callback()?
    } else {
        if open::that(&url).is_err() {
            println!("(could not open a browser automatically; open the URL manually)");
        }
        capture_loopback_callback(port, CALLBACK_TIMEOUT).await?
    };

    if returned_state != state {
        return Err(CliError::Login(
            "state mismatch in the OAuth redirect".to_string(),
        ));
    }

    let authority = TokenAuthority::new(client_id, client_secret);
    let credential = authority.exchange_code(&code, &redirect_uri).await?;

    envfile::upsert(
        Path::new(".env"),
        &[
            ("LIGHTSPEED_ACCESS_TOKEN", &credential.access_token),
            ("LIGHTSPEED_REFRESH_TOKEN", &credential.refresh_token),
        ],
    )?;
    println!("Tokens saved to .env. You can now run 'lsx export'.");
    Ok(())
}

/// Wait for the OAuth redirect on the loopback listener
///
/// Gives up after `timeout` if no redirect with a code arrives.
async fn capture_loopback_callback(port: u16, timeout: Duration) -> Result<(String, String)> {
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    println!("Waiting for the authorization redirect on 127.0.0.1:{port}...");

    tokio::time::timeout(timeout, accept_callback(listener))
        .await
        .map_err(|_| {
            CliError::Login("timed out waiting for the authorization redirect".to_string())
        })?
}

async fn accept_callback(listener: TcpListener) -> Result<(String, String)> {
    loop {
        let (mut stream, peer) = listener.accept().await?;
        debug!(%peer, "Callback connection");

        let mut buffer = vec![0u8; 4096];
        let read = stream.read(&mut buffer).await?;
        let request = String::from_utf8_lossy(&buffer[..read]).to_string();

        stream.write_all(CALLBACK_RESPONSE.as_bytes()).await?;
        let _ = stream.shutdown().await;

        // First line: GET /callback?code=...&state=... HTTP/1.1
        let target = request
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .unwrap_or_default();
        if let Some(params) = parse_callback_params(target) {
            return Ok(params);
        }
        // Browsers also request /favicon.ico; keep listening.
    }
}

fn read_pasted_callback() -> Result<(String, String)> {
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    parse_callback_params(line.trim())
        .ok_or_else(|| CliError::Login("no code parameter in the pasted URL".to_string()))
}

/// Extract `code` and `state` from a redirect URL or raw query string
fn parse_callback_params(input: &str) -> Option<(String, String)> {
    let query = input.split_once('?').map(|(_, q)| q).unwrap_or(input);
    let mut code = None;
    let mut state = None;
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=')?;
        let value = urlencoding::decode(value).ok()?.into_owned();
        match key {
            "code" => code = Some(value),
            "state" => state = Some(value),
            _ => {},
        }
    }
    Some((code?, state.unwrap_or_default()))
}

fn required(value: Option<String>, name: &'static str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(CliError::MissingCredential(name))
}
