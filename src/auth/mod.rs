//! Authentication module
//!
//! Application credentials are stored once with `setup`; `login` then creates
//! a signed user session and caches the token and user profile in the config.

pub mod session;
pub mod tokens;

use anyhow::Result;

pub use tokens::StoredToken;

use crate::api::{self, ConferenceClient};
use crate::config::{AppCredentials, Config};

/// Store application credentials and optionally a custom API endpoint.
pub fn setup(credentials: AppCredentials, endpoint: Option<String>) -> Result<()> {
    let mut config = Config::load()?;
    config.credentials = Some(credentials);
    if endpoint.is_some() {
        config.api_endpoint = endpoint;
    }
    config.clear_session();
    config.save()?;
    println!("Application credentials saved.");
    Ok(())
}

/// Create a user session and cache it.
pub async fn login(login: &str, password: &str, force: bool) -> Result<()> {
    let mut config = Config::load()?;

    if !force {
        if let Some(token) = &config.session_token {
            if !token.is_expired() {
                println!("Already logged in. Use --force to re-authenticate.");
                return Ok(());
            }
        }
    }

    let http = reqwest::Client::new();
    let creds = config.credentials()?.clone();
    let session =
        session::create_session(&http, config.api_endpoint(), &creds, login, password).await?;
    tracing::info!("Session created for user {}", session.user_id);

    let client = ConferenceClient::with_token(config.api_endpoint(), &session.token);
    let user = api::fetch_user(&client, session.user_id).await?;

    let name = user.display_name();
    config.set_session(session.token, Some(session::SESSION_TTL_SECS), user);
    config.save()?;

    match config.room() {
        Some(room) => println!("Logged in as {} (room: {}).", name, room),
        None => println!("Logged in as {} (no room tag).", name),
    }
    Ok(())
}

/// Destroy the session and clear cached credentials.
pub async fn logout() -> Result<()> {
    let mut config = Config::load()?;

    if let Some(token) = &config.session_token {
        let http = reqwest::Client::new();
        if let Err(e) = session::destroy_session(&http, config.api_endpoint(), &token.token).await
        {
            tracing::warn!("Remote logout failed, clearing local session anyway: {:#}", e);
        }
    }

    config.clear_session();
    config.save()?;
    println!("Logged out.");
    Ok(())
}

/// Display current auth status
pub fn status() -> Result<()> {
    let config = Config::load()?;

    println!("Endpoint:    {}", config.api_endpoint());
    match &config.credentials {
        Some(creds) => println!("Application: {}", creds.application_id),
        None => println!("Application: not configured"),
    }

    match &config.session_token {
        Some(token) if !token.is_expired() => {
            println!("Session:     valid");
            if let Some(exp) = token.expires_at {
                println!("  expires_at: {}", exp);
            }
        }
        Some(_) => println!("Session:     expired"),
        None => println!("Session:     none"),
    }

    if let Some(user) = &config.current_user {
        println!("User:        {} ({})", user.display_name(), user.id);
        println!("Room:        {}", config.room().unwrap_or("(none)"));
    }

    Ok(())
}
