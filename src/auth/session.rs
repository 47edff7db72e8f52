//! Session creation and teardown against the REST API
//!
//! Session requests are authenticated by an HMAC-SHA1 signature over the
//! request parameters, keyed with the application's auth secret.

use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha1::Sha1;

use crate::config::AppCredentials;

type HmacSha1 = Hmac<Sha1>;

/// Sessions live for two hours on the server side.
pub const SESSION_TTL_SECS: u64 = 2 * 60 * 60;

#[derive(Debug, Deserialize)]
struct SessionResponse {
    session: Session,
}

/// Session returned by `POST /session.json`
#[derive(Debug, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: u64,
}

/// Join parameters as `k=v&k=v` in key order (the string that gets signed).
fn canonical_params(params: &BTreeMap<&str, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// HMAC-SHA1 of `payload` keyed with `secret`, lowercase hex.
pub fn sign(secret: &str, payload: &str) -> Result<String> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|_| anyhow!("Invalid auth secret"))?;
    mac.update(payload.as_bytes());
    Ok(mac
        .finalize()
        .into_bytes()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect())
}

fn nonce() -> Result<u32> {
    let mut buf = [0u8; 4];
    getrandom::getrandom(&mut buf).map_err(|e| anyhow!("Failed to generate nonce: {}", e))?;
    // Keep it positive and non-zero; the server rejects 0.
    Ok((u32::from_le_bytes(buf) % (i32::MAX as u32)).max(1))
}

/// Build the signed form for a user session.
fn session_params(
    creds: &AppCredentials,
    login: &str,
    password: &str,
    nonce: u32,
    timestamp: i64,
) -> Result<BTreeMap<&'static str, String>> {
    let mut params = BTreeMap::new();
    params.insert("application_id", creds.application_id.to_string());
    params.insert("auth_key", creds.auth_key.clone());
    params.insert("nonce", nonce.to_string());
    params.insert("timestamp", timestamp.to_string());
    params.insert("user[login]", login.to_string());
    params.insert("user[password]", password.to_string());

    let signature = sign(&creds.auth_secret, &canonical_params(&params))?;
    params.insert("signature", signature);
    Ok(params)
}

/// Create a user session. Returns the session token and user ID.
pub async fn create_session(
    http: &reqwest::Client,
    endpoint: &str,
    creds: &AppCredentials,
    login: &str,
    password: &str,
) -> Result<Session> {
    let params = session_params(creds, login, password, nonce()?, Utc::now().timestamp())?;
    let url = format!("{}/session.json", endpoint);
    tracing::debug!("Session POST {}", url);

    let resp = http
        .post(&url)
        .form(&params)
        .send()
        .await
        .with_context(|| format!("Session POST {} failed", url))?;

    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        bail!("Login rejected: wrong login, password or application credentials.");
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("Session creation failed: HTTP {}: {}", status.as_u16(), body);
    }

    let body: SessionResponse = resp
        .json()
        .await
        .context("Failed to parse session response")?;
    Ok(body.session)
}

/// Destroy the server-side session for `token`.
pub async fn destroy_session(http: &reqwest::Client, endpoint: &str, token: &str) -> Result<()> {
    let url = format!("{}/session.json", endpoint);
    tracing::debug!("Session DELETE {}", url);

    let resp = http
        .delete(&url)
        .header("QB-Token", token)
        .send()
        .await
        .with_context(|| format!("Session DELETE {} failed", url))?;

    // An already-expired session is as good as destroyed.
    let status = resp.status();
    if !status.is_success() && status != reqwest::StatusCode::UNAUTHORIZED {
        bail!("Session teardown failed: HTTP {}", status.as_u16());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> AppCredentials {
        AppCredentials {
            application_id: 72448,
            auth_key: "f4HYBYdeqTZ7KNb".to_string(),
            auth_secret: "ZC7dK39VMw2Bt2W".to_string(),
        }
    }

    #[test]
    fn test_sign_known_vector() {
        let sig = sign("key", "The quick brown fox jumps over the lazy dog").unwrap();
        assert_eq!(sig, "de7c9b85b8b78aa6bc8a7a36f70a90701c9db4d9");
    }

    #[test]
    fn test_params_are_signed_in_key_order() {
        let params = session_params(&creds(), "ann", "secret", 33432, 1539264000).unwrap();

        let mut unsigned = params.clone();
        let signature = unsigned.remove("signature").unwrap();
        let canonical = canonical_params(&unsigned);
        assert_eq!(
            canonical,
            "application_id=72448&auth_key=f4HYBYdeqTZ7KNb&nonce=33432\
             &timestamp=1539264000&user[login]=ann&user[password]=secret"
        );
        assert_eq!(signature, sign("ZC7dK39VMw2Bt2W", &canonical).unwrap());
        assert_eq!(signature.len(), 40);
    }

    #[test]
    fn test_nonce_is_positive() {
        for _ in 0..100 {
            let n = nonce().unwrap();
            assert!(n >= 1 && n < i32::MAX as u32);
        }
    }
}
