//! Authenticated HTTP client for the conference REST API
//!
//! Wraps reqwest::Client with session token injection and uniform status
//! handling.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;

use crate::config::Config;

const TOKEN_HEADER: &str = "QB-Token";

/// Client bound to one API endpoint and one session token.
pub struct ConferenceClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl ConferenceClient {
    /// Build a client from the stored session. Fails if there is none.
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config
            .session_token
            .as_ref()
            .context("No session. Run 'conference-dialogs login' first.")?;
        if token.is_expired() {
            bail!("Session expired. Run 'conference-dialogs login'.");
        }
        Ok(Self::with_token(config.api_endpoint(), &token.token))
    }

    pub fn with_token(endpoint: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// GET a path and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);

        let resp = self
            .http
            .get(&url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        check_response(resp, &url)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }

    /// POST a JSON body to a path and decode the JSON response.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let resp = self
            .http
            .post(&url)
            .header(TOKEN_HEADER, &self.token)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;

        check_response(resp, &url)
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }

    /// DELETE a path, ignoring the response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        tracing::debug!("DELETE {}", url);

        let resp = self
            .http
            .delete(&url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .with_context(|| format!("DELETE {} failed", url))?;

        check_response(resp, &url).await?;
        Ok(())
    }
}

/// Check HTTP response status code and return a clear error on failure.
async fn check_response(resp: reqwest::Response, url: &str) -> Result<reqwest::Response> {
    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        bail!(
            "401 Unauthorized for {}. Session may be invalid -- run 'conference-dialogs login'.",
            url
        );
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("HTTP {} for {}: {}", status.as_u16(), url, body);
    }
    Ok(resp)
}
