//! Network reachability of the API host

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpStream;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Whether the API host can currently be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    NotConnected,
    Connected,
}

/// Extract host and port (scheme default if absent) from an endpoint URL.
fn host_port(endpoint: &str) -> Result<(String, u16)> {
    let url = Url::parse(endpoint).with_context(|| format!("Invalid endpoint URL: {}", endpoint))?;
    let host = url
        .host_str()
        .with_context(|| format!("Endpoint has no host: {}", endpoint))?
        .to_string();
    let port = url
        .port_or_known_default()
        .with_context(|| format!("Endpoint has no port: {}", endpoint))?;
    Ok((host, port))
}

/// Probe the endpoint with a TCP connect.
pub async fn probe(endpoint: &str) -> NetworkStatus {
    let (host, port) = match host_port(endpoint) {
        Ok(hp) => hp,
        Err(e) => {
            tracing::warn!("{:#}", e);
            return NetworkStatus::NotConnected;
        }
    };

    match tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect((host.as_str(), port))).await {
        Ok(Ok(_)) => NetworkStatus::Connected,
        Ok(Err(e)) => {
            tracing::debug!("Reachability probe to {}:{} failed: {}", host, port, e);
            NetworkStatus::NotConnected
        }
        Err(_) => {
            tracing::debug!("Reachability probe to {}:{} timed out", host, port);
            NetworkStatus::NotConnected
        }
    }
}
