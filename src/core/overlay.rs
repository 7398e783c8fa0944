//! Peer overlay boundary.
//!
//! The dashboard shows this hub's overlay address, the peers it knows about
//! and whether the hub answers a health probe. It never routes anything over
//! the overlay itself.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::core::config::data::OverlaySettings;

/// Health probes give up after this long.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_HEALTH_PORT: &str = "8088";

/// Source of overlay membership.
#[async_trait]
pub trait PeerOverlay: Send + Sync {
    async fn self_address(&self) -> String;
    async fn peers(&self) -> Vec<String>;
}

/// Overlay membership as recorded in the settings document.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredOverlay {
    settings: OverlaySettings,
}

impl ConfiguredOverlay {
    pub fn new(settings: OverlaySettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl PeerOverlay for ConfiguredOverlay {
    async fn self_address(&self) -> String {
        self.settings.self_address.trim().to_string()
    }

    async fn peers(&self) -> Vec<String> {
        self.settings
            .peers
            .iter()
            .map(|peer| peer.trim())
            .filter(|peer| !peer.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Health URL for an overlay address.
///
/// Full URLs pass through. A bare host gets `http://`, port 8088 and
/// `/health` unless it names its own port or path. Returns `None` when no
/// host can be found.
pub fn overlay_health_url(address: &str) -> Option<String> {
    let target = address.trim();
    if target.is_empty() {
        return None;
    }
    if target.contains("://") {
        return Some(target.to_string());
    }

    let (host_port, path) = match target.split_once('/') {
        Some((host_port, rest)) => (host_port, format!("/{}", rest.trim_start_matches('/'))),
        None => (target, "/health".to_string()),
    };
    let (host, port) = match host_port.split_once(':') {
        Some((host, port)) => (host.trim(), port.trim()),
        None => (host_port.trim(), DEFAULT_HEALTH_PORT),
    };
    if host.is_empty() {
        return None;
    }
    let port = if port.is_empty() {
        DEFAULT_HEALTH_PORT
    } else {
        port
    };
    Some(format!("http://{host}:{port}{path}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayStatus {
    pub reachable: bool,
    pub latency_ms: Option<u64>,
    pub last_checked: DateTime<Utc>,
    pub detail: String,
    pub tested_url: Option<String>,
}

#[derive(Deserialize)]
struct HealthBody {
    status: Option<String>,
}

/// Probe the hub's health endpoint once.
pub async fn check_connectivity(client: &reqwest::Client, address: &str) -> OverlayStatus {
    let mut status = OverlayStatus {
        reachable: false,
        latency_ms: None,
        last_checked: Utc::now(),
        detail: String::new(),
        tested_url: None,
    };

    if address.trim().is_empty() {
        status.detail = "No overlay address configured".to_string();
        return status;
    }
    let Some(url) = overlay_health_url(address) else {
        status.detail = "Invalid overlay address".to_string();
        return status;
    };

    let started = Instant::now();
    match client.get(&url).timeout(PROBE_TIMEOUT).send().await {
        Ok(response) => {
            status.latency_ms = Some(started.elapsed().as_millis() as u64);
            status.last_checked = Utc::now();
            if response.status().as_u16() == 200 {
                status.reachable = true;
                status.detail = match response.json::<HealthBody>().await {
                    Ok(body) => body.status.unwrap_or_else(|| "ok".to_string()),
                    Err(_) => "reachable".to_string(),
                };
            } else {
                status.detail = format!("HTTP {}", response.status().as_u16());
            }
        }
        Err(err) => status.detail = err.to_string(),
    }

    debug!(
        url = %url,
        reachable = status.reachable,
        latency_ms = ?status.latency_ms,
        "Overlay probe finished"
    );
    status.tested_url = Some(url);
    status
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{refused_url, MockResponse, MockServer};

    #[test]
    fn health_url_fills_in_port_and_path() {
        assert_eq!(
            overlay_health_url("100.64.0.1").as_deref(),
            Some("http://100.64.0.1:8088/health")
        );
        assert_eq!(
            overlay_health_url("hub:9000").as_deref(),
            Some("http://hub:9000/health")
        );
        assert_eq!(
            overlay_health_url("hub/status").as_deref(),
            Some("http://hub:8088/status")
        );
        assert_eq!(
            overlay_health_url("hub:/ping").as_deref(),
            Some("http://hub:8088/ping")
        );
        assert_eq!(
            overlay_health_url("https://hub.example.org/health").as_deref(),
            Some("https://hub.example.org/health")
        );
        assert_eq!(overlay_health_url("   "), None);
        assert_eq!(overlay_health_url(":8088"), None);
    }

    #[tokio::test]
    async fn configured_overlay_skips_blank_peers() {
        let overlay = ConfiguredOverlay::new(OverlaySettings {
            self_address: " 100.64.0.1 ".to_string(),
            peers: vec!["100.64.0.2".to_string(), " ".to_string()],
        });
        assert_eq!(overlay.self_address().await, "100.64.0.1");
        assert_eq!(overlay.peers().await, vec!["100.64.0.2"]);
    }

    #[tokio::test]
    async fn probe_reports_status_detail() {
        let server = MockServer::start(vec![MockResponse::json(200, r#"{"status":"ok"}"#)]).await;
        let status = check_connectivity(&reqwest::Client::new(), &server.url("health")).await;
        assert!(status.reachable);
        assert_eq!(status.detail, "ok");
        assert!(status.latency_ms.is_some());
        assert_eq!(status.tested_url, Some(server.url("health")));
    }

    #[tokio::test]
    async fn probe_reports_http_failures_and_missing_address() {
        let server = MockServer::start(vec![MockResponse::json(503, "{}")]).await;
        let client = reqwest::Client::new();

        let down = check_connectivity(&client, &server.url("health")).await;
        assert!(!down.reachable);
        assert_eq!(down.detail, "HTTP 503");

        let refused = check_connectivity(&client, &refused_url().await).await;
        assert!(!refused.reachable);
        assert!(refused.latency_ms.is_none());

        let unset = check_connectivity(&client, "").await;
        assert_eq!(unset.detail, "No overlay address configured");
        assert_eq!(unset.tested_url, None);
    }
}
