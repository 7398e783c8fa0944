//! Model catalog held by the dashboard and the soft fetch that fills it.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::api::models::fetch_model_ids;
use crate::core::backends::BackendKind;
use crate::core::config::data::BackendConfig;
use crate::core::router::BackendRouter;

/// Model ids per backend, only for kinds that list models.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    entries: HashMap<BackendKind, Vec<String>>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Models for `kind` in backend order; empty until a fetch succeeds.
    pub fn models(&self, kind: BackendKind) -> &[String] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Replace the list for `kind` wholesale. An empty list resets it.
    pub fn replace(&mut self, kind: BackendKind, models: Vec<String>) {
        if models.is_empty() {
            self.entries.remove(&kind);
        } else {
            self.entries.insert(kind, models);
        }
    }
}

/// List models for `kind`, collapsing every failure to an empty list.
///
/// One request, no retry, no caching.
pub async fn fetch_models(
    client: &reqwest::Client,
    router: &BackendRouter,
    kind: BackendKind,
    config: &BackendConfig,
) -> Vec<String> {
    debug!(backend = %kind, "Fetching model catalog");
    match fetch_model_ids(client, router, kind, config).await {
        Ok(models) => {
            debug!(backend = %kind, count = models.len(), "Model catalog fetched");
            models
        }
        Err(err) => {
            info!(backend = %kind, error = %err, "Model catalog unavailable");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{refused_url, CapturedLogs, MockResponse, MockServer};
    use tracing::Level;

    fn local_config(url: &str) -> BackendConfig {
        BackendConfig {
            ollama_url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn catalog_is_replaced_wholesale_and_reset_on_empty() {
        let mut catalog = ModelCatalog::new();
        assert!(catalog.models(BackendKind::LocalServer).is_empty());

        catalog.replace(
            BackendKind::LocalServer,
            vec!["llama3".to_string(), "mistral".to_string()],
        );
        catalog.replace(BackendKind::LocalServer, vec!["phi3".to_string()]);
        assert_eq!(catalog.models(BackendKind::LocalServer), ["phi3"]);

        catalog.replace(BackendKind::LocalServer, Vec::new());
        assert!(catalog.models(BackendKind::LocalServer).is_empty());
    }

    #[tokio::test]
    async fn unreachable_catalog_logs_below_warn() {
        let logs = CapturedLogs::new();
        let _guard = logs.install();

        let models = fetch_models(
            &reqwest::Client::new(),
            &BackendRouter::default(),
            BackendKind::LocalServer,
            &local_config(&refused_url().await),
        )
        .await;

        assert!(models.is_empty());
        assert!(logs.at(Level::WARN).is_empty());
        assert!(logs.at(Level::ERROR).is_empty());
        assert_eq!(logs.at(Level::INFO), vec!["Model catalog unavailable"]);
    }

    #[tokio::test]
    async fn local_server_catalog_lists_names() {
        let server = MockServer::start(vec![MockResponse::json(
            200,
            r#"{"models":[{"name":"llama3"}]}"#,
        )])
        .await;
        let models = fetch_models(
            &reqwest::Client::new(),
            &BackendRouter::default(),
            BackendKind::LocalServer,
            &local_config(&server.base_url()),
        )
        .await;
        assert_eq!(models, vec!["llama3"]);
    }

    #[tokio::test]
    async fn repeated_fetches_agree() {
        let server = MockServer::start(vec![MockResponse::json(
            200,
            r#"{"models":[{"name":"b"},{"name":"a"},{"name":"c"}]}"#,
        )])
        .await;
        let client = reqwest::Client::new();
        let router = BackendRouter::default();
        let config = local_config(&server.base_url());

        let first = fetch_models(&client, &router, BackendKind::LocalServer, &config).await;
        let second = fetch_models(&client, &router, BackendKind::LocalServer, &config).await;
        assert_eq!(first, vec!["b", "a", "c"]);
        assert_eq!(first, second);
        assert_eq!(server.requests().len(), 2);
    }

    #[tokio::test]
    async fn failures_collapse_to_empty() {
        let client = reqwest::Client::new();
        let router = BackendRouter::default();

        let refused = local_config(&refused_url().await);
        assert!(fetch_models(&client, &router, BackendKind::LocalServer, &refused)
            .await
            .is_empty());

        let server = MockServer::start(vec![MockResponse::json(200, "not json")]).await;
        let garbled = local_config(&server.base_url());
        assert!(fetch_models(&client, &router, BackendKind::LocalServer, &garbled)
            .await
            .is_empty());

        assert!(fetch_models(
            &client,
            &router,
            BackendKind::HostedApi,
            &BackendConfig::default()
        )
        .await
        .is_empty());
    }
}
