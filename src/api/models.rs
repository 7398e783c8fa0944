use std::fmt;
use std::time::Duration;

use crate::api::{LocalTagsResponse, ModelsResponse};
use crate::core::backends::BackendKind;
use crate::core::router::{BackendRouter, Unconfigured};
use crate::core::config::data::BackendConfig;
use crate::utils::auth::add_auth_headers;

/// Model listing requests give up after this long.
pub const CATALOG_TIMEOUT: Duration = Duration::from_secs(10);

/// Model discovery failed. The dashboard treats every variant as "no models".
#[derive(Debug)]
pub enum CatalogFetchFailed {
    Unconfigured(Unconfigured),
    Transport(reqwest::Error),
    Status { status: u16, body: String },
    Decode(serde_json::Error),
    /// The backend has no model listing to decode.
    NotListable(BackendKind),
}

impl fmt::Display for CatalogFetchFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogFetchFailed::Unconfigured(err) => write!(f, "Cannot list models: {err}"),
            CatalogFetchFailed::Transport(err) => write!(f, "Model listing request failed: {err}"),
            CatalogFetchFailed::Status { status, body } => {
                write!(f, "Model listing failed with status {status}: {body}")
            }
            CatalogFetchFailed::Decode(err) => write!(f, "Unexpected model listing body: {err}"),
            CatalogFetchFailed::NotListable(kind) => write!(f, "{kind} does not list models"),
        }
    }
}

impl std::error::Error for CatalogFetchFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogFetchFailed::Unconfigured(err) => Some(err),
            CatalogFetchFailed::Transport(err) => Some(err),
            CatalogFetchFailed::Status { .. } | CatalogFetchFailed::NotListable(_) => None,
            CatalogFetchFailed::Decode(err) => Some(err),
        }
    }
}

impl From<Unconfigured> for CatalogFetchFailed {
    fn from(err: Unconfigured) -> Self {
        CatalogFetchFailed::Unconfigured(err)
    }
}

impl From<reqwest::Error> for CatalogFetchFailed {
    fn from(err: reqwest::Error) -> Self {
        CatalogFetchFailed::Transport(err)
    }
}

/// A model listing in whichever shape the backend speaks.
#[derive(Debug)]
pub enum CatalogResponse {
    Hosted(ModelsResponse),
    Local(LocalTagsResponse),
}

impl CatalogResponse {
    /// Decode `body` according to the listing format of `kind`.
    ///
    /// Kinds without a listing are rejected before the body is looked at.
    pub fn decode(kind: BackendKind, body: &[u8]) -> Result<Self, CatalogFetchFailed> {
        let parsed = match kind {
            BackendKind::LocalServer => serde_json::from_slice(body).map(CatalogResponse::Local),
            BackendKind::HostedApi => serde_json::from_slice(body).map(CatalogResponse::Hosted),
            BackendKind::RemoteEndpoint => return Err(CatalogFetchFailed::NotListable(kind)),
        };
        parsed.map_err(CatalogFetchFailed::Decode)
    }

    /// Model identifiers in the order the backend listed them.
    pub fn into_model_ids(self) -> Vec<String> {
        match self {
            CatalogResponse::Hosted(response) => {
                response.data.into_iter().map(|model| model.id).collect()
            }
            CatalogResponse::Local(response) => {
                response.models.into_iter().map(|tag| tag.name).collect()
            }
        }
    }
}

/// List the models a backend offers.
///
/// Backends without a model concept yield an empty list without any request.
pub async fn fetch_model_ids(
    client: &reqwest::Client,
    router: &BackendRouter,
    kind: BackendKind,
    config: &BackendConfig,
) -> Result<Vec<String>, CatalogFetchFailed> {
    let Some(discovery) = router.discovery(kind, config)? else {
        return Ok(Vec::new());
    };

    let mut request = client
        .get(&discovery.url)
        .timeout(CATALOG_TIMEOUT)
        .header("Content-Type", "application/json");
    if let Some(api_key) = discovery.api_key.as_deref() {
        request = add_auth_headers(request, kind, api_key);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(CatalogFetchFailed::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body = response.bytes().await?;
    Ok(CatalogResponse::decode(kind, &body)?.into_model_ids())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{MockResponse, MockServer};

    #[test]
    fn local_listing_keeps_backend_order() {
        let body = br#"{"models":[{"name":"llama3"},{"name":"mistral","size":4100000000}]}"#;
        let ids = CatalogResponse::decode(BackendKind::LocalServer, body)
            .unwrap()
            .into_model_ids();
        assert_eq!(ids, vec!["llama3", "mistral"]);
    }

    #[test]
    fn hosted_listing_reads_ids() {
        let body = br#"{"object":"list","data":[{"id":"gpt-4o","owned_by":"openai"},{"id":"gpt-4o-mini","created":1}]}"#;
        let ids = CatalogResponse::decode(BackendKind::HostedApi, body)
            .unwrap()
            .into_model_ids();
        assert_eq!(ids, vec!["gpt-4o", "gpt-4o-mini"]);
    }

    #[test]
    fn wrong_shape_is_a_decode_error() {
        let err = CatalogResponse::decode(BackendKind::LocalServer, br#"{"data":[]}"#)
            .expect_err("local listing needs a models array");
        assert!(matches!(err, CatalogFetchFailed::Decode(_)));
    }

    #[test]
    fn remote_endpoint_has_no_listing_shape() {
        let err = CatalogResponse::decode(BackendKind::RemoteEndpoint, br#"{"data":[{"id":"x"}]}"#)
            .expect_err("remote endpoints do not list models");
        assert!(matches!(
            err,
            CatalogFetchFailed::NotListable(BackendKind::RemoteEndpoint)
        ));
        assert_eq!(err.to_string(), "remote-endpoint does not list models");
    }

    fn local_config(url: &str) -> BackendConfig {
        BackendConfig {
            ollama_url: url.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn fetches_local_tags() {
        let server = MockServer::start(vec![MockResponse::json(
            200,
            r#"{"models":[{"name":"llama3"}]}"#,
        )])
        .await;
        let client = reqwest::Client::new();

        let ids = fetch_model_ids(
            &client,
            &BackendRouter::default(),
            BackendKind::LocalServer,
            &local_config(&server.base_url()),
        )
        .await
        .expect("listing should succeed");

        assert_eq!(ids, vec!["llama3"]);
        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].request_line.starts_with("GET /api/tags "));
        assert!(requests[0].header("authorization").is_none());
    }

    #[tokio::test]
    async fn hosted_listing_sends_bearer_key() {
        let server = MockServer::start(vec![MockResponse::json(
            200,
            r#"{"data":[{"id":"gpt-4o-mini"}]}"#,
        )])
        .await;
        let router = BackendRouter::new(format!("{}/v1", server.base_url()));
        let config = BackendConfig {
            openai_key: "sk-test".to_string(),
            ..Default::default()
        };

        let ids = fetch_model_ids(
            &reqwest::Client::new(),
            &router,
            BackendKind::HostedApi,
            &config,
        )
        .await
        .unwrap();

        assert_eq!(ids, vec!["gpt-4o-mini"]);
        let requests = server.requests();
        assert!(requests[0].request_line.starts_with("GET /v1/models "));
        assert_eq!(
            requests[0].header("authorization").as_deref(),
            Some("Bearer sk-test")
        );
    }

    #[tokio::test]
    async fn hosted_listing_without_key_makes_no_request() {
        let err = fetch_model_ids(
            &reqwest::Client::new(),
            &BackendRouter::new("http://127.0.0.1:9/v1"),
            BackendKind::HostedApi,
            &BackendConfig::default(),
        )
        .await
        .expect_err("blank key cannot list");
        assert!(matches!(err, CatalogFetchFailed::Unconfigured(_)));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server =
            MockServer::start(vec![MockResponse::json(500, r#"{"error":"boom"}"#)]).await;
        let err = fetch_model_ids(
            &reqwest::Client::new(),
            &BackendRouter::default(),
            BackendKind::LocalServer,
            &local_config(&server.base_url()),
        )
        .await
        .expect_err("500 must fail");
        assert!(matches!(err, CatalogFetchFailed::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn remote_endpoint_has_no_catalog() {
        let config = BackendConfig {
            remote_url: "https://relay.example.org".to_string(),
            ..Default::default()
        };
        let ids = fetch_model_ids(
            &reqwest::Client::new(),
            &BackendRouter::default(),
            BackendKind::RemoteEndpoint,
            &config,
        )
        .await
        .unwrap();
        assert!(ids.is_empty());
    }
}
