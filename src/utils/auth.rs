//! Authentication utilities for backend requests
//!
//! Only the hosted completion API takes a credential. Local model servers and
//! user-supplied endpoints are reached without one, so nothing is attached
//! for them even if an API key happens to be configured.

use crate::core::backends::BackendKind;

/// Add backend-specific authentication headers to an HTTP request
pub fn add_auth_headers(
    request: reqwest::RequestBuilder,
    kind: BackendKind,
    api_key: &str,
) -> reqwest::RequestBuilder {
    match kind {
        BackendKind::HostedApi => request.header("Authorization", format!("Bearer {api_key}")),
        BackendKind::LocalServer | BackendKind::RemoteEndpoint => request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authorization(kind: BackendKind) -> Option<String> {
        let client = reqwest::Client::new();
        let request = add_auth_headers(client.get("https://example.com"), kind, "sk-test")
            .build()
            .expect("request should build");
        request
            .headers()
            .get("authorization")
            .map(|value| value.to_str().unwrap().to_string())
    }

    #[test]
    fn hosted_api_uses_bearer_token() {
        assert_eq!(
            authorization(BackendKind::HostedApi).as_deref(),
            Some("Bearer sk-test")
        );
    }

    #[test]
    fn local_and_remote_send_no_credentials() {
        assert_eq!(authorization(BackendKind::LocalServer), None);
        assert_eq!(authorization(BackendKind::RemoteEndpoint), None);
    }
}
