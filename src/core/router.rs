//! Turns the active backend and a settings snapshot into a concrete request:
//! target URL, payload shape and credential.
//!
//! Routing is pure. It never touches the network, and it only reads fields
//! that are in the chosen backend's schema.

use serde::Serialize;
use std::fmt;

use crate::api::{ChatMessage, HostedChatRequest, LocalGenerateRequest, RemoteChatRequest};
use crate::core::backends::{describe, BackendKind, ConfigField, HOSTED_API_BASE_URL};
use crate::core::config::data::BackendConfig;
use crate::utils::url::{construct_api_url, normalize_base_url, normalize_external_url};

/// A backend cannot be reached because required fields are blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unconfigured {
    pub kind: BackendKind,
    pub missing: Vec<ConfigField>,
}

impl fmt::Display for Unconfigured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.missing.iter().map(|field| field.key()).collect();
        write!(f, "{} is missing {}", self.kind, keys.join(", "))
    }
}

impl std::error::Error for Unconfigured {}

#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum ChatPayload {
    Hosted(HostedChatRequest),
    Local(LocalGenerateRequest),
    Remote(RemoteChatRequest),
}

#[derive(Debug)]
pub struct RoutedRequest {
    pub kind: BackendKind,
    pub url: String,
    pub payload: ChatPayload,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRequest {
    pub kind: BackendKind,
    pub url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BackendRouter {
    hosted_base_url: String,
}

impl Default for BackendRouter {
    fn default() -> Self {
        Self::new(HOSTED_API_BASE_URL)
    }
}

impl BackendRouter {
    pub fn new(hosted_base_url: impl Into<String>) -> Self {
        Self {
            hosted_base_url: normalize_base_url(&hosted_base_url.into()),
        }
    }

    /// Honour `OPENAI_BASE_URL` for OpenAI-compatible gateways.
    pub fn from_env() -> Self {
        match std::env::var("OPENAI_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(normalize_external_url(&url, "https")),
            _ => Self::default(),
        }
    }

    pub fn hosted_base_url(&self) -> &str {
        &self.hosted_base_url
    }

    fn endpoint(&self, kind: BackendKind, config: &BackendConfig) -> Result<String, Unconfigured> {
        let descriptor = describe(kind);
        match descriptor.endpoint_field() {
            None => Ok(self.hosted_base_url.clone()),
            Some(field) => config
                .non_blank_for(kind, field)
                .map(|value| normalize_external_url(value, descriptor.default_scheme))
                .ok_or_else(|| Unconfigured {
                    kind,
                    missing: vec![field],
                }),
        }
    }

    fn credential(&self, kind: BackendKind, config: &BackendConfig) -> Option<String> {
        config
            .non_blank_for(kind, ConfigField::ApiKey)
            .map(str::to_string)
    }

    /// Where to list models for `kind`. `Ok(None)` when the backend has no
    /// model concept.
    pub fn discovery(
        &self,
        kind: BackendKind,
        config: &BackendConfig,
    ) -> Result<Option<DiscoveryRequest>, Unconfigured> {
        let descriptor = describe(kind);
        let Some(models_path) = descriptor.models_path else {
            return Ok(None);
        };

        let api_key = self.credential(kind, config);
        if descriptor.required_fields.contains(&ConfigField::ApiKey) && api_key.is_none() {
            return Err(Unconfigured {
                kind,
                missing: vec![ConfigField::ApiKey],
            });
        }

        let base = self.endpoint(kind, config)?;
        Ok(Some(DiscoveryRequest {
            kind,
            url: construct_api_url(&base, models_path),
            api_key,
        }))
    }

    /// Build the chat request for `kind`. Every required field must be set.
    pub fn route_chat(
        &self,
        kind: BackendKind,
        config: &BackendConfig,
        user_text: &str,
    ) -> Result<RoutedRequest, Unconfigured> {
        let missing = config.missing_required(kind);
        if !missing.is_empty() {
            return Err(Unconfigured { kind, missing });
        }

        let descriptor = describe(kind);
        let base = self.endpoint(kind, config)?;
        let url = match descriptor.chat_path {
            Some(path) => construct_api_url(&base, path),
            None => base,
        };

        let instructions = config.non_blank_for(kind, ConfigField::SystemInstructions);
        let payload = match kind {
            BackendKind::HostedApi => {
                let mut messages = Vec::with_capacity(2);
                if let Some(instructions) = instructions {
                    messages.push(ChatMessage::new("system", instructions));
                }
                messages.push(ChatMessage::new("user", user_text));
                ChatPayload::Hosted(HostedChatRequest {
                    model: field_value(config, kind, ConfigField::HostedModel),
                    messages,
                })
            }
            BackendKind::LocalServer => {
                let prompt = match instructions {
                    Some(instructions) => format!("{instructions}\n\n{user_text}"),
                    None => user_text.to_string(),
                };
                ChatPayload::Local(LocalGenerateRequest {
                    model: field_value(config, kind, ConfigField::LocalModel),
                    prompt,
                    stream: false,
                })
            }
            BackendKind::RemoteEndpoint => ChatPayload::Remote(RemoteChatRequest {
                message: user_text.to_string(),
            }),
        };

        Ok(RoutedRequest {
            kind,
            url,
            payload,
            api_key: self.credential(kind, config),
        })
    }
}

fn field_value(config: &BackendConfig, kind: BackendKind, field: ConfigField) -> String {
    config
        .non_blank_for(kind, field)
        .unwrap_or_default()
        .to_string()
}
