//! Backend registry
//!
//! Static description of the AI backends the dashboard can route chat to.
//! The set is closed: adding a backend means adding a `BackendKind` variant
//! and its descriptor below, and the compiler points at every match that
//! needs to learn about it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default base URL for the hosted completion API.
pub const HOSTED_API_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Hosted completion API (OpenAI-compatible), needs an API key and a model.
    #[default]
    HostedApi,
    /// Locally run model server (Ollama-compatible), needs a base URL and a model.
    LocalServer,
    /// User-supplied endpoint that takes `{"message"}` and answers `{"reply"}`.
    RemoteEndpoint,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [
        BackendKind::HostedApi,
        BackendKind::LocalServer,
        BackendKind::RemoteEndpoint,
    ];

    pub fn id(self) -> &'static str {
        match self {
            BackendKind::HostedApi => "hosted-api",
            BackendKind::LocalServer => "local-server",
            BackendKind::RemoteEndpoint => "remote-endpoint",
        }
    }

    pub fn display_name(self) -> &'static str {
        describe(self).display_name
    }

    /// Kinds whose catalog can be discovered over the network.
    pub fn listing_kinds() -> impl Iterator<Item = BackendKind> {
        Self::ALL
            .into_iter()
            .filter(|kind| describe(*kind).supports_model_listing)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBackend(pub String);

impl fmt::Display for UnknownBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown backend '{}' (expected one of: hosted-api, local-server, remote-endpoint)",
            self.0
        )
    }
}

impl std::error::Error for UnknownBackend {}

impl FromStr for BackendKind {
    type Err = UnknownBackend;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hosted-api" | "hosted" | "openai" => Ok(BackendKind::HostedApi),
            "local-server" | "local" | "ollama" => Ok(BackendKind::LocalServer),
            "remote-endpoint" | "remote" => Ok(BackendKind::RemoteEndpoint),
            _ => Err(UnknownBackend(value.to_string())),
        }
    }
}

/// A persisted configuration field. The storage key is the field's identity
/// in the settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    ApiKey,
    HostedModel,
    BaseUrl,
    LocalModel,
    RemoteUrl,
    SystemInstructions,
}

impl ConfigField {
    pub const ALL: [ConfigField; 6] = [
        ConfigField::ApiKey,
        ConfigField::HostedModel,
        ConfigField::BaseUrl,
        ConfigField::LocalModel,
        ConfigField::RemoteUrl,
        ConfigField::SystemInstructions,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ConfigField::ApiKey => "openai_key",
            ConfigField::HostedModel => "openai_model",
            ConfigField::BaseUrl => "ollama_url",
            ConfigField::LocalModel => "ollama_model",
            ConfigField::RemoteUrl => "remote_url",
            ConfigField::SystemInstructions => "system_instructions",
        }
    }

    pub fn from_key(key: &str) -> Option<ConfigField> {
        Self::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(key.trim()))
    }

    /// Whether the value is a secret that must not be echoed back.
    pub fn is_secret(self) -> bool {
        matches!(self, ConfigField::ApiKey)
    }

    /// The backend whose schema lists this field as required, if any.
    pub fn owner(self) -> Option<BackendKind> {
        BackendKind::ALL
            .into_iter()
            .find(|kind| describe(*kind).required_fields.contains(&self))
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug)]
pub struct BackendDescriptor {
    pub kind: BackendKind,
    pub display_name: &'static str,
    /// Fields that must be non-blank before a chat can be dispatched.
    pub required_fields: &'static [ConfigField],
    /// Fields the backend reads when set but does not need.
    pub optional_fields: &'static [ConfigField],
    pub supports_model_listing: bool,
    /// Where requests go. `{field_key}` placeholders name the config field
    /// that supplies the base address.
    pub endpoint_template: &'static str,
    /// Scheme assumed when the configured address has none.
    pub default_scheme: &'static str,
    pub models_path: Option<&'static str>,
    /// Appended to the resolved endpoint for chat; `None` posts to it directly.
    pub chat_path: Option<&'static str>,
}

impl BackendDescriptor {
    /// Every field this backend is allowed to read or write.
    pub fn fields(&self) -> impl Iterator<Item = ConfigField> + '_ {
        self.required_fields
            .iter()
            .chain(self.optional_fields.iter())
            .copied()
    }

    pub fn accepts(&self, field: ConfigField) -> bool {
        self.fields().any(|candidate| candidate == field)
    }

    /// The config field that supplies the endpoint address, when the
    /// template is not a fixed URL.
    pub fn endpoint_field(&self) -> Option<ConfigField> {
        let key = self
            .endpoint_template
            .strip_prefix('{')?
            .strip_suffix('}')?;
        ConfigField::from_key(key)
    }
}

static DESCRIPTORS: [BackendDescriptor; 3] = [
    BackendDescriptor {
        kind: BackendKind::HostedApi,
        display_name: "Hosted API (OpenAI)",
        required_fields: &[ConfigField::ApiKey, ConfigField::HostedModel],
        optional_fields: &[ConfigField::SystemInstructions],
        supports_model_listing: true,
        endpoint_template: HOSTED_API_BASE_URL,
        default_scheme: "https",
        models_path: Some("models"),
        chat_path: Some("chat/completions"),
    },
    BackendDescriptor {
        kind: BackendKind::LocalServer,
        display_name: "Local server (Ollama)",
        required_fields: &[ConfigField::BaseUrl, ConfigField::LocalModel],
        optional_fields: &[ConfigField::SystemInstructions],
        supports_model_listing: true,
        endpoint_template: "{ollama_url}",
        default_scheme: "http",
        models_path: Some("api/tags"),
        chat_path: Some("api/generate"),
    },
    BackendDescriptor {
        kind: BackendKind::RemoteEndpoint,
        display_name: "Remote endpoint",
        required_fields: &[ConfigField::RemoteUrl],
        optional_fields: &[],
        supports_model_listing: false,
        endpoint_template: "{remote_url}",
        default_scheme: "https",
        models_path: None,
        chat_path: None,
    },
];

/// Look up the static descriptor for a backend. Total over `BackendKind`.
pub fn describe(kind: BackendKind) -> &'static BackendDescriptor {
    match kind {
        BackendKind::HostedApi => &DESCRIPTORS[0],
        BackendKind::LocalServer => &DESCRIPTORS[1],
        BackendKind::RemoteEndpoint => &DESCRIPTORS[2],
    }
}
