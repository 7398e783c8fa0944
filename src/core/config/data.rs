use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::backends::{describe, BackendKind, ConfigField};
use crate::utils::url::normalize_external_url;

/// Per-backend credentials and endpoints. Empty strings mean "unset".
///
/// Fields are stored flat under their storage keys, but code outside this
/// module goes through [`BackendConfig::value_for`] and
/// [`BackendConfig::set_for`], which refuse fields that are not part of the
/// given backend's schema.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BackendConfig {
    pub openai_key: String,
    pub openai_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub remote_url: String,
    pub system_instructions: String,
}

/// Address of this hub on the private peer overlay and the peers it knows.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct OverlaySettings {
    pub self_address: String,
    pub peers: Vec<String>,
}

/// The whole settings document as persisted.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub active_backend: BackendKind,
    pub backends: BackendConfig,
    pub overlay: OverlaySettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldNotApplicable {
    pub kind: BackendKind,
    pub field: ConfigField,
}

impl fmt::Display for FieldNotApplicable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field '{}' is not part of the {} configuration",
            self.field, self.kind
        )
    }
}

impl std::error::Error for FieldNotApplicable {}

impl BackendConfig {
    fn slot(&self, field: ConfigField) -> &String {
        match field {
            ConfigField::ApiKey => &self.openai_key,
            ConfigField::HostedModel => &self.openai_model,
            ConfigField::BaseUrl => &self.ollama_url,
            ConfigField::LocalModel => &self.ollama_model,
            ConfigField::RemoteUrl => &self.remote_url,
            ConfigField::SystemInstructions => &self.system_instructions,
        }
    }

    fn slot_mut(&mut self, field: ConfigField) -> &mut String {
        match field {
            ConfigField::ApiKey => &mut self.openai_key,
            ConfigField::HostedModel => &mut self.openai_model,
            ConfigField::BaseUrl => &mut self.ollama_url,
            ConfigField::LocalModel => &mut self.ollama_model,
            ConfigField::RemoteUrl => &mut self.remote_url,
            ConfigField::SystemInstructions => &mut self.system_instructions,
        }
    }

    /// Raw value of a field regardless of backend. Used for whole-document
    /// views such as `localhub set` output.
    pub fn get(&self, field: ConfigField) -> &str {
        self.slot(field)
    }

    /// Replace a field regardless of backend.
    pub fn set(&mut self, field: ConfigField, value: impl Into<String>) {
        *self.slot_mut(field) = value.into();
    }

    /// Read a field as seen by `kind`. Returns `None` when the field is not
    /// in that backend's schema.
    pub fn value_for(&self, kind: BackendKind, field: ConfigField) -> Option<&str> {
        describe(kind)
            .accepts(field)
            .then(|| self.slot(field).as_str())
    }

    /// Like [`value_for`](Self::value_for) but treats blank values as unset.
    pub fn non_blank_for(&self, kind: BackendKind, field: ConfigField) -> Option<&str> {
        self.value_for(kind, field)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn set_for(
        &mut self,
        kind: BackendKind,
        field: ConfigField,
        value: impl Into<String>,
    ) -> Result<(), FieldNotApplicable> {
        if !describe(kind).accepts(field) {
            return Err(FieldNotApplicable { kind, field });
        }
        *self.slot_mut(field) = value.into();
        Ok(())
    }

    /// Required fields of `kind` that are still blank.
    pub fn missing_required(&self, kind: BackendKind) -> Vec<ConfigField> {
        describe(kind)
            .required_fields
            .iter()
            .copied()
            .filter(|field| self.slot(*field).trim().is_empty())
            .collect()
    }

    pub fn is_configured(&self, kind: BackendKind) -> bool {
        self.missing_required(kind).is_empty()
    }

    /// Give URL fields a scheme, using each owning backend's default.
    pub fn normalized(mut self) -> Self {
        for kind in BackendKind::ALL {
            let descriptor = describe(kind);
            if let Some(field) = descriptor.endpoint_field() {
                let slot = self.slot_mut(field);
                *slot = normalize_external_url(slot, descriptor.default_scheme);
            }
        }
        self
    }
}

impl Settings {
    pub fn new(active_backend: BackendKind, backends: BackendConfig) -> Self {
        Self {
            active_backend,
            backends,
            overlay: OverlaySettings::default(),
        }
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> BackendConfig {
        BackendConfig {
            openai_key: "sk-test".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.1".to_string(),
            remote_url: "https://hub.example.org/chat".to_string(),
            system_instructions: "Be brief.".to_string(),
        }
    }

    #[test]
    fn fields_outside_schema_are_never_read() {
        let config = filled();
        for kind in BackendKind::ALL {
            for field in ConfigField::ALL {
                let seen = config.value_for(kind, field);
                assert_eq!(seen.is_some(), describe(kind).accepts(field));
            }
        }
        assert_eq!(
            config.value_for(BackendKind::RemoteEndpoint, ConfigField::ApiKey),
            None
        );
        assert_eq!(
            config.value_for(BackendKind::HostedApi, ConfigField::ApiKey),
            Some("sk-test")
        );
    }

    #[test]
    fn fields_outside_schema_are_never_written() {
        let mut config = BackendConfig::default();
        let err = config
            .set_for(BackendKind::RemoteEndpoint, ConfigField::LocalModel, "llama3")
            .expect_err("remote has no model");
        assert_eq!(err.kind, BackendKind::RemoteEndpoint);
        assert!(config.ollama_model.is_empty());

        config
            .set_for(BackendKind::LocalServer, ConfigField::LocalModel, "llama3")
            .expect("local accepts a model");
        assert_eq!(config.ollama_model, "llama3");
    }

    #[test]
    fn missing_required_treats_whitespace_as_blank() {
        let mut config = filled();
        config.openai_key = "   ".to_string();
        assert_eq!(
            config.missing_required(BackendKind::HostedApi),
            vec![ConfigField::ApiKey]
        );
        assert!(config.is_configured(BackendKind::LocalServer));
        assert!(!BackendConfig::default().is_configured(BackendKind::RemoteEndpoint));
    }

    #[test]
    fn normalized_adds_schemes_per_backend() {
        let config = BackendConfig {
            ollama_url: "10.0.0.7:11434".to_string(),
            remote_url: "hub.example.org/chat".to_string(),
            ..Default::default()
        }
        .normalized();
        assert_eq!(config.ollama_url, "http://10.0.0.7:11434");
        assert_eq!(config.remote_url, "https://hub.example.org/chat");
    }

    #[test]
    fn normalized_leaves_blank_urls_blank() {
        let config = BackendConfig::default().normalized();
        assert_eq!(config, BackendConfig::default());
    }
}
