use crate::core::backends::BackendKind;
use crate::core::config::data::{BackendConfig, OverlaySettings, Settings};

pub const DEFAULT_HOSTED_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LOCAL_URL: &str = "http://localhost:11434";
pub const DEFAULT_LOCAL_MODEL: &str = "llama3.1";

impl Settings {
    /// First-run settings, seeded from the environment.
    ///
    /// Only used when no settings file exists yet. A store that exists but
    /// cannot be read falls back to [`Settings::default`] instead.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, fallback: &str| lookup(key).unwrap_or_else(|| fallback.to_string());

        let backends = BackendConfig {
            openai_key: var("OPENAI_API_KEY", ""),
            openai_model: var("OPENAI_MODEL", DEFAULT_HOSTED_MODEL),
            ollama_url: var("OLLAMA_URL", DEFAULT_LOCAL_URL),
            ollama_model: var("OLLAMA_MODEL", DEFAULT_LOCAL_MODEL),
            remote_url: var("REMOTE_URL", ""),
            system_instructions: var("SYSTEM_INSTRUCTIONS", ""),
        }
        .normalized();

        Settings {
            active_backend: BackendKind::default(),
            backends,
            overlay: OverlaySettings {
                self_address: var("OVERLAY_ADDRESS", ""),
                peers: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn from_lookup_uses_builtin_defaults() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings.active_backend, BackendKind::HostedApi);
        assert_eq!(settings.backends.openai_model, DEFAULT_HOSTED_MODEL);
        assert_eq!(settings.backends.ollama_url, DEFAULT_LOCAL_URL);
        assert_eq!(settings.backends.ollama_model, DEFAULT_LOCAL_MODEL);
        assert!(settings.backends.openai_key.is_empty());
        assert!(settings.backends.remote_url.is_empty());
    }

    #[test]
    fn from_lookup_prefers_environment_and_normalizes() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-env"),
            ("OLLAMA_URL", "gpu-box:11434"),
            ("REMOTE_URL", "relay.example.org"),
            ("OVERLAY_ADDRESS", "100.64.0.2"),
        ]
        .into_iter()
        .collect();

        let settings = Settings::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(settings.backends.openai_key, "sk-env");
        assert_eq!(settings.backends.ollama_url, "http://gpu-box:11434");
        assert_eq!(settings.backends.remote_url, "https://relay.example.org");
        assert_eq!(settings.overlay.self_address, "100.64.0.2");
    }
}
