//! Helper functions for settings operations.

use crate::core::backends::BackendKind;

use super::error::SettingError;

/// Validate and resolve a backend identifier or alias.
pub fn validate_backend(input: &str) -> Result<BackendKind, SettingError> {
    input.parse().map_err(|_| SettingError::UnknownBackend {
        input: input.to_string(),
    })
}

pub fn success_set(key: &str, display: &str) -> String {
    format!("✅ Set {key} to: {display}")
}

pub fn success_unset(key: &str) -> String {
    format!("✅ Unset {key}")
}

/// Split a peer list given as separate words or comma-separated values.
pub fn split_peers(args: &[String]) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.split(','))
        .map(str::trim)
        .filter(|peer| !peer.is_empty())
        .map(str::to_string)
        .collect()
}
