//! Error types for settings operations.

use std::fmt;

use crate::core::config::StoreUnavailable;

/// Errors that can occur when modifying configuration settings.
#[derive(Debug)]
pub enum SettingError {
    /// The provided setting key is not recognized.
    UnknownKey(String),
    /// The provided backend identifier was not found.
    UnknownBackend { input: String },
    /// Required arguments are missing.
    MissingArgs {
        hint: &'static str,
        example: &'static str,
    },
    /// The draft could not be persisted.
    Store(StoreUnavailable),
}

impl SettingError {
    /// Print the error message to stderr with appropriate formatting.
    pub fn print(&self) {
        match self {
            SettingError::UnknownKey(key) => {
                eprintln!("❌ Unknown config key: {key}");
                eprintln!("   Run 'localhub set' to see the available keys");
            }
            SettingError::UnknownBackend { input } => {
                eprintln!(
                    "❌ Unknown backend: {input}. Run 'localhub backends' to list available backends."
                );
            }
            SettingError::MissingArgs { hint, example } => {
                eprintln!("⚠️  {hint}");
                eprintln!("Example: {example}");
            }
            SettingError::Store(err) => {
                eprintln!("⚠️  {err}");
                eprintln!("   The change applies to this run only.");
            }
        }
    }

    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SettingError::MissingArgs { .. } => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for SettingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingError::UnknownKey(key) => write!(f, "Unknown config key: {key}"),
            SettingError::UnknownBackend { input } => write!(f, "Unknown backend: {input}"),
            SettingError::MissingArgs { hint, .. } => write!(f, "{hint}"),
            SettingError::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SettingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreUnavailable> for SettingError {
    fn from(err: StoreUnavailable) -> Self {
        SettingError::Store(err)
    }
}
