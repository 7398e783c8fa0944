//! Settings management for CLI set/unset commands.
//!
//! Each configuration key has a handler that edits a draft of the settings
//! document. The caller persists the draft through the configuration store
//! once the handler succeeds.
//!
//! - Backend fields (e.g., `openai_key`, `ollama_url`)
//! - The active backend (`active-backend`)
//! - Overlay membership (`overlay_address`, `overlay_peers`)

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod registry;

pub use error::SettingError;
pub use registry::SettingRegistry;

use crate::core::config::data::Settings;

/// Context provided to setting handlers during set/unset operations.
pub struct SetContext<'a> {
    pub settings: &'a mut Settings,
}

/// Trait for handling a configuration setting.
///
/// Each implementation handles a specific configuration key,
/// providing set, unset, and format operations.
pub trait SettingHandler: Send + Sync {
    /// Returns the configuration key this handler manages.
    fn key(&self) -> &'static str;

    /// Apply the value to the draft and return a success message.
    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError>;

    /// Clear the value in the draft and return a success message.
    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError>;

    /// Format the current value for display in `localhub set` output.
    fn format(&self, settings: &Settings) -> String;
}
