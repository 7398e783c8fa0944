//! Handlers for per-backend configuration fields.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{success_set, success_unset};
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::backends::ConfigField;
use crate::core::config::data::Settings;
use crate::core::config::printing::{format_field, mask_secret};
use crate::utils::logging::preview;

/// Handler for one backend field such as `openai_key` or `ollama_url`.
pub struct FieldHandler {
    field: ConfigField,
}

impl FieldHandler {
    pub fn new(field: ConfigField) -> Self {
        Self { field }
    }

    fn missing_args(&self) -> SettingError {
        let (hint, example) = match self.field {
            ConfigField::ApiKey => (
                "To set the hosted API key, provide the key:",
                "localhub set openai_key sk-...",
            ),
            ConfigField::HostedModel => (
                "To set the hosted model, provide the model id:",
                "localhub set openai_model gpt-4o-mini",
            ),
            ConfigField::BaseUrl => (
                "To set the local server address, provide its URL:",
                "localhub set ollama_url http://localhost:11434",
            ),
            ConfigField::LocalModel => (
                "To set the local model, provide the model name:",
                "localhub set ollama_model llama3.1",
            ),
            ConfigField::RemoteUrl => (
                "To set the remote endpoint, provide its URL:",
                "localhub set remote_url https://hub.example.org/chat",
            ),
            ConfigField::SystemInstructions => (
                "To set system instructions, provide the instruction text:",
                "localhub set system_instructions \"Answer briefly.\"",
            ),
        };
        SettingError::MissingArgs { hint, example }
    }
}

impl SettingHandler for FieldHandler {
    fn key(&self) -> &'static str {
        self.field.key()
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        let value = args.join(" ");
        if value.trim().is_empty() {
            return Err(self.missing_args());
        }

        let display = if self.field.is_secret() {
            mask_secret(&value)
        } else {
            preview(&value.replace('\n', " "), 50)
        };
        ctx.settings.backends.set(self.field, value);
        Ok(success_set(self.key(), &display))
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        ctx.settings.backends.set(self.field, String::new());
        Ok(success_unset(self.key()))
    }

    fn format(&self, settings: &Settings) -> String {
        let owner = match self.field.owner() {
            Some(kind) => format!(" [{kind}]"),
            None => String::new(),
        };
        format!(
            "  {}{}: {}",
            self.key(),
            owner,
            format_field(settings, self.field)
        )
    }
}
