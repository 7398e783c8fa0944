//! Handler for the `active-backend` setting.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{success_set, validate_backend};
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::backends::BackendKind;
use crate::core::config::data::Settings;

pub struct ActiveBackendHandler;

impl SettingHandler for ActiveBackendHandler {
    fn key(&self) -> &'static str {
        "active-backend"
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        if args.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To choose the active backend, specify it:",
                example: "localhub set active-backend local-server",
            });
        }

        let kind = validate_backend(&args.join(" "))?;
        ctx.settings.active_backend = kind;
        Ok(success_set(self.key(), kind.id()))
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        ctx.settings.active_backend = BackendKind::default();
        Ok(format!(
            "✅ Unset active-backend (back to {})",
            BackendKind::default()
        ))
    }

    fn format(&self, settings: &Settings) -> String {
        format!(
            "  active-backend: {} ({})",
            settings.active_backend,
            settings.active_backend.display_name()
        )
    }
}
