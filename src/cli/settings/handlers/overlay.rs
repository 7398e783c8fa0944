//! Overlay membership settings.

use crate::cli::settings::error::SettingError;
use crate::cli::settings::helpers::{split_peers, success_set, success_unset};
use crate::cli::settings::{SetContext, SettingHandler};
use crate::core::config::data::Settings;

/// Handler for the `overlay_address` setting.
pub struct OverlayAddressHandler;

impl SettingHandler for OverlayAddressHandler {
    fn key(&self) -> &'static str {
        "overlay_address"
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        let address = args.join(" ").trim().to_string();
        if address.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To set this hub's overlay address, provide it:",
                example: "localhub set overlay_address 100.64.0.1",
            });
        }
        let message = success_set(self.key(), &address);
        ctx.settings.overlay.self_address = address;
        Ok(message)
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        ctx.settings.overlay.self_address.clear();
        Ok(success_unset(self.key()))
    }

    fn format(&self, settings: &Settings) -> String {
        match settings.overlay.self_address.trim() {
            "" => "  overlay_address: (unset)".to_string(),
            address => format!("  overlay_address: {address}"),
        }
    }
}

/// Handler for the `overlay_peers` setting.
pub struct OverlayPeersHandler;

impl SettingHandler for OverlayPeersHandler {
    fn key(&self) -> &'static str {
        "overlay_peers"
    }

    fn set(&self, args: &[String], ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        let peers = split_peers(args);
        if peers.is_empty() {
            return Err(SettingError::MissingArgs {
                hint: "To record overlay peers, list their addresses:",
                example: "localhub set overlay_peers 100.64.0.2,100.64.0.3",
            });
        }
        let message = success_set(self.key(), &peers.join(", "));
        ctx.settings.overlay.peers = peers;
        Ok(message)
    }

    fn unset(&self, ctx: &mut SetContext<'_>) -> Result<String, SettingError> {
        ctx.settings.overlay.peers.clear();
        Ok(success_unset(self.key()))
    }

    fn format(&self, settings: &Settings) -> String {
        if settings.overlay.peers.is_empty() {
            "  overlay_peers: (none)".to_string()
        } else {
            format!("  overlay_peers: {}", settings.overlay.peers.join(", "))
        }
    }
}
