//! Registry of setting handlers.

use std::collections::HashMap;

use super::handlers::{ActiveBackendHandler, FieldHandler, OverlayAddressHandler, OverlayPeersHandler};
use super::SettingHandler;
use crate::core::backends::ConfigField;
use crate::core::config::data::Settings;

/// Registry of all available setting handlers.
pub struct SettingRegistry {
    handlers: HashMap<&'static str, Box<dyn SettingHandler>>,
    /// Keys in display order for `localhub set` output.
    display_order: Vec<&'static str>,
}

impl SettingRegistry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
            display_order: Vec::new(),
        };

        registry.register(Box::new(ActiveBackendHandler));
        for field in ConfigField::ALL {
            registry.register(Box::new(FieldHandler::new(field)));
        }
        registry.register(Box::new(OverlayAddressHandler));
        registry.register(Box::new(OverlayPeersHandler));

        registry
    }

    fn register(&mut self, handler: Box<dyn SettingHandler>) {
        let key = handler.key();
        self.display_order.push(key);
        self.handlers.insert(key, handler);
    }

    /// Get a handler by key. Dashes and underscores are interchangeable.
    pub fn get(&self, key: &str) -> Option<&dyn SettingHandler> {
        let key = key.trim().to_ascii_lowercase();
        self.handlers
            .get(key.as_str())
            .or_else(|| self.handlers.get(key.replace('-', "_").as_str()))
            .or_else(|| self.handlers.get(key.replace('_', "-").as_str()))
            .map(|h| h.as_ref())
    }

    /// Get all keys in display order.
    pub fn keys_display_order(&self) -> &[&'static str] {
        &self.display_order
    }

    /// Every setting formatted for display, in display order.
    pub fn render(&self, settings: &Settings) -> String {
        let mut out = String::from("Current configuration:\n");
        for key in &self.display_order {
            if let Some(handler) = self.handlers.get(key) {
                out.push_str(&handler.format(settings));
                out.push('\n');
            }
        }
        out
    }
}

impl Default for SettingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
