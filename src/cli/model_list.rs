//! Model listing functionality
//!
//! This module handles listing the models each backend offers.

use std::error::Error;

use crate::cli::settings::helpers::validate_backend;
use crate::cli::CliContext;
use crate::core::backends::{describe, BackendKind, ConfigField};
use crate::core::catalog::fetch_models;

pub async fn list_models(ctx: &CliContext, backend: Option<String>) -> Result<(), Box<dyn Error>> {
    let kinds: Vec<BackendKind> = match backend {
        Some(input) => match validate_backend(&input) {
            Ok(kind) => vec![kind],
            Err(err) => {
                err.print();
                std::process::exit(err.exit_code());
            }
        },
        None => BackendKind::listing_kinds().collect(),
    };

    let settings = ctx.store.snapshot();
    for kind in kinds {
        println!("🤖 Available Models for {}", kind.display_name());
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if !describe(kind).supports_model_listing {
            println!("This backend has no model catalog.");
            println!();
            continue;
        }

        let models = fetch_models(&ctx.client, &ctx.router, kind, &settings.backends).await;
        if models.is_empty() {
            println!("No models discovered.");
        } else {
            let configured = configured_model(kind, &settings.backends);
            println!("Found {} models:", models.len());
            println!();
            for model in models {
                let marker = if configured == Some(model.as_str()) {
                    " (configured)"
                } else {
                    ""
                };
                println!("  • {model}{marker}");
            }
        }
        println!();
    }

    Ok(())
}

fn configured_model(
    kind: BackendKind,
    config: &crate::core::config::BackendConfig,
) -> Option<&str> {
    [ConfigField::HostedModel, ConfigField::LocalModel]
        .into_iter()
        .find_map(|field| config.non_blank_for(kind, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::BackendConfig;

    #[test]
    fn configured_model_follows_the_backend_schema() {
        let config = BackendConfig {
            openai_model: "gpt-4o".to_string(),
            ollama_model: "llama3".to_string(),
            ..Default::default()
        };
        assert_eq!(configured_model(BackendKind::HostedApi, &config), Some("gpt-4o"));
        assert_eq!(configured_model(BackendKind::LocalServer, &config), Some("llama3"));
        assert_eq!(configured_model(BackendKind::RemoteEndpoint, &config), None);
    }
}
