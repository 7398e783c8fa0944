use std::error::Error;

use crate::cli::CliContext;
use crate::core::backends::{describe, BackendKind};

pub fn list_backends(ctx: &CliContext) -> Result<(), Box<dyn Error>> {
    let settings = ctx.store.snapshot();
    print!("{}", render_backends(&settings.backends, settings.active_backend));
    Ok(())
}

pub fn render_backends(
    config: &crate::core::config::BackendConfig,
    active: BackendKind,
) -> String {
    let mut out = String::from("Backends:\n\n");
    out.push_str(&format!(
        "  {:<17} {:<22} {:<30} {:<7} {}\n",
        "ID", "NAME", "REQUIRES", "MODELS", "CONFIGURED"
    ));

    for kind in BackendKind::ALL {
        let descriptor = describe(kind);
        let id = if kind == active {
            format!("{}*", kind.id())
        } else {
            kind.id().to_string()
        };
        let requires: Vec<&str> = descriptor
            .required_fields
            .iter()
            .map(|field| field.key())
            .collect();
        let listing = if descriptor.supports_model_listing {
            "yes"
        } else {
            "-"
        };
        let configured = if config.is_configured(kind) {
            "✅".to_string()
        } else {
            let missing: Vec<&str> = config
                .missing_required(kind)
                .into_iter()
                .map(|field| field.key())
                .collect();
            format!("❌ missing {}", missing.join(", "))
        };

        out.push_str(&format!(
            "  {:<17} {:<22} {:<30} {:<7} {}\n",
            id,
            descriptor.display_name,
            requires.join(", "),
            listing,
            configured
        ));
    }

    out.push_str("\n* = active backend\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::BackendConfig;

    #[test]
    fn marks_active_backend_and_missing_fields() {
        let config = BackendConfig {
            remote_url: "https://relay.example.org".to_string(),
            ..Default::default()
        };
        let table = render_backends(&config, BackendKind::RemoteEndpoint);

        assert!(table.contains("remote-endpoint*"));
        assert!(!table.contains("hosted-api*"));
        assert!(table.contains("missing openai_key, openai_model"));
        let remote_line = table
            .lines()
            .find(|line| line.contains("remote-endpoint"))
            .unwrap();
        assert!(remote_line.contains("✅"));
    }
}
