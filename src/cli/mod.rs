//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod backend_list;
pub mod chat;
pub mod model_list;
pub mod peers;
pub mod say;
pub mod settings;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::cli::backend_list::list_backends;
use crate::cli::chat::run_chat;
use crate::cli::model_list::list_models;
use crate::cli::peers::show_peers;
use crate::cli::say::run_say;
use crate::cli::settings::{SetContext, SettingError, SettingRegistry};
use crate::core::config::data::Settings;
use crate::core::config::{ConfigStore, FileSettingsStore, MemorySettingsStore, SettingsStore};
use crate::core::router::BackendRouter;
use crate::utils::logging::init_tracing;

#[derive(Parser)]
#[command(name = "localhub")]
#[command(version)]
#[command(about = "Route chat to a hosted API, a local model server, or your own endpoint")]
#[command(
    long_about = "localhub keeps the credentials and endpoints for several interchangeable AI \
backends, discovers the models each one offers, and sends chat messages to whichever backend \
is active.\n\n\
Backends:\n\
  hosted-api        OpenAI-compatible completion API (needs openai_key, openai_model)\n\
  local-server      Ollama-compatible model server (needs ollama_url, ollama_model)\n\
  remote-endpoint   Your own endpoint taking {\"message\"} and answering {\"reply\"} (needs remote_url)\n\n\
Environment Variables:\n\
  OPENAI_BASE_URL   Custom hosted API base URL (defaults to https://api.openai.com/v1)\n\
  LOCALHUB_LOG      Log filter, e.g. 'debug' or 'localhub=info' (defaults to warn)\n\
  OPENAI_API_KEY, OPENAI_MODEL, OLLAMA_URL, OLLAMA_MODEL, REMOTE_URL,\n\
  SYSTEM_INSTRUCTIONS, OVERLAY_ADDRESS\n\
                    Seed the first settings file when none exists yet\n\n\
Chat commands:\n\
  /use <backend>    Switch the active backend for the next message\n\
  /models           Refresh and show the model catalogs\n\
  /quit             Leave the chat"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Settings file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Append log output to this file instead of stderr
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Keep settings in memory only; nothing is written to disk
    #[arg(long, global = true)]
    pub ephemeral: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the supported backends and their configuration status
    Backends,
    /// List the models a backend offers (all listing backends by default)
    Models {
        /// Backend to query
        backend: Option<String>,
    },
    /// Send one message through the active backend and print the reply
    Say {
        /// Message text
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Start a line-oriented chat session (default)
    Chat,
    /// Make a backend the active one
    Use {
        /// Backend id or alias (hosted-api, local-server, remote-endpoint)
        backend: String,
    },
    /// Set configuration values, or show them all when no key is given
    Set {
        /// Configuration key to set
        key: Option<String>,
        /// Value to set for the key (can be multiple words)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Show this hub's overlay address and known peers
    Peers {
        /// Also probe the hub's health endpoint
        #[arg(long)]
        check: bool,
    },
}

/// Shared state for one CLI invocation.
pub struct CliContext {
    pub client: reqwest::Client,
    pub router: BackendRouter,
    pub store: Arc<ConfigStore>,
}

impl CliContext {
    pub async fn from_args(args: &Args) -> Result<Self, Box<dyn Error>> {
        let backing: Box<dyn SettingsStore> = if args.ephemeral {
            Box::new(MemorySettingsStore::with_settings(Settings::from_env()))
        } else {
            match &args.config {
                Some(path) => Box::new(FileSettingsStore::new(path.clone())),
                None => Box::new(FileSettingsStore::at_default_path()?),
            }
        };

        let store = Arc::new(ConfigStore::new(backing));
        store.load_or_default().await;
        debug!(store = %store.location(), "Settings ready");

        Ok(Self {
            client: reqwest::Client::new(),
            router: BackendRouter::from_env(),
            store,
        })
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.log.as_deref())?;
    let ctx = CliContext::from_args(&args).await?;

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Backends => list_backends(&ctx),
        Commands::Models { backend } => list_models(&ctx, backend).await,
        Commands::Say { prompt } => run_say(&ctx, prompt).await,
        Commands::Chat => run_chat(&ctx).await,
        Commands::Use { backend } => {
            apply_setting(&ctx, "active-backend", Some(vec![backend])).await;
            Ok(())
        }
        Commands::Set { key, value } => {
            match key {
                Some(key) => apply_setting(&ctx, &key, Some(value)).await,
                None => print!("{}", SettingRegistry::new().render(&ctx.store.snapshot())),
            }
            Ok(())
        }
        Commands::Unset { key } => {
            apply_setting(&ctx, &key, None).await;
            Ok(())
        }
        Commands::Peers { check } => show_peers(&ctx, check).await,
    }
}

async fn apply_setting(ctx: &CliContext, key: &str, value: Option<Vec<String>>) {
    match edit_setting(&ctx.store, key, value).await {
        Ok(message) => println!("{message}"),
        Err(err) => {
            err.print();
            std::process::exit(err.exit_code());
        }
    }
}

/// Run the handler for `key` against a draft of the current settings and
/// persist the result. `None` unsets.
pub async fn edit_setting(
    store: &ConfigStore,
    key: &str,
    value: Option<Vec<String>>,
) -> Result<String, SettingError> {
    let registry = SettingRegistry::new();
    let handler = registry
        .get(key)
        .ok_or_else(|| SettingError::UnknownKey(key.to_string()))?;

    let mut draft = Settings::clone(&store.snapshot());
    let mut ctx = SetContext {
        settings: &mut draft,
    };
    let message = match value {
        Some(args) => handler.set(&args, &mut ctx)?,
        None => handler.unset(&mut ctx)?,
    };

    store.replace(draft).await?;
    Ok(message)
}
