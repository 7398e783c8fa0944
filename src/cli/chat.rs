//! Line-oriented chat session.
//!
//! Each line is sent as soon as it is entered. Replies print when they
//! arrive, so a slow reply can show up after a later, faster one.

use std::error::Error;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use crate::cli::settings::helpers::validate_backend;
use crate::cli::CliContext;
use crate::core::backends::BackendKind;
use crate::core::catalog::ModelCatalog;
use crate::core::chat_dispatch::Settled;
use crate::core::session::{DashboardSession, SessionEvent};

#[derive(Debug, PartialEq, Eq)]
pub enum ChatInput {
    Message(String),
    Use(String),
    Models,
    Quit,
    Unknown(String),
}

pub fn parse_chat_input(line: &str) -> ChatInput {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return ChatInput::Message(line.to_string());
    };

    let mut parts = command.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default().trim();
    match name {
        "quit" | "exit" => ChatInput::Quit,
        "models" => ChatInput::Models,
        "use" => ChatInput::Use(rest.to_string()),
        _ => ChatInput::Unknown(name.to_string()),
    }
}

pub async fn run_chat(ctx: &CliContext) -> Result<(), Box<dyn Error>> {
    let session = DashboardSession::new(
        ctx.client.clone(),
        ctx.router.clone(),
        Arc::clone(&ctx.store),
    );
    let mut events = session.subscribe();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let SessionEvent::TurnAppended(turn) = event {
                if turn.author().is_assistant() {
                    println!("[{}] assistant: {}", turn.time(), turn.text());
                }
            }
        }
    });

    let active = ctx.store.active_backend();
    println!(
        "Chatting via {} ({}). /use <backend> switches, /models lists models, /quit leaves.",
        active,
        active.display_name()
    );

    let mut pending: Vec<JoinHandle<Settled>> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_chat_input(&line) {
            ChatInput::Quit => break,
            ChatInput::Message(text) => {
                if let Some(handle) = session.send(&text) {
                    pending.push(handle);
                }
            }
            ChatInput::Use(input) => switch_backend(&session, &input).await,
            ChatInput::Models => {
                let view = session.open_config_view();
                session.refresh_catalogs(&view).await;
                print!("{}", render_catalog(&session.catalog()));
                session.close_config_view();
            }
            ChatInput::Unknown(name) => {
                eprintln!("❌ Unknown command: /{name}");
            }
        }
        pending.retain(|handle| !handle.is_finished());
    }

    for handle in pending {
        let _ = handle.await;
    }
    drop(session);
    let _ = printer.await;
    Ok(())
}

async fn switch_backend(session: &DashboardSession, input: &str) {
    let kind = match validate_backend(input) {
        Ok(kind) => kind,
        Err(err) => {
            err.print();
            return;
        }
    };
    if let Err(err) = session.config().select_backend(kind).await {
        eprintln!("⚠️  {err}");
        eprintln!("   The switch applies to this session only.");
    }
    println!("✅ Now chatting via {} ({})", kind, kind.display_name());
}

pub fn render_catalog(catalog: &ModelCatalog) -> String {
    let mut out = String::new();
    for kind in BackendKind::listing_kinds() {
        let models = catalog.models(kind);
        if models.is_empty() {
            out.push_str(&format!("{kind}: No models discovered\n"));
        } else {
            out.push_str(&format!("{kind}: {}\n", models.join(", ")));
        }
    }
    out
}
