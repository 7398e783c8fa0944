//! One-shot "say" command

use std::error::Error;

use crate::cli::CliContext;
use crate::core::chat_dispatch::DispatchState;
use crate::core::session::DashboardSession;

pub async fn run_say(ctx: &CliContext, prompt: Vec<String>) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: localhub say <prompt>");
        std::process::exit(2);
    }

    let session = DashboardSession::new(
        ctx.client.clone(),
        ctx.router.clone(),
        std::sync::Arc::clone(&ctx.store),
    );

    let Some(settled) = session.send_and_wait(&prompt).await else {
        return Err("chat task ended before replying".into());
    };
    println!("{}", settled.turn.text());

    if settled.state == DispatchState::Failed {
        let active = ctx.store.active_backend();
        eprintln!("💡 Run 'localhub backends' to check the {active} configuration, or set LOCALHUB_LOG=debug for details.");
        std::process::exit(1);
    }
    Ok(())
}
