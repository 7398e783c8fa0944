use std::error::Error;

use crate::cli::CliContext;
use crate::core::overlay::{check_connectivity, ConfiguredOverlay, PeerOverlay};

pub async fn show_peers(ctx: &CliContext, check: bool) -> Result<(), Box<dyn Error>> {
    let overlay = ConfiguredOverlay::new(ctx.store.snapshot().overlay.clone());
    let address = overlay.self_address().await;
    let peers = overlay.peers().await;

    if address.is_empty() {
        println!("Overlay address: (unset)");
    } else {
        println!("Overlay address: {address}");
    }
    if peers.is_empty() {
        println!("Peers: (none)");
    } else {
        println!("Peers:");
        for peer in &peers {
            println!("  • {peer}");
        }
    }

    if check {
        let status = check_connectivity(&ctx.client, &address).await;
        let mark = if status.reachable { "✅" } else { "❌" };
        match status.latency_ms {
            Some(latency) => println!("{mark} {} ({latency} ms)", status.detail),
            None => println!("{mark} {}", status.detail),
        }
        if let Some(url) = status.tested_url {
            println!("   tested {url} at {}", status.last_checked.format("%Y-%m-%d %H:%M:%S UTC"));
        }
    }

    Ok(())
}
