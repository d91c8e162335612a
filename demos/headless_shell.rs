//! Headless tab shell demonstration.
//!
//! Demonstrates:
//! - Navigation with directional slides
//! - Back/forward history replay
//! - Metadata and title fetches
//! - Prerender hints and link clicks
//!
//! Usage:
//!   cargo run --example headless_shell
//!   cargo run --example headless_shell -- --debug
//!   cargo run --example headless_shell -- --rtl

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::time::sleep;

use common::{Args, Page, SiteHost};
use frame_shell::{Browser, BrowserEvent, FrameHost};

// ============================================================================
// Constants
// ============================================================================

const INBOX: &str = "app://mail.example/inbox";
const MESSAGE: &str = "app://mail.example/message";
const COMPOSE: &str = "app://mail.example/compose";

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    println!("=== Headless shell ===\n");

    // ========================================================================
    // Setup
    // ========================================================================

    let host = Arc::new(
        SiteHost::new(args.rtl)
            .page(
                INBOX,
                Page {
                    title: "Inbox",
                    meta: vec![("navigation:compose", "/compose")],
                    prerender: vec!["/message?id=1"],
                },
            )
            .page(
                MESSAGE,
                Page {
                    title: "Message",
                    meta: vec![("navigation:back", "/inbox"), ("og:title", "Hello")],
                    prerender: vec![],
                },
            )
            .page(
                COMPOSE,
                Page {
                    title: "Compose",
                    ..Page::default()
                },
            ),
    );

    let browser = Browser::builder()
        .base_url("app://mail.example/")
        .transition_duration(Duration::from_millis(150))
        .build(Arc::clone(&host) as Arc<dyn FrameHost>)
        .context("building browser")?;

    let mut events = browser.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                BrowserEvent::Navigate { url } => println!("    [event] navigate {url}"),
                BrowserEvent::Changed { url, metadata } => {
                    println!("    [event] changed {url} ({} keys)", metadata.len());
                }
                other => println!("    [event] {}", other.name()),
            }
        }
    });

    // ========================================================================
    // Navigate
    // ========================================================================

    println!("[1] Navigate to /inbox...");
    browser.navigate("/inbox").await?;
    sleep(Duration::from_millis(50)).await;
    println!("    ✓ frames pooled: {}", browser.frame_count());
    println!("    title: {:?}", browser.get_title().await?);

    println!("[2] Navigate to /message?id=1 (prerendered)...");
    browser.navigate("/message?id=1").await?;
    let metadata = browser.get_metadata().await?.context("no active frame")?;
    println!("    og:title = {:?}", metadata.get("og:title"));

    // ========================================================================
    // History
    // ========================================================================

    println!("[3] Back...");
    let outcome = browser.back().await?;
    println!("    {outcome:?}");

    println!("[4] Forward...");
    let outcome = browser.forward().await?;
    println!("    {outcome:?}");

    println!("[5] Link click inside the message...");
    host.click(MESSAGE, "app://mail.example/compose", None);
    sleep(Duration::from_millis(300)).await;
    println!("    src: {:?}", browser.src());

    let history = browser.history();
    println!("[6] History (cursor {:?}):", history.index);
    for record in &history.records {
        println!("    {:?} {}", record.from, record.url);
    }

    // ========================================================================
    // Cleanup
    // ========================================================================

    browser.close();
    println!("\n=== Done ===");
    Ok(())
}
