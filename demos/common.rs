//! Shared utilities for demos.
//!
//! Provides common functionality used across demos:
//! - Command-line argument parsing
//! - Logging initialization
//! - A headless frame host serving a small static site

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use frame_shell::protocol::Command;
use frame_shell::{EmbeddedContext, Error, FrameHost, HeadlessSurface, Location, Result, pipe};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments for demos.
#[derive(Debug, Clone)]
pub struct Args {
    pub debug: bool,
    pub rtl: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self {
            debug: args.iter().any(|a| a == "--debug"),
            rtl: args.iter().any(|a| a == "--rtl"),
        }
    }
}

/// One page of the demo site.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub title: &'static str,
    pub meta: Vec<(&'static str, &'static str)>,
    pub prerender: Vec<&'static str>,
}

// ============================================================================
// SiteHost
// ============================================================================

/// Serves frames from an in-memory site map.
#[derive(Default)]
pub struct SiteHost {
    pages: FxHashMap<String, Page>,
    rtl: bool,
    /// Broadcast senders by canonical URL, for simulating user input.
    inputs: Mutex<FxHashMap<String, mpsc::UnboundedSender<(String, Value)>>>,
}

impl SiteHost {
    pub fn new(rtl: bool) -> Self {
        Self {
            rtl,
            ..Self::default()
        }
    }

    /// Adds a page under an absolute URL.
    pub fn page(mut self, url: &str, page: Page) -> Self {
        self.pages.insert(canonical(url), page);
        self
    }

    /// Simulates a click on a link inside the frame showing `url`.
    pub fn click(&self, url: &str, href: &str, rel: Option<&str>) {
        if let Some(input) = self.inputs.lock().get(&canonical(url)) {
            let _ = input.send(("linkclicked".to_string(), json!({"href": href, "rel": rel})));
        }
    }
}

#[async_trait]
impl FrameHost for SiteHost {
    async fn spawn(&self, url: &str) -> Result<EmbeddedContext> {
        let key = canonical(url);
        let page = self
            .pages
            .get(&key)
            .cloned()
            .ok_or_else(|| Error::frame_creation(url, "404 Not Found"))?;

        let (connection, mut service) = pipe();
        let (input_tx, mut input_rx) = mpsc::unbounded_channel::<(String, Value)>();
        self.inputs.lock().insert(key, input_tx);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    request = service.next_request() => {
                        let Some(request) = request else {
                            break;
                        };
                        let result = answer(&page, &request.command);
                        service.respond(request.id, result);
                    }

                    Some((name, params)) = input_rx.recv() => {
                        service.broadcast(&name, params);
                    }
                }
            }
        });

        Ok(EmbeddedContext {
            surface: Arc::new(HeadlessSurface::new()),
            connection,
        })
    }

    fn is_rtl(&self) -> bool {
        self.rtl
    }
}

fn answer(page: &Page, command: &Command) -> std::result::Result<Value, String> {
    match command {
        Command::GetMetaData => Ok(json!({
            "title": page.title,
            "meta": page
                .meta
                .iter()
                .map(|(property, content)| json!({"property": property, "content": content}))
                .collect::<Vec<_>>(),
        })),
        Command::QuerySelector(query) if query.selector == "title" => {
            Ok(json!({"textContent": page.title}))
        }
        Command::QuerySelector(_) => Ok(Value::Null),
        Command::QuerySelectorAll(_) => Ok(Value::Array(
            page.prerender.iter().map(|href| json!({"href": href})).collect(),
        )),
        Command::PushState { .. } => Ok(Value::Null),
    }
}

fn canonical(url: &str) -> String {
    Location::parse(url)
        .map(|location| location.key().to_string())
        .unwrap_or_else(|_| url.to_string())
}

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        "frame_shell=debug"
    } else {
        "frame_shell=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}
