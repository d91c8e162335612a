//! Prerender agent.
//!
//! After each navigation, asks the active frame for its prerender hints and
//! creates a frame for every hinted URL not pooled yet, parked off screen
//! on the next side.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::protocol::{Command, Query};

use super::animator::{Animator, Position};
use super::core::BrowserInner;
use super::location::Location;
use super::pool::Frame;

// ============================================================================
// Agent
// ============================================================================

/// Runs the agent for `source` in the background.
pub(crate) fn spawn(inner: &Arc<BrowserInner>, source: Arc<Frame>) {
    let selector = inner.config.prerender_selector.clone();
    let inner = Arc::downgrade(inner);

    tokio::spawn(async move {
        let links = match hinted_links(&source, &selector).await {
            Ok(links) => links,
            Err(e) => {
                warn!(frame_id = %source.id(), error = %e, "Prerender query failed");
                return;
            }
        };

        let Some(inner) = inner.upgrade() else {
            return;
        };
        warm(&inner, &source, links).await;
    });
}

async fn warm(inner: &BrowserInner, source: &Frame, links: Vec<String>) {
    if !inner.is_current(source) {
        trace!(frame_id = %source.id(), "Source no longer active, skipping prerender");
        return;
    }

    let base = match Url::parse(&source.url()) {
        Ok(base) => base,
        Err(_) => inner.config.base_url.clone(),
    };

    for href in links {
        let location = match Location::resolve(&base, &href) {
            Ok(location) => location,
            Err(e) => {
                warn!(href = %href, error = %e, "Skipping prerender hint");
                continue;
            }
        };

        if inner.pool.contains(location.key()) {
            trace!(url = %location, "Already pooled");
            continue;
        }

        match inner.pool.prefetch(&location).await {
            Ok((frame, true)) => park(inner, &frame),
            Ok((_, false)) => {}
            Err(e) => warn!(url = %location, error = %e, "Prerender failed"),
        }
    }
}

/// Positions a prerendered frame off screen unless it has become active.
fn park(inner: &BrowserInner, frame: &Frame) {
    // Navigations commit under the same lock.
    let state = inner.state.lock();
    if state
        .current
        .as_ref()
        .is_some_and(|current| current.id() == frame.id())
    {
        return;
    }

    Animator::new(inner.host.is_rtl()).position(frame.surface(), Position::Next);
    drop(state);

    debug!(frame_id = %frame.id(), url = %frame.url(), "Prerendered");
}

/// Reads `href` of every element matching the selector.
async fn hinted_links(source: &Frame, selector: &str) -> Result<Vec<String>> {
    let query = Query::new(selector).property("href");
    let result = source
        .connection()
        .call(Command::QuerySelectorAll(query))
        .await?;

    let Value::Array(elements) = result else {
        return Err(Error::protocol(format!(
            "querySelectorAll answered {result}, expected an array"
        )));
    };

    Ok(elements
        .iter()
        .filter_map(|element| element.get("href").and_then(Value::as_str))
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect())
}

// ============================================================================
// Tests
// ============================================================================
