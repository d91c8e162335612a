//! The tab shell.
//!
//! This module provides the host element and its moving parts:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Browser`] | Navigation controller (owns pool, history, background task) |
//! | [`Frame`] | One embedded browsing context and its bridge |
//! | [`Animator`] | Directional slide transitions |
//! | [`FrameHost`] | Embedder seam creating frames |
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use frame_shell::{Browser, BrowserEvent, Result};
//!
//! # async fn example(host: Arc<dyn frame_shell::FrameHost>) -> Result<()> {
//! let browser = Browser::builder().build(host)?;
//! let mut events = browser.subscribe();
//!
//! browser.navigate("/inbox").await?;
//! while let Ok(event) = events.recv().await {
//!     if let BrowserEvent::Changed { metadata, .. } = event {
//!         println!("{:?}", metadata.get("og:title"));
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Directional slide transitions.
pub mod animator;

/// Browser configuration builder.
pub mod builder;

/// Browser handle and background task.
pub mod core;

/// Host-facing notifications.
pub mod events;

/// Bounded back/forward history.
pub mod history;

/// Embedding seams.
pub mod host;

/// URL resolution and canonical keys.
pub mod location;

/// Navigation controller.
pub mod navigation;

/// Browser configuration.
pub mod options;

/// Frame pool.
pub mod pool;

mod prerender;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use animator::{Animator, Direction, Position, logical_to_physical};
pub use builder::BrowserBuilder;
pub use self::core::{Browser, NavState};
pub use events::BrowserEvent;
pub use history::{HistoryRecord, HistoryView};
pub use host::{EmbeddedContext, FrameHost, HeadlessSurface, Surface};
pub use location::Location;
pub use navigation::{NavigateOptions, NavigationOutcome, SkipReason};
pub use options::{BrowserConfig, EvictionPolicy, Visibility};
pub use pool::Frame;
