//! Frame Shell - In-process multi-frame tab shell.
//!
//! This library hosts isolated page contexts ("frames") inside one host
//! element, slides between them, keeps a bounded back/forward history and
//! talks to each frame's content over an asynchronous remote-call bridge.
//!
//! # Architecture
//!
//! The shell follows a host/content model:
//!
//! - **Host (Rust)**: Navigation controller, frame pool, history, animator
//! - **Content (frame side)**: Answers remote calls, broadcasts events
//!
//! Key design principles:
//!
//! - Each [`Frame`] owns: a surface + a bridge [`Connection`] + its event loop
//! - Frames are pooled by canonical URL (origin + path)
//! - History records remember the slide direction, back/forward replay it
//! - Navigations are queued, metadata arrives asynchronously
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use frame_shell::{Browser, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let host: Arc<dyn frame_shell::FrameHost> = Arc::new(MyHost::default());
//!     let browser = Browser::builder()
//!         .base_url("app://mail.example/")
//!         .build(host)?;
//!
//!     browser.navigate("/inbox").await?;
//!     browser.navigate("/inbox/42").await?;
//!     browser.back().await?;
//!
//!     println!("Title: {:?}", browser.get_title().await?);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`browser`] | Shell entities: [`Browser`], [`Frame`], [`Animator`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`metadata`] | Structured metadata projection |
//! | [`protocol`] | Bridge message types |
//! | [`transport`] | Bridge client and in-process pipe |

// ============================================================================
// Modules
// ============================================================================

/// Shell entities: Browser, Frame, Animator.
///
/// This module contains the navigation controller and its parts:
///
/// - [`Browser`] - The host element
/// - [`Frame`] - Pooled embedded context
/// - [`Animator`] - Slide transitions
pub mod browser;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Structured metadata projection.
pub mod metadata;

/// Bridge protocol message types.
///
/// Defines the request/response/event structures.
pub mod protocol;

/// Bridge transport layer.
///
/// Request/response correlation and the in-process pipe.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Browser types
pub use browser::{
    Animator, Browser, BrowserBuilder, BrowserConfig, BrowserEvent, Direction, EmbeddedContext,
    EvictionPolicy, Frame, FrameHost, HeadlessSurface, HistoryRecord, HistoryView, Location,
    NavState, NavigateOptions, NavigationOutcome, Position, SkipReason, Surface, Visibility,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{FrameId, FrameKey, RequestId};

// Metadata types
pub use metadata::{MetaNode, MetaPath, MetaRecord, Metadata, PageMetadata, project};

// Transport types
pub use transport::{BridgeService, Connection, pipe};
