//! Embedding seams: how frames are spawned and shown.
//!
//! The shell never touches a real document. An embedder implements
//! [`FrameHost`] to create embedded browsing contexts and hands back, for
//! each one, the visual element ([`Surface`]) and a bridge
//! [`Connection`] to its content.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::{self, BoxFuture};
use parking_lot::Mutex;

use crate::error::Result;
use crate::transport::Connection;

// ============================================================================
// FrameHost
// ============================================================================

/// Creates embedded browsing contexts.
#[async_trait]
pub trait FrameHost: Send + Sync {
    /// Spawns a context pointed at `url`.
    ///
    /// The returned surface must not be visible yet; positioning belongs to
    /// the shell.
    ///
    /// # Errors
    ///
    /// Should return [`Error::FrameCreation`](crate::Error::FrameCreation)
    /// when the context fails to initialize.
    async fn spawn(&self, url: &str) -> Result<EmbeddedContext>;

    /// Returns `true` if the host is laid out right-to-left.
    ///
    /// Read at the start of every transition.
    fn is_rtl(&self) -> bool {
        false
    }
}

/// A freshly spawned context.
pub struct EmbeddedContext {
    /// The context's visual element.
    pub surface: Arc<dyn Surface>,
    /// Bridge to the context's content.
    pub connection: Connection,
}

impl fmt::Debug for EmbeddedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedContext")
            .field("connection", &self.connection)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Surface
// ============================================================================

/// The visual element of a frame.
pub trait Surface: Send + Sync {
    /// Sets the duration of the next offset change.
    fn set_transition_duration(&self, duration: Duration);

    /// Moves the element laterally, in percent of its width.
    fn set_offset(&self, percent: i32);

    /// Forces pending style changes to apply before the next one.
    fn flush_layout(&self) {}

    /// Completes when the running offset transition has finished.
    ///
    /// Called after the transition duration is set and before the target
    /// offset is applied.
    fn transition_end(&self) -> BoxFuture<'static, ()>;

    /// Detaches the element from the host.
    fn remove(&self);
}

// ============================================================================
// HeadlessSurface
// ============================================================================

/// A [`Surface`] with no display.
///
/// Remembers every offset it was moved to and completes transitions after
/// their duration has elapsed.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    state: Mutex<HeadlessState>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    offset: i32,
    duration: Duration,
    moves: Vec<(i32, Duration)>,
    removed: bool,
}

impl HeadlessSurface {
    /// Creates a surface at offset 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current offset in percent.
    #[must_use]
    pub fn offset(&self) -> i32 {
        self.state.lock().offset
    }

    /// Every `(offset, duration)` the surface was moved with, oldest first.
    #[must_use]
    pub fn moves(&self) -> Vec<(i32, Duration)> {
        self.state.lock().moves.clone()
    }

    /// Returns `true` once the surface was removed.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.state.lock().removed
    }
}

impl Surface for HeadlessSurface {
    fn set_transition_duration(&self, duration: Duration) {
        self.state.lock().duration = duration;
    }

    fn set_offset(&self, percent: i32) {
        let mut state = self.state.lock();
        state.offset = percent;
        let duration = state.duration;
        state.moves.push((percent, duration));
    }

    fn transition_end(&self) -> BoxFuture<'static, ()> {
        let duration = self.state.lock().duration;
        if duration.is_zero() {
            return future::ready(()).boxed();
        }
        tokio::time::sleep(duration).boxed()
    }

    fn remove(&self) {
        self.state.lock().removed = true;
    }
}

// ============================================================================
// Tests
// ============================================================================
