//! Browser handle and shared state.
//!
//! Each [`Browser`] owns:
//! - One frame pool (every embedded context it ever showed)
//! - One bounded history
//! - One background task routing frame broadcasts and visibility changes

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::metadata::Metadata;
use crate::protocol::ParsedEvent;

use super::animator::Direction;
use super::builder::BrowserBuilder;
use super::events::{BrowserEvent, EVENT_CHANNEL_CAPACITY};
use super::history::{HistoryStack, HistoryView};
use super::host::FrameHost;
use super::navigation::{NavigateOptions, form_target};
use super::options::{BrowserConfig, EvictionPolicy, Visibility};
use super::pool::{Frame, FramePool, FrameSignal};

// ============================================================================
// NavState
// ============================================================================

/// Phase of the navigation controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavState {
    /// Nothing in flight.
    #[default]
    Idle,
    /// Looking up or creating the target frame.
    Resolving,
    /// Sliding frames.
    Transitioning,
    /// Waiting for the active frame's metadata.
    MetadataPending,
}

// ============================================================================
// Types
// ============================================================================

/// Mutable controller state. Never held across an await.
pub(crate) struct ControllerState {
    /// Active frame; always a pool member when set.
    pub current: Option<Arc<Frame>>,
    pub history: HistoryStack,
    /// Last metadata applied for the active frame.
    pub metadata: Option<Metadata>,
    pub phase: NavState,
    /// Metadata fetches in flight.
    pub pending_metadata: usize,
}

/// Internal shared state for a browser.
pub(crate) struct BrowserInner {
    pub config: BrowserConfig,
    pub host: Arc<dyn FrameHost>,
    pub pool: FramePool,
    pub state: Mutex<ControllerState>,
    /// Serialises navigations.
    pub gate: tokio::sync::Mutex<()>,
    pub events: broadcast::Sender<BrowserEvent>,
    closed: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl BrowserInner {
    pub fn emit(&self, event: BrowserEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub fn is_current(&self, frame: &Frame) -> bool {
        self.state
            .lock()
            .current
            .as_ref()
            .is_some_and(|current| current.id() == frame.id())
    }

    pub fn set_phase(&self, phase: NavState) {
        self.state.lock().phase = phase;
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn abort_tasks(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

impl Drop for BrowserInner {
    fn drop(&mut self) {
        self.abort_tasks();
        self.pool.close_all();
    }
}

// ============================================================================
// Browser
// ============================================================================

/// A multi-frame tab shell.
///
/// Frames slide in and out as the browser navigates; the history remembers
/// which way each one came in so back/forward can replay the slide.
/// Cheap to clone; clones share state.
///
/// # Example
///
/// ```ignore
/// let browser = Browser::builder().max_history(20).build(host)?;
/// browser.navigate("/inbox").await?;
/// browser.navigate("/inbox/42").await?;
/// browser.back().await?;
/// assert_eq!(browser.src().as_deref(), Some("http://localhost/inbox"));
/// ```
#[derive(Clone)]
pub struct Browser {
    /// Shared inner state.
    pub(crate) inner: Arc<BrowserInner>,
}

// ============================================================================
// Browser - Display
// ============================================================================

impl fmt::Debug for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Browser")
            .field("src", &self.src())
            .field("state", &self.state())
            .field("frames", &self.frame_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Browser - Constructor
// ============================================================================

impl Browser {
    /// Creates a builder with default settings.
    #[inline]
    #[must_use]
    pub fn builder() -> BrowserBuilder {
        BrowserBuilder::new()
    }

    /// Creates a browser and starts its background task.
    pub(crate) fn new(
        config: BrowserConfig,
        host: Arc<dyn FrameHost>,
        visibility: Option<watch::Receiver<Visibility>>,
    ) -> Self {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let pool = FramePool::new(Arc::clone(&host), signal_tx, config.request_timeout);
        let state = ControllerState {
            current: None,
            history: HistoryStack::new(config.max_history),
            metadata: None,
            phase: NavState::Idle,
            pending_metadata: 0,
        };

        debug!(
            max_history = config.max_history,
            base_url = %config.base_url,
            eviction = ?config.eviction,
            "Browser created"
        );

        let inner = Arc::new(BrowserInner {
            config,
            host,
            pool,
            state: Mutex::new(state),
            gate: tokio::sync::Mutex::new(()),
            events,
            closed: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
        });

        let task = tokio::spawn(run_event_loop(Arc::downgrade(&inner), signal_rx, visibility));
        inner.tasks.lock().push(task);

        Self { inner }
    }
}

// ============================================================================
// Browser - Accessors
// ============================================================================

impl Browser {
    /// Returns the controller phase.
    #[must_use]
    pub fn state(&self) -> NavState {
        let state = self.inner.state.lock();
        match state.phase {
            NavState::Idle if state.pending_metadata > 0 => NavState::MetadataPending,
            phase => phase,
        }
    }

    /// Returns the active URL.
    #[must_use]
    pub fn src(&self) -> Option<String> {
        self.inner.state.lock().current.as_ref().map(|f| f.url())
    }

    /// Returns the active frame.
    #[must_use]
    pub fn current(&self) -> Option<Arc<Frame>> {
        self.inner.state.lock().current.clone()
    }

    /// Returns a snapshot of the history.
    #[must_use]
    pub fn history(&self) -> HistoryView {
        self.inner.state.lock().history.view()
    }

    /// Returns the metadata last received from the active frame.
    #[must_use]
    pub fn metadata(&self) -> Option<Metadata> {
        self.inner.state.lock().metadata.clone()
    }

    /// Returns the number of pooled frames.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.inner.pool.len()
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BrowserConfig {
        &self.inner.config
    }

    /// Subscribes to host notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BrowserEvent> {
        self.inner.events.subscribe()
    }

    /// Returns `true` once [`close`](Self::close) was called.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

// ============================================================================
// Browser - Lifecycle
// ============================================================================

impl Browser {
    /// Tears down every frame and stops the background task.
    ///
    /// Later navigations fail with [`Error::ConnectionClosed`](crate::Error::ConnectionClosed).
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        self.inner.abort_tasks();
        self.inner.pool.close_all();

        let mut state = self.inner.state.lock();
        state.current = None;
        state.metadata = None;

        info!("Browser closed");
    }

    /// Routes one broadcast from a pooled frame.
    fn handle_frame_signal(&self, signal: FrameSignal) {
        let FrameSignal { frame_id, event } = signal;
        let from_active = self
            .inner
            .state
            .lock()
            .current
            .as_ref()
            .is_some_and(|f| f.id() == frame_id);

        debug!(%frame_id, method = %event.method, from_active, "Frame event");

        match event.parse() {
            ParsedEvent::LinkClicked { href, rel } => {
                let direction = Direction::from_rel(rel.as_deref());
                self.inner.emit(BrowserEvent::LinkClicked {
                    href: href.clone(),
                    rel,
                });
                if from_active {
                    self.spawn_navigation(href, NavigateOptions::new().direction(direction));
                }
            }

            ParsedEvent::Submit {
                method,
                action,
                params,
            } => {
                let target = form_target(&action, &params);
                self.inner.emit(BrowserEvent::FormSubmitted {
                    method,
                    action,
                    params,
                });
                if from_active {
                    self.spawn_navigation(target, NavigateOptions::new());
                }
            }

            ParsedEvent::Localized => self.inner.emit(BrowserEvent::Localized),

            ParsedEvent::Unknown { name, params } => {
                self.inner.emit(BrowserEvent::Bridge { name, params });
            }
        }
    }

    fn spawn_navigation(&self, url: String, options: NavigateOptions) {
        let browser = self.clone();
        tokio::spawn(async move {
            if let Err(e) = browser.navigate_with(&url, options).await {
                warn!(url = %url, error = %e, "Frame-initiated navigation failed");
            }
        });
    }

    fn handle_visibility(&self, visibility: Visibility) {
        debug!(?visibility, "Visibility changed");

        if visibility != Visibility::Hidden
            || self.inner.config.eviction != EvictionPolicy::EvictHidden
        {
            return;
        }

        let state = self.inner.state.lock();
        let keep = state.current.as_ref().map(|f| f.id());
        let evicted = self.inner.pool.evict_except(keep);
        drop(state);
        debug!(evicted, "Evicted hidden frames");
    }
}

// ============================================================================
// Event Loop
// ============================================================================

async fn run_event_loop(
    inner: Weak<BrowserInner>,
    mut signals: mpsc::UnboundedReceiver<FrameSignal>,
    mut visibility: Option<watch::Receiver<Visibility>>,
) {
    loop {
        tokio::select! {
            signal = signals.recv() => {
                let Some(signal) = signal else {
                    break;
                };
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                Browser { inner }.handle_frame_signal(signal);
            }

            changed = visibility_changed(&mut visibility) => {
                match changed {
                    Some(value) => {
                        let Some(inner) = inner.upgrade() else {
                            break;
                        };
                        Browser { inner }.handle_visibility(value);
                    }

                    None => {
                        debug!("Visibility source closed");
                        visibility = None;
                    }
                }
            }
        }
    }

    debug!("Browser event loop terminated");
}

/// Next visibility value; stays pending without a source.
async fn visibility_changed(
    receiver: &mut Option<watch::Receiver<Visibility>>,
) -> Option<Visibility> {
    match receiver {
        Some(receiver) => match receiver.changed().await {
            Ok(()) => Some(*receiver.borrow_and_update()),
            Err(_) => None,
        },
        None => std::future::pending().await,
    }
}
