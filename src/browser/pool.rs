//! Frame pool.
//!
//! Frames are created lazily and indexed by canonical key, so a query or
//! hash change reuses the frame already showing that document.
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `resolve` | Get or create, then sync the frame's location |
//! | `prefetch` | Get or create, nothing else |
//! | `evict_except` | Tear down every frame but one |
//! | `close_all` | Tear down everything |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::{OnceCell, mpsc};
use tracing::{debug, warn};

use crate::error::Result;
use crate::identifiers::{FrameId, FrameKey};
use crate::protocol::{Command, Event};
use crate::transport::Connection;

use super::host::{FrameHost, Surface};
use super::location::Location;

// ============================================================================
// Types
// ============================================================================

/// A slot that is filled exactly once, however many callers race for it.
type Slot = Arc<OnceCell<Arc<Frame>>>;

/// A broadcast received from a pooled frame.
#[derive(Debug)]
pub(crate) struct FrameSignal {
    /// Frame the event came from.
    pub frame_id: FrameId,
    /// The event.
    pub event: Event,
}

// ============================================================================
// Frame
// ============================================================================

/// An embedded browsing context held by the pool.
pub struct Frame {
    id: FrameId,
    key: FrameKey,
    location: Mutex<Location>,
    connection: Connection,
    surface: Arc<dyn Surface>,
    loaded: AtomicBool,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("id", &self.id)
            .field("url", &self.url())
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

impl Frame {
    /// Process-unique frame ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> FrameId {
        self.id
    }

    /// Canonical pool key.
    #[inline]
    #[must_use]
    pub fn key(&self) -> &FrameKey {
        &self.key
    }

    /// Full URL the frame currently shows.
    #[must_use]
    pub fn url(&self) -> String {
        self.location.lock().full().to_string()
    }

    /// Returns `true` once metadata was fetched successfully.
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Bridge to the frame's content.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    #[inline]
    pub(crate) fn surface(&self) -> &dyn Surface {
        self.surface.as_ref()
    }

    pub(crate) fn mark_loaded(&self) {
        self.loaded.store(true, Ordering::Release);
    }

    fn set_location(&self, location: Location) {
        *self.location.lock() = location;
    }

    pub(crate) fn teardown(&self) {
        self.connection.shutdown();
        self.surface.remove();
    }
}

// ============================================================================
// FramePool
// ============================================================================

/// Frames by canonical key.
pub(crate) struct FramePool {
    host: Arc<dyn FrameHost>,
    slots: Mutex<FxHashMap<FrameKey, Slot>>,
    signals: mpsc::UnboundedSender<FrameSignal>,
    request_timeout: Duration,
}

impl FramePool {
    pub fn new(
        host: Arc<dyn FrameHost>,
        signals: mpsc::UnboundedSender<FrameSignal>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            host,
            slots: Mutex::new(FxHashMap::default()),
            signals,
            request_timeout,
        }
    }

    /// Returns the frame for `location`, creating it if needed.
    ///
    /// An existing frame showing a different query or hash gets a
    /// `pushState` call and its stored URL updated, without reloading.
    ///
    /// # Errors
    ///
    /// Propagates the host's frame creation error.
    pub async fn resolve(&self, location: &Location) -> Result<Arc<Frame>> {
        let (frame, created) = self.get_or_create(location).await?;

        if !created && frame.url() != location.full() {
            debug!(frame_id = %frame.id(), url = %location, "Syncing frame location");
            let command = Command::PushState {
                url: location.full().to_string(),
            };
            if let Err(e) = frame.connection().call(command).await {
                warn!(frame_id = %frame.id(), error = %e, "pushState failed");
            }
            frame.set_location(location.clone());
        }

        Ok(frame)
    }

    /// Makes sure a frame exists for `location`.
    ///
    /// Returns the frame and `true` if this call created it.
    ///
    /// # Errors
    ///
    /// Propagates the host's frame creation error.
    pub async fn prefetch(&self, location: &Location) -> Result<(Arc<Frame>, bool)> {
        self.get_or_create(location).await
    }

    async fn get_or_create(&self, location: &Location) -> Result<(Arc<Frame>, bool)> {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(location.key().clone()).or_default())
        };

        let created = AtomicBool::new(false);
        let result = slot
            .get_or_try_init(|| async {
                created.store(true, Ordering::Relaxed);
                self.spawn_frame(location).await
            })
            .await;

        match result {
            Ok(frame) => Ok((Arc::clone(frame), created.load(Ordering::Relaxed))),
            Err(e) => {
                self.discard_empty(location.key(), &slot);
                Err(e)
            }
        }
    }

    async fn spawn_frame(&self, location: &Location) -> Result<Arc<Frame>> {
        let context = self.host.spawn(location.full()).await?;
        let id = FrameId::next();

        let connection = context.connection.with_request_timeout(self.request_timeout);
        let signals = self.signals.clone();
        connection.set_event_handler(Box::new(move |event| {
            let _ = signals.send(FrameSignal {
                frame_id: id,
                event,
            });
        }));

        debug!(frame_id = %id, url = %location, "Frame created");

        Ok(Arc::new(Frame {
            id,
            key: location.key().clone(),
            location: Mutex::new(location.clone()),
            connection,
            surface: context.surface,
            loaded: AtomicBool::new(false),
        }))
    }

    /// Drops a slot left empty by a failed creation so a later call retries.
    fn discard_empty(&self, key: &FrameKey, slot: &Slot) {
        let mut slots = self.slots.lock();
        if let Some(existing) = slots.get(key)
            && Arc::ptr_eq(existing, slot)
            && !existing.initialized()
        {
            slots.remove(key);
        }
    }

    /// Returns `true` if a frame exists for `key`.
    pub fn contains(&self, key: &FrameKey) -> bool {
        self.slots
            .lock()
            .get(key)
            .is_some_and(|slot| slot.initialized())
    }

    pub fn get(&self, key: &FrameKey) -> Option<Arc<Frame>> {
        self.slots.lock().get(key).and_then(|slot| slot.get().cloned())
    }

    /// Returns `true` if `frame` itself is the pooled frame for its key.
    pub fn holds(&self, frame: &Frame) -> bool {
        self.get(frame.key()).is_some_and(|f| f.id() == frame.id())
    }

    /// Number of created frames.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    /// Tears down every created frame except `keep`.
    ///
    /// Slots still being created are left alone. Returns how many frames
    /// were evicted.
    pub fn evict_except(&self, keep: Option<FrameId>) -> usize {
        let mut evicted = Vec::new();

        self.slots.lock().retain(|_, slot| match slot.get() {
            Some(frame) if Some(frame.id()) != keep => {
                evicted.push(Arc::clone(frame));
                false
            }
            _ => true,
        });

        for frame in &evicted {
            debug!(frame_id = %frame.id(), url = %frame.url(), "Evicting frame");
            frame.teardown();
        }

        evicted.len()
    }

    /// Tears down every frame.
    pub fn close_all(&self) {
        let slots: Vec<Slot> = self.slots.lock().drain().map(|(_, slot)| slot).collect();

        for frame in slots.iter().filter_map(|slot| slot.get()) {
            frame.teardown();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::{FakeHost, settle};
    use crate::error::Error;

    fn pool(host: Arc<FakeHost>) -> (FramePool, mpsc::UnboundedReceiver<FrameSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (FramePool::new(host, tx, Duration::from_secs(5)), rx)
    }

    #[tokio::test]
    async fn test_query_change_reuses_frame() {
        let host = FakeHost::new();
        let (pool, _rx) = pool(Arc::clone(&host));

        let first = pool
            .resolve(&Location::parse("https://a/x?y=1").expect("url"))
            .await
            .expect("resolve");
        let second = pool
            .resolve(&Location::parse("https://a/x?y=2").expect("url"))
            .await
            .expect("resolve");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.url(), "https://a/x?y=2");
        assert_eq!(pool.len(), 1);
        assert_eq!(host.spawned(), vec!["https://a/x?y=1".to_string()]);
        assert_eq!(
            host.calls_for("https://a/x"),
            vec![Command::PushState {
                url: "https://a/x?y=2".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_same_url_skips_push_state() {
        let host = FakeHost::new();
        let (pool, _rx) = pool(Arc::clone(&host));
        let location = Location::parse("https://a/x").expect("url");

        pool.resolve(&location).await.expect("resolve");
        pool.resolve(&location).await.expect("resolve");

        assert!(host.calls_for("https://a/x").is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_creation_is_idempotent() {
        let host = FakeHost::new();
        host.set_spawn_delay(Duration::from_millis(20));
        let (pool, _rx) = pool(Arc::clone(&host));
        let location = Location::parse("https://a/x").expect("url");

        let (a, b) = tokio::join!(pool.prefetch(&location), pool.resolve(&location));
        let (a, created_a) = a.expect("prefetch");
        let b = b.expect("resolve");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(created_a);
        assert_eq!(host.spawned().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_creation_can_retry() {
        let host = FakeHost::new();
        host.fail_spawn("https://a/broken");
        let (pool, _rx) = pool(Arc::clone(&host));
        let location = Location::parse("https://a/broken").expect("url");

        let result = pool.resolve(&location).await;
        assert!(matches!(result, Err(Error::FrameCreation { .. })));
        assert_eq!(pool.len(), 0);
        assert!(!pool.contains(location.key()));

        host.allow_spawn("https://a/broken");
        pool.resolve(&location).await.expect("retry");
        assert_eq!(pool.len(), 1);
    }

    #[tokio::test]
    async fn test_evict_keeps_one() {
        let host = FakeHost::new();
        let (pool, _rx) = pool(Arc::clone(&host));

        let keep = pool
            .resolve(&Location::parse("https://a/1").expect("url"))
            .await
            .expect("resolve");
        let gone = pool
            .resolve(&Location::parse("https://a/2").expect("url"))
            .await
            .expect("resolve");

        assert_eq!(pool.evict_except(Some(keep.id())), 1);
        assert_eq!(pool.len(), 1);
        assert!(pool.get(keep.key()).is_some());
        assert!(host.surface("https://a/2").is_some_and(|s| s.is_removed()));

        settle().await;
        assert!(gone.connection().is_closed());
    }

    #[tokio::test]
    async fn test_frame_events_are_signalled() {
        let host = FakeHost::new();
        let (pool, mut rx) = pool(Arc::clone(&host));

        let frame = pool
            .resolve(&Location::parse("https://a/1").expect("url"))
            .await
            .expect("resolve");
        host.emit(
            "https://a/1",
            "linkclicked",
            serde_json::json!({"href": "https://a/2"}),
        );

        let signal = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("no timeout")
            .expect("signal");
        assert_eq!(signal.frame_id, frame.id());
        assert_eq!(signal.event.method, "linkclicked");
    }
}
