//! Navigation controller.
//!
//! A navigation runs through these phases, one navigation at a time:
//!
//! | Phase | Work |
//! |-------|------|
//! | Resolving | Pool lookup or frame creation |
//! | Transitioning | Outgoing and incoming frames slide together |
//! | MetadataPending | Detached `getMetaData` call on the new frame |
//!
//! The commit (active frame, history, `navigate` notification) happens
//! between resolving and transitioning. Metadata arriving for a frame that
//! is no longer active is dropped.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::metadata::{Metadata, PageMetadata};
use crate::protocol::{Command, Query};

use super::animator::{Animator, Direction, Position};
use super::core::{Browser, BrowserInner, NavState};
use super::events::BrowserEvent;
use super::location::Location;
use super::pool::Frame;
use super::prerender;

// ============================================================================
// Types
// ============================================================================

/// Per-call navigation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Record the navigation in the history.
    pub push_state: bool,
    /// Side the new frame enters from.
    pub direction: Direction,
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self {
            push_state: true,
            direction: Direction::Next,
        }
    }
}

impl NavigateOptions {
    /// Pushes a history record and slides in from the next side.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether a history record is pushed.
    #[inline]
    #[must_use]
    pub fn push_state(mut self, push_state: bool) -> Self {
        self.push_state = push_state;
        self
    }

    /// Sets the entry direction.
    #[inline]
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}

/// Why a navigation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No URL given.
    EmptyUrl,
    /// The URL is already showing.
    AlreadyActive,
    /// Back at the first slot, or forward at the last.
    AtHistoryBoundary,
}

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Nothing changed.
    Skipped(SkipReason),
    /// A frame became active.
    Navigated {
        /// Active URL.
        url: String,
        /// Direction the frame entered from.
        direction: Direction,
    },
}

impl NavigationOutcome {
    /// Returns `true` if a frame became active.
    #[inline]
    #[must_use]
    pub fn is_navigated(&self) -> bool {
        matches!(self, Self::Navigated { .. })
    }
}

/// What a navigation does to the history.
#[derive(Debug, Clone, Copy)]
enum HistoryUpdate {
    Push,
    Traverse(usize),
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Traverse {
    Back,
    Forward,
}

/// Puts the controller back to idle however the navigation ends.
struct PhaseGuard<'a> {
    inner: &'a BrowserInner,
}

impl<'a> PhaseGuard<'a> {
    fn new(inner: &'a BrowserInner, phase: NavState) -> Self {
        inner.set_phase(phase);
        Self { inner }
    }

    fn enter(&self, phase: NavState) {
        self.inner.set_phase(phase);
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.inner.set_phase(NavState::Idle);
    }
}

// ============================================================================
// Browser - Navigation
// ============================================================================

impl Browser {
    /// Navigates to `url`, pushing a history record and sliding forward.
    ///
    /// Relative URLs resolve against the configured base URL.
    ///
    /// # Errors
    ///
    /// See [`navigate_with`](Self::navigate_with).
    pub async fn navigate(&self, url: &str) -> Result<NavigationOutcome> {
        self.navigate_with(url, NavigateOptions::default()).await
    }

    /// Navigates to `url`.
    ///
    /// Does nothing for an empty URL or the active URL. A URL matching the
    /// previous or next history record replays that record instead, and
    /// `options` are ignored. Waits for any navigation already in flight.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if `url` cannot be resolved
    /// - [`Error::FrameCreation`] if the host could not create the frame
    /// - [`Error::ConnectionClosed`] if the browser was closed
    pub async fn navigate_with(
        &self,
        url: &str,
        options: NavigateOptions,
    ) -> Result<NavigationOutcome> {
        if url.trim().is_empty() {
            return Ok(NavigationOutcome::Skipped(SkipReason::EmptyUrl));
        }

        let location = Location::resolve(&self.inner.config.base_url, url)?;
        let _gate = self.inner.gate.lock().await;
        self.ensure_open()?;

        let replay = {
            let state = self.inner.state.lock();
            if state
                .current
                .as_ref()
                .is_some_and(|f| f.url() == location.full())
            {
                trace!(url = %location, "Already active");
                return Ok(NavigationOutcome::Skipped(SkipReason::AlreadyActive));
            }

            if state.history.is_previous_state(location.full()) {
                Some(Traverse::Back)
            } else if state.history.is_next_state(location.full()) {
                Some(Traverse::Forward)
            } else {
                None
            }
        };

        if let Some(way) = replay {
            debug!(url = %location, ?way, "Replaying history");
            return self.traverse(way).await;
        }

        let update = if options.push_state {
            HistoryUpdate::Push
        } else {
            HistoryUpdate::Keep
        };
        self.perform(location, options.direction, update).await
    }

    /// Goes one record back, sliding the opposite way the record came in.
    ///
    /// # Errors
    ///
    /// Same as [`navigate_with`](Self::navigate_with).
    pub async fn back(&self) -> Result<NavigationOutcome> {
        let _gate = self.inner.gate.lock().await;
        self.ensure_open()?;
        self.traverse(Traverse::Back).await
    }

    /// Goes one record forward, replaying the record's slide.
    ///
    /// # Errors
    ///
    /// Same as [`navigate_with`](Self::navigate_with).
    pub async fn forward(&self) -> Result<NavigationOutcome> {
        let _gate = self.inner.gate.lock().await;
        self.ensure_open()?;
        self.traverse(Traverse::Forward).await
    }

    /// Must run under the gate.
    async fn traverse(&self, way: Traverse) -> Result<NavigationOutcome> {
        let target = {
            let state = self.inner.state.lock();
            match way {
                Traverse::Back => state.history.back_target(),
                Traverse::Forward => state.history.forward_target(),
            }
        };

        let Some(target) = target else {
            trace!(?way, "At history boundary");
            return Ok(NavigationOutcome::Skipped(SkipReason::AtHistoryBoundary));
        };

        debug!(index = target.index, direction = ?target.direction, ?way, "Traverse");
        let location = Location::parse(&target.url)?;
        self.perform(location, target.direction, HistoryUpdate::Traverse(target.index))
            .await
    }

    /// Must run under the gate.
    async fn perform(
        &self,
        location: Location,
        direction: Direction,
        update: HistoryUpdate,
    ) -> Result<NavigationOutcome> {
        let phase = PhaseGuard::new(&self.inner, NavState::Resolving);
        let frame = self.inner.pool.resolve(&location).await?;

        let previous = {
            let mut state = self.inner.state.lock();

            // Closed or evicted while resolving.
            if self.inner.is_closed() || !self.inner.pool.holds(&frame) {
                drop(state);
                debug!(frame_id = %frame.id(), url = %location, "Frame lost before commit");
                frame.teardown();
                return Err(Error::ConnectionClosed);
            }

            let previous = state.current.replace(Arc::clone(&frame));

            match update {
                HistoryUpdate::Push => state.history.push_state(location.full(), direction),
                HistoryUpdate::Traverse(index) => state.history.set_index(index),
                HistoryUpdate::Keep => {}
            }

            previous
        };

        let url = location.full().to_string();
        debug!(
            frame_id = %frame.id(),
            url = %url,
            ?direction,
            first = previous.is_none(),
            "Navigation committed"
        );

        self.inner.emit(BrowserEvent::Navigate { url: url.clone() });
        self.spawn_metadata_fetch(Arc::clone(&frame));
        prerender::spawn(&self.inner, Arc::clone(&frame));

        phase.enter(NavState::Transitioning);
        self.slide(previous.as_deref(), &frame, direction).await;

        Ok(NavigationOutcome::Navigated { url, direction })
    }

    /// Slides `outgoing` out and `incoming` in, concurrently.
    async fn slide(&self, outgoing: Option<&Frame>, incoming: &Frame, direction: Direction) {
        // Same document, different query or hash.
        if outgoing.is_some_and(|f| f.id() == incoming.id()) {
            return;
        }

        let duration = if outgoing.is_none() {
            Duration::ZERO
        } else {
            self.inner.config.transition_duration
        };

        let animator = Animator::new(self.inner.host.is_rtl());
        join(
            animator.transition(
                outgoing.map(Frame::surface),
                Position::Center,
                Position::from(direction.inverse()),
                duration,
            ),
            animator.transition(
                Some(incoming.surface()),
                Position::from(direction),
                Position::Center,
                duration,
            ),
        )
        .await;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.inner.is_closed() {
            return Err(Error::ConnectionClosed);
        }
        Ok(())
    }
}

// ============================================================================
// Browser - Metadata
// ============================================================================

impl Browser {
    /// Fetches and projects the active frame's metadata.
    ///
    /// Returns `None` before the first navigation.
    ///
    /// # Errors
    ///
    /// Propagates bridge failures.
    pub async fn get_metadata(&self) -> Result<Option<Metadata>> {
        let Some(frame) = self.current() else {
            return Ok(None);
        };
        let page = fetch_metadata(&frame).await?;
        Ok(Some(page.project()))
    }

    /// Reads the active document's title.
    ///
    /// Returns `None` before the first navigation or if the document has
    /// no title.
    ///
    /// # Errors
    ///
    /// Propagates bridge failures.
    pub async fn get_title(&self) -> Result<Option<String>> {
        let Some(frame) = self.current() else {
            return Ok(None);
        };

        let query = Query::new("title").property("textContent");
        let result = frame
            .connection()
            .call(Command::QuerySelector(query))
            .await?;

        Ok(result
            .get("textContent")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn spawn_metadata_fetch(&self, frame: Arc<Frame>) {
        self.inner.state.lock().pending_metadata += 1;
        let inner = Arc::downgrade(&self.inner);

        tokio::spawn(async move {
            let result = fetch_metadata(&frame).await;
            if let Some(inner) = inner.upgrade() {
                apply_metadata(&inner, &frame, result);
            }
        });
    }
}

async fn fetch_metadata(frame: &Frame) -> Result<PageMetadata> {
    let value = frame.connection().call(Command::GetMetaData).await?;
    Ok(PageMetadata::from_value(&value))
}

fn apply_metadata(inner: &BrowserInner, frame: &Frame, result: Result<PageMetadata>) {
    let mut state = inner.state.lock();
    state.pending_metadata = state.pending_metadata.saturating_sub(1);

    let page = match result {
        Ok(page) => page,
        Err(e) => {
            warn!(frame_id = %frame.id(), error = %e, "Metadata fetch failed");
            return;
        }
    };

    frame.mark_loaded();

    let is_current = state
        .current
        .as_ref()
        .is_some_and(|current| current.id() == frame.id());
    if !is_current {
        debug!(frame_id = %frame.id(), "Discarding stale metadata");
        return;
    }

    let metadata = page.project();
    state.metadata = Some(metadata.clone());
    drop(state);

    debug!(frame_id = %frame.id(), entries = metadata.len(), "Metadata applied");
    inner.emit(BrowserEvent::Changed {
        url: frame.url(),
        metadata,
    });
}

// ============================================================================
// Form Submission
// ============================================================================

/// Builds the navigation target of a form submission.
///
/// String params are appended as they are; an object becomes a
/// percent-encoded query string.
pub(crate) fn form_target(action: &str, params: &Value) -> String {
    match params {
        Value::String(encoded) => format!("{action}{encoded}"),
        Value::Object(fields) if !fields.is_empty() => {
            let query = fields
                .iter()
                .map(|(name, value)| {
                    format!(
                        "{}={}",
                        urlencoding::encode(name),
                        urlencoding::encode(&field_text(value))
                    )
                })
                .collect::<Vec<_>>()
                .join("&");
            let separator = if action.contains('?') { '&' } else { '?' };
            format!("{action}{separator}{query}")
        }
        _ => action.to_string(),
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::{FakeHost, PageScript, settle, wait_for};
    use crate::browser::{EvictionPolicy, Visibility};
    use serde_json::json;
    use tokio::sync::watch;

    const SLIDE: Duration = Duration::from_millis(300);

    fn browser(host: &Arc<FakeHost>) -> Browser {
        Browser::builder()
            .build(Arc::clone(host) as Arc<dyn crate::browser::FrameHost>)
            .expect("build")
    }

    fn urls(browser: &Browser) -> Vec<String> {
        browser
            .history()
            .records
            .into_iter()
            .map(|r| r.url)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_navigation_is_instant() {
        let host = FakeHost::new();
        let browser = browser(&host);

        let start = tokio::time::Instant::now();
        let outcome = browser.navigate("/a").await.expect("navigate");

        assert_eq!(
            outcome,
            NavigationOutcome::Navigated {
                url: "http://localhost/a".to_string(),
                direction: Direction::Next,
            }
        );
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(browser.src().as_deref(), Some("http://localhost/a"));
        assert_eq!(
            host.surface("http://localhost/a").expect("surface").moves(),
            vec![(100, Duration::ZERO), (0, Duration::ZERO)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_navigation_slides_both_frames() {
        let host = FakeHost::new();
        let browser = browser(&host);

        browser.navigate("/a").await.expect("navigate");
        let start = tokio::time::Instant::now();
        browser.navigate("/b").await.expect("navigate");

        assert!(start.elapsed() >= SLIDE);
        let a = host.surface("http://localhost/a").expect("surface");
        let b = host.surface("http://localhost/b").expect("surface");
        assert_eq!(a.offset(), -100);
        assert_eq!(b.offset(), 0);
        assert_eq!(b.moves(), vec![(100, Duration::ZERO), (0, SLIDE)]);
        assert!(matches!(browser.state(), NavState::Idle | NavState::MetadataPending));
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigate_twice_is_noop() {
        let host = FakeHost::new();
        let browser = browser(&host);

        browser.navigate("/a").await.expect("navigate");
        let outcome = browser.navigate("/a").await.expect("navigate");

        assert_eq!(outcome, NavigationOutcome::Skipped(SkipReason::AlreadyActive));
        assert_eq!(browser.history().len(), 1);
        assert_eq!(host.surface("http://localhost/a").expect("surface").moves().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_and_invalid_urls() {
        let host = FakeHost::new();
        let browser = browser(&host);

        let outcome = browser.navigate("").await.expect("navigate");
        assert_eq!(outcome, NavigationOutcome::Skipped(SkipReason::EmptyUrl));

        let result = browser.navigate("http://[::1").await;
        assert!(matches!(result, Err(Error::InvalidUrl { .. })));
        assert!(host.spawned().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_change_reuses_active_frame() {
        let host = FakeHost::new();
        let browser = browser(&host);

        browser.navigate("/x?y=1").await.expect("navigate");
        browser.navigate("/x?y=2").await.expect("navigate");

        assert_eq!(browser.frame_count(), 1);
        assert_eq!(browser.src().as_deref(), Some("http://localhost/x?y=2"));
        assert!(host.calls_for("http://localhost/x").contains(&Command::PushState {
            url: "http://localhost/x?y=2".to_string()
        }));
        assert_eq!(browser.history().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_bound() {
        let host = FakeHost::new();
        let browser = browser(&host);

        for i in 0..11 {
            browser.navigate(&format!("/{i}")).await.expect("navigate");
        }

        let history = browser.history();
        assert_eq!(history.len(), 10);
        assert_eq!(history.records[0].url, "http://localhost/1");
        assert_eq!(history.index, Some(9));
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_restores_previous_frame_with_inverse_slide() {
        let host = FakeHost::new();
        let browser = browser(&host);

        browser.navigate("/a").await.expect("navigate");
        let a = browser.current().expect("current");
        browser.navigate("/b").await.expect("navigate");

        let outcome = browser.back().await.expect("back");
        assert_eq!(
            outcome,
            NavigationOutcome::Navigated {
                url: "http://localhost/a".to_string(),
                direction: Direction::Prev,
            }
        );
        assert!(Arc::ptr_eq(&a, &browser.current().expect("current")));
        assert_eq!(browser.history().index, Some(0));
        assert_eq!(browser.history().len(), 2);

        // `b` leaves toward the next side, `a` comes back from the previous one.
        let b = host.surface("http://localhost/b").expect("surface");
        assert_eq!(b.offset(), 100);
        let a_moves = host.surface("http://localhost/a").expect("surface").moves();
        assert_eq!(&a_moves[a_moves.len() - 2..], &[(-100, Duration::ZERO), (0, SLIDE)]);

        let outcome = browser.forward().await.expect("forward");
        assert_eq!(
            outcome,
            NavigationOutcome::Navigated {
                url: "http://localhost/b".to_string(),
                direction: Direction::Next,
            }
        );
        assert_eq!(browser.history().index, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_boundaries_are_noops() {
        let host = FakeHost::new();
        let browser = browser(&host);

        let outcome = browser.back().await.expect("back");
        assert_eq!(outcome, NavigationOutcome::Skipped(SkipReason::AtHistoryBoundary));

        browser.navigate("/a").await.expect("navigate");
        browser.navigate("/b").await.expect("navigate");

        let outcome = browser.forward().await.expect("forward");
        assert_eq!(outcome, NavigationOutcome::Skipped(SkipReason::AtHistoryBoundary));

        browser.back().await.expect("back");
        let before = browser.history();
        let outcome = browser.back().await.expect("back");
        assert_eq!(outcome, NavigationOutcome::Skipped(SkipReason::AtHistoryBoundary));
        assert_eq!(browser.history(), before);
        assert_eq!(browser.src().as_deref(), Some("http://localhost/a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_small_history_scenario() {
        let host = FakeHost::new();
        let browser = Browser::builder()
            .max_history(3)
            .build(Arc::clone(&host) as Arc<dyn crate::browser::FrameHost>)
            .expect("build");

        for path in ["/a", "/b", "/c", "/d"] {
            browser.navigate(path).await.expect("navigate");
        }

        assert_eq!(
            urls(&browser),
            vec!["http://localhost/b", "http://localhost/c", "http://localhost/d"]
        );
        assert_eq!(browser.history().index, Some(2));

        browser.back().await.expect("back");
        assert_eq!(browser.src().as_deref(), Some("http://localhost/c"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigating_to_previous_record_replays_back() {
        let host = FakeHost::new();
        let browser = browser(&host);

        browser.navigate("/a").await.expect("navigate");
        browser.navigate("/b").await.expect("navigate");
        let outcome = browser
            .navigate_with("/a", NavigateOptions::new().direction(Direction::Next))
            .await
            .expect("navigate");

        assert_eq!(
            outcome,
            NavigationOutcome::Navigated {
                url: "http://localhost/a".to_string(),
                direction: Direction::Prev,
            }
        );
        assert_eq!(browser.history().len(), 2);
        assert_eq!(browser.history().index, Some(0));

        browser.navigate("/b").await.expect("navigate");
        assert_eq!(browser.history().index, Some(1));
        assert_eq!(browser.history().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_push_state() {
        let host = FakeHost::new();
        let browser = browser(&host);

        browser.navigate("/a").await.expect("navigate");
        browser
            .navigate_with("/b", NavigateOptions::new().push_state(false))
            .await
            .expect("navigate");

        assert_eq!(urls(&browser), vec!["http://localhost/a"]);
        assert_eq!(browser.src().as_deref(), Some("http://localhost/b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_navigations_are_queued() {
        let host = FakeHost::new();
        let browser = browser(&host);
        browser.navigate("/a").await.expect("navigate");

        let (b, c) = tokio::join!(browser.navigate("/b"), browser.navigate("/c"));
        assert!(b.expect("b").is_navigated());
        assert!(c.expect("c").is_navigated());

        assert_eq!(
            urls(&browser),
            vec!["http://localhost/a", "http://localhost/b", "http://localhost/c"]
        );
        assert_eq!(browser.src().as_deref(), Some("http://localhost/c"));
        assert!(matches!(browser.state(), NavState::Idle | NavState::MetadataPending));
    }

    #[tokio::test(start_paused = true)]
    async fn test_metadata_changed_event() {
        let host = FakeHost::new();
        host.page(
            "http://localhost/a",
            PageScript::default()
                .meta("og:title", "Hi")
                .meta("og:image", "i.png"),
        );
        let browser = browser(&host);
        let mut events = browser.subscribe();

        browser.navigate("/a").await.expect("navigate");

        let navigate = wait_for(&mut events, |e| e.name() == "navigate").await;
        assert_eq!(
            navigate,
            BrowserEvent::Navigate {
                url: "http://localhost/a".to_string()
            }
        );

        let changed = wait_for(&mut events, |e| e.name() == "changed").await;
        let BrowserEvent::Changed { url, metadata } = changed else {
            panic!("expected changed");
        };
        assert_eq!(url, "http://localhost/a");
        assert_eq!(metadata.get("og:title"), Some("Hi"));
        assert_eq!(metadata.get("og:image"), Some("i.png"));

        assert!(browser.current().expect("current").is_loaded());
        assert_eq!(browser.metadata().as_ref(), Some(&metadata));
        assert_eq!(browser.state(), NavState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_metadata_is_discarded() {
        let host = FakeHost::new();
        host.page(
            "http://localhost/slow",
            PageScript::default()
                .meta("page", "slow")
                .metadata_delay(Duration::from_secs(2)),
        );
        host.page("http://localhost/fast", PageScript::default().meta("page", "fast"));
        let browser = browser(&host);
        let mut events = browser.subscribe();

        browser.navigate("/slow").await.expect("navigate");
        let slow = browser.current().expect("current");
        browser.navigate("/fast").await.expect("navigate");

        let changed = wait_for(&mut events, |e| e.name() == "changed").await;
        assert!(matches!(
            changed,
            BrowserEvent::Changed { ref url, .. } if url == "http://localhost/fast"
        ));

        tokio::time::sleep(Duration::from_secs(3)).await;
        settle().await;

        let page = browser
            .metadata()
            .and_then(|m| m.get("page").map(str::to_string));
        assert_eq!(page.as_deref(), Some("fast"));
        assert!(slow.is_loaded());
        assert_eq!(browser.state(), NavState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_metadata_failure_leaves_not_loaded() {
        let host = FakeHost::new();
        host.page("http://localhost/a", PageScript::default().fail_metadata());
        let browser = browser(&host);

        browser.navigate("/a").await.expect("navigate");
        settle().await;

        assert!(!browser.current().expect("current").is_loaded());
        assert!(browser.metadata().is_none());
        assert_eq!(browser.state(), NavState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_metadata_and_title() {
        let host = FakeHost::new();
        host.page(
            "http://localhost/a",
            PageScript::default()
                .title("Inbox")
                .meta("navigation:back", "/"),
        );
        let browser = browser(&host);

        assert_eq!(browser.get_title().await.expect("title"), None);
        assert_eq!(browser.get_metadata().await.expect("metadata"), None);

        browser.navigate("/a").await.expect("navigate");

        assert_eq!(browser.get_title().await.expect("title").as_deref(), Some("Inbox"));
        let metadata = browser.get_metadata().await.expect("metadata").expect("some");
        assert_eq!(metadata.get("navigation:back"), Some("/"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_frame_creation_failure_leaves_state() {
        let host = FakeHost::new();
        host.fail_spawn("http://localhost/broken");
        let browser = browser(&host);

        browser.navigate("/a").await.expect("navigate");
        let result = browser.navigate("/broken").await;

        assert!(matches!(result, Err(Error::FrameCreation { .. })));
        assert_eq!(browser.src().as_deref(), Some("http://localhost/a"));
        assert_eq!(browser.history().len(), 1);
        assert_eq!(browser.frame_count(), 1);
        assert!(matches!(browser.state(), NavState::Idle | NavState::MetadataPending));
    }

    #[tokio::test(start_paused = true)]
    async fn test_link_click_from_active_frame_navigates() {
        let host = FakeHost::new();
        let browser = browser(&host);
        let mut events = browser.subscribe();

        browser.navigate("/a").await.expect("navigate");
        browser.navigate("/b").await.expect("navigate");
        host.emit(
            "http://localhost/b",
            "linkclicked",
            json!({"href": "http://localhost/c", "rel": "prev"}),
        );

        let clicked = wait_for(&mut events, |e| e.name() == "linkclicked").await;
        assert_eq!(
            clicked,
            BrowserEvent::LinkClicked {
                href: "http://localhost/c".to_string(),
                rel: Some("prev".to_string()),
            }
        );
        wait_for(&mut events, |e| {
            matches!(e, BrowserEvent::Navigate { url } if url == "http://localhost/c")
        })
        .await;

        let history = browser.history();
        let current = history.current().expect("record");
        assert_eq!(current.url, "http://localhost/c");
        assert_eq!(current.from, Direction::Prev);
    }

    #[tokio::test(start_paused = true)]
    async fn test_link_click_from_background_frame_is_ignored() {
        let host = FakeHost::new();
        let browser = browser(&host);
        let mut events = browser.subscribe();

        browser.navigate("/a").await.expect("navigate");
        browser.navigate("/b").await.expect("navigate");
        host.emit("http://localhost/a", "linkclicked", json!({"href": "http://localhost/c"}));

        wait_for(&mut events, |e| e.name() == "linkclicked").await;
        settle().await;

        assert_eq!(browser.src().as_deref(), Some("http://localhost/b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_form_submit_navigates() {
        let host = FakeHost::new();
        let browser = browser(&host);
        let mut events = browser.subscribe();

        browser.navigate("/search").await.expect("navigate");
        host.emit(
            "http://localhost/search",
            "submit",
            json!({"method": "get", "action": "/results", "params": {"q": "a b"}}),
        );

        wait_for(&mut events, |e| e.name() == "submit").await;
        wait_for(&mut events, |e| e.name() == "navigate").await;
        assert_eq!(browser.src().as_deref(), Some("http://localhost/results?q=a%20b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_broadcasts_are_forwarded() {
        let host = FakeHost::new();
        let browser = browser(&host);
        let mut events = browser.subscribe();

        browser.navigate("/a").await.expect("navigate");
        host.emit("http://localhost/a", "localized", Value::Null);
        host.emit("http://localhost/a", "scrolled", json!({"y": 10}));

        assert_eq!(
            wait_for(&mut events, |e| e.name() == "localized").await,
            BrowserEvent::Localized
        );
        assert_eq!(
            wait_for(&mut events, |e| e.name() == "scrolled").await,
            BrowserEvent::Bridge {
                name: "scrolled".to_string(),
                params: json!({"y": 10}),
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rtl_mirrors_slides() {
        let host = FakeHost::new();
        host.set_rtl(true);
        let browser = browser(&host);

        browser.navigate("/a").await.expect("navigate");
        browser.navigate("/b").await.expect("navigate");

        assert_eq!(host.surface("http://localhost/a").expect("surface").offset(), 100);
        let b = host.surface("http://localhost/b").expect("surface");
        assert_eq!(b.moves(), vec![(-100, Duration::ZERO), (0, SLIDE)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_evicts_background_frames() {
        let host = FakeHost::new();
        let (visibility_tx, visibility_rx) = watch::channel(Visibility::Visible);
        let browser = Browser::builder()
            .eviction(EvictionPolicy::EvictHidden)
            .visibility(visibility_rx)
            .build(Arc::clone(&host) as Arc<dyn crate::browser::FrameHost>)
            .expect("build");

        browser.navigate("/a").await.expect("navigate");
        browser.navigate("/b").await.expect("navigate");
        assert_eq!(browser.frame_count(), 2);

        visibility_tx.send(Visibility::Hidden).expect("send");
        settle().await;

        assert_eq!(browser.frame_count(), 1);
        assert!(host.surface("http://localhost/a").expect("surface").is_removed());
        assert!(!host.surface("http://localhost/b").expect("surface").is_removed());

        visibility_tx.send(Visibility::Visible).expect("send");
        browser.navigate("/a").await.expect("navigate");
        assert_eq!(host.spawned().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_retains_by_default() {
        let host = FakeHost::new();
        let (visibility_tx, visibility_rx) = watch::channel(Visibility::Visible);
        let browser = Browser::builder()
            .visibility(visibility_rx)
            .build(Arc::clone(&host) as Arc<dyn crate::browser::FrameHost>)
            .expect("build");

        browser.navigate("/a").await.expect("navigate");
        browser.navigate("/b").await.expect("navigate");
        visibility_tx.send(Visibility::Hidden).expect("send");
        settle().await;

        assert_eq!(browser.frame_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close() {
        let host = FakeHost::new();
        let browser = browser(&host);

        browser.navigate("/a").await.expect("navigate");
        let frame = browser.current().expect("current");
        browser.close();
        settle().await;

        assert!(browser.is_closed());
        assert!(frame.connection().is_closed());
        assert_eq!(browser.frame_count(), 0);
        assert!(browser.src().is_none());
        assert!(matches!(browser.navigate("/b").await, Err(Error::ConnectionClosed)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_during_frame_creation() {
        let host = FakeHost::new();
        host.set_spawn_delay(Duration::from_millis(50));
        let browser = browser(&host);

        let pending = tokio::spawn({
            let browser = browser.clone();
            async move { browser.navigate("/a").await }
        });
        settle().await;
        browser.close();

        let result = pending.await.expect("join");
        assert!(matches!(result, Err(Error::ConnectionClosed)));
        assert!(browser.current().is_none());
        assert!(browser.history().is_empty());
        assert_eq!(browser.frame_count(), 0);
        assert!(host.surface("http://localhost/a").expect("surface").is_removed());
    }

    #[test]
    fn test_form_target() {
        assert_eq!(form_target("/search", &json!("?q=x")), "/search?q=x");
        assert_eq!(form_target("/search", &json!({"q": "a&b"})), "/search?q=a%26b");
        assert_eq!(form_target("/s?lang=en", &json!({"q": 1})), "/s?lang=en&q=1");
        assert_eq!(form_target("/search", &Value::Null), "/search");
    }
}
