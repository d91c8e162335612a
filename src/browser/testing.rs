//! In-process frame host for tests.
//!
//! Every spawned frame gets a headless surface and a scripted bridge
//! service answering from a per-page [`PageScript`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::{Value, json};
use tokio::sync::{broadcast, mpsc};

use crate::error::{Error, Result};
use crate::protocol::Command;
use crate::transport::pipe;

use super::events::BrowserEvent;
use super::host::{EmbeddedContext, FrameHost, HeadlessSurface};
use super::location::Location;

// ============================================================================
// PageScript
// ============================================================================

/// What a fake page answers.
#[derive(Debug, Clone, Default)]
pub(crate) struct PageScript {
    title: Option<String>,
    meta: Vec<(String, String)>,
    prerender: Vec<String>,
    fail_metadata: bool,
    metadata_delay: Duration,
}

impl PageScript {
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn meta(mut self, property: &str, content: &str) -> Self {
        self.meta.push((property.to_string(), content.to_string()));
        self
    }

    pub fn prerender(mut self, href: &str) -> Self {
        self.prerender.push(href.to_string());
        self
    }

    pub fn fail_metadata(mut self) -> Self {
        self.fail_metadata = true;
        self
    }

    pub fn metadata_delay(mut self, delay: Duration) -> Self {
        self.metadata_delay = delay;
        self
    }

    fn answer(&self, command: &Command) -> std::result::Result<Value, String> {
        match command {
            Command::GetMetaData if self.fail_metadata => Err("metadata unavailable".to_string()),
            Command::GetMetaData => {
                let meta: Vec<Value> = self
                    .meta
                    .iter()
                    .map(|(property, content)| json!({"property": property, "content": content}))
                    .collect();
                Ok(json!({"title": self.title, "meta": meta}))
            }
            Command::QuerySelector(query) if query.selector == "title" => Ok(self
                .title
                .as_ref()
                .map_or(Value::Null, |title| json!({"textContent": title}))),
            Command::QuerySelector(_) => Ok(Value::Null),
            Command::QuerySelectorAll(_) => Ok(Value::Array(
                self.prerender
                    .iter()
                    .map(|href| json!({"href": href}))
                    .collect(),
            )),
            Command::PushState { .. } => Ok(Value::Null),
        }
    }
}

// ============================================================================
// FakeHost
// ============================================================================

/// Scripted [`FrameHost`]. Everything is keyed by canonical URL.
#[derive(Default)]
pub(crate) struct FakeHost {
    state: Mutex<HostState>,
    /// Shared with every frame's responder task.
    calls: Arc<Mutex<Vec<(String, Command)>>>,
}

#[derive(Default)]
struct HostState {
    pages: FxHashMap<String, PageScript>,
    spawned: Vec<String>,
    failing: HashSet<String>,
    surfaces: FxHashMap<String, Arc<HeadlessSurface>>,
    emitters: FxHashMap<String, mpsc::UnboundedSender<(String, Value)>>,
    spawn_delay: Duration,
    rtl: bool,
}

fn key_of(url: &str) -> String {
    Location::parse(url)
        .map(|location| location.key().as_str().to_string())
        .unwrap_or_else(|_| url.to_string())
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn page(&self, url: &str, script: PageScript) {
        self.state.lock().pages.insert(key_of(url), script);
    }

    pub fn set_rtl(&self, rtl: bool) {
        self.state.lock().rtl = rtl;
    }

    pub fn set_spawn_delay(&self, delay: Duration) {
        self.state.lock().spawn_delay = delay;
    }

    pub fn fail_spawn(&self, url: &str) {
        self.state.lock().failing.insert(key_of(url));
    }

    pub fn allow_spawn(&self, url: &str) {
        self.state.lock().failing.remove(&key_of(url));
    }

    /// URLs of successfully spawned frames, in order.
    pub fn spawned(&self) -> Vec<String> {
        self.state.lock().spawned.clone()
    }

    /// Bridge calls received by the frame for `url`.
    pub fn calls_for(&self, url: &str) -> Vec<Command> {
        let key = key_of(url);
        self.calls
            .lock()
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, command)| command.clone())
            .collect()
    }

    /// Latest surface spawned for `url`.
    pub fn surface(&self, url: &str) -> Option<Arc<HeadlessSurface>> {
        self.state.lock().surfaces.get(&key_of(url)).cloned()
    }

    /// Makes the frame for `url` broadcast an event.
    pub fn emit(&self, url: &str, name: &str, params: Value) {
        if let Some(emitter) = self.state.lock().emitters.get(&key_of(url)) {
            let _ = emitter.send((name.to_string(), params));
        }
    }

    fn script(&self, key: &str) -> PageScript {
        self.state.lock().pages.get(key).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl FrameHost for FakeHost {
    async fn spawn(&self, url: &str) -> Result<EmbeddedContext> {
        let key = key_of(url);

        let delay = self.state.lock().spawn_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.state.lock().failing.contains(&key) {
            return Err(Error::frame_creation(url, "refused by host"));
        }

        let (connection, mut service) = pipe();
        let surface = Arc::new(HeadlessSurface::new());
        let (emit_tx, mut emit_rx) = mpsc::unbounded_channel::<(String, Value)>();

        {
            let mut state = self.state.lock();
            state.spawned.push(url.to_string());
            state.surfaces.insert(key.clone(), Arc::clone(&surface));
            state.emitters.insert(key.clone(), emit_tx);
        }

        let script = self.script(&key);
        let calls = Arc::clone(&self.calls);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    request = service.next_request() => {
                        let Some(request) = request else {
                            break;
                        };
                        calls.lock().push((key.clone(), request.command.clone()));
                        if matches!(request.command, Command::GetMetaData)
                            && !script.metadata_delay.is_zero()
                        {
                            tokio::time::sleep(script.metadata_delay).await;
                        }
                        service.respond(request.id, script.answer(&request.command));
                    }

                    Some((name, params)) = emit_rx.recv() => {
                        service.broadcast(&name, params);
                    }
                }
            }
        });

        Ok(EmbeddedContext {
            surface,
            connection,
        })
    }

    fn is_rtl(&self) -> bool {
        self.state.lock().rtl
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Lets every ready task run for a while.
pub(crate) async fn settle() {
    for _ in 0..64 {
        tokio::task::yield_now().await;
    }
}

/// Waits for the first event matching `predicate`.
///
/// # Panics
///
/// If nothing matches within five seconds.
pub(crate) async fn wait_for(
    events: &mut broadcast::Receiver<BrowserEvent>,
    predicate: impl Fn(&BrowserEvent) -> bool,
) -> BrowserEvent {
    let wait = async {
        loop {
            match events.recv().await {
                Ok(event) if predicate(&event) => return event,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
            }
        }
    };

    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .expect("timed out waiting for event")
}
