//! Frame-side bridge endpoint.
//!
//! [`BridgeService`] is what runs next to a frame's content: it receives the
//! host's remote calls, answers them, and broadcasts events back. Embedders
//! wire it to whatever actually talks to the page (a script bridge, a
//! message port); tests script it directly.

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Value, to_string};
use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::identifiers::RequestId;
use crate::protocol::{Event, Request, Response};

use super::Connection;

// ============================================================================
// Constants
// ============================================================================

/// Error code sent when the frame rejects a call.
const CALL_FAILED: &str = "call-failed";

// ============================================================================
// pipe
// ============================================================================

/// Creates an in-process bridge: a host-side [`Connection`] and the
/// frame-side [`BridgeService`] it talks to.
///
/// Must be called from within a tokio runtime.
#[must_use]
pub fn pipe() -> (Connection, BridgeService) {
    let (to_frame_tx, to_frame_rx) = mpsc::unbounded_channel();
    let (to_host_tx, to_host_rx) = mpsc::unbounded_channel();

    let connection = Connection::new(to_frame_tx, to_host_rx);
    let service = BridgeService {
        incoming: to_frame_rx,
        outgoing: to_host_tx,
    };

    (connection, service)
}

// ============================================================================
// BridgeService
// ============================================================================

/// Frame-side end of a bridge.
#[derive(Debug)]
pub struct BridgeService {
    /// Serialized requests from the host.
    incoming: mpsc::UnboundedReceiver<String>,
    /// Serialized responses and events to the host.
    outgoing: mpsc::UnboundedSender<String>,
}

impl BridgeService {
    /// Waits for the next well-formed request.
    ///
    /// Malformed messages are logged and skipped. Returns `None` once the
    /// host connection is gone.
    pub async fn next_request(&mut self) -> Option<Request> {
        while let Some(text) = self.incoming.recv().await {
            match Request::from_json(&text) {
                Ok(request) => {
                    trace!(id = %request.id, method = request.command.method(), "Request received");
                    return Some(request);
                }
                Err(e) => warn!(error = %e, "Dropping malformed request"),
            }
        }
        None
    }

    /// Answers a request.
    ///
    /// An `Err` is delivered to the host as an error response.
    pub fn respond(&self, id: RequestId, result: Result<Value, String>) {
        let response = match result {
            Ok(value) => Response::success(id, value),
            Err(message) => Response::error(id, CALL_FAILED, message),
        };
        self.send(&response);
    }

    /// Broadcasts a named event to the host.
    pub fn broadcast(&self, name: &str, params: Value) {
        self.send(&Event::new(name, params));
    }

    /// Returns `true` once the host side has dropped its connection.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.outgoing.is_closed()
    }

    fn send<T: serde::Serialize>(&self, message: &T) {
        match to_string(message) {
            Ok(json) => {
                if self.outgoing.send(json).is_err() {
                    trace!("Host connection gone, message dropped");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize bridge message"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
