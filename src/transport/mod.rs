//! Bridge transport layer.
//!
//! This module handles communication between the host and the content of
//! each frame.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Browser (host) │                              │  Frame content  │
//! │                 │      JSON text messages      │                 │
//! │  Connection     │◄────────────────────────────►│  BridgeService  │
//! │  (per frame)    │   requests / responses /     │                 │
//! │                 │   broadcast events           │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. [`pipe`] (or [`Connection::new`] over custom channels) when a frame is spawned
//! 2. `Connection::set_event_handler` to receive the frame's broadcasts
//! 3. `Connection::call` for remote calls
//! 4. `Connection::shutdown` when the frame is evicted or the browser closes
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | Host-side client and event loop |
//! | `service` | Frame-side endpoint and in-process pipe |

// ============================================================================
// Submodules
// ============================================================================

/// Host-side bridge client and event loop.
pub mod connection;

/// Frame-side bridge endpoint.
pub mod service;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, DEFAULT_REQUEST_TIMEOUT, EventHandler};
pub use service::{BridgeService, pipe};
