//! Bridge protocol message types.
//!
//! This module defines the JSON messages exchanged between the host and the
//! content of each frame.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Host → Frame | Remote call |
//! | `Response` | Frame → Host | Remote call result |
//! | `Event` | Frame → Host | Broadcast notification |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Remote call definitions |
//! | `event` | Broadcast types |
//! | `request` | Request and Response types |

// ============================================================================
// Submodules
// ============================================================================

/// Remote call definitions.
pub mod command;

/// Event message types.
pub mod event;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{Command, Query};
pub use event::{Event, ParsedEvent};
pub use request::{Request, Response, ResponseType};
