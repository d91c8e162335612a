//! Event message types.
//!
//! Events are broadcasts a frame's content sends to its host without being
//! asked.
//!
//! | Event | Params |
//! |-------|--------|
//! | `linkclicked` | `{href, rel}` |
//! | `submit` | `{method, action, params}` |
//! | `localized` | none |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Event
// ============================================================================

/// Marker value of the `type` field of every event.
const EVENT_TYPE: &str = "event";

/// A broadcast from a frame to its host.
///
/// # Format
///
/// ```json
/// {
///   "type": "event",
///   "method": "linkclicked",
///   "params": { "href": "...", "rel": "next" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event type marker (always "event").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Event name.
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,
}

impl Event {
    /// Creates a new event.
    #[must_use]
    pub fn new(name: impl Into<String>, params: Value) -> Self {
        Self {
            event_type: EVENT_TYPE.to_string(),
            method: name.into(),
            params,
        }
    }

    /// Returns `true` if the `type` marker is present and correct.
    #[inline]
    #[must_use]
    pub fn is_event(&self) -> bool {
        self.event_type == EVENT_TYPE
    }

    /// Parses the event into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ParsedEvent {
        let params = &self.params;

        match self.method.as_str() {
            "linkclicked" => ParsedEvent::LinkClicked {
                href: string_field(params, "href"),
                rel: params
                    .get("rel")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },

            "submit" => ParsedEvent::Submit {
                method: params
                    .get("method")
                    .and_then(Value::as_str)
                    .unwrap_or("get")
                    .to_string(),
                action: string_field(params, "action"),
                params: params.get("params").cloned().unwrap_or(Value::Null),
            },

            "localized" => ParsedEvent::Localized,

            _ => ParsedEvent::Unknown {
                name: self.method.clone(),
                params: params.clone(),
            },
        }
    }
}

// ============================================================================
// ParsedEvent
// ============================================================================

/// Parsed event types for type-safe handling.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEvent {
    /// A link inside the frame was clicked.
    LinkClicked {
        /// Absolute link target.
        href: String,
        /// Link `rel` attribute (`next`/`prev` select a direction).
        rel: Option<String>,
    },

    /// A form inside the frame was submitted.
    Submit {
        /// Form method.
        method: String,
        /// Form action URL.
        action: String,
        /// Form fields, either a preencoded string or an object.
        params: Value,
    },

    /// The frame finished localizing its content.
    Localized,

    /// Any other broadcast.
    Unknown {
        /// Event name.
        name: String,
        /// Event params.
        params: Value,
    },
}

// ============================================================================
// Helper Functions
// ============================================================================

fn string_field(params: &Value, key: &str) -> String {
    params
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================
