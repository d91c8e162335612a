//! Host-facing notifications.

use serde_json::Value;

use crate::metadata::Metadata;

/// Capacity of the notification channel.
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A notification from the browser to its embedder.
///
/// Delivered through [`Browser::subscribe`](super::Browser::subscribe).
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserEvent {
    /// A navigation committed.
    Navigate {
        /// Active URL.
        url: String,
    },

    /// Metadata of the active frame arrived.
    Changed {
        /// URL of the frame the metadata belongs to.
        url: String,
        /// Projected metadata.
        metadata: Metadata,
    },

    /// A link was clicked inside a frame.
    LinkClicked {
        /// Link target.
        href: String,
        /// Link `rel`.
        rel: Option<String>,
    },

    /// A form was submitted inside a frame.
    FormSubmitted {
        /// Form method.
        method: String,
        /// Form action.
        action: String,
        /// Form fields.
        params: Value,
    },

    /// A frame finished localizing.
    Localized,

    /// Any other frame broadcast.
    Bridge {
        /// Event name.
        name: String,
        /// Event params.
        params: Value,
    },
}

impl BrowserEvent {
    /// Event name as seen by DOM-style listeners.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Navigate { .. } => "navigate",
            Self::Changed { .. } => "changed",
            Self::LinkClicked { .. } => "linkclicked",
            Self::FormSubmitted { .. } => "submit",
            Self::Localized => "localized",
            Self::Bridge { name, .. } => name,
        }
    }
}
