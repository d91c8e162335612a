//! Remote call definitions.
//!
//! Every call a host makes into a frame's content is one [`Command`]
//! variant, serialized as `{"method": "...", "params": {...}}`.
//!
//! | Method | Params | Result |
//! |--------|--------|--------|
//! | `getMetaData` | none | records, or `{title, meta}` |
//! | `querySelector` | [`Query`] | object or `null` |
//! | `querySelectorAll` | [`Query`] | array of objects |
//! | `pushState` | `{url}` | ignored |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// Command
// ============================================================================

/// A remote call into a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum Command {
    /// Read the page's structured metadata records.
    #[serde(rename = "getMetaData")]
    GetMetaData,

    /// Pick properties/attributes of the first element matching a selector.
    #[serde(rename = "querySelector")]
    QuerySelector(Query),

    /// Pick properties/attributes of every element matching a selector.
    #[serde(rename = "querySelectorAll")]
    QuerySelectorAll(Query),

    /// Update the frame's location without reloading it.
    #[serde(rename = "pushState")]
    PushState {
        /// New full URL.
        url: String,
    },
}

impl Command {
    /// Returns the wire method name.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::GetMetaData => "getMetaData",
            Self::QuerySelector(_) => "querySelector",
            Self::QuerySelectorAll(_) => "querySelectorAll",
            Self::PushState { .. } => "pushState",
        }
    }
}

// ============================================================================
// Query
// ============================================================================

/// Element query parameters.
///
/// The frame answers each matched element with an object holding exactly
/// the requested `properties` and `attributes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// CSS selector.
    pub selector: String,

    /// DOM properties to read (e.g. `href`, `textContent`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<String>,

    /// Attributes to read (e.g. `rel`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

impl Query {
    /// Creates a query for a selector with nothing picked yet.
    #[inline]
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            ..Default::default()
        }
    }

    /// Adds a property to pick.
    #[inline]
    #[must_use]
    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.properties.push(name.into());
        self
    }

    /// Adds an attribute to pick.
    #[inline]
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
