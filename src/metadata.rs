//! Structured page metadata.
//!
//! Pages describe themselves with flat `{property, content}` records whose
//! property is a colon-delimited path (`og:title`, `action:compose:icon`).
//! [`project`] folds such records into a nested [`Metadata`] tree:
//!
//! ```
//! use frame_shell::metadata::{MetaRecord, project};
//!
//! let metadata = project([
//!     MetaRecord::new("og:title", "Hi"),
//!     MetaRecord::new("og:image", "i.png"),
//! ]);
//!
//! assert_eq!(metadata.get("og:title"), Some("Hi"));
//! assert_eq!(metadata.get("og:image"), Some("i.png"));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// MetaRecord
// ============================================================================

/// One flat metadata record as produced by a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaRecord {
    /// Colon-delimited path.
    pub property: String,
    /// Leaf value.
    #[serde(default)]
    pub content: String,
}

impl MetaRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(property: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            content: content.into(),
        }
    }
}

// ============================================================================
// MetaPath
// ============================================================================

/// Ordered sequence of segment names (`"a:b:c"` → `["a", "b", "c"]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetaPath(Vec<String>);

impl MetaPath {
    /// Splits a colon-delimited property. Never empty: `""` is one empty segment.
    #[must_use]
    pub fn parse(property: &str) -> Self {
        Self(property.split(':').map(str::to_string).collect())
    }

    /// Returns the segments.
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

// ============================================================================
// MetaNode / Metadata
// ============================================================================

/// A node of the metadata tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetaNode {
    /// Record content.
    Leaf(String),
    /// Nested level.
    Branch(Metadata),
}

/// Nested metadata mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: BTreeMap<String, MetaNode>,
}

impl Metadata {
    /// Creates an empty mapping.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `content` at `path`, last write wins.
    ///
    /// Intermediate leaves on the way are replaced by mappings; a leaf
    /// written over an existing mapping replaces the mapping.
    pub fn insert(&mut self, path: &MetaPath, content: impl Into<String>) {
        let Some((leaf, parents)) = path.segments().split_last() else {
            return;
        };

        let mut level = self;
        for segment in parents {
            let node = level
                .entries
                .entry(segment.clone())
                .or_insert_with(|| MetaNode::Branch(Metadata::new()));
            if let MetaNode::Leaf(_) = node {
                *node = MetaNode::Branch(Metadata::new());
            }
            let MetaNode::Branch(next) = node else {
                return;
            };
            level = next;
        }

        level
            .entries
            .insert(leaf.clone(), MetaNode::Leaf(content.into()));
    }

    /// Looks up a node by colon-delimited path.
    #[must_use]
    pub fn node(&self, property: &str) -> Option<&MetaNode> {
        let path = MetaPath::parse(property);
        let (last, parents) = path.segments().split_last()?;

        let mut level = self;
        for segment in parents {
            match level.entries.get(segment)? {
                MetaNode::Branch(next) => level = next,
                MetaNode::Leaf(_) => return None,
            }
        }
        level.entries.get(last)
    }

    /// Looks up a leaf value by colon-delimited path.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        match self.node(property)? {
            MetaNode::Leaf(content) => Some(content),
            MetaNode::Branch(_) => None,
        }
    }

    /// Looks up a nested mapping by colon-delimited path.
    #[must_use]
    pub fn branch(&self, property: &str) -> Option<&Metadata> {
        match self.node(property)? {
            MetaNode::Branch(branch) => Some(branch),
            MetaNode::Leaf(_) => None,
        }
    }

    /// Iterates this level's keys and nodes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of keys at this level.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if this level has no keys.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Projection
// ============================================================================

/// Folds flat records into a nested mapping.
pub fn project(records: impl IntoIterator<Item = MetaRecord>) -> Metadata {
    let mut metadata = Metadata::new();
    for record in records {
        metadata.insert(&MetaPath::parse(&record.property), record.content);
    }
    metadata
}

// ============================================================================
// PageMetadata
// ============================================================================

/// What a frame answers to `getMetaData`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    /// Document title, when the frame reports one.
    pub title: Option<String>,
    /// Records in document order.
    pub records: Vec<MetaRecord>,
}

impl PageMetadata {
    /// Reads a `getMetaData` result.
    ///
    /// Accepts a bare array of records or `{title, meta}`. Entries that are
    /// not objects or lack a string `property` are skipped; anything else
    /// yields empty metadata.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let (title, records) = match value {
            Value::Array(records) => (None, Some(records)),
            Value::Object(object) => (
                object
                    .get("title")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                object.get("meta").and_then(Value::as_array),
            ),
            _ => (None, None),
        };

        let records = records
            .map(|records| records.iter().filter_map(parse_record).collect())
            .unwrap_or_default();

        Self { title, records }
    }

    /// Projects the records into a tree.
    #[must_use]
    pub fn project(&self) -> Metadata {
        project(self.records.iter().cloned())
    }
}

fn parse_record(value: &Value) -> Option<MetaRecord> {
    let property = value.get("property")?.as_str()?;
    let content = match value.get("content") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    Some(MetaRecord::new(property, content))
}

// ============================================================================
// Tests
// ============================================================================
