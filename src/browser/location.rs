//! URL resolution and canonical frame keys.

use std::fmt;

use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::FrameKey;

// ============================================================================
// Location
// ============================================================================

/// A resolved navigation target.
///
/// Holds the absolute URL and the canonical [`FrameKey`] derived from it
/// (origin + path; query and fragment stripped). Navigation URLs and frame
/// keys are always built through here, so a pool lookup for a given
/// origin + path is consistent whatever its query or hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    full: String,
    key: FrameKey,
}

impl Location {
    /// Resolves `raw` against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `raw` cannot be resolved.
    pub fn resolve(base: &Url, raw: &str) -> Result<Self> {
        let url = base.join(raw).map_err(|e| Error::invalid_url(raw, e))?;
        Ok(Self::from_url(url))
    }

    /// Parses an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `raw` is not an absolute URL.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|e| Error::invalid_url(raw, e))?;
        Ok(Self::from_url(url))
    }

    fn from_url(url: Url) -> Self {
        let mut canonical = url.clone();
        canonical.set_query(None);
        canonical.set_fragment(None);

        Self {
            full: url.into(),
            key: FrameKey::new(String::from(canonical)),
        }
    }

    /// Absolute URL including query and fragment.
    #[inline]
    #[must_use]
    pub fn full(&self) -> &str {
        &self.full
    }

    /// Canonical pool key.
    #[inline]
    #[must_use]
    pub fn key(&self) -> &FrameKey {
        &self.key
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

// ============================================================================
// Tests
// ============================================================================
