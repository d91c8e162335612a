//! Browser configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use frame_shell::{Browser, EvictionPolicy};
//!
//! let browser = Browser::builder()
//!     .max_history(20)
//!     .transition_duration(Duration::from_millis(250))
//!     .eviction(EvictionPolicy::EvictHidden)
//!     .build(host)?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::transport::DEFAULT_REQUEST_TIMEOUT;

// ============================================================================
// Constants
// ============================================================================

/// Default history capacity.
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// Default slide duration.
pub const DEFAULT_TRANSITION_DURATION: Duration = Duration::from_millis(300);

/// Default base for relative navigation URLs.
pub const DEFAULT_BASE_URL: &str = "http://localhost/";

/// Default selector for prerender hints.
pub const DEFAULT_PRERENDER_SELECTOR: &str = "link[rel=prerender]";

// ============================================================================
// EvictionPolicy
// ============================================================================

/// What happens to background frames when the browser is hidden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Keep every frame alive.
    #[default]
    Retain,
    /// Tear down every frame except the active one.
    EvictHidden,
}

// ============================================================================
// Visibility
// ============================================================================

/// Visibility of the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Host is on screen.
    #[default]
    Visible,
    /// Host is off screen.
    Hidden,
}

// ============================================================================
// BrowserConfig
// ============================================================================

/// Validated browser settings.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// History capacity (at least 1).
    pub max_history: usize,

    /// Slide duration. The very first navigation is never animated.
    pub transition_duration: Duration,

    /// Hidden-frame eviction policy.
    pub eviction: EvictionPolicy,

    /// Base for relative navigation URLs.
    pub base_url: Url,

    /// Timeout for every bridge call.
    pub request_timeout: Duration,

    /// Selector the prerender agent queries in the active frame.
    pub prerender_selector: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            transition_duration: DEFAULT_TRANSITION_DURATION,
            eviction: EvictionPolicy::default(),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            prerender_selector: DEFAULT_PRERENDER_SELECTOR.to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BrowserConfig::default();
        assert_eq!(config.max_history, 10);
        assert_eq!(config.transition_duration, Duration::from_millis(300));
        assert_eq!(config.eviction, EvictionPolicy::Retain);
        assert_eq!(config.base_url.as_str(), "http://localhost/");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.prerender_selector, "link[rel=prerender]");
    }

    #[test]
    fn test_visibility_default() {
        assert_eq!(Visibility::default(), Visibility::Visible);
    }
}
