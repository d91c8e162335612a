//! Builder pattern for browser configuration.
//!
//! Provides a fluent API for configuring and creating [`Browser`] instances.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use url::Url;

use crate::error::{Error, Result};

use super::core::Browser;
use super::host::FrameHost;
use super::options::{BrowserConfig, EvictionPolicy, Visibility};

// ============================================================================
// BrowserBuilder
// ============================================================================

/// Builder for configuring a [`Browser`] instance.
///
/// Use [`Browser::builder()`] to create a new builder.
#[derive(Debug, Default)]
pub struct BrowserBuilder {
    /// Settings collected so far.
    config: BrowserConfig,
    /// Requested base URL, parsed in `build`.
    base_url: Option<String>,
    /// Visibility subscription.
    visibility: Option<watch::Receiver<Visibility>>,
}

// ============================================================================
// BrowserBuilder Implementation
// ============================================================================

impl BrowserBuilder {
    /// Creates a new builder with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the history capacity.
    #[inline]
    #[must_use]
    pub fn max_history(mut self, max_history: usize) -> Self {
        self.config.max_history = max_history;
        self
    }

    /// Sets the slide duration.
    #[inline]
    #[must_use]
    pub fn transition_duration(mut self, duration: Duration) -> Self {
        self.config.transition_duration = duration;
        self
    }

    /// Sets the hidden-frame eviction policy.
    #[inline]
    #[must_use]
    pub fn eviction(mut self, policy: EvictionPolicy) -> Self {
        self.config.eviction = policy;
        self
    }

    /// Sets the base relative URLs are resolved against.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL (e.g., "app://mail.gaiamobile.org/")
    #[inline]
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the timeout applied to every bridge call.
    #[inline]
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Sets the selector used to find prerender hints.
    #[inline]
    #[must_use]
    pub fn prerender_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.prerender_selector = selector.into();
        self
    }

    /// Subscribes the browser to host visibility changes.
    ///
    /// The subscription lives as long as the browser.
    #[inline]
    #[must_use]
    pub fn visibility(mut self, receiver: watch::Receiver<Visibility>) -> Self {
        self.visibility = Some(receiver);
        self
    }

    /// Builds the browser with validation.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if `max_history` is zero
    /// - [`Error::Config`] if the base URL is not absolute or cannot be a base
    pub fn build(self, host: Arc<dyn FrameHost>) -> Result<Browser> {
        let config = self.validate()?;
        Ok(Browser::new(config, host, self.visibility))
    }

    fn validate(&self) -> Result<BrowserConfig> {
        let mut config = self.config.clone();

        if config.max_history == 0 {
            return Err(Error::config("max_history must be at least 1"));
        }

        if let Some(ref raw) = self.base_url {
            let url = Url::parse(raw)
                .map_err(|e| Error::config(format!("Invalid base URL '{raw}': {e}")))?;
            if url.cannot_be_a_base() {
                return Err(Error::config(format!("Base URL cannot be a base: {raw}")));
            }
            config.base_url = url;
        }

        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================
