//! Error types for the frame shell.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use frame_shell::{Browser, Result};
//!
//! async fn example(browser: &Browser) -> Result<()> {
//!     browser.navigate("https://example.com/inbox").await?;
//!     let title = browser.get_title().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Navigation | [`Error::InvalidUrl`], [`Error::FrameCreation`] |
//! | Bridge | [`Error::Bridge`], [`Error::Protocol`], [`Error::ConnectionClosed`], [`Error::RequestTimeout`] |
//! | External | [`Error::Json`], [`Error::ChannelClosed`] |
//!
//! Navigations that are ignored (empty URL, already active, history edge)
//! are not errors; they are reported through
//! [`NavigationOutcome::Skipped`](crate::browser::NavigationOutcome::Skipped).

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned by [`BrowserBuilder::build`](crate::BrowserBuilder::build)
    /// when a setting is out of range.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Navigation Errors
    // ========================================================================
    /// URL could not be parsed or resolved against the base URL.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The offending URL, as given.
        url: String,
        /// Parser message.
        message: String,
    },

    /// The embedded browsing context failed to initialize.
    #[error("Failed to create frame for {url}: {message}")]
    FrameCreation {
        /// URL the frame was created for.
        url: String,
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // Bridge Errors
    // ========================================================================
    /// The frame answered a remote call with an error response.
    #[error("Bridge call '{method}' failed: {message}")]
    Bridge {
        /// Remote method name.
        method: String,
        /// Error message reported by the frame.
        message: String,
    },

    /// Protocol violation or unexpected response shape.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// Bridge connection closed.
    ///
    /// Returned for calls issued after shutdown and for calls still pending
    /// when the connection closes.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Remote call timeout.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid URL error.
    #[inline]
    pub fn invalid_url(url: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Creates a frame creation error.
    #[inline]
    pub fn frame_creation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FrameCreation {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a bridge call error.
    #[inline]
    pub fn bridge(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Bridge {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestTimeout { .. })
    }

    /// Returns `true` if a remote call into a frame failed.
    #[inline]
    #[must_use]
    pub fn is_bridge_error(&self) -> bool {
        matches!(
            self,
            Self::Bridge { .. }
                | Self::Protocol { .. }
                | Self::ConnectionClosed
                | Self::RequestTimeout { .. }
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed on retry.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::RequestTimeout { .. } | Self::FrameCreation { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
