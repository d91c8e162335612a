//! Directional slide transitions.
//!
//! Frames sit in one of three logical slots along the horizontal axis:
//! `-1` (previous), `0` (visible) and `+1` (next). A slot maps to a lateral
//! offset of `slot * 100%`, mirrored in right-to-left layouts.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, trace};

use super::host::Surface;

// ============================================================================
// Constants
// ============================================================================

/// Extra time granted to a surface past the transition duration before the
/// transition is considered finished anyway.
pub const TRANSITION_GRACE: Duration = Duration::from_millis(100);

// ============================================================================
// Direction
// ============================================================================

/// Navigation direction.
///
/// The incoming frame enters from the side the direction points to; for
/// [`Direction::Next`] it slides in from the right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Forward slide (`+1`).
    #[default]
    Next,
    /// Backward slide (`-1`).
    Prev,
}

impl Direction {
    /// `+1` for `Next`, `-1` for `Prev`.
    #[inline]
    #[must_use]
    pub fn sign(self) -> i8 {
        match self {
            Self::Next => 1,
            Self::Prev => -1,
        }
    }

    /// The opposite direction.
    #[inline]
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Self::Next => Self::Prev,
            Self::Prev => Self::Next,
        }
    }

    /// Reads a link `rel`: `prev` goes back, anything else forward.
    #[must_use]
    pub fn from_rel(rel: Option<&str>) -> Self {
        match rel {
            Some(rel) if rel.eq_ignore_ascii_case("prev") => Self::Prev,
            _ => Self::Next,
        }
    }
}

// ============================================================================
// Position
// ============================================================================

/// Logical slot of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Off screen on the "previous" side.
    Prev,
    /// On screen.
    Center,
    /// Off screen on the "next" side.
    Next,
}

impl Position {
    /// Logical value: `-1`, `0` or `+1`.
    #[inline]
    #[must_use]
    pub fn logical(self) -> i8 {
        match self {
            Self::Prev => -1,
            Self::Center => 0,
            Self::Next => 1,
        }
    }

    /// Lateral offset in percent for the given layout direction.
    #[inline]
    #[must_use]
    pub fn offset_percent(self, rtl: bool) -> i32 {
        i32::from(logical_to_physical(self.logical(), rtl)) * 100
    }
}

impl From<Direction> for Position {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Next => Self::Next,
            Direction::Prev => Self::Prev,
        }
    }
}

/// Mirrors a logical slot in right-to-left layouts.
#[inline]
#[must_use]
pub fn logical_to_physical(position: i8, rtl: bool) -> i8 {
    if rtl { -position } else { position }
}

// ============================================================================
// Animator
// ============================================================================

/// Moves frame surfaces between slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct Animator {
    rtl: bool,
}

impl Animator {
    /// Creates an animator for the given layout direction.
    #[inline]
    #[must_use]
    pub fn new(rtl: bool) -> Self {
        Self { rtl }
    }

    /// Places a surface in a slot without animating.
    pub fn position(&self, surface: &dyn Surface, position: Position) {
        surface.set_transition_duration(Duration::ZERO);
        surface.set_offset(position.offset_percent(self.rtl));
    }

    /// Slides a surface from one slot to another.
    ///
    /// The surface jumps to `from` instantly, layout is flushed, then it
    /// moves to `to` over `duration`. Completes when the surface reports the
    /// end of the move, or after `duration` plus [`TRANSITION_GRACE`] if it
    /// never does. Completes at once when there is no surface or the
    /// duration is zero.
    pub async fn transition(
        &self,
        surface: Option<&dyn Surface>,
        from: Position,
        to: Position,
        duration: Duration,
    ) {
        let Some(surface) = surface else {
            return;
        };

        trace!(?from, ?to, ?duration, "Transition");

        self.position(surface, from);
        surface.flush_layout();

        if from == to {
            return;
        }

        surface.set_transition_duration(duration);
        if duration.is_zero() {
            surface.set_offset(to.offset_percent(self.rtl));
            return;
        }

        let done = surface.transition_end();
        surface.set_offset(to.offset_percent(self.rtl));
        if timeout(duration + TRANSITION_GRACE, done).await.is_err() {
            debug!(?to, ?duration, "Transition end not reported, moving on");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
