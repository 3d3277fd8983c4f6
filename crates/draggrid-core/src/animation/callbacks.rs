#![forbid(unsafe_code)]

//! Animation callbacks: completion events for a wrapped animation.
//!
//! [`Callbacks`] wraps any [`Animation`] and records a completion event
//! that is polled via [`drain_events`](Callbacks::drain_events).
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use draggrid_core::animation::{Animation, AnimationEvent, Callbacks, MoveTween};
//! use draggrid_core::geometry::Rect;
//!
//! let tween = MoveTween::new(
//!     Rect::new(0, 0, 8, 8),
//!     Rect::new(32, 0, 8, 8),
//!     Duration::from_millis(100),
//! );
//! let mut anim = Callbacks::new(tween).on_complete();
//!
//! anim.tick(Duration::from_millis(120));
//! assert_eq!(anim.drain_events(), vec![AnimationEvent::Completed]);
//! ```
//!
//! # Design
//!
//! Events are collected into an internal queue during `tick()` and drained
//! by the caller instead of invoking closures. The grid's completion
//! protocol is built on this: a runner drains `Completed` and hands the
//! move's ticket back to the reorder engine.
//!
//! # Invariants
//!
//! 1. `Completed` fires exactly once per play-through, on the tick where
//!    `is_complete()` first becomes true.
//! 2. `drain_events()` clears the queue; events are not replayed.
//! 3. `reset()` resets all tracking state so events can fire again.

use std::time::Duration;

use super::Animation;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An event emitted by a [`Callbacks`]-wrapped animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEvent {
    /// The animation completed.
    Completed,
}

/// Which events to record.
#[derive(Debug, Clone, Copy, Default)]
struct EventConfig {
    on_complete: bool,
}

/// Tracking state for fired events.
#[derive(Debug, Clone, Copy, Default)]
struct EventState {
    completed_fired: bool,
}

/// An animation wrapper that emits events at milestones.
pub struct Callbacks<A> {
    inner: A,
    config: EventConfig,
    state: EventState,
    events: Vec<AnimationEvent>,
}

impl<A: std::fmt::Debug> std::fmt::Debug for Callbacks<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callbacks")
            .field("inner", &self.inner)
            .field("pending_events", &self.events.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl<A: Animation> Callbacks<A> {
    /// Wrap an animation with callback tracking.
    #[must_use]
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            config: EventConfig::default(),
            state: EventState::default(),
            events: Vec::new(),
        }
    }

    /// Enable the `Completed` event (builder pattern).
    #[must_use]
    pub fn on_complete(mut self) -> Self {
        self.config.on_complete = true;
        self
    }

    /// Access the inner animation.
    #[must_use]
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Drain all pending events. Clears the event queue.
    pub fn drain_events(&mut self) -> Vec<AnimationEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether a `Completed` event has been emitted this play-through.
    #[must_use]
    pub fn completion_reported(&self) -> bool {
        self.state.completed_fired
    }

    fn check_events(&mut self) {
        if self.config.on_complete && !self.state.completed_fired && self.inner.is_complete() {
            self.state.completed_fired = true;
            self.events.push(AnimationEvent::Completed);
        }
    }
}

// ---------------------------------------------------------------------------
// Animation trait implementation
// ---------------------------------------------------------------------------

impl<A: Animation> Animation for Callbacks<A> {
    fn tick(&mut self, dt: Duration) {
        self.inner.tick(dt);
        self.check_events();
    }

    fn is_complete(&self) -> bool {
        self.inner.is_complete()
    }

    fn value(&self) -> f32 {
        self.inner.value()
    }

    fn reset(&mut self) {
        self.inner.reset();
        self.state = EventState::default();
        self.events.clear();
    }

    fn overshoot(&self) -> Duration {
        self.inner.overshoot()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::MoveTween;
    use crate::geometry::Rect;

    const MS_50: Duration = Duration::from_millis(50);
    const MS_100: Duration = Duration::from_millis(100);

    fn tween() -> MoveTween {
        MoveTween::new(Rect::new(0, 0, 4, 4), Rect::new(40, 0, 4, 4), MS_100)
    }

    #[test]
    fn no_events_configured() {
        let mut anim = Callbacks::new(tween());
        anim.tick(MS_100);
        assert!(anim.drain_events().is_empty());
    }

    #[test]
    fn completed_fires_once() {
        let mut anim = Callbacks::new(tween()).on_complete();
        anim.tick(MS_50);
        assert!(anim.drain_events().is_empty());
        assert!(!anim.completion_reported());

        anim.tick(MS_100);
        assert_eq!(anim.drain_events(), vec![AnimationEvent::Completed]);
        assert!(anim.completion_reported());

        anim.tick(MS_100);
        assert!(anim.drain_events().is_empty());
    }

    #[test]
    fn complete_in_one_long_tick() {
        let mut anim = Callbacks::new(tween()).on_complete();
        anim.tick(Duration::from_millis(250));
        assert_eq!(anim.drain_events(), vec![AnimationEvent::Completed]);
        assert!(anim.inner().is_complete());
    }

    #[test]
    fn degenerate_move_still_completes() {
        let r = Rect::new(3, 3, 4, 4);
        let mut anim = Callbacks::new(MoveTween::new(r, r, MS_100)).on_complete();
        anim.tick(Duration::ZERO);
        assert_eq!(anim.drain_events(), vec![AnimationEvent::Completed]);
    }

    #[test]
    fn reset_allows_events_to_fire_again() {
        let mut anim = Callbacks::new(tween()).on_complete();
        anim.tick(MS_100);
        let _ = anim.drain_events();

        anim.reset();
        assert!(!anim.completion_reported());
        anim.tick(MS_100);
        assert_eq!(anim.drain_events(), vec![AnimationEvent::Completed]);
    }

    #[test]
    fn debug_format() {
        let anim = Callbacks::new(tween()).on_complete();
        let dbg = format!("{anim:?}");
        assert!(dbg.contains("Callbacks"));
        assert!(dbg.contains("pending_events"));
    }
}
