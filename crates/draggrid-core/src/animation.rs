#![forbid(unsafe_code)]

//! Composable animation primitives.
//!
//! Time-based animations that produce normalized `f32` values (0.0–1.0).
//! The grid only needs one concrete animation, [`MoveTween`], which slides a
//! cell rectangle from one grid slot to another; [`callbacks`] turns its
//! completion into an event and [`group`] ticks many of them together.

pub mod callbacks;
pub mod group;

use std::time::Duration;

use crate::geometry::Rect;

pub use callbacks::{AnimationEvent, Callbacks};
pub use group::AnimationGroup;

/// Default duration of a single cell move (100 ms).
pub const DEFAULT_MOVE_DURATION: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f32) -> f32;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-in (slow start).
#[inline]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

// ---------------------------------------------------------------------------
// Animation trait
// ---------------------------------------------------------------------------

/// A time-based animation producing values in [0.0, 1.0].
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current output value, clamped to [0.0, 1.0].
    fn value(&self) -> f32;

    /// Reset the animation to its initial state.
    fn reset(&mut self);

    /// Time elapsed past completion.
    /// Returns [`Duration::ZERO`] for animations that never complete.
    fn overshoot(&self) -> Duration {
        Duration::ZERO
    }
}

impl<A: Animation + ?Sized> Animation for Box<A> {
    fn tick(&mut self, dt: Duration) {
        (**self).tick(dt);
    }

    fn is_complete(&self) -> bool {
        (**self).is_complete()
    }

    fn value(&self) -> f32 {
        (**self).value()
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn overshoot(&self) -> Duration {
        (**self).overshoot()
    }
}

// ---------------------------------------------------------------------------
// MoveTween
// ---------------------------------------------------------------------------

/// Slides a rectangle from one cell to another over a duration.
///
/// [`Animation::value`] returns the eased progress; [`MoveTween::current`]
/// gives the interpolated rectangle. A move whose endpoints coincide, or
/// whose duration is zero, is complete after its first `tick`, even a tick
/// of [`Duration::ZERO`], so completion is always reported.
#[derive(Debug, Clone, Copy)]
pub struct MoveTween {
    from: Rect,
    to: Rect,
    elapsed: Duration,
    duration: Duration,
    ticked: bool,
    easing: EasingFn,
}

impl MoveTween {
    /// Create a tween from `from` to `to` over `duration`.
    pub fn new(from: Rect, to: Rect, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
            ticked: false,
            easing: ease_out,
        }
    }

    /// Set the easing function (builder).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Starting rectangle.
    pub fn from(&self) -> Rect {
        self.from
    }

    /// Target rectangle.
    pub fn to(&self) -> Rect {
        self.to
    }

    /// Whether the move covers no distance.
    pub fn is_degenerate(&self) -> bool {
        self.from.origin() == self.to.origin() || self.duration.is_zero()
    }

    fn progress(&self) -> f32 {
        if self.is_degenerate() {
            return if self.ticked { 1.0 } else { 0.0 };
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (t as f32).clamp(0.0, 1.0)
    }

    /// Interpolated rectangle at the current progress.
    pub fn current(&self) -> Rect {
        let t = f64::from((self.easing)(self.progress()));
        let lerp = |a: i32, b: i32| -> i32 {
            let pos = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
            pos.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
        };
        self.from
            .with_origin(lerp(self.from.x, self.to.x), lerp(self.from.y, self.to.y))
    }

    /// Translation from the starting cell, for hosts that animate by offset.
    pub fn translation(&self) -> (i32, i32) {
        self.from.offset_to(&self.current())
    }
}

impl Animation for MoveTween {
    fn tick(&mut self, dt: Duration) {
        self.ticked = true;
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        if self.is_degenerate() {
            return self.ticked;
        }
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        (self.easing)(self.progress())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.ticked = false;
    }

    fn overshoot(&self) -> Duration {
        self.elapsed.saturating_sub(self.duration)
    }
}
