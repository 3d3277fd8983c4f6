#![forbid(unsafe_code)]

//! Animation runners: where planned moves get animated.
//!
//! The reorder engine never animates anything itself. It hands each move to
//! an [`AnimationRunner`] together with a [`MoveTicket`], and the runner
//! returns the ticket from [`drain_completed`](AnimationRunner::drain_completed)
//! once the move finished. Hosts with their own animation system implement
//! the trait; two stock runners are provided.
//!
//! | Runner | Completion | Use |
//! |--------|------------|-----|
//! | [`TweenRunner`] | After the tween's duration has been ticked | Interactive hosts |
//! | [`InstantRunner`] | On the next drain | Headless hosts, tests |
//!
//! # Invariants
//!
//! 1. Every ticket passed to `animate_move` is returned by `drain_completed`
//!    exactly once, unless it was cancelled first.
//! 2. A cancelled ticket is never returned.

use std::time::Duration;

use draggrid_core::animation::{
    AnimationGroup, DEFAULT_MOVE_DURATION, EasingFn, MoveTween, ease_out,
};
use draggrid_core::geometry::Rect;

use crate::registry::ItemId;
use crate::reorder::MoveTicket;

/// Animates item moves and reports their completion.
pub trait AnimationRunner {
    /// Start sliding `ticket.item` from `from` to `to`.
    fn animate_move(&mut self, ticket: MoveTicket, from: Rect, to: Rect);

    /// Advance time.
    fn tick(&mut self, _dt: Duration) {}

    /// Tickets of moves that finished since the last call.
    fn drain_completed(&mut self) -> Vec<MoveTicket>;

    /// Stop every move of `item` without reporting it.
    fn cancel(&mut self, item: ItemId);

    /// Where `item` is drawn right now, if it is mid-move.
    fn current_rect(&self, _item: ItemId) -> Option<Rect> {
        None
    }

    /// Number of moves still running.
    fn active(&self) -> usize;
}

impl<R: AnimationRunner + ?Sized> AnimationRunner for Box<R> {
    fn animate_move(&mut self, ticket: MoveTicket, from: Rect, to: Rect) {
        (**self).animate_move(ticket, from, to);
    }

    fn tick(&mut self, dt: Duration) {
        (**self).tick(dt);
    }

    fn drain_completed(&mut self) -> Vec<MoveTicket> {
        (**self).drain_completed()
    }

    fn cancel(&mut self, item: ItemId) {
        (**self).cancel(item);
    }

    fn current_rect(&self, item: ItemId) -> Option<Rect> {
        (**self).current_rect(item)
    }

    fn active(&self) -> usize {
        (**self).active()
    }
}

// ---------------------------------------------------------------------------
// TweenRunner
// ---------------------------------------------------------------------------

/// Tweens every move over a fixed duration.
#[derive(Debug)]
pub struct TweenRunner {
    duration: Duration,
    easing: EasingFn,
    moves: AnimationGroup<MoveTicket, MoveTween>,
}

impl Default for TweenRunner {
    fn default() -> Self {
        Self::new(DEFAULT_MOVE_DURATION)
    }
}

impl TweenRunner {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            easing: ease_out,
            moves: AnimationGroup::new(),
        }
    }

    /// Set the easing applied to new moves (builder).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Change the duration of moves started from now on.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Mean progress of the running moves.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.moves.overall_progress()
    }

    /// The running tween for `item`.
    pub fn tween_of(&self, item: ItemId) -> Option<&MoveTween> {
        self.moves.find(|t| t.item == item).map(|(_, tween)| tween)
    }
}

impl AnimationRunner for TweenRunner {
    fn animate_move(&mut self, ticket: MoveTicket, from: Rect, to: Rect) {
        let tween = MoveTween::new(from, to, self.duration).easing(self.easing);
        self.moves.insert(ticket, tween);
    }

    fn tick(&mut self, dt: Duration) {
        self.moves.tick(dt);
    }

    fn drain_completed(&mut self) -> Vec<MoveTicket> {
        self.moves.drain_completed()
    }

    fn cancel(&mut self, item: ItemId) {
        self.moves.remove_where(|t| t.item == item);
    }

    fn current_rect(&self, item: ItemId) -> Option<Rect> {
        self.tween_of(item).map(MoveTween::current)
    }

    fn active(&self) -> usize {
        self.moves.len()
    }
}

// ---------------------------------------------------------------------------
// InstantRunner
// ---------------------------------------------------------------------------

/// A move handed to an [`InstantRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartedMove {
    pub ticket: MoveTicket,
    pub from: Rect,
    pub to: Rect,
}

/// Completes every move on the next drain and remembers what it was asked
/// to animate.
#[derive(Debug, Default)]
pub struct InstantRunner {
    started: Vec<StartedMove>,
    queued: Vec<MoveTicket>,
}

impl InstantRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every move started so far, oldest first.
    pub fn started(&self) -> &[StartedMove] {
        &self.started
    }

    pub fn clear_started(&mut self) {
        self.started.clear();
    }
}

impl AnimationRunner for InstantRunner {
    fn animate_move(&mut self, ticket: MoveTicket, from: Rect, to: Rect) {
        self.started.push(StartedMove { ticket, from, to });
        self.queued.push(ticket);
    }

    fn drain_completed(&mut self) -> Vec<MoveTicket> {
        std::mem::take(&mut self.queued)
    }

    fn cancel(&mut self, item: ItemId) {
        self.queued.retain(|t| t.item != item);
    }

    fn active(&self) -> usize {
        self.queued.len()
    }
}
