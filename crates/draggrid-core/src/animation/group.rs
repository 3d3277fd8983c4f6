#![forbid(unsafe_code)]

//! Animation group: shared lifecycle management for many keyed animations.
//!
//! An [`AnimationGroup`] holds animations under caller-chosen keys, ticks
//! them together, and hands back the keys of members that finished. Each
//! member is wrapped in [`Callbacks`] so completion is observed exactly once.
//!
//! # Usage
//!
//! ```
//! use std::time::Duration;
//! use draggrid_core::animation::{AnimationGroup, MoveTween};
//! use draggrid_core::geometry::Rect;
//!
//! let ms = Duration::from_millis(100);
//! let mut group = AnimationGroup::new();
//! group.insert("a", MoveTween::new(Rect::new(0, 0, 4, 4), Rect::new(8, 0, 4, 4), ms));
//! group.insert("b", MoveTween::new(Rect::new(8, 0, 4, 4), Rect::new(8, 0, 4, 4), ms));
//!
//! group.tick(Duration::from_millis(10));
//! assert_eq!(group.drain_completed(), vec!["b"]);
//! group.tick(Duration::from_millis(100));
//! assert_eq!(group.drain_completed(), vec!["a"]);
//! assert!(group.is_empty());
//! ```
//!
//! # Invariants
//!
//! 1. Keys are unique; inserting an existing key replaces the member and
//!    restarts it.
//! 2. `drain_completed()` removes finished members and returns their keys in
//!    insertion order; a key is returned at most once per insertion.
//! 3. `overall_progress()` is the mean of all members' `value()`, 0.0 when
//!    empty.
//!
//! # Failure Modes
//!
//! - Unknown key in `get()`: returns `None`; in `remove()`: returns `false`.

use std::time::Duration;

use super::callbacks::{AnimationEvent, Callbacks};
use super::Animation;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

struct GroupMember<K, A> {
    key: K,
    animation: Callbacks<A>,
    finished: bool,
}

/// A collection of keyed animations with shared lifecycle control.
pub struct AnimationGroup<K, A> {
    members: Vec<GroupMember<K, A>>,
}

impl<K: std::fmt::Debug, A> std::fmt::Debug for AnimationGroup<K, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationGroup")
            .field("keys", &self.members.iter().map(|m| &m.key).collect::<Vec<_>>())
            .finish()
    }
}

impl<K, A> Default for AnimationGroup<K, A> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl<K: PartialEq + Clone, A: Animation> AnimationGroup<K, A> {
    /// Create an empty animation group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a keyed animation.
    ///
    /// If `key` already exists, the previous animation is replaced.
    pub fn insert(&mut self, key: K, animation: A) {
        let wrapped = Callbacks::new(animation).on_complete();
        if let Some(existing) = self.members.iter_mut().find(|m| m.key == key) {
            existing.animation = wrapped;
            existing.finished = false;
        } else {
            self.members.push(GroupMember {
                key,
                animation: wrapped,
                finished: false,
            });
        }
    }

    /// Remove a keyed animation without reporting it as completed.
    pub fn remove(&mut self, key: &K) -> bool {
        let before = self.members.len();
        self.members.retain(|m| &m.key != key);
        self.members.len() < before
    }

    /// Remove every member whose key matches `pred`. Returns how many were removed.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&K) -> bool) -> usize {
        let before = self.members.len();
        self.members.retain(|m| !pred(&m.key));
        before - self.members.len()
    }
}

// ---------------------------------------------------------------------------
// Lifecycle control
// ---------------------------------------------------------------------------

impl<K: PartialEq + Clone, A: Animation> AnimationGroup<K, A> {
    /// Advance every member by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        for member in &mut self.members {
            member.animation.tick(dt);
            if member
                .animation
                .drain_events()
                .contains(&AnimationEvent::Completed)
            {
                member.finished = true;
                crate::trace!("animation group member finished");
            }
        }
    }

    /// Remove finished members and return their keys in insertion order.
    pub fn drain_completed(&mut self) -> Vec<K> {
        let mut done = Vec::new();
        self.members.retain(|m| {
            if m.finished {
                done.push(m.key.clone());
                false
            } else {
                true
            }
        });
        done
    }

    /// Number of animations in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Average progress across all animations (0.0–1.0).
    #[must_use]
    pub fn overall_progress(&self) -> f32 {
        if self.members.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.members.iter().map(|m| m.animation.value()).sum();
        sum / self.members.len() as f32
    }

    /// Look up a member by key.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&A> {
        self.members
            .iter()
            .find(|m| &m.key == key)
            .map(|m| m.animation.inner())
    }

    /// Find the first member whose key matches `pred`.
    pub fn find(&self, mut pred: impl FnMut(&K) -> bool) -> Option<(&K, &A)> {
        self.members
            .iter()
            .find(|m| pred(&m.key))
            .map(|m| (&m.key, m.animation.inner()))
    }

    /// Iterate over `(key, animation)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &A)> {
        self.members.iter().map(|m| (&m.key, m.animation.inner()))
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

    fn slide(dx: i32, ms: u64) -> MoveTween {
        MoveTween::new(
            Rect::new(0, 0, 4, 4),
            Rect::new(dx, 0, 4, 4),
            Duration::from_millis(ms),
        )
    }

    #[test]
    fn empty_group() {
        let mut group: AnimationGroup<u32, MoveTween> = AnimationGroup::new();
        assert!(group.is_empty());
        assert_eq!(group.overall_progress(), 0.0);
        group.tick(MS_100);
        assert!(group.drain_completed().is_empty());
    }

    #[test]
    fn completed_keys_drain_in_insertion_order() {
        let mut group = AnimationGroup::new();
        group.insert(1, slide(10, 100));
        group.insert(2, slide(10, 50));
        group.insert(3, slide(10, 50));

        group.tick(MS_50);
        assert_eq!(group.drain_completed(), vec![2, 3]);
        assert_eq!(group.len(), 1);

        group.tick(MS_50);
        assert_eq!(group.drain_completed(), vec![1]);
        assert!(group.is_empty());
    }

    #[test]
    fn completion_reported_once() {
        let mut group = AnimationGroup::new();
        group.insert("x", slide(10, 50));
        group.tick(MS_100);
        assert_eq!(group.drain_completed(), vec!["x"]);
        group.tick(MS_100);
        assert!(group.drain_completed().is_empty());
    }

    #[test]
    fn insert_existing_key_replaces_and_restarts() {
        let mut group = AnimationGroup::new();
        group.insert("x", slide(10, 100));
        group.tick(MS_50);
        group.insert("x", slide(20, 100));
        assert_eq!(group.len(), 1);
        assert_eq!(group.get(&"x").map(|t| t.to().x), Some(20));
        group.tick(MS_50);
        assert!(group.drain_completed().is_empty());
    }

    #[test]
    fn remove_does_not_report_completion() {
        let mut group = AnimationGroup::new();
        group.insert(7, slide(10, 50));
        assert!(group.remove(&7));
        assert!(!group.remove(&7));
        group.tick(MS_100);
        assert!(group.drain_completed().is_empty());
    }

    #[test]
    fn remove_where_filters_by_key() {
        let mut group = AnimationGroup::new();
        group.insert((1, 'a'), slide(10, 50));
        group.insert((1, 'b'), slide(10, 50));
        group.insert((2, 'a'), slide(10, 50));
        assert_eq!(group.remove_where(|k| k.1 == 'a'), 2);
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn overall_progress_is_mean() {
        let mut group = AnimationGroup::new();
        group.insert(1, slide(10, 100).easing(crate::animation::linear));
        group.insert(2, slide(10, 50).easing(crate::animation::linear));
        group.tick(MS_50);
        assert!((group.overall_progress() - 0.75).abs() < 0.01);
    }

    #[test]
    fn find_and_iter() {
        let mut group = AnimationGroup::new();
        group.insert(1u8, slide(10, 50));
        group.insert(2u8, slide(30, 50));
        assert_eq!(group.find(|k| *k == 2).map(|(_, a)| a.to().x), Some(30));
        assert_eq!(group.iter().count(), 2);
    }
}
