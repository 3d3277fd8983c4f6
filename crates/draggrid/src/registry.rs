#![forbid(unsafe_code)]

//! Item registry: the set of grid items and their order values.
//!
//! Items are supplied by the host and referenced by [`ItemId`]; the registry
//! owns the order→item mapping. Entries are kept in insertion (child index)
//! order, and the *order* view is derived by sorting.
//!
//! # Invariants
//!
//! 1. Outside a reorder commit, orders form the contiguous permutation
//!    `0..len()`.
//! 2. [`ItemRegistry::compact`] is rank-preserving: it only closes gaps and
//!    never changes the relative order of two items.
//! 3. [`ItemRegistry::commit`] writes a whole batch of changes in one call;
//!    no reader observes a half-applied batch.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Fallback |
//! |---------|-------|----------|
//! | Duplicate id | Host registers the same item twice | [`RegistryError::DuplicateItem`] |
//! | Unknown id in `remove` / `order_of` | Item never registered or already removed | `false` / `None` |

use std::fmt;

use bitflags::bitflags;
use tracing::trace;

use crate::error::RegistryError;

/// Opaque identity of a grid item, chosen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

bitflags! {
    /// Per-item drag wiring and affordance state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ItemFlags: u8 {
        /// Long-press listener attached: the item may start a drag.
        const DRAG_SOURCE = 0b0001;
        /// Drag listener attached: the item reacts to drag-enter.
        const DROP_TARGET = 0b0010;
        /// Lifted affordance (reduced opacity) applied.
        const LIFTED = 0b0100;
        /// Both listeners.
        const LISTENERS = Self::DRAG_SOURCE.bits() | Self::DROP_TARGET.bits();
    }
}

/// A registered item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEntry {
    id: ItemId,
    order: usize,
    flags: ItemFlags,
}

impl ItemEntry {
    #[inline]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline]
    pub fn flags(&self) -> ItemFlags {
        self.flags
    }
}

/// One relabeling inside a committed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderChange {
    pub item: ItemId,
    pub from: usize,
    pub to: usize,
}

/// Holds the grid's items and their order values.
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    entries: Vec<ItemEntry>,
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

impl ItemRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` at the end of the grid. Returns the order it was given.
    pub fn insert(&mut self, id: ItemId, flags: ItemFlags) -> Result<usize, RegistryError> {
        if self.contains(id) {
            return Err(RegistryError::DuplicateItem(id));
        }
        let order = self.next_order();
        self.entries.push(ItemEntry { id, order, flags });
        Ok(order)
    }

    /// Unregister `id` and compact. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: ItemId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() < before;
        if removed {
            self.compact();
        }
        removed
    }

    /// Unregister every id in `ids`, compacting once. Returns how many were removed.
    pub fn remove_many(&mut self, ids: &[ItemId]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !ids.contains(&e.id));
        let removed = before - self.entries.len();
        if removed > 0 {
            self.compact();
        }
        removed
    }

    /// Unregister everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Entries in insertion (child index) order.
    pub fn children(&self) -> impl Iterator<Item = &ItemEntry> {
        self.entries.iter()
    }
}

// ---------------------------------------------------------------------------
// Order view
// ---------------------------------------------------------------------------

impl ItemRegistry {
    /// Order for the next added item: `0` if empty, else `max(order) + 1`.
    #[must_use]
    pub fn next_order(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.order)
            .max()
            .map_or(0, |max| max + 1)
    }

    /// The item holding `order`, found by scanning.
    #[must_use]
    pub fn item_at(&self, order: usize) -> Option<ItemId> {
        self.entries.iter().find(|e| e.order == order).map(|e| e.id)
    }

    #[must_use]
    pub fn order_of(&self, id: ItemId) -> Option<usize> {
        self.entry(id).map(|e| e.order)
    }

    /// Items sorted ascending by order; ties keep insertion order.
    #[must_use]
    pub fn items_by_order(&self) -> Vec<ItemId> {
        self.sorted_entries().into_iter().map(|e| e.id).collect()
    }

    /// Re-label every item with its rank in ascending order.
    pub fn compact(&mut self) {
        let ranked: Vec<ItemId> = self.items_by_order();
        for (rank, id) in ranked.into_iter().enumerate() {
            if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
                entry.order = rank;
            }
        }
    }

    /// Write a batch of new orders.
    ///
    /// Changes naming unknown items are skipped.
    pub fn commit(&mut self, changes: &[OrderChange]) {
        for change in changes {
            if let Some(entry) = self.entries.iter_mut().find(|e| e.id == change.item) {
                trace!(
                    item = %change.item,
                    from = change.from,
                    to = change.to,
                    "commit order"
                );
                entry.order = change.to;
            }
        }
    }

    /// Whether orders are exactly `0..len()`, each used once.
    #[must_use]
    pub fn is_permutation(&self) -> bool {
        let mut seen = vec![false; self.entries.len()];
        for entry in &self.entries {
            match seen.get_mut(entry.order) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }

    fn sorted_entries(&self) -> Vec<&ItemEntry> {
        let mut sorted: Vec<&ItemEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|e| e.order);
        sorted
    }

    fn entry(&self, id: ItemId) -> Option<&ItemEntry> {
        self.entries.iter().find(|e| e.id == id)
    }
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

impl ItemRegistry {
    #[must_use]
    pub fn flags(&self, id: ItemId) -> Option<ItemFlags> {
        self.entry(id).map(|e| e.flags)
    }

    /// Set or clear `flags` on one item. Returns `false` if `id` is unknown.
    pub fn set_flags(&mut self, id: ItemId, flags: ItemFlags, on: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.flags.set(flags, on);
                true
            }
            None => false,
        }
    }

    /// Attach or detach both drag listeners on every item. Orders are untouched.
    pub fn set_listeners(&mut self, enabled: bool) {
        for entry in &mut self.entries {
            entry.flags.set(ItemFlags::LISTENERS, enabled);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
