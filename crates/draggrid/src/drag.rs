#![forbid(unsafe_code)]

//! Drag session state and visual feedback.
//!
//! The host's drag-and-drop system reports pointer events; the grid turns
//! them into transitions of [`DragSessionState`] and queues
//! [`DragFeedback`] for the host to render.
//!
//! ```text
//!            begin(source)                 end()
//!   Idle ────────────────────► Dragging ───────────► Idle
//!                               │    ▲
//!                  enter(target)│    │ last_target = target
//!                               └────┘
//! ```
//!
//! # Invariants
//!
//! 1. At most one session is active; `begin` while dragging is refused.
//! 2. `last_target` is never the session's own source.
//! 3. Forgetting the source ends the session; forgetting the last target
//!    only clears it.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Fallback |
//! |---------|-------|----------|
//! | Enter with no session | Event delivered after drag end | Ignored |
//! | Source removed mid-drag | Host removed the lifted item | Session ends without feedback |

use crate::registry::ItemId;

// ---------------------------------------------------------------------------
// DragSessionState
// ---------------------------------------------------------------------------

/// Where the current drag stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragSessionState {
    #[default]
    Idle,
    Dragging {
        /// The lifted item.
        source: ItemId,
        /// The most recent item the pointer entered, other than the source.
        last_target: Option<ItemId>,
    },
}

impl DragSessionState {
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    #[must_use]
    pub fn source(&self) -> Option<ItemId> {
        match self {
            Self::Dragging { source, .. } => Some(*source),
            Self::Idle => None,
        }
    }

    #[must_use]
    pub fn last_target(&self) -> Option<ItemId> {
        match self {
            Self::Dragging { last_target, .. } => *last_target,
            Self::Idle => None,
        }
    }

    /// Start dragging `source`. Returns `false` if a drag is already active.
    pub fn begin(&mut self, source: ItemId) -> bool {
        if self.is_dragging() {
            return false;
        }
        *self = Self::Dragging {
            source,
            last_target: None,
        };
        true
    }

    /// The pointer entered `target`. Returns the active source when a
    /// reorder toward `target` should be requested.
    pub fn enter(&mut self, target: ItemId) -> Option<ItemId> {
        match self {
            Self::Dragging {
                source,
                last_target,
            } if *source != target => {
                *last_target = Some(target);
                Some(*source)
            }
            _ => None,
        }
    }

    /// End the session, returning its source.
    pub fn end(&mut self) -> Option<ItemId> {
        let source = self.source();
        *self = Self::Idle;
        source
    }

    /// Drop any reference to a removed item. Returns `true` if this ended
    /// the session.
    pub fn forget(&mut self, item: ItemId) -> bool {
        match self {
            Self::Dragging { source, .. } if *source == item => {
                *self = Self::Idle;
                true
            }
            Self::Dragging { last_target, .. } => {
                if *last_target == Some(item) {
                    *last_target = None;
                }
                false
            }
            Self::Idle => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// Highlight phases a drop target goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Highlight {
    /// A drag started somewhere in the grid.
    DragStarted,
    /// The pointer is over this item.
    Entered,
    /// The pointer left this item.
    Exited,
    /// The item was dropped on.
    Dropped,
    /// The drag ended.
    Ended,
}

impl Highlight {
    /// Default ARGB colour for the phase.
    #[must_use]
    pub const fn default_argb(self) -> u32 {
        match self {
            Self::DragStarted => 0xFF00_00FF,
            Self::Entered => 0xFF00_FF00,
            Self::Exited => 0xFFFF_FF00,
            Self::Dropped | Self::Ended => 0xFFCC_CCCC,
        }
    }
}

/// Visual change the host should apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragFeedback {
    /// The dragged item was lifted; draw it at `opacity`.
    Lifted { item: ItemId, opacity: f32 },
    /// Draw `item` fully opaque again.
    Restored { item: ItemId },
    /// Recolour `item`'s background.
    Highlight { item: ItemId, highlight: Highlight },
}

impl DragFeedback {
    /// The item this feedback applies to.
    #[must_use]
    pub fn item(&self) -> ItemId {
        match self {
            Self::Lifted { item, .. } | Self::Restored { item } | Self::Highlight { item, .. } => {
                *item
            }
        }
    }
}
