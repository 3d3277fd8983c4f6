#![forbid(unsafe_code)]

//! The host-facing grid.
//!
//! [`DragGrid`] owns the item registry, the reorder engine, the drag
//! session, an animation runner, and a geometry provider. The host forwards
//! its drag-and-drop events, ticks time, renders [`layout`](DragGrid::layout)
//! and applies whatever [`drain_feedback`](DragGrid::drain_feedback) returns.
//!
//! ```
//! use std::time::Duration;
//! use draggrid::{DragGrid, GridConfig, InstantRunner, ItemId};
//! use draggrid_core::geometry::UniformGrid;
//!
//! let mut grid = DragGrid::with_parts(
//!     GridConfig::default(),
//!     InstantRunner::new(),
//!     UniformGrid::default(),
//! )
//! .unwrap();
//! for id in 1..=4 {
//!     grid.add_item(ItemId(id)).unwrap();
//! }
//!
//! assert!(grid.begin_drag(ItemId(1)));
//! grid.drag_entered(ItemId(3)).unwrap();
//! grid.tick(Duration::ZERO).unwrap();
//! grid.end_drag();
//!
//! assert_eq!(grid.items_by_order(), vec![ItemId(2), ItemId(3), ItemId(1), ItemId(4)]);
//! ```
//!
//! # Re-trigger
//!
//! Enter events that arrive while a batch animates are dropped by the
//! engine, but the session still records the latest target. When the batch
//! finishes and the drag is still active, a follow-up reorder toward that
//! target is issued if it differs from the one just completed.
//!
//! # Invariants
//!
//! 1. While no batch is in flight, orders form a permutation of `0..len`.
//! 2. Removal never strands a batch: the removed item's move counts as done.
//! 3. A follow-up reorder only targets an item that is still registered.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Fallback |
//! |---------|-------|----------|
//! | Drag source removed | Host removed the lifted item | Session ends |
//! | Last target removed | Host removed the hovered item | Follow-up cancelled |
//! | Drag disabled mid-drag | `set_drag_enabled(false)` | Session ends, feedback restored |

use std::time::Duration;

use tracing::debug;

use draggrid_core::geometry::{GridGeometry, Rect, Sides, Size, UniformGrid};

use crate::config::GridConfig;
use crate::drag::{DragFeedback, DragSessionState, Highlight};
use crate::error::{ConfigError, RegistryError, ReorderError};
use crate::registry::{ItemFlags, ItemId, ItemRegistry};
use crate::reorder::{BatchFinished, IgnoreReason, MoveTicket, ReorderEngine, ReorderOutcome};
use crate::runner::{AnimationRunner, TweenRunner};

/// A reorderable grid of items.
#[derive(Debug)]
pub struct DragGrid<R = TweenRunner, G = UniformGrid> {
    config: GridConfig,
    registry: ItemRegistry,
    engine: ReorderEngine,
    session: DragSessionState,
    runner: R,
    geometry: G,
    feedback: Vec<DragFeedback>,
}

impl DragGrid {
    /// Grid with a [`TweenRunner`] using the configured move duration.
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        let runner = TweenRunner::new(config.move_duration);
        Self::with_parts(config, runner, UniformGrid::default())
    }
}

impl<R: AnimationRunner> DragGrid<R, UniformGrid> {
    /// Re-measure: fit the configured columns into `container_width`.
    pub fn fit(&mut self, container_width: u32, child_max: Size, padding: Sides) {
        self.geometry = UniformGrid::fit(
            container_width,
            child_max,
            self.config.column_count,
            self.config.child_top_margin,
            padding,
        );
    }
}

impl<R: AnimationRunner, G: GridGeometry> DragGrid<R, G> {
    /// Grid with a caller-supplied runner and geometry.
    pub fn with_parts(config: GridConfig, runner: R, geometry: G) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            engine: ReorderEngine::new(config.strict_mode),
            config,
            registry: ItemRegistry::new(),
            session: DragSessionState::Idle,
            runner,
            geometry,
            feedback: Vec::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    #[must_use]
    pub fn session(&self) -> DragSessionState {
        self.session
    }

    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn runner_mut(&mut self) -> &mut R {
        &mut self.runner
    }

    #[must_use]
    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    pub fn set_geometry(&mut self, geometry: G) {
        self.geometry = geometry;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    #[must_use]
    pub fn order_of(&self, id: ItemId) -> Option<usize> {
        self.registry.order_of(id)
    }

    /// Item ids sorted by order.
    #[must_use]
    pub fn items_by_order(&self) -> Vec<ItemId> {
        self.registry.items_by_order()
    }

    /// Whether a reorder batch is animating.
    #[must_use]
    pub fn is_reordering(&self) -> bool {
        self.engine.is_in_flight()
    }

    #[must_use]
    pub fn is_drag_enabled(&self) -> bool {
        self.config.drag_enabled
    }

    /// Whether order-index violations fail the request instead of being
    /// skipped.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.engine.is_strict()
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    /// Register `id` at the end of the grid. Returns its order.
    pub fn add_item(&mut self, id: ItemId) -> Result<usize, RegistryError> {
        let flags = if self.config.drag_enabled {
            ItemFlags::LISTENERS
        } else {
            ItemFlags::empty()
        };
        self.registry.insert(id, flags)
    }

    /// Remove `id`, closing the gap it leaves.
    pub fn remove_item(&mut self, id: ItemId) -> Result<bool, ReorderError> {
        Ok(self.remove_items(&[id])? == 1)
    }

    /// Remove several items at once. Returns how many were registered.
    pub fn remove_items(&mut self, ids: &[ItemId]) -> Result<usize, ReorderError> {
        let removed = self.registry.remove_many(ids);
        if removed == 0 {
            return Ok(0);
        }
        let mut finished = None;
        for &id in ids {
            if self.session.forget(id) {
                debug!(item = %id, "drag source removed, session ended");
            }
            self.runner.cancel(id);
            if let Some(batch) = self.engine.forget(id) {
                finished = Some(batch);
            }
        }
        if let Some(batch) = finished {
            self.after_batch(batch)?;
        }
        Ok(removed)
    }

    /// Remove every item and abandon any batch or drag.
    pub fn clear(&mut self) {
        if let Some(pending) = self.engine.abort() {
            for &item in pending.awaiting() {
                self.runner.cancel(item);
            }
        }
        self.session.end();
        self.registry.clear();
        self.feedback.clear();
    }

    // -----------------------------------------------------------------------
    // Drag events
    // -----------------------------------------------------------------------

    /// Lift `id`. Returns `false` if dragging is disabled, `id` is not a
    /// drag source, or another drag is active.
    pub fn begin_drag(&mut self, id: ItemId) -> bool {
        if !self.config.drag_enabled {
            debug!(item = %id, "drag start ignored: drag disabled");
            return false;
        }
        let is_source = self
            .registry
            .flags(id)
            .is_some_and(|f| f.contains(ItemFlags::DRAG_SOURCE));
        if !is_source || !self.session.begin(id) {
            debug!(item = %id, "drag start refused");
            return false;
        }
        debug!(item = %id, "drag started");
        self.registry.set_flags(id, ItemFlags::LIFTED, true);
        self.feedback.push(DragFeedback::Lifted {
            item: id,
            opacity: self.config.lift_opacity,
        });
        self.highlight_targets(Highlight::DragStarted);
        true
    }

    /// The pointer entered `target`.
    pub fn drag_entered(&mut self, target: ItemId) -> Result<ReorderOutcome, ReorderError> {
        if !self.config.drag_enabled {
            return Ok(ReorderOutcome::Ignored(IgnoreReason::DragDisabled));
        }
        if !self.is_target(target) {
            return Ok(ReorderOutcome::Ignored(IgnoreReason::Unregistered));
        }
        self.feedback.push(DragFeedback::Highlight {
            item: target,
            highlight: Highlight::Entered,
        });
        if !self.session.is_dragging() {
            debug!(item = %target, "drag enter ignored: no active drag");
            return Ok(ReorderOutcome::Ignored(IgnoreReason::NotDragging));
        }
        match self.session.enter(target) {
            Some(source) => self.request_reorder(source, target),
            None => Ok(ReorderOutcome::Ignored(IgnoreReason::SameItem)),
        }
    }

    /// The pointer left `target`.
    pub fn drag_exited(&mut self, target: ItemId) {
        if self.is_target(target) {
            self.feedback.push(DragFeedback::Highlight {
                item: target,
                highlight: Highlight::Exited,
            });
        }
    }

    /// The dragged item was dropped on `target`.
    pub fn dropped(&mut self, target: ItemId) {
        if self.is_target(target) {
            self.feedback.push(DragFeedback::Highlight {
                item: target,
                highlight: Highlight::Dropped,
            });
        }
    }

    /// The drag finished, whether or not it was dropped on an item.
    pub fn end_drag(&mut self) {
        let Some(source) = self.session.end() else {
            return;
        };
        debug!(item = %source, "drag ended");
        if self.registry.set_flags(source, ItemFlags::LIFTED, false) {
            self.feedback.push(DragFeedback::Restored { item: source });
        }
        self.highlight_targets(Highlight::Ended);
    }

    /// Move `source` to `destination`'s position.
    pub fn request_reorder(
        &mut self,
        source: ItemId,
        destination: ItemId,
    ) -> Result<ReorderOutcome, ReorderError> {
        if !self.config.drag_enabled {
            debug!(%source, %destination, "reorder ignored: drag disabled");
            return Ok(ReorderOutcome::Ignored(IgnoreReason::DragDisabled));
        }
        self.engine.request(
            &mut self.registry,
            &self.geometry,
            self.config.column_count,
            &mut self.runner,
            source,
            destination,
        )
    }

    // -----------------------------------------------------------------------
    // Time and completion
    // -----------------------------------------------------------------------

    /// Advance animations and process every move that finished.
    ///
    /// Returns the outcome of a follow-up reorder, if one was attempted.
    pub fn tick(&mut self, dt: Duration) -> Result<Option<ReorderOutcome>, ReorderError> {
        self.runner.tick(dt);
        let mut follow_up = None;
        for ticket in self.runner.drain_completed() {
            if let Some(outcome) = self.complete_move(ticket)? {
                follow_up = Some(outcome);
            }
        }
        Ok(follow_up)
    }

    /// Report a finished move for runners driven outside [`tick`](Self::tick).
    pub fn complete_move(
        &mut self,
        ticket: MoveTicket,
    ) -> Result<Option<ReorderOutcome>, ReorderError> {
        match self.engine.complete(ticket) {
            Some(finished) => self.after_batch(finished),
            None => Ok(None),
        }
    }

    fn after_batch(
        &mut self,
        finished: BatchFinished,
    ) -> Result<Option<ReorderOutcome>, ReorderError> {
        let DragSessionState::Dragging {
            source,
            last_target: Some(target),
        } = self.session
        else {
            return Ok(None);
        };
        if target == finished.target || !self.registry.contains(target) {
            return Ok(None);
        }
        debug!(
            batch = finished.batch.0,
            %source,
            %target,
            "following pointer to latest target"
        );
        self.request_reorder(source, target).map(Some)
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    /// Attach or detach drag listeners on every item.
    pub fn set_drag_enabled(&mut self, enabled: bool) {
        if enabled == self.config.drag_enabled {
            return;
        }
        if !enabled {
            self.end_drag();
        }
        self.config.drag_enabled = enabled;
        self.registry.set_listeners(enabled);
        debug!(enabled, "drag listeners toggled");
    }

    pub fn set_strict_mode(&mut self, strict: bool) {
        self.config.strict_mode = strict;
        self.engine.set_strict(strict);
        debug!(strict, "strict mode toggled");
    }

    /// Change the column count and re-measure the geometry for it.
    ///
    /// Moves already animating keep their endpoints; every later layout
    /// and reorder uses the new cells.
    pub fn set_column_count(&mut self, column_count: usize) -> Result<(), ConfigError> {
        if column_count == 0 {
            return Err(ConfigError::ZeroColumns);
        }
        self.config.column_count = column_count;
        self.geometry.set_column_count(column_count);
        debug!(column_count, "column count changed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------

    /// Where every item should be drawn, in order. Items mid-move report
    /// their animated position.
    #[must_use]
    pub fn layout(&self) -> Vec<(ItemId, Rect)> {
        self.registry
            .items_by_order()
            .into_iter()
            .enumerate()
            .map(|(order, id)| {
                let rect = self
                    .runner
                    .current_rect(id)
                    .unwrap_or_else(|| self.geometry.cell_rect(order, self.config.column_count));
                (id, rect)
            })
            .collect()
    }

    /// Height needed to show every item.
    #[must_use]
    pub fn content_height(&self) -> u32 {
        self.geometry
            .content_height(self.registry.len(), self.config.column_count)
    }

    /// Take the queued feedback, oldest first.
    pub fn drain_feedback(&mut self) -> Vec<DragFeedback> {
        std::mem::take(&mut self.feedback)
    }

    fn is_target(&self, id: ItemId) -> bool {
        self.registry
            .flags(id)
            .is_some_and(|f| f.contains(ItemFlags::DROP_TARGET))
    }

    fn highlight_targets(&mut self, highlight: Highlight) {
        let targets = self
            .registry
            .children()
            .filter(|e| e.flags().contains(ItemFlags::DROP_TARGET))
            .map(|e| DragFeedback::Highlight {
                item: e.id(),
                highlight,
            });
        self.feedback.extend(targets);
    }
}
