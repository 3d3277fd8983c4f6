#![forbid(unsafe_code)]

//! Reorder engine: ripple-shift planning, batch commit, completion counting.
//!
//! Moving item S (order `s`) onto item D (order `d`) is a *ripple shift*:
//! with `dir = sign(d - s)`, every item whose order lies in `s+dir ..= d`
//! moves one slot back toward `s`, and S takes order `d`. That is
//! `|d - s| + 1` unit moves, all started at once.
//!
//! ```text
//!   request(A, C) on [A B C D]
//!
//!   order:  0   1   2   3          0   1   2   3
//!          [A] [B] [C] [D]   →    [B] [C] [A] [D]
//!           └──────►┘              ◄─┘ ◄─┘
//! ```
//!
//! # Protocol
//!
//! 1. [`plan_reorder`] reads the *pre-reorder* orders only and produces the
//!    whole mapping.
//! 2. Source and target rectangles are taken from the geometry provider
//!    with those same pre-reorder orders.
//! 3. The mapping is committed to the [`OrderIndex`] in one call.
//! 4. One animation per move is handed to the [`AnimationRunner`], each with
//!    a [`MoveTicket`]; a [`CompletionCounter`] starts at the move count.
//! 5. Every returned ticket decrements the counter once. At zero the batch
//!    is dropped and [`ReorderEngine::complete`] reports it as finished; the
//!    owner decides whether the pointer moved on and a follow-up is due.
//!
//! # Invariants
//!
//! 1. At most one batch is in flight; requests arriving meanwhile are
//!    ignored, not queued.
//! 2. A ticket is counted at most once, and only for the batch it belongs to.
//! 3. No reader sees a partially relabeled index: orders change only inside
//!    the single `commit` call (plus `compact` in lenient recovery).
//!
//! # Failure Modes
//!
//! | Failure | Cause | Fallback |
//! |---------|-------|----------|
//! | Order not occupied during planning | Broken permutation | Strict: [`ReorderError`] before any mutation. Lenient: pair skipped, `warn!`, index compacted after commit |
//! | Every pair abandoned | Severely broken permutation | No batch started, index compacted |
//! | Stale or duplicate ticket | Runner misbehaving | Ignored, `debug!` |

use tracing::{debug, error, trace, warn};

use draggrid_core::geometry::GridGeometry;

use crate::error::{InvariantViolation, MissingSide, ReorderError};
use crate::registry::{ItemId, ItemRegistry, OrderChange};
use crate::runner::AnimationRunner;

// ---------------------------------------------------------------------------
// OrderIndex
// ---------------------------------------------------------------------------

/// The engine's view of the order mapping.
pub trait OrderIndex {
    /// The item currently holding `order`.
    fn item_at(&self, order: usize) -> Option<ItemId>;

    /// Current order of `id`, or `None` if it is not registered.
    fn order_of(&self, id: ItemId) -> Option<usize>;

    /// Apply a batch of new orders in one step.
    fn commit(&mut self, changes: &[OrderChange]);

    /// Re-label into a contiguous permutation, preserving rank.
    fn compact(&mut self);
}

impl OrderIndex for ItemRegistry {
    fn item_at(&self, order: usize) -> Option<ItemId> {
        ItemRegistry::item_at(self, order)
    }

    fn order_of(&self, id: ItemId) -> Option<usize> {
        ItemRegistry::order_of(self, id)
    }

    fn commit(&mut self, changes: &[OrderChange]) {
        ItemRegistry::commit(self, changes);
    }

    fn compact(&mut self) {
        ItemRegistry::compact(self);
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// One unit move within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedMove {
    pub item: ItemId,
    pub from_order: usize,
    pub to_order: usize,
}

impl PlannedMove {
    fn change(&self) -> OrderChange {
        OrderChange {
            item: self.item,
            from: self.from_order,
            to: self.to_order,
        }
    }
}

/// The full mapping for one reorder, computed from pre-reorder orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPlan {
    pub source_order: usize,
    pub dest_order: usize,
    /// Ripple moves in ripple order, then the source move.
    pub moves: Vec<PlannedMove>,
    /// Pairs that could not be planned.
    pub abandoned: Vec<InvariantViolation>,
}

impl ReorderPlan {
    /// `|dest - source|`: the number of items that ripple.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.source_order.abs_diff(self.dest_order)
    }

    /// Order changes to commit.
    #[must_use]
    pub fn changes(&self) -> Vec<OrderChange> {
        self.moves.iter().map(PlannedMove::change).collect()
    }
}

/// Plan moving the item at `source_order` to `dest_order`.
///
/// Returns an empty plan when the two orders are equal.
pub fn plan_reorder<I: OrderIndex + ?Sized>(
    index: &I,
    source_order: usize,
    dest_order: usize,
) -> ReorderPlan {
    let steps = source_order.abs_diff(dest_order);
    let mut plan = ReorderPlan {
        source_order,
        dest_order,
        moves: Vec::with_capacity(steps + 1),
        abandoned: Vec::new(),
    };
    if steps == 0 {
        return plan;
    }

    let forward = dest_order > source_order;
    for step in 1..=steps {
        let (from, to) = if forward {
            (source_order + step, source_order + step - 1)
        } else {
            (source_order - step, source_order - step + 1)
        };
        match plan_move(index, from, to) {
            Ok(mv) => plan.moves.push(mv),
            Err(v) => plan.abandoned.push(v),
        }
    }
    match plan_move(index, source_order, dest_order) {
        Ok(mv) => plan.moves.push(mv),
        Err(v) => plan.abandoned.push(v),
    }
    plan
}

fn plan_move<I: OrderIndex + ?Sized>(
    index: &I,
    from: usize,
    to: usize,
) -> Result<PlannedMove, InvariantViolation> {
    let violation = |missing| InvariantViolation {
        from_order: from,
        to_order: to,
        missing,
    };
    let item = index
        .item_at(from)
        .ok_or_else(|| violation(MissingSide::Source))?;
    if index.item_at(to).is_none() {
        return Err(violation(MissingSide::Destination));
    }
    Ok(PlannedMove {
        item,
        from_order: from,
        to_order: to,
    })
}

// ---------------------------------------------------------------------------
// Batch bookkeeping
// ---------------------------------------------------------------------------

/// Identifies one reorder batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(pub u64);

/// Handed to the animation runner with every move and returned on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveTicket {
    pub batch: BatchId,
    pub item: ItemId,
}

/// Counts outstanding completions for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionCounter {
    total: usize,
    remaining: usize,
}

impl CompletionCounter {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            remaining: total,
        }
    }

    /// Record one completion. Returns `true` when this was the last one.
    pub fn complete_one(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }
}

/// The batch currently animating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReorder {
    pub batch: BatchId,
    pub source: ItemId,
    /// The item the batch was aimed at.
    pub target: ItemId,
    pub counter: CompletionCounter,
    awaiting: Vec<ItemId>,
}

impl PendingReorder {
    /// Items whose move has not reported completion yet.
    pub fn awaiting(&self) -> &[ItemId] {
        &self.awaiting
    }
}

/// A batch whose last move completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchFinished {
    pub batch: BatchId,
    pub source: ItemId,
    pub target: ItemId,
}

/// Why a request did not start a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Source and destination are the same item.
    SameItem,
    /// Source and destination hold the same order.
    SameOrder,
    /// Another batch is still animating.
    InFlight,
    /// Source or destination is not registered.
    Unregistered,
    /// Dragging is disabled or the item has no drag listener attached.
    DragDisabled,
    /// A drag-enter arrived with no active drag.
    NotDragging,
    /// Every move of the plan was abandoned.
    Abandoned,
}

/// Result of a reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// A batch was committed and its animations started.
    Started { batch: BatchId, moves: usize },
    /// Nothing happened.
    Ignored(IgnoreReason),
}

impl ReorderOutcome {
    #[must_use]
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

// ---------------------------------------------------------------------------
// ReorderEngine
// ---------------------------------------------------------------------------

/// Drives ripple-shift batches one at a time.
#[derive(Debug, Clone, Default)]
pub struct ReorderEngine {
    strict: bool,
    next_batch: u64,
    pending: Option<PendingReorder>,
}

impl ReorderEngine {
    /// Create an engine. In `strict` mode invariant violations are returned
    /// as errors instead of being logged and skipped.
    #[must_use]
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            next_batch: 0,
            pending: None,
        }
    }

    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Whether a batch is animating.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn pending(&self) -> Option<&PendingReorder> {
        self.pending.as_ref()
    }

    /// Move `source` to `destination`'s position, rippling the items between.
    pub fn request<I, G, R>(
        &mut self,
        index: &mut I,
        geometry: &G,
        column_count: usize,
        runner: &mut R,
        source: ItemId,
        destination: ItemId,
    ) -> Result<ReorderOutcome, ReorderError>
    where
        I: OrderIndex + ?Sized,
        G: GridGeometry + ?Sized,
        R: AnimationRunner + ?Sized,
    {
        if source == destination {
            return Ok(ReorderOutcome::Ignored(IgnoreReason::SameItem));
        }
        let (Some(s), Some(d)) = (index.order_of(source), index.order_of(destination)) else {
            debug!(%source, %destination, "reorder ignored: unregistered item");
            return Ok(ReorderOutcome::Ignored(IgnoreReason::Unregistered));
        };
        if s == d {
            return Ok(ReorderOutcome::Ignored(IgnoreReason::SameOrder));
        }
        if let Some(pending) = &self.pending {
            debug!(
                from = s,
                to = d,
                batch = pending.batch.0,
                remaining = pending.counter.remaining(),
                "reorder ignored: batch in flight"
            );
            return Ok(ReorderOutcome::Ignored(IgnoreReason::InFlight));
        }

        let plan = plan_reorder(index, s, d);
        if let Some(first) = plan.abandoned.first() {
            if self.strict {
                error!(violation = %first, "reorder aborted: order permutation broken");
                return Err(ReorderError::InvariantViolation(*first));
            }
            for violation in &plan.abandoned {
                warn!(%violation, "reorder pair abandoned");
            }
        }
        if plan.moves.is_empty() {
            index.compact();
            return Ok(ReorderOutcome::Ignored(IgnoreReason::Abandoned));
        }

        // Cell lookups use pre-commit orders.
        let rects: Vec<_> = plan
            .moves
            .iter()
            .map(|mv| {
                (
                    geometry.cell_rect(mv.from_order, column_count),
                    geometry.cell_rect(mv.to_order, column_count),
                )
            })
            .collect();

        index.commit(&plan.changes());
        if !plan.abandoned.is_empty() {
            index.compact();
        }

        let batch = BatchId(self.next_batch);
        self.next_batch += 1;
        let moves = plan.moves.len();
        debug!(
            batch = batch.0,
            %source,
            %destination,
            from = s,
            to = d,
            moves,
            "reorder batch started"
        );
        self.pending = Some(PendingReorder {
            batch,
            source,
            target: destination,
            counter: CompletionCounter::new(moves),
            awaiting: plan.moves.iter().map(|mv| mv.item).collect(),
        });

        for (mv, (from, to)) in plan.moves.iter().zip(rects) {
            trace!(
                item = %mv.item,
                from_order = mv.from_order,
                to_order = mv.to_order,
                "animate move"
            );
            runner.animate_move(
                MoveTicket {
                    batch,
                    item: mv.item,
                },
                from,
                to,
            );
        }
        Ok(ReorderOutcome::Started { batch, moves })
    }

    /// Record a finished move. Returns the batch when this was its last move.
    pub fn complete(&mut self, ticket: MoveTicket) -> Option<BatchFinished> {
        let Some(pending) = self.pending.as_mut() else {
            debug!(
                item = %ticket.item,
                batch = ticket.batch.0,
                "completion with no batch in flight"
            );
            return None;
        };
        if pending.batch != ticket.batch {
            debug!(
                item = %ticket.item,
                batch = ticket.batch.0,
                current = pending.batch.0,
                "completion for stale batch"
            );
            return None;
        }
        let Some(pos) = pending.awaiting.iter().position(|id| *id == ticket.item) else {
            debug!(item = %ticket.item, batch = ticket.batch.0, "duplicate completion");
            return None;
        };
        pending.awaiting.swap_remove(pos);
        if pending.counter.complete_one() {
            return self.finish();
        }
        None
    }

    /// Count `item`'s outstanding move as done, e.g. because it was removed.
    pub fn forget(&mut self, item: ItemId) -> Option<BatchFinished> {
        let pending = self.pending.as_ref()?;
        if !pending.awaiting.contains(&item) {
            return None;
        }
        let batch = pending.batch;
        self.complete(MoveTicket { batch, item })
    }

    /// Drop the in-flight batch without reporting it as finished.
    pub fn abort(&mut self) -> Option<PendingReorder> {
        let pending = self.pending.take()?;
        debug!(
            batch = pending.batch.0,
            remaining = pending.counter.remaining(),
            "reorder batch aborted"
        );
        Some(pending)
    }

    fn finish(&mut self) -> Option<BatchFinished> {
        let pending = self.pending.take()?;
        debug!(batch = pending.batch.0, "reorder batch finished");
        Some(BatchFinished {
            batch: pending.batch,
            source: pending.source,
            target: pending.target,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ItemFlags;
    use crate::runner::InstantRunner;
    use draggrid_core::geometry::{Rect, Sides, Size, UniformGrid};

    const A: ItemId = ItemId(10);
    const B: ItemId = ItemId(11);
    const C: ItemId = ItemId(12);
    const D: ItemId = ItemId(13);

    fn abcd() -> ItemRegistry {
        let mut reg = ItemRegistry::new();
        for id in [A, B, C, D] {
            reg.insert(id, ItemFlags::LISTENERS).unwrap();
        }
        reg
    }

    fn geometry() -> UniformGrid {
        UniformGrid::fit(400, Size::new(100, 50), 4, 0, Sides::default())
    }

    /// Index with holes, to exercise the violation paths.
    struct SparseIndex {
        orders: Vec<(ItemId, usize)>,
        hidden: Vec<usize>,
        commits: usize,
        compactions: usize,
    }

    impl SparseIndex {
        fn new(orders: &[(ItemId, usize)]) -> Self {
            Self {
                orders: orders.to_vec(),
                hidden: Vec::new(),
                commits: 0,
                compactions: 0,
            }
        }

        /// Orders `item_at` reports as empty even though `order_of` returns them.
        fn hiding(mut self, orders: &[usize]) -> Self {
            self.hidden = orders.to_vec();
            self
        }
    }

    impl OrderIndex for SparseIndex {
        fn item_at(&self, order: usize) -> Option<ItemId> {
            if self.hidden.contains(&order) {
                return None;
            }
            self.orders.iter().find(|(_, o)| *o == order).map(|(id, _)| *id)
        }

        fn order_of(&self, id: ItemId) -> Option<usize> {
            self.orders.iter().find(|(i, _)| *i == id).map(|(_, o)| *o)
        }

        fn commit(&mut self, changes: &[OrderChange]) {
            self.commits += 1;
            for change in changes {
                if let Some(entry) = self.orders.iter_mut().find(|(i, _)| *i == change.item) {
                    entry.1 = change.to;
                }
            }
        }

        fn compact(&mut self) {
            self.compactions += 1;
            self.orders.sort_by_key(|(_, o)| *o);
            for (rank, entry) in self.orders.iter_mut().enumerate() {
                entry.1 = rank;
            }
        }
    }

    fn run_to_idle(engine: &mut ReorderEngine, runner: &mut InstantRunner) -> Vec<BatchFinished> {
        runner
            .drain_completed()
            .into_iter()
            .filter_map(|t| engine.complete(t))
            .collect()
    }

    // === Planning ===

    #[test]
    fn plan_forward_ripple() {
        let reg = abcd();
        let plan = plan_reorder(&reg, 0, 2);
        assert_eq!(plan.steps(), 2);
        assert_eq!(
            plan.moves,
            vec![
                PlannedMove {
                    item: B,
                    from_order: 1,
                    to_order: 0,
                },
                PlannedMove {
                    item: C,
                    from_order: 2,
                    to_order: 1,
                },
                PlannedMove {
                    item: A,
                    from_order: 0,
                    to_order: 2,
                },
            ]
        );
        assert!(plan.abandoned.is_empty());
    }

    #[test]
    fn plan_backward_ripple() {
        let reg = abcd();
        let plan = plan_reorder(&reg, 3, 1);
        assert_eq!(
            plan.moves,
            vec![
                PlannedMove {
                    item: C,
                    from_order: 2,
                    to_order: 3,
                },
                PlannedMove {
                    item: B,
                    from_order: 1,
                    to_order: 2,
                },
                PlannedMove {
                    item: D,
                    from_order: 3,
                    to_order: 1,
                },
            ]
        );
    }

    #[test]
    fn plan_adjacent_is_a_swap() {
        let reg = abcd();
        let plan = plan_reorder(&reg, 1, 2);
        assert_eq!(plan.moves.len(), 2);
        assert_eq!(
            plan.changes(),
            vec![
                OrderChange {
                    item: C,
                    from: 2,
                    to: 1,
                },
                OrderChange {
                    item: B,
                    from: 1,
                    to: 2,
                },
            ]
        );
    }

    #[test]
    fn plan_same_order_is_empty() {
        let plan = plan_reorder(&abcd(), 2, 2);
        assert!(plan.moves.is_empty());
        assert_eq!(plan.steps(), 0);
    }

    #[test]
    fn plan_records_both_missing_sides() {
        let index = SparseIndex::new(&[(A, 0), (C, 2), (D, 3)]);
        let plan = plan_reorder(&index, 0, 2);
        assert_eq!(
            plan.abandoned,
            vec![
                InvariantViolation {
                    from_order: 1,
                    to_order: 0,
                    missing: MissingSide::Source,
                },
                InvariantViolation {
                    from_order: 2,
                    to_order: 1,
                    missing: MissingSide::Destination,
                },
            ]
        );
        assert_eq!(
            plan.moves,
            vec![PlannedMove {
                item: A,
                from_order: 0,
                to_order: 2,
            }]
        );
    }

    // === Requests ===

    #[test]
    fn move_forward_final_orders() {
        let mut reg = abcd();
        let mut engine = ReorderEngine::new(true);
        let mut runner = InstantRunner::new();
        let outcome = engine
            .request(&mut reg, &geometry(), 4, &mut runner, A, C)
            .unwrap();
        assert_eq!(
            outcome,
            ReorderOutcome::Started {
                batch: BatchId(0),
                moves: 3,
            }
        );
        assert_eq!(reg.items_by_order(), vec![B, C, A, D]);
        assert!(engine.is_in_flight());
    }

    #[test]
    fn move_backward_final_orders() {
        let mut reg = abcd();
        let mut engine = ReorderEngine::new(true);
        let mut runner = InstantRunner::new();
        engine
            .request(&mut reg, &geometry(), 4, &mut runner, D, B)
            .unwrap();
        assert_eq!(reg.items_by_order(), vec![A, D, B, C]);
    }

    #[test]
    fn animations_use_pre_commit_cells() {
        let mut reg = abcd();
        let mut engine = ReorderEngine::new(true);
        let mut runner = InstantRunner::new();
        let geo = geometry();
        engine.request(&mut reg, &geo, 4, &mut runner, A, C).unwrap();
        let started = runner.started();
        assert_eq!(started.len(), 3);
        let source = started.iter().find(|m| m.ticket.item == A).unwrap();
        assert_eq!(source.from, geo.cell_rect(0, 4));
        assert_eq!(source.to, geo.cell_rect(2, 4));
        assert_eq!(source.to, Rect::new(200, 0, 100, 50));
    }

    #[test]
    fn self_target_is_noop() {
        let mut reg = abcd();
        let mut engine = ReorderEngine::new(true);
        let mut runner = InstantRunner::new();
        let outcome = engine
            .request(&mut reg, &geometry(), 4, &mut runner, B, B)
            .unwrap();
        assert_eq!(outcome, ReorderOutcome::Ignored(IgnoreReason::SameItem));
        assert_eq!(reg.items_by_order(), vec![A, B, C, D]);
        assert!(!engine.is_in_flight());
    }

    #[test]
    fn same_order_is_noop() {
        let mut index = SparseIndex::new(&[(A, 0), (B, 0)]);
        let mut engine = ReorderEngine::new(true);
        let mut runner = InstantRunner::new();
        let outcome = engine
            .request(&mut index, &geometry(), 4, &mut runner, A, B)
            .unwrap();
        assert_eq!(outcome, ReorderOutcome::Ignored(IgnoreReason::SameOrder));
        assert_eq!(index.commits, 0);
    }

    #[test]
    fn unregistered_is_noop() {
        let mut reg = abcd();
        let mut engine = ReorderEngine::new(true);
        let mut runner = InstantRunner::new();
        let outcome = engine
            .request(&mut reg, &geometry(), 4, &mut runner, A, ItemId(99))
            .unwrap();
        assert_eq!(outcome, ReorderOutcome::Ignored(IgnoreReason::Unregistered));
        assert!(runner.started().is_empty());
    }

    #[test]
    fn request_while_in_flight_is_dropped() {
        let mut reg = abcd();
        let mut engine = ReorderEngine::new(true);
        let mut runner = InstantRunner::new();
        let geo = geometry();
        engine.request(&mut reg, &geo, 4, &mut runner, A, C).unwrap();
        let snapshot = reg.items_by_order();

        let outcome = engine.request(&mut reg, &geo, 4, &mut runner, D, B).unwrap();
        assert_eq!(outcome, ReorderOutcome::Ignored(IgnoreReason::InFlight));
        assert_eq!(reg.items_by_order(), snapshot);

        let finished = run_to_idle(&mut engine, &mut runner);
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].target, C);
        assert!(!engine.is_in_flight());
    }

    // === Completion ===

    #[test]
    fn counter_reaches_zero_on_last_ticket() {
        let mut reg = abcd();
        let mut engine = ReorderEngine::new(true);
        let mut runner = InstantRunner::new();
        engine.request(&mut reg, &geometry(), 4, &mut runner, A, D).unwrap();
        let tickets = runner.drain_completed();
        assert_eq!(tickets.len(), 4);

        for ticket in &tickets[..3] {
            assert!(engine.complete(*ticket).is_none());
        }
        assert_eq!(engine.pending().unwrap().counter.remaining(), 1);
        let finished = engine.complete(tickets[3]).unwrap();
        assert_eq!(finished.source, A);
        assert_eq!(finished.target, D);
        assert!(!engine.is_in_flight());
    }

    #[test]
    fn duplicate_ticket_counted_once() {
        let mut reg = abcd();
        let mut engine = ReorderEngine::new(true);
        let mut runner = InstantRunner::new();
        engine.request(&mut reg, &geometry(), 4, &mut runner, A, B).unwrap();
        let tickets = runner.drain_completed();
        assert!(engine.complete(tickets[0]).is_none());
        assert!(engine.complete(tickets[0]).is_none());
        assert_eq!(engine.pending().unwrap().counter.remaining(), 1);
        assert!(engine.complete(tickets[1]).is_some());
    }

    #[test]
    fn stale_ticket_ignored() {
        let mut reg = abcd();
        let mut engine = ReorderEngine::new(true);
        let mut runner = InstantRunner::new();
        let geo = geometry();
        engine.request(&mut reg, &geo, 4, &mut runner, A, B).unwrap();
        let old = runner.drain_completed();
        for t in &old {
            engine.complete(*t);
        }
        engine.request(&mut reg, &geo, 4, &mut runner, C, D).unwrap();
        assert!(engine.complete(old[0]).is_none());
        assert_eq!(engine.pending().unwrap().counter.remaining(), 2);
    }

    #[test]
    fn forget_counts_removed_mover() {
        let mut reg = abcd();
        let mut engine = ReorderEngine::new(true);
        let mut runner = InstantRunner::new();
        engine.request(&mut reg, &geometry(), 4, &mut runner, A, B).unwrap();
        let _ = runner.drain_completed();
        assert!(engine.forget(A).is_none());
        assert!(engine.forget(A).is_none());
        assert!(engine.forget(B).is_some());
    }

    #[test]
    fn abort_drops_batch() {
        let mut reg = abcd();
        let mut engine = ReorderEngine::new(true);
        let mut runner = InstantRunner::new();
        engine.request(&mut reg, &geometry(), 4, &mut runner, A, C).unwrap();
        let aborted = engine.abort().unwrap();
        assert_eq!(aborted.awaiting().len(), 3);
        assert!(!engine.is_in_flight());
        for ticket in runner.drain_completed() {
            assert!(engine.complete(ticket).is_none());
        }
    }

    #[test]
    fn batch_ids_increase() {
        let mut reg = abcd();
        let mut engine = ReorderEngine::new(true);
        let mut runner = InstantRunner::new();
        let geo = geometry();
        engine.request(&mut reg, &geo, 4, &mut runner, A, B).unwrap();
        run_to_idle(&mut engine, &mut runner);
        let outcome = engine.request(&mut reg, &geo, 4, &mut runner, A, B).unwrap();
        assert_eq!(
            outcome,
            ReorderOutcome::Started {
                batch: BatchId(1),
                moves: 2,
            }
        );
    }

    // === Violations ===

    #[test]
    fn strict_mode_fails_before_mutation() {
        let mut index = SparseIndex::new(&[(A, 0), (C, 2), (D, 3)]);
        let mut engine = ReorderEngine::new(true);
        let mut runner = InstantRunner::new();
        let err = engine
            .request(&mut index, &geometry(), 4, &mut runner, A, C)
            .unwrap_err();
        assert!(matches!(
            err,
            ReorderError::InvariantViolation(InvariantViolation {
                missing: MissingSide::Source,
                ..
            })
        ));
        assert_eq!(index.commits, 0);
        assert!(!engine.is_in_flight());
        assert!(runner.started().is_empty());
    }

    #[test]
    fn lenient_mode_skips_pairs_and_compacts() {
        let mut index = SparseIndex::new(&[(A, 0), (C, 2), (D, 3)]);
        let mut engine = ReorderEngine::new(false);
        let mut runner = InstantRunner::new();
        let outcome = engine
            .request(&mut index, &geometry(), 4, &mut runner, A, C)
            .unwrap();
        assert_eq!(
            outcome,
            ReorderOutcome::Started {
                batch: BatchId(0),
                moves: 1,
            }
        );
        assert_eq!(index.commits, 1);
        assert_eq!(index.compactions, 1);
        let mut orders: Vec<usize> = index.orders.iter().map(|(_, o)| *o).collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![0, 1, 2]);

        // Only the planned move is counted.
        let finished = run_to_idle(&mut engine, &mut runner);
        assert_eq!(finished.len(), 1);
    }

    #[test]
    fn lenient_mode_all_abandoned_starts_nothing() {
        let mut index = SparseIndex::new(&[(A, 0), (B, 1)]).hiding(&[0, 1]);
        let mut engine = ReorderEngine::new(false);
        let mut runner = InstantRunner::new();
        let outcome = engine
            .request(&mut index, &geometry(), 4, &mut runner, A, B)
            .unwrap();
        assert_eq!(outcome, ReorderOutcome::Ignored(IgnoreReason::Abandoned));
        assert!(!engine.is_in_flight());
        assert_eq!(index.commits, 0);
        assert_eq!(index.compactions, 1);
        assert!(runner.started().is_empty());
    }

    #[test]
    fn counter_basics() {
        let mut counter = CompletionCounter::new(2);
        assert_eq!(counter.total(), 2);
        assert!(!counter.complete_one());
        assert!(counter.complete_one());
        assert!(counter.is_done());
        assert!(counter.complete_one());
        assert_eq!(counter.remaining(), 0);
    }
}
