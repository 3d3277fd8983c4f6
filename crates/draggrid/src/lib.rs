#![forbid(unsafe_code)]

//! Reorderable fixed-column grid.
//!
//! Items sit in row-major cells. Dragging one item onto another moves it
//! into that item's cell and slides every item in between one cell back,
//! all animated at once. Requests that arrive while a move animates are
//! dropped; when the move finishes the grid follows the pointer to wherever
//! it ended up.
//!
//! # Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`registry`] | Item ids, order values, listener flags |
//! | [`reorder`] | Ripple planning, batch commit, completion counting |
//! | [`runner`] | Animation runners that report move completion |
//! | [`drag`] | Drag session state and visual feedback |
//! | [`grid`] | [`DragGrid`], the host-facing object |
//! | [`config`] | [`GridConfig`] and its environment overrides |
//! | [`error`] | Error types |

pub mod config;
pub mod drag;
pub mod error;
pub mod grid;
pub mod registry;
pub mod reorder;
pub mod runner;

pub use config::GridConfig;
pub use drag::{DragFeedback, DragSessionState, Highlight};
pub use error::{ConfigError, InvariantViolation, MissingSide, RegistryError, ReorderError};
pub use grid::DragGrid;
pub use registry::{ItemFlags, ItemId, ItemRegistry, OrderChange};
pub use reorder::{
    BatchId, IgnoreReason, MoveTicket, OrderIndex, ReorderEngine, ReorderOutcome, ReorderPlan,
    plan_reorder,
};
pub use runner::{AnimationRunner, InstantRunner, TweenRunner};

#[cfg(feature = "tracing-json")]
pub use draggrid_core::logging::init_json_subscriber;
