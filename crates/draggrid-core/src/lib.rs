#![forbid(unsafe_code)]

//! Core: grid geometry, animation primitives, and logging.

pub mod animation;
pub mod geometry;
pub mod logging;

#[cfg(feature = "tracing")]
pub use logging::trace;
