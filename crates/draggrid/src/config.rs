#![forbid(unsafe_code)]

//! Grid configuration.
//!
//! [`GridConfig`] is a plain value: build it with the `with_*` methods,
//! optionally layer environment overrides on top, then hand it to
//! [`DragGrid`](crate::DragGrid), which validates it.
//!
//! | Variable | Field | Format |
//! |----------|-------|--------|
//! | `DRAGGRID_COLUMNS` | `column_count` | positive integer |
//! | `DRAGGRID_DRAG_ENABLED` | `drag_enabled` | `1`/`true`/`yes`/`on` or `0`/`false`/`no`/`off` |
//! | `DRAGGRID_TOP_MARGIN` | `child_top_margin` | integer pixels |
//! | `DRAGGRID_STRICT` | `strict_mode` | boolean as above |
//! | `DRAGGRID_MOVE_MS` | `move_duration` | integer milliseconds |

use std::time::Duration;

use draggrid_core::animation::DEFAULT_MOVE_DURATION;

use crate::error::ConfigError;

pub const ENV_COLUMNS: &str = "DRAGGRID_COLUMNS";
pub const ENV_DRAG_ENABLED: &str = "DRAGGRID_DRAG_ENABLED";
pub const ENV_TOP_MARGIN: &str = "DRAGGRID_TOP_MARGIN";
pub const ENV_STRICT: &str = "DRAGGRID_STRICT";
pub const ENV_MOVE_MS: &str = "DRAGGRID_MOVE_MS";

/// Column count used when nothing else is configured.
pub const DEFAULT_COLUMN_COUNT: usize = 4;

/// Opacity of the lifted item while it is dragged.
pub const DEFAULT_LIFT_OPACITY: f32 = 0.1;

/// Settings for a [`DragGrid`](crate::DragGrid).
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    /// Number of columns. Must be at least one.
    pub column_count: usize,
    /// Whether items accept drags.
    pub drag_enabled: bool,
    /// Gap above every row, in pixels.
    pub child_top_margin: u32,
    /// Fail on order-invariant violations instead of logging and recovering.
    pub strict_mode: bool,
    /// Duration of each reorder move.
    pub move_duration: Duration,
    /// Opacity of the lifted item, `0.0..=1.0`.
    pub lift_opacity: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            column_count: DEFAULT_COLUMN_COUNT,
            drag_enabled: true,
            child_top_margin: 0,
            strict_mode: cfg!(debug_assertions),
            move_duration: DEFAULT_MOVE_DURATION,
            lift_opacity: DEFAULT_LIFT_OPACITY,
        }
    }
}

impl GridConfig {
    #[must_use]
    pub fn with_columns(mut self, column_count: usize) -> Self {
        self.column_count = column_count;
        self
    }

    #[must_use]
    pub fn with_drag_enabled(mut self, enabled: bool) -> Self {
        self.drag_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_child_top_margin(mut self, margin: u32) -> Self {
        self.child_top_margin = margin;
        self
    }

    #[must_use]
    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    #[must_use]
    pub fn with_move_duration(mut self, duration: Duration) -> Self {
        self.move_duration = duration;
        self
    }

    #[must_use]
    pub fn with_lift_opacity(mut self, opacity: f32) -> Self {
        self.lift_opacity = opacity;
        self
    }

    /// Check field ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.column_count == 0 {
            return Err(ConfigError::ZeroColumns);
        }
        if !(0.0..=1.0).contains(&self.lift_opacity) {
            return Err(ConfigError::InvalidOpacity(self.lift_opacity));
        }
        Ok(())
    }

    /// Defaults with `DRAGGRID_*` overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Apply `DRAGGRID_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(ENV_COLUMNS) {
            self.column_count = parse_number(ENV_COLUMNS, &value)?;
        }
        if let Some(value) = lookup(ENV_DRAG_ENABLED) {
            self.drag_enabled = parse_bool(ENV_DRAG_ENABLED, &value)?;
        }
        if let Some(value) = lookup(ENV_TOP_MARGIN) {
            self.child_top_margin = parse_number(ENV_TOP_MARGIN, &value)?;
        }
        if let Some(value) = lookup(ENV_STRICT) {
            self.strict_mode = parse_bool(ENV_STRICT, &value)?;
        }
        if let Some(value) = lookup(ENV_MOVE_MS) {
            self.move_duration = Duration::from_millis(parse_number(ENV_MOVE_MS, &value)?);
        }
        Ok(self)
    }
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}
