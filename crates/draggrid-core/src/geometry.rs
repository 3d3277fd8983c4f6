#![forbid(unsafe_code)]

//! Geometric primitives and the grid geometry provider.
//!
//! A [`GridGeometry`] maps an item's *order* (its rank in the grid) to a cell
//! rectangle. The reorder engine never computes pixels itself: it asks the
//! provider for the rectangle of the source and destination cells and hands
//! both to the animation runner.
//!
//! # Invariants
//!
//! 1. `cell_rect` is pure: the same `(order, column_count)` always yields the
//!    same rectangle for a given provider.
//! 2. Orders are laid out row-major: `row = order / columns`,
//!    `column = order % columns`.
//! 3. A column count of zero is treated as one column.

/// A rectangle in pixel coordinates (origin at top-left).
///
/// The origin is signed because a child wider than its column is centred
/// with a negative offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle at the origin with given size.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add_unsigned(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add_unsigned(self.height)
    }

    /// Top-left corner as `(x, y)`.
    #[inline]
    pub const fn origin(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Size of the rectangle.
    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Same size, origin moved to `(x, y)`.
    #[inline]
    #[must_use]
    pub const fn with_origin(self, x: i32, y: i32) -> Self {
        Self::new(x, y, self.width, self.height)
    }

    /// Translation that moves this rectangle's origin onto `other`'s.
    #[inline]
    pub const fn offset_to(&self, other: &Rect) -> (i32, i32) {
        (
            other.x.saturating_sub(self.x),
            other.y.saturating_sub(self.y),
        )
    }

    /// Compute the intersection with another rectangle.
    ///
    /// Returns an empty rectangle if the rectangles don't overlap.
    #[inline]
    pub fn intersection(&self, other: &Rect) -> Rect {
        self.intersection_opt(other).unwrap_or_default()
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    pub fn intersection_opt(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right.abs_diff(x), bottom.abs_diff(y)))
        } else {
            None
        }
    }

    /// Smallest rectangle that contains both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right.abs_diff(x), bottom.abs_diff(y))
    }

    /// Create a new rectangle inside the current one with the given margin.
    pub fn inner(&self, margin: Sides) -> Rect {
        Rect {
            x: self.x.saturating_add_unsigned(margin.left),
            y: self.y.saturating_add_unsigned(margin.top),
            width: self.width.saturating_sub(margin.horizontal_sum()),
            height: self.height.saturating_sub(margin.vertical_sum()),
        }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum, used to track the largest child.
    #[must_use]
    pub const fn max(self, other: Size) -> Size {
        Size {
            width: if self.width > other.width {
                self.width
            } else {
                other.width
            },
            height: if self.height > other.height {
                self.height
            } else {
                other.height
            },
        }
    }
}

/// Sides for padding/margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sides {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Sides {
    /// Create new sides with equal values.
    pub const fn all(val: u32) -> Self {
        Self::new(val, val, val, val)
    }

    /// Create new sides with horizontal values only.
    pub const fn horizontal(val: u32) -> Self {
        Self::new(0, val, 0, val)
    }

    /// Create new sides with vertical values only.
    pub const fn vertical(val: u32) -> Self {
        Self::new(val, 0, val, 0)
    }

    /// Create new sides with specific values.
    pub const fn new(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Sum of left and right.
    #[inline]
    pub const fn horizontal_sum(&self) -> u32 {
        self.left.saturating_add(self.right)
    }

    /// Sum of top and bottom.
    #[inline]
    pub const fn vertical_sum(&self) -> u32 {
        self.top.saturating_add(self.bottom)
    }
}

impl From<u32> for Sides {
    fn from(val: u32) -> Self {
        Self::all(val)
    }
}

impl From<(u32, u32)> for Sides {
    fn from((vertical, horizontal): (u32, u32)) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }
}

impl From<(u32, u32, u32, u32)> for Sides {
    fn from((top, right, bottom, left): (u32, u32, u32, u32)) -> Self {
        Self::new(top, right, bottom, left)
    }
}

// ---------------------------------------------------------------------------
// Grid cells
// ---------------------------------------------------------------------------

/// Row/column address of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPosition {
    pub row: usize,
    pub column: usize,
}

/// Row-major cell address for `order`.
#[inline]
pub const fn cell_position(order: usize, column_count: usize) -> CellPosition {
    let columns = if column_count == 0 { 1 } else { column_count };
    CellPosition {
        row: order / columns,
        column: order % columns,
    }
}

/// Number of rows needed to hold `item_count` items.
#[inline]
pub const fn row_count(item_count: usize, column_count: usize) -> usize {
    let columns = if column_count == 0 { 1 } else { column_count };
    item_count.div_ceil(columns)
}

/// Maps an order value to a pixel rectangle.
///
/// Implementations must be pure and deterministic; the reorder engine calls
/// this with pre-reorder orders while it plans a batch.
pub trait GridGeometry {
    /// Rectangle of the cell that holds `order`.
    fn cell_rect(&self, order: usize, column_count: usize) -> Rect;

    /// Total content height for `item_count` items.
    fn content_height(&self, item_count: usize, column_count: usize) -> u32;

    /// The grid switched to `column_count` columns.
    ///
    /// Providers whose cells depend on the column count re-measure here.
    fn set_column_count(&mut self, _column_count: usize) {}
}

impl<G: GridGeometry + ?Sized> GridGeometry for &G {
    fn cell_rect(&self, order: usize, column_count: usize) -> Rect {
        (**self).cell_rect(order, column_count)
    }

    fn content_height(&self, item_count: usize, column_count: usize) -> u32 {
        (**self).content_height(item_count, column_count)
    }
}

/// Uniform cells: every child occupies a cell the size of the largest child,
/// centred horizontally inside equal-width columns.
///
/// ```
/// use draggrid_core::geometry::{GridGeometry, Rect, Sides, Size, UniformGrid};
///
/// let grid = UniformGrid::fit(400, Size::new(80, 40), 4, 10, Sides::default());
/// // Columns are 100px wide, children 80px: centred with a 10px offset.
/// assert_eq!(grid.cell_rect(5, 4), Rect::new(110, 50, 80, 40));
/// assert_eq!(grid.content_height(5, 4), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UniformGrid {
    /// Width of the container the columns were fitted into.
    pub container_width: u32,
    /// Width of one column (container width minus padding, divided evenly).
    pub column_width: u32,
    /// Size of every cell (the largest measured child).
    pub cell: Size,
    /// Gap above every row.
    pub child_top_margin: u32,
    /// Container padding.
    pub padding: Sides,
}

impl UniformGrid {
    /// Fit `column_count` columns into `container_width`.
    pub fn fit(
        container_width: u32,
        child_max: Size,
        column_count: usize,
        child_top_margin: u32,
        padding: Sides,
    ) -> Self {
        let mut grid = Self {
            container_width,
            column_width: 0,
            cell: child_max,
            child_top_margin,
            padding,
        };
        grid.refit(column_count);
        grid
    }

    /// Recompute the column width for `column_count` columns in the same
    /// container.
    pub fn refit(&mut self, column_count: usize) {
        let columns = u32::try_from(column_count.max(1)).unwrap_or(u32::MAX);
        let usable = self
            .container_width
            .saturating_sub(self.padding.horizontal_sum());
        self.column_width = usable / columns;
    }

    /// Distance between the tops of two consecutive rows.
    #[inline]
    pub const fn row_pitch(&self) -> u32 {
        self.cell.height.saturating_add(self.child_top_margin)
    }

    /// Horizontal offset that centres a child inside its column.
    ///
    /// Negative when the child is wider than the column.
    #[inline]
    pub fn centring_offset(&self) -> i32 {
        let diff = i64::from(self.column_width) - i64::from(self.cell.width);
        (diff / 2) as i32
    }
}

impl GridGeometry for UniformGrid {
    fn cell_rect(&self, order: usize, column_count: usize) -> Rect {
        let pos = cell_position(order, column_count);
        let column_x = (pos.column as i64) * i64::from(self.column_width);
        let row_y = (pos.row as i64) * i64::from(self.row_pitch());
        let x = i64::from(self.padding.left) + column_x + i64::from(self.centring_offset());
        let y = i64::from(self.padding.top) + row_y;
        Rect::new(
            x.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
            y.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
            self.cell.width,
            self.cell.height,
        )
    }

    fn content_height(&self, item_count: usize, column_count: usize) -> u32 {
        if item_count == 0 {
            return 0;
        }
        let rows = row_count(item_count, column_count) as u64;
        let height = rows * u64::from(self.row_pitch()) + u64::from(self.padding.vertical_sum());
        height.min(u64::from(u32::MAX)) as u32
    }

    fn set_column_count(&mut self, column_count: usize) {
        self.refit(column_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(2, 3, 4, 5);
        assert!(rect.contains(2, 3));
        assert!(rect.contains(5, 7));
        assert!(!rect.contains(6, 3));
        assert!(!rect.contains(2, 8));
    }

    #[test]
    fn rect_contains_negative_origin() {
        let rect = Rect::new(-4, -4, 8, 8);
        assert!(rect.contains(-4, -4));
        assert!(rect.contains(3, 3));
        assert!(!rect.contains(4, 0));
    }

    #[test]
    fn rect_intersection_overlaps() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(2, 2, 4, 4);
        assert_eq!(a.intersection(&b), Rect::new(2, 2, 2, 2));
    }

    #[test]
    fn rect_intersection_no_overlap_is_empty() {
        let a = Rect::new(0, 0, 2, 2);
        let b = Rect::new(3, 3, 2, 2);
        assert_eq!(a.intersection(&b), Rect::default());
    }

    #[test]
    fn rect_inner_reduces() {
        let rect = Rect::new(0, 0, 10, 10);
        let inner = rect.inner(Sides::new(1, 2, 3, 4));
        assert_eq!(inner, Rect::new(4, 1, 4, 6));
    }

    #[test]
    fn rect_offset_to() {
        let a = Rect::new(10, 20, 5, 5);
        let b = Rect::new(4, 30, 5, 5);
        assert_eq!(a.offset_to(&b), (-6, 10));
        assert_eq!(a.offset_to(&a), (0, 0));
    }

    #[test]
    fn sides_constructors_and_conversions() {
        assert_eq!(Sides::all(3), Sides::from(3));
        assert_eq!(Sides::horizontal(2), Sides::new(0, 2, 0, 2));
        assert_eq!(Sides::vertical(4), Sides::new(4, 0, 4, 0));
        assert_eq!(Sides::from((1, 2)), Sides::new(1, 2, 1, 2));
        assert_eq!(Sides::from((1, 2, 3, 4)), Sides::new(1, 2, 3, 4));
    }

    #[test]
    fn size_max_is_componentwise() {
        let a = Size::new(10, 3);
        let b = Size::new(4, 8);
        assert_eq!(a.max(b), Size::new(10, 8));
    }

    // --- Cells ---

    #[test]
    fn cell_position_row_major() {
        assert_eq!(cell_position(0, 4), CellPosition { row: 0, column: 0 });
        assert_eq!(cell_position(3, 4), CellPosition { row: 0, column: 3 });
        assert_eq!(cell_position(4, 4), CellPosition { row: 1, column: 0 });
        assert_eq!(cell_position(9, 4), CellPosition { row: 2, column: 1 });
    }

    #[test]
    fn zero_columns_treated_as_one() {
        assert_eq!(cell_position(3, 0), CellPosition { row: 3, column: 0 });
        assert_eq!(row_count(3, 0), 3);
    }

    #[test]
    fn row_count_rounds_up() {
        assert_eq!(row_count(0, 4), 0);
        assert_eq!(row_count(4, 4), 1);
        assert_eq!(row_count(5, 4), 2);
    }

    #[test]
    fn uniform_grid_fit_divides_usable_width() {
        let grid = UniformGrid::fit(420, Size::new(50, 30), 4, 0, Sides::horizontal(10));
        assert_eq!(grid.column_width, 100);
        assert_eq!(grid.centring_offset(), 25);
        assert_eq!(grid.cell_rect(0, 4), Rect::new(35, 0, 50, 30));
        assert_eq!(grid.cell_rect(3, 4), Rect::new(335, 0, 50, 30));
    }

    #[test]
    fn uniform_grid_rows_include_top_margin() {
        let grid = UniformGrid::fit(400, Size::new(100, 40), 4, 8, Sides::new(5, 0, 7, 0));
        assert_eq!(grid.cell_rect(4, 4).y, 5 + 48);
        assert_eq!(grid.cell_rect(8, 4).y, 5 + 96);
        assert_eq!(grid.content_height(9, 4), 3 * 48 + 12);
    }

    #[test]
    fn uniform_grid_empty_has_no_height() {
        let grid = UniformGrid::fit(400, Size::new(100, 40), 4, 8, Sides::all(10));
        assert_eq!(grid.content_height(0, 4), 0);
    }

    #[test]
    fn wide_child_gets_negative_offset() {
        let grid = UniformGrid::fit(100, Size::new(40, 10), 4, 0, Sides::default());
        assert_eq!(grid.column_width, 25);
        assert_eq!(grid.centring_offset(), -7);
        assert_eq!(grid.cell_rect(0, 4).x, -7);
    }

    #[test]
    fn refit_keeps_container_and_recentres() {
        let mut grid = UniformGrid::fit(400, Size::new(100, 100), 4, 0, Sides::default());
        assert_eq!(grid.cell_rect(1, 4), Rect::new(100, 0, 100, 100));

        grid.set_column_count(2);
        assert_eq!(grid.container_width, 400);
        assert_eq!(grid.column_width, 200);
        assert_eq!(grid.centring_offset(), 50);
        assert_eq!(grid.cell_rect(1, 2), Rect::new(250, 0, 100, 100));
        assert_eq!(grid.cell_rect(2, 2), Rect::new(50, 100, 100, 100));
    }

    #[test]
    fn refit_respects_padding() {
        let mut grid = UniformGrid::fit(420, Size::new(50, 30), 4, 0, Sides::horizontal(10));
        grid.refit(5);
        assert_eq!(grid.column_width, 80);
        grid.refit(0);
        assert_eq!(grid.column_width, 400);
    }

    #[test]
    fn geometry_by_reference() {
        let grid = UniformGrid::fit(400, Size::new(100, 40), 4, 0, Sides::default());
        let by_ref = &grid;
        assert_eq!(by_ref.cell_rect(6, 4), grid.cell_rect(6, 4));
    }
}
