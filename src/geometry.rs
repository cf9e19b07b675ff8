//! Shared geometric primitives used across the editor, viewer and storage modules.
//!
//! Container and screen values are pixels; `NormalizedRect` lives in the unit
//! square and is the only representation that gets persisted.

/// Smallest width or height a mask may have, in unit space.
pub const MIN_MASK_SIZE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_by(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either axis has no positive extent.
    pub fn is_empty(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn min_x(self) -> f64 {
        self.x
    }

    pub fn min_y(self) -> f64 {
        self.y
    }

    pub fn max_x(self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(self) -> f64 {
        self.y + self.height
    }

    /// Inclusive containment, matching how handles sit exactly on edges.
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }

    pub fn translated(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// A rectangle in unit space that always satisfies the mask invariants:
/// sizes at least [`MIN_MASK_SIZE`] and the whole rectangle inside `[0,1]²`.
///
/// The only way to build one is through [`crate::editor::mask::clamp_rect`]
/// (or [`NormalizedRect::new`], which forwards to it), so an invalid value is
/// never observable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedRect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl NormalizedRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        crate::editor::mask::clamp_rect(Rect::new(x, y, width, height))
    }

    /// Caller guarantees the invariants already hold.
    pub(crate) const fn from_clamped(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn x(&self) -> f64 {
        self.x
    }

    pub const fn y(&self) -> f64 {
        self.y
    }

    pub const fn width(&self) -> f64 {
        self.width
    }

    pub const fn height(&self) -> f64 {
        self.height
    }

    pub fn as_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

impl From<NormalizedRect> for Rect {
    fn from(rect: NormalizedRect) -> Self {
        rect.as_rect()
    }
}

#[cfg(test)]
pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[cfg(test)]
pub(crate) fn assert_rect_close(actual: Rect, expected: Rect) {
    assert!(
        (actual.x - expected.x).abs() < 1e-9
            && (actual.y - expected.y).abs() < 1e-9
            && (actual.width - expected.width).abs() < 1e-9
            && (actual.height - expected.height).abs() < 1e-9,
        "expected {expected:?}, got {actual:?}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_empty_when_any_axis_is_not_positive() {
        assert!(Size::ZERO.is_empty());
        assert!(Size::new(10.0, 0.0).is_empty());
        assert!(Size::new(-1.0, 5.0).is_empty());
        assert!(Size::new(f64::NAN, 5.0).is_empty());
        assert!(!Size::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn rect_contains_is_inclusive_on_edges() {
        let rect = Rect::new(10.0, 10.0, 20.0, 10.0);
        assert!(rect.contains(Point::new(10.0, 10.0)));
        assert!(rect.contains(Point::new(30.0, 20.0)));
        assert!(!rect.contains(Point::new(30.1, 20.0)));
        assert!(!rect.contains(Point::new(9.9, 15.0)));
    }

    #[test]
    fn normalized_rect_new_goes_through_clamp() {
        let rect = NormalizedRect::new(-0.5, 0.9, 0.01, 0.5);
        assert_close(rect.x(), 0.0);
        assert_close(rect.width(), MIN_MASK_SIZE);
        assert_close(rect.y(), 0.5);
        assert_close(rect.height(), 0.5);
    }
}
