/// Integer point in device or logical coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned integer rectangle, half-open: `right` and `bottom` are exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const EMPTY: Rect = Rect { left: 0, top: 0, right: 0, bottom: 0 };

    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Build a rectangle from an origin and a size.
    pub const fn from_xywh(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { left: x, top: y, right: x + w, bottom: y + h }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Pixel count covered by the rectangle (0 when empty).
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width() as i64 * self.height() as i64
        }
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Swap edges so that `left <= right` and `top <= bottom`.
    pub fn normalized(self) -> Self {
        Self {
            left: self.left.min(self.right),
            top: self.top.min(self.bottom),
            right: self.left.max(self.right),
            bottom: self.top.max(self.bottom),
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// True when the two rectangles share at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.right > other.left
            && self.left < other.right
            && self.bottom > other.top
            && self.top < other.bottom
    }

    /// Overlapping part of two rectangles, `None` when they do not overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let r = Rect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        };
        (!r.is_empty()).then_some(r)
    }

    /// True when `self` lies entirely inside `other`.
    pub fn is_covered_by(&self, other: &Rect) -> bool {
        self.left >= other.left
            && self.top >= other.top
            && self.right <= other.right
            && self.bottom <= other.bottom
    }

    /// Smallest rectangle enclosing both; an empty operand is ignored.
    pub fn bounding(&self, other: &Rect) -> Rect {
        let a = self.normalized();
        let b = other.normalized();
        if a.is_empty() {
            return b;
        }
        if b.is_empty() {
            return a;
        }
        Rect {
            left: a.left.min(b.left),
            top: a.top.min(b.top),
            right: a.right.max(b.right),
            bottom: a.bottom.max(b.bottom),
        }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }

    /// Grow (or shrink, for negative values) each edge outward.
    pub fn inflate(self, dx: i32, dy: i32) -> Self {
        Self {
            left: self.left - dx,
            top: self.top - dy,
            right: self.right + dx,
            bottom: self.bottom + dy,
        }
    }
}

impl AsRef<Rect> for Rect {
    fn as_ref(&self) -> &Rect {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_when_degenerate() {
        assert!(Rect::new(0, 0, 0, 10).is_empty());
        assert!(Rect::new(5, 5, 4, 10).is_empty());
        assert!(!Rect::new(0, 0, 1, 1).is_empty());
        assert_eq!(Rect::new(0, 0, 0, 10).area(), 0);
    }

    #[test]
    fn intersection_is_half_open() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 20, 10);
        assert!(!a.intersects(&b));
        assert_eq!(a.intersection(&b), None);

        let c = Rect::new(5, 5, 15, 15);
        assert_eq!(a.intersection(&c), Some(Rect::new(5, 5, 10, 10)));
    }

    #[test]
    fn bounding_ignores_empty_operand() {
        let a = Rect::new(2, 2, 4, 4);
        assert_eq!(a.bounding(&Rect::EMPTY), a);
        assert_eq!(a.bounding(&Rect::new(8, 0, 9, 3)), Rect::new(2, 0, 9, 4));
    }

    #[test]
    fn normalized_swaps_edges() {
        assert_eq!(Rect::new(10, 8, 2, 1).normalized(), Rect::new(2, 1, 10, 8));
    }
}
