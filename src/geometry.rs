use serde::{Deserialize, Serialize};

/// Screen/window pixel coordinate. All toolkit geometry is integer:
/// the scrollbar formulas are defined by integer floor division and must
/// not be computed in floating point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned pixel rectangle, half-open: a point on the right or bottom
/// edge is outside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn at(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Returns true if the point (px, py) is inside this rectangle.
    pub const fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    pub const fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub const fn translated(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Shrink every edge by `by` pixels. Width/height floor at zero.
    pub const fn inset(&self, by: i32) -> Rect {
        let w = self.width - 2 * by;
        let h = self.height - 2 * by;
        Rect::new(
            self.x + by,
            self.y + by,
            if w > 0 { w } else { 0 },
            if h > 0 { h } else { 0 },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(10, 10, 20, 20);
        assert!(r.contains(10, 10));
        assert!(r.contains(29, 29));
        assert!(!r.contains(30, 10));
        assert!(!r.contains(10, 30));
        assert!(!r.contains(9, 10));
    }

    #[test]
    fn intersects_overlapping_and_disjoint() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.intersects(&Rect::new(5, 5, 10, 10)));
        assert!(a.intersects(&a));
        // Touching edges do not overlap.
        assert!(!a.intersects(&Rect::new(10, 0, 10, 10)));
        assert!(!a.intersects(&Rect::new(0, 10, 10, 10)));
        assert!(!a.intersects(&Rect::new(50, 50, 1, 1)));
    }

    #[test]
    fn inset_floors_at_zero() {
        let r = Rect::new(0, 0, 10, 4);
        let shrunk = r.inset(3);
        assert_eq!(shrunk, Rect::new(3, 3, 4, 0));
    }

    #[test]
    fn translated_moves_origin_only() {
        let r = Rect::new(1, 2, 3, 4).translated(10, 20);
        assert_eq!(r, Rect::new(11, 22, 3, 4));
    }
}
