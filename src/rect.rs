//! Rectangles and box-model thicknesses.

use cgmath::{EuclideanSpace, Point2, Vector2, Zero};
use core::ops;

/// A point in a render object’s local coordinate space.
pub type Point = Point2<f64>;

/// A size; `x` is the width and `y` is the height.
pub type Size = Vector2<f64>;

/// A rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Rectangle origin.
    pub origin: Point,

    /// Rectangle size.
    pub size: Size,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(origin: Point, size: Size) -> Rect {
        Rect { origin, size }
    }

    /// Returns a zero-sized rectangle at the origin.
    pub fn zero() -> Rect {
        Rect {
            origin: Point::new(0., 0.),
            size: Vector2::zero(),
        }
    }

    pub fn left(&self) -> f64 {
        self.origin.x
    }

    pub fn top(&self) -> f64 {
        self.origin.y
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.size.x
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.size.y
    }

    /// Returns true if the point is inside the rectangle.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x + self.size.x
            && point.y < self.origin.y + self.size.y
    }

    /// Returns true if the two rectangles intersect.
    pub fn intersects(&self, rect: Rect) -> bool {
        let own_opposite = self.origin + self.size;
        let rect_opposite = rect.origin + rect.size;

        self.origin.x < rect_opposite.x
            && self.origin.y < rect_opposite.y
            && rect.origin.x < own_opposite.x
            && rect.origin.y < own_opposite.y
    }

    /// Returns the smallest rectangle containing both rectangles.
    ///
    /// Empty rectangles are ignored.
    pub fn union(&self, rect: Rect) -> Rect {
        if self.size.x <= 0. || self.size.y <= 0. {
            return rect;
        }
        if rect.size.x <= 0. || rect.size.y <= 0. {
            return *self;
        }

        let min_x = self.left().min(rect.left());
        let min_y = self.top().min(rect.top());
        let max_x = self.right().max(rect.right());
        let max_y = self.bottom().max(rect.bottom());

        Rect {
            origin: Point::new(min_x, min_y),
            size: Size::new(max_x - min_x, max_y - min_y),
        }
    }

    /// Returns a new rectangle shrunk by the given thickness on each side.
    ///
    /// The result never has a negative size and its origin never leaves the original rectangle.
    pub fn shrink(&self, thickness: Thickness) -> Rect {
        let left = (self.origin.x + thickness.left).min(self.right());
        let top = (self.origin.y + thickness.top).min(self.bottom());
        Rect {
            origin: Point::new(left, top),
            size: Size::new(
                (self.size.x - thickness.horizontal()).max(0.),
                (self.size.y - thickness.vertical()).max(0.),
            ),
        }
    }

    /// Returns a new rectangle grown by the given thickness on each side.
    pub fn expand(&self, thickness: Thickness) -> Rect {
        Rect {
            origin: Point::new(self.origin.x - thickness.left, self.origin.y - thickness.top),
            size: Size::new(
                self.size.x + thickness.horizontal(),
                self.size.y + thickness.vertical(),
            ),
        }
    }

    /// Returns a new rectangle with the given origin.
    pub fn with_origin(&self, origin: Point) -> Rect {
        Rect {
            origin,
            size: self.size,
        }
    }
}

impl ops::Add<Size> for Rect {
    type Output = Rect;
    fn add(self, offset: Size) -> Rect {
        Rect {
            origin: self.origin + offset,
            size: self.size,
        }
    }
}

impl ops::Add<Point> for Rect {
    type Output = Rect;
    fn add(self, point: Point) -> Rect {
        self + point.to_vec()
    }
}

/// Space around the four edges of a box (margin, padding, border width).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Thickness {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Thickness {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Thickness {
        Thickness {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The same thickness on every edge.
    pub fn uniform(value: f64) -> Thickness {
        Thickness::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    /// Total space taken up, as a size.
    pub fn total_size(&self) -> Size {
        Size::new(self.horizontal(), self.vertical())
    }
}

impl ops::Add for Thickness {
    type Output = Thickness;
    fn add(self, other: Thickness) -> Thickness {
        Thickness {
            left: self.left + other.left,
            top: self.top + other.top,
            right: self.right + other.right,
            bottom: self.bottom + other.bottom,
        }
    }
}

/// Corner radii, in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CornerRadius {
    pub top_left: f64,
    pub top_right: f64,
    pub bottom_right: f64,
    pub bottom_left: f64,
}

impl CornerRadius {
    pub fn uniform(radius: f64) -> CornerRadius {
        CornerRadius {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        }
    }
}

/// Clamps both components of a size to be at least zero.
pub(crate) fn at_least_zero(size: Size) -> Size {
    Size::new(size.x.max(0.), size.y.max(0.))
}

#[test]
fn test_rect_shrink_never_negative() {
    let rect = Rect::new(Point::new(0., 0.), Size::new(10., 4.));
    let shrunk = rect.shrink(Thickness::new(2., 3., 2., 3.));
    assert_eq!(shrunk.origin, Point::new(2., 3.));
    assert_eq!(shrunk.size, Size::new(6., 0.));

    let shrunk = rect.shrink(Thickness::uniform(20.));
    assert_eq!(shrunk.origin, Point::new(10., 4.), "origin should stay inside");
    assert_eq!(shrunk.size, Size::new(0., 0.));
}

#[test]
fn test_rect_contains_is_half_open() {
    let rect = Rect::new(Point::new(1., 1.), Size::new(2., 2.));
    assert!(rect.contains(Point::new(1., 1.)));
    assert!(rect.contains(Point::new(2.9, 2.9)));
    assert!(!rect.contains(Point::new(3., 2.)));
    assert!(!rect.contains(Point::new(0.5, 2.)));
}

#[test]
fn test_rect_union_ignores_empty() {
    let a = Rect::new(Point::new(0., 0.), Size::new(2., 2.));
    let b = Rect::new(Point::new(5., 1.), Size::new(1., 4.));
    assert_eq!(a.union(b), Rect::new(Point::new(0., 0.), Size::new(6., 5.)));
    assert_eq!(Rect::zero().union(b), b);
}
