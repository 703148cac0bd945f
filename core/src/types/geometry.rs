use std::fmt;

/// Integer pixel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Creates a new Point
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this point shifted by a (dx, dy) step
    ///
    /// Returns `None` when either coordinate would leave the `i32` range.
    pub fn step(self, (dx, dy): (i32, i32)) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }
}

/// Ordered polygon outline in pixel coordinates
///
/// The outline is implicitly closed: the last point connects back to the
/// first one without repeating it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    /// Creates a contour from an ordered list of points
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Returns the outline points
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of outline points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the outline has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Minimal axis-aligned rectangle enclosing the outline
    ///
    /// Returns `None` for an empty contour.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = *self.points.first()?;
        let (min, max) = self.points[1..]
            .iter()
            .fold((first, first), |(lo, hi), p| {
                (
                    Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                    Point::new(hi.x.max(p.x), hi.y.max(p.y)),
                )
            });
        Some(BoundingBox { min, max })
    }
}

/// Axis-aligned box spanning the extreme outline coordinates
///
/// Both corners lie on the outline's extremes, so `x2`/`y2` are the largest
/// coordinates and `width`/`height` are `max - min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct BoundingBox {
    /// Top-left corner
    pub min: Point,
    /// Bottom-right corner
    pub max: Point,
}

impl BoundingBox {
    /// Creates a box from two opposite corners in any order
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Left edge
    pub fn x1(&self) -> i32 {
        self.min.x
    }

    /// Top edge
    pub fn y1(&self) -> i32 {
        self.min.y
    }

    /// Right edge
    pub fn x2(&self) -> i32 {
        self.max.x
    }

    /// Bottom edge
    pub fn y2(&self) -> i32 {
        self.max.y
    }

    pub fn width(&self) -> u32 {
        self.max.x.abs_diff(self.min.x)
    }

    pub fn height(&self) -> u32 {
        self.max.y.abs_diff(self.min.y)
    }

    /// Whether the box encloses no area
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) - ({}, {})",
            self.x1(),
            self.y1(),
            self.x2(),
            self.y2()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_rectangle() {
        let contour = Contour::new(vec![
            Point::new(5, 5),
            Point::new(5, 15),
            Point::new(15, 15),
            Point::new(15, 5),
        ]);
        let bbox = contour.bounding_box().unwrap();
        assert_eq!(bbox.x1(), 5);
        assert_eq!(bbox.y1(), 5);
        assert_eq!(bbox.x2(), 15);
        assert_eq!(bbox.y2(), 15);
        assert!(!bbox.is_empty());
    }

    #[test]
    fn test_bounding_box_empty_contour() {
        assert!(Contour::default().bounding_box().is_none());
    }

    #[test]
    fn test_bounding_box_single_point() {
        let contour = Contour::new(vec![Point::new(7, 9)]);
        let bbox = contour.bounding_box().unwrap();
        assert_eq!((bbox.x1(), bbox.y1(), bbox.x2(), bbox.y2()), (7, 9, 7, 9));
        assert!(bbox.is_empty());
    }

    #[test]
    fn test_point_step() {
        assert_eq!(Point::new(10, 20).step((-1, 1)), Some(Point::new(9, 21)));
        assert_eq!(Point::new(i32::MAX, 0).step((1, 0)), None);
        assert_eq!(Point::new(0, i32::MIN).step((0, -1)), None);
    }

    #[test]
    fn test_bounding_box_spanning_full_range() {
        let contour = Contour::new(vec![Point::new(i32::MIN, -1), Point::new(i32::MAX, 1)]);
        let bbox = contour.bounding_box().unwrap();
        assert_eq!((bbox.x1(), bbox.x2()), (i32::MIN, i32::MAX));
        assert_eq!(bbox.width(), u32::MAX);
        assert_eq!(bbox.height(), 2);
    }

    #[test]
    fn test_bounding_box_new_orders_corners() {
        let bbox = BoundingBox::new(Point::new(8, 2), Point::new(3, 6));
        assert_eq!((bbox.x1(), bbox.y1(), bbox.x2(), bbox.y2()), (3, 2, 8, 6));
    }
}
