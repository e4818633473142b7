//! Axis-aligned box algebra and baseline geometry.
//!
//! All coordinates are scan pixels with the origin at the top-left corner,
//! so `top < bottom` for any non-degenerate box.

use serde::{Deserialize, Serialize};

/// A point in scan pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position
    pub x: i32,
    /// Vertical position
    pub y: i32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box in scan pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge (inclusive)
    pub left: i32,
    /// Top edge (inclusive)
    pub top: i32,
    /// Right edge (exclusive)
    pub right: i32,
    /// Bottom edge (exclusive)
    pub bottom: i32,
}

impl BBox {
    /// Create a new box. Edges are normalized so that `left <= right`
    /// and `top <= bottom`.
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left: left.min(right),
            top: top.min(bottom),
            right: left.max(right),
            bottom: top.max(bottom),
        }
    }

    /// The axis-aligned envelope of a set of points.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = Self::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            bbox.left = bbox.left.min(p.x);
            bbox.top = bbox.top.min(p.y);
            bbox.right = bbox.right.max(p.x);
            bbox.bottom = bbox.bottom.max(p.y);
        }
        Some(bbox)
    }

    /// Box width in pixels.
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Box height in pixels.
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Box area in square pixels.
    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    /// Horizontal center of the box.
    pub fn center_x(&self) -> i32 {
        self.left + self.width() / 2
    }

    /// The smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// The overlapping box of `self` and `other`, if any.
    pub fn intersection(&self, other: &BBox) -> Option<BBox> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right.min(other.right);
        let bottom = self.bottom.min(other.bottom);
        if left < right && top < bottom {
            Some(BBox {
                left,
                top,
                right,
                bottom,
            })
        } else {
            None
        }
    }

    /// Overlap ratio: intersection area divided by the smaller box's area.
    ///
    /// Returns 0.0 when the boxes are disjoint or either box is degenerate.
    pub fn overlap_ratio(&self, other: &BBox) -> f32 {
        let min_area = self.area().min(other.area());
        if min_area <= 0 {
            return 0.0;
        }
        match self.intersection(other) {
            Some(inter) => inter.area() as f32 / min_area as f32,
            None => 0.0,
        }
    }
}

/// The writing baseline of a recognized line, as an ordered polyline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    /// Polyline points, ordered left to right
    pub points: Vec<Point>,
}

impl Baseline {
    /// Create a baseline from polyline points.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Leftmost x coordinate, or `None` for an empty polyline.
    pub fn left(&self) -> Option<i32> {
        self.points.iter().map(|p| p.x).min()
    }

    /// Rightmost x coordinate.
    pub fn right(&self) -> Option<i32> {
        self.points.iter().map(|p| p.x).max()
    }

    /// Average y coordinate of the polyline, used as the line's
    /// vertical position when measuring baseline-to-baseline distance.
    pub fn average_y(&self) -> Option<i32> {
        if self.points.is_empty() {
            return None;
        }
        let sum: i64 = self.points.iter().map(|p| p.y as i64).sum();
        Some((sum / self.points.len() as i64) as i32)
    }
}
