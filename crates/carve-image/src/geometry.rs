use serde::{Deserialize, Serialize};

use crate::ImageSize;

/// An integer pixel coordinate.
///
/// A point is only meaningful together with the buffer it was computed from:
/// it is valid within `[0, width) x [0, height)` of that buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point2 {
    /// Column of the pixel.
    pub x: usize,
    /// Row of the pixel.
    pub y: usize,
}

impl Point2 {
    /// Create a new point from its column and row.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Check whether the point lies inside an image of the given size.
    pub fn is_inside(&self, size: ImageSize) -> bool {
        self.x < size.width && self.y < size.height
    }
}

impl From<(usize, usize)> for Point2 {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

/// An axis aligned rectangle in pixel coordinates.
///
/// The rectangle covers columns `[x, x + width)` and rows `[y, y + height)`.
///
/// # Examples
///
/// ```
/// use carve_image::{ImageSize, Point2, Rect};
///
/// let roi = Rect::new(2, 1, 3, 2);
/// assert!(roi.contains(Point2::new(4, 2)));
/// assert!(!roi.contains(Point2::new(5, 2)));
/// assert!(roi.fits_in(ImageSize { width: 5, height: 3 }));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    /// Left column of the rectangle.
    pub x: usize,
    /// Top row of the rectangle.
    pub y: usize,
    /// Number of columns covered.
    pub width: usize,
    /// Number of rows covered.
    pub height: usize,
}

impl Rect {
    /// Create a new rectangle from its top-left corner and extent.
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The rectangle covering a whole image.
    pub fn full(size: ImageSize) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// Number of pixels covered by the rectangle, saturating at `usize::MAX`.
    pub fn area(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// Whether the rectangle covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether a pixel lies inside the rectangle.
    pub fn contains(&self, p: Point2) -> bool {
        p.x >= self.x
            && self.x.checked_add(self.width).is_some_and(|r| p.x < r)
            && p.y >= self.y
            && self.y.checked_add(self.height).is_some_and(|b| p.y < b)
    }

    /// Whether the rectangle lies entirely inside an image of the given size.
    pub fn fits_in(&self, size: ImageSize) -> bool {
        self.x.checked_add(self.width).is_some_and(|r| r <= size.width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= size.height)
    }
}
