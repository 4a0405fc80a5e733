//! Regular line grid drawn over the image as an alignment aid.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use crate::camera::Point;

/// A straight line segment in image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

/// Grid lines covering a `width` x `height` image, every `spacing` pixels,
/// starting at the image origin. Verticals come first, then horizontals.
#[must_use]
pub fn grid_lines(width: f64, height: f64, spacing: f64) -> Vec<Segment> {
    if spacing <= 0.0 || width < 0.0 || height < 0.0 || !width.is_finite() || !height.is_finite() {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut x = 0.0;
    while x <= width {
        lines.push(Segment { from: Point::new(x, 0.0), to: Point::new(x, height) });
        x += spacing;
    }
    let mut y = 0.0;
    while y <= height {
        lines.push(Segment { from: Point::new(0.0, y), to: Point::new(width, y) });
        y += spacing;
    }
    lines
}
