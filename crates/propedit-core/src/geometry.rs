use serde::{Deserialize, Serialize};

/// A 2D point in layout coordinates (database units).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Offset of this point from `origin`.
    pub fn relative_to(&self, origin: &Point) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
        }
    }

    /// Per-axis scale about the origin.
    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
        }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Box of the given size centered on `center`.
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        let (hw, hh) = (width.abs() / 2.0, height.abs() / 2.0);
        Self {
            min: Point::new(center.x - hw, center.y - hh),
            max: Point::new(center.x + hw, center.y + hh),
        }
    }

    pub fn from_points(points: &[Point]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        })
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_and_scale() {
        let p = Point::new(12.0, 7.0).relative_to(&Point::new(10.0, 5.0));
        let s = p.scale(3.0, 0.5);
        assert!((s.x - 6.0).abs() < 1e-10);
        assert!((s.y - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_bbox_from_outline() {
        let pts = [
            Point::new(-2.0, 1.0),
            Point::new(4.0, -3.0),
            Point::new(0.0, 5.0),
        ];
        let bb = BBox::from_points(&pts).unwrap();
        assert!((bb.width() - 6.0).abs() < 1e-10);
        assert!((bb.height() - 8.0).abs() < 1e-10);
        assert_eq!(bb.min, Point::new(-2.0, -3.0));
        assert!(BBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_centered_box() {
        let bb = BBox::centered(Point::new(5.0, 5.0), 4.0, -2.0);
        assert!((bb.min.x - 3.0).abs() < 1e-10);
        assert!((bb.max.y - 6.0).abs() < 1e-10);
    }
}
