/// A pointer position in surface coordinates (pixels from the top-left of
/// the rendered page bitmap)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub x: f64,
    pub y: f64,
}

impl SurfacePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whole-pixel position, floored and clamped to the surface origin
    fn to_pixel(self) -> (i32, i32) {
        (self.x.max(0.0).floor() as i32, self.y.max(0.0).floor() as i32)
    }
}

/// Axis-aligned rectangle in surface pixels with non-negative size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl SurfaceRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalize two corner points into a rectangle using min/abs so that
    /// the anchor may be any corner
    pub fn from_corners(anchor: SurfacePoint, release: SurfacePoint) -> Self {
        let (ax, ay) = anchor.to_pixel();
        let (rx, ry) = release.to_pixel();

        Self {
            x: ax.min(rx),
            y: ay.min(ry),
            width: (rx - ax).abs(),
            height: (ry - ay).abs(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Inclusive on all four edges
    pub fn contains(&self, point: SurfacePoint) -> bool {
        point.x >= self.x as f64
            && point.x <= (self.x + self.width) as f64
            && point.y >= self.y as f64
            && point.y <= (self.y + self.height) as f64
    }

    /// Intersection with a `width` x `height` surface anchored at the origin
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<SurfaceRect> {
        let left = self.x.max(0);
        let top = self.y.max(0);
        let right = (self.x + self.width).min(width as i32);
        let bottom = (self.y + self.height).min(height as i32);

        if right <= left || bottom <= top {
            return None;
        }

        Some(SurfaceRect::new(left, top, right - left, bottom - top))
    }
}

/// Word geometry as reported by the recognizer, local to the cropped image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBounds {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl RawBounds {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_normalizes_any_drag_direction() {
        let expected = SurfaceRect::new(10, 20, 30, 40);

        let down_right = SurfaceRect::from_corners(
            SurfacePoint::new(10.0, 20.0),
            SurfacePoint::new(40.0, 60.0),
        );
        let up_left = SurfaceRect::from_corners(
            SurfacePoint::new(40.0, 60.0),
            SurfacePoint::new(10.0, 20.0),
        );
        let up_right = SurfaceRect::from_corners(
            SurfacePoint::new(10.9, 60.2),
            SurfacePoint::new(40.5, 20.7),
        );

        assert_eq!(down_right, expected);
        assert_eq!(up_left, expected);
        assert_eq!(up_right, expected);
    }

    #[test]
    fn test_from_corners_clamps_negative_positions() {
        let rect = SurfaceRect::from_corners(
            SurfacePoint::new(-5.0, -3.0),
            SurfacePoint::new(4.0, 6.0),
        );
        assert_eq!(rect, SurfaceRect::new(0, 0, 4, 6));
    }

    #[test]
    fn test_zero_area() {
        let point = SurfacePoint::new(12.0, 12.0);
        let rect = SurfaceRect::from_corners(point, point);
        assert!(rect.is_empty());
        assert!(SurfaceRect::new(0, 0, 5, 0).is_empty());
        assert!(!SurfaceRect::new(0, 0, 1, 1).is_empty());
    }

    #[test]
    fn test_contains_is_edge_inclusive() {
        let rect = SurfaceRect::new(10, 10, 20, 10);
        assert!(rect.contains(SurfacePoint::new(10.0, 10.0)));
        assert!(rect.contains(SurfacePoint::new(30.0, 20.0)));
        assert!(rect.contains(SurfacePoint::new(15.0, 15.0)));
        assert!(!rect.contains(SurfacePoint::new(30.5, 15.0)));
        assert!(!rect.contains(SurfacePoint::new(15.0, 9.9)));
    }

    #[test]
    fn test_clamp_to_surface() {
        let rect = SurfaceRect::new(90, -10, 30, 40);
        assert_eq!(rect.clamp_to(100, 100), Some(SurfaceRect::new(90, 0, 10, 30)));

        let outside = SurfaceRect::new(150, 150, 10, 10);
        assert_eq!(outside.clamp_to(100, 100), None);
    }
}
