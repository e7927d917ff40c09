use planpin_proto::Point;

/// Rendered size of the floor-plan image on screen, in pixels.
///
/// Annotations are stored as fractions of the image size so the same pin
/// renders correctly at any display scale; the viewport is only needed at
/// the edges where pointer positions come in and draw positions go out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Both dimensions must be positive; a zero-sized viewport has no
    /// meaningful mapping.
    pub fn new(width: f64, height: f64) -> Self {
        debug_assert!(width > 0.0 && height > 0.0);
        Self { width, height }
    }

    /// Convert a pointer position to resolution-independent coordinates.
    ///
    /// Clicks outside the rendered bounds are clamped into `[0, 1]` rather
    /// than rejected, so a sloppy tap near an edge still yields a valid
    /// annotation instead of an out-of-range one.
    pub fn to_normalized(&self, pixel_x: f64, pixel_y: f64) -> Point {
        Point::clamped(pixel_x / self.width, pixel_y / self.height)
    }

    /// Inverse mapping, used purely for display.
    pub fn from_normalized(&self, point: Point) -> (f64, f64) {
        (point.x * self.width, point.y * self.height)
    }
}
