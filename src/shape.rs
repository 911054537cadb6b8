// Clip shapes for captured photos and strip cells.
//
// Capture and strip use different heart curves. The capture heart hangs
// below its anchor point and is half the nominal size; the strip heart is
// scaled 2x and nudged up so it covers roughly the same footprint as the
// strip circle. Both are kept as separate constructors so exported images
// stay pixel-compatible with earlier strips.

use kurbo::{BezPath, Circle, Rect, Shape};

named_ids! {
    /// Outline used to clip a photo.
    pub enum ShapeId {
        Square => "square",
        Circle => "circle",
        Heart => "heart",
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        ShapeId::Square
    }
}

impl ShapeId {
    /// Unknown names fall back to a square.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(ShapeId::Square)
    }
}

const TOLERANCE: f64 = 0.1;

/// A closed outline in pixel coordinates, filled with the nonzero rule.
#[derive(Clone, Debug)]
pub struct ClipPath {
    path: BezPath,
}

impl ClipPath {
    /// Outline used when a photo is taken, centered on the frame.
    pub fn for_capture(shape: ShapeId, cx: f64, cy: f64, size: f64) -> Self {
        let path = match shape {
            ShapeId::Square => square(cx, cy, size),
            ShapeId::Circle => Circle::new((cx, cy), size / 2.0).to_path(TOLERANCE),
            ShapeId::Heart => capture_heart(cx, cy, size / 2.0),
        };
        Self { path }
    }

    /// Outline used for one strip cell. Also the path the border is stroked on.
    pub fn for_strip(shape: ShapeId, cx: f64, cy: f64, size: f64) -> Self {
        let path = match shape {
            ShapeId::Square => square(cx, cy, size),
            ShapeId::Circle => Circle::new((cx, cy), size / 2.0).to_path(TOLERANCE),
            ShapeId::Heart => strip_heart(cx, cy, size / 2.0),
        };
        Self { path }
    }

    pub fn path(&self) -> &BezPath {
        &self.path
    }
}

fn square(cx: f64, cy: f64, size: f64) -> BezPath {
    let half = size / 2.0;
    Rect::new(cx - half, cy - half, cx + half, cy + half).to_path(TOLERANCE)
}

/// Heart anchored at its top notch `(x, y + 0.3s)`, hanging down to `y + s`,
/// `s` wide. Used for live captures.
pub fn capture_heart(x: f64, y: f64, s: f64) -> BezPath {
    let top = s * 0.3;
    let mut p = BezPath::new();
    p.move_to((x, y + top));
    // top left lobe
    p.curve_to((x, y), (x - s / 2.0, y), (x - s / 2.0, y + top));
    // bottom left
    p.curve_to(
        (x - s / 2.0, y + (s + top) / 2.0),
        (x, y + (s + top) / 1.2),
        (x, y + s),
    );
    // bottom right
    p.curve_to(
        (x, y + (s + top) / 1.2),
        (x + s / 2.0, y + (s + top) / 2.0),
        (x + s / 2.0, y + top),
    );
    // top right lobe
    p.curve_to((x + s / 2.0, y), (x, y), (x, y + top));
    p.close_path();
    p
}

/// Two-curve heart scaled 2x around `(cx, cy)` and shifted up by `0.05s`,
/// sized to match a strip circle of radius `s`.
pub fn strip_heart(cx: f64, cy: f64, s: f64) -> BezPath {
    let k = 2.0 * s;
    let cy = cy - s * 0.05;
    let mut p = BezPath::new();
    p.move_to((cx, cy + k / 2.5));
    p.curve_to(
        (cx, cy - k / 8.0),
        (cx - k / 1.3, cy - k / 1.3),
        (cx, cy - k * 0.9),
    );
    p.curve_to(
        (cx + k / 1.3, cy - k / 1.3),
        (cx, cy - k / 8.0),
        (cx, cy + k / 2.5),
    );
    p.close_path();
    p
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::*;

    fn bounds(c: &ClipPath) -> Rect {
        c.path().bounding_box()
    }

    fn contains(c: &ClipPath, x: f64, y: f64) -> bool {
        c.path().contains(Point::new(x, y))
    }

    #[test]
    fn unknown_shape_falls_back_to_square() {
        assert_eq!(ShapeId::parse_lenient("star"), ShapeId::Square);
        assert_eq!(ShapeId::parse_lenient("heart"), ShapeId::Heart);
    }

    #[test]
    fn square_and_circle_bounds_match_size() {
        let sq = ClipPath::for_capture(ShapeId::Square, 50.0, 40.0, 20.0);
        let b = bounds(&sq);
        assert_eq!((b.x0, b.y0, b.x1, b.y1), (40.0, 30.0, 60.0, 50.0));

        let c = ClipPath::for_strip(ShapeId::Circle, 0.0, 0.0, 100.0);
        let b = bounds(&c);
        assert!((b.width() - 100.0).abs() < 0.5);
        assert!(contains(&c, 0.0, 49.0));
        assert!(!contains(&c, 40.0, 40.0));
    }

    #[test]
    fn capture_heart_hangs_below_its_center() {
        let h = ClipPath::for_capture(ShapeId::Heart, 100.0, 100.0, 200.0);
        let b = bounds(&h);
        // s = 100: lobes start at y = 100, the tip sits near y = 200
        assert!(b.y0 >= 100.0 - 1e-9);
        assert!(b.y1 > 195.0 && b.y1 < 210.0);
        assert!(b.x0 >= 50.0 - 1e-9 && b.x1 <= 150.0 + 1e-9);
        assert!(contains(&h, 100.0, 160.0));
        assert!(!contains(&h, 100.0, 90.0));
    }

    #[test]
    fn strip_heart_reaches_above_the_cell() {
        let h = ClipPath::for_strip(ShapeId::Heart, 230.0, 230.0, 400.0);
        let b = bounds(&h);
        // s = 200, k = 400, shifted up 10: bottom at 230 - 10 + 160
        assert!((b.y1 - 380.0).abs() < 1e-6);
        assert!(b.y0 < 30.0);
        assert!(contains(&h, 230.0, 100.0));
        assert!(!contains(&h, 40.0, 370.0));
    }

    #[test]
    fn the_two_hearts_differ() {
        let a = bounds(&ClipPath::for_capture(ShapeId::Heart, 0.0, 0.0, 400.0));
        let b = bounds(&ClipPath::for_strip(ShapeId::Heart, 0.0, 0.0, 400.0));
        assert_ne!((a.y0, a.y1), (b.y0, b.y1));
    }
}
