use std::sync::OnceLock;
use std::time::{Duration, Instant};

use smithay::utils::{Logical, Point, Rectangle, Size};

pub mod arena;
pub mod id;
pub mod signal;

pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_owned()
}

pub fn get_monotonic_time() -> Duration {
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed()
}

/// Whether the rectangle covers no area.
pub fn is_empty(rect: Rectangle<i32, Logical>) -> bool {
    rect.size.w <= 0 || rect.size.h <= 0
}

/// Intersection of two rectangles, `None` unless it has a positive area.
pub fn intersection(
    a: Rectangle<i32, Logical>,
    b: Rectangle<i32, Logical>,
) -> Option<Rectangle<i32, Logical>> {
    if is_empty(a) || is_empty(b) {
        return None;
    }

    let x1 = a.loc.x.max(b.loc.x);
    let y1 = a.loc.y.max(b.loc.y);
    let x2 = (a.loc.x + a.size.w).min(b.loc.x + b.size.w);
    let y2 = (a.loc.y + a.size.h).min(b.loc.y + b.size.h);

    if x2 <= x1 || y2 <= y1 {
        return None;
    }

    Some(Rectangle::new(
        Point::from((x1, y1)),
        Size::from((x2 - x1, y2 - y1)),
    ))
}

pub fn intersects(a: Rectangle<i32, Logical>, b: Rectangle<i32, Logical>) -> bool {
    intersection(a, b).is_some()
}

/// Whether the point lies inside the rectangle, with the right and bottom edges excluded.
pub fn contains_f64(rect: Rectangle<i32, Logical>, point: Point<f64, Logical>) -> bool {
    if is_empty(rect) {
        return false;
    }

    let x1 = f64::from(rect.loc.x);
    let y1 = f64::from(rect.loc.y);
    let x2 = x1 + f64::from(rect.size.w);
    let y2 = y1 + f64::from(rect.size.h);
    x1 <= point.x && point.x < x2 && y1 <= point.y && point.y < y2
}

/// Closest point to `point` that is still inside `rect`.
pub fn closest_point(rect: Rectangle<i32, Logical>, point: Point<f64, Logical>) -> Point<f64, Logical> {
    // The right and bottom edges are not part of the box, stop just short of them.
    const EPSILON: f64 = 1. / 65536.;

    let x1 = f64::from(rect.loc.x);
    let y1 = f64::from(rect.loc.y);
    let x2 = (x1 + f64::from(rect.size.w) - EPSILON).max(x1);
    let y2 = (y1 + f64::from(rect.size.h) - EPSILON).max(y1);
    Point::from((point.x.clamp(x1, x2), point.y.clamp(y1, y2)))
}

pub fn distance_squared(a: Point<f64, Logical>, b: Point<f64, Logical>) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// Grows the rectangle by the given amount on each side.
pub fn expand(
    rect: Rectangle<i32, Logical>,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
) -> Rectangle<i32, Logical> {
    Rectangle::new(
        Point::from((rect.loc.x - left, rect.loc.y - top)),
        Size::from((rect.size.w + left + right, rect.size.h + top + bottom)),
    )
}

pub fn rect_from_coords(x: i32, y: i32, w: i32, h: i32) -> Rectangle<i32, Logical> {
    Rectangle::new(Point::from((x, y)), Size::from((w, h)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_needs_area() {
        let a = rect_from_coords(0, 0, 100, 100);
        assert_eq!(
            intersection(a, rect_from_coords(50, 50, 100, 100)),
            Some(rect_from_coords(50, 50, 50, 50))
        );
        // Touching edges.
        assert_eq!(intersection(a, rect_from_coords(100, 0, 10, 10)), None);
        // Empty rectangles never intersect anything.
        assert_eq!(intersection(a, rect_from_coords(10, 10, 0, 5)), None);
    }

    #[test]
    fn closest_point_clamps() {
        let rect = rect_from_coords(10, 10, 100, 50);
        let p = closest_point(rect, Point::from((-5., 30.)));
        assert_eq!(p, Point::from((10., 30.)));

        let p = closest_point(rect, Point::from((500., 500.)));
        assert!(p.x < 110. && p.x > 109.99);
        assert!(p.y < 60. && p.y > 59.99);
    }

    #[test]
    fn contains_excludes_far_edges() {
        let rect = rect_from_coords(0, 0, 10, 10);
        assert!(contains_f64(rect, Point::from((0., 0.))));
        assert!(contains_f64(rect, Point::from((9.5, 9.5))));
        assert!(!contains_f64(rect, Point::from((10., 5.))));
    }
}
