use serde::{Deserialize, Serialize};

/// A point in normalized image space, both axes in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn bearing_from(&self, origin: Point2D) -> f64 {
        (self.y - origin.y).atan2(self.x - origin.x)
    }
}

/// Interior angle at `b` between the rays `b→a` and `b→c`, in degrees within `[0, 180]`.
///
/// Coincident points give a meaningless value rather than an error; callers feed the
/// result into hysteresis-protected state, so a single bad reading is harmless.
pub fn angle(a: Point2D, b: Point2D, c: Point2D) -> f64 {
    let radians = c.bearing_from(b) - a.bearing_from(b);
    let degrees = radians.to_degrees().abs();
    if degrees > 180.0 {
        360.0 - degrees
    } else {
        degrees
    }
}

/// Returns the point at distance `length` from `b` such that `angle(a, b, result)` is
/// `degrees`. The new ray is rotated counter-clockwise from `b→a`.
pub fn place_at_angle(a: Point2D, b: Point2D, degrees: f64, length: f64) -> Point2D {
    let bearing = a.bearing_from(b) + degrees.to_radians();
    Point2D {
        x: b.x + length * bearing.cos(),
        y: b.y + length * bearing.sin(),
    }
}
