use std::f64::consts::PI;

pub type Point = (f64, f64);

#[inline(always)]
pub fn pi(v: f64) -> f64 {
    PI * v
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    // Unlike `f64::clamp`, never panics on `min > max` and maps NaN to `min`.
    f64::min(max, f64::max(min, value))
}

/// Squared distance between two points. Prefer this in hot loops that only compare distances.
pub fn dist_sq((x1, y1): Point, (x2, y2): Point) -> f64 {
    let dx = x1 - x2;
    let dy = y1 - y2;
    dx * dx + dy * dy
}

/// Computes the distance between two points.
pub fn dist(p1: Point, p2: Point) -> f64 {
    dist_sq(p1, p2).sqrt()
}

pub fn add_polar_offset((x, y): Point, theta: f64, r: f64) -> Point {
    (x + r * theta.cos(), y + r * theta.sin())
}

/// Rotates `point` by `theta` radians (clockwise in SVG's y-down space) about `center`.
pub fn rotate_about((x, y): Point, (cx, cy): Point, theta: f64) -> Point {
    let (sin, cos) = theta.sin_cos();
    let dx = x - cx;
    let dy = y - cy;
    (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
}
