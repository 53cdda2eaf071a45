use crate::art::RenderablePiece;
use crate::color::Rgb;
use crate::math::{add_polar_offset, pi, rotate_about, Point};
use crate::mix::Shape;

pub const STROKE_WIDTH: f64 = 0.5;

/// Segments used to approximate a circle with quadratic curves.
const CIRCLE_SEGMENTS: usize = 8;

/// A resolution-independent shape in SVG user units.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Circle {
        center: Point,
        radius: f64,
    },
    /// Rounded rectangle rotated by `rotation` radians about its center.
    Rect {
        center: Point,
        width: f64,
        height: f64,
        corner_radius: f64,
        rotation: f64,
    },
    Polygon {
        points: Vec<Point>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PathOp {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub primitive: Primitive,
    pub fill: Rgb,
    pub stroke: Rgb,
    pub stroke_width: f64,
}

pub fn rasterize(piece: &RenderablePiece) -> Drawable {
    let s = piece.size_px;
    let center = piece.center;
    let primitive = match piece.shape {
        Shape::Circle => Primitive::Circle {
            center,
            radius: s / 2.0,
        },
        Shape::Square => Primitive::Rect {
            center,
            width: s,
            height: s,
            corner_radius: f64::min(2.0, s * 0.2),
            rotation: piece.rotation,
        },
        Shape::Slice => {
            let width = s / 5.0;
            Primitive::Rect {
                center,
                width: s,
                height: width,
                corner_radius: f64::min(1.0, width * 0.3),
                rotation: piece.rotation,
            }
        }
        Shape::Hexagon => Primitive::Polygon {
            points: (0..6)
                .map(|k| {
                    let theta = piece.rotation + pi(1.0 / 6.0) + k as f64 * pi(1.0 / 3.0);
                    add_polar_offset(center, theta, s / 2.0)
                })
                .collect(),
        },
    };
    Drawable {
        primitive,
        fill: piece.fill,
        stroke: piece.border,
        stroke_width: STROKE_WIDTH,
    }
}

impl Primitive {
    /// Flattens the primitive into a closed path of lines and quadratic curves.
    pub fn outline(&self) -> Vec<PathOp> {
        match self {
            Primitive::Circle { center, radius } => circle_outline(*center, *radius),
            Primitive::Rect {
                center,
                width,
                height,
                corner_radius,
                rotation,
            } => rect_outline(*center, *width, *height, *corner_radius, *rotation),
            Primitive::Polygon { points } => {
                let mut ops = Vec::with_capacity(points.len() + 1);
                let mut iter = points.iter().copied();
                if let Some(first) = iter.next() {
                    ops.push(PathOp::MoveTo(first));
                    ops.extend(iter.map(PathOp::LineTo));
                    ops.push(PathOp::Close);
                }
                ops
            }
        }
    }
}

fn circle_outline(center: Point, radius: f64) -> Vec<PathOp> {
    let step = pi(2.0) / CIRCLE_SEGMENTS as f64;
    // Control points sit on the bisector, far enough out that the curve touches the circle.
    let control_radius = radius / (step / 2.0).cos();
    let mut ops = vec![PathOp::MoveTo(add_polar_offset(center, 0.0, radius))];
    for i in 0..CIRCLE_SEGMENTS {
        let start = i as f64 * step;
        ops.push(PathOp::QuadTo(
            add_polar_offset(center, start + step / 2.0, control_radius),
            add_polar_offset(center, start + step, radius),
        ));
    }
    ops.push(PathOp::Close);
    ops
}

fn rect_outline(
    center: Point,
    width: f64,
    height: f64,
    corner_radius: f64,
    rotation: f64,
) -> Vec<PathOp> {
    let (hw, hh) = (width / 2.0, height / 2.0);
    let rc = corner_radius.clamp(0.0, f64::min(hw, hh));
    let (cx, cy) = center;
    let place = |x: f64, y: f64| rotate_about((cx + x, cy + y), center, rotation);
    vec![
        PathOp::MoveTo(place(-hw + rc, -hh)),
        PathOp::LineTo(place(hw - rc, -hh)),
        PathOp::QuadTo(place(hw, -hh), place(hw, -hh + rc)),
        PathOp::LineTo(place(hw, hh - rc)),
        PathOp::QuadTo(place(hw, hh), place(hw - rc, hh)),
        PathOp::LineTo(place(-hw + rc, hh)),
        PathOp::QuadTo(place(-hw, hh), place(-hw, hh - rc)),
        PathOp::LineTo(place(-hw, -hh + rc)),
        PathOp::QuadTo(place(-hw, -hh), place(-hw + rc, -hh)),
        PathOp::Close,
    ]
}
