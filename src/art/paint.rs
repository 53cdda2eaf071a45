use kurbo::{BezPath, PathEl};
use raqote::{
    DrawOptions, DrawTarget, PathBuilder, SolidSource, Source, StrokeStyle, Transform,
};

use super::Scene;
use crate::color::Rgb;
use crate::shapes::{rasterize, PathOp, Primitive};

pub type Canvas = DrawTarget;

/// The drawing spans `VIEW_X..VIEW_X + VIEW_W` by `0..VIEW_H` in user units.
pub const VIEW_X: f64 = 50.0;
pub const VIEW_W: f64 = 200.0;
pub const VIEW_H: f64 = 250.0;

const OUTLINE_ALPHA: u8 = 20;
const FINGER_OUTLINE_WIDTH: f32 = 2.0;
const NAIL_OUTLINE_WIDTH: f32 = 1.5;

fn solid(color: Rgb) -> Source<'static> {
    Source::Solid(SolidSource::from_unpremultiplied_argb(
        0xff,
        color.r(),
        color.g(),
        color.b(),
    ))
}

fn outline_source() -> Source<'static> {
    Source::Solid(SolidSource::from_unpremultiplied_argb(OUTLINE_ALPHA, 0, 0, 0))
}

fn bezpath_to_raqote(path: &BezPath) -> raqote::Path {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                pb.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32)
            }
            PathEl::CurveTo(p1, p2, p3) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn primitive_to_raqote(primitive: &Primitive) -> raqote::Path {
    let mut pb = PathBuilder::new();
    for op in primitive.outline() {
        match op {
            PathOp::MoveTo((x, y)) => pb.move_to(x as f32, y as f32),
            PathOp::LineTo((x, y)) => pb.line_to(x as f32, y as f32),
            PathOp::QuadTo((cx, cy), (x, y)) => {
                pb.quad_to(cx as f32, cy as f32, x as f32, y as f32)
            }
            PathOp::Close => pb.close(),
        }
    }
    pb.finish()
}

/// Paints `scene` onto a new canvas `width` pixels wide. The height keeps the 4:5 aspect ratio
/// of the drawing.
#[tracing::instrument(skip(scene), fields(pieces = scene.pieces.len()))]
pub fn draw(scene: &Scene, width: i32) -> Canvas {
    let scale = f64::from(width.max(1)) / VIEW_W;
    let height = (VIEW_H * scale).round().max(1.0) as i32;
    let mut dt = DrawTarget::new(width.max(1), height);
    dt.clear(SolidSource::from_unpremultiplied_argb(0xff, 0xff, 0xff, 0xff));
    let s = scale as f32;
    dt.set_transform(&Transform::new(s, 0.0, 0.0, s, -(VIEW_X as f32) * s, 0.0));

    let opts = DrawOptions::new();
    let finger = bezpath_to_raqote(&scene.silhouette.finger);
    dt.fill(&finger, &solid(scene.skin_tone), &opts);
    dt.stroke(
        &finger,
        &outline_source(),
        &StrokeStyle {
            width: FINGER_OUTLINE_WIDTH,
            ..StrokeStyle::default()
        },
        &opts,
    );

    let nail = bezpath_to_raqote(&scene.silhouette.nail);
    dt.fill(&nail, &solid(scene.nail_color), &opts);
    dt.stroke(
        &nail,
        &outline_source(),
        &StrokeStyle {
            width: NAIL_OUTLINE_WIDTH,
            ..StrokeStyle::default()
        },
        &opts,
    );

    dt.push_clip(&nail);
    for piece in &scene.pieces {
        let drawable = rasterize(piece);
        let path = primitive_to_raqote(&drawable.primitive);
        dt.fill(&path, &solid(drawable.fill), &opts);
        dt.stroke(
            &path,
            &solid(drawable.stroke),
            &StrokeStyle {
                width: drawable.stroke_width as f32,
                ..StrokeStyle::default()
            },
            &opts,
        );
    }
    dt.pop_clip();
    dt
}
