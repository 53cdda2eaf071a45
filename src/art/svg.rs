//! Standalone SVG rendering of a scene, in the same layering as [`super::draw`].

use super::paint::{VIEW_H, VIEW_W, VIEW_X};
use super::Scene;
use crate::shapes::{rasterize, Drawable, Primitive};

const CLIP_ID: &str = "nail-clip";
const OUTLINE: &str = "rgba(0,0,0,0.08)";

fn element(drawable: &Drawable) -> String {
    let paint = format!(
        r#"fill="{}" stroke="{}" stroke-width="{}""#,
        drawable.fill, drawable.stroke, drawable.stroke_width
    );
    match &drawable.primitive {
        Primitive::Circle {
            center: (x, y),
            radius,
        } => format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" {}/>"#,
            x, y, radius, paint
        ),
        Primitive::Rect {
            center: (x, y),
            width,
            height,
            corner_radius,
            rotation,
        } => format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{:.2}" transform="rotate({:.2} {:.2} {:.2})" {}/>"#,
            x - width / 2.0,
            y - height / 2.0,
            width,
            height,
            corner_radius,
            rotation.to_degrees(),
            x,
            y,
            paint
        ),
        Primitive::Polygon { points } => {
            let points: Vec<String> = points
                .iter()
                .map(|(x, y)| format!("{:.2},{:.2}", x, y))
                .collect();
            format!(r#"<polygon points="{}" {}/>"#, points.join(" "), paint)
        }
    }
}

/// Renders `scene` as an SVG document `width` pixels wide.
pub fn render(scene: &Scene, width: u32) -> String {
    let height = (f64::from(width) * VIEW_H / VIEW_W).round();
    let finger = scene.silhouette.finger.to_svg();
    let nail = scene.silhouette.nail.to_svg();

    let mut out = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} 0 {} {}">"#,
        width, height, VIEW_X, VIEW_W, VIEW_H
    );
    out.push('\n');
    out.push_str(&format!(
        r#"<defs><clipPath id="{}"><path d="{}"/></clipPath></defs>"#,
        CLIP_ID, nail
    ));
    out.push('\n');
    out.push_str(&format!(
        r#"<g><path d="{}" fill="{}" stroke="{}" stroke-width="2"/><path d="{}" fill="{}" stroke="{}" stroke-width="1.5"/></g>"#,
        finger, scene.skin_tone, OUTLINE, nail, scene.nail_color, OUTLINE
    ));
    out.push('\n');
    out.push_str(&format!(r#"<g clip-path="url(#{})">"#, CLIP_ID));
    out.push('\n');
    for piece in &scene.pieces {
        out.push_str(&element(&rasterize(piece)));
        out.push('\n');
    }
    out.push_str("</g>\n</svg>\n");
    out
}
