//! The finger and nail illustration that glitter is painted onto.

use std::path::Path;

use kurbo::{BezPath, Shape as _};

use crate::error::{GlitterError, GlitterResult};
use crate::sampling::Region;

/// Extra margin around the nail outline so glitter reaches its curved edges.
const REGION_PADDING: f64 = 5.0;

/// Sampling region used with the built-in nail.
pub const DEFAULT_REGION: Region = Region {
    x: 95.0,
    y: 120.0,
    width: 110.0,
    height: 205.0,
};

#[derive(Debug, Clone, PartialEq)]
pub struct NailSilhouette {
    pub finger: BezPath,
    /// Doubles as the clip path of the glitter layer.
    pub nail: BezPath,
    pub region: Region,
}

fn default_finger() -> BezPath {
    let mut p = BezPath::new();
    p.move_to((150.0, 450.0));
    p.line_to((50.0, 450.0));
    p.line_to((50.0, 220.0));
    p.curve_to((50.0, 120.0), (80.0, 70.0), (150.0, 70.0));
    p.curve_to((220.0, 70.0), (250.0, 120.0), (250.0, 220.0));
    p.line_to((250.0, 450.0));
    p.line_to((150.0, 450.0));
    p.close_path();
    p
}

fn default_nail() -> BezPath {
    let mut p = BezPath::new();
    p.move_to((95.0, 154.0));
    p.quad_to((150.0, 120.0), (205.0, 154.0));
    p.line_to((205.0, 291.0));
    p.quad_to((150.0, 325.0), (95.0, 291.0));
    p.close_path();
    p
}

impl Default for NailSilhouette {
    fn default() -> Self {
        NailSilhouette {
            finger: default_finger(),
            nail: default_nail(),
            region: DEFAULT_REGION,
        }
    }
}

#[derive(Debug)]
struct PathTag {
    label: String,
    d: String,
}

fn is_hidden(node: roxmltree::Node) -> bool {
    let style_hidden = node.attribute("style").map_or(false, |style| {
        let style: String = style.split_whitespace().collect();
        style.contains("display:none")
    });
    style_hidden || node.attribute("display").map(str::trim) == Some("none")
}

/// Visible `<path>` elements with path data, in document order. A path inside a hidden group
/// (such as a hidden Inkscape layer) counts as hidden.
fn path_tags(svg: &str) -> GlitterResult<Vec<PathTag>> {
    let doc = roxmltree::Document::parse(svg)
        .map_err(|e| GlitterError::asset(format!("invalid svg: {}", e)))?;
    let tags = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "path")
        .filter(|n| !n.ancestors().any(is_hidden))
        .filter_map(|n| {
            let d = n.attribute("d").map(str::trim).filter(|d| !d.is_empty())?;
            let label = n
                .attributes()
                .find(|a| {
                    a.name() == "label" && a.namespace().map_or(false, |ns| ns.contains("inkscape"))
                })
                .map(|a| a.value())
                .or_else(|| n.attribute("id"))
                .unwrap_or_default();
            Some(PathTag {
                label: label.to_lowercase(),
                d: d.to_string(),
            })
        })
        .collect();
    Ok(tags)
}

/// Chooses the finger and nail outlines: by label first, then by coordinates typical of the
/// built-in drawing, then the first two visible paths.
fn pick<'a>(tags: &'a [PathTag]) -> (Option<&'a PathTag>, Option<&'a PathTag>) {
    let mut finger = None;
    let mut nail = None;
    for t in tags {
        if t.label.contains("finger") {
            finger = Some(t);
        } else if t.label.contains("nail") {
            nail = Some(t);
        }
    }
    if finger.is_none() || nail.is_none() {
        for t in tags {
            if finger.is_none() && (t.d.contains("450") || t.d.contains("220")) {
                finger = Some(t);
            } else if nail.is_none() && (t.d.contains("154") || t.d.contains("116")) {
                nail = Some(t);
            }
        }
    }
    if (finger.is_none() || nail.is_none()) && tags.len() >= 2 {
        finger = finger.or(Some(&tags[0]));
        nail = nail.or(Some(&tags[1]));
    }
    (finger, nail)
}

fn parse_path(tag: &PathTag) -> GlitterResult<BezPath> {
    BezPath::from_svg(&tag.d).map_err(|e| {
        GlitterError::asset(format!("bad path data in {:?}: {}", tag.label, e))
    })
}

impl NailSilhouette {
    /// Reads the finger and nail outlines out of an SVG document. Whichever of the two cannot be
    /// found is taken from the built-in drawing; finding neither is an error.
    pub fn from_svg(svg: &str) -> GlitterResult<Self> {
        let tags = path_tags(svg)?;
        let (finger, nail) = pick(&tags);
        if finger.is_none() && nail.is_none() {
            return Err(GlitterError::asset("no finger or nail path found"));
        }

        let mut out = NailSilhouette::default();
        if let Some(tag) = finger {
            out.finger = parse_path(tag)?;
        }
        if let Some(tag) = nail {
            out.nail = parse_path(tag)?;
            let bbox = out.nail.bounding_box();
            out.region = Region {
                x: bbox.x0,
                y: bbox.y0,
                width: bbox.width(),
                height: bbox.height(),
            }
            .padded(REGION_PADDING);
        }
        tracing::debug!(
            finger = finger.is_some(),
            nail = nail.is_some(),
            region = ?out.region,
            "loaded nail silhouette"
        );
        Ok(out)
    }

    pub fn load(path: &Path) -> GlitterResult<Self> {
        let svg = std::fs::read_to_string(path)?;
        Self::from_svg(&svg)
    }

    /// Loads the silhouette at `path`, or the built-in one if it cannot be used.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, path = %path.display(), "could not load nail svg, using built-in");
            NailSilhouette::default()
        })
    }
}
