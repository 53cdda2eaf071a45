//! Catalog of glitter combinations that actually exist as products.
//!
//! When the "valid glitters only" filter is on, every entry in the mix must match one
//! `(color, shape, size)` record here. An empty catalog restricts nothing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::{normalize_name, ColorDb, Rgb};
use crate::error::{GlitterError, GlitterResult};
use crate::mix::{GlitterEntry, Shape};

/// Sizes closer than this are the same catalog size.
const SIZE_TOLERANCE: f64 = 1e-4;

/// One record as it appears in the catalog JSON.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CatalogRecord {
    pub color: String,
    pub glitter_shape: String,
    pub glitter_size: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Record {
    color: String,
    shape: Shape,
    size_in: f64,
}

/// A concrete glitter choice, as offered by "add random".
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Combination {
    pub color: Rgb,
    pub shape: Shape,
    pub size_in: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    records: Vec<Record>,
}

impl Catalog {
    pub fn from_records(records: impl IntoIterator<Item = CatalogRecord>) -> Self {
        let records = records
            .into_iter()
            .filter_map(|r| {
                let shape = Shape::from_name(&r.glitter_shape)?;
                let size_in: f64 = r.glitter_size.trim().parse().ok()?;
                size_in.is_finite().then(|| Record {
                    color: normalize_name(&r.color),
                    shape,
                    size_in,
                })
            })
            .collect();
        Catalog { records }
    }

    pub fn from_json(json: &str) -> GlitterResult<Self> {
        let records: Vec<CatalogRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    pub fn load(path: &Path) -> GlitterResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            GlitterError::catalog(format!("could not read {}: {}", path.display(), e))
        })?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            combinations = catalog.len(),
            path = %path.display(),
            "loaded valid glitter combinations"
        );
        Ok(catalog)
    }

    /// Loads the catalog at `path`, falling back to an empty (unrestricted) catalog on failure.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not load valid glitters data");
            Catalog::default()
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn for_color<'a>(&'a self, color_name: &str) -> impl Iterator<Item = &'a Record> + 'a {
        let wanted = normalize_name(color_name);
        self.records.iter().filter(move |r| r.color == wanted)
    }

    pub fn is_valid(&self, color_name: &str, shape: Shape, size_in: f64) -> bool {
        self.is_empty()
            || self
                .for_color(color_name)
                .any(|r| r.shape == shape && same_size(r.size_in, size_in))
    }

    /// Valid sizes for a color, ascending and without duplicates.
    pub fn sizes_for(&self, color_name: &str) -> Vec<f64> {
        let mut sizes: Vec<f64> = self.for_color(color_name).map(|r| r.size_in).collect();
        sizes.sort_by(f64::total_cmp);
        sizes.dedup_by(|a, b| same_size(*a, *b));
        sizes
    }

    /// Valid shapes for a color at a size, in catalog order.
    pub fn shapes_for(&self, color_name: &str, size_in: f64) -> Vec<Shape> {
        let mut shapes = Vec::new();
        for r in self.for_color(color_name) {
            if same_size(r.size_in, size_in) && !shapes.contains(&r.shape) {
                shapes.push(r.shape);
            }
        }
        shapes
    }

    /// Every record whose color is one of the palette's presets.
    pub fn combinations(&self, palette: &ColorDb) -> Vec<Combination> {
        self.records
            .iter()
            .filter_map(|r| {
                let preset = palette.preset_by_name(&r.color)?;
                Some(Combination {
                    color: preset.color,
                    shape: r.shape,
                    size_in: r.size_in,
                })
            })
            .collect()
    }
}

fn same_size(a: f64, b: f64) -> bool {
    (a - b).abs() < SIZE_TOLERANCE
}

fn nearest(candidates: &[f64], target: f64) -> Option<f64> {
    candidates
        .iter()
        .copied()
        .reduce(|best, c| if (c - target).abs() < (best - target).abs() { c } else { best })
}

/// Moves `entry` to the closest valid combination for its color: closest size first, then the
/// entry's own shape if that size offers it. Returns the entry unchanged when the catalog has
/// nothing for its color.
pub fn reconcile(entry: &GlitterEntry, catalog: &Catalog, palette: &ColorDb) -> GlitterEntry {
    let name = entry.color_name(palette);
    let mut best: Option<(f64, &Record)> = None;
    for r in catalog.for_color(name) {
        let shape_miss = if r.shape == entry.shape { 0.0 } else { 1.0 };
        let score = (r.size_in - entry.size_in).abs() * 1000.0 + shape_miss;
        if best.map_or(true, |(s, _)| score < s) {
            best = Some((score, r));
        }
    }
    let mut out = entry.clone();
    if let Some((_, r)) = best {
        out.size_in = r.size_in;
        out.shape = r.shape;
    }
    out
}

/// Changes `entry`'s color, then repairs size and shape in that priority order so the result
/// stays valid under `catalog`.
pub fn recolor(
    entry: &GlitterEntry,
    color: Rgb,
    catalog: &Catalog,
    palette: &ColorDb,
) -> GlitterEntry {
    let mut out = entry.clone();
    out.color = color;
    if catalog.is_empty() {
        return out;
    }
    let name = out.color_name(palette).to_string();

    let sizes = catalog.sizes_for(&name);
    if !sizes.iter().any(|&s| same_size(s, out.size_in)) {
        if let Some(size) = nearest(&sizes, out.size_in) {
            out.size_in = size;
        }
    }

    fix_shape(&mut out, catalog, &name);
    out
}

/// Snaps a requested size to the closest one the catalog offers for `entry`'s color, and then
/// repairs the shape if the new size does not come in it.
pub fn resize(
    entry: &GlitterEntry,
    size_in: f64,
    catalog: &Catalog,
    palette: &ColorDb,
) -> GlitterEntry {
    let mut out = entry.clone();
    let name = out.color_name(palette).to_string();
    out.size_in = nearest(&catalog.sizes_for(&name), size_in).unwrap_or(size_in);
    fix_shape(&mut out, catalog, &name);
    out
}

fn fix_shape(entry: &mut GlitterEntry, catalog: &Catalog, color_name: &str) {
    let shapes = catalog.shapes_for(color_name, entry.size_in);
    if let Some(&first) = shapes.first() {
        if !shapes.contains(&entry.shape) {
            entry.shape = first;
        }
    }
}
