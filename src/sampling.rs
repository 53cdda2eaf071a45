use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::math::{add_polar_offset, pi, Point};
use crate::rand::Rng;

/// Candidates tried around an active point before it is retired. Bounds the work per point, and
/// with the finite grid guarantees termination.
pub const MAX_ATTEMPTS: usize = 30;

/// Axis-aligned rectangle in SVG user units that all sampling is confined to.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    /// True if the region has no interior (zero, negative, or non-finite extent).
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || ![self.x, self.y, self.width, self.height]
                .iter()
                .all(|v| v.is_finite())
    }

    pub fn contains(&self, (x, y): Point) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Grows the region by `padding` on every side.
    pub fn padded(&self, padding: f64) -> Region {
        Region {
            x: self.x - padding,
            y: self.y - padding,
            width: self.width + 2.0 * padding,
            height: self.height + 2.0 * padding,
        }
    }
}

/// Which point distribution to scatter glitter with.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Distribution {
    /// Independent uniform points; pieces may overlap freely.
    #[default]
    Uniform,
    /// Blue-noise points with a guaranteed minimum spacing.
    PoissonDisc,
}

/// A point sampler configured for one glitter entry.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Sampler {
    Uniform { count: usize },
    PoissonDisc { min_radius: f64 },
}

impl Sampler {
    pub fn sample(&self, region: &Region, rng: &mut Rng) -> Vec<Point> {
        if region.is_degenerate() {
            return Vec::new();
        }
        match *self {
            Sampler::Uniform { count } => uniform(region, count, rng),
            Sampler::PoissonDisc { min_radius } => poisson_disc(region, min_radius, rng),
        }
    }
}

fn uniform(region: &Region, count: usize, rng: &mut Rng) -> Vec<Point> {
    (0..count)
        .map(|_| {
            let u = rng.rnd();
            let v = rng.rnd();
            (region.x + u * region.width, region.y + v * region.height)
        })
        .collect()
}

/// Bridson-style dart throwing over a background grid.
fn poisson_disc(region: &Region, min_radius: f64, rng: &mut Rng) -> Vec<Point> {
    if !(min_radius > 0.0 && min_radius.is_finite()) {
        return Vec::new();
    }
    let mut grid = Grid::new(region, min_radius);
    let r = grid.min_radius();

    // Seed from the middle of the region so growth reaches every edge.
    let first = (
        region.x + rng.uniform(0.3, 0.7) * region.width,
        region.y + rng.uniform(0.3, 0.7) * region.height,
    );
    grid.test_and_add(first);
    let mut points = vec![first];
    let mut active = vec![0usize];

    while !active.is_empty() {
        let slot = rng.below(active.len());
        let origin = points[active[slot]];
        let mut spawned = false;
        for _ in 0..MAX_ATTEMPTS {
            let theta = rng.uniform(0.0, pi(2.0));
            let radius = rng.uniform(r, 2.0 * r);
            let candidate = add_polar_offset(origin, theta, radius);
            if region.contains(candidate) && grid.test_and_add(candidate) {
                active.push(points.len());
                points.push(candidate);
                spawned = true;
                break;
            }
        }
        if !spawned {
            active.swap_remove(slot);
        }
    }
    points
}

/// Minimum Poisson spacing for pieces `size_px` wide at the given density. Denser glitter packs
/// tighter, bigger glitter spreads out. Always positive for positive `size_px`.
pub fn poisson_min_radius(size_px: f64, density: u32, density_max: u32) -> f64 {
    let max = f64::from(density_max.max(1));
    let base = size_px * 0.8;
    let density_factor = f64::max(0.3, (max - f64::from(density)) / max);
    base + base * density_factor * 2.0
}
