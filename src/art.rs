use crate::color::Rgb;
use crate::density::{count_for, size_px};
use crate::math::pi;
use crate::mix::{GlitterEntry, MixState, Shape};
use crate::nail::NailSilhouette;
use crate::rand::Rng;
use crate::sampling::{poisson_min_radius, Distribution, Region, Sampler};

mod paint;
pub mod svg;

pub use paint::{draw, Canvas};

/// Poisson points are nudged by up to this fraction of the minimum spacing so the pattern does
/// not look machined.
const POSITION_JITTER: f64 = 0.15;
const LIGHTNESS_JITTER: f64 = 0.08;
const SATURATION_JITTER: f64 = 0.06;
const BORDER_SHADE: f64 = -0.25;

/// One glitter piece, ready to rasterize. Coordinates are SVG user units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderablePiece {
    pub shape: Shape,
    pub center: (f64, f64),
    pub size_px: f64,
    /// Radians.
    pub rotation: f64,
    pub fill: Rgb,
    pub border: Rgb,
    /// Paint order across the whole mix, in `[0, 1)`. Lower is painted first.
    pub z_order: f64,
}

/// Places every piece of one glitter entry.
///
/// The entry's seed fully determines the result: the same entry, region, and distribution give
/// the same pieces every time. Entries with no positive size produce nothing.
pub fn place_entry(
    entry: &GlitterEntry,
    region: &Region,
    distribution: Distribution,
    density_max: u32,
) -> Vec<RenderablePiece> {
    if !(entry.size_in > 0.0 && entry.size_in.is_finite()) {
        return Vec::new();
    }
    let mut rng = Rng::from_seed(entry.seed);
    let size_px = size_px(entry.size_in, region.width);

    let positions = match distribution {
        Distribution::Uniform => {
            let count = count_for(entry.density, entry.size_in, region.width);
            Sampler::Uniform { count }.sample(region, &mut rng)
        }
        Distribution::PoissonDisc => {
            let min_radius = poisson_min_radius(size_px, entry.density, density_max);
            let points = Sampler::PoissonDisc { min_radius }.sample(region, &mut rng);
            let amount = min_radius * POSITION_JITTER;
            points
                .into_iter()
                .map(|(x, y)| {
                    let dx = (rng.rnd() - 0.5) * 2.0 * amount;
                    let dy = (rng.rnd() - 0.5) * 2.0 * amount;
                    (x + dx, y + dy)
                })
                .collect()
        }
    };

    let pieces: Vec<RenderablePiece> = positions
        .into_iter()
        .map(|center| {
            let rotation = rng.rnd() * pi(2.0);
            let z_order = rng.rnd();
            let dl = (rng.rnd() - 0.5) * LIGHTNESS_JITTER;
            let ds = (rng.rnd() - 0.5) * SATURATION_JITTER;
            let fill = entry.color.jitter(dl, ds);
            RenderablePiece {
                shape: entry.shape,
                center,
                size_px,
                rotation,
                fill,
                border: fill.shade(BORDER_SHADE),
                z_order,
            }
        })
        .collect();
    tracing::debug!(
        id = %entry.id,
        seed = entry.seed,
        pieces = pieces.len(),
        "placed glitter"
    );
    pieces
}

/// Places all entries and interleaves their pieces by z-order.
#[tracing::instrument(skip(entries), fields(glitters = entries.len()))]
pub fn place_mix(
    entries: &[GlitterEntry],
    region: &Region,
    distribution: Distribution,
    density_max: u32,
) -> Vec<RenderablePiece> {
    let mut pieces: Vec<RenderablePiece> = entries
        .iter()
        .flat_map(|entry| place_entry(entry, region, distribution, density_max))
        .collect();
    // Stable, so equal z-orders keep mix order.
    pieces.sort_by(|a, b| a.z_order.total_cmp(&b.z_order));
    pieces
}

/// Everything needed to paint one nail.
#[derive(Debug, Clone)]
pub struct Scene {
    pub silhouette: NailSilhouette,
    pub skin_tone: Rgb,
    pub nail_color: Rgb,
    pub pieces: Vec<RenderablePiece>,
}

impl Scene {
    pub fn new(state: &MixState, silhouette: NailSilhouette, distribution: Distribution) -> Self {
        let pieces = place_mix(
            state.entries(),
            &silhouette.region,
            distribution,
            state.density_max(),
        );
        Scene {
            silhouette,
            skin_tone: state.skin_tone(),
            nail_color: state.nail_color(),
            pieces,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::nail::DEFAULT_REGION;
    use hex_literal::hex;

    fn entry(seed: u32, shape: Shape, size_in: f64, density: u32) -> GlitterEntry {
        GlitterEntry {
            id: format!("g{}", seed),
            name: "test".into(),
            shape,
            size_in,
            color: Rgb(hex!("e2c636")),
            density,
            seed,
        }
    }

    #[test]
    fn test_uniform_placement() {
        let g = entry(12345, Shape::Hexagon, 0.035, 50);
        let pieces = place_entry(&g, &DEFAULT_REGION, Distribution::Uniform, 100);
        assert_eq!(pieces.len(), 213);

        let first = pieces[0];
        assert_eq!(first.center, (202.7701094537042, 182.88421422243118));
        assert_eq!(first.rotation, 3.241929224873586);
        assert_eq!(first.z_order, 0.2543310367036611);
        assert_eq!(first.size_px, 10.875706214689266);
        assert_eq!(first.shape, Shape::Hexagon);
        assert_eq!(first.fill, g.color.jitter(0.0010466397926211356, 0.017650642809458075));
        assert_eq!(first.border, first.fill.shade(-0.25));

        for p in &pieces {
            assert!(DEFAULT_REGION.contains(p.center));
            assert!((0.0..pi(2.0)).contains(&p.rotation));
            assert!((0.0..1.0).contains(&p.z_order));
        }
    }

    #[test]
    fn test_poisson_placement() {
        let g = entry(12345, Shape::Circle, 0.035, 50);
        let pieces = place_entry(&g, &DEFAULT_REGION, Distribution::PoissonDisc, 100);
        assert_eq!(pieces.len(), 49);
        // Jitter may push pieces past the region by at most 15% of the spacing.
        let slack = poisson_min_radius(10.875706214689266, 50, 100) * POSITION_JITTER;
        let grown = DEFAULT_REGION.padded(slack + 1e-9);
        assert!(pieces.iter().all(|p| grown.contains(p.center)));
    }

    #[test]
    fn test_deterministic() {
        let g = entry(12345, Shape::Slice, 0.035, 50);
        for distribution in [Distribution::Uniform, Distribution::PoissonDisc] {
            let runs: Vec<_> = (0..3)
                .map(|_| place_entry(&g, &DEFAULT_REGION, distribution, 100))
                .collect();
            assert_eq!(runs[0], runs[1]);
            assert_eq!(runs[1], runs[2]);
        }
    }

    #[test]
    fn test_zero_size_places_nothing() {
        for distribution in [Distribution::Uniform, Distribution::PoissonDisc] {
            for size in [0.0, -0.01, f64::NAN] {
                let g = entry(1, Shape::Square, size, 100);
                assert!(place_entry(&g, &DEFAULT_REGION, distribution, 100).is_empty());
            }
        }
    }

    #[test]
    fn test_degenerate_region_places_nothing() {
        let region = Region {
            x: 95.0,
            y: 120.0,
            width: 0.0,
            height: 205.0,
        };
        let g = entry(1, Shape::Square, 0.035, 100);
        assert!(place_entry(&g, &region, Distribution::Uniform, 100).is_empty());
        assert!(place_entry(&g, &region, Distribution::PoissonDisc, 100).is_empty());
    }

    #[test]
    fn test_mix_is_interleaved_by_z() {
        let mix = [
            entry(3, Shape::Circle, 0.062, 40),
            entry(4, Shape::Square, 0.040, 60),
            entry(5, Shape::Slice, 0.0, 60),
        ];
        let pieces = place_mix(&mix, &DEFAULT_REGION, Distribution::Uniform, 100);
        let expected = count_for(40, 0.062, DEFAULT_REGION.width)
            + count_for(60, 0.040, DEFAULT_REGION.width);
        assert_eq!(pieces.len(), expected);
        assert!(pieces.windows(2).all(|w| w[0].z_order <= w[1].z_order));

        // Pieces of both entries appear in the first half.
        let half = &pieces[..pieces.len() / 2];
        assert!(half.iter().any(|p| p.shape == Shape::Circle));
        assert!(half.iter().any(|p| p.shape == Shape::Square));
    }

    #[test]
    fn test_entries_are_independent() {
        let a = entry(3, Shape::Circle, 0.062, 40);
        let b = entry(4, Shape::Square, 0.040, 60);
        let alone = place_entry(&b, &DEFAULT_REGION, Distribution::Uniform, 100);
        let together = place_mix(&[a, b.clone()], &DEFAULT_REGION, Distribution::Uniform, 100);
        let mut from_mix: Vec<_> = together
            .into_iter()
            .filter(|p| p.shape == Shape::Square)
            .collect();
        let mut alone_sorted = alone;
        alone_sorted.sort_by(|a, b| a.z_order.total_cmp(&b.z_order));
        from_mix.sort_by(|a, b| a.z_order.total_cmp(&b.z_order));
        assert_eq!(from_mix, alone_sorted);
    }

    #[test]
    fn test_scene_colors() {
        let palette = crate::color::ColorDb::from_bundle();
        let mut state = MixState::with_palette(&palette, 100);
        state.push(entry(9, Shape::Hexagon, 0.025, 30));
        let scene = Scene::new(&state, NailSilhouette::default(), Distribution::Uniform);
        assert_eq!(scene.skin_tone, state.skin_tone());
        assert_eq!(scene.nail_color, state.skin_tone().shade(0.05));
        assert_eq!(scene.pieces.len(), count_for(30, 0.025, DEFAULT_REGION.width));
    }
}
