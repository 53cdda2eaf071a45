//! Maps glitter density and physical size to on-screen piece counts.
//!
//! Screen scale is anchored to the real-world width of the nail: the nail region's width in SVG
//! units spans [`NAIL_WIDTH_INCHES`].

use crate::math::clamp;

/// Typical nail width (9 mm).
pub const NAIL_WIDTH_INCHES: f64 = 0.354;

/// Rendered pieces are kept within this pixel range so that no glitter is invisible or swallows
/// the nail.
pub const MIN_SIZE_PX: f64 = 0.5;
pub const MAX_SIZE_PX: f64 = 30.0;

/// Extra pieces generated to make up for the ones the silhouette clip discards.
const OVERSAMPLE: f64 = 1.5;
const PIECES_PER_DENSITY: f64 = 3.2;

/// SVG units per inch for a nail region `region_width` units wide. Zero for a degenerate width.
pub fn px_per_inch(region_width: f64) -> f64 {
    if region_width > 0.0 && region_width.is_finite() {
        region_width / NAIL_WIDTH_INCHES
    } else {
        0.0
    }
}

/// Rendered piece size, clamped to `[MIN_SIZE_PX, MAX_SIZE_PX]`.
pub fn size_px(size_inches: f64, region_width: f64) -> f64 {
    clamp(
        size_inches * px_per_inch(region_width),
        MIN_SIZE_PX,
        MAX_SIZE_PX,
    )
}

/// Number of pieces to scatter for one glitter entry.
///
/// Larger pieces need fewer of them to look equally dense, so the count falls off with piece
/// area. Non-positive or non-finite sizes and degenerate regions produce no pieces.
pub fn count_for(density: u32, size_inches: f64, region_width: f64) -> usize {
    let ppi = px_per_inch(region_width);
    if !(size_inches > 0.0 && size_inches.is_finite()) || ppi == 0.0 {
        return 0;
    }
    let s = f64::max(MIN_SIZE_PX, size_inches * ppi);
    let size_factor = 16.0 / (s * s + 6.0).powf(0.6);
    let count = (f64::from(density) * PIECES_PER_DENSITY * size_factor * OVERSAMPLE).round();
    if count.is_finite() && count > 0.0 {
        count as usize
    } else {
        0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mix::AVAILABLE_SIZES;

    #[test]
    fn test_px_per_inch() {
        assert_eq!(px_per_inch(0.354), 1.0);
        assert_eq!(px_per_inch(0.0), 0.0);
        assert_eq!(px_per_inch(-3.0), 0.0);
        assert_eq!(px_per_inch(f64::NAN), 0.0);
    }

    #[test]
    fn test_size_px() {
        assert_eq!(size_px(0.035, 110.0), 10.875706214689266);
        assert_eq!(size_px(0.0001, 110.0), MIN_SIZE_PX);
        assert_eq!(size_px(1.0, 110.0), MAX_SIZE_PX);
        assert_eq!(size_px(0.035, 0.0), MIN_SIZE_PX);
    }

    #[test]
    fn test_count_values() {
        assert_eq!(count_for(50, 0.035, 110.0), 213);
        assert_eq!(count_for(100, 0.008, 110.0), 1714);
        assert_eq!(count_for(100, 0.094, 110.0), 133);
        assert_eq!(count_for(1, 0.094, 110.0), 1);
        let by_size: Vec<usize> = AVAILABLE_SIZES
            .iter()
            .map(|&s| count_for(50, s, 110.0))
            .collect();
        assert_eq!(by_size, vec![857, 523, 310, 213, 182, 109, 83, 67]);
    }

    #[test]
    fn test_count_monotone_in_density() {
        for &size in AVAILABLE_SIZES {
            let mut last = 0;
            for density in 1..=200 {
                let count = count_for(density, size, 110.0);
                assert!(count >= last, "size {} density {}", size, density);
                last = count;
            }
        }
    }

    #[test]
    fn test_count_non_increasing_in_size() {
        for density in [1, 20, 50, 100, 200] {
            let mut last = usize::MAX;
            for step in 1..=400 {
                let size = f64::from(step) * 0.0005;
                let count = count_for(density, size, 110.0);
                assert!(count <= last, "density {} size {}", density, size);
                last = count;
            }
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(count_for(50, 0.0, 110.0), 0);
        assert_eq!(count_for(50, -0.035, 110.0), 0);
        assert_eq!(count_for(50, f64::NAN, 110.0), 0);
        assert_eq!(count_for(50, f64::INFINITY, 110.0), 0);
        assert_eq!(count_for(50, 0.035, 0.0), 0);
        assert_eq!(count_for(0, 0.035, 110.0), 0);
    }
}
