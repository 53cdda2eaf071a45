use crate::math::{dist_sq, Point};
use crate::sampling::Region;

/// Upper bound on background grid cells. Radii small enough to exceed this are widened, which
/// keeps every accepted pair at least the requested distance apart.
pub const MAX_GRID_CELLS: usize = 1 << 22;

/// Half-width, in cells, of the neighbourhood scanned for conflicts.
const REACH: isize = 2;

struct Indexer {
    start: f64,
    cell: f64,
    len: usize,
}

impl Indexer {
    fn new(start: f64, extent: f64, cell: f64) -> Self {
        let len = ((extent / cell).ceil() as usize).max(1);
        Indexer { start, cell, len }
    }

    fn index(&self, value: f64) -> usize {
        let index = f64::floor((value - self.start) / self.cell) as isize;
        index.clamp(0, self.len as isize - 1) as usize
    }
}

/// Uniform background grid for Poisson-disc sampling.
///
/// Cells are `min_radius / sqrt(2)` wide, so each holds at most one accepted point and a 5×5
/// neighbourhood covers every point that could be closer than `min_radius`.
pub struct Grid {
    ix: Indexer,
    iy: Indexer,
    min_radius: f64,
    cells: Vec<Option<Point>>,
}

impl Grid {
    pub fn new(region: &Region, min_radius: f64) -> Self {
        let min_radius = widen_radius(region, min_radius);
        let cell = min_radius / std::f64::consts::SQRT_2;
        let ix = Indexer::new(region.x, region.width, cell);
        let iy = Indexer::new(region.y, region.height, cell);
        let cells = vec![None; ix.len * iy.len];
        Grid {
            ix,
            iy,
            min_radius,
            cells,
        }
    }

    /// The radius actually enforced, which may exceed the requested one for tiny radii.
    pub fn min_radius(&self) -> f64 {
        self.min_radius
    }

    /// Tests whether `point` is at least `min_radius` from every point already in the grid, and
    /// adds it if so. Returns whether the point was added.
    pub fn test_and_add(&mut self, point: Point) -> bool {
        let (cx, cy) = (self.ix.index(point.0), self.iy.index(point.1));
        let r2 = self.min_radius * self.min_radius;
        for gy in cy as isize - REACH..=cy as isize + REACH {
            for gx in cx as isize - REACH..=cx as isize + REACH {
                if let Some(other) = self.get(gx, gy) {
                    if dist_sq(point, other) < r2 {
                        return false;
                    }
                }
            }
        }
        // OK: no conflicts.
        let slot = cy * self.ix.len + cx;
        if self.cells[slot].is_some() {
            return false;
        }
        self.cells[slot] = Some(point);
        true
    }

    fn get(&self, gx: isize, gy: isize) -> Option<Point> {
        if gx < 0 || gy < 0 || gx as usize >= self.ix.len || gy as usize >= self.iy.len {
            return None;
        }
        self.cells[gy as usize * self.ix.len + gx as usize]
    }
}

fn widen_radius(region: &Region, min_radius: f64) -> f64 {
    // cells = (w / (r / sqrt2)) * (h / (r / sqrt2)) = 2wh / r^2
    let floor = (2.0 * region.width * region.height / MAX_GRID_CELLS as f64).sqrt();
    if min_radius < floor {
        tracing::warn!(
            requested = min_radius,
            widened = floor,
            "poisson radius too small for region; widening"
        );
        floor
    } else {
        min_radius
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn region(width: f64, height: f64) -> Region {
        Region {
            x: 10.0,
            y: 20.0,
            width,
            height,
        }
    }

    #[test]
    fn test_rejects_close_points() {
        let mut grid = Grid::new(&region(100.0, 100.0), 10.0);
        assert!(grid.test_and_add((50.0, 50.0)));
        assert!(!grid.test_and_add((55.0, 55.0)));
        assert!(!grid.test_and_add((59.9, 50.0)));
        assert!(grid.test_and_add((60.0, 50.0)));
        assert!(grid.test_and_add((50.0, 40.0)));
    }

    #[test]
    fn test_edges_clamp_into_grid() {
        let mut grid = Grid::new(&region(100.0, 100.0), 10.0);
        assert!(grid.test_and_add((10.0, 20.0)));
        assert!(grid.test_and_add((109.99, 119.99)));
        assert!(!grid.test_and_add((11.0, 21.0)));
    }

    #[test]
    fn test_tiny_radius_is_widened() {
        let grid = Grid::new(&region(1000.0, 1000.0), 1e-6);
        assert!(grid.min_radius() > 1e-6);
        let cells = grid.ix.len * grid.iy.len;
        assert!(cells as f64 <= MAX_GRID_CELLS as f64 * 1.01, "{} cells", cells);
    }

    #[test]
    fn test_near_zero_region_has_one_cell() {
        let grid = Grid::new(&region(1e-9, 1e-9), 5.0);
        assert_eq!((grid.ix.len, grid.iy.len), (1, 1));
    }
}
