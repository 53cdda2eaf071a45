// Mixing increment added to the state on every draw. Must be odd so that the state walks the
// full 2^32 cycle.
const INC: u32 = 0x6d2b_79f5;

/// Deterministic pseudo-random stream driven by a 32-bit seed.
///
/// Every glitter entry owns one of these for the duration of a render; two generators built from
/// the same seed yield the same infinite sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Rng {
    state: u32,
}

impl Rng {
    pub fn from_seed(seed: u32) -> Rng {
        Rng { state: seed }
    }

    /// Picks a random value uniformly distributed between `0.0` (inclusive) and `1.0` (exclusive).
    pub fn rnd(&mut self) -> f64 {
        // Advance internal state.
        self.state = self.state.wrapping_add(INC);
        let s = self.state;
        // Avalanche the new state through two xorshift-multiply rounds and a final xorshift.
        let mut t = (s ^ (s >> 15)).wrapping_mul(1 | s);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t)) ^ t;
        2.0f64.powi(-32) * f64::from(t ^ (t >> 14))
    }

    /// Picks a random value uniformly distributed between `min` (inclusive) and `max` (exclusive).
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        self.rnd() * (max - min) + min
    }

    /// Picks an integer uniformly distributed in `0..n`. Returns `0` when `n` is zero.
    pub fn below(&mut self, n: usize) -> usize {
        ((self.rnd() * n as f64) as usize).min(n.saturating_sub(1))
    }

    /// Chooses an item from `items` at a uniformly random index.
    ///
    /// # Panics
    ///
    /// Panics if `items.is_empty()`.
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        items.get(self.below(items.len())).expect("no items")
    }
}
