use rand::Rng;

/// Randomness seam for the visual effects: layer scatter, per-layer
/// angles and rotations, and the backdrop texture shuffle all draw from
/// this so tests can substitute a deterministic source.
pub(crate) trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn next_f32(&mut self) -> f32;
}

#[derive(Debug, Default)]
pub(crate) struct ThreadRandom;

impl ThreadRandom {
    pub(crate) fn new() -> Self {
        Self
    }
}

impl RandomSource for ThreadRandom {
    fn next_f32(&mut self) -> f32 {
        rand::thread_rng().r#gen::<f32>()
    }
}

/// xorshift64-backed source for reproducible effect runs in tests.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct XorShiftRandom {
    state: u64,
}

#[cfg(test)]
impl XorShiftRandom {
    pub(crate) fn seeded(seed: u64) -> Self {
        Self {
            // Avoid the all-zero fixed point.
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15) | 1,
        }
    }
}

#[cfg(test)]
impl RandomSource for XorShiftRandom {
    fn next_f32(&mut self) -> f32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        // Top 24 bits give a uniform mantissa in [0, 1).
        (self.state >> 40) as f32 / (1u32 << 24) as f32
    }
}

/// Fisher-Yates over indices, used for the per-mount texture shuffle.
pub(crate) fn shuffled_indices(count: usize, rng: &mut dyn RandomSource) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..count).collect();
    for i in (1..count).rev() {
        let j = (rng.next_f32() * (i + 1) as f32) as usize;
        indices.swap(i, j.min(i));
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xorshift_values_stay_in_unit_interval() {
        let mut rng = XorShiftRandom::seeded(7);
        for _ in 0..10_000 {
            let value = rng.next_f32();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn same_seed_reproduces_the_sequence() {
        let mut left = XorShiftRandom::seeded(42);
        let mut right = XorShiftRandom::seeded(42);
        for _ in 0..100 {
            assert_eq!(left.next_f32(), right.next_f32());
        }
    }

    #[test]
    fn shuffled_indices_is_a_permutation() {
        let mut rng = XorShiftRandom::seeded(3);
        let mut shuffled = shuffled_indices(6, &mut rng);
        shuffled.sort_unstable();
        assert_eq!(shuffled, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn different_seeds_usually_shuffle_differently() {
        let mut a = XorShiftRandom::seeded(1);
        let mut b = XorShiftRandom::seeded(999);
        let left = shuffled_indices(6, &mut a);
        let right = shuffled_indices(6, &mut b);
        assert_ne!(left, right);
    }
}
