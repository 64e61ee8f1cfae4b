//! Unweighted particle-filter approximation of the belief over hidden state.

use rand::Rng;

/// A bounded multiset of hidden-state samples.
///
/// Particles carry no individual weights; the filter approximates the
/// posterior by how often a hypothesis appears. Once the capacity is reached,
/// `add` overwrites a uniformly random slot so that the retained set remains
/// a uniform subsample of everything ever inserted.
#[derive(Debug, Clone)]
pub struct Belief<H> {
    particles: Vec<H>,
    capacity: usize,
}

impl<H: Clone> Belief<H> {
    /// Creates an empty belief that will hold at most `capacity` particles.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity.min(4096)),
            capacity: capacity.max(1),
        }
    }

    /// Inserts a particle, evicting a uniformly random one when full.
    pub fn add<R: Rng + ?Sized>(&mut self, particle: H, rng: &mut R) {
        if self.particles.len() < self.capacity {
            self.particles.push(particle);
        } else {
            let slot = rng.gen_range(0..self.particles.len());
            self.particles[slot] = particle;
        }
    }

    /// Draws one particle uniformly at random, with replacement.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&H> {
        if self.particles.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.particles.len());
        Some(&self.particles[index])
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates over the retained particles (inspection and tests).
    pub fn particles(&self) -> impl Iterator<Item = &H> {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::Belief;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn capacity_is_never_exceeded() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut belief = Belief::with_capacity(8);
        for value in 0..100u32 {
            belief.add(value, &mut rng);
        }
        assert_eq!(belief.len(), 8);
        assert_eq!(belief.capacity(), 8);
    }

    #[test]
    fn sampling_from_empty_belief_yields_none() {
        let mut rng = SmallRng::seed_from_u64(4);
        let belief: Belief<u32> = Belief::with_capacity(16);
        assert!(belief.is_empty());
        assert!(belief.sample(&mut rng).is_none());
    }

    #[test]
    fn sampling_is_deterministic_with_fixed_seed() {
        let mut fill_rng = SmallRng::seed_from_u64(9);
        let mut belief = Belief::with_capacity(32);
        for value in 0..32u32 {
            belief.add(value, &mut fill_rng);
        }

        let mut rng_a = SmallRng::seed_from_u64(77);
        let mut rng_b = SmallRng::seed_from_u64(77);
        for _ in 0..16 {
            assert_eq!(belief.sample(&mut rng_a), belief.sample(&mut rng_b));
        }
    }

    #[test]
    fn overwrite_keeps_mix_of_old_and_new_particles() {
        let mut rng = SmallRng::seed_from_u64(21);
        let mut belief = Belief::with_capacity(64);
        for value in 0..64u32 {
            belief.add(value, &mut rng);
        }
        for value in 64..128u32 {
            belief.add(value, &mut rng);
        }
        let old = belief.particles().filter(|v| **v < 64).count();
        let new = belief.particles().filter(|v| **v >= 64).count();
        // After inserting as many again, roughly half the slots should have
        // turned over; a fully stale or fully replaced set indicates biased
        // eviction.
        assert!(old > 0, "no original particles survived");
        assert!(new > 0, "no new particles were retained");
    }
}
