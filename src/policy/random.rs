//! Random policy for testing and baselines.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::trait_::Policy;
use crate::spaces::ActionSpace;
use crate::types::{AttentionAction, Observation};

/// Uniformly random actions drawn from the nominal action space.
///
/// Stops with probability one half at each step, so episodes are short.
/// Used for sanity checks and as a chance-level baseline.
pub struct RandomPolicy {
    space: ActionSpace,
    rng: StdRng,
}

impl RandomPolicy {
    /// Creates a new random policy.
    ///
    /// # Arguments
    ///
    /// * `num_categories` - Size of the class-guess range
    /// * `seed` - RNG seed for reproducible rollouts
    pub fn new(num_categories: usize, seed: u64) -> Self {
        Self {
            space: ActionSpace::new(num_categories),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn select_action(&mut self, _observation: &Observation, _step: u32) -> AttentionAction {
        self.space.sample(&mut self.rng)
    }

    fn name(&self) -> &str {
        "random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PixelArray;

    #[test]
    fn random_actions_in_space() {
        let mut policy = RandomPolicy::new(6, 1);
        let obs = PixelArray::zeros(4, 4, 3);
        let space = ActionSpace::new(6);
        for step in 0..100 {
            assert!(space.contains(&policy.select_action(&obs, step)));
        }
    }

    #[test]
    fn same_seed_same_actions() {
        let obs = PixelArray::zeros(2, 2, 3);
        let mut a = RandomPolicy::new(10, 7);
        let mut b = RandomPolicy::new(10, 7);
        for step in 0..10 {
            assert_eq!(a.select_action(&obs, step), b.select_action(&obs, step));
        }
    }
}
