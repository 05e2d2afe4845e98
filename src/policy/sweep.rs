//! Deterministic zoom-in sweep.

use super::trait_::Policy;
use crate::types::{AttentionAction, Focus, Observation};

/// Looks at the image center, zooming in linearly, then stops with a fixed guess.
///
/// Step `t` of `n` uses `zoom = (t + 1) / n`; the `n`-th action stops the
/// episode. With `guess` set to the most frequent class this is the
/// majority-class baseline.
pub struct SweepPolicy {
    steps: u32,
    guess: usize,
}

impl SweepPolicy {
    /// Creates a sweep over `steps` glimpses (at least one).
    pub fn new(steps: u32, guess: usize) -> Self {
        Self {
            steps: steps.max(1),
            guess,
        }
    }
}

impl Policy for SweepPolicy {
    fn select_action(&mut self, _observation: &Observation, step: u32) -> AttentionAction {
        let zoom = f64::from((step + 1).min(self.steps)) / f64::from(self.steps);
        let focus = Focus::new(0.0, 0.0, zoom);
        // a step-cap cut scores the guess of the last action
        AttentionAction::new(step + 1 >= self.steps, self.guess, focus)
    }

    fn name(&self) -> &str {
        "sweep"
    }
}
