//! Policy trait for the glimpse environment.

use crate::types::{AttentionAction, Observation};

/// A policy that picks the next attention action from the current glimpse.
pub trait Policy: Send {
    /// Selects the action to submit.
    ///
    /// # Arguments
    ///
    /// * `observation` - The latest glimpse (from `reset` or the previous step)
    /// * `step` - Steps already taken in this episode
    fn select_action(&mut self, observation: &Observation, step: u32) -> AttentionAction;

    /// Returns a human-readable name for this policy.
    fn name(&self) -> &str;
}
