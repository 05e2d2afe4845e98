//! Terminal correctness reward.

/// Computes rewards for the glimpse environment.
pub struct RewardComputer;

impl RewardComputer {
    /// Bonus granted for a correct classification at the terminal step.
    pub const CORRECT: f64 = 1.0;

    /// Reward for one step.
    ///
    /// `1.0` only when the episode ends on this step and the guess matches the
    /// label; every other step yields `0.0`. Guesses outside the category
    /// range simply never match.
    pub fn compute(done: bool, class_guess: usize, label: usize) -> f64 {
        if done && class_guess == label {
            Self::CORRECT
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_terminal_guess_is_rewarded() {
        assert_eq!(RewardComputer::compute(true, 4, 4), 1.0);
    }

    #[test]
    fn wrong_terminal_guess_is_zero() {
        assert_eq!(RewardComputer::compute(true, 3, 4), 0.0);
    }

    #[test]
    fn non_terminal_steps_are_zero_even_when_correct() {
        assert_eq!(RewardComputer::compute(false, 4, 4), 0.0);
    }

    #[test]
    fn out_of_range_guess_is_always_wrong() {
        assert_eq!(RewardComputer::compute(true, usize::MAX, 4), 0.0);
    }
}
