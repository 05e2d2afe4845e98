//! Evaluation metrics for the glimpse environment.
//!
//! Runs a policy for a number of episodes and aggregates classification
//! accuracy and episode-length statistics.

use std::fmt;

use crate::environment::GlimpseEnv;
use crate::error::Result;
use crate::policy::Policy;

/// Aggregated evaluation metrics over multiple episodes.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMetrics {
    /// Fraction of episodes ending in a correct classification.
    pub accuracy: f64,
    /// Mean number of steps per episode.
    pub mean_episode_length: f64,
    /// Mean total reward per episode.
    pub mean_reward: f64,
    /// Episodes ended by the step cap rather than by the policy.
    pub forced_terminations: usize,
    /// Number of episodes evaluated.
    pub n_episodes: usize,
}

/// Tracks per-episode statistics during evaluation.
#[derive(Debug, Default)]
struct EpisodeStats {
    steps: u32,
    total_reward: f64,
    correct: bool,
    forced: bool,
}

impl EvaluationMetrics {
    /// Evaluates a policy over multiple episodes and returns aggregated metrics.
    ///
    /// Errors from `reset` or `step` abort the evaluation.
    ///
    /// # Arguments
    ///
    /// * `env` - The environment to evaluate in
    /// * `policy` - The policy to evaluate
    /// * `n_episodes` - Number of episodes to run
    pub fn evaluate(
        env: &mut GlimpseEnv,
        policy: &mut dyn Policy,
        n_episodes: usize,
    ) -> Result<Self> {
        let mut all_stats = Vec::with_capacity(n_episodes);

        for _ in 0..n_episodes {
            let mut obs = env.reset()?;
            let mut stats = EpisodeStats::default();

            loop {
                let action = policy.select_action(&obs, stats.steps);
                let result = env.step(action)?;

                stats.steps = result.step_count;
                stats.total_reward += result.reward;
                obs = result.observation;

                if result.done {
                    stats.correct = result.reward > 0.0;
                    stats.forced = !action.stop;
                    break;
                }
            }

            all_stats.push(stats);
        }

        Ok(Self::aggregate(&all_stats))
    }

    fn aggregate(all_stats: &[EpisodeStats]) -> Self {
        let n_episodes = all_stats.len();
        if n_episodes == 0 {
            return Self {
                accuracy: 0.0,
                mean_episode_length: 0.0,
                mean_reward: 0.0,
                forced_terminations: 0,
                n_episodes,
            };
        }

        let n = n_episodes as f64;
        let correct = all_stats.iter().filter(|s| s.correct).count();
        let mean_episode_length = all_stats.iter().map(|s| f64::from(s.steps)).sum::<f64>() / n;
        let mean_reward = all_stats.iter().map(|s| s.total_reward).sum::<f64>() / n;

        Self {
            accuracy: correct as f64 / n,
            mean_episode_length,
            mean_reward,
            forced_terminations: all_stats.iter().filter(|s| s.forced).count(),
            n_episodes,
        }
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Evaluation Metrics ({} episodes) ===",
            self.n_episodes
        )?;
        writeln!(f, "  Accuracy:             {:.1}%", self.accuracy * 100.0)?;
        writeln!(
            f,
            "  Mean episode length:  {:.2}",
            self.mean_episode_length
        )?;
        writeln!(f, "  Mean reward:          {:.3}", self.mean_reward)?;
        writeln!(
            f,
            "  Forced terminations:  {}",
            self.forced_terminations
        )
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use super::*;
    use crate::config::GlimpseConfig;
    use crate::dataset::{DatasetCursor, LabelTable, Sample};
    use crate::imaging::{ImageDecoder, ImageResizer};
    use crate::policy::{RandomPolicy, SweepPolicy};
    use crate::types::PixelArray;

    struct GreyDecoder;

    impl ImageDecoder for GreyDecoder {
        fn decode(&self, _path: &Path) -> Result<PixelArray> {
            PixelArray::from_raw(16, 16, 3, vec![0.5; 16 * 16 * 3])
        }
    }

    fn make_env(labels: &[usize], max_steps: u32) -> GlimpseEnv {
        let samples = labels
            .iter()
            .enumerate()
            .map(|(i, &label)| Sample::new(format!("/img/{i}.JPEG"), label, "n0"))
            .collect();
        let config = GlimpseConfig {
            num_categories: 4,
            max_steps,
            ..GlimpseConfig::new(4)
        };
        let cursor = DatasetCursor::new(samples, Some(11), config.max_resets).unwrap();
        GlimpseEnv::new(
            config,
            cursor,
            Box::new(GreyDecoder),
            Box::new(ImageResizer::default()),
            Arc::new(LabelTable::default()),
        )
        .unwrap()
    }

    #[test]
    fn evaluate_completes() {
        let mut env = make_env(&[0, 1, 2, 3], 10);
        let mut policy = RandomPolicy::new(4, 42);
        let metrics = EvaluationMetrics::evaluate(&mut env, &mut policy, 6).unwrap();
        assert_eq!(metrics.n_episodes, 6);
        assert!((0.0..=1.0).contains(&metrics.accuracy));
        assert!(metrics.mean_episode_length >= 1.0);
        assert!(metrics.mean_episode_length <= 10.0);
    }

    #[test]
    fn sweep_on_single_class_dataset_is_always_right() {
        let mut env = make_env(&[2, 2, 2], 10);
        let mut policy = SweepPolicy::new(3, 2);
        let metrics = EvaluationMetrics::evaluate(&mut env, &mut policy, 5).unwrap();
        assert_eq!(metrics.accuracy, 1.0);
        assert_eq!(metrics.mean_episode_length, 3.0);
        assert_eq!(metrics.mean_reward, 1.0);
        assert_eq!(metrics.forced_terminations, 0);
    }

    #[test]
    fn long_sweep_is_cut_by_step_cap() {
        let mut env = make_env(&[1, 1], 2);
        let mut policy = SweepPolicy::new(5, 1);
        let metrics = EvaluationMetrics::evaluate(&mut env, &mut policy, 3).unwrap();
        assert_eq!(metrics.forced_terminations, 3);
        assert_eq!(metrics.mean_episode_length, 2.0);
        assert_eq!(metrics.accuracy, 1.0);
    }

    #[test]
    fn display_lists_episode_count() {
        let mut env = make_env(&[0], 3);
        let mut policy = SweepPolicy::new(1, 0);
        let metrics = EvaluationMetrics::evaluate(&mut env, &mut policy, 2).unwrap();
        assert!(metrics.to_string().contains("(2 episodes)"));
    }
}
