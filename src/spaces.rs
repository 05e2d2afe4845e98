//! Action and observation space descriptions.
//!
//! The action is the tuple `(Discrete(2), Discrete(num_categories),
//! Box([-1, -1, 0], [1, 1, 1]))`: stop flag, class guess and focus. These are
//! structural contracts for agents; the environment itself accepts focus
//! values outside the box.

use rand::Rng;

use crate::config::GlimpseConfig;
use crate::types::{AttentionAction, Focus, PixelArray};

/// Bounds of the action tuple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionSpace {
    pub num_categories: usize,
    /// Lower bounds of `(y, x, zoom)`.
    pub focus_low: [f64; 3],
    /// Upper bounds of `(y, x, zoom)`.
    pub focus_high: [f64; 3],
}

impl ActionSpace {
    pub fn new(num_categories: usize) -> Self {
        Self {
            num_categories,
            focus_low: [-1.0, -1.0, 0.0],
            focus_high: [1.0, 1.0, 1.0],
        }
    }

    pub fn from_config(config: &GlimpseConfig) -> Self {
        Self::new(config.num_categories)
    }

    /// Whether `action` lies inside the nominal bounds.
    pub fn contains(&self, action: &AttentionAction) -> bool {
        action.class_guess < self.num_categories && self.focus_contains(&action.focus)
    }

    /// Whether `focus` lies inside the nominal focus box.
    pub fn focus_contains(&self, focus: &Focus) -> bool {
        focus
            .as_array()
            .iter()
            .zip(self.focus_low.iter().zip(self.focus_high.iter()))
            .all(|(v, (lo, hi))| (*lo..=*hi).contains(v))
    }

    /// Draws a uniformly random action.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> AttentionAction {
        let mut draw = |i: usize| rng.gen_range(self.focus_low[i]..=self.focus_high[i]);
        let focus = Focus::new(draw(0), draw(1), draw(2));
        AttentionAction::new(
            rng.gen_bool(0.5),
            rng.gen_range(0..self.num_categories.max(1)),
            focus,
        )
    }
}

/// Shape and value bounds of an observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationSpace {
    pub shape: (usize, usize, usize),
    pub low: f32,
    pub high: f32,
}

impl ObservationSpace {
    pub fn from_config(config: &GlimpseConfig) -> Self {
        Self {
            shape: config.observation_shape(),
            low: 0.0,
            high: 1.0,
        }
    }

    pub fn contains(&self, observation: &PixelArray) -> bool {
        observation.shape() == self.shape
            && observation
                .as_slice()
                .iter()
                .all(|v| (self.low..=self.high).contains(v))
    }
}
