//! Glimpse classification environment.
//!
//! Each episode shows one dataset image through a movable, zoomable window.
//! The agent submits [`AttentionAction`]s until it stops (or the step cap is
//! hit) and is rewarded only for a correct final classification.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::GlimpseConfig;
use crate::dataset::{DatasetCursor, LabelTable, ListFileProvider, Sample};
use crate::error::{EnvError, Result};
use crate::geometry::GeometryEngine;
use crate::imaging::{ImageCrateDecoder, ImageDecoder, ImageResizer, Resizer};
use crate::reward::RewardComputer;
use crate::spaces::{ActionSpace, ObservationSpace};
use crate::types::{AttentionAction, Observation, PixelArray};

/// Result of a single environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult<O = Observation> {
    /// Glimpse at the submitted focus.
    pub observation: O,
    /// `1.0` for a correct terminal guess, `0.0` otherwise.
    pub reward: f64,
    /// Whether the episode ended on this step.
    pub done: bool,
    /// Ground-truth class id, for diagnostics only.
    pub label: usize,
    /// Steps taken in this episode, including this one.
    pub step_count: u32,
}

/// Generic reset/step contract for sequential decision environments.
pub trait Environment {
    type Action;
    type Observation;

    /// Starts a new episode and returns its first observation.
    fn reset(&mut self) -> Result<Self::Observation>;

    /// Applies one action.
    fn step(&mut self, action: Self::Action) -> Result<StepResult<Self::Observation>>;
}

/// Where the controller is in its episode lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodePhase {
    /// No episode has been started, or the last reset failed.
    Idle,
    /// Accepting steps.
    InEpisode,
    /// The last step ended the episode; `reset` is required.
    Terminal,
}

/// Per-episode mutable state.
#[derive(Debug, Clone)]
pub struct EpisodeState {
    pub sample: Sample,
    pub image: PixelArray,
    pub step_count: u32,
    pub last_action: AttentionAction,
}

/// The glimpse environment.
///
/// # Lifecycle
///
/// 1. Build with [`GlimpseEnv::new`] (explicit collaborators) or
///    [`GlimpseEnv::from_config`] (on-disk dataset, `image`-crate backends).
/// 2. Call [`GlimpseEnv::reset`] to load the next sample.
/// 3. Call [`GlimpseEnv::step`] until [`StepResult::done`].
/// 4. Reset again; the dataset cursor reshuffles at every epoch boundary.
pub struct GlimpseEnv {
    config: GlimpseConfig,
    engine: GeometryEngine,
    decoder: Box<dyn ImageDecoder>,
    labels: Arc<LabelTable>,
    cursor: DatasetCursor,
    episode: Option<EpisodeState>,
    phase: EpisodePhase,
}

impl fmt::Debug for GlimpseEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlimpseEnv")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .field("cursor", &self.cursor)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl GlimpseEnv {
    /// Creates an environment from explicit collaborators.
    ///
    /// # Arguments
    ///
    /// * `config` - Glimpse size, category count and step cap
    /// * `cursor` - Dataset cursor, possibly handed over from another environment
    /// * `decoder` - Loads sample images as normalized RGB arrays
    /// * `resizer` - Resamples padded crops to the glimpse size
    /// * `labels` - Class vocabulary
    ///
    /// The cursor's reset cap is replaced by `config.max_resets`.
    pub fn new(
        config: GlimpseConfig,
        mut cursor: DatasetCursor,
        decoder: Box<dyn ImageDecoder>,
        resizer: Box<dyn Resizer>,
        labels: Arc<LabelTable>,
    ) -> Result<Self> {
        config.validate()?;
        if cursor.max_resets() != config.max_resets {
            debug!(
                from = cursor.max_resets(),
                to = config.max_resets,
                "reset cap taken from config"
            );
            cursor.set_max_resets(config.max_resets);
        }
        let engine = GeometryEngine::new(config.glimpse_size, resizer)?;
        Ok(Self {
            config,
            engine,
            decoder,
            labels,
            cursor,
            episode: None,
            phase: EpisodePhase::Idle,
        })
    }

    /// Creates an environment over the ImageNet-style dataset at `config.data_dir`.
    pub fn from_config(config: GlimpseConfig) -> Result<Self> {
        config.validate()?;
        let labels = Arc::new(LabelTable::imagenet());
        if config.num_categories != labels.len() {
            return Err(EnvError::Configuration(format!(
                "num_categories is {} but the label table has {} classes",
                config.num_categories,
                labels.len()
            )));
        }
        let provider = ListFileProvider::new(Arc::clone(&labels));
        let cursor = DatasetCursor::from_provider(&provider, &config)?;
        info!(
            samples = cursor.len(),
            glimpse_size = config.glimpse_size,
            "glimpse environment ready"
        );
        Self::new(
            config,
            cursor,
            Box::new(ImageCrateDecoder),
            Box::new(ImageResizer::default()),
            labels,
        )
    }

    /// Starts a new episode on the next dataset sample.
    ///
    /// Fails with [`EnvError::SampleLoad`] if the image cannot be decoded and
    /// with [`EnvError::Exhausted`] once `config.max_resets` resets were served. On
    /// failure the environment is left [`EpisodePhase::Idle`].
    pub fn reset(&mut self) -> Result<Observation> {
        self.episode = None;
        self.phase = EpisodePhase::Idle;

        let sample = self.cursor.advance()?.clone();
        let image = self.decoder.decode(&sample.path)?;
        let last_action = AttentionAction::neutral();
        let observation = self.engine.extract_observation(&image, last_action.focus)?;

        debug!(
            path = %sample.path.display(),
            label = sample.label,
            position = self.cursor.position(),
            epoch = self.cursor.epochs_completed(),
            "episode reset"
        );
        self.episode = Some(EpisodeState {
            sample,
            image,
            step_count: 0,
            last_action,
        });
        self.phase = EpisodePhase::InEpisode;
        Ok(observation)
    }

    /// Executes one step.
    ///
    /// The episode ends when `action.stop` is set or `max_steps` is reached.
    /// Out-of-range class guesses are scored as wrong, not rejected.
    pub fn step(&mut self, action: AttentionAction) -> Result<StepResult> {
        if self.phase != EpisodePhase::InEpisode {
            return Err(EnvError::EpisodeNotActive);
        }
        let episode = self.episode.as_mut().ok_or(EnvError::EpisodeNotActive)?;
        // a failed extraction leaves the episode untouched
        let observation = self.engine.extract_observation(&episode.image, action.focus)?;

        episode.step_count += 1;
        episode.last_action = action;
        let step_count = episode.step_count;
        let label = episode.sample.label;

        let done = action.stop || step_count >= self.config.max_steps;
        let reward = RewardComputer::compute(done, action.class_guess, label);

        debug!(step = step_count, focus = %action.focus, done, reward, "step");
        if done {
            debug!(
                guess = action.class_guess,
                label,
                correct = reward > 0.0,
                "episode finished"
            );
            self.phase = EpisodePhase::Terminal;
        }

        Ok(StepResult {
            observation,
            reward,
            done,
            label,
            step_count,
        })
    }

    /// Re-renders the glimpse for the most recent action without stepping.
    pub fn observe(&self) -> Result<Observation> {
        let episode = self.episode.as_ref().ok_or(EnvError::EpisodeNotActive)?;
        self.engine
            .extract_observation(&episode.image, episode.last_action.focus)
    }

    /// Tears the environment down, handing its dataset cursor to the caller.
    pub fn into_cursor(self) -> DatasetCursor {
        self.cursor
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn config(&self) -> &GlimpseConfig {
        &self.config
    }

    pub fn cursor(&self) -> &DatasetCursor {
        &self.cursor
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn engine(&self) -> &GeometryEngine {
        &self.engine
    }

    pub fn episode(&self) -> Option<&EpisodeState> {
        self.episode.as_ref()
    }

    /// Steps taken in the current episode, `0` when none is active.
    pub fn step_count(&self) -> u32 {
        self.episode.as_ref().map_or(0, |e| e.step_count)
    }

    pub fn last_action(&self) -> Option<AttentionAction> {
        self.episode.as_ref().map(|e| e.last_action)
    }

    pub fn current_sample(&self) -> Option<&Sample> {
        self.episode.as_ref().map(|e| &e.sample)
    }

    /// Description of the current sample's class.
    pub fn current_label_name(&self) -> Option<&str> {
        self.current_sample()
            .and_then(|s| self.labels.name(s.label))
    }

    pub fn action_space(&self) -> ActionSpace {
        ActionSpace::from_config(&self.config)
    }

    pub fn observation_space(&self) -> ObservationSpace {
        ObservationSpace::from_config(&self.config)
    }
}

impl Environment for GlimpseEnv {
    type Action = AttentionAction;
    type Observation = Observation;

    fn reset(&mut self) -> Result<Observation> {
        GlimpseEnv::reset(self)
    }

    fn step(&mut self, action: AttentionAction) -> Result<StepResult> {
        GlimpseEnv::step(self, action)
    }
}
