//! Epoch-aware cursor over a shuffled sample list.

use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use super::provider::{DatasetProvider, Sample};
use crate::config::GlimpseConfig;
use crate::error::{EnvError, Result};

/// Walks a shuffled dataset one sample per episode, reshuffling each epoch.
///
/// # Lifecycle
///
/// 1. Built once with [`DatasetCursor::new`] or [`DatasetCursor::from_provider`];
///    the samples are shuffled immediately.
/// 2. Each [`DatasetCursor::advance`] moves to the next sample. The first call
///    serves position 0.
/// 3. Running past the last sample triggers [`DatasetCursor::complete_epoch`].
/// 4. After `max_resets` advances every further call fails with
///    [`EnvError::Exhausted`].
#[derive(Debug)]
pub struct DatasetCursor {
    samples: Vec<Sample>,
    position: usize,
    epochs_completed: u64,
    absolute_position: u64,
    max_resets: u64,
    started: bool,
    rng: StdRng,
}

impl DatasetCursor {
    /// Creates a cursor over `samples`, shuffled with `seed` (or OS entropy).
    pub fn new(samples: Vec<Sample>, seed: Option<u64>, max_resets: u64) -> Result<Self> {
        if samples.is_empty() {
            return Err(EnvError::Configuration("dataset contains no samples".into()));
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut cursor = Self {
            samples,
            position: 0,
            epochs_completed: 0,
            absolute_position: 0,
            max_resets,
            started: false,
            rng,
        };
        cursor.samples.shuffle(&mut cursor.rng);
        Ok(cursor)
    }

    /// Lists `config.data_dir` through `provider` and builds a cursor from it.
    pub fn from_provider(provider: &dyn DatasetProvider, config: &GlimpseConfig) -> Result<Self> {
        let source = config
            .data_dir
            .as_deref()
            .ok_or_else(|| EnvError::Configuration("no dataset directory configured".into()))?;
        Self::from_source(provider, source, config)
    }

    /// Like [`DatasetCursor::from_provider`] with an explicit source location.
    pub fn from_source(
        provider: &dyn DatasetProvider,
        source: &Path,
        config: &GlimpseConfig,
    ) -> Result<Self> {
        let samples = provider.list_samples(source)?;
        Self::new(samples, config.seed, config.max_resets)
    }

    /// Moves to the next sample and returns it.
    ///
    /// Fails with [`EnvError::Exhausted`] once `max_resets` advances have been
    /// served; the cursor is left unchanged in that case.
    pub fn advance(&mut self) -> Result<&Sample> {
        if self.absolute_position >= self.max_resets {
            return Err(EnvError::Exhausted {
                limit: self.max_resets,
            });
        }
        self.absolute_position += 1;

        if self.started {
            self.position += 1;
        } else {
            self.started = true;
        }
        if self.position >= self.samples.len() {
            self.complete_epoch();
        }
        Ok(&self.samples[self.position])
    }

    /// Reshuffles the samples and restarts from position 0.
    pub fn complete_epoch(&mut self) {
        self.epochs_completed += 1;
        self.samples.shuffle(&mut self.rng);
        self.position = 0;
        info!(
            epochs_completed = self.epochs_completed,
            samples = self.samples.len(),
            "dataset epoch complete"
        );
    }

    /// The sample at the cursor, `None` before the first advance.
    pub fn current(&self) -> Option<&Sample> {
        if self.started {
            self.samples.get(self.position)
        } else {
            None
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn epochs_completed(&self) -> u64 {
        self.epochs_completed
    }

    /// Total advances served since construction, across epochs.
    pub fn absolute_position(&self) -> u64 {
        self.absolute_position
    }

    pub fn max_resets(&self) -> u64 {
        self.max_resets
    }

    /// Replaces the reset cap. Advances already served still count against it.
    pub fn set_max_resets(&mut self, max_resets: u64) {
        self.max_resets = max_resets;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in the current epoch's order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}
