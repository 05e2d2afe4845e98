//! Configuration for the glimpse environment.

use std::env;
use std::path::PathBuf;

use crate::error::{EnvError, Result};

/// Environment variable naming the dataset root directory.
pub const DATA_DIR_VAR: &str = "IMAGENET_DIR";
/// Environment variable overriding [`GlimpseConfig::glimpse_size`].
pub const GLIMPSE_SIZE_VAR: &str = "GLIMPSE_SIZE";
/// Environment variable fixing the shuffle seed.
pub const SEED_VAR: &str = "GLIMPSE_SEED";

/// Construction-time configuration, fixed for the environment's lifetime.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlimpseConfig {
    // --- Observation ---
    /// Side length of the square observation patch, in pixels.
    pub glimpse_size: usize,

    // --- Action space ---
    /// Number of classes the agent may guess from.
    pub num_categories: usize,

    // --- Episode ---
    /// Hard cap on steps per episode; reaching it forces termination.
    pub max_steps: u32,
    /// Safety valve: resets beyond this count fail with `Exhausted`.
    pub max_resets: u64,

    // --- Dataset ---
    /// Root directory of the image dataset.
    pub data_dir: Option<PathBuf>,
    /// Seed for dataset shuffling. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl GlimpseConfig {
    /// Creates a configuration with the given glimpse size and defaults elsewhere.
    pub fn new(glimpse_size: usize) -> Self {
        Self {
            glimpse_size,
            ..Self::default()
        }
    }

    /// Builds a configuration from the process environment.
    ///
    /// `IMAGENET_DIR` is required. `GLIMPSE_SIZE` and `GLIMPSE_SEED` are
    /// optional overrides.
    pub fn from_env() -> Result<Self> {
        let data_dir = env::var_os(DATA_DIR_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| EnvError::Configuration(format!("set the {DATA_DIR_VAR} variable")))?;

        let mut config = Self {
            data_dir: Some(data_dir),
            ..Self::default()
        };
        if let Some(size) = parse_var::<usize>(GLIMPSE_SIZE_VAR)? {
            config.glimpse_size = size;
        }
        config.seed = parse_var::<u64>(SEED_VAR)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every size parameter is positive.
    pub fn validate(&self) -> Result<()> {
        if self.glimpse_size == 0 {
            return Err(EnvError::Configuration(
                "glimpse_size must be positive".into(),
            ));
        }
        if self.num_categories == 0 {
            return Err(EnvError::Configuration(
                "num_categories must be positive".into(),
            ));
        }
        if self.max_steps == 0 {
            return Err(EnvError::Configuration("max_steps must be positive".into()));
        }
        Ok(())
    }

    /// Observation shape `(glimpse_size, glimpse_size, 3)`.
    pub fn observation_shape(&self) -> (usize, usize, usize) {
        (self.glimpse_size, self.glimpse_size, Self::CHANNELS)
    }

    /// Number of scalar values in one observation.
    pub fn observation_dim(&self) -> usize {
        self.glimpse_size * self.glimpse_size * Self::CHANNELS
    }

    /// Number of scalar components in one action: stop, guess, y, x, zoom.
    pub const ACTION_DIM: usize = 5;

    /// Channels in every source image and observation.
    pub const CHANNELS: usize = 3;
}

impl Default for GlimpseConfig {
    fn default() -> Self {
        Self {
            glimpse_size: 32,
            num_categories: 1000,
            max_steps: 10,
            max_resets: 100_000,
            data_dir: None,
            seed: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| EnvError::Configuration(format!("{name} is not a valid number: {raw}"))),
        _ => Ok(None),
    }
}
