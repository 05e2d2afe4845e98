//! glimpse-env - hard visual attention as a sequential decision process.
//!
//! An agent steers a movable, zoomable glimpse window over a dataset image and
//! decides when to stop and which class to report. The crate provides the
//! glimpse geometry, the episode controller, dataset cycling across epochs and
//! a few baseline policies.

pub mod config;
pub mod dataset;
pub mod environment;
pub mod error;
pub mod geometry;
pub mod imaging;
pub mod metrics;
pub mod policy;
pub mod reward;
pub mod spaces;
pub mod types;

pub use config::GlimpseConfig;
pub use dataset::{DatasetCursor, DatasetProvider, LabelTable, ListFileProvider, Sample};
pub use environment::{Environment, EpisodePhase, GlimpseEnv, StepResult};
pub use error::{EnvError, Result};
pub use geometry::{compute_crop_rectangle, pad_crop, CropRect, GeometryEngine, Padding};
pub use imaging::{ImageCrateDecoder, ImageDecoder, ImageResizer, Resizer};
pub use metrics::EvaluationMetrics;
pub use policy::{Policy, RandomPolicy, SweepPolicy};
pub use reward::RewardComputer;
pub use spaces::{ActionSpace, ObservationSpace};
pub use types::{AttentionAction, Focus, Observation, PixelArray};
