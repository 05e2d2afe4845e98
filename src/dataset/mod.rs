//! Dataset collaborators: sample discovery, the label vocabulary and the
//! epoch-aware cursor the environment draws episodes from.

pub mod cursor;
pub mod labels;
pub mod provider;

pub use cursor::DatasetCursor;
pub use labels::{LabelEntry, LabelTable};
pub use provider::{DatasetProvider, InMemoryProvider, ListFileProvider, Sample};
