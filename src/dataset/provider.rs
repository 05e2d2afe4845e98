//! Dataset discovery: turning a source directory into labelled sample records.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use super::labels::LabelTable;
use crate::error::{EnvError, Result};

/// A labelled image on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    /// Absolute or source-relative path to the image file.
    pub path: PathBuf,
    /// Class id.
    pub label: usize,
    /// WordNet id of the class.
    pub label_name: String,
}

impl Sample {
    pub fn new(path: impl Into<PathBuf>, label: usize, label_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label,
            label_name: label_name.into(),
        }
    }
}

/// Lists the samples available under a source location.
///
/// Implementations return a stable list and filter out entries that are not
/// usable images before they reach the environment.
pub trait DatasetProvider {
    fn list_samples(&self, source: &Path) -> Result<Vec<Sample>>;
}

/// Provider over a fixed, already-built list of samples. `source` is ignored.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    samples: Vec<Sample>,
}

impl InMemoryProvider {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }
}

impl DatasetProvider for InMemoryProvider {
    fn list_samples(&self, _source: &Path) -> Result<Vec<Sample>> {
        Ok(self.samples.clone())
    }
}

/// Reads the listing file `<source>.txt` next to the dataset directory.
///
/// Each line is a path relative to `source`. Lines starting with `.` are
/// skipped, only files with the configured extension are kept, and the class
/// is taken from the first WordNet id (`n` followed by digits) in the path.
#[derive(Debug, Clone)]
pub struct ListFileProvider {
    labels: Arc<LabelTable>,
    extension: String,
}

impl ListFileProvider {
    /// Creates a provider accepting `.JPEG` files.
    pub fn new(labels: Arc<LabelTable>) -> Self {
        Self {
            labels,
            extension: "JPEG".to_string(),
        }
    }

    /// Accepts files with `extension` (without the dot, case-sensitive).
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Path of the listing file for `source`.
    pub fn index_path(source: &Path) -> PathBuf {
        let mut name: OsString = source.components().as_path().as_os_str().to_owned();
        name.push(".txt");
        PathBuf::from(name)
    }

    /// Parses listing text, resolving entries against `source`.
    pub fn parse_listing(&self, source: &Path, listing: &str) -> Vec<Sample> {
        let mut samples = Vec::new();
        let mut skipped = 0usize;

        for line in listing.lines() {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('.') {
                continue;
            }
            let has_ext = Path::new(line)
                .extension()
                .is_some_and(|ext| ext == self.extension.as_str());
            if !has_ext {
                skipped += 1;
                continue;
            }
            let Some(wnid) = extract_wnid(line) else {
                warn!(entry = line, "no class id in dataset entry");
                skipped += 1;
                continue;
            };
            let Some(label) = self.labels.index_of(wnid) else {
                warn!(entry = line, wnid, "unknown class id in dataset entry");
                skipped += 1;
                continue;
            };
            samples.push(Sample::new(source.join(line), label, wnid));
        }

        info!(
            source = %source.display(),
            samples = samples.len(),
            skipped,
            "indexed dataset"
        );
        samples
    }
}

impl DatasetProvider for ListFileProvider {
    fn list_samples(&self, source: &Path) -> Result<Vec<Sample>> {
        let index = Self::index_path(source);
        let listing = fs::read_to_string(&index).map_err(|e| {
            EnvError::Configuration(format!(
                "cannot read dataset listing {}: {e}",
                index.display()
            ))
        })?;
        Ok(self.parse_listing(source, &listing))
    }
}

/// First `n<digits>` run in `s`.
fn extract_wnid(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'n' {
            continue;
        }
        let digits = bytes[i + 1..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();
        if digits > 0 {
            return Some(&s[i..i + 1 + digits]);
        }
    }
    None
}
