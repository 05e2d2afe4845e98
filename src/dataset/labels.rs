//! Immutable class-id → name lookup.

use std::collections::HashMap;

static IMAGENET_SYNSETS: &str = include_str!("../../data/imagenet_synsets.txt");

/// One class in the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEntry {
    /// WordNet id, e.g. `n01440764`.
    pub wnid: String,
    /// Human-readable description, e.g. `tench, Tinca tinca`.
    pub description: String,
}

/// Label vocabulary mapping class ids to WordNet ids and descriptions.
///
/// Class ids are the line order of the synset listing the table was built from.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    entries: Vec<LabelEntry>,
    by_wnid: HashMap<String, usize>,
}

impl LabelTable {
    /// Parses `"<wnid> <description>"` lines. Blank lines are ignored.
    ///
    /// If a WordNet id repeats, lookups by id resolve to its first occurrence.
    pub fn from_synset_lines(text: &str) -> Self {
        let mut entries = Vec::new();
        let mut by_wnid = HashMap::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (wnid, description) = line.split_once(' ').unwrap_or((line, ""));
            by_wnid.entry(wnid.to_string()).or_insert(entries.len());
            entries.push(LabelEntry {
                wnid: wnid.to_string(),
                description: description.trim().to_string(),
            });
        }
        Self { entries, by_wnid }
    }

    /// The 1000-class ImageNet (ILSVRC 2012) vocabulary.
    pub fn imagenet() -> Self {
        Self::from_synset_lines(IMAGENET_SYNSETS)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&LabelEntry> {
        self.entries.get(id)
    }

    /// Description of class `id`.
    pub fn name(&self, id: usize) -> Option<&str> {
        self.get(id).map(|e| e.description.as_str())
    }

    pub fn wnid(&self, id: usize) -> Option<&str> {
        self.get(id).map(|e| e.wnid.as_str())
    }

    /// Class id for a WordNet id.
    pub fn index_of(&self, wnid: &str) -> Option<usize> {
        self.by_wnid.get(wnid).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imagenet_table_has_thousand_classes() {
        let table = LabelTable::imagenet();
        assert_eq!(table.len(), 1000);
        assert_eq!(table.wnid(0), Some("n01440764"));
        assert_eq!(table.name(0), Some("tench, Tinca tinca"));
        assert_eq!(table.index_of("n15075141"), Some(999));
    }

    #[test]
    fn parses_lines_and_skips_blanks() {
        let table = LabelTable::from_synset_lines("n001 cat\n\n n002 dog, hound \n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.name(1), Some("dog, hound"));
        assert_eq!(table.index_of("n002"), Some(1));
        assert_eq!(table.index_of("n003"), None);
        assert_eq!(table.name(2), None);
    }

    #[test]
    fn duplicate_wnid_resolves_to_first() {
        let table = LabelTable::from_synset_lines("n001 a\nn001 b\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.index_of("n001"), Some(0));
    }

    #[test]
    fn line_without_description() {
        let table = LabelTable::from_synset_lines("n42\n");
        assert_eq!(table.wnid(0), Some("n42"));
        assert_eq!(table.name(0), Some(""));
    }
}
