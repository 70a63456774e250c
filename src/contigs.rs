//! Contig index parser for reference contig names and lengths.
//!
//! Reads fasta-index style listings (`.fai`, `.genome`, `chrom.sizes`):
//! whitespace-delimited, name in column 1 and length in column 2. Any
//! further columns are ignored.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::bed::{parse_u64_strict, BedError};

/// Reference contigs with their lengths.
/// File order defines the canonical sort order and never changes after load.
#[derive(Debug, Clone, Default)]
pub struct ContigIndex {
    /// Map of contig name to (position in order, length)
    entries: HashMap<String, (usize, u64)>,
    /// Contig order (preserves input file order)
    order: Vec<String>,
}

impl ContigIndex {
    /// Load an index from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BedError> {
        let path = path.as_ref();
        let load_error = |message: String| BedError::IndexLoad {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path).map_err(|e| load_error(e.to_string()))?;
        let reader = BufReader::new(file);
        let mut index = Self::default();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.map_err(|e| load_error(e.to_string()))?;
            let mut tokens = line.split_whitespace();

            let Some(name) = tokens.next() else {
                // Blank line
                continue;
            };
            let Some(length) = tokens.next() else {
                return Err(load_error(format!(
                    "line {}: expected a contig name and length",
                    line_num + 1
                )));
            };
            let length = parse_u64_strict(length).ok_or_else(|| {
                load_error(format!(
                    "line {}: invalid length '{}' for contig '{}'",
                    line_num + 1,
                    length,
                    name
                ))
            })?;

            if !index.insert(name, length) {
                return Err(load_error(format!(
                    "line {}: duplicate contig name '{}'",
                    line_num + 1,
                    name
                )));
            }
        }

        Ok(index)
    }

    /// Build an index from (name, length) pairs in order.
    ///
    /// Fails on a duplicate name.
    pub fn from_entries<I, S>(entries: I) -> Result<Self, BedError>
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut index = Self::default();
        for (name, length) in entries {
            let name = name.into();
            if !index.insert(&name, length) {
                return Err(BedError::IndexLoad {
                    path: "<memory>".into(),
                    message: format!("duplicate contig name '{}'", name),
                });
            }
        }
        Ok(index)
    }

    fn insert(&mut self, name: &str, length: u64) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        self.entries
            .insert(name.to_string(), (self.order.len(), length));
        self.order.push(name.to_string());
        true
    }

    /// Get the length of a contig.
    #[inline]
    pub fn length_of(&self, name: &str) -> Option<u64> {
        self.entries.get(name).map(|&(_, length)| length)
    }

    /// Get the position of a contig in index order.
    #[inline]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.get(name).map(|&(rank, _)| rank)
    }

    /// Check if a contig exists.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All contig names in file order.
    pub fn ordered_names(&self) -> &[String] {
        &self.order
    }

    /// Get number of contigs.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bed::ErrorKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn index_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_fai() {
        let file = index_file(
            "chr1\t195154279\t6\t60\t61\n\
             chr2\t181755017\t198406886\t60\t61\n\
             chrM\t16299\t383193817\t60\t61\n",
        );
        let index = ContigIndex::load(file.path()).unwrap();

        assert_eq!(index.length_of("chr1"), Some(195154279));
        assert_eq!(index.length_of("chr2"), Some(181755017));
        assert_eq!(index.length_of("chrM"), Some(16299));
        assert_eq!(index.length_of("chr3"), None);
        assert_eq!(index.ordered_names(), ["chr1", "chr2", "chrM"]);
        assert_eq!(index.position("chrM"), Some(2));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_load_space_delimited() {
        let file = index_file("chr1 1000\nchr2   500 extra\n\n");
        let index = ContigIndex::load(file.path()).unwrap();
        assert!(index.contains("chr1"));
        assert_eq!(index.length_of("chr2"), Some(500));
        assert!(!index.contains("chr3"));
    }

    #[test]
    fn test_missing_length() {
        let file = index_file("chr1\t1000\nchr2\n");
        let err = ContigIndex::load(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexLoad);
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_invalid_length() {
        let file = index_file("chr1\tlong\n");
        let err = ContigIndex::load(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexLoad);
    }

    #[test]
    fn test_duplicate_name() {
        let file = index_file("chr1\t10\nchr1\t20\n");
        let err = ContigIndex::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContigIndex::load(dir.path().join("missing.fai")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexLoad);
    }

    #[test]
    fn test_from_entries() {
        let index = ContigIndex::from_entries([("chr2", 10), ("chr1", 20)]).unwrap();
        assert_eq!(index.ordered_names(), ["chr2", "chr1"]);
        assert!(ContigIndex::from_entries([("a", 1), ("a", 2)]).is_err());
        assert!(ContigIndex::default().is_empty());
    }
}
