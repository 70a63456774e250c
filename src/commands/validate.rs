//! Validate command implementation.
//!
//! Runs every format check against a contig index without producing output.

use crate::bed::{open_input, BedError, FormatValidator};
use crate::contigs::ContigIndex;
use crate::interval::IntervalLayout;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Statistics from a validation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidateStats {
    pub records: usize,
    pub header_lines: usize,
    pub contigs_seen: usize,
}

impl std::fmt::Display for ValidateStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Records: {}, Headers: {}, Contigs: {}",
            self.records, self.header_lines, self.contigs_seen
        )
    }
}

/// Validate command configuration.
#[derive(Debug, Clone)]
pub struct ValidateCommand<'a> {
    contigs: &'a ContigIndex,
    /// Tolerate end coordinates past the contig length
    pub blacklist: bool,
    /// Column layout; inferred from the input path when `None`
    pub layout: Option<IntervalLayout>,
}

impl<'a> ValidateCommand<'a> {
    pub fn new(contigs: &'a ContigIndex) -> Self {
        Self {
            contigs,
            blacklist: false,
            layout: None,
        }
    }

    /// Validate the file at `path`, stopping at the first error.
    pub fn run<P: AsRef<Path>>(&self, path: P) -> Result<ValidateStats, BedError> {
        let path = path.as_ref();
        let layout = self.layout.unwrap_or_else(|| IntervalLayout::from_path(path));
        let mut validator = FormatValidator::new(open_input(path)?, path)
            .with_layout(layout)
            .with_contigs(self.contigs)
            .blacklist_exempt(self.blacklist);

        let mut stats = ValidateStats::default();
        let mut contigs_seen = HashSet::new();
        while let Some(record) = validator.read_record()? {
            stats.records += 1;
            if !contigs_seen.contains(record.chrom()) {
                contigs_seen.insert(record.chrom().to_string());
            }
        }
        stats.header_lines = validator.header_lines();
        stats.contigs_seen = contigs_seen.len();

        info!("{} is valid: {}", path.display(), stats);
        Ok(stats)
    }
}
