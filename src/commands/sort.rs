//! Sort-and-dedup command implementation.
//!
//! Sort order:
//! 1. Primary: contig position in the contig index
//! 2. Secondary: start coordinate (ascending, numeric)
//! 3. Tertiary: end coordinate (ascending, numeric)
//! 4. Remaining columns, compared lexicographically in file order
//! 5. The raw line, so the order is total
//!
//! Exact duplicate lines are then collapsed (adjacent-only, like `uniq`
//! over sorted input) and the file is rewritten in place through a staged
//! temporary file.

use crate::bed::{is_gzip_compressed, open_input, BedError, FormatValidator};
use crate::contigs::ContigIndex;
use crate::interval::{IntervalLayout, IntervalRecord};
use crate::output::AtomicOutput;
use std::cmp::Ordering;
use std::path::Path;
use tracing::{debug, info};

/// Statistics from a sort-and-dedup run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SortDedupStats {
    pub records_read: usize,
    pub records_written: usize,
    pub duplicates_removed: usize,
}

impl std::fmt::Display for SortDedupStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Read: {}, Written: {}, Duplicates removed: {}",
            self.records_read, self.records_written, self.duplicates_removed
        )
    }
}

/// A record with its pre-computed contig position and output line.
#[derive(Debug, Clone)]
struct SortEntry {
    rank: usize,
    line: String,
    record: IntervalRecord,
}

impl SortEntry {
    fn new(rank: usize, record: IntervalRecord) -> Self {
        Self {
            rank,
            line: record.to_string(),
            record,
        }
    }
}

/// Sort-and-dedup command configuration.
#[derive(Debug, Clone)]
pub struct SortDedupCommand<'a> {
    contigs: &'a ContigIndex,
    /// Keep only chrom, start and end
    pub project_bed3: bool,
    /// Column layout; inferred from the input path when `None`
    pub layout: Option<IntervalLayout>,
}

impl<'a> SortDedupCommand<'a> {
    pub fn new(contigs: &'a ContigIndex) -> Self {
        Self {
            contigs,
            project_bed3: false,
            layout: None,
        }
    }

    /// Contig position, with unknown contigs after all known ones.
    #[inline]
    fn rank(&self, chrom: &str) -> usize {
        self.contigs.position(chrom).unwrap_or(usize::MAX)
    }

    /// Sort records and drop exact duplicates.
    ///
    /// Records on contigs missing from the index sort last, by name.
    pub fn sort_and_dedup(&self, records: Vec<IntervalRecord>) -> Vec<IntervalRecord> {
        let entries = records
            .into_iter()
            .map(|mut r| {
                if self.project_bed3 {
                    r.truncate_to_bed3();
                }
                SortEntry::new(self.rank(r.chrom()), r)
            })
            .collect();
        dedup_sorted(sort_entries(entries))
            .into_iter()
            .map(|e| e.record)
            .collect()
    }

    /// Sort and dedup the file at `path`, rewriting it in place.
    ///
    /// Every record's contig must be present in the index.
    pub fn run<P: AsRef<Path>>(&self, path: P) -> Result<SortDedupStats, BedError> {
        let path = path.as_ref();
        if is_gzip_compressed(path)? {
            return Err(BedError::CompressedInput(path.to_path_buf()));
        }

        let layout = self.layout.unwrap_or_else(|| IntervalLayout::from_path(path));
        let mut validator = FormatValidator::new(open_input(path)?, path).with_layout(layout);
        let mut entries = Vec::new();

        while let Some(mut record) = validator.read_record()? {
            let rank = self
                .contigs
                .position(record.chrom())
                .ok_or_else(|| BedError::UnknownContig {
                    path: path.to_path_buf(),
                    line: validator.line_number(),
                    chrom: record.chrom().to_string(),
                })?;
            if self.project_bed3 {
                record.truncate_to_bed3();
            }
            entries.push(SortEntry::new(rank, record));
        }

        let records_read = entries.len();
        debug!("Sorting {} records from {}", records_read, path.display());
        let unique = dedup_sorted(sort_entries(entries));

        let mut out = AtomicOutput::create(path)?;
        for entry in &unique {
            out.write_line(&entry.line)?;
        }
        let records_written = out.commit()?;

        let stats = SortDedupStats {
            records_read,
            records_written,
            duplicates_removed: records_read - records_written,
        };
        info!("Sorted {}: {}", path.display(), stats);
        Ok(stats)
    }
}

fn compare_entries(a: &SortEntry, b: &SortEntry) -> Ordering {
    a.rank
        .cmp(&b.rank)
        .then_with(|| a.record.chrom().cmp(b.record.chrom()))
        .then_with(|| a.record.start().cmp(&b.record.start()))
        .then_with(|| a.record.end().cmp(&b.record.end()))
        .then_with(|| a.record.extra_fields().cmp(b.record.extra_fields()))
        .then_with(|| a.line.cmp(&b.line))
}

fn sort_entries(mut entries: Vec<SortEntry>) -> Vec<SortEntry> {
    entries.sort_by(compare_entries);
    entries
}

/// Collapse runs of identical lines.
fn dedup_sorted(mut entries: Vec<SortEntry>) -> Vec<SortEntry> {
    entries.dedup_by(|a, b| a.line == b.line);
    entries
}
