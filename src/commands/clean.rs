//! Clean command implementation.
//!
//! Streams an interval file through the format validator, rewrites each
//! chromosome to its canonical name and drops records on non-standard
//! contigs. Output is staged and atomically moved into place, so a
//! malformed line anywhere in the input leaves no output behind.

use crate::bed::{check_against_index, open_input, BedError, FormatValidator};
use crate::contigs::ContigIndex;
use crate::interval::IntervalLayout;
use crate::naming::ChromNameNormalizer;
use crate::output::AtomicOutput;
use std::path::Path;
use tracing::{debug, info};

/// Statistics from a clean run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanStats {
    pub records_read: usize,
    pub records_written: usize,
    pub records_dropped: usize,
    pub header_lines: usize,
}

impl std::fmt::Display for CleanStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Read: {}, Written: {}, Dropped (non-standard): {}",
            self.records_read, self.records_written, self.records_dropped
        )
    }
}

/// Clean command configuration.
#[derive(Debug, Clone)]
pub struct CleanCommand<'a> {
    normalizer: ChromNameNormalizer,
    /// Column layout; inferred from the input path when `None`
    pub layout: Option<IntervalLayout>,
    /// Input plays the blacklist role (end-of-contig overflow tolerated)
    pub blacklist: bool,
    contigs: Option<&'a ContigIndex>,
}

impl<'a> CleanCommand<'a> {
    pub fn new(normalizer: ChromNameNormalizer) -> Self {
        Self {
            normalizer,
            layout: None,
            blacklist: false,
            contigs: None,
        }
    }

    /// Check renamed records against a contig index (membership and bounds).
    pub fn with_contigs(mut self, contigs: &'a ContigIndex) -> Self {
        self.contigs = Some(contigs);
        self
    }

    /// Clean `input` into `output`.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> Result<CleanStats, BedError> {
        let input = input.as_ref();
        let output = output.as_ref();
        info!("Filtering {}...", input.display());

        let layout = self
            .layout
            .unwrap_or_else(|| IntervalLayout::from_path(input));
        let mut validator = FormatValidator::new(open_input(input)?, input)
            .with_layout(layout)
            .blacklist_exempt(self.blacklist);
        let mut out = AtomicOutput::create(output)?;
        let mut stats = CleanStats::default();

        while let Some(mut record) = validator.read_record()? {
            stats.records_read += 1;

            let Some(chrom) = self.normalizer.normalize(record.chrom()) else {
                stats.records_dropped += 1;
                continue;
            };
            record.set_chrom(chrom);

            if let Some(contigs) = self.contigs {
                check_against_index(
                    contigs,
                    &record,
                    self.blacklist,
                    input,
                    validator.line_number(),
                )?;
            }

            out.write_record(&record)?;
        }

        stats.header_lines = validator.header_lines();
        stats.records_written = out.commit()?;
        debug!(
            "{} ({}) -> {}",
            input.display(),
            self.normalizer.species(),
            output.display()
        );
        info!("Cleaned {}: {}", input.display(), stats);
        Ok(stats)
    }
}
