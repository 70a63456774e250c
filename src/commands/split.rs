//! Regulatory annotation split.
//!
//! Re-validates a cleaned GFF-style regulatory file against the contig
//! index and writes promoter and enhancer regions as 6-column BED rows
//! (`chrom start end . . strand`). Feature types other than the two of
//! interest are ignored. Each output is then sorted and deduplicated.

use crate::bed::{open_input, BedError, FormatValidator};
use crate::commands::sort::SortDedupCommand;
use crate::contigs::ContigIndex;
use crate::interval::{IntervalLayout, IntervalRecord};
use crate::output::{commit_all, AtomicOutput};
use std::path::{Path, PathBuf};
use tracing::info;

pub const PROMOTER_FILE: &str = "promoter.bed";
pub const ENHANCER_FILE: &str = "enhancer.bed";

const PROMOTER_SUFFIX: &str = "Promoter";
const ENHANCER_SUFFIX: &str = "Enhancer";

/// Regulatory feature classes written by the split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegulatoryClass {
    Promoter,
    Enhancer,
}

impl RegulatoryClass {
    /// Classify an annotation by its suffix.
    pub fn from_annotation(annotation: &str) -> Option<Self> {
        if annotation.ends_with(PROMOTER_SUFFIX) {
            Some(RegulatoryClass::Promoter)
        } else if annotation.ends_with(ENHANCER_SUFFIX) {
            Some(RegulatoryClass::Enhancer)
        } else {
            None
        }
    }
}

/// Number of regions written per class, before deduplication.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PartitionCounts {
    pub promoter: usize,
    pub enhancer: usize,
}

impl std::fmt::Display for PartitionCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Promoters: {}, Enhancers: {}",
            self.promoter, self.enhancer
        )
    }
}

/// Split command configuration.
#[derive(Debug, Clone)]
pub struct SplitRegulatoryCommand<'a> {
    contigs: &'a ContigIndex,
}

impl<'a> SplitRegulatoryCommand<'a> {
    pub fn new(contigs: &'a ContigIndex) -> Self {
        Self { contigs }
    }

    /// Paths of the promoter and enhancer outputs inside `output_dir`.
    pub fn output_paths<P: AsRef<Path>>(output_dir: P) -> (PathBuf, PathBuf) {
        let dir = output_dir.as_ref();
        (dir.join(PROMOTER_FILE), dir.join(ENHANCER_FILE))
    }

    /// Split `input` into `promoter.bed` and `enhancer.bed` under `output_dir`.
    ///
    /// Validation and classification happen in one pass; neither output is
    /// moved into place unless the whole input validates, and the pair is
    /// committed together.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output_dir: Q,
    ) -> Result<PartitionCounts, BedError> {
        let input = input.as_ref();
        let (promoter_path, enhancer_path) = Self::output_paths(output_dir);

        let validator = FormatValidator::new(open_input(input)?, input)
            .with_layout(IntervalLayout::Gff)
            .with_contigs(self.contigs);
        let mut promoters = AtomicOutput::create(&promoter_path)?;
        let mut enhancers = AtomicOutput::create(&enhancer_path)?;
        let mut counts = PartitionCounts::default();

        info!("Parsing regulatory annotations in {}...", input.display());
        for record in validator.records() {
            let record = record?;
            let Some(class) = record_class(&record) else {
                continue;
            };
            let row = bed6_row(&record);
            match class {
                RegulatoryClass::Promoter => {
                    promoters.write_fields(row)?;
                    counts.promoter += 1;
                }
                RegulatoryClass::Enhancer => {
                    enhancers.write_fields(row)?;
                    counts.enhancer += 1;
                }
            }
        }

        commit_all(vec![promoters, enhancers])?;
        info!("    Parsed {} promoter regions.", counts.promoter);
        info!("    Parsed {} enhancer regions.", counts.enhancer);

        let mut sorter = SortDedupCommand::new(self.contigs);
        sorter.layout = Some(IntervalLayout::Bed);
        sorter.run(&promoter_path)?;
        sorter.run(&enhancer_path)?;

        Ok(counts)
    }
}

fn record_class(record: &IntervalRecord) -> Option<RegulatoryClass> {
    record
        .layout()
        .annotation_column()
        .and_then(|c| record.field(c))
        .and_then(RegulatoryClass::from_annotation)
}

/// `chrom start end . . strand`, coordinates copied verbatim.
fn bed6_row(record: &IntervalRecord) -> [&str; 6] {
    let layout = record.layout();
    let field = move |c: usize| record.field(c).unwrap_or(".");
    [
        record.chrom(),
        field(layout.start_column()),
        field(layout.end_column()),
        ".",
        ".",
        layout.strand_column().map_or(".", field),
    ]
}
