//! bedprep: reference-aware preparation of genomic interval files.
//!
//! Validates BED/GFF-style interval files against a reference contig index,
//! canonicalizes chromosome names for a species, sorts and deduplicates
//! records in reference order, and splits regulatory annotations into
//! promoter and enhancer subsets.
//!
//! # Features
//!
//! - **Streaming validation**: line-numbered, fail-fast format checks
//! - **Atomic outputs**: results are staged and moved into place only on success
//! - **Data-driven naming**: species naming schemes loadable from TOML
//!
//! # Example
//!
//! ```rust,no_run
//! use bedprep::pipeline::{clean_file, load_contig_index, sort_dedup_file};
//!
//! let contigs = load_contig_index("genome.fa.fai").unwrap();
//! clean_file("raw_blacklist.bed", "mouse", "blacklist.bed", true, Some(&contigs)).unwrap();
//! sort_dedup_file("blacklist.bed", "genome.fa.fai", true).unwrap();
//! ```

pub mod bed;
pub mod commands;
pub mod config;
pub mod contigs;
pub mod interval;
pub mod naming;
pub mod output;
pub mod pipeline;

// Re-export commonly used types
pub use bed::{BedError, ErrorKind, FormatValidator};
pub use contigs::ContigIndex;
pub use interval::{Interval, IntervalLayout, IntervalRecord};
pub use naming::ChromNameNormalizer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::bed::{BedError, ErrorKind, FormatValidator};
    pub use crate::commands::{
        CleanCommand, PartitionCounts, SortDedupCommand, SplitRegulatoryCommand,
        ValidateCommand,
    };
    pub use crate::config::SpeciesTable;
    pub use crate::contigs::ContigIndex;
    pub use crate::interval::{Interval, IntervalLayout, IntervalRecord};
    pub use crate::naming::ChromNameNormalizer;
}
