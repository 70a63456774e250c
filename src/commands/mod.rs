//! Command implementations for bedprep.

pub mod clean;
pub mod sort;
pub mod split;
pub mod validate;

pub use clean::{CleanCommand, CleanStats};
pub use sort::{SortDedupCommand, SortDedupStats};
pub use split::{PartitionCounts, RegulatoryClass, SplitRegulatoryCommand};
pub use validate::{ValidateCommand, ValidateStats};
