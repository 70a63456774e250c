//! File-level operations and the end-to-end preparation drivers.
//!
//! Each function loads what it needs, runs one command, and surfaces the
//! first error unchanged so a batch caller can decide whether to stop or
//! move on to the next file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::bed::{BedError, Result};
use crate::commands::{
    CleanCommand, CleanStats, PartitionCounts, SortDedupCommand, SortDedupStats,
    SplitRegulatoryCommand, ValidateCommand, ValidateStats,
};
use crate::config::SpeciesTable;
use crate::contigs::ContigIndex;
use crate::interval::IntervalLayout;
use crate::naming::ChromNameNormalizer;

/// Load a contig index, failing with [`BedError::IndexMissing`] if the file does not exist.
pub fn load_contig_index<P: AsRef<Path>>(path: P) -> Result<ContigIndex> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(BedError::IndexMissing(path.to_path_buf()));
    }
    let index = ContigIndex::load(path)?;
    debug!("Loaded {} contigs from {}", index.len(), path.display());
    Ok(index)
}

/// Normalize chromosome names in `path` and write the kept records to `output`.
///
/// With `contigs`, every renamed record must be on an indexed contig and end
/// within it; `is_blacklist` lifts the end-of-contig limit.
pub fn clean_file<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    species: &str,
    output: Q,
    is_blacklist: bool,
    contigs: Option<&ContigIndex>,
) -> Result<CleanStats> {
    let mut cmd = CleanCommand::new(ChromNameNormalizer::new(species)?);
    cmd.blacklist = is_blacklist;
    if let Some(contigs) = contigs {
        cmd = cmd.with_contigs(contigs);
    }
    cmd.run(path, output)
}

/// Sort `path` into contig-index order and drop duplicate lines, in place.
pub fn sort_dedup_file<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    contig_index_path: Q,
    project_bed3: bool,
) -> Result<SortDedupStats> {
    let contigs = load_contig_index(contig_index_path)?;
    let mut cmd = SortDedupCommand::new(&contigs);
    cmd.project_bed3 = project_bed3;
    cmd.run(path)
}

/// Split a cleaned regulatory GFF into `promoter.bed` and `enhancer.bed`.
pub fn split_regulatory_file<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(
    path: P,
    contig_index_path: Q,
    output_dir: R,
) -> Result<PartitionCounts> {
    let contigs = load_contig_index(contig_index_path)?;
    SplitRegulatoryCommand::new(&contigs).run(path, output_dir)
}

/// Run every format check on `path` without writing anything.
pub fn validate_file<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    contig_index_path: Q,
    blacklist_exempt: bool,
) -> Result<ValidateStats> {
    let contigs = load_contig_index(contig_index_path)?;
    let mut cmd = ValidateCommand::new(&contigs);
    cmd.blacklist = blacklist_exempt;
    cmd.run(path)
}

/// Inputs for [`prepare_blacklist`].
#[derive(Debug, Clone)]
pub struct BlacklistJob {
    pub bed: PathBuf,
    pub species: String,
    pub output: PathBuf,
    pub contig_index: PathBuf,
    pub copy_to: Option<PathBuf>,
    pub species_table: SpeciesTable,
}

/// Clean a blacklist BED, sort and dedup it down to three columns, and
/// optionally copy the result elsewhere.
pub fn prepare_blacklist(job: &BlacklistJob) -> Result<SortDedupStats> {
    let normalizer = ChromNameNormalizer::with_table(&job.species, &job.species_table)?;
    let contigs = load_contig_index(&job.contig_index)?;

    let mut clean = CleanCommand::new(normalizer).with_contigs(&contigs);
    clean.blacklist = true;
    clean.layout = Some(IntervalLayout::Bed);
    clean.run(&job.bed, &job.output)?;

    let mut sort = SortDedupCommand::new(&contigs);
    sort.project_bed3 = true;
    sort.layout = Some(IntervalLayout::Bed);
    let stats = sort.run(&job.output)?;

    if let Some(dest) = &job.copy_to {
        copy_into(&job.output, dest)?;
    }
    Ok(stats)
}

/// Inputs for [`prepare_regulatory`].
#[derive(Debug, Clone)]
pub struct RegulatoryJob {
    pub gff: PathBuf,
    pub species: String,
    /// Cleaned GFF written here and removed once the split succeeds.
    pub intermediate: PathBuf,
    pub contig_index: PathBuf,
    pub output_dir: PathBuf,
    pub copy_to: Option<PathBuf>,
    pub species_table: SpeciesTable,
}

/// Clean and sort a regulatory GFF, split it into promoter and enhancer
/// BED files, and optionally copy both elsewhere.
pub fn prepare_regulatory(job: &RegulatoryJob) -> Result<PartitionCounts> {
    let normalizer = ChromNameNormalizer::with_table(&job.species, &job.species_table)?;
    let contigs = load_contig_index(&job.contig_index)?;

    let mut clean = CleanCommand::new(normalizer);
    clean.layout = Some(IntervalLayout::Gff);
    clean.run(&job.gff, &job.intermediate)?;

    let mut sort = SortDedupCommand::new(&contigs);
    sort.layout = Some(IntervalLayout::Gff);
    sort.run(&job.intermediate)?;

    let counts = SplitRegulatoryCommand::new(&contigs).run(&job.intermediate, &job.output_dir)?;

    if let Some(dest) = &job.copy_to {
        let (promoter, enhancer) = SplitRegulatoryCommand::output_paths(&job.output_dir);
        copy_into(&enhancer, dest)?;
        copy_into(&promoter, dest)?;
    }

    fs::remove_file(&job.intermediate).map_err(|e| BedError::file(&job.intermediate, e))?;
    Ok(counts)
}

/// Copy `src` to `dest`, or into `dest` if it is a directory.
fn copy_into(src: &Path, dest: &Path) -> Result<PathBuf> {
    let target = match src.file_name() {
        Some(name) if dest.is_dir() => dest.join(name),
        _ => dest.to_path_buf(),
    };
    fs::copy(src, &target).map_err(|e| BedError::file(&target, e))?;
    info!("Copied {} to {}", src.display(), target.display());
    Ok(target)
}
