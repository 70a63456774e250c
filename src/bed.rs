//! Streaming interval file validator.
//!
//! [`FormatValidator`] reads a BED- or GFF-style file one line at a time and
//! yields [`IntervalRecord`]s. Every failure is reported with the source path
//! and the 1-based physical line number (header lines included).
//!
//! Checks, in order, for each data line:
//! 1. Column count and integer coordinates (`end >= start`)
//! 2. Chromosome present in the contig index
//! 3. End coordinate within the contig length (unless blacklist-exempt)
//! 4. Chromosomes grouped in contig-index order
//!
//! Checks 2-4 only run when a [`ContigIndex`] is attached.

use crate::contigs::ContigIndex;
use crate::interval::{IntervalLayout, IntervalRecord};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Character that marks a header line at the top of a file.
pub const HEADER_MARKER: char = '#';

/// Errors that can occur while preparing interval files.
#[derive(Error, Debug)]
pub enum BedError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Cannot access {}: {source}", .path.display())]
    File { path: PathBuf, source: io::Error },

    #[error("Failed to load contig index {}: {message}", .path.display())]
    IndexLoad { path: PathBuf, message: String },

    #[error("Malformed entry at line {line} in {}: {reason}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Malformed entry at line {line} in {}: invalid contig name '{chrom}'", .path.display())]
    UnknownContig {
        path: PathBuf,
        line: usize,
        chrom: String,
    },

    #[error(
        "Malformed entry at line {line} in {}: coordinate {end} exceeds the length of contig '{chrom}' ({length})",
        .path.display()
    )]
    CoordinateOverflow {
        path: PathBuf,
        line: usize,
        chrom: String,
        end: u64,
        length: u64,
    },

    #[error(
        "Malformed entry at line {line} in {}: contig '{chrom}' is not sorted according to the order in the contig index",
        .path.display()
    )]
    UnsortedContig {
        path: PathBuf,
        line: usize,
        chrom: String,
    },

    #[error("Input file {} is gzip compressed, please decompress it first", .0.display())]
    CompressedInput(PathBuf),

    #[error("Cannot find contig index file {}", .0.display())]
    IndexMissing(PathBuf),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Failure class of a [`BedError`], for callers that only need to branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    IndexLoad,
    MalformedRecord,
    UnknownContig,
    CoordinateOverflow,
    UnsortedContig,
    CompressedInput,
    IndexMissing,
    Configuration,
}

impl BedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BedError::Io(_) | BedError::File { .. } => ErrorKind::Io,
            BedError::IndexLoad { .. } => ErrorKind::IndexLoad,
            BedError::MalformedRecord { .. } => ErrorKind::MalformedRecord,
            BedError::UnknownContig { .. } => ErrorKind::UnknownContig,
            BedError::CoordinateOverflow { .. } => ErrorKind::CoordinateOverflow,
            BedError::UnsortedContig { .. } => ErrorKind::UnsortedContig,
            BedError::CompressedInput(_) => ErrorKind::CompressedInput,
            BedError::IndexMissing(_) => ErrorKind::IndexMissing,
            BedError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Attach a path to an I/O error.
    pub(crate) fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BedError::File {
            path: path.into(),
            source,
        }
    }

    /// Line number the error points at, if it is tied to a record.
    pub fn line(&self) -> Option<usize> {
        match self {
            BedError::MalformedRecord { line, .. }
            | BedError::UnknownContig { line, .. }
            | BedError::CoordinateOverflow { line, .. }
            | BedError::UnsortedContig { line, .. } => Some(*line),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BedError>;

/// Open an input file, naming it in the error on failure.
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<File> {
    let path = path.as_ref();
    File::open(path).map_err(|e| BedError::file(path, e))
}

/// Streaming validator over an interval file.
///
/// Single forward pass; once an error has been returned the validator
/// yields nothing further.
pub struct FormatValidator<'a, R: Read> {
    reader: BufReader<R>,
    source: PathBuf,
    layout: IntervalLayout,
    contigs: Option<&'a ContigIndex>,
    blacklist_exempt: bool,
    /// Index position of the last contig seen; never moves backwards.
    cursor: usize,
    line_number: usize,
    header_lines: usize,
    in_header: bool,
    failed: bool,
    buffer: Vec<u8>,
}

impl<'a> FormatValidator<'a, File> {
    /// Open an interval file, inferring its layout from the extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = open_input(path)?;
        Ok(Self::new(file, path).with_layout(IntervalLayout::from_path(path)))
    }
}

impl<'a, R: Read> FormatValidator<'a, R> {
    /// Create a validator over any readable source.
    ///
    /// `source` is only used for error messages.
    pub fn new(reader: R, source: impl Into<PathBuf>) -> Self {
        Self {
            reader: BufReader::new(reader),
            source: source.into(),
            layout: IntervalLayout::Bed,
            contigs: None,
            blacklist_exempt: false,
            cursor: 0,
            line_number: 0,
            header_lines: 0,
            in_header: true,
            failed: false,
            buffer: Vec::with_capacity(1024),
        }
    }

    pub fn with_layout(mut self, layout: IntervalLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Enable contig membership, bounds, and ordering checks.
    pub fn with_contigs(mut self, contigs: &'a ContigIndex) -> Self {
        self.contigs = Some(contigs);
        self
    }

    /// Tolerate end coordinates past the contig length.
    pub fn blacklist_exempt(mut self, exempt: bool) -> Self {
        self.blacklist_exempt = exempt;
        self
    }

    /// Current 1-based line number (0 before the first read).
    #[inline]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Number of leading header lines skipped so far.
    #[inline]
    pub fn header_lines(&self) -> usize {
        self.header_lines
    }

    #[inline]
    pub fn source(&self) -> &Path {
        &self.source
    }

    #[inline]
    pub fn layout(&self) -> IntervalLayout {
        self.layout
    }

    /// Read and validate the next record.
    pub fn read_record(&mut self) -> Result<Option<IntervalRecord>> {
        if self.failed {
            return Ok(None);
        }
        match self.next_record() {
            Ok(record) => Ok(record),
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }

    fn next_record(&mut self) -> Result<Option<IntervalRecord>> {
        loop {
            self.buffer.clear();
            let bytes_read = self
                .reader
                .read_until(b'\n', &mut self.buffer)
                .map_err(|e| BedError::file(&self.source, e))?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let line = match std::str::from_utf8(&self.buffer) {
                Ok(text) => text.trim_end_matches(['\n', '\r']),
                Err(e) => {
                    return Err(self.malformed(format!(
                        "Invalid UTF-8 at byte {}",
                        e.valid_up_to()
                    )))
                }
            };

            // Only leading '#' lines are headers
            if self.in_header && line.starts_with(HEADER_MARKER) {
                self.header_lines += 1;
                continue;
            }
            self.in_header = false;

            if line.trim().is_empty() {
                continue;
            }

            let record = self.parse_line(line)?;
            self.check_contigs(&record)?;
            return Ok(Some(record));
        }
    }

    /// Parse a single data line according to the layout.
    fn parse_line(&self, line: &str) -> Result<IntervalRecord> {
        let fields: Vec<&str> = line.split('\t').collect();

        let min = self.layout.min_columns();
        if fields.len() < min {
            return Err(self.malformed(format!(
                "Expected at least {} tab-delimited fields for {}, got {}",
                min,
                self.layout,
                fields.len()
            )));
        }

        if fields[0].is_empty() {
            return Err(self.malformed("Empty chromosome name".to_string()));
        }

        let start = self.parse_position(fields[self.layout.start_column()], "start")?;
        let end = self.parse_position(fields[self.layout.end_column()], "end")?;

        if end < start {
            return Err(self.malformed(format!("Start ({}) > end ({})", start, end)));
        }

        let fields = fields.into_iter().map(str::to_string).collect();
        Ok(IntervalRecord::from_fields(fields, start, end, self.layout))
    }

    fn parse_position(&self, s: &str, field_name: &str) -> Result<u64> {
        parse_u64_strict(s).ok_or_else(|| {
            self.malformed(format!("Invalid {} position: '{}'", field_name, s))
        })
    }

    fn check_contigs(&mut self, record: &IntervalRecord) -> Result<()> {
        let Some(contigs) = self.contigs else {
            return Ok(());
        };

        let rank = check_against_index(
            contigs,
            record,
            self.blacklist_exempt,
            &self.source,
            self.line_number,
        )?;

        if rank < self.cursor {
            return Err(BedError::UnsortedContig {
                path: self.source.clone(),
                line: self.line_number,
                chrom: record.chrom().to_string(),
            });
        }
        self.cursor = rank;

        Ok(())
    }

    fn malformed(&self, reason: String) -> BedError {
        BedError::MalformedRecord {
            path: self.source.clone(),
            line: self.line_number,
            reason,
        }
    }

    /// Get an iterator over all records.
    pub fn records(self) -> RecordIter<'a, R> {
        RecordIter { validator: self }
    }
}

/// Iterator over validated records.
pub struct RecordIter<'a, R: Read> {
    validator: FormatValidator<'a, R>,
}

impl<R: Read> Iterator for RecordIter<'_, R> {
    type Item = Result<IntervalRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.validator.read_record().transpose()
    }
}

/// Check a record's chromosome and end coordinate against the index.
///
/// Returns the contig's position in index order.
pub(crate) fn check_against_index(
    contigs: &ContigIndex,
    record: &IntervalRecord,
    blacklist_exempt: bool,
    source: &Path,
    line: usize,
) -> Result<usize> {
    let chrom = record.chrom();
    let (rank, length) = contigs
        .position(chrom)
        .zip(contigs.length_of(chrom))
        .ok_or_else(|| BedError::UnknownContig {
            path: source.to_path_buf(),
            line,
            chrom: chrom.to_string(),
        })?;

    if record.end() > length {
        if !blacklist_exempt {
            return Err(BedError::CoordinateOverflow {
                path: source.to_path_buf(),
                line,
                chrom: chrom.to_string(),
                end: record.end(),
                length,
            });
        }
        debug!(
            "{}:{}: tolerating {} past the end of {} ({}) for blacklist input",
            source.display(),
            line,
            record.interval,
            chrom,
            length
        );
    }

    Ok(rank)
}

/// Parse an unsigned decimal integer, rejecting signs, whitespace and overflow.
#[inline]
pub fn parse_u64_strict(s: &str) -> Option<u64> {
    if s.is_empty() {
        return None;
    }
    let mut n: u64 = 0;
    for b in s.bytes() {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        n = n.checked_mul(10)?.checked_add(d as u64)?;
    }
    Some(n)
}

/// gzip member header magic.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Returns true if the path ends in `.gz` or the file starts with the gzip magic bytes.
pub fn is_gzip_compressed<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = path.as_ref();
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("gz")) {
        return Ok(true);
    }
    let mut magic = [0u8; 2];
    let mut file = open_input(path)?;
    let mut filled = 0;
    while filled < magic.len() {
        let n = file
            .read(&mut magic[filled..])
            .map_err(|e| BedError::file(path, e))?;
        if n == 0 {
            return Ok(false);
        }
        filled += n;
    }
    Ok(magic == GZIP_MAGIC)
}

/// Validate an in-memory BED string without contig checks (useful for testing).
pub fn parse_records(content: &str) -> Result<Vec<IntervalRecord>> {
    FormatValidator::new(content.as_bytes(), "<memory>")
        .records()
        .collect()
}
