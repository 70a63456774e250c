//! Core interval types for genomic region representation.

use std::fmt;
use std::path::Path;

/// A genomic interval with chromosome, start, and end positions.
/// Uses 0-based, half-open coordinates (BED format).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl Interval {
    /// Create a new interval.
    #[inline]
    pub fn new(chrom: impl Into<String>, start: u64, end: u64) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.chrom, self.start, self.end)
    }
}

/// Column layout of an interval file.
///
/// BED carries chrom/start/end in columns 1-3. GFF-style files carry them
/// in columns 1, 4 and 5, with strand in column 7 and the attribute /
/// annotation text in column 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntervalLayout {
    #[default]
    Bed,
    Gff,
}

impl IntervalLayout {
    /// Infer the layout from a file extension (`.gff`, `.gff3`, `.gtf` are GFF).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("gff") | Some("gff3") | Some("gtf") => IntervalLayout::Gff,
            _ => IntervalLayout::Bed,
        }
    }

    /// Zero-based column index of the start coordinate.
    #[inline]
    pub fn start_column(self) -> usize {
        match self {
            IntervalLayout::Bed => 1,
            IntervalLayout::Gff => 3,
        }
    }

    /// Zero-based column index of the end coordinate.
    #[inline]
    pub fn end_column(self) -> usize {
        match self {
            IntervalLayout::Bed => 2,
            IntervalLayout::Gff => 4,
        }
    }

    /// Minimum number of tab-delimited columns a record must have.
    #[inline]
    pub fn min_columns(self) -> usize {
        match self {
            IntervalLayout::Bed => 3,
            IntervalLayout::Gff => 9,
        }
    }

    /// Zero-based column index of the strand, if the layout defines one.
    #[inline]
    pub fn strand_column(self) -> Option<usize> {
        match self {
            IntervalLayout::Bed => None,
            IntervalLayout::Gff => Some(6),
        }
    }

    /// Zero-based column index of the annotation type, if the layout defines one.
    #[inline]
    pub fn annotation_column(self) -> Option<usize> {
        match self {
            IntervalLayout::Bed => None,
            IntervalLayout::Gff => Some(8),
        }
    }

    fn is_coordinate(self, column: usize) -> bool {
        column == 0 || column == self.start_column() || column == self.end_column()
    }
}

impl fmt::Display for IntervalLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalLayout::Bed => write!(f, "BED"),
            IntervalLayout::Gff => write!(f, "GFF"),
        }
    }
}

/// One parsed interval line.
///
/// All original columns are kept verbatim so the record can be written back
/// unchanged apart from the chromosome, which is the only field ever rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalRecord {
    pub interval: Interval,
    layout: IntervalLayout,
    /// Every column of the source line, chrom included.
    fields: Vec<String>,
}

impl IntervalRecord {
    /// Build a record from already-split columns and parsed coordinates.
    ///
    /// Callers are expected to have checked that `fields` satisfies the layout.
    pub(crate) fn from_fields(
        fields: Vec<String>,
        start: u64,
        end: u64,
        layout: IntervalLayout,
    ) -> Self {
        Self {
            interval: Interval::new(fields[0].clone(), start, end),
            layout,
            fields,
        }
    }

    /// Get the chromosome.
    #[inline]
    pub fn chrom(&self) -> &str {
        &self.interval.chrom
    }

    /// Get the start position.
    #[inline]
    pub fn start(&self) -> u64 {
        self.interval.start
    }

    /// Get the end position.
    #[inline]
    pub fn end(&self) -> u64 {
        self.interval.end
    }

    #[inline]
    pub fn layout(&self) -> IntervalLayout {
        self.layout
    }

    /// All columns in file order.
    #[inline]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Get a column by zero-based index.
    #[inline]
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Columns other than chrom/start/end, in file order.
    pub fn extra_fields(&self) -> impl Iterator<Item = &str> {
        let layout = self.layout;
        self.fields
            .iter()
            .enumerate()
            .filter(move |(i, _)| !layout.is_coordinate(*i))
            .map(|(_, f)| f.as_str())
    }

    /// Replace the chromosome name.
    pub fn set_chrom(&mut self, chrom: impl Into<String>) {
        let chrom = chrom.into();
        self.fields[0] = chrom.clone();
        self.interval.chrom = chrom;
    }

    /// Drop every column past the end coordinate.
    ///
    /// For GFF records this also drops the source/type columns, leaving a
    /// BED3-shaped line built from the original coordinate strings.
    pub fn truncate_to_bed3(&mut self) {
        if self.layout == IntervalLayout::Gff {
            let start = std::mem::take(&mut self.fields[self.layout.start_column()]);
            let end = std::mem::take(&mut self.fields[self.layout.end_column()]);
            let chrom = std::mem::take(&mut self.fields[0]);
            self.fields = vec![chrom, start, end];
        } else {
            self.fields.truncate(3);
        }
        self.layout = IntervalLayout::Bed;
    }
}

impl fmt::Display for IntervalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields.join("\t"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: &str, layout: IntervalLayout) -> IntervalRecord {
        let fields: Vec<String> = line.split('\t').map(str::to_string).collect();
        let start = fields[layout.start_column()].parse().unwrap();
        let end = fields[layout.end_column()].parse().unwrap();
        IntervalRecord::from_fields(fields, start, end, layout)
    }

    #[test]
    fn test_interval_display() {
        let a = Interval::new("chr1", 100, 200);
        assert_eq!(a.to_string(), "chr1\t100\t200");
    }

    #[test]
    fn test_layout_from_path() {
        assert_eq!(IntervalLayout::from_path("a.bed"), IntervalLayout::Bed);
        assert_eq!(IntervalLayout::from_path("reg.gff"), IntervalLayout::Gff);
        assert_eq!(IntervalLayout::from_path("reg.GFF3"), IntervalLayout::Gff);
        assert_eq!(IntervalLayout::from_path("genes.gtf"), IntervalLayout::Gff);
        assert_eq!(IntervalLayout::from_path("noext"), IntervalLayout::Bed);
    }

    #[test]
    fn test_extra_fields_bed() {
        let rec = record("chr1\t10\t20\tname\t0\t+", IntervalLayout::Bed);
        let extra: Vec<_> = rec.extra_fields().collect();
        assert_eq!(extra, vec!["name", "0", "+"]);
    }

    #[test]
    fn test_extra_fields_gff() {
        let rec = record(
            "chr1\tsrc\tfeature\t11\t20\t.\t+\t.\tID=x",
            IntervalLayout::Gff,
        );
        assert_eq!(rec.start(), 11);
        assert_eq!(rec.end(), 20);
        let extra: Vec<_> = rec.extra_fields().collect();
        assert_eq!(extra, vec!["src", "feature", ".", "+", ".", "ID=x"]);
    }

    #[test]
    fn test_set_chrom_rewrites_output() {
        let mut rec = record("1\t10\t20\tpeak", IntervalLayout::Bed);
        rec.set_chrom("chr1");
        assert_eq!(rec.chrom(), "chr1");
        assert_eq!(rec.to_string(), "chr1\t10\t20\tpeak");
    }

    #[test]
    fn test_truncate_to_bed3() {
        let mut rec = record("chr1\t10\t20\tpeak\t5", IntervalLayout::Bed);
        rec.truncate_to_bed3();
        assert_eq!(rec.to_string(), "chr1\t10\t20");

        let mut gff = record(
            "chr2\tsrc\tfeature\t11\t20\t.\t-\t.\tID=x",
            IntervalLayout::Gff,
        );
        gff.truncate_to_bed3();
        assert_eq!(gff.to_string(), "chr2\t11\t20");
        assert_eq!(gff.layout(), IntervalLayout::Bed);
        assert_eq!(gff.extra_fields().count(), 0);
    }
}
