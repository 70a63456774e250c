//! Staged output files.
//!
//! Every file this crate produces is written to a temporary file in the
//! destination directory and renamed over the destination only once the
//! whole stream has been written. A failure part-way leaves the previous
//! destination (if any) untouched and the temporary file is removed on drop.

use crate::bed::BedError;
use crate::interval::IntervalRecord;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Output buffer size (256 KB).
const DEFAULT_BUFFER_SIZE: usize = 256 * 1024;

/// Buffered line writer backed by a temporary file next to its destination.
pub struct AtomicOutput {
    writer: BufWriter<NamedTempFile>,
    destination: PathBuf,
    lines_written: usize,
}

impl AtomicOutput {
    /// Stage a new output for `destination`.
    pub fn create<P: AsRef<Path>>(destination: P) -> Result<Self, BedError> {
        let destination = destination.as_ref().to_path_buf();
        let dir = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let temp = NamedTempFile::new_in(&dir).map_err(|e| BedError::file(dir, e))?;
        Ok(Self {
            writer: BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, temp),
            destination,
            lines_written: 0,
        })
    }

    /// Write a record's columns followed by newline.
    #[inline]
    pub fn write_record(&mut self, record: &IntervalRecord) -> Result<(), BedError> {
        self.write_fields(record.fields().iter().map(String::as_str))
    }

    /// Write tab-joined fields followed by newline.
    pub fn write_fields<'f, I>(&mut self, fields: I) -> Result<(), BedError>
    where
        I: IntoIterator<Item = &'f str>,
    {
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                self.write_bytes(b"\t")?;
            }
            self.write_bytes(field.as_bytes())?;
        }
        self.write_bytes(b"\n")?;
        self.lines_written += 1;
        Ok(())
    }

    /// Write a full line as-is with newline.
    #[inline]
    pub fn write_line(&mut self, line: &str) -> Result<(), BedError> {
        self.write_bytes(line.as_bytes())?;
        self.write_bytes(b"\n")?;
        self.lines_written += 1;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BedError> {
        self.writer
            .write_all(bytes)
            .map_err(|e| BedError::file(&self.destination, e))
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    /// Flush and atomically move the staged file over the destination.
    pub fn commit(self) -> Result<usize, BedError> {
        self.finish()?.persist()
    }

    /// Flush and sync the staged file without moving it into place.
    fn finish(self) -> Result<Staged, BedError> {
        let destination = self.destination;
        let temp = self
            .writer
            .into_inner()
            .map_err(|e| BedError::file(&destination, e.into_error()))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| BedError::file(&destination, e))?;
        Ok(Staged {
            temp,
            destination,
            lines_written: self.lines_written,
        })
    }
}

/// A fully written temporary file waiting to be renamed.
struct Staged {
    temp: NamedTempFile,
    destination: PathBuf,
    lines_written: usize,
}

impl Staged {
    fn persist(self) -> Result<usize, BedError> {
        let destination = self.destination;
        self.temp
            .persist(&destination)
            .map_err(|e| BedError::file(destination, e.error))?;
        Ok(self.lines_written)
    }
}

/// Commit a group of outputs that must appear together.
///
/// Every output is flushed before any is renamed. If a rename fails, the
/// destinations already moved into place are removed again, so the caller
/// never sees only part of the group.
pub fn commit_all(outputs: Vec<AtomicOutput>) -> Result<Vec<usize>, BedError> {
    let staged = outputs
        .into_iter()
        .map(AtomicOutput::finish)
        .collect::<Result<Vec<_>, _>>()?;

    let mut committed: Vec<PathBuf> = Vec::with_capacity(staged.len());
    let mut counts = Vec::with_capacity(staged.len());
    for output in staged {
        let destination = output.destination.clone();
        match output.persist() {
            Ok(lines) => {
                committed.push(destination);
                counts.push(lines);
            }
            Err(e) => {
                for path in &committed {
                    let _ = fs::remove_file(path);
                }
                return Err(e);
            }
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_commit_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bed");
        fs::write(&dest, "old\n").unwrap();

        let mut out = AtomicOutput::create(&dest).unwrap();
        out.write_fields(["chr1", "1", "2"]).unwrap();
        out.write_line("chr2\t3\t4").unwrap();
        assert_eq!(out.lines_written(), 2);
        // Nothing visible until commit
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old\n");

        assert_eq!(out.commit().unwrap(), 2);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "chr1\t1\t2\nchr2\t3\t4\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_commit_all_writes_every_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = AtomicOutput::create(dir.path().join("a.bed")).unwrap();
        let b = AtomicOutput::create(dir.path().join("b.bed")).unwrap();
        a.write_line("chr1\t1\t2").unwrap();

        assert_eq!(commit_all(vec![a, b]).unwrap(), vec![1, 0]);
        assert_eq!(fs::read_to_string(dir.path().join("a.bed")).unwrap(), "chr1\t1\t2\n");
        assert_eq!(fs::read_to_string(dir.path().join("b.bed")).unwrap(), "");
    }

    #[test]
    fn test_commit_all_rolls_back_on_failed_rename() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way makes the second rename fail
        let blocked = dir.path().join("b.bed");
        fs::create_dir(&blocked).unwrap();
        fs::write(blocked.join("keep"), "x").unwrap();

        let mut a = AtomicOutput::create(dir.path().join("a.bed")).unwrap();
        a.write_line("chr1\t1\t2").unwrap();
        let b = AtomicOutput::create(&blocked).unwrap();

        let err = commit_all(vec![a, b]).unwrap_err();
        assert!(err.to_string().contains("b.bed"));
        assert!(!dir.path().join("a.bed").exists());
        assert!(blocked.is_dir());
    }

    #[test]
    fn test_drop_without_commit_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bed");
        {
            let mut out = AtomicOutput::create(&dest).unwrap();
            out.write_line("partial").unwrap();
        }
        assert!(!dest.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
