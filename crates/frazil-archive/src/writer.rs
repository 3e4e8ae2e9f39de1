//! Zip archive writing and cleanup.

use chrono::NaiveDate;
use frazil_types::{EventType, FrazilError, Resolution, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::archive_path;

/// Writes one archive: a zip containing a single deflated CSV member.
///
/// Rows can be appended incrementally, which the pipeline uses to stream
/// the tick archive while events are still arriving. The archive is only
/// valid once [`ArchiveWriter::finish`] returns; an abandoned writer leaves
/// a truncated file behind, which the pipeline's cleanup removes.
pub struct ArchiveWriter {
    zip: ZipWriter<BufWriter<File>>,
    path: PathBuf,
}

impl std::fmt::Debug for ArchiveWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveWriter")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ArchiveWriter {
    /// Creates the archive file and starts its CSV member.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or the member cannot
    /// be started.
    pub fn create(path: &Path, member: &str) -> Result<Self> {
        let file = File::create(path)?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(member, options)
            .map_err(|e| FrazilError::Archive(e.to_string()))?;
        Ok(Self {
            zip,
            path: path.to_path_buf(),
        })
    }

    /// Returns the path of the archive being written.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one CSV row (a trailing newline is added).
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_row(&mut self, row: &str) -> Result<()> {
        self.zip.write_all(row.as_bytes())?;
        self.zip.write_all(b"\n")?;
        Ok(())
    }

    /// Finalizes the zip and flushes it to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the central directory or the final flush fails.
    pub fn finish(self) -> Result<()> {
        let mut inner = self
            .zip
            .finish()
            .map_err(|e| FrazilError::Archive(e.to_string()))?;
        inner.flush()?;
        Ok(())
    }
}

/// Writes a complete archive from already-finalized rows.
///
/// # Errors
///
/// Returns an error if the archive cannot be written.
pub fn write_archive<I, S>(path: &Path, member: &str, rows: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut writer = ArchiveWriter::create(path, member)?;
    for row in rows {
        writer.write_row(row.as_ref())?;
    }
    writer.finish()
}

/// Deletes every archive for one (date, type) across all resolutions.
///
/// Used on pipeline failure and cancellation so a retry starts clean
/// instead of resuming from a truncated archive. Missing files are fine;
/// returns the number of files actually removed.
///
/// # Errors
///
/// Returns an error only for I/O failures other than a missing file.
pub fn remove_archives(
    root: &Path,
    instrument: &str,
    date: NaiveDate,
    event_type: EventType,
) -> Result<usize> {
    let mut removed = 0;
    for resolution in Resolution::all() {
        let path = archive_path(root, *resolution, instrument, date, event_type);
        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ensure_layout, member_name};
    use std::io::Read;

    fn read_member(path: &Path, member: &str) -> String {
        let file = File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut content = String::new();
        archive
            .by_name(member)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20180901_trade.zip");

        write_archive(&path, "20180901.csv", ["0,100,10,Buy", "500,101,4,Sell"]).unwrap();

        let content = read_member(&path, "20180901.csv");
        assert_eq!(content, "0,100,10,Buy\n500,101,4,Sell\n");
    }

    #[test]
    fn test_streamed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20180901_quote.zip");

        let mut writer = ArchiveWriter::create(&path, "20180901.csv").unwrap();
        for i in 0..100 {
            writer.write_row(&format!("{i},7063.5,10,7064,20")).unwrap();
        }
        writer.finish().unwrap();

        let content = read_member(&path, "20180901.csv");
        assert_eq!(content.lines().count(), 100);
        assert!(content.starts_with("0,7063.5,10,7064,20\n"));
    }

    #[test]
    fn test_remove_archives_across_resolutions() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2018, 9, 1).unwrap();
        ensure_layout(dir.path(), "xbtusd").unwrap();

        // Only two of five resolutions got written before the failure
        for resolution in [Resolution::Tick, Resolution::Second] {
            let path = archive_path(dir.path(), resolution, "xbtusd", date, EventType::Trade);
            write_archive(&path, &member_name(date), ["0,100,10,Buy"]).unwrap();
        }

        let removed = remove_archives(dir.path(), "xbtusd", date, EventType::Trade).unwrap();
        assert_eq!(removed, 2);

        for resolution in Resolution::all() {
            let path = archive_path(dir.path(), *resolution, "xbtusd", date, EventType::Trade);
            assert!(!path.exists());
        }

        // Idempotent on an already-clean tree
        assert_eq!(
            remove_archives(dir.path(), "xbtusd", date, EventType::Trade).unwrap(),
            0
        );
    }
}
