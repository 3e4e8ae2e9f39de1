//! Output tree layout.

use chrono::NaiveDate;
use frazil_types::{COMPACT_DATE_FORMAT, EventType, Resolution};
use std::path::{Path, PathBuf};

/// Returns the archive path for one (date, type, resolution) triple.
///
/// Layout: `{root}/{resolution}/{instrument}/{YYYYMMDD}_{type}.zip`
#[must_use]
pub fn archive_path(
    root: &Path,
    resolution: Resolution,
    instrument: &str,
    date: NaiveDate,
    event_type: EventType,
) -> PathBuf {
    root.join(resolution.as_str()).join(instrument).join(format!(
        "{}_{}.zip",
        date.format(COMPACT_DATE_FORMAT),
        event_type.as_str()
    ))
}

/// Returns the name of the single CSV member inside an archive.
#[must_use]
pub fn member_name(date: NaiveDate) -> String {
    format!("{}.csv", date.format(COMPACT_DATE_FORMAT))
}

/// Creates the per-resolution instrument directories up front.
///
/// Failing here is the only process-fatal condition; pipelines assume the
/// tree exists.
///
/// # Errors
///
/// Returns an error if a directory cannot be created.
pub fn ensure_layout(root: &Path, instrument: &str) -> std::io::Result<()> {
    for resolution in Resolution::all() {
        std::fs::create_dir_all(root.join(resolution.as_str()).join(instrument))?;
    }
    Ok(())
}
