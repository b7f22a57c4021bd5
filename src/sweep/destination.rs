use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};

use crate::sweep::error::{Result, SweepError};

/// Format of an archive bucket, e.g. `03 March 2024`.
pub const BUCKET_FORMAT: &str = "%m %B %Y";

/// Names the month bucket for a timestamp.
pub fn bucket_name<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    timestamp.format(BUCKET_FORMAT).to_string()
}

/// Resolves the archive bucket for `folder` from its last-modified time,
/// interpreted in local time. The returned directory may not exist yet.
pub fn resolve_destination(folder: &Path, archive_root: &Path) -> Result<PathBuf> {
    let metadata = fs::metadata(folder).map_err(|error| match error.kind() {
        std::io::ErrorKind::NotFound => SweepError::SourceMissing(folder.to_path_buf()),
        _ => error.into(),
    })?;
    let modified = metadata.modified()?;
    let modified: DateTime<Local> = modified.into();
    Ok(archive_root.join(bucket_name(&modified)))
}
