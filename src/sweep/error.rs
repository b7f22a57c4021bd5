use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, SweepError>;

/// Error type covering the failure cases of a sweep: building the candidate
/// map, reading reports, relocating folders and writing summaries.
#[derive(Debug, Error)]
pub enum SweepError {
    /// Wrapper for IO failures such as reading or renaming entries.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the candidate pool cannot be listed. Aborts the run.
    #[error("cannot read candidate pool {path}: {source}")]
    CandidatePool {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Errors bubbled up from the spreadsheet reader.
    #[error("spreadsheet read error: {0}")]
    ExcelRead(#[from] calamine::Error),

    /// Errors bubbled up from the Excel writer used for summaries.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Raised when JSON serialization of a summary fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised while walking a folder tree during a cross-device copy.
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Raised when a workbook opens but has no readable worksheet.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when a report path does not carry a spreadsheet extension.
    #[error("unsupported report format: {0}")]
    UnsupportedReport(PathBuf),

    /// Raised when a matched folder no longer exists at its recorded path.
    #[error("source folder no longer exists: {0}")]
    SourceMissing(PathBuf),

    /// Raised when a cross-device copy completed but the original could not
    /// be removed, leaving the folder in both places.
    #[error("copied {source_path} to {target} but could not remove the original: {error}")]
    SourceNotRemoved {
        source_path: PathBuf,
        target: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Raised when the user provides a path that does not exist.
    #[error("input path not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when a required directory argument is empty.
    #[error("{0} path must not be empty")]
    EmptyPath(&'static str),

    /// Raised when a summary path has an extension with no known writer.
    #[error("unsupported summary format: {0}")]
    UnsupportedSummary(PathBuf),

    /// Raised when the background worker terminates without reporting.
    #[error("sweep worker terminated unexpectedly")]
    WorkerPanicked,

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl SweepError {
    /// Whether the error stems from the source entry having disappeared.
    pub fn is_source_missing(&self) -> bool {
        matches!(self, SweepError::SourceMissing(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn only_source_checks_count_as_missing() {
        assert!(SweepError::SourceMissing(PathBuf::from("pool/Acme Corp")).is_source_missing());

        let elsewhere = SweepError::Io(std::io::Error::from(ErrorKind::NotFound));
        assert!(!elsewhere.is_source_missing());
    }
}
