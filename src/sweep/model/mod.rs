use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Mapping from a candidate folder's literal name to its full path.
///
/// The map is captured once at the start of a run and never refreshed, so an
/// entry may point at a folder that an earlier match already relocated.
pub type CandidateMap = BTreeMap<String, PathBuf>;

/// Directories and options describing a single sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepRequest {
    /// Directory holding the spreadsheet reports.
    pub report_source: PathBuf,
    /// Directory whose immediate subdirectories may be relocated.
    pub candidate_pool: PathBuf,
    /// Directory under which relocated folders are filed by month.
    pub archive_root: PathBuf,
    pub options: SweepOptions,
}

impl SweepRequest {
    pub fn new(
        report_source: impl Into<PathBuf>,
        candidate_pool: impl Into<PathBuf>,
        archive_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            report_source: report_source.into(),
            candidate_pool: candidate_pool.into(),
            archive_root: archive_root.into(),
            options: SweepOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SweepOptions) -> Self {
        self.options = options;
        self
    }
}

/// Tunables for reading reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOptions {
    /// Treat the first row of each report as a heading rather than a token.
    pub header_row: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self { header_row: true }
    }
}

/// A token that matched a candidate folder name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub token: String,
    pub folder_name: String,
    pub folder_path: PathBuf,
}

/// Result of attempting to relocate one matched folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RelocationOutcome {
    /// The folder now lives at `target`. `renamed` is set when a collision
    /// suffix was appended.
    Moved { target: PathBuf, renamed: bool },
    /// The folder was gone by the time the move was attempted.
    SourceMissing,
    /// The move was abandoned for another reason.
    Failed { reason: String },
}

/// One relocation attempt triggered by a token match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
    #[serde(flatten)]
    pub matched: MatchResult,
    pub outcome: RelocationOutcome,
}

impl Relocation {
    pub fn is_moved(&self) -> bool {
        matches!(self.outcome, RelocationOutcome::Moved { .. })
    }
}

/// What happened to a single report file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// The report was read; every match it produced is listed.
    Processed {
        tokens: usize,
        relocations: Vec<Relocation>,
    },
    /// The report could not be read and contributed nothing.
    Skipped { reason: String },
}

/// Per-file entry of a [`RunReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn relocations(&self) -> &[Relocation] {
        match &self.outcome {
            FileOutcome::Processed { relocations, .. } => relocations,
            FileOutcome::Skipped { .. } => &[],
        }
    }
}

/// Structured record of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Number of candidate folders found when the run started.
    pub candidates: usize,
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn relocations(&self) -> impl Iterator<Item = (&FileReport, &Relocation)> {
        self.files
            .iter()
            .flat_map(|file| file.relocations().iter().map(move |item| (file, item)))
    }

    pub fn moved(&self) -> usize {
        self.relocations().filter(|(_, item)| item.is_moved()).count()
    }

    pub fn failed(&self) -> usize {
        self.relocations()
            .filter(|(_, item)| matches!(item.outcome, RelocationOutcome::Failed { .. }))
            .count()
    }

    pub fn skipped_files(&self) -> usize {
        self.files
            .iter()
            .filter(|file| matches!(file.outcome, FileOutcome::Skipped { .. }))
            .count()
    }
}

/// Notification sent from the sweep worker to its caller.
#[derive(Debug)]
pub enum SweepEvent {
    /// Percentage of report files processed so far.
    Progress(u8),
    /// Terminal event, sent exactly once per run.
    Finished(crate::sweep::Result<RunReport>),
}

/// A relocation the planner expects a run to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMove {
    pub report: PathBuf,
    #[serde(flatten)]
    pub matched: MatchResult,
    pub target: PathBuf,
}
