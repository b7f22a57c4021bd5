use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, instrument, warn};

use crate::sweep::candidates::build_candidate_map;
use crate::sweep::destination::resolve_destination;
use crate::sweep::error::{Result, SweepError};
use crate::sweep::io::excel_read::{is_report, read_tokens};
use crate::sweep::io::relocate::move_folder;
use crate::sweep::matcher::find_matches;
use crate::sweep::model::{
    CandidateMap, FileOutcome, FileReport, MatchResult, Relocation, RelocationOutcome, RunReport,
    SweepEvent, SweepRequest,
};

/// Percentage of reports done after finishing the report at `index`.
///
/// Halves round up, so 1 of 8 reports is 13%. The last report always
/// yields 100.
pub fn progress_percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = (index + 1).min(total);
    ((done * 100 + total / 2) / total) as u8
}

/// Lists the spreadsheet reports in `dir`, sorted by file name.
pub fn list_reports(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(SweepError::MissingInput(dir.to_path_buf()));
    }

    let mut reports = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_report(&path) {
            reports.push(path);
        }
    }
    reports.sort_by(|lhs, rhs| lhs.file_name().cmp(&rhs.file_name()));
    Ok(reports)
}

/// Runs a sweep on the calling thread.
///
/// `on_progress` is called once per report file, or once with 100 when there
/// are none. Only a candidate pool or report source that cannot be listed
/// fails the run; unreadable reports and failed moves are recorded in the
/// returned [`RunReport`].
#[instrument(
    level = "info",
    skip_all,
    fields(
        reports = %request.report_source.display(),
        pool = %request.candidate_pool.display(),
        archive = %request.archive_root.display()
    )
)]
pub fn run(request: &SweepRequest, mut on_progress: impl FnMut(u8)) -> Result<RunReport> {
    let candidates = build_candidate_map(&request.candidate_pool)?;
    info!(folder_count = candidates.len(), "candidate folders found");

    let reports = list_reports(&request.report_source)?;
    info!(report_count = reports.len(), "report files found");

    let mut report = RunReport {
        candidates: candidates.len(),
        files: Vec::with_capacity(reports.len()),
    };
    if reports.is_empty() {
        on_progress(100);
    }

    for (index, path) in reports.iter().enumerate() {
        let outcome = process_report(path, &candidates, request);
        report.files.push(FileReport {
            path: path.clone(),
            outcome,
        });
        on_progress(progress_percent(index, reports.len()));
    }

    info!(
        moved = report.moved(),
        failed = report.failed(),
        skipped_files = report.skipped_files(),
        "sweep finished"
    );
    Ok(report)
}

/// Starts a sweep on a background thread and returns a handle to its events.
pub fn spawn(request: SweepRequest) -> Result<SweepHandle> {
    let (sender, events) = mpsc::channel();
    let worker = thread::Builder::new()
        .name("folder-sweep".into())
        .spawn(move || {
            let progress = sender.clone();
            let result = run(&request, |percent| {
                let _ = progress.send(SweepEvent::Progress(percent));
            });
            let _ = sender.send(SweepEvent::Finished(result));
        })?;
    Ok(SweepHandle { events, worker })
}

/// Receiving side of a sweep started with [`spawn`].
#[derive(Debug)]
pub struct SweepHandle {
    pub events: Receiver<SweepEvent>,
    worker: JoinHandle<()>,
}

impl SweepHandle {
    /// Blocks until the run finishes, forwarding progress to `on_progress`.
    pub fn wait(self, mut on_progress: impl FnMut(u8)) -> Result<RunReport> {
        let mut finished = None;
        for event in self.events.iter() {
            match event {
                SweepEvent::Progress(percent) => on_progress(percent),
                SweepEvent::Finished(result) => {
                    finished = Some(result);
                    break;
                }
            }
        }
        self.worker.join().map_err(|_| SweepError::WorkerPanicked)?;
        finished.unwrap_or(Err(SweepError::WorkerPanicked))
    }
}

fn process_report(path: &Path, candidates: &CandidateMap, request: &SweepRequest) -> FileOutcome {
    debug!(report = %path.display(), "processing report");
    let tokens = match read_tokens(path, request.options.header_row) {
        Ok(tokens) => tokens,
        Err(error) => {
            warn!(report = %path.display(), %error, "skipping unreadable report");
            return FileOutcome::Skipped {
                reason: error.to_string(),
            };
        }
    };
    debug!(report = %path.display(), ?tokens, "extracted tokens");

    let mut relocations = Vec::new();
    for token in &tokens {
        for matched in find_matches(token, candidates) {
            debug!(token = %matched.token, folder = %matched.folder_name, "match found");
            let outcome = relocate(&matched, &request.archive_root);
            relocations.push(Relocation { matched, outcome });
        }
    }

    FileOutcome::Processed {
        tokens: tokens.len(),
        relocations,
    }
}

fn relocate(matched: &MatchResult, archive_root: &Path) -> RelocationOutcome {
    let source = &matched.folder_path;
    let result = resolve_destination(source, archive_root).and_then(|destination| {
        debug!(
            source = %source.display(),
            destination = %destination.display(),
            "moving folder"
        );
        move_folder(source, &destination)
    });

    match result {
        Ok(moved) => {
            info!(
                folder = %matched.folder_name,
                target = %moved.target.display(),
                renamed = moved.renamed,
                "folder relocated"
            );
            RelocationOutcome::Moved {
                target: moved.target,
                renamed: moved.renamed,
            }
        }
        Err(error) if error.is_source_missing() => {
            debug!(source = %source.display(), "folder already gone");
            RelocationOutcome::SourceMissing
        }
        Err(error) => {
            warn!(source = %source.display(), %error, "relocation failed");
            RelocationOutcome::Failed {
                reason: error.to_string(),
            }
        }
    }
}
