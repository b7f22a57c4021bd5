use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{info, instrument, warn};

use crate::sweep::candidates::build_candidate_map;
use crate::sweep::destination::resolve_destination;
use crate::sweep::engine::list_reports;
use crate::sweep::error::Result;
use crate::sweep::io::excel_read::read_tokens;
use crate::sweep::io::relocate::unique_target;
use crate::sweep::matcher::find_matches;
use crate::sweep::model::{PlannedMove, SweepRequest};

/// Works out which folders a run would relocate and where, without moving
/// anything.
///
/// Each folder is planned once, for the first token that claims it. Targets
/// account for entries already in the archive and for targets planned
/// earlier in the same pass.
#[instrument(
    level = "info",
    skip_all,
    fields(
        reports = %request.report_source.display(),
        pool = %request.candidate_pool.display()
    )
)]
pub fn plan(request: &SweepRequest) -> Result<Vec<PlannedMove>> {
    let candidates = build_candidate_map(&request.candidate_pool)?;
    let reports = list_reports(&request.report_source)?;

    let mut claimed: HashSet<String> = HashSet::new();
    let mut reserved: HashSet<PathBuf> = HashSet::new();
    let mut planned = Vec::new();

    for report in &reports {
        let tokens = match read_tokens(report, request.options.header_row) {
            Ok(tokens) => tokens,
            Err(error) => {
                warn!(report = %report.display(), %error, "skipping unreadable report");
                continue;
            }
        };

        for token in &tokens {
            for matched in find_matches(token, &candidates) {
                if claimed.contains(&matched.folder_name) {
                    continue;
                }
                let destination =
                    match resolve_destination(&matched.folder_path, &request.archive_root) {
                        Ok(destination) => destination,
                        Err(error) => {
                            warn!(folder = %matched.folder_name, %error, "cannot resolve destination");
                            continue;
                        }
                    };
                let target = unique_target(&destination.join(&matched.folder_name), |path| {
                    reserved.contains(path) || path.symlink_metadata().is_ok()
                });

                claimed.insert(matched.folder_name.clone());
                reserved.insert(target.clone());
                planned.push(PlannedMove {
                    report: report.clone(),
                    matched,
                    target,
                });
            }
        }
    }

    info!(planned = planned.len(), "plan computed");
    Ok(planned)
}
