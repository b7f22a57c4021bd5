use std::fs;
use std::path::Path;

use tracing::{debug, instrument};

use crate::sweep::error::{Result, SweepError};
use crate::sweep::model::CandidateMap;

/// Lists the immediate subdirectories of `pool` into a name → path map.
///
/// Entries that are not directories are ignored. Any failure to list the
/// pool itself is fatal and reported as [`SweepError::CandidatePool`].
#[instrument(level = "debug", skip_all, fields(pool = %pool.display()))]
pub fn build_candidate_map(pool: &Path) -> Result<CandidateMap> {
    let pool_error = |source| SweepError::CandidatePool {
        path: pool.to_path_buf(),
        source,
    };

    let mut candidates = CandidateMap::new();
    for entry in fs::read_dir(pool).map_err(pool_error)? {
        let entry = entry.map_err(pool_error)?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        candidates.insert(name, path);
    }

    debug!(folder_count = candidates.len(), "candidate map built");
    Ok(candidates)
}
