use crate::sweep::model::{CandidateMap, MatchResult};

/// Returns every candidate whose name contains `token` as a contiguous,
/// case-sensitive substring. No normalisation is applied.
pub fn find_matches(token: &str, candidates: &CandidateMap) -> Vec<MatchResult> {
    candidates
        .iter()
        .filter(|(name, _)| name.contains(token))
        .map(|(name, path)| MatchResult {
            token: token.to_string(),
            folder_name: name.clone(),
            folder_path: path.clone(),
        })
        .collect()
}
