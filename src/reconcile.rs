//! Keeps the tracked resume list consistent with what is actually in the folder.
//!
//! Matching is by exact file path. A file renamed outside the app shows up as one
//! orphaned record plus one untracked file; no content hashing is attempted.

use std::collections::HashSet;

use crate::models::{DetectedFile, Resume};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub valid: Vec<Resume>,
    pub orphaned: Vec<Resume>,
}

impl Reconciliation {
    pub fn has_orphans(&self) -> bool {
        !self.orphaned.is_empty()
    }
}

/// Splits `resumes` into records whose file is in `files` and records whose file is not.
/// Relative order is preserved in both halves.
pub fn partition_orphans(resumes: Vec<Resume>, files: &[DetectedFile]) -> Reconciliation {
    let existing: HashSet<&str> = files.iter().map(|f| f.file_path.as_str()).collect();

    let (valid, orphaned) = resumes
        .into_iter()
        .partition(|resume| existing.contains(resume.file_path.as_str()));

    Reconciliation { valid, orphaned }
}

/// Drops every record after the first one pointing at an already-seen path.
/// Returns the kept records and the dropped ones.
pub fn dedupe_by_path(resumes: Vec<Resume>) -> (Vec<Resume>, Vec<Resume>) {
    let mut seen = HashSet::new();
    resumes
        .into_iter()
        .partition(|resume| seen.insert(resume.file_path.clone()))
}
