//! Turning a folder scan plus the user's checkbox choices into store changes.

use std::collections::{HashMap, HashSet};

use crate::models::{DetectedFile, NewResume, Resume};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportPlan {
    /// Chosen files that are not tracked yet.
    pub to_add: Vec<NewResume>,
    /// Ids of tracked resumes whose files were detected but left unchosen.
    pub to_remove: Vec<String>,
}

impl ImportPlan {
    pub fn build(detected: &[DetectedFile], tracked: &[Resume], chosen: &HashSet<String>) -> Self {
        let tracked_ids: HashMap<&str, &str> = tracked
            .iter()
            .map(|resume| (resume.file_path.as_str(), resume.id.as_str()))
            .collect();

        let mut plan = ImportPlan::default();
        for file in detected {
            let is_chosen = chosen.contains(&file.file_path);
            match tracked_ids.get(file.file_path.as_str()) {
                None if is_chosen => plan.to_add.push(file.to_new_resume()),
                Some(id) if !is_chosen => plan.to_remove.push((*id).to_string()),
                _ => {}
            }
        }
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Detected files that are already tracked start out checked.
pub fn preselected(detected: &[DetectedFile], tracked: &[Resume]) -> HashSet<String> {
    let tracked_paths: HashSet<&str> = tracked.iter().map(|r| r.file_path.as_str()).collect();
    detected
        .iter()
        .filter(|file| tracked_paths.contains(file.file_path.as_str()))
        .map(|file| file.file_path.clone())
        .collect()
}
