use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Every failure a store can report. None of them are fatal; the caller retries
/// or asks the user to act (pick another folder, fix permissions, ...).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to persist '{key}': {message}")]
    Storage { key: String, message: String },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("folder '{path}' is not accessible: {message}")]
    FolderUnavailable { path: String, message: String },

    #[error("no resume folder selected")]
    NoFolderSelected,

    #[error("a file named '{0}' already exists in the resume folder")]
    DuplicateFile(String),

    #[error("{0}")]
    Invalid(String),
}

impl StoreError {
    pub fn storage(key: &str, err: anyhow::Error) -> Self {
        StoreError::Storage {
            key: key.to_string(),
            message: format!("{:#}", err),
        }
    }

    pub fn folder(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        StoreError::FolderUnavailable {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn not_found(kind: &'static str, id: &str) -> Self {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Folder problems are the one class the UI answers by prompting for a new folder.
    pub fn needs_folder_reselection(&self) -> bool {
        matches!(
            self,
            StoreError::FolderUnavailable { .. } | StoreError::NoFolderSelected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_keeps_context_chain() {
        let err = anyhow::anyhow!("permission denied").context("writing jobs.json");
        let err = StoreError::storage("jobs", err);
        assert_eq!(
            err.to_string(),
            "failed to persist 'jobs': writing jobs.json: permission denied"
        );
    }

    #[test]
    fn test_folder_errors_request_reselection() {
        assert!(StoreError::folder("/gone", "no such directory").needs_folder_reselection());
        assert!(StoreError::NoFolderSelected.needs_folder_reselection());
        assert!(!StoreError::not_found("job", "x").needs_folder_reselection());
    }
}
