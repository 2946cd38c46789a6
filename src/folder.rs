//! Filesystem collaborators used by the resume store: choosing a folder,
//! enumerating resume files in it, and checking that it is still reachable.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::models::{display_name, DetectedFile, ResumeFileType};

/// Asks the user for a folder. `Ok(None)` means the dialog was cancelled.
pub trait FolderPicker {
    fn pick_folder(&mut self) -> Result<Option<PathBuf>>;
}

pub trait FolderAccess {
    /// Supported resume files directly inside `folder`. Subdirectories are not descended.
    fn scan(&self, folder: &Path) -> Result<Vec<DetectedFile>>;

    fn validate(&self, folder: &Path) -> Result<()>;
}

/// A picker with a predetermined answer, for non-interactive front ends.
#[derive(Debug, Clone, Default)]
pub struct PresetPicker {
    choice: Option<PathBuf>,
}

impl PresetPicker {
    pub fn new(choice: Option<PathBuf>) -> Self {
        Self { choice }
    }

    pub fn choose(path: impl Into<PathBuf>) -> Self {
        Self::new(Some(path.into()))
    }

    pub fn cancelled() -> Self {
        Self::new(None)
    }
}

impl FolderPicker for PresetPicker {
    fn pick_folder(&mut self) -> Result<Option<PathBuf>> {
        Ok(self.choice.take())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFolder;

impl FolderAccess for LocalFolder {
    fn scan(&self, folder: &Path) -> Result<Vec<DetectedFile>> {
        let entries = std::fs::read_dir(folder)
            .with_context(|| format!("Failed to read folder {}", folder.display()))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("Failed to list {}", folder.display()))?;
            let path = entry.path();

            // Follows symlinks, unlike DirEntry::metadata.
            let metadata = match std::fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            let Some(file_type) = ResumeFileType::from_path(&path) else {
                continue;
            };
            let file_name = entry.file_name().to_string_lossy().to_string();
            let modified_date = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            files.push(DetectedFile {
                display_name: display_name(&file_name),
                file_name,
                file_path: path.to_string_lossy().to_string(),
                file_type,
                size: metadata.len(),
                modified_date,
            });
        }

        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        debug!(folder = %folder.display(), found = files.len(), "folder scanned");
        Ok(files)
    }

    fn validate(&self, folder: &Path) -> Result<()> {
        let metadata = std::fs::metadata(folder)
            .with_context(|| format!("Cannot access {}", folder.display()))?;
        if !metadata.is_dir() {
            return Err(anyhow!("{} is not a directory", folder.display()));
        }
        std::fs::read_dir(folder)
            .with_context(|| format!("Cannot list {}", folder.display()))?;
        Ok(())
    }
}

impl LocalFolder {
    pub fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    /// Hands `path` to the desktop's default application for its type.
    pub fn open_file(&self, path: &Path) -> StoreResult<()> {
        if !self.file_exists(path) {
            let folder = path.parent().unwrap_or(path).to_string_lossy();
            return Err(StoreError::folder(folder, format!("{} no longer exists", path.display())));
        }
        debug!(path = %path.display(), "opening in default viewer");
        opener::open(path).map_err(|err| {
            StoreError::Invalid(format!("no application could open {}: {}", path.display(), err))
        })
    }

    /// Removes a file previously placed by `copy_into_folder`.
    pub fn discard_copy(&self, file: &DetectedFile) {
        if let Err(err) = std::fs::remove_file(&file.file_path) {
            warn!(path = %file.file_path, error = %err, "failed to remove copied file");
        }
    }

    /// Copies `source` into `folder` under its own file name. Refuses to overwrite.
    pub fn copy_into_folder(&self, source: &Path, folder: &Path) -> StoreResult<DetectedFile> {
        let file_type = ResumeFileType::from_path(source).ok_or_else(|| {
            StoreError::Invalid(format!(
                "{} is not a supported resume file (pdf, docx, doc, txt)",
                source.display()
            ))
        })?;
        let file_name = source
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| StoreError::Invalid(format!("{} has no file name", source.display())))?;

        self.validate(folder)
            .map_err(|err| StoreError::folder(folder.to_string_lossy(), format!("{:#}", err)))?;

        let target = folder.join(&file_name);
        if target.exists() {
            return Err(StoreError::DuplicateFile(file_name));
        }

        let size = std::fs::copy(source, &target)
            .with_context(|| format!("Failed to copy {} to {}", source.display(), target.display()))
            .map_err(|err| StoreError::folder(folder.to_string_lossy(), format!("{:#}", err)))?;

        Ok(DetectedFile {
            display_name: display_name(&file_name),
            file_name,
            file_path: target.to_string_lossy().to_string(),
            file_type,
            size,
            modified_date: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_missing_file_needs_folder() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("deleted.pdf");

        let err = LocalFolder.open_file(&gone).unwrap_err();

        assert!(matches!(err, StoreError::FolderUnavailable { .. }));
        assert!(err.needs_folder_reselection());
    }

    #[test]
    fn test_scan_filters_supported_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Senior_Engineer.pdf"), b"%PDF").unwrap();
        std::fs::write(dir.path().join("cover.DOCX"), b"doc").unwrap();
        std::fs::write(dir.path().join("photo.png"), b"png").unwrap();
        std::fs::write(dir.path().join("notes"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("archive.pdf")).unwrap();
        std::fs::write(dir.path().join("archive.pdf").join("old.pdf"), b"%PDF").unwrap();

        let files = LocalFolder.scan(dir.path()).unwrap();
        let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["Senior_Engineer.pdf", "cover.DOCX"]);

        let pdf = &files[0];
        assert_eq!(pdf.display_name, "Senior Engineer");
        assert_eq!(pdf.file_type, ResumeFileType::Pdf);
        assert_eq!(pdf.size, 4);
        assert_eq!(Path::new(&pdf.file_path), dir.path().join("Senior_Engineer.pdf"));
        assert_eq!(files[1].file_type, ResumeFileType::Docx);
    }

    #[test]
    fn test_scan_missing_folder_fails() {
        let dir = tempdir().unwrap();
        assert!(LocalFolder.scan(&dir.path().join("gone")).is_err());
    }

    #[test]
    fn test_validate() {
        let dir = tempdir().unwrap();
        assert!(LocalFolder.validate(dir.path()).is_ok());

        let file = dir.path().join("resume.pdf");
        std::fs::write(&file, b"%PDF").unwrap();
        assert!(LocalFolder.validate(&file).is_err());
        assert!(LocalFolder.validate(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_copy_into_folder_refuses_duplicates() {
        let src_dir = tempdir().unwrap();
        let folder = tempdir().unwrap();
        let source = src_dir.path().join("my_cv.txt");
        std::fs::write(&source, b"hello").unwrap();

        let copied = LocalFolder.copy_into_folder(&source, folder.path()).unwrap();
        assert_eq!(copied.display_name, "my cv");
        assert_eq!(copied.size, 5);
        assert!(LocalFolder.file_exists(&folder.path().join("my_cv.txt")));

        let err = LocalFolder.copy_into_folder(&source, folder.path()).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateFile(ref name) if name == "my_cv.txt"));
    }

    #[test]
    fn test_copy_into_folder_rejects_unsupported_type() {
        let src_dir = tempdir().unwrap();
        let folder = tempdir().unwrap();
        let source = src_dir.path().join("headshot.jpg");
        std::fs::write(&source, b"jpg").unwrap();

        let err = LocalFolder.copy_into_folder(&source, folder.path()).unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[test]
    fn test_preset_picker_answers_once() {
        let mut picker = PresetPicker::choose("/F");
        assert_eq!(picker.pick_folder().unwrap(), Some(PathBuf::from("/F")));
        assert_eq!(picker.pick_folder().unwrap(), None);
        assert_eq!(PresetPicker::cancelled().pick_folder().unwrap(), None);
    }
}
