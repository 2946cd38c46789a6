//! The resume store: resume records, tags, and the folder they live in.
//!
//! Records only make sense relative to one folder, so choosing a folder always
//! starts from an empty list, and every refresh drops records whose file has
//! disappeared from it.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::folder::{FolderAccess, FolderPicker};
use crate::models::{
    DetectedFile, NewResume, Resume, ResumeDocument, ResumeUpdate, Tag, TagColor,
};
use crate::reconcile::{dedupe_by_path, partition_orphans, Reconciliation};
use crate::review::ImportPlan;
use crate::storage::{load_document, save_document, Backend, RESUMES_KEY};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeState {
    pub resumes: Vec<Resume>,
    pub tags: Vec<Tag>,
    pub selected_folder: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanupReport {
    pub orphaned: Vec<Resume>,
    pub duplicates: Vec<Resume>,
}

impl CleanupReport {
    pub fn removed(&self) -> usize {
        self.orphaned.len() + self.duplicates.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportOutcome {
    pub added: Vec<Resume>,
    pub removed: Vec<Resume>,
}

pub struct ResumeStore {
    backend: Arc<dyn Backend>,
    folders: Arc<dyn FolderAccess>,
    doc: ResumeDocument,
    error: Option<String>,
    state: watch::Sender<ResumeState>,
}

impl ResumeStore {
    /// Loads the stored document and reconciles it against the selected folder.
    /// Failures are recorded in `error()` rather than returned.
    pub fn open(backend: Arc<dyn Backend>, folders: Arc<dyn FolderAccess>) -> Self {
        let (state, _) = watch::channel(ResumeState {
            loading: true,
            ..Default::default()
        });
        let mut store = Self {
            backend,
            folders,
            doc: ResumeDocument::default(),
            error: None,
            state,
        };
        let _ = store.refresh();
        store
    }

    pub fn subscribe(&self) -> watch::Receiver<ResumeState> {
        self.state.subscribe()
    }

    pub fn resumes(&self) -> &[Resume] {
        &self.doc.resumes
    }

    pub fn tags(&self) -> &[Tag] {
        &self.doc.tags
    }

    pub fn selected_folder(&self) -> Option<&str> {
        self.doc.selected_folder.as_deref()
    }

    pub fn resume(&self, id: &str) -> Option<&Resume> {
        self.doc.resumes.iter().find(|r| r.id == id)
    }

    pub fn tag(&self, id: &str) -> Option<&Tag> {
        self.doc.tags.iter().find(|t| t.id == id)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Palette colors no tag uses yet.
    pub fn available_colors(&self) -> Vec<TagColor> {
        let used: HashSet<TagColor> = self.doc.tags.iter().map(|t| t.color).collect();
        TagColor::PALETTE
            .into_iter()
            .filter(|color| !used.contains(color))
            .collect()
    }

    // --- Loading ---

    /// Re-reads storage, then drops orphaned records if a folder is selected.
    ///
    /// If the folder cannot be scanned the freshly loaded records are kept and a
    /// `FolderUnavailable` error is returned; an unreachable folder is never
    /// mistaken for an empty one.
    pub fn refresh(&mut self) -> StoreResult<()> {
        self.begin();
        let result = self.reload();
        self.finish("refresh", result)
    }

    fn reload(&mut self) -> StoreResult<()> {
        let doc: ResumeDocument = load_document(self.backend.as_ref(), RESUMES_KEY)?;
        debug!(
            resumes = doc.resumes.len(),
            tags = doc.tags.len(),
            folder = ?doc.selected_folder,
            "resume document loaded"
        );
        let needs_check = doc.selected_folder.is_some() && !doc.resumes.is_empty();
        self.doc = doc.clone();

        if needs_check {
            let folders = Arc::clone(&self.folders);
            let (doc, _) = self.modify_and_save(doc, |doc| remove_orphans(folders.as_ref(), doc))?;
            self.doc = doc;
        }
        Ok(())
    }

    // --- Folder ---

    /// Asks `picker` for a folder. On a choice, all resume records are discarded
    /// (tags survive) and the new folder is persisted. `Ok(None)` when cancelled.
    pub fn select_folder(&mut self, picker: &mut dyn FolderPicker) -> StoreResult<Option<String>> {
        self.begin();
        let result = match picker.pick_folder() {
            Err(err) => Err(StoreError::Invalid(format!("folder picker failed: {:#}", err))),
            Ok(None) => {
                debug!("folder selection cancelled");
                Ok(None)
            }
            Ok(Some(path)) => {
                let folder = path.to_string_lossy().to_string();
                info!(folder = %folder, "resume folder selected, clearing tracked resumes");
                self.read_modify_write(|doc| {
                    doc.resumes.clear();
                    doc.selected_folder = Some(folder.clone());
                    Ok(())
                })
                .map(|(doc, ())| {
                    self.doc = doc;
                    Some(folder)
                })
            }
        };
        self.finish("select_folder", result)
    }

    /// Forgets the folder and every resume record. Files on disk are untouched.
    pub fn clear_folder(&mut self) -> StoreResult<()> {
        self.mutate("clear_folder", |doc| {
            doc.resumes.clear();
            doc.selected_folder = None;
            Ok(())
        })
    }

    pub fn scan_folder(&mut self, folder: &str) -> StoreResult<Vec<DetectedFile>> {
        self.begin();
        let result = self
            .folders
            .scan(Path::new(folder))
            .map_err(|err| StoreError::folder(folder, format!("{:#}", err)));
        self.finish("scan_folder", result)
    }

    pub fn validate_folder(&mut self, folder: &str) -> StoreResult<()> {
        self.begin();
        let result = self
            .folders
            .validate(Path::new(folder))
            .map_err(|err| StoreError::folder(folder, format!("{:#}", err)));
        self.finish("validate_folder", result)
    }

    // --- Resumes ---

    pub fn add_resume(&mut self, resume: NewResume) -> StoreResult<Resume> {
        self.add_multiple_resumes(vec![resume])
            .map(|mut added| added.remove(0))
    }

    /// Prepends all of `resumes`, in the order given, in a single write.
    /// An empty list is a no-op.
    pub fn add_multiple_resumes(&mut self, resumes: Vec<NewResume>) -> StoreResult<Vec<Resume>> {
        if resumes.is_empty() {
            return Ok(Vec::new());
        }
        self.mutate("add_resumes", move |doc| {
            for resume in &resumes {
                ensure_tag(doc, resume.tag_id.as_deref())?;
            }
            let now = Utc::now();
            let added: Vec<Resume> = resumes.into_iter().map(|r| r.into_resume(now)).collect();
            info!(count = added.len(), "adding resumes");
            prepend(&mut doc.resumes, &added);
            Ok(added)
        })
    }

    pub fn update_resume(&mut self, id: &str, changes: &ResumeUpdate) -> StoreResult<Resume> {
        self.mutate("update_resume", |doc| {
            if let Some(tag_id) = &changes.tag_id {
                ensure_tag(doc, tag_id.as_deref())?;
            }
            let resume = doc
                .resumes
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| StoreError::not_found("resume", id))?;
            changes.apply(resume, Utc::now());
            Ok(resume.clone())
        })
    }

    pub fn delete_resume(&mut self, id: &str) -> StoreResult<Resume> {
        self.delete_multiple_resumes(&[id.to_string()])
            .map(|mut removed| removed.remove(0))
    }

    /// Removes every listed record in one write. If any id is unknown nothing is removed.
    pub fn delete_multiple_resumes(&mut self, ids: &[String]) -> StoreResult<Vec<Resume>> {
        self.mutate("delete_resumes", |doc| {
            let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
            let known: HashSet<&str> = doc.resumes.iter().map(|r| r.id.as_str()).collect();
            if let Some(missing) = wanted.iter().find(|id| !known.contains(*id)) {
                return Err(StoreError::not_found("resume", missing));
            }

            let (removed, kept) = std::mem::take(&mut doc.resumes)
                .into_iter()
                .partition(|r: &Resume| wanted.contains(r.id.as_str()));
            doc.resumes = kept;
            Ok(removed)
        })
    }

    /// Applies a reviewed import in one write: drops the unchecked records and
    /// prepends the newly chosen files. Files already tracked are not added twice.
    pub fn apply_import(&mut self, plan: &ImportPlan) -> StoreResult<ImportOutcome> {
        self.mutate("apply_import", |doc| {
            let unchecked: HashSet<&str> = plan.to_remove.iter().map(String::as_str).collect();
            let (removed, kept): (Vec<Resume>, Vec<Resume>) = std::mem::take(&mut doc.resumes)
                .into_iter()
                .partition(|r| unchecked.contains(r.id.as_str()));
            doc.resumes = kept;

            let tracked: HashSet<String> =
                doc.resumes.iter().map(|r| r.file_path.clone()).collect();
            let now = Utc::now();
            let added: Vec<Resume> = plan
                .to_add
                .iter()
                .filter(|r| !tracked.contains(&r.file_path))
                .map(|r| r.clone().into_resume(now))
                .collect();
            prepend(&mut doc.resumes, &added);

            info!(added = added.len(), removed = removed.len(), "import applied");
            Ok(ImportOutcome { added, removed })
        })
    }

    // --- Tags ---

    pub fn add_tag(&mut self, name: &str, color: TagColor) -> StoreResult<Tag> {
        let tag = Tag::new(name, color);
        self.mutate("add_tag", move |doc| {
            let tag = tag?;
            doc.tags.insert(0, tag.clone());
            Ok(tag)
        })
    }

    /// Removes the tag and clears it from every resume that carried it, in one write.
    pub fn delete_tag(&mut self, id: &str) -> StoreResult<Tag> {
        self.mutate("delete_tag", |doc| {
            let idx = doc
                .tags
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| StoreError::not_found("tag", id))?;
            let tag = doc.tags.remove(idx);
            for resume in doc.resumes.iter_mut() {
                if resume.tag_id.as_deref() == Some(id) {
                    resume.tag_id = None;
                }
            }
            Ok(tag)
        })
    }

    // --- Reconciliation ---

    /// Drops records whose file is no longer in the selected folder and returns them.
    /// Running it again without filesystem changes removes nothing.
    pub fn check_for_orphaned_resumes(&mut self) -> StoreResult<Vec<Resume>> {
        let folders = Arc::clone(&self.folders);
        self.mutate("check_orphans", move |doc| remove_orphans(folders.as_ref(), doc))
    }

    /// Orphan removal plus collapsing records that point at the same file.
    pub fn force_cleanup(&mut self) -> StoreResult<CleanupReport> {
        let folders = Arc::clone(&self.folders);
        self.mutate("force_cleanup", move |doc| {
            if doc.selected_folder.is_none() {
                return Err(StoreError::NoFolderSelected);
            }
            let orphaned = remove_orphans(folders.as_ref(), doc)?;
            let (kept, duplicates) = dedupe_by_path(std::mem::take(&mut doc.resumes));
            doc.resumes = kept;
            if !duplicates.is_empty() {
                info!(count = duplicates.len(), "removed duplicate resume records");
            }
            Ok(CleanupReport {
                orphaned,
                duplicates,
            })
        })
    }

    // --- Plumbing ---

    fn mutate<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut ResumeDocument) -> StoreResult<T>,
    ) -> StoreResult<T> {
        self.begin();
        let result = self.read_modify_write(f).map(|(doc, out)| {
            self.doc = doc;
            out
        });
        self.finish(op, result)
    }

    fn read_modify_write<T>(
        &self,
        f: impl FnOnce(&mut ResumeDocument) -> StoreResult<T>,
    ) -> StoreResult<(ResumeDocument, T)> {
        let doc = load_document(self.backend.as_ref(), RESUMES_KEY)?;
        self.modify_and_save(doc, f)
    }

    /// Applies `f` and writes the document back if it changed.
    fn modify_and_save<T>(
        &self,
        mut doc: ResumeDocument,
        f: impl FnOnce(&mut ResumeDocument) -> StoreResult<T>,
    ) -> StoreResult<(ResumeDocument, T)> {
        let original = doc.clone();
        let out = f(&mut doc)?;
        if doc != original {
            save_document(self.backend.as_ref(), RESUMES_KEY, &doc)?;
        }
        Ok((doc, out))
    }

    fn begin(&mut self) {
        self.error = None;
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });
    }

    fn finish<T>(&mut self, op: &'static str, result: StoreResult<T>) -> StoreResult<T> {
        if let Err(err) = &result {
            if err.needs_folder_reselection() {
                warn!(op, error = %err, "resume folder needs attention");
            } else {
                error!(op, error = %err, "resume store operation failed");
            }
            self.error = Some(err.to_string());
        }
        self.state.send_replace(ResumeState {
            resumes: self.doc.resumes.clone(),
            tags: self.doc.tags.clone(),
            selected_folder: self.doc.selected_folder.clone(),
            loading: false,
            error: self.error.clone(),
        });
        result
    }
}

fn prepend(resumes: &mut Vec<Resume>, added: &[Resume]) {
    let tail = std::mem::take(resumes);
    resumes.extend_from_slice(added);
    resumes.extend(tail);
}

fn ensure_tag(doc: &ResumeDocument, tag_id: Option<&str>) -> StoreResult<()> {
    match tag_id {
        Some(id) if !doc.tags.iter().any(|t| t.id == id) => Err(StoreError::not_found("tag", id)),
        _ => Ok(()),
    }
}

/// Scans the document's folder and keeps only records whose file is present.
/// A failed scan leaves the document untouched.
fn remove_orphans(folders: &dyn FolderAccess, doc: &mut ResumeDocument) -> StoreResult<Vec<Resume>> {
    let Some(folder) = doc.selected_folder.clone() else {
        return Ok(Vec::new());
    };
    let files = folders
        .scan(Path::new(&folder))
        .map_err(|err| StoreError::folder(folder.as_str(), format!("{:#}", err)))?;

    let Reconciliation { valid, orphaned } =
        partition_orphans(std::mem::take(&mut doc.resumes), &files);
    doc.resumes = valid;

    if !orphaned.is_empty() {
        info!(folder = %folder, count = orphaned.len(), "removed orphaned resumes");
    }
    Ok(orphaned)
}
