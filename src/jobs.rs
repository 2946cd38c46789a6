use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::error::{StoreError, StoreResult};
use crate::models::{Job, JobStatus, JobUpdate};
use crate::storage::{load_document, save_document, Backend, JOBS_KEY};

/// Snapshot published to subscribers after every operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobState {
    pub jobs: Vec<Job>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobStats {
    pub total: usize,
    pub by_status: HashMap<JobStatus, usize>,
}

impl JobStats {
    pub fn count(&self, status: JobStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Owns the jobs document. Every mutation reads the whole document, changes it in
/// memory, writes it back, and only then replaces the cached list.
pub struct JobStore {
    backend: Arc<dyn Backend>,
    jobs: Vec<Job>,
    error: Option<String>,
    state: watch::Sender<JobState>,
}

impl JobStore {
    /// Loads the stored jobs. A failed read leaves the store empty with `error()` set.
    pub fn open(backend: Arc<dyn Backend>) -> Self {
        let (state, _) = watch::channel(JobState {
            loading: true,
            ..Default::default()
        });
        let mut store = Self {
            backend,
            jobs: Vec::new(),
            error: None,
            state,
        };
        // Failure is already recorded in `error`.
        let _ = store.refresh();
        store
    }

    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.state.subscribe()
    }

    /// Cached jobs, newest first. Does not touch storage.
    pub fn list(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn stats(&self) -> JobStats {
        let mut by_status = HashMap::new();
        for job in &self.jobs {
            *by_status.entry(job.status).or_insert(0) += 1;
        }
        JobStats {
            total: self.jobs.len(),
            by_status,
        }
    }

    /// Re-reads storage into the cache.
    pub fn refresh(&mut self) -> StoreResult<()> {
        self.begin();
        let result = load_document::<Vec<Job>>(self.backend.as_ref(), JOBS_KEY).map(|jobs| {
            debug!(count = jobs.len(), "jobs loaded");
            self.jobs = jobs;
        });
        self.finish("refresh", result)
    }

    /// Prepends `job`.
    pub fn add(&mut self, job: Job) -> StoreResult<()> {
        self.mutate("add", move |jobs| {
            if job.title.trim().is_empty() {
                return Err(StoreError::Invalid("job title must not be empty".to_string()));
            }
            if jobs.iter().any(|existing| existing.id == job.id) {
                return Err(StoreError::Invalid(format!("job id '{}' already exists", job.id)));
            }
            info!(id = %job.id, title = %job.title, "adding job");
            jobs.insert(0, job);
            Ok(())
        })
    }

    /// Merges `changes` into the job and refreshes its `updatedAt`.
    pub fn update(&mut self, id: &str, changes: &JobUpdate) -> StoreResult<Job> {
        self.mutate("update", |jobs| {
            changes.validate()?;
            let job = jobs
                .iter_mut()
                .find(|job| job.id == id)
                .ok_or_else(|| StoreError::not_found("job", id))?;
            changes.apply(job, Utc::now());
            Ok(job.clone())
        })
    }

    pub fn delete(&mut self, id: &str) -> StoreResult<Job> {
        self.mutate("delete", |jobs| {
            let idx = jobs
                .iter()
                .position(|job| job.id == id)
                .ok_or_else(|| StoreError::not_found("job", id))?;
            Ok(jobs.remove(idx))
        })
    }

    fn mutate<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut Vec<Job>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        self.begin();
        let result = self.read_modify_write(f).map(|(jobs, out)| {
            self.jobs = jobs;
            out
        });
        self.finish(op, result)
    }

    fn read_modify_write<T>(
        &self,
        f: impl FnOnce(&mut Vec<Job>) -> StoreResult<T>,
    ) -> StoreResult<(Vec<Job>, T)> {
        let mut jobs: Vec<Job> = load_document(self.backend.as_ref(), JOBS_KEY)?;
        let out = f(&mut jobs)?;
        save_document(self.backend.as_ref(), JOBS_KEY, &jobs)?;
        Ok((jobs, out))
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
            error!(op, error = %err, "job store operation failed");
            self.error = Some(err.to_string());
        }
        self.state.send_replace(JobState {
            jobs: self.jobs.clone(),
            loading: false,
            error: self.error.clone(),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::FlakyBackend;
    use crate::storage::{FileBackend, MemoryBackend};
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn job(title: &str) -> Job {
        Job::new(title, "Build things", "https://example.com/job", JobStatus::Applying, "")
            .unwrap()
    }

    fn store_with(titles: &[&str]) -> (Arc<FlakyBackend>, JobStore) {
        let backend = Arc::new(FlakyBackend::default());
        let mut store = JobStore::open(backend.clone());
        for title in titles {
            store.add(job(title)).unwrap();
        }
        (backend, store)
    }

    #[test]
    fn test_add_prepends_with_unique_id() {
        let (_, mut store) = store_with(&["First", "Second"]);
        let prior: HashSet<String> = store.list().iter().map(|j| j.id.clone()).collect();

        let new_job = job("Third");
        let new_id = new_job.id.clone();
        store.add(new_job).unwrap();

        assert_eq!(store.list().len(), 3);
        assert_eq!(store.list()[0].id, new_id);
        assert_eq!(store.list().iter().filter(|j| j.id == new_id).count(), 1);
        assert!(!prior.contains(&new_id));
        assert_eq!(store.list()[2].title, "First");
    }

    #[test]
    fn test_add_rejects_duplicate_id_and_blank_title() {
        let (_, mut store) = store_with(&["First"]);
        let dup = store.list()[0].clone();
        assert!(matches!(store.add(dup), Err(StoreError::Invalid(_))));

        let mut blank = job("x");
        blank.title = "  ".to_string();
        assert!(store.add(blank).is_err());
        assert_eq!(store.list().len(), 1);
        assert!(store.error().is_some());
    }

    #[test]
    fn test_update_status_changes_only_target() {
        let (_, mut store) = store_with(&["A", "B", "C"]);
        let before: Vec<Job> = store.list().to_vec();
        let target = before[1].id.clone();

        let updated = store.update(&target, &JobUpdate::status(JobStatus::Applied)).unwrap();
        assert_eq!(updated.status, JobStatus::Applied);
        assert!(updated.updated_at >= before[1].updated_at);
        assert!(updated.updated_at >= updated.created_at);

        let after = store.list();
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);

        let mut expected = before[1].clone();
        expected.status = JobStatus::Applied;
        expected.updated_at = after[1].updated_at;
        assert_eq!(after[1], expected);
    }

    #[test]
    fn test_update_unknown_id_fails_without_change() {
        let (backend, mut store) = store_with(&["A"]);
        let stored = backend.raw(JOBS_KEY);

        let err = store.update("missing", &JobUpdate::status(JobStatus::Ghosted)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "job", .. }));
        assert_eq!(store.list()[0].status, JobStatus::Applying);
        assert_eq!(backend.raw(JOBS_KEY), stored);
    }

    #[test]
    fn test_update_rejects_blank_title() {
        let (_, mut store) = store_with(&["A"]);
        let id = store.list()[0].id.clone();
        let changes = JobUpdate {
            title: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(store.update(&id, &changes).is_err());
        assert_eq!(store.list()[0].title, "A");
    }

    #[test]
    fn test_delete() {
        let (_, mut store) = store_with(&["A", "B"]);
        let target = store.list()[0].id.clone();

        let removed = store.delete(&target).unwrap();
        assert_eq!(removed.title, "B");
        assert_eq!(store.list().len(), 1);

        assert!(store.delete(&target).is_err());
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_failed_save_leaves_cache_unchanged() {
        let (backend, mut store) = store_with(&["A"]);
        let before = store.list().to_vec();

        backend.fail_writes(true);
        let err = store.add(job("B")).unwrap_err();
        assert!(matches!(err, StoreError::Storage { .. }));
        assert_eq!(store.list(), before.as_slice());
        assert!(store.error().unwrap().contains("disk full"));

        backend.fail_writes(false);
        store.add(job("B")).unwrap();
        assert!(store.error().is_none());
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_refresh_picks_up_external_changes() {
        let dir = tempdir().unwrap();
        let backend = Arc::new(FileBackend::new(dir.path()));
        let mut store = JobStore::open(backend.clone());
        assert!(store.list().is_empty());

        let mut other = JobStore::open(backend);
        other.add(job("Written elsewhere")).unwrap();

        assert!(store.list().is_empty());
        store.refresh().unwrap();
        assert_eq!(store.list()[0].title, "Written elsewhere");
    }

    #[test]
    fn test_refresh_failure_keeps_cache() {
        let (backend, mut store) = store_with(&["A"]);
        backend.fail_reads(true);
        assert!(store.refresh().is_err());
        assert_eq!(store.list().len(), 1);
        assert!(store.error().is_some());
    }

    #[test]
    fn test_open_tolerates_malformed_document() {
        let store = JobStore::open(Arc::new(MemoryBackend::with_entry(JOBS_KEY, "[{]")));
        assert!(store.list().is_empty());
        assert!(store.error().is_none());
    }

    #[test]
    fn test_subscribers_see_settled_state() {
        let (_, mut store) = store_with(&[]);
        let rx = store.subscribe();

        store.add(job("Watched")).unwrap();
        let state = rx.borrow().clone();
        assert!(!state.loading);
        assert_eq!(state.jobs.len(), 1);
        assert!(state.error.is_none());
        assert!(!store.is_loading());
    }

    #[test]
    fn test_stats() {
        let (_, mut store) = store_with(&["A", "B", "C"]);
        let ids: Vec<String> = store.list().iter().map(|j| j.id.clone()).collect();
        store.update(&ids[0], &JobUpdate::status(JobStatus::Applied)).unwrap();
        store.update(&ids[1], &JobUpdate::status(JobStatus::Interviewing)).unwrap();

        let stats = store.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.count(JobStatus::Applied), 1);
        assert_eq!(stats.count(JobStatus::Interviewing), 1);
        assert_eq!(stats.count(JobStatus::Applying), 1);
        assert_eq!(stats.count(JobStatus::Ghosted), 0);
    }
}
