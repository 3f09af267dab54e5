use super::model::Job;
use std::collections::HashMap;
use std::sync::RwLock;

/// Process-wide store of synthesis jobs.
///
/// Jobs live for the lifetime of the process and are never evicted; losing
/// in-flight jobs on restart is accepted. Reads hand out cloned snapshots so
/// pollers never observe a half-applied mutation; all writes go through
/// [`JobStore::with_job`], which serializes read-modify-write access to a
/// single job's record.
pub struct JobStore {
    jobs: RwLock<HashMap<String, Job>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, job: Job) {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        jobs.insert(job.id.clone(), job);
    }

    /// Snapshot of a job's current state
    pub fn get(&self, job_id: &str) -> Option<Job> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        jobs.get(job_id).cloned()
    }

    /// Mutate one job's record inside the store's critical section.
    /// Returns `None` if the job does not exist.
    pub fn with_job<R>(&self, job_id: &str, f: impl FnOnce(&mut Job) -> R) -> Option<R> {
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        jobs.get_mut(job_id).map(f)
    }

    pub fn count(&self) -> usize {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        jobs.len()
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::synthesis::model::JobStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_get_returns_isolated_snapshot() {
        let store = JobStore::new();
        store.insert(Job::new("job_a".to_string(), vec!["l1".to_string()]));

        let mut snapshot = store.get("job_a").unwrap();
        snapshot.status = JobStatus::Error;

        // Mutating the snapshot must not leak back into the store
        assert_eq!(store.get("job_a").unwrap().status, JobStatus::Pending);
    }

    #[test]
    fn test_with_job_mutates_in_place() {
        let store = JobStore::new();
        store.insert(Job::new("job_a".to_string(), vec!["l1".to_string()]));

        let applied = store.with_job("job_a", |job| {
            job.status = JobStatus::Processing;
            job.id.clone()
        });

        assert_eq!(applied, Some("job_a".to_string()));
        assert_eq!(store.get("job_a").unwrap().status, JobStatus::Processing);
    }

    #[test]
    fn test_with_job_on_unknown_id_is_none() {
        let store = JobStore::new();
        assert_eq!(store.with_job("missing", |_| ()), None);
        assert_eq!(store.count(), 0);
    }
}
