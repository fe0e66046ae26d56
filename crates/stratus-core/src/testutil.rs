use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::Utc;

use stratus_storage::{ColdStorage, JobDescription, StorageBackend};
use stratus_types::error::{Result, StratusError};

/// In-memory storage backend for testing. Thread-safe via Mutex.
pub struct MemoryBackend {
    data: Mutex<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
    puts: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            fail_writes: AtomicBool::new(false),
            puts: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent `put` fail with a remote error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let map = self.data.lock().unwrap();
        Ok(map.get(key).cloned())
    }

    fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StratusError::Remote(format!("memory PUT {key}: injected failure")));
        }
        let mut map = self.data.lock().unwrap();
        map.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut map = self.data.lock().unwrap();
        map.remove(key);
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool> {
        let map = self.data.lock().unwrap();
        Ok(map.contains_key(key))
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let map = self.data.lock().unwrap();
        let mut keys: Vec<String> = map
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn checksum(&self, key: &str) -> Result<Option<String>> {
        let map = self.data.lock().unwrap();
        Ok(map.get(key).map(|d| format!("len-{}", d.len())))
    }

    fn create_container(&self) -> Result<()> {
        Ok(())
    }

    fn location(&self) -> String {
        "Memory".to_string()
    }
}

struct FakeJob {
    archive_id: String,
    completed: bool,
}

/// Scriptable cold store. Archive ids are `A1, A2, ...` and job ids
/// `J1, J2, ...` in creation order. Jobs stay pending until completed
/// explicitly, and can be expired to simulate the upstream forgetting them.
pub struct FakeGlacier {
    archives: Mutex<HashMap<String, Vec<u8>>>,
    jobs: Mutex<HashMap<String, FakeJob>>,
    next_archive: AtomicUsize,
    next_job: AtomicUsize,
    fail_initiate: AtomicBool,
    fail_describe: AtomicBool,
    initiated: AtomicUsize,
    described: AtomicUsize,
    outputs: AtomicUsize,
    deleted: AtomicUsize,
}

impl FakeGlacier {
    pub fn new() -> Self {
        Self {
            archives: Mutex::new(HashMap::new()),
            jobs: Mutex::new(HashMap::new()),
            next_archive: AtomicUsize::new(1),
            next_job: AtomicUsize::new(1),
            fail_initiate: AtomicBool::new(false),
            fail_describe: AtomicBool::new(false),
            initiated: AtomicUsize::new(0),
            described: AtomicUsize::new(0),
            outputs: AtomicUsize::new(0),
            deleted: AtomicUsize::new(0),
        }
    }

    pub fn complete_job(&self, job_id: &str) {
        if let Some(job) = self.jobs.lock().unwrap().get_mut(job_id) {
            job.completed = true;
        }
    }

    pub fn expire_job(&self, job_id: &str) {
        self.jobs.lock().unwrap().remove(job_id);
    }

    /// Make `initiate_retrieval` fail with a remote error.
    pub fn set_fail_initiate(&self, fail: bool) {
        self.fail_initiate.store(fail, Ordering::SeqCst);
    }

    /// Make `describe_job` fail with a remote (non-404) error.
    pub fn set_fail_describe(&self, fail: bool) {
        self.fail_describe.store(fail, Ordering::SeqCst);
    }

    pub fn has_archive(&self, archive_id: &str) -> bool {
        self.archives.lock().unwrap().contains_key(archive_id)
    }

    pub fn initiated(&self) -> usize {
        self.initiated.load(Ordering::SeqCst)
    }

    pub fn described(&self) -> usize {
        self.described.load(Ordering::SeqCst)
    }

    pub fn outputs(&self) -> usize {
        self.outputs.load(Ordering::SeqCst)
    }

    pub fn deleted(&self) -> usize {
        self.deleted.load(Ordering::SeqCst)
    }

    fn describe(job_id: &str, job: &FakeJob) -> JobDescription {
        JobDescription {
            job_id: job_id.to_string(),
            action: "ArchiveRetrieval".into(),
            status_code: if job.completed { "Succeeded" } else { "InProgress" }.into(),
            creation_date: Utc::now(),
            completion_date: job.completed.then(Utc::now),
            completed: job.completed,
        }
    }
}

impl ColdStorage for FakeGlacier {
    fn upload_archive(&self, data: &[u8], _description: &str) -> Result<String> {
        let id = format!("A{}", self.next_archive.fetch_add(1, Ordering::SeqCst));
        self.archives
            .lock()
            .unwrap()
            .insert(id.clone(), data.to_vec());
        Ok(id)
    }

    fn initiate_retrieval(&self, archive_id: &str) -> Result<JobDescription> {
        self.initiated.fetch_add(1, Ordering::SeqCst);
        if self.fail_initiate.load(Ordering::SeqCst) {
            return Err(StratusError::Remote(
                "fake glacier: initiate-job returned 503".into(),
            ));
        }
        if !self.has_archive(archive_id) {
            return Err(StratusError::Remote(format!(
                "fake glacier: no archive {archive_id}"
            )));
        }
        let id = format!("J{}", self.next_job.fetch_add(1, Ordering::SeqCst));
        let job = FakeJob {
            archive_id: archive_id.to_string(),
            completed: false,
        };
        let desc = Self::describe(&id, &job);
        self.jobs.lock().unwrap().insert(id, job);
        Ok(desc)
    }

    fn describe_job(&self, job_id: &str) -> Result<Option<JobDescription>> {
        self.described.fetch_add(1, Ordering::SeqCst);
        if self.fail_describe.load(Ordering::SeqCst) {
            return Err(StratusError::Remote(
                "fake glacier: describe-job returned 500".into(),
            ));
        }
        let jobs = self.jobs.lock().unwrap();
        Ok(jobs.get(job_id).map(|job| Self::describe(job_id, job)))
    }

    fn job_output(&self, job_id: &str) -> Result<Vec<u8>> {
        self.outputs.fetch_add(1, Ordering::SeqCst);
        let jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get(job_id)
            .filter(|j| j.completed)
            .ok_or_else(|| StratusError::Remote(format!("fake glacier: job {job_id} not ready")))?;
        self.archives
            .lock()
            .unwrap()
            .get(&job.archive_id)
            .cloned()
            .ok_or_else(|| StratusError::Remote(format!("fake glacier: archive {} gone", job.archive_id)))
    }

    fn delete_archive(&self, archive_id: &str) -> Result<()> {
        self.deleted.fetch_add(1, Ordering::SeqCst);
        self.archives.lock().unwrap().remove(archive_id);
        Ok(())
    }

    fn create_vault(&self) -> Result<()> {
        Ok(())
    }

    fn location(&self) -> String {
        "Glacier vault: fake".to_string()
    }
}
