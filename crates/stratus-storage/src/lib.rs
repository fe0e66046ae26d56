pub mod cloudfiles_backend;
pub mod glacier;
pub mod http_util;
pub mod s3_backend;
pub mod sigv4;
pub mod tree_hash;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stratus_types::error::Result;

pub use cloudfiles_backend::CloudfilesBackend;
pub use glacier::GlacierClient;
pub use s3_backend::S3Backend;

/// Plain object store with immediate read/write access (S3, Cloudfiles).
///
/// Every call is a single blocking request; nothing is retried here.
pub trait StorageBackend: Send + Sync {
    /// Read an object. Returns `None` if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write an object, replacing any previous content. Objects are private.
    fn put(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Delete an object. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    fn exists(&self, key: &str) -> Result<bool>;

    /// List all keys starting with `prefix`.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// MD5 checksum (ETag) reported by the store, `None` if the key is missing.
    fn checksum(&self, key: &str) -> Result<Option<String>>;

    /// Create the bucket or container if the provider requires it.
    fn create_container(&self) -> Result<()>;

    /// Human-readable description of where objects live.
    fn location(&self) -> String;
}

/// Status of an archive retrieval job as reported by the cold store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobDescription {
    pub job_id: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub status_code: String,
    pub creation_date: DateTime<Utc>,
    #[serde(default)]
    pub completion_date: Option<DateTime<Utc>>,
    pub completed: bool,
}

/// Cold object store with asynchronous, delayed retrieval (Glacier).
///
/// Archives are addressed by opaque ids handed out at upload time; reading
/// an archive back requires a retrieval job that completes hours later.
pub trait ColdStorage: Send + Sync {
    /// Store `data` as a new archive and return its archive id.
    fn upload_archive(&self, data: &[u8], description: &str) -> Result<String>;

    /// Start a retrieval job for `archive_id` and return its initial status.
    fn initiate_retrieval(&self, archive_id: &str) -> Result<JobDescription>;

    /// Current status of a job, or `None` if the store no longer knows the id.
    fn describe_job(&self, job_id: &str) -> Result<Option<JobDescription>>;

    /// Full output of a completed retrieval job.
    fn job_output(&self, job_id: &str) -> Result<Vec<u8>>;

    fn delete_archive(&self, archive_id: &str) -> Result<()>;

    /// Create the vault if it does not exist yet.
    fn create_vault(&self) -> Result<()>;

    fn location(&self) -> String;
}

impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        (**self).put(key, data)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).list(prefix)
    }

    fn checksum(&self, key: &str) -> Result<Option<String>> {
        (**self).checksum(key)
    }

    fn create_container(&self) -> Result<()> {
        (**self).create_container()
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

impl<T: ColdStorage + ?Sized> ColdStorage for Arc<T> {
    fn upload_archive(&self, data: &[u8], description: &str) -> Result<String> {
        (**self).upload_archive(data, description)
    }

    fn initiate_retrieval(&self, archive_id: &str) -> Result<JobDescription> {
        (**self).initiate_retrieval(archive_id)
    }

    fn describe_job(&self, job_id: &str) -> Result<Option<JobDescription>> {
        (**self).describe_job(job_id)
    }

    fn job_output(&self, job_id: &str) -> Result<Vec<u8>> {
        (**self).job_output(job_id)
    }

    fn delete_archive(&self, archive_id: &str) -> Result<()> {
        (**self).delete_archive(archive_id)
    }

    fn create_vault(&self) -> Result<()> {
        (**self).create_vault()
    }

    fn location(&self) -> String {
        (**self).location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_description_parses_glacier_json() {
        let body = r#"{
            "Action": "ArchiveRetrieval",
            "ArchiveId": "NkbByEejwEggmBz2fTHgJrg0XBoDfjP4q6iu87-TjhqG6eGoOY9Z8i1_AUyUsuhPAdTqLHy8pTl5nfCFJmDl2yEZONi5L26Omw12vcs01MNGntHEQL8MBfGlqrEXAMPLEArchiveId",
            "ArchiveSizeInBytes": 16777216,
            "Completed": false,
            "CompletionDate": null,
            "CreationDate": "2012-05-15T17:21:39.339Z",
            "JobId": "HkF9p6o7yjhFx-K3CGl6fuSm6VzW9T7esGQfco8nUXVYwS0jlb5gq1JZ55yHgt5vP54ZShjoQzQVVh7vEXAMPLEjobID",
            "StatusCode": "InProgress",
            "StatusMessage": null,
            "VaultARN": "arn:aws:glacier:us-east-1:012345678901:vaults/examplevault"
        }"#;
        let job: JobDescription = serde_json::from_str(body).unwrap();
        assert_eq!(job.action, "ArchiveRetrieval");
        assert_eq!(job.status_code, "InProgress");
        assert!(!job.completed);
        assert!(job.completion_date.is_none());
        assert!(job.job_id.starts_with("HkF9p6o7"));
    }

    #[test]
    fn job_description_parses_completed_job() {
        let body = r#"{
            "Action": "ArchiveRetrieval",
            "Completed": true,
            "CompletionDate": "2012-05-15T21:25:10.000Z",
            "CreationDate": "2012-05-15T17:21:39.339Z",
            "JobId": "J1",
            "StatusCode": "Succeeded"
        }"#;
        let job: JobDescription = serde_json::from_str(body).unwrap();
        assert!(job.completed);
        assert!(job.completion_date.is_some());
    }
}
