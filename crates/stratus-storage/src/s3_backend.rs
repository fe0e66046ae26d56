use std::time::Duration;

use rusty_s3::actions::{ListObjectsV2, S3Action};
use rusty_s3::{Bucket, Credentials, UrlStyle};

use stratus_types::error::{Result, StratusError};

use crate::http_util::{build_agent, etag_value, read_body};
use crate::StorageBackend;

/// Duration for presigned URL validity.
const PRESIGN_DURATION: Duration = Duration::from_secs(3600);

const DEFAULT_REGION: &str = "us-east-1";

pub struct S3Backend {
    bucket: Bucket,
    credentials: Credentials,
    agent: ureq::Agent,
    region: String,
}

impl S3Backend {
    /// Without an explicit `endpoint` the regional AWS endpoint is used with
    /// virtual-host addressing; custom endpoints use path-style addressing.
    pub fn new(
        bucket_name: &str,
        region: &str,
        endpoint: Option<&str>,
        access_key_id: &str,
        secret_access_key: &str,
    ) -> Result<Self> {
        let (endpoint, url_style) = match endpoint {
            Some(e) => (e.to_string(), UrlStyle::Path),
            None => (
                format!("https://s3.{region}.amazonaws.com"),
                UrlStyle::VirtualHost,
            ),
        };
        let base_url = endpoint.parse().map_err(|e| {
            StratusError::Config(format!("invalid S3 endpoint URL '{endpoint}': {e}"))
        })?;

        let bucket = Bucket::new(
            base_url,
            url_style,
            bucket_name.to_string(),
            region.to_string(),
        )
        .map_err(|e| StratusError::Config(format!("failed to create S3 bucket handle: {e}")))?;

        let credentials = Credentials::new(access_key_id, secret_access_key);

        Ok(Self {
            bucket,
            credentials,
            agent: build_agent(),
            region: region.to_string(),
        })
    }

    fn head(&self, key: &str) -> Result<Option<ureq::Response>> {
        let url = self
            .bucket
            .head_object(Some(&self.credentials), key)
            .sign(PRESIGN_DURATION);

        match self.agent.head(url.as_str()).call() {
            Ok(resp) => Ok(Some(resp)),
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(e) => Err(StratusError::Remote(format!("S3 HEAD {key}: {e}"))),
        }
    }
}

impl StorageBackend for S3Backend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let url = self
            .bucket
            .get_object(Some(&self.credentials), key)
            .sign(PRESIGN_DURATION);

        match self.agent.get(url.as_str()).call() {
            Ok(resp) => Ok(Some(read_body(resp, &format!("S3 GET {key}"))?)),
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(e) => Err(StratusError::Remote(format!("S3 GET {key}: {e}"))),
        }
    }

    fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        let mut action = self.bucket.put_object(Some(&self.credentials), key);
        action.headers_mut().insert("x-amz-acl", "private");
        let url = action.sign(PRESIGN_DURATION);

        self.agent
            .put(url.as_str())
            .set("x-amz-acl", "private")
            .send_bytes(data)
            .map_err(|e| StratusError::Remote(format!("S3 PUT {key}: {e}")))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let url = self
            .bucket
            .delete_object(Some(&self.credentials), key)
            .sign(PRESIGN_DURATION);

        match self.agent.delete(url.as_str()).call() {
            Ok(_) | Err(ureq::Error::Status(404, _)) => Ok(()),
            Err(e) => Err(StratusError::Remote(format!("S3 DELETE {key}: {e}"))),
        }
    }

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.head(key)?.is_some())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut action = self.bucket.list_objects_v2(Some(&self.credentials));
            if !prefix.is_empty() {
                action.query_mut().insert("prefix", prefix);
            }
            if let Some(ref token) = continuation_token {
                action.query_mut().insert("continuation-token", token);
            }
            let url = action.sign(PRESIGN_DURATION);

            let resp = self
                .agent
                .get(url.as_str())
                .call()
                .map_err(|e| StratusError::Remote(format!("S3 LIST {prefix}: {e}")))?;
            let body = read_body(resp, &format!("S3 LIST {prefix}"))?;
            let parsed = ListObjectsV2::parse_response(&body).map_err(|e| {
                StratusError::InvalidFormat(format!("S3 LIST {prefix}: failed to parse response: {e}"))
            })?;

            keys.extend(
                parsed
                    .contents
                    .iter()
                    .filter(|obj| !obj.key.ends_with('/'))
                    .map(|obj| obj.key.clone()),
            );

            match parsed.next_continuation_token {
                Some(token) => continuation_token = Some(token),
                None => break,
            }
        }

        Ok(keys)
    }

    fn checksum(&self, key: &str) -> Result<Option<String>> {
        match self.head(key)? {
            Some(resp) => Ok(resp.header("ETag").map(etag_value)),
            None => Ok(None),
        }
    }

    fn create_container(&self) -> Result<()> {
        let url = self
            .bucket
            .create_bucket(&self.credentials)
            .sign(PRESIGN_DURATION);

        let req = self.agent.put(url.as_str());
        let result = if self.region == DEFAULT_REGION {
            req.call()
        } else {
            req.send_string(&location_constraint(&self.region))
        };
        match result {
            Ok(_) => Ok(()),
            // Already owned by us.
            Err(ureq::Error::Status(409, _)) => Ok(()),
            Err(e) => Err(StratusError::Remote(format!(
                "S3 create bucket {}: {e}",
                self.bucket.name()
            ))),
        }
    }

    fn location(&self) -> String {
        format!("S3 Bucket: {}", self.bucket.name())
    }
}

fn location_constraint(region: &str) -> String {
    format!(
        "<CreateBucketConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
         <LocationConstraint>{region}</LocationConstraint></CreateBucketConfiguration>"
    )
}
