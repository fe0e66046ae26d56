use chrono::Utc;
use serde::Serialize;

use stratus_types::error::{Result, StratusError};

use crate::http_util::{build_agent, host_of, read_body, required_header};
use crate::sigv4::{amz_date, hex_sha256, Signer, EMPTY_PAYLOAD_SHA256};
use crate::tree_hash::tree_hash;
use crate::{ColdStorage, JobDescription};

const GLACIER_API_VERSION: &str = "2012-06-01";

#[derive(Serialize)]
struct RetrievalRequest<'a> {
    #[serde(rename = "Type")]
    kind: &'a str,
    #[serde(rename = "ArchiveId")]
    archive_id: &'a str,
}

/// Glacier REST client for a single vault, signed with SigV4.
pub struct GlacierClient {
    endpoint: String,
    host: String,
    vault: String,
    signer: Signer,
    agent: ureq::Agent,
}

impl GlacierClient {
    /// `endpoint` defaults to the regional AWS endpoint when `None`.
    pub fn new(
        vault: &str,
        region: &str,
        endpoint: Option<&str>,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self> {
        let endpoint = endpoint
            .map(|e| e.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://glacier.{region}.amazonaws.com"));
        let host = host_of(&endpoint)?;

        Ok(Self {
            endpoint,
            host,
            vault: vault.to_string(),
            signer: Signer::new(access_key, secret_key, region, "glacier"),
            agent: build_agent(),
        })
    }

    fn vault_path(&self, suffix: &str) -> String {
        format!("/-/vaults/{}{suffix}", self.vault)
    }

    /// Sign and send one request. `extra` headers are signed along with the
    /// mandatory Glacier headers.
    #[allow(clippy::result_large_err)]
    fn send(
        &self,
        method: &str,
        path: &str,
        body: &[u8],
        extra: &[(&str, String)],
    ) -> std::result::Result<ureq::Response, ureq::Error> {
        let now = Utc::now();
        let payload_hash = if body.is_empty() {
            EMPTY_PAYLOAD_SHA256.to_string()
        } else {
            hex_sha256(body)
        };

        let mut headers: Vec<(String, String)> = vec![
            ("host".into(), self.host.clone()),
            ("x-amz-date".into(), amz_date(now)),
            ("x-amz-content-sha256".into(), payload_hash.clone()),
            ("x-amz-glacier-version".into(), GLACIER_API_VERSION.into()),
        ];
        headers.extend(extra.iter().map(|(k, v)| (k.to_string(), v.clone())));

        let auth = self
            .signer
            .authorization(method, path, "", &headers, &payload_hash, now);

        let url = format!("{}{path}", self.endpoint);
        let mut req = self.agent.request(method, &url);
        for (k, v) in headers.iter().filter(|(k, _)| k != "host") {
            req = req.set(k, v);
        }
        req = req.set("Authorization", &auth);

        if body.is_empty() && method != "POST" && method != "PUT" {
            req.call()
        } else {
            req.send_bytes(body)
        }
    }

    fn remote_err(op: &str, e: ureq::Error) -> StratusError {
        StratusError::Remote(format!("Glacier {op}: {e}"))
    }
}

impl ColdStorage for GlacierClient {
    fn upload_archive(&self, data: &[u8], description: &str) -> Result<String> {
        let path = self.vault_path("/archives");
        let resp = self
            .send(
                "POST",
                &path,
                data,
                &[
                    ("x-amz-sha256-tree-hash", tree_hash(data)),
                    ("x-amz-archive-description", description.to_string()),
                ],
            )
            .map_err(|e| Self::remote_err("upload archive", e))?;
        required_header(&resp, "x-amz-archive-id", "Glacier upload archive")
    }

    fn initiate_retrieval(&self, archive_id: &str) -> Result<JobDescription> {
        let path = self.vault_path("/jobs");
        let body = serde_json::to_vec(&RetrievalRequest {
            kind: "archive-retrieval",
            archive_id,
        })?;
        let resp = self
            .send(
                "POST",
                &path,
                &body,
                &[("content-type", "application/json".to_string())],
            )
            .map_err(|e| Self::remote_err("initiate job", e))?;
        let job_id = required_header(&resp, "x-amz-job-id", "Glacier initiate job")?;
        tracing::debug!("Glacier retrieval job {job_id} created for archive {archive_id}");

        self.describe_job(&job_id)?.ok_or_else(|| {
            StratusError::Remote(format!("Glacier job {job_id} vanished right after creation"))
        })
    }

    fn describe_job(&self, job_id: &str) -> Result<Option<JobDescription>> {
        let path = self.vault_path(&format!("/jobs/{job_id}"));
        match self.send("GET", &path, &[], &[]) {
            Ok(resp) => {
                let body = read_body(resp, "Glacier describe job")?;
                let job: JobDescription = serde_json::from_slice(&body).map_err(|e| {
                    StratusError::InvalidFormat(format!("Glacier job description: {e}"))
                })?;
                Ok(Some(job))
            }
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(e) => Err(Self::remote_err("describe job", e)),
        }
    }

    fn job_output(&self, job_id: &str) -> Result<Vec<u8>> {
        let path = self.vault_path(&format!("/jobs/{job_id}/output"));
        let resp = self
            .send("GET", &path, &[], &[])
            .map_err(|e| Self::remote_err("job output", e))?;
        read_body(resp, "Glacier job output")
    }

    fn delete_archive(&self, archive_id: &str) -> Result<()> {
        let path = self.vault_path(&format!("/archives/{archive_id}"));
        self.send("DELETE", &path, &[], &[])
            .map_err(|e| Self::remote_err("delete archive", e))?;
        Ok(())
    }

    fn create_vault(&self) -> Result<()> {
        let path = self.vault_path("");
        self.send("PUT", &path, &[], &[])
            .map_err(|e| Self::remote_err("create vault", e))?;
        Ok(())
    }

    fn location(&self) -> String {
        format!("Glacier vault: {}", self.vault)
    }
}
