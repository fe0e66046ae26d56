use std::sync::OnceLock;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;

use stratus_types::error::{Result, StratusError};

use crate::http_util::{build_agent, etag_value, read_body, required_header};
use crate::StorageBackend;

const US_AUTH_URL: &str = "https://identity.api.rackspacecloud.com/v1.0/";
const LON_AUTH_URL: &str = "https://lon.identity.api.rackspacecloud.com/v1.0/";

/// Names per listing request; longer listings continue from a `marker`.
const LIST_LIMIT: usize = 10_000;

/// Unreserved characters stay literal in an object path segment.
const OBJECT_NAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Identity endpoint for a Cloudfiles region (`dfw`, `ord` or `lon`).
pub fn auth_url_for_region(region: &str) -> &'static str {
    match region.to_ascii_lowercase().as_str() {
        "lon" => LON_AUTH_URL,
        _ => US_AUTH_URL,
    }
}

struct Session {
    storage_url: String,
    token: String,
}

#[derive(Deserialize)]
struct ObjectInfo {
    name: String,
}

/// Rackspace Cloudfiles (OpenStack Swift, v1.0 auth) container backend.
pub struct CloudfilesBackend {
    auth_url: String,
    user: String,
    api_key: String,
    container: String,
    agent: ureq::Agent,
    session: OnceLock<Session>,
}

impl CloudfilesBackend {
    pub fn new(auth_url: &str, user: &str, api_key: &str, container: &str) -> Result<Self> {
        if container.is_empty() || container.contains('/') {
            return Err(StratusError::Config(format!(
                "invalid Cloudfiles container name '{container}'"
            )));
        }
        Ok(Self {
            auth_url: auth_url.to_string(),
            user: user.to_string(),
            api_key: api_key.to_string(),
            container: container.to_string(),
            agent: build_agent(),
            session: OnceLock::new(),
        })
    }

    /// Authenticate on first use; the token is kept for the process lifetime.
    fn session(&self) -> Result<&Session> {
        if let Some(session) = self.session.get() {
            return Ok(session);
        }

        let resp = self
            .agent
            .get(&self.auth_url)
            .set("X-Auth-User", &self.user)
            .set("X-Auth-Key", &self.api_key)
            .call()
            .map_err(|e| StratusError::Remote(format!("Cloudfiles auth: {e}")))?;
        let session = Session {
            storage_url: required_header(&resp, "X-Storage-Url", "Cloudfiles auth")?
                .trim_end_matches('/')
                .to_string(),
            token: required_header(&resp, "X-Auth-Token", "Cloudfiles auth")?,
        };
        tracing::debug!("Cloudfiles session established at {}", session.storage_url);

        Ok(self.session.get_or_init(|| session))
    }

    fn container_url(&self) -> Result<String> {
        Ok(format!("{}/{}", self.session()?.storage_url, self.container))
    }

    fn object_url(&self, key: &str) -> Result<String> {
        Ok(format!("{}/{}", self.container_url()?, encode_object_name(key)))
    }

    /// One listing page of names after `marker`, in container order.
    fn list_page(&self, prefix: &str, marker: Option<&str>) -> Result<Vec<String>> {
        let limit = LIST_LIMIT.to_string();
        let mut req = self
            .apply_auth(self.agent.get(&self.container_url()?))?
            .query("format", "json")
            .query("limit", &limit);
        if !prefix.is_empty() {
            req = req.query("prefix", prefix);
        }
        if let Some(marker) = marker {
            req = req.query("marker", marker);
        }
        let resp = match req.call() {
            Ok(resp) => resp,
            Err(ureq::Error::Status(404, _)) => return Ok(Vec::new()),
            Err(e) => {
                return Err(StratusError::Remote(format!("Cloudfiles LIST {prefix}: {e}")))
            }
        };
        if resp.status() == 204 {
            return Ok(Vec::new());
        }
        let body = read_body(resp, &format!("Cloudfiles LIST {prefix}"))?;
        parse_listing(&body)
    }

    fn apply_auth(&self, req: ureq::Request) -> Result<ureq::Request> {
        Ok(req.set("X-Auth-Token", &self.session()?.token))
    }
}

impl StorageBackend for CloudfilesBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let req = self.apply_auth(self.agent.get(&self.object_url(key)?))?;
        match req.call() {
            Ok(resp) => Ok(Some(read_body(resp, &format!("Cloudfiles GET {key}"))?)),
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(e) => Err(StratusError::Remote(format!("Cloudfiles GET {key}: {e}"))),
        }
    }

    fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        let req = self.apply_auth(self.agent.put(&self.object_url(key)?))?;
        req.set("Content-Type", "application/octet-stream")
            .send_bytes(data)
            .map_err(|e| StratusError::Remote(format!("Cloudfiles PUT {key}: {e}")))?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let req = self.apply_auth(self.agent.delete(&self.object_url(key)?))?;
        match req.call() {
            Ok(_) | Err(ureq::Error::Status(404, _)) => Ok(()),
            Err(e) => Err(StratusError::Remote(format!("Cloudfiles DELETE {key}: {e}"))),
        }
    }

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.checksum(key)?.is_some())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        collect_pages(LIST_LIMIT, |marker| self.list_page(prefix, marker))
    }

    fn checksum(&self, key: &str) -> Result<Option<String>> {
        let req = self.apply_auth(self.agent.head(&self.object_url(key)?))?;
        match req.call() {
            Ok(resp) => Ok(resp.header("ETag").map(etag_value)),
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(e) => Err(StratusError::Remote(format!("Cloudfiles HEAD {key}: {e}"))),
        }
    }

    fn create_container(&self) -> Result<()> {
        let req = self.apply_auth(self.agent.put(&self.container_url()?))?;
        req.send_bytes(&[]).map_err(|e| {
            StratusError::Remote(format!("Cloudfiles create container {}: {e}", self.container))
        })?;
        Ok(())
    }

    fn location(&self) -> String {
        format!("Cloudfiles container: {}", self.container)
    }
}

/// Object names are sent as a single path segment, so `/`, `?` and `#`
/// are escaped too.
fn encode_object_name(name: &str) -> String {
    utf8_percent_encode(name.trim_start_matches('/'), OBJECT_NAME_ENCODE_SET).to_string()
}

/// Fetch pages until one comes back short, passing the last name seen as
/// the marker for the next request.
fn collect_pages<F>(page_size: usize, mut fetch: F) -> Result<Vec<String>>
where
    F: FnMut(Option<&str>) -> Result<Vec<String>>,
{
    let mut names: Vec<String> = Vec::new();
    loop {
        let page = fetch(names.last().map(String::as_str))?;
        let done = page.len() < page_size;
        names.extend(page);
        if done {
            return Ok(names);
        }
    }
}

fn parse_listing(body: &[u8]) -> Result<Vec<String>> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Vec::new());
    }
    let objects: Vec<ObjectInfo> = serde_json::from_slice(body)
        .map_err(|e| StratusError::InvalidFormat(format!("Cloudfiles listing: {e}")))?;
    Ok(objects.into_iter().map(|o| o.name).collect())
}
