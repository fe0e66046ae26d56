use std::io::Read;
use std::time::Duration;

use stratus_types::error::{Result, StratusError};

/// Blocking HTTP agent shared by all remote backends.
pub fn build_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(30))
        .timeout_read(Duration::from_secs(300))
        .timeout_write(Duration::from_secs(300))
        .build()
}

/// Extract a header that the protocol guarantees to be present.
pub fn required_header(resp: &ureq::Response, name: &str, context: &str) -> Result<String> {
    resp.header(name)
        .map(|v| v.to_string())
        .ok_or_else(|| StratusError::Remote(format!("{context}: response missing {name} header")))
}

/// Read a response body to the end.
pub fn read_body(resp: ureq::Response, context: &str) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    resp.into_reader()
        .read_to_end(&mut buf)
        .map_err(|e| StratusError::Remote(format!("{context}: body read error: {e}")))?;
    Ok(buf)
}

/// Normalize an `ETag` header value (strips the surrounding quotes).
pub fn etag_value(raw: &str) -> String {
    raw.trim().trim_matches('"').to_string()
}

/// Host component of an `http(s)://host[:port]/...` URL.
pub fn host_of(url: &str) -> Result<String> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| StratusError::Config(format!("endpoint must be http(s): '{url}'")))?;
    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err(StratusError::Config(format!("endpoint has no host: '{url}'")));
    }
    Ok(host.to_string())
}
