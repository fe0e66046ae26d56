//! AWS Signature Version 4 request signing for services that `rusty_s3`
//! does not cover (Glacier).

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

/// SHA-256 of an empty payload, used for bodiless requests.
pub const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Credentials and scope for signing requests to one service in one region.
#[derive(Clone)]
pub struct Signer {
    access_key: String,
    secret_key: String,
    region: String,
    service: String,
}

impl Signer {
    pub fn new(access_key: &str, secret_key: &str, region: &str, service: &str) -> Self {
        Self {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
            region: region.to_string(),
            service: service.to_string(),
        }
    }

    /// Build the `Authorization` header value.
    ///
    /// `headers` must already contain every header that is sent and signed,
    /// including `host` and `x-amz-date`.
    pub fn authorization(
        &self,
        method: &str,
        uri_path: &str,
        query: &str,
        headers: &[(String, String)],
        payload_hash: &str,
        now: DateTime<Utc>,
    ) -> String {
        let ds = now.format("%Y%m%d").to_string();
        let ad = amz_date(now);
        let scope = format!("{ds}/{}/{}/aws4_request", self.region, self.service);

        let mut canonical: Vec<(String, String)> = headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.trim().to_string()))
            .collect();
        canonical.sort_by(|a, b| a.0.cmp(&b.0));

        let signed = canonical
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";");
        let hdr: String = canonical
            .iter()
            .map(|(k, v)| format!("{k}:{v}\n"))
            .collect();

        let cr = format!("{method}\n{uri_path}\n{query}\n{hdr}\n{signed}\n{payload_hash}");
        let hash = hex_sha256(cr.as_bytes());
        let sts = format!("AWS4-HMAC-SHA256\n{ad}\n{scope}\n{hash}");
        let key = derive_signing_key(&self.secret_key, &ds, &self.region, &self.service);
        let sig = hex::encode(hmac_sha256(&key, sts.as_bytes()));
        format!(
            "AWS4-HMAC-SHA256 Credential={}/{scope}, SignedHeaders={signed}, Signature={sig}",
            self.access_key
        )
    }
}

/// `x-amz-date` timestamp format.
pub fn amz_date(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%SZ").to_string()
}

pub fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

pub(crate) fn derive_signing_key(
    secret_key: &str,
    date_stamp: &str,
    region: &str,
    service: &str,
) -> Vec<u8> {
    let k_date = hmac_sha256(
        format!("AWS4{secret_key}").as_bytes(),
        date_stamp.as_bytes(),
    );
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}
