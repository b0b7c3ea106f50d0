//! Remote object-store access.
//!
//! [`ObjectStore`] is the seam the push step uploads through. The production
//! implementation, [`S3ObjectStore`], issues AWS Signature Version 4 signed
//! `PUT` requests with a blocking `reqwest` client; tests substitute their own
//! stores.
//!
//! # Addressing
//! - **Default endpoint**: virtual-host style, `https://<bucket>.s3.<region>.amazonaws.com/<key>`
//! - **Custom endpoint** (MinIO, localstack, ...): path style, `<endpoint>/<bucket>/<key>`
//!
//! # Retries
//! Transport errors, HTTP 5xx and HTTP 429 are retried up to `max_retries`
//! times with a doubling delay; every other failure is returned immediately.

use crate::core::config::RemoteConfig;
use crate::core::error::{Result, VcsError};
use chrono::{DateTime, Utc};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_MAX_RETRIES: u32 = 2;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

/// A key-value store that creates or overwrites named objects.
pub trait ObjectStore: Send + Sync {
    /// Create or overwrite the object at `key` with `body`.
    fn put(&self, key: &str, body: Vec<u8>) -> Result<()>;

    /// Human-readable destination, used in logs and reports.
    fn describe(&self) -> String;
}

pub struct S3ObjectStore {
    config: RemoteConfig,
    client: Client,
    max_retries: u32,
}

impl S3ObjectStore {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| VcsError::upload_failed("<client>", e))?;
        Ok(Self {
            config,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Host header value and canonical URI for `key`.
    fn locate(&self, key: &str) -> (String, String, String) {
        let encoded_key = uri_encode_path(key);
        match &self.config.endpoint {
            Some(endpoint) => {
                let (scheme, host) = endpoint
                    .split_once("://")
                    .unwrap_or(("https", endpoint.as_str()));
                let uri = format!("/{}/{}", uri_encode_path(&self.config.bucket), encoded_key);
                (scheme.to_string(), host.to_string(), uri)
            }
            None => {
                let host = format!("{}.s3.{}.amazonaws.com", self.config.bucket, self.config.region);
                ("https".to_string(), host, format!("/{encoded_key}"))
            }
        }
    }

    fn put_once(&self, key: &str, body: &[u8]) -> std::result::Result<(), PutFailure> {
        let (scheme, host, uri) = self.locate(key);
        let signed = sign_put(&self.config, &host, &uri, body, Utc::now())
            .map_err(|e| PutFailure::Permanent(e.to_string()))?;

        let response = self
            .client
            .put(format!("{scheme}://{host}{uri}"))
            .header("x-amz-date", &signed.amz_date)
            .header("x-amz-content-sha256", &signed.payload_hash)
            .header("authorization", &signed.authorization)
            .body(body.to_vec())
            .send()
            .map_err(|e| PutFailure::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = response.text().unwrap_or_default();
        let cause = format!("HTTP {status}: {}", summarize_error_body(&detail));
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            Err(PutFailure::Transient(cause))
        } else {
            Err(PutFailure::Permanent(cause))
        }
    }
}

impl ObjectStore for S3ObjectStore {
    fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        let mut delay = RETRY_BASE_DELAY;
        let mut attempt = 0;
        loop {
            match self.put_once(key, &body) {
                Ok(()) => return Ok(()),
                Err(PutFailure::Transient(cause)) if attempt < self.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "Upload of '{key}' failed ({cause}), retry {attempt}/{} in {delay:?}",
                        self.max_retries
                    );
                    std::thread::sleep(delay);
                    delay *= 2;
                }
                Err(PutFailure::Transient(cause)) | Err(PutFailure::Permanent(cause)) => {
                    return Err(VcsError::upload_failed(key, cause));
                }
            }
        }
    }

    fn describe(&self) -> String {
        match &self.config.endpoint {
            Some(endpoint) => format!("{endpoint}/{}", self.config.bucket),
            None => format!("s3://{} ({})", self.config.bucket, self.config.region),
        }
    }
}

/// Objects kept in process memory, keyed like the remote store.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored object.
    pub fn objects(&self) -> BTreeMap<String, Vec<u8>> {
        match self.objects.lock() {
            Ok(objects) => objects.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|e| VcsError::upload_failed(key, e))?;
        objects.insert(key.to_string(), body);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

enum PutFailure {
    Transient(String),
    Permanent(String),
}

/// Pull the `<Code>` out of an S3 XML error body, or truncate whatever came back.
fn summarize_error_body(body: &str) -> String {
    if let Some(start) = body.find("<Code>") {
        if let Some(end) = body[start..].find("</Code>") {
            return body[start + 6..start + end].to_string();
        }
    }
    body.chars().take(200).collect()
}

/// Headers produced by signing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub amz_date: String,
    pub payload_hash: String,
    pub authorization: String,
}

pub fn sign_put(
    config: &RemoteConfig,
    host: &str,
    canonical_uri: &str,
    body: &[u8],
    now: DateTime<Utc>,
) -> Result<SignedRequest> {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = now.format("%Y%m%d").to_string();
    let payload_hash = hex::encode(Sha256::digest(body));

    let canonical_request = format!(
        "PUT\n{canonical_uri}\n\nhost:{host}\nx-amz-content-sha256:{payload_hash}\nx-amz-date:{amz_date}\n\n{SIGNED_HEADERS}\n{payload_hash}"
    );
    let scope = format!("{date_stamp}/{}/s3/aws4_request", config.region);
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{amz_date}\n{scope}\n{}",
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let key = signing_key(&config.secret_access_key, &date_stamp, &config.region, "s3")?;
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

    Ok(SignedRequest {
        authorization: format!(
            "AWS4-HMAC-SHA256 Credential={}/{scope}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}",
            config.access_key_id
        ),
        amz_date,
        payload_hash,
    })
}

pub fn signing_key(secret: &str, date_stamp: &str, region: &str, service: &str) -> Result<Vec<u8>> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date_stamp.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <HmacSha256 as KeyInit>::new_from_slice(key)
        .map_err(VcsError::signing_failed)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Percent-encode each `/`-separated segment, leaving RFC 3986 unreserved characters.
pub fn uri_encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
