//! Distributed backend over a Consul-compatible KV HTTP API.
//!
//! The remote keyspace is flat: keys are sent as-is, with no container
//! parsing. `"a/x"` is a single key here, whereas the embedded backend
//! would read it as item `"x"` of container `"a"`.
//!
//! # `list` / `delete_tree`
//!
//! Both treat their argument as a key prefix:
//!
//! - `list(prefix)` returns every key starting with `prefix`; `""` means
//!   all keys.
//! - `delete_tree(prefix)` deletes every key starting with `prefix` in one
//!   request.
//!
//! # Endpoints
//!
//! | operation     | request                              |
//! |---------------|--------------------------------------|
//! | `get`         | `GET    /v1/kv/<key>?raw`            |
//! | `put`         | `PUT    /v1/kv/<key>` (raw body)     |
//! | `delete`      | `DELETE /v1/kv/<key>`                |
//! | `list`        | `GET    /v1/kv/<prefix>?keys`        |
//! | `delete_tree` | `DELETE /v1/kv/<prefix>?recurse`     |

use std::io::Read;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::traits::Store;

const KV_PATH: &str = "/v1/kv/";

/// Store backed by a remote hierarchical KV service.
#[derive(Debug)]
pub struct DistributedStore {
    base_url: String,
    timeout: Option<Duration>,
    agent: Option<ureq::Agent>,
}

impl DistributedStore {
    /// Build a client for `address`.
    ///
    /// `address` may omit the scheme, in which case `http://` is assumed.
    /// `timeout` bounds every request; `None` waits indefinitely. No request
    /// is made until the first operation.
    pub fn connect(address: &str, timeout: Option<Duration>) -> StoreResult<Self> {
        let address = address.trim();
        if address.is_empty() {
            return Err(StoreError::Config("server address must not be empty".into()));
        }

        let base_url = if address.contains("://") {
            address.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", address.trim_end_matches('/'))
        };

        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        info!(url = %base_url, ?timeout, "distributed store client ready");
        Ok(Self {
            base_url,
            timeout,
            agent: Some(builder.build()),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Per-request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn agent(&self) -> StoreResult<&ureq::Agent> {
        self.agent.as_ref().ok_or(StoreError::Closed)
    }

    fn kv_url(&self, key: &str) -> String {
        let key = key.strip_prefix('/').unwrap_or(key);
        format!("{}{}{}", self.base_url, KV_PATH, encode_key(key))
    }
}

/// Parse the optional timeout option (whole seconds, `0` for none).
fn parse_timeout(raw: &str) -> StoreResult<Option<Duration>> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|e| StoreError::Config(format!("invalid timeout {raw:?}: {e}")))?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

/// Percent-encode a key for use as a URL path, keeping `/` as a separator.
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

fn read_body(response: ureq::Response) -> StoreResult<Vec<u8>> {
    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|e| StoreError::Network(format!("reading response body: {e}")))?;
    Ok(body)
}

impl Store for DistributedStore {
    /// `options[0]` is the server address, `options[1]` an optional
    /// timeout in whole seconds.
    fn init(options: &[String]) -> StoreResult<Self> {
        let address = options.first().ok_or_else(|| {
            StoreError::Config("address required to init distributed store".into())
        })?;
        let timeout = match options.get(1) {
            Some(raw) => parse_timeout(raw)?,
            None => None,
        };
        Self::connect(address, timeout)
    }

    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        let url = format!("{}?raw", self.kv_url(key));
        match self.agent()?.get(&url).call() {
            Ok(response) => {
                let value = read_body(response)?;
                debug!(key, len = value.len(), "get");
                Ok(value)
            }
            Err(ureq::Error::Status(404, _)) => Err(StoreError::not_found(key)),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let response = self.agent()?.put(&self.kv_url(key)).send_bytes(value)?;
        let body = read_body(response)?;
        if body.trim_ascii() == b"false" {
            return Err(StoreError::Network(format!("remote rejected write of {key:?}")));
        }
        debug!(key, len = value.len(), "put");
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        match self.agent()?.delete(&self.kv_url(key)).call() {
            Ok(_) | Err(ureq::Error::Status(404, _)) => {
                debug!(key, "delete");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Prefix scan over the flat keyspace.
    fn list(&self, arg: &str) -> StoreResult<Vec<String>> {
        let url = format!("{}?keys", self.kv_url(arg));
        let response = match self.agent()?.get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(404, _)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let keys: Vec<String> = serde_json::from_reader(response.into_reader())
            .map_err(|e| StoreError::Network(format!("malformed key listing: {e}")))?;
        debug!(prefix = arg, count = keys.len(), "list");
        Ok(keys)
    }

    /// Deletes every key starting with `arg`.
    fn delete_tree(&self, arg: &str) -> StoreResult<()> {
        let url = format!("{}?recurse", self.kv_url(arg));
        match self.agent()?.delete(&url).call() {
            Ok(_) | Err(ureq::Error::Status(404, _)) => {
                debug!(prefix = arg, "tree deleted");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn close(&mut self) -> StoreResult<()> {
        if self.agent.take().is_some() {
            info!(url = %self.base_url, "distributed store client closed");
        }
        Ok(())
    }
}
