//! Sonarr REST client.
//!
//! A thin JSON-level wrapper over the v3 API: the engine works on raw
//! `serde_json::Value` records, so this client does not model any resource
//! schema. Authentication is the `X-Api-Key` header on every request.

use crate::error::{Error, Result};
use serde_json::Value;
use std::time::Duration;
use ureq::Agent;

const API_KEY_HEADER: &str = "X-Api-Key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one Sonarr-style server instance.
#[derive(Debug, Clone)]
pub struct ArrClient {
    agent: Agent,
    base_url: String,
    api_key: String,
}

impl ArrClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            // Non-2xx answers carry bodies we want to read.
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v3/{path}", self.base_url)
    }

    /// Probe connectivity and authentication.
    pub fn ping(&self) -> Result<()> {
        let status = self.get_one("system/status")?;
        let version = status
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        log::debug!("Connected to {} (version {version})", self.base_url);
        Ok(())
    }

    /// GET a collection endpoint.
    pub fn get_list(&self, path: &str) -> Result<Vec<Value>> {
        match self.get_one(path)? {
            Value::Array(items) => Ok(items),
            other => Err(Error::InvalidResponse {
                path: path.to_string(),
                message: format!("expected an array, got {}", kind_of(&other)),
            }),
        }
    }

    /// GET a single-record endpoint.
    pub fn get_one(&self, path: &str) -> Result<Value> {
        let response = self
            .agent
            .get(&self.url(path))
            .header(API_KEY_HEADER, &self.api_key)
            .call()
            .map_err(Error::from_transport)?;
        read_json(path, response)
    }

    /// POST a new record.
    pub fn post(&self, path: &str, record: &Value) -> Result<Value> {
        let response = self
            .agent
            .post(&self.url(path))
            .header(API_KEY_HEADER, &self.api_key)
            .send_json(record)
            .map_err(Error::from_transport)?;
        read_json(path, response)
    }

    /// PUT an existing record at `path/{id}`.
    pub fn put(&self, path: &str, id: i64, record: &Value) -> Result<Value> {
        let path = format!("{path}/{id}");
        let response = self
            .agent
            .put(&self.url(&path))
            .header(API_KEY_HEADER, &self.api_key)
            .send_json(record)
            .map_err(Error::from_transport)?;
        read_json(&path, response)
    }

    /// DELETE the record at `path/{id}`.
    pub fn delete(&self, path: &str, id: i64) -> Result<()> {
        let path = format!("{path}/{id}");
        let response = self
            .agent
            .delete(&self.url(&path))
            .header(API_KEY_HEADER, &self.api_key)
            .call()
            .map_err(Error::from_transport)?;
        read_json(&path, response).map(|_| ())
    }
}

/// Check status and parse the body. Empty bodies (DELETE, some PUTs)
/// parse as null.
fn read_json(path: &str, mut response: ureq::http::Response<ureq::Body>) -> Result<Value> {
    let status = response.status().as_u16();
    let text = response
        .body_mut()
        .read_to_string()
        .map_err(Error::from_transport)?;

    if !(200..300).contains(&status) {
        return Err(Error::for_status(status, path, text));
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|err| Error::InvalidResponse {
        path: path.to_string(),
        message: err.to_string(),
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
