//! Dispatcher transport.
//!
//! Remote procedures are invoked as JSON-RPC 2.0 over HTTP POST to the
//! dispatcher's `/rpc` endpoint, with arguments passed positionally:
//!
//!   -> {"jsonrpc": "2.0", "method": "BlockByHeight", "params": [12], "id": 3}
//!   <- {"jsonrpc": "2.0", "result": "{\"height\":12,...}", "id": 3}
//!   <- {"jsonrpc": "2.0", "error": {"code": -32000, "message": "..."}, "id": 3}
//!
//! Procedures that return structured data send it as a JSON-encoded string;
//! [`decode_json`] unwraps that second layer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use gizo_core::{EndpointDescriptor, GizoConfig};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Vec<Value>,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    /// `None` only when the member is absent; an explicit `null` is `Some`.
    #[serde(default, deserialize_with = "present")]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    #[serde(default)]
    code: i64,
    message: String,
}

// ── Transport ─────────────────────────────────────────────────────────────────

/// Shared HTTP client plus the timeouts every dispatcher interaction uses.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    health_timeout: Duration,
    call_timeout: Option<Duration>,
}

impl Transport {
    pub fn new(config: &GizoConfig) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            health_timeout: config.health_timeout(),
            call_timeout: config.rpc_timeout(),
        })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// GET the health endpoint. Any response within the timeout counts as
    /// healthy; the status code is not inspected.
    pub async fn probe(&self, endpoint: &EndpointDescriptor) -> Result<()> {
        self.http
            .get(endpoint.health_endpoint())
            .timeout(self.health_timeout)
            .send()
            .await?;
        Ok(())
    }

    /// Probe the dispatcher and, if it answers, bind a connection to its RPC
    /// endpoint.
    pub async fn connect(&self, endpoint: &EndpointDescriptor) -> Result<RpcConnection> {
        self.probe(endpoint).await?;
        tracing::debug!(dispatcher = %endpoint, "dispatcher healthy");
        Ok(RpcConnection {
            http: self.http.clone(),
            url: endpoint.rpc_endpoint(),
            call_timeout: self.call_timeout,
            next_id: AtomicU64::new(1),
        })
    }
}

// ── Connection ────────────────────────────────────────────────────────────────

/// A live handle to one dispatcher's RPC endpoint.
#[derive(Debug)]
pub struct RpcConnection {
    http: reqwest::Client,
    url: String,
    call_timeout: Option<Duration>,
    next_id: AtomicU64,
}

impl RpcConnection {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Invoke `method` and return its raw result. A non-2xx reply without a
    /// JSON-RPC error, or a body carrying neither `result` nor `error`, is an
    /// [`Error::InvalidResponse`].
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        let mut builder = self.http.post(&self.url).json(&request);
        if let Some(timeout) = self.call_timeout {
            builder = builder.timeout(timeout);
        }
        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        let invalid = |reason: String| Error::InvalidResponse {
            context: method.to_string(),
            reason,
        };
        let decoded: JsonRpcResponse = serde_json::from_slice(&body).map_err(|e| {
            if status.is_success() {
                invalid(e.to_string())
            } else {
                invalid(format!("HTTP {}", status))
            }
        })?;

        if let Some(err) = decoded.error {
            tracing::debug!(method, code = err.code, message = %err.message, "remote procedure failed");
            return Err(Error::RemoteProcedure {
                method: method.to_string(),
                message: err.message,
            });
        }
        if !status.is_success() {
            return Err(invalid(format!("HTTP {}", status)));
        }
        decoded
            .result
            .ok_or_else(|| invalid("response has neither result nor error".to_string()))
    }
}

// ── Result decoding ───────────────────────────────────────────────────────────

/// Deserialize a result that is sent as a plain JSON value.
pub fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::InvalidResponse {
        context: method.to_string(),
        reason: e.to_string(),
    })
}

/// Deserialize a result that is sent as a JSON-encoded string. Results that
/// already arrive structured are accepted as-is.
pub fn decode_json<T: DeserializeOwned>(method: &str, value: Value) -> Result<T> {
    match value {
        Value::String(text) => serde_json::from_str(&text).map_err(|e| Error::InvalidResponse {
            context: method.to_string(),
            reason: e.to_string(),
        }),
        other => decode(method, other),
    }
}
