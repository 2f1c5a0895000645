//! Typed access to a dispatcher's remote procedures.
//!
//! Every method forwards to the procedure of the same name. Wire names and
//! argument order are fixed by the dispatcher, including the historical
//! `JobSubmisstion*` spelling. Dispatcher-side failures come back as
//! [`Error::RemoteProcedure`] and are not interpreted here.

use std::path::Path;

use gizo_core::{EndpointDescriptor, ExecParams, GizoConfig, JobRequest, JobRequests, KeyPair};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::bootstrap::{issue_key_pair, Bootstrapper, Session};
use crate::error::{Error, Result};
use crate::rpc::{self, RpcConnection};

const JOB_FILE_EXTENSION: &str = "ank";

/// A bootstrapped connection to one dispatcher.
#[derive(Debug)]
pub struct Gizo {
    session: Session,
}

impl Gizo {
    /// Bootstrap a connection as described in [`crate::bootstrap`].
    pub async fn connect(config: GizoConfig) -> Result<Self> {
        let session = Bootstrapper::new(config)?.bootstrap().await?;
        Ok(Self { session })
    }

    pub fn dispatcher(&self) -> &EndpointDescriptor {
        &self.session.endpoint
    }

    /// Key pair used to sign job submissions.
    pub fn keys(&self) -> &KeyPair {
        &self.session.keys
    }

    pub fn connection(&self) -> &RpcConnection {
        &self.session.connection
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T> {
        let value = self.session.connection.call(method, params).await?;
        rpc::decode(method, value)
    }

    async fn call_json<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T> {
        let value = self.session.connection.call(method, params).await?;
        rpc::decode_json(method, value)
    }

    async fn exec_query<T: DeserializeOwned>(
        &self,
        method: &str,
        job_id: &str,
        exec_hash: &[u8],
    ) -> Result<T> {
        self.call(method, vec![json!(job_id), json!(exec_hash)]).await
    }

    // ── Node & chain ──────────────────────────────────────────────────────────

    pub async fn version(&self) -> Result<Value> {
        self.call_json("Version", vec![]).await
    }

    pub async fn peer_count(&self) -> Result<u64> {
        self.call("PeerCount", vec![]).await
    }

    pub async fn peers(&self) -> Result<Vec<String>> {
        self.call("Peers", vec![]).await
    }

    /// Dispatcher's own public key.
    pub async fn public_key(&self) -> Result<String> {
        self.call("PublicKey", vec![]).await
    }

    pub async fn score(&self) -> Result<f64> {
        self.call("Score", vec![]).await
    }

    pub async fn pending_count(&self) -> Result<u64> {
        self.call("PendingCount", vec![]).await
    }

    pub async fn block_by_hash(&self, hash: &str) -> Result<Value> {
        self.call_json("BlockByHash", vec![json!(hash)]).await
    }

    pub async fn block_by_height(&self, height: u64) -> Result<Value> {
        self.call_json("BlockByHeight", vec![json!(height)]).await
    }

    pub async fn latest_15_blocks(&self) -> Result<Vec<Value>> {
        self.call_json("Latest15Blocks", vec![]).await
    }

    pub async fn latest_block(&self) -> Result<Value> {
        self.call_json("LatestBlock", vec![]).await
    }

    pub async fn latest_block_height(&self) -> Result<u64> {
        self.call("LatestBlockHeight", vec![]).await
    }

    pub async fn block_hashes_hex(&self) -> Result<Vec<String>> {
        self.call("BlockHashesHex", vec![]).await
    }

    /// Ask the dispatcher for a new key pair. Does not replace the session's
    /// keys or touch the state file.
    pub async fn key_pair(&self) -> Result<KeyPair> {
        issue_key_pair(&self.session.connection).await
    }

    // ── Workers ───────────────────────────────────────────────────────────────

    pub async fn workers_count(&self) -> Result<u64> {
        self.call("WorkersCount", vec![]).await
    }

    pub async fn workers_count_busy(&self) -> Result<u64> {
        self.call("WorkersCountBusy", vec![]).await
    }

    pub async fn workers_count_not_busy(&self) -> Result<u64> {
        self.call("WorkersCountNotBusy", vec![]).await
    }

    pub async fn job_queue_count(&self) -> Result<u64> {
        self.call("JobQueueCount", vec![]).await
    }

    // ── Jobs ──────────────────────────────────────────────────────────────────

    /// Register the anko source at `path` as a new job. Returns the job id.
    ///
    /// Anything without a `.ank` extension is rejected before touching the
    /// network.
    pub async fn new_job(&self, path: impl AsRef<Path>, name: &str, private: bool) -> Result<String> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some(JOB_FILE_EXTENSION) {
            return Err(Error::InvalidJobFile(path.to_path_buf()));
        }
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::JobFile(path.to_path_buf(), e))?;

        self.call(
            "NewJob",
            vec![
                json!(source),
                json!(name),
                json!(private),
                json!(self.session.keys.private),
            ],
        )
        .await
    }

    /// Create an exec. The environment is sent as a JSON string after the
    /// caller's public key.
    pub async fn new_exec(&self, params: &ExecParams) -> Result<Value> {
        let envs = params.envs.to_json()?;
        self.call_json(
            "NewExec",
            vec![
                json!(params.args),
                json!(params.retries),
                json!(params.priority),
                json!(params.backoff),
                json!(params.exec_time),
                json!(params.interval),
                json!(params.ttl),
                json!(self.session.keys.public),
                json!(envs),
            ],
        )
        .await
    }

    pub async fn job(&self, job_id: &str) -> Result<Value> {
        self.call_json("Job", vec![json!(job_id)]).await
    }

    pub async fn job_name(&self, job_id: &str) -> Result<String> {
        self.call("JobName", vec![json!(job_id)]).await
    }

    pub async fn is_job_private(&self, job_id: &str) -> Result<bool> {
        self.call("IsJobPrivate", vec![json!(job_id)]).await
    }

    pub async fn job_submission_time_unix(&self, job_id: &str) -> Result<i64> {
        self.call("JobSubmisstionTimeUnix", vec![json!(job_id)]).await
    }

    pub async fn job_submission_time_string(&self, job_id: &str) -> Result<String> {
        self.call("JobSubmisstionTimeString", vec![json!(job_id)]).await
    }

    pub async fn job_latest_exec(&self, job_id: &str) -> Result<Value> {
        self.call_json("JobLatestExec", vec![json!(job_id)]).await
    }

    pub async fn job_execs(&self, job_id: &str) -> Result<Value> {
        self.call_json("JobExecs", vec![json!(job_id)]).await
    }

    // ── Composition ───────────────────────────────────────────────────────────

    pub async fn solo(&self, request: &JobRequest) -> Result<Value> {
        self.call("Solo", vec![json!(request.to_json()?)]).await
    }

    pub async fn chord(&self, requests: &[JobRequests], callback: &JobRequest) -> Result<Value> {
        self.compose("Chord", requests, callback).await
    }

    pub async fn chain(&self, requests: &[JobRequests], callback: &JobRequest) -> Result<Value> {
        self.compose("Chain", requests, callback).await
    }

    pub async fn batch(&self, requests: &[JobRequests], callback: &JobRequest) -> Result<Value> {
        self.compose("Batch", requests, callback).await
    }

    async fn compose(
        &self,
        method: &str,
        requests: &[JobRequests],
        callback: &JobRequest,
    ) -> Result<Value> {
        let requests = requests
            .iter()
            .map(JobRequests::to_json)
            .collect::<serde_json::Result<Vec<_>>>()?;
        self.call(method, vec![json!(requests), json!(callback.to_json()?)])
            .await
    }

    // ── Execs ─────────────────────────────────────────────────────────────────

    pub async fn exec_status(&self, job_id: &str, exec_hash: &[u8]) -> Result<String> {
        self.exec_query("ExecStatus", job_id, exec_hash).await
    }

    pub async fn cancel_exec(&self, exec_hash: &[u8]) -> Result<Value> {
        self.call("CancelExec", vec![json!(exec_hash)]).await
    }

    pub async fn exec_timestamp(&self, job_id: &str, exec_hash: &[u8]) -> Result<i64> {
        self.exec_query("ExecTimestamp", job_id, exec_hash).await
    }

    pub async fn exec_timestamp_string(&self, job_id: &str, exec_hash: &[u8]) -> Result<String> {
        self.exec_query("ExecTimestampString", job_id, exec_hash).await
    }

    pub async fn exec_duration_nanoseconds(&self, job_id: &str, exec_hash: &[u8]) -> Result<i64> {
        self.exec_query("ExecDurationNanoseconds", job_id, exec_hash).await
    }

    pub async fn exec_duration_seconds(&self, job_id: &str, exec_hash: &[u8]) -> Result<f64> {
        self.exec_query("ExecDurationSeconds", job_id, exec_hash).await
    }

    pub async fn exec_duration_minutes(&self, job_id: &str, exec_hash: &[u8]) -> Result<f64> {
        self.exec_query("ExecDurationMinutes", job_id, exec_hash).await
    }

    pub async fn exec_duration_string(&self, job_id: &str, exec_hash: &[u8]) -> Result<String> {
        self.exec_query("ExecDurationString", job_id, exec_hash).await
    }

    pub async fn exec_args(&self, job_id: &str, exec_hash: &[u8]) -> Result<Vec<Value>> {
        self.exec_query("ExecArgs", job_id, exec_hash).await
    }

    pub async fn exec_err(&self, job_id: &str, exec_hash: &[u8]) -> Result<Value> {
        self.exec_query("ExecErr", job_id, exec_hash).await
    }

    pub async fn exec_priority(&self, job_id: &str, exec_hash: &[u8]) -> Result<i64> {
        self.exec_query("ExecPriority", job_id, exec_hash).await
    }

    pub async fn exec_result(&self, job_id: &str, exec_hash: &[u8]) -> Result<Value> {
        self.exec_query("ExecResult", job_id, exec_hash).await
    }

    pub async fn exec_retries(&self, job_id: &str, exec_hash: &[u8]) -> Result<i64> {
        self.exec_query("ExecRetries", job_id, exec_hash).await
    }

    pub async fn exec_backoff(&self, job_id: &str, exec_hash: &[u8]) -> Result<f64> {
        self.exec_query("ExecBackoff", job_id, exec_hash).await
    }

    pub async fn exec_execution_time(&self, job_id: &str, exec_hash: &[u8]) -> Result<i64> {
        self.exec_query("ExecExecutionTime", job_id, exec_hash).await
    }

    pub async fn exec_execution_time_string(&self, job_id: &str, exec_hash: &[u8]) -> Result<String> {
        self.exec_query("ExecExecutionTimeString", job_id, exec_hash).await
    }

    pub async fn exec_interval(&self, job_id: &str, exec_hash: &[u8]) -> Result<i64> {
        self.exec_query("ExecInterval", job_id, exec_hash).await
    }

    /// Public key of whoever submitted the exec.
    pub async fn exec_by(&self, job_id: &str, exec_hash: &[u8]) -> Result<String> {
        self.exec_query("ExecBy", job_id, exec_hash).await
    }

    pub async fn exec_ttl_nanoseconds(&self, job_id: &str, exec_hash: &[u8]) -> Result<i64> {
        self.exec_query("ExecTtlNanoseconds", job_id, exec_hash).await
    }

    pub async fn exec_ttl_seconds(&self, job_id: &str, exec_hash: &[u8]) -> Result<f64> {
        self.exec_query("ExecTtlSeconds", job_id, exec_hash).await
    }

    pub async fn exec_ttl_minutes(&self, job_id: &str, exec_hash: &[u8]) -> Result<f64> {
        self.exec_query("ExecTtlMinutes", job_id, exec_hash).await
    }

    pub async fn exec_ttl_hours(&self, job_id: &str, exec_hash: &[u8]) -> Result<f64> {
        self.exec_query("ExecTtlHours", job_id, exec_hash).await
    }

    pub async fn exec_ttl_string(&self, job_id: &str, exec_hash: &[u8]) -> Result<String> {
        self.exec_query("ExecTtlString", job_id, exec_hash).await
    }
}
