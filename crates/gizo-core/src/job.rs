//! Job and exec payloads sent to dispatchers.

use std::fmt;
use std::str::FromStr;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

// ── Priorities ────────────────────────────────────────────────────────────────

/// Exec scheduling priority. Higher runs first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    #[default]
    Normal,
    Low,
    Medium,
    High,
    Boss,
}

impl Priority {
    pub fn value(self) -> i64 {
        match self {
            Priority::Normal => 0,
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
            Priority::Boss => 4,
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.value())
    }
}

// ── Exec states ───────────────────────────────────────────────────────────────

/// Lifecycle state reported by `ExecStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    Queued,
    Started,
    Running,
    Retrying,
    Finished,
    Failed,
    Cancelled,
    Timeout,
}

impl ExecState {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecState::Queued => "QUEUED",
            ExecState::Started => "STARTED",
            ExecState::Running => "RUNNING",
            ExecState::Retrying => "RETRYING",
            ExecState::Finished => "FINISHED",
            ExecState::Failed => "FAILED",
            ExecState::Cancelled => "CANCELLED",
            ExecState::Timeout => "TIMEOUT",
        }
    }

    /// True once the exec will not change state again.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecState::Finished | ExecState::Failed | ExecState::Cancelled | ExecState::Timeout
        )
    }
}

impl fmt::Display for ExecState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown exec state: {0}")]
pub struct UnknownExecState(pub String);

impl FromStr for ExecState {
    type Err = UnknownExecState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_uppercase().as_str() {
            "QUEUED" => ExecState::Queued,
            "STARTED" => ExecState::Started,
            "RUNNING" => ExecState::Running,
            "RETRYING" => ExecState::Retrying,
            "FINISHED" => ExecState::Finished,
            "FAILED" => ExecState::Failed,
            "CANCELLED" | "CANCELED" => ExecState::Cancelled,
            "TIMEOUT" => ExecState::Timeout,
            _ => return Err(UnknownExecState(s.to_string())),
        })
    }
}

// ── Environment ───────────────────────────────────────────────────────────────

/// One exec environment variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Env {
    pub key: String,
    pub value: Value,
}

impl Env {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Serialize for Env {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.value)?;
        map.end()
    }
}

/// Exec environment, serialized as a list of single-key objects:
/// `[{"KEY": value}, ...]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envs(Vec<Env>);

impl Envs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push(Env::new(key, value));
        self
    }

    pub fn push(&mut self, env: Env) {
        self.0.push(env);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The JSON string `NewExec` expects as its trailing argument.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl FromIterator<Env> for Envs {
    fn from_iter<I: IntoIterator<Item = Env>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for Envs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for env in &self.0 {
            seq.serialize_element(env)?;
        }
        seq.end()
    }
}

// ── Exec parameters ───────────────────────────────────────────────────────────

/// Arguments for `NewExec`. Unset fields are sent as `null` and the
/// dispatcher applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecParams {
    pub args: Vec<Value>,
    pub retries: Option<u32>,
    pub priority: Option<Priority>,
    /// Seconds between retries.
    pub backoff: Option<u64>,
    /// Unix timestamp to run at.
    pub exec_time: Option<i64>,
    /// Seconds between repeated runs.
    pub interval: Option<u64>,
    /// Seconds before the exec is abandoned.
    pub ttl: Option<u64>,
    pub envs: Envs,
}

impl ExecParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn backoff(mut self, secs: u64) -> Self {
        self.backoff = Some(secs);
        self
    }

    pub fn exec_time(mut self, unix: i64) -> Self {
        self.exec_time = Some(unix);
        self
    }

    pub fn interval(mut self, secs: u64) -> Self {
        self.interval = Some(secs);
        self
    }

    pub fn ttl(mut self, secs: u64) -> Self {
        self.ttl = Some(secs);
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.envs.push(Env::new(key, value));
        self
    }
}

// ── Job requests ──────────────────────────────────────────────────────────────

/// A single exec of one job, as taken by `Solo`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRequest {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Exec")]
    pub exec: Value,
}

impl JobRequest {
    pub fn new(job_id: impl Into<String>, exec: Value) -> Self {
        Self {
            id: job_id.into(),
            exec,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Several execs of one job, as taken by `Chord`, `Chain` and `Batch`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRequests {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Exec")]
    pub execs: Vec<Value>,
}

impl JobRequests {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            id: job_id.into(),
            execs: Vec::new(),
        }
    }

    pub fn exec(mut self, exec: Value) -> Self {
        self.execs.push(exec);
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
