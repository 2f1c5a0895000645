//! Dispatcher addressing.
//!
//! A dispatcher is advertised as `scheme://{public_key}@{host}:{port}`. The
//! userinfo slot of the URL carries the dispatcher's public key, so all three
//! components are mandatory. Two HTTP endpoints are derived from host and
//! port:
//!
//!   http://{host}:{port}/rpc     remote procedure calls
//!   http://{host}:{port}/status  liveness probe

use std::fmt;

use thiserror::Error;
use url::Url;

const RPC_PATH: &str = "/rpc";
const STATUS_PATH: &str = "/status";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("malformed dispatcher url {url:?}: {reason}")]
    Malformed { url: String, reason: String },
    #[error("dispatcher url {url:?} is missing its {component}")]
    MissingComponent { url: String, component: &'static str },
}

/// A parsed, validated dispatcher address. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    url: String,
    identity: String,
    host: String,
    port: u16,
}

impl EndpointDescriptor {
    pub fn parse(raw: &str) -> Result<Self, EndpointError> {
        let parsed = Url::parse(raw).map_err(|e| EndpointError::Malformed {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        let missing = |component| EndpointError::MissingComponent {
            url: raw.to_string(),
            component,
        };

        let identity = parsed.username();
        if identity.is_empty() {
            return Err(missing("identity"));
        }

        let host = parsed
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| missing("host"))?;

        // `Url::port` hides a port equal to the scheme default, so
        // `http://k@h:80` needs the raw authority to tell it was written out.
        let port = match parsed.port() {
            Some(p) => p,
            None if has_explicit_port(raw) => parsed
                .port_or_known_default()
                .ok_or_else(|| missing("port"))?,
            None => return Err(missing("port")),
        };

        Ok(Self {
            url: raw.to_string(),
            identity: identity.to_string(),
            host: host.to_string(),
            port,
        })
    }

    /// The URL this descriptor was parsed from, as persisted in state files.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Dispatcher public key.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn rpc_endpoint(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, RPC_PATH)
    }

    pub fn health_endpoint(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, STATUS_PATH)
    }
}

impl fmt::Display for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl std::str::FromStr for EndpointDescriptor {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn has_explicit_port(raw: &str) -> bool {
    let Some((_, rest)) = raw.split_once("://") else {
        return false;
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host_port = authority.rsplit('@').next().unwrap_or("");
    // Skip past a bracketed IPv6 literal before looking for the port colon.
    let tail = match host_port.rfind(']') {
        Some(i) => &host_port[i + 1..],
        None => host_port,
    };
    tail.rsplit_once(':')
        .map(|(_, port)| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}
