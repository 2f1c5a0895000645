//! Connection bootstrap.
//!
//! Produces exactly one live dispatcher connection plus the caller's key
//! pair, or fails. Paths, in priority order:
//!
//!   1. Reuse     a state file exists: probe its dispatcher and reuse the
//!                 persisted key pair. A dispatcher that fails the probe (or
//!                 whose URL no longer parses) is dropped and bootstrap falls
//!                 through to discovery.
//!   2. Explicit  no state file, a dispatcher URL is configured: probe,
//!                 connect, request a key pair, persist. Failure is terminal.
//!   3. Discover  ask the registry and adopt the first candidate that parses
//!                 and answers. Skipped candidates are logged, never returned.
//!
//! The reuse → discovery demotion is the only fallback; there are no retries.

use gizo_core::{ConnectionState, EndpointDescriptor, GizoConfig, KeyPair, StateStore};

use crate::error::{Error, Result};
use crate::registry::RegistryClient;
use crate::rpc::{self, RpcConnection, Transport};

/// Output of a successful bootstrap.
#[derive(Debug)]
pub struct Session {
    pub endpoint: EndpointDescriptor,
    pub connection: RpcConnection,
    pub keys: KeyPair,
}

pub struct Bootstrapper {
    config: GizoConfig,
    transport: Transport,
    store: StateStore,
}

impl Bootstrapper {
    pub fn new(config: GizoConfig) -> Result<Self> {
        let transport = Transport::new(&config)?;
        let store = StateStore::new(config.state_path());
        Ok(Self {
            config,
            transport,
            store,
        })
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub async fn bootstrap(&self) -> Result<Session> {
        if let Some(state) = self.store.load()? {
            return self.resume(state).await;
        }

        match self.config.dispatcher.as_deref() {
            Some(url) => self.connect_explicit(url).await,
            None => {
                let (endpoint, connection) = self.discover().await?;
                self.adopt(endpoint, connection, None).await
            }
        }
    }

    async fn resume(&self, state: ConnectionState) -> Result<Session> {
        match self.reconnect(&state.dispatcher).await {
            Ok((endpoint, connection)) => match state.keys {
                Some(keys) => {
                    tracing::info!(dispatcher = %endpoint, "reusing persisted dispatcher");
                    Ok(Session {
                        endpoint,
                        connection,
                        keys,
                    })
                }
                None => {
                    tracing::info!(dispatcher = %endpoint, "persisted state has no key pair, requesting one");
                    self.adopt(endpoint, connection, None).await
                }
            },
            Err(e) => {
                tracing::warn!(
                    dispatcher = %state.dispatcher,
                    error = %e,
                    "persisted dispatcher unusable, falling back to discovery"
                );
                let (endpoint, connection) = self.discover().await?;
                let keys = if self.config.rotate_keys_on_failover {
                    None
                } else {
                    state.keys
                };
                self.adopt(endpoint, connection, keys).await
            }
        }
    }

    async fn reconnect(&self, url: &str) -> Result<(EndpointDescriptor, RpcConnection)> {
        let endpoint = EndpointDescriptor::parse(url)?;
        let connection = self.transport.connect(&endpoint).await?;
        Ok((endpoint, connection))
    }

    async fn connect_explicit(&self, url: &str) -> Result<Session> {
        let endpoint = EndpointDescriptor::parse(url)?;
        let unreachable = |e: Error| Error::DispatcherUnreachable {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let connection = self.transport.connect(&endpoint).await.map_err(unreachable)?;
        let keys = issue_key_pair(&connection).await.map_err(unreachable)?;
        tracing::info!(dispatcher = %endpoint, "connected to configured dispatcher");

        self.persist(&endpoint, &keys)?;
        Ok(Session {
            endpoint,
            connection,
            keys,
        })
    }

    /// Walk the registry's candidates and return the first that connects.
    async fn discover(&self) -> Result<(EndpointDescriptor, RpcConnection)> {
        let registry = RegistryClient::from_config(&self.config, self.transport.http().clone());
        let candidates = registry.dispatchers().await?;

        for candidate in &candidates {
            let endpoint = match EndpointDescriptor::parse(candidate) {
                Ok(endpoint) => endpoint,
                Err(e) => {
                    tracing::debug!(url = %candidate, error = %e, "skipping malformed dispatcher");
                    continue;
                }
            };
            match self.transport.connect(&endpoint).await {
                Ok(connection) => {
                    tracing::info!(dispatcher = %endpoint, "discovered dispatcher");
                    return Ok((endpoint, connection));
                }
                Err(e) => {
                    tracing::debug!(url = %candidate, error = %e, "skipping unreachable dispatcher");
                }
            }
        }

        Err(Error::NoDispatcherAvailable {
            candidates: candidates.len(),
        })
    }

    /// Finish a bootstrap on a newly chosen dispatcher: obtain keys if none
    /// are carried over, then persist.
    async fn adopt(
        &self,
        endpoint: EndpointDescriptor,
        connection: RpcConnection,
        keys: Option<KeyPair>,
    ) -> Result<Session> {
        let keys = match keys {
            Some(keys) => keys,
            None => issue_key_pair(&connection).await?,
        };
        self.persist(&endpoint, &keys)?;
        Ok(Session {
            endpoint,
            connection,
            keys,
        })
    }

    fn persist(&self, endpoint: &EndpointDescriptor, keys: &KeyPair) -> Result<()> {
        self.store.save(&ConnectionState {
            dispatcher: endpoint.url().to_string(),
            keys: Some(keys.clone()),
        })?;
        Ok(())
    }
}

/// Ask the dispatcher to issue a fresh key pair.
pub(crate) async fn issue_key_pair(connection: &RpcConnection) -> Result<KeyPair> {
    let value = connection.call("KeyPair", Vec::new()).await?;
    let keys: KeyPair = rpc::decode_json("KeyPair", value)?;
    tracing::info!(public_key = %keys.public, "issued key pair");
    Ok(keys)
}
