//! Config resolution and dispatcher bootstrap shared by every command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use gizo_client::Gizo;
use gizo_core::GizoConfig;

/// Global options given on the command line. They take precedence over the
/// config file and GIZO_* variables.
#[derive(Debug, Default)]
pub struct GlobalOpts {
    pub dispatcher: Option<String>,
    pub state_file: Option<PathBuf>,
    pub test_net: bool,
}

impl GlobalOpts {
    pub fn resolve(&self) -> Result<GizoConfig> {
        let mut config = GizoConfig::load().context("failed to load gizo config")?;
        if let Some(url) = &self.dispatcher {
            config.dispatcher = Some(url.clone());
        }
        if let Some(path) = &self.state_file {
            config.state_file = Some(path.clone());
        }
        if self.test_net {
            config.test_net = true;
        }
        Ok(config)
    }
}

pub async fn connect(opts: &GlobalOpts) -> Result<Gizo> {
    let config = opts.resolve()?;
    let state = config.state_path();
    tracing::debug!(
        dispatcher = ?config.dispatcher,
        state = %state.display(),
        registry = %config.registry_base(),
        test_net = config.test_net,
        "resolved config"
    );
    Gizo::connect(config)
        .await
        .with_context(|| format!("failed to connect to a dispatcher (state file {})", state.display()))
}
