//! Local config file commands. These never contact a dispatcher.

use anyhow::{Context, Result};
use gizo_core::GizoConfig;

use super::connect::GlobalOpts;

pub fn cmd_config_init() -> Result<()> {
    let path = GizoConfig::file_path();
    if GizoConfig::write_default_if_missing(&path).context("failed to write gizo config")? {
        println!("✓ Wrote default config to {}", path.display());
    } else {
        println!("Config already exists at {}", path.display());
    }
    Ok(())
}

pub fn cmd_config_show(opts: &GlobalOpts) -> Result<()> {
    let config = opts.resolve()?;

    println!("═══════════════════════════════════════");
    println!("  Gizo Config ({})", GizoConfig::file_path().display());
    println!("═══════════════════════════════════════");
    println!("  Dispatcher     : {}", config.dispatcher.as_deref().unwrap_or("(discover)"));
    println!("  State file     : {}", config.state_path().display());
    println!("  Network        : {}", if config.test_net { "test" } else { "main" });
    println!("  Registry       : {}", config.registry_base());
    println!("  Health timeout : {} ms", config.health_timeout_ms);
    println!("  Rotate keys    : {}", config.rotate_keys_on_failover);
    Ok(())
}
