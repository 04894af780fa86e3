//! Config command handlers.

use anyhow::{Context, Result};
use courier_core::config;

pub fn path() -> Result<()> {
    println!("{}", config::paths::config_path().display());
    Ok(())
}

pub fn init() -> Result<()> {
    let config_path = config::paths::config_path();
    config::Config::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

pub fn set_gateway(url: &str) -> Result<()> {
    config::Config::save_base_url(url).context("save gateway base URL")?;
    println!("Gateway base URL set to {url}");
    Ok(())
}
