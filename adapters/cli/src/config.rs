//! Configuration file loading.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use light_bike_simulation::Config;

/// Loads the simulation configuration, falling back to defaults without a
/// path. Keys missing from the file keep their default values.
pub(crate) fn load(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse(&source).with_context(|| format!("failed to parse config file {}", path.display()))
}

fn parse(source: &str) -> Result<Config> {
    let config: Config = toml::from_str(source)?;
    Ok(config)
}
