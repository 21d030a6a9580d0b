//! Headless shell: owns the state, runs effects through the engine and
//! talks to the operator over stdin/stdout.
mod app;
mod commands;
pub(crate) mod config;
mod effects;
mod logging;
mod persistence;
mod render;

use std::path::Path;

use anyhow::Context;

pub fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = config::PanelConfig::load(config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?
        .with_env_overrides();
    logging::initialize(config.log_destination, config.level_filter()?);
    app::run_app(config)
}
