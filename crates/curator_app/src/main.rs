mod shell;

use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(shell::config::DEFAULT_CONFIG_PATH));
    shell::run(&config_path)
}
