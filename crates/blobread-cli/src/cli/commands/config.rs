//! `blobread config` – show config path and values.

use anyhow::Result;
use blobread_core::config::{self, BlobReadConfig};

pub fn run_config(cfg: &BlobReadConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
