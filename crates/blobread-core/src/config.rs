use crate::transport::http::HttpTimeouts;
use crate::transport::DEFAULT_FETCH_CHUNK_SIZE;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Transport parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Attempts the transport makes per request. Read sessions allow one more
    /// reopen-and-read attempt than this.
    pub max_attempts: u32,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Abort a transfer slower than this many bytes/s ...
    pub low_speed_limit_bytes: u32,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
        }
    }
}

impl TransportConfig {
    pub fn timeouts(&self) -> HttpTimeouts {
        HttpTimeouts {
            connect: Duration::from_secs(self.connect_timeout_secs),
            low_speed_limit: self.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(self.low_speed_time_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/blobread/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobReadConfig {
    /// Default HTTP endpoint for blob reads (e.g. "http://127.0.0.1:9000/").
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Default local store root, used when no endpoint is given.
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Remote fetch size per request in bytes.
    #[serde(default = "default_fetch_chunk_size")]
    pub fetch_chunk_size: usize,
    #[serde(default)]
    pub transport: TransportConfig,
}

fn default_fetch_chunk_size() -> usize {
    DEFAULT_FETCH_CHUNK_SIZE
}

impl Default for BlobReadConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            root: None,
            fetch_chunk_size: DEFAULT_FETCH_CHUNK_SIZE,
            transport: TransportConfig::default(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("blobread")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BlobReadConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = BlobReadConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: BlobReadConfig = toml::from_str(&data)?;
    Ok(cfg)
}
