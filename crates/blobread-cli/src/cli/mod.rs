//! CLI for blobread.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use blobread_core::config;
use blobread_core::BlobLocator;
use std::path::PathBuf;

use commands::{run_config, run_read, ReadArgs};

/// Top-level CLI for blobread.
#[derive(Debug, Parser)]
#[command(name = "blobread")]
#[command(about = "blobread: resumable range reads from blob stores", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Read a byte range of a blob to a file or stdout.
    Read {
        /// Blob as <container>/<name>.
        blob: BlobLocator,

        /// First byte to read.
        #[arg(long, default_value = "0", value_name = "OFFSET")]
        start: u64,

        /// Bytes to read; omit (or pass a negative value) to read to the end.
        #[arg(long, allow_hyphen_values = true, value_name = "BYTES")]
        length: Option<i64>,

        /// Write to this file instead of stdout.
        #[arg(long, short)]
        out: Option<PathBuf>,

        /// Read from a local store rooted at DIR.
        #[arg(long, value_name = "DIR", conflicts_with = "endpoint")]
        root: Option<PathBuf>,

        /// Read from an HTTP blob endpoint.
        #[arg(long, value_name = "URL")]
        endpoint: Option<String>,

        /// Print the SHA-256 of the bytes read.
        #[arg(long)]
        sha256: bool,
    },

    /// Show the config file location and effective values.
    Config,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Read {
                blob,
                start,
                length,
                out,
                root,
                endpoint,
                sha256,
            } => {
                let args = ReadArgs {
                    blob,
                    start,
                    length,
                    out,
                    root,
                    endpoint,
                    sha256,
                };
                run_read(&cfg, args)?;
            }
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
