//! CLI command handlers.

mod config;
mod read;

pub use config::run_config;
pub use read::{run_read, ReadArgs};
