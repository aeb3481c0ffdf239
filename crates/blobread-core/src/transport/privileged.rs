//! Indirection for running network operations under elevated permissions.
//!
//! Every channel operation is routed through a [`PrivilegedExecutor`]. The
//! executor must hand back the operation's result unchanged so it never
//! influences retry or classification decisions.

use super::TransportError;

pub trait PrivilegedExecutor {
    fn run<T, F>(&self, op: F) -> Result<T, TransportError>
    where
        F: FnOnce() -> Result<T, TransportError>;
}

/// Runs operations directly in the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl PrivilegedExecutor for PassThrough {
    fn run<T, F>(&self, op: F) -> Result<T, TransportError>
    where
        F: FnOnce() -> Result<T, TransportError>,
    {
        op()
    }
}
