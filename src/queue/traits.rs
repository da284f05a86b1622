// src/queue/traits.rs
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a queue transport.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("peer did not accept the message within {0:?}")]
    Timeout(Duration),

    #[error("queue unavailable: {0}")]
    Unavailable(String),
}

/// Write-only channel to a peer process that executes or relays commands.
///
/// Implementations must be safe to share between concurrent dispatches.
pub trait ExecutionQueue: Send + Sync + Debug {
    /// Name used in logs and metrics.
    fn name(&self) -> &str;

    /// Deliver one complete message.
    fn send(&self, message: &str) -> Result<(), TransportError>;
}
