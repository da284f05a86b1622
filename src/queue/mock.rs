// src/queue/mock.rs
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::traits::{ExecutionQueue, TransportError};

/// In-memory queue that records every message it accepts.
#[derive(Debug, Default)]
pub struct MockQueue {
    name: String,
    sent: Mutex<Vec<String>>,
    failing: AtomicBool,
}

impl MockQueue {
    pub fn new(name: impl Into<String>) -> Self {
        MockQueue {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Make subsequent sends fail (for testing).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Get sent messages (for assertions).
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    /// Number of messages accepted so far.
    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }
}

impl ExecutionQueue for MockQueue {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, message: &str) -> Result<(), TransportError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(TransportError::Unavailable(self.name.clone()));
        }

        self.sent.lock().push(message.to_string());
        Ok(())
    }
}
