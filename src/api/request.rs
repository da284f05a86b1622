use serde::{Deserialize, Serialize};

use crate::domain::AlertEvent;

/// Request to run a configured active response for an alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Name of a response defined in the current policy
    pub response: String,

    /// The alert that triggered it
    pub event: AlertEvent,
}
