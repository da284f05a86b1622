use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::field::{check_text, check_token, FieldError};

/// Unique event identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    pub fn new() -> Self {
        EventId(Uuid::new_v4().to_string())
    }
}

impl Default for EventId {
    fn default() -> Self {
        EventId::new()
    }
}

/// Separator that relaying agents insert into an event location.
pub const RELAY_MARKER: char = '>';

/// Alert produced by the rule-matching pipeline.
///
/// Only the fields that drive an active response are carried here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvent {
    /// Unique event identifier
    #[serde(default)]
    pub event_id: EventId,

    /// When the alert was observed
    #[serde(default = "Utc::now")]
    pub observed_at: DateTime<Utc>,

    /// Offending address, optionally followed by `:port`
    #[serde(rename = "srcip", default)]
    pub source_address: String,

    /// Node that generated the event (`(agent) ip->file` when relayed)
    #[serde(rename = "location")]
    pub source_location: String,

    /// User associated with the alert, may be empty
    #[serde(default)]
    pub user: String,
}

impl AlertEvent {
    /// Create an alert observed now.
    pub fn new(
        source_address: impl Into<String>,
        source_location: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        AlertEvent {
            event_id: EventId::new(),
            observed_at: Utc::now(),
            source_address: source_address.into(),
            source_location: source_location.into(),
            user: user.into(),
        }
    }

    /// Address portion of `source_address`.
    ///
    /// Everything after the last colon, or the whole string when there is none.
    #[inline]
    pub fn source_ip(&self) -> &str {
        normalize_address(&self.source_address)
    }

    /// Reject values that would add or split fields of a command message.
    ///
    /// `srcip` and `user` are single tokens; `location` may hold spaces.
    pub fn validate(&self) -> Result<(), FieldError> {
        check_token("srcip", &self.source_address, true)?;
        check_token("user", &self.user, true)?;
        check_text("location", &self.source_location)
    }

    /// Returns true if the event arrived through an intermediate agent.
    #[inline]
    pub fn is_relayed(&self) -> bool {
        self.source_location.contains(RELAY_MARKER)
    }
}

/// Strip everything up to and including the last colon.
#[inline]
pub fn normalize_address(address: &str) -> &str {
    match address.rfind(':') {
        Some(idx) => &address[idx + 1..],
        None => address,
    }
}
