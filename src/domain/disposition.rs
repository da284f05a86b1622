use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a response was not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    /// Source address is on the ignore list
    Ignored,
    /// Response would run locally but local responses are disabled
    LocalDisabled,
    /// Response would be forwarded but remote responses are disabled
    RemoteDisabled,
}

impl SuppressReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuppressReason::Ignored => "ignored",
            SuppressReason::LocalDisabled => "local_disabled",
            SuppressReason::RemoteDisabled => "remote_disabled",
        }
    }
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a single dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Nothing was sent
    Suppressed(SuppressReason),
    /// Message written to the local execution queue
    SentLocal,
    /// Message written to the forwarding queue
    SentForward,
}

impl Disposition {
    /// Suppression reason, if any.
    #[inline]
    pub fn reason(&self) -> Option<SuppressReason> {
        match self {
            Disposition::Suppressed(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Suppressed(_) => "SUPPRESSED",
            Disposition::SentLocal => "SENT_LOCAL",
            Disposition::SentForward => "SENT_FORWARD",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disposition::Suppressed(reason) => write!(f, "SUPPRESSED({})", reason),
            other => write!(f, "{}", other.as_str()),
        }
    }
}
