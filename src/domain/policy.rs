use serde::{Deserialize, Serialize};

use super::response::ActiveResponse;

/// Active-response configuration shared by every dispatch.
///
/// Loaded once and swapped wholesale on reload; never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePolicy {
    /// Policy version identifier
    #[serde(rename = "policy_version")]
    pub version: String,

    /// Source addresses exempt from active response, checked in order
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Allow responses that execute on this node
    #[serde(default = "default_enabled")]
    pub local_ar: bool,

    /// Allow responses that are forwarded to agents
    #[serde(default = "default_enabled")]
    pub remote_ar: bool,

    /// Configured responses
    #[serde(default)]
    pub responses: Vec<ActiveResponse>,
}

fn default_enabled() -> bool {
    true
}

impl ResponsePolicy {
    /// Create an empty policy with both response channels disabled.
    pub fn empty() -> Self {
        ResponsePolicy {
            version: "0.0.0".to_string(),
            ignore: Vec::new(),
            local_ar: false,
            remote_ar: false,
            responses: Vec::new(),
        }
    }

    /// First ignore-list entry equal to `address`.
    #[inline]
    pub fn ignored_entry(&self, address: &str) -> Option<&str> {
        self.ignore
            .iter()
            .map(String::as_str)
            .find(|entry| *entry == address)
    }

    /// Look up a configured response by name.
    pub fn find_response(&self, name: &str) -> Option<&ActiveResponse> {
        self.responses.iter().find(|r| r.name == name)
    }
}

impl Default for ResponsePolicy {
    fn default() -> Self {
        ResponsePolicy::empty()
    }
}
