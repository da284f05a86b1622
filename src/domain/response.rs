use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an active response is meant to execute.
///
/// The wire characters are the location codes understood by the
/// forwarding daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locality {
    /// Run on the server only
    ServerOnly,
    /// Run on the agent that generated the event
    RemoteAgent,
    /// Run on one configured agent
    SpecificAgent,
    /// Run on every agent
    AllAgents,
}

impl Locality {
    /// Single-character code used in forwarded messages.
    #[inline]
    pub fn wire_char(&self) -> char {
        match self {
            Locality::AllAgents => 'A',
            Locality::RemoteAgent => 'R',
            Locality::SpecificAgent => 'S',
            Locality::ServerOnly => 'N',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Locality::ServerOnly => "server_only",
            Locality::RemoteAgent => "remote_agent",
            Locality::SpecificAgent => "specific_agent",
            Locality::AllAgents => "all_agents",
        }
    }
}

impl fmt::Display for Locality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A configured active response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveResponse {
    /// Command identifier understood by the executor
    pub name: String,

    /// Where the command runs
    #[serde(rename = "location")]
    pub locality: Locality,

    /// Target agent when forwarding
    #[serde(default)]
    pub agent_id: String,
}

impl ActiveResponse {
    pub fn new(name: impl Into<String>, locality: Locality, agent_id: impl Into<String>) -> Self {
        ActiveResponse {
            name: name.into(),
            locality,
            agent_id: agent_id.into(),
        }
    }
}
