use crate::domain::{ActiveResponse, AlertEvent};

/// Maximum record size of the execution protocol, terminator included.
pub const OS_MAXSTR: usize = 6144;

/// Longest payload a command message may carry.
pub const MAX_MESSAGE_LEN: usize = OS_MAXSTR - 1;

/// A fully formatted command, ready to be written to a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMessage {
    text: String,
    truncated: bool,
}

impl CommandMessage {
    fn bounded(mut text: String) -> Self {
        let truncated = text.len() > MAX_MESSAGE_LEN;
        if truncated {
            let mut end = MAX_MESSAGE_LEN;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
        }

        CommandMessage { text, truncated }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true if the message was cut to fit the record size.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

/// Message for the local executor: `name user ip`.
pub fn local_message(response: &ActiveResponse, event: &AlertEvent, ip: &str) -> CommandMessage {
    CommandMessage::bounded(format!("{} {} {}", response.name, event.user, ip))
}

/// Message for the forwarder: `location locality agent_id name user ip`.
pub fn forward_message(response: &ActiveResponse, event: &AlertEvent, ip: &str) -> CommandMessage {
    CommandMessage::bounded(format!(
        "{} {} {} {} {} {}",
        event.source_location,
        response.locality.wire_char(),
        response.agent_id,
        response.name,
        event.user,
        ip
    ))
}
