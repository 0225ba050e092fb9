use serde::{Deserialize, Serialize};

/// Progress events streamed by the daemon's generate endpoint.
///
/// The stream is newline-delimited `data: <json>` frames. Two shapes matter:
/// `status` frames report progress and `done` terminates the stream. Anything
/// else deserializes to [`GenerateEvent::Unknown`] so that newer daemons can
/// add event types without breaking older clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GenerateEvent {
    /// Informational progress step.
    Status {
        step: String,
        #[serde(rename = "sourceId", default, skip_serializing_if = "Option::is_none")]
        source_id: Option<String>,
    },
    /// Terminal success marker.
    Done,
    /// Any event type this client does not recognize. Ignored by consumers.
    #[serde(other)]
    Unknown,
}

impl GenerateEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerateEvent::Done)
    }
}
