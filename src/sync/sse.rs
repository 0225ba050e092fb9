//! Incremental framing for the regeneration progress stream.
//!
//! The daemon streams newline-delimited `data: <json>` frames. Network reads
//! split those lines at arbitrary byte boundaries, so the parser buffers the
//! incomplete tail of every chunk and only decodes once a full line has
//! arrived. Buffering happens on bytes: a multi-byte character split across
//! two reads is reassembled before any UTF-8 decoding.

use tracing::warn;

use intrig_types::GenerateEvent;

const DATA_PREFIX: &str = "data: ";

/// State machine turning raw stream chunks into parsed events.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of the response body; returns every event whose line
    /// was completed by this chunk.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> Vec<GenerateEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = parse_line(line.trim_end_matches(['\n', '\r'])) {
                events.push(event);
            }
        }
        events
    }

    /// Convenience for text chunks.
    pub fn push(&mut self, chunk: &str) -> Vec<GenerateEvent> {
        self.push_bytes(chunk.as_bytes())
    }

    /// Bytes held back waiting for their line to complete.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn parse_line(line: &str) -> Option<GenerateEvent> {
    let payload = line.strip_prefix(DATA_PREFIX)?;
    match serde_json::from_str(payload) {
        Ok(event) => Some(event),
        Err(e) => {
            // Progress frames are informational. A garbled one is dropped
            // instead of failing the whole generation.
            warn!("dropping malformed stream frame {:?}: {}", line, e);
            None
        }
    }
}
