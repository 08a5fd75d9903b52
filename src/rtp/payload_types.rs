//! Payload type table and stream classification
//!
//! The built-in table covers the ST 2110 dynamic payload types conventionally
//! used on broadcast plants plus the RFC 3551 static audio/video assignments.
//! Classification consults caller overrides first, see [`StreamTypeOverrides`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::types::StreamType;

/// Known payload type: number, friendly name, essence kind.
struct PayloadTypeEntry {
    payload_type: u8,
    name: &'static str,
    kind: StreamType,
}

const fn entry(payload_type: u8, name: &'static str, kind: StreamType) -> PayloadTypeEntry {
    PayloadTypeEntry { payload_type, name, kind }
}

static PAYLOAD_TYPES: &[PayloadTypeEntry] = &[
    // RFC 3551 static audio
    entry(0, "PCMU", StreamType::Audio),
    entry(3, "GSM", StreamType::Audio),
    entry(4, "G723", StreamType::Audio),
    entry(5, "DVI4 8kHz", StreamType::Audio),
    entry(6, "DVI4 16kHz", StreamType::Audio),
    entry(7, "LPC", StreamType::Audio),
    entry(8, "PCMA", StreamType::Audio),
    entry(9, "G722", StreamType::Audio),
    entry(10, "L16 Stereo", StreamType::Audio),
    entry(11, "L16 Mono", StreamType::Audio),
    entry(12, "QCELP", StreamType::Audio),
    entry(13, "CN", StreamType::Audio),
    entry(14, "MPA", StreamType::Audio),
    entry(15, "G728", StreamType::Audio),
    entry(16, "DVI4 11kHz", StreamType::Audio),
    entry(17, "DVI4 22kHz", StreamType::Audio),
    entry(18, "G729", StreamType::Audio),
    // RFC 3551 static video
    entry(25, "CelB", StreamType::Video),
    entry(26, "JPEG", StreamType::Video),
    entry(28, "nv", StreamType::Video),
    entry(31, "H261", StreamType::Video),
    entry(32, "MPV", StreamType::Video),
    entry(33, "MP2T", StreamType::Video),
    entry(34, "H263", StreamType::Video),
    // ST 2110 conventional dynamic assignments
    entry(96, "ST2110-20 Video", StreamType::Video),
    entry(97, "ST2110-30 Audio", StreamType::Audio),
    entry(98, "ST2110-40 Ancillary", StreamType::Meta),
    entry(100, "ST2110-31 Audio", StreamType::Audio),
];

fn lookup(payload_type: u8) -> Option<&'static PayloadTypeEntry> {
    PAYLOAD_TYPES.iter().find(|e| e.payload_type == payload_type)
}

/// Friendly name for a payload type, or `"Unknown (PT n)"`.
pub fn payload_type_name(payload_type: u8) -> String {
    match lookup(payload_type) {
        Some(entry) => entry.name.to_string(),
        None => format!("Unknown (PT {})", payload_type),
    }
}

/// Essence kind from the built-in payload type table alone.
pub fn default_stream_type(payload_type: u8) -> StreamType {
    lookup(payload_type).map_or(StreamType::Unknown, |e| e.kind)
}

/// Caller-supplied classification overrides.
///
/// Priority: SSRC override, then payload type override, then the built-in
/// table, then [`StreamType::Unknown`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamTypeOverrides {
    #[serde(default)]
    pub by_ssrc: HashMap<u32, StreamType>,
    #[serde(default)]
    pub by_payload_type: HashMap<u8, StreamType>,
}

impl StreamTypeOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the type of one stream.
    pub fn with_ssrc(mut self, ssrc: u32, kind: StreamType) -> Self {
        self.by_ssrc.insert(ssrc, kind);
        self
    }

    /// Force the type of every stream using a payload type.
    pub fn with_payload_type(mut self, payload_type: u8, kind: StreamType) -> Self {
        self.by_payload_type.insert(payload_type & 0x7F, kind);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.by_ssrc.is_empty() && self.by_payload_type.is_empty()
    }

    /// Classify a stream.
    pub fn classify(&self, ssrc: u32, payload_type: u8) -> StreamType {
        if let Some(kind) = self.by_ssrc.get(&ssrc) {
            trace!(ssrc, %kind, "Stream type from SSRC override");
            return *kind;
        }
        if let Some(kind) = self.by_payload_type.get(&payload_type) {
            trace!(ssrc, payload_type, %kind, "Stream type from payload type override");
            return *kind;
        }
        default_stream_type(payload_type)
    }
}
