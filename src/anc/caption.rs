//! Closed caption text extraction
//!
//! CEA-608 byte pairs are stripped of parity and kept when both bytes are
//! printable; control codes are skipped. CEA-708 DTVCC is not parsed: every
//! printable ASCII byte of the packet becomes one character.

use serde::Serialize;

use super::packet::AncPacket;

const PARITY_MASK: u8 = 0x7F;
const FIRST_PRINTABLE: u8 = 0x20;
const LAST_PRINTABLE: u8 = 0x7E;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CaptionStandard {
    #[serde(rename = "CEA-608")]
    Cea608,
    #[serde(rename = "CEA-708")]
    Cea708,
}

/// A caption text fragment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Caption {
    /// Arrival time of the carrying RTP packet in seconds
    pub timestamp: f64,
    pub text: String,
    /// Caption channel (CC1 = 1)
    pub channel: u8,
    pub standard: CaptionStandard,
}

pub fn decode_cea608(packet: &AncPacket) -> Vec<Caption> {
    packet
        .user_data
        .chunks_exact(2)
        .filter_map(|pair| {
            let (first, second) = (pair[0] & PARITY_MASK, pair[1] & PARITY_MASK);
            if first >= FIRST_PRINTABLE && second >= FIRST_PRINTABLE {
                Some(Caption {
                    timestamp: packet.timestamp,
                    text: [char::from(first), char::from(second)].iter().collect(),
                    channel: 1,
                    standard: CaptionStandard::Cea608,
                })
            } else {
                // null padding and control codes
                None
            }
        })
        .collect()
}

pub fn decode_cea708(packet: &AncPacket) -> Vec<Caption> {
    packet
        .user_data
        .iter()
        .filter(|byte| (FIRST_PRINTABLE..=LAST_PRINTABLE).contains(*byte))
        .map(|&byte| Caption {
            timestamp: packet.timestamp,
            text: char::from(byte).to_string(),
            channel: 1,
            standard: CaptionStandard::Cea708,
        })
        .collect()
}
