//! SMPTE 291M ancillary packet framing
//!
//! Payloads are read as 8-bit packed words:
//!
//! ```text
//! +-----+------+----+-----------------+----------+
//! | DID | SDID | DC | UDW[0..DC]      | checksum |
//! +-----+------+----+-----------------+----------+
//! ```
//!
//! There is no ADF search. The scanner tries a packet at every offset and
//! resynchronizes one byte at a time after a failed attempt.

use bytes::Bytes;
use serde::{Serialize, Serializer};
use tracing::trace;

use super::types::anc_type_name;

/// Smallest buffer a packet is parsed from
const MIN_PACKET_LEN: usize = 6;

/// Scanning stops with fewer bytes left
const MIN_SCAN_REMAINING: usize = 4;

/// Fixed bytes around the user data: DID, SDID, DC, checksum and two bytes
/// the framing skips over
const PACKET_OVERHEAD: usize = 6;

/// One decoded ancillary packet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AncPacket {
    pub did: u8,
    pub sdid: u8,
    pub data_count: u8,
    #[serde(serialize_with = "serialize_bytes")]
    pub user_data: Bytes,
    pub checksum: u8,
    /// Arrival time of the carrying RTP packet in seconds
    pub timestamp: f64,
    pub line_number: Option<u16>,
    pub horizontal_offset: Option<u16>,
}

fn serialize_bytes<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_bytes(bytes)
}

impl AncPacket {
    /// `"DD/SS"` in upper-case hex
    pub fn did_sdid(&self) -> String {
        format!("{:02X}/{:02X}", self.did, self.sdid)
    }

    /// Friendly name, `"Unknown"` for unassigned pairs
    pub fn type_name(&self) -> &'static str {
        anc_type_name(self.did, self.sdid).unwrap_or("Unknown")
    }
}

/// Parse one packet at the start of `data`.
///
/// Returns `None` for fewer than six bytes, a zero data count, or a buffer
/// shorter than `4 + data_count`.
pub fn parse_anc_packet(data: &Bytes, timestamp: f64) -> Option<AncPacket> {
    if data.len() < MIN_PACKET_LEN {
        return None;
    }

    let did = data[0];
    let sdid = data[1];
    let data_count = data[2];
    let count = usize::from(data_count);
    if count == 0 || data.len() < 4 + count {
        return None;
    }

    Some(AncPacket {
        did,
        sdid,
        data_count,
        user_data: data.slice(3..3 + count),
        checksum: data.get(3 + count).copied().unwrap_or(0),
        timestamp,
        line_number: None,
        horizontal_offset: None,
    })
}

/// Extract every packet from one RTP payload.
pub fn scan_payload(payload: &Bytes, timestamp: f64) -> Vec<AncPacket> {
    let mut packets = Vec::new();
    let mut offset = 0;

    while offset + MIN_SCAN_REMAINING <= payload.len() {
        match parse_anc_packet(&payload.slice(offset..), timestamp) {
            Some(packet) => {
                trace!(offset, did = packet.did, sdid = packet.sdid, data_count = packet.data_count, "ANC packet");
                offset += PACKET_OVERHEAD + usize::from(packet.data_count);
                packets.push(packet);
            }
            None => offset += 1,
        }
    }

    packets
}
