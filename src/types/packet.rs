//! RTP packet record shared by the demultiplexer and every essence decoder

use bytes::Bytes;
use serde::Serialize;

/// One received RTP packet.
///
/// This is the fundamental data unit that flows through the system. Streams,
/// frames, samples and ANC packets are all derived from ordered lists of it.
/// The payload shares the datagram's buffer, so cloning a packet never copies
/// media bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RtpPacket {
    sequence: u16,
    timestamp: u32,
    ssrc: u32,
    payload_type: u8,
    marker: bool,
    #[serde(skip)]
    payload: Bytes,
    arrival_time: f64,
    ptp_timestamp: Option<u64>,
}

impl RtpPacket {
    /// Create a new packet record.
    ///
    /// The payload type is masked to its 7 wire bits.
    pub fn new(
        sequence: u16,
        timestamp: u32,
        ssrc: u32,
        payload_type: u8,
        marker: bool,
        payload: impl Into<Bytes>,
        arrival_time: f64,
    ) -> Self {
        Self {
            sequence,
            timestamp,
            ssrc,
            payload_type: payload_type & 0x7F,
            marker,
            payload: payload.into(),
            arrival_time,
            ptp_timestamp: None,
        }
    }

    /// Attach an external high-precision (PTP) timestamp in nanoseconds.
    pub fn with_ptp_timestamp(mut self, ptp_timestamp: Option<u64>) -> Self {
        self.ptp_timestamp = ptp_timestamp;
        self
    }

    /// RTP sequence number
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// RTP timestamp in media-clock ticks
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Synchronization source identifier
    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn payload_type(&self) -> u8 {
        self.payload_type
    }

    /// Frame (video) or field boundary flag
    pub fn marker(&self) -> bool {
        self.marker
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Capture arrival time in seconds
    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    pub fn ptp_timestamp(&self) -> Option<u64> {
        self.ptp_timestamp
    }
}

/// Concatenate the payloads of an ordered packet list.
pub fn concat_payloads(packets: &[RtpPacket]) -> Vec<u8> {
    let total: usize = packets.iter().map(|p| p.payload.len()).sum();
    let mut data = Vec::with_capacity(total);
    for packet in packets {
        data.extend_from_slice(&packet.payload);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_type_is_masked_to_seven_bits() {
        let packet = RtpPacket::new(1, 0, 0xAB, 0xE0, false, vec![], 0.0);
        assert_eq!(packet.payload_type(), 0x60);
    }

    #[test]
    fn clones_share_the_payload_buffer() {
        let packet = RtpPacket::new(1, 0, 1, 96, true, vec![1u8, 2, 3], 0.5);
        let clone = packet.clone();
        assert_eq!(packet.payload().as_ptr(), clone.payload().as_ptr());
    }

    #[test]
    fn concat_preserves_packet_order() {
        let packets = vec![
            RtpPacket::new(1, 0, 1, 97, false, vec![1u8, 2], 0.0),
            RtpPacket::new(2, 0, 1, 97, false, vec![3u8], 0.0),
            RtpPacket::new(3, 0, 1, 97, false, Vec::<u8>::new(), 0.0),
            RtpPacket::new(4, 0, 1, 97, false, vec![4u8, 5], 0.0),
        ];
        assert_eq!(concat_payloads(&packets), vec![1, 2, 3, 4, 5]);
    }
}
