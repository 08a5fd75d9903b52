//! Per-stream statistics

use serde::Serialize;

use super::{StreamType, sequence_span};

/// Aggregate statistics for one SSRC.
///
/// Always computed from the complete, sequence-sorted packet list of the
/// stream; see [`crate::rtp::analyze_stream`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamInfo {
    pub ssrc: u32,
    /// Payload type of the first packet
    pub payload_type: u8,
    pub stream_type: StreamType,
    pub packet_count: usize,
    pub first_seq: u16,
    pub last_seq: u16,
    pub first_timestamp: u32,
    pub last_timestamp: u32,
    pub packets_lost: u64,
    pub packets_out_of_order: u64,
    /// Arrival time of the first packet in seconds
    pub start_time: f64,
    /// Arrival time of the last packet in seconds
    pub end_time: f64,
    /// At least one packet carried an external (PTP) timestamp
    pub has_ptp: bool,
}

impl StreamInfo {
    /// Stream duration in seconds, by arrival time.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Packet loss as a percentage of the sequence range covered.
    pub fn packet_loss_rate(&self) -> f64 {
        let total_expected = sequence_span(self.first_seq, self.last_seq);
        if total_expected == 0 {
            return 0.0;
        }
        (self.packets_lost as f64 / total_expected as f64) * 100.0
    }
}
