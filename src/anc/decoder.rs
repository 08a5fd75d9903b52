//! ST 2110-40 ancillary stream decoding

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::caption::{Caption, decode_cea608, decode_cea708};
use super::packet::{AncPacket, scan_payload};
use super::timecode::{Timecode, decode_timecode};
use super::types::AncPayloadKind;
use crate::Result;
use crate::decoder::EssenceDecoder;
use crate::types::{RtpPacket, StreamInfo, StreamType};

/// Everything extracted from one ancillary stream.
#[derive(Debug, Clone, Default)]
pub struct AncDecodeOutput {
    pub packets: Vec<AncPacket>,
    pub timecodes: Vec<Timecode>,
    pub captions: Vec<Caption>,
}

impl AncDecodeOutput {
    /// Packet counts keyed `"{type name} ({DID}/{SDID})"`.
    pub fn type_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for packet in &self.packets {
            let key = format!("{} ({})", packet.type_name(), packet.did_sdid());
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }

    /// First and last timecode seen.
    pub fn timecode_range(&self) -> Option<(&Timecode, &Timecode)> {
        Some((self.timecodes.first()?, self.timecodes.last()?))
    }

    /// All caption fragments in arrival order.
    pub fn caption_text(&self) -> String {
        self.captions.iter().map(|caption| caption.text.as_str()).collect()
    }

    pub fn summary(&self) -> AncSummary {
        AncSummary {
            packet_count: self.packets.len(),
            types: self.type_counts(),
            timecode_count: self.timecodes.len(),
            timecode_range: self
                .timecode_range()
                .map(|(first, last)| (first.to_string(), last.to_string())),
            caption_count: self.captions.len(),
            caption_text: self.caption_text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AncSummary {
    pub packet_count: usize,
    pub types: BTreeMap<String, usize>,
    pub timecode_count: usize,
    pub timecode_range: Option<(String, String)>,
    pub caption_count: usize,
    pub caption_text: String,
}

/// Decoder for ST 2110-40 ancillary data.
///
/// Never fails: payload bytes that do not frame as a packet are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct AncDecoder;

impl AncDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl EssenceDecoder for AncDecoder {
    type Output = AncDecodeOutput;

    fn stream_type(&self) -> StreamType {
        StreamType::Meta
    }

    fn decode(&self, packets: &[RtpPacket], info: &StreamInfo) -> Result<AncDecodeOutput> {
        let mut output = AncDecodeOutput::default();

        for rtp in packets {
            for anc in scan_payload(rtp.payload(), rtp.arrival_time()) {
                match AncPayloadKind::of(anc.did, anc.sdid) {
                    AncPayloadKind::Timecode => output.timecodes.extend(decode_timecode(&anc)),
                    AncPayloadKind::Cea608 => output.captions.extend(decode_cea608(&anc)),
                    AncPayloadKind::Cea708 => output.captions.extend(decode_cea708(&anc)),
                    AncPayloadKind::Other => {}
                }
                output.packets.push(anc);
            }
        }

        debug!(
            ssrc = info.ssrc,
            anc_packets = output.packets.len(),
            timecodes = output.timecodes.len(),
            captions = output.captions.len(),
            "Decoded ancillary stream"
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtp::analyze_stream;

    fn rtp(seq: u16, payload: Vec<u8>) -> RtpPacket {
        RtpPacket::new(seq, 0, 0x40, 98, true, payload, f64::from(seq))
    }

    fn anc(did: u8, sdid: u8, user_data: &[u8]) -> Vec<u8> {
        let mut bytes = vec![did, sdid, user_data.len() as u8];
        bytes.extend_from_slice(user_data);
        bytes.extend_from_slice(&[0x00, 0x00, 0x00]);
        bytes
    }

    #[test]
    fn extracts_timecodes_captions_and_counts() {
        let _ = tracing_subscriber::fmt::try_init();

        let mut first = anc(0x60, 0x60, &[0x01, 0x02, 0x03, 0x04]);
        first.extend(anc(0x61, 0x02, &[b'H', b'E']));
        let mut second = anc(0x60, 0x60, &[0x05, 0x02, 0x03, 0x04]);
        second.extend(anc(0x61, 0x01, b"LLO"));
        second.extend(anc(0x41, 0x05, &[0x08]));

        let packets = vec![rtp(0, first), rtp(1, second)];
        let info = analyze_stream(&packets, StreamType::Meta).unwrap();
        let output = AncDecoder::new().decode(&packets, &info).unwrap();

        assert_eq!(output.packets.len(), 5);
        assert_eq!(output.timecodes.len(), 2);
        assert_eq!(output.caption_text(), "HELLO");
        assert_eq!(output.timecodes[1].timestamp, 1.0);

        let (start, end) = output.timecode_range().unwrap();
        assert_eq!(start.to_string(), "04:03:02:01");
        assert_eq!(end.to_string(), "04:03:02:05");

        let counts = output.type_counts();
        assert_eq!(counts["SMPTE 12M Timecode (60/60)"], 2);
        assert_eq!(counts["CEA-608 Closed Captions (61/02)"], 1);
        assert_eq!(counts["CEA-708 Closed Captions (61/01)"], 1);
        assert_eq!(counts["AFD/Bar Data (41/05)"], 1);

        let summary = output.summary();
        assert_eq!(summary.packet_count, 5);
        assert_eq!(summary.timecode_range, Some(("04:03:02:01".to_string(), "04:03:02:05".to_string())));
    }

    #[test]
    fn garbage_payload_yields_nothing() {
        let packets = vec![rtp(0, vec![0x00, 0x00, 0x00]), rtp(1, vec![0xFF; 3])];
        let info = analyze_stream(&packets, StreamType::Meta).unwrap();
        let output = AncDecoder::new().decode(&packets, &info).unwrap();
        assert!(output.packets.is_empty());
        assert!(output.timecode_range().is_none());
        assert_eq!(output.caption_text(), "");
    }
}
