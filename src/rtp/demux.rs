//! Stream demultiplexing and per-stream statistics
//!
//! The demultiplexer drains a [`PacketSource`], parses raw datagrams, groups
//! packets by SSRC and computes a [`StreamInfo`] for every stream. Within a
//! stream packets are stably sorted by their numeric sequence number before
//! any statistic is taken. That sort does not follow 16-bit wraparound, so a
//! capture spanning a wrap orders the post-wrap packets first.
//!
//! ## Loss accounting
//!
//! Walking the sorted packets with an expected-sequence counter, each packet
//! contributes `delta = (seq - expected) mod 2^16`:
//!
//! - `0`: in order
//! - `1..=32767`: `delta` packets are counted as lost
//! - `32768..=65535`: the packet is behind the counter (a duplicate after
//!   sorting) and counts as out of order
//!
//! The counter then moves to `seq + 1` either way. Reordering is conflated
//! with loss, so true loss is undercounted when both occur.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, trace, warn};

use super::header::parse_header;
use super::payload_types::StreamTypeOverrides;
use super::source::{PacketSource, SourceItem};
use crate::types::{RtpPacket, StreamInfo, StreamType, concat_payloads, sequence_delta};
use crate::{AnalyzerConfig, MediaError, Result};

/// First delta value in the backward half of the sequence space
const BACKWARD_HALF: u16 = 0x8000;

/// Compute statistics for one stream's sequence-sorted packets.
///
/// Returns [`MediaError::EmptyStream`] for an empty list.
pub fn analyze_stream(packets: &[RtpPacket], stream_type: StreamType) -> Result<StreamInfo> {
    let (first, last) = match (packets.first(), packets.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(MediaError::EmptyStream { ssrc: 0 }),
    };

    let mut packets_lost = 0u64;
    let mut packets_out_of_order = 0u64;
    let mut expected = first.sequence();

    for packet in packets {
        match sequence_delta(packet.sequence(), expected) {
            0 => {}
            delta if delta < BACKWARD_HALF => {
                trace!(ssrc = first.ssrc(), expected, sequence = packet.sequence(), delta, "Sequence gap");
                packets_lost += u64::from(delta);
            }
            _ => {
                trace!(ssrc = first.ssrc(), expected, sequence = packet.sequence(), "Packet behind expected sequence");
                packets_out_of_order += 1;
            }
        }
        expected = packet.sequence().wrapping_add(1);
    }

    Ok(StreamInfo {
        ssrc: first.ssrc(),
        payload_type: first.payload_type(),
        stream_type,
        packet_count: packets.len(),
        first_seq: first.sequence(),
        last_seq: last.sequence(),
        first_timestamp: first.timestamp(),
        last_timestamp: last.timestamp(),
        packets_lost,
        packets_out_of_order,
        start_time: first.arrival_time(),
        end_time: last.arrival_time(),
        has_ptp: packets.iter().any(|p| p.ptp_timestamp().is_some()),
    })
}

/// Groups captured packets into classified, analyzed streams.
#[derive(Debug, Clone, Default)]
pub struct StreamDemuxer {
    overrides: StreamTypeOverrides,
    use_ptp: bool,
}

impl StreamDemuxer {
    pub fn new(overrides: StreamTypeOverrides, use_ptp: bool) -> Self {
        Self { overrides, use_ptp }
    }

    /// Build a demultiplexer from analyzer configuration.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        Ok(Self::new(config.stream_type_overrides()?, config.use_ptp))
    }

    pub fn overrides(&self) -> &StreamTypeOverrides {
        &self.overrides
    }

    /// Whether external (PTP) timestamps from the source are kept
    pub fn use_ptp(&self) -> bool {
        self.use_ptp
    }

    /// Classify a stream by override, then by payload type table.
    pub fn classify(&self, ssrc: u32, payload_type: u8) -> StreamType {
        self.overrides.classify(ssrc, payload_type)
    }

    /// Drain a source and demultiplex everything it yields.
    ///
    /// Malformed datagrams are skipped and counted; a failing source aborts.
    pub fn demux<S>(&self, source: &mut S) -> Result<DemuxedStreams>
    where
        S: PacketSource + ?Sized,
    {
        let mut packets = Vec::new();
        let mut rejected = 0usize;

        while let Some(item) = source.next_item()? {
            match item {
                SourceItem::Datagram(datagram) => match parse_header(&datagram.data) {
                    Ok((header, payload)) => {
                        let ptp = if self.use_ptp { datagram.ptp_timestamp } else { None };
                        packets.push(header.into_packet(payload, datagram.arrival_time, ptp));
                    }
                    Err(e) => {
                        trace!(arrival_time = datagram.arrival_time, error = %e, "Rejected datagram");
                        rejected += 1;
                    }
                },
                SourceItem::Packet(packet) => {
                    if self.use_ptp {
                        packets.push(packet);
                    } else {
                        packets.push(packet.with_ptp_timestamp(None));
                    }
                }
            }
        }

        let mut streams = self.group_and_analyze(packets);
        streams.rejected = rejected;

        info!(
            "Demultiplexed {} packets into {} streams ({} datagrams rejected)",
            streams.total_packets(),
            streams.len(),
            rejected
        );

        Ok(streams)
    }

    /// Group packets by SSRC, sort each group and compute its statistics.
    pub fn group_and_analyze(&self, packets: impl IntoIterator<Item = RtpPacket>) -> DemuxedStreams {
        let mut groups: HashMap<u32, Vec<RtpPacket>> = HashMap::new();
        for packet in packets {
            groups.entry(packet.ssrc()).or_default().push(packet);
        }

        let mut streams = DemuxedStreams::default();
        for (ssrc, mut group) in groups {
            group.sort_by_key(|p| p.sequence());

            // Every group holds at least the packet that created it
            let Some(payload_type) = group.first().map(RtpPacket::payload_type) else {
                continue;
            };
            if group.iter().any(|p| p.payload_type() != payload_type) {
                warn!(ssrc, payload_type, "Stream changes payload type mid-capture, classifying by the first");
            }

            let stream_type = self.classify(ssrc, payload_type);
            let Ok(info) = analyze_stream(&group, stream_type) else {
                continue;
            };

            debug!(
                ssrc,
                %stream_type,
                payload_type,
                packets = info.packet_count,
                lost = info.packets_lost,
                out_of_order = info.packets_out_of_order,
                "Analyzed stream"
            );

            streams.infos.insert(ssrc, info);
            streams.packets.insert(ssrc, group);
        }

        streams
    }
}

/// Demultiplexed capture: ordered packets and statistics per SSRC.
#[derive(Debug, Clone, Default)]
pub struct DemuxedStreams {
    packets: BTreeMap<u32, Vec<RtpPacket>>,
    infos: BTreeMap<u32, StreamInfo>,
    rejected: usize,
}

impl DemuxedStreams {
    /// Number of streams
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Datagrams the parser rejected as malformed
    pub fn rejected_count(&self) -> usize {
        self.rejected
    }

    /// Packets accepted across all streams
    pub fn total_packets(&self) -> usize {
        self.packets.values().map(Vec::len).sum()
    }

    /// SSRCs in ascending order
    pub fn ssrcs(&self) -> impl Iterator<Item = u32> + '_ {
        self.infos.keys().copied()
    }

    /// Sequence-sorted packets of one stream
    pub fn packets(&self, ssrc: u32) -> Option<&[RtpPacket]> {
        self.packets.get(&ssrc).map(Vec::as_slice)
    }

    pub fn info(&self, ssrc: u32) -> Option<&StreamInfo> {
        self.infos.get(&ssrc)
    }

    /// Packets and statistics of one stream.
    pub fn stream(&self, ssrc: u32) -> Result<(&[RtpPacket], &StreamInfo)> {
        match (self.packets(ssrc), self.info(ssrc)) {
            (Some(packets), Some(info)) => Ok((packets, info)),
            _ => Err(MediaError::StreamNotFound { ssrc }),
        }
    }

    /// Statistics for one stream, or for every stream in SSRC order.
    pub fn stream_info(&self, ssrc: Option<u32>) -> Result<Vec<&StreamInfo>> {
        match ssrc {
            Some(ssrc) => self.info(ssrc).map(|info| vec![info]).ok_or(MediaError::StreamNotFound { ssrc }),
            None => Ok(self.infos.values().collect()),
        }
    }

    /// `(ssrc, info)` pairs sorted by SSRC.
    pub fn list_streams(&self) -> Vec<(u32, &StreamInfo)> {
        self.infos.iter().map(|(ssrc, info)| (*ssrc, info)).collect()
    }

    /// Concatenated payload of one stream in sequence order.
    pub fn payload_data(&self, ssrc: u32) -> Result<Vec<u8>> {
        self.packets(ssrc).map(concat_payloads).ok_or(MediaError::StreamNotFound { ssrc })
    }

    /// Pick the stream a decoder should run on.
    ///
    /// An explicit SSRC must exist. Otherwise the lowest SSRC classified as
    /// `kind` wins, then the lowest SSRC overall.
    pub fn select_stream(&self, kind: StreamType, ssrc: Option<u32>) -> Result<u32> {
        if let Some(ssrc) = ssrc {
            return if self.infos.contains_key(&ssrc) {
                Ok(ssrc)
            } else {
                Err(MediaError::StreamNotFound { ssrc })
            };
        }

        if let Some(info) = self.infos.values().find(|info| info.stream_type == kind) {
            return Ok(info.ssrc);
        }

        match self.infos.keys().next() {
            Some(ssrc) => {
                warn!(%kind, ssrc, "No stream of requested type, using first stream");
                Ok(*ssrc)
            }
            None => Err(MediaError::NoStreams),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtp::{Datagram, MemorySource, RtpHeader};
    use proptest::prelude::*;

    fn packet(ssrc: u32, seq: u16, pt: u8) -> RtpPacket {
        RtpPacket::new(seq, u32::from(seq) * 48, ssrc, pt, false, vec![seq as u8; 4], f64::from(seq) * 0.001)
    }

    fn stream(ssrc: u32, seqs: &[u16]) -> Vec<RtpPacket> {
        seqs.iter().map(|&seq| packet(ssrc, seq, 97)).collect()
    }

    #[test]
    fn gap_free_stream_has_no_loss() {
        let info = analyze_stream(&stream(1, &[10, 11, 12, 13, 14]), StreamType::Audio).unwrap();
        assert_eq!(info.packets_lost, 0);
        assert_eq!(info.packets_out_of_order, 0);
        assert_eq!(info.packet_count, 5);
        assert_eq!((info.first_seq, info.last_seq), (10, 14));
        assert_eq!((info.first_timestamp, info.last_timestamp), (480, 672));
    }

    #[test]
    fn gap_is_counted_as_loss() {
        let info = analyze_stream(&stream(1, &[0, 1, 2, 6, 7]), StreamType::Audio).unwrap();
        assert_eq!(info.packets_lost, 3);
        assert_eq!(info.packets_out_of_order, 0);
    }

    #[test]
    fn duplicates_count_as_out_of_order() {
        let info = analyze_stream(&stream(1, &[0, 1, 1, 2, 2, 3]), StreamType::Audio).unwrap();
        assert_eq!(info.packets_lost, 0);
        assert_eq!(info.packets_out_of_order, 2);
    }

    #[test]
    fn empty_stream_is_an_error() {
        let err = analyze_stream(&[], StreamType::Video).unwrap_err();
        assert!(matches!(err, MediaError::EmptyStream { .. }));
    }

    #[test]
    fn group_and_analyze_sorts_each_stream() {
        let mut packets = stream(0xB, &[5, 3, 4]);
        packets.extend(stream(0xA, &[2, 0, 1]));
        let streams = StreamDemuxer::default().group_and_analyze(packets);

        assert_eq!(streams.len(), 2);
        let seqs: Vec<u16> = streams.packets(0xB).unwrap().iter().map(|p| p.sequence()).collect();
        assert_eq!(seqs, vec![3, 4, 5]);
        assert_eq!(streams.list_streams().iter().map(|(s, _)| *s).collect::<Vec<_>>(), vec![0xA, 0xB]);
        assert_eq!(streams.info(0xA).unwrap().packets_out_of_order, 0);
    }

    #[test]
    fn sort_is_stable_for_equal_sequences() {
        let first = RtpPacket::new(1, 0, 7, 97, false, vec![1u8], 0.0);
        let second = RtpPacket::new(1, 0, 7, 97, false, vec![2u8], 0.1);
        let streams = StreamDemuxer::default().group_and_analyze(vec![first, second]);
        assert_eq!(streams.payload_data(7).unwrap(), vec![1, 2]);
    }

    #[test]
    fn classification_uses_overrides() {
        let overrides = StreamTypeOverrides::new()
            .with_ssrc(0x10, StreamType::Meta)
            .with_payload_type(99, StreamType::Video);
        let demuxer = StreamDemuxer::new(overrides, false);

        let mut packets = vec![packet(0x10, 0, 96), packet(0x20, 0, 99), packet(0x30, 0, 97), packet(0x40, 0, 111)];
        packets.push(packet(0x50, 0, 98));
        let streams = demuxer.group_and_analyze(packets);

        let kind = |ssrc| streams.info(ssrc).unwrap().stream_type;
        assert_eq!(kind(0x10), StreamType::Meta);
        assert_eq!(kind(0x20), StreamType::Video);
        assert_eq!(kind(0x30), StreamType::Audio);
        assert_eq!(kind(0x40), StreamType::Unknown);
        assert_eq!(kind(0x50), StreamType::Meta);
    }

    #[test]
    fn demux_parses_datagrams_and_counts_rejects() {
        let _ = tracing_subscriber::fmt::try_init();

        let mut source = MemorySource::new();
        for seq in 0..3u16 {
            let datagram = RtpHeader::new(96, seq, 0, 0xCAFE).encode(&[seq as u8; 8]);
            source.push(Datagram::new(datagram, f64::from(seq)).with_ptp_timestamp(1_000 + u64::from(seq)));
        }
        source.push(Datagram::new(vec![0x40u8; 20], 9.0));
        source.push(Datagram::new(vec![0x80u8; 4], 9.5));
        source.push(packet(0xBEEF, 1, 97).with_ptp_timestamp(Some(7)));

        let streams = StreamDemuxer::default().demux(&mut source).unwrap();
        assert_eq!(streams.rejected_count(), 2);
        assert_eq!(streams.len(), 2);
        assert_eq!(streams.total_packets(), 4);

        let info = streams.info(0xCAFE).unwrap();
        assert_eq!(info.stream_type, StreamType::Video);
        assert_eq!(info.packet_count, 3);
        assert!(!info.has_ptp, "external timestamps are discarded unless enabled");
        assert!(!streams.info(0xBEEF).unwrap().has_ptp);
    }

    #[test]
    fn demux_keeps_ptp_when_enabled() {
        let datagram = RtpHeader::new(97, 1, 0, 5).encode(&[0; 6]);
        let mut source = MemorySource::from_datagrams(vec![Datagram::new(datagram, 0.0).with_ptp_timestamp(42)]);

        let streams = StreamDemuxer::new(StreamTypeOverrides::default(), true).demux(&mut source).unwrap();
        let packets = streams.packets(5).unwrap();
        assert_eq!(packets[0].ptp_timestamp(), Some(42));
        assert!(streams.info(5).unwrap().has_ptp);
    }

    #[test]
    fn lookups_report_missing_streams() {
        let streams = StreamDemuxer::default().group_and_analyze(stream(3, &[0, 1]));

        assert!(matches!(streams.payload_data(4), Err(MediaError::StreamNotFound { ssrc: 4 })));
        assert!(matches!(streams.stream_info(Some(4)), Err(MediaError::StreamNotFound { .. })));
        assert_eq!(streams.stream_info(None).unwrap().len(), 1);
        assert_eq!(streams.stream_info(Some(3)).unwrap()[0].ssrc, 3);
        assert_eq!(streams.payload_data(3).unwrap(), vec![0, 0, 0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn select_stream_prefers_matching_type() {
        let mut packets = vec![packet(0x30, 0, 98), packet(0x20, 0, 97), packet(0x10, 0, 111)];
        packets.push(packet(0x05, 0, 97));
        let streams = StreamDemuxer::default().group_and_analyze(packets);

        assert_eq!(streams.select_stream(StreamType::Audio, None).unwrap(), 0x05);
        assert_eq!(streams.select_stream(StreamType::Meta, None).unwrap(), 0x30);
        // No video stream: first stream overall
        assert_eq!(streams.select_stream(StreamType::Video, None).unwrap(), 0x05);
        assert_eq!(streams.select_stream(StreamType::Video, Some(0x20)).unwrap(), 0x20);
        assert!(matches!(
            streams.select_stream(StreamType::Video, Some(0x99)),
            Err(MediaError::StreamNotFound { ssrc: 0x99 })
        ));
    }

    #[test]
    fn select_stream_on_empty_capture_fails() {
        let streams = DemuxedStreams::default();
        assert!(matches!(streams.select_stream(StreamType::Audio, None), Err(MediaError::NoStreams)));
    }

    proptest! {
        #[test]
        fn gap_free_runs_report_no_loss(start in any::<u16>(), len in 1usize..200) {
            let seqs: Vec<u16> = (0..len).map(|i| start.wrapping_add(i as u16)).collect();
            // Stay clear of the wrap, which the numeric sort does not follow
            prop_assume!(seqs.windows(2).all(|w| w[0] < w[1]));
            let info = analyze_stream(&stream(1, &seqs), StreamType::Audio).unwrap();
            prop_assert_eq!(info.packets_lost, 0);
            prop_assert_eq!(info.packets_out_of_order, 0);
        }

        #[test]
        fn single_gap_of_k_reports_k_lost(start in 0u16..1000, before in 1u16..50, gap in 1u16..500, after in 1u16..50) {
            let mut seqs: Vec<u16> = (start..start + before).collect();
            let resume = start + before + gap;
            seqs.extend(resume..resume + after);
            let info = analyze_stream(&stream(1, &seqs), StreamType::Audio).unwrap();
            prop_assert_eq!(info.packets_lost, u64::from(gap));
            prop_assert_eq!(info.packets_out_of_order, 0);
        }
    }
}
