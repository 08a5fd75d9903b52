//! Packet sources feeding the demultiplexer
//!
//! A source hands over captured traffic one item at a time. Readers that
//! only see UDP payloads yield [`Datagram`]s and leave header parsing to the
//! demultiplexer; readers that already decode RTP yield [`RtpPacket`]s.
//! Capture file formats and live interfaces live outside this crate.

use std::collections::VecDeque;

use bytes::Bytes;

use crate::Result;
use crate::types::RtpPacket;

/// Raw transport payload with its capture metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Datagram {
    /// UDP payload, starting at the RTP header
    pub data: Bytes,
    /// Capture arrival time in seconds
    pub arrival_time: f64,
    /// External (PTP) timestamp in nanoseconds, if the capture carried one
    pub ptp_timestamp: Option<u64>,
}

impl Datagram {
    pub fn new(data: impl Into<Bytes>, arrival_time: f64) -> Self {
        Self { data: data.into(), arrival_time, ptp_timestamp: None }
    }

    pub fn with_ptp_timestamp(mut self, ptp_timestamp: u64) -> Self {
        self.ptp_timestamp = Some(ptp_timestamp);
        self
    }
}

/// One unit of captured traffic.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceItem {
    /// Unparsed transport payload
    Datagram(Datagram),
    /// Packet already decoded upstream
    Packet(RtpPacket),
}

impl From<Datagram> for SourceItem {
    fn from(datagram: Datagram) -> Self {
        SourceItem::Datagram(datagram)
    }
}

impl From<RtpPacket> for SourceItem {
    fn from(packet: RtpPacket) -> Self {
        SourceItem::Packet(packet)
    }
}

/// Trait for captured traffic sources
///
/// Sources abstract over capture files, live interfaces and in-memory
/// buffers. The demultiplexer pulls from them until exhausted.
pub trait PacketSource {
    /// Get the next captured item
    ///
    /// Returns:
    /// - `Ok(Some(item))` - Next datagram or packet
    /// - `Ok(None)` - Capture exhausted (normal termination)
    /// - `Err(e)` - The underlying reader failed
    fn next_item(&mut self) -> Result<Option<SourceItem>>;
}

/// Every iterator of items is a source that never fails.
impl<I> PacketSource for I
where
    I: Iterator<Item = SourceItem>,
{
    fn next_item(&mut self) -> Result<Option<SourceItem>> {
        Ok(self.next())
    }
}

/// In-memory packet source.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    items: VecDeque<SourceItem>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source over raw datagrams.
    pub fn from_datagrams(datagrams: impl IntoIterator<Item = Datagram>) -> Self {
        datagrams.into_iter().map(SourceItem::Datagram).collect()
    }

    /// Source over pre-parsed packets.
    pub fn from_packets(packets: impl IntoIterator<Item = RtpPacket>) -> Self {
        packets.into_iter().map(SourceItem::Packet).collect()
    }

    pub fn push(&mut self, item: impl Into<SourceItem>) {
        self.items.push_back(item.into());
    }

    /// Items not yet consumed
    pub fn remaining(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<SourceItem> for MemorySource {
    fn from_iter<T: IntoIterator<Item = SourceItem>>(iter: T) -> Self {
        Self { items: iter.into_iter().collect() }
    }
}

impl PacketSource for MemorySource {
    fn next_item(&mut self) -> Result<Option<SourceItem>> {
        Ok(self.items.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_yields_items_in_order() {
        let mut source = MemorySource::new();
        source.push(Datagram::new(vec![1u8], 0.0));
        source.push(RtpPacket::new(7, 0, 1, 97, false, vec![2u8], 0.1));
        assert_eq!(source.remaining(), 2);

        assert!(matches!(source.next_item().unwrap(), Some(SourceItem::Datagram(_))));
        match source.next_item().unwrap() {
            Some(SourceItem::Packet(packet)) => assert_eq!(packet.sequence(), 7),
            other => panic!("Expected packet, got {other:?}"),
        }
        assert!(source.next_item().unwrap().is_none());
        assert!(source.is_empty());
    }

    #[test]
    fn iterators_are_sources() {
        let items = vec![SourceItem::from(Datagram::new(vec![0u8; 12], 1.0).with_ptp_timestamp(5))];
        let mut source = items.into_iter();
        match source.next_item().unwrap() {
            Some(SourceItem::Datagram(datagram)) => {
                assert_eq!(datagram.ptp_timestamp, Some(5));
                assert_eq!(datagram.arrival_time, 1.0);
            }
            other => panic!("Expected datagram, got {other:?}"),
        }
        assert!(source.next_item().unwrap().is_none());
    }

    #[test]
    fn from_packets_wraps_every_packet() {
        let packets = (0..4).map(|seq| RtpPacket::new(seq, 0, 9, 96, false, vec![], 0.0));
        let source = MemorySource::from_packets(packets);
        assert_eq!(source.remaining(), 4);
    }
}
