//! RTP fixed header parsing and serialization (RFC 3550 section 5.1)
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |V=2|P|X|  CC   |M|     PT      |       sequence number         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           timestamp                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           synchronization source (SSRC) identifier            |
//! +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
//! |            contributing source (CSRC) identifiers             |
//! |                             ....                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |      defined by profile       |           length              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                        header extension                       |
//! |                             ....                              |
//! ```
//!
//! All multi-byte fields are big-endian. Parsing never copies the payload: the
//! returned payload is a slice of the datagram's [`Bytes`] buffer.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::types::RtpPacket;
use crate::{MediaError, Result};

/// The only RTP version this parser accepts
pub const RTP_VERSION: u8 = 2;

/// Size of the fixed part of the RTP header in bytes
pub const RTP_FIXED_HEADER_SIZE: usize = 12;

const VERSION_SHIFT: u8 = 6;
const PADDING_MASK: u8 = 0b0010_0000;
const EXTENSION_MASK: u8 = 0b0001_0000;
const CSRC_COUNT_MASK: u8 = 0b0000_1111;
const MARKER_MASK: u8 = 0b1000_0000;
const PAYLOAD_TYPE_MASK: u8 = 0b0111_1111;

/// Header extension carried after the CSRC list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderExtension {
    /// 16-bit profile-defined identifier
    pub profile: u16,
    /// Extension body, a whole number of 32-bit words
    pub data: Bytes,
}

/// Decoded RTP header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpHeader {
    pub version: u8,
    /// Padding flag as it appeared on the wire
    pub padding: bool,
    pub marker: bool,
    pub payload_type: u8,
    pub sequence: u16,
    pub timestamp: u32,
    pub ssrc: u32,
    pub csrcs: Vec<u32>,
    pub extension: Option<HeaderExtension>,
    /// Total header length: fixed part, CSRC list and extension
    pub header_len: usize,
    /// Number of padding bytes trimmed from (or appended to) the payload tail
    pub padding_len: usize,
}

impl RtpHeader {
    /// Create a version 2 header with no CSRCs, extension or padding.
    pub fn new(payload_type: u8, sequence: u16, timestamp: u32, ssrc: u32) -> Self {
        Self {
            version: RTP_VERSION,
            padding: false,
            marker: false,
            payload_type: payload_type & PAYLOAD_TYPE_MASK,
            sequence,
            timestamp,
            ssrc,
            csrcs: Vec::new(),
            extension: None,
            header_len: RTP_FIXED_HEADER_SIZE,
            padding_len: 0,
        }
    }

    pub fn csrc_count(&self) -> usize {
        self.csrcs.len()
    }

    pub fn has_extension(&self) -> bool {
        self.extension.is_some()
    }

    /// Serialize this header in front of `payload`.
    ///
    /// Extension data is zero-filled to a whole number of 32-bit words. When
    /// `padding_len` is non-zero the padding flag is set and `padding_len`
    /// bytes are appended, the last one holding the count. At most 15 CSRCs
    /// are written.
    pub fn encode(&self, payload: &[u8]) -> Bytes {
        let csrcs = &self.csrcs[..self.csrcs.len().min(CSRC_COUNT_MASK as usize)];
        let padding_len = self.padding_len.min(u8::MAX as usize);
        let padded = padding_len > 0;

        let mut buf = BytesMut::with_capacity(
            RTP_FIXED_HEADER_SIZE + csrcs.len() * 4 + payload.len() + padding_len + 64,
        );

        let mut byte0 = (self.version << VERSION_SHIFT) | csrcs.len() as u8;
        if padded {
            byte0 |= PADDING_MASK;
        }
        if self.extension.is_some() {
            byte0 |= EXTENSION_MASK;
        }
        buf.put_u8(byte0);

        let mut byte1 = self.payload_type & PAYLOAD_TYPE_MASK;
        if self.marker {
            byte1 |= MARKER_MASK;
        }
        buf.put_u8(byte1);
        buf.put_u16(self.sequence);
        buf.put_u32(self.timestamp);
        buf.put_u32(self.ssrc);

        for csrc in csrcs {
            buf.put_u32(*csrc);
        }

        if let Some(extension) = &self.extension {
            let words = extension.data.len().div_ceil(4);
            buf.put_u16(extension.profile);
            buf.put_u16(words as u16);
            buf.put_slice(&extension.data);
            buf.put_bytes(0, words * 4 - extension.data.len());
        }

        buf.put_slice(payload);

        if padded {
            buf.put_bytes(0, padding_len - 1);
            buf.put_u8(padding_len as u8);
        }

        buf.freeze()
    }

    /// Build a packet record from this header and its payload.
    pub fn into_packet(
        self,
        payload: Bytes,
        arrival_time: f64,
        ptp_timestamp: Option<u64>,
    ) -> RtpPacket {
        RtpPacket::new(
            self.sequence,
            self.timestamp,
            self.ssrc,
            self.payload_type,
            self.marker,
            payload,
            arrival_time,
        )
        .with_ptp_timestamp(ptp_timestamp)
    }
}

/// Parse an RTP header from a raw transport (UDP) payload.
///
/// Returns the decoded header and the payload slice with any padding
/// trimmed. Datagrams that are too short, carry a version other than 2, or
/// have a truncated CSRC list or extension are rejected with
/// [`MediaError::MalformedPacket`].
pub fn parse_header(datagram: &Bytes) -> Result<(RtpHeader, Bytes)> {
    let len = datagram.len();
    if len < RTP_FIXED_HEADER_SIZE {
        return Err(MediaError::malformed_packet(format!(
            "datagram of {} bytes is shorter than the {} byte fixed header",
            len, RTP_FIXED_HEADER_SIZE
        )));
    }

    let byte0 = datagram[0];
    let version = byte0 >> VERSION_SHIFT;
    if version != RTP_VERSION {
        return Err(MediaError::malformed_packet(format!(
            "unsupported RTP version {} (expected {})",
            version, RTP_VERSION
        )));
    }

    let padding = byte0 & PADDING_MASK != 0;
    let has_extension = byte0 & EXTENSION_MASK != 0;
    let csrc_count = (byte0 & CSRC_COUNT_MASK) as usize;

    let byte1 = datagram[1];
    let marker = byte1 & MARKER_MASK != 0;
    let payload_type = byte1 & PAYLOAD_TYPE_MASK;

    let sequence = read_u16_be(datagram, 2);
    let timestamp = read_u32_be(datagram, 4);
    let ssrc = read_u32_be(datagram, 8);

    let mut header_len = RTP_FIXED_HEADER_SIZE + csrc_count * 4;
    if len < header_len {
        return Err(MediaError::malformed_packet(format!(
            "CSRC list of {} entries needs {} bytes, datagram has {}",
            csrc_count, header_len, len
        )));
    }

    let csrcs = (0..csrc_count)
        .map(|i| read_u32_be(datagram, RTP_FIXED_HEADER_SIZE + i * 4))
        .collect();

    let extension = if has_extension {
        if len < header_len + 4 {
            return Err(MediaError::malformed_packet(format!(
                "extension header at offset {} runs past the end of a {} byte datagram",
                header_len, len
            )));
        }
        let profile = read_u16_be(datagram, header_len);
        let words = read_u16_be(datagram, header_len + 2) as usize;
        let data_start = header_len + 4;
        header_len = data_start + words * 4;
        if len < header_len {
            return Err(MediaError::malformed_packet(format!(
                "extension of {} words needs {} bytes, datagram has {}",
                words, header_len, len
            )));
        }
        Some(HeaderExtension { profile, data: datagram.slice(data_start..header_len) })
    } else {
        None
    };

    let mut payload_end = len;
    let mut padding_len = 0;
    if padding && len > header_len {
        let declared = datagram[len - 1] as usize;
        if declared > 0 && declared <= len - header_len {
            padding_len = declared;
            payload_end -= declared;
        } else {
            trace!(declared, available = len - header_len, "Ignoring out-of-range RTP padding");
        }
    }

    trace!(ssrc, sequence, header_len, payload_len = payload_end - header_len, "Parsed RTP header");

    let header = RtpHeader {
        version,
        padding,
        marker,
        payload_type,
        sequence,
        timestamp,
        ssrc,
        csrcs,
        extension,
        header_len,
        padding_len,
    };

    Ok((header, datagram.slice(header_len..payload_end)))
}

// Callers guarantee `offset + 2 <= data.len()`
fn read_u16_be(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

// Callers guarantee `offset + 4 <= data.len()`
fn read_u32_be(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn header_with(csrcs: Vec<u32>) -> RtpHeader {
        let mut header = RtpHeader::new(96, 1000, 90_000, 0xDEADBEEF);
        header.csrcs = csrcs;
        header
    }

    #[test]
    fn round_trips_basic_header() {
        let mut header = RtpHeader::new(97, 4242, 123_456, 0x1234_5678);
        header.marker = true;
        let datagram = header.encode(&[1, 2, 3, 4, 5]);

        let (parsed, payload) = parse_header(&datagram).expect("valid header");
        assert_eq!(parsed.version, 2);
        assert!(parsed.marker);
        assert_eq!(parsed.payload_type, 97);
        assert_eq!(parsed.sequence, 4242);
        assert_eq!(parsed.timestamp, 123_456);
        assert_eq!(parsed.ssrc, 0x1234_5678);
        assert_eq!(parsed.header_len, 12);
        assert_eq!(&payload[..], &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn rejects_short_datagrams() {
        let datagram = Bytes::from_static(&[0x80, 0x60, 0, 1, 0, 0, 0, 0, 0, 0, 0]);
        let err = parse_header(&datagram).unwrap_err();
        assert!(matches!(err, MediaError::MalformedPacket { .. }));
    }

    #[test]
    fn rejects_truncated_csrc_list() {
        let datagram = header_with(vec![1, 2, 3]).encode(&[]);
        let truncated = datagram.slice(..datagram.len() - 2);
        assert!(parse_header(&truncated).is_err());
    }

    #[test]
    fn skips_extension_words() {
        let mut header = RtpHeader::new(96, 7, 0, 42);
        header.extension =
            Some(HeaderExtension { profile: 0xBEDE, data: Bytes::from_static(&[9; 8]) });
        let datagram = header.encode(&[0xAA, 0xBB]);

        let (parsed, payload) = parse_header(&datagram).unwrap();
        let extension = parsed.extension.expect("extension present");
        assert_eq!(extension.profile, 0xBEDE);
        assert_eq!(extension.data.len(), 8);
        assert_eq!(parsed.header_len, 12 + 4 + 8);
        assert_eq!(&payload[..], &[0xAA, 0xBB]);
    }

    #[test]
    fn extension_data_is_zero_filled_to_words() {
        let mut header = RtpHeader::new(96, 7, 0, 42);
        header.extension = Some(HeaderExtension { profile: 1, data: Bytes::from_static(&[5; 3]) });
        let (parsed, _) = parse_header(&header.encode(&[])).unwrap();
        assert_eq!(&parsed.extension.unwrap().data[..], &[5, 5, 5, 0]);
    }

    #[test]
    fn rejects_extension_longer_than_datagram() {
        // X bit set, extension header claims 4 words but none follow
        let datagram = Bytes::from_static(&[
            0x90, 0x60, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0xBE, 0xDE, 0x00, 0x04,
        ]);
        assert!(parse_header(&datagram).is_err());

        let no_room = Bytes::from_static(&[0x90, 0x60, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0xBE]);
        assert!(parse_header(&no_room).is_err());
    }

    #[test]
    fn trims_padding() {
        let mut header = RtpHeader::new(98, 1, 0, 1);
        header.padding_len = 4;
        let datagram = header.encode(&[1, 2, 3]);
        assert_eq!(datagram.len(), 12 + 3 + 4);

        let (parsed, payload) = parse_header(&datagram).unwrap();
        assert!(parsed.padding);
        assert_eq!(parsed.padding_len, 4);
        assert_eq!(&payload[..], &[1, 2, 3]);
    }

    #[test]
    fn ignores_padding_larger_than_payload() {
        // P bit set, 2 payload bytes, last byte claims 9 bytes of padding
        let datagram =
            Bytes::from_static(&[0xA0, 0x60, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0x11, 0x09]);
        let (parsed, payload) = parse_header(&datagram).unwrap();
        assert_eq!(parsed.padding_len, 0);
        assert_eq!(&payload[..], &[0x11, 0x09]);
    }

    #[test]
    fn payload_is_a_view_into_the_datagram() {
        let datagram = RtpHeader::new(96, 1, 0, 1).encode(&[7; 32]);
        let (_, payload) = parse_header(&datagram).unwrap();
        assert_eq!(payload.as_ptr(), datagram[12..].as_ptr());
    }

    #[test]
    fn into_packet_carries_header_fields() {
        let mut header = RtpHeader::new(96, 11, 22, 33);
        header.marker = true;
        let packet = header.into_packet(Bytes::from_static(&[1]), 0.5, Some(99));
        assert_eq!(packet.sequence(), 11);
        assert_eq!(packet.timestamp(), 22);
        assert_eq!(packet.ssrc(), 33);
        assert!(packet.marker());
        assert_eq!(packet.ptp_timestamp(), Some(99));
    }

    proptest! {
        #[test]
        fn rejects_every_non_v2_version(
            version in prop::sample::select(vec![0u8, 1, 3]),
            rest in prop::collection::vec(any::<u8>(), 11..64),
        ) {
            let mut bytes = rest;
            bytes.insert(0, version << 6);
            let datagram = Bytes::from(bytes);
            prop_assert!(parse_header(&datagram).is_err());
        }

        #[test]
        fn header_size_grows_by_four_per_csrc(
            csrcs in prop::collection::vec(any::<u32>(), 0..=15),
            payload in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let count = csrcs.len();
            let datagram = header_with(csrcs.clone()).encode(&payload);
            let (parsed, parsed_payload) = parse_header(&datagram).unwrap();
            prop_assert_eq!(parsed.header_len, 12 + 4 * count);
            prop_assert_eq!(parsed.csrcs, csrcs);
            prop_assert_eq!(&parsed_payload[..], &payload[..]);
        }

        #[test]
        fn encode_then_parse_recovers_fields(
            sequence in any::<u16>(),
            timestamp in any::<u32>(),
            ssrc in any::<u32>(),
            payload_type in 0u8..128,
            marker in any::<bool>(),
            payload in prop::collection::vec(any::<u8>(), 0..256),
        ) {
            let mut header = RtpHeader::new(payload_type, sequence, timestamp, ssrc);
            header.marker = marker;
            let (parsed, parsed_payload) = parse_header(&header.encode(&payload)).unwrap();
            prop_assert_eq!(parsed.sequence, sequence);
            prop_assert_eq!(parsed.timestamp, timestamp);
            prop_assert_eq!(parsed.ssrc, ssrc);
            prop_assert_eq!(parsed.payload_type, payload_type);
            prop_assert_eq!(parsed.marker, marker);
            prop_assert_eq!(&parsed_payload[..], &payload[..]);
        }
    }
}
