//! RTP parsing and stream demultiplexing
//!
//! ## Pipeline
//!
//! ```text
//! PacketSource ──► parse_header ──► StreamDemuxer ──► DemuxedStreams
//!   (datagrams       (RFC 3550        (group by SSRC,     (ordered packets,
//!    or packets)      fixed header)    sort, classify)     StreamInfo)
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use st2110::rtp::{Datagram, MemorySource, RtpHeader, StreamDemuxer};
//! use st2110::StreamType;
//!
//! let mut source = MemorySource::new();
//! for seq in 0..4u16 {
//!     let datagram = RtpHeader::new(97, seq, u32::from(seq) * 48, 0x1234).encode(&[0u8; 288]);
//!     source.push(Datagram::new(datagram, f64::from(seq) * 0.001));
//! }
//!
//! let streams = StreamDemuxer::default().demux(&mut source)?;
//! let info = streams.info(0x1234).unwrap();
//! assert_eq!(info.stream_type, StreamType::Audio);
//! assert_eq!(info.packet_count, 4);
//! assert_eq!(info.packets_lost, 0);
//! # Ok::<(), st2110::MediaError>(())
//! ```

mod demux;
mod header;
mod payload_types;
mod source;

pub use demux::{DemuxedStreams, StreamDemuxer, analyze_stream};
pub use header::{HeaderExtension, RTP_FIXED_HEADER_SIZE, RTP_VERSION, RtpHeader, parse_header};
pub use payload_types::{StreamTypeOverrides, default_stream_type, payload_type_name};
pub use source::{Datagram, MemorySource, PacketSource, SourceItem};
