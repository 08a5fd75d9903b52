//! SMPTE ST 2110 RTP stream analysis and essence decoding.
//!
//! Turns captured RTP traffic into per-stream statistics and decoded essence:
//! uncompressed video (ST 2110-20), linear PCM audio (ST 2110-30/31) and
//! ancillary data (ST 2110-40).
//!
//! # Features
//!
//! - **RTP parsing**: RFC 3550 fixed header, CSRC list, extension and padding,
//!   with zero-copy payloads
//! - **Demultiplexing**: per-SSRC grouping, sequence ordering, loss and
//!   reordering counts, configurable stream classification
//! - **Video**: frame reassembly at marker bits, 4:2:2 / 4:4:4 / RGB unpacking,
//!   geometry and frame rate inference
//! - **Audio**: 16/20/24-bit big-endian PCM to normalized `f32` per channel,
//!   layout inference
//! - **Ancillary**: SMPTE 291M packet scanning, SMPTE 12M timecode, CEA-608 and
//!   CEA-708 caption text
//!
//! Packet capture and link-layer decoding are left to the caller: anything
//! that yields UDP payloads (or pre-parsed packets) can implement
//! [`rtp::PacketSource`].
//!
//! # Quick Start
//!
//! ```rust
//! use st2110::rtp::{Datagram, MemorySource, RtpHeader};
//! use st2110::{Analyzer, StreamType};
//!
//! // One 2x1 RGB frame in a single packet, marker set
//! let mut header = RtpHeader::new(96, 0, 0, 0xBEEF);
//! header.marker = true;
//! let mut source = MemorySource::new();
//! source.push(Datagram::new(header.encode(&[10, 20, 30, 40, 50, 60]), 0.0));
//!
//! let config = st2110::AnalyzerConfig::from_yaml_str(
//!     "video: {width: 2, height: 1, pixel_format: RGB, bit_depth: 8, frame_rate: 25}",
//! )?;
//! let analyzer = Analyzer::new(config)?;
//!
//! let streams = analyzer.demux(&mut source)?;
//! assert_eq!(streams.info(0xBEEF).map(|info| info.stream_type), Some(StreamType::Video));
//!
//! let video = analyzer.decode_video(&streams, None)?;
//! assert_eq!(video.frames[0].pixel(1, 0), Some([40, 50, 60]));
//! # Ok::<(), st2110::MediaError>(())
//! ```

// Core types and error handling
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Transport
pub mod config;
pub mod rtp;

// Essence decoders
pub mod anc;
pub mod audio;
pub mod decoder;
pub mod video;

mod analyzer;

// Core exports
pub use error::*;
pub use types::*;

// Main API exports
pub use analyzer::Analyzer;
pub use config::{AnalyzerConfig, StreamTypeConfig, parse_ssrc};
pub use decoder::EssenceDecoder;
pub use rtp::{DemuxedStreams, PacketSource, RtpHeader, StreamDemuxer, parse_header};
