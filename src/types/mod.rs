//! Core types for RTP stream representation.
//!
//! ## Architecture
//!
//! - [`RtpPacket`] is one received packet with a zero-copy payload
//! - [`StreamInfo`] aggregates statistics for one SSRC
//! - [`StreamType`] classifies the essence a stream carries
//! - sequence helpers implement modulo-2^16 arithmetic on RTP sequence numbers
//!
//! ## Usage Example
//!
//! ```rust
//! use st2110::types::{RtpPacket, sequence_delta};
//!
//! let first = RtpPacket::new(65535, 0, 0x1234, 97, false, vec![0u8; 4], 0.0);
//! let second = RtpPacket::new(0, 48, 0x1234, 97, false, vec![0u8; 4], 0.001);
//!
//! assert_eq!(sequence_delta(second.sequence(), first.sequence()), 1);
//! ```

mod packet;
mod sequence;
mod stream_info;
mod stream_type;

pub use packet::{RtpPacket, concat_payloads};
pub use sequence::{sequence_after, sequence_delta, sequence_span};
pub use stream_info::StreamInfo;
pub use stream_type::StreamType;
