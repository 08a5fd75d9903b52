//! ST 2110-30/31 linear PCM audio decoding
//!
//! The ordered payload of a stream is concatenated, cut to whole frames and
//! converted to normalized `f32` samples per channel. Without configured
//! [`AudioParameters`] the layout is inferred from the payload size and the
//! RTP timestamp span.
//!
//! ```rust
//! use st2110::audio::{AudioDecoder, AudioParameters};
//! use st2110::rtp::analyze_stream;
//! use st2110::{EssenceDecoder, RtpPacket, StreamType};
//!
//! let packets = vec![RtpPacket::new(0, 0, 7, 97, false, vec![0x40, 0x00, 0xC0, 0x00], 0.0)];
//! let info = analyze_stream(&packets, StreamType::Audio)?;
//!
//! let output = AudioDecoder::with_params(AudioParameters::new(48_000, 16, 2)).decode(&packets, &info)?;
//! assert_eq!(output.buffer.channel(0), Some(&[0.5f32][..]));
//! assert_eq!(output.buffer.channel(1), Some(&[-0.5f32][..]));
//! # Ok::<(), st2110::MediaError>(())
//! ```

mod decoder;
mod params;
mod pcm;

pub use decoder::{AudioBuffer, AudioDecodeOutput, AudioDecoder, AudioSummary, format_duration};
pub use params::{AudioEncoding, AudioParameters, COMMON_SAMPLE_RATES, infer_audio_params};
pub use pcm::{deinterleave, sample_16, sample_20, sample_24};
