//! ST 2110-20 uncompressed video decoding
//!
//! Packets are grouped into frames at marker bits, each frame's payload is
//! concatenated and unpacked into an 8-bit, 3-channel picture. When no
//! [`VideoParameters`] are configured they are inferred per stream from the
//! average frame size and the frame arrival rate.

mod decoder;
mod params;
mod unpack;

pub use decoder::{VideoDecodeOutput, VideoDecoder, VideoFrame, VideoSummary, group_into_frames};
pub use params::{
    COMMON_FRAME_RATES, COMMON_RESOLUTIONS, DEFAULT_FRAME_RATE, PackingMode, PixelFormat,
    VideoParameters, infer_frame_rate, infer_geometry, snap_frame_rate,
};
pub use unpack::unpack_frame;
